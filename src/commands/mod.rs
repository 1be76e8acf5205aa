//! Entry points invoked by the `machinery-helper` binary.

/// Unmanaged file inspection and report output.
pub mod inspect;

/// Delegation to the system archiver.
pub mod tar;
