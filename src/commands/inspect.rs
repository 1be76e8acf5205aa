use crate::HelperContext;
use crate::manifest::{CommandManifestSource, ManifestSource};
use crate::mounts::MountTable;
use crate::ownership::Ownership;
use crate::reconcile::{DirReader, FsDirReader, IgnoreSet, TreeReconciler, normalize_root};
use crate::report::{Report, UnmanagedFiles};
use anyhow::Result;
use tracing::{Level, info, span};

/// Run the inspection against the live system and print the JSON report
///
/// # Errors
///
/// Returns an error if the manifest or the mount table cannot be obtained,
/// or if the manifest is malformed. Nothing is printed in that case.
pub fn execute(ctx: &HelperContext) -> Result<()> {
    let report = run(ctx)?;
    println!("{}", report.to_json()?);
    Ok(())
}

/// Run the inspection against the live system using the configured
/// manifest command, mount table and the real filesystem
///
/// # Errors
///
/// Returns an error if the manifest or the mount table cannot be obtained,
/// or if the manifest is malformed
pub fn run(ctx: &HelperContext) -> Result<Report> {
    let source = CommandManifestSource::from_command_line(&ctx.config.manifest.command)?;
    let mounts = MountTable::load(
        &ctx.config.mounts.table,
        &ctx.config.mounts.remote_types,
        &ctx.config.mounts.special_types,
    )?;

    inspect(ctx, &source, &mounts, &FsDirReader)
}

/// Build ownership sets from `source`, walk the tree via `reader` and
/// assemble the sorted report.
///
/// Remote mount roots are reported as `remote_dir` placeholders and, like
/// special mounts and the helper binary itself, are never entered.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or contains a line
/// without a path
pub fn inspect<S, R>(
    ctx: &HelperContext,
    source: &S,
    mounts: &MountTable,
    reader: &R,
) -> Result<Report>
where
    S: ManifestSource + ?Sized,
    R: DirReader + ?Sized,
{
    let span = span!(Level::INFO, "inspect", root = %ctx.config.scan.root);
    let _guard = span.enter();

    let manifest = source.read_manifest()?;
    let ownership = Ownership::from_manifest(&manifest, &ctx.config.manifest.empty_marker)?;

    let remote_mounts = mounts.remote_mounts();
    let ignore = build_ignore_set(ctx, &remote_mounts, &mounts.special_mounts());

    let mut unmanaged = UnmanagedFiles::new();
    for mount in &remote_mounts {
        unmanaged.add_remote_mount(mount);
    }

    let root = normalize_root(&ctx.config.scan.root);
    TreeReconciler::new(&ownership, &ignore, reader).walk(&root, &mut unmanaged);

    info!(
        unmanaged = unmanaged.len(),
        remote_mounts = remote_mounts.len(),
        ignored = ignore.len(),
        "Inspection finished"
    );

    Ok(unmanaged.into_report())
}

/// Paths never entered: the helper binary (resolved and as invoked), remote
/// and special mount roots, and configured extras
#[must_use]
pub fn build_ignore_set(
    ctx: &HelperContext,
    remote_mounts: &[String],
    special_mounts: &[String],
) -> IgnoreSet {
    let mut ignore = IgnoreSet::new();

    for helper in &ctx.helper_paths {
        ignore.insert_path(helper);
    }
    ignore.extend(remote_mounts.iter().cloned());
    ignore.extend(special_mounts.iter().cloned());
    ignore.extend(ctx.config.scan.extra_ignore.iter().cloned());

    ignore
}
