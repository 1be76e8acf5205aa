//! Development tasks for machinery-helper.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for machinery-helper")]
enum Task {
    /// Generate man pages from clap definitions
    GenerateManPages {
        /// Output directory for man pages (default: ./man)
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let task = Task::parse();

    match task {
        Task::GenerateManPages { output } => generate_man_pages(&output)?,
    }

    Ok(())
}

/// Writes `machinery-helper.1` plus one page per subcommand
fn generate_man_pages(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let cmd = machinery_helper::cli::Cli::command();
    render(&cmd, &output_dir.join("machinery-helper.1"))?;

    for subcmd in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
        let page = output_dir.join(format!("machinery-helper-{}.1", subcmd.get_name()));
        render(subcmd, &page)?;
    }

    Ok(())
}

fn render(cmd: &clap::Command, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;

    clap_mangen::Man::new(cmd.clone()).render(&mut std::io::BufWriter::new(file))?;

    println!("{}", path.display());
    Ok(())
}
