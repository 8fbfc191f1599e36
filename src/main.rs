pub mod cli;
mod tui_app;

use std::{env, fs};

use anyhow::Context;
use clap::Parser;

use cli::{errors::DecrxCliError, helpers::exit_with_error};
use decrx::extract::unpack_crx_file;

#[derive(Parser)]
#[command(name = "decrx")]
#[command(version)]
#[command(about = "Decode a CRX extension package and unpack it to a directory", long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// CRX or zip file to unpack
    filename: String,
    /// Base directory for the unpacked extension (defaults to ./out)
    #[arg(short, long)]
    output_dir: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // No arguments: interactive mode.
    if env::args().len() == 1 {
        return tui_app::run_tui();
    }

    let cli = Cli::parse();

    if !(cli.filename.ends_with(".crx") || cli.filename.ends_with(".zip")) {
        exit_with_error(DecrxCliError::UnsupportedFileType);
    }

    let current_dir = env::current_dir().context("failed to get current directory")?;
    let input_path = current_dir.join(&cli.filename);

    if !input_path.exists() {
        exit_with_error(DecrxCliError::NotFound(input_path.display().to_string()));
    }

    let output_base_dir = match &cli.output_dir {
        Some(path) => current_dir.join(path),
        None => current_dir.join("out"),
    };

    // One directory per package, named after the input file.
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("extension");
    let extract_dir = output_base_dir.join(stem);

    if extract_dir.exists() {
        fs::remove_dir_all(&extract_dir)
            .with_context(|| format!("failed to remove {}", extract_dir.display()))?;
    }

    let dest = unpack_crx_file(&input_path, Some(&extract_dir))?;

    println!("Unpacked {} to {}", cli.filename, dest.display());

    Ok(())
}
