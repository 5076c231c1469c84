use std::path::PathBuf;
use std::process;

use apkpatch::commands::{self, Toolchain};
use apkpatch::config::WorkflowConfig;
use apkpatch::error::WorkflowError;
use apkpatch::logging;
use apkpatch_core::utils::dir_scan::FileChange;
use apkpatch_core::utils::patch_set::PatchSummary;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apkpatch")]
#[command(about = "Keep edits to a disassembled app as a reviewable patch file")]
#[command(version)]
struct Cli {
    /// Workflow config (defaults to ./apkpatch.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and sign the app from the patched tree
    Assemble,
    /// Save the edits made in the patched tree to the patch file
    CreatePatches,
    /// Patch operations on arbitrary directories
    Patch {
        #[command(subcommand)]
        command: PatchCommands,
    },
    /// Compare two directories by file hashes
    Compare {
        /// First directory
        dir1: PathBuf,
        /// Second directory
        dir2: PathBuf,
    },
}

#[derive(Subcommand)]
enum PatchCommands {
    /// Create a patch file from two directories
    Create {
        /// Original directory
        baseline: PathBuf,
        /// Modified directory
        modified: PathBuf,
        /// Path to write the patch file to
        output: PathBuf,
        /// Prettier-style formatter options
        #[arg(long)]
        format_config: Option<PathBuf>,
    },
    /// Apply a patch file, writing the result to a new directory
    Apply {
        /// Original directory
        baseline: PathBuf,
        /// Patch file
        patches: PathBuf,
        /// Directory to create with the patched tree
        output: PathBuf,
        /// Prettier-style formatter options
        #[arg(long)]
        format_config: Option<PathBuf>,
        /// Rewrite patched baseline files in normalized form afterwards
        #[arg(long)]
        normalize_baseline: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<WorkflowConfig, WorkflowError> {
    let cwd = std::env::current_dir().map_err(|e| WorkflowError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    Ok(WorkflowConfig::discover(path.map(PathBuf::as_path), &cwd)?)
}

fn print_summary(summary: &PatchSummary) {
    println!(
        "{} records ({} text, {} binary, {} hunks)",
        summary.records, summary.text, summary.binary, summary.hunks
    );
}

fn fail(e: WorkflowError) -> ! {
    eprintln!("Error: {}", e);
    process::exit(2);
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Assemble => {
            let config = load_config(cli.config.as_ref()).unwrap_or_else(|e| fail(e));
            match commands::assemble::run(&config, &Toolchain::java(&config)) {
                Ok(signed) => {
                    println!("Signed app written to {}", signed.display());
                }
                Err(e) => fail(e),
            }
        }
        Commands::CreatePatches => {
            let config = load_config(cli.config.as_ref()).unwrap_or_else(|e| fail(e));
            match commands::create_patches::run(&config, &Toolchain::java(&config)) {
                Ok(summary) => {
                    print_summary(&summary);
                    println!("Patches saved to {}", config.patches_path().display());
                }
                Err(e) => fail(e),
            }
        }
        Commands::Patch { command } => match command {
            PatchCommands::Create {
                baseline,
                modified,
                output,
                format_config,
            } => {
                match commands::patch_create::run(
                    &baseline,
                    &modified,
                    &output,
                    format_config.as_deref(),
                ) {
                    Ok(summary) => {
                        print_summary(&summary);
                        println!("Patch written to {}", output.display());
                    }
                    Err(e) => fail(e),
                }
            }
            PatchCommands::Apply {
                baseline,
                patches,
                output,
                format_config,
                normalize_baseline,
            } => {
                match commands::patch_apply::run(
                    &baseline,
                    &patches,
                    &output,
                    format_config.as_deref(),
                    normalize_baseline,
                ) {
                    Ok(summary) => {
                        print_summary(&summary);
                        println!("Output written to {}", output.display());
                    }
                    Err(e) => fail(e),
                }
            }
        },
        Commands::Compare { dir1, dir2 } => match commands::compare::run(&dir1, &dir2) {
            Ok(changes) if changes.is_empty() => {
                println!("Directories match");
            }
            Ok(changes) => {
                for change in &changes {
                    match change {
                        FileChange::Modified {
                            file,
                            original_hash,
                            final_hash,
                        } => println!("modified: {} ({} -> {})", file, original_hash, final_hash),
                        FileChange::Added { file, final_hash } => {
                            println!("only in {}: {} ({})", dir2.display(), file, final_hash)
                        }
                        FileChange::Removed {
                            file,
                            original_hash,
                        } => println!("only in {}: {} ({})", dir1.display(), file, original_hash),
                    }
                }
                println!("Directories differ");
                process::exit(1);
            }
            Err(e) => fail(e),
        },
    }
}
