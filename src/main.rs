use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use compose_dump::commands::{execute_backup, execute_restore};
use compose_dump::error::AppError;
use compose_dump::options::{BackupRequest, Compression};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Backup(args) => {
            let project_dir = match args.project_dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let request = BackupRequest {
                compose_files: args.files,
                project_dir,
                project_name: args.project_name,
                config: args.config,
                mounted: args.mounted,
                volumes: args.volumes,
                compression: args.compression,
                target: args.target,
                no_pause: args.no_pause,
                resolve_symlinks: args.resolve_symlinks,
                verbose: args.verbose,
                services: args.services,
            };
            execute_backup(request)?;
        }
        Commands::Restore => execute_restore()?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "compose-dump",
    version,
    about = "Backup and restore Docker Compose projects.",
    after_help = "Restoring is not implemented yet."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a project and its data. Containers are not saved.
    Backup(BackupArgs),
    /// Restore a project from a dump.
    Restore,
}

#[derive(Args)]
struct BackupArgs {
    /// Include configuration files, including referenced files and build contexts.
    #[arg(long = "config", action = ArgAction::SetTrue)]
    config: bool,

    /// Sets the compression when an archive file is written. Can also be
    /// provided as suffix on the target option.
    #[arg(short = 'x', long = "compression", value_name = "FORMAT")]
    compression: Option<Compression>,

    /// Specifies alternate compose files.
    #[arg(short = 'f', long = "file", value_name = "FILENAME", action = ArgAction::Append)]
    files: Vec<PathBuf>,

    /// Include mounted volumes, skips paths outside the project folder.
    #[arg(long = "mounted", action = ArgAction::SetTrue)]
    mounted: bool,

    /// Don't pause containers during backup.
    #[arg(long = "no-pause", action = ArgAction::SetTrue)]
    no_pause: bool,

    /// Specifies the project's root folder, defaults to the current directory.
    #[arg(long = "project-dir", value_name = "PATH")]
    project_dir: Option<PathBuf>,

    /// Specifies an alternate project name.
    #[arg(short = 'p', long = "project-name")]
    project_name: Option<String>,

    /// References to configuration files that are symlinks are stored as files.
    #[arg(long = "resolve-symlinks", action = ArgAction::SetTrue)]
    resolve_symlinks: bool,

    /// Dump target, defaults to stdout.
    #[arg(short = 't', long = "target", value_name = "PATH")]
    target: Option<PathBuf>,

    /// Log debug messages.
    #[arg(long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,

    /// Include container volumes.
    #[arg(long = "volumes", action = ArgAction::SetTrue)]
    volumes: bool,

    /// Restrict backup of build contexts and volumes to these services.
    #[arg(value_name = "SERVICE", num_args = 0..)]
    services: Vec<String>,
}
