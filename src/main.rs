use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wsgconv::container::Container;
use wsgconv::convert::{self, ConvertOptions, DEFAULT_EXTENSION};

#[derive(Parser)]
#[command(name = "wsgconv", version, about = "Rename WSG save files using their container index")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the name -> storage id mapping of every save
    List {
        /// Save directory holding the container file
        #[arg(short, long, default_value = ".")]
        src: PathBuf,
        /// One JSON object per line instead of `NAME -> ID`
        #[arg(long)]
        json: bool,
    },
    /// Copy every save file to a copy named after its display name
    Convert {
        #[arg(short, long, default_value = ".")]
        src: PathBuf,
        #[arg(short, long, default_value = ".")]
        dest: PathBuf,
        /// Extension for the copies; pass "" for none
        #[arg(short, long, default_value = DEFAULT_EXTENSION)]
        ext: String,
        /// Parallel copy workers (0 = one per CPU)
        #[arg(short, long, default_value = "0")]
        jobs: usize,
    },
    /// Show container header details
    Info {
        #[arg(short, long, default_value = ".")]
        src: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true)  => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<bool, Box<dyn std::error::Error>> {
    match command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { src, json } => {
            let container = open_container(&src, !json)?;
            if !json {
                println!("WSG save file mapping:");
                println!();
            }
            let mut clean = true;
            for mapping in container.mappings() {
                match mapping {
                    Ok(m) if json => println!("{}", m.to_json()?),
                    Ok(m)         => println!("{m}"),
                    Err(e) => {
                        tracing::warn!("skipping record: {e}");
                        clean = false;
                    }
                }
            }
            Ok(clean)
        }

        // ── Convert ──────────────────────────────────────────────────────────
        Commands::Convert { src, dest, ext, jobs } => {
            convert::ensure_dir(&dest)
                .map_err(|e| format!("destination must be a directory: {e}"))?;
            let container = open_container(&src, true)?;
            println!("Using '{}' as destination directory", dest.display());

            let opts = ConvertOptions {
                source_dir: src,
                dest_dir:   dest,
                extension:  Some(ext),
                jobs,
            };
            let report = convert::convert_all(container.mappings(), &opts)?;
            for c in &report.copied {
                println!("Copied: {} -> {}", c.from.display(), c.to.display());
            }
            println!("{}", report.summary());
            Ok(report.is_success())
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { src } => {
            let container = open_container(&src, false)?;
            let header = container.header();
            println!("── WSG container ────────────────────────────────────────");
            if let Some(path) = container.path() {
                println!("  Path            {}", path.display());
            }
            println!("  Size            {} B", container.len());
            println!("  Declared saves  {}", container.declared_count());
            println!("  Present saves   {}", container.available_count());
            println!("  Truncated       {}", container.is_truncated());
            println!("  Header bytes    {} .... {}",
                hex::encode(header.prefix), hex::encode(header.reserved));
            Ok(true)
        }
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn open_container(src: &Path, announce: bool) -> Result<Container, Box<dyn std::error::Error>> {
    convert::ensure_dir(src).map_err(|e| format!("source must be a directory: {e}"))?;
    let container = Container::discover(src)?;
    if announce {
        println!("Using '{}' as source directory", src.display());
        if let Some(path) = container.path() {
            println!("Found container file: {}", path.display());
        }
        println!();
    }
    Ok(container)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
