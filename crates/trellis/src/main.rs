mod demo;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;
use trellis_core::{Kernel, KernelConfig, KernelError};

/// Trellis: connect and run components described by a configuration file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the component types available to configuration files
    Types,
    /// Connect every component of a configuration and resolve each once
    Check {
        /// Configuration file (.json, .yaml, .yml or .toml)
        config: PathBuf,
    },
    /// Connect a configuration, start the kernel, then stop it
    Run {
        /// Configuration file (.json, .yaml, .yml or .toml)
        config: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging();

    let outcome = match args.command {
        Commands::Types => list_types(),
        Commands::Check { config } => check(&config),
        Commands::Run { config } => run(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn list_types() -> Result<(), KernelError> {
    let catalog = demo::catalog()?;
    for key in catalog.keys() {
        let entry = catalog.get(key)?;
        println!("{:<16} {}", key, entry.implementation().name());
    }
    Ok(())
}

/// Builds a kernel with every component of `path` connected.
fn connect(path: &Path) -> Result<(std::sync::Arc<Kernel>, Vec<String>), KernelError> {
    let catalog = demo::catalog()?;
    let config = KernelConfig::load(path)?;
    let kernel = Kernel::new();
    let ids = config.apply(&kernel, &catalog, &path.display().to_string())?;
    Ok((kernel, ids))
}

fn check(path: &Path) -> Result<(), KernelError> {
    let (kernel, ids) = connect(path)?;
    for id in &ids {
        match kernel.get_service_by_id(id)? {
            Some(instance) => println!("  ok  {} ({})", id, instance.implementation()),
            None => return Err(KernelError::Other(format!("Component '{}' did not resolve", id))),
        }
    }
    println!("Configuration OK: {} component(s)", ids.len());
    Ok(())
}

fn run(path: &Path) -> Result<(), KernelError> {
    let (kernel, ids) = connect(path)?;
    info!("Connected {} component(s) from {}", ids.len(), path.display());

    kernel.start()?;
    println!("Kernel started");
    kernel.stop()?;
    println!("Kernel stopped");
    Ok(())
}
