//! Result-ingestion CLI for completed LAMMPS runs.
//!
//! Parses a run directory with the configured drone command and persists the
//! resulting task document. The file sink (`task.json` in the working
//! directory) is fully supported; database sinks are a library seam and are
//! rejected by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use ingest::exit_codes;
use ingest::io::config::load_config;
use ingest::io::db_config::{DbConfig, load_db_config};
use ingest::io::drone::CommandDrone;
use ingest::io::fw_spec::{FwSpec, load_fw_spec};
use ingest::io::sink::{CalcDb, CalcDbFactory};
use ingest::task::run_ingest;

#[derive(Parser)]
#[command(
    name = "ingest",
    version,
    about = "Ingest a completed LAMMPS run into task.json or a database"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a task config file (and its db credential file, when literal).
    Validate {
        /// Path to the task config TOML.
        config: PathBuf,
    },
    /// Parse a run directory and persist the task document.
    Run {
        /// Path to the task config TOML.
        config: PathBuf,

        /// Path to the workflow spec JSON (defaults to an empty spec).
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },
}

fn main() {
    ingest::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { config } => cmd_validate(&config),
        Command::Run { config, spec } => cmd_run(&config, spec.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    // A literal db_file can be checked now; `>>key<<` indirection needs the
    // workflow spec and is only resolvable at run time.
    if let Some(db_file) = &cfg.db_file
        && !db_file.starts_with(">>")
    {
        load_db_config(Path::new(db_file)).context("validate db credential file")?;
    }
    Ok(())
}

fn cmd_run(config_path: &Path, spec_path: Option<&Path>) -> Result<()> {
    let cfg = load_config(config_path)?;
    let fw_spec = match spec_path {
        Some(path) => load_fw_spec(path)?,
        None => FwSpec::default(),
    };
    let drone = CommandDrone::from_config(&cfg.drone);
    let cwd = std::env::current_dir().context("determine working directory")?;

    let outcome = run_ingest(&cwd, &cfg, &fw_spec, &drone, &NoDbFactory)?;
    match outcome.task_id {
        Some(id) => println!("{}", id),
        None => println!("null"),
    }
    Ok(())
}

/// The binary ships no database backend; embedders supply a
/// [`CalcDbFactory`]. A resolved database configuration is an error here.
struct NoDbFactory;

impl CalcDbFactory for NoDbFactory {
    fn open(&self, config: &DbConfig) -> Result<Box<dyn CalcDb>> {
        bail!(
            "no database backend is built into the ingest binary \
             (db `{}` at {}:{}); embed the library and supply a CalcDbFactory",
            config.database,
            config.host,
            config.port
        )
    }
}
