//! Read-only command line front end over `jobly_core`.
//!
//! # Responsibility
//! - Open a store, run one public query as an anonymous caller, and print
//!   the records as JSON lines.
//! - Keep the core's error kinds visible on failure.

use clap::{Parser, Subcommand};
use jobly_core::{
    Caller, CompanyService, FilterRequest, JobId, JobService, SqliteCompanyRepository,
    SqliteJobRepository,
};
use log::error;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Query command run without `--db` or `JOBLY_DB`.
#[derive(Debug)]
struct MissingDatabase;

impl Display for MissingDatabase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "database path required: pass --db or set JOBLY_DB")
    }
}

impl Error for MissingDatabase {}

#[derive(Parser)]
#[command(name = "jobly")]
#[command(author, version, about = "Jobly job board store CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// SQLite database file; required by every command except `ping`
    #[arg(long, env = "JOBLY_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "JOBLY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files; logging is off when omitted
    #[arg(long, env = "JOBLY_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health and version
    Ping,

    /// List jobs
    Jobs {
        /// Case-insensitive title substring
        #[arg(long)]
        title: Option<String>,

        /// Minimum salary, inclusive
        #[arg(long)]
        min_salary: Option<i64>,

        /// `true` for jobs with non-zero equity, `false` for zero equity
        #[arg(long)]
        has_equity: Option<String>,
    },

    /// Show one job
    Job { id: JobId },

    /// List companies
    Companies {
        /// Case-insensitive name substring
        #[arg(long)]
        name: Option<String>,

        /// Minimum employee count, inclusive
        #[arg(long)]
        min_emp: Option<i64>,

        /// Maximum employee count, inclusive
        #[arg(long)]
        max_emp: Option<i64>,
    },

    /// Show one company with its jobs
    Company { handle: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| jobly_core::default_log_level());
        jobly_core::init_logging(level, log_dir)?;
    }

    if let Commands::Ping = cli.command {
        println!("jobly_core ping={}", jobly_core::ping());
        println!("jobly_core version={}", jobly_core::core_version());
        return Ok(());
    }

    let conn = open_store(cli.db)?;
    let caller = Caller::Anonymous;

    match cli.command {
        Commands::Ping => {}
        Commands::Jobs {
            title,
            min_salary,
            has_equity,
        } => {
            let filters = collect_filters([
                ("title", title),
                ("minSalary", min_salary.map(|value| value.to_string())),
                ("hasEquity", has_equity),
            ]);
            let service = JobService::new(SqliteJobRepository::new(&conn));
            for job in service.find_all(&caller, Some(&filters))? {
                print_json(&job)?;
            }
        }
        Commands::Job { id } => {
            let service = JobService::new(SqliteJobRepository::new(&conn));
            print_json(&service.get(&caller, id)?)?;
        }
        Commands::Companies {
            name,
            min_emp,
            max_emp,
        } => {
            let filters = collect_filters([
                ("name", name),
                ("minEmp", min_emp.map(|value| value.to_string())),
                ("maxEmp", max_emp.map(|value| value.to_string())),
            ]);
            let service = CompanyService::new(SqliteCompanyRepository::new(&conn));
            for company in service.find_all(&caller, Some(&filters))? {
                print_json(&company)?;
            }
        }
        Commands::Company { handle } => {
            let service = CompanyService::new(SqliteCompanyRepository::new(&conn));
            print_json(&service.get(&caller, &handle)?)?;
        }
    }
    Ok(())
}

fn open_store(path: Option<PathBuf>) -> CliResult<Connection> {
    let path = path.ok_or(MissingDatabase)?;
    Ok(jobly_core::open_db(path)?)
}

fn collect_filters<const N: usize>(pairs: [(&str, Option<String>); N]) -> FilterRequest {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
        .collect()
}

fn print_json(record: &impl Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}
