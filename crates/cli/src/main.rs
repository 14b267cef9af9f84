// landpermit CLI - headless evaluation of land-transfer permit forms

mod compute;
mod exit_codes;
mod inspect;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{config_exit_code, engine_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "landpermit")]
#[command(about = "Land-transfer permit form valuation (headless)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a saved form session and print valuations and totals
    #[command(after_help = "\
Examples:
  landpermit compute session.json
  landpermit compute session.json --json
  landpermit compute session.json --config multi.toml --output report.json")]
    Compute {
        /// Saved session (JSON)
        session: PathBuf,

        /// Form config (TOML); defaults to the user config file
        #[arg(long, env = "LANDPERMIT_CONFIG")]
        config: Option<PathBuf>,

        /// Print the JSON report instead of the summary table
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show how a land-area value is read
    #[command(after_help = "\
Examples:
  landpermit parse-area 35.9790/36645.30
  landpermit parse-area '1,234.5' --json")]
    ParseArea {
        raw: String,

        #[arg(long)]
        json: bool,
    },

    /// Decompose a 19-digit parcel number, or build one from its parts
    #[command(after_help = "\
Examples:
  landpermit pnu 1168010100107360001
  landpermit pnu --adm-code 1168010100 --bun 736 --ji 1")]
    Pnu {
        #[arg(required_unless_present = "adm_code", conflicts_with = "adm_code")]
        code: Option<String>,

        /// 10-digit legal-dong code
        #[arg(long)]
        adm_code: Option<String>,

        /// Main lot number
        #[arg(long, requires = "adm_code")]
        bun: Option<String>,

        /// Sub lot number
        #[arg(long, requires = "adm_code")]
        ji: Option<String>,

        /// Lot is on the mountain register
        #[arg(long, requires = "adm_code")]
        mountain: bool,

        #[arg(long)]
        json: bool,
    },

    /// Form configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the default config file location
    Path,
    /// Print the effective config as TOML
    Show {
        #[arg(long, env = "LANDPERMIT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit: ",
        env!("GIT_COMMIT_HASH"),
        "\ntarget: ",
        env!("TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("landpermit_engine=debug,landpermit_recon=debug,info"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compute {
            session,
            config,
            json,
            output,
        } => compute::cmd_compute(session, config, json, output),
        Commands::ParseArea { raw, json } => inspect::cmd_parse_area(&raw, json),
        Commands::Pnu {
            code,
            adm_code,
            bun,
            ji,
            mountain,
            json,
        } => match adm_code {
            Some(adm_code) => inspect::cmd_pnu_compose(
                &adm_code,
                mountain,
                bun.as_deref().unwrap_or_default(),
                ji.as_deref().unwrap_or_default(),
                json,
            ),
            None => inspect::cmd_pnu(code.as_deref().unwrap_or_default(), json),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Path => inspect::cmd_config_path(),
            ConfigCommands::Show { config } => inspect::cmd_config_show(config),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn config(err: landpermit_config::ConfigError) -> Self {
        let hint = match &err {
            landpermit_config::ConfigError::Validation(msg) if msg.contains("derived") => {
                Some("multi-parcel forms need valuation_mode = \"direct\"".to_string())
            }
            _ => None,
        };
        Self {
            code: config_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }

    pub fn engine(err: landpermit_engine::EngineError) -> Self {
        let hint = match &err {
            landpermit_engine::EngineError::ParcelOutOfRange { .. } => {
                Some("raise parcel_count in the form config".to_string())
            }
            _ => None,
        };
        Self {
            code: engine_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
