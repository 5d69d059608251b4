use anyhow::{Context as _, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use sifter::analyser::logic::filter::parse_rule;
use sifter::analyser::logic::{CleanRequest, FilterRequest, MissingMethod, TransformRequest};
use sifter::commands::export::ExportParams;
use sifter::commands::{AppState, analysis, dispatch_line, export, lifecycle};
use sifter::config::{get_config_path, save_app_config};
use sifter::export::ExportFormat;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};

#[derive(Parser)]
#[command(
    name = "sifter",
    version,
    about = "Profile, clean, filter and export tabular datasets"
)]
pub struct Cli {
    /// Path to a JSON configuration file. Defaults to <config_dir>/sifter/config.json.
    #[arg(long, global = true, env = "SIFTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level filter (overrides the configuration file).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the profile of a CSV file
    Profile {
        /// CSV file to analyse
        file: PathBuf,
    },
    /// Clean a CSV file and print the operations log
    Clean {
        file: PathBuf,

        #[command(flatten)]
        options: CleanArgs,

        /// Write the cleaned data to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Standardize, normalize or log-transform numeric columns
    Transform {
        file: PathBuf,

        /// Z-score every numeric column
        #[arg(long)]
        standardize: bool,

        /// Min-max scale every numeric column to [0, 1]
        #[arg(long)]
        normalize: bool,

        /// Apply ln(1 + x) to this column (repeatable)
        #[arg(long = "log", value_name = "COLUMN")]
        log_columns: Vec<String>,

        /// Write the transformed data to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Preview the rows matching every rule
    Filter {
        file: PathBuf,

        /// Rule of the form "column operator value", e.g. "age > 30" (repeatable)
        #[arg(long = "rule", required = true)]
        rules: Vec<String>,
    },
    /// Correlation and clustering insights
    Insights {
        file: PathBuf,

        /// Also ask the configured narrator for a written summary
        #[arg(long)]
        narrate: bool,
    },
    /// 3D scatter and surface projections of numeric columns
    Visualize { file: PathBuf },
    /// Render a CSV, Excel or PDF export
    Export {
        file: PathBuf,

        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Output path. Defaults to the format's file name in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Answer JSON-lines requests on stdin, one response line per request
    Serve,
    /// Print the effective configuration and log file location
    Config {
        /// Write the effective configuration to the default config path
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
#[command(group(ArgGroup::new("missing").args(["drop_missing", "fill_mean", "fill_median"])))]
pub struct CleanArgs {
    /// Drop rows with any missing cell
    #[arg(long)]
    drop_missing: bool,

    /// Fill missing numeric cells with the column mean
    #[arg(long)]
    fill_mean: bool,

    /// Fill missing numeric cells with the column median
    #[arg(long)]
    fill_median: bool,

    /// Remove rows outside the IQR fences of any numeric column
    #[arg(long)]
    remove_outliers: bool,

    /// Remove repeated rows, keeping the first occurrence
    #[arg(long)]
    remove_duplicates: bool,
}

impl From<CleanArgs> for CleanRequest {
    fn from(args: CleanArgs) -> Self {
        let missing_method = if args.fill_mean {
            MissingMethod::FillMean
        } else if args.fill_median {
            MissingMethod::FillMedian
        } else {
            MissingMethod::Drop
        };
        Self {
            handle_missing: args.drop_missing || args.fill_mean || args.fill_median,
            missing_method,
            remove_outliers: args.remove_outliers,
            remove_duplicates: args.remove_duplicates,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn load(state: &AppState, file: PathBuf) -> Result<()> {
    let display = file.display().to_string();
    analysis::upload(state, analysis::UploadParams::from_path(file))
        .await
        .with_context(|| format!("Failed to load {display}"))?;
    Ok(())
}

async fn save_csv(state: &AppState, output: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output {
        let params = ExportParams {
            format: ExportFormat::Csv,
            path: Some(path.clone()),
        };
        export::export(state, params).await?;
        tracing::info!("Saved result to {}", path.display());
    }
    Ok(())
}

pub async fn run_command(command: Commands, state: AppState) -> Result<()> {
    match command {
        Commands::Profile { file } => {
            load(&state, file).await?;
            print_json(&analysis::profile(&state)?)
        }
        Commands::Clean {
            file,
            options,
            output,
        } => {
            load(&state, file).await?;
            let response = lifecycle::clean(&state, options.into()).await?;
            save_csv(&state, output).await?;
            print_json(&response)
        }
        Commands::Transform {
            file,
            standardize,
            normalize,
            log_columns,
            output,
        } => {
            load(&state, file).await?;
            let request = TransformRequest {
                standardize,
                normalize,
                log_transform: !log_columns.is_empty(),
                log_columns,
            };
            let response = lifecycle::transform(&state, request).await?;
            save_csv(&state, output).await?;
            print_json(&response)
        }
        Commands::Filter { file, rules } => {
            let filters = rules
                .iter()
                .map(|rule| parse_rule(rule))
                .collect::<sifter::error::Result<Vec<_>>>()?;
            load(&state, file).await?;
            print_json(&analysis::filter(&state, FilterRequest { filters }).await?)
        }
        Commands::Insights { file, narrate } => {
            load(&state, file).await?;
            print_json(&analysis::predictive_insights(&state).await?)?;
            if narrate {
                print_json(&sifter::commands::ai::insights(&state).await?)?;
            }
            Ok(())
        }
        Commands::Visualize { file } => {
            load(&state, file).await?;
            print_json(&analysis::visualizations(&state).await?)
        }
        Commands::Export {
            file,
            format,
            output,
        } => {
            load(&state, file).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format.file_name()));
            let params = ExportParams {
                format,
                path: Some(path),
            };
            print_json(&export::export(&state, params).await?)
        }
        Commands::Serve => serve(&state).await,
        Commands::Config { write } => show_config(&state, write),
    }
}

fn show_config(state: &AppState, write: bool) -> Result<()> {
    if write {
        let path = get_config_path().context("No configuration directory on this platform")?;
        save_app_config(&state.config, &path)?;
        tracing::info!("Wrote configuration to {}", path.display());
    }
    print_json(&state.config)?;
    if state.config.logging.file_logging {
        let log_path = sifter::logging::get_current_log_path(&state.config.logging)?;
        println!("Log file: {}", log_path.display());
    }
    Ok(())
}

/// Reads one JSON request per line from stdin until EOF. Requests are
/// handled in order; blank lines are skipped.
async fn serve(state: &AppState) -> Result<()> {
    tracing::info!(version = sifter::commands::system::app_version(), "Serving requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch_line(state, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await.context("Failed to write response")?;
        stdout.flush().await?;
    }

    tracing::info!("Input closed; shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clean_flags_map_to_request() {
        let cli = Cli::parse_from([
            "sifter",
            "clean",
            "data.csv",
            "--fill-median",
            "--remove-duplicates",
        ]);
        let Commands::Clean { options, .. } = cli.command else {
            panic!("expected clean");
        };
        let request = CleanRequest::from(options);
        assert!(request.handle_missing);
        assert_eq!(request.missing_method, MissingMethod::FillMedian);
        assert!(request.remove_duplicates);
        assert!(!request.remove_outliers);
    }

    #[test]
    fn test_missing_methods_conflict() {
        let parsed =
            Cli::try_parse_from(["sifter", "clean", "data.csv", "--drop-missing", "--fill-mean"]);
        assert!(parsed.is_err());
    }
}
