mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use commands::ask::AskArgs;
use commands::reports::Report;
use quill::config::Settings;
use quill::providers::factory::ProviderType;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory reports are written to (can also be set via QUILL_OUTPUT_DIR, defaults to ./rez)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Print results without writing report files
    #[arg(long, global = true)]
    no_save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one of the built-in reports
    Run {
        /// Report name, see `quill list`
        #[arg(value_parser = parse_report)]
        report: Report,
    },

    /// Send a one-off prompt to a provider
    Ask {
        /// Provider to use (groq or google)
        #[arg(short, long, default_value = "groq", value_parser = parse_provider)]
        provider: ProviderType,

        /// Model to use, defaults to the provider's default model
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt
        #[arg(long)]
        system: Option<String>,

        /// Ground the answer in web search results
        #[arg(long)]
        search: bool,

        /// Save the answer as a markdown report
        #[arg(long)]
        save: bool,

        /// The prompt
        prompt: String,
    },

    /// List built-in reports and providers
    List,
}

fn parse_report(name: &str) -> Result<Report, String> {
    name.parse()
        .map_err(|_| format!("unknown report '{}', see `quill list`", name))
}

fn parse_provider(name: &str) -> Result<ProviderType, String> {
    name.parse()
        .map_err(|_| format!("unknown provider '{}', expected groq or google", name))
}

#[tokio::main]
async fn main() {
    let env_file = dotenv::dotenv().ok();
    init_tracing();
    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{} {:#}", style("💥 Error:").red().bold(), err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::new().context("Failed to load settings")?;
    let output_dir = cli.output_dir.unwrap_or(settings.output_dir);
    let save = settings.save && !cli.no_save;

    match cli.command {
        Command::Run { report } => commands::run::execute(report, &output_dir, save).await,
        Command::Ask {
            provider,
            model,
            system,
            search,
            save: save_answer,
            prompt,
        } => {
            let args = AskArgs {
                provider,
                model,
                prompt,
                system,
                search,
                save: save_answer && save,
            };
            commands::ask::execute(args, &output_dir).await
        }
        Command::List => {
            commands::list::execute();
            Ok(())
        }
    }
}
