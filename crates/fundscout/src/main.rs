use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fundscout::cli::commands::{self, SubmitOptions};
use fundscout::cli::display;
use fundscout::{Config, FormError};

#[derive(Parser)]
#[command(name = "fundscout")]
#[command(
  about = "Fundscout - Film Funding Application Client\nMatch a film project against funding opportunities and export the results"
)]
#[command(version)]
struct Cli {
  /// YAML configuration file
  #[arg(long, global = true, env = "FUNDSCOUT_CONFIG")]
  config: Option<PathBuf>,

  /// Server origin, overriding the configuration
  #[arg(long, global = true)]
  server: Option<String>,

  /// Show debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Submit a project for fund recommendations
  Submit {
    /// Form file (YAML or JSON)
    #[arg(short, long)]
    form: PathBuf,
    /// Download the results as a PDF after a successful submit
    #[arg(short, long)]
    export: bool,
    /// Also write the results markup to this file
    #[arg(long)]
    html: Option<PathBuf>,
    /// Directory the PDF is saved to
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// Render a saved submit response without contacting the server
  Render {
    /// JSON body returned by the submit endpoint
    response: PathBuf,
    /// Also write the results markup to this file
    #[arg(long)]
    html: Option<PathBuf>,
  },
  /// Check a form file and print the payload that would be sent
  Validate {
    /// Form file (YAML or JSON)
    #[arg(short, long)]
    form: PathBuf,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "fundscout=debug" } else { "fundscout=warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn load_config(path: Option<&Path>, server: Option<String>, out: Option<PathBuf>) -> Result<Config> {
  let mut config = Config::load(path)?;
  if let Some(server) = server {
    config.server_url = server;
  }
  if let Some(out) = out {
    config.download_dir = out;
  }
  config.validate()?;
  Ok(config)
}

async fn handle(cli: Cli) -> Result<()> {
  match cli.command {
    Command::Submit { form, export, html, out } => {
      let config = load_config(cli.config.as_deref(), cli.server, out)?;
      commands::submit(&config, &form, SubmitOptions { export, html: html.as_deref() }).await
    }
    Command::Render { response, html } => commands::render_saved(&response, html.as_deref()),
    Command::Validate { form } => commands::validate(&form),
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match handle(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      // Form errors were already shown by the view
      if err.downcast_ref::<FormError>().is_none() {
        display::error(&format!("{err:#}"));
      }
      ExitCode::FAILURE
    }
  }
}
