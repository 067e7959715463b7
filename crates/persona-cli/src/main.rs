use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use persona_core::{
    AppConfig, ChatSession, HttpRecommendClient, Locale, ModelType, RecommendClient,
    RecommendRequest,
};

mod logging;
mod output;
mod tui;

/// Persona Chat - restaurant recommendations from a description of yourself
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./persona.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Recommendation endpoint URL
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// UI language (ko, en)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Number of recommendations to request
    #[arg(short = 'k', long, global = true)]
    top_k: Option<u32>,

    /// Scoring model (review, hybrid)
    #[arg(short, long, global = true)]
    model: Option<ModelType>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,

    /// Run a single turn and print the result
    Ask {
        /// Free-text description of yourself
        text: String,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config =
            AppConfig::load(self.config.as_deref()).context("failed to load configuration")?;

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(model) = self.model {
            config.model_type = model;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Chat);

    let target = match (&cli.log_file, &command) {
        (Some(path), _) => logging::LogTarget::File(path.clone()),
        (None, Commands::Chat) => logging::LogTarget::Discard,
        (None, _) => logging::LogTarget::Stderr,
    };
    logging::init(cli.verbose, target)?;

    let config = cli.resolve_config()?;
    tracing::debug!(?config, "effective configuration");

    match command {
        Commands::Chat => {
            let client = build_client(&config)?;
            let session = ChatSession::new(client, &config);
            tui::run_tui(session).await?;
        }
        Commands::Ask { text, json } => {
            if text.trim().is_empty() {
                anyhow::bail!("nothing to send: input text is empty");
            }
            let client = build_client(&config)?;
            if json {
                let mut request =
                    RecommendRequest::new(text.trim()).with_top_k(config.top_k);
                if config.send_model_type {
                    request = request.with_model_type(config.model_type);
                }
                let result = client.recommend(&request).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let mut session = ChatSession::new(client, &config);
                session.submit(&text).await;
                output::print_lines(&session.render());
                if session.transcript().last().is_some_and(|m| m.is_error()) {
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn build_client(config: &AppConfig) -> anyhow::Result<Arc<dyn RecommendClient>> {
    let client = HttpRecommendClient::new(config).context("failed to build recommendation client")?;
    Ok(Arc::new(client))
}
