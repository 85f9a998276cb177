mod router;

use aide_adapters::{GmailMailer, GoogleCalendar, OutlookCalendar};
use aide_channels::{TelegramChannel, WhisperTranscriber};
use aide_classify::{Classifier, Decision, ParseOutcome};
use aide_core::{
    config,
    event::CalendarProvider,
    traits::{Calendar, Channel, Completion, Mailer, Transcriber},
};
use aide_providers::OpenAiCompletion;
use aide_session::{ConversationMemory, CredentialStore, EscalationMailbox};
use chrono::Utc;
use clap::{Parser, Subcommand};
use router::{Router, Stages};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "aide",
    version,
    about = "Aide — conversational scheduling assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the assistant.
    Start,
    /// Check configuration and channel availability.
    Status,
    /// Classify a one-shot message and print the resulting action.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.aide.log_level)),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let completion = build_completion(&cfg)?;

            // Build channels.
            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. \
                             Set it in config.toml."
                        );
                    }
                    let transcriber: Option<Arc<dyn Transcriber>> =
                        if tg.transcription_api_key.is_empty() {
                            None
                        } else {
                            Some(Arc::new(WhisperTranscriber::new(&tg.transcription_api_key)))
                        };
                    let channel = TelegramChannel::new(tg.clone(), transcriber);
                    channels.insert("telegram".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            // Build calendar adapters, one per provider.
            let mut calendars: HashMap<CalendarProvider, Arc<dyn Calendar>> = HashMap::new();
            calendars.insert(
                CalendarProvider::Google,
                Arc::new(GoogleCalendar::new(cfg.oauth.google.clone())),
            );
            calendars.insert(
                CalendarProvider::Outlook,
                Arc::new(OutlookCalendar::new(cfg.oauth.outlook.clone())),
            );

            let mailer: Option<Arc<dyn Mailer>> = if cfg.mail.enabled {
                Some(Arc::new(GmailMailer::new(cfg.oauth.google.clone())))
            } else {
                None
            };

            println!("Aide — starting {}...", cfg.aide.name);
            let router = Router::new(
                Classifier::new(completion),
                ConversationMemory::new(),
                CredentialStore::new(),
                EscalationMailbox::new(),
                channels,
                calendars,
                mailer,
                cfg.oauth.clone(),
                Stages::default(),
            );
            Arc::new(router).run().await?;
        }
        Commands::Status => {
            println!("Aide — Status Check\n");
            println!("Config: {}", cli.config);
            println!(
                "  completion: {} ({})",
                cfg.completion.model,
                if cfg.completion.api_key.is_empty() {
                    "missing api_key"
                } else {
                    "configured"
                }
            );

            if let Some(ref tg) = cfg.channel.telegram {
                println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                );
            } else {
                println!("  telegram: not configured");
            }

            println!(
                "  google oauth: {}",
                if cfg.oauth.google.client_id.is_empty() {
                    "missing client_id"
                } else {
                    "configured"
                }
            );
            println!(
                "  outlook oauth: {}",
                if cfg.oauth.outlook.client_id.is_empty() {
                    "missing client_id"
                } else {
                    "configured"
                }
            );
            println!(
                "  mail: {}",
                if cfg.mail.enabled { "enabled" } else { "disabled" }
            );
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: aide ask <message>");
            }

            let prompt = message.join(" ");
            let completion = build_completion(&cfg)?;
            let classifier = Classifier::new(completion);

            let transcript = format!("User: {prompt}");
            match classifier.classify(&transcript, Utc::now()).await? {
                ParseOutcome::Malformed(raw) => println!("{raw}"),
                ParseOutcome::Parsed(Decision::Reply { text })
                | ParseOutcome::Parsed(Decision::AskForDetails { text }) => println!("{text}"),
                ParseOutcome::Parsed(Decision::Ignore) => println!("(ignored)"),
                ParseOutcome::Parsed(Decision::Escalate { subject, .. }) => {
                    println!("(would escalate: {subject})");
                }
                ParseOutcome::Parsed(Decision::ScheduleMeeting(request)) => {
                    println!(
                        "(would schedule: {} {} - {} [{}] via {})",
                        request.summary,
                        request.start,
                        request.end,
                        request.timezone,
                        request.provider.name()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Build the completion backend.
fn build_completion(cfg: &config::Config) -> anyhow::Result<Arc<dyn Completion>> {
    if cfg.completion.api_key.is_empty() {
        anyhow::bail!(
            "completion api_key is empty. Set it in config.toml under [completion]."
        );
    }
    Ok(Arc::new(OpenAiCompletion::from_config(&cfg.completion)))
}
