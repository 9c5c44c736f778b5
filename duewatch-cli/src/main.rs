use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use duewatch_core::TopicRegistry;
use tracing::{error, info};

mod checkrun;
mod config;
mod scheduler;
mod sheets_api;
mod telegram;

use checkrun::check_deadlines;
use config::{Config, load_config, registry_path};
use sheets_api::SheetsClient;
use telegram::TelegramClient;

#[derive(Parser, Debug)]
#[command(name = "duewatch", version, about = "Spreadsheet deadline reminders for Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file under ~/.duewatch
    Init,

    /// Run one reminder pass now
    Check,

    /// Run the daily scheduler loop (one pass per day at message_time)
    Run,

    /// Manage the area -> topic routing map
    Topic {
        #[command(subcommand)]
        command: TopicCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TopicCommand {
    /// Route an area's messages to a forum topic
    Set {
        chat_id: i64,
        area: String,
        topic_id: i64,
    },

    /// Show where an area currently routes
    Get { chat_id: i64, area: String },

    /// Re-key the area holding a topic id after a topic rename
    Rename {
        chat_id: i64,
        topic_id: i64,
        new_area: String,
    },

    /// List all routed areas for a chat
    List { chat_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Check => {
            let cfg = load_config()?;
            cfg.require_credentials()?;
            run_pass(&cfg).await?;
        }

        Command::Run => {
            let cfg = load_config()?;
            cfg.require_credentials()?;
            run_daily(&cfg).await?;
        }

        Command::Topic { command } => {
            let registry = TopicRegistry::new(registry_path()?);
            match command {
                TopicCommand::Set {
                    chat_id,
                    area,
                    topic_id,
                } => {
                    registry.set(chat_id, &area, topic_id)?;
                    println!("{} -> topic {} (chat {})", area.trim(), topic_id, chat_id);
                }
                TopicCommand::Get { chat_id, area } => match registry.get(chat_id, &area) {
                    Some(topic_id) => println!("{}", topic_id),
                    None => println!("(unmapped)"),
                },
                TopicCommand::Rename {
                    chat_id,
                    topic_id,
                    new_area,
                } => {
                    if registry.rename(chat_id, topic_id, &new_area)? {
                        println!("topic {} now routes area '{}'", topic_id, new_area.trim());
                    } else {
                        println!("no area holds topic {} in chat {}", topic_id, chat_id);
                    }
                }
                TopicCommand::List { chat_id } => {
                    let areas = registry.areas(chat_id);
                    if areas.is_empty() {
                        println!("(no areas routed for chat {})", chat_id);
                    }
                    for (area, topic_id) in areas {
                        println!("{area} -> {topic_id}");
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_pass(cfg: &Config) -> Result<()> {
    let sheets = SheetsClient::new(cfg.sheets_api_key.clone());
    let telegram = TelegramClient::new(cfg.bot_token.clone());
    let registry = TopicRegistry::new(registry_path()?);

    let tz = scheduler::parse_timezone(&cfg.timezone)?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    check_deadlines(cfg, &sheets, &telegram, &registry, today).await
}

async fn run_daily(cfg: &Config) -> Result<()> {
    let at = scheduler::parse_send_time(&cfg.message_time)?;
    let tz = scheduler::parse_timezone(&cfg.timezone)?;

    loop {
        let now = Utc::now();
        let next = scheduler::next_run_after(now, at, tz);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, "sleeping until next pass");
        tokio::time::sleep(wait).await;

        // A failed pass is reported and the loop keeps its cadence.
        if let Err(err) = run_pass(cfg).await {
            error!(%err, "reminder pass failed");
        }
    }
}
