use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod app;
mod config;
mod conversation;
mod gallery;
mod generator;
mod handler;
mod input;
mod logging;
mod login;
mod message;
mod strategy;
mod tui;
mod ui;

use app::{App, Screen};
use config::Config;
use conversation::{Conversation, TurnOutcome};
use strategy::Strategy;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chatterm", version)]
#[command(about = "Chat with an AI assistant in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Reply strategy
    #[arg(short, long, global = true, value_parser = ["mock", "openai"])]
    strategy: Option<String>,

    /// Model used by the openai strategy
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Chat completions endpoint used by the openai strategy
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Preferred reply tone
    #[arg(long, global = true)]
    tone: Option<String>,

    /// Preferred reply length
    #[arg(long, global = true)]
    length: Option<String>,

    /// Whether replies should include examples
    #[arg(long, global = true)]
    examples: Option<String>,

    /// Preferred reply language
    #[arg(long, global = true)]
    language: Option<String>,

    /// Screen to open first
    #[arg(long, default_value = "chat", value_parser = ["chat", "login", "gallery"])]
    screen: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Send {
        /// Your message
        message: String,
    },
    /// Write the current settings to the config file
    InitConfig,
}

impl Cli {
    /// Command line values take precedence over the config file
    fn apply(&self, config: &mut Config) {
        let overrides = [
            (&self.strategy, &mut config.strategy),
            (&self.model, &mut config.model),
            (&self.endpoint, &mut config.endpoint),
            (&self.tone, &mut config.preferences.tone),
            (&self.length, &mut config.preferences.length),
            (&self.examples, &mut config.preferences.examples),
            (&self.language, &mut config.preferences.language),
        ];
        for (value, slot) in overrides {
            if value.is_some() {
                *slot = value.clone();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    cli.apply(&mut config);

    match &cli.command {
        Some(Commands::InitConfig) => {
            let path = config.save()?;
            println!("Wrote {}", path.display());
        }
        Some(Commands::Send { message }) => {
            logging::init_stderr(config.log_level.as_deref())?;
            send_once(&config, message).await?;
        }
        None => {
            let _guard = logging::init_file(config.log_level.as_deref())?;
            let screen = Screen::from_str(&cli.screen).unwrap_or(Screen::Chat);
            run_tui(&config, screen).await?;
        }
    }

    Ok(())
}

fn build_conversation(config: &Config) -> Conversation {
    let api_key = Config::api_key_from_env();
    if config.strategy() == Strategy::OpenAI && api_key.is_none() {
        warn!("{} is not set; replies will be an advisory message", config::API_KEY_ENV);
    }
    Conversation::new(generator::from_config(config, api_key))
}

async fn send_once(config: &Config, message: &str) -> Result<()> {
    let mut conversation = build_conversation(config);
    let outcome = conversation.send(message).await?;

    if let Some(reply) = conversation.messages().last() {
        println!("{}", reply.content);
    }
    if outcome == TurnOutcome::Failed {
        bail!("reply generation failed; run with {}=debug for details", logging::LOG_ENV);
    }
    Ok(())
}

async fn run_tui(config: &Config, screen: Screen) -> Result<()> {
    let conversation = build_conversation(config);
    info!(generator = %conversation.generator_label(), "starting chat session");
    let mut app = App::new(conversation, config.strategy(), screen);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(tui::TICK_RATE);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!(messages = app.conversation.messages().len(), "chat session ended");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
