//! Support RAG CLI - serve the HTTP API, or ask questions directly.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use support_api::{AppState, BotState};
use support_bot::{Chatbot, ConversationTurn};
use support_core::BotConfig;

/// Customer support chatbot over a fixed knowledge base
#[derive(Parser)]
#[command(name = "support-rag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/support-rag/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve,

    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,
    },

    /// Interactive chat with in-process history
    Chat,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<&PathBuf>) -> Result<BotConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::load_default()?,
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Ask { question } => ask(config, &question).await?,
        Commands::Chat => chat(config).await?,
    }

    Ok(())
}

async fn serve(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    // A chatbot that fails to come up still serves health and a 503 on
    // queries, so operators can see the failure instead of a dead port.
    let bot_state = match Chatbot::from_config(&config).await {
        Ok(bot) => BotState::Ready(Arc::new(bot)),
        Err(e) => {
            error!("Chatbot failed to start: {}", e);
            BotState::Failed(e.to_string())
        }
    };

    let state = Arc::new(AppState::new(bot_state));
    support_api::serve(state, &config.server.bind_address).await?;

    Ok(())
}

async fn ask(config: BotConfig, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bot = Chatbot::from_config(&config).await?;
    let answer = bot.answer(question, &[]).await;
    println!("{}", answer);
    Ok(())
}

async fn chat(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bot = Chatbot::from_config(&config).await?;
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!("Support chat. Type 'exit' or press Ctrl-D to quit.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let answer = bot.answer(question, &history).await;
        println!("{}\n", answer);

        history.push(ConversationTurn::new(question, answer.as_str()));
    }

    Ok(())
}
