//! Lookout CLI binary entry point.

use std::io::Write;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use lookout::chat::ChatSession;
use lookout::cli::{AskArgs, Cli, Commands, SessionArgs};
use lookout::config::LookoutConfig;
use lookout::dispatch::Dispatcher;
use lookout::report::{ProgressReporter, TerminalSink};
use lookout::tools::ToolRegistry;

const BANNER: &str = "🔎 Lookout - Chat with Search";
const PLACEHOLDER: &str = "What is machine learning?";

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args).await,
        Commands::Ask(args) => handle_ask(args).await,
        Commands::Tools => handle_tools(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = std::env::var("LOOKOUT_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &SessionArgs) -> lookout::Result<LookoutConfig> {
    let mut config = LookoutConfig::load()?;
    args.apply(&mut config);
    Ok(config)
}

fn new_chat(config: &LookoutConfig) -> (ChatSession, ProgressReporter<TerminalSink<std::io::Stdout>>) {
    let chat = ChatSession::new(Dispatcher::from_config(config), config.greeting.clone());
    let sink = TerminalSink::new(std::io::stdout()).expanded(config.expand_thoughts);
    (chat, ProgressReporter::new(sink))
}

async fn handle_chat(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    if !config.has_credentials("groq") {
        eprintln!("No Groq API key set; pass --api-key or set GROQ_API_KEY.");
    }

    let (mut chat, mut reporter) = new_chat(&config);
    println!("{BANNER}\n");
    reporter.replay(chat.session());
    println!("(try: {PLACEHOLDER}  |  /exit to quit)");

    let mut interrupts = watch_interrupts();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        // Ctrl-C at the prompt ends the session.
        let read = tokio::select! {
            read = lines.next_line() => read?,
            _ = interrupts.recv() => None,
        };
        let Some(line) = read else {
            println!();
            break;
        };
        let line = line.trim();
        if line == "/exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        // Ctrl-C during a turn cancels only that turn.
        chat.submit_interruptible(line, &mut reporter, &mut interrupts).await;
    }

    tracing::info!(turns = chat.session().len(), "chat session ended");
    Ok(())
}

/// One SIGINT listener for the whole session; each Ctrl-C is one message.
fn watch_interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

async fn handle_ask(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.session)?;
    let (mut chat, mut reporter) = new_chat(&config);

    let outcome = chat.submit(&args.question, &mut reporter).await;
    if outcome.is_failed() {
        std::process::exit(2);
    }
    Ok(())
}

fn handle_tools() -> Result<(), Box<dyn std::error::Error>> {
    let config = LookoutConfig::load()?;
    for def in ToolRegistry::standard(&config).manifest() {
        println!("{}\n    {}\n", def.name, def.description);
    }
    Ok(())
}
