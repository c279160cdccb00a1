//! Command-line interface for Lookout.

use clap::{Args, Parser, Subcommand};

use crate::config::LookoutConfig;

/// Chat with an assistant that can search the web.
#[derive(Parser, Debug)]
#[command(name = "lookout", version, about = "Lookout - chat with search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat(SessionArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
    /// List the tools the assistant can call
    Tools,
}

/// Options shared by every command that talks to the model.
#[derive(Args, Debug, Default, Clone)]
pub struct SessionArgs {
    /// Model to use (defaults to the configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Groq API key (defaults to GROQ_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Show thoughts, queries and tool results instead of a summary
    #[arg(short, long)]
    pub expand_thoughts: bool,

    /// Maximum reasoning iterations per question
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl SessionArgs {
    /// Layer these flags over `config`.
    pub fn apply(&self, config: &mut LookoutConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(key) = &self.api_key {
            config.set_api_key("groq", key.as_str());
        }
        if self.expand_thoughts {
            config.expand_thoughts = true;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
    }
}

/// Arguments for `lookout ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// The question to answer
    pub question: String,
}
