//! Lookout: a chat session manager whose answers can draw on web search,
//! Wikipedia and arXiv.
//!
//! A [`ChatSession`](chat::ChatSession) owns the turn history. Each user
//! message is handed to a [`Dispatcher`](dispatch::Dispatcher), which runs a
//! [`ReasoningEngine`](engine::ReasoningEngine) against the full history and
//! the shared [`ToolRegistry`](tools::ToolRegistry), streaming tool activity
//! to a [`ProgressReporter`](report::ProgressReporter) as it happens.
//!
//! ```no_run
//! use lookout::prelude::*;
//!
//! # async fn example() -> lookout::Result<()> {
//! let config = LookoutConfig::load()?;
//! let mut chat = ChatSession::new(Dispatcher::from_config(&config), config.greeting.clone());
//! let mut reporter = ProgressReporter::new(TerminalSink::new(std::io::stdout()));
//!
//! reporter.replay(chat.session());
//! chat.submit("What is machine learning?", &mut reporter).await;
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod report;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{LookoutError, Result};
