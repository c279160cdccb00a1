//! One interactive conversation: session state plus the turn state machine.

use futures::StreamExt;
use strum::Display;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::{DispatchEvent, Dispatcher, FAILURE_PREFIX};
use crate::report::{DisplaySink, ProgressReporter};
use crate::session::{Session, Turn};

/// Answer recorded when a dispatch ends without producing one.
pub const NO_ANSWER: &str = "Agent failed: dispatch ended without an answer";

/// Where a chat session is within one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    AwaitingInput,
    Dispatching,
    StreamingEvents,
    Completed,
    Failed,
}

/// Result of submitting one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The engine answered; the answer was appended.
    Completed { answer: String },
    /// The dispatch failed; the error text was appended in place of an answer.
    Failed { message: String },
    /// Blank input; nothing was appended.
    Ignored,
}

impl TurnOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The assistant text appended for this turn, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Completed { answer } => Some(answer),
            Self::Failed { message } => Some(message),
            Self::Ignored => None,
        }
    }
}

/// A session driven by user messages, one at a time.
///
/// Each submitted message is appended as a user turn, dispatched with the
/// full history, and followed by exactly one assistant turn once the outcome
/// is known. Nothing is appended while a dispatch is still streaming, so an
/// abandoned or aborted dispatch never leaves a partial answer behind.
#[derive(Debug)]
pub struct ChatSession {
    session: Session,
    dispatcher: Dispatcher,
    state: TurnState,
}

impl ChatSession {
    pub fn new(dispatcher: Dispatcher, greeting: impl Into<String>) -> Self {
        Self::with_session(dispatcher, Session::new(greeting))
    }

    pub fn with_session(dispatcher: Dispatcher, session: Session) -> Self {
        info!(session = %session.id(), "chat session started");
        Self {
            session,
            dispatcher,
            state: TurnState::AwaitingInput,
        }
    }

    pub fn id(&self) -> Uuid {
        self.session.id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub async fn submit<S: DisplaySink>(
        &mut self,
        text: &str,
        reporter: &mut ProgressReporter<S>,
    ) -> TurnOutcome {
        self.submit_with_cancel(text, reporter, CancellationToken::new())
            .await
    }

    /// Submit a user message; an interrupt arriving while the turn runs
    /// cancels it. Interrupts sent between turns are left for the caller.
    pub async fn submit_interruptible<S: DisplaySink>(
        &mut self,
        text: &str,
        reporter: &mut ProgressReporter<S>,
        interrupts: &mut mpsc::UnboundedReceiver<()>,
    ) -> TurnOutcome {
        let cancel = CancellationToken::new();
        let turn = self.submit_with_cancel(text, reporter, cancel.clone());
        tokio::pin!(turn);
        loop {
            tokio::select! {
                outcome = &mut turn => return outcome,
                Some(()) = interrupts.recv(), if !cancel.is_cancelled() => cancel.cancel(),
            }
        }
    }

    /// Submit a user message; firing `cancel` aborts the dispatch and records
    /// the turn as failed.
    pub async fn submit_with_cancel<S: DisplaySink>(
        &mut self,
        text: &str,
        reporter: &mut ProgressReporter<S>,
        cancel: CancellationToken,
    ) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        let user = Turn::user(text);
        reporter.show_turn(&user);
        self.session.append(user);

        self.state = TurnState::Dispatching;
        let mut handle = self
            .dispatcher
            .dispatch_with_cancel(self.session.history(), cancel);
        debug!(session = %self.session.id(), dispatch = %handle.id(), "turn dispatched");

        let mut answer = None;
        while let Some(event) = handle.next().await {
            self.state = TurnState::StreamingEvents;
            match event {
                DispatchEvent::FinalAnswer { content } => {
                    answer = Some(content);
                    break;
                }
                step => reporter.on_event(&step),
            }
        }

        let outcome = match answer {
            Some(content) if content.starts_with(FAILURE_PREFIX) => {
                TurnOutcome::Failed { message: content }
            }
            Some(content) => TurnOutcome::Completed { answer: content },
            None => TurnOutcome::Failed {
                message: NO_ANSWER.to_string(),
            },
        };
        self.state = if outcome.is_failed() {
            TurnState::Failed
        } else {
            TurnState::Completed
        };
        info!(session = %self.session.id(), state = %self.state, "turn finished");

        let reply = Turn::assistant(outcome.text().unwrap_or_default());
        reporter.show_turn(&reply);
        self.session.append(reply);

        self.state = TurnState::AwaitingInput;
        outcome
    }
}
