//! Display sink implementations.

use std::io::Write;

use tracing::debug;

use super::{DisplaySink, RenderedStep, RenderedTurn};
use crate::util::text::{preview, squash_whitespace};

const RESULT_PREVIEW_CHARS: usize = 300;

/// Line-oriented transcript on any writer (usually stdout).
///
/// Collapsed mode shows one line per finished tool call; expanded mode also
/// shows thoughts, queries and a preview of each result.
pub struct TerminalSink<W: Write> {
    out: W,
    expanded: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            expanded: false,
        }
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) {
        let written = writeln!(self.out, "{line}").and_then(|_| self.out.flush());
        if let Err(err) = written {
            debug!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn show_turn(&mut self, turn: &RenderedTurn) {
        let line = format!("{}> {}", turn.role, turn.content);
        self.line(&line);
    }

    fn show_step(&mut self, step: &RenderedStep) {
        let line = match (step, self.expanded) {
            (RenderedStep::Thought { text }, true) => format!("  thinking: {}", squash_whitespace(text)),
            (RenderedStep::ToolStarted { tool_name, query }, true) => {
                format!("  -> {tool_name}(\"{query}\")")
            }
            (RenderedStep::ToolFinished { tool_name, result }, true) => format!(
                "  <- {tool_name}: {}",
                preview(&squash_whitespace(result), RESULT_PREVIEW_CHARS)
            ),
            (RenderedStep::ToolFinished { tool_name, result }, false) => {
                format!("  [{tool_name}] {} chars", result.chars().count())
            }
            _ => return,
        };
        self.line(&line);
    }
}

/// One thing a [`RecordingSink`] was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Turn(RenderedTurn),
    Step(RenderedStep),
}

/// Keeps everything it is shown, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    shown: Vec<Shown>,
}

impl RecordingSink {
    pub fn shown(&self) -> &[Shown] {
        &self.shown
    }

    pub fn turns(&self) -> Vec<&RenderedTurn> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Turn(turn) => Some(turn),
                Shown::Step(_) => None,
            })
            .collect()
    }

    pub fn steps(&self) -> Vec<&RenderedStep> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Step(step) => Some(step),
                Shown::Turn(_) => None,
            })
            .collect()
    }
}

impl DisplaySink for RecordingSink {
    fn show_turn(&mut self, turn: &RenderedTurn) {
        self.shown.push(Shown::Turn(turn.clone()));
    }

    fn show_step(&mut self, step: &RenderedStep) {
        self.shown.push(Shown::Step(step.clone()));
    }
}
