//! Colouring of step results.
//!
//! Every line the binary prints has a [`Tone`], derived from the step's
//! outcome or from the kind of error it failed with.

use std::{fmt::Display, sync::OnceLock};

use owo_colors::{OwoColorize, colors::css};
use registrar::{DequeueOutcome, Outcome, domain::ErrorKind};

/// How a line of output reads at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// The store changed, or a check passed.
    Success,
    /// Nothing failed, but the result needs attention.
    Warning,
    /// The step was rejected.
    Failure,
    /// Headings, labels and empty listings.
    Muted,
}

impl Tone {
    /// Tone of a step that returned an outcome.
    pub fn of_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::IndexReset | Outcome::Promotion(DequeueOutcome::Discarded { .. }) => {
                Self::Warning
            }
            _ if outcome.is_success() => Self::Success,
            _ => Self::Warning,
        }
    }

    /// Tone of a step that failed.
    ///
    /// Full courses and unmet prerequisites are expected during a session; the
    /// rest point at a bad request.
    pub const fn of_error(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::CapacityExceeded | ErrorKind::IneligiblePrerequisite => Self::Warning,
            ErrorKind::Empty => Self::Muted,
            ErrorKind::DuplicateKey | ErrorKind::NotFound | ErrorKind::AlreadyExists => {
                Self::Failure
            }
        }
    }

    /// Renders `text` in this tone, or plainly when stdout has no colour.
    pub fn paint(self, text: impl Display) -> String {
        if !colour_enabled() {
            return text.to_string();
        }
        match self {
            Self::Success => text.fg::<css::Green>().to_string(),
            Self::Warning => text.fg::<css::Orange>().to_string(),
            Self::Failure => text.fg::<css::Red>().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }
}

fn colour_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| supports_color::on(supports_color::Stream::Stdout).is_some())
}
