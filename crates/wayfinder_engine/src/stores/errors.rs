//! Last user-facing error message.

use crate::actions::Action;
use crate::dispatcher::{DispatchContext, Store};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ErrorStore {
    current: Option<ErrorEntry>,
    /// Total errors raised since construction.
    raised: usize,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ErrorEntry> {
        self.current.as_ref()
    }

    pub fn raised(&self) -> usize {
        self.raised
    }
}

impl Store for ErrorStore {
    fn name(&self) -> &'static str {
        "errors"
    }

    fn receive(&mut self, action: &Action, _ctx: &mut DispatchContext) -> bool {
        match action {
            Action::ErrorAction { message } => {
                tracing::warn!(%message, "user facing error");
                self.current = Some(ErrorEntry {
                    message: message.clone(),
                    raised_at: Utc::now(),
                });
                self.raised += 1;
                true
            }
            Action::DismissError => self.current.take().is_some(),
            _ => false,
        }
    }
}
