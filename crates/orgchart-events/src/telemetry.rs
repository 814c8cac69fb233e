//! Command lifecycle logging.
//!
//! Every dispatched command gets a correlation id; start and finish lines
//! share it so a single interaction can be followed through the log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "orgchart::events::telemetry";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandLifecycle {
    Start,
    Success,
    /// Handled without changing anything, e.g. an unknown id or a search miss.
    Rejected,
}

impl fmt::Display for CommandLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "command_start"),
            Self::Success => write!(f, "command_success"),
            Self::Rejected => write!(f, "command_rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTelemetry {
    pub correlation_id: String,
    pub command: String,
    pub lifecycle: CommandLifecycle,
    pub reason: Option<String>,
    pub duration_ms: Option<u128>,
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// An in-flight command. Created when dispatch begins, consumed when it ends.
#[derive(Debug)]
pub struct CommandSpan {
    command: &'static str,
    correlation_id: String,
    started: Instant,
}

impl CommandSpan {
    pub fn begin(command: &'static str) -> Self {
        let span = Self {
            command,
            correlation_id: new_correlation_id(),
            started: Instant::now(),
        };
        info!(
            target: TELEMETRY_TARGET,
            command = span.command,
            correlation_id = %span.correlation_id,
            lifecycle = %CommandLifecycle::Start,
            "command_start"
        );
        span
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn succeed(self) -> CommandTelemetry {
        let duration_ms = self.started.elapsed().as_millis();
        info!(
            target: TELEMETRY_TARGET,
            command = self.command,
            correlation_id = %self.correlation_id,
            lifecycle = %CommandLifecycle::Success,
            duration_ms = duration_ms as u64,
            "command_success"
        );
        self.record(CommandLifecycle::Success, None, Some(duration_ms))
    }

    pub fn reject(self, reason: impl Into<String>) -> CommandTelemetry {
        let reason = reason.into();
        warn!(
            target: TELEMETRY_TARGET,
            command = self.command,
            correlation_id = %self.correlation_id,
            lifecycle = %CommandLifecycle::Rejected,
            reason = %reason,
            "command_rejected"
        );
        self.record(CommandLifecycle::Rejected, Some(reason), None)
    }

    fn record(
        self,
        lifecycle: CommandLifecycle,
        reason: Option<String>,
        duration_ms: Option<u128>,
    ) -> CommandTelemetry {
        CommandTelemetry {
            correlation_id: self.correlation_id,
            command: self.command.to_string(),
            lifecycle,
            reason,
            duration_ms,
        }
    }
}
