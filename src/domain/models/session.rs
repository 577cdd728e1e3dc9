use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::frame::Frame;
use super::report::Report;

/// One recorded event of an experimental run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionEvent {
    Frame { frame: Frame },
    Report { report: Box<Report> },
}

impl SessionEvent {
    /// The report carried by this event, if any.
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Report { report } => Some(report),
            Self::Frame { .. } => None,
        }
    }
}

/// Descriptive data attached to a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub version: String,
    #[serde(default)]
    pub strategies: Vec<String>,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            strategies: Vec::new(),
        }
    }
}

/// A complete recorded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started: DateTime<Utc>,
    pub ended: Option<DateTime<Utc>>,
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl Session {
    /// Reports in recording order.
    pub fn reports(&self) -> impl Iterator<Item = &Report> + '_ {
        self.events.iter().filter_map(SessionEvent::report)
    }
}
