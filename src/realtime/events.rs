use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::{DisplayConfig, Prize, User, WinnerRecord};

/// Result of one draw, as returned to the caller and pushed to viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub prize: Prize,
    pub winners: Vec<WinnerRecord>,
}

/// Named event pushed to every connected viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Carries the full user, raw phone included
    UserCheckin(User),
    DrawResult(DrawOutcome),
    DataReset,
    ConfigUpdate(DisplayConfig),
    /// Relayed from a viewer, payload echoed untouched
    DrawStart(Value),
    DrawStop,
}

impl ViewerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::UserCheckin(_) => "user-checkin",
            ViewerEvent::DrawResult(_) => "draw-result",
            ViewerEvent::DataReset => "data-reset",
            ViewerEvent::ConfigUpdate(_) => "config-update",
            ViewerEvent::DrawStart(_) => "draw-start",
            ViewerEvent::DrawStop => "draw-stop",
        }
    }

    pub fn payload(&self) -> Value {
        let payload = match self {
            ViewerEvent::UserCheckin(user) => serde_json::to_value(user),
            ViewerEvent::DrawResult(outcome) => serde_json::to_value(outcome),
            ViewerEvent::ConfigUpdate(config) => serde_json::to_value(config),
            ViewerEvent::DrawStart(data) => Ok(data.clone()),
            ViewerEvent::DataReset | ViewerEvent::DrawStop => Ok(Value::Null),
        };
        payload.unwrap_or(Value::Null)
    }

    /// Wire form for WebSocket text frames
    pub fn to_json(&self) -> String {
        json!({
            "event": self.name(),
            "data": self.payload(),
        })
        .to_string()
    }

    /// Parse a frame sent by a viewer. Only the animation relays are accepted.
    pub fn from_viewer(text: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Incoming {
            event: String,
            #[serde(default)]
            data: Value,
        }

        let incoming: Incoming = serde_json::from_str(text).ok()?;
        match incoming.event.as_str() {
            "draw-start" => Some(ViewerEvent::DrawStart(incoming.data)),
            "draw-stop" => Some(ViewerEvent::DrawStop),
            _ => None,
        }
    }
}
