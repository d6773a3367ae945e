//! Wire types for the bot backend API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state reported by the bot process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotState {
    #[serde(rename = "notStarted")]
    NotStarted,
    Connecting,
    Joined,
}

/// `GET /status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(rename = "State")]
    pub state: BotState,
    /// When the bot process was started. The panel treats this as an opaque
    /// point in time and never reformats it.
    #[serde(rename = "Started", default)]
    pub started: Option<DateTime<Utc>>,
}

/// One command/response pair as stored on the server. The `name` is the
/// remote identity; there is no stable server-side id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub template: String,
}

/// `GET /templates` response (and `POST /templates` echo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingTemplates {
    pub new_user: String,
    pub returning_user: String,
    pub consecutive_user: String,
    #[serde(default)]
    pub greet_trolls: bool,
}

/// `POST /templates` request body. Only the three editable templates are
/// submitted; the server owns the rest of the record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingUpdate {
    pub new_user: String,
    pub returning_user: String,
    pub consecutive_user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_status_parses_wire_state_names() {
        let status: BotStatus =
            serde_json::from_str(r#"{"State":"notStarted"}"#).expect("parse notStarted");
        assert_eq!(status.state, BotState::NotStarted);
        assert!(status.started.is_none());

        let status: BotStatus =
            serde_json::from_str(r#"{"State":"Joined","Started":"2024-01-01T00:00:00Z"}"#)
                .expect("parse Joined");
        assert_eq!(status.state, BotState::Joined);
        assert_eq!(
            status.started.expect("started").to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn greeting_templates_use_camel_case() {
        let templates: GreetingTemplates = serde_json::from_str(
            r#"{"newUser":"hi","returningUser":"wb","consecutiveUser":"again","greetTrolls":true}"#,
        )
        .expect("parse templates");
        assert_eq!(templates.new_user, "hi");
        assert!(templates.greet_trolls);

        let body = serde_json::to_value(GreetingUpdate {
            new_user: "a".into(),
            returning_user: "b".into(),
            consecutive_user: "c".into(),
        })
        .unwrap();
        assert_eq!(body["newUser"], "a");
        assert!(body.get("greetTrolls").is_none());
    }
}
