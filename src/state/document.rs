use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The single persisted document holding everything the event needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Checked-in attendees, in check-in order
    #[serde(default)]
    pub users: Vec<User>,

    /// Append-only draw results
    #[serde(default)]
    pub winners: Vec<WinnerRecord>,

    #[serde(default)]
    pub prizes: Vec<Prize>,

    /// Display settings; absent in documents written by older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DisplayConfig>,
}

impl Document {
    /// Document written on first run: no attendees, four seed prizes and the default display config
    pub fn seeded() -> Self {
        Self {
            users: Vec::new(),
            winners: Vec::new(),
            prizes: vec![
                Prize::new(1, "First Prize", "iPhone 15 Pro"),
                Prize::new(2, "Second Prize", "AirPods Pro"),
                Prize::new(3, "Third Prize", "Mi Band"),
                Prize::new(4, "Lucky Prize", "Gift Box"),
            ],
            config: Some(DisplayConfig::default()),
        }
    }

    pub fn find_user_by_phone(&self, phone: &str) -> Option<&User> {
        self.users.iter().find(|u| u.phone == phone)
    }

    pub fn find_prize(&self, id: i64) -> Option<&Prize> {
        self.prizes.iter().find(|p| p.id == id)
    }

    /// Users without any winner record, in check-in order
    pub fn available_users(&self) -> Vec<&User> {
        let won: HashSet<&str> = self.winners.iter().map(|w| w.user_id.as_str()).collect();
        self.users
            .iter()
            .filter(|u| !won.contains(u.id.as_str()))
            .collect()
    }
}

/// A checked-in attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Raw phone number as entered
    pub phone: String,

    /// Phone with the middle four digits redacted
    pub phone_mask: String,

    pub name: String,

    /// Local check-in time, e.g. `2026/10/18 19:30:05`
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

impl Prize {
    pub fn new(id: i64, name: &str, desc: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            desc: desc.to_string(),
        }
    }
}

/// One user winning one prize. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Masked phone, never the raw number
    pub user_phone: String,
    pub prize_id: i64,
    pub prize_name: String,
    #[serde(default)]
    pub prize_desc: String,
    pub time: String,
}

/// Big-screen display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    pub theme: String,
    pub display_title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            display_title: "2026 Annual Gala".to_string(),
        }
    }
}

pub fn current_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Local wall-clock time in `YYYY/M/D HH:MM:SS` form
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y/%-m/%-d %H:%M:%S").to_string()
}
