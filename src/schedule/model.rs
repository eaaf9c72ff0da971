use chrono::NaiveDate;
use serde::Deserialize;

use crate::schedule::format::{date_to_edit, date_to_wire, time_to_edit, time_to_wire};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWindow {
    pub date: String,
    pub start: String,
    pub end: String,
}

impl ConfigWindow {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%m/%d/%Y").ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    pub date: String,
    pub start: String,
    pub end: String,
}

impl ConfigForm {
    pub fn from_wire(config: &RemoteConfig) -> Self {
        Self {
            date: date_to_edit(&config.date),
            start: time_to_edit(&config.start),
            end: time_to_edit(&config.end),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.date.trim().is_empty()
            && !self.start.trim().is_empty()
            && !self.end.trim().is_empty()
    }

    pub fn to_wire(&self) -> Option<ConfigWindow> {
        let window = ConfigWindow {
            date: date_to_wire(self.date.trim()),
            start: time_to_wire(self.start.trim()),
            end: time_to_wire(self.end.trim()),
        };
        if window.date.is_empty() || window.start.is_empty() || window.end.is_empty() {
            return None;
        }
        Some(window)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauseState {
    #[default]
    Unknown,
    Running,
    Paused,
}

impl PauseState {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => PauseState::Unknown,
            Some(false) => PauseState::Running,
            Some(true) => PauseState::Paused,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PauseState::Unknown => "unknown",
            PauseState::Running => "running",
            PauseState::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    pub current_config: RemoteConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub is_paused: Option<bool>,
}

impl RemoteConfig {
    pub fn window(&self) -> ConfigWindow {
        ConfigWindow {
            date: self.date.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub is_paused: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub results: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
