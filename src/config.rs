use crate::error::{config_error, env_error, AgentResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default length of a requested free slot, in minutes
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Default Google Calendar REST endpoint
pub const DEFAULT_GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Scheduling defaults file, merged over the environment
const SCHEDULING_FILE: &str = "config/scheduling.toml";

/// Main configuration structure for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timezone used for date strings without an offset
    pub timezone: String,
    /// Slot length used when a tool call does not specify one
    pub default_slot_minutes: u32,
    /// Whether all-day events block timed free slots
    pub include_all_day: bool,
    /// Google Calendar ID to read events from
    pub google_calendar_id: Option<String>,
    /// Pre-issued OAuth access token for the Google Calendar API
    pub google_access_token: Option<String>,
    /// Base URL of the Google Calendar API
    pub google_api_base: String,
    /// JSON file with locally known events
    pub local_events_path: Option<PathBuf>,
}

/// Optional overrides read from `config/scheduling.toml`
#[derive(Debug, Default, Deserialize)]
struct SchedulingFile {
    timezone: Option<String>,
    default_slot_minutes: Option<u32>,
    include_all_day: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: String::from("UTC"),
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
            include_all_day: false,
            google_calendar_id: None,
            google_access_token: None,
            google_api_base: DEFAULT_GOOGLE_API_BASE.to_string(),
            local_events_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AgentResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config {
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC")),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID").ok(),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").ok(),
            google_api_base: env::var("GOOGLE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_API_BASE.to_string()),
            local_events_path: env::var("LOCAL_EVENTS_PATH").ok().map(PathBuf::from),
            ..Default::default()
        };

        if let Ok(minutes) = env::var("DEFAULT_SLOT_MINUTES") {
            config.default_slot_minutes = minutes
                .parse::<u32>()
                .map_err(|_| env_error("DEFAULT_SLOT_MINUTES"))?;
        }

        if let Ok(flag) = env::var("INCLUDE_ALL_DAY") {
            config.include_all_day = flag
                .parse::<bool>()
                .map_err(|_| env_error("INCLUDE_ALL_DAY"))?;
        }

        if let Ok(content) = fs::read_to_string(SCHEDULING_FILE) {
            debug!("Applying overrides from {}", SCHEDULING_FILE);
            config.apply_overrides(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge scheduling overrides from TOML text
    fn apply_overrides(&mut self, content: &str) -> AgentResult<()> {
        let file: SchedulingFile = toml::from_str(content)?;
        if let Some(timezone) = file.timezone {
            self.timezone = timezone;
        }
        if let Some(minutes) = file.default_slot_minutes {
            self.default_slot_minutes = minutes;
        }
        if let Some(include) = file.include_all_day {
            self.include_all_day = include;
        }
        Ok(())
    }

    /// Reject settings the tools cannot run with
    pub fn validate(&self) -> AgentResult<()> {
        self.tz()?;
        if self.default_slot_minutes == 0 {
            return Err(config_error("default_slot_minutes must be greater than zero"));
        }
        if self.google_calendar_id.is_some() != self.google_access_token.is_some() {
            warn!("GOOGLE_CALENDAR_ID and GOOGLE_ACCESS_TOKEN must be set together; Google Calendar source disabled");
        }
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> AgentResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Calendar ID and token, when the Google source is fully configured
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_calendar_id, &self.google_access_token) {
            (Some(id), Some(token)) => Some((id.as_str(), token.as_str())),
            _ => None,
        }
    }
}
