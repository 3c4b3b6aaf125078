/// Simplified Google Calendar event representation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color_id: Option<String>,
    pub attendees: Vec<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

/// Connection settings for one Google calendar
#[derive(Debug, Clone)]
pub struct GoogleCalendarSettings {
    pub calendar_id: String,
    pub access_token: String,
    pub api_base: String,
    /// Timezone all-day dates are anchored to
    pub timezone: chrono_tz::Tz,
}
