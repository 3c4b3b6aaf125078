use super::{parse_args, schema_of, AgentTool, ToolContext};
use crate::error::{invalid_argument, AgentResult};
use crate::scheduling::{find_free_slots, timed_only};
use async_trait::async_trait;
use chrono::Duration;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Below this length, suggesting an even shorter slot is pointless
const SHORTEST_USEFUL_MINUTES: u32 = 15;

/// Arguments of the `find_free_time` tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindFreeTimeArgs {
    /// Start of the search window (ISO-8601)
    pub start_date: String,
    /// End of the search window (ISO-8601)
    pub end_date: String,
    /// Minimum slot length in minutes; defaults to 30
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Whether all-day events count as busy time
    #[serde(default)]
    pub include_all_day: Option<bool>,
}

/// Finds free slots of a minimum length inside a window
pub struct FindFreeTime;

#[async_trait]
impl AgentTool for FindFreeTime {
    fn name(&self) -> &'static str {
        "find_free_time"
    }

    fn description(&self) -> &'static str {
        "Find free time slots of at least the requested duration between two dates. \
         Each slot spans the whole gap, earliest first."
    }

    fn parameters(&self) -> Value {
        schema_of::<FindFreeTimeArgs>()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> AgentResult<Value> {
        let args: FindFreeTimeArgs = parse_args(self.name(), args)?;
        let window = ctx.parse_range(&args.start_date, &args.end_date)?;

        let minutes = args.duration_minutes.unwrap_or(ctx.default_slot_minutes);
        if minutes == 0 {
            return Err(invalid_argument("durationMinutes must be greater than zero"));
        }
        let include_all_day = args.include_all_day.unwrap_or(ctx.include_all_day);

        let snapshot = ctx.snapshot(&window).await;
        let has_all_day = snapshot.iter().any(|e| e.is_all_day);
        let events = if include_all_day {
            snapshot
        } else {
            timed_only(&snapshot)
        };

        let slots = find_free_slots(&events, &window, Duration::minutes(i64::from(minutes)));
        info!(
            "Free time search {} - {} ({} min): {} slots",
            window.start,
            window.end,
            minutes,
            slots.len()
        );

        let start = ctx.display(window.start);
        let end = ctx.display(window.end);

        if !slots.is_empty() {
            let message = t!(
                "free_time_found",
                count = slots.len(),
                minutes = minutes,
                start = start,
                end = end
            );
            return Ok(json!({
                "success": true,
                "freeSlots": slots,
                "message": message,
            }));
        }

        let mut suggestions = Vec::new();
        if minutes > SHORTEST_USEFUL_MINUTES {
            suggestions.push(t!("suggestion_shorter_duration", minutes = minutes).to_string());
        }
        suggestions.push(t!("suggestion_wider_window").to_string());
        if include_all_day && has_all_day {
            suggestions.push(t!("suggestion_exclude_all_day").to_string());
        }

        Ok(json!({
            "success": true,
            "freeSlots": [],
            "message": t!("free_time_none", minutes = minutes, start = start, end = end),
            "suggestions": suggestions,
        }))
    }
}
