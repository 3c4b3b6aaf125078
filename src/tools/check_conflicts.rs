use super::{parse_args, schema_of, AgentTool, ToolContext};
use crate::error::AgentResult;
use crate::scheduling::find_conflicts;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Arguments of the `check_conflicts` tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckConflictsArgs {
    /// Start of the proposed event (ISO-8601)
    pub start_date: String,
    /// End of the proposed event (ISO-8601)
    pub end_date: String,
    /// Id of the event being moved, so it is not compared with itself
    #[serde(default)]
    pub exclude_event_id: Option<String>,
}

/// Checks whether a proposed time overlaps existing events
pub struct CheckConflicts;

#[async_trait]
impl AgentTool for CheckConflicts {
    fn name(&self) -> &'static str {
        "check_conflicts"
    }

    fn description(&self) -> &'static str {
        "Check whether a proposed time range overlaps any existing calendar event. \
         Returns every conflicting event so the conflict can be described to the user."
    }

    fn parameters(&self) -> Value {
        schema_of::<CheckConflictsArgs>()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> AgentResult<Value> {
        let args: CheckConflictsArgs = parse_args(self.name(), args)?;
        let candidate = ctx.parse_range(&args.start_date, &args.end_date)?;

        let events = ctx.snapshot(&candidate).await;
        let check = find_conflicts(&events, &candidate, args.exclude_event_id.as_deref());
        info!(
            "Conflict check {} - {}: {} conflicts",
            candidate.start,
            candidate.end,
            check.conflicting.len()
        );

        let message = if check.has_conflicts {
            let titles: Vec<&str> = check.conflicting.iter().map(|e| e.title.as_str()).collect();
            t!(
                "conflicts_found",
                count = check.conflicting.len(),
                titles = titles.join(", ")
            )
        } else {
            t!(
                "conflicts_none",
                start = ctx.display(candidate.start),
                end = ctx.display(candidate.end)
            )
        };

        Ok(json!({
            "success": true,
            "hasConflicts": check.has_conflicts,
            "conflictingEvents": check.conflicting,
            "message": message,
        }))
    }
}
