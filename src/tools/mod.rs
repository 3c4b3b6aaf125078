//! Scheduling operations exposed as schema-described agent tools.
//!
//! Every tool takes a JSON object of primitive fields and answers with a JSON
//! object carrying a `success` flag. Failures never escape as errors: the
//! registry turns them into `{ "success": false, "error": ... }`.

mod check_conflicts;
mod find_free_time;

pub use check_conflicts::{CheckConflicts, CheckConflictsArgs};
pub use find_free_time::{FindFreeTime, FindFreeTimeArgs};

use crate::components::SourceManager;
use crate::config::Config;
use crate::error::{invalid_argument, AgentResult};
use crate::scheduling::{Event, TimeRange};
use crate::utils::time::parse_instant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a tool needs to answer a call
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub sources: Arc<SourceManager>,
    /// Timezone for date strings without an offset
    pub timezone: Tz,
    pub default_slot_minutes: u32,
    /// Whether all-day events block timed free slots by default
    pub include_all_day: bool,
}

impl ToolContext {
    pub fn new(sources: Arc<SourceManager>, config: &Config) -> AgentResult<Self> {
        Ok(Self {
            sources,
            timezone: config.tz()?,
            default_slot_minutes: config.default_slot_minutes,
            include_all_day: config.include_all_day,
        })
    }

    /// Parse a start/end pair of ISO-8601 strings
    pub fn parse_range(&self, start: &str, end: &str) -> AgentResult<TimeRange> {
        Ok(TimeRange::new(
            parse_instant(start, self.timezone)?,
            parse_instant(end, self.timezone)?,
        ))
    }

    /// Merged local and remote events overlapping the window
    pub async fn snapshot(&self, window: &TimeRange) -> Vec<Event> {
        self.sources.snapshot(window).await
    }

    /// Human-readable instant in the context timezone
    pub fn display(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// A callable tool exposed to the language model
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments object
    fn parameters(&self) -> Value;

    /// Run the tool; errors are reported to the model by the registry
    async fn call(&self, ctx: &ToolContext, args: Value) -> AgentResult<Value>;
}

/// Tool description handed to the model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Registry dispatching tool calls by name
pub struct ToolRegistry {
    context: ToolContext,
    tools: Vec<Box<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new(context: ToolContext) -> Self {
        Self {
            context,
            tools: Vec::new(),
        }
    }

    /// Registry with the scheduling tools installed
    pub fn with_scheduling_tools(context: ToolContext) -> Self {
        let mut registry = Self::new(context);
        registry.register(CheckConflicts);
        registry.register(FindFreeTime);
        registry
    }

    pub fn register<T: AgentTool + 'static>(&mut self, tool: T) {
        debug!("Registering tool: {}", tool.name());
        self.tools.push(Box::new(tool));
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Definitions of every tool, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Run a tool by name and shape its outcome for the model
    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            warn!("Model called unknown tool {}", name);
            return failure(&t!("tool_unknown", name = name));
        };

        match tool.call(&self.context, args).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                failure(&e.to_string())
            }
        }
    }
}

/// Failure payload returned to the model
pub fn failure(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

/// JSON Schema for a tool's argument struct
pub(crate) fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}

/// Deserialize tool arguments, naming the tool on failure
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> AgentResult<T> {
    serde_json::from_value(args)
        .map_err(|e| invalid_argument(&format!("Bad arguments for {}: {}", tool, e)))
}
