use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Navigation,
    Extraction,
    Interaction,
    Screenshot,
    RecipeExecution,
    DataProcessing,
    Analysis,
    UserInteraction,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMethod {
    Command,
    Recipe,
    File,
    Manual,
    Analysis,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    KeyFactor,
    Pitfall,
    Lesson,
    Workaround,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightEntry {
    pub insight_type: InsightType,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInstance {
    pub run_id: String,
    pub theme_description: String,
    #[serde(serialize_with = "frago_core::time::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "frago_core::time::serialize")]
    pub last_accessed: DateTime<Utc>,
    pub status: RunStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(serialize_with = "frago_core::time::serialize")]
    pub timestamp: DateTime<Utc>,
    pub step: String,
    pub status: LogStatus,
    pub action_type: ActionType,
    pub execution_method: ExecutionMethod,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<InsightEntry>,
    pub schema_version: String,
}

impl LogEntry {
    pub const SCHEMA_VERSION: &'static str = "1.1";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    pub sequence_number: u32,
    pub description: String,
    pub file_path: String,
    #[serde(serialize_with = "frago_core::time::serialize")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentRunContext {
    pub run_id: String,
    #[serde(serialize_with = "frago_core::time::serialize")]
    pub last_accessed: DateTime<Utc>,
    pub theme_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_round_trips_through_json() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            step: "navigate to example.org".into(),
            status: LogStatus::Success,
            action_type: ActionType::Navigation,
            execution_method: ExecutionMethod::Command,
            data: serde_json::json!({"url": "https://example.org"}),
            insights: vec![],
            schema_version: LogEntry::SCHEMA_VERSION.to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"action_type\":\"navigation\""));
        let decoded: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.step, entry.step);
        assert_eq!(decoded.schema_version, "1.1");
    }

    #[test]
    fn insight_serializes_snake_case() {
        let insight = InsightEntry {
            insight_type: InsightType::Pitfall,
            summary: "selector changes on hover".into(),
            detail: None,
        };
        let json = serde_json::to_string(&insight).unwrap();
        assert!(json.contains("\"insight_type\":\"pitfall\""));
        assert!(!json.contains("detail"));
    }
}
