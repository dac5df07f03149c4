// Data source configuration
//
// Display names the host shows for the source, its argument and its columns.
// Can be deserialized, built in code, or loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the service alarm states data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name the host lists the data source under
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Name of the integer view id argument
    #[serde(default = "default_view_argument")]
    pub view_argument: String,

    /// Header of the service name column
    #[serde(default = "default_name_column")]
    pub name_column: String,

    /// Header of the alarm state column
    #[serde(default = "default_state_column")]
    pub state_column: String,
}

fn default_display_name() -> String {
    "Service alarm states".to_string()
}

fn default_view_argument() -> String {
    "View ID".to_string()
}

fn default_name_column() -> String {
    "Name".to_string()
}

fn default_state_column() -> String {
    "Alarm state".to_string()
}

impl SourceConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables (each falls back to its default when unset or empty):
    /// - `SERVICE_ALARM_STATES_NAME`: display name of the data source
    /// - `SERVICE_ALARM_STATES_VIEW_ARGUMENT`: name of the view id argument
    /// - `SERVICE_ALARM_STATES_NAME_COLUMN`: header of the name column
    /// - `SERVICE_ALARM_STATES_STATE_COLUMN`: header of the alarm state column
    pub fn from_env() -> Self {
        Self {
            display_name: env_or("SERVICE_ALARM_STATES_NAME", default_display_name),
            view_argument: env_or("SERVICE_ALARM_STATES_VIEW_ARGUMENT", default_view_argument),
            name_column: env_or("SERVICE_ALARM_STATES_NAME_COLUMN", default_name_column),
            state_column: env_or("SERVICE_ALARM_STATES_STATE_COLUMN", default_state_column),
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the view id argument name
    pub fn with_view_argument(mut self, name: impl Into<String>) -> Self {
        self.view_argument = name.into();
        self
    }

    /// Set the column headers
    pub fn with_columns(mut self, name: impl Into<String>, state: impl Into<String>) -> Self {
        self.name_column = name.into();
        self.state_column = state.into();
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            view_argument: default_view_argument(),
            name_column: default_name_column(),
            state_column: default_state_column(),
        }
    }
}

fn env_or(key: &str, default: fn() -> String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.display_name, "Service alarm states");
        assert_eq!(config.view_argument, "View ID");
        assert_eq!(config.name_column, "Name");
        assert_eq!(config.state_column, "Alarm state");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SourceConfig =
            serde_json::from_str(r#"{"state_column": "Severity"}"#).unwrap();
        assert_eq!(config.state_column, "Severity");
        assert_eq!(config.name_column, "Name");
        assert_eq!(config.view_argument, "View ID");
    }

    #[test]
    fn test_builder_setters() {
        let config = SourceConfig::default()
            .with_display_name("Services")
            .with_view_argument("View")
            .with_columns("Service", "Severity");

        assert_eq!(config.display_name, "Services");
        assert_eq!(config.view_argument, "View");
        assert_eq!(config.name_column, "Service");
        assert_eq!(config.state_column, "Severity");
    }

    #[test]
    fn test_from_env_overrides_and_falls_back() {
        env::set_var("SERVICE_ALARM_STATES_STATE_COLUMN", "Severity");
        env::set_var("SERVICE_ALARM_STATES_NAME_COLUMN", "  ");

        let config = SourceConfig::from_env();

        assert_eq!(config.state_column, "Severity");
        assert_eq!(config.name_column, "Name");

        env::remove_var("SERVICE_ALARM_STATES_STATE_COLUMN");
        env::remove_var("SERVICE_ALARM_STATES_NAME_COLUMN");
    }
}
