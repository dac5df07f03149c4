// Host query engine contract
//
// The host drives a data source through a fixed lifecycle:
//
//   on_init -> input_arguments -> on_arguments_processed -> columns
//     -> [on_start_updates] -> next_page -> [on_stop_updates]
//
// Rows travel back to the host in pages. When the host asks for updates it
// hands over a RowUpdateSink, which the data source may call from any task
// until on_stop_updates returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::RowKey;
use crate::error::Result;
use crate::traits::MonitoringClient;

// ============================================================================
// Rows and pages
// ============================================================================

/// A single cell value; `None` means the cell is empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: Option<String>,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn empty() -> Self {
        Self { value: None }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// A keyed row whose cells follow the column order declared by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: RowKey,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(key: RowKey, cells: Vec<Cell>) -> Self {
        Self { key, cells }
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }
}

/// One batch of rows handed to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub rows: Vec<Row>,
    pub has_next_page: bool,
}

impl Page {
    /// A page that tells the host no more rows follow
    pub fn last(rows: Vec<Row>) -> Self {
        Self {
            rows,
            has_next_page: false,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Int,
}

/// A column the source declares to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    Int,
    String,
}

/// An input argument the source declares to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    pub argument_type: ArgumentType,
    pub required: bool,
}

impl ArgumentSpec {
    pub fn required_int(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument_type: ArgumentType::Int,
            required: true,
        }
    }
}

/// A value bound by the host to a declared argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Int(i32),
    String(String),
}

/// Argument values bound by the host, keyed by argument name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentValues {
    values: HashMap<String, ArgumentValue>,
}

impl ArgumentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value (builder style)
    pub fn with(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, argument: &ArgumentSpec) -> Option<&ArgumentValue> {
        self.values.get(&argument.name)
    }
}

/// Display metadata for a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub name: String,
}

/// Handles supplied by the host when a data source is initialized
#[derive(Clone)]
pub struct InitContext {
    pub client: Arc<dyn MonitoringClient>,
}

impl InitContext {
    pub fn new(client: Arc<dyn MonitoringClient>) -> Self {
        Self { client }
    }
}

// ============================================================================
// RowUpdateSink - For pushing cell changes to the host
// ============================================================================

/// Host-side receiver of live cell updates
///
/// A single call is atomic for the addressed cell. Implementations must be
/// callable from any task.
pub trait RowUpdateSink: Send + Sync {
    fn update_cell(&self, row_key: &RowKey, column: &ColumnSpec, cell: Cell);
}

// ============================================================================
// DataSource - The lifecycle the host drives
// ============================================================================

#[async_trait]
pub trait DataSource: Send + Sync {
    fn metadata(&self) -> SourceMetadata;

    /// Called once before any other lifecycle method
    fn on_init(&mut self, ctx: InitContext) -> Result<()>;

    fn input_arguments(&self) -> Vec<ArgumentSpec>;

    fn on_arguments_processed(&mut self, args: &ArgumentValues) -> Result<()>;

    fn columns(&self) -> Vec<ColumnSpec>;

    /// The host wants live updates; called before the first page
    fn on_start_updates(&mut self, sink: Arc<dyn RowUpdateSink>) -> Result<()>;

    async fn next_page(&mut self) -> Result<Page>;

    /// The host no longer wants updates; no sink call may follow
    async fn on_stop_updates(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_constructors() {
        assert!(Cell::empty().is_empty());
        assert!(Cell::default().is_empty());
        assert_eq!(Cell::text("Critical").value.as_deref(), Some("Critical"));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Page::last(vec![Row::new(RowKey::new(1, 1), vec![Cell::empty()])]);
        assert!(!page.has_next_page);
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn test_argument_values_lookup_by_argument_name() {
        let view = ArgumentSpec::required_int("View ID");
        let other = ArgumentSpec::required_int("Other");
        let values = ArgumentValues::new().with("View ID", ArgumentValue::Int(5));

        assert_eq!(values.get(&view), Some(&ArgumentValue::Int(5)));
        assert_eq!(values.get(&other), None);
    }

    #[test]
    fn test_argument_value_deserializes_untagged() {
        let value: ArgumentValue = serde_json::from_str("12").unwrap();
        assert_eq!(value, ArgumentValue::Int(12));

        let value: ArgumentValue = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(value, ArgumentValue::String("abc".to_string()));
    }
}
