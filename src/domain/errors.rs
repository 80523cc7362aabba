// Domain error types
use thiserror::Error;

/// Failure to obtain a source's payload. Aborts every panel bound to that source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("source '{source_name}' is unreachable at {location}: {reason}")]
    Unreachable {
        source_name: String,
        location: String,
        reason: String,
    },
    #[error("source '{source_name}' returned an invalid payload: {reason}")]
    InvalidPayload { source_name: String, reason: String },
}

/// A record whose date field could not be parsed. The record is dropped.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("record {record_index} of '{source_name}': field '{field}' value {value} is not a date")]
pub struct MalformedDateError {
    pub source_name: String,
    pub record_index: usize,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderError {
    #[error("panel {target}: record {record_index} has no field '{field}'")]
    MissingField {
        target: String,
        field: String,
        record_index: usize,
    },
    #[error("mount point {0} does not exist on this page")]
    UnknownMount(String),
    #[error("renderer failed for {target}: {reason}")]
    Backend { target: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("panel {target}: {series} y-accessors but {legend} legend labels")]
    LegendLengthMismatch {
        target: String,
        series: usize,
        legend: usize,
    },
    #[error("panel {target}: '{field}' must not be empty")]
    EmptyField { target: String, field: &'static str },
    #[error("panel {target}: width and height must be positive")]
    InvalidDimensions { target: String },
    #[error("panel {target}: confidence band bounds must be distinct fields")]
    DegenerateBand { target: String },
    #[error("mount point {0} is declared more than once")]
    DuplicateTarget(String),
    #[error("source '{0}' is declared more than once")]
    DuplicateSource(String),
    #[error("panel {target} references unknown source '{source_name}'")]
    UnknownSource { target: String, source_name: String },
    #[error("page '{0}' is declared more than once")]
    DuplicatePage(String),
}

/// Why a panel ended in the failed state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PanelFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
