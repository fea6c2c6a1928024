//! Findings-file parsers normalizing scanner output for evaluation.
//!
//! Each parser implements the `Parser` trait, producing normalized
//! `Finding` records from tool-specific formats (JSON, CSV). Records that
//! fail to parse are collected as `ParseError`s rather than aborting the
//! whole file.

pub mod findings;

use crate::models::finding::{Finding, SeverityLevel};

/// Result of parsing a findings file.
#[derive(Debug)]
pub struct ParseResult {
    pub findings: Vec<Finding>,
    pub errors: Vec<ParseError>,
    pub source_tool: String,
}

/// Error encountered while parsing an individual record.
#[derive(Debug)]
pub struct ParseError {
    pub record_index: usize,
    pub field: String,
    pub message: String,
}

/// Input format for findings data.
#[derive(Debug, Clone, PartialEq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl std::str::FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => anyhow::bail!("unsupported findings format '{other}' (expected json or csv)"),
        }
    }
}

/// Trait for pluggable findings parsers.
pub trait Parser: Send + Sync {
    /// Parse raw findings data into normalized findings.
    fn parse(&self, data: &[u8], format: InputFormat) -> Result<ParseResult, anyhow::Error>;

    /// The source tool name this parser handles.
    fn source_tool(&self) -> &str;

    /// Map a tool-specific severity string to a normalized severity level.
    fn map_severity(&self, tool_severity: &str) -> SeverityLevel;
}
