//! Parser for the normalized findings interchange format.
//!
//! Accepts a JSON array of finding records or a CSV file with a header row.
//! Field names are tolerant of common scanner export variants (`id` for
//! `finding_id`, `package`/`path` for `component`). Unknown severities
//! normalize to Medium rather than dropping the record.

use serde::Deserialize;

use crate::models::finding::{Finding, SeverityLevel};
use crate::parsers::{InputFormat, ParseError, ParseResult, Parser};

/// Scanner-agnostic findings parser.
#[derive(Default)]
pub struct FindingsParser;

impl FindingsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for FindingsParser {
    fn parse(&self, data: &[u8], format: InputFormat) -> Result<ParseResult, anyhow::Error> {
        match format {
            InputFormat::Json => self.parse_json(data),
            InputFormat::Csv => self.parse_csv(data),
        }
    }

    fn source_tool(&self) -> &str {
        "generic"
    }

    fn map_severity(&self, tool_severity: &str) -> SeverityLevel {
        SeverityLevel::parse_loose(tool_severity).unwrap_or(SeverityLevel::Medium)
    }
}

/// Deserialized finding record from JSON/CSV.
#[derive(Debug, Deserialize)]
struct FindingRecord {
    #[serde(alias = "id")]
    finding_id: Option<String>,
    #[serde(alias = "package", alias = "path")]
    component: Option<String>,
    severity: Option<String>,
    title: Option<String>,
}

impl FindingsParser {
    fn parse_json(&self, data: &[u8]) -> Result<ParseResult, anyhow::Error> {
        let records: Vec<FindingRecord> = serde_json::from_slice(data)?;
        let mut findings = Vec::new();
        let mut errors = Vec::new();

        for (i, record) in records.into_iter().enumerate() {
            match self.convert_record(record, i) {
                Ok(finding) => findings.push(finding),
                Err(err) => errors.push(err),
            }
        }

        Ok(ParseResult {
            findings,
            errors,
            source_tool: self.source_tool().to_string(),
        })
    }

    fn parse_csv(&self, data: &[u8]) -> Result<ParseResult, anyhow::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let mut findings = Vec::new();
        let mut errors = Vec::new();

        for (i, result) in reader.deserialize::<FindingRecord>().enumerate() {
            match result {
                Ok(record) => match self.convert_record(record, i) {
                    Ok(finding) => findings.push(finding),
                    Err(err) => errors.push(err),
                },
                Err(e) => errors.push(ParseError {
                    record_index: i,
                    field: "csv_row".to_string(),
                    message: format!("CSV parse error: {e}"),
                }),
            }
        }

        Ok(ParseResult {
            findings,
            errors,
            source_tool: self.source_tool().to_string(),
        })
    }

    fn convert_record(
        &self,
        record: FindingRecord,
        index: usize,
    ) -> Result<Finding, ParseError> {
        let finding_id = record.finding_id.unwrap_or_default();
        if finding_id.trim().is_empty() {
            return Err(ParseError {
                record_index: index,
                field: "finding_id".to_string(),
                message: "missing finding_id".to_string(),
            });
        }

        // An absent component descriptor means "any occurrence": it will
        // match wildcard rules but never a specific coordinate.
        let component = record
            .component
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "*".to_string());

        let severity = self.map_severity(record.severity.as_deref().unwrap_or(""));

        Ok(Finding {
            finding_id,
            component,
            severity,
            title: record.title.filter(|t| !t.trim().is_empty()),
        })
    }
}
