//! Parsing for the Google Visualization (gviz) JSON export.
//!
//! A published sheet answers `gviz/tq?tqx=out:json` with a JavaScript
//! callback wrapper around the JSON table:
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({"version":"0.6","status":"ok","table":{...}});
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DirectoryError;
use crate::policy::RawRow;

static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)google\.visualization\.Query\.setResponse\((.*)\)\s*;?\s*$")
        .expect("gviz envelope regex is valid")
});

/// Top-level gviz response.
#[derive(Debug, Deserialize)]
pub struct GvizResponse {
    /// `"ok"`, `"warning"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Error details when `status` is `"error"`.
    #[serde(default)]
    pub errors: Vec<GvizMessage>,
    /// The data table.
    pub table: Option<GvizTable>,
}

/// An error or warning entry.
#[derive(Debug, Deserialize)]
pub struct GvizMessage {
    /// Short reason code.
    #[serde(default)]
    pub reason: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// The table payload.
#[derive(Debug, Deserialize)]
pub struct GvizTable {
    /// Column descriptors (only the count matters here).
    #[serde(default)]
    pub cols: Vec<Value>,
    /// Data rows.
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

/// One table row; missing cells are `null`.
#[derive(Debug, Deserialize)]
pub struct GvizRow {
    /// Row cells.
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

/// One table cell: raw value `v` and formatted value `f`.
#[derive(Debug, Deserialize)]
pub struct GvizCell {
    /// Raw value.
    #[serde(default)]
    pub v: Option<Value>,
    /// Formatted value.
    #[serde(default)]
    pub f: Option<String>,
}

impl GvizCell {
    /// Text content of the cell.
    ///
    /// Strings are returned as-is. For numbers the formatted value is
    /// preferred (with digit-group separators removed) because long group
    /// identifiers do not survive a round-trip through `f64`.
    pub fn text(&self) -> Option<String> {
        match &self.v {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => self
                .f
                .as_deref()
                .and_then(formatted_integer)
                .or_else(|| number_text(n)),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(Value::Null) | None => self.f.clone(),
            Some(_) => self.f.clone(),
        }
    }
}

fn formatted_integer(f: &str) -> Option<String> {
    let digits: String = f
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{a0}' | ' '))
        .collect();
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_text(n: &serde_json::Number) -> Option<String> {
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < 1e19 {
        Some(format!("{f:.0}"))
    } else {
        Some(f.to_string())
    }
}

/// Strip the callback wrapper and parse the JSON table.
pub fn parse_response(text: &str) -> Result<GvizResponse, DirectoryError> {
    let json = ENVELOPE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            DirectoryError::SourceUnavailable("response is not a gviz setResponse envelope".into())
        })?;

    let response: GvizResponse = serde_json::from_str(json)?;

    if response.status.as_deref() == Some("error") {
        let detail = response
            .errors
            .iter()
            .filter_map(|e| e.message.as_deref().or(e.reason.as_deref()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DirectoryError::SourceUnavailable(format!(
            "gviz query failed: {detail}"
        )));
    }

    Ok(response)
}

/// Extract `(name, id)` rows from a gviz response body.
pub fn extract_rows(
    text: &str,
    name_column: usize,
    id_column: usize,
) -> Result<Vec<RawRow>, DirectoryError> {
    let response = parse_response(text)?;
    let table = response
        .table
        .ok_or_else(|| DirectoryError::SourceUnavailable("gviz response has no table".into()))?;

    let needed = name_column.max(id_column) + 1;
    if !table.cols.is_empty() && table.cols.len() < needed {
        return Err(DirectoryError::SourceUnavailable(format!(
            "table has {} columns, need at least {needed}",
            table.cols.len()
        )));
    }

    let cell_text = |row: &GvizRow, idx: usize| {
        row.c
            .get(idx)
            .and_then(Option::as_ref)
            .and_then(GvizCell::text)
    };

    Ok(table
        .rows
        .iter()
        .map(|row| RawRow {
            name: cell_text(row, name_column),
            id: cell_text(row, id_column),
        })
        .collect())
}
