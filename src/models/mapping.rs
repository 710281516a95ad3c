// Value -> role mapping built from uploaded CSV rows

use std::collections::HashMap;
use std::fmt;

/// Why a single CSV row was rejected during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorKind {
    /// Key or value column index is past the end of the row
    ColumnOutOfBounds,
    EmptyKey,
    EmptyValue,
    EmptyBoth,
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RowErrorKind::ColumnOutOfBounds => "列番号が範囲外です",
            RowErrorKind::EmptyKey => "ロール名が空です",
            RowErrorKind::EmptyValue => "マッチング値が空です",
            RowErrorKind::EmptyBoth => "ロール名とマッチング値が空です",
        };
        f.write_str(text)
    }
}

/// A rejected row, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
}

/// Outcome of a bulk ingest, used only to render the upload reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub success_count: usize,
    pub errors: Vec<RowError>,
    /// (value, role) pairs in the order they were applied
    pub assignments: Vec<(String, String)>,
}

/// Exact-match lookup from a posted value to a role name.
///
/// Entries keep their first insertion position; overwriting a value
/// replaces the role in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    roles: HashMap<String, String>,
    order: Vec<String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh table from parsed rows.
    ///
    /// `key_column` holds the role name, `value_column` the value users post.
    /// Rows are numbered from 1 in the report. Bad rows never abort the batch.
    pub fn ingest<R, F>(rows: R, key_column: usize, value_column: usize) -> (Self, IngestionReport)
    where
        R: IntoIterator<Item = Vec<F>>,
        F: AsRef<str>,
    {
        let mut table = Self::new();
        let mut report = IngestionReport::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;

            if key_column >= row.len() || value_column >= row.len() {
                report.errors.push(RowError {
                    row: row_number,
                    kind: RowErrorKind::ColumnOutOfBounds,
                });
                continue;
            }

            let role = row[key_column].as_ref().trim();
            let value = row[value_column].as_ref().trim();

            let kind = match (role.is_empty(), value.is_empty()) {
                (true, true) => Some(RowErrorKind::EmptyBoth),
                (true, false) => Some(RowErrorKind::EmptyKey),
                (false, true) => Some(RowErrorKind::EmptyValue),
                (false, false) => None,
            };
            if let Some(kind) = kind {
                report.errors.push(RowError { row: row_number, kind });
                continue;
            }

            table.upsert(value, role);
            report.success_count += 1;
            report
                .assignments
                .push((value.to_string(), role.to_string()));
        }

        (table, report)
    }

    /// Insert or overwrite. Returns `true` when the value already existed.
    pub fn upsert(&mut self, value: &str, role: &str) -> bool {
        match self.roles.insert(value.to_string(), role.to_string()) {
            Some(_) => true,
            None => {
                self.order.push(value.to_string());
                false
            }
        }
    }

    /// Remove a value, returning the role it mapped to
    pub fn remove(&mut self, value: &str) -> Option<String> {
        let role = self.roles.remove(value)?;
        self.order.retain(|v| v != value);
        Some(role)
    }

    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.roles.get(value).map(String::as_str)
    }

    /// All (value, role) pairs in insertion order
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.order
            .iter()
            .filter_map(|value| {
                self.roles
                    .get(value)
                    .map(|role| (value.as_str(), role.as_str()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// An empty table, as left behind by `clearcsv`
    pub fn clear(&self) -> Self {
        Self::new()
    }
}
