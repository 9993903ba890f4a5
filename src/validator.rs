//! Row Validator
//!
//! Checks every row against every table of a schema. Within a table, the
//! value at position `i` of a row is checked against the field at position
//! `i` of the table; positions past the end of the shorter side are skipped.
//! Rows are never routed to a single table and field names are never matched
//! against headers, so a worksheet whose columns were reordered validates
//! against the wrong fields without complaint.

use std::fmt;

use serde::Serialize;

use crate::row::RowSource;
use crate::schema::{FieldSpec, FieldType, Schema};
use crate::sink::{CollectingSink, DiagnosticSink, TracingSink};

/// How a value failed its field spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field holds an empty value
    MissingRequired,
    /// Value does not parse as the field's type
    WrongType { expected: FieldType },
    /// String value is longer than the field allows
    TooLong { length: usize, max_length: usize },
}

impl ViolationKind {
    /// Stable snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequired => "missing_required",
            ViolationKind::WrongType { .. } => "wrong_type",
            ViolationKind::TooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::MissingRequired => write!(f, "required value is missing"),
            ViolationKind::WrongType { expected } => write!(f, "expected {}", expected),
            ViolationKind::TooLong { length, max_length } => {
                write!(f, "length {} exceeds {}", length, max_length)
            }
        }
    }
}

/// A single offending value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub table: String,
    /// Position of the row in the input
    pub row: usize,
    /// Position of the value in the row
    pub column: usize,
    pub field: String,
    pub value: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value detected for column {}: '{}' ({})",
            self.field, self.value, self.kind
        )
    }
}

/// Counts for one validation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub tables_checked: usize,
    /// Rows considered per table, after skipped header rows
    pub rows_checked: usize,
    pub row_faults: usize,
    pub violations: usize,
}

/// Check one value against its field spec.
///
/// The required, type and length checks all run; an empty value in a
/// required int field yields both `MissingRequired` and `WrongType`.
/// Fields with an unrecognized type only get the required check.
pub fn check_value(spec: &FieldSpec, value: &str) -> Vec<ViolationKind> {
    let mut found = Vec::new();

    if spec.required && value.is_empty() {
        found.push(ViolationKind::MissingRequired);
    }

    let parses = !spec.field_type.is_recognized()
        || match spec.field_type {
            FieldType::Int => is_integer(value),
            FieldType::Float => value.trim().parse::<f64>().is_ok(),
            _ => true,
        };
    if !parses {
        found.push(ViolationKind::WrongType {
            expected: spec.field_type.clone(),
        });
    }

    if spec.field_type == FieldType::String {
        if let Some(max_length) = spec.max_length {
            let length = value.chars().count();
            if length > max_length {
                found.push(ViolationKind::TooLong { length, max_length });
            }
        }
    }

    found
}

/// Integer literal with optional surrounding whitespace and sign.
/// Values past the `i64` range still count as integers.
fn is_integer(value: &str) -> bool {
    let value = value.trim();
    if value.parse::<i64>().is_ok() {
        return true;
    }
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Runs a schema over rows and reports to a sink
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
    skip_rows: usize,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            skip_rows: 0,
        }
    }

    /// Leave the first `rows` rows (worksheet headers) unchecked.
    /// Row positions in violations still count from the start of the input.
    pub fn skip_header_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Validate `rows` against every table, in schema order.
    ///
    /// A row whose cells cannot be read is reported as a fault and skipped for
    /// that table; the pass always runs to completion.
    pub fn run<R, S>(&self, rows: &[R], sink: &mut S) -> ValidationSummary
    where
        R: RowSource,
        S: DiagnosticSink + ?Sized,
    {
        let mut summary = ValidationSummary {
            rows_checked: rows.len().saturating_sub(self.skip_rows),
            ..ValidationSummary::default()
        };

        for (table_name, table) in self.schema.tables() {
            sink.table_started(table_name, table.len());
            summary.tables_checked += 1;

            for (row_index, row) in rows.iter().enumerate().skip(self.skip_rows) {
                let cells = match row.cells(row_index) {
                    Ok(cells) => cells,
                    Err(err) => {
                        summary.row_faults += 1;
                        sink.row_fault(table_name, row_index, &err);
                        continue;
                    }
                };

                // zip stops at the shorter of row and table
                for (column, (value, (field_name, spec))) in
                    cells.iter().zip(table.fields()).enumerate()
                {
                    for kind in check_value(spec, value) {
                        summary.violations += 1;
                        sink.violation(&Violation {
                            table: table_name.to_string(),
                            row: row_index,
                            column,
                            field: field_name.to_string(),
                            value: value.clone(),
                            kind,
                        });
                    }
                }
            }
        }

        sink.complete(&summary);
        summary
    }
}

/// Validate rows against a schema, logging each violation through `tracing`
/// and returning them in the order they were found.
pub fn validate<R: RowSource>(schema: &Schema, rows: &[R]) -> Vec<Violation> {
    let mut sink = (TracingSink, CollectingSink::default());
    Validator::new(schema).run(rows, &mut sink);
    sink.1.into_violations()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;
    use crate::schema::TableSpec;

    fn kinds(spec: &FieldSpec, value: &str) -> Vec<&'static str> {
        check_value(spec, value).iter().map(ViolationKind::name).collect()
    }

    #[test]
    fn test_required_empty_value() {
        let spec = FieldSpec::new("string").required();
        assert_eq!(kinds(&spec, ""), vec!["missing_required"]);
        assert!(kinds(&spec, "x").is_empty());
        assert!(kinds(&FieldSpec::new("string"), "").is_empty());
    }

    #[test]
    fn test_int_parsing() {
        let spec = FieldSpec::new("int");
        for bad in ["12.5", "abc", "", "   ", "-", "1 2", "4e3"] {
            assert_eq!(kinds(&spec, bad), vec!["wrong_type"], "value {:?}", bad);
        }
        for good in ["42", "-7", "0", "+7", " 4", "42 ", "\t-3\n"] {
            assert!(kinds(&spec, good).is_empty(), "value {:?}", good);
        }
    }

    #[test]
    fn test_int_beyond_i64_range() {
        let spec = FieldSpec::new("int");
        assert!(kinds(&spec, "99999999999999999999").is_empty());
        assert!(kinds(&spec, "-123456789012345678901234567890").is_empty());
        assert_eq!(kinds(&spec, "99999999999999999999.5"), vec!["wrong_type"]);
    }

    #[test]
    fn test_padded_float() {
        let spec = FieldSpec::new("float");
        for good in [" 3.14", "3.14 ", " -2 "] {
            assert!(kinds(&spec, good).is_empty(), "value {:?}", good);
        }
        assert_eq!(kinds(&spec, " abc "), vec!["wrong_type"]);
    }

    #[test]
    fn test_float_parsing() {
        let spec = FieldSpec::new("float");
        for good in ["3.14", "-2", "1e10"] {
            assert!(kinds(&spec, good).is_empty(), "value {:?}", good);
        }
        assert_eq!(kinds(&spec, "abc"), vec!["wrong_type"]);
    }

    #[test]
    fn test_string_length_boundary() {
        let spec = FieldSpec::new("string").with_max_length(3);
        assert!(kinds(&spec, "abc").is_empty());
        assert!(kinds(&spec, "").is_empty());
        assert_eq!(
            check_value(&spec, "abcd"),
            vec![ViolationKind::TooLong { length: 4, max_length: 3 }]
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let spec = FieldSpec::new("string").with_max_length(4);
        assert!(kinds(&spec, "café").is_empty());
    }

    #[test]
    fn test_max_length_ignored_for_non_strings() {
        let spec = FieldSpec::new("int").with_max_length(1);
        assert!(kinds(&spec, "12345").is_empty());
    }

    #[test]
    fn test_required_int_empty_yields_two() {
        let spec = FieldSpec::new("int").required();
        assert_eq!(kinds(&spec, ""), vec!["missing_required", "wrong_type"]);
    }

    #[test]
    fn test_unrecognized_type_never_checked() {
        let spec = FieldSpec::new("date").with_max_length(1);
        assert!(kinds(&spec, "not a date at all").is_empty());
        assert_eq!(kinds(&spec.required(), ""), vec!["missing_required"]);
    }

    #[test]
    fn test_skip_header_rows() {
        let schema = Schema::new().with_table(
            "Orders",
            TableSpec::new().with_field("id", FieldSpec::new("int")),
        );
        let rows: Vec<Row> = vec![
            ["id"].into_iter().collect(),
            ["x"].into_iter().collect(),
        ];

        let mut sink = CollectingSink::default();
        let summary = Validator::new(&schema)
            .skip_header_rows(1)
            .run(&rows, &mut sink);

        assert_eq!(summary.rows_checked, 1);
        assert_eq!(sink.violations().len(), 1);
        assert_eq!(sink.violations()[0].row, 1);
        assert_eq!(sink.violations()[0].value, "x");
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            table: "Orders".to_string(),
            row: 0,
            column: 1,
            field: "name".to_string(),
            value: "toolong".to_string(),
            kind: ViolationKind::TooLong { length: 7, max_length: 5 },
        };
        assert_eq!(
            violation.to_string(),
            "invalid value detected for column name: 'toolong' (length 7 exceeds 5)"
        );
    }
}
