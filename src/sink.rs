//! Diagnostic sinks
//!
//! The validator decides what is wrong; a sink decides where that goes.

use serde::Serialize;
use tracing::{error, info};

use crate::error::SchemaError;
use crate::validator::{ValidationSummary, Violation};

/// Receives validator output as it is produced
pub trait DiagnosticSink {
    /// A table is about to be checked against all rows
    fn table_started(&mut self, _table: &str, _columns: usize) {}

    /// Called once per offending value and violation kind
    fn violation(&mut self, violation: &Violation);

    /// A row could not be read while checking `table` and was skipped
    fn row_fault(&mut self, table: &str, row: usize, error: &SchemaError);

    /// The pass finished
    fn complete(&mut self, _summary: &ValidationSummary) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn table_started(&mut self, table: &str, columns: usize) {
        (**self).table_started(table, columns)
    }

    fn violation(&mut self, violation: &Violation) {
        (**self).violation(violation)
    }

    fn row_fault(&mut self, table: &str, row: usize, error: &SchemaError) {
        (**self).row_fault(table, row, error)
    }

    fn complete(&mut self, summary: &ValidationSummary) {
        (**self).complete(summary)
    }
}

/// Fan out to two sinks, first `A` then `B`
impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for (A, B) {
    fn table_started(&mut self, table: &str, columns: usize) {
        self.0.table_started(table, columns);
        self.1.table_started(table, columns);
    }

    fn violation(&mut self, violation: &Violation) {
        self.0.violation(violation);
        self.1.violation(violation);
    }

    fn row_fault(&mut self, table: &str, row: usize, error: &SchemaError) {
        self.0.row_fault(table, row, error);
        self.1.row_fault(table, row, error);
    }

    fn complete(&mut self, summary: &ValidationSummary) {
        self.0.complete(summary);
        self.1.complete(summary);
    }
}

/// Writes one log line per violation through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn table_started(&mut self, table: &str, columns: usize) {
        info!(columns, "Running checks for table {}", table);
    }

    fn violation(&mut self, violation: &Violation) {
        error!(
            table = %violation.table,
            row = violation.row,
            column = violation.column,
            kind = violation.kind.name(),
            "{}",
            violation
        );
    }

    fn row_fault(&mut self, table: &str, row: usize, error: &SchemaError) {
        error!(table, row, "skipping row: {}", error);
    }

    fn complete(&mut self, summary: &ValidationSummary) {
        info!(
            tables = summary.tables_checked,
            rows = summary.rows_checked,
            violations = summary.violations,
            row_faults = summary.row_faults,
            "Validation complete."
        );
    }
}

/// A row skipped during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFaultRecord {
    pub table: String,
    pub row: usize,
    pub reason: String,
}

/// Keeps everything it is sent, in order
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    violations: Vec<Violation>,
    row_faults: Vec<RowFaultRecord>,
    summary: Option<ValidationSummary>,
}

impl CollectingSink {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn row_faults(&self) -> &[RowFaultRecord] {
        &self.row_faults
    }

    /// Set once the pass has completed
    pub fn summary(&self) -> Option<&ValidationSummary> {
        self.summary.as_ref()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn into_parts(self) -> (Vec<Violation>, Vec<RowFaultRecord>) {
        (self.violations, self.row_faults)
    }
}

impl DiagnosticSink for CollectingSink {
    fn violation(&mut self, violation: &Violation) {
        self.violations.push(violation.clone());
    }

    fn row_fault(&mut self, table: &str, row: usize, error: &SchemaError) {
        let reason = match error {
            SchemaError::RowFault { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.row_faults.push(RowFaultRecord {
            table: table.to_string(),
            row,
            reason,
        });
    }

    fn complete(&mut self, summary: &ValidationSummary) {
        self.summary = Some(*summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ViolationKind;

    fn violation(field: &str) -> Violation {
        Violation {
            table: "Orders".to_string(),
            row: 0,
            column: 0,
            field: field.to_string(),
            value: String::new(),
            kind: ViolationKind::MissingRequired,
        }
    }

    #[test]
    fn test_tuple_sink_reaches_both() {
        let mut sink = (CollectingSink::default(), CollectingSink::default());
        sink.violation(&violation("id"));
        sink.complete(&ValidationSummary::default());
        assert_eq!(sink.0.violations().len(), 1);
        assert_eq!(sink.1.violations().len(), 1);
        assert!(sink.1.summary().is_some());
    }

    #[test]
    fn test_collecting_sink_records_fault_reason() {
        let mut sink = CollectingSink::default();
        let err = SchemaError::RowFault {
            row: 4,
            reason: "expected an array of cells, got a string".to_string(),
        };
        sink.row_fault("Orders", 4, &err);
        let (violations, faults) = sink.into_parts();
        assert!(violations.is_empty());
        assert_eq!(
            faults,
            vec![RowFaultRecord {
                table: "Orders".to_string(),
                row: 4,
                reason: "expected an array of cells, got a string".to_string(),
            }]
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_sink_log_lines() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut sink = TracingSink;
            sink.table_started("Orders", 2);
            sink.violation(&Violation {
                value: "toolong".to_string(),
                column: 1,
                kind: ViolationKind::TooLong { length: 7, max_length: 5 },
                ..violation("name")
            });
            sink.row_fault(
                "Orders",
                3,
                &SchemaError::RowFault { row: 3, reason: "cell 0 is an object, not a scalar".to_string() },
            );
            sink.complete(&ValidationSummary { tables_checked: 1, rows_checked: 4, row_faults: 1, violations: 1 });
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4, "{}", output);
        assert!(lines[0].contains("INFO") && lines[0].contains("Running checks for table Orders"));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("invalid value detected for column name: 'toolong' (length 7 exceeds 5)"));
        assert!(lines[1].contains("kind=") && lines[1].contains("too_long"));
        assert!(lines[2].contains("skipping row") && lines[2].contains("row=3"));
        assert!(lines[3].contains("INFO") && lines[3].contains("Validation complete."));
        assert!(lines[3].contains("violations=1"));
    }
}
