//! Sheet Schemas
//!
//! Schema-driven validation of worksheet rows. A schema lists tables, each an
//! ordered set of fields with a type (`int`, `float`, `string`), a required
//! flag and an optional maximum length. Every row is checked against every
//! table, matching values to fields by position.
//!
//! ## Example
//!
//! ```
//! use sheet_schemas::{validate, Row, Schema};
//!
//! let schema = Schema::from_json_str(r#"{
//!     "Orders": {
//!         "id":   {"required": true,  "type": "int"},
//!         "name": {"required": false, "type": "string", "max_length": 5}
//!     }
//! }"#).unwrap();
//!
//! let rows: Vec<Row> = vec![
//!     ["", "toolong"].into_iter().collect(),
//!     ["7", "ok"].into_iter().collect(),
//! ];
//!
//! let found: Vec<_> = validate(&schema, &rows)
//!     .into_iter()
//!     .map(|v| (v.field, v.kind.name()))
//!     .collect();
//! assert_eq!(found, vec![
//!     ("id".to_string(), "missing_required"),
//!     ("id".to_string(), "wrong_type"),
//!     ("name".to_string(), "too_long"),
//! ]);
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod report;
pub mod row;
pub mod schema;
pub mod sink;
pub mod validator;

pub use checksum::Checksum;
pub use config::ValidatorConfig;
pub use error::{SchemaError, Result};
pub use report::ValidationReport;
pub use row::{Row, RowSource};
pub use schema::{FieldSpec, FieldType, Schema, TableSpec};
pub use sink::{CollectingSink, DiagnosticSink, TracingSink};
pub use validator::{validate, ValidationSummary, Validator, Violation, ViolationKind};
