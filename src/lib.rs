//! Row-set fetch bridge for ODBC-style data sources
//!
//! Runs one SQL statement against an opened call-level-interface connection
//! and streams the result, converted to engine-native values, into a row
//! sink. Result columns are compiled once into a typed [`Schema`] through a
//! single type table; rows are fetched many at a time into column-wise
//! buffers and decoded cell by cell.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use dblink_rs::driver::constants::{SQL_BIGINT, SQL_VARCHAR};
//! use dblink_rs::driver::memory::{MemoryConnection, NativeValue};
//! use dblink_rs::{
//!     CancellationToken, ColumnDescription, FetchOptions, Invocation, Result, RowCollector,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = MemoryConnection::new("PostgreSQL").with_result(
//!         "SELECT id, name FROM users",
//!         vec![
//!             ColumnDescription::new("id", SQL_BIGINT),
//!             ColumnDescription::new("name", SQL_VARCHAR).with_size(32),
//!         ],
//!         vec![vec![NativeValue::Int(1), NativeValue::text("ada")]],
//!     );
//!
//!     let mut invocation = Invocation::new(conn, FetchOptions::new())?;
//!     let schema = invocation.describe("SELECT id, name FROM users").await?;
//!
//!     let mut sink = RowCollector::new(Arc::new(schema.clone()));
//!     let summary = invocation
//!         .run("SELECT id, name FROM users", &schema, &CancellationToken::new(), &mut sink)
//!         .await?;
//!
//!     assert_eq!(summary.rows_written, 1);
//!     assert_eq!(sink.rows()[0].get_by_name("name").and_then(|c| c.as_str()), Some("ada"));
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod driver;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod options;
pub mod rowset;
pub mod sink;
pub mod statement;
pub mod types;

// Re-export main types
pub use engine::{Completion, RunSummary};
pub use error::{Diagnostic, Error, Result};
pub use lifecycle::Invocation;
pub use options::{Capabilities, FetchOptions, RowsetSize};
pub use rowset::RowSet;
pub use sink::{OutputRow, OutputSink, RowCollector};
pub use statement::StatementKind;
pub use tokio_util::sync::CancellationToken;
pub use types::{
    compile_schema, ColumnDescription, ColumnDescriptor, DecimalValue, OutputCell, OutputType,
    Schema,
};
