//! Native call-level interface consumed by the bridge.
//!
//! The bridge never opens sessions itself. It receives an opened, ready
//! [`NativeConnection`] and drives statements through [`NativeStatement`].
//! Method shapes follow the ODBC call-level interface: every call reports a
//! [`SqlReturn`], and failures are explained by the first diagnostic record
//! of the handle that failed.

pub mod constants;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod structs;

use std::fmt;
use std::future::Future;

use crate::error::Diagnostic;
use crate::rowset::RowSet;
use crate::types::ColumnDescription;

/// Return code of a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlReturn(pub i16);

impl SqlReturn {
    pub const SUCCESS: SqlReturn = SqlReturn(0);
    pub const SUCCESS_WITH_INFO: SqlReturn = SqlReturn(1);
    pub const STILL_EXECUTING: SqlReturn = SqlReturn(2);
    pub const NO_DATA: SqlReturn = SqlReturn(100);
    pub const ERROR: SqlReturn = SqlReturn(-1);
    pub const INVALID_HANDLE: SqlReturn = SqlReturn(-2);

    /// `SQL_SUCCEEDED`: success with or without info.
    pub fn succeeded(self) -> bool {
        self == Self::SUCCESS || self == Self::SUCCESS_WITH_INFO
    }
}

impl fmt::Display for SqlReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SUCCESS => write!(f, "SQL_SUCCESS"),
            Self::SUCCESS_WITH_INFO => write!(f, "SQL_SUCCESS_WITH_INFO"),
            Self::STILL_EXECUTING => write!(f, "SQL_STILL_EXECUTING"),
            Self::NO_DATA => write!(f, "SQL_NO_DATA"),
            Self::ERROR => write!(f, "SQL_ERROR"),
            Self::INVALID_HANDLE => write!(f, "SQL_INVALID_HANDLE"),
            SqlReturn(other) => write!(f, "SQLRETURN({})", other),
        }
    }
}

/// Outcome of a native call: the value on success, the failing code otherwise.
pub type NativeResult<T> = std::result::Result<T, SqlReturn>;

/// Which handle a failure belongs to, so the right diagnostics are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Connection,
    Statement,
}

/// How one result column is transferred into its row-set buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBinding {
    /// C transfer type (`SQL_C_*`).
    pub c_type: i16,
    /// Bytes reserved per row, terminator included for text.
    pub element_width: usize,
}

/// Result of a row-set fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// This many rows were written into the row-set.
    Rows(usize),
    /// The result set is exhausted.
    NoData,
}

/// A statement handle.
///
/// Blocking calls (prepare, execute, fetch) are async so that they are the
/// only suspension points of an invocation.
pub trait NativeStatement: Send {
    /// Prepare `sql` for later execution.
    fn prepare(&mut self, sql: &str) -> impl Future<Output = NativeResult<SqlReturn>> + Send;

    /// Number of columns of the prepared result.
    fn num_result_cols(&mut self) -> NativeResult<u16>;

    /// Describe result column `column` (1-based).
    fn describe_col(&mut self, column: u16) -> NativeResult<ColumnDescription>;

    /// Declare the transfer layout of column `column` (1-based).
    fn bind_col(&mut self, column: u16, binding: ColumnBinding) -> NativeResult<()>;

    /// Set the number of rows delivered per fetch (column-wise binding).
    fn set_row_array_size(&mut self, size: usize) -> NativeResult<()>;

    /// Execute the prepared statement. `NO_DATA` is a valid outcome.
    fn execute(&mut self) -> impl Future<Output = NativeResult<SqlReturn>> + Send;

    /// Execute `sql` directly, without binding any result.
    fn exec_direct(&mut self, sql: &str) -> impl Future<Output = NativeResult<SqlReturn>> + Send;

    /// Fetch the next row-set into the bound buffers.
    fn fetch(&mut self, rowset: &mut RowSet) -> impl Future<Output = NativeResult<Fetched>> + Send;

    /// Ask the driver to abandon the running statement.
    fn cancel(&mut self) -> NativeResult<()>;

    /// First diagnostic record of the statement handle.
    fn diagnostic(&self) -> Option<Diagnostic>;

    /// Release the statement handle.
    fn free(&mut self) -> SqlReturn;
}

/// An opened, ready connection together with its environment.
pub trait NativeConnection: Send {
    type Statement: NativeStatement;

    /// Product name of the remote DBMS (`SQL_DBMS_NAME`).
    fn dbms_name(&mut self) -> NativeResult<String>;

    /// Allocate a statement handle on this connection.
    fn alloc_statement(&mut self) -> NativeResult<Self::Statement>;

    /// First diagnostic record of the connection handle.
    fn diagnostic(&self) -> Option<Diagnostic>;

    fn disconnect(&mut self) -> SqlReturn;

    fn free_connection(&mut self) -> SqlReturn;

    fn free_environment(&mut self) -> SqlReturn;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_return_succeeded() {
        assert!(SqlReturn::SUCCESS.succeeded());
        assert!(SqlReturn::SUCCESS_WITH_INFO.succeeded());
        assert!(!SqlReturn::NO_DATA.succeeded());
        assert!(!SqlReturn::ERROR.succeeded());
        assert_eq!(SqlReturn(42).to_string(), "SQLRETURN(42)");
    }
}
