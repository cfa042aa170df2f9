//! Error types for the fetch-decode bridge.

use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of message bytes kept from a native diagnostic record.
pub const MAX_DIAGNOSTIC_LEN: usize = 1024;

/// Fault site: reading the remote DBMS name.
pub const CTX_DBMS_NAME: u32 = 202;
/// Fault site: allocating the working statement.
pub const CTX_ALLOC_STATEMENT: u32 = 111;
/// Fault site: preparing the statement.
pub const CTX_PREPARE: u32 = 112;
/// Fault site: counting result columns.
pub const CTX_NUM_RESULT_COLS: u32 = 115;
/// Fault site: describing a result column.
pub const CTX_DESCRIBE_COL: u32 = 120;
/// Fault site: cancelling the statement.
pub const CTX_CANCEL: u32 = 301;
/// Fault site: binding a column buffer.
pub const CTX_BIND: u32 = 401;
/// Fault site: setting a statement attribute.
pub const CTX_STMT_ATTR: u32 = 402;
/// Fault site: executing the prepared statement.
pub const CTX_EXECUTE: u32 = 403;
/// Fault site: fetching a row-set.
pub const CTX_FETCH: u32 = 409;
/// Fault site: executing a non-SELECT statement directly.
pub const CTX_EXEC_DIRECT: u32 = 408;

/// First diagnostic record of a failed native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Five character SQLSTATE.
    pub state: String,
    /// Vendor specific error code.
    pub native_code: i32,
    /// Message text, cut to [`MAX_DIAGNOSTIC_LEN`] bytes.
    pub message: String,
    /// Whether the message was cut.
    pub truncated: bool,
}

impl Diagnostic {
    /// Build a diagnostic, truncating the message on a char boundary.
    pub fn new(state: impl Into<String>, native_code: i32, message: impl Into<String>) -> Self {
        let mut message = message.into();
        let truncated = message.len() > MAX_DIAGNOSTIC_LEN;
        if truncated {
            let mut cut = MAX_DIAGNOSTIC_LEN;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        Self {
            state: state.into(),
            native_code,
            message,
            truncated,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State {}. Native Code {}. Error text: {}{}",
            self.state,
            self.native_code,
            self.message,
            if self.truncated { '>' } else { '.' }
        )
    }
}

/// Renders the optional diagnostic part of a native fault.
fn diag_suffix(diagnostic: &Option<Diagnostic>) -> String {
    match diagnostic {
        Some(d) => format!(". {}", d),
        None => ". Unable to display native error message".to_string(),
    }
}

/// Error type for bridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A connection-level native call failed.
    #[error("[{context}] {operation}{}", diag_suffix(.diagnostic))]
    Connection {
        context: u32,
        operation: String,
        diagnostic: Option<Diagnostic>,
    },

    /// A statement-level native call (prepare, describe, execute, fetch) failed.
    #[error("[{context}] {operation}{}", diag_suffix(.diagnostic))]
    Statement {
        context: u32,
        operation: String,
        diagnostic: Option<Diagnostic>,
    },

    /// Local validation or allocation error, raised without a native handle.
    #[error("[{context}] {message}")]
    Local { context: u32, message: String },

    /// The executed statement no longer has the shape agreed at compile time.
    #[error("Schema mismatch at column {ordinal}: expected {expected}, found {found}")]
    SchemaMismatch {
        ordinal: usize,
        expected: String,
        found: String,
    },

    /// A described column has a native type code outside the type table.
    #[error("Unsupported data type {type_code} for column {ordinal}")]
    UnsupportedType { ordinal: usize, type_code: i16 },

    /// A bound column cannot be decoded into its output type.
    #[error("Unsupported data type for column {ordinal}")]
    UnsupportedColumnType { ordinal: usize },

    /// The interval struct carries a different sub-kind than the column declares.
    #[error("Unsupported INTERVAL data type for column {ordinal}. Expecting {expected}, got {found}")]
    IntervalMismatch {
        ordinal: usize,
        expected: &'static str,
        found: i32,
    },

    /// Decimal text from the remote side could not be parsed.
    #[error("Error parsing Numeric in column {ordinal}: {reason}")]
    DecimalParse { ordinal: usize, reason: String },

    /// Other value conversion failure (integer text, calendar fields).
    #[error("Type conversion error in column {ordinal}: {message}")]
    TypeConversion { ordinal: usize, message: String },

    /// Row-set size outside the accepted range.
    #[error("Error rowset out of range: {value} (accepted {min}..={max})")]
    RowsetOutOfRange { value: i64, min: usize, max: usize },

    /// Out-of-bounds access into a row-set arena.
    #[error("Row-set slot out of bounds: column {column}, row {row} (capacity {capacity}) at {location}")]
    SlotOutOfBounds {
        column: usize,
        row: usize,
        capacity: usize,
        location: &'static Location<'static>,
    },

    /// The output sink rejected a value.
    #[error("Output sink error: {message}")]
    Sink { message: String },

    /// The invocation has already been torn down.
    #[error("Connection closed")]
    ConnectionClosed,
}

impl Error {
    /// Create a handle-less local error.
    pub fn local(context: u32, message: impl Into<String>) -> Self {
        Self::Local {
            context,
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(ordinal: usize, message: impl Into<String>) -> Self {
        Self::TypeConversion {
            ordinal,
            message: message.into(),
        }
    }

    /// Create a decimal parse error.
    pub fn decimal_parse(ordinal: usize, reason: impl Into<String>) -> Self {
        Self::DecimalParse {
            ordinal,
            reason: reason.into(),
        }
    }

    /// Create an output sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Column ordinal the fault refers to, when there is one.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Error::SchemaMismatch { ordinal, .. }
            | Error::UnsupportedType { ordinal, .. }
            | Error::UnsupportedColumnType { ordinal }
            | Error::IntervalMismatch { ordinal, .. }
            | Error::DecimalParse { ordinal, .. }
            | Error::TypeConversion { ordinal, .. } => Some(*ordinal),
            Error::SlotOutOfBounds { column, .. } => Some(*column),
            _ => None,
        }
    }

    /// Diagnostic record attached to a native fault.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Connection { diagnostic, .. } | Error::Statement { diagnostic, .. } => {
                diagnostic.as_ref()
            }
            _ => None,
        }
    }
}
