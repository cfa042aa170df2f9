//! Raw column description as reported by the driver.
//!
//! This struct preserves what describe returned. The compiled, immutable
//! view used by the engine is `ColumnDescriptor`.

/// Raw column description from the driver.
///
/// Use `ColumnDescriptor` for the compiled view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    /// Column name.
    pub name: String,
    /// Native SQL type code (`SQL_*`).
    pub data_type: i16,
    /// Display size or precision.
    pub column_size: u64,
    /// Scale or fractional-seconds precision.
    pub decimal_digits: i16,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Octet length reported separately from the column size, if any.
    pub octet_length: Option<u64>,
}

impl ColumnDescription {
    /// Create a description with only name and type set.
    pub fn new(name: impl Into<String>, data_type: i16) -> Self {
        Self {
            name: name.into(),
            data_type,
            column_size: 0,
            decimal_digits: 0,
            nullable: true,
            octet_length: None,
        }
    }

    /// Set display size / precision.
    pub fn with_size(mut self, column_size: u64) -> Self {
        self.column_size = column_size;
        self
    }

    /// Set scale / fractional-seconds precision.
    pub fn with_digits(mut self, decimal_digits: i16) -> Self {
        self.decimal_digits = decimal_digits;
        self
    }

    /// Set the separately reported octet length.
    pub fn with_octet_length(mut self, octet_length: u64) -> Self {
        self.octet_length = Some(octet_length);
        self
    }

    /// Mark the column as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}
