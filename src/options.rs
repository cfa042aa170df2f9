//! Invocation options and connection capabilities.

use crate::driver::constants::{DEFAULT_ROWSET, MAX_ROWSET};
use crate::error::{Error, Result};

/// Number of rows fetched per native fetch call, validated to `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsetSize(usize);

impl RowsetSize {
    /// Validate a row-set size supplied by the caller.
    ///
    /// # Example
    ///
    /// ```
    /// use dblink_rs::RowsetSize;
    ///
    /// assert_eq!(RowsetSize::new(250).unwrap().get(), 250);
    /// assert!(RowsetSize::new(0).is_err());
    /// assert!(RowsetSize::new(1001).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 || value > MAX_ROWSET as i64 {
            return Err(Error::RowsetOutOfRange {
                value,
                min: 1,
                max: MAX_ROWSET,
            });
        }
        Ok(Self(value as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for RowsetSize {
    fn default() -> Self {
        Self(DEFAULT_ROWSET)
    }
}

impl TryFrom<i64> for RowsetSize {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

/// Per-connection binding workarounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Bind integer columns as text because the back-end's binary integer
    /// transfer is unreliable.
    pub integer_as_text: bool,
}

impl Capabilities {
    pub fn with_integer_as_text(mut self, enabled: bool) -> Self {
        self.integer_as_text = enabled;
        self
    }

    /// Derive capabilities from the remote DBMS name.
    pub fn for_dbms(dbms_name: &str, options: &FetchOptions) -> Self {
        let integer_as_text = options
            .integer_text_backends
            .iter()
            .any(|name| name.eq_ignore_ascii_case(dbms_name.trim()));
        Self { integer_as_text }
    }
}

/// Options for one invocation.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Rows per fetch (default: 100).
    pub rowset_size: RowsetSize,
    /// DBMS names (as reported by `SQL_DBMS_NAME`) that need integers bound
    /// as text (default: `["Oracle"]`).
    pub integer_text_backends: Vec<String>,
}

impl FetchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self {
            rowset_size: RowsetSize::default(),
            integer_text_backends: vec!["Oracle".to_string()],
        }
    }

    /// Set the row-set size.
    ///
    /// # Example
    ///
    /// ```
    /// use dblink_rs::{FetchOptions, RowsetSize};
    ///
    /// let options = FetchOptions::new().with_rowset_size(RowsetSize::new(500)?);
    /// assert_eq!(options.rowset_size.get(), 500);
    /// # Ok::<(), dblink_rs::Error>(())
    /// ```
    pub fn with_rowset_size(mut self, rowset_size: RowsetSize) -> Self {
        self.rowset_size = rowset_size;
        self
    }

    /// Declare another back-end that needs integers bound as text.
    pub fn with_integer_text_backend(mut self, dbms_name: impl Into<String>) -> Self {
        self.integer_text_backends.push(dbms_name.into());
        self
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rowset_bounds() {
        assert_eq!(RowsetSize::default().get(), 100);
        assert_eq!(RowsetSize::new(1).unwrap().get(), 1);
        assert_eq!(RowsetSize::new(1000).unwrap().get(), 1000);
        match RowsetSize::try_from(-5) {
            Err(Error::RowsetOutOfRange { value, min, max }) => {
                assert_eq!(value, -5);
                assert_eq!(min, 1);
                assert_eq!(max, 1000);
            }
            other => panic!("Expected RowsetOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_capabilities_for_dbms() {
        let options = FetchOptions::new();
        assert!(Capabilities::for_dbms("Oracle", &options).integer_as_text);
        assert!(!Capabilities::for_dbms("PostgreSQL", &options).integer_as_text);

        let options = options.with_integer_text_backend("Teradata");
        assert!(Capabilities::for_dbms("teradata", &options).integer_as_text);
    }
}
