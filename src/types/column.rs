//! Compiled column descriptors and the result schema.
//!
//! A [`Schema`] is compiled once from the driver's column descriptions and is
//! never mutated afterwards. The execution phase compiles a second schema
//! from a fresh describe and requires it to have the same shape.

use tracing::debug;

use crate::driver::constants::{SQL_BIGINT, SQL_C_SBIGINT};
use crate::driver::ColumnBinding;
use crate::error::{Error, Result};
use crate::options::Capabilities;

use super::catalog::{lookup, TypeClass};
use super::metadata::ColumnDescription;
use super::output_type::OutputType;

/// Name of the single column produced for non-SELECT statements.
pub const STATUS_COLUMN: &str = "dblink";

/// A compiled result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// 0-based position in the result.
    pub ordinal: usize,
    /// Column name.
    pub name: String,
    /// Native SQL type code.
    pub native_type: i16,
    /// Declared display size or precision.
    pub column_size: u64,
    /// Declared scale or fractional-seconds precision.
    pub decimal_digits: i16,
    /// Type table row.
    pub class: TypeClass,
    /// Chosen output type.
    pub output_type: OutputType,
    /// Transfer layout of the row-set buffer.
    pub binding: ColumnBinding,
}

impl ColumnDescriptor {
    /// Compile one described column.
    ///
    /// Returns `Error::UnsupportedType` for codes outside the type table.
    pub fn compile(
        ordinal: usize,
        desc: &ColumnDescription,
        caps: &Capabilities,
    ) -> Result<Self> {
        let entry = lookup(desc.data_type).ok_or(Error::UnsupportedType {
            ordinal,
            type_code: desc.data_type,
        })?;
        let output_type = entry.class.output_type(desc);
        let binding = entry.class.binding(desc, &output_type, caps);
        Ok(Self {
            ordinal,
            name: desc.name.clone(),
            native_type: desc.data_type,
            column_size: desc.column_size,
            decimal_digits: desc.decimal_digits,
            class: entry.class,
            output_type,
            binding,
        })
    }

    /// Bytes reserved per row in the row-set buffer.
    pub fn element_width(&self) -> usize {
        self.binding.element_width
    }

    /// Whether two descriptors describe the same column shape.
    ///
    /// Compares native type, output type (precision, scale, length) and
    /// binding. Names are not compared.
    pub fn same_shape(&self, other: &ColumnDescriptor) -> bool {
        self.native_type == other.native_type
            && self.output_type == other.output_type
            && self.binding == other.binding
    }

    fn shape(&self) -> String {
        format!(
            "{} (native {}, width {})",
            self.output_type, self.native_type, self.binding.element_width
        )
    }
}

/// Ordered result columns of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Column definitions.
    pub columns: Vec<ColumnDescriptor>,
}

impl Schema {
    /// Create a schema from compiled columns.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Compile a schema from driver descriptions.
    ///
    /// Fails on the first column whose type code is not in the type table.
    pub fn compile(descriptions: &[ColumnDescription], caps: &Capabilities) -> Result<Self> {
        let columns: Result<Vec<ColumnDescriptor>> = descriptions
            .iter()
            .enumerate()
            .map(|(ordinal, desc)| ColumnDescriptor::compile(ordinal, desc, caps))
            .collect();
        let schema = Self { columns: columns? };
        debug!(columns = schema.len(), "compiled result schema");
        Ok(schema)
    }

    /// Schema of the status row emitted for non-SELECT statements.
    pub fn status() -> Self {
        Self {
            columns: vec![ColumnDescriptor {
                ordinal: 0,
                name: STATUS_COLUMN.to_string(),
                native_type: SQL_BIGINT,
                column_size: 19,
                decimal_digits: 0,
                class: TypeClass::Integer,
                output_type: OutputType::Int64,
                binding: ColumnBinding {
                    c_type: SQL_C_SBIGINT,
                    element_width: 8,
                },
            }],
        }
    }

    /// Check that `found` (execution time) has the shape of `self` (compile time).
    pub fn check_matches(&self, found: &Schema) -> Result<()> {
        for (ordinal, expected) in self.columns.iter().enumerate() {
            match found.columns.get(ordinal) {
                Some(actual) if expected.same_shape(actual) => {}
                Some(actual) => {
                    return Err(Error::SchemaMismatch {
                        ordinal,
                        expected: expected.shape(),
                        found: actual.shape(),
                    })
                }
                None => {
                    return Err(Error::SchemaMismatch {
                        ordinal,
                        expected: expected.shape(),
                        found: "no column".to_string(),
                    })
                }
            }
        }
        if let Some(extra) = found.columns.get(self.columns.len()) {
            return Err(Error::SchemaMismatch {
                ordinal: extra.ordinal,
                expected: "no column".to_string(),
                found: extra.shape(),
            });
        }
        Ok(())
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(ordinal)
    }

    /// Find column ordinal by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Compile the output schema for a described result.
pub fn compile_schema(descriptions: &[ColumnDescription], caps: &Capabilities) -> Result<Schema> {
    Schema::compile(descriptions, caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::constants::*;
    use crate::types::catalog::TYPE_TABLE;

    fn make_test_descriptions() -> Vec<ColumnDescription> {
        vec![
            ColumnDescription::new("ID", SQL_INTEGER).with_size(10).not_null(),
            ColumnDescription::new("NAME", SQL_VARCHAR).with_size(10),
            ColumnDescription::new("CREATED", SQL_TYPE_TIMESTAMP)
                .with_size(26)
                .with_digits(6),
        ]
    }

    #[test]
    fn test_compile_schema() {
        let schema = compile_schema(&make_test_descriptions(), &Capabilities::default()).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column_names(), vec!["ID", "NAME", "CREATED"]);
        assert_eq!(schema.columns[0].output_type, OutputType::Int64);
        assert_eq!(
            schema.columns[1].output_type,
            OutputType::VarString { length: 10 }
        );
        assert_eq!(schema.columns[1].element_width(), 11);
        assert_eq!(
            schema.columns[2].output_type,
            OutputType::Timestamp { precision: 6 }
        );
        assert_eq!(schema.find_by_name("created"), Some(2));
        assert_eq!(schema.find_by_name("UNKNOWN"), None);
    }

    #[test]
    fn test_every_table_code_compiles_once() {
        let caps = Capabilities::default();
        for entry in TYPE_TABLE {
            let desc = ColumnDescription::new(entry.name, entry.code)
                .with_size(12)
                .with_digits(3);
            let first = compile_schema(std::slice::from_ref(&desc), &caps).unwrap();
            let second = compile_schema(std::slice::from_ref(&desc), &caps).unwrap();
            assert_eq!(first, second, "recompiling {} changed the schema", entry.name);
            assert_eq!(first.columns[0].class, entry.class);
        }
    }

    #[test]
    fn test_unsupported_type_names_ordinal() {
        let mut descs = make_test_descriptions();
        descs.push(ColumnDescription::new("ID2", SQL_GUID));
        match compile_schema(&descs, &Capabilities::default()) {
            Err(Error::UnsupportedType { ordinal, type_code }) => {
                assert_eq!(ordinal, 3);
                assert_eq!(type_code, SQL_GUID);
            }
            other => panic!("Expected UnsupportedType error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_matches() {
        let caps = Capabilities::default();
        let compiled = compile_schema(&make_test_descriptions(), &caps).unwrap();

        let mut renamed = make_test_descriptions();
        renamed[0].name = "ident".to_string();
        let same = compile_schema(&renamed, &caps).unwrap();
        assert!(compiled.check_matches(&same).is_ok());

        let mut widened = make_test_descriptions();
        widened[1] = ColumnDescription::new("NAME", SQL_VARCHAR).with_size(20);
        let drifted = compile_schema(&widened, &caps).unwrap();
        match compiled.check_matches(&drifted) {
            Err(Error::SchemaMismatch { ordinal, .. }) => assert_eq!(ordinal, 1),
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }

        let shorter = compile_schema(&make_test_descriptions()[..2], &caps).unwrap();
        match compiled.check_matches(&shorter) {
            Err(Error::SchemaMismatch { ordinal, found, .. }) => {
                assert_eq!(ordinal, 2);
                assert_eq!(found, "no column");
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }

        match shorter.check_matches(&compiled) {
            Err(Error::SchemaMismatch { ordinal, .. }) => assert_eq!(ordinal, 2),
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_status_schema() {
        let schema = Schema::status();
        assert_eq!(schema.column_names(), vec![STATUS_COLUMN]);
        assert_eq!(schema.columns[0].output_type, OutputType::Int64);
    }
}
