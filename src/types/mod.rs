//! Column descriptions, the type catalog, and output values.

mod catalog;
mod column;
mod metadata;
mod output_type;
mod value;

pub use catalog::{lookup, TypeClass, TypeEntry, TYPE_TABLE};
pub use column::{compile_schema, ColumnDescriptor, Schema, STATUS_COLUMN};
pub use metadata::ColumnDescription;
pub use output_type::OutputType;
pub use value::{DecimalValue, OutputCell};
