//! Run a query and a command through the scripted in-memory driver
//!
//! RUST_LOG=dblink_rs=debug cargo run --example memory_bridge

use std::sync::Arc;

use dblink_rs::driver::constants::*;
use dblink_rs::driver::memory::{MemoryConnection, NativeValue};
use dblink_rs::driver::structs::{IntervalStruct, TimestampStruct};
use dblink_rs::driver::SqlReturn;
use dblink_rs::{
    CancellationToken, ColumnDescription, FetchOptions, Invocation, Result, RowCollector,
    RowsetSize,
};
use tracing_subscriber::EnvFilter;

const QUERY: &str = "SELECT id, name, price, created, ttl FROM products";
const COMMAND: &str = "UPDATE products SET price = price * 2";

fn connection() -> MemoryConnection {
    let columns = vec![
        ColumnDescription::new("id", SQL_INTEGER).with_size(10).not_null(),
        ColumnDescription::new("name", SQL_VARCHAR).with_size(24),
        ColumnDescription::new("price", SQL_NUMERIC).with_size(10).with_digits(2),
        ColumnDescription::new("created", SQL_TYPE_TIMESTAMP)
            .with_size(26)
            .with_digits(6),
        ColumnDescription::new("ttl", SQL_INTERVAL_DAY_TO_SECOND).with_digits(6),
    ];
    let created = TimestampStruct {
        year: 2024,
        month: 3,
        day: 14,
        hour: 15,
        minute: 9,
        second: 26,
        fraction: 535_897_000,
    };
    let rows = (1..=7)
        .map(|i| {
            vec![
                NativeValue::Int(i),
                if i % 3 == 0 {
                    NativeValue::Null
                } else {
                    NativeValue::text(format!("product-{}", i))
                },
                NativeValue::text(format!("{}.5", i * 10)),
                NativeValue::Timestamp(created),
                NativeValue::Interval(IntervalStruct::day_second(false, i as u32, 1, 0, 0, 0)),
            ]
        })
        .collect();

    MemoryConnection::new("Oracle")
        .with_result(QUERY, columns, rows)
        .with_command(COMMAND, SqlReturn::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dblink_rs=info")),
        )
        .init();

    let options = FetchOptions::new().with_rowset_size(RowsetSize::new(3)?);

    println!("--- Query ---");
    let mut invocation = Invocation::new(connection(), options.clone())?;
    println!(
        "integer-as-text capability: {}",
        invocation.capabilities().integer_as_text
    );
    let schema = invocation.describe(QUERY).await?;
    for column in &schema.columns {
        println!(
            "  {} {} (width {})",
            column.name,
            column.output_type,
            column.element_width()
        );
    }

    let mut sink = RowCollector::new(Arc::new(schema.clone()));
    let summary = invocation
        .run(QUERY, &schema, &CancellationToken::new(), &mut sink)
        .await?;
    for row in sink.rows() {
        println!("  {}", row);
    }
    println!(
        "{} rows in {} fetches ({:?})",
        summary.rows_written, summary.fetch_cycles, summary.completion
    );

    println!("\n--- Command ---");
    let mut invocation = Invocation::new(connection(), options)?;
    let schema = invocation.describe(COMMAND).await?;
    let mut sink = RowCollector::new(Arc::new(schema.clone()));
    invocation
        .run(COMMAND, &schema, &CancellationToken::new(), &mut sink)
        .await?;
    println!("status row: {}", sink.rows()[0].values()[0]);

    Ok(())
}
