//! Statement execution: plan-time describe and the fetch-decode loop.
//!
//! A run goes through these phases:
//!
//! 1. **Classify**: text starting with `SELECT` is a query, anything else a
//!    command.
//! 2. **Describe** (queries): prepare, count and describe the columns,
//!    compile the schema. At execution the statement is prepared and
//!    described again, and the fresh schema must have the shape the caller
//!    planned with.
//! 3. **Bind**: allocate the row-set, bind every column column-wise and set
//!    the row array size.
//! 4. **Fetch and decode**: one fetch per row-set until the driver reports
//!    no data or the cancellation token fires. Every row is written to the
//!    sink column by column, then finished with `next_row`.
//!
//! Commands are executed directly and answered with a single status row
//! holding the native return code.
//!
//! Every path ends in teardown, whether the run finished, was cancelled or
//! failed.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::decode::decode_cell;
use crate::driver::{Fetched, HandleKind, NativeConnection, NativeStatement};
use crate::error::{
    Error, Result, CTX_ALLOC_STATEMENT, CTX_BIND, CTX_CANCEL, CTX_DESCRIBE_COL, CTX_EXECUTE,
    CTX_EXEC_DIRECT, CTX_FETCH, CTX_NUM_RESULT_COLS, CTX_PREPARE, CTX_STMT_ATTR,
};
use crate::lifecycle::Invocation;
use crate::rowset::RowSet;
use crate::sink::OutputSink;
use crate::statement::StatementKind;
use crate::types::{OutputCell, Schema};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The driver reported no more data.
    Finished,
    /// The cancellation token fired between fetches.
    Cancelled,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows handed to the sink.
    pub rows_written: u64,
    /// Fetch calls that delivered rows.
    pub fetch_cycles: u64,
    pub completion: Completion,
}

impl RunSummary {
    fn new(rows_written: u64, fetch_cycles: u64, completion: Completion) -> Self {
        Self {
            rows_written,
            fetch_cycles,
            completion,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.completion == Completion::Cancelled
    }
}

impl<C: NativeConnection> Invocation<C> {
    /// Compile the output schema `sql` will produce.
    ///
    /// Commands always produce the single-column status schema. Queries are
    /// prepared and described on a statement handle that is released again
    /// before returning; the connection stays open for [`Invocation::run`].
    #[instrument(skip_all, fields(kind = ?StatementKind::classify(sql)))]
    pub async fn describe(&mut self, sql: &str) -> Result<Schema> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        if !StatementKind::classify(sql).is_query() {
            return Ok(Schema::status());
        }
        self.prepare(sql).await?;
        let schema = self.describe_prepared()?;
        self.release_statement();
        Ok(schema)
    }

    /// Execute `sql` and stream its rows into `sink`.
    ///
    /// `schema` is the schema returned by [`Invocation::describe`]. The
    /// invocation is torn down when this returns, whatever the outcome.
    #[instrument(skip_all, fields(kind = ?StatementKind::classify(sql)))]
    pub async fn run<S: OutputSink>(
        &mut self,
        sql: &str,
        schema: &Schema,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<RunSummary> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        info!(
            columns = schema.len(),
            rowset = self.options.rowset_size.get(),
            "run started"
        );
        let outcome = match StatementKind::classify(sql) {
            StatementKind::Query => self.run_query(sql, schema, cancel, sink).await,
            StatementKind::Command => self.run_command(sql, schema, cancel, sink).await,
        };
        self.teardown();
        if let Ok(summary) = &outcome {
            info!(
                rows = summary.rows_written,
                fetches = summary.fetch_cycles,
                completion = ?summary.completion,
                "run complete"
            );
        }
        outcome
    }

    async fn run_query<S: OutputSink>(
        &mut self,
        sql: &str,
        expected: &Schema,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<RunSummary> {
        self.prepare(sql).await?;
        let found = self.describe_prepared()?;
        if let Err(err) = expected.check_matches(&found) {
            return Err(self.abort(err));
        }
        self.bind(expected)?;

        let outcome = self.statement_mut()?.execute().await;
        let ret = self.check(
            HandleKind::Statement,
            CTX_EXECUTE,
            "Error executing the statement",
            outcome,
        )?;
        debug!(%ret, "statement executed");

        let mut rows_written = 0u64;
        let mut fetch_cycles = 0u64;
        loop {
            if cancel.is_cancelled() {
                self.cancel_statement();
                return Ok(RunSummary::new(
                    rows_written,
                    fetch_cycles,
                    Completion::Cancelled,
                ));
            }

            let statement = self.statement.as_mut().ok_or(Error::ConnectionClosed)?;
            let rowset = self.rowset.as_mut().ok_or(Error::ConnectionClosed)?;
            let capacity = rowset.capacity();
            let outcome = statement.fetch(rowset).await;
            let fetched = self.check(
                HandleKind::Statement,
                CTX_FETCH,
                "Error fetching rows",
                outcome,
            )?;
            let count = match fetched {
                Fetched::NoData | Fetched::Rows(0) => break,
                Fetched::Rows(n) => n.min(capacity),
            };
            fetch_cycles += 1;
            trace!(fetch_cycles, rows = count, "row-set fetched");

            if let Err(err) = self.emit(expected, count, sink) {
                return Err(self.abort(err));
            }
            rows_written += count as u64;
        }
        Ok(RunSummary::new(
            rows_written,
            fetch_cycles,
            Completion::Finished,
        ))
    }

    async fn run_command<S: OutputSink>(
        &mut self,
        sql: &str,
        expected: &Schema,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<RunSummary> {
        if let Err(err) = expected.check_matches(&Schema::status()) {
            return Err(self.abort(err));
        }
        if cancel.is_cancelled() {
            return Ok(RunSummary::new(0, 0, Completion::Cancelled));
        }
        self.allocate_statement()?;
        let outcome = self.statement_mut()?.exec_direct(sql).await;
        let ret = self.check(
            HandleKind::Statement,
            CTX_EXEC_DIRECT,
            "Error executing statement",
            outcome,
        )?;
        debug!(%ret, "command executed");

        let status = OutputCell::Int64(i64::from(ret.0));
        if let Err(err) = sink.set(0, status).and_then(|_| sink.next_row()) {
            return Err(self.abort(err));
        }
        Ok(RunSummary::new(1, 0, Completion::Finished))
    }

    fn allocate_statement(&mut self) -> Result<()> {
        if self.statement.is_none() {
            let outcome = self.connection_mut()?.alloc_statement();
            let statement = self.check(
                HandleKind::Connection,
                CTX_ALLOC_STATEMENT,
                "Error allocating Statement Handle",
                outcome,
            )?;
            self.statement = Some(statement);
        }
        Ok(())
    }

    /// Prepare `sql` on a fresh statement handle.
    async fn prepare(&mut self, sql: &str) -> Result<()> {
        self.release_statement();
        self.allocate_statement()?;
        let outcome = self.statement_mut()?.prepare(sql).await;
        self.check(
            HandleKind::Statement,
            CTX_PREPARE,
            "Error preparing the statement",
            outcome,
        )?;
        Ok(())
    }

    fn describe_prepared(&mut self) -> Result<Schema> {
        let outcome = self.statement_mut()?.num_result_cols();
        let count = self.check(
            HandleKind::Statement,
            CTX_NUM_RESULT_COLS,
            "Error finding the number of resulting columns",
            outcome,
        )?;
        let mut descriptions = Vec::with_capacity(usize::from(count));
        for column in 1..=count {
            let outcome = self.statement_mut()?.describe_col(column);
            let description = self.check(
                HandleKind::Statement,
                CTX_DESCRIBE_COL,
                "Error getting column description",
                outcome,
            )?;
            descriptions.push(description);
        }
        let compiled = Schema::compile(&descriptions, &self.capabilities);
        compiled.map_err(|err| self.abort(err))
    }

    /// Allocate the row-set and bind every column of `schema` to it.
    fn bind(&mut self, schema: &Schema) -> Result<()> {
        let rowset_size = self.options.rowset_size;
        self.rowset = Some(RowSet::allocate(schema, rowset_size));

        for column in &schema.columns {
            let Ok(number) = u16::try_from(column.ordinal + 1) else {
                let err = Error::local(CTX_BIND, format!("column {} out of range", column.ordinal));
                return Err(self.abort(err));
            };
            let outcome = self.statement_mut()?.bind_col(number, column.binding);
            self.check(
                HandleKind::Statement,
                CTX_BIND,
                "Error binding column",
                outcome,
            )?;
            trace!(
                column = number,
                c_type = column.binding.c_type,
                width = column.binding.element_width,
                "column bound"
            );
        }

        let outcome = self.statement_mut()?.set_row_array_size(rowset_size.get());
        self.check(
            HandleKind::Statement,
            CTX_STMT_ATTR,
            "Error setting statement attribute SQL_ATTR_ROW_ARRAY_SIZE",
            outcome,
        )?;
        debug!(
            rowset = rowset_size.get(),
            bytes = self.rowset.as_ref().map_or(0, RowSet::byte_len),
            "row-set bound"
        );
        Ok(())
    }

    /// Decode the first `count` rows of the row-set into `sink`.
    fn emit<S: OutputSink>(&self, schema: &Schema, count: usize, sink: &mut S) -> Result<()> {
        let rowset = self.rowset.as_ref().ok_or(Error::ConnectionClosed)?;
        for row in 0..count {
            for column in &schema.columns {
                match decode_cell(rowset, column, row)? {
                    OutputCell::Null => sink.set_null(column.ordinal)?,
                    cell => sink.set(column.ordinal, cell)?,
                }
            }
            sink.next_row()?;
        }
        Ok(())
    }

    /// Ask the driver to stop the statement; failure only gets logged.
    fn cancel_statement(&mut self) {
        if let Some(statement) = self.statement.as_mut() {
            match statement.cancel() {
                Ok(()) => debug!("statement cancelled"),
                Err(ret) => {
                    let diagnostic = statement.diagnostic();
                    warn!(
                        context = CTX_CANCEL,
                        %ret,
                        ?diagnostic,
                        "statement cancel failed"
                    );
                }
            }
        }
    }
}
