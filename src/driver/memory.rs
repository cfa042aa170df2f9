//! Scripted in-memory driver.
//!
//! [`MemoryConnection`] answers statements from a script of result sets and
//! command outcomes, filling bound row-set buffers the way a column-wise
//! ODBC driver does. It can inject failures with a diagnostic record at any
//! call, report `SQL_NTS` indicators for strings, stamp garbage under NULL
//! cells, and trigger a cancellation token after a number of fetches.
//!
//! Every call that matters for ordering is appended to a shared
//! [`EventLog`], so callers can check fetch sizes and release order after
//! the connection has been consumed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use super::constants::*;
use super::structs::{DateStruct, IntervalStruct, TimeStruct, TimestampStruct};
use super::{ColumnBinding, Fetched, NativeConnection, NativeResult, NativeStatement, SqlReturn};
use crate::error::Diagnostic;
use crate::rowset::RowSet;
use crate::types::ColumnDescription;

/// Byte stamped into NULL slots when poisoning is on.
const POISON: u8 = 0xA5;

/// A value held by the script, before transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Int(i64),
    Double(f64),
    /// Character data; also used for decimals, which transfer as text.
    Text(String),
    /// Character data reported with an `SQL_NTS` indicator.
    UnknownLength(String),
    Bytes(Vec<u8>),
    Date(DateStruct),
    Time(TimeStruct),
    Timestamp(TimestampStruct),
    Bit(bool),
    Interval(IntervalStruct),
}

impl NativeValue {
    pub fn text(value: impl Into<String>) -> Self {
        NativeValue::Text(value.into())
    }
}

/// Native call a failure can be injected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DbmsName,
    AllocStatement,
    Prepare,
    NumResultCols,
    DescribeCol,
    BindCol,
    SetRowArraySize,
    Execute,
    ExecDirect,
    /// The n-th fetch call (1-based).
    Fetch(usize),
    Cancel,
}

/// Observable driver activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Prepared(String),
    Bound(u16, ColumnBinding),
    RowArraySize(usize),
    Executed,
    ExecutedDirect(String),
    /// A fetch that delivered this many rows.
    Fetched(usize),
    FetchedNoData,
    Cancelled,
    StatementFreed,
    Disconnected,
    ConnectionFreed,
    EnvironmentFreed,
}

impl DriverEvent {
    fn is_release(&self) -> bool {
        matches!(
            self,
            DriverEvent::StatementFreed
                | DriverEvent::Disconnected
                | DriverEvent::ConnectionFreed
                | DriverEvent::EnvironmentFreed
        )
    }
}

/// Shared record of driver activity.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<DriverEvent>>>,
}

impl EventLog {
    fn lock(&self) -> MutexGuard<'_, Vec<DriverEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: DriverEvent) {
        self.lock().push(event);
    }

    /// Every event so far.
    pub fn events(&self) -> Vec<DriverEvent> {
        self.lock().clone()
    }

    /// Rows delivered by each fetch that returned data.
    pub fn fetch_sizes(&self) -> Vec<usize> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Fetched(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Release events in the order they happened.
    pub fn releases(&self) -> Vec<DriverEvent> {
        self.lock()
            .iter()
            .filter(|e| e.is_release())
            .cloned()
            .collect()
    }

    /// Number of events equal to `event`.
    pub fn count(&self, event: &DriverEvent) -> usize {
        self.lock().iter().filter(|e| *e == event).count()
    }
}

/// A scripted result set.
#[derive(Debug, Clone, Default)]
struct ScriptedResult {
    columns: Vec<ColumnDescription>,
    rows: Vec<Vec<NativeValue>>,
}

#[derive(Debug, Clone, Default)]
struct Script {
    results: HashMap<String, ScriptedResult>,
    /// Descriptions reported from the second preparation of a text on.
    drifted: HashMap<String, Vec<ColumnDescription>>,
    commands: HashMap<String, SqlReturn>,
    failures: Vec<(Operation, Diagnostic)>,
    poison_nulls: bool,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl Script {
    fn failure(&self, operation: Operation) -> Option<&Diagnostic> {
        self.failures
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, diag)| diag)
    }
}

/// In-memory connection answering from a script.
#[derive(Debug)]
pub struct MemoryConnection {
    dbms_name: String,
    script: Arc<Script>,
    log: EventLog,
    last_diagnostic: Option<Diagnostic>,
    /// Number of statements prepared per SQL text, shared with statements.
    prepares: Arc<Mutex<HashMap<String, usize>>>,
}

impl MemoryConnection {
    /// Create a connection to a back-end reporting `dbms_name`.
    pub fn new(dbms_name: impl Into<String>) -> Self {
        Self {
            dbms_name: dbms_name.into(),
            script: Arc::new(Script::default()),
            log: EventLog::default(),
            last_diagnostic: None,
            prepares: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Answer `sql` with a result set.
    pub fn with_result(
        mut self,
        sql: impl Into<String>,
        columns: Vec<ColumnDescription>,
        rows: Vec<Vec<NativeValue>>,
    ) -> Self {
        Arc::make_mut(&mut self.script)
            .results
            .insert(sql.into(), ScriptedResult { columns, rows });
        self
    }

    /// Describe `sql` with `columns` from its second preparation on.
    pub fn with_drift(mut self, sql: impl Into<String>, columns: Vec<ColumnDescription>) -> Self {
        Arc::make_mut(&mut self.script)
            .drifted
            .insert(sql.into(), columns);
        self
    }

    /// Answer a directly executed `sql` with `ret`.
    pub fn with_command(mut self, sql: impl Into<String>, ret: SqlReturn) -> Self {
        Arc::make_mut(&mut self.script)
            .commands
            .insert(sql.into(), ret);
        self
    }

    /// Fail `operation` with `diagnostic`.
    pub fn fail_on(mut self, operation: Operation, diagnostic: Diagnostic) -> Self {
        Arc::make_mut(&mut self.script)
            .failures
            .push((operation, diagnostic));
        self
    }

    /// Stamp garbage into the slots of NULL cells.
    pub fn poison_nulls(mut self) -> Self {
        Arc::make_mut(&mut self.script).poison_nulls = true;
        self
    }

    /// Cancel `token` right after the `fetches`-th fetch returns.
    pub fn cancel_after_fetches(mut self, fetches: usize, token: CancellationToken) -> Self {
        Arc::make_mut(&mut self.script).cancel_after = Some((fetches, token));
        self
    }

    /// Handle on the activity log; stays valid after the connection is gone.
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    fn fail(&mut self, operation: Operation) -> NativeResult<()> {
        match self.script.failure(operation) {
            Some(diag) => {
                self.last_diagnostic = Some(diag.clone());
                Err(SqlReturn::ERROR)
            }
            None => Ok(()),
        }
    }
}

impl NativeConnection for MemoryConnection {
    type Statement = MemoryStatement;

    fn dbms_name(&mut self) -> NativeResult<String> {
        self.fail(Operation::DbmsName)?;
        Ok(self.dbms_name.clone())
    }

    fn alloc_statement(&mut self) -> NativeResult<MemoryStatement> {
        self.fail(Operation::AllocStatement)?;
        Ok(MemoryStatement {
            script: Arc::clone(&self.script),
            log: self.log.clone(),
            prepares: Arc::clone(&self.prepares),
            last_diagnostic: None,
            prepared: None,
            columns: Vec::new(),
            bindings: BTreeMap::new(),
            row_array_size: 1,
            position: None,
            fetches: 0,
        })
    }

    fn diagnostic(&self) -> Option<Diagnostic> {
        self.last_diagnostic.clone()
    }

    fn disconnect(&mut self) -> SqlReturn {
        self.log.push(DriverEvent::Disconnected);
        SqlReturn::SUCCESS
    }

    fn free_connection(&mut self) -> SqlReturn {
        self.log.push(DriverEvent::ConnectionFreed);
        SqlReturn::SUCCESS
    }

    fn free_environment(&mut self) -> SqlReturn {
        self.log.push(DriverEvent::EnvironmentFreed);
        SqlReturn::SUCCESS
    }
}

/// Statement handle of a [`MemoryConnection`].
#[derive(Debug)]
pub struct MemoryStatement {
    script: Arc<Script>,
    log: EventLog,
    prepares: Arc<Mutex<HashMap<String, usize>>>,
    last_diagnostic: Option<Diagnostic>,
    prepared: Option<String>,
    columns: Vec<ColumnDescription>,
    bindings: BTreeMap<u16, ColumnBinding>,
    row_array_size: usize,
    /// Next row to deliver; `None` until executed.
    position: Option<usize>,
    fetches: usize,
}

impl MemoryStatement {
    fn fail(&mut self, operation: Operation) -> NativeResult<()> {
        match self.script.failure(operation) {
            Some(diag) => {
                self.last_diagnostic = Some(diag.clone());
                Err(SqlReturn::ERROR)
            }
            None => Ok(()),
        }
    }

    fn error(&mut self, state: &str, message: &str) -> SqlReturn {
        self.last_diagnostic = Some(Diagnostic::new(state, 0, message));
        SqlReturn::ERROR
    }

    fn result(&self) -> Option<&ScriptedResult> {
        self.prepared
            .as_ref()
            .and_then(|sql| self.script.results.get(sql))
    }

    /// Transfer one value into `(column, row)` according to `binding`.
    fn transfer(
        &mut self,
        rowset: &mut RowSet,
        column: usize,
        row: usize,
        binding: ColumnBinding,
        value: &NativeValue,
    ) -> NativeResult<()> {
        let poison = self.script.poison_nulls;
        let Ok(slot) = rowset.slot_mut(column, row) else {
            return Err(self.error("HY090", "Invalid string or buffer length"));
        };
        let indicator = match (value, binding.c_type) {
            (NativeValue::Null, _) => {
                if poison {
                    slot.fill(POISON);
                }
                SQL_NULL_DATA
            }
            (NativeValue::Int(v), SQL_C_SBIGINT) if slot.len() >= 8 => {
                slot[..8].copy_from_slice(&v.to_ne_bytes());
                8
            }
            (NativeValue::Int(v), SQL_C_CHAR) => write_text(slot, &v.to_string()),
            (NativeValue::Double(v), SQL_C_DOUBLE) if slot.len() >= 8 => {
                slot[..8].copy_from_slice(&v.to_ne_bytes());
                8
            }
            (NativeValue::Text(s), SQL_C_CHAR) => write_text(slot, s),
            (NativeValue::UnknownLength(s), SQL_C_CHAR) => {
                write_text(slot, s);
                SQL_NTS
            }
            (NativeValue::Bytes(b), SQL_C_BINARY) => {
                let n = b.len().min(slot.len());
                slot[..n].copy_from_slice(&b[..n]);
                b.len() as i64
            }
            (NativeValue::Date(d), SQL_C_TYPE_DATE) if slot.len() >= DATE_STRUCT_LEN => {
                d.write(slot);
                DATE_STRUCT_LEN as i64
            }
            (NativeValue::Time(t), SQL_C_TYPE_TIME) if slot.len() >= TIME_STRUCT_LEN => {
                t.write(slot);
                TIME_STRUCT_LEN as i64
            }
            (NativeValue::Timestamp(ts), SQL_C_TYPE_TIMESTAMP)
                if slot.len() >= TIMESTAMP_STRUCT_LEN =>
            {
                ts.write(slot);
                TIMESTAMP_STRUCT_LEN as i64
            }
            (NativeValue::Bit(b), SQL_C_BIT) if !slot.is_empty() => {
                slot[0] = if *b { SQL_TRUE } else { SQL_FALSE };
                1
            }
            (
                NativeValue::Interval(iv),
                SQL_C_INTERVAL_YEAR_TO_MONTH | SQL_C_INTERVAL_DAY_TO_SECOND,
            ) if slot.len() >= INTERVAL_STRUCT_LEN => {
                iv.write(slot);
                INTERVAL_STRUCT_LEN as i64
            }
            _ => {
                return Err(self.error("07006", "Restricted data type attribute violation"));
            }
        };
        if rowset.set_indicator(column, row, indicator).is_err() {
            return Err(self.error("HY090", "Invalid string or buffer length"));
        }
        Ok(())
    }
}

/// Copy `text` NUL-terminated into `slot`, truncating to fit; the
/// indicator is the full length, as drivers report it.
fn write_text(slot: &mut [u8], text: &str) -> i64 {
    let bytes = text.as_bytes();
    let room = slot.len().saturating_sub(1);
    let n = bytes.len().min(room);
    slot[..n].copy_from_slice(&bytes[..n]);
    if let Some(terminator) = slot.get_mut(n) {
        *terminator = 0;
    }
    bytes.len() as i64
}

impl NativeStatement for MemoryStatement {
    async fn prepare(&mut self, sql: &str) -> NativeResult<SqlReturn> {
        self.fail(Operation::Prepare)?;
        let Some(result) = self.script.results.get(sql) else {
            return Err(self.error("42S02", "Base table or view not found"));
        };
        let seen = {
            let mut prepares = self
                .prepares
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let count = prepares.entry(sql.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.columns = match self.script.drifted.get(sql) {
            Some(drifted) if seen > 1 => drifted.clone(),
            _ => result.columns.clone(),
        };
        self.prepared = Some(sql.to_string());
        self.bindings.clear();
        self.position = None;
        self.log.push(DriverEvent::Prepared(sql.to_string()));
        Ok(SqlReturn::SUCCESS)
    }

    fn num_result_cols(&mut self) -> NativeResult<u16> {
        self.fail(Operation::NumResultCols)?;
        if self.prepared.is_none() {
            return Err(self.error("HY010", "Function sequence error"));
        }
        Ok(self.columns.len() as u16)
    }

    fn describe_col(&mut self, column: u16) -> NativeResult<ColumnDescription> {
        self.fail(Operation::DescribeCol)?;
        let index = usize::from(column).wrapping_sub(1);
        match self.columns.get(index) {
            Some(desc) => Ok(desc.clone()),
            None => Err(self.error("07009", "Invalid descriptor index")),
        }
    }

    fn bind_col(&mut self, column: u16, binding: ColumnBinding) -> NativeResult<()> {
        self.fail(Operation::BindCol)?;
        if column == 0 || usize::from(column) > self.columns.len() {
            return Err(self.error("07009", "Invalid descriptor index"));
        }
        self.bindings.insert(column, binding);
        self.log.push(DriverEvent::Bound(column, binding));
        Ok(())
    }

    fn set_row_array_size(&mut self, size: usize) -> NativeResult<()> {
        self.fail(Operation::SetRowArraySize)?;
        if size == 0 {
            return Err(self.error("HY024", "Invalid attribute value"));
        }
        self.row_array_size = size;
        self.log.push(DriverEvent::RowArraySize(size));
        Ok(())
    }

    async fn execute(&mut self) -> NativeResult<SqlReturn> {
        self.fail(Operation::Execute)?;
        let Some(empty) = self.result().map(|r| r.rows.is_empty()) else {
            return Err(self.error("HY010", "Function sequence error"));
        };
        self.position = Some(0);
        self.log.push(DriverEvent::Executed);
        tokio::task::yield_now().await;
        Ok(if empty {
            SqlReturn::NO_DATA
        } else {
            SqlReturn::SUCCESS
        })
    }

    async fn exec_direct(&mut self, sql: &str) -> NativeResult<SqlReturn> {
        self.fail(Operation::ExecDirect)?;
        let ret = self
            .script
            .commands
            .get(sql)
            .copied()
            .unwrap_or(SqlReturn::SUCCESS);
        self.log.push(DriverEvent::ExecutedDirect(sql.to_string()));
        tokio::task::yield_now().await;
        if ret.succeeded() || ret == SqlReturn::NO_DATA {
            Ok(ret)
        } else {
            self.last_diagnostic = Some(Diagnostic::new("HY000", 0, "General error"));
            Err(ret)
        }
    }

    async fn fetch(&mut self, rowset: &mut RowSet) -> NativeResult<Fetched> {
        self.fetches += 1;
        self.fail(Operation::Fetch(self.fetches))?;
        let Some(start) = self.position else {
            return Err(self.error("24000", "Invalid cursor state"));
        };
        let script = Arc::clone(&self.script);
        let Some(result) = self.prepared.as_ref().and_then(|sql| script.results.get(sql)) else {
            return Err(self.error("HY010", "Function sequence error"));
        };
        tokio::task::yield_now().await;

        let capacity = self.row_array_size.min(rowset.capacity());
        let end = (start + capacity).min(result.rows.len());
        if start >= end {
            self.log.push(DriverEvent::FetchedNoData);
            return Ok(Fetched::NoData);
        }
        let bindings: Vec<(u16, ColumnBinding)> =
            self.bindings.iter().map(|(c, b)| (*c, *b)).collect();
        for (row, values) in result.rows[start..end].iter().enumerate() {
            for &(column, binding) in &bindings {
                let index = usize::from(column) - 1;
                match values.get(index) {
                    Some(value) => self.transfer(rowset, index, row, binding, value)?,
                    None => self.transfer(rowset, index, row, binding, &NativeValue::Null)?,
                }
            }
        }
        self.position = Some(end);
        self.log.push(DriverEvent::Fetched(end - start));

        if let Some((after, token)) = &script.cancel_after {
            if self.fetches >= *after {
                token.cancel();
            }
        }
        Ok(Fetched::Rows(end - start))
    }

    fn cancel(&mut self) -> NativeResult<()> {
        self.fail(Operation::Cancel)?;
        self.log.push(DriverEvent::Cancelled);
        Ok(())
    }

    fn diagnostic(&self) -> Option<Diagnostic> {
        self.last_diagnostic.clone()
    }

    fn free(&mut self) -> SqlReturn {
        self.log.push(DriverEvent::StatementFreed);
        SqlReturn::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Capabilities, RowsetSize};
    use crate::types::Schema;

    fn connection() -> MemoryConnection {
        MemoryConnection::new("Memory").with_result(
            "SELECT id, name FROM t",
            vec![
                ColumnDescription::new("ID", SQL_BIGINT),
                ColumnDescription::new("NAME", SQL_VARCHAR).with_size(4),
            ],
            vec![
                vec![NativeValue::Int(1), NativeValue::text("alpha")],
                vec![NativeValue::Int(2), NativeValue::Null],
                vec![NativeValue::Int(3), NativeValue::UnknownLength("c".into())],
            ],
        )
    }

    async fn prepared(conn: &mut MemoryConnection, rows: i64) -> (MemoryStatement, RowSet) {
        let mut stmt = conn.alloc_statement().unwrap();
        stmt.prepare("SELECT id, name FROM t").await.unwrap();
        let count = stmt.num_result_cols().unwrap();
        let descs: Vec<_> = (1..=count).map(|c| stmt.describe_col(c).unwrap()).collect();
        let schema = Schema::compile(&descs, &Capabilities::default()).unwrap();
        for column in &schema.columns {
            stmt.bind_col(column.ordinal as u16 + 1, column.binding).unwrap();
        }
        stmt.set_row_array_size(rows as usize).unwrap();
        let rowset = RowSet::allocate(&schema, RowsetSize::new(rows).unwrap());
        (stmt, rowset)
    }

    #[tokio::test]
    async fn test_fetch_fills_buffers() {
        let mut conn = connection();
        let log = conn.log();
        let (mut stmt, mut rowset) = prepared(&mut conn, 2).await;
        assert_eq!(stmt.execute().await, Ok(SqlReturn::SUCCESS));

        assert_eq!(stmt.fetch(&mut rowset).await, Ok(Fetched::Rows(2)));
        assert_eq!(rowset.slot(0, 1).unwrap(), &2i64.to_ne_bytes());
        assert_eq!(rowset.indicator(1, 0).unwrap(), 5);
        assert_eq!(&rowset.slot(1, 0).unwrap()[..5], b"alph\0");
        assert_eq!(rowset.indicator(1, 1).unwrap(), SQL_NULL_DATA);

        assert_eq!(stmt.fetch(&mut rowset).await, Ok(Fetched::Rows(1)));
        assert_eq!(rowset.indicator(1, 0).unwrap(), SQL_NTS);
        assert_eq!(stmt.fetch(&mut rowset).await, Ok(Fetched::NoData));
        assert_eq!(log.fetch_sizes(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_poisoned_null_slot() {
        let mut conn = connection().poison_nulls();
        let (mut stmt, mut rowset) = prepared(&mut conn, 3).await;
        stmt.execute().await.unwrap();
        stmt.fetch(&mut rowset).await.unwrap();
        assert!(rowset.slot(1, 1).unwrap().iter().all(|b| *b == POISON));
    }

    #[tokio::test]
    async fn test_injected_fetch_failure() {
        let mut conn = connection().fail_on(
            Operation::Fetch(2),
            Diagnostic::new("HYT00", 3113, "end-of-file on communication channel"),
        );
        let (mut stmt, mut rowset) = prepared(&mut conn, 1).await;
        stmt.execute().await.unwrap();
        assert!(stmt.fetch(&mut rowset).await.is_ok());
        assert_eq!(stmt.fetch(&mut rowset).await, Err(SqlReturn::ERROR));
        assert_eq!(stmt.diagnostic().unwrap().native_code, 3113);
    }

    #[tokio::test]
    async fn test_unknown_statement() {
        let mut conn = connection();
        let mut stmt = conn.alloc_statement().unwrap();
        assert_eq!(stmt.prepare("SELECT 1").await, Err(SqlReturn::ERROR));
        assert_eq!(stmt.diagnostic().unwrap().state, "42S02");
    }

    #[test]
    fn test_write_text_truncates() {
        let mut slot = [0xFFu8; 4];
        assert_eq!(write_text(&mut slot, "hello"), 5);
        assert_eq!(&slot, b"hel\0");
    }
}
