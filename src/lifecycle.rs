//! Invocation context: resource ownership, fault translation and teardown.
//!
//! An [`Invocation`] exclusively owns everything one statement run needs:
//! the connection (with its environment), the statement handle and the
//! row-set buffers. Every native call goes through [`Invocation::check`],
//! which turns a failing return code into a fault carrying the handle's
//! first diagnostic record and tears the invocation down before the fault
//! propagates.
//!
//! # Teardown order
//!
//! 1. row-set buffers and indicator arrays
//! 2. statement handle
//! 3. connection: disconnect, then free
//! 4. environment
//!
//! Each resource sits in an `Option` that is taken on release, so teardown
//! can run any number of times. `Drop` runs it as well.

use tracing::{debug, error};

use crate::driver::{HandleKind, NativeConnection, NativeResult, NativeStatement, SqlReturn};
use crate::error::{Error, Result, CTX_DBMS_NAME};
use crate::options::{Capabilities, FetchOptions};
use crate::rowset::RowSet;

/// Context of one statement run against one connection.
pub struct Invocation<C: NativeConnection> {
    pub(crate) connection: Option<C>,
    pub(crate) statement: Option<C::Statement>,
    pub(crate) rowset: Option<RowSet>,
    pub(crate) capabilities: Capabilities,
    pub(crate) options: FetchOptions,
}

impl<C: NativeConnection> Invocation<C> {
    /// Take ownership of an opened connection, deriving the capabilities
    /// from the remote DBMS name.
    pub fn new(connection: C, options: FetchOptions) -> Result<Self> {
        let mut invocation = Self::with_capabilities(connection, Capabilities::default(), options);
        let outcome = invocation.connection_mut()?.dbms_name();
        let dbms_name = invocation.check(
            HandleKind::Connection,
            CTX_DBMS_NAME,
            "Error getting remote DBMS Name",
            outcome,
        )?;
        invocation.capabilities = Capabilities::for_dbms(&dbms_name, &invocation.options);
        debug!(
            dbms = %dbms_name,
            integer_as_text = invocation.capabilities.integer_as_text,
            "connection capabilities"
        );
        Ok(invocation)
    }

    /// Take ownership of an opened connection with explicit capabilities.
    pub fn with_capabilities(
        connection: C,
        capabilities: Capabilities,
        options: FetchOptions,
    ) -> Self {
        Self {
            connection: Some(connection),
            statement: None,
            rowset: None,
            capabilities,
            options,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Whether teardown has released the connection.
    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    pub(crate) fn connection_mut(&mut self) -> Result<&mut C> {
        self.connection.as_mut().ok_or(Error::ConnectionClosed)
    }

    pub(crate) fn statement_mut(&mut self) -> Result<&mut C::Statement> {
        self.statement.as_mut().ok_or(Error::ConnectionClosed)
    }

    /// Pass a successful outcome through; translate a failure into a fault.
    pub(crate) fn check<T>(
        &mut self,
        handle: HandleKind,
        context: u32,
        operation: &str,
        outcome: NativeResult<T>,
    ) -> Result<T> {
        outcome.map_err(|ret| self.fault(handle, context, operation, ret))
    }

    /// Build the fault for a failed native call and tear down.
    ///
    /// The diagnostic record is read before teardown releases the handle.
    pub(crate) fn fault(
        &mut self,
        handle: HandleKind,
        context: u32,
        operation: &str,
        ret: SqlReturn,
    ) -> Error {
        let diagnostic = match handle {
            HandleKind::Connection => self.connection.as_ref().and_then(|c| c.diagnostic()),
            HandleKind::Statement => self.statement.as_ref().and_then(|s| s.diagnostic()),
        };
        error!(
            context,
            %ret,
            operation,
            state = diagnostic.as_ref().map(|d| d.state.as_str()),
            "native call failed"
        );
        self.teardown();
        let operation = operation.to_string();
        match handle {
            HandleKind::Connection => Error::Connection {
                context,
                operation,
                diagnostic,
            },
            HandleKind::Statement => Error::Statement {
                context,
                operation,
                diagnostic,
            },
        }
    }

    /// Tear down and hand back a fault raised without a native handle.
    pub(crate) fn abort(&mut self, err: Error) -> Error {
        error!(error = %err, "invocation aborted");
        self.teardown();
        err
    }

    /// Release the statement handle and its buffers, keeping the connection.
    pub(crate) fn release_statement(&mut self) {
        self.rowset = None;
        if let Some(mut statement) = self.statement.take() {
            let ret = statement.free();
            if !ret.succeeded() {
                debug!(%ret, "statement free reported failure");
            }
        }
    }

    /// Release every resource in reverse acquisition order.
    pub fn teardown(&mut self) {
        if self.rowset.is_none() && self.statement.is_none() && self.connection.is_none() {
            return;
        }
        self.release_statement();
        if let Some(mut connection) = self.connection.take() {
            let disconnect = connection.disconnect();
            let free_connection = connection.free_connection();
            let free_environment = connection.free_environment();
            debug!(
                %disconnect,
                %free_connection,
                %free_environment,
                "connection released"
            );
        }
    }
}

impl<C: NativeConnection> Drop for Invocation<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{DriverEvent, MemoryConnection, Operation};
    use crate::error::Diagnostic;

    #[test]
    fn test_teardown_order_and_idempotence() {
        let conn = MemoryConnection::new("PostgreSQL");
        let log = conn.log();
        let mut invocation = Invocation::new(conn, FetchOptions::new()).unwrap();
        let ret = invocation.connection_mut().unwrap().alloc_statement();
        let statement = invocation
            .check(HandleKind::Connection, 111, "alloc", ret)
            .unwrap();
        invocation.statement = Some(statement);

        invocation.teardown();
        invocation.teardown();
        drop(invocation);

        assert_eq!(
            log.releases(),
            vec![
                DriverEvent::StatementFreed,
                DriverEvent::Disconnected,
                DriverEvent::ConnectionFreed,
                DriverEvent::EnvironmentFreed,
            ]
        );
    }

    #[test]
    fn test_capabilities_from_dbms_name() {
        let invocation = Invocation::new(MemoryConnection::new("Oracle"), FetchOptions::new()).unwrap();
        assert!(invocation.capabilities().integer_as_text);

        let invocation = Invocation::new(MemoryConnection::new("Vertica"), FetchOptions::new()).unwrap();
        assert!(!invocation.capabilities().integer_as_text);
    }

    #[test]
    fn test_dbms_name_failure_tears_down() {
        let conn = MemoryConnection::new("Oracle").fail_on(
            Operation::DbmsName,
            Diagnostic::new("08S01", 12541, "TNS:no listener"),
        );
        let log = conn.log();
        match Invocation::new(conn, FetchOptions::new()) {
            Err(Error::Connection {
                context,
                diagnostic: Some(diagnostic),
                ..
            }) => {
                assert_eq!(context, CTX_DBMS_NAME);
                assert_eq!(diagnostic.native_code, 12541);
            }
            Err(other) => panic!("Expected Connection fault, got {:?}", other),
            Ok(_) => panic!("Expected Connection fault"),
        }
        assert_eq!(
            log.releases(),
            vec![
                DriverEvent::Disconnected,
                DriverEvent::ConnectionFreed,
                DriverEvent::EnvironmentFreed,
            ]
        );
    }
}
