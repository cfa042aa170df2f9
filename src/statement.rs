//! Statement classification.

/// How a statement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns a result set: prepared, described, bound and fetched.
    Query,
    /// Anything else: executed directly, reported by its return code.
    Command,
}

impl StatementKind {
    /// Classify SQL text: a query starts with `SELECT` (any case) after
    /// leading spaces, tabs and line breaks.
    pub fn classify(sql: &str) -> Self {
        let body = sql.trim_start_matches([' ', '\t', '\n', '\r']);
        match body.get(..6) {
            Some(head) if head.eq_ignore_ascii_case("SELECT") => StatementKind::Query,
            _ => StatementKind::Command,
        }
    }

    pub fn is_query(self) -> bool {
        self == StatementKind::Query
    }
}
