//! Generic SQL dialect.

use super::Dialect;

/// ANSI SQL: double-quoted identifiers and `?` markers.
///
/// Writers can only emit plain `INSERT` for it, since neither `REPLACE`
/// nor upsert has a portable form.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}
