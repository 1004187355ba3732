//! Blocking SQLite executor.

use std::fmt;
use std::str::FromStr;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Sqlite};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use tabload_core::value::SqlValue;
use tabload_core::{ExecError, Executor};

use crate::error::Result;

/// Executes writer statements on one SQLite connection.
///
/// A transaction is opened lazily by the first statement after a commit,
/// so each `commit` makes exactly the work since the previous one durable.
/// Dropping the executor with an open transaction rolls it back.
pub struct SqliteExecutor {
    pub(crate) runtime: Runtime,
    pub(crate) conn: SqliteConnection,
    in_transaction: bool,
}

impl fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    /// Opens `url` (`sqlite::memory:`, `sqlite://path.db`, ...), creating
    /// the database file if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start or the database cannot
    /// be opened.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let conn = runtime.block_on(options.connect())?;
        info!(url = %url, "Connected to SQLite");
        Ok(Self {
            runtime,
            conn,
            in_transaction: false,
        })
    }

    /// Returns true while uncommitted work is pending.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Discards the work done since the last commit.
    ///
    /// # Errors
    ///
    /// Returns the database error if `ROLLBACK` fails.
    pub fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.run("ROLLBACK")?;
            self.in_transaction = false;
            debug!("Rolled back");
        }
        Ok(())
    }

    /// Closes the connection, rolling back uncommitted work.
    ///
    /// # Errors
    ///
    /// Returns the database error if the connection does not close cleanly.
    pub fn close(mut self) -> Result<()> {
        self.rollback()?;
        let Self { runtime, conn, .. } = self;
        runtime.block_on(conn.close())?;
        Ok(())
    }

    fn run(&mut self, sql: &str) -> std::result::Result<u64, sqlx::Error> {
        let conn = &mut self.conn;
        let done = self.runtime.block_on(sqlx::query(sql).execute(conn))?;
        Ok(done.rows_affected())
    }

    fn begin_if_needed(&mut self) -> std::result::Result<(), sqlx::Error> {
        if !self.in_transaction {
            self.run("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

impl Executor for SqliteExecutor {
    fn execute(&mut self, sql: &str) -> std::result::Result<Option<u64>, ExecError> {
        self.begin_if_needed()?;
        Ok(Some(self.run(sql)?))
    }

    fn execute_many(
        &mut self,
        template: &str,
        rows: &[Vec<SqlValue>],
    ) -> std::result::Result<Option<u64>, ExecError> {
        self.begin_if_needed()?;
        let conn = &mut self.conn;
        let affected = self.runtime.block_on(async {
            let mut affected = 0;
            for row in rows {
                let query = row.iter().fold(sqlx::query(template), bind);
                affected += query.execute(&mut *conn).await?.rows_affected();
            }
            Ok::<_, sqlx::Error>(affected)
        })?;
        Ok(Some(affected))
    }

    fn commit(&mut self) -> std::result::Result<(), ExecError> {
        if self.in_transaction {
            self.run("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Binds one cell with the closest SQLite storage class.
fn bind<'q>(query: SqliteQuery<'q>, value: &'q SqlValue) -> SqliteQuery<'q> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) | SqlValue::Other(s) => query.bind(s.as_str()),
        SqlValue::Blob(bytes) => query.bind(bytes.as_slice()),
        SqlValue::List(_) => query.bind(value.to_sql_inline()),
    }
}
