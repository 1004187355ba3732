#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;

use tabload_core::value::SqlValue;
use tabload_core::{ExecError, Executor, Record};

/// A call made against [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Execute(String),
    ExecuteMany { sql: String, rows: usize },
    Commit,
}

/// Error injected by [`RecordingExecutor::fail_on_call`].
#[derive(Debug)]
pub struct DriverError(pub &'static str);

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for DriverError {}

/// Executor fake that records every call.
///
/// Affected counts are taken from `counts` in call order; once exhausted,
/// `execute_many` reports the batch length and `execute` reports 1.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub calls: Vec<Call>,
    pub bound: Vec<Vec<SqlValue>>,
    counts: VecDeque<Option<u64>>,
    fail_on: Option<usize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(counts: impl IntoIterator<Item = Option<u64>>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fails the `n`th call (zero-based, commits included).
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    pub fn commits(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Commit).count()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::ExecuteMany { rows, .. } => Some(*rows),
                _ => None,
            })
            .collect()
    }

    pub fn executed(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: Call) -> Result<(), ExecError> {
        if self.fail_on == Some(self.calls.len()) {
            return Err(Box::new(DriverError("connection lost")));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, sql: &str) -> Result<Option<u64>, ExecError> {
        self.record(Call::Execute(sql.to_string()))?;
        Ok(self.counts.pop_front().unwrap_or(Some(1)))
    }

    fn execute_many(
        &mut self,
        template: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<Option<u64>, ExecError> {
        self.record(Call::ExecuteMany {
            sql: template.to_string(),
            rows: rows.len(),
        })?;
        self.bound.extend(rows.iter().cloned());
        Ok(self
            .counts
            .pop_front()
            .unwrap_or(Some(rows.len() as u64)))
    }

    fn commit(&mut self) -> Result<(), ExecError> {
        self.record(Call::Commit)
    }
}

/// `n` rows of `(id, name)` preceded by a header row.
pub fn people(n: i64) -> Vec<Vec<SqlValue>> {
    let mut rows = vec![vec![SqlValue::from("id"), SqlValue::from("name")]];
    rows.extend((1..=n).map(|i| vec![SqlValue::Int(i), SqlValue::Text(format!("p{i}"))]));
    rows
}

pub fn person(id: i64, name: &str) -> Record {
    Record::new().with("id", id).with("name", name)
}
