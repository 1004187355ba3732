//! Write configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::UpdateStrategy;
use crate::dialect::{DialectKind, PlaceholderStyle};
use crate::error::{LoadError, Result};

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(size) => size,
    None => unreachable!(),
};

/// Statement shape and conflict policy of a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// `INSERT INTO`; conflicts fail.
    #[default]
    Insert,
    /// `REPLACE INTO`; conflicting rows are deleted and reinserted.
    Replace,
    /// Insert, updating non-key columns on conflict.
    #[serde(alias = "update")]
    Upsert,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => f.write_str("insert"),
            Self::Replace => f.write_str("replace"),
            Self::Upsert => f.write_str("upsert"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = LoadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            "upsert" | "update" => Ok(Self::Upsert),
            other => Err(LoadError::config(format!(
                "invalid mode '{other}', expected one of: insert, replace, upsert"
            ))),
        }
    }
}

/// Batch size and commit cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSpec {
    /// Rows per executed batch.
    pub batch_size: NonZeroUsize,
    /// Commit after every batch instead of only after the last one.
    pub commit_per_batch: bool,
}

impl BatchSpec {
    /// Creates a batch spec.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Configuration`] if `batch_size` is zero.
    pub fn new(batch_size: usize, commit_per_batch: bool) -> Result<Self> {
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| LoadError::config("batch size must be positive"))?;
        Ok(Self {
            batch_size,
            commit_per_batch,
        })
    }
}

impl Default for BatchSpec {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            commit_per_batch: true,
        }
    }
}

/// Everything a writer needs to know besides the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Target table, optionally `schema.table`.
    pub table_name: String,
    /// Statement shape.
    pub mode: WriteMode,
    /// Whether the first row of a row-sequence input holds field names.
    pub with_header: bool,
    /// Batching and commit cadence.
    pub batch: BatchSpec,
    /// Fields of the uniqueness constraint; required for upserts.
    pub conflict_key: Vec<String>,
    /// How upsert update lists refer to new values.
    pub update_strategy: UpdateStrategy,
    /// Target dialect.
    pub dialect: DialectKind,
    /// Parameter marker override; the dialect's own when unset.
    pub placeholder: Option<PlaceholderStyle>,
    /// Empty the table before writing.
    pub truncate_first: bool,
    /// Create the table, typed from the data, if it does not exist.
    pub create_table: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            mode: WriteMode::Insert,
            with_header: true,
            batch: BatchSpec::default(),
            conflict_key: Vec::new(),
            update_strategy: UpdateStrategy::Reference,
            dialect: DialectKind::Generic,
            placeholder: None,
            truncate_first: false,
            create_table: false,
        }
    }
}

impl WriteOptions {
    /// Creates options for writing into `table_name` with defaults.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Sets the write mode.
    #[must_use]
    pub const fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the target dialect.
    #[must_use]
    pub const fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Declares whether row-sequence input starts with a header row.
    #[must_use]
    pub const fn with_header(mut self, with_header: bool) -> Self {
        self.with_header = with_header;
        self
    }

    /// Sets batching and commit cadence.
    #[must_use]
    pub const fn batch(mut self, batch: BatchSpec) -> Self {
        self.batch = batch;
        self
    }

    /// Sets the conflict key.
    #[must_use]
    pub fn conflict_key<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.conflict_key = fields.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Sets the upsert update strategy.
    #[must_use]
    pub const fn update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }

    /// Overrides the parameter marker.
    #[must_use]
    pub const fn placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = Some(style);
        self
    }

    /// Empties the table before the first batch.
    #[must_use]
    pub const fn truncate_first(mut self, enabled: bool) -> Self {
        self.truncate_first = enabled;
        self
    }

    /// Creates the table before writing if it does not exist.
    #[must_use]
    pub const fn create_table(mut self, enabled: bool) -> Self {
        self.create_table = enabled;
        self
    }

    /// Parses options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Configuration`] if the document does not
    /// describe valid options.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LoadError::config(format!("invalid write options: {e}")))
    }

    /// Reads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read and
    /// [`LoadError::Configuration`] if its content is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that the options describe a write that can run.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Configuration`] for an empty table name, an
    /// upsert without conflict key, or a mode the dialect cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(LoadError::config("table name is empty"));
        }
        let dialect = self.dialect.dialect();
        match self.mode {
            WriteMode::Insert => {}
            WriteMode::Replace if !dialect.supports_replace() => {
                return Err(LoadError::config(format!(
                    "dialect '{}' does not support REPLACE",
                    dialect.name()
                )));
            }
            WriteMode::Replace => {}
            WriteMode::Upsert => {
                if self.conflict_key.is_empty() {
                    return Err(LoadError::config("upsert requires a conflict key"));
                }
                if !dialect.supports_upsert() {
                    return Err(LoadError::config(format!(
                        "dialect '{}' does not support upsert",
                        dialect.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the parameter marker in effect.
    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder
            .unwrap_or_else(|| self.dialect.dialect().placeholder_style())
    }
}
