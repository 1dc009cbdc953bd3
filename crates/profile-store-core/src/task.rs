//! Task descriptors: where a profiling job's data comes from.
//!
//! A [`TaskDescriptor`] is one of three source kinds, each carrying only
//! the fields that make sense for it:
//!
//! | Variant | Source | Factory |
//! |---------|--------|---------|
//! | [`TaskDescriptor::Csv`] | A delimited file on disk | [`TaskDescriptor::csv`] |
//! | [`TaskDescriptor::Database`] | A live database connection | [`TaskDescriptor::database`] |
//! | [`TaskDescriptor::Benchmark`] | A synthetic benchmark file | [`TaskDescriptor::benchmark`] |
//!
//! Factories validate their input and fail with [`DescriptorError`]; a
//! descriptor that exists is always complete. There are no setters.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Construction-time validation failure for a [`TaskDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor: {kind} source requires a non-empty `{field}`")]
    MissingField {
        kind: TaskKind,
        field: &'static str,
    },

    #[error("invalid descriptor: unknown database engine '{0}'")]
    UnknownEngine(String),

    #[error("invalid descriptor: port '{0}' is not a number in 1..=65535")]
    InvalidPort(String),
}

/// Discriminant of a [`TaskDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Csv,
    Database,
    Benchmark,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Csv => "csv",
            TaskKind::Database => "database",
            TaskKind::Benchmark => "benchmark",
        };
        f.write_str(name)
    }
}

/// Database engines a [`DatabaseSource`] can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbEngine {
    Postgres,
    MySql,
    Oracle,
    SqlServer,
    Sqlite,
}

impl DbEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbEngine::Postgres => "postgres",
            DbEngine::MySql => "mysql",
            DbEngine::Oracle => "oracle",
            DbEngine::SqlServer => "sqlserver",
            DbEngine::Sqlite => "sqlite",
        }
    }
}

impl FromStr for DbEngine {
    type Err = DescriptorError;

    /// Parse an engine tag, case-insensitively. `postgresql` and `mssql`
    /// are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbEngine::Postgres),
            "mysql" => Ok(DbEngine::MySql),
            "oracle" => Ok(DbEngine::Oracle),
            "sqlserver" | "mssql" => Ok(DbEngine::SqlServer),
            "sqlite" => Ok(DbEngine::Sqlite),
            _ => Err(DescriptorError::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delimited file belonging to a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSource {
    dataset_name: String,
    path: String,
    source_name: String,
    separator: String,
}

impl CsvSource {
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

/// A live database connection.
///
/// `host` and `db_name` are always required, for embedded engines too,
/// where `host` names the machine holding the database file.
/// `connection_string`, `username`, and `password` may be empty for
/// trusted local connections.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSource {
    dataset_name: String,
    engine: DbEngine,
    host: String,
    port: u16,
    db_name: String,
    connection_string: String,
    username: String,
    password: String,
}

impl DatabaseSource {
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSource")
            .field("dataset_name", &self.dataset_name)
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .field("connection_string", &self.connection_string)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A synthetic benchmark file. Benchmark runs have no owning dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSource {
    path: String,
    separator: String,
}

impl BenchmarkSource {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

/// Immutable description of a profiling job's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDescriptor {
    Csv(CsvSource),
    Database(DatabaseSource),
    Benchmark(BenchmarkSource),
}

fn required(kind: TaskKind, field: &'static str, value: String) -> Result<String, DescriptorError> {
    if value.trim().is_empty() {
        return Err(DescriptorError::MissingField { kind, field });
    }
    Ok(value)
}

// Whitespace separators (tab, space) are valid, so only the empty string is missing.
fn required_separator(kind: TaskKind, value: String) -> Result<String, DescriptorError> {
    if value.is_empty() {
        return Err(DescriptorError::MissingField {
            kind,
            field: "separator",
        });
    }
    Ok(value)
}

impl TaskDescriptor {
    /// Describe a delimited file. Names and path must be non-blank; the
    /// separator must be non-empty and may be whitespace such as `"\t"`.
    pub fn csv(
        dataset_name: impl Into<String>,
        path: impl Into<String>,
        source_name: impl Into<String>,
        separator: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let kind = TaskKind::Csv;
        Ok(TaskDescriptor::Csv(CsvSource {
            dataset_name: required(kind, "dataset_name", dataset_name.into())?,
            path: required(kind, "path", path.into())?,
            source_name: required(kind, "source_name", source_name.into())?,
            separator: required_separator(kind, separator.into())?,
        }))
    }

    /// Describe a database connection.
    ///
    /// `engine` must be a recognized [`DbEngine`] tag and `port` must parse
    /// as a non-zero `u16`. `dataset_name`, `host`, and `db_name` must be
    /// non-empty.
    #[allow(clippy::too_many_arguments)]
    pub fn database(
        dataset_name: impl Into<String>,
        engine: &str,
        host: impl Into<String>,
        port: &str,
        db_name: impl Into<String>,
        connection_string: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let kind = TaskKind::Database;
        let dataset_name = required(kind, "dataset_name", dataset_name.into())?;
        let engine: DbEngine = engine.parse()?;
        let host = required(kind, "host", host.into())?;
        let port = match port.trim().parse::<u16>() {
            Ok(p) if p > 0 => p,
            _ => return Err(DescriptorError::InvalidPort(port.to_string())),
        };
        let db_name = required(kind, "db_name", db_name.into())?;

        Ok(TaskDescriptor::Database(DatabaseSource {
            dataset_name,
            engine,
            host,
            port,
            db_name,
            connection_string: connection_string.into(),
            username: username.into(),
            password: password.into(),
        }))
    }

    /// Describe a benchmark file.
    pub fn benchmark(
        path: impl Into<String>,
        separator: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let kind = TaskKind::Benchmark;
        Ok(TaskDescriptor::Benchmark(BenchmarkSource {
            path: required(kind, "path", path.into())?,
            separator: required_separator(kind, separator.into())?,
        }))
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDescriptor::Csv(_) => TaskKind::Csv,
            TaskDescriptor::Database(_) => TaskKind::Database,
            TaskDescriptor::Benchmark(_) => TaskKind::Benchmark,
        }
    }

    /// The dataset that owns documents produced by this job, if any.
    pub fn dataset_name(&self) -> Option<&str> {
        match self {
            TaskDescriptor::Csv(s) => Some(s.dataset_name()),
            TaskDescriptor::Database(s) => Some(s.dataset_name()),
            TaskDescriptor::Benchmark(_) => None,
        }
    }

    /// File path for file-backed sources.
    pub fn path(&self) -> Option<&str> {
        match self {
            TaskDescriptor::Csv(s) => Some(s.path()),
            TaskDescriptor::Benchmark(s) => Some(s.path()),
            TaskDescriptor::Database(_) => None,
        }
    }

    pub fn as_csv(&self) -> Option<&CsvSource> {
        match self {
            TaskDescriptor::Csv(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_database(&self) -> Option<&DatabaseSource> {
        match self {
            TaskDescriptor::Database(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_benchmark(&self) -> Option<&BenchmarkSource> {
        match self {
            TaskDescriptor::Benchmark(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_roundtrips_fields() {
        let d = TaskDescriptor::csv("sales", "/data/sales/invoices.csv", "invoices.csv", ",").unwrap();
        assert_eq!(d.kind(), TaskKind::Csv);
        let csv = d.as_csv().unwrap();
        assert_eq!(csv.dataset_name(), "sales");
        assert_eq!(csv.path(), "/data/sales/invoices.csv");
        assert_eq!(csv.source_name(), "invoices.csv");
        assert_eq!(csv.separator(), ",");
        assert!(d.as_database().is_none());
        assert!(d.as_benchmark().is_none());
    }

    #[test]
    fn test_database_roundtrips_fields() {
        let d = TaskDescriptor::database(
            "warehouse",
            "PostgreSQL",
            "db.internal",
            "5432",
            "analytics",
            "postgres://db.internal:5432/analytics",
            "reader",
            "s3cret",
        )
        .unwrap();
        assert_eq!(d.kind(), TaskKind::Database);
        let db = d.as_database().unwrap();
        assert_eq!(db.dataset_name(), "warehouse");
        assert_eq!(db.engine(), DbEngine::Postgres);
        assert_eq!(db.host(), "db.internal");
        assert_eq!(db.port(), 5432);
        assert_eq!(db.db_name(), "analytics");
        assert_eq!(db.connection_string(), "postgres://db.internal:5432/analytics");
        assert_eq!(db.username(), "reader");
        assert_eq!(db.password(), "s3cret");
        assert_eq!(d.dataset_name(), Some("warehouse"));
        assert_eq!(d.path(), None);
    }

    #[test]
    fn test_benchmark_roundtrips_fields() {
        let d = TaskDescriptor::benchmark("/bench/gen.csv", "|").unwrap();
        assert_eq!(d.kind(), TaskKind::Benchmark);
        let b = d.as_benchmark().unwrap();
        assert_eq!(b.path(), "/bench/gen.csv");
        assert_eq!(b.separator(), "|");
        assert_eq!(d.dataset_name(), None);
        assert_eq!(d.path(), Some("/bench/gen.csv"));
    }

    #[test]
    fn test_csv_missing_source_name() {
        let err = TaskDescriptor::csv("sales", "/data/a.csv", "  ", ",").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MissingField {
                kind: TaskKind::Csv,
                field: "source_name"
            }
        );
    }

    #[test]
    fn test_database_unknown_engine() {
        let err = TaskDescriptor::database("w", "cassandra", "h", "1", "d", "", "", "").unwrap_err();
        assert_eq!(err, DescriptorError::UnknownEngine("cassandra".to_string()));
    }

    #[test]
    fn test_database_bad_port() {
        for port in ["", "0", "70000", "abc"] {
            let err = TaskDescriptor::database("w", "mysql", "h", port, "d", "", "", "").unwrap_err();
            assert_eq!(err, DescriptorError::InvalidPort(port.to_string()));
        }
    }

    #[test]
    fn test_database_missing_host() {
        let err = TaskDescriptor::database("w", "sqlite", "", "1", "d", "", "", "").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::MissingField { field: "host", .. }
        ));
    }

    #[test]
    fn test_csv_tab_separator() {
        let d = TaskDescriptor::csv("sales", "/data/a.tsv", "a.tsv", "\t").unwrap();
        assert_eq!(d.as_csv().unwrap().separator(), "\t");

        let d = TaskDescriptor::csv("sales", "/data/a.txt", "a.txt", " ").unwrap();
        assert_eq!(d.as_csv().unwrap().separator(), " ");
    }

    #[test]
    fn test_benchmark_tab_separator() {
        let d = TaskDescriptor::benchmark("/bench/gen.tsv", "\t").unwrap();
        assert_eq!(d.as_benchmark().unwrap().separator(), "\t");
    }

    #[test]
    fn test_csv_missing_separator() {
        let err = TaskDescriptor::csv("sales", "/data/a.csv", "a.csv", "").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MissingField {
                kind: TaskKind::Csv,
                field: "separator"
            }
        );
    }

    #[test]
    fn test_benchmark_missing_separator() {
        let err = TaskDescriptor::benchmark("/bench/gen.csv", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid descriptor: benchmark source requires a non-empty `separator`"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let d = TaskDescriptor::database("w", "oracle", "h", "1521", "orcl", "", "u", "hunter2").unwrap();
        let rendered = format!("{:?}", d);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
