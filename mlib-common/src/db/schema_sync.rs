//! Non-destructive schema synchronization
//!
//! Each table is described once in code through [`TableSchema`]. On startup
//! [`SchemaSync::sync_table`] creates the table if it is absent, then compares
//! the definition against `PRAGMA table_info` and adds any column the file is
//! missing. Nothing is ever dropped: type and constraint drift is logged for a
//! human to resolve.
//!
//! Sync runs on a single connection that is closed before the pool is opened.
//! A pooled connection opened before an `ALTER TABLE` keeps the old column
//! list cached and misreads `SELECT *` afterwards.
//!
//! ```rust,ignore
//! let mut conn = options.connect().await?;
//! SchemaSync::sync_table::<TrackSchema>(&mut conn).await?;
//! conn.close().await?;
//! ```

use crate::Result;
use sqlx::{Row, SqliteConnection, SqliteExecutor};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    /// Declared SQL type (e.g. "TEXT", "INTEGER", "DATETIME")
    pub sql_type: &'static str,
    pub not_null: bool,
    pub primary_key: bool,
    /// Only meaningful together with `primary_key` on an INTEGER column
    pub autoincrement: bool,
    /// Literal SQL default, e.g. `'pending'` or `0`
    pub default_value: Option<&'static str>,
    /// SQL expression written into existing rows when the column is added
    /// to a table that already holds data
    pub backfill: Option<&'static str>,
}

/// Current UTC time as RFC 3339 text, the format timestamps are stored in
pub const NOW_RFC3339: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

impl ColumnDefinition {
    pub fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            primary_key: false,
            autoincrement: false,
            default_value: None,
            backfill: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Ids are never reused, even after the newest row is deleted
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Fill existing rows with `expr` when this column is added later.
    /// Unlike a DEFAULT, `expr` may be non-constant (e.g. [`NOW_RFC3339`]).
    pub fn backfill(mut self, expr: &'static str) -> Self {
        self.backfill = Some(expr);
        self
    }

    /// Column clause as used inside CREATE TABLE
    fn create_clause(&self) -> String {
        let mut clause = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            clause.push_str(" PRIMARY KEY");
            if self.autoincrement {
                clause.push_str(" AUTOINCREMENT");
            }
        }
        if self.not_null {
            clause.push_str(" NOT NULL");
        }
        if let Some(default) = self.default_value {
            clause.push_str(&format!(" DEFAULT {}", default));
        }
        clause
    }
}

/// Declarative description of one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Expected columns, in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    fn create_table_sql() -> String {
        let columns: Vec<String> = Self::expected_columns()
            .iter()
            .map(ColumnDefinition::create_clause)
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            columns.join(",\n    ")
        )
    }
}

/// One row of `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i64,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub pk: bool,
}

/// Difference between a table definition and the file on disk
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Fixable: added via ALTER TABLE ADD COLUMN
    MissingColumn(ColumnDefinition),
    /// Declared types fall in different SQLite affinities
    TypeMismatch {
        column: &'static str,
        expected: &'static str,
        actual: String,
    },
    /// A constraint the definition requires is absent in the file
    ConstraintMismatch {
        column: &'static str,
        constraint: &'static str,
    },
}

pub async fn table_exists<'e>(executor: impl SqliteExecutor<'e>, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table_name)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Read a table's columns in declaration order
pub async fn introspect_table<'e>(
    executor: impl SqliteExecutor<'e>,
    table_name: &str,
) -> Result<Vec<ActualColumn>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table_name))
        .fetch_all(executor)
        .await?;

    let mut columns: Vec<ActualColumn> = rows
        .iter()
        .map(|row| ActualColumn {
            cid: row.get("cid"),
            name: row.get("name"),
            type_name: row.get("type"),
            not_null: row.get::<i64, _>("notnull") != 0,
            default_value: row.get("dflt_value"),
            pk: row.get::<i64, _>("pk") != 0,
        })
        .collect();

    columns.sort_by_key(|c| c.cid);
    Ok(columns)
}

/// Compare a definition with the columns actually present
pub fn diff_columns(expected: &[ColumnDefinition], actual: &[ActualColumn]) -> Vec<SchemaDrift> {
    let mut drift = Vec::new();

    for column in expected {
        let Some(found) = actual.iter().find(|c| c.name.eq_ignore_ascii_case(column.name)) else {
            drift.push(SchemaDrift::MissingColumn(column.clone()));
            continue;
        };

        if affinity(column.sql_type) != affinity(&found.type_name) {
            drift.push(SchemaDrift::TypeMismatch {
                column: column.name,
                expected: column.sql_type,
                actual: found.type_name.clone(),
            });
        }
        // INTEGER PRIMARY KEY is implicitly NOT NULL, PRAGMA reports it as nullable
        if column.not_null && !found.not_null && !found.pk {
            drift.push(SchemaDrift::ConstraintMismatch {
                column: column.name,
                constraint: "NOT NULL",
            });
        }
        if column.primary_key && !found.pk {
            drift.push(SchemaDrift::ConstraintMismatch {
                column: column.name,
                constraint: "PRIMARY KEY",
            });
        }
    }

    drift
}

/// Type affinity of a declared column type (SQLite datatype rules, section 3.1)
fn affinity(declared: &str) -> &'static str {
    let upper = declared.to_ascii_uppercase();

    if upper.contains("INT") {
        "INTEGER"
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        "TEXT"
    } else if upper.is_empty() || upper.contains("BLOB") {
        "BLOB"
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        "REAL"
    } else {
        "NUMERIC"
    }
}

pub struct SchemaSync;

impl SchemaSync {
    /// Create the table if needed and add any missing columns
    ///
    /// Returns the names of the columns that were added to an existing table.
    pub async fn sync_table<T: TableSchema>(conn: &mut SqliteConnection) -> Result<Vec<&'static str>> {
        let table_name = T::table_name();

        if !table_exists(&mut *conn, table_name).await? {
            sqlx::query(&T::create_table_sql()).execute(&mut *conn).await?;
            info!("Created table '{}'", table_name);
            return Ok(Vec::new());
        }

        let actual = introspect_table(&mut *conn, table_name).await?;
        let drift = diff_columns(&T::expected_columns(), &actual);

        if drift.is_empty() {
            info!("✓ Schema up to date for '{}'", table_name);
            return Ok(Vec::new());
        }

        let mut added = Vec::new();
        for change in drift {
            match change {
                SchemaDrift::MissingColumn(column) => {
                    Self::add_column(conn, table_name, &column).await?;
                    added.push(column.name);
                }
                SchemaDrift::TypeMismatch { column, expected, actual } => {
                    warn!(
                        "⚠ Type mismatch in {}.{}: expected '{}', found '{}'. Left unchanged.",
                        table_name, column, expected, actual
                    );
                }
                SchemaDrift::ConstraintMismatch { column, constraint } => {
                    warn!(
                        "⚠ {}.{} is missing '{}'. Left unchanged.",
                        table_name, column, constraint
                    );
                }
            }
        }

        Ok(added)
    }

    async fn add_column(
        conn: &mut SqliteConnection,
        table: &str,
        column: &ColumnDefinition,
    ) -> Result<()> {
        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column.name, column.sql_type);

        if column.primary_key {
            warn!(
                "⚠ {}.{} added without PRIMARY KEY (not possible via ALTER TABLE)",
                table, column.name
            );
        }

        match (column.not_null, column.default_value) {
            (true, Some(default)) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (false, Some(default)) => sql.push_str(&format!(" DEFAULT {}", default)),
            (true, None) if column.backfill.is_some() => {}
            (true, None) => warn!(
                "⚠ {}.{} added as nullable with no backfill; existing rows hold NULL",
                table, column.name
            ),
            (false, None) => {}
        }

        info!("✓ Adding column: {}.{} ({})", table, column.name, column.sql_type);

        match sqlx::query(&sql).execute(&mut *conn).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                info!("Column {}.{} already present", table, column.name);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        // ALTER TABLE only accepts constant defaults, so non-constant values
        // are written into the existing rows afterwards
        if let Some(expr) = column.backfill {
            let result = sqlx::query(&format!(
                "UPDATE {} SET {} = {} WHERE {} IS NULL",
                table, column.name, expr, column.name
            ))
            .execute(&mut *conn)
            .await?;
            info!(
                "✓ Backfilled {}.{} in {} existing row(s)",
                table,
                column.name,
                result.rows_affected()
            );
        }

        Ok(())
    }
}
