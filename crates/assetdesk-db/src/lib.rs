// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use assetdesk_app::{
    AssetField, AssetNumber, AssetPage, AssetQuery, AssetRecord, AssetStore, AssetUpdate,
    CategoryGroup, FieldKind, FilterField, FilterPredicate, StoreError,
};
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

pub const APP_NAME: &str = "assetdesk";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "assets",
    &[
        "id",
        "asset_number",
        "name",
        "category",
        "brand",
        "model",
        "serial_number",
        "ip_address",
        "employee_number",
        "employee_name",
        "designation",
        "division",
        "section",
        "department",
        "status",
        "status_date",
        "added_date",
        "transfer_date",
        "branch",
        "floor",
        "vendor",
        "purchased_year",
        "warranty",
        "warranty_start",
        "warranty_end",
        "remarks",
        "created_at",
        "updated_at",
    ],
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_assets_serial_number",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_assets_serial_number ON assets (serial_number) WHERE serial_number IS NOT NULL;",
    },
    RequiredIndex {
        name: "idx_assets_division",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_assets_division ON assets (division);",
    },
    RequiredIndex {
        name: "idx_assets_department",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_assets_department ON assets (department);",
    },
];

/// Local SQLite asset store. Rows come back in insertion order.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Inserts `records` that are not already present, keyed by asset number.
    pub fn seed_demo_data(&self, records: &[AssetRecord]) -> Result<usize> {
        let mut inserted = 0usize;
        for record in records {
            if self.asset_exists(&record.asset_number)? {
                continue;
            }
            self.insert_asset(record)
                .with_context(|| format!("seed demo asset {}", record.asset_number))?;
            inserted += 1;
        }
        Ok(inserted)
    }

    pub fn count_assets(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))
            .context("count assets")?;
        usize::try_from(count).context("asset count out of range")
    }

    pub fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        let (where_sql, mut values) = where_clause(&query.filter);

        let total: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM assets{where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
            .map_err(|error| map_sql_error("count assets", error))?;

        values.push(Value::Integer(to_i64(query.window.size())));
        values.push(Value::Integer(to_i64(query.window.offset())));
        let sql = format!(
            "SELECT {} FROM assets{where_sql} ORDER BY id ASC LIMIT ? OFFSET ?",
            select_columns()
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|error| map_sql_error("prepare assets query", error))?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), read_asset)
            .map_err(|error| map_sql_error("query assets", error))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|error| map_sql_error("collect assets", error))?;

        debug!(rows = rows.len(), total, "listed assets");
        Ok(AssetPage {
            rows,
            total: usize::try_from(total).unwrap_or_default(),
        })
    }

    pub fn get_asset(&self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM assets WHERE asset_number = ?",
                    select_columns()
                ),
                params![asset_number.as_str()],
                read_asset,
            )
            .optional()
            .map_err(|error| map_sql_error("load asset", error))?
            .ok_or_else(|| StoreError::NotFound(asset_number.clone()))
    }

    pub fn create_asset(&self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        let asset_number = asset.asset_number.as_str().trim();
        if asset_number.is_empty() {
            return Err(StoreError::validation("asset number is required"));
        }
        let key = AssetNumber::new(asset_number);
        if self
            .asset_exists(&key)
            .map_err(|error| StoreError::storage("check asset number", error))?
        {
            return Err(StoreError::Duplicate(format!("asset number {asset_number}")));
        }
        self.ensure_serial_available(asset.serial_number.as_deref(), None)?;
        self.insert_asset(asset)?;
        self.get_asset(&key)
    }

    pub fn update_asset(
        &self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        let current = self.get_asset(asset_number)?;
        let updated = update.apply_to(&current)?;
        self.ensure_serial_available(updated.serial_number.as_deref(), Some(asset_number))?;

        let now = now_rfc3339()?;
        let assignments = AssetField::ALL
            .iter()
            .map(|field| format!("{} = ?", field.column_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut values = field_values(&updated);
        values.push(Value::Text(now));
        values.push(Value::Text(asset_number.to_string()));

        let rows_affected = self
            .conn
            .execute(
                &format!("UPDATE assets SET {assignments}, updated_at = ? WHERE asset_number = ?"),
                params_from_iter(values.iter()),
            )
            .map_err(|error| map_sql_error("update asset", error))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound(asset_number.clone()));
        }
        Ok(updated)
    }

    pub fn delete_asset(&self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        let rows_affected = self
            .conn
            .execute(
                "DELETE FROM assets WHERE asset_number = ?",
                params![asset_number.as_str()],
            )
            .map_err(|error| map_sql_error("delete asset", error))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound(asset_number.clone()));
        }
        Ok(())
    }

    fn insert_asset(&self, asset: &AssetRecord) -> Result<(), StoreError> {
        let now = now_rfc3339()?;
        let columns = AssetField::ALL
            .iter()
            .map(|field| field.column_name())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; AssetField::ALL.len() + 3].join(", ");

        let mut values = vec![Value::Text(asset.asset_number.as_str().trim().to_owned())];
        values.extend(field_values(asset));
        values.push(Value::Text(now.clone()));
        values.push(Value::Text(now));

        self.conn
            .execute(
                &format!(
                    "INSERT INTO assets (asset_number, {columns}, created_at, updated_at) VALUES ({placeholders})"
                ),
                params_from_iter(values.iter()),
            )
            .map_err(|error| map_sql_error("insert asset", error))?;
        Ok(())
    }

    fn asset_exists(&self, asset_number: &AssetNumber) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM assets WHERE asset_number = ?)",
                params![asset_number.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .with_context(|| format!("check asset {asset_number}"))?;
        Ok(exists == 1)
    }

    fn ensure_serial_available(
        &self,
        serial_number: Option<&str>,
        owner: Option<&AssetNumber>,
    ) -> Result<(), StoreError> {
        let Some(serial_number) = serial_number else {
            return Ok(());
        };
        let holder: Option<String> = self
            .conn
            .query_row(
                "SELECT asset_number FROM assets WHERE serial_number = ? LIMIT 1",
                params![serial_number],
                |row| row.get(0),
            )
            .optional()
            .map_err(|error| map_sql_error("check serial number", error))?;
        match holder {
            Some(holder) if owner.is_none_or(|owner| owner.as_str() != holder) => Err(
                StoreError::Duplicate(format!("serial number {serial_number}")),
            ),
            _ => Ok(()),
        }
    }
}

impl AssetStore for Store {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        Store::list_assets(self, query)
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        Store::get_asset(self, asset_number)
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        Store::create_asset(self, asset)
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        Store::update_asset(self, asset_number, update)
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        Store::delete_asset(self, asset_number)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ASSETDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!(
            "cannot resolve data directory; set ASSETDESK_DB_PATH to a writable database path"
        )
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("assetdesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn select_columns() -> String {
    std::iter::once("asset_number")
        .chain(AssetField::ALL.iter().map(|field| field.column_name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(filter: &FilterPredicate) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for field in FilterField::ALL {
        if let Some(value) = filter.get(field) {
            clauses.push(format!("{} = ?", field.asset_field().column_name()));
            values.push(Value::Text(value.to_owned()));
        }
    }
    if let Some(group) = filter.group {
        let column = AssetField::Category.column_name();
        // NULL never matches NOT IN, so uncategorized rows are added back.
        let (categories, clause) = match group {
            CategoryGroup::Other => {
                let known = CategoryGroup::grouped_categories();
                let clause = format!(
                    "({column} IS NULL OR {column} NOT IN ({}))",
                    placeholders(known.len())
                );
                (known, clause)
            }
            group => {
                let members = group.categories().to_vec();
                let clause = format!("{column} IN ({})", placeholders(members.len()));
                (members, clause)
            }
        };
        clauses.push(clause);
        values.extend(
            categories
                .into_iter()
                .map(|category| Value::Text(category.to_owned())),
        );
    }
    if let Some(department) = filter.department.as_deref() {
        clauses.push(format!("{} = ?", AssetField::Department.column_name()));
        values.push(Value::Text(department.to_owned()));
    }
    if clauses.is_empty() {
        return (String::new(), values);
    }
    (format!(" WHERE {}", clauses.join(" AND ")), values)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn field_values(record: &AssetRecord) -> Vec<Value> {
    AssetField::ALL
        .iter()
        .map(|field| match field.kind() {
            FieldKind::Text | FieldKind::Date => text_value(field.value_of(record)),
            FieldKind::Year => record
                .purchased_year
                .map_or(Value::Null, |year| Value::Integer(i64::from(year))),
            FieldKind::Flag => Value::Integer(i64::from(record.warranty)),
            FieldKind::Status => Value::Text(record.status.code().to_owned()),
        })
        .collect()
}

fn text_value(value: String) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::Text(value)
    }
}

fn read_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssetRecord> {
    let asset_number: String = row.get(0)?;
    let mut record = AssetRecord::new(asset_number);
    for (offset, field) in AssetField::ALL.iter().enumerate() {
        let index = offset + 1;
        let text = match field.kind() {
            FieldKind::Year => row
                .get::<_, Option<i32>>(index)?
                .map(|year| year.to_string())
                .unwrap_or_default(),
            FieldKind::Flag => {
                if row.get::<_, i64>(index)? != 0 {
                    "yes".to_owned()
                } else {
                    "no".to_owned()
                }
            }
            FieldKind::Text | FieldKind::Date | FieldKind::Status => {
                row.get::<_, Option<String>>(index)?.unwrap_or_default()
            }
        };
        field
            .apply(&mut record, &text)
            .map_err(|error| to_sql_error(index, &error))?;
    }
    Ok(record)
}

fn to_sql_error(index: usize, error: &StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

fn map_sql_error(context: &str, error: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &error
        && failure.code == ErrorCode::ConstraintViolation
    {
        let detail = message.clone().unwrap_or_else(|| "asset".to_owned());
        if detail.contains("UNIQUE") {
            return StoreError::Duplicate(detail);
        }
        return StoreError::Validation(detail);
    }
    StoreError::storage(context, error)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at an assetdesk database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; move the old database aside and restart",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; move the old database aside and restart",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|error| StoreError::storage("format current timestamp", error))
}

#[cfg(test)]
mod tests {
    use super::{select_columns, where_clause};
    use assetdesk_app::{CategoryGroup, FilterPredicate};

    #[test]
    fn where_clause_only_names_set_constraints() {
        let (sql, values) = where_clause(&FilterPredicate::default());
        assert_eq!(sql, "");
        assert!(values.is_empty());

        let (sql, values) = where_clause(&FilterPredicate {
            brand: Some("HP".to_owned()),
            department: Some("IT".to_owned()),
            ..FilterPredicate::default()
        });
        assert_eq!(sql, " WHERE brand = ? AND department = ?");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn where_clause_expands_category_groups() {
        let (sql, values) = where_clause(&FilterPredicate {
            group: Some(CategoryGroup::ItEquipment),
            department: Some("IT".to_owned()),
            ..FilterPredicate::default()
        });
        assert_eq!(sql, " WHERE category IN (?, ?) AND department = ?");
        assert_eq!(values.len(), 3);

        let (sql, values) = where_clause(&FilterPredicate {
            group: Some(CategoryGroup::Other),
            ..FilterPredicate::default()
        });
        assert_eq!(
            sql,
            " WHERE (category IS NULL OR category NOT IN (?, ?, ?, ?, ?, ?, ?, ?))"
        );
        assert_eq!(values.len(), 8);
    }

    #[test]
    fn select_starts_with_asset_number() {
        let columns = select_columns();
        assert!(columns.starts_with("asset_number, name, category"));
        assert!(columns.ends_with("remarks"));
    }
}
