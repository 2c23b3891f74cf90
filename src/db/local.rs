//! Embedded SQLite row store.
//!
//! Evaluates the store query vocabulary against a local database file with
//! the same tables as the remote backend. Embeds are resolved with one
//! primary-key lookup per distinct foreign key. Timestamps are written as
//! fixed-width RFC 3339 text, so range filters compare lexicographically.
//!
//! Ordering follows PostgREST: nulls last when ascending, first when
//! descending, with the primary key as tie-breaker. `ILike` relies on SQLite
//! `LIKE`, which folds ASCII case only.

use super::db::Db;
use crate::api::{escape_like, Embed, Filter, Query, Row, RowStore, Select, StoreError, Table};
use crate::libs::timestamp;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct LocalStore {
    conn: Connection,
    path: PathBuf,
}

impl LocalStore {
    /// Opens (creating if needed) the database file and brings its schema up to date.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let db = Db::open(&path)?;
        debug!(path = %path.display(), "opened local store");
        Ok(Self { conn: db.conn, path })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let db = Db::open_in_memory()?;
        Ok(Self {
            conn: db.conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn select_rows(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let table = query.table;
        let mut params = Vec::new();
        let mut sql = format!("SELECT * FROM {}", quote(table.name()));
        push_where(&mut sql, &query.filters, &mut params);

        let pk = quote(table.primary_key());
        match &query.order {
            Some(order) if order.ascending => {
                sql.push_str(&format!(" ORDER BY {} ASC NULLS LAST, {} ASC", quote(&order.column), pk))
            }
            Some(order) => sql.push_str(&format!(" ORDER BY {} DESC NULLS FIRST, {} ASC", quote(&order.column), pk)),
            None => sql.push_str(&format!(" ORDER BY {} ASC", pk)),
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut rows = self.raw_rows(&sql, &params)?;
        self.shape(table, &query.select, &mut rows)?;
        Ok(rows)
    }

    fn raw_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|name| name.to_string()).collect();
        let mut result = stmt.query(params_from_iter(params.iter()))?;

        let mut rows = Vec::new();
        while let Some(row) = result.next()? {
            let mut map = Row::new();
            for (index, name) in names.iter().enumerate() {
                let value: SqlValue = row.get(index)?;
                map.insert(name.clone(), to_json(value));
            }
            rows.push(map);
        }
        Ok(rows)
    }

    /// Applies the projection and resolves embeds in place.
    fn shape(&self, table: Table, select: &Select, rows: &mut [Row]) -> Result<(), StoreError> {
        let mut cache: HashMap<(Table, String), Value> = HashMap::new();
        for row in rows.iter_mut() {
            let mut embedded = Vec::with_capacity(select.embeds.len());
            for embed in &select.embeds {
                let target = match row.get(&embed.via) {
                    None | Some(Value::Null) => Value::Null,
                    Some(key) => self.lookup(embed, key, &mut cache)?,
                };
                embedded.push((embed.alias.clone(), target));
            }
            if !select.is_all() {
                row.retain(|column, _| select.columns.iter().any(|c| c == column));
            }
            row.extend(embedded);
        }
        debug!(table = table.name(), rows = rows.len(), embeds = select.embeds.len(), "shaped rows");
        Ok(())
    }

    fn lookup(&self, embed: &Embed, key: &Value, cache: &mut HashMap<(Table, String), Value>) -> Result<Value, StoreError> {
        let cache_key = (embed.table, format!("{}|{}", embed.columns.join(","), key));
        if let Some(hit) = cache.get(&cache_key) {
            return Ok(hit.clone());
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            quote(embed.table.name()),
            quote(embed.table.primary_key())
        );
        let found = self
            .raw_rows(&sql, &[to_sql(key)])?
            .into_iter()
            .next()
            .map(|mut target| {
                if !embed.columns.is_empty() {
                    target.retain(|column, _| embed.columns.iter().any(|c| c == column));
                }
                Value::Object(target)
            })
            .unwrap_or(Value::Null);

        cache.insert(cache_key, found.clone());
        Ok(found)
    }

    fn matching_keys(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut params = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", quote(query.table.primary_key()), quote(query.table.name()));
        push_where(&mut sql, &query.filters, &mut params);

        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, SqlValue>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys.into_iter().map(to_json).collect())
    }

    fn rows_by_keys(&self, table: Table, keys: &[Value], select: &Select) -> Result<Vec<Row>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let by_key = Filter::Or(keys.iter().map(|key| Filter::Eq(table.primary_key().to_string(), key.clone())).collect());
        self.select_rows(&Query::new(table).select(select.clone()).filter(by_key))
    }
}

impl RowStore for LocalStore {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        query.validate()?;
        debug!(table = query.table.name(), filters = query.filters.len(), "fetch");
        self.select_rows(query)
    }

    async fn insert(&self, table: Table, mut row: Row, select: &Select) -> Result<Row, StoreError> {
        select.validate(table)?;
        for column in row.keys() {
            table.check_column(column)?;
        }
        stamp(table, &mut row, true);
        debug!(table = table.name(), "insert");

        let columns: Vec<String> = row.keys().map(|column| quote(column)).collect();
        let values: Vec<SqlValue> = row.values().map(to_sql).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table.name()),
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        );
        self.conn
            .execute(&sql, params_from_iter(values.iter()))
            .map_err(write_error)?;

        let key = Value::from(self.conn.last_insert_rowid());
        self.rows_by_keys(table, &[key], select)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, query: &Query, mut changes: Row) -> Result<Vec<Row>, StoreError> {
        query.validate_mutation()?;
        for column in changes.keys() {
            query.table.check_column(column)?;
        }
        let keys = self.matching_keys(query)?;
        debug!(table = query.table.name(), rows = keys.len(), "update");
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        stamp(query.table, &mut changes, false);
        if !changes.is_empty() {
            let assignments: Vec<String> = changes.keys().map(|column| format!("{} = ?", quote(column))).collect();
            let mut params: Vec<SqlValue> = changes.values().map(to_sql).collect();
            params.extend(keys.iter().map(to_sql));
            let sql = format!(
                "UPDATE {} SET {} WHERE {} IN ({})",
                quote(query.table.name()),
                assignments.join(", "),
                quote(query.table.primary_key()),
                vec!["?"; keys.len()].join(", ")
            );
            self.conn
                .execute(&sql, params_from_iter(params.iter()))
                .map_err(write_error)?;
        }

        self.rows_by_keys(query.table, &keys, &Select::all())
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        query.validate_mutation()?;
        let keys = self.matching_keys(query)?;
        debug!(table = query.table.name(), rows = keys.len(), "delete");
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let deleted = self.rows_by_keys(query.table, &keys, &Select::all())?;
        let sql = format!(
            "DELETE FROM {} WHERE {} IN ({})",
            quote(query.table.name()),
            quote(query.table.primary_key()),
            vec!["?"; keys.len()].join(", ")
        );
        let params: Vec<SqlValue> = keys.iter().map(to_sql).collect();
        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(write_error)?;
        Ok(deleted)
    }
}

/// Fills `created_at` on insert and `updated_at` on any task write.
fn stamp(table: Table, row: &mut Row, inserting: bool) {
    let now = Value::from(timestamp::now());
    if inserting && table.has_column("created_at") && row.get("created_at").map_or(true, Value::is_null) {
        row.insert("created_at".to_string(), now.clone());
    }
    if table.has_column("updated_at") && !row.contains_key("updated_at") {
        row.insert("updated_at".to_string(), now);
    }
}

fn push_where(sql: &mut String, filters: &[Filter], params: &mut Vec<SqlValue>) {
    if filters.is_empty() {
        return;
    }
    let clauses: Vec<String> = filters.iter().map(|filter| predicate(filter, params)).collect();
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
}

fn predicate(filter: &Filter, params: &mut Vec<SqlValue>) -> String {
    match filter {
        Filter::Eq(column, Value::Null) => format!("{} IS NULL", quote(column)),
        Filter::Neq(column, Value::Null) => format!("{} IS NOT NULL", quote(column)),
        Filter::Eq(column, value) => {
            params.push(to_sql(value));
            format!("{} = ?", quote(column))
        }
        Filter::Neq(column, value) => {
            params.push(to_sql(value));
            format!("{} <> ?", quote(column))
        }
        Filter::Gte(column, value) => {
            params.push(to_sql(value));
            format!("{} >= ?", quote(column))
        }
        Filter::ILike(column, term) => {
            params.push(SqlValue::Text(format!("%{}%", escape_like(term))));
            format!("{} LIKE ? ESCAPE '\\'", quote(column))
        }
        Filter::Or(nested) if nested.is_empty() => "0".to_string(),
        Filter::Or(nested) => {
            let clauses: Vec<String> = nested.iter().map(|filter| predicate(filter, params)).collect();
            format!("({})", clauses.join(" OR "))
        }
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => SqlValue::Integer(int),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(int) => Value::from(int),
        SqlValue::Real(real) => Number::from_f64(real).map_or(Value::Null, Value::Number),
        SqlValue::Text(text) => Value::String(text),
        SqlValue::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn write_error(error: rusqlite::Error) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, message) if failure.code == ErrorCode::ConstraintViolation => {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            warn!("constraint violated: {}", message);
            StoreError::Constraint(message)
        }
        _ => StoreError::Sqlite(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn seeded() -> LocalStore {
        let store = LocalStore::in_memory().unwrap();
        for (name, role) in [("admin", "admin"), ("alice", "user")] {
            store
                .insert(Table::Users, row(json!({"username": name, "password": "secret1", "role": role})), &Select::all())
                .await
                .unwrap();
        }
        store
            .insert(Table::Categories, row(json!({"name": "Backend", "creator_id": 1})), &Select::all())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn insert_applies_defaults_and_timestamps() {
        let store = seeded().await;
        let task = store
            .insert(Table::Tasks, row(json!({"title": "Write docs", "category_id": 1, "creator_id": 1})), &Select::all())
            .await
            .unwrap();
        assert_eq!(task["status"], "待领取");
        assert_eq!(task["priority"], "medium");
        assert!(task["created_at"].is_string());
        assert!(task["updated_at"].is_string());

        let category = store
            .fetch_one(&Query::new(Table::Categories).eq("category_id", 1))
            .await
            .unwrap();
        assert_eq!(category["color"], "#007bff");
    }

    #[tokio::test]
    async fn embeds_resolve_to_objects_or_null() {
        let store = seeded().await;
        store
            .insert(Table::Tasks, row(json!({"title": "Claimed", "category_id": 1, "creator_id": 1, "assignee_id": 2})), &Select::all())
            .await
            .unwrap();
        store
            .insert(Table::Tasks, row(json!({"title": "Open", "category_id": 1, "creator_id": 1})), &Select::all())
            .await
            .unwrap();

        let select = Select::columns(&["task_id", "title"])
            .embed(Embed::new("assigned_user", Table::Users, "assignee_id", &["user_id", "username"]))
            .embed(Embed::new("categories", Table::Categories, "category_id", &["name"]));
        let rows = store
            .fetch(&Query::new(Table::Tasks).select(select).order_by("task_id", true))
            .await
            .unwrap();

        assert_eq!(rows[0]["assigned_user"], json!({"user_id": 2, "username": "alice"}));
        assert_eq!(rows[1]["assigned_user"], Value::Null);
        assert_eq!(rows[1]["categories"], json!({"name": "Backend"}));
        assert!(rows[0].get("status").is_none());
    }

    #[tokio::test]
    async fn or_search_is_case_insensitive() {
        let store = seeded().await;
        for (title, description) in [("Fix Login", "auth flow"), ("Docs", "explain LOGIN page"), ("Other", "nothing")] {
            store
                .insert(
                    Table::Tasks,
                    row(json!({"title": title, "description": description, "category_id": 1, "creator_id": 1})),
                    &Select::all(),
                )
                .await
                .unwrap();
        }
        let query = Query::new(Table::Tasks).filter(Filter::search(&["title", "description"], "login"));
        assert_eq!(store.fetch(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unique_username_is_a_constraint_error() {
        let store = seeded().await;
        let result = store
            .insert(Table::Users, row(json!({"username": "alice", "password": "other1"})), &Select::all())
            .await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[tokio::test]
    async fn update_and_delete_return_affected_rows() {
        let store = seeded().await;
        let updated = store
            .update(&Query::new(Table::Users).eq("username", "alice"), row(json!({"role": "admin"})))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["role"], "admin");

        let none = store
            .update(&Query::new(Table::Users).eq("username", "nobody"), row(json!({"role": "admin"})))
            .await
            .unwrap();
        assert!(none.is_empty());

        let deleted = store.delete(&Query::new(Table::Users).eq("user_id", 2)).await.unwrap();
        assert_eq!(deleted[0]["username"], "alice");
        assert!(store.fetch(&Query::new(Table::Users).eq("user_id", 2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_one_reports_cardinality() {
        let store = seeded().await;
        assert!(matches!(
            store.fetch_one(&Query::new(Table::Users).eq("username", "ghost")).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.fetch_one(&Query::new(Table::Users)).await, Err(StoreError::Ambiguous(2))));
        store.ping().await.unwrap();
    }
}
