//! PostgREST-compatible row store over HTTP.
//!
//! Requests go to `{api_url}/rest/v1/{table}` with the project key sent both
//! as `apikey` and as a bearer token, which is what Supabase expects.

use super::{escape_like, Filter, Query, Row, RowStore, Select, StoreError, Table};
use crate::libs::config::RemoteConfig;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const REST_PATH: &str = "rest/v1";
const PREFER_REPRESENTATION: &str = "return=representation";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Characters with structural meaning inside `or=(...)` expressions.
const RESERVED: &[char] = &[',', '(', ')', '"', ':', '\\'];

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table.name())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn rows(response: Response) -> Result<Vec<Row>, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Vec<Row>>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<RemoteErrorBody> = serde_json::from_str(&body).ok();
        let (code, message) = match parsed {
            Some(error) => {
                let message = error
                    .message
                    .or(error.details)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
                (error.code, message)
            }
            None => (None, if body.is_empty() { status.to_string() } else { body }),
        };
        warn!(status = status.as_u16(), code = ?code, "store request rejected: {}", message);

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => Err(StoreError::Constraint(message)),
            _ => Err(StoreError::Remote {
                status: status.as_u16(),
                code,
                message,
            }),
        }
    }
}

impl RowStore for RestStore {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        query.validate()?;
        let params = query_params(query);
        debug!(table = query.table.name(), ?params, "fetch");

        let request = self.client.get(self.table_url(query.table)).query(&params);
        let response = self.authorized(request).send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Row, select: &Select) -> Result<Row, StoreError> {
        select.validate(table)?;
        for column in row.keys() {
            table.check_column(column)?;
        }
        debug!(table = table.name(), "insert");

        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("select", select_param(select))])
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&[Value::Object(row)]);
        let response = self.authorized(request).send().await?;
        Self::rows(response).await?.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        query.validate_mutation()?;
        for column in changes.keys() {
            query.table.check_column(column)?;
        }
        let params = filter_params(&query.filters);
        debug!(table = query.table.name(), ?params, "update");

        let request = self
            .client
            .patch(self.table_url(query.table))
            .query(&params)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&Value::Object(changes));
        let response = self.authorized(request).send().await?;
        Self::rows(response).await
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        query.validate_mutation()?;
        let params = filter_params(&query.filters);
        debug!(table = query.table.name(), ?params, "delete");

        let request = self
            .client
            .delete(self.table_url(query.table))
            .query(&params)
            .header("Prefer", PREFER_REPRESENTATION);
        let response = self.authorized(request).send().await?;
        Self::rows(response).await
    }
}

/// `select`, filter, `order` and `limit` parameters for a read.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_param(&query.select))];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// `col1,col2,alias:table!via(c1,c2)`, with `*` standing for every column.
fn select_param(select: &Select) -> String {
    let mut parts: Vec<String> = if select.is_all() {
        vec!["*".to_string()]
    } else {
        select.columns.clone()
    };
    for embed in &select.embeds {
        let columns = if embed.columns.is_empty() {
            "*".to_string()
        } else {
            embed.columns.join(",")
        };
        parts.push(format!("{}:{}!{}({})", embed.alias, embed.table.name(), embed.via, columns));
    }
    parts.join(",")
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Or(nested) => {
                let terms: Vec<String> = nested.iter().map(inline_filter).collect();
                ("or".to_string(), format!("({})", terms.join(",")))
            }
            Filter::Eq(column, _) | Filter::Neq(column, _) | Filter::Gte(column, _) | Filter::ILike(column, _) => {
                (column.clone(), operator_value(filter, false))
            }
        })
        .collect()
}

/// A filter in the `column.operator.value` form used inside `or=(...)`.
fn inline_filter(filter: &Filter) -> String {
    match filter {
        Filter::Or(nested) => {
            let terms: Vec<String> = nested.iter().map(inline_filter).collect();
            format!("or({})", terms.join(","))
        }
        Filter::Eq(column, _) | Filter::Neq(column, _) | Filter::Gte(column, _) | Filter::ILike(column, _) => {
            format!("{}.{}", column, operator_value(filter, true))
        }
    }
}

fn operator_value(filter: &Filter, nested: bool) -> String {
    let literal = |value: String| if nested { quote(&value) } else { value };
    match filter {
        Filter::Eq(_, Value::Null) => "is.null".to_string(),
        Filter::Neq(_, Value::Null) => "not.is.null".to_string(),
        Filter::Eq(_, value) => format!("eq.{}", literal(scalar(value))),
        Filter::Neq(_, value) => format!("neq.{}", literal(scalar(value))),
        Filter::Gte(_, value) => format!("gte.{}", literal(scalar(value))),
        Filter::ILike(_, term) => format!("ilike.{}", literal(format!("*{}*", escape_like(term)))),
        Filter::Or(_) => String::new(),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Double-quotes a value that contains reserved characters.
fn quote(value: &str) -> String {
    if value.contains(RESERVED) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
