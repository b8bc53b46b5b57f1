use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::operations::{ConditionNode, OperationRequest, PageOptions, SearchOptions};
use crate::schema_model::{
    parse_data_rows, parse_database_map, parse_json_object, DataRow, DatabaseMap, ShapeError,
    TableMap, TableSchema,
};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(60_000);

const MAX_ATTEMPTS: u32 = 4;
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const FALLBACK_LIMIT: u64 = 100;
const FALLBACK_OFFSET: u64 = 0;
const MAX_ATTEMPT_RECORDS: usize = 256;
const DESCRIBE_ALL_KEY: &str = "describe_all";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub auth_header: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport {
    async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Error)]
pub enum QueryClientError {
    #[error("authentication failed: check username and password")]
    AuthenticationFailed,
    #[error("cannot reach instance: {0}")]
    Unreachable(#[source] TransportError),
    #[error("connect failed: {message}")]
    Connect { message: String },
    #[error("not connected to an instance")]
    NotConnected,
    #[error("database `{0}` not found")]
    DatabaseNotFound(String),
    #[error("table `{database}.{table}` not found")]
    TableNotFound { database: String, table: String },
    #[error("unexpected response shape: {0}")]
    Shape(#[from] ShapeError),
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("{0}")]
    Transport(#[source] TransportError),
    #[error("failed to encode request body: {0}")]
    Body(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationAttempt {
    pub operation: String,
    pub elapsed: Duration,
    pub succeeded: bool,
}

#[derive(Debug, Clone)]
struct Connection {
    base_url: String,
    auth_header: String,
}

#[derive(Debug, Clone)]
enum CachePayload {
    Databases(Arc<DatabaseMap>),
    Tables(Arc<TableMap>),
    Table(Arc<TableSchema>),
}

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    payload: CachePayload,
}

#[derive(Debug)]
pub struct QueryClient<T: HttpTransport> {
    transport: T,
    cache_ttl: Duration,
    connection: Option<Connection>,
    cache: HashMap<String, CacheEntry>,
    attempts: VecDeque<OperationAttempt>,
    last_query_time: Option<Duration>,
}

impl<T: HttpTransport> QueryClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_cache_ttl(transport, DEFAULT_CACHE_TTL)
    }

    #[must_use]
    pub fn with_cache_ttl(transport: T, cache_ttl: Duration) -> Self {
        Self {
            transport,
            cache_ttl,
            connection: None,
            cache: HashMap::new(),
            attempts: VecDeque::new(),
            last_query_time: None,
        }
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    #[must_use]
    pub fn connected_url(&self) -> Option<&str> {
        self.connection
            .as_ref()
            .map(|connection| connection.base_url.as_str())
    }

    #[must_use]
    pub fn last_query_time(&self) -> Option<Duration> {
        self.last_query_time
    }

    pub fn drain_attempts(&mut self) -> Vec<OperationAttempt> {
        self.attempts.drain(..).collect()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn disconnect(&mut self) {
        self.connection = None;
        self.cache.clear();
        self.last_query_time = None;
    }

    pub async fn connect(
        &mut self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<(), QueryClientError> {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.connection = Some(Connection {
            base_url: url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {credentials}"),
        });
        self.cache.clear();

        match self.describe_all().await {
            Ok(_) => Ok(()),
            Err(error) => {
                self.connection = None;
                self.cache.clear();
                Err(classify_connect_failure(error))
            }
        }
    }

    pub async fn describe_all(&mut self) -> Result<Arc<DatabaseMap>, QueryClientError> {
        if let Some(CachePayload::Databases(databases)) = self.cache_read(DESCRIBE_ALL_KEY) {
            return Ok(databases);
        }

        let value = self.request(&OperationRequest::DescribeAll).await?;
        let databases = Arc::new(parse_database_map(&value)?);
        self.cache_write(
            DESCRIBE_ALL_KEY.to_string(),
            CachePayload::Databases(Arc::clone(&databases)),
        );
        Ok(databases)
    }

    pub async fn describe_database(
        &mut self,
        database: &str,
    ) -> Result<Arc<TableMap>, QueryClientError> {
        let key = database_key(database);
        if let Some(CachePayload::Tables(tables)) = self.cache_read(&key) {
            return Ok(tables);
        }

        let databases = self.describe_all().await?;
        let tables = databases
            .get(database)
            .ok_or_else(|| QueryClientError::DatabaseNotFound(database.to_string()))?;
        let tables = Arc::new(tables.clone());
        self.cache_write(key, CachePayload::Tables(Arc::clone(&tables)));
        Ok(tables)
    }

    pub async fn describe_table(
        &mut self,
        database: &str,
        table: &str,
    ) -> Result<Arc<TableSchema>, QueryClientError> {
        let key = table_key(database, table);
        if let Some(CachePayload::Table(schema)) = self.cache_read(&key) {
            return Ok(schema);
        }

        let tables = self.describe_database(database).await?;
        let schema = tables
            .get(table)
            .ok_or_else(|| QueryClientError::TableNotFound {
                database: database.to_string(),
                table: table.to_string(),
            })?;
        let schema = Arc::new(schema.clone());
        self.cache_write(key, CachePayload::Table(Arc::clone(&schema)));
        Ok(schema)
    }

    pub async fn search_by_id(
        &mut self,
        database: &str,
        table: &str,
        ids: Vec<Value>,
        attributes: Option<Vec<String>>,
    ) -> Result<Vec<DataRow>, QueryClientError> {
        let request = OperationRequest::SearchById {
            schema: Some(database.to_string()),
            table: table.to_string(),
            ids,
            get_attributes: attributes,
        };
        let value = self.request(&request).await?;
        Ok(parse_data_rows(&value)?)
    }

    pub async fn search_by_value(
        &mut self,
        database: &str,
        table: &str,
        attribute: &str,
        value: Value,
        page: &PageOptions,
    ) -> Result<Vec<DataRow>, QueryClientError> {
        let request = OperationRequest::SearchByValue {
            schema: Some(database.to_string()),
            table: table.to_string(),
            search_attribute: attribute.to_string(),
            search_value: value,
            get_attributes: page.attributes.clone(),
            limit: page.limit,
            offset: page.offset,
        };
        let value = self.request(&request).await?;
        Ok(parse_data_rows(&value)?)
    }

    pub async fn search_by_conditions(
        &mut self,
        database: &str,
        table: &str,
        conditions: Vec<ConditionNode>,
        options: &SearchOptions,
        hash_attribute: Option<&str>,
    ) -> Result<Vec<DataRow>, QueryClientError> {
        if conditions.is_empty() {
            let attribute = hash_attribute
                .map(str::to_string)
                .or_else(|| options.sort.as_ref().map(|sort| sort.attribute.clone()))
                .unwrap_or_else(|| "id".to_string());
            let page = PageOptions {
                attributes: options.attributes.clone(),
                limit: Some(options.limit.unwrap_or(FALLBACK_LIMIT)),
                offset: Some(options.offset.unwrap_or(FALLBACK_OFFSET)),
            };
            return self
                .search_by_value(database, table, &attribute, Value::from("*"), &page)
                .await;
        }

        let request = OperationRequest::SearchByConditions {
            schema: Some(database.to_string()),
            table: table.to_string(),
            conditions,
            operator: options.operator,
            offset: options.offset,
            limit: options.limit,
            sort: options.sort.clone(),
            get_attributes: options.attributes.clone(),
        };
        let value = self.request(&request).await?;
        Ok(parse_data_rows(&value)?)
    }

    pub async fn system_information(
        &mut self,
        attributes: Option<Vec<String>>,
    ) -> Result<Map<String, Value>, QueryClientError> {
        let request = OperationRequest::SystemInformation { attributes };
        let value = self.request(&request).await?;
        Ok(parse_json_object(&value)?)
    }

    async fn request(&mut self, request: &OperationRequest) -> Result<Value, QueryClientError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or(QueryClientError::NotConnected)?;
        let http_request = HttpRequest {
            url: connection.base_url.clone(),
            auth_header: connection.auth_header.clone(),
            body: serde_json::to_value(request).map_err(QueryClientError::Body)?,
        };

        let mut attempt = 1u32;
        loop {
            if attempt > 1 {
                self.transport
                    .sleep(BACKOFF_BASE * 2u32.pow(attempt - 2))
                    .await;
            }

            let started_at = Instant::now();
            let outcome = self.transport.post_json(&http_request).await;
            let elapsed = started_at.elapsed();
            self.last_query_time = Some(elapsed);
            let succeeded = matches!(&outcome, Ok(response) if response.is_success());
            self.record_attempt(request.operation_name(), elapsed, succeeded);

            let error = match outcome {
                Ok(response) if response.is_success() => {
                    return serde_json::from_str(&response.body).map_err(|error| {
                        QueryClientError::Shape(ShapeError::single(
                            "response",
                            format!("not valid JSON: {error}"),
                        ))
                    });
                }
                Ok(response) if response.status >= 500 => response_error(&response),
                Ok(response) => return Err(response_error(&response)),
                Err(error) => QueryClientError::Transport(error),
            };

            if attempt == MAX_ATTEMPTS {
                return Err(error);
            }
            attempt += 1;
        }
    }

    fn cache_read(&mut self, key: &str) -> Option<CachePayload> {
        let entry = self.cache.get(key)?;
        if Instant::now().duration_since(entry.stored_at) <= self.cache_ttl {
            return Some(entry.payload.clone());
        }
        self.cache.remove(key);
        None
    }

    fn cache_write(&mut self, key: String, payload: CachePayload) {
        self.cache.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                payload,
            },
        );
    }

    fn record_attempt(&mut self, operation: &str, elapsed: Duration, succeeded: bool) {
        self.attempts.push_back(OperationAttempt {
            operation: operation.to_string(),
            elapsed,
            succeeded,
        });
        if self.attempts.len() > MAX_ATTEMPT_RECORDS {
            self.attempts.pop_front();
        }
    }
}

fn database_key(database: &str) -> String {
    format!("describe_db:{database}")
}

fn table_key(database: &str, table: &str) -> String {
    format!("describe_table:{database}.{table}")
}

fn response_error(response: &HttpResponse) -> QueryClientError {
    let body = response.body.trim();
    let message = if body.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        body.to_string()
    };
    QueryClientError::Request {
        status: response.status,
        message,
    }
}

fn classify_connect_failure(error: QueryClientError) -> QueryClientError {
    match error {
        QueryClientError::Request { status: 401, .. } => QueryClientError::AuthenticationFailed,
        QueryClientError::Request { ref message, .. }
            if message.to_ascii_lowercase().contains("unauthorized") =>
        {
            QueryClientError::AuthenticationFailed
        }
        QueryClientError::Transport(error) => QueryClientError::Unreachable(error),
        other => QueryClientError::Connect {
            message: other.to_string(),
        },
    }
}
