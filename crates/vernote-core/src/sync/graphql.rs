//! GraphQL data API client (AppSync-style endpoint with API key auth).

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Model, RemoteError, RemoteSyncAdapter, SyncError, SyncResponse, SyncResult};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct GraphQlSyncAdapter {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GraphQlSyncAdapter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("GraphQlSyncAdapter")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GraphQlSyncAdapter {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> SyncResult<Self> {
        let endpoint = normalize_endpoint(endpoint.into())?;
        let api_key = normalize_text_option(Some(api_key.into())).ok_or_else(|| {
            SyncError::InvalidConfiguration("API key must not be empty".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|error| SyncError::InvalidConfiguration(error.to_string()))?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, query: &str, variables: Value) -> SyncResponse<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("GraphQL request to {} failed: {}", self.endpoint, error);
                return SyncResponse::failure(RemoteError::transport(error.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                return SyncResponse::failure(RemoteError::transport(format!(
                    "failed to read response body: {error}"
                )))
            }
        };

        response_from_http(status, &body)
    }
}

impl RemoteSyncAdapter for GraphQlSyncAdapter {
    async fn list<M: Model>(&self) -> SyncResponse<Vec<M::Record>> {
        let field = list_field::<M>();
        let query = list_query::<M>();
        let query = query.as_str();

        let response = collect_pages::<M::Record, _, _>(&field, move |next_token| {
            self.execute(query, json!({ "nextToken": next_token }))
        })
        .await;
        if let Some(records) = &response.data {
            tracing::debug!("Listed {} {} records", records.len(), M::TYPE_NAME);
        }
        response
    }

    async fn create<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        self.mutate::<M>("create", record).await
    }

    async fn update<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        self.mutate::<M>("update", record).await
    }
}

impl GraphQlSyncAdapter {
    async fn mutate<M: Model>(&self, operation: &str, record: &M::Record) -> SyncResponse<()> {
        let input = match serde_json::to_value(record) {
            Ok(input) => input,
            Err(error) => return SyncResponse::failure(RemoteError::payload(error.to_string())),
        };

        let response = self
            .execute(&mutation_document::<M>(operation), json!({ "input": input }))
            .await;
        if response.errors.is_empty() {
            SyncResponse::ok(())
        } else {
            SyncResponse::failed(response.errors)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<RemoteError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage<R> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<R>>,
    #[serde(default)]
    next_token: Option<String>,
}

/// Follow `nextToken` until the service stops returning one.
///
/// A token the service already handed out fails the listing instead of
/// looping forever.
async fn collect_pages<R, F, Fut>(field: &str, mut fetch: F) -> SyncResponse<Vec<R>>
where
    R: DeserializeOwned,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = SyncResponse<Value>>,
{
    let mut records = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = fetch(next_token.take()).await;
        let page = match parse_list_page::<R>(response, field).into_result("list") {
            Ok(page) => page,
            Err(SyncError::Remote(errors)) => return SyncResponse::failed(errors),
            Err(error) => return SyncResponse::failure(RemoteError::payload(error.to_string())),
        };

        records.extend(page.items.into_iter().flatten());
        match page.next_token {
            Some(token) if !token.is_empty() => {
                if !seen_tokens.insert(token.clone()) {
                    tracing::warn!("`{}` repeated page token {}", field, token);
                    return SyncResponse::failure(RemoteError::payload(format!(
                        "`{field}` returned page token `{token}` twice"
                    )));
                }
                next_token = Some(token);
            }
            _ => break,
        }
    }

    SyncResponse::ok(records)
}

fn response_from_http(status: StatusCode, body: &str) -> SyncResponse<Value> {
    if status.is_success() {
        parse_envelope(body)
    } else {
        SyncResponse::failure(RemoteError::typed("Http", parse_api_error(status, body)))
    }
}

fn parse_envelope(body: &str) -> SyncResponse<Value> {
    match serde_json::from_str::<GraphQlEnvelope>(body) {
        Ok(envelope) => SyncResponse {
            data: envelope.data.filter(|data| !data.is_null()),
            errors: envelope.errors.unwrap_or_default(),
        },
        Err(error) => SyncResponse::failure(RemoteError::payload(format!(
            "invalid GraphQL response: {error}"
        ))),
    }
}

fn parse_list_page<R: DeserializeOwned>(
    response: SyncResponse<Value>,
    field: &str,
) -> SyncResponse<ListPage<R>> {
    if !response.errors.is_empty() {
        return SyncResponse::failed(response.errors);
    }
    let Some(mut data) = response.data else {
        return SyncResponse::failure(RemoteError::payload("response carried no data"));
    };

    let page = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    if page.is_null() {
        return SyncResponse::failure(RemoteError::payload(format!(
            "response is missing `{field}`"
        )));
    }

    match serde_json::from_value::<ListPage<R>>(page) {
        Ok(page) => SyncResponse::ok(page),
        Err(error) => SyncResponse::failure(RemoteError::payload(format!(
            "invalid `{field}` payload: {error}"
        ))),
    }
}

fn list_field<M: Model>() -> String {
    format!("list{}s", M::TYPE_NAME)
}

fn list_query<M: Model>() -> String {
    let name = M::TYPE_NAME;
    format!(
        "query List{name}s($nextToken: String) {{ list{name}s(nextToken: $nextToken) {{ items {{ {} }} nextToken }} }}",
        M::SELECTION
    )
}

fn mutation_document<M: Model>(operation: &str) -> String {
    let name = M::TYPE_NAME;
    let capitalized = match operation {
        "create" => "Create",
        "update" => "Update",
        _ => operation,
    };
    format!(
        "mutation {capitalized}{name}($input: {capitalized}{name}Input!) {{ {operation}{name}(input: $input) {{ id }} }}"
    )
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_endpoint(raw: String) -> SyncResult<String> {
    let endpoint = normalize_text_option(Some(raw)).ok_or_else(|| {
        SyncError::InvalidConfiguration("endpoint must not be empty".to_string())
    })?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(SyncError::InvalidConfiguration(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}
