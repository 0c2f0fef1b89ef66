use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde_json::{json, Map, Value};

use crate::{
    classify::{classify, Outcome},
    config::{ConfigError, Settings},
    docs::{self, DocContent},
    queries,
    status::{self, ColumnSummary, StatusColumn},
    wire::{GraphQLRequest, GraphQLResponse},
    ClientOptions, ComplexityBudget, MondayError, RateLimiter, Result, RetryPolicy,
};

/// Production GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Static user agent sent with every request.
pub const USER_AGENT: &str = concat!("monday-cli/", env!("CARGO_PKG_VERSION"));

/// Remaining complexity below which a warning is logged.
pub const COMPLEXITY_WARNING_THRESHOLD: i64 = 1_000_000;

const LOGGED_QUERY_CHARS: usize = 100;

#[derive(Clone)]
/// Rate-limited, retrying client for the monday.com GraphQL API.
///
/// Clones share one rate-limit window.
pub struct MondayClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    options: ClientOptions,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl fmt::Debug for MondayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MondayClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl MondayClient {
    /// Creates a client that sends `token` verbatim as the `Authorization` value.
    ///
    /// monday.com personal tokens are accepted without a scheme prefix.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let options = ClientOptions::default();
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            token: token.into(),
            limiter: Arc::new(RateLimiter::new(
                options.rate_limit_calls,
                options.rate_limit_period,
            )),
            retry: RetryPolicy::from_options(&options),
            options,
        }
    }

    /// Creates a client from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn new_bearer(api_url: impl Into<String>, token: impl AsRef<str>) -> Self {
        Self::new(api_url, normalize_bearer_authorization(token.as_ref()))
    }

    /// Creates a client from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_url.clone(), settings.api_token.clone())
            .with_options(settings.client_options())
    }

    /// Creates a client from `MONDAY_*` environment variables.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use monday_cli::MondayClient;
    ///
    /// let client = MondayClient::from_env().expect("missing MONDAY_API_TOKEN");
    /// ```
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Settings::from_env().map(|settings| Self::from_settings(&settings))
    }

    /// Applies timeout, retry and rate-limit options.
    ///
    /// This starts a fresh rate-limit window.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.limiter = Arc::new(RateLimiter::new(
            opts.rate_limit_calls,
            opts.rate_limit_period,
        ));
        self.retry = RetryPolicy::from_options(&opts);
        self.options = opts;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Executes a GraphQL document and returns its `data` object.
    ///
    /// Every attempt, retries included, first passes the rate limiter. Only
    /// network failures and HTTP 429 are retried; the last error is returned
    /// once attempts are exhausted.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<Map<String, Value>> {
        let payload = GraphQLRequest::new(query, variables);
        let payload = &payload;
        self.retry
            .run(move || async move {
                self.limiter.admit().await;
                self.send_once(payload).await
            })
            .await
    }

    /// Alias of [`MondayClient::execute`] for read operations.
    pub async fn query(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<Map<String, Value>> {
        self.execute(query, variables).await
    }

    /// Alias of [`MondayClient::execute`] for mutations.
    pub async fn mutate(
        &self,
        mutation: &str,
        variables: Option<&Value>,
    ) -> Result<Map<String, Value>> {
        self.execute(mutation, variables).await
    }

    /// Current account complexity budget.
    pub async fn complexity(&self) -> Result<ComplexityBudget> {
        let data = self.query(queries::GET_COMPLEXITY, None).await?;
        Ok(ComplexityBudget::from_data(&data).unwrap_or_default())
    }

    /// Fetches one item with its columns, assets, updates and subitems.
    pub async fn get_item(&self, item_id: u64) -> Result<Value> {
        let vars = json!({ "itemIds": [item_id.to_string()] });
        let mut data = self.query(queries::GET_ITEM_BY_ID, Some(&vars)).await?;
        take_first(&mut data, "items")
            .ok_or_else(|| MondayError::Validation(format!("item {item_id} not found")))
    }

    /// Fetches an item and the id and name of the board it lives on.
    ///
    /// Works for subitems too; their board is the parent board's subitem board.
    pub async fn item_board(&self, item_id: u64) -> Result<ItemBoard> {
        let item = self.get_item(item_id).await?;
        let board = item.get("board");
        let board_id = board
            .and_then(|board| board.get("id"))
            .and_then(parse_id)
            .ok_or_else(|| {
                MondayError::Validation(format!("could not determine board for item {item_id}"))
            })?;
        let board_name = board
            .and_then(|board| board.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok(ItemBoard {
            board_id,
            board_name,
            item,
        })
    }

    /// Subitems of a parent item.
    pub async fn item_subitems(&self, parent_item_id: u64) -> Result<Vec<Value>> {
        let vars = json!({ "itemIds": [parent_item_id.to_string()] });
        let mut data = self.query(queries::GET_ITEM_SUBITEMS, Some(&vars)).await?;
        let mut item = take_first(&mut data, "items").ok_or_else(|| {
            MondayError::Validation(format!("item {parent_item_id} not found"))
        })?;
        Ok(match item.get_mut("subitems").map(Value::take) {
            Some(Value::Array(subitems)) => subitems,
            _ => Vec::new(),
        })
    }

    /// Lists boards, one page at a time.
    pub async fn list_boards(&self, filter: &BoardFilter) -> Result<Vec<Value>> {
        filter.validate()?;
        let mut vars = json!({ "limit": filter.limit, "page": filter.page });
        if let Some(state) = filter.state.as_api_value() {
            vars["state"] = json!(state);
        }
        if !filter.workspace_ids.is_empty() {
            let ids: Vec<String> = filter.workspace_ids.iter().map(u64::to_string).collect();
            vars["workspace_ids"] = json!(ids);
        }

        let mut data = self.query(queries::GET_BOARDS, Some(&vars)).await?;
        Ok(take_array(&mut data, "boards"))
    }

    /// Collects a board's items by following the pagination cursor.
    ///
    /// Stops when the API returns no cursor or `max_items` items were collected.
    pub async fn board_items(
        &self,
        board_id: u64,
        page_limit: u32,
        max_items: Option<usize>,
    ) -> Result<Vec<Value>> {
        let limit = page_limit.clamp(1, 500);
        let vars = json!({ "boardIds": [board_id.to_string()], "limit": limit });
        let mut data = self.query(queries::GET_BOARD_ITEMS, Some(&vars)).await?;
        let mut board = take_first(&mut data, "boards")
            .ok_or_else(|| MondayError::Validation(format!("board {board_id} not found")))?;

        let (mut items, mut cursor) = split_items_page(board.get_mut("items_page"));
        while let Some(next) = cursor.take() {
            if max_items.is_some_and(|max| items.len() >= max) {
                break;
            }
            tracing::debug!(board_id, collected = items.len(), "fetching next items page");
            let vars = json!({ "cursor": next, "limit": limit });
            let mut data = self.query(queries::GET_NEXT_ITEMS_PAGE, Some(&vars)).await?;
            let (page, next_cursor) = split_items_page(data.get_mut("next_items_page"));
            items.extend(page);
            cursor = next_cursor;
        }

        if let Some(max) = max_items {
            items.truncate(max);
        }
        Ok(items)
    }

    /// Columns of a board, including their `settings_str`.
    pub async fn board_columns(&self, board_id: u64) -> Result<Vec<Value>> {
        let vars = json!({ "boardIds": [board_id.to_string()] });
        let mut data = self.query(queries::GET_BOARD_COLUMNS, Some(&vars)).await?;
        let mut board = take_first(&mut data, "boards")
            .ok_or_else(|| MondayError::Validation(format!("board {board_id} not found")))?;
        Ok(match board.get_mut("columns").map(Value::take) {
            Some(Value::Array(columns)) => columns,
            _ => Vec::new(),
        })
    }

    /// Groups of a board with their title, color and position.
    pub async fn board_groups(&self, board_id: u64) -> Result<Vec<Value>> {
        let vars = json!({ "boardIds": [board_id.to_string()] });
        let mut data = self.query(queries::GET_BOARD_GROUPS, Some(&vars)).await?;
        let mut board = take_first(&mut data, "boards")
            .ok_or_else(|| MondayError::Validation(format!("board {board_id} not found")))?;
        Ok(match board.get_mut("groups").map(Value::take) {
            Some(Value::Array(groups)) => groups,
            _ => Vec::new(),
        })
    }

    /// Every column of a board; status columns carry their labels.
    pub async fn board_column_summaries(&self, board_id: u64) -> Result<Vec<ColumnSummary>> {
        let columns = self.board_columns(board_id).await?;
        Ok(status::summarize_columns(&columns))
    }

    /// Status columns of a board with their labels.
    pub async fn board_status_columns(&self, board_id: u64) -> Result<Vec<StatusColumn>> {
        let columns = self.board_columns(board_id).await?;
        Ok(status::status_columns(&columns))
    }

    /// Lists the workspaces visible to the token.
    pub async fn list_workspaces(&self, filter: &WorkspaceFilter) -> Result<Vec<Value>> {
        if filter.limit < 1 {
            return Err(MondayError::Validation(
                "limit must be greater than 0".to_owned(),
            ));
        }
        let mut vars = json!({ "limit": filter.limit });
        if let Some(kind) = filter.membership.as_api_value() {
            vars["membership_kind"] = json!(kind);
        }
        if !filter.ids.is_empty() {
            let ids: Vec<String> = filter.ids.iter().map(u64::to_string).collect();
            vars["ids"] = json!(ids);
        }

        let mut data = self.query(queries::GET_WORKSPACES, Some(&vars)).await?;
        Ok(take_array(&mut data, "workspaces"))
    }

    /// Exports the doc stored in an item's doc column.
    ///
    /// `column_name` is the column title, matched case-insensitively. Falls
    /// back to the doc's raw blocks when the markdown export reports failure.
    pub async fn export_doc(&self, item_id: u64, column_name: &str) -> Result<DocContent> {
        let ItemBoard { board_id, item, .. } = self.item_board(item_id).await?;
        let columns = self.board_columns(board_id).await?;
        let column_id = docs::find_doc_column(&columns, column_name)?;

        let object_id = docs::doc_object_id(&item, column_id).ok_or_else(|| {
            MondayError::Validation(format!(
                "no document found in column '{column_name}' for item {item_id}"
            ))
        })?;

        let vars = json!({ "objectIds": [&object_id] });
        let mut data = self.query(queries::GET_DOC_BY_OBJECT_ID, Some(&vars)).await?;
        let doc_id = take_first(&mut data, "docs")
            .and_then(|doc| doc.get("id").and_then(parse_id))
            .ok_or_else(|| {
                MondayError::Validation(format!(
                    "could not resolve document (object_id={object_id})"
                ))
            })?;

        let vars = json!({ "docId": doc_id });
        let mut data = self
            .query(queries::EXPORT_MARKDOWN_FROM_DOC, Some(&vars))
            .await?;
        let export = data.remove("export_markdown_from_doc").unwrap_or_default();
        if export.get("success").and_then(Value::as_bool) == Some(true) {
            let markdown = export
                .get("markdown")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Ok(DocContent::Markdown(markdown.to_owned()));
        }

        tracing::debug!(
            doc_id,
            error = ?export.get("error"),
            "markdown export failed, reading blocks"
        );
        let vars = json!({ "docIds": [doc_id.to_string()] });
        let mut data = self.query(queries::GET_DOC_BLOCKS, Some(&vars)).await?;
        take_first(&mut data, "docs")
            .map(DocContent::Blocks)
            .ok_or_else(|| {
                MondayError::Validation(format!("no content found for document {doc_id}"))
            })
    }

    pub async fn create_item(
        &self,
        board_id: u64,
        item_name: &str,
        group_id: Option<&str>,
        column_values: Option<&Value>,
    ) -> Result<Value> {
        let mut vars = json!({
            "boardId": board_id.to_string(),
            "itemName": item_name,
            "columnValues": column_values.map(Value::to_string),
        });
        if let Some(group_id) = group_id {
            vars["groupId"] = json!(group_id);
        }
        let mut data = self.mutate(queries::CREATE_ITEM, Some(&vars)).await?;
        take_object(&mut data, "create_item")
    }

    pub async fn create_subitem(
        &self,
        parent_item_id: u64,
        item_name: &str,
        column_values: Option<&Value>,
    ) -> Result<Value> {
        let vars = json!({
            "parentItemId": parent_item_id.to_string(),
            "itemName": item_name,
            "columnValues": column_values.map(Value::to_string),
        });
        let mut data = self.mutate(queries::CREATE_SUBITEM, Some(&vars)).await?;
        take_object(&mut data, "create_subitem")
    }

    /// Posts an update (comment) on an item or subitem.
    pub async fn create_update(&self, item_id: u64, body: &str) -> Result<Value> {
        let vars = json!({ "itemId": item_id.to_string(), "body": body });
        let mut data = self.mutate(queries::CREATE_UPDATE, Some(&vars)).await?;
        take_object(&mut data, "create_update")
    }

    /// Sets one column value. `value` is sent JSON-encoded, as the API expects.
    pub async fn change_column_value(
        &self,
        board_id: u64,
        item_id: u64,
        column_id: &str,
        value: &Value,
    ) -> Result<Value> {
        let vars = json!({
            "boardId": board_id.to_string(),
            "itemId": item_id.to_string(),
            "columnId": column_id,
            "value": value.to_string(),
        });
        let mut data = self.mutate(queries::CHANGE_COLUMN_VALUE, Some(&vars)).await?;
        take_object(&mut data, "change_column_value")
    }

    /// Sets a status column by its human readable label.
    ///
    /// The label is matched case-insensitively against the column's settings.
    pub async fn update_status(&self, item_id: u64, column_id: &str, label: &str) -> Result<Value> {
        let board_id = self.item_board(item_id).await?.board_id;
        let columns = self.board_columns(board_id).await?;
        let column = columns
            .iter()
            .find(|column| column.get("id").and_then(Value::as_str) == Some(column_id))
            .ok_or_else(|| {
                MondayError::Validation(format!(
                    "column '{column_id}' not found on board {board_id}"
                ))
            })?;

        let kind = column.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind != "status" {
            return Err(MondayError::Validation(format!(
                "column '{column_id}' is not a status column (type: {kind})"
            )));
        }
        let settings = column
            .get("settings_str")
            .and_then(Value::as_str)
            .filter(|settings| !settings.is_empty())
            .ok_or_else(|| {
                MondayError::Validation(format!(
                    "column '{column_id}' has no status options configured"
                ))
            })?;

        let options = status::parse_status_labels(settings)?;
        let index = status::resolve_label(&options, label)?;
        self.change_column_value(board_id, item_id, column_id, &json!({ "index": index }))
            .await
    }

    /// Steps of one attempt: POST, classify, decode, check `errors`, log complexity.
    async fn send_once(&self, payload: &GraphQLRequest<'_>) -> Result<Map<String, Value>> {
        tracing::debug!(
            query = %truncate_chars(payload.query.trim(), LOGGED_QUERY_CHARS),
            has_variables = payload.variables.is_some(),
            "sending GraphQL request"
        );

        let response = self
            .http
            .post(&self.api_url)
            .header(header::AUTHORIZATION, &self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .json(payload)
            .send()
            .await
            .map_err(|err| classify(Outcome::Transport(&err)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|err| classify(Outcome::Transport(&err)))?;

        tracing::debug!(status = status.as_u16(), "received GraphQL response");

        if !status.is_success() {
            return Err(classify(Outcome::Http {
                status,
                retry_after: retry_after.as_deref(),
                body: &body,
            }));
        }

        let response = serde_json::from_str::<GraphQLResponse>(&body)
            .map_err(|err| classify(Outcome::Undecodable(&err)))?;

        let messages = response.error_messages();
        if !messages.is_empty() {
            let raw = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
            return Err(classify(Outcome::GraphQL {
                messages: &messages,
                raw: &raw,
            }));
        }

        let data = response.into_data();
        if let Some(budget) = ComplexityBudget::from_data(&data) {
            log_complexity(&budget);
        }
        Ok(data)
    }
}

/// An item together with the board it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemBoard {
    pub board_id: u64,
    pub board_name: String,
    pub item: Value,
}

/// Board state filter for [`MondayClient::list_boards`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BoardState {
    #[default]
    Active,
    Archived,
    Deleted,
    All,
}

impl BoardState {
    fn as_api_value(self) -> Option<&'static str> {
        match self {
            Self::Active => Some("active"),
            Self::Archived => Some("archived"),
            Self::Deleted => Some("deleted"),
            Self::All => None,
        }
    }
}

impl FromStr for BoardState {
    type Err = MondayError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "deleted" => Ok(Self::Deleted),
            "all" => Ok(Self::All),
            other => Err(MondayError::Validation(format!(
                "invalid state '{other}'; valid options: active, archived, deleted, all"
            ))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoardFilter {
    /// Page size, 1 to 100.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
    pub state: BoardState,
    pub workspace_ids: Vec<u64>,
}

impl Default for BoardFilter {
    fn default() -> Self {
        Self {
            limit: 25,
            page: 1,
            state: BoardState::Active,
            workspace_ids: Vec::new(),
        }
    }
}

impl BoardFilter {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.limit) {
            return Err(MondayError::Validation(
                "limit must be between 1 and 100".to_owned(),
            ));
        }
        if self.page < 1 {
            return Err(MondayError::Validation(
                "page must be 1 or greater".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Workspace membership filter for [`MondayClient::list_workspaces`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WorkspaceMembership {
    #[default]
    All,
    Member,
}

impl WorkspaceMembership {
    fn as_api_value(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Member => Some("member"),
        }
    }
}

impl FromStr for WorkspaceMembership {
    type Err = MondayError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "member" => Ok(Self::Member),
            other => Err(MondayError::Validation(format!(
                "invalid membership kind '{other}'; valid options: all, member"
            ))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkspaceFilter {
    pub limit: u32,
    pub ids: Vec<u64>,
    pub membership: WorkspaceMembership,
}

impl Default for WorkspaceFilter {
    fn default() -> Self {
        Self {
            limit: 100,
            ids: Vec::new(),
            membership: WorkspaceMembership::All,
        }
    }
}

fn log_complexity(budget: &ComplexityBudget) {
    if budget.before.is_none() && budget.after.is_none() {
        return;
    }
    let before = budget.before.unwrap_or_default();
    let after = budget.after.unwrap_or_default();
    tracing::info!(before, after, "query complexity");
    if after < COMPLEXITY_WARNING_THRESHOLD {
        tracing::warn!(
            after,
            reset_in_x_seconds = ?budget.reset_in_x_seconds,
            "low complexity budget remaining"
        );
    }
}

/// Removes `key` from `data` and returns its first array element.
fn take_first(data: &mut Map<String, Value>, key: &str) -> Option<Value> {
    take_array(data, key).into_iter().next()
}

fn take_array(data: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match data.remove(key) {
        Some(Value::Array(values)) => values,
        _ => Vec::new(),
    }
}

fn take_object(data: &mut Map<String, Value>, key: &str) -> Result<Value> {
    match data.remove(key) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(MondayError::api(format!("{key} returned no data"))),
    }
}

fn split_items_page(page: Option<&mut Value>) -> (Vec<Value>, Option<String>) {
    let Some(page) = page else {
        return (Vec::new(), None);
    };
    let cursor = page
        .get("cursor")
        .and_then(Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_owned);
    let items = match page.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    (items, cursor)
}

fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(text) => text.parse().ok(),
        other => other.as_u64(),
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
