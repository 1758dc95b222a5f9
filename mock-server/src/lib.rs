//! In-memory stand-in for the Buffer API, used by integration tests.
//!
//! Every route lives under `/1`, requires `Authorization: Bearer <token>`,
//! and answers errors with the service's `{"error", "code"}` body. POST
//! bodies are read as JSON whatever their declared content type.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "test-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub activity_at: i64,
    pub created_at: i64,
    pub plan: String,
    pub timezone: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schedule {
    pub days: Vec<String>,
    pub times: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub avatar: String,
    pub created_at: i64,
    pub default: bool,
    pub formatted_username: String,
    pub schedules: Vec<Schedule>,
    pub service: String,
    pub service_id: String,
    pub service_username: String,
    pub statistics: Value,
    pub timezone: String,
    pub user_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Update {
    pub id: String,
    pub created_at: i64,
    pub due_at: Option<i64>,
    pub profile_id: String,
    pub profile_service: String,
    pub sent_at: Option<i64>,
    pub status: String,
    pub text: String,
    pub user_id: String,
    pub via: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub created_at: i64,
    pub event: String,
    pub interaction_id: String,
    pub user: Value,
}

/// Seeded account state. Updates are kept in queue order.
#[derive(Debug)]
pub struct Store {
    pub user: User,
    pub profiles: Vec<Profile>,
    pub updates: Vec<Update>,
    pub interactions: HashMap<String, Vec<Interaction>>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    token: Arc<str>,
}

/// An error answered in the service's `{"error", "code"}` shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: i64,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, code: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, 1, "Not Found")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message, "code": self.code}))).into_response()
    }
}

const USER_ID: &str = "4f0c0a06512f7ef214000000";

impl Store {
    pub fn seeded() -> Self {
        let profile = |id: &str, service: &str, username: &str, default: bool| Profile {
            id: id.to_string(),
            avatar: format!("https://buffer.example/avatars/{id}.png"),
            created_at: 1_320_703_028,
            default,
            formatted_username: format!("@{username}"),
            schedules: vec![Schedule {
                days: ["mon", "tue", "wed", "thu", "fri"].map(String::from).to_vec(),
                times: ["12:00", "17:00", "18:00"].map(String::from).to_vec(),
            }],
            service: service.to_string(),
            service_id: format!("{service}-{id}"),
            service_username: username.to_string(),
            statistics: json!({"followers": 246}),
            timezone: "Europe/London".to_string(),
            user_id: USER_ID.to_string(),
        };
        let update = |id: &str, status: &str, text: &str, sent_at: Option<i64>| Update {
            id: id.to_string(),
            created_at: 1_320_703_582,
            due_at: Some(1_320_742_800),
            profile_id: "p1".to_string(),
            profile_service: "twitter".to_string(),
            sent_at,
            status: status.to_string(),
            text: text.to_string(),
            user_id: USER_ID.to_string(),
            via: "api".to_string(),
        };
        let interaction = |id: &str, event: &str| Interaction {
            id: id.to_string(),
            created_at: 1_320_743_000,
            event: event.to_string(),
            interaction_id: format!("tw-{id}"),
            user: json!({"username": "bufferapp", "followers": 900, "avatar": ""}),
        };

        Self {
            user: User {
                id: USER_ID.to_string(),
                activity_at: 1_343_654_640,
                created_at: 1_326_193_926,
                plan: "free".to_string(),
                timezone: "Europe/London".to_string(),
            },
            profiles: vec![
                profile("p1", "twitter", "buffer", true),
                profile("p2", "facebook", "bufferapp", false),
            ],
            updates: vec![
                update("u1", "buffer", "first in queue", None),
                update("u2", "buffer", "second in queue", None),
                update("u3", "buffer", "third in queue", None),
                update("s1", "sent", "already out", Some(1_320_742_800)),
            ],
            interactions: HashMap::from([(
                "s1".to_string(),
                vec![interaction("i1", "retweet"), interaction("i2", "favorite")],
            )]),
        }
    }

    fn profile(&self, id: &str) -> Result<&Profile, ApiFailure> {
        self.profiles.iter().find(|p| p.id == id).ok_or_else(ApiFailure::not_found)
    }

    fn update_index(&self, id: &str) -> Result<usize, ApiFailure> {
        self.updates.iter().position(|u| u.id == id).ok_or_else(ApiFailure::not_found)
    }

    fn pending_ids(&self, profile_id: &str) -> Vec<String> {
        self.updates
            .iter()
            .filter(|u| u.profile_id == profile_id && u.status == "buffer")
            .map(|u| u.id.clone())
            .collect()
    }

    /// Rewrite the pending queue of `profile_id` to follow `order`; pending
    /// updates not named keep their relative order after the named ones.
    fn reorder_pending(&mut self, profile_id: &str, order: &[String]) {
        let pending = self.pending_ids(profile_id);
        let mut wanted: Vec<String> = order.iter().filter(|id| pending.contains(*id)).cloned().collect();
        wanted.extend(pending.iter().filter(|id| !order.contains(*id)).cloned());

        let (mut queue, rest): (Vec<Update>, Vec<Update>) = std::mem::take(&mut self.updates)
            .into_iter()
            .partition(|u| u.profile_id == profile_id && u.status == "buffer");
        queue.sort_by_key(|u| wanted.iter().position(|id| *id == u.id).unwrap_or(usize::MAX));
        self.updates = queue;
        self.updates.extend(rest);
    }

    fn pending(&self, profile_id: &str) -> Vec<Update> {
        self.updates
            .iter()
            .filter(|u| u.profile_id == profile_id && u.status == "buffer")
            .cloned()
            .collect()
    }
}

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::seeded())),
        token: token.into(),
    };
    let api = Router::new()
        .route("/user.json", get(get_user))
        .route("/user/deauthorize.json", post(deauthorize))
        .route("/profiles.json", get(list_profiles))
        .route("/profiles/{id}", get(get_profile))
        .route("/profiles/{id}/schedules.json", get(get_schedules))
        .route("/profiles/{id}/updates/pending.json", get(pending_updates))
        .route("/profiles/{id}/updates/sent.json", get(sent_updates))
        .route("/profiles/{id}/updates/reorder.json", post(reorder_updates))
        .route("/profiles/{id}/updates/shuffle.json", post(shuffle_updates))
        .route("/updates/create.json", post(create_update))
        .route("/updates/{id}", get(get_update))
        .route("/updates/{id}/interactions.json", get(get_interactions))
        .route("/updates/{id}/update.json", post(edit_update))
        .route("/updates/{id}/share.json", post(share_update))
        .route("/updates/{id}/destroy.json", post(destroy_update))
        .route("/updates/{id}/move_to_top.json", post(move_to_top))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));
    Router::new().nest("/1", api).with_state(state)
}

pub async fn run_with_token(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected.as_str()) {
        debug!(uri = %request.uri().path(), "rejecting request without a valid token");
        return ApiFailure::new(StatusCode::UNAUTHORIZED, 401, "OAuth error: invalid access token").into_response();
    }
    next.run(request).await
}

fn strip_json(file: &str) -> Result<&str, ApiFailure> {
    file.strip_suffix(".json").ok_or_else(ApiFailure::not_found)
}

/// Parse a POST body as JSON; an empty body means all defaults.
fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiFailure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiFailure::new(StatusCode::BAD_REQUEST, 1000, e.to_string()))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

async fn get_user(State(state): State<AppState>) -> Json<User> {
    Json(state.db.read().await.user.clone())
}

async fn deauthorize() -> Json<Value> {
    Json(json!({"success": true, "message": "Access token revoked"}))
}

async fn list_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.db.read().await.profiles.clone())
}

async fn get_profile(State(state): State<AppState>, Path(file): Path<String>) -> Result<Json<Profile>, ApiFailure> {
    let id = strip_json(&file)?;
    let db = state.db.read().await;
    db.profile(id).cloned().map(Json)
}

async fn get_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Schedule>>, ApiFailure> {
    let db = state.db.read().await;
    Ok(Json(db.profile(&id)?.schedules.clone()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub count: Option<usize>,
    pub since: Option<i64>,
    pub utc: Option<bool>,
}

/// Items to skip for a 1-based `page`; saturates instead of overflowing.
fn offset(page: usize, count: usize) -> usize {
    (page - 1).saturating_mul(count)
}

fn page_of(updates: Vec<Update>, params: &ListParams) -> Value {
    let since = params.since.unwrap_or(i64::MIN);
    let matching: Vec<Update> = updates.into_iter().filter(|u| u.created_at >= since).collect();
    let count = params.count.unwrap_or(10).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);
    let items: Vec<&Update> = matching.iter().skip(offset(page, count)).take(count).collect();
    json!({"total": matching.len(), "updates": items})
}

async fn pending_updates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiFailure> {
    let db = state.db.read().await;
    db.profile(&id)?;
    Ok(Json(page_of(db.pending(&id), &params)))
}

async fn sent_updates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiFailure> {
    let db = state.db.read().await;
    db.profile(&id)?;
    let sent = db
        .updates
        .iter()
        .filter(|u| u.profile_id == id && u.status == "sent")
        .cloned()
        .collect();
    Ok(Json(page_of(sent, &params)))
}

#[derive(Debug, Default, Deserialize)]
struct ReorderBody {
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    offset: usize,
}

async fn reorder_updates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiFailure> {
    let input: ReorderBody = json_body(&body)?;
    if input.order.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 1004, "order is required"));
    }
    let mut db = state.db.write().await;
    db.profile(&id)?;

    let mut order = db.pending_ids(&id);
    order.retain(|u| !input.order.contains(u));
    let at = input.offset.min(order.len());
    order.splice(at..at, input.order.iter().cloned());
    db.reorder_pending(&id, &order);

    Ok(Json(json!({"success": true, "updates": db.pending(&id)})))
}

#[derive(Debug, Default, Deserialize)]
struct ShuffleBody {
    #[serde(default)]
    count: usize,
}

async fn shuffle_updates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiFailure> {
    let input: ShuffleBody = json_body(&body)?;
    let mut db = state.db.write().await;
    db.profile(&id)?;

    // Deterministic "shuffle": reverse the first `count` pending updates.
    let mut order = db.pending_ids(&id);
    let n = if input.count == 0 { order.len() } else { input.count.min(order.len()) };
    order[..n].reverse();
    db.reorder_pending(&id, &order);

    Ok(Json(json!({"success": true, "updates": db.pending(&id)})))
}

#[derive(Debug, Default, Deserialize)]
struct CreateBody {
    #[serde(default)]
    profile_ids: Vec<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    now: bool,
    #[serde(default)]
    top: bool,
}

async fn create_update(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiFailure> {
    let input: CreateBody = json_body(&body)?;
    if input.profile_ids.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 1004, "profile_ids is required"));
    }
    if input.text.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 1004, "Text is required"));
    }

    let mut db = state.db.write().await;
    let mut created = Vec::with_capacity(input.profile_ids.len());
    for profile_id in &input.profile_ids {
        let service = db.profile(profile_id)?.service.clone();
        let timestamp = now();
        created.push(Update {
            id: Uuid::new_v4().simple().to_string(),
            created_at: timestamp,
            due_at: (!input.now).then_some(timestamp + 3600),
            profile_id: profile_id.clone(),
            profile_service: service,
            sent_at: input.now.then_some(timestamp),
            status: if input.now { "sent" } else { "buffer" }.to_string(),
            text: input.text.clone(),
            user_id: USER_ID.to_string(),
            via: "api".to_string(),
        });
    }
    for update in &created {
        if input.top {
            db.updates.insert(0, update.clone());
        } else {
            db.updates.push(update.clone());
        }
    }

    Ok(Json(json!({
        "success": true,
        "buffer_count": db.updates.iter().filter(|u| u.status == "buffer").count(),
        "updates": created,
    })))
}

async fn get_update(State(state): State<AppState>, Path(file): Path<String>) -> Result<Json<Update>, ApiFailure> {
    let id = strip_json(&file)?;
    let db = state.db.read().await;
    let index = db.update_index(id)?;
    Ok(Json(db.updates[index].clone()))
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionParams {
    pub event: Option<String>,
    pub page: Option<usize>,
    pub count: Option<usize>,
}

async fn get_interactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<InteractionParams>,
) -> Result<Json<Value>, ApiFailure> {
    let db = state.db.read().await;
    db.update_index(&id)?;
    let all = db.interactions.get(&id).cloned().unwrap_or_default();
    let matching: Vec<Interaction> = all
        .into_iter()
        .filter(|i| params.event.as_deref().map_or(true, |event| i.event == event))
        .collect();
    let count = params.count.unwrap_or(20).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);
    let items: Vec<&Interaction> = matching.iter().skip(offset(page, count)).take(count).collect();
    Ok(Json(json!({"total": matching.len(), "interactions": items})))
}

#[derive(Debug, Default, Deserialize)]
struct EditBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    now: bool,
}

async fn edit_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiFailure> {
    let input: EditBody = json_body(&body)?;
    let mut db = state.db.write().await;
    let index = db.update_index(&id)?;
    let update = &mut db.updates[index];
    if update.status == "sent" {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 1011, "Update already sent"));
    }
    if input.text.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 1004, "Text is required"));
    }
    update.text = input.text;
    if input.now {
        update.status = "sent".to_string();
        update.sent_at = Some(now());
    }
    Ok(Json(json!({"success": true, "buffer_count": 1, "update": update.clone()})))
}

async fn share_update(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let index = db.update_index(&id)?;
    let update = &mut db.updates[index];
    update.status = "sent".to_string();
    update.sent_at = Some(now());
    Ok(Json(json!({"success": true})))
}

async fn destroy_update(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let index = db.update_index(&id)?;
    db.updates.remove(index);
    db.interactions.remove(&id);
    Ok(Json(json!({"success": true})))
}

async fn move_to_top(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let index = db.update_index(&id)?;
    let update = db.updates.remove(index);
    db.updates.insert(0, update.clone());
    Ok(Json(json!({"success": true, "update": update})))
}
