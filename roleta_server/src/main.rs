use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use axum_extra::TypedHeader;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use roleta_core::{layout, EntropySource, ItemList, WheelError, WheelSession, SETTLE_DURATION};
use roleta_shared::{
    AddItemRequest, ApiError, ItemDto, OutcomeResponse, SectorDto, SetWeightRequest, SpinLogEntry,
    SpinResponse, WheelResponse,
};

struct AppState {
    db: SqlitePool,
    api_key: String,
    wheel: Mutex<WheelState>,
}

/// In-memory spin state. Only the item list survives a restart; rotation,
/// the pending spin and the last outcome are transient, as in the original
/// single-page lifetime of the wheel.
#[derive(Default)]
struct WheelState {
    session: WheelSession,
    settle_task: Option<JoinHandle<()>>,
    last_outcome: Option<(String, DateTime<Utc>)>,
}

struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SpinInFlight => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

fn internal<E: std::fmt::Display>(err: E) -> AppError {
    error!("internal error: {err}");
    ApiError::Internal.into()
}

fn invalid(err: WheelError) -> AppError {
    match err {
        WheelError::UnknownItem(name) => ApiError::NotFound(name).into(),
        other => ApiError::Invalid(other.to_string()).into(),
    }
}

#[derive(sqlx::FromRow)]
struct WheelRow {
    items_json: String,
}

async fn load_items(pool: &SqlitePool) -> anyhow::Result<ItemList> {
    let row = sqlx::query_as::<_, WheelRow>("SELECT items_json FROM wheel WHERE id = 1")
        .fetch_one(pool)
        .await?;
    // ItemList deserialization re-validates names and weights
    Ok(serde_json::from_str(&row.items_json)?)
}

async fn store_items(pool: &SqlitePool, items: &ItemList) -> anyhow::Result<()> {
    let json = serde_json::to_string(items)?;
    sqlx::query("UPDATE wheel SET items_json = ? WHERE id = 1")
        .bind(json)
        .execute(pool)
        .await?;
    Ok(())
}

fn settle_ms() -> u64 {
    SETTLE_DURATION.as_millis() as u64
}

async fn route_wheel(State(state): State<Arc<AppState>>) -> Result<Json<WheelResponse>, AppError> {
    let wheel = state.wheel.lock().await;
    let items = load_items(&state.db).await.map_err(internal)?;
    let sectors = layout(&items)
        .into_iter()
        .map(|s| SectorDto {
            name: s.item.name,
            weight: s.item.weight,
            start_deg: s.start_deg,
            end_deg: s.end_deg,
        })
        .collect();
    let items = items
        .iter()
        .map(|i| ItemDto {
            name: i.name.clone(),
            weight: i.weight,
        })
        .collect();
    Ok(Json(WheelResponse {
        items,
        sectors,
        rotation: wheel.session.rotation(),
        spinning: wheel.session.is_spinning(),
        settle_ms: settle_ms(),
    }))
}

async fn route_add_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddItemRequest>,
) -> Result<StatusCode, AppError> {
    // list mutations serialize with spins through the wheel lock
    let _wheel = state.wheel.lock().await;
    let mut items = load_items(&state.db).await.map_err(internal)?;
    match req.weight {
        Some(weight) => items.add_weighted(&req.name, weight),
        None => items.add(&req.name),
    }
    .map_err(invalid)?;
    store_items(&state.db, &items).await.map_err(internal)?;
    Ok(StatusCode::CREATED)
}

async fn route_remove_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let _wheel = state.wheel.lock().await;
    let mut items = load_items(&state.db).await.map_err(internal)?;
    items.remove(&name).map_err(invalid)?;
    store_items(&state.db, &items).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn route_set_weight(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<SetWeightRequest>,
) -> Result<StatusCode, AppError> {
    let _wheel = state.wheel.lock().await;
    let mut items = load_items(&state.db).await.map_err(internal)?;
    items.set_weight(&name, req.weight).map_err(invalid)?;
    store_items(&state.db, &items).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn route_spin(State(state): State<Arc<AppState>>) -> Result<Json<SpinResponse>, AppError> {
    let mut wheel = state.wheel.lock().await;
    if wheel.session.is_spinning() {
        return Err(ApiError::SpinInFlight.into());
    }
    let items = load_items(&state.db).await.map_err(internal)?;
    let Some(target) = wheel.session.spin(&items, &mut EntropySource::new()) else {
        // empty wheel: spinning is a no-op, not an error
        return Ok(Json(SpinResponse {
            started: false,
            rotation: wheel.session.rotation(),
            settle_ms: settle_ms(),
        }));
    };

    // deferred resolution: one abortable task per spin
    let task_state = Arc::clone(&state);
    wheel.settle_task = Some(tokio::spawn(async move {
        tokio::time::sleep(SETTLE_DURATION).await;
        settle_pending(&task_state).await;
    }));

    info!("spin started, target rotation {target:.1}");
    Ok(Json(SpinResponse {
        started: true,
        rotation: target,
        settle_ms: settle_ms(),
    }))
}

async fn settle_pending(state: &AppState) {
    let mut wheel = state.wheel.lock().await;
    let Some(outcome) = wheel.session.settle() else {
        return;
    };
    let ts = Utc::now();
    if let Err(err) = sqlx::query("INSERT INTO spins (ts, rotation, selected) VALUES (?, ?, ?)")
        .bind(ts.to_rfc3339())
        .bind(outcome.rotation)
        .bind(&outcome.selected.name)
        .execute(&state.db)
        .await
    {
        error!("failed to log spin: {err}");
    }
    info!("spin settled on {}", outcome.selected.name);
    wheel.last_outcome = Some((outcome.selected.name, ts));
    wheel.settle_task = None;
}

async fn route_cancel_spin(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut wheel = state.wheel.lock().await;
    if !wheel.session.is_spinning() {
        return StatusCode::NOT_FOUND;
    }
    if let Some(task) = wheel.settle_task.take() {
        task.abort();
    }
    wheel.session.cancel();
    info!("pending spin cancelled");
    StatusCode::NO_CONTENT
}

async fn route_outcome(State(state): State<Arc<AppState>>) -> Json<OutcomeResponse> {
    let wheel = state.wheel.lock().await;
    let (selected, ts) = match &wheel.last_outcome {
        Some((name, ts)) => (Some(name.clone()), Some(*ts)),
        None => (None, None),
    };
    Json(OutcomeResponse { selected, ts })
}

#[derive(Deserialize)]
struct LogsQuery {
    #[serde(default = "default_log_limit")]
    limit: i64,
}

fn default_log_limit() -> i64 {
    20
}

#[derive(sqlx::FromRow)]
struct SpinRow {
    id: i64,
    ts: DateTime<Utc>,
    rotation: f64,
    selected: String,
}

async fn route_logs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LogsQuery>,
) -> Result<Json<Vec<SpinLogEntry>>, AppError> {
    let rows = sqlx::query_as::<_, SpinRow>(
        "SELECT id, ts, rotation, selected FROM spins ORDER BY id DESC LIMIT ?",
    )
    .bind(q.limit)
    .fetch_all(&state.db)
    .await
    .map_err(internal)?;
    let entries = rows
        .into_iter()
        .map(|r| SpinLogEntry {
            id: r.id,
            ts: r.ts,
            rotation: r.rotation,
            selected: r.selected,
        })
        .collect();
    Ok(Json(entries))
}

async fn route_admin_reset(
    State(state): State<Arc<AppState>>,
    TypedHeader(axum_extra::headers::Authorization(bearer)): TypedHeader<
        axum_extra::headers::Authorization<axum_extra::headers::authorization::Bearer>,
    >,
) -> Result<StatusCode, AppError> {
    if bearer.token() != state.api_key {
        return Err(ApiError::Unauthorized.into());
    }
    let mut wheel = state.wheel.lock().await;
    if let Some(task) = wheel.settle_task.take() {
        task.abort();
    }
    wheel.session = WheelSession::new();
    wheel.last_outcome = None;
    store_items(&state.db, &ItemList::new())
        .await
        .map_err(internal)?;
    sqlx::query("DELETE FROM spins")
        .execute(&state.db)
        .await
        .map_err(internal)?;
    info!("wheel reset");
    Ok(StatusCode::NO_CONTENT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://roleta.db".to_string());
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(SqliteConnectOptions::from_str(&url)?.create_if_missing(true))
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let state = Arc::new(AppState {
        db,
        api_key: std::env::var("API_KEY").unwrap_or_else(|_| "dev-key".into()),
        wheel: Mutex::new(WheelState::default()),
    });

    let app = Router::new()
        .route("/wheel", get(route_wheel))
        .route("/items", post(route_add_item))
        .route("/items/:name", delete(route_remove_item))
        .route("/items/:name/weight", put(route_set_weight))
        .route("/spin", post(route_spin).delete(route_cancel_spin))
        .route("/outcome", get(route_outcome))
        .route("/logs", get(route_logs))
        .route("/admin/reset", post(route_admin_reset))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
