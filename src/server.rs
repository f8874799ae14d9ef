use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use uuid::Uuid;

use crate::api::{
    ApiGenerateRequest, ApiGenerateResponse, ApiNewItem, ApiPerformanceResponse,
    ApiRemoveResponse, ApiSessionResponse, ApiSetTierRequest, ApiUpdateResponse,
};
use caption_forge::generator::{MAX_HASHTAGS, MIN_HASHTAGS};
use caption_forge::{
    aggregate, local_today, score_batch, week_view, AppConfig, CaptionGenerator, ForgeError,
    PlannerItem, Session, Tier, WeekView,
};

#[derive(Clone)]
struct AppState {
    generator: Option<CaptionGenerator>,
    session: Arc<Mutex<Session>>,
    config: AppConfig,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

#[derive(serde::Deserialize)]
struct WeekQuery {
    anchor: Option<String>,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs) -> Result<(), String> {
    let (config, config_path) = AppConfig::load(None).map_err(|err| err.to_string())?;
    if let Some(path) = config_path.as_ref().filter(|path| path.exists()) {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let tier =
        Tier::from_str(&args.tier).ok_or_else(|| format!("invalid tier: {}", args.tier))?;

    let generator = CaptionGenerator::from_env(&config.generator, None);
    match generator.as_ref() {
        Some(generator) => tracing::info!(model = %generator.model(), "caption generation enabled"),
        None => tracing::warn!("OPENAI_API_KEY is not set; caption generation is disabled"),
    }

    let state = AppState {
        generator,
        session: Arc::new(Mutex::new(Session::new(
            tier,
            config.quota.clone(),
            local_today(),
        ))),
        config,
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/session", get(session_info))
        .route("/api/session/tier", post(set_tier))
        .route("/api/generate", post(generate_handler))
        .route("/api/generate/stream", get(stream_handler))
        .route("/api/planner/week", get(week_handler))
        .route("/api/planner/items", post(add_item))
        .route("/api/planner/items/:id", get(get_item).delete(remove_item))
        .route("/api/planner/items/:id/done", post(mark_item_done))
        .route("/api/performance", get(performance_handler))
        .nest_service("/", static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    tracing::info!(%addr, "caption planner listening");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn session_info(State(state): State<AppState>) -> Json<ApiSessionResponse> {
    let mut session = state.session.lock().await;
    let today = local_today();
    let quota = session.quota_status(today);
    Json(ApiSessionResponse::new(session.tier(), today, quota))
}

async fn set_tier(
    State(state): State<AppState>,
    Json(request): Json<ApiSetTierRequest>,
) -> Result<Json<ApiSessionResponse>, (StatusCode, String)> {
    let tier = Tier::from_str(&request.tier)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid tier: {}", request.tier)))?;

    let mut session = state.session.lock().await;
    session.set_tier(tier);
    let today = local_today();
    let quota = session.quota_status(today);
    Ok(Json(ApiSessionResponse::new(session.tier(), today, quota)))
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiGenerateRequest>,
) -> Result<Json<ApiGenerateResponse>, (StatusCode, String)> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let generation = request
        .into_request()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let sender = get_or_create_channel(&state, &request_id).await;

    let mut session = state.session.lock().await;
    let today = local_today();

    send_event(&sender, "start", "Preparing generation");

    if let Err(err) = session.ensure_quota(today) {
        send_event(&sender, "error", "Daily quota reached");
        schedule_cleanup(state.channels.clone(), request_id.clone());
        return Err(reject(err));
    }

    let generator = match state.generator.as_ref() {
        Some(generator) => generator,
        None => {
            send_event(&sender, "error", "Caption model not configured");
            schedule_cleanup(state.channels.clone(), request_id.clone());
            return Err(reject(ForgeError::MissingApiKey));
        }
    };

    send_event(&sender, "calling", "Calling the caption model");
    let candidates = match generator.generate(&generation).await {
        Ok(candidates) => {
            send_event(&sender, "received", "Received model response");
            candidates
        }
        Err(err) => {
            tracing::warn!(error = %err, "caption generation failed");
            send_event(&sender, "error", "Caption generation failed");
            schedule_cleanup(state.channels.clone(), request_id.clone());
            return Err(reject(err));
        }
    };

    send_event(&sender, "scoring", "Scoring variations");
    let batch = score_batch(candidates, &state.config.scoring);
    session.record_generation(today);
    let quota = session.quota_status(today);
    let tier = session.tier();
    drop(session);

    let mut warnings = Vec::new();
    for (index, variation) in batch.variations.iter().enumerate() {
        let count = variation.candidate.hashtags.len();
        if !(MIN_HASHTAGS..=MAX_HASHTAGS).contains(&count) {
            warnings.push(format!(
                "variation {} returned {} hashtags",
                index + 1,
                count
            ));
        }
    }

    send_event(&sender, "done", "Generation complete");
    schedule_cleanup(state.channels.clone(), request_id.clone());

    let response = ApiGenerateResponse::from_batch(batch, tier, quota, warnings, request_id);
    Ok(Json(response))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming generation status");
    schedule_cleanup(state.channels.clone(), query.request_id);
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn week_handler(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekView>, (StatusCode, String)> {
    let anchor = match query.anchor.as_deref() {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("invalid anchor date (expected YYYY-MM-DD): {}", value),
            )
        })?,
        None => local_today(),
    };

    let session = state.session.lock().await;
    Ok(Json(week_view(&session.planner, anchor)))
}

async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<ApiNewItem>,
) -> Result<Json<PlannerItem>, (StatusCode, String)> {
    let new_item = request
        .into_new_item()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let mut session = state.session.lock().await;
    let item = session.planner.add(new_item);
    Ok(Json(item))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlannerItem>, (StatusCode, String)> {
    let session = state.session.lock().await;
    match session.planner.get(id) {
        Some(item) => Ok(Json(item.clone())),
        None => Err((StatusCode::NOT_FOUND, "item not found".to_string())),
    }
}

async fn mark_item_done(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<ApiUpdateResponse> {
    let mut session = state.session.lock().await;
    let updated = session.planner.mark_done(id);
    Json(ApiUpdateResponse { updated })
}

async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<ApiRemoveResponse> {
    let mut session = state.session.lock().await;
    let removed = session.planner.remove(id);
    Json(ApiRemoveResponse { removed })
}

async fn performance_handler(State(state): State<AppState>) -> Json<ApiPerformanceResponse> {
    let session = state.session.lock().await;
    let report = aggregate(session.planner.done_items());
    Json(ApiPerformanceResponse::from_report(report, session.tier()))
}

fn reject(err: ForgeError) -> (StatusCode, String) {
    let status = match err {
        ForgeError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        ForgeError::Upstream { .. } | ForgeError::UpstreamParse { .. } => StatusCode::BAD_GATEWAY,
        ForgeError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        ForgeError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ForgeError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn get_or_create_channel(
    state: &AppState,
    request_id: &str,
) -> broadcast::Sender<StreamEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
    request_id: String,
) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let config = AppConfig::default();
        AppState {
            generator: None,
            session: Arc::new(Mutex::new(Session::new(
                Tier::Starter,
                config.quota.clone(),
                local_today(),
            ))),
            config,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stream_without_generate_releases_its_channel() {
        let state = test_state();
        let query = StreamQuery {
            request_id: "req-orphan".to_string(),
        };

        let _stream = stream_handler(State(state.clone()), Query(query)).await;
        assert!(state.channels.lock().await.contains_key("req-orphan"));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(state.channels.lock().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_request_ids_share_one_channel() {
        let state = test_state();

        let first = get_or_create_channel(&state, "req-1").await;
        let second = get_or_create_channel(&state, "req-1").await;

        assert!(first.same_channel(&second));
        assert_eq!(state.channels.lock().await.len(), 1);
    }
}
