use crate::errors::AppError;
use crate::export;
use crate::history::{HistoryFilter, grand_total, query};
use crate::models::{
    CounterAction, CounterRequest, CurrentResponse, DateRequest, ExportQuery, FinishResponse,
    HistoryResponse, LocationRequest, RenameLocationRequest,
};
use crate::offline::{AssetRequest, CacheStatus, StoredResponse};
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
};
use chrono::{Local, Utc};
use tracing::info;
use uuid::Uuid;

pub async fn get_current(State(state): State<AppState>) -> Json<CurrentResponse> {
    let tally = state.tally.lock().await;
    Json(CurrentResponse::from(&tally.current))
}

pub async fn counter(
    State(state): State<AppState>,
    Json(payload): Json<CounterRequest>,
) -> Json<CurrentResponse> {
    let mut tally = state.tally.lock().await;
    match payload.action {
        CounterAction::Increment => tally.current.increment(payload.counter),
        CounterAction::Decrement => tally.current.decrement(payload.counter),
        CounterAction::Reset => tally.current.reset_counter(payload.counter),
    }
    tally.save_current(&state.store).await;
    Json(CurrentResponse::from(&tally.current))
}

pub async fn set_date(
    State(state): State<AppState>,
    Json(payload): Json<DateRequest>,
) -> Json<CurrentResponse> {
    let mut tally = state.tally.lock().await;
    if tally.current.set_date(payload.date) {
        tally.save_current(&state.store).await;
    }
    Json(CurrentResponse::from(&tally.current))
}

pub async fn set_location(
    State(state): State<AppState>,
    Json(payload): Json<LocationRequest>,
) -> Json<CurrentResponse> {
    let mut tally = state.tally.lock().await;
    if tally.current.set_location(payload.location) {
        tally.save_current(&state.store).await;
    }
    Json(CurrentResponse::from(&tally.current))
}

pub async fn finish(State(state): State<AppState>) -> Json<FinishResponse> {
    let mut tally = state.tally.lock().await;
    let tally = &mut *tally;
    let session = tally.current.finish(&mut tally.ledger, Utc::now());

    if let Some(session) = &session {
        info!(
            "finished {} at {} on {} (total {})",
            session.session_id, session.location, session.date, session.total
        );
        tally.save_ledger(&state.store).await;
        tally.save_current(&state.store).await;
    }

    Json(FinishResponse {
        session,
        current: CurrentResponse::from(&tally.current),
    })
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> Json<HistoryResponse> {
    let tally = state.tally.lock().await;
    let sessions = query(&tally.ledger, &filter);
    Json(HistoryResponse {
        grand_total: grand_total(&sessions),
        sessions,
        years: tally.ledger.years(),
        locations: tally.ledger.locations(),
    })
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tally = state.tally.lock().await;
    let removed = tally
        .ledger
        .remove(session_id)
        .ok_or_else(|| AppError::not_found(format!("no session {session_id}")))?;
    info!("deleted session {} ({})", removed.session_id, removed.date);
    tally.save_ledger(&state.store).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_sessions(State(state): State<AppState>) -> StatusCode {
    let mut tally = state.tally.lock().await;
    tally.ledger.clear();
    info!("cleared session history");
    tally.save_ledger(&state.store).await;
    StatusCode::NO_CONTENT
}

pub async fn get_locations(State(state): State<AppState>) -> Json<Vec<String>> {
    let tally = state.tally.lock().await;
    Json(tally.locations.labels().to_vec())
}

pub async fn rename_location(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    Json(payload): Json<RenameLocationRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    let mut tally = state.tally.lock().await;
    if !tally.locations.rename(slot, &payload.label) {
        return Err(AppError::bad_request(format!(
            "slot must be below {}",
            crate::locations::SLOT_COUNT
        )));
    }
    tally.save_locations(&state.store).await;
    Ok(Json(tally.locations.labels().to_vec()))
}

pub async fn export_sessions(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> impl IntoResponse {
    let tally = state.tally.lock().await;
    let today = Local::now().date_naive();
    let sessions = export::select(&tally.ledger, params.scope, &params.filter, today);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        export::render(params.scope, &sessions),
    )
}

pub async fn asset_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.assets.status().await)
}

/// Everything outside the API goes through the asset cache.
pub async fn assets(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StoredResponse {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let request = AssetRequest {
        method,
        path,
        headers,
        body,
    };
    state.assets.handle(request).await
}
