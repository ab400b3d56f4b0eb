//! HTTP request handlers.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use tracing::{debug, info};

use super::dto::{
    CreateDriverRequest, DriverListResponse, FuelEntryRequest, HealthResponse, ImportRequest,
    ImportResponse, RepairEntryRequest, StatisticsQuery, StatisticsResponse, UpdateDriverRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::DriverId;
use crate::auth::Session;
use crate::models::{CalendarDate, Driver, FuelRecord, PartitionMonth, RepairRecord};
use crate::services::drivers::{self, DriverUpdate};
use crate::services::import_processor::process_import_async;
use crate::services::job_tracker::{Job, JobStatus};
use crate::services::statistics;

/// Result alias for JSON handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn effective_today(state: &AppState) -> CalendarDate {
    state.statistics.today.unwrap_or_else(CalendarDate::today)
}

// ==================== Health ====================

/// GET /health
///
/// Reports process liveness and storage reachability.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected",
        Ok(false) => "unhealthy",
        Err(_) => "unreachable",
    };
    Ok(Json(HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}

// ==================== Sessions ====================

/// GET /v1/me
///
/// Returns the caller's session, letting clients restore their signed-in
/// state from a stored token.
pub async fn get_session(session: Session) -> HandlerResult<Session> {
    Ok(Json(session))
}

// ==================== Statistics ====================

/// GET /v1/vehicles/{vehicle_number}/statistics
///
/// Period statistics for one vehicle. Admins may query any vehicle; drivers
/// only their own. The period comes from `start`/`end` ISO dates or a
/// `preset` query parameter.
pub async fn get_vehicle_statistics(
    State(state): State<AppState>,
    session: Session,
    Path(vehicle_number): Path<String>,
    Query(query): Query<StatisticsQuery>,
) -> HandlerResult<StatisticsResponse> {
    session.authorize_vehicle(&vehicle_number)?;
    compute_statistics_response(&state, vehicle_number, &query).await
}

/// GET /v1/me/statistics
///
/// Period statistics for the calling driver's own vehicle.
pub async fn get_my_statistics(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatisticsQuery>,
) -> HandlerResult<StatisticsResponse> {
    let vehicle_number = session.own_vehicle()?.to_string();
    compute_statistics_response(&state, vehicle_number, &query).await
}

async fn compute_statistics_response(
    state: &AppState,
    vehicle_number: String,
    query: &StatisticsQuery,
) -> HandlerResult<StatisticsResponse> {
    let today = effective_today(state);
    let range = query.resolve(today)?;
    debug!("statistics request: vehicle {} over {}", vehicle_number, range);

    let statistics = statistics::compute_statistics_with_options(
        state.repository.as_ref(),
        &vehicle_number,
        range.start,
        range.end,
        &state.statistics,
    )
    .await?;

    Ok(Json(StatisticsResponse {
        vehicle_number,
        start: range.start.to_string(),
        end: range.end.to_string(),
        statistics,
    }))
}

// ==================== Expense entry ====================

/// POST /v1/me/fuel
///
/// Records a fuel purchase against the calling driver's vehicle.
pub async fn submit_fuel_record(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<FuelEntryRequest>,
) -> Result<(StatusCode, Json<FuelRecord>), AppError> {
    let vehicle_number = session.own_vehicle()?.to_string();
    let date = parse_expense_date(&request.date, effective_today(&state))?;

    let total_fuel_cost = request
        .total_fuel_cost
        .unwrap_or(request.fuel_amount * request.fuel_price);
    let record = FuelRecord {
        vehicle_number,
        year: date.year_field(),
        month: date.month_field(),
        day: date.day_field(),
        fuel_amount: request.fuel_amount,
        fuel_price: request.fuel_price,
        total_fuel_cost,
    };
    state.repository.insert_fuel_record(&record).await?;
    info!(
        "fuel record stored for vehicle {} on {}",
        record.vehicle_number, date
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/me/repairs
///
/// Records a repair expense against the calling driver's vehicle.
pub async fn submit_repair_record(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RepairEntryRequest>,
) -> Result<(StatusCode, Json<RepairRecord>), AppError> {
    let vehicle_number = session.own_vehicle()?.to_string();
    let date = parse_expense_date(&request.date, effective_today(&state))?;

    let record = RepairRecord {
        vehicle_number,
        year: date.year_field(),
        month: date.month_field(),
        day: date.day_field(),
        repair_cost: request.repair_cost,
    };
    state.repository.insert_repair_record(&record).await?;
    info!(
        "repair record stored for vehicle {} on {}",
        record.vehicle_number, date
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Expenses may be back-dated (late entry is normal) but never future-dated.
fn parse_expense_date(value: &str, today: CalendarDate) -> Result<CalendarDate, AppError> {
    let date =
        CalendarDate::parse_iso(value).map_err(|err| AppError::InvalidInput(err.to_string()))?;
    if date > today {
        return Err(AppError::InvalidInput(format!(
            "expense date {} is in the future",
            date
        )));
    }
    Ok(date)
}

// ==================== Driver registry ====================

/// GET /v1/drivers
pub async fn list_drivers(
    State(state): State<AppState>,
    session: Session,
) -> HandlerResult<DriverListResponse> {
    session.require_admin()?;
    let drivers = state.repository.list_drivers().await?;
    let total = drivers.len();
    Ok(Json(DriverListResponse { drivers, total }))
}

/// POST /v1/drivers
pub async fn create_driver(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    session.require_admin()?;
    let driver = drivers::register_driver(
        state.repository.as_ref(),
        &request.name,
        &request.vehicle_number,
        request.phone.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

/// GET /v1/drivers/{driver_id}
pub async fn get_driver(
    State(state): State<AppState>,
    session: Session,
    Path(driver_id): Path<String>,
) -> HandlerResult<Driver> {
    session.require_admin()?;
    let driver = state
        .repository
        .get_driver(&DriverId::new(driver_id))
        .await?;
    Ok(Json(driver))
}

/// PUT /v1/drivers/{driver_id}
pub async fn update_driver(
    State(state): State<AppState>,
    session: Session,
    Path(driver_id): Path<String>,
    Json(request): Json<UpdateDriverRequest>,
) -> HandlerResult<Driver> {
    session.require_admin()?;
    let driver = drivers::update_driver_details(
        state.repository.as_ref(),
        &DriverId::new(driver_id),
        DriverUpdate {
            name: request.name,
            vehicle_number: request.vehicle_number,
            phone: request.phone,
            active: request.active,
        },
    )
    .await?;
    Ok(Json(driver))
}

/// DELETE /v1/drivers/{driver_id}
pub async fn delete_driver(
    State(state): State<AppState>,
    session: Session,
    Path(driver_id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    drivers::remove_driver(state.repository.as_ref(), &DriverId::new(driver_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Imports and jobs ====================

/// POST /v1/imports
///
/// Accepts a transport log and starts a background import job. Responds
/// 202 immediately; progress streams from the job endpoints.
pub async fn start_import(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    session.require_admin()?;
    if request.content.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "transport log content is empty".to_string(),
        ));
    }

    let job_id = state.job_tracker.create_job();
    let entry_month = PartitionMonth::of(effective_today(&state));
    info!(
        "import job {} accepted ({} bytes, partition {})",
        job_id,
        request.content.len(),
        entry_month
    );

    tokio::spawn(process_import_async(
        state.job_tracker.clone(),
        state.repository.clone(),
        job_id.clone(),
        request.content,
        entry_month,
    ));

    let message = format!("Import started. Track progress at /v1/jobs/{}/logs", job_id);
    Ok((StatusCode::ACCEPTED, Json(ImportResponse { job_id, message })))
}

/// GET /v1/jobs/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    session: Session,
    Path(job_id): Path<String>,
) -> HandlerResult<Job> {
    session.require_admin()?;
    state
        .job_tracker
        .get_job(&job_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("job {} does not exist", job_id)))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Streams a job's log lines as server-sent events. Each new log entry is a
/// `log` event; a final `done` event carries the finished job.
pub async fn stream_job_logs(
    State(state): State<AppState>,
    session: Session,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    session.require_admin()?;
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("job {} does not exist", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut sent = 0;
        loop {
            let Some(job) = tracker.get_job(&job_id) else {
                break;
            };
            for entry in &job.logs[sent..] {
                let data = serde_json::to_string(entry).unwrap_or_default();
                yield Ok(Event::default().event("log").data(data));
            }
            sent = job.logs.len();

            if matches!(job.status, JobStatus::Completed | JobStatus::Failed) {
                let data = serde_json::to_string(&job).unwrap_or_default();
                yield Ok(Event::default().event("done").data(data));
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1))))
}
