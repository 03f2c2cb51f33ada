use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::app::services::{
    ReadingCommandHandler, ReadingQueryHandler, ServiceError, SqliteReadingService,
};
use crate::domain::models::{NewReadingRecord, ReadingRecord, ReadingSummaryRecord, SensorSample};
use crate::domain::query::{
    ReadingFilter, TimeWindow, format_timestamp, is_truthy_flag, resolve_window,
};
use crate::domain::resample::{ChartPoint, DisplayWindow, resample_for_display};
use crate::domain::stats::{MetricStats, ReadingStats, compute_stats};

const DEFAULT_LIMIT: u32 = 200;
const MAX_LIMIT: u32 = 2000;

#[derive(Clone)]
pub struct ApiState {
    pub readings: SqliteReadingService,
}

/// Ingestion payload as sent by the devices. Required fields stay
/// `Option` so a missing value produces a structured 400 instead of a
/// deserializer error; the camelCase aliases match older firmware.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub device_id: Option<String>,
    pub rssi: Option<i32>,
    /// Milliseconds since boot. Stored as received, negative values
    /// included; like the other telemetry fields, plausibility is a
    /// read-time concern.
    pub uptime: Option<i64>,
    #[serde(alias = "heapFree")]
    pub heap_free: Option<i64>,
    #[serde(alias = "lastError")]
    pub last_error: Option<String>,
}

/// External shape of one reading. Field naming is part of the wire
/// contract consumed by the dashboard: snake_case `device_id`, camelCase
/// `heapFree`/`lastError`, `created_at` exposed as `timestamp`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReadingResponse {
    pub id: String,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rssi: Option<i32>,
    pub uptime: Option<i64>,
    #[serde(rename = "heapFree")]
    pub heap_free: Option<i64>,
    #[serde(rename = "lastError")]
    pub last_error: Option<String>,
    pub timestamp: String,
}

impl From<ReadingRecord> for ReadingResponse {
    fn from(record: ReadingRecord) -> Self {
        Self {
            id: record.id,
            device_id: record.device_id,
            temperature: record.temperature,
            humidity: record.humidity,
            pressure: record.pressure,
            rssi: record.rssi,
            uptime: record.uptime,
            heap_free: record.heap_free,
            last_error: record.last_error,
            timestamp: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
    pub data: ReadingResponse,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub device_id: Option<String>,
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub validated: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryReadingResponse {
    pub id: String,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub timestamp: String,
}

impl From<ReadingSummaryRecord> for SummaryReadingResponse {
    fn from(record: ReadingSummaryRecord) -> Self {
        Self {
            id: record.id,
            device_id: record.device_id,
            temperature: record.temperature,
            humidity: record.humidity,
            pressure: record.pressure,
            timestamp: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_records: i64,
    pub devices: Vec<String>,
    pub latest_data: Option<SummaryReadingResponse>,
    pub oldest_data: Option<SummaryReadingResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub window: Option<String>,
    pub device_id: Option<String>,
}

/// One chart tick; the metric fields are null at gaps so the dashboard
/// can break the line instead of interpolating.
#[derive(Debug, Serialize)]
pub struct ChartPointResponse {
    pub timestamp: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl From<ChartPoint> for ChartPointResponse {
    fn from(point: ChartPoint) -> Self {
        Self {
            timestamp: format_timestamp(point.timestamp),
            temperature: point.sample.map(|sample| sample.temperature),
            humidity: point.sample.map(|sample| sample.humidity),
            pressure: point.sample.map(|sample| sample.pressure),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricStatsResponse {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl From<MetricStats> for MetricStatsResponse {
    fn from(stats: MetricStats) -> Self {
        Self {
            avg: stats.avg,
            min: stats.min,
            max: stats.max,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub temperature: MetricStatsResponse,
    pub humidity: MetricStatsResponse,
    pub pressure: MetricStatsResponse,
}

impl From<ReadingStats> for StatsResponse {
    fn from(stats: ReadingStats) -> Self {
        Self {
            temperature: stats.temperature.into(),
            humidity: stats.humidity.into(),
            pressure: stats.pressure.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub points: Vec<ChartPointResponse>,
    pub stats: Option<StatsResponse>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(ingest_reading_endpoint)
        .service(list_readings_endpoint)
        .service(summary_endpoint)
        .service(chart_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[post("/api/sensor-data")]
async fn ingest_reading_endpoint(
    state: web::Data<ApiState>,
    body: web::Json<IngestBody>,
) -> impl Responder {
    let body = body.into_inner();

    let (Some(temperature), Some(humidity), Some(pressure), Some(device_id)) = (
        body.temperature,
        body.humidity,
        body.pressure,
        body.device_id.filter(|value| !value.is_empty()),
    ) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "missing required fields: temperature, humidity, pressure, device_id"
        }));
    };

    let new_reading = NewReadingRecord {
        device_id,
        temperature,
        humidity,
        pressure,
        rssi: body.rssi,
        uptime: body.uptime,
        heap_free: body.heap_free,
        last_error: body.last_error,
    };
    let created_at = format_timestamp(Utc::now());

    match state.readings.insert_reading(&new_reading, &created_at) {
        Ok(record) => {
            tracing::info!(
                reading_id = %record.id,
                device_id = %record.device_id,
                temperature = record.temperature,
                "sensor reading stored"
            );
            HttpResponse::Ok().json(IngestResponse {
                message: "sensor reading stored",
                data: record.into(),
            })
        }
        Err(error) => service_error_response(error),
    }
}

#[get("/api/sensor-data")]
async fn list_readings_endpoint(
    state: web::Data<ApiState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let window = match resolve_window(
        query.from.as_deref(),
        query.to.as_deref(),
        query.range.as_deref(),
        Utc::now(),
    ) {
        Ok(window) => window,
        Err(error) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": error.to_string() }));
        }
    };

    let filter = ReadingFilter {
        device_id: query.device_id.clone(),
        window,
        validated: query.validated.as_deref().is_some_and(is_truthy_flag),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    };

    match state.readings.list_readings(&filter) {
        Ok(readings) => {
            let mapped: Vec<ReadingResponse> =
                readings.into_iter().map(ReadingResponse::from).collect();
            HttpResponse::Ok().json(mapped)
        }
        Err(error) => service_error_response(error),
    }
}

#[get("/api/sensor-data/summary")]
async fn summary_endpoint(state: web::Data<ApiState>) -> impl Responder {
    // Independent reads; a write landing between them is acceptable, the
    // summary is advisory.
    let total_records = match state.readings.count_readings() {
        Ok(value) => value,
        Err(error) => return service_error_response(error),
    };
    let devices = match state.readings.distinct_device_ids() {
        Ok(value) => value,
        Err(error) => return service_error_response(error),
    };
    let latest_data = match state.readings.newest_reading() {
        Ok(value) => value,
        Err(error) => return service_error_response(error),
    };
    let oldest_data = match state.readings.oldest_reading() {
        Ok(value) => value,
        Err(error) => return service_error_response(error),
    };

    HttpResponse::Ok().json(SummaryResponse {
        total_records,
        devices,
        latest_data: latest_data.map(SummaryReadingResponse::from),
        oldest_data: oldest_data.map(SummaryReadingResponse::from),
    })
}

#[get("/api/sensor-data/chart")]
async fn chart_endpoint(
    state: web::Data<ApiState>,
    query: web::Query<ChartQuery>,
) -> impl Responder {
    let Some(window_raw) = query.window.as_deref() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "missing required parameter: window"
        }));
    };
    let window: DisplayWindow = match window_raw.parse() {
        Ok(window) => window,
        Err(error) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": error.to_string() }));
        }
    };

    let now = Utc::now();
    let filter = ReadingFilter {
        device_id: query.device_id.clone(),
        window: TimeWindow {
            from: Some(now - Duration::minutes(window.duration_minutes())),
            to: None,
        },
        validated: true,
        limit: MAX_LIMIT,
    };

    let readings = match state.readings.list_readings(&filter) {
        Ok(readings) => readings,
        Err(error) => return service_error_response(error),
    };

    // Store order is newest-first; the chart pipeline wants chronological.
    let samples: Vec<SensorSample> = readings
        .iter()
        .rev()
        .filter_map(|record| {
            let taken_at = DateTime::parse_from_rfc3339(&record.created_at)
                .ok()?
                .with_timezone(&Utc);
            Some(SensorSample {
                taken_at,
                temperature: record.temperature,
                humidity: record.humidity,
                pressure: record.pressure,
            })
        })
        .collect();

    let points = resample_for_display(&samples, window, now);
    let stats = compute_stats(&samples);

    HttpResponse::Ok().json(ChartResponse {
        points: points.into_iter().map(ChartPointResponse::from).collect(),
        stats: stats.map(StatsResponse::from),
    })
}

fn service_error_response(error: ServiceError) -> HttpResponse {
    tracing::error!(error = %error, "store operation failed");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "internal server error"
    }))
}
