use chrono::{DateTime, Utc};

/// One persisted sensor reading. `id` and `created_at` are assigned by the
/// store at insert time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRecord {
    pub id: String,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rssi: Option<i32>,
    pub uptime: Option<i64>,
    pub heap_free: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: String,
}

/// Reading fields as supplied by the device, before the store assigns id
/// and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReadingRecord {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rssi: Option<i32>,
    pub uptime: Option<i64>,
    pub heap_free: Option<i64>,
    pub last_error: Option<String>,
}

/// Compact projection used by the summary endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSummaryRecord {
    pub id: String,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub created_at: String,
}

/// A parsed reading sample as consumed by the chart pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub taken_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}
