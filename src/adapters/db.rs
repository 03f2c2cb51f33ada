use rusqlite::{Connection, Row, params, params_from_iter, types::Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::{NewReadingRecord, ReadingRecord, ReadingSummaryRecord};
use crate::domain::query::{ReadingFilter, format_timestamp};

pub const LATEST_SCHEMA_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    r#"
CREATE TABLE IF NOT EXISTS sensor_readings (
    id TEXT PRIMARY KEY,
    device_id TEXT NOT NULL,
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    pressure REAL NOT NULL,
    rssi INTEGER,
    uptime INTEGER,
    heap_free INTEGER,
    last_error TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sensor_readings_created_at_desc
ON sensor_readings (created_at DESC);

CREATE INDEX IF NOT EXISTS idx_sensor_readings_device_created_at
ON sensor_readings (device_id, created_at DESC);
"#,
)];

const READING_COLUMNS: &str =
    "id, device_id, temperature, humidity, pressure, rssi, uptime, heap_free, last_error, created_at";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unsupported schema version {current}; latest supported is {latest}")]
    UnsupportedSchemaVersion { current: u32, latest: u32 },
}

pub fn open_connection(path: &str) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::from)
}

pub fn run_migrations(connection: &mut Connection) -> Result<(), DbError> {
    let current_version = schema_version(connection)?;

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            current: current_version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    let transaction = connection.transaction()?;

    for (version, sql) in MIGRATIONS {
        if *version > current_version {
            transaction.execute_batch(sql)?;
            transaction.pragma_update(None, "user_version", version)?;
        }
    }

    transaction.commit()?;

    Ok(())
}

pub fn schema_version(connection: &Connection) -> Result<u32, DbError> {
    let version = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Persists one reading. The store assigns the id; `created_at` is the
/// server timestamp decided by the caller at request time.
pub fn insert_reading(
    connection: &Connection,
    new_reading: &NewReadingRecord,
    created_at: &str,
) -> Result<ReadingRecord, DbError> {
    let id = Uuid::new_v4().to_string();

    connection.execute(
        "INSERT INTO sensor_readings (id, device_id, temperature, humidity, pressure, rssi, uptime, heap_free, last_error, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            new_reading.device_id,
            new_reading.temperature,
            new_reading.humidity,
            new_reading.pressure,
            new_reading.rssi,
            new_reading.uptime,
            new_reading.heap_free,
            new_reading.last_error,
            created_at,
        ],
    )?;

    Ok(ReadingRecord {
        id,
        device_id: new_reading.device_id.clone(),
        temperature: new_reading.temperature,
        humidity: new_reading.humidity,
        pressure: new_reading.pressure,
        rssi: new_reading.rssi,
        uptime: new_reading.uptime,
        heap_free: new_reading.heap_free,
        last_error: new_reading.last_error.clone(),
        created_at: created_at.to_string(),
    })
}

/// Filtered range scan, newest first, capped at the filter's limit.
pub fn list_readings(
    connection: &Connection,
    filter: &ReadingFilter,
) -> Result<Vec<ReadingRecord>, DbError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut bindings: Vec<Value> = Vec::new();

    if let Some(device_id) = &filter.device_id {
        clauses.push("device_id = ?");
        bindings.push(Value::Text(device_id.clone()));
    }
    if let Some(from) = filter.window.from {
        clauses.push("created_at >= ?");
        bindings.push(Value::Text(format_timestamp(from)));
    }
    if let Some(to) = filter.window.to {
        clauses.push("created_at <= ?");
        bindings.push(Value::Text(format_timestamp(to)));
    }
    if filter.validated {
        clauses.push(PLAUSIBILITY_CLAUSE);
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT {READING_COLUMNS} FROM sensor_readings{where_sql}
         ORDER BY created_at DESC, id DESC
         LIMIT ?"
    );
    bindings.push(Value::Integer(i64::from(filter.limit)));

    let mut statement = connection.prepare(&sql)?;
    let rows = statement.query_map(params_from_iter(bindings), map_reading_row)?;

    let mut readings = Vec::new();
    for row in rows {
        readings.push(row?);
    }

    Ok(readings)
}

// Same bounds as domain::query::is_plausible; keep in sync.
const PLAUSIBILITY_CLAUSE: &str = "temperature > -40.0 AND temperature < 85.0 \
     AND humidity >= 0.0 AND humidity <= 100.0 \
     AND pressure > 300.0 AND pressure < 1100.0";

pub fn count_readings(connection: &Connection) -> Result<i64, DbError> {
    let count = connection.query_row("SELECT COUNT(*) FROM sensor_readings", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

pub fn distinct_device_ids(connection: &Connection) -> Result<Vec<String>, DbError> {
    let mut statement =
        connection.prepare("SELECT DISTINCT device_id FROM sensor_readings ORDER BY device_id")?;
    let rows = statement.query_map([], |row| row.get(0))?;

    let mut device_ids = Vec::new();
    for row in rows {
        device_ids.push(row?);
    }

    Ok(device_ids)
}

pub fn newest_reading(connection: &Connection) -> Result<Option<ReadingSummaryRecord>, DbError> {
    reading_at_extreme(connection, "DESC")
}

pub fn oldest_reading(connection: &Connection) -> Result<Option<ReadingSummaryRecord>, DbError> {
    reading_at_extreme(connection, "ASC")
}

fn reading_at_extreme(
    connection: &Connection,
    direction: &str,
) -> Result<Option<ReadingSummaryRecord>, DbError> {
    let sql = format!(
        "SELECT id, device_id, temperature, humidity, pressure, created_at
         FROM sensor_readings
         ORDER BY created_at {direction}, id {direction}
         LIMIT 1"
    );
    let mut statement = connection.prepare(&sql)?;

    let mut rows = statement.query([])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(ReadingSummaryRecord {
            id: row.get(0)?,
            device_id: row.get(1)?,
            temperature: row.get(2)?,
            humidity: row.get(3)?,
            pressure: row.get(4)?,
            created_at: row.get(5)?,
        }));
    }

    Ok(None)
}

fn map_reading_row(row: &Row<'_>) -> rusqlite::Result<ReadingRecord> {
    Ok(ReadingRecord {
        id: row.get(0)?,
        device_id: row.get(1)?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        pressure: row.get(4)?,
        rssi: row.get(5)?,
        uptime: row.get(6)?,
        heap_free: row.get(7)?,
        last_error: row.get(8)?,
        created_at: row.get(9)?,
    })
}
