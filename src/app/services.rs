use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::db;
use crate::adapters::db::DbError;
use crate::domain::models::{NewReadingRecord, ReadingRecord, ReadingSummaryRecord};
use crate::domain::query::ReadingFilter;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database lock poisoned")]
    DbLockPoisoned,
    #[error("database operation failed: {0}")]
    Database(#[from] DbError),
}

pub trait ReadingQueryHandler {
    fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<ReadingRecord>, ServiceError>;
    fn count_readings(&self) -> Result<i64, ServiceError>;
    fn distinct_device_ids(&self) -> Result<Vec<String>, ServiceError>;
    fn newest_reading(&self) -> Result<Option<ReadingSummaryRecord>, ServiceError>;
    fn oldest_reading(&self) -> Result<Option<ReadingSummaryRecord>, ServiceError>;
}

pub trait ReadingCommandHandler {
    fn insert_reading(
        &self,
        new_reading: &NewReadingRecord,
        created_at: &str,
    ) -> Result<ReadingRecord, ServiceError>;
}

#[derive(Clone)]
pub struct SqliteReadingService {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteReadingService {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, ServiceError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        op(&connection).map_err(ServiceError::from)
    }
}

impl ReadingQueryHandler for SqliteReadingService {
    fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<ReadingRecord>, ServiceError> {
        self.with_connection(|connection| db::list_readings(connection, filter))
    }

    fn count_readings(&self) -> Result<i64, ServiceError> {
        self.with_connection(db::count_readings)
    }

    fn distinct_device_ids(&self) -> Result<Vec<String>, ServiceError> {
        self.with_connection(db::distinct_device_ids)
    }

    fn newest_reading(&self) -> Result<Option<ReadingSummaryRecord>, ServiceError> {
        self.with_connection(db::newest_reading)
    }

    fn oldest_reading(&self) -> Result<Option<ReadingSummaryRecord>, ServiceError> {
        self.with_connection(db::oldest_reading)
    }
}

impl ReadingCommandHandler for SqliteReadingService {
    fn insert_reading(
        &self,
        new_reading: &NewReadingRecord,
        created_at: &str,
    ) -> Result<ReadingRecord, ServiceError> {
        self.with_connection(|connection| db::insert_reading(connection, new_reading, created_at))
    }
}
