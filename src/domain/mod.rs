pub mod models;
pub mod query;
pub mod resample;
pub mod stats;
