pub mod app_config;
pub mod booking_repo;
pub mod database;

pub use booking_repo::PostgresLedger;
pub use database::DbClient;
