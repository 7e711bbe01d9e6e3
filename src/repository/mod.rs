//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking,
//! through diesel-async's SyncConnectionWrapper over SQLite.

pub mod dimension;
pub mod migrations;
pub mod missile;
pub mod pool;
pub mod queries;
pub mod records;
pub mod session;
pub mod util;

pub use dimension::DimensionKind;
pub use pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};
pub use records::{
    ImportSessionRecord, MissileRecord, NewCharacteristic, NewImportSession, NewMissile,
    NewMissileDetailedData, NewMissileImage, NewStructuredContent, NewStructuredContentLink,
};
