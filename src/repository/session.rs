//! Import session bookkeeping.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqliteConnection, DieselError};
use super::records::{ImportSessionRecord, NewImportSession};
use crate::schema::import_sessions;

/// Append a finished session row. Sessions are a log, never updated.
pub async fn append(
    conn: &mut AsyncSqliteConnection,
    session: &NewImportSession<'_>,
) -> Result<(), DieselError> {
    diesel::insert_into(import_sessions::table)
        .values(session)
        .execute(conn)
        .await?;
    Ok(())
}

/// Most recent session, if any.
pub async fn latest(
    conn: &mut AsyncSqliteConnection,
) -> Result<Option<ImportSessionRecord>, DieselError> {
    import_sessions::table
        .order(import_sessions::id.desc())
        .first::<ImportSessionRecord>(conn)
        .await
        .optional()
}
