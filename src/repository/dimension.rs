//! Lookup-table resolution for the five missile dimensions.
//!
//! Each dimension is a tiny `(id, name)` table with a unique name. Resolution
//! is get-or-create on the exact name, so repeated imports converge on one
//! row per distinct value.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqliteConnection, DieselError};
use crate::schema::{base_types, countries, guidance_systems, purposes, warhead_types};

/// Which lookup table a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    Country,
    Purpose,
    BaseType,
    WarheadType,
    GuidanceSystem,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Country => "country",
            DimensionKind::Purpose => "purpose",
            DimensionKind::BaseType => "base_type",
            DimensionKind::WarheadType => "warhead_type",
            DimensionKind::GuidanceSystem => "guidance_system",
        }
    }
}

/// A resolved dimension row, with whether this call created it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub id: i32,
    pub created: bool,
}

macro_rules! resolve_in_table {
    ($conn:expr, $table:ident, $name:expr) => {{
        let existing: Option<i32> = $table::table
            .filter($table::name.eq($name))
            .select($table::id)
            .first($conn)
            .await
            .optional()?;

        match existing {
            Some(id) => Ok(Resolved { id, created: false }),
            None => {
                diesel::insert_into($table::table)
                    .values($table::name.eq($name))
                    .execute($conn)
                    .await?;
                let id = $table::table
                    .filter($table::name.eq($name))
                    .select($table::id)
                    .first($conn)
                    .await?;
                Ok(Resolved { id, created: true })
            }
        }
    }};
}

/// Resolve a dimension value to its row id, creating the row on first sight.
///
/// Matching is exact and case-sensitive; callers trim whitespace before
/// resolution so `"Россия"` and `"Россия "` share one row, while casing
/// variants stay distinct.
pub async fn resolve(
    conn: &mut AsyncSqliteConnection,
    kind: DimensionKind,
    name: &str,
) -> Result<Resolved, DieselError> {
    match kind {
        DimensionKind::Country => resolve_in_table!(conn, countries, name),
        DimensionKind::Purpose => resolve_in_table!(conn, purposes, name),
        DimensionKind::BaseType => resolve_in_table!(conn, base_types, name),
        DimensionKind::WarheadType => resolve_in_table!(conn, warhead_types, name),
        DimensionKind::GuidanceSystem => resolve_in_table!(conn, guidance_systems, name),
    }
}

/// Resolve an optional dimension value, skipping empty strings.
pub async fn resolve_opt(
    conn: &mut AsyncSqliteConnection,
    kind: DimensionKind,
    name: Option<&str>,
) -> Result<Option<Resolved>, DieselError> {
    match name.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => resolve(conn, kind, trimmed).await.map(Some),
        _ => Ok(None),
    }
}
