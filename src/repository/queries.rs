//! Read-side aggregate queries over the normalized store.
//!
//! Raw SQL with QueryableByName rows; these feed the `query` command and
//! stay out of the import path.

use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqliteConnection, DieselError};

/// A labeled count, used by the per-dimension breakdowns.
#[derive(QueryableByName, Debug, Clone)]
pub struct LabelCount {
    #[diesel(sql_type = Text)]
    pub label: String,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// A missile name with its stated range and country, if known.
#[derive(QueryableByName, Debug, Clone)]
pub struct RangeEntry {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Nullable<Integer>)]
    pub range_km: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub country: Option<String>,
}

/// Row totals across the store.
#[derive(QueryableByName, Debug, Clone)]
pub struct StoreTotals {
    #[diesel(sql_type = BigInt)]
    pub missiles: i64,
    #[diesel(sql_type = BigInt)]
    pub detailed: i64,
    #[diesel(sql_type = BigInt)]
    pub images: i64,
    #[diesel(sql_type = BigInt)]
    pub characteristics: i64,
}

pub async fn totals(conn: &mut AsyncSqliteConnection) -> Result<StoreTotals, DieselError> {
    diesel::sql_query(
        "SELECT \
             (SELECT COUNT(*) FROM missiles) AS missiles, \
             (SELECT COUNT(*) FROM missiles WHERE is_detailed = 1) AS detailed, \
             (SELECT COUNT(*) FROM missile_images) AS images, \
             (SELECT COUNT(*) FROM characteristics) AS characteristics",
    )
    .get_result(conn)
    .await
}

/// Missile counts per country, most populous first.
pub async fn missiles_by_country(
    conn: &mut AsyncSqliteConnection,
    limit: i64,
) -> Result<Vec<LabelCount>, DieselError> {
    diesel::sql_query(
        "SELECT c.name AS label, COUNT(*) AS count \
         FROM missiles m JOIN countries c ON c.id = m.country_id \
         GROUP BY c.name ORDER BY count DESC, c.name LIMIT ?",
    )
    .bind::<BigInt, _>(limit)
    .load(conn)
    .await
}

/// Missile counts per purpose, most populous first.
pub async fn missiles_by_purpose(
    conn: &mut AsyncSqliteConnection,
    limit: i64,
) -> Result<Vec<LabelCount>, DieselError> {
    diesel::sql_query(
        "SELECT p.name AS label, COUNT(*) AS count \
         FROM missiles m JOIN purposes p ON p.id = m.purpose_id \
         GROUP BY p.name ORDER BY count DESC, p.name LIMIT ?",
    )
    .bind::<BigInt, _>(limit)
    .load(conn)
    .await
}

/// Longest-range missiles with a stated range.
pub async fn longest_range(
    conn: &mut AsyncSqliteConnection,
    limit: i64,
) -> Result<Vec<RangeEntry>, DieselError> {
    diesel::sql_query(
        "SELECT m.name AS name, m.range_km AS range_km, c.name AS country \
         FROM missiles m LEFT JOIN countries c ON c.id = m.country_id \
         WHERE m.range_km IS NOT NULL \
         ORDER BY m.range_km DESC, m.name LIMIT ?",
    )
    .bind::<BigInt, _>(limit)
    .load(conn)
    .await
}

/// Missiles carrying the most image references.
pub async fn most_imaged(
    conn: &mut AsyncSqliteConnection,
    limit: i64,
) -> Result<Vec<LabelCount>, DieselError> {
    diesel::sql_query(
        "SELECT m.name AS label, COUNT(*) AS count \
         FROM missile_images i JOIN missiles m ON m.id = i.missile_id \
         GROUP BY m.id ORDER BY count DESC, m.name LIMIT ?",
    )
    .bind::<BigInt, _>(limit)
    .load(conn)
    .await
}

/// Missile counts bucketed by range class.
pub async fn range_classes(
    conn: &mut AsyncSqliteConnection,
) -> Result<Vec<LabelCount>, DieselError> {
    diesel::sql_query(
        "SELECT CASE \
             WHEN range_km < 300 THEN 'tactical (<300 km)' \
             WHEN range_km < 1000 THEN 'short (300-1000 km)' \
             WHEN range_km < 3500 THEN 'medium (1000-3500 km)' \
             WHEN range_km < 5500 THEN 'intermediate (3500-5500 km)' \
             ELSE 'intercontinental (5500+ km)' \
         END AS label, COUNT(*) AS count \
         FROM missiles WHERE range_km IS NOT NULL \
         GROUP BY label ORDER BY MIN(range_km)",
    )
    .load(conn)
    .await
}
