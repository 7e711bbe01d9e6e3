//! Diesel ORM records for database tables.
//!
//! Queryable records mirror table rows; the `New*` structs borrow their
//! fields and exist only for insertion. Timestamps are stored as RFC 3339
//! text.

use diesel::prelude::*;

use crate::schema;

/// Missile row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::missiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MissileRecord {
    pub id: i32,
    pub name: String,
    pub detail_page_url: String,
    pub index_page_url: String,
    pub page_number: i32,
    pub range_km: Option<i32>,
    pub year_developed: Option<i32>,
    pub description: Option<String>,
    pub country_id: Option<i32>,
    pub purpose_id: Option<i32>,
    pub base_type_id: Option<i32>,
    pub warhead_type_id: Option<i32>,
    pub guidance_system_id: Option<i32>,
    pub is_detailed: bool,
    pub scraped_at: String,
}

/// New missile for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::missiles)]
pub struct NewMissile<'a> {
    pub name: &'a str,
    pub detail_page_url: &'a str,
    pub index_page_url: &'a str,
    pub page_number: i32,
    pub range_km: Option<i32>,
    pub year_developed: Option<i32>,
    pub description: Option<&'a str>,
    pub country_id: Option<i32>,
    pub purpose_id: Option<i32>,
    pub base_type_id: Option<i32>,
    pub warhead_type_id: Option<i32>,
    pub guidance_system_id: Option<i32>,
    pub is_detailed: bool,
    pub scraped_at: &'a str,
}

/// New detailed-data row for insertion. One per missile.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::missile_detailed_data)]
pub struct NewMissileDetailedData<'a> {
    pub missile_id: i32,
    pub detailed_filename: Option<&'a str>,
    pub range_detailed: Option<&'a str>,
    pub speed: Option<&'a str>,
    pub weight: Option<&'a str>,
    pub length: Option<&'a str>,
    pub diameter: Option<&'a str>,
    pub accuracy: Option<&'a str>,
    pub flight_altitude: Option<&'a str>,
    pub other_characteristics: Option<&'a str>,
    pub scraped_at: &'a str,
}

/// New structured content field for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::structured_content)]
pub struct NewStructuredContent<'a> {
    pub missile_id: i32,
    pub field_name: &'a str,
    pub field_label: Option<&'a str>,
    pub field_text: Option<&'a str>,
}

/// New link attached to a structured content field.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::structured_content_links)]
pub struct NewStructuredContentLink<'a> {
    pub structured_content_id: i32,
    pub link_url: &'a str,
    pub link_text: Option<&'a str>,
}

/// New characteristics table row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::characteristics)]
pub struct NewCharacteristic<'a> {
    pub missile_id: i32,
    pub field_name: &'a str,
    pub field_value: &'a str,
}

/// New image reference for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::missile_images)]
pub struct NewMissileImage<'a> {
    pub missile_id: i32,
    pub image_url: &'a str,
    pub image_type: Option<&'a str>,
}

/// Import session row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::import_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ImportSessionRecord {
    pub id: i32,
    pub session_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub total_missiles: Option<i32>,
    pub total_detailed: Option<i32>,
    pub status: String,
}

/// New import session for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::import_sessions)]
pub struct NewImportSession<'a> {
    pub session_name: &'a str,
    pub start_time: &'a str,
    pub end_time: Option<&'a str>,
    pub total_missiles: Option<i32>,
    pub total_detailed: Option<i32>,
    pub status: &'a str,
}
