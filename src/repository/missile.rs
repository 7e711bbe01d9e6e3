//! Missile table access plus the child tables hanging off it.
//!
//! These functions operate on a borrowed connection so the importer can
//! compose them inside one transaction per record.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqliteConnection, DieselError};
use super::records::{
    MissileRecord, NewCharacteristic, NewMissile, NewMissileDetailedData, NewMissileImage,
    NewStructuredContent, NewStructuredContentLink,
};
use crate::schema::{
    characteristics, missile_detailed_data, missile_images, missiles, structured_content,
    structured_content_links,
};

diesel::define_sql_function! {
    fn last_insert_rowid() -> Integer;
}

/// Look up a missile by its detail page locator, the natural key.
pub async fn find_by_detail_url(
    conn: &mut AsyncSqliteConnection,
    detail_page_url: &str,
) -> Result<Option<MissileRecord>, DieselError> {
    missiles::table
        .filter(missiles::detail_page_url.eq(detail_page_url))
        .first::<MissileRecord>(conn)
        .await
        .optional()
}

/// Insert a missile and return its new id.
pub async fn insert(
    conn: &mut AsyncSqliteConnection,
    missile: &NewMissile<'_>,
) -> Result<i32, DieselError> {
    diesel::insert_into(missiles::table)
        .values(missile)
        .execute(conn)
        .await?;
    diesel::select(last_insert_rowid()).get_result(conn).await
}

/// Overwrite the scalar columns of an existing missile.
pub async fn update(
    conn: &mut AsyncSqliteConnection,
    id: i32,
    missile: &NewMissile<'_>,
) -> Result<(), DieselError> {
    diesel::update(missiles::table.find(id))
        .set((
            missiles::name.eq(missile.name),
            missiles::index_page_url.eq(missile.index_page_url),
            missiles::page_number.eq(missile.page_number),
            missiles::range_km.eq(missile.range_km),
            missiles::year_developed.eq(missile.year_developed),
            missiles::description.eq(missile.description),
            missiles::country_id.eq(missile.country_id),
            missiles::purpose_id.eq(missile.purpose_id),
            missiles::base_type_id.eq(missile.base_type_id),
            missiles::warhead_type_id.eq(missile.warhead_type_id),
            missiles::guidance_system_id.eq(missile.guidance_system_id),
            missiles::is_detailed.eq(missile.is_detailed),
            missiles::scraped_at.eq(missile.scraped_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// Mark a missile as having detail-level data.
pub async fn mark_detailed(
    conn: &mut AsyncSqliteConnection,
    id: i32,
) -> Result<(), DieselError> {
    diesel::update(missiles::table.find(id))
        .set(missiles::is_detailed.eq(true))
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete every child row of a missile.
///
/// Used by update-mode imports before reinserting detail content, so the
/// child tables always reflect exactly one import run.
pub async fn delete_children(
    conn: &mut AsyncSqliteConnection,
    missile_id: i32,
) -> Result<(), DieselError> {
    let content_ids = structured_content::table
        .filter(structured_content::missile_id.eq(missile_id))
        .select(structured_content::id);
    diesel::delete(
        structured_content_links::table
            .filter(structured_content_links::structured_content_id.eq_any(content_ids)),
    )
    .execute(conn)
    .await?;
    diesel::delete(
        structured_content::table.filter(structured_content::missile_id.eq(missile_id)),
    )
    .execute(conn)
    .await?;
    diesel::delete(characteristics::table.filter(characteristics::missile_id.eq(missile_id)))
        .execute(conn)
        .await?;
    diesel::delete(missile_images::table.filter(missile_images::missile_id.eq(missile_id)))
        .execute(conn)
        .await?;
    diesel::delete(
        missile_detailed_data::table.filter(missile_detailed_data::missile_id.eq(missile_id)),
    )
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_detailed_data(
    conn: &mut AsyncSqliteConnection,
    row: &NewMissileDetailedData<'_>,
) -> Result<(), DieselError> {
    diesel::insert_into(missile_detailed_data::table)
        .values(row)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert a structured content field and return its id for link rows.
pub async fn insert_structured_field(
    conn: &mut AsyncSqliteConnection,
    field: &NewStructuredContent<'_>,
) -> Result<i32, DieselError> {
    diesel::insert_into(structured_content::table)
        .values(field)
        .execute(conn)
        .await?;
    diesel::select(last_insert_rowid()).get_result(conn).await
}

pub async fn insert_structured_link(
    conn: &mut AsyncSqliteConnection,
    link: &NewStructuredContentLink<'_>,
) -> Result<(), DieselError> {
    diesel::insert_into(structured_content_links::table)
        .values(link)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_characteristic(
    conn: &mut AsyncSqliteConnection,
    row: &NewCharacteristic<'_>,
) -> Result<(), DieselError> {
    diesel::insert_into(characteristics::table)
        .values(row)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_image(
    conn: &mut AsyncSqliteConnection,
    image: &NewMissileImage<'_>,
) -> Result<(), DieselError> {
    diesel::insert_into(missile_images::table)
        .values(image)
        .execute(conn)
        .await?;
    Ok(())
}
