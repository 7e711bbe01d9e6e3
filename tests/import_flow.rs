//! End-to-end import tests over a temporary data directory and database.

use std::collections::BTreeMap;
use std::fs;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tempfile::TempDir;

use missilery::config::DataLayout;
use missilery::import::{ImportError, ImportMode, Importer};
use missilery::models::{
    BasicRecord, CharacteristicRow, DetailIndexEntry, DetailRecord, StructuredField,
};
use missilery::repository::AsyncSqlitePool;
use missilery::schema::{
    characteristics, countries, missile_detailed_data, missile_images, missiles,
    structured_content, structured_content_links,
};

fn basic(name: &str, url: &str, country: Option<&str>, range_km: Option<i32>) -> BasicRecord {
    BasicRecord {
        name: name.to_string(),
        detail_page_url: url.to_string(),
        index_page_url: "https://missilery.info/search".to_string(),
        page_number: 1,
        base: None,
        purpose: Some("Оперативно-тактический".to_string()),
        warhead: None,
        guidance_system: None,
        country: country.map(str::to_string),
        range_km,
        year_developed: Some(1988),
        description: String::new(),
        is_detailed: false,
    }
}

fn detail(name: &str, url: &str, rows: Vec<CharacteristicRow>) -> DetailRecord {
    let mut structured_content = BTreeMap::new();
    structured_content.insert(
        "country".to_string(),
        StructuredField {
            label: "Страна".to_string(),
            text: "Россия".to_string(),
            links: vec!["https://missilery.info/country/russia".to_string()],
            urls: vec!["https://missilery.info/country/russia".to_string()],
        },
    );
    DetailRecord {
        missile_name: name.to_string(),
        detail_page_url: url.to_string(),
        index_page_url: "https://missilery.info/search".to_string(),
        page_number: 1,
        scraped_at: Utc::now(),
        structured_content,
        description: Some("Описание комплекса.".to_string()),
        characteristics_table: rows,
        image_urls: vec!["https://missilery.info/img/x1.jpg".to_string()],
        gallery_images: vec!["https://missilery.info/img/x1-g1.jpg".to_string()],
    }
}

fn row(name: &str, value: &str) -> CharacteristicRow {
    CharacteristicRow {
        field_name: name.to_string(),
        field_value: value.to_string(),
    }
}

/// Write both catalogs plus one detail file for `records`.
fn write_data(layout: &DataLayout, basic: &[BasicRecord], details: &[DetailRecord]) {
    layout.ensure().unwrap();
    fs::write(
        layout.basic_catalog(),
        serde_json::to_vec_pretty(basic).unwrap(),
    )
    .unwrap();

    let mut index = Vec::new();
    for (i, detail) in details.iter().enumerate() {
        let filename = format!("detail_{i}.json");
        fs::write(
            layout.detailed_dir().join(&filename),
            serde_json::to_vec_pretty(detail).unwrap(),
        )
        .unwrap();
        index.push(DetailIndexEntry {
            name: detail.missile_name.clone(),
            detail_page_url: detail.detail_page_url.clone(),
            index_page_url: detail.index_page_url.clone(),
            page_number: detail.page_number,
            detailed_filename: filename,
            scraped_at: detail.scraped_at,
        });
    }
    fs::write(
        layout.detailed_index(),
        serde_json::to_vec_pretty(&index).unwrap(),
    )
    .unwrap();
}

fn setup() -> (TempDir, DataLayout, AsyncSqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let pool = AsyncSqlitePool::from_path(&layout.database());
    (dir, layout, pool)
}

#[tokio::test]
async fn end_to_end_import_populates_all_tables() {
    let (_dir, layout, pool) = setup();
    let url = "https://missilery.info/missile/x1";
    write_data(
        &layout,
        &[basic("X-1", url, Some("Россия"), Some(500))],
        &[detail(
            "X-1",
            url,
            vec![row("Дальность стрельбы", "500 км"), row("Тип БЧ", "ядерная")],
        )],
    );

    let importer = Importer::new(&layout, pool.clone(), ImportMode::Create);
    let stats = importer.run().await.unwrap();
    assert_eq!(stats.missiles_created, 1);
    assert_eq!(stats.detailed_imported, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.dimensions.countries, 1);
    assert_eq!(stats.dimensions.purposes, 1);

    let mut conn = pool.get().await.unwrap();

    let (missile_id, range_km, is_detailed): (i32, Option<i32>, bool) = missiles::table
        .filter(missiles::detail_page_url.eq(url))
        .select((missiles::id, missiles::range_km, missiles::is_detailed))
        .first(&mut conn)
        .await
        .unwrap();
    assert_eq!(range_km, Some(500));
    assert!(is_detailed);

    let country_names: Vec<String> = countries::table
        .select(countries::name)
        .load(&mut conn)
        .await
        .unwrap();
    assert_eq!(country_names, vec!["Россия".to_string()]);

    let char_count: i64 = characteristics::table
        .filter(characteristics::missile_id.eq(missile_id))
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(char_count, 2);

    let image_types: Vec<Option<String>> = missile_images::table
        .filter(missile_images::missile_id.eq(missile_id))
        .select(missile_images::image_type)
        .order(missile_images::id)
        .load(&mut conn)
        .await
        .unwrap();
    assert_eq!(
        image_types,
        vec![Some("main".to_string()), Some("gallery".to_string())]
    );

    let range_detailed: Option<String> = missile_detailed_data::table
        .filter(missile_detailed_data::missile_id.eq(missile_id))
        .select(missile_detailed_data::range_detailed)
        .first(&mut conn)
        .await
        .unwrap();
    assert_eq!(range_detailed.as_deref(), Some("500 км"));

    // Link rows carry the owning field's text, not the target URL.
    let links: Vec<(String, Option<String>)> = structured_content_links::table
        .select((
            structured_content_links::link_url,
            structured_content_links::link_text,
        ))
        .load(&mut conn)
        .await
        .unwrap();
    assert_eq!(
        links,
        vec![(
            "https://missilery.info/country/russia".to_string(),
            Some("Россия".to_string())
        )]
    );

    let session = missilery::repository::session::latest(&mut conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, "completed");
    assert_eq!(session.total_missiles, Some(1));
    assert_eq!(session.total_detailed, Some(1));
}

#[tokio::test]
async fn create_mode_second_run_adds_nothing() {
    let (_dir, layout, pool) = setup();
    let url = "https://missilery.info/missile/x2";
    write_data(
        &layout,
        &[basic("X-2", url, Some("СССР"), None)],
        &[detail("X-2", url, vec![row("Длина", "7 м")])],
    );

    let first = Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap();
    assert_eq!(first.missiles_created, 1);
    assert_eq!(first.detailed_imported, 1);

    let second = Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap();
    assert_eq!(second.missiles_created, 0);
    assert_eq!(second.missiles_skipped, 1);
    assert_eq!(second.detailed_imported, 0);
    assert_eq!(second.detailed_skipped, 1);

    let mut conn = pool.get().await.unwrap();
    let missiles: i64 = missiles::table
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(missiles, 1);
    let chars: i64 = characteristics::table
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(chars, 1);
}

#[tokio::test]
async fn update_mode_replaces_child_rows() {
    let (_dir, layout, pool) = setup();
    let url = "https://missilery.info/missile/x3";
    write_data(
        &layout,
        &[basic("X-3", url, Some("Россия"), Some(300))],
        &[detail(
            "X-3",
            url,
            vec![row("Длина", "7 м"), row("Диаметр", "920 мм"), row("КВО", "30 м")],
        )],
    );
    Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap();

    // Re-crawl produced fewer characteristics; update must not accumulate.
    write_data(
        &layout,
        &[basic("X-3", url, Some("Россия"), Some(350))],
        &[detail("X-3", url, vec![row("Длина", "7,2 м")])],
    );
    let stats = Importer::new(&layout, pool.clone(), ImportMode::Update)
        .run()
        .await
        .unwrap();
    assert_eq!(stats.missiles_updated, 1);
    assert_eq!(stats.detailed_imported, 1);

    let mut conn = pool.get().await.unwrap();
    let range_km: Option<i32> = missiles::table
        .filter(missiles::detail_page_url.eq(url))
        .select(missiles::range_km)
        .first(&mut conn)
        .await
        .unwrap();
    assert_eq!(range_km, Some(350));

    let chars: i64 = characteristics::table
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(chars, 1);
    let fields: i64 = structured_content::table
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(fields, 1);
    let detailed_rows: i64 = missile_detailed_data::table
        .select(count_star())
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(detailed_rows, 1);
}

#[tokio::test]
async fn dimension_values_converge_case_sensitively() {
    let (_dir, layout, pool) = setup();
    write_data(
        &layout,
        &[
            basic("A-1", "https://missilery.info/missile/a1", Some("Россия"), None),
            basic("A-2", "https://missilery.info/missile/a2", Some("Россия "), None),
            basic("A-3", "https://missilery.info/missile/a3", Some("РОССИЯ"), None),
        ],
        &[],
    );
    Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap();

    let mut conn = pool.get().await.unwrap();
    // Trimmed duplicates share a row; casing variants stay distinct.
    let mut names: Vec<String> = countries::table
        .select(countries::name)
        .load(&mut conn)
        .await
        .unwrap();
    names.sort();
    assert_eq!(names, vec!["РОССИЯ".to_string(), "Россия".to_string()]);
}

#[tokio::test]
async fn missing_catalogs_abort_before_writing() {
    let (_dir, layout, pool) = setup();
    // No crawl output at all.
    let err = Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingInput(_)));
    assert!(!layout.database().exists());
}

#[tokio::test]
async fn bad_detail_file_is_counted_not_fatal() {
    let (_dir, layout, pool) = setup();
    let url = "https://missilery.info/missile/x4";
    write_data(
        &layout,
        &[basic("X-4", url, None, None)],
        &[detail("X-4", url, vec![])],
    );
    // Corrupt the detail file after indexing.
    fs::write(layout.detailed_dir().join("detail_0.json"), "not json").unwrap();

    let stats = Importer::new(&layout, pool.clone(), ImportMode::Create)
        .run()
        .await
        .unwrap();
    assert_eq!(stats.missiles_created, 1);
    assert_eq!(stats.detailed_imported, 0);
    assert_eq!(stats.errors, 1);
}
