//! Structured import: intermediate JSON catalogs into the normalized
//! SQLite store.
//!
//! Runs in two passes, basic catalog first and detail records second, so
//! every detail row can attach to an existing missile. Each record is its
//! own transaction; a bad record is counted and skipped without aborting
//! the batch.

mod stats;

pub use stats::{DimensionCounts, ImportStats};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::AsyncConnection;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DataLayout;
use crate::models::{BasicRecord, CharacteristicRow, DetailIndexEntry, DetailRecord, ImageKind};
use crate::repository::{
    self, dimension, missile, session, AsyncSqliteConnection, AsyncSqlitePool, DieselError,
    DimensionKind, NewCharacteristic, NewImportSession, NewMissile, NewMissileDetailedData,
    NewMissileImage, NewStructuredContent, NewStructuredContentLink,
};

/// Longest link text stored per structured content link.
const MAX_LINK_TEXT_LEN: usize = 200;

/// What to do when an incoming record already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Insert new records only; existing missiles are left untouched.
    Create,
    /// Overwrite scalars and replace child rows wholesale.
    Update,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("missing input file {0} (run the crawl first)")]
    MissingInput(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("database error: {0}")]
    Db(#[from] DieselError),
}

/// Outcome of one basic-record transaction.
struct BasicOutcome {
    action: BasicAction,
    dimensions: DimensionCounts,
}

enum BasicAction {
    Created,
    Updated,
    Skipped,
}

/// Outcome of one detail-record transaction.
struct DetailOutcome {
    imported: bool,
    structured_fields: usize,
    characteristics: usize,
    images: usize,
    dimensions: DimensionCounts,
}

impl DetailOutcome {
    fn skipped() -> Self {
        Self {
            imported: false,
            structured_fields: 0,
            characteristics: 0,
            images: 0,
            dimensions: DimensionCounts::default(),
        }
    }
}

/// Resolved dimension FK ids for one missile row.
#[derive(Debug, Default)]
struct MissileDimensions {
    country_id: Option<i32>,
    purpose_id: Option<i32>,
    base_type_id: Option<i32>,
    warhead_type_id: Option<i32>,
    guidance_system_id: Option<i32>,
}

pub struct Importer {
    layout: DataLayout,
    pool: AsyncSqlitePool,
    mode: ImportMode,
}

impl Importer {
    pub fn new(layout: &DataLayout, pool: AsyncSqlitePool, mode: ImportMode) -> Self {
        Self {
            layout: layout.clone(),
            pool,
            mode,
        }
    }

    /// Import both catalogs and append a session row.
    ///
    /// Both intermediate files must exist before anything is written;
    /// a partial data directory fails fast instead of half-importing.
    pub async fn run(&self) -> Result<ImportStats, ImportError> {
        let basic_path = self.layout.basic_catalog();
        let index_path = self.layout.detailed_index();
        if !basic_path.exists() {
            return Err(ImportError::MissingInput(basic_path));
        }
        if !index_path.exists() {
            return Err(ImportError::MissingInput(index_path));
        }

        let basic: Vec<BasicRecord> = read_catalog(&basic_path)?;
        let index: Vec<DetailIndexEntry> = read_catalog(&index_path)?;

        repository::migrations::run_migrations(self.pool.database_url()).await?;
        let mut conn = self.pool.get().await?;

        let started = Utc::now();
        let mut stats = ImportStats::default();

        info!(
            "Importing {} basic records and {} detail entries ({:?} mode)",
            basic.len(),
            index.len(),
            self.mode
        );

        for record in &basic {
            match self.import_basic(&mut conn, record).await {
                Ok(outcome) => {
                    match outcome.action {
                        BasicAction::Created => stats.missiles_created += 1,
                        BasicAction::Updated => stats.missiles_updated += 1,
                        BasicAction::Skipped => stats.missiles_skipped += 1,
                    }
                    stats.dimensions.merge(&outcome.dimensions);
                }
                Err(err) => {
                    warn!("Failed to import {}: {}", record.detail_page_url, err);
                    stats.errors += 1;
                }
            }
        }

        // Detail entries whose missile never made the basic catalog still
        // carry a locator; the lookup map lets them inherit the basic
        // record's scalars and dimensions when one exists.
        let basic_by_url: HashMap<&str, &BasicRecord> = basic
            .iter()
            .map(|record| (record.detail_page_url.as_str(), record))
            .collect();

        for entry in &index {
            let basic_record = basic_by_url.get(entry.detail_page_url.as_str()).copied();
            match self.import_detail(&mut conn, entry, basic_record).await {
                Ok(outcome) => {
                    if outcome.imported {
                        stats.detailed_imported += 1;
                        stats.structured_fields += outcome.structured_fields;
                        stats.characteristics += outcome.characteristics;
                        stats.images += outcome.images;
                    } else {
                        stats.detailed_skipped += 1;
                    }
                    stats.dimensions.merge(&outcome.dimensions);
                }
                Err(err) => {
                    warn!("Failed to import detail {}: {}", entry.detailed_filename, err);
                    stats.errors += 1;
                }
            }
        }

        let session_name = format!("import_{}", started.format("%Y%m%d_%H%M%S"));
        let start_time = started.to_rfc3339();
        let end_time = Utc::now().to_rfc3339();
        session::append(
            &mut conn,
            &NewImportSession {
                session_name: &session_name,
                start_time: &start_time,
                end_time: Some(&end_time),
                total_missiles: Some((stats.missiles_created + stats.missiles_updated) as i32),
                total_detailed: Some(stats.detailed_imported as i32),
                status: stats.status(),
            },
        )
        .await?;

        Ok(stats)
    }

    async fn import_basic(
        &self,
        conn: &mut AsyncSqliteConnection,
        record: &BasicRecord,
    ) -> Result<BasicOutcome, DieselError> {
        let mode = self.mode;
        conn.transaction(|conn| {
            async move {
                let existing = missile::find_by_detail_url(conn, &record.detail_page_url).await?;
                if existing.is_some() && mode == ImportMode::Create {
                    return Ok(BasicOutcome {
                        action: BasicAction::Skipped,
                        dimensions: DimensionCounts::default(),
                    });
                }

                let mut dims = DimensionCounts::default();
                let resolved = resolve_record_dimensions(conn, record, &mut dims).await?;

                let scraped_at = Utc::now().to_rfc3339();
                let description = non_empty(&record.description);
                let new = NewMissile {
                    name: &record.name,
                    detail_page_url: &record.detail_page_url,
                    index_page_url: &record.index_page_url,
                    page_number: record.page_number as i32,
                    range_km: record.range_km,
                    year_developed: record.year_developed,
                    description,
                    country_id: resolved.country_id,
                    purpose_id: resolved.purpose_id,
                    base_type_id: resolved.base_type_id,
                    warhead_type_id: resolved.warhead_type_id,
                    guidance_system_id: resolved.guidance_system_id,
                    is_detailed: record.is_detailed,
                    scraped_at: &scraped_at,
                };

                let action = match existing {
                    Some(found) => {
                        missile::update(conn, found.id, &new).await?;
                        BasicAction::Updated
                    }
                    None => {
                        missile::insert(conn, &new).await?;
                        BasicAction::Created
                    }
                };
                Ok(BasicOutcome {
                    action,
                    dimensions: dims,
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn import_detail(
        &self,
        conn: &mut AsyncSqliteConnection,
        entry: &DetailIndexEntry,
        basic: Option<&BasicRecord>,
    ) -> Result<DetailOutcome, DieselError> {
        let path = self.layout.detailed_dir().join(&entry.detailed_filename);
        let body = fs::read_to_string(&path)
            .map_err(crate::repository::util::to_diesel_error)?;
        let detail: DetailRecord =
            serde_json::from_str(&body).map_err(crate::repository::util::to_diesel_error)?;

        let mode = self.mode;
        let filename = entry.detailed_filename.as_str();
        conn.transaction(|conn| {
            async move {
                let scraped_at = detail.scraped_at.to_rfc3339();
                let mut dims = DimensionCounts::default();
                let missile_id =
                    match missile::find_by_detail_url(conn, &detail.detail_page_url).await? {
                        Some(found) => {
                            if found.is_detailed && mode == ImportMode::Create {
                                return Ok(DetailOutcome::skipped());
                            }
                            found.id
                        }
                        // Detail record without a missile row yet; register it
                        // from the basic catalog entry when one exists, else
                        // from what the detail page itself carries.
                        None => {
                            let resolved = match basic {
                                Some(record) => {
                                    resolve_record_dimensions(conn, record, &mut dims).await?
                                }
                                None => MissileDimensions::default(),
                            };
                            let new = NewMissile {
                                name: &detail.missile_name,
                                detail_page_url: &detail.detail_page_url,
                                index_page_url: &detail.index_page_url,
                                page_number: detail.page_number as i32,
                                range_km: basic.and_then(|record| record.range_km),
                                year_developed: basic.and_then(|record| record.year_developed),
                                description: detail.description.as_deref().or_else(|| {
                                    basic.and_then(|record| non_empty(&record.description))
                                }),
                                country_id: resolved.country_id,
                                purpose_id: resolved.purpose_id,
                                base_type_id: resolved.base_type_id,
                                warhead_type_id: resolved.warhead_type_id,
                                guidance_system_id: resolved.guidance_system_id,
                                is_detailed: false,
                                scraped_at: &scraped_at,
                            };
                            missile::insert(conn, &new).await?
                        }
                    };

                missile::delete_children(conn, missile_id).await?;

                let columns = DetailedColumns::from_rows(&detail.characteristics_table);
                missile::insert_detailed_data(
                    conn,
                    &NewMissileDetailedData {
                        missile_id,
                        detailed_filename: Some(filename),
                        range_detailed: columns.range_detailed.as_deref(),
                        speed: columns.speed.as_deref(),
                        weight: columns.weight.as_deref(),
                        length: columns.length.as_deref(),
                        diameter: columns.diameter.as_deref(),
                        accuracy: columns.accuracy.as_deref(),
                        flight_altitude: columns.flight_altitude.as_deref(),
                        other_characteristics: columns.other.as_deref(),
                        scraped_at: &scraped_at,
                    },
                )
                .await?;

                let mut structured_fields = 0;
                for (field_name, field) in &detail.structured_content {
                    let content_id = missile::insert_structured_field(
                        conn,
                        &NewStructuredContent {
                            missile_id,
                            field_name,
                            field_label: non_empty(&field.label),
                            field_text: non_empty(&field.text),
                        },
                    )
                    .await?;
                    structured_fields += 1;

                    // Every link row carries the owning field's text; the
                    // record's `links` list mirrors `urls` and holds no text.
                    let link_text = truncate_chars(&field.text, MAX_LINK_TEXT_LEN);
                    for url in &field.urls {
                        missile::insert_structured_link(
                            conn,
                            &NewStructuredContentLink {
                                structured_content_id: content_id,
                                link_url: url,
                                link_text: Some(&link_text),
                            },
                        )
                        .await?;
                    }
                }

                let mut characteristics = 0;
                for row in &detail.characteristics_table {
                    missile::insert_characteristic(
                        conn,
                        &NewCharacteristic {
                            missile_id,
                            field_name: &row.field_name,
                            field_value: &row.field_value,
                        },
                    )
                    .await?;
                    characteristics += 1;
                }

                let mut images = 0;
                for url in &detail.image_urls {
                    missile::insert_image(
                        conn,
                        &NewMissileImage {
                            missile_id,
                            image_url: url,
                            image_type: Some(ImageKind::Main.as_str()),
                        },
                    )
                    .await?;
                    images += 1;
                }
                for url in &detail.gallery_images {
                    missile::insert_image(
                        conn,
                        &NewMissileImage {
                            missile_id,
                            image_url: url,
                            image_type: Some(ImageKind::Gallery.as_str()),
                        },
                    )
                    .await?;
                    images += 1;
                }

                missile::mark_detailed(conn, missile_id).await?;

                Ok(DetailOutcome {
                    imported: true,
                    structured_fields,
                    characteristics,
                    images,
                    dimensions: dims,
                })
            }
            .scope_boxed()
        })
        .await
    }
}

async fn resolve_record_dimensions(
    conn: &mut AsyncSqliteConnection,
    record: &BasicRecord,
    dims: &mut DimensionCounts,
) -> Result<MissileDimensions, DieselError> {
    Ok(MissileDimensions {
        country_id: resolve_dimension(
            conn,
            DimensionKind::Country,
            record.country.as_deref(),
            dims,
        )
        .await?,
        purpose_id: resolve_dimension(
            conn,
            DimensionKind::Purpose,
            record.purpose.as_deref(),
            dims,
        )
        .await?,
        base_type_id: resolve_dimension(conn, DimensionKind::BaseType, record.base.as_deref(), dims)
            .await?,
        warhead_type_id: resolve_dimension(
            conn,
            DimensionKind::WarheadType,
            record.warhead.as_deref(),
            dims,
        )
        .await?,
        guidance_system_id: resolve_dimension(
            conn,
            DimensionKind::GuidanceSystem,
            record.guidance_system.as_deref(),
            dims,
        )
        .await?,
    })
}

async fn resolve_dimension(
    conn: &mut AsyncSqliteConnection,
    kind: DimensionKind,
    name: Option<&str>,
    dims: &mut DimensionCounts,
) -> Result<Option<i32>, DieselError> {
    Ok(match dimension::resolve_opt(conn, kind, name).await? {
        Some(resolved) => {
            if resolved.created {
                dims.record(kind);
            }
            Some(resolved.id)
        }
        None => None,
    })
}

/// Typed characteristic columns carved out of the characteristics table.
///
/// The site labels its rows in Russian with no fixed vocabulary; matching
/// is by substring on the lowercased name, first match per column wins.
/// Rows that match nothing are kept verbatim as a JSON object.
#[derive(Debug, Default)]
struct DetailedColumns {
    range_detailed: Option<String>,
    speed: Option<String>,
    weight: Option<String>,
    length: Option<String>,
    diameter: Option<String>,
    accuracy: Option<String>,
    flight_altitude: Option<String>,
    other: Option<String>,
}

impl DetailedColumns {
    fn from_rows(rows: &[CharacteristicRow]) -> Self {
        let mut columns = Self::default();
        let mut other = BTreeMap::new();

        for row in rows {
            let name = row.field_name.to_lowercase();
            let slot = if name.contains("дальность") {
                &mut columns.range_detailed
            } else if name.contains("скорость") {
                &mut columns.speed
            } else if name.contains("масса") || name.contains("вес") {
                &mut columns.weight
            } else if name.contains("длина") {
                &mut columns.length
            } else if name.contains("диаметр") || name.contains("калибр") {
                &mut columns.diameter
            } else if name.contains("точность") || name.contains("кво") {
                &mut columns.accuracy
            } else if name.contains("высота") {
                &mut columns.flight_altitude
            } else {
                other
                    .entry(row.field_name.clone())
                    .or_insert_with(|| row.field_value.clone());
                continue;
            };
            if slot.is_none() {
                *slot = Some(row.field_value.clone());
            } else {
                other
                    .entry(row.field_name.clone())
                    .or_insert_with(|| row.field_value.clone());
            }
        }

        if !other.is_empty() {
            columns.other = serde_json::to_string(&other).ok();
        }
        columns
    }
}

fn read_catalog<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, ImportError> {
    let body = fs::read_to_string(path)?;
    serde_json::from_str(&body).map_err(|source| ImportError::Catalog {
        path: path.clone(),
        source,
    })
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: &str) -> CharacteristicRow {
        CharacteristicRow {
            field_name: name.to_string(),
            field_value: value.to_string(),
        }
    }

    #[test]
    fn characteristics_map_to_typed_columns() {
        let columns = DetailedColumns::from_rows(&[
            row("Дальность стрельбы", "500 км"),
            row("Скорость полета", "2М"),
            row("Стартовая масса", "3800 кг"),
            row("Длина", "7,3 м"),
            row("Диаметр корпуса", "920 мм"),
            row("КВО", "30 м"),
            row("Высота полета", "50 км"),
            row("Тип двигателя", "РДТТ"),
        ]);

        assert_eq!(columns.range_detailed.as_deref(), Some("500 км"));
        assert_eq!(columns.speed.as_deref(), Some("2М"));
        assert_eq!(columns.weight.as_deref(), Some("3800 кг"));
        assert_eq!(columns.length.as_deref(), Some("7,3 м"));
        assert_eq!(columns.diameter.as_deref(), Some("920 мм"));
        assert_eq!(columns.accuracy.as_deref(), Some("30 м"));
        assert_eq!(columns.flight_altitude.as_deref(), Some("50 км"));
        let other = columns.other.unwrap();
        assert!(other.contains("Тип двигателя"));
    }

    #[test]
    fn first_match_wins_and_duplicates_spill_to_other() {
        let columns = DetailedColumns::from_rows(&[
            row("Скорость максимальная", "2М"),
            row("Скорость крейсерская", "0,8М"),
        ]);
        assert_eq!(columns.speed.as_deref(), Some("2М"));
        assert!(columns.other.unwrap().contains("крейсерская"));
    }

    #[test]
    fn link_text_is_truncated_by_chars() {
        let long = "б".repeat(300);
        assert_eq!(truncate_chars(&long, MAX_LINK_TEXT_LEN).chars().count(), 200);
    }

    #[tokio::test]
    async fn detail_without_missile_row_inherits_basic_record() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.ensure().unwrap();
        let pool = AsyncSqlitePool::from_path(&layout.database());
        repository::migrations::run_migrations(pool.database_url())
            .await
            .unwrap();

        let detail = DetailRecord {
            missile_name: "Эльбрус 9К72".to_string(),
            detail_page_url: "https://missilery.info/missile/elbrus".to_string(),
            index_page_url: "https://missilery.info/search".to_string(),
            page_number: 1,
            scraped_at: Utc::now(),
            structured_content: BTreeMap::new(),
            description: None,
            characteristics_table: Vec::new(),
            image_urls: Vec::new(),
            gallery_images: Vec::new(),
        };
        fs::write(
            layout.detailed_dir().join("elbrus.json"),
            serde_json::to_string_pretty(&detail).unwrap(),
        )
        .unwrap();

        let basic = BasicRecord {
            name: detail.missile_name.clone(),
            detail_page_url: detail.detail_page_url.clone(),
            index_page_url: detail.index_page_url.clone(),
            page_number: 1,
            base: None,
            purpose: Some("Оперативно-тактический".to_string()),
            warhead: None,
            guidance_system: None,
            country: Some("СССР".to_string()),
            range_km: Some(300),
            year_developed: Some(1962),
            description: "Жидкостная одноступенчатая ракета".to_string(),
            is_detailed: false,
        };
        let entry = DetailIndexEntry {
            name: basic.name.clone(),
            detail_page_url: basic.detail_page_url.clone(),
            index_page_url: basic.index_page_url.clone(),
            page_number: 1,
            detailed_filename: "elbrus.json".to_string(),
            scraped_at: detail.scraped_at,
        };

        let importer = Importer::new(&layout, pool.clone(), ImportMode::Create);
        let mut conn = pool.get().await.unwrap();
        let outcome = importer
            .import_detail(&mut conn, &entry, Some(&basic))
            .await
            .unwrap();

        assert!(outcome.imported);
        assert_eq!(outcome.dimensions.countries, 1);
        assert_eq!(outcome.dimensions.purposes, 1);

        let row = missile::find_by_detail_url(&mut conn, &basic.detail_page_url)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.range_km, Some(300));
        assert_eq!(row.year_developed, Some(1962));
        assert!(row.country_id.is_some());
        assert!(row.purpose_id.is_some());
        assert_eq!(
            row.description.as_deref(),
            Some("Жидкостная одноступенчатая ракета")
        );
        assert!(row.is_detailed);
    }
}
