//! Crawl runner: bounded-concurrency fetch-and-process loop.
//!
//! Fetches may overlap up to the configured concurrency cap; extraction is
//! synchronous and network-free. The frontier is the only state shared
//! across fetches and is mutated only between batches, in the driver.

pub mod frontier;
mod http;

pub use frontier::{Frontier, Task, TaskKind};
pub use http::{FetchError, HttpClient};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};

use crate::config::{DataLayout, Settings};
use crate::extract::{
    discover_max_page, discover_page_ordinals, extract_cards, extract_detail, listing_page_url,
    listing_pages,
};
use crate::models::BasicRecord;
use crate::storage::CatalogWriter;

/// Counters for one crawl run.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub pages_visited: usize,
    pub basic_records: usize,
    pub detail_records: usize,
    pub dropped: usize,
}

/// Everything extracted from one listing page.
struct ListingExtract {
    records: Vec<BasicRecord>,
    /// Pagination ordinals re-reported by this page (secondary source).
    ordinals: Vec<u32>,
    /// Highest ordinal in this page's pagination control, if any.
    max_ordinal: Option<u32>,
}

fn extract_listing(body: &str, page_url: &str, page_number: u32) -> ListingExtract {
    let html = Html::parse_document(body);
    ListingExtract {
        records: extract_cards(&html, page_url, page_number),
        ordinals: discover_page_ordinals(&html),
        max_ordinal: discover_max_page(&html),
    }
}

/// Run the full crawl: listing discovery, card extraction, detail pages.
pub async fn run_crawl(settings: &Settings, layout: &DataLayout) -> anyhow::Result<CrawlReport> {
    layout.ensure()?;

    let client = HttpClient::new(settings);
    let search_url = settings.search_url();
    let mut frontier = Frontier::new();
    let mut writer = CatalogWriter::new(layout)?;
    let mut report = CrawlReport::default();

    // The first listing page is fetched eagerly: it seeds both the card
    // stream and the pagination ceiling. Failing here is fatal - there is
    // nothing to crawl without it.
    info!("Fetching first listing page: {}", search_url);
    let body = client.get_text(&search_url).await?;
    frontier.mark_visited(&search_url);
    report.pages_visited += 1;

    let first = extract_listing(&body, &search_url, 1);
    let ceiling = match first.max_ordinal {
        Some(max) => max.min(settings.max_page),
        None => {
            warn!(
                "No pagination ordinal discoverable; falling back to ceiling {}",
                settings.max_page
            );
            settings.max_page
        }
    };
    info!("Listing ceiling: ordinal {} ({} pages)", ceiling, ceiling + 1);

    // Generate the whole listing sequence deterministically rather than
    // relying on controls embedded in later pages.
    for (url, page_number) in listing_pages(&search_url, ceiling) {
        frontier.admit(Task::listing(url, page_number));
    }
    apply_listing(
        first,
        &search_url,
        ceiling,
        &mut frontier,
        &mut writer,
        &mut report,
    )?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
    );

    while frontier.pending() > 0 {
        let batch = frontier.drain();
        let mut fetches = stream::iter(batch.into_iter().map(|task| {
            let client = client.clone();
            async move {
                let result = client.get_text(&task.url).await;
                (task, result)
            }
        }))
        .buffer_unordered(settings.concurrency);

        while let Some((task, result)) = fetches.next().await {
            // Visited either way: a locator whose retry budget ran out is
            // dropped, not retried through re-admission.
            frontier.mark_visited(&task.url);
            let body = match result {
                Ok(body) => body,
                Err(e) => {
                    warn!("Dropping {}: {}", task.url, e);
                    report.dropped += 1;
                    continue;
                }
            };
            report.pages_visited += 1;

            match &task.kind {
                TaskKind::Listing { page_number } => {
                    let extracted = extract_listing(&body, &task.url, *page_number);
                    // frontier is free here: the fetch stream only borrows
                    // the client.
                    apply_listing(
                        extracted,
                        &search_url,
                        ceiling,
                        &mut frontier,
                        &mut writer,
                        &mut report,
                    )?;
                }
                TaskKind::Detail {
                    missile_name,
                    index_page_url,
                    page_number,
                } => {
                    let html = Html::parse_document(&body);
                    match extract_detail(
                        &html,
                        &task.url,
                        missile_name,
                        index_page_url,
                        *page_number,
                    ) {
                        Some(record) => {
                            writer.write_detail(&record)?;
                            report.detail_records += 1;
                        }
                        None => warn!("No content container found for {}", task.url),
                    }
                }
            }
            progress.set_message(format!(
                "{} pages, {} records, {} detailed",
                report.pages_visited, report.basic_records, report.detail_records
            ));
            progress.tick();
        }
    }

    progress.finish_and_clear();
    writer.flush()?;
    info!(
        "Crawl finished: {} pages visited, {} basic records, {} detail records, {} dropped",
        report.pages_visited, report.basic_records, report.detail_records, report.dropped
    );
    Ok(report)
}

/// Fold one listing page's output into the frontier and catalogs.
fn apply_listing(
    extracted: ListingExtract,
    search_url: &str,
    ceiling: u32,
    frontier: &mut Frontier,
    writer: &mut CatalogWriter,
    report: &mut CrawlReport,
) -> anyhow::Result<()> {
    for record in extracted.records {
        frontier.admit(Task::detail(
            record.detail_page_url.clone(),
            record.name.clone(),
            record.index_page_url.clone(),
            record.page_number,
        ));
        writer.append_basic(record);
        report.basic_records += 1;
    }
    // Later pages may reference ordinals the first control did not show;
    // merge them through the same normalized locator so nothing is
    // fetched twice.
    for ordinal in extracted.ordinals {
        if ordinal <= ceiling {
            frontier.admit(Task::listing(
                listing_page_url(search_url, ordinal),
                ordinal + 1,
            ));
        }
    }
    Ok(())
}
