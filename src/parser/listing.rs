//! Listing pages: full coin listing and exchange volume ranking

use super::{name_and_rank, record_rows, selector, text_of};
use crate::client::Page;
use crate::error::{BotError, Result};
use crate::storage::TickerIndex;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static LISTING_ROWS: Lazy<Selector> =
    Lazy::new(|| selector("table#currencies-all > tbody > tr"));
static LISTING_TABLE: Lazy<Selector> = Lazy::new(|| selector("table#currencies-all"));
static SYMBOL_CELL: Lazy<Selector> = Lazy::new(|| selector("td.col-symbol"));
static NAME_LINK: Lazy<Selector> = Lazy::new(|| selector("a.currency-name-container"));

static RANKING_TABLE: Lazy<Selector> =
    Lazy::new(|| selector("table.table-condensed.border-top"));
static ROWS: Lazy<Selector> = Lazy::new(|| selector("tr"));

/// Build the ticker -> detail path index from the coin listing page
pub fn parse_coin_listing(page: &Page) -> Result<TickerIndex> {
    let doc = page.document();
    if doc.select(&LISTING_TABLE).next().is_none() {
        return Err(BotError::malformed(format!(
            "currencies-all table missing on {}",
            page.url
        )));
    }

    let rows: Vec<ElementRef<'_>> = doc.select(&LISTING_ROWS).collect();
    let entries = record_rows(&rows).into_iter().filter_map(|row| {
        let ticker = row.select(&SYMBOL_CELL).next().map(text_of)?;
        let path = row
            .select(&NAME_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))?;
        if ticker.is_empty() {
            return None;
        }
        Some((ticker, path.to_string()))
    });

    Ok(TickerIndex::from_entries(entries))
}

/// Rows of the exchange ranking table, in document order
pub(crate) fn ranking_rows(doc: &Html) -> Option<Vec<ElementRef<'_>>> {
    let table = doc.select(&RANKING_TABLE).next()?;
    Some(table.select(&ROWS).collect())
}

/// Exchange header rows carry an `id` attribute
pub(crate) fn is_exchange_header(row: ElementRef<'_>) -> bool {
    row.value().attr("id").is_some()
}

/// Lowercase exchange names from the exchange ranking page, rank discarded
pub fn parse_exchange_index(page: &Page) -> Result<Vec<String>> {
    let doc = page.document();
    let rows = ranking_rows(&doc).ok_or_else(|| {
        BotError::malformed(format!("exchange ranking table missing on {}", page.url))
    })?;

    Ok(rows
        .into_iter()
        .filter(|row| is_exchange_header(*row))
        .filter_map(|row| name_and_rank(&row.text().collect::<String>()))
        .map(|(name, _rank)| name)
        .collect())
}
