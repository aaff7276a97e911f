//! Market tables: a coin's exchanges and an exchange's coins

use super::listing::{is_exchange_header, ranking_rows};
use super::{
    aggregate, cells, name_and_rank, parse_market_row, record_rows, selector, text_of, ANCHOR,
    MARKET_ROW_CELLS,
};
use crate::client::Page;
use crate::error::{BotError, Result};
use crate::types::{rank_by_volume, Ranked, TOP_N};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static MARKETS_TABLE: Lazy<Selector> = Lazy::new(|| selector("table#markets-table"));
static MARKETS_ROWS: Lazy<Selector> =
    Lazy::new(|| selector("table#markets-table > tbody > tr"));
static HEADING_CELL: Lazy<Selector> = Lazy::new(|| selector("th"));
static LINK_LIST: Lazy<Selector> = Lazy::new(|| selector("ul.list-unstyled"));
static VOLUME_BLOCK: Lazy<Selector> =
    Lazy::new(|| selector("div.col-sm-8.bottom-margin-1x .h2"));

/// Top exchanges for a coin, by total volume across all of its pairs
pub fn parse_coin_markets(page: &Page) -> Result<Ranked> {
    let doc = page.document();
    if doc.select(&MARKETS_TABLE).next().is_none() {
        return Err(BotError::malformed(format!(
            "markets-table missing on {}",
            page.url
        )));
    }

    let rows: Vec<ElementRef<'_>> = doc.select(&MARKETS_ROWS).collect();
    let observations = record_rows(&rows)
        .into_iter()
        .map(|row| parse_market_row(row, false))
        .collect::<Result<Vec<_>>>()?;

    Ok(rank_by_volume(aggregate(observations), TOP_N))
}

/// One exchange's block on the exchange ranking page
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSection {
    pub rank: String,
    /// Link to the exchange's own detail page
    pub detail_path: String,
    pub coins: Ranked,
}

/// Summary shown on an exchange's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDetail {
    pub url: String,
    pub volume: String,
}

enum RowRole {
    Heading,
    Boundary,
    Market,
    Other,
}

fn row_role(row: ElementRef<'_>) -> RowRole {
    if row.select(&HEADING_CELL).next().is_some() {
        return RowRole::Heading;
    }
    let text = text_of(row);
    if text.starts_with("Total") || text == "View More" {
        return RowRole::Boundary;
    }
    if cells(row).len() >= MARKET_ROW_CELLS {
        RowRole::Market
    } else {
        RowRole::Other
    }
}

/// Locate `exchange` on the ranking page and aggregate the coin rows
/// between its header row and the next one.
///
/// Returns `Ok(None)` when the page has no header row for the exchange.
pub fn parse_exchange_section(page: &Page, exchange: &str) -> Result<Option<ExchangeSection>> {
    let doc = page.document();
    let rows = ranking_rows(&doc).ok_or_else(|| {
        BotError::malformed(format!("exchange ranking table missing on {}", page.url))
    })?;

    let found = rows.iter().enumerate().find_map(|(idx, row)| {
        if !is_exchange_header(*row) {
            return None;
        }
        match name_and_rank(&row.text().collect::<String>()) {
            Some((name, rank)) if name == exchange => Some((idx, rank)),
            _ => None,
        }
    });
    let Some((start, rank)) = found else {
        return Ok(None);
    };

    let header = rows[start];
    let detail_path = header
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| BotError::malformed(format!("no detail link for exchange {}", exchange)))?
        .to_string();

    let mut observations = Vec::new();
    for row in rows[start + 1..]
        .iter()
        .take_while(|row| !is_exchange_header(**row))
    {
        match row_role(*row) {
            RowRole::Market => observations.push(parse_market_row(*row, true)?),
            RowRole::Heading | RowRole::Boundary | RowRole::Other => {}
        }
    }

    Ok(Some(ExchangeSection {
        rank,
        detail_path,
        coins: rank_by_volume(aggregate(observations), TOP_N),
    }))
}

/// Website url and displayed 24h volume from an exchange's detail page
pub fn parse_exchange_detail(page: &Page) -> Result<ExchangeDetail> {
    let doc = page.document();

    let url = doc
        .select(&LINK_LIST)
        .next()
        .and_then(|list| list.select(&ANCHOR).next())
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| BotError::malformed(format!("exchange website link missing on {}", page.url)))?
        .to_string();

    let volume = doc
        .select(&VOLUME_BLOCK)
        .next()
        .map(text_of)
        .ok_or_else(|| BotError::malformed(format!("exchange volume missing on {}", page.url)))?;

    Ok(ExchangeDetail { url, volume })
}
