//! HTML table parsing for the aggregator's pages
//!
//! Each rule locates one table-like container and walks its rows:
//! - `listing`: coin listing page -> ticker index, exchange ranking page -> exchange index
//! - `markets`: coin markets table and per-exchange coin ranges -> ranked aggregates
//!
//! Parsers are synchronous and own the document tree for the duration of
//! the call; only owned results leave this module.

pub mod listing;
pub mod markets;


pub use listing::{parse_coin_listing, parse_exchange_index};
pub use markets::{
    parse_coin_markets, parse_exchange_detail, parse_exchange_section, ExchangeDetail,
    ExchangeSection,
};

use crate::error::{BotError, Result};
use crate::types::{MarketAggregate, Observation, Ranked};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};
use std::collections::HashMap;
use std::str::FromStr;

/// Underlying table rows per logical record (data row + spacer row)
pub const ROWS_PER_RECORD: usize = 2;

/// Cells in a market row: rank, name, pair, volume, price
const MARKET_ROW_CELLS: usize = 5;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d.]").expect("Invalid numeric strip regex"));

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("Invalid selector {}: {:?}", css, e))
}

/// Remove everything but ASCII digits and dots ("$12,345.67" -> "12345.67")
pub fn strip_numeric(text: &str) -> String {
    NON_NUMERIC.replace_all(text, "").into_owned()
}

fn checked_numeric(text: &str) -> Result<String> {
    let digits = strip_numeric(text);
    if digits.is_empty() || digits.matches('.').count() > 1 {
        return Err(BotError::malformed(format!(
            "not a number: {:?}",
            text.trim()
        )));
    }
    Ok(digits)
}

/// Integer part of a currency-formatted volume
pub fn parse_volume(text: &str) -> Result<u64> {
    let digits = checked_numeric(text)?;
    let integer = digits.split('.').next().unwrap_or_default();
    if integer.is_empty() {
        return Ok(0);
    }
    integer
        .parse()
        .map_err(|_| BotError::malformed(format!("volume out of range: {:?}", text.trim())))
}

/// Exact decimal value of a currency-formatted price
pub fn parse_price(text: &str) -> Result<Decimal> {
    let digits = checked_numeric(text)?;
    Decimal::from_str(&digits)
        .map_err(|e| BotError::malformed(format!("bad price {:?}: {}", text.trim(), e)))
}

/// Split "<rank>.<name>" text after removing all whitespace.
/// Returns (name, rank) with the name lowercased.
pub fn name_and_rank(text: &str) -> Option<(String, String)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let (rank, name) = compact.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), rank.to_string()))
}

pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Direct `<td>` children of a row
pub(crate) fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

/// First row of each `ROWS_PER_RECORD`-sized row group (data row, then spacer row)
pub(crate) fn record_rows<'a>(rows: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    rows.chunks(ROWS_PER_RECORD).map(|group| group[0]).collect()
}

/// Extract (counterpart name, observation) from a market row
pub(crate) fn parse_market_row(row: ElementRef<'_>, with_rank: bool) -> Result<(String, Observation)> {
    let cells = cells(row);
    if cells.len() < MARKET_ROW_CELLS {
        return Err(BotError::malformed(format!(
            "market row has {} cells, expected {}",
            cells.len(),
            MARKET_ROW_CELLS
        )));
    }

    let name = text_of(cells[1]);
    if name.is_empty() {
        return Err(BotError::malformed("market row without a name"));
    }

    let link = cells[2]
        .select(&ANCHOR)
        .next()
        .ok_or_else(|| BotError::malformed(format!("no trading pair link for {}", name)))?;
    let url = link
        .value()
        .attr("href")
        .ok_or_else(|| BotError::malformed(format!("trading pair link without href for {}", name)))?
        .to_string();
    let trading_pair = match text_of(link) {
        pair if pair.is_empty() => text_of(cells[2]),
        pair => pair,
    };

    let observation = Observation {
        trading_pair,
        volume: parse_volume(&text_of(cells[3]))?,
        price: parse_price(&text_of(cells[4]))?,
        url,
        rank: with_rank.then(|| text_of(cells[0])),
    };

    Ok((name, observation))
}

/// Group observations by counterpart name, keeping first-encounter order
pub(crate) fn aggregate<I>(observations: I) -> Ranked
where
    I: IntoIterator<Item = (String, Observation)>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Ranked = Vec::new();

    for (name, observation) in observations {
        match positions.get(&name) {
            Some(&idx) => entries[idx].1.push(observation),
            None => {
                positions.insert(name.clone(), entries.len());
                entries.push((name, MarketAggregate::new(observation)));
            }
        }
    }

    entries
}
