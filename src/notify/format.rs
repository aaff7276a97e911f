//! Chat message formatting
//!
//! Markdown tables for lookup results, plus splitting of long replies
//! into messages under the Telegram length limit.

use crate::config::SourceConfig;
use crate::types::{ExchangeEntry, PairRow, Ranked};
use rust_decimal::Decimal;

/// Telegram's maximum message length in characters
pub const MAX_MESSAGE_LEN: usize = 4096;

pub const HELP_TEXT: &str = "Hi and welcome to the exchange explorer bot! The 3 main commands \
that are supported by this bot are:\n\n\
1. /e ticker - To determine the top 10 exchanges that this coin is traded on and its \
cumulative 24 hour rolling trade volume.\n\
2. /m ticker - To determine the top 10 cheapest trading pairs for this coin from the most \
liquid exchanges that this coin trades on.\n\
3. /t exchange_name - To determine the 24 hour rolling trade volume and the top traded \
pairs for the specified exchange.\n\n\
Run /updateDB to refresh the list of known coins and exchanges.";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// "$1,234,567"
pub fn dollars(amount: u64) -> String {
    format!("${}", group_thousands(&amount.to_string()))
}

/// "$60,010.5" - grouped integer part, fraction without trailing zeros
pub fn dollars_decimal(amount: Decimal) -> String {
    let text = amount.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    match unsigned.split_once('.') {
        Some((int, frac)) => format!("{}${}.{}", sign, group_thousands(int), frac),
        None => format!("{}${}", sign, group_thousands(unsigned)),
    }
}

/// Escape characters that legacy Telegram Markdown treats as entity markers
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn link(label: &str, url: &str) -> String {
    format!("[{}]({})", escape_markdown(label), url)
}

/// "Exchange | Volume" table for a coin's ranked exchanges
pub fn coin_exchanges(exchanges: &Ranked, source: &SourceConfig) -> String {
    let mut lines = vec!["Exchange | Volume".to_string()];
    for (name, agg) in exchanges {
        let url = source.url_for(&agg.primary().url);
        lines.push(format!("{} | {}", link(name, &url), dollars(agg.total_volume())));
    }
    lines.join("\n")
}

fn pair_line(row: &PairRow, source: &SourceConfig) -> String {
    format!(
        "{} | {} | {} | {}",
        escape_markdown(&row.name),
        link(&row.trading_pair, &source.url_for(&row.url)),
        dollars(row.volume),
        dollars_decimal(row.price)
    )
}

/// "Exchange | Trading Pair | Volume | Price" table
pub fn cheapest_pairs(rows: &[PairRow], source: &SourceConfig) -> String {
    let mut lines = vec!["Exchange | Trading Pair | Volume | Price".to_string()];
    lines.extend(rows.iter().map(|row| pair_line(row, source)));
    lines.join("\n")
}

/// Exchange summary followed by its pairs
pub fn exchange_summary(
    display_name: &str,
    entry: &ExchangeEntry,
    rows: &[PairRow],
    source: &SourceConfig,
) -> String {
    let mut lines = vec![
        format!("Name: {}", link(display_name, &entry.url)),
        format!("Rank: {}", entry.rank),
        format!("Volume: {}", entry.volume),
        String::new(),
        "Coin | Trading Pair | Vol | Price".to_string(),
    ];
    lines.extend(rows.iter().map(|row| pair_line(row, source)));
    lines.join("\n")
}

/// Split `text` into messages of at most `limit` characters, breaking on
/// line boundaries where possible
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    // A chunk holding only a blank line is still a chunk with content
    let mut has_lines = false;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > limit {
            if has_lines {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                has_lines = false;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if has_lines && current_len + 1 + line_len > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
            has_lines = false;
        }
        if has_lines {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
        has_lines = true;
    }

    // Telegram rejects empty messages
    if has_lines && !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
