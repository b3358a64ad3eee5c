//! Plain-text rendering of items, totals and history for the terminal.

use crate::calc::{self, ItemPreview, Totals};
use crate::config::AppConfig;
use crate::models::{Item, SnapshotSummary};

/// Number of id characters shown; enough to pass back as a prefix.
const SHORT_ID_LEN: usize = 8;

/// Currency formatting, e.g. `R$ 1.234,50`.
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    symbol: String,
    decimal_separator: char,
    thousands_separator: char,
}

impl MoneyFormat {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            symbol: config.currency_symbol.clone(),
            decimal_separator: config.decimal_separator,
            thousands_separator: config.thousands_separator,
        }
    }

    pub fn format(&self, amount: f64) -> String {
        let cents = (calc::round_cents(amount).abs() * 100.0).round() as u64;
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        format!(
            "{}{} {}{}{:02}",
            sign,
            self.symbol,
            group_thousands(cents / 100, self.thousands_separator),
            self.decimal_separator,
            cents % 100
        )
    }
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

/// Render the item list as an aligned table.
///
/// Example output:
/// ```text
/// ID        DESCRIPTION  QTY  UNIT PRICE  DISC.  SUBTOTAL
/// 3f2a9c1e  Consulting     2   R$ 100,00    10%  R$ 180,00
/// ```
pub fn render_items(items: &[Item], money: &MoneyFormat) -> String {
    if items.is_empty() {
        return "No items.\n".to_string();
    }

    let rows: Vec<[String; 6]> = items
        .iter()
        .map(|item| {
            [
                short_id(&item.id()),
                item.description().to_string(),
                item.quantity().to_string(),
                money.format(item.unit_price()),
                format!("{}%", item.discount_percent()),
                money.format(item.subtotal()),
            ]
        })
        .collect();

    let header = ["ID", "DESCRIPTION", "QTY", "UNIT PRICE", "DISC.", "SUBTOTAL"].map(String::from);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                // Text columns align left, amounts right
                if col < 2 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

pub fn render_totals(totals: &Totals, money: &MoneyFormat) -> String {
    format!(
        "Subtotal:  {}\nDiscounts: {}\nTotal:     {}\n",
        money.format(totals.subtotal),
        money.format(totals.discount_total),
        money.format(totals.total)
    )
}

pub fn render_preview(preview: &ItemPreview, money: &MoneyFormat) -> String {
    format!(
        "Subtotal: {}\nTotal:    {}\n",
        money.format(preview.gross),
        money.format(preview.net)
    )
}

pub fn render_history(entries: &[SnapshotSummary], money: &MoneyFormat) -> String {
    if entries.is_empty() {
        return "No saved budgets.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        let noun = if entry.item_count == 1 { "item" } else { "items" };
        output.push_str(&format!(
            "{}  {}  {} {}  {}\n",
            short_id(&entry.id),
            entry.date.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.item_count,
            noun,
            money.format(entry.total)
        ));
    }
    output
}
