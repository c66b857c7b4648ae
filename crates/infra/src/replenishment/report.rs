//! Renders the rows that need replenishment into one notification message.
//!
//! Pure and deterministic: the same rows, instant, prefix and flag always
//! produce the same message.

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};

use restock_inventory::{BuyReference, ReasonCode};

use super::summary::CheckRow;
use crate::ports::NotificationMessage;

const DAYS_LEFT_UNKNOWN: &str = "n/a";
const EMPTY_CELL: &str = "-";

const DRY_RUN_NOTICE: &str = "DRY RUN: nothing was saved and this message was not sent.";

const COLUMNS: [&str; 7] = [
    "Item",
    "Brand",
    "Stock",
    "Days left",
    "Replenish by",
    "Order qty",
    "Buy at",
];

/// Build the batch report.
///
/// Rows are grouped by reason (depleted first, then running low) and ordered
/// by replenish-by date, then name, inside each group.
pub fn build_report(
    rows: &[&CheckRow],
    generated_at: DateTime<Utc>,
    subject_prefix: &str,
    dry_run: bool,
) -> NotificationMessage {
    let date = generated_at.date_naive();
    let subject = format!(
        "{} {} item(s) need replenishment — {}",
        subject_prefix.trim(),
        rows.len(),
        date.format("%Y-%m-%d")
    );

    let mut ordered = rows.to_vec();
    ordered.sort_by(|a, b| compare_rows(a, b));

    let groups = group_rows(&ordered);

    NotificationMessage {
        subject,
        rich_body: Some(render_rich(&groups, rows.len(), date, dry_run)),
        plain_body: Some(render_plain(&groups, rows.len(), date, dry_run)),
    }
}

fn group_rank(reason: ReasonCode) -> u8 {
    match reason {
        ReasonCode::DepletedOrInvalid => 0,
        ReasonCode::WithinTargetWindow => 1,
        _ => 2,
    }
}

fn group_title(reason: ReasonCode) -> &'static str {
    match reason {
        ReasonCode::DepletedOrInvalid => "Out of stock",
        ReasonCode::WithinTargetWindow => "Running low",
        _ => "Other",
    }
}

fn compare_rows(a: &CheckRow, b: &CheckRow) -> Ordering {
    group_rank(a.decision.reason_code)
        .cmp(&group_rank(b.decision.reason_code))
        .then_with(|| compare_dates(a.decision.replenish_by_date, b.decision.replenish_by_date))
        .then_with(|| a.name.cmp(&b.name))
}

// Rows without a date sort after dated ones.
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn group_rows<'a>(ordered: &[&'a CheckRow]) -> Vec<(&'static str, Vec<&'a CheckRow>)> {
    let mut groups: Vec<(&'static str, Vec<&'a CheckRow>)> = Vec::new();
    for &row in ordered {
        let title = group_title(row.decision.reason_code);
        match groups.last_mut() {
            Some((current, members)) if *current == title => members.push(row),
            _ => groups.push((title, vec![row])),
        }
    }
    groups
}

/// Display cells of one row, unescaped.
struct Cells {
    name: String,
    brand: String,
    stock: String,
    days_left: String,
    replenish_by: String,
    order_qty: String,
}

impl Cells {
    fn of(row: &CheckRow) -> Self {
        let unit = row.unit.symbol();
        let stock = if row.decision.current_stock == row.quantity_remaining {
            format!("{} {unit}", format_qty(row.quantity_remaining))
        } else {
            format!(
                "{} {unit} (recorded {})",
                format_qty(row.decision.current_stock),
                format_qty(row.quantity_remaining)
            )
        };
        Self {
            name: row.name.clone(),
            brand: row.brand.clone().unwrap_or_else(|| EMPTY_CELL.to_string()),
            stock,
            days_left: row
                .decision
                .days_until_depletion
                .map(|d| format!("{d:.1}"))
                .unwrap_or_else(|| DAYS_LEFT_UNKNOWN.to_string()),
            replenish_by: row
                .decision
                .replenish_by_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            order_qty: row
                .decision
                .recommended_order_qty
                .map(|q| format!("{} {unit}", format_qty(q)))
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
        }
    }
}

fn render_plain(
    groups: &[(&'static str, Vec<&CheckRow>)],
    count: usize,
    date: NaiveDate,
    dry_run: bool,
) -> String {
    let mut out = String::new();
    if dry_run {
        let _ = writeln!(out, "{DRY_RUN_NOTICE}\n");
    }
    let _ = writeln!(out, "{count} item(s) need replenishment as of {date}.");

    for (title, rows) in groups {
        let _ = writeln!(out, "\n{title}:");
        for row in rows {
            let cells = Cells::of(row);
            let _ = writeln!(
                out,
                "- {} ({}): stock {}, {} days left, replenish by {}, order {}, buy at {}",
                cells.name,
                cells.brand,
                cells.stock,
                cells.days_left,
                cells.replenish_by,
                cells.order_qty,
                plain_reference(row.buy_reference.as_ref()),
            );
        }
    }
    out
}

fn render_rich(
    groups: &[(&'static str, Vec<&CheckRow>)],
    count: usize,
    date: NaiveDate,
    dry_run: bool,
) -> String {
    let mut out = String::new();
    if dry_run {
        let _ = writeln!(out, "<p><strong>{}</strong></p>", escape_html(DRY_RUN_NOTICE));
    }
    let _ = writeln!(out, "<p>{count} item(s) need replenishment as of {date}.</p>");

    for (title, rows) in groups {
        let _ = writeln!(out, "<h3>{}</h3>", escape_html(title));
        out.push_str("<table>\n<thead><tr>");
        for column in COLUMNS {
            let _ = write!(out, "<th>{column}</th>");
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for row in rows {
            let cells = Cells::of(row);
            out.push_str("<tr>");
            for text in [
                &cells.name,
                &cells.brand,
                &cells.stock,
                &cells.days_left,
                &cells.replenish_by,
                &cells.order_qty,
            ] {
                let _ = write!(out, "<td>{}</td>", escape_html(text));
            }
            let _ = write!(out, "<td>{}</td>", rich_reference(row.buy_reference.as_ref()));
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
    }
    out
}

fn plain_reference(reference: Option<&BuyReference>) -> String {
    match reference.map(|r| (r.place.as_deref(), r.url.as_deref())) {
        Some((Some(place), Some(url))) => format!("{place} <{url}>"),
        Some((Some(place), None)) => place.to_string(),
        Some((None, Some(url))) => url.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

fn rich_reference(reference: Option<&BuyReference>) -> String {
    match reference.map(|r| (r.place.as_deref(), r.url.as_deref())) {
        Some((place, Some(url))) => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            escape_html(place.unwrap_or(url))
        ),
        Some((Some(place), None)) => escape_html(place),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Up to two decimals, without trailing zeros.
fn format_qty(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
