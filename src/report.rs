use crate::{CountrySummary, DividendEntry, EsppSummary};

/// Plain text table with per column widths sized to the longest cell,
/// columns separated by two spaces, a ─ rule under the header.
fn render_table(title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_row = header
        .iter()
        .enumerate()
        .map(|(idx, h)| format!("{h:<width$}", width = widths[idx]))
        .collect::<Vec<String>>()
        .join("  ");
    let separator = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<String>>()
        .join("  ");
    let body = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, cell)| format!("{cell:<width$}", width = widths[idx]))
                .collect::<Vec<String>>()
                .join("  ")
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("{title}\n\n{header_row}\n{separator}\n{body}")
}

pub fn render_entries(entries: &[DividendEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.country.clone(),
                format!("{:.2}", entry.amount.value()),
                entry.amount.code().to_owned(),
                format!("{:.2}", entry.tax_rate_percent),
                entry.source.as_str().to_owned(),
            ]
        })
        .collect();
    render_table(
        "DIVIDEND ENTRIES",
        &["Country", "Dividends", "Currency", "Tax %", "Source"],
        &rows,
    )
}

pub fn render_summary(summary: &[CountrySummary]) -> String {
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|s| {
            vec![
                s.country.clone(),
                format!("{:.2}", s.dividends_eur),
                format!("{:.2}", s.after_tax_eur),
                format!("{:.2}", s.dividends_usd),
            ]
        })
        .collect();
    render_table(
        "DIVIDEND SUMMARY",
        &[
            "Country",
            "Dividends (EUR)",
            "After Tax Dividends (EUR)",
            "Dividends (USD)",
        ],
        &rows,
    )
}

pub fn render_espp_summary(summary: &EsppSummary) -> String {
    let row = vec![vec![
        format!("{:.2}", summary.latest_price),
        format!("{:.2}", summary.portfolio_value_eur),
        format!("{:.2}", summary.portfolio_value_usd),
        format!("{:.2}", summary.gain_eur),
        format!("{:.2}", summary.gain_usd),
    ]];
    render_table(
        "ESPP PORTFOLIO SUMMARY",
        &[
            "Share Price",
            "Portfolio Value (EUR)",
            "Portfolio Value (USD)",
            "Gain (EUR)",
            "Gain (USD)",
        ],
        &row,
    )
}
