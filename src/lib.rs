// SPDX-FileCopyrightText: 2022-2025 RustInFinance
// SPDX-License-Identifier: BSD-3-Clause

mod backup;
mod countries;
mod ecb;
mod espp;
mod ledger;
mod logging;
mod report;
mod xlsxparser;

type ReqwestClient = reqwest::blocking::Client;

pub use backup::{load_backup, save_backup};
pub use countries::{default_reference_list, find_country, load_reference_list, CountryRef};
pub use ecb::get_usd_per_eur_rate;
pub use espp::EsppSummary;
pub use ledger::{verify_dividend_entries, DividendLedger};
pub use logging::{init_logging_infrastructure, ResultExt};
pub use report::{render_entries, render_espp_summary, render_summary};

#[derive(Debug, PartialEq, PartialOrd, Copy, Clone)]
pub enum Currency {
    EUR(f64),
    USD(f64),
}

impl Currency {
    pub fn value(&self) -> f64 {
        match self {
            Currency::EUR(val) => *val,
            Currency::USD(val) => *val,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR(_) => "EUR",
            Currency::USD(_) => "USD",
        }
    }

    pub fn from_code(code: &str, value: f64) -> Result<Currency, String> {
        match code {
            "EUR" => Ok(Currency::EUR(value)),
            "USD" => Ok(Currency::USD(value)),
            _ => Err(format!("Error: unsupported currency: {code}")),
        }
    }

    /// EUR equivalent given a USD per EUR conversion rate. Positivity of the
    /// rate is checked by summarize before any entry is converted.
    fn in_eur(&self, conversion_rate: f64) -> f64 {
        match self {
            Currency::EUR(val) => *val,
            Currency::USD(val) => *val / conversion_rate,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Copy, Clone)]
pub enum Source {
    Ibkr,
    Revolut,
    Schwab,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Ibkr => "IBKR",
            Source::Revolut => "Revolut",
            Source::Schwab => "Schwab",
        }
    }

    pub fn from_str(name: &str) -> Result<Source, String> {
        match name {
            "IBKR" => Ok(Source::Ibkr),
            "Revolut" => Ok(Source::Revolut),
            "Schwab" => Ok(Source::Schwab),
            _ => Err(format!("Error: unsupported dividend source: {name}")),
        }
    }
}

/// One manually recorded dividend payment. Country is the literal display
/// string as entered; two spellings of the same country are two countries.
#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub struct DividendEntry {
    pub country: String,
    pub amount: Currency,
    pub tax_rate_percent: f64,
    pub source: Source,
}

impl DividendEntry {
    pub fn format_to_print(&self, prefix: &str) -> String {
        let amount = match self.amount {
            Currency::EUR(val) => format!("€{val:.2}"),
            Currency::USD(val) => format!("${val:.2}"),
        };
        format!(
            "{prefix} DIVIDEND country: {}, amount: {amount}, tax rate: {:.2}%, source: {}",
            self.country,
            self.tax_rate_percent,
            self.source.as_str()
        )
    }
}

/// Per country aggregate over the entries, in the order countries first
/// appear in the input.
#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub struct CountrySummary {
    pub country: String,
    pub dividends_eur: f64,
    pub after_tax_eur: f64,
    pub dividends_usd: f64,
}

/// Aggregates dividend entries per country.
///
/// conversion_rate is USD per EUR (e.g. 1.08). EUR amounts pass through
/// unchanged, USD amounts are divided by the rate. after_tax applies the
/// entry's own withholding rate; rates above 100% are accepted as entered
/// and simply go negative. The USD column is the sum of original USD
/// amounts of that country's USD-denominated entries, so nothing is lost
/// when a dividend is recorded under a country that usually pays in EUR.
///
/// A country missing from the reference list only produces a warning; its
/// sums are computed like any other.
pub fn summarize(
    entries: &[DividendEntry],
    conversion_rate: f64,
    reference_list: &[CountryRef],
) -> Result<Vec<CountrySummary>, String> {
    // NaN fails this comparison too
    if !(conversion_rate > 0.0) {
        return Err(format!(
            "Error: USD to EUR conversion rate must be positive, got: {conversion_rate}"
        ));
    }

    let mut summaries: Vec<CountrySummary> = Vec::new();
    for entry in entries {
        let amount_eur = entry.amount.in_eur(conversion_rate);
        let after_tax_eur = amount_eur * (1.0 - entry.tax_rate_percent / 100.0);
        let amount_usd = match entry.amount {
            Currency::USD(val) => val,
            Currency::EUR(_) => 0.0,
        };

        match summaries.iter_mut().find(|s| s.country == entry.country) {
            Some(summary) => {
                summary.dividends_eur += amount_eur;
                summary.after_tax_eur += after_tax_eur;
                summary.dividends_usd += amount_usd;
            }
            None => {
                if find_country(reference_list, &entry.country).is_none() {
                    log::warn!(
                        "Country not on the reference list, summing anyway: {}",
                        entry.country
                    );
                }
                summaries.push(CountrySummary {
                    country: entry.country.clone(),
                    dividends_eur: amount_eur,
                    after_tax_eur: after_tax_eur,
                    dividends_usd: amount_usd,
                });
            }
        }
    }
    Ok(summaries)
}

pub struct TaxReportResult {
    pub ledger: DividendLedger,
    pub summary: Vec<CountrySummary>,
    pub espp_summary: Option<EsppSummary>,
}

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;

/* Check:
if file names have no duplicates
if there is only one xlsx spreadsheet
if extensions are only json, csv, xlsx
*/
pub fn validate_file_names(files: &Vec<String>) -> Result<(), String> {
    let mut names_set = HashSet::new();
    let mut spreadsheet_count = 0;
    let mut errors = Vec::<String>::new();

    for file_str in files {
        let path = Path::new(&file_str);
        if !path.is_file() {
            errors.push(format!("Not a file or path doesn't exist: {}", file_str));
            continue;
        }

        if let Some(file_stem) = path.file_stem().and_then(OsStr::to_str) {
            if !names_set.insert(file_stem.to_owned()) {
                let file_name = path.file_name().and_then(OsStr::to_str).unwrap();
                errors.push(format!("Duplicate file name found: {}", file_name));
            }
        } else {
            errors.push(format!("File has no name: {}", file_str));
        }

        match path.extension().and_then(OsStr::to_str) {
            Some("xlsx") => spreadsheet_count += 1,
            Some("json") | Some("csv") => {},
            Some(other_ext) => errors.push(format!("Unexpected extension {other_ext} for file: {file_str}. Only json, csv and xlsx are expected.")),
            None => errors.push(format!("File has no extension: {}", file_str))
        }
    }

    if spreadsheet_count > 1 {
        errors.push(format!(
            "Expected a single xlsx spreadsheet, found: {}",
            spreadsheet_count
        ));
    }

    if errors.len() > 0 {
        return Err(errors.join("\n"));
    }
    Ok(())
}

/// Loads the given backup and spreadsheet files, recomputes the per country
/// summary once, and computes the ESPP report when a spreadsheet and a share
/// price are both available. The ledger is only ever mutated with fully
/// parsed and verified collections, so a bad file aborts the run with the
/// ledger contents intact.
pub fn run_report(
    names: &Vec<String>,
    conversion_rate: f64,
    latest_price: Option<f64>,
    reference_list: &[CountryRef],
) -> Result<TaxReportResult, String> {
    validate_file_names(names)?;

    let mut ledger = DividendLedger::new();
    let mut espp_purchases: Vec<espp::EsppPurchase> = vec![];

    // 1. Load backups and the ESPP spreadsheet
    names.iter().try_for_each(|x| {
        if x.ends_with(".json") || x.ends_with(".csv") {
            let entries = load_backup(x)?;
            verify_dividend_entries(&entries)?;
            log::info!("Loaded {} dividend entries from {x}", entries.len());
            entries.into_iter().for_each(|e| ledger.append(e));
        } else if x.ends_with(".xlsx") {
            espp_purchases = xlsxparser::parse_espp_purchases(x)?;
            log::info!("Loaded {} ESPP purchases from {x}", espp_purchases.len());
        } else {
            return Err(format!("Error: Unable to open a file: {x}"));
        }
        Ok::<(), String>(())
    })?;

    // 2. Recompute the summary from the full ledger
    let summary = summarize(ledger.entries(), conversion_rate, reference_list)?;

    // 3. ESPP report needs a current share price
    let espp_summary = match (espp_purchases.is_empty(), latest_price) {
        (false, Some(price)) => Some(espp::compute_espp_summary(
            &espp_purchases,
            price,
            conversion_rate,
        )?),
        (false, None) => {
            log::warn!("ESPP spreadsheet given but no share price, skipping ESPP report");
            None
        }
        (true, _) => None,
    };

    Ok(TaxReportResult {
        ledger,
        summary,
        espp_summary,
    })
}
