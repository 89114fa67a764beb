use crate::DividendEntry;

/// Ordered collection of dividend entries owned by one session. Grows by
/// append, or is wholesale replaced by a backup load; there is no in-place
/// edit or delete. The summary is always recomputed from the full contents,
/// never stored here.
#[derive(Debug, Default, PartialEq)]
pub struct DividendLedger {
    entries: Vec<DividendEntry>,
}

impl DividendLedger {
    pub fn new() -> Self {
        DividendLedger { entries: vec![] }
    }

    pub fn append(&mut self, entry: DividendEntry) {
        log::info!("{}", entry.format_to_print("ADDING"));
        self.entries.push(entry);
    }

    pub fn replace(&mut self, entries: Vec<DividendEntry>) {
        log::info!("Replacing ledger of {} entries with {}", self.entries.len(), entries.len());
        self.entries = entries;
    }

    pub fn entries(&self) -> &[DividendEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/* Check:
that amounts are non negative
that tax rates are non negative (no upper bound, rates above 100% are legal input)
*/
pub fn verify_dividend_entries(entries: &[DividendEntry]) -> Result<(), String> {
    let mut errors = Vec::<String>::new();

    for (idx, entry) in entries.iter().enumerate() {
        if entry.amount.value() < 0.0 {
            errors.push(format!(
                "Negative dividend amount at entry {}: {} {}",
                idx + 1,
                entry.amount.value(),
                entry.amount.code()
            ));
        }
        if entry.tax_rate_percent < 0.0 {
            errors.push(format!(
                "Negative tax rate at entry {}: {}",
                idx + 1,
                entry.tax_rate_percent
            ));
        }
    }

    if errors.len() > 0 {
        return Err(errors.join("\n"));
    }
    Ok(())
}
