use serde::{Deserialize, Serialize};

pub use crate::logging::ResultExt;

/// One row of the country reference list: ISO 3166 numeric code, display
/// name, default withholding tax rate (fraction, e.g. 0.25) and the currency
/// dividends from that country are normally paid in. Used to prefill entry
/// defaults, never to alter the summary arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRef {
    pub code: String,
    pub name: String,
    pub default_tax_rate: f64,
    pub default_currency: String,
}

/// Countries a Slovak retail investor typically receives dividends from.
/// Anything else can be entered as free text or supplied via --countries.
pub fn default_reference_list() -> Vec<CountryRef> {
    [
        ("250", "France", 0.25, "EUR"),
        ("276", "Germany", 0.26375, "EUR"),
        ("372", "Ireland", 0.25, "EUR"),
        ("528", "Netherlands", 0.15, "EUR"),
        ("840", "United States", 0.15, "USD"),
    ]
    .iter()
    .map(|(code, name, tax, currency)| CountryRef {
        code: (*code).to_owned(),
        name: (*name).to_owned(),
        default_tax_rate: *tax,
        default_currency: (*currency).to_owned(),
    })
    .collect()
}

pub fn find_country<'a>(reference_list: &'a [CountryRef], name: &str) -> Option<&'a CountryRef> {
    reference_list.iter().find(|c| c.name == name)
}

/// Replaces the built-in table with one read from a JSON file. Content is
/// fully validated before being handed back, so a bad file never leaves the
/// caller with a half-read list.
pub fn load_reference_list(path: &str) -> Result<Vec<CountryRef>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| format!("Error: unable to open countries file: {path}"))?;
    let reference_list: Vec<CountryRef> = serde_json::from_str(&content)
        .map_err(|e| format!("Error: unable to parse countries file {path}: {e}"))?;
    reference_list.iter().try_for_each(|c| {
        if c.default_currency != "EUR" && c.default_currency != "USD" {
            return Err(format!(
                "Error: unsupported default currency {} for country {}",
                c.default_currency, c.name
            ));
        }
        if c.default_tax_rate < 0.0 {
            return Err(format!(
                "Error: negative default tax rate for country {}",
                c.name
            ));
        }
        Ok(())
    })?;
    log::info!("Loaded {} countries from {}", reference_list.len(), path);
    Ok(reference_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_reference_list_lookup() {
        let reference_list = default_reference_list();
        let france = find_country(&reference_list, "France").unwrap();
        assert_eq!(france.code, "250");
        assert_eq!(france.default_tax_rate, 0.25);
        assert_eq!(france.default_currency, "EUR");

        let us = find_country(&reference_list, "United States").unwrap();
        assert_eq!(us.code, "840");
        assert_eq!(us.default_currency, "USD");

        assert_eq!(find_country(&reference_list, "Atlantis"), None);
    }

    #[test]
    fn test_load_reference_list() -> Result<(), String> {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| e.to_string())?;
        file.write_all(
            br#"[{"code":"250","name":"France","default_tax_rate":0.128,"default_currency":"EUR"}]"#,
        )
        .map_err(|e| e.to_string())?;

        let reference_list = load_reference_list(file.path().to_str().unwrap())?;
        assert_eq!(reference_list.len(), 1);
        assert_eq!(reference_list[0].default_tax_rate, 0.128);
        Ok(())
    }

    #[test]
    fn test_load_reference_list_bad_currency() -> Result<(), String> {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| e.to_string())?;
        file.write_all(
            br#"[{"code":"756","name":"Switzerland","default_tax_rate":0.35,"default_currency":"CHF"}]"#,
        )
        .map_err(|e| e.to_string())?;

        let result = load_reference_list(file.path().to_str().unwrap());
        assert_eq!(
            result.err(),
            Some("Error: unsupported default currency CHF for country Switzerland".to_owned())
        );
        Ok(())
    }

    #[test]
    fn test_load_reference_list_malformed() -> Result<(), String> {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| e.to_string())?;
        file.write_all(b"not json at all").map_err(|e| e.to_string())?;

        assert!(load_reference_list(file.path().to_str().unwrap()).is_err());
        Ok(())
    }
}
