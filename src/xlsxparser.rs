use calamine::{open_workbook, Reader, Xlsx};

pub use crate::espp::EsppPurchase;
pub use crate::logging::ResultExt;

// Disclaimer lines the broker scatters around the purchase table
const BOILERPLATE: [&str; 6] = [
    "Date as of:",
    "Please note:",
    "All amount fields are in US Dollars.",
    "Cisco provides the information",
    "In addition, the information",
    "Please notify People Support Services",
];

/// Strips $ and thousand separators from a spreadsheet cell so that
/// "$1,234.50" parses as 1234.5. Numeric cells are taken as is.
fn cell_to_f64(cell: &calamine::DataType) -> Option<f64> {
    if let Some(val) = cell.get_float() {
        return Some(val);
    }
    let cleaned = cell.get_string()?.replace('$', "").replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// This function parses a My_ESPP_Purchases spreadsheet for purchase details
/// and returns found purchases in a form:
/// date when shares were purchased (purchase_date)
/// number of shares bought in that offering (shares)
/// discounted price actually paid per share (purchase_price)
/// fair market value at the offering date (offering_fmv)
///
/// The header row can sit anywhere below the report preamble; disclaimer
/// rows, summary "Total" rows and rows without a purchase date are dropped.
pub fn parse_espp_purchases(xlsxtoparse: &str) -> Result<Vec<EsppPurchase>, String> {
    let mut excel: Xlsx<_> = open_workbook(xlsxtoparse)
        .map_err(|_| format!("Error opening XLSX file: {xlsxtoparse}"))?;
    let name = excel
        .sheet_names()
        .first()
        .ok_or("No worksheet found")?
        .clone();
    log::info!("name: {}", name);

    let mut purchases: Vec<EsppPurchase> = vec![];
    if let Some(Ok(r)) = excel.worksheet_range(&name) {
        let mut rows = r.rows();

        // Find the descriptive row; everything above it is report preamble
        let mut purchase_date_idx = 0;
        let mut shares_idx = 0;
        let mut purchase_price_idx = 0;
        let mut offering_fmv_idx = 0;
        let mut found_header = false;
        for categories in rows.by_ref() {
            let mut idx = 0;
            for c in categories {
                if let Some(v) = c.get_string() {
                    match v {
                        "Purchase Date" => {
                            purchase_date_idx = idx;
                            found_header = true;
                        }
                        "Shares Purchased" => shares_idx = idx,
                        "Purchase Price" => purchase_price_idx = idx,
                        "Offering Date FMV" => offering_fmv_idx = idx,
                        _ => (),
                    }
                }
                idx = idx + 1;
            }
            if found_header {
                break;
            }
        }
        if !found_header {
            return Err(format!(
                "Error: no Purchase Date header found in: {xlsxtoparse}"
            ));
        }

        for purchase in rows {
            let date = match purchase[purchase_date_idx].get_string() {
                Some(d) if d.trim().is_empty() == false => d.trim().to_owned(),
                // Disclaimer rows and padding have no date
                _ => continue,
            };
            if date.starts_with("Total") || BOILERPLATE.iter().any(|b| date.contains(b)) {
                continue;
            }

            let shares = cell_to_f64(&purchase[shares_idx])
                .ok_or(format!("Error: malformed Shares Purchased for {date}"))?;
            let purchase_price = cell_to_f64(&purchase[purchase_price_idx])
                .ok_or(format!("Error: malformed Purchase Price for {date}"))?;
            let offering_fmv = cell_to_f64(&purchase[offering_fmv_idx])
                .ok_or(format!("Error: malformed Offering Date FMV for {date}"))?;

            log::info!(
                "ESPP PURCHASE_DATE: {date} SHARES: {shares} PRICE: {purchase_price} FMV: {offering_fmv}"
            );
            purchases.push(EsppPurchase {
                purchase_date: date,
                shares,
                purchase_price,
                offering_fmv,
            });
        }
    }
    log::info!("ESPP purchases: {:#?}", purchases);
    Ok(purchases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_fixture(path: &str) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        // Report preamble the broker emits above the actual table
        worksheet.write_string(0, 0, "My ESPP Purchases").unwrap();
        worksheet.write_string(1, 0, "Date as of: 12/31/2024").unwrap();
        worksheet
            .write_string(2, 0, "All amount fields are in US Dollars.")
            .unwrap();

        worksheet.write_string(5, 0, "Purchase Date").unwrap();
        worksheet.write_string(5, 1, "Shares Purchased").unwrap();
        worksheet.write_string(5, 2, "Purchase Price").unwrap();
        worksheet.write_string(5, 3, "Offering Date FMV").unwrap();

        worksheet.write_string(6, 0, "06/28/2024").unwrap();
        worksheet.write_number(6, 1, 12.0).unwrap();
        worksheet.write_string(6, 2, "$41.31").unwrap();
        worksheet.write_string(6, 3, "$48.60").unwrap();

        worksheet.write_string(7, 0, "12/31/2024").unwrap();
        worksheet.write_string(7, 1, "10.5").unwrap();
        worksheet.write_number(7, 2, 50.29).unwrap();
        worksheet.write_number(7, 3, 59.17).unwrap();

        worksheet.write_string(8, 0, "Total Shares").unwrap();
        worksheet.write_string(8, 1, "22.5").unwrap();
        worksheet
            .write_string(10, 0, "Please note: this report is informational only")
            .unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_parse_espp_purchases() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
        let path = dir.path().join("My_ESPP_Purchases.xlsx");
        let path = path.to_str().unwrap();
        write_fixture(path);

        assert_eq!(
            parse_espp_purchases(path),
            Ok(vec![
                EsppPurchase {
                    purchase_date: "06/28/2024".to_owned(),
                    shares: 12.0,
                    purchase_price: 41.31,
                    offering_fmv: 48.60,
                },
                EsppPurchase {
                    purchase_date: "12/31/2024".to_owned(),
                    shares: 10.5,
                    purchase_price: 50.29,
                    offering_fmv: 59.17,
                },
            ])
        );
        Ok(())
    }

    #[test]
    fn test_parse_espp_purchases_no_header() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
        let path = dir.path().join("Not_ESPP.xlsx");
        let path = path.to_str().unwrap();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Something else").unwrap();
        workbook.save(path).unwrap();

        assert!(parse_espp_purchases(path).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_espp_purchases_missing_file() {
        assert!(parse_espp_purchases("no_such_file.xlsx").is_err());
    }
}
