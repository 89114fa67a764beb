use chrono;
use roxmltree;

use crate::ReqwestClient;

const ECB_URL: &str = "https://data-api.ecb.europa.eu/service/data/EXR/D.USD.EUR.SP00.A";

/// Daily ECB reference rate, quoted as USD per EUR, for the most recent
/// business day at or before the given date. Queries a one week window so
/// weekends and TARGET holidays still yield an observation; the newest one
/// wins. Returns the observation date together with the rate.
pub fn get_usd_per_eur_rate(date: chrono::NaiveDate) -> Result<(String, f64), String> {
    let start_date = date
        .checked_sub_signed(chrono::Duration::days(7))
        .ok_or("Error traversing date")?;
    let query = [
        ("startPeriod", start_date.format("%Y-%m-%d").to_string()),
        ("endPeriod", date.format("%Y-%m-%d").to_string()),
    ];
    let response: String = get_blocking_exchange_rate(ECB_URL, &query)?;
    let ecb_response = EcbResponse::from_xml_string(&response)?;
    if ecb_response.currency != "USD" || ecb_response.currency_denom != "EUR" {
        return Err(format!(
            "Unexpected currency pair from ECB: {}/{}",
            ecb_response.currency, ecb_response.currency_denom
        ));
    }
    let rate = ecb_response
        .rate
        .parse::<f64>()
        .map_err(|e| format!("Failed to parse exchange rate: {}", e))?;
    log::info!("USD/EUR from ECB: {} on {}", rate, ecb_response.date);
    Ok((ecb_response.date, rate))
}

fn create_client() -> Result<ReqwestClient, String> {
    // proxies are taken from env vars: http_proxy and https_proxy
    let http_proxy = std::env::var("http_proxy");
    let https_proxy = std::env::var("https_proxy");

    let base_client = ReqwestClient::builder();
    let client = match &http_proxy {
        Ok(proxy) => base_client.proxy(
            reqwest::Proxy::http(proxy).map_err(|e| format!("Error setting HTTP proxy: {e}"))?,
        ),
        Err(_) => base_client,
    };
    let client = match &https_proxy {
        Ok(proxy) => client.proxy(
            reqwest::Proxy::https(proxy).map_err(|e| format!("Error setting HTTPS proxy: {e}"))?,
        ),
        Err(_) => client,
    };
    client
        .build()
        .map_err(|e| format!("Failed to build client: {}", e))
}

fn get_blocking_exchange_rate<T>(url: &str, query: &T) -> Result<String, String>
where
    T: serde::Serialize + ?Sized,
{
    let client = create_client()?;

    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| format!("Failed to send request: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!(
            "Request failed with status {}: {}",
            status,
            response.text().unwrap_or_default()
        ));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .ok_or("Content-Type header missing")?
        .to_str()
        .map_err(|e| format!("Failed to convert Content-Type header to string: {}", e))?;

    let expected_content_type = "application/vnd.sdmx.genericdata+xml;version=2.1";
    if content_type != expected_content_type {
        return Err(format!(
            "Unexpected Content-Type: {}, expected: {}",
            content_type, expected_content_type
        ));
    }

    response
        .text()
        .map_err(|e| format!("Failed to read response text: {}", e))
}

struct EcbResponse {
    currency: String,
    currency_denom: String,
    date: String,
    rate: String,
}

impl EcbResponse {
    pub fn from_xml_string(xml: &str) -> Result<Self, String> {
        let opt = roxmltree::ParsingOptions {
            allow_dtd: false,
            nodes_limit: 1024,
        };
        let document = roxmltree::Document::parse_with_options(xml, opt)
            .map_err(|e| format!("Error parsing XML: {}", e))?;

        let mut currency: Option<&str> = None;
        let mut currency_denom: Option<&str> = None;
        let mut date: Option<&str> = None;
        let mut rate: Option<&str> = None;

        for node in document.descendants() {
            if node.is_element() {
                match node.tag_name().name() {
                    "Value" => match node.attribute("id") {
                        Some("CURRENCY") => currency = node.attribute("value"),
                        Some("CURRENCY_DENOM") => currency_denom = node.attribute("value"),
                        _ => {}
                    },
                    // Observations come oldest first; keep overwriting so the
                    // newest business day remains
                    "Obs" => {
                        for child in node.children() {
                            match child.tag_name().name() {
                                "ObsDimension" => date = child.attribute("value"),
                                "ObsValue" => rate = child.attribute("value"),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let ecb_response = EcbResponse {
            currency: currency.ok_or_else(|| "Currency not found")?.to_string(),
            currency_denom: currency_denom
                .ok_or_else(|| "Currency Denominator not found")?
                .to_string(),
            date: date.ok_or_else(|| "Date not found")?.to_string(),
            rate: rate.ok_or_else(|| "Rate not found")?.to_string(),
        };
        Ok(ecb_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecb_parse_xml_from_file() {
        let xml_data: &str = include_str!("../data/ecb_example_response.xml");

        let ecb_response = EcbResponse::from_xml_string(xml_data).unwrap();
        assert_eq!(ecb_response.currency, "USD");
        assert_eq!(ecb_response.currency_denom, "EUR");
        // Newest of the two observations in the sample
        assert_eq!(ecb_response.date, "2024-12-31");
        assert_eq!(ecb_response.rate, "1.0389");
    }

    #[test]
    fn test_ecb_parse_xml_no_observations() {
        let xml_data = r#"<?xml version="1.0" encoding="UTF-8"?>
<message:GenericData xmlns:message="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/message"></message:GenericData>"#;

        let ecb_response = EcbResponse::from_xml_string(xml_data);
        assert_eq!(ecb_response.is_err(), true);
    }

    #[test]
    fn test_ecb_parse_xml_garbage() {
        let ecb_response = EcbResponse::from_xml_string("this is not xml");
        assert_eq!(ecb_response.is_err(), true);
    }
}
