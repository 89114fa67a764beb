/// One ESPP offering purchase as reported by the broker. All money fields
/// are USD.
#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub struct EsppPurchase {
    pub purchase_date: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub offering_fmv: f64,
}

pub struct EsppSummary {
    pub latest_price: f64,
    pub total_cost_usd: f64,
    pub portfolio_value_usd: f64,
    pub portfolio_value_eur: f64,
    pub gain_usd: f64,
    pub gain_eur: f64,
}

/// Unrealized position value and gain over all ESPP purchases, at the given
/// current share price. EUR figures use the same USD per EUR rate as the
/// dividend summary.
pub fn compute_espp_summary(
    purchases: &[EsppPurchase],
    latest_price: f64,
    conversion_rate: f64,
) -> Result<EsppSummary, String> {
    if !(latest_price > 0.0) {
        return Err(format!(
            "Error: share price must be positive, got: {latest_price}"
        ));
    }
    if !(conversion_rate > 0.0) {
        return Err(format!(
            "Error: USD to EUR conversion rate must be positive, got: {conversion_rate}"
        ));
    }

    let total_cost_usd: f64 = purchases.iter().map(|p| p.shares * p.purchase_price).sum();
    let portfolio_value_usd: f64 = purchases.iter().map(|p| p.shares * latest_price).sum();
    let gain_usd = portfolio_value_usd - total_cost_usd;

    Ok(EsppSummary {
        latest_price,
        total_cost_usd,
        portfolio_value_usd,
        portfolio_value_eur: portfolio_value_usd / conversion_rate,
        gain_usd,
        gain_eur: gain_usd / conversion_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(shares: f64, price: f64) -> EsppPurchase {
        EsppPurchase {
            purchase_date: "N/A".to_string(),
            shares,
            purchase_price: price,
            offering_fmv: price,
        }
    }

    #[test]
    fn test_simple_espp_summary() -> Result<(), String> {
        let purchases = vec![purchase(10.0, 40.0)];
        let summary = compute_espp_summary(&purchases, 60.0, 1.08)?;
        assert_eq!(summary.total_cost_usd, 400.0);
        assert_eq!(summary.portfolio_value_usd, 600.0);
        assert_eq!(summary.gain_usd, 200.0);
        assert_eq!(summary.gain_eur, 200.0 / 1.08);
        assert_eq!(summary.portfolio_value_eur, 600.0 / 1.08);
        Ok(())
    }

    #[test]
    fn test_espp_summary_multiple_purchases() -> Result<(), String> {
        let purchases = vec![purchase(10.0, 40.0), purchase(2.5, 52.0)];
        let summary = compute_espp_summary(&purchases, 50.0, 1.08)?;
        assert_eq!(summary.total_cost_usd, 400.0 + 130.0);
        assert_eq!(summary.portfolio_value_usd, 500.0 + 125.0);
        assert_eq!(summary.gain_usd, 625.0 - 530.0);
        Ok(())
    }

    #[test]
    fn test_espp_summary_underwater_position() -> Result<(), String> {
        let purchases = vec![purchase(10.0, 40.0)];
        let summary = compute_espp_summary(&purchases, 30.0, 1.08)?;
        assert_eq!(summary.gain_usd, -100.0);
        Ok(())
    }

    #[test]
    fn test_espp_summary_empty() -> Result<(), String> {
        let summary = compute_espp_summary(&[], 30.0, 1.08)?;
        assert_eq!(summary.total_cost_usd, 0.0);
        assert_eq!(summary.gain_usd, 0.0);
        Ok(())
    }

    #[test]
    fn test_espp_summary_rejects_bad_inputs() {
        let purchases = vec![purchase(10.0, 40.0)];
        assert!(compute_espp_summary(&purchases, 0.0, 1.08).is_err());
        assert!(compute_espp_summary(&purchases, -30.0, 1.08).is_err());
        assert!(compute_espp_summary(&purchases, 30.0, 0.0).is_err());
    }
}
