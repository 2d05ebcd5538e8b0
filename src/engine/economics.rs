use crate::config::EconomicsConfig;
use crate::engine::error::EconomicsError;
use crate::engine::production::ProductionEstimate;
use crate::models::design::{EconomicAnalysis, IncentiveType};

/// Years scanned for the payback crossing before declaring it unreachable.
const PAYBACK_SEARCH_YEARS: u32 = 100;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Economic model for a sized system. Pure: every tariff, threshold and cap
/// comes from [`EconomicsConfig`], so regulatory updates never touch the
/// formulas below.
///
/// Incentive rule (D.Lgs. 387/2003 framework): systems up to the regulatory
/// threshold settle exports under Scambio sul Posto, larger ones under
/// Ritiro Dedicato. The 50% building-renovation tax deduction layers on top
/// of either, spread over equal annual installments.
pub fn compute_economics(
    system_size_kwp: f64,
    production: &ProductionEstimate,
    cfg: &EconomicsConfig,
) -> Result<EconomicAnalysis, EconomicsError> {
    let total_cost = system_size_kwp * cfg.cost_per_kwp_eur + cfg.balance_of_system_eur;

    let (incentive_type, export_tariff) = if !cfg.energy_incentive_enabled {
        (IncentiveType::TaxDeductionOnly, 0.0)
    } else if system_size_kwp <= cfg.net_metering_threshold_kwp {
        (IncentiveType::NetMetering, cfg.ssp_export_tariff_eur_kwh)
    } else {
        (IncentiveType::FeedInTariff, cfg.rid_export_tariff_eur_kwh)
    };

    let annual_savings = production.self_consumed_kwh * cfg.retail_tariff_eur_kwh
        + production.exported_kwh * export_tariff;
    if annual_savings <= 0.0 {
        return Err(EconomicsError::NonPositiveSavings {
            annual_savings_eur: annual_savings,
        });
    }

    let deduction_total = (total_cost * cfg.tax_deduction_rate).min(cfg.tax_deduction_cap_eur);
    let annual_installment = if cfg.tax_deduction_installments > 0 {
        deduction_total / f64::from(cfg.tax_deduction_installments)
    } else {
        0.0
    };

    let payback_years = payback(
        total_cost,
        annual_savings,
        annual_installment,
        cfg.tax_deduction_installments,
        cfg.discount_rate,
    )?;

    let horizon = f64::from(cfg.horizon_years);
    let roi_25y = (annual_savings * horizon + deduction_total - total_cost) / total_cost * 100.0;

    let lifetime_production = match cfg.discount_rate {
        Some(rate) => (1..=cfg.horizon_years)
            .map(|y| production.annual_kwh / (1.0 + rate).powi(y as i32))
            .sum(),
        None => production.annual_kwh * horizon,
    };
    let lcoe = total_cost / lifetime_production;

    let incentive_value = deduction_total + production.exported_kwh * export_tariff * horizon;

    Ok(EconomicAnalysis {
        total_cost_eur: round2(total_cost),
        cost_per_kwp_eur: round2(cfg.cost_per_kwp_eur),
        annual_savings_eur: round2(annual_savings),
        incentive_type,
        incentive_value_eur: round2(incentive_value),
        payback_years: round2(payback_years),
        roi_25y_percent: round2(roi_25y),
        lcoe_eur_kwh: round4(lcoe),
    })
}

/// Smallest fractional number of years at which cumulative yearly cash
/// (energy savings plus deduction installments while they run, discounted
/// when a rate is configured) covers the investment. Linear interpolation
/// inside the crossing year.
fn payback(
    total_cost: f64,
    annual_savings: f64,
    annual_installment: f64,
    installments: u32,
    discount_rate: Option<f64>,
) -> Result<f64, EconomicsError> {
    let mut cumulative = 0.0;
    for year in 1..=PAYBACK_SEARCH_YEARS {
        let mut cash = annual_savings;
        if year <= installments {
            cash += annual_installment;
        }
        if let Some(rate) = discount_rate {
            cash /= (1.0 + rate).powi(year as i32);
        }
        if cumulative + cash >= total_cost {
            return Ok(f64::from(year - 1) + (total_cost - cumulative) / cash);
        }
        cumulative += cash;
    }
    Err(EconomicsError::PaybackBeyondHorizon {
        total_cost_eur: total_cost,
        searched_years: PAYBACK_SEARCH_YEARS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split helper mirroring what the production model would emit.
    fn split(annual_kwh: f64, rate_pct: f64) -> ProductionEstimate {
        let self_consumed = annual_kwh * rate_pct / 100.0;
        ProductionEstimate {
            annual_kwh,
            orientation_factor: 1.0,
            tilt_deg: 35.0,
            azimuth_deg: 0.0,
            self_consumption_rate_pct: rate_pct,
            self_consumed_kwh: self_consumed,
            exported_kwh: annual_kwh - self_consumed,
        }
    }

    #[test]
    fn residential_case_has_sane_figures() {
        let cfg = EconomicsConfig::default();
        let production = split(4312.0, 33.0);
        let eco = compute_economics(3.08, &production, &cfg).expect("economics");

        assert_eq!(eco.incentive_type, IncentiveType::NetMetering);
        assert!((eco.total_cost_eur - 4620.0).abs() < 0.01);
        // 1422.96 kWh · 0.25 + 2889.04 kWh · 0.06
        assert!((eco.annual_savings_eur - 529.08).abs() < 0.5);
        assert!(eco.payback_years > 4.0 && eco.payback_years < 9.0);
        assert!(eco.roi_25y_percent > 100.0);
        assert!((eco.lcoe_eur_kwh - 0.0429).abs() < 0.001);
    }

    #[test]
    fn incentive_switches_at_the_regulatory_threshold() {
        let cfg = EconomicsConfig::default();
        let cases = [
            (400.0, IncentiveType::NetMetering),
            (500.0, IncentiveType::NetMetering),
            (600.0, IncentiveType::FeedInTariff),
        ];
        for (kwp, expected) in cases {
            let production = split(kwp * 1400.0, 30.0);
            let eco = compute_economics(kwp, &production, &cfg).expect("economics");
            assert_eq!(eco.incentive_type, expected, "at {kwp} kWp");
        }
    }

    #[test]
    fn disabled_energy_incentive_falls_back_to_deduction_only() {
        let cfg = EconomicsConfig {
            energy_incentive_enabled: false,
            ..EconomicsConfig::default()
        };
        let production = split(4312.0, 33.0);
        let eco = compute_economics(3.08, &production, &cfg).expect("economics");
        assert_eq!(eco.incentive_type, IncentiveType::TaxDeductionOnly);
        // exports are worth nothing, only self-consumption counts
        assert!((eco.annual_savings_eur - 4312.0 * 0.33 * 0.25).abs() < 0.5);
    }

    #[test]
    fn zero_value_tariffs_yield_economics_error_not_division_error() {
        let cfg = EconomicsConfig {
            retail_tariff_eur_kwh: 0.0,
            ssp_export_tariff_eur_kwh: 0.0,
            rid_export_tariff_eur_kwh: 0.0,
            ..EconomicsConfig::default()
        };
        let production = split(4312.0, 33.0);
        let err = compute_economics(3.08, &production, &cfg).unwrap_err();
        assert!(matches!(err, EconomicsError::NonPositiveSavings { .. }));
    }

    #[test]
    fn deduction_is_capped() {
        let cfg = EconomicsConfig::default();
        // 600 kWp → 900 000 EUR; half of that far exceeds the 96 000 cap
        let production = split(600.0 * 1400.0, 30.0);
        let eco = compute_economics(600.0, &production, &cfg).expect("economics");
        let export_part = production.exported_kwh * cfg.rid_export_tariff_eur_kwh * 25.0;
        assert!((eco.incentive_value_eur - (96_000.0 + export_part)).abs() < 1.0);
    }

    #[test]
    fn payback_interpolates_inside_the_crossing_year() {
        // 1000 EUR cost, flat 400 EUR/yr, no deduction → exactly 2.5 years
        let years = payback(1000.0, 400.0, 0.0, 0, None).expect("payback");
        assert!((years - 2.5).abs() < 1e-9);
    }

    #[test]
    fn discounting_stretches_payback_and_raises_lcoe() {
        let nominal = EconomicsConfig::default();
        let discounted = EconomicsConfig {
            discount_rate: Some(0.04),
            ..EconomicsConfig::default()
        };
        let production = split(4312.0, 33.0);
        let a = compute_economics(3.08, &production, &nominal).expect("nominal");
        let b = compute_economics(3.08, &production, &discounted).expect("discounted");
        assert!(b.payback_years > a.payback_years);
        assert!(b.lcoe_eur_kwh > a.lcoe_eur_kwh);
    }

    #[test]
    fn unreachable_payback_is_reported_distinctly() {
        let err = payback(1_000_000.0, 1.0, 0.0, 0, None).unwrap_err();
        assert!(matches!(err, EconomicsError::PaybackBeyondHorizon { .. }));
    }
}
