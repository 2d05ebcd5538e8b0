use crate::config::EngineConfig;
use crate::models::design::SolarFacts;

/// Annual production estimate and the self-consumption / export split the
/// economics run on.
#[derive(Debug, Clone)]
pub struct ProductionEstimate {
    pub annual_kwh: f64,
    /// Multiplicative orientation derating actually applied (1.0 = optimal)
    pub orientation_factor: f64,
    /// Tilt/azimuth the estimate assumes (overrides resolved against optimum)
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub self_consumption_rate_pct: f64,
    pub self_consumed_kwh: f64,
    pub exported_kwh: f64,
}

/// Derating for a roof that deviates from the PVGIS optimum: linear losses
/// per degree of tilt and azimuth deviation, floored at a configured minimum
/// so the factor never collapses to zero. A finer transposition model is a
/// collaborator concern, not this engine's.
fn orientation_factor(
    solar: &SolarFacts,
    tilt_deg: f64,
    azimuth_deg: f64,
    cfg: &EngineConfig,
) -> f64 {
    let tilt_dev = (tilt_deg - solar.optimal_tilt_deg).abs();
    let azimuth_dev = (azimuth_deg - solar.optimal_azimuth_deg).abs();
    (1.0 - tilt_dev * cfg.tilt_loss_per_deg - azimuth_dev * cfg.azimuth_loss_per_deg)
        .max(cfg.min_orientation_factor)
}

/// Saturating self-consumption curve: with coverage `r = production /
/// consumption`, the rate is `ceiling · (1 − e^(−shape·r))` — zero at zero
/// coverage, approaching the configured ceiling as coverage grows. Ceiling
/// and shape are configuration defaults, not physical constants.
fn self_consumption_rate_pct(coverage: f64, cfg: &EngineConfig) -> f64 {
    let rate = cfg.self_consumption_ceiling_pct * (1.0 - (-cfg.self_consumption_shape * coverage).exp());
    rate.clamp(0.0, 100.0)
}

/// Estimate annual production for a sized array and split it into
/// self-consumed and exported energy.
pub fn estimate_production(
    system_size_kwp: f64,
    solar: &SolarFacts,
    roof_tilt_deg: Option<f64>,
    roof_azimuth_deg: Option<f64>,
    annual_consumption_kwh: f64,
    cfg: &EngineConfig,
) -> ProductionEstimate {
    let tilt_deg = roof_tilt_deg.unwrap_or(solar.optimal_tilt_deg);
    let azimuth_deg = roof_azimuth_deg.unwrap_or(solar.optimal_azimuth_deg);
    let factor = orientation_factor(solar, tilt_deg, azimuth_deg, cfg);

    let annual_kwh = system_size_kwp * solar.annual_production_per_kwp * factor;

    let coverage = annual_kwh / annual_consumption_kwh;
    let rate_pct = self_consumption_rate_pct(coverage, cfg);
    let self_consumed_kwh = annual_kwh * rate_pct / 100.0;

    ProductionEstimate {
        annual_kwh,
        orientation_factor: factor,
        tilt_deg,
        azimuth_deg,
        self_consumption_rate_pct: rate_pct,
        self_consumed_kwh,
        exported_kwh: annual_kwh - self_consumed_kwh,
    }
}
