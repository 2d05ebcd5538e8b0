use std::time::Duration;

use serde::Deserialize;

use crate::config::PvgisConfig;
use crate::models::design::SolarFacts;
use crate::services::FetchError;

// ─── PVGIS PVcalc wire types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PvgisResponse {
    #[serde(default)]
    inputs: PvgisInputs,
    #[serde(default)]
    outputs: PvgisOutputs,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisInputs {
    #[serde(default)]
    mounting_system: PvgisMounting,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisMounting {
    #[serde(default)]
    fixed: PvgisFixedMounting,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisFixedMounting {
    #[serde(default)]
    slope: PvgisAngle,
    #[serde(default)]
    azimuth: PvgisAngle,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisAngle {
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisOutputs {
    #[serde(default)]
    monthly: PvgisMonthly,
    #[serde(default)]
    totals: PvgisTotals,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisMonthly {
    #[serde(default)]
    fixed: Vec<PvgisMonth>,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisMonth {
    /// Monthly irradiation on the inclined plane (kWh/m²)
    #[serde(rename = "H(i)_m", default)]
    irradiation: f64,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisTotals {
    #[serde(default)]
    fixed: PvgisTotalsFixed,
}

#[derive(Debug, Default, Deserialize)]
struct PvgisTotalsFixed {
    /// Annual irradiation on the inclined plane (kWh/m²/year)
    #[serde(rename = "H(i)_y", default)]
    annual_irradiation: f64,
    /// Annual production for the 1 kWp reference system (kWh/year)
    #[serde(rename = "E_y", default)]
    annual_production: f64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Fetch the solar resource for a site from the EU JRC PVGIS `PVcalc`
/// endpoint. A 1 kWp reference system with PVGIS-optimized angles gives both
/// the optimal tilt/azimuth and the specific yield per installed kWp.
pub async fn fetch_solar_facts(
    latitude: f64,
    longitude: f64,
    cfg: &PvgisConfig,
) -> Result<SolarFacts, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_s))
        .build()?;

    let response: PvgisResponse = client
        .get(format!("{}/PVcalc", cfg.base_url))
        .query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("peakpower", "1".to_string()),
            ("loss", cfg.system_loss_pct.to_string()),
            ("outputformat", "json".to_string()),
            ("optimalangles", "1".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let totals = &response.outputs.totals.fixed;
    if !(totals.annual_production > 0.0) {
        return Err(FetchError::Malformed {
            service: "pvgis",
            detail: format!(
                "producibilità annua non positiva: {}",
                totals.annual_production
            ),
        });
    }

    let mounting = &response.inputs.mounting_system.fixed;
    Ok(SolarFacts {
        annual_irradiation_kwh_m2: round1(totals.annual_irradiation),
        optimal_tilt_deg: round1(mounting.slope.value),
        optimal_azimuth_deg: round1(mounting.azimuth.value),
        annual_production_per_kwp: round1(totals.annual_production),
        monthly_irradiation_kwh_m2: response
            .outputs
            .monthly
            .fixed
            .iter()
            .map(|m| round1(m.irradiation))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pvcalc_payload_parses_into_solar_facts() {
        let raw = r#"{
            "inputs": {"mounting_system": {"fixed": {
                "slope": {"value": 38, "optimal": true},
                "azimuth": {"value": 2, "optimal": true}}}},
            "outputs": {
                "monthly": {"fixed": [
                    {"month": 1, "H(i)_m": 78.4}, {"month": 2, "H(i)_m": 95.1}]},
                "totals": {"fixed": {"H(i)_y": 1712.3, "E_y": 1391.6}}}
        }"#;
        let parsed: PvgisResponse = serde_json::from_str(raw).expect("pvgis json");
        assert_eq!(parsed.outputs.totals.fixed.annual_production, 1391.6);
        assert_eq!(parsed.inputs.mounting_system.fixed.slope.value, 38.0);
        assert_eq!(parsed.outputs.monthly.fixed.len(), 2);
        assert_eq!(parsed.outputs.monthly.fixed[0].irradiation, 78.4);
    }

    #[test]
    fn missing_sections_default_instead_of_failing() {
        let parsed: PvgisResponse = serde_json::from_str(r#"{"outputs": {}}"#).expect("json");
        assert_eq!(parsed.outputs.totals.fixed.annual_production, 0.0);
    }
}
