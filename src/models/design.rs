use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Administrative zone codes ───────────────────────────────────────────────

/// Italian climate zone per DPR 412/1993, classified by heating degree-days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ClimateZone {
    A,
    B,
    C,
    D,
    E,
    F,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ClimateZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateZone::A => "A",
            ClimateZone::B => "B",
            ClimateZone::C => "C",
            ClimateZone::D => "D",
            ClimateZone::E => "E",
            ClimateZone::F => "F",
            ClimateZone::Unknown => "N/D",
        }
    }
}

/// Seismic zone per OPCM 3274/2003 (1 = highest hazard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SeismicZone {
    #[serde(rename = "1")]
    Zone1,
    #[serde(rename = "2")]
    Zone2,
    #[serde(rename = "3")]
    Zone3,
    #[serde(rename = "4")]
    Zone4,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SeismicZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeismicZone::Zone1 => "1",
            SeismicZone::Zone2 => "2",
            SeismicZone::Zone3 => "3",
            SeismicZone::Zone4 => "4",
            SeismicZone::Unknown => "N/D",
        }
    }
}

// ─── External facts (inputs to the engine) ───────────────────────────────────

/// Geocoded site characterization. Fetched once per request and passed by
/// value into the engine; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SiteFacts {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub municipality: String,
    pub province: String,
    pub region: String,
    pub climate_zone: ClimateZone,
    pub seismic_zone: SeismicZone,
}

/// Solar resource data for the site, from the PVGIS collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolarFacts {
    /// Annual global irradiation on the optimal plane (kWh/m²/year)
    pub annual_irradiation_kwh_m2: f64,
    /// Optimal panel tilt (degrees from horizontal)
    pub optimal_tilt_deg: f64,
    /// Optimal azimuth (degrees, 0 = south)
    pub optimal_azimuth_deg: f64,
    /// Expected annual yield per installed kWp (kWh/kWp/year)
    pub annual_production_per_kwp: f64,
    /// Monthly irradiation on the optimal plane, 12 values (may be empty)
    #[serde(default)]
    pub monthly_irradiation_kwh_m2: Vec<f64>,
}

// ─── User request ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DesignRequest {
    /// Full Italian address
    pub address: String,
    /// Annual electricity consumption (kWh, must be > 0)
    pub annual_consumption_kwh: f64,
    /// Usable roof area (m², must be > 0)
    pub roof_area_m2: f64,
    /// Actual roof tilt (degrees, 0–90); None = use the PVGIS optimum
    #[serde(default)]
    pub roof_tilt_deg: Option<f64>,
    /// Actual roof azimuth (degrees, −180–180, 0 = south); None = optimum
    #[serde(default)]
    pub roof_azimuth_deg: Option<f64>,
}

// ─── Product catalog entries ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PvModule {
    pub manufacturer: String,
    pub model: String,
    /// Nominal power at STC (Wp)
    pub power_wp: f64,
    /// Module efficiency (%)
    pub efficiency_pct: f64,
    /// Module footprint (m²)
    pub area_m2: f64,
    pub price_eur: f64,
}

impl PvModule {
    /// Wp per m² of roof occupied — the figure of merit when roof area binds.
    pub fn power_density(&self) -> f64 {
        self.power_wp / self.area_m2
    }
}

/// A supported DC input power range of an inverter MPPT stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct DcPowerBand {
    pub min_kw: f64,
    pub max_kw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Inverter {
    pub manufacturer: String,
    pub model: String,
    /// Rated AC output power (kW)
    pub power_kw: f64,
    /// Supported DC input power bands
    pub dc_bands: Vec<DcPowerBand>,
    /// European weighted efficiency (%)
    pub efficiency_pct: f64,
    pub price_eur: f64,
}

/// Chosen inverter model plus unit count — large arrays are served by
/// several identical units rather than one oversized machine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InverterSelection {
    pub inverter: Inverter,
    pub units: u32,
}

impl InverterSelection {
    pub fn total_ac_kw(&self) -> f64 {
        self.inverter.power_kw * f64::from(self.units)
    }
}

// ─── Economic analysis ───────────────────────────────────────────────────────

/// Italian incentive scheme applied to the design. Exactly one per design;
/// the 50% tax deduction layers on top of either energy scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IncentiveType {
    TaxDeductionOnly,
    NetMetering,
    FeedInTariff,
}

impl IncentiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncentiveType::TaxDeductionOnly => "Detrazione fiscale 50%",
            IncentiveType::NetMetering => "SSP (Scambio sul Posto) + Detrazione 50%",
            IncentiveType::FeedInTariff => "RID (Ritiro Dedicato) + Detrazione 50%",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EconomicAnalysis {
    /// Total installation cost (EUR)
    pub total_cost_eur: f64,
    pub cost_per_kwp_eur: f64,
    /// Yearly value of self-consumed plus exported energy (EUR)
    pub annual_savings_eur: f64,
    pub incentive_type: IncentiveType,
    /// Tax deduction plus export revenue over the horizon (EUR)
    pub incentive_value_eur: f64,
    /// Fractional years to recover the investment
    pub payback_years: f64,
    pub roi_25y_percent: f64,
    /// Levelized Cost of Energy (EUR/kWh)
    pub lcoe_eur_kwh: f64,
}

// ─── Final design ────────────────────────────────────────────────────────────

/// Complete PV system design. Assembled once by the orchestrator and never
/// mutated; rerunning with the same inputs reproduces it exactly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemDesign {
    pub site: SiteFacts,
    pub solar: SolarFacts,
    pub module: PvModule,
    /// None when no catalog inverter fits (recorded in `notes`)
    pub inverter: Option<InverterSelection>,
    pub system_size_kwp: f64,
    pub num_panels: u32,
    /// Tilt/azimuth actually assumed for the production estimate
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub estimated_production_kwh: f64,
    /// Share of production consumed on site (%)
    pub self_consumption_rate_pct: f64,
    pub economics: EconomicAnalysis,
    /// Advisory notes, in the order they were raised
    pub notes: Vec<String>,
}

// ─── Analysis result (address → facts, no sizing) ────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub site: SiteFacts,
    pub solar: SolarFacts,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ─── REST API types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Full Italian address to analyze
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub modules_in_catalog: usize,
    pub inverters_in_catalog: usize,
}
