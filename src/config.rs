use serde::Deserialize;

/// Deployment configuration, loaded from `config.json`. Every field has a
/// default so a partial (or absent) file still yields a working setup;
/// policy numbers live here, never in the formulas.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub geocoding: GeocodingConfig,
    pub pvgis: PvgisConfig,
    pub narrative: NarrativeConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "solar-capitolato/0.1.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PvgisConfig {
    pub base_url: String,
    /// Standard system losses passed to PVcalc (%)
    pub system_loss_pct: f64,
    pub timeout_s: u64,
}

impl Default for PvgisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://re.jrc.ec.europa.eu/api/v5_3".to_string(),
            system_loss_pct: 14.0,
            timeout_s: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Empty = narrative generation disabled
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 2000,
        }
    }
}

// ─── Engine configuration ────────────────────────────────────────────────────

/// Module selection policy. Roof area is usually the binding constraint in
/// Italian residential retrofits, hence the power-density default.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModulePolicy {
    PowerDensity,
    Efficiency,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// DC:AC oversize ratio used to derive the required inverter AC rating
    pub inverter_oversize_ratio: f64,
    /// Identical units allowed per inverter model before giving up
    pub max_inverter_units: u32,
    pub module_policy: ModulePolicy,
    /// Production loss per degree of tilt deviation from optimum
    pub tilt_loss_per_deg: f64,
    /// Production loss per degree of azimuth deviation from optimum
    pub azimuth_loss_per_deg: f64,
    /// Floor of the orientation derating factor — never zero
    pub min_orientation_factor: f64,
    /// Derating below this threshold earns an advisory note
    pub orientation_note_threshold: f64,
    /// Asymptotic self-consumption share for a dwelling without storage (%)
    pub self_consumption_ceiling_pct: f64,
    /// Saturation speed of the self-consumption curve
    pub self_consumption_shape: f64,
    pub economics: EconomicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inverter_oversize_ratio: 1.15,
            max_inverter_units: 4,
            module_policy: ModulePolicy::PowerDensity,
            tilt_loss_per_deg: 0.003,
            azimuth_loss_per_deg: 0.002,
            min_orientation_factor: 0.70,
            orientation_note_threshold: 0.85,
            self_consumption_ceiling_pct: 35.0,
            self_consumption_shape: 3.0,
            economics: EconomicsConfig::default(),
        }
    }
}

/// Tariffs and incentive parameters. Regulatory changes touch this struct
/// (or the JSON it is read from), never the economics formulas.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EconomicsConfig {
    pub cost_per_kwp_eur: f64,
    /// Fixed balance-of-system adder (EUR)
    pub balance_of_system_eur: f64,
    /// Retail electricity price for self-consumed energy (EUR/kWh)
    pub retail_tariff_eur_kwh: f64,
    /// Export valuation under Scambio sul Posto (EUR/kWh)
    pub ssp_export_tariff_eur_kwh: f64,
    /// Export valuation under Ritiro Dedicato (EUR/kWh)
    pub rid_export_tariff_eur_kwh: f64,
    /// Regulatory size threshold between SSP and RID (kWp)
    pub net_metering_threshold_kwp: f64,
    /// false = value exports at zero, incentive becomes deduction-only
    pub energy_incentive_enabled: bool,
    pub tax_deduction_rate: f64,
    /// Maximum deductible base (EUR)
    pub tax_deduction_cap_eur: f64,
    /// Equal annual installments the deduction is spread over
    pub tax_deduction_installments: u32,
    /// When set, payback cash flows and LCOE production are discounted
    pub discount_rate: Option<f64>,
    pub horizon_years: u32,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            cost_per_kwp_eur: 1500.0,
            balance_of_system_eur: 0.0,
            retail_tariff_eur_kwh: 0.25,
            ssp_export_tariff_eur_kwh: 0.06,
            rid_export_tariff_eur_kwh: 0.04,
            net_metering_threshold_kwp: 500.0,
            energy_incentive_enabled: true,
            tax_deduction_rate: 0.50,
            tax_deduction_cap_eur: 96_000.0,
            tax_deduction_installments: 10,
            discount_rate: None,
            horizon_years: 25,
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when the file is missing.
    /// A present-but-malformed file is still an error.
    pub fn load_or_default(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
