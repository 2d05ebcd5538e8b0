use thiserror::Error;

/// Fatal errors of the design pipeline. Every variant carries the offending
/// field or the computed intermediate, so the presentation layer can render
/// a specific message instead of a generic failure.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("parametro non valido: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error(
        "area tetto {roof_area_m2} m² insufficiente per un singolo modulo da {module_area_m2} m²"
    )]
    InsufficientRoofArea {
        roof_area_m2: f64,
        module_area_m2: f64,
    },

    /// Raised by the orchestration layer when a collaborator fails; the
    /// engine itself never performs I/O.
    #[error("dati esterni non disponibili ({source_name}): {detail}")]
    ExternalDataUnavailable {
        source_name: &'static str,
        detail: String,
    },

    #[error(transparent)]
    Economics(#[from] EconomicsError),
}

impl DesignError {
    /// Stable machine-readable discriminant for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            DesignError::InvalidInput { .. } => "invalid_input",
            DesignError::InsufficientRoofArea { .. } => "insufficient_roof_area",
            DesignError::ExternalDataUnavailable { .. } => "external_data_unavailable",
            DesignError::Economics(_) => "economics",
        }
    }
}

/// The system was sized but cannot be economically justified — surfaced
/// separately from sizing failures on purpose.
#[derive(Debug, Error)]
pub enum EconomicsError {
    #[error("risparmio annuo {annual_savings_eur:.2} EUR non positivo: payback indefinito")]
    NonPositiveSavings { annual_savings_eur: f64 },

    #[error("investimento di {total_cost_eur:.2} EUR non recuperato entro {searched_years} anni")]
    PaybackBeyondHorizon {
        total_cost_eur: f64,
        searched_years: u32,
    },
}

/// Non-fatal: the catalog holds no inverter combination covering the array.
/// The orchestrator downgrades this to an advisory note.
#[derive(Debug, Error)]
#[error("nessun inverter in catalogo copre {required_ac_kw:.1} kW AC")]
pub struct NoSuitableInverter {
    pub required_ac_kw: f64,
}

/// Catalog snapshot failed validation at load time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalogo prodotti non leggibile: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalogo prodotti senza moduli fotovoltaici")]
    NoModules,

    #[error("voce di catalogo non valida: {item} ({reason})")]
    InvalidEntry { item: String, reason: &'static str },
}
