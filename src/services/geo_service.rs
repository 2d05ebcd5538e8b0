use serde::Deserialize;

use crate::config::GeocodingConfig;
use crate::models::design::{ClimateZone, SeismicZone};
use crate::services::FetchError;

// ─── Nominatim wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Geocoded location, before zone classification.
#[derive(Debug, Clone)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub municipality: String,
    pub province: String,
    pub region: String,
    pub display_name: String,
}

/// Geocode an Italian address via Nominatim (OpenStreetMap).
pub async fn geocode_address(address: &str, cfg: &GeocodingConfig) -> Result<Location, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .build()?;

    let results: Vec<NominatimResult> = client
        .get(format!("{}/search", cfg.base_url))
        .query(&[
            ("q", address),
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("countrycodes", "it"),
            ("limit", "1"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let Some(hit) = results.into_iter().next() else {
        return Err(FetchError::NotFound {
            query: address.to_string(),
        });
    };

    let parse = |s: &str, field: &'static str| {
        s.parse::<f64>().map_err(|_| FetchError::Malformed {
            service: "nominatim",
            detail: format!("{field} non numerico: {s}"),
        })
    };

    let municipality = hit
        .address
        .city
        .or(hit.address.town)
        .or(hit.address.village)
        .unwrap_or_default();

    Ok(Location {
        latitude: parse(&hit.lat, "lat")?,
        longitude: parse(&hit.lon, "lon")?,
        municipality,
        province: hit.address.county.unwrap_or_default(),
        region: hit.address.state.unwrap_or_default(),
        display_name: hit.display_name,
    })
}

// ─── Zone classification ─────────────────────────────────────────────────────
// Region-level defaults; a full ISTAT municipality lookup would refine these
// but the regional value is correct for the large majority of municipalities.

/// Climate zone (DPR 412/1993) by region.
pub fn climate_zone_for(region: &str) -> ClimateZone {
    match region {
        "Sicilia" => ClimateZone::B,
        "Sardegna" | "Calabria" | "Puglia" | "Campania" => ClimateZone::C,
        "Basilicata" | "Molise" | "Abruzzo" | "Lazio" | "Marche" | "Toscana" | "Liguria" => {
            ClimateZone::D
        }
        "Umbria" | "Emilia-Romagna" | "Piemonte" | "Lombardia" | "Veneto"
        | "Friuli Venezia Giulia" => ClimateZone::E,
        "Valle d'Aosta" | "Trentino-Alto Adige" => ClimateZone::F,
        _ => ClimateZone::Unknown,
    }
}

/// Seismic zone (OPCM 3274/2003) by region.
pub fn seismic_zone_for(region: &str) -> SeismicZone {
    match region {
        "Calabria" | "Basilicata" => SeismicZone::Zone1,
        "Sicilia" | "Campania" | "Friuli Venezia Giulia" | "Abruzzo" | "Molise" | "Umbria"
        | "Marche" | "Lazio" | "Toscana" => SeismicZone::Zone2,
        "Puglia" | "Emilia-Romagna" | "Liguria" | "Piemonte" | "Valle d'Aosta" | "Lombardia"
        | "Veneto" => SeismicZone::Zone3,
        "Trentino-Alto Adige" | "Sardegna" => SeismicZone::Zone4,
        _ => SeismicZone::Unknown,
    }
}
