use crate::config::Config;
use crate::engine::error::DesignError;
use crate::models::design::{AnalysisResult, ClimateZone, SeismicZone, SiteFacts};
use crate::services::geo_service;
use crate::services::solar_service;

/// Compose the external collaborators: address → geocoded site → solar
/// resource. This is the only place fetch failures are mapped into the
/// engine's `ExternalDataUnavailable`; no retries happen here.
pub async fn analyze_site(address: &str, cfg: &Config) -> Result<AnalysisResult, DesignError> {
    let location = geo_service::geocode_address(address, &cfg.geocoding)
        .await
        .map_err(|e| DesignError::ExternalDataUnavailable {
            source_name: "nominatim",
            detail: e.to_string(),
        })?;
    tracing::info!(
        resolved = %location.display_name,
        lat = location.latitude,
        lon = location.longitude,
        "indirizzo geocodificato"
    );

    let solar = solar_service::fetch_solar_facts(location.latitude, location.longitude, &cfg.pvgis)
        .await
        .map_err(|e| DesignError::ExternalDataUnavailable {
            source_name: "pvgis",
            detail: e.to_string(),
        })?;

    let climate_zone = geo_service::climate_zone_for(&location.region);
    let seismic_zone = geo_service::seismic_zone_for(&location.region);

    let mut warnings = Vec::new();
    if climate_zone == ClimateZone::Unknown {
        warnings.push("Zona climatica non classificata per la regione indicata.".to_string());
    }
    if seismic_zone == SeismicZone::Unknown {
        warnings.push("Zona sismica non classificata per la regione indicata.".to_string());
    }

    let site = SiteFacts {
        address: address.to_string(),
        latitude: location.latitude,
        longitude: location.longitude,
        municipality: location.municipality,
        province: location.province,
        region: location.region,
        climate_zone,
        seismic_zone,
    };

    Ok(AnalysisResult {
        site,
        solar,
        warnings,
    })
}
