use crate::config::EngineConfig;
use crate::engine::catalog::ProductCatalog;
use crate::engine::economics::compute_economics;
use crate::engine::error::DesignError;
use crate::engine::production::estimate_production;
use crate::engine::sizing::{size_system, validate_request};
use crate::models::design::{DesignRequest, SiteFacts, SolarFacts, SystemDesign};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Run the full sizing pipeline and assemble the immutable design.
///
/// Sizing and economics failures propagate unchanged; a failed inverter
/// selection instead becomes an advisory note and leaves the inverter unset,
/// because a proposal without a confirmed inverter model is still usable.
pub fn design_system(
    site: SiteFacts,
    solar: SolarFacts,
    request: &DesignRequest,
    catalog: &ProductCatalog,
    cfg: &EngineConfig,
) -> Result<SystemDesign, DesignError> {
    validate_request(request, &solar)?;

    let module = catalog.select_module(cfg.module_policy);
    let sizing = size_system(request, &solar, module)?;

    let mut notes = Vec::new();
    if sizing.area_limited {
        notes.push(format!(
            "Area tetto insufficiente per coprire l'intero fabbisogno: \
             impianto ridimensionato da {:.1} kWp a {:.2} kWp.",
            sizing.target_kwp, sizing.system_size_kwp
        ));
    }

    let production = estimate_production(
        sizing.system_size_kwp,
        &solar,
        request.roof_tilt_deg,
        request.roof_azimuth_deg,
        request.annual_consumption_kwh,
        cfg,
    );
    if production.orientation_factor < cfg.orientation_note_threshold {
        notes.push(format!(
            "Orientamento non ottimale: perdita di produzione stimata {:.0}%.",
            (1.0 - production.orientation_factor) * 100.0
        ));
    }

    let inverter = match catalog.select_inverter(sizing.system_size_kwp, cfg) {
        Ok(selection) => {
            notes.push(format!(
                "Inverter selezionato: {} {} × {}.",
                selection.inverter.manufacturer, selection.inverter.model, selection.units
            ));
            Some(selection)
        }
        Err(missing) => {
            notes.push(format!(
                "Nessun inverter a catalogo copre {:.1} kW AC: \
                 modello da definire in fase esecutiva.",
                missing.required_ac_kw
            ));
            None
        }
    };

    let economics = compute_economics(sizing.system_size_kwp, &production, &cfg.economics)?;

    Ok(SystemDesign {
        site,
        solar,
        module: module.clone(),
        inverter,
        system_size_kwp: round2(sizing.system_size_kwp),
        num_panels: sizing.num_panels,
        tilt_deg: production.tilt_deg,
        azimuth_deg: production.azimuth_deg,
        estimated_production_kwh: production.annual_kwh.round(),
        self_consumption_rate_pct: round2(production.self_consumption_rate_pct),
        economics,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::design::{ClimateZone, SeismicZone};

    fn site() -> SiteFacts {
        SiteFacts {
            address: "Via Roma 1, 20121 Milano MI".to_string(),
            latitude: 45.4642,
            longitude: 9.19,
            municipality: "Milano".to_string(),
            province: "MI".to_string(),
            region: "Lombardia".to_string(),
            climate_zone: ClimateZone::E,
            seismic_zone: SeismicZone::Zone3,
        }
    }

    fn solar() -> SolarFacts {
        SolarFacts {
            annual_irradiation_kwh_m2: 1650.0,
            optimal_tilt_deg: 35.0,
            optimal_azimuth_deg: 0.0,
            annual_production_per_kwp: 1400.0,
            monthly_irradiation_kwh_m2: vec![],
        }
    }

    fn request(consumption: f64, roof: f64) -> DesignRequest {
        DesignRequest {
            address: "Via Roma 1, 20121 Milano MI".to_string(),
            annual_consumption_kwh: consumption,
            roof_area_m2: roof,
            roof_tilt_deg: None,
            roof_azimuth_deg: None,
        }
    }

    #[test]
    fn full_pipeline_produces_a_consistent_design() {
        let catalog = ProductCatalog::builtin();
        let cfg = EngineConfig::default();
        let design =
            design_system(site(), solar(), &request(4500.0, 40.0), &catalog, &cfg).expect("design");

        assert!(design.num_panels >= 1);
        let from_panels = f64::from(design.num_panels) * design.module.power_wp / 1000.0;
        assert!((from_panels - design.system_size_kwp).abs() < design.module.power_wp / 1000.0);
        assert!(design.inverter.is_some());
        assert!((0.0..=100.0).contains(&design.self_consumption_rate_pct));
        assert!(design.estimated_production_kwh > 0.0);
        // roof comfortably covers a 4500 kWh load, no area note expected
        assert!(!design.notes.iter().any(|n| n.contains("Area tetto")));
    }

    #[test]
    fn constrained_roof_adds_the_area_note() {
        let catalog = ProductCatalog::builtin();
        let cfg = EngineConfig::default();
        let design = design_system(site(), solar(), &request(10_000.0, 10.0), &catalog, &cfg)
            .expect("design");
        assert!(design.notes.iter().any(|n| n.contains("Area tetto")));
        assert!(design.system_size_kwp < 10_000.0 / 1400.0);
    }

    #[test]
    fn sizing_errors_propagate_unchanged() {
        let catalog = ProductCatalog::builtin();
        let cfg = EngineConfig::default();
        let err =
            design_system(site(), solar(), &request(4500.0, 1.0), &catalog, &cfg).unwrap_err();
        assert!(matches!(err, DesignError::InsufficientRoofArea { .. }));
    }

    #[test]
    fn missing_inverter_degrades_to_a_note() {
        // catalog with modules but no inverter at all
        let catalog = ProductCatalog::from_json(
            r#"{"modules": [{"manufacturer": "Trina Solar", "model": "Vertex S+ 450",
                "power_wp": 450, "efficiency_pct": 22.5, "area_m2": 1.98, "price_eur": 210}],
               "inverters": []}"#,
        )
        .expect("catalog");
        let cfg = EngineConfig::default();
        let design =
            design_system(site(), solar(), &request(4500.0, 40.0), &catalog, &cfg).expect("design");
        assert!(design.inverter.is_none());
        assert!(design.notes.iter().any(|n| n.contains("Nessun inverter")));
    }

    #[test]
    fn identical_inputs_reproduce_the_design_exactly() {
        let catalog = ProductCatalog::builtin();
        let cfg = EngineConfig::default();
        let mut req = request(6200.0, 28.0);
        req.roof_tilt_deg = Some(25.0);
        req.roof_azimuth_deg = Some(-15.0);

        let a = design_system(site(), solar(), &req, &catalog, &cfg).expect("first run");
        let b = design_system(site(), solar(), &req, &catalog, &cfg).expect("second run");
        assert_eq!(
            serde_json::to_string(&a).expect("serialize"),
            serde_json::to_string(&b).expect("serialize")
        );
    }

    #[test]
    fn overrides_do_not_change_sizing_only_production() {
        let catalog = ProductCatalog::builtin();
        let cfg = EngineConfig::default();
        let optimal =
            design_system(site(), solar(), &request(4500.0, 40.0), &catalog, &cfg).expect("design");

        let mut req = request(4500.0, 40.0);
        req.roof_tilt_deg = Some(10.0);
        req.roof_azimuth_deg = Some(60.0);
        let tilted = design_system(site(), solar(), &req, &catalog, &cfg).expect("design");

        assert_eq!(optimal.num_panels, tilted.num_panels);
        assert_eq!(optimal.system_size_kwp, tilted.system_size_kwp);
        assert!(tilted.estimated_production_kwh < optimal.estimated_production_kwh);
    }
}
