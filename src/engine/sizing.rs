use crate::engine::error::DesignError;
use crate::models::design::{DesignRequest, PvModule, SolarFacts};

/// Sizing outcome, before production and economics.
#[derive(Debug, Clone)]
pub struct Sizing {
    pub num_panels: u32,
    pub system_size_kwp: f64,
    /// Capacity that would offset 100% of consumption in a typical year
    pub target_kwp: f64,
    pub max_panels_by_area: u32,
    pub max_kwp_by_area: f64,
    /// True when the roof caps the system below the consumption target
    pub area_limited: bool,
}

/// Reject malformed requests before any catalog access.
pub fn validate_request(request: &DesignRequest, solar: &SolarFacts) -> Result<(), DesignError> {
    if !(request.annual_consumption_kwh > 0.0) {
        return Err(DesignError::InvalidInput {
            field: "annual_consumption_kwh",
            value: request.annual_consumption_kwh,
            reason: "il consumo annuo deve essere positivo",
        });
    }
    if !(request.roof_area_m2 > 0.0) {
        return Err(DesignError::InvalidInput {
            field: "roof_area_m2",
            value: request.roof_area_m2,
            reason: "l'area del tetto deve essere positiva",
        });
    }
    if let Some(tilt) = request.roof_tilt_deg {
        if !(0.0..=90.0).contains(&tilt) {
            return Err(DesignError::InvalidInput {
                field: "roof_tilt_deg",
                value: tilt,
                reason: "inclinazione ammessa 0–90 gradi",
            });
        }
    }
    if let Some(azimuth) = request.roof_azimuth_deg {
        if !(-180.0..=180.0).contains(&azimuth) {
            return Err(DesignError::InvalidInput {
                field: "roof_azimuth_deg",
                value: azimuth,
                reason: "azimut ammesso −180–180 gradi",
            });
        }
    }
    if !(solar.annual_production_per_kwp > 0.0) {
        return Err(DesignError::InvalidInput {
            field: "annual_production_per_kwp",
            value: solar.annual_production_per_kwp,
            reason: "producibilità specifica non positiva",
        });
    }
    Ok(())
}

/// Size the array: consumption sets the target, the roof caps it, and the
/// result is rounded down to a whole number of panels (at least one, as long
/// as one fits). Tilt/azimuth overrides never move the size — they only
/// affect the production estimate downstream.
pub fn size_system(
    request: &DesignRequest,
    solar: &SolarFacts,
    module: &PvModule,
) -> Result<Sizing, DesignError> {
    let target_kwp = request.annual_consumption_kwh / solar.annual_production_per_kwp;

    let max_panels_by_area = (request.roof_area_m2 / module.area_m2).floor() as u32;
    if max_panels_by_area == 0 {
        return Err(DesignError::InsufficientRoofArea {
            roof_area_m2: request.roof_area_m2,
            module_area_m2: module.area_m2,
        });
    }
    let max_kwp_by_area = f64::from(max_panels_by_area) * module.power_wp / 1000.0;

    let panels_for_target = (target_kwp * 1000.0 / module.power_wp).floor() as u32;
    let num_panels = panels_for_target.clamp(1, max_panels_by_area);
    let system_size_kwp = f64::from(num_panels) * module.power_wp / 1000.0;

    Ok(Sizing {
        num_panels,
        system_size_kwp,
        target_kwp,
        max_panels_by_area,
        max_kwp_by_area,
        area_limited: max_kwp_by_area < target_kwp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_440() -> PvModule {
        PvModule {
            manufacturer: "Test".to_string(),
            model: "Mono 440".to_string(),
            power_wp: 440.0,
            efficiency_pct: 22.0,
            area_m2: 2.0,
            price_eur: 200.0,
        }
    }

    fn solar_1400() -> SolarFacts {
        SolarFacts {
            annual_irradiation_kwh_m2: 1750.0,
            optimal_tilt_deg: 35.0,
            optimal_azimuth_deg: 0.0,
            annual_production_per_kwp: 1400.0,
            monthly_irradiation_kwh_m2: vec![],
        }
    }

    fn request(consumption: f64, roof: f64) -> DesignRequest {
        DesignRequest {
            address: "Via Roma 1, Milano".to_string(),
            annual_consumption_kwh: consumption,
            roof_area_m2: roof,
            roof_tilt_deg: None,
            roof_azimuth_deg: None,
        }
    }

    #[test]
    fn consumption_driven_sizing() {
        // 4500 kWh / 1400 kWh/kWp → target 3.214 kWp → 7 whole panels
        let s = size_system(&request(4500.0, 40.0), &solar_1400(), &module_440()).expect("sizing");
        assert_eq!(s.num_panels, 7);
        assert!((s.system_size_kwp - 3.08).abs() < 1e-9);
        assert!(!s.area_limited);
    }

    #[test]
    fn roof_area_caps_the_system() {
        // target 7.14 kWp but only 5 panels fit on 10 m²
        let s = size_system(&request(10_000.0, 10.0), &solar_1400(), &module_440()).expect("sizing");
        assert_eq!(s.num_panels, 5);
        assert!((s.system_size_kwp - 2.2).abs() < 1e-9);
        assert!(s.area_limited);
    }

    #[test]
    fn tiny_consumption_still_gets_one_panel() {
        let s = size_system(&request(100.0, 40.0), &solar_1400(), &module_440()).expect("sizing");
        assert_eq!(s.num_panels, 1);
    }

    #[test]
    fn roof_too_small_for_any_panel() {
        let err = size_system(&request(4500.0, 1.5), &solar_1400(), &module_440()).unwrap_err();
        assert!(matches!(err, DesignError::InsufficientRoofArea { .. }));
    }

    #[test]
    fn size_never_exceeds_area_bound() {
        let module = module_440();
        for roof in [4.0, 7.9, 12.0, 25.0, 60.0, 300.0] {
            let s = size_system(&request(20_000.0, roof), &solar_1400(), &module).expect("sizing");
            let bound = (roof / module.area_m2).floor() * module.power_wp / 1000.0;
            assert!(
                s.system_size_kwp <= bound + 1e-9,
                "roof {roof} m²: {} kWp exceeds bound {bound}",
                s.system_size_kwp
            );
        }
    }

    #[test]
    fn shrinking_roof_never_grows_the_system() {
        let mut last = f64::INFINITY;
        for roof in [60.0, 40.0, 25.0, 12.0, 7.9, 4.0] {
            let s = size_system(&request(20_000.0, roof), &solar_1400(), &module_440())
                .expect("sizing");
            assert!(s.system_size_kwp <= last + 1e-9);
            last = s.system_size_kwp;
        }
    }

    #[test]
    fn panel_count_matches_size_within_one_panel() {
        let module = module_440();
        let s = size_system(&request(6200.0, 35.0), &solar_1400(), &module).expect("sizing");
        let from_panels = f64::from(s.num_panels) * module.power_wp / 1000.0;
        assert!((from_panels - s.system_size_kwp).abs() < module.power_wp / 1000.0);
    }

    #[test]
    fn non_positive_inputs_fail_fast() {
        let solar = solar_1400();
        for (consumption, roof) in [(0.0, 40.0), (-10.0, 40.0), (4500.0, 0.0), (4500.0, -3.0)] {
            let err = validate_request(&request(consumption, roof), &solar).unwrap_err();
            assert!(matches!(err, DesignError::InvalidInput { .. }));
        }
    }

    #[test]
    fn out_of_range_overrides_are_rejected() {
        let solar = solar_1400();
        let mut req = request(4500.0, 40.0);
        req.roof_tilt_deg = Some(95.0);
        assert!(matches!(
            validate_request(&req, &solar).unwrap_err(),
            DesignError::InvalidInput { field: "roof_tilt_deg", .. }
        ));

        let mut req = request(4500.0, 40.0);
        req.roof_azimuth_deg = Some(-181.0);
        assert!(matches!(
            validate_request(&req, &solar).unwrap_err(),
            DesignError::InvalidInput { field: "roof_azimuth_deg", .. }
        ));
    }

    #[test]
    fn plausible_overrides_pass_validation() {
        let solar = solar_1400();
        let mut req = request(4500.0, 40.0);
        req.roof_tilt_deg = Some(22.0);
        req.roof_azimuth_deg = Some(-35.0);
        assert!(validate_request(&req, &solar).is_ok());
    }

    #[test]
    fn nan_consumption_is_invalid() {
        let err = validate_request(&request(f64::NAN, 40.0), &solar_1400()).unwrap_err();
        assert!(matches!(err, DesignError::InvalidInput { .. }));
    }
}
