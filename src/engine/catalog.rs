use std::cmp::Ordering;

use serde::Deserialize;

use crate::config::{EngineConfig, ModulePolicy};
use crate::engine::error::{CatalogError, NoSuitableInverter};
use crate::models::design::{Inverter, InverterSelection, PvModule};

/// Immutable product snapshot, loaded once at startup and shared read-only
/// across requests. Runtime file access happens in the wiring layer; this
/// module only parses, validates and selects.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCatalog {
    modules: Vec<PvModule>,
    #[serde(default)]
    inverters: Vec<Inverter>,
}

impl ProductCatalog {
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let catalog: ProductCatalog = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog snapshot embedded at compile time, used when no external
    /// catalog file is deployed.
    pub fn builtin() -> Self {
        Self::from_json(include_str!("../../data/catalog.json"))
            .expect("embedded catalog must be valid")
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.modules.is_empty() {
            return Err(CatalogError::NoModules);
        }
        for m in &self.modules {
            if !(m.power_wp > 0.0) {
                return Err(CatalogError::InvalidEntry {
                    item: format!("{} {}", m.manufacturer, m.model),
                    reason: "potenza nominale non positiva",
                });
            }
            if !(m.area_m2 > 0.0) {
                return Err(CatalogError::InvalidEntry {
                    item: format!("{} {}", m.manufacturer, m.model),
                    reason: "area modulo non positiva",
                });
            }
            if !(m.efficiency_pct > 0.0 && m.efficiency_pct < 100.0) {
                return Err(CatalogError::InvalidEntry {
                    item: format!("{} {}", m.manufacturer, m.model),
                    reason: "efficienza fuori dall'intervallo (0, 100)",
                });
            }
        }
        for inv in &self.inverters {
            if !(inv.power_kw > 0.0) {
                return Err(CatalogError::InvalidEntry {
                    item: format!("{} {}", inv.manufacturer, inv.model),
                    reason: "potenza AC non positiva",
                });
            }
        }
        Ok(())
    }

    pub fn modules(&self) -> &[PvModule] {
        &self.modules
    }

    pub fn inverters(&self) -> &[Inverter] {
        &self.inverters
    }

    /// Best module under the configured policy. Ties fall back to
    /// manufacturer then model name so repeated runs agree.
    pub fn select_module(&self, policy: ModulePolicy) -> &PvModule {
        let score = |m: &PvModule| match policy {
            ModulePolicy::PowerDensity => m.power_density(),
            ModulePolicy::Efficiency => m.efficiency_pct,
        };
        self.modules
            .iter()
            .min_by(|a, b| {
                score(b)
                    .partial_cmp(&score(a))
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.manufacturer.cmp(&b.manufacturer))
                    .then_with(|| a.model.cmp(&b.model))
            })
            .expect("catalog validated non-empty")
    }

    /// Pick the cheapest adequate inverter combination for a DC array.
    ///
    /// Required AC rating is `target_dc_kw / oversize_ratio`. Each model is
    /// considered at 1..=max_inverter_units identical units; among feasible
    /// combinations the smallest total AC wins, ties broken by total price,
    /// then manufacturer, then model.
    pub fn select_inverter(
        &self,
        target_dc_kw: f64,
        cfg: &EngineConfig,
    ) -> Result<InverterSelection, NoSuitableInverter> {
        let required_ac_kw = target_dc_kw / cfg.inverter_oversize_ratio;

        let mut best: Option<(f64, f64, &Inverter, u32)> = None;
        for inv in &self.inverters {
            for units in 1..=cfg.max_inverter_units.max(1) {
                let total_ac = inv.power_kw * f64::from(units);
                if total_ac + 1e-9 < required_ac_kw {
                    continue;
                }
                let total_price = inv.price_eur * f64::from(units);
                let better = match &best {
                    None => true,
                    Some((best_ac, best_price, best_inv, _)) => {
                        match total_ac.partial_cmp(best_ac).unwrap_or(Ordering::Equal) {
                            Ordering::Less => true,
                            Ordering::Greater => false,
                            Ordering::Equal => match total_price
                                .partial_cmp(best_price)
                                .unwrap_or(Ordering::Equal)
                            {
                                Ordering::Less => true,
                                Ordering::Greater => false,
                                Ordering::Equal => (inv.manufacturer.as_str(), inv.model.as_str())
                                    < (best_inv.manufacturer.as_str(), best_inv.model.as_str()),
                            },
                        }
                    }
                };
                if better {
                    best = Some((total_ac, total_price, inv, units));
                }
                // more units of the same model only grow total AC and price
                break;
            }
        }

        best.map(|(_, _, inv, units)| InverterSelection {
            inverter: inv.clone(),
            units,
        })
        .ok_or(NoSuitableInverter { required_ac_kw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProductCatalog {
        ProductCatalog::builtin()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let cat = catalog();
        assert!(!cat.modules().is_empty());
        assert!(!cat.inverters().is_empty());
    }

    #[test]
    fn empty_module_list_is_rejected() {
        let err = ProductCatalog::from_json(r#"{"modules": [], "inverters": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NoModules));
    }

    #[test]
    fn invalid_module_power_is_rejected() {
        let json = r#"{"modules": [{"manufacturer": "X", "model": "Y", "power_wp": 0,
            "efficiency_pct": 20.0, "area_m2": 1.9, "price_eur": 100}]}"#;
        let err = ProductCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { .. }));
    }

    #[test]
    fn power_density_policy_picks_densest_module() {
        let cat = catalog();
        let m = cat.select_module(ModulePolicy::PowerDensity);
        // Trina 450 Wp / 1.98 m² = 227.3 Wp/m² tops the snapshot
        assert_eq!(m.model, "Vertex S+ 450");
    }

    #[test]
    fn efficiency_policy_picks_most_efficient_module() {
        let cat = catalog();
        let m = cat.select_module(ModulePolicy::Efficiency);
        assert_eq!(m.model, "Maxeon 6 440");
    }

    #[test]
    fn inverter_selection_prefers_smallest_adequate_ac() {
        let cfg = EngineConfig::default();
        // 3.08 kWp / 1.15 = 2.68 kW required → the 3 kW class fits
        let sel = catalog().select_inverter(3.08, &cfg).expect("inverter");
        assert_eq!(sel.units, 1);
        assert_eq!(sel.inverter.power_kw, 3.0);
    }

    #[test]
    fn equal_ac_rating_ties_break_on_price() {
        let cfg = EngineConfig::default();
        // Growatt and Huawei both rate 3.0 kW; Growatt is cheaper
        let sel = catalog().select_inverter(3.0, &cfg).expect("inverter");
        assert_eq!(sel.inverter.manufacturer, "Growatt");
    }

    #[test]
    fn large_array_takes_multiple_units() {
        let cfg = EngineConfig::default();
        // 600 kWp / 1.15 = 521.7 kW AC → 4 × 150 kW
        let sel = catalog().select_inverter(600.0, &cfg).expect("inverter");
        assert_eq!(sel.units, 4);
        assert_eq!(sel.inverter.power_kw, 150.0);
        assert!(sel.total_ac_kw() >= 600.0 / cfg.inverter_oversize_ratio);
    }

    #[test]
    fn oversized_array_yields_no_suitable_inverter() {
        let cfg = EngineConfig::default();
        // beyond 4 × 150 kW there is nothing left in the snapshot
        let err = catalog().select_inverter(800.0, &cfg).unwrap_err();
        assert!(err.required_ac_kw > 600.0);
    }

    #[test]
    fn selection_is_deterministic() {
        let cfg = EngineConfig::default();
        let a = catalog().select_inverter(12.0, &cfg).expect("inverter");
        let b = catalog().select_inverter(12.0, &cfg).expect("inverter");
        assert_eq!(a.inverter.model, b.inverter.model);
        assert_eq!(a.units, b.units);
    }
}
