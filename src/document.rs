use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::design::SystemDesign;
use crate::services::narrative_service::NarrativeSections;

/// One titled block of the capitolato.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentSection {
    pub title: String,
    pub body: String,
}

/// Assembled technical document. Structured sections plus a markdown
/// rendering; page-layout formats (PDF/DOCX) are a downstream concern.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Capitolato {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub title: String,
    pub sections: Vec<DocumentSection>,
}

fn section(title: &str, body: String) -> DocumentSection {
    DocumentSection {
        title: title.to_string(),
        body,
    }
}

impl Capitolato {
    /// Merge the design figures (and the narrative prose, when available)
    /// into the fixed document outline.
    pub fn from_design(design: &SystemDesign, narrative: Option<&NarrativeSections>) -> Self {
        let mut sections = Vec::new();

        if let Some(text) = narrative.and_then(|n| n.premessa.clone()) {
            sections.push(section("Premessa", text));
        }

        let mut sito = vec![
            format!("Indirizzo: {}", design.site.address),
            format!(
                "Coordinate: {:.5}°N, {:.5}°E",
                design.site.latitude, design.site.longitude
            ),
            format!(
                "Comune: {} ({}) — Regione: {}",
                design.site.municipality, design.site.province, design.site.region
            ),
            format!("Zona climatica: {}", design.site.climate_zone.as_str()),
            format!("Zona sismica: {}", design.site.seismic_zone.as_str()),
        ];
        if let Some(text) = narrative.and_then(|n| n.analisi_sito.clone()) {
            sito.push(String::new());
            sito.push(text);
        }
        sections.push(section("Dati del sito", sito.join("\n")));

        let mut solare = vec![
            format!(
                "Irraggiamento annuo (piano ottimale): {} kWh/m²/anno",
                design.solar.annual_irradiation_kwh_m2
            ),
            format!("Inclinazione assunta: {}°", design.tilt_deg),
            format!("Azimut assunto: {}° (0 = sud)", design.azimuth_deg),
            format!(
                "Producibilità specifica: {} kWh/kWp/anno",
                design.solar.annual_production_per_kwp
            ),
        ];
        if let Some(text) = narrative.and_then(|n| n.risorsa_solare.clone()) {
            solare.push(String::new());
            solare.push(text);
        }
        sections.push(section("Analisi solare", solare.join("\n")));

        let mut impianto = vec![
            format!("Potenza nominale: {} kWp", design.system_size_kwp),
            format!(
                "Moduli: {} × {} {} ({} Wp, η = {}%)",
                design.num_panels,
                design.module.manufacturer,
                design.module.model,
                design.module.power_wp,
                design.module.efficiency_pct
            ),
            match &design.inverter {
                Some(sel) => format!(
                    "Inverter: {} × {} {} ({} kW AC cadauno)",
                    sel.units, sel.inverter.manufacturer, sel.inverter.model, sel.inverter.power_kw
                ),
                None => "Inverter: da definire in fase esecutiva".to_string(),
            },
            format!(
                "Produzione annua stimata: {:.0} kWh",
                design.estimated_production_kwh
            ),
            format!(
                "Autoconsumo stimato: {}%",
                design.self_consumption_rate_pct
            ),
        ];
        if let Some(text) = narrative.and_then(|n| n.dimensionamento.clone()) {
            impianto.push(String::new());
            impianto.push(text);
        }
        sections.push(section("Dimensionamento impianto", impianto.join("\n")));

        let eco = &design.economics;
        let mut economica = vec![
            format!("Costo totale stimato: €{:.2}", eco.total_cost_eur),
            format!("Costo per kWp: €{:.2}/kWp", eco.cost_per_kwp_eur),
            format!("Risparmio annuo stimato: €{:.2}", eco.annual_savings_eur),
            format!("Tempo di rientro: {} anni", eco.payback_years),
            format!("ROI a 25 anni: {}%", eco.roi_25y_percent),
            format!("LCOE: €{}/kWh", eco.lcoe_eur_kwh),
            format!(
                "Regime incentivante: {} (valore stimato €{:.2})",
                eco.incentive_type.as_str(),
                eco.incentive_value_eur
            ),
        ];
        if let Some(text) = narrative.and_then(|n| n.analisi_economica.clone()) {
            economica.push(String::new());
            economica.push(text);
        }
        sections.push(section("Analisi economica", economica.join("\n")));

        if !design.notes.is_empty() {
            let body = design
                .notes
                .iter()
                .map(|n| format!("• {n}"))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(section("Note", body));
        }

        sections.push(section(
            "Riferimenti normativi",
            [
                "• CEI 0-21 — Regola tecnica di connessione utenti attivi BT",
                "• CEI 0-16 — Regola tecnica di connessione utenti attivi MT",
                "• D.Lgs. 199/2021 — Attuazione direttiva RED II",
                "• DM 17/01/2018 — Norme tecniche per le costruzioni (NTC 2018)",
            ]
            .join("\n"),
        ));

        if let Some(text) = narrative.and_then(|n| n.conclusioni.clone()) {
            sections.push(section("Conclusioni", text));
        }

        Capitolato {
            id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            title: format!(
                "Capitolato Tecnico — Impianto Fotovoltaico {} kWp, {}",
                design.system_size_kwp, design.site.municipality
            ),
            sections,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "# {}\n\n*Documento {} — generato il {}*\n",
            self.title,
            self.id,
            self.generated_at.format("%d/%m/%Y")
        );
        for (i, s) in self.sections.iter().enumerate() {
            out.push_str(&format!("\n## {}. {}\n\n{}\n", i + 1, s.title, s.body));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::catalog::ProductCatalog;
    use crate::engine::designer::design_system;
    use crate::models::design::{ClimateZone, DesignRequest, SeismicZone, SiteFacts, SolarFacts};

    fn design() -> SystemDesign {
        let site = SiteFacts {
            address: "Via Garibaldi 5, 10122 Torino TO".to_string(),
            latitude: 45.07,
            longitude: 7.68,
            municipality: "Torino".to_string(),
            province: "TO".to_string(),
            region: "Piemonte".to_string(),
            climate_zone: ClimateZone::E,
            seismic_zone: SeismicZone::Zone3,
        };
        let solar = SolarFacts {
            annual_irradiation_kwh_m2: 1600.0,
            optimal_tilt_deg: 37.0,
            optimal_azimuth_deg: 0.0,
            annual_production_per_kwp: 1350.0,
            monthly_irradiation_kwh_m2: vec![],
        };
        let request = DesignRequest {
            address: site.address.clone(),
            annual_consumption_kwh: 4200.0,
            roof_area_m2: 35.0,
            roof_tilt_deg: None,
            roof_azimuth_deg: None,
        };
        design_system(
            site,
            solar,
            &request,
            &ProductCatalog::builtin(),
            &EngineConfig::default(),
        )
        .expect("design")
    }

    #[test]
    fn markdown_carries_the_key_figures() {
        let design = design();
        let doc = Capitolato::from_design(&design, None);
        let md = doc.to_markdown();
        assert!(md.contains("Torino"));
        assert!(md.contains(&format!("{} kWp", design.system_size_kwp)));
        assert!(md.contains("Analisi economica"));
        assert!(md.contains("CEI 0-21"));
    }

    #[test]
    fn narrative_sections_are_merged_when_present() {
        let narrative = NarrativeSections {
            premessa: Some("Scopo del documento.".to_string()),
            conclusioni: Some("Investimento consigliabile.".to_string()),
            ..NarrativeSections::default()
        };
        let doc = Capitolato::from_design(&design(), Some(&narrative));
        assert_eq!(doc.sections.first().map(|s| s.title.as_str()), Some("Premessa"));
        assert_eq!(
            doc.sections.last().map(|s| s.title.as_str()),
            Some("Conclusioni")
        );
    }

    #[test]
    fn without_narrative_the_outline_is_tabular_only() {
        let doc = Capitolato::from_design(&design(), None);
        assert!(doc.sections.iter().all(|s| s.title != "Premessa"));
        assert!(doc.sections.iter().any(|s| s.title == "Dati del sito"));
    }
}
