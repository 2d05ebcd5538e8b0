use serde::{Deserialize, Serialize};

use crate::config::NarrativeConfig;
use crate::models::design::SystemDesign;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "\
Sei un ingegnere fotovoltaico italiano esperto nella redazione di capitolati tecnici. \
Scrivi in italiano tecnico-professionale, preciso e formale ma chiaro. \
Non inventare dati: usa esclusivamente i dati forniti nel contesto. \
Non usare markdown, emoji o formattazione speciale: scrivi solo testo piano. \
Ogni sezione deve essere un paragrafo discorsivo di 3-6 frasi.";

// ─── Anthropic Messages wire types ───────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

// ─── Narrative sections ──────────────────────────────────────────────────────

/// Prose sections of the capitolato, keyed by the fixed document outline.
#[derive(Debug, Clone, Default)]
pub struct NarrativeSections {
    pub premessa: Option<String>,
    pub analisi_sito: Option<String>,
    pub risorsa_solare: Option<String>,
    pub dimensionamento: Option<String>,
    pub analisi_economica: Option<String>,
    pub conclusioni: Option<String>,
}

impl NarrativeSections {
    pub fn is_empty(&self) -> bool {
        self.premessa.is_none()
            && self.analisi_sito.is_none()
            && self.risorsa_solare.is_none()
            && self.dimensionamento.is_none()
            && self.analisi_economica.is_none()
            && self.conclusioni.is_none()
    }
}

fn build_prompt(design: &SystemDesign) -> String {
    let inverter = match &design.inverter {
        Some(sel) => format!(
            "Inverter: {} {} × {}, potenza AC totale {:.1} kW.",
            sel.inverter.manufacturer,
            sel.inverter.model,
            sel.units,
            sel.total_ac_kw()
        ),
        None => "Inverter: da definire in fase esecutiva.".to_string(),
    };
    let notes = if design.notes.is_empty() {
        String::new()
    } else {
        format!("Note tecniche: {}", design.notes.join("; "))
    };

    format!(
        "Genera la narrativa tecnica per il capitolato di un impianto fotovoltaico \
         con i seguenti dati.\n\n\
         DATI DEL SITO:\n\
         Indirizzo: {}\n\
         Coordinate: {:.5} N, {:.5} E\n\
         Comune: {} ({}), Regione: {}\n\
         Zona climatica: {}\n\
         Zona sismica: {}\n\n\
         DATI SOLARI:\n\
         Irraggiamento annuo: {} kWh/m2/anno\n\
         Inclinazione assunta: {} gradi, azimut {} gradi\n\
         Producibilita specifica: {} kWh/kWp/anno\n\n\
         DIMENSIONAMENTO:\n\
         Potenza nominale: {} kWp, moduli: {} x {} {}\n\
         {}\n\
         Produzione annua stimata: {:.0} kWh, autoconsumo {}%\n\n\
         ANALISI ECONOMICA:\n\
         Costo totale: {:.2} EUR ({:.0} EUR/kWp). Risparmio annuo: {:.2} EUR. \
         Rientro: {} anni. ROI 25 anni: {}%. LCOE: {} EUR/kWh. \
         Incentivo: {}, valore {:.2} EUR.\n\n\
         {}\n\n\
         Scrivi le seguenti sezioni, ciascuna come paragrafo narrativo di 3-6 frasi, \
         separate da una riga vuota, con il titolo in maiuscolo seguito da due punti:\n\
         1. PREMESSA\n2. ANALISI DEL SITO\n3. RISORSA SOLARE\n\
         4. DIMENSIONAMENTO DELL'IMPIANTO\n5. ANALISI ECONOMICA\n6. CONCLUSIONI",
        design.site.address,
        design.site.latitude,
        design.site.longitude,
        design.site.municipality,
        design.site.province,
        design.site.region,
        design.site.climate_zone.as_str(),
        design.site.seismic_zone.as_str(),
        design.solar.annual_irradiation_kwh_m2,
        design.tilt_deg,
        design.azimuth_deg,
        design.solar.annual_production_per_kwp,
        design.system_size_kwp,
        design.num_panels,
        design.module.manufacturer,
        design.module.model,
        inverter,
        design.estimated_production_kwh,
        design.self_consumption_rate_pct,
        design.economics.total_cost_eur,
        design.economics.cost_per_kwp_eur,
        design.economics.annual_savings_eur,
        design.economics.payback_years,
        design.economics.roi_25y_percent,
        design.economics.lcoe_eur_kwh,
        design.economics.incentive_type.as_str(),
        design.economics.incentive_value_eur,
        notes,
    )
}

/// Split the model reply into named sections on the uppercase headers the
/// prompt asked for. Longer headers are matched first so "DIMENSIONAMENTO
/// DELL'IMPIANTO" does not collide with "DIMENSIONAMENTO".
fn parse_sections(text: &str) -> NarrativeSections {
    const HEADERS: &[(&str, usize)] = &[
        ("DIMENSIONAMENTO DELL'IMPIANTO", 3),
        ("ANALISI DEL SITO", 1),
        ("RISORSA SOLARE", 2),
        ("DIMENSIONAMENTO", 3),
        ("ANALISI ECONOMICA", 4),
        ("CONCLUSIONI", 5),
        ("PREMESSA", 0),
    ];

    let mut bodies: [Vec<String>; 6] = std::array::from_fn(|_| Vec::new());
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let stripped = line.trim();
        let header = HEADERS
            .iter()
            .find(|(h, _)| stripped.to_uppercase().starts_with(h));
        if let Some(&(h, slot)) = header {
            current = Some(slot);
            let rest = stripped[h.len()..].trim_start_matches(':').trim();
            if !rest.is_empty() {
                bodies[slot].push(rest.to_string());
            }
        } else if let Some(slot) = current {
            bodies[slot].push(line.trim_end().to_string());
        }
    }

    let take = |v: &Vec<String>| {
        let joined = v.join("\n").trim().to_string();
        (!joined.is_empty()).then_some(joined)
    };

    NarrativeSections {
        premessa: take(&bodies[0]),
        analisi_sito: take(&bodies[1]),
        risorsa_solare: take(&bodies[2]),
        dimensionamento: take(&bodies[3]),
        analisi_economica: take(&bodies[4]),
        conclusioni: take(&bodies[5]),
    }
}

/// Generate the prose sections via the Anthropic Messages API.
///
/// Returns `None` when no API key is configured or the call fails — the
/// document falls back to its tabular sections, never to an error.
pub async fn generate_narrative(
    design: &SystemDesign,
    cfg: &NarrativeConfig,
) -> Option<NarrativeSections> {
    if cfg.api_key.is_empty() {
        tracing::debug!("chiave API non configurata, narrativa disabilitata");
        return None;
    }

    let request = MessagesRequest {
        model: &cfg.model,
        max_tokens: cfg.max_tokens,
        system: SYSTEM_PROMPT,
        messages: vec![ChatMessage {
            role: "user",
            content: build_prompt(design),
        }],
    };

    let result = async {
        reqwest::Client::new()
            .post(MESSAGES_URL)
            .header("x-api-key", cfg.api_key.as_str())
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<MessagesResponse>()
            .await
    }
    .await;

    match result {
        Ok(response) => {
            let text: String = response
                .content
                .iter()
                .filter(|b| b.kind == "text")
                .map(|b| b.text.as_str())
                .collect();
            let sections = parse_sections(&text);
            (!sections.is_empty()).then_some(sections)
        }
        Err(e) => {
            tracing::warn!("generazione narrativa fallita: {e}");
            None
        }
    }
}
