mod api_docs;
mod config;
mod controllers;
mod document;
mod engine;
mod models;
mod routes;
mod services;
mod shared_state;

use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use axum::{response::Html, routing::get, Router};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::document::Capitolato;
use crate::engine::catalog::ProductCatalog;
use crate::engine::designer::design_system;
use crate::models::design::{DesignRequest, SystemDesign};
use crate::services::{analysis, narrative_service};
use crate::shared_state::AppState;

#[derive(Parser)]
#[command(
    name = "solar-capitolato",
    version,
    about = "Generatore di capitolati tecnici per impianti fotovoltaici in Italia"
)]
struct Cli {
    /// Configuration file; built-in defaults apply when missing
    #[arg(long, default_value = "config.json")]
    config: String,
    /// Product catalog file; the embedded snapshot applies when missing
    #[arg(long, default_value = "data/catalog.json")]
    catalog: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analizza un sito a partire dall'indirizzo
    Analyze { address: String },
    /// Dimensiona un impianto e stampa il progetto
    Design {
        #[arg(long, short = 'a')]
        address: String,
        /// Consumo annuo (kWh)
        #[arg(long, short = 'c')]
        consumption: f64,
        /// Area tetto disponibile (m²)
        #[arg(long, short = 'r')]
        roof_area: f64,
        /// Inclinazione reale della falda (gradi)
        #[arg(long)]
        tilt: Option<f64>,
        /// Azimut reale della falda (gradi, 0 = sud)
        #[arg(long)]
        azimuth: Option<f64>,
    },
    /// Genera il capitolato tecnico in markdown
    Generate {
        #[arg(long, short = 'a')]
        address: String,
        #[arg(long, short = 'c')]
        consumption: f64,
        #[arg(long, short = 'r')]
        roof_area: f64,
        #[arg(long)]
        tilt: Option<f64>,
        #[arg(long)]
        azimuth: Option<f64>,
        /// File di output
        #[arg(long, short = 'o', default_value = "capitolato.md")]
        output: String,
    },
    /// Avvia il server HTTP
    Serve,
}

fn load_catalog(path: &str) -> anyhow::Result<ProductCatalog> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            ProductCatalog::from_json(&content).with_context(|| format!("catalogo {path}"))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("catalogo {path} assente, uso lo snapshot integrato");
            Ok(ProductCatalog::builtin())
        }
        Err(e) => Err(e).with_context(|| format!("catalogo {path}")),
    }
}

async fn run_design(
    address: &str,
    consumption: f64,
    roof_area: f64,
    tilt: Option<f64>,
    azimuth: Option<f64>,
    config: &Config,
    catalog: &ProductCatalog,
) -> anyhow::Result<SystemDesign> {
    let analysis = analysis::analyze_site(address, config).await?;
    let request = DesignRequest {
        address: address.to_string(),
        annual_consumption_kwh: consumption,
        roof_area_m2: roof_area,
        roof_tilt_deg: tilt,
        roof_azimuth_deg: azimuth,
    };
    Ok(design_system(
        analysis.site,
        analysis.solar,
        &request,
        catalog,
        &config.engine,
    )?)
}

fn print_design_summary(design: &SystemDesign) {
    println!("⚡ Impianto dimensionato: {} kWp", design.system_size_kwp);
    println!(
        "   Moduli: {} × {} {}",
        design.num_panels, design.module.manufacturer, design.module.model
    );
    match &design.inverter {
        Some(sel) => println!(
            "   Inverter: {} × {} {}",
            sel.units, sel.inverter.manufacturer, sel.inverter.model
        ),
        None => println!("   Inverter: da definire"),
    }
    println!(
        "   Produzione stimata: {:.0} kWh/anno (autoconsumo {}%)",
        design.estimated_production_kwh, design.self_consumption_rate_pct
    );
    println!(
        "   Costo stimato: €{:.0} — rientro in {} anni",
        design.economics.total_cost_eur, design.economics.payback_years
    );
    println!("   Incentivo: {}", design.economics.incentive_type.as_str());
    for note in &design.notes {
        println!("   ⚠ {note}");
    }
}

async fn serve(config: Config, catalog: ProductCatalog) -> anyhow::Result<()> {
    let port = config.server.port;
    let state = AppState::new(config, catalog);

    let app = Router::new()
        .nest("/api", routes::design_routes::api_routes(state))
        .route(
            "/scalar",
            get(|| async { Html(Scalar::new(ApiDoc::openapi()).to_html()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API in ascolto su http://{addr}");
    tracing::info!("Scalar UI: http://{addr}/scalar");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .map_err(|e| anyhow!("configurazione {}: {e}", cli.config))?;
    let catalog = load_catalog(&cli.catalog)?;

    match cli.command {
        Command::Analyze { address } => {
            let result = analysis::analyze_site(&address, &config).await?;
            println!("☀️ Analisi solare — {}", result.site.municipality);
            println!("   Indirizzo: {}", result.site.address);
            println!(
                "   Coordinate: {:.5}°N, {:.5}°E",
                result.site.latitude, result.site.longitude
            );
            println!("   Regione: {}", result.site.region);
            println!("   Zona climatica: {}", result.site.climate_zone.as_str());
            println!("   Zona sismica: {}", result.site.seismic_zone.as_str());
            println!(
                "   Irraggiamento annuo: {} kWh/m²/anno",
                result.solar.annual_irradiation_kwh_m2
            );
            println!(
                "   Inclinazione/azimut ottimali: {}° / {}°",
                result.solar.optimal_tilt_deg, result.solar.optimal_azimuth_deg
            );
            println!(
                "   Producibilità: {} kWh/kWp/anno",
                result.solar.annual_production_per_kwp
            );
            for w in &result.warnings {
                println!("   ⚠ {w}");
            }
        }
        Command::Design {
            address,
            consumption,
            roof_area,
            tilt,
            azimuth,
        } => {
            let design = run_design(
                &address, consumption, roof_area, tilt, azimuth, &config, &catalog,
            )
            .await?;
            print_design_summary(&design);
        }
        Command::Generate {
            address,
            consumption,
            roof_area,
            tilt,
            azimuth,
            output,
        } => {
            let design = run_design(
                &address, consumption, roof_area, tilt, azimuth, &config, &catalog,
            )
            .await?;
            print_design_summary(&design);

            let narrative =
                narrative_service::generate_narrative(&design, &config.narrative).await;
            let capitolato = Capitolato::from_design(&design, narrative.as_ref());
            std::fs::write(&output, capitolato.to_markdown())
                .with_context(|| format!("scrittura {output}"))?;
            println!("✅ Capitolato generato: {output}");
        }
        Command::Serve => serve(config, catalog).await?,
    }

    Ok(())
}
