use utoipa::OpenApi;

use crate::controllers::design_controller;
use crate::document;
use crate::models::design;

#[derive(OpenApi)]
#[openapi(
    paths(
        design_controller::health,
        design_controller::analyze,
        design_controller::create_design,
        design_controller::generate_document
    ),
    components(
        schemas(
            design::AnalyzeRequest,
            design::AnalysisResult,
            design::DesignRequest,
            design::SystemDesign,
            design::SiteFacts,
            design::SolarFacts,
            design::PvModule,
            design::Inverter,
            design::InverterSelection,
            design::EconomicAnalysis,
            design::IncentiveType,
            design::HealthStatus,
            document::Capitolato,
            document::DocumentSection
        )
    ),
    tags(
        (name = "solar-capitolato", description = "Dimensionamento impianti fotovoltaici e generazione capitolati")
    )
)]
pub struct ApiDoc;
