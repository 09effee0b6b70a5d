use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use features::api_routes;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::registrations::handlers::list_registrations,
        features::registrations::handlers::get_registration,
        features::registrations::handlers::register,
        features::registrations::handlers::unregister,
        features::registrations::handlers::set_lane,
        features::scores::handlers::list_scores,
        features::scores::handlers::get_score,
        features::scores::handlers::record_score,
        features::scores::handlers::correct_score,
        features::scores::handlers::invalidate_score,
        features::ranking::handlers::rank_event,
        features::ranking::handlers::recompute_all,
        features::standings::handlers::class_totals,
        features::standings::handlers::grade_medals,
        features::events::handlers::list_events,
        features::events::handlers::list_templates,
        features::events::handlers::get_event,
        features::events::handlers::create_event,
        features::events::handlers::create_from_template,
        features::events::handlers::update_event,
        features::events::handlers::delete_event,
        features::events::handlers::create_group,
        features::events::handlers::update_group,
        features::events::handlers::delete_group,
        features::events::handlers::get_point_table,
        features::events::handlers::update_point_table,
        features::events::handlers::default_point_table,
        features::events::handlers::update_all_point_tables,
        features::roster::handlers::list_grades,
        features::roster::handlers::create_grade,
        features::roster::handlers::delete_grade,
        features::roster::handlers::list_classes,
        features::roster::handlers::create_class,
        features::roster::handlers::delete_class,
        features::roster::handlers::list_students,
        features::roster::handlers::get_student,
        features::roster::handlers::create_student,
        features::roster::handlers::delete_student,
        features::imports::handlers::import_registrations,
        features::imports::handlers::import_scores,
    ),
    components(
        schemas(
            storage::dto::common::PaginationMeta,
            storage::dto::registration::CreateRegistrationRequest,
            storage::dto::registration::SetLaneRequest,
            storage::dto::registration::RegistrationDetail,
            storage::dto::score::RecordScoreRequest,
            storage::dto::score::CorrectScoreRequest,
            storage::dto::score::InvalidateScoreRequest,
            storage::dto::score::ScoreDetail,
            storage::dto::ranking::EventRanking,
            storage::dto::ranking::RankingEntry,
            storage::dto::ranking::StudentInfo,
            storage::dto::ranking::ScoreInfo,
            storage::dto::ranking::RecomputeResponse,
            storage::dto::standings::ClassStanding,
            storage::dto::standings::GradeMedals,
            storage::dto::event::CreateEventRequest,
            storage::dto::event::CreateFromTemplateRequest,
            storage::dto::event::CreateGroupRequest,
            storage::dto::event::UpdateEventRequest,
            storage::dto::event::UpdateGroupRequest,
            storage::dto::event::UpdatePointTableRequest,
            storage::dto::event::PointTableResponse,
            storage::dto::event::BulkUpdateResponse,
            storage::dto::event::EventDetailResponse,
            storage::dto::event::EventTemplateResponse,
            storage::dto::roster::CreateGradeRequest,
            storage::dto::roster::CreateClassRequest,
            storage::dto::roster::CreateStudentRequest,
            storage::dto::roster::ClassDetail,
            storage::dto::import::RegistrationImportRow,
            storage::dto::import::ScoreImportRow,
            storage::dto::import::ImportRegistrationsRequest,
            storage::dto::import::ImportScoresRequest,
            storage::dto::import::ImportReport,
            storage::dto::import::RowError,
            storage::error::Rejection,
            storage::error::Resource,
            storage::error::GroupConstraint,
            storage::models::Grade,
            storage::models::Class,
            storage::models::Student,
            storage::models::Gender,
            storage::models::Event,
            storage::models::EventGroup,
            storage::models::EventType,
            storage::models::Comparison,
            storage::models::GroupGender,
            storage::models::Registration,
            storage::models::Score,
            storage::models::Round,
            storage::services::ranking_engine::TieBreak,
        )
    ),
    tags(
        (name = "registrations", description = "Entry ledger"),
        (name = "scores", description = "Result ledger"),
        (name = "rankings", description = "Event rankings"),
        (name = "standings", description = "Class totals and grade medal table"),
        (name = "events", description = "Event catalogue and groups"),
        (name = "scoring-rules", description = "Point tables"),
        (name = "roster", description = "Grades, classes and students"),
        (name = "imports", description = "Batch import"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting athletics meet API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!(tie_break = %config.tie_break, "Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, every write route will answer 401");
    }

    let state = AppState {
        db,
        tie_break: config.tie_break,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(api_keys))
        .layer(cors)
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
