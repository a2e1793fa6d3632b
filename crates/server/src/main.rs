//! survey-rs server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use survey_api::{AppState, auth_middleware, router as api_router};
use survey_common::Config;
use survey_core::{
    ChoiceService, PollService, QuestionService, SessionService, SubmissionService, UserService,
};
use survey_db::repositories::{
    ChoiceRepository, PollRepository, QuestionRepository, SessionRepository, UserFormRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting survey-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = survey_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    survey_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let choice_repo = ChoiceRepository::new(Arc::clone(&db));
    let user_form_repo = UserFormRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo);
    let session_service = SessionService::new(session_repo, &config.session);
    let poll_service = PollService::new(
        poll_repo.clone(),
        question_repo.clone(),
        choice_repo.clone(),
    );
    let question_service = QuestionService::new(
        question_repo.clone(),
        poll_repo.clone(),
        choice_repo.clone(),
    );
    let choice_service = ChoiceService::new(choice_repo.clone(), question_repo.clone());
    let submission_service =
        SubmissionService::new(user_form_repo, poll_repo, question_repo, choice_repo);

    if let Some(admin) = &config.admin {
        user_service
            .ensure_admin(&admin.username, &admin.password)
            .await?;
    }

    // Purge expired sessions in the background
    let purge_sessions = session_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = purge_sessions.purge_expired().await {
                tracing::error!(error = %e, "Failed to purge expired sessions");
            }
        }
    });

    let state = AppState {
        user_service,
        session_service,
        poll_service,
        question_service,
        choice_service,
        submission_service,
        session_config: config.session.clone(),
        pagination: config.pagination.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
