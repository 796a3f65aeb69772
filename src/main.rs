use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use schoolhub_server::assignment::handlers::list_student_assignments;
use schoolhub_server::auth::handlers::{login, me, register};
use schoolhub_server::classroom::handlers::{
    create_classroom, join_classroom, list_student_classrooms, list_teacher_classrooms,
};
use schoolhub_server::stats::handlers::{student_stats, teacher_stats};
use schoolhub_server::{health_check, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> schoolhub_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration; a missing signing secret is fatal here.
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!(
        "Starting server at {}:{}",
        config.server.host, config.server.port
    );

    // Initialize application state: pool, migrations, services
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                // More restrictive CORS for production use
                cors_config
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin("http://127.0.0.1:8080")
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            cors_config.max_age(config.cors.max_age as usize)
        } else {
            // CORS disabled - use most restrictive settings
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/api/auth/register", web::post().to(register))
            .route("/api/auth/login", web::post().to(login))
            .route("/api/auth/me", web::get().to(me))
            .route("/api/teacher/stats", web::get().to(teacher_stats))
            .route("/api/teacher/classrooms", web::post().to(create_classroom))
            .route(
                "/api/teacher/classrooms",
                web::get().to(list_teacher_classrooms),
            )
            .route("/api/student/stats", web::get().to(student_stats))
            .route(
                "/api/student/classrooms",
                web::get().to(list_student_classrooms),
            )
            .route(
                "/api/student/classrooms/join",
                web::post().to(join_classroom),
            )
            .route(
                "/api/student/assignments",
                web::get().to(list_student_assignments),
            )
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
