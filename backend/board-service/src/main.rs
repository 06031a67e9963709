use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use board_service::error::AppError;
use board_service::{handlers, metrics, middleware};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: PgPool,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "board-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "board-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

fn path_error_handler(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match board_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting board-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let mut db_cfg = DbPoolConfig::from_env().unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    if db_cfg.max_connections < config.database.max_connections {
        db_cfg.max_connections = config.database.max_connections;
    }

    db_cfg.log_config();
    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connected to database via db-pool crate");

    if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
        tracing::error!("Database migration failed: {:#}", e);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("migration failed: {e}"),
        ));
    }

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let server = HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(health_state.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::MetricsMiddleware)
            .route("/metrics", web::get().to(metrics::serve_metrics))
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    // Registration is called by the session gateway before an
                    // end-user identity exists, so it sits outside the
                    // identity-guarded scopes.
                    .service(
                        web::resource("/users").route(web::post().to(handlers::register_user)),
                    )
                    .service(
                        web::scope("/posts")
                            .wrap(middleware::IdentityMiddleware)
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_posts))
                                    .route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/mine").route(web::get().to(handlers::my_posts)),
                            )
                            .service(
                                web::resource("/archived")
                                    .route(web::get().to(handlers::archived_posts)),
                            )
                            .service(
                                web::resource("/favorites")
                                    .route(web::get().to(handlers::favorite_posts)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::patch().to(handlers::update_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            )
                            .service(
                                web::resource("/{post_id}/archive")
                                    .route(web::patch().to(handlers::archive_post)),
                            )
                            .service(
                                web::resource("/{post_id}/unarchive")
                                    .route(web::patch().to(handlers::unarchive_post)),
                            )
                            .service(
                                web::resource("/{post_id}/favorite")
                                    .route(web::post().to(handlers::favorite_post)),
                            )
                            .service(
                                web::resource("/{post_id}/favorited")
                                    .route(web::get().to(handlers::is_favorite_post)),
                            )
                            .service(
                                web::resource("/{post_id}/comments")
                                    .route(web::get().to(handlers::post_comments)),
                            ),
                    )
                    .service(
                        web::scope("/comments")
                            .wrap(middleware::IdentityMiddleware)
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::create_comment)),
                            )
                            .service(
                                web::resource("/{comment_id}")
                                    .route(web::patch().to(handlers::update_comment))
                                    .route(web::delete().to(handlers::delete_comment)),
                            )
                            .service(
                                web::resource("/{comment_id}/upvote")
                                    .route(web::post().to(handlers::upvote_comment)),
                            )
                            .service(
                                web::resource("/{comment_id}/downvote")
                                    .route(web::post().to(handlers::downvote_comment)),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(middleware::IdentityMiddleware)
                            .service(
                                web::resource("/me")
                                    .route(web::get().to(handlers::get_me))
                                    .route(web::patch().to(handlers::update_me)),
                            ),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run();

    tracing::info!("HTTP server is running");
    let result = server.await;
    tracing::info!("Board-service shutting down");

    result
}
