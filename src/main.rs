use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canchapp_api::{
    config::Config, db, middleware::auth::JwtSecret, routes, services::email::EmailService,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let email = EmailService::new(&config).map(Arc::new);
    if email.is_some() {
        info!("SMTP email service configured");
    } else {
        info!("SMTP not configured — email notifications disabled");
    }

    let state = AppState {
        db: pool,
        config: config.clone(),
        email,
    };

    // CORS: allow the configured app origin; localhost always passes for
    // local development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Reservas
        .route("/reservas", post(routes::reservas::crear_reserva))
        .route("/reservas/calendario", get(routes::reservas::calendario))
        .route(
            "/reservas/{id}",
            get(routes::reservas::obtener_reserva)
                .patch(routes::reservas::actualizar_reserva)
                .delete(routes::reservas::eliminar_reserva),
        )
        // QR
        .route("/qr/por-reserva/{id_reserva}", get(routes::qr::qr_por_reserva))
        .route(
            "/qr/regenerar-por-reserva/{id_reserva}",
            post(routes::qr::regenerar_por_reserva),
        )
        // Unión por código
        .route("/unirse-reserva", post(routes::unirse::unirse))
        .route("/unirse-reserva/info", get(routes::unirse::info))
        .route("/unirse-reserva/deportistas", get(routes::unirse::deportistas))
        // Roster manejado por el personal
        .route(
            "/participa-en/reserva/{id_reserva}/agregar",
            post(routes::participa::agregar),
        )
        .route(
            "/participa-en/reserva/{id_reserva}/deportista/{id_deportista}",
            delete(routes::participa::remover),
        )
        // Solicitudes de rol
        .route(
            "/solicitudes-rol",
            get(routes::solicitudes::listar).post(routes::solicitudes::crear),
        )
        .route("/solicitudes-rol/{id}/aprobar", post(routes::solicitudes::aprobar))
        .route("/solicitudes-rol/{id}/rechazar", post(routes::solicitudes::rechazar))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("canchapp API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
