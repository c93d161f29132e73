use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use course_payments::config::AppConfig;
use course_payments::gateway::mock::MockGateway;
use course_payments::gateway::paymob::PaymobGateway;
use course_payments::gateway::PaymentProvider;
use course_payments::reconcile::engine::ReconcileEngine;
use course_payments::repo::courses_repo::CoursesRepo;
use course_payments::service::payment_service::PaymentService;
use course_payments::store::postgres::PgPaymentStore;
use course_payments::webhook::signature::SignatureVerifier;
use course_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    let store = PgPaymentStore { pool: pool.clone() };
    let courses_repo = CoursesRepo { pool: pool.clone() };

    let provider: Arc<dyn PaymentProvider> = if cfg.gateway_adapter == "MOCK" {
        Arc::new(MockGateway {
            behavior: "ALWAYS_SUCCESS".to_string(),
        })
    } else {
        Arc::new(PaymobGateway {
            base_url: cfg.gateway_base_url.clone(),
            api_key: cfg.gateway_api_key.clone(),
            integration_id: cfg.gateway_integration_id,
            iframe_id: cfg.gateway_iframe_id.clone(),
            timeout_ms: cfg.gateway_timeout_ms,
            client: reqwest::Client::new(),
        })
    };

    let engine = ReconcileEngine::new(store.clone(), provider.clone());
    let payment_service = PaymentService {
        store,
        courses_repo,
        engine,
        provider,
    };

    let verifier = SignatureVerifier::new(cfg.webhook_hmac_secret.clone());
    if !verifier.has_secret() {
        tracing::warn!("WEBHOOK_HMAC_SECRET is not set; all inbound webhooks will be rejected");
    }

    let state = AppState {
        payment_service,
        verifier,
        redis_client,
    };

    let admin_key = cfg.admin_api_key.clone();
    let admin_routes = Router::new()
        .route(
            "/webhooks/:event_id/retry",
            post(course_payments::http::handlers::webhooks::retry_webhook_event),
        )
        .route(
            "/payments/:payment_id/complete",
            post(course_payments::http::handlers::payments::manual_complete),
        )
        .layer(from_fn_with_state(
            admin_key,
            course_payments::http::middleware::admin_auth::require_admin_key,
        ));

    let public_routes = Router::new()
        .route(
            "/payments",
            post(course_payments::http::handlers::payments::create_payment),
        )
        .route(
            "/payments/:payment_id/status",
            get(course_payments::http::handlers::payments::get_status),
        )
        .route(
            "/payments/:payment_id/retry",
            post(course_payments::http::handlers::payments::retry_payment),
        )
        .route(
            "/payments/:payment_id/cancel",
            post(course_payments::http::handlers::payments::cancel_payment),
        )
        .route(
            "/courses/:course_id/access",
            get(course_payments::http::handlers::courses::get_access),
        )
        .route(
            "/courses/:course_id/enroll",
            post(course_payments::http::handlers::courses::enroll_free),
        )
        .layer(from_fn_with_state(
            course_payments::http::middleware::rate_limit::RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: cfg.rate_limit_per_minute,
            },
            course_payments::http::middleware::rate_limit::enforce,
        ));

    let app = Router::new()
        .route("/health", get(course_payments::http::handlers::payments::health))
        .route(
            "/webhooks/gateway",
            post(course_payments::http::handlers::webhooks::receive_gateway_webhook),
        )
        .route("/ops/liveness", get(course_payments::http::handlers::ops::liveness))
        .route("/ops/readiness", get(course_payments::http::handlers::ops::readiness))
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
