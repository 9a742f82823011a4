use std::{env, sync::Arc, time::Duration};

use actix_web::{web, App, HttpServer};
use contact_intake::{
    background_task::start_eviction_task,
    captcha::hcaptcha::HCaptchaVerifier,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::stop_on_signal,
    limiter::{memory_store::InMemoryRateLimitStore, redis_store::RedisRateLimitStore},
    middlewares::cors::cors_headers,
    repositories::{rate_limit::RateLimitStore, sqlx_repo::SqlxContactRepo},
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

const EVICTION_INTERVAL: Duration = Duration::from_secs(30);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let production = env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if production {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn rate_limit_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RateLimitStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisRateLimitStore::from_url(url)?;
            if let Err(e) = store.ping().await {
                tracing::warn!(error = %e, "Redis unreachable at startup");
            }
            let store: Arc<dyn RateLimitStore> = Arc::new(store);
            Ok(store)
        }
        None => {
            tracing::warn!("No Redis configured, rate limits are tracked per process");
            let store = InMemoryRateLimitStore::new();
            tokio::spawn(start_eviction_task(store.clone(), EVICTION_INTERVAL));
            let store: Arc<dyn RateLimitStore> = Arc::new(store);
            Ok(store)
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = create_pool(
        &config.database_url,
        config.database_max_connections,
        config.outbound_timeout(),
    )
    .await?;
    run_migrations(&pool).await?;

    let contact_repo = Arc::new(SqlxContactRepo::new(pool));
    let store = rate_limit_store(&config).await?;
    let captcha = Arc::new(HCaptchaVerifier::from_config(&config)?);

    let app_state = web::Data::new(AppState::new(&config, contact_repo, store, captcha));
    let allowed_origin = config.cors_allowed_origin.clone();
    let server_addr = config.server_addr();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors_headers(&allowed_origin))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .disable_signals()
    .bind(server_addr)?
    .run();

    tokio::spawn(stop_on_signal(server.handle()));

    server.await?;
    Ok(())
}
