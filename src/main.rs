use std::path::Path;
use std::sync::Arc;

use trackbot::BotConfig;
use trackbot::auth::{AuthFlow, HttpAuthService};
use trackbot::classify::{Classifier, HttpClassifier};
use trackbot::dispatch::{Dispatcher, HttpDeliveryProvider};
use trackbot::records::HttpRecordService;
use trackbot::session::SessionStore;
use trackbot::webhook::{AppState, Orchestrator, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %config.bind_addr,
        db = %config.db_path,
        "starting trackbot"
    );

    let store = Arc::new(SessionStore::new_local(Path::new(&config.db_path)).await?);

    let auth_service = Arc::new(HttpAuthService::new(
        &config.auth_service_url,
        config.service_api_key.clone(),
    ));
    let auth_flow = Arc::new(AuthFlow::new(
        Arc::clone(&store),
        auth_service,
        config.pending_auth_ttl,
        config.session_ttl,
    ));

    let classifier = Arc::new(Classifier::new(
        Arc::new(HttpClassifier::new(
            &config.classifier_url,
            config.classifier_api_key.clone(),
        )),
        &config,
    ));
    let records = Arc::new(HttpRecordService::new(&config));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(HttpDeliveryProvider::new(&config)),
        &config,
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&store),
        Arc::clone(&auth_flow),
        classifier,
        records,
        dispatcher,
        &config,
    ));

    // Periodic maintenance: purge expired sessions, evict old dedupe
    // rows, drop stale in-memory state.
    {
        let store = Arc::clone(&store);
        let auth_flow = Arc::clone(&auth_flow);
        let orchestrator = Arc::clone(&orchestrator);
        let sweep_interval = config.sweep_interval;
        let dedupe_window = config.dedupe_window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(purged = n, "expired sessions purged"),
                    Err(e) => tracing::warn!(error = %e, "session purge failed"),
                }
                match store.evict_processed(dedupe_window).await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!(evicted = n, "old dedupe entries evicted"),
                    Err(e) => tracing::warn!(error = %e, "dedupe eviction failed"),
                }
                let swept = auth_flow.sweep_expired_pending().await;
                if swept > 0 {
                    tracing::debug!(swept, "stale pending-login markers dropped");
                }
                let swept = orchestrator.sweep_idle_lanes();
                if swept > 0 {
                    tracing::debug!(swept, "idle phone lanes dropped");
                }
            }
        });
    }

    let state = AppState {
        orchestrator,
        verify_token: config.verify_token.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "webhook listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
