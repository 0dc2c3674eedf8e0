use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};
use walletgate_core::services::{AlertService, SubscriptionService};
use walletgate_core::AppState;

pub fn spawn_background_tasks(state: Arc<AppState>) -> Vec<JoinHandle<()>> {
    let sweep_state = state.clone();
    let sweep = tokio::spawn(async move {
        info!("Starting periodic alert sweep task");
        alert_sweep(sweep_state).await;
    });

    let expiry_state = state.clone();
    let expiry = tokio::spawn(async move {
        info!("Starting subscription expiry housekeeping task");
        expire_subscriptions(expiry_state).await;
    });

    info!("Background maintenance tasks spawned");

    vec![sweep, expiry]
}

async fn alert_sweep(state: Arc<AppState>) {
    // The first tick fires immediately, so a pass runs at boot.
    let mut interval = interval(state.config.alerts.sweep_interval);

    loop {
        interval.tick().await;

        let today = Utc::now().date_naive();
        match AlertService::run_sweep(&state, today).await {
            Ok(report) if report.sent + report.failed == 0 => debug!("Alert sweep: nothing to send"),
            Ok(report) => info!("Alert sweep: {} sent, {} failed", report.sent, report.failed),
            Err(e) => error!("Alert sweep failed: {}", e),
        }
    }
}

async fn expire_subscriptions(state: Arc<AppState>) {
    let mut interval = interval(state.config.alerts.sweep_interval);

    loop {
        interval.tick().await;

        let today = Utc::now().date_naive();
        match SubscriptionService::expire_lapsed(&state, today).await {
            Ok(0) => debug!("No lapsed subscriptions"),
            Ok(n) => info!("Expired {} lapsed subscriptions", n),
            Err(e) => error!("Subscription expiry failed: {}", e),
        }
    }
}
