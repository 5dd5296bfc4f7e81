mod app;
mod auth;
mod config;
mod db;
mod dispatch;
mod notifier;
mod reminders;
mod state;
mod store;
mod timestamp;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "remindmail=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    db::migrate(&app_state.db).await;

    // `remindmail dispatch-once`: a single cycle for cron or serverless triggers.
    if std::env::args().nth(1).as_deref() == Some("dispatch-once") {
        let now = timestamp::wall_clock_now(app_state.config.dispatch.utc_offset_minutes)?;
        let report = dispatch::run_dispatch_cycle(&app_state, now).await?;
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let trigger = app_state
        .config
        .dispatch
        .enabled
        .then(|| dispatch::trigger::spawn(app_state.clone()));
    if trigger.is_none() {
        tracing::info!("in-process dispatch disabled; expecting an external trigger");
    }

    let result = app::serve(app::build_app(app_state)).await;

    if let Some(handle) = trigger {
        handle.abort();
    }
    result
}
