mod args;
mod config;
mod paths;
mod report;

use std::io;
use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use app_api::AppContext;
use args::{Cli, Command};
use http_api::{CSRF_HEADER, HttpState, generate_csrf_token};
use usage_app::{AppPaths, AppState, SettingsUpdate, ensure_app_data_dir};
use usage_core::{TimePeriod, bucket_token_usage};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing();

    let data_dir = paths::resolve_data_dir().map_err(io::Error::other)?;
    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths)?;
    let app_state = AppState::new(paths.settings_path.clone());
    app_state.initialize()?;

    match cli.command {
        Command::Serve { port } => serve(app_state, paths, port).await,
        Command::Report { token, plan, json } => {
            report(&app_state, token.as_deref(), plan.as_deref(), json).await
        }
        Command::Analyze { path, period, json } => {
            analyze(&app_state, &path, period.as_deref(), json)
        }
        Command::Config {
            token,
            plan,
            refresh_interval,
        } => configure(&app_state, token, plan, refresh_interval),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

async fn serve(app_state: AppState, paths: AppPaths, port: Option<u16>) -> CliResult<()> {
    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        println!(
            "Created config at {} (default port {}).",
            config.file.display(),
            config.config.port
        );
    }
    let port = port.unwrap_or(config.config.port);
    tracing::info!(data_dir = %paths.app_data_dir.display(), "using data dir");

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let csrf_token = generate_csrf_token();
    let router = http_api::router(HttpState::new(context, csrf_token.clone()));

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        eprintln!("Configured port {port} was unavailable; using {actual_port} for this run.");
    }

    println!("Cursor usage API is running at http://127.0.0.1:{actual_port}/api");
    println!("Send header {CSRF_HEADER}: {csrf_token} with every request.");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn report(
    app_state: &AppState,
    token: Option<&str>,
    plan: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let analytics = &app_state.services.analytics;
    let events = analytics.load_events(token).await?;
    let plan_usage = analytics.plan_usage_for(&events, plan, None)?;
    let bundle = analytics.analyze(events);
    if json {
        let payload = serde_json::json!({
            "analytics": bundle,
            "planUsage": plan_usage,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        report::print_bundle(&bundle, Some(&plan_usage));
    }
    Ok(())
}

fn analyze(
    app_state: &AppState,
    path: &Path,
    period: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let text = if path == Path::new("-") {
        io::read_to_string(io::stdin())?
    } else {
        std::fs::read_to_string(path)
            .map_err(|err| io::Error::other(format!("read {}: {}", path.display(), err)))?
    };
    let events = usage_client::parse_events_json(&text)?;
    let period = period.map(str::parse::<TimePeriod>).transpose()?;
    let buckets = period.map(|period| bucket_token_usage(&events, period));
    let bundle = app_state.services.analytics.analyze(events);

    if json {
        let payload = match &buckets {
            Some(buckets) => serde_json::json!({ "analytics": bundle, "timeseries": buckets }),
            None => serde_json::to_value(&bundle)?,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    report::print_bundle(&bundle, None);
    if let Some(buckets) = buckets {
        println!();
        report::print_buckets(&buckets);
    }
    Ok(())
}

fn configure(
    app_state: &AppState,
    token: Option<String>,
    plan: Option<String>,
    refresh_interval: Option<u64>,
) -> CliResult<()> {
    let settings = &app_state.services.settings;
    let snapshot = if token.is_some() || plan.is_some() || refresh_interval.is_some() {
        settings.update(SettingsUpdate {
            token,
            plan,
            refresh_interval_secs: refresh_interval,
            ..SettingsUpdate::default()
        })?
    } else {
        settings.get()?
    };
    println!("Settings file:     {}", app_state.config.settings_path.display());
    println!("Token configured:  {}", if snapshot.has_token { "yes" } else { "no" });
    println!("Plan:              {}", snapshot.plan);
    println!("Refresh interval:  {}s", snapshot.refresh_interval_secs);
    println!("API base URL:      {}", snapshot.base_url);
    println!("Request timeout:   {}s", snapshot.timeout_secs);
    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(err) => {
            tracing::warn!(port, error = %err, "configured port unavailable");
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
