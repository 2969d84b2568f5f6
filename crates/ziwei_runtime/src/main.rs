//! Ziwei Runtime
//!
//! Boots the chart engine in an embedded script runtime, calculates a chart
//! for the profile on the command line and runs the fortune lookups.

mod args;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

use args::{Args, Command};
use ziwei_bridge::Bridge;
use ziwei_metrics::names;
use ziwei_script::ScriptRuntime;
use ziwei_services::{BirthProfile, ChartStore, JsonFileChartStore, SavedChart, Settings};

const BUILTIN_GLUE: &str = include_str!("../assets/bridge_glue.js");

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Ziwei v{}", ziwei_core::VERSION);

    let args = Args::parse(std::env::args().skip(1))?;
    let settings_path = args
        .settings
        .clone()
        .or_else(|| std::env::var_os("ZIWEI_SETTINGS").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("ziwei.json"));
    let settings = Settings::load_or_default(&settings_path)?;

    let store = JsonFileChartStore::new(&settings.runtime.chart_store_path);
    let profile = match args.command {
        Command::Calculate(profile) => profile,
        Command::Last => {
            let saved = store
                .load()?
                .with_context(|| format!("no chart saved at {}", store.path().display()))?;
            tracing::info!(
                name = %saved.profile.name,
                generated_at = %saved.generated_at,
                "Loaded saved chart"
            );
            saved.profile
        }
    };

    let bridge = boot(&settings)?;

    // The bridge is single-threaded; completions and the push channel are
    // drained on this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let on = args.on.unwrap_or_else(|| Local::now().date_naive());
    runtime.block_on(run(&bridge, &store, profile, on))?;

    tracing::info!(
        dispatched = bridge.metric(names::DISPATCHED),
        charts = bridge.metric(names::CHARTS_DELIVERED),
        decode_failures = bridge.metric(names::DECODE_FAILURES),
        avg_lookup_ms = bridge.average_lookup_latency_ms(),
        max_lookup_ms = bridge.max_lookup_latency_ms(),
        "Session finished"
    );
    Ok(())
}

fn boot(settings: &Settings) -> Result<Bridge<ScriptRuntime>> {
    tracing::info!(bundle = %settings.runtime.bundle_path.display(), "Loading chart engine...");
    let runtime = ScriptRuntime::new(settings.runtime.script.clone())?;
    runtime
        .execute_file(&settings.runtime.bundle_path)
        .context("loading engine bundle")?;
    match &settings.runtime.glue_path {
        Some(path) => runtime.execute_file(path).context("loading bridge glue")?,
        None => runtime
            .execute("bridge_glue.js", BUILTIN_GLUE)
            .context("loading bridge glue")?,
    }

    let bridge = Bridge::new(runtime, settings.bridge.clone());
    if !bridge.is_ready() {
        tracing::warn!("Engine loaded without announcing readiness; requests will be refused");
    }
    Ok(bridge)
}

async fn run(
    bridge: &Bridge<ScriptRuntime>,
    store: &JsonFileChartStore,
    profile: BirthProfile,
    on: NaiveDate,
) -> Result<()> {
    let (year, month, day) = (on.year(), on.month(), on.day());
    let request = profile.to_request()?;
    let chart = bridge
        .calculate(request)
        .await?
        .context("engine produced no chart")?;

    match chart.summary() {
        Ok(summary) => {
            println!(
                "{} | solar {} | lunar {} | {}",
                profile.name,
                summary.solar_date.as_deref().unwrap_or("?"),
                summary.lunar_date.as_deref().unwrap_or("?"),
                summary.five_elements_class.as_deref().unwrap_or("?")
            );
            for palace in &summary.palaces {
                println!("  {:<6} {}", palace.name, palace.stars.join(" "));
            }
        }
        Err(err) => tracing::warn!(error = %err, "Chart could not be summarized"),
    }

    let age = profile.nominal_age(year);
    if let Some(decadal) = bridge.fetch_decadal(age).await {
        println!(
            "decadal (age {age}): {} {:?} {}{}",
            decadal.palace, decadal.range, decadal.heavenly_stem, decadal.earthly_branch
        );
    }
    if let Some(yearly) = bridge.fetch_yearly(year).await {
        println!("yearly {}: mutagen {}", yearly.year, yearly.mutagen.join(" "));
    }
    if let Some(monthly) = bridge.fetch_monthly(year, month).await {
        println!(
            "monthly {}-{}: {} (overall {})",
            monthly.year, monthly.month, monthly.main_influence, monthly.scores.overall
        );
    }
    if let Some(daily) = bridge.fetch_daily(year, month, day).await {
        println!(
            "daily {}-{}-{} {}: suitable {} | avoid {} (overall {})",
            daily.year,
            daily.month,
            daily.day,
            daily.lunar_day,
            daily.suitable.join(" "),
            daily.avoid.join(" "),
            daily.scores.overall
        );
    }

    store.save(&SavedChart::new(profile, &chart))?;
    Ok(())
}
