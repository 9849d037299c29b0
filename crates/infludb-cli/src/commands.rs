//! Subcommand handlers. Each takes the shared tracker built in `main`.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use infludb_core::{AppConfig, TrackedAccount};
use infludb_tracker::{BatchReport, ScrapeScheduler, Tracker};

pub(crate) async fn run_add(
    tracker: &Tracker,
    name: &str,
    link: &str,
    platform: &str,
) -> anyhow::Result<()> {
    let outcome = tracker.add_and_scrape_one(name, link, platform).await?;
    match &outcome.error {
        None => println!(
            "{link}: {} followers ({})",
            outcome.followers, outcome.category
        ),
        Some(error) => println!("{link}: {} ({error})", outcome.category),
    }
    Ok(())
}

pub(crate) async fn run_update(tracker: &Tracker, links: &[String]) -> anyhow::Result<()> {
    let report = if links.is_empty() {
        tracker.update_all().await?
    } else {
        tracker.update_selected(links).await?
    };
    print_report(&report);
    Ok(())
}

pub(crate) async fn run_delete(tracker: &Tracker, link: &str) -> anyhow::Result<()> {
    tracker.delete(link).await?;
    println!("deleted {link}");
    Ok(())
}

pub(crate) async fn run_list(tracker: &Tracker, json: bool) -> anyhow::Result<()> {
    let accounts = tracker.list().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    } else {
        print_table(&accounts);
    }
    Ok(())
}

pub(crate) async fn run_import(tracker: &Tracker, file: &Path) -> anyhow::Result<()> {
    let import = infludb_core::load_import_file(file)?;
    let summary = tracker.import_rows(import.accounts).await?;
    println!(
        "imported {} (unsupported platform: {}, dropped: {})",
        summary.queued, summary.unsupported, summary.dropped
    );
    print_report(&summary.report);
    Ok(())
}

pub(crate) async fn run_export(tracker: &Tracker) -> anyhow::Result<()> {
    let accounts = tracker.list().await?;
    println!("{}", serde_json::to_string_pretty(&accounts)?);
    Ok(())
}

/// Run the periodic scheduler until `shutdown` resolves.
pub(crate) async fn run_scheduler(
    tracker: Arc<Tracker>,
    config: &AppConfig,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(config.schedule_interval_mins.saturating_mul(60));
    let scheduler = ScrapeScheduler::new(tracker, interval, config.schedule_overlap);

    scheduler.start().await?;
    shutdown.await;
    scheduler.shutdown().await?;
    Ok(())
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "  {:<9} {:>12}  {}",
                outcome.category, outcome.followers, outcome.link
            ),
            Some(error) => println!(
                "  {:<9} {:>12}  {}  ({error})",
                outcome.category, "-", outcome.link
            ),
        }
    }
    println!(
        "{} accounts: {} succeeded, {} failed, {} unsupported platform",
        report.total(),
        report.succeeded,
        report.failed,
        report.failed_platform
    );
}

fn print_table(accounts: &[TrackedAccount]) {
    if accounts.is_empty() {
        println!("no accounts tracked");
        return;
    }
    println!(
        "{:<24} {:<10} {:>12} {:<16} LINK",
        "NAME", "PLATFORM", "FOLLOWERS", "CATEGORY"
    );
    for account in accounts {
        println!(
            "{:<24} {:<10} {:>12} {:<16} {}",
            account.name, account.platform, account.followers, account.category, account.link
        );
    }
}
