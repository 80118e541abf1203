//! Guestlist CLI Tool
//!
//! Turns event registrations (from the registration API or an export CSV)
//! into per-day guest lists.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use guestlist::cli::{confirm_overwrite, Cli, Destination};
use guestlist::config::{DayConfig, Settings};
use guestlist::pipeline::{classify, fetch_all, load_registrants, HttpPageSource, Registrant};
use guestlist::report::{plan_guestlists, write_day_csvs, write_guestlists, GuestlistSummary};
use guestlist::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_success,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(conf) = &cli.conf {
        settings.day_config_path = conf.clone();
    }
    let output_dir = cli.output_dir();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.source,
        cli.destination.extension(),
        &output_dir,
        &cli.all_days_label,
    );

    // Step 1: Collect registrants
    print_step_header(1, "Collect Registrants");
    let step_start = Instant::now();
    let registrants = if cli.is_api_source() {
        fetch_registrants(&cli, &settings)?
    } else {
        let path = PathBuf::from(&cli.source);
        load_registrants(&path)
            .with_context(|| format!("Failed to load registrants from {}", path.display()))?
    };
    let source_records = registrants.len();
    print_count("registrant(s)", source_records);
    info!("collected {} registrants in {:?}", source_records, step_start.elapsed());

    // Step 2: Classify by day
    print_step_header(2, "Classify Days");
    let days = classify(registrants, &cli.all_days_label)
        .context("Registrant classification failed")?;
    if let Some(expected) = cli.expect_days {
        days.expect_days(expected)?;
    }
    if days.is_empty() {
        print_info("No day-specific tickets found; nothing to write");
    } else {
        print_count("day(s)", days.len());
        print_success("All day buckets verified");
    }
    let mut summary = GuestlistSummary::new(source_records, &days);

    // Step 3: Write guest lists
    print_step_header(3, "Write Guest Lists");
    if !confirm_output_dir(&cli, &output_dir, days.len())? {
        println!("Cancelled by user.");
        return Ok(());
    }

    match cli.destination {
        Destination::Csv => {
            let written = write_day_csvs(&days, &output_dir)?;
            summary.set_outputs(&written);
        }
        Destination::Json => {
            let config = DayConfig::load(&settings.day_config_path).with_context(|| {
                format!(
                    "Failed to load day configuration {}",
                    settings.day_config_path.display()
                )
            })?;
            let export = settings.export_settings(&cli.placeholder_space_id, &cli.upload_endpoint)?;
            let plan = plan_guestlists(&days, &config, &export, &output_dir, cli.on_duplicate)?;
            let (written, commands) = write_guestlists(&plan, &output_dir, &export)?;
            summary.set_outputs(&written);
            summary.set_commands_file(commands);
        }
    }
    print_success(&format!("Saved to {}", output_dir.display()));

    summary.display();
    print_completion();

    Ok(())
}

fn fetch_registrants(cli: &Cli, settings: &Settings) -> Result<Vec<Registrant>> {
    let fetch = settings.fetch_settings(&cli.api_base_url, cli.timeout(), &cli.platform_question_id)?;
    let question_id = fetch.platform_question_id.clone();
    let mut source = HttpPageSource::new(fetch)?;

    let spinner = create_spinner("Fetching attendees...");
    match fetch_all(&mut source, &question_id) {
        Ok(attendees) => {
            finish_with_success(&spinner, "Attendees fetched");
            Ok(attendees.iter().map(Registrant::from).collect())
        }
        Err(e) => {
            finish_with_error(&spinner, "Attendee fetch failed");
            Err(e).context("page fetch from registration API")
        }
    }
}

fn confirm_output_dir(cli: &Cli, dir: &Path, day_count: usize) -> Result<bool> {
    if cli.no_confirm || day_count == 0 || !dir.exists() {
        return Ok(true);
    }
    confirm_overwrite(dir, day_count)
}
