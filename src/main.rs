#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod db;
mod fmt;
mod prelude;
mod quantity;
mod tables;

use chrono::{Local, Utc};
use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command, PricesArgs, PurgeArgs, SummaryArgs, UsageArgs, charge},
    core::{
        error::Error as CoreError,
        slot,
        time::{parse_aware, parse_period},
    },
    db::Db,
    prelude::*,
    tables::{build_prices_table, build_summary_table, build_window_table},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().without_time().compact().with_env_filter(filter).init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    let result = match &args.command {
        Command::Prices(args) => prices(args),
        Command::Usage(args) => usage(args),
        Command::Charge(args) => charge(args),
        Command::Summary(args) => summary(args),
        Command::Purge(args) => purge(args),
    };
    if let Err(error) = &result
        && let Some(error) = error.downcast_ref::<CoreError>()
    {
        error!(kind = %error.kind(), hint = error.kind().hint(), "failed");
    }
    result?;

    args.heartbeat.send();
    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn prices(args: &PricesArgs) -> Result {
    let planner = args.planner.new_planner()?;
    let now = Utc::now();
    let series = match &args.until {
        Some(until) => planner.prices(slot::floor(now), slot::ceil(parse_aware(until)?))?,
        None => planner.upcoming_prices(now)?,
    };
    info!(n_prices = series.len(), end = ?series.end(), "gotcha");
    println!("{}", build_prices_table(&series, &Local));
    Ok(())
}

#[instrument(skip_all)]
fn usage(args: &UsageArgs) -> Result {
    let excluded =
        args.excluded.iter().map(|text| parse_period(text)).collect::<Result<Vec<_>, _>>()?;
    let window =
        args.planner.new_planner()?.plan_usage(Utc::now(), args.hours, args.mode, &excluded)?;
    let name = format!("{:?}", args.mode);
    println!("{}", build_window_table(&[(name.as_str(), window)], &Local));
    Ok(())
}

#[instrument(skip_all)]
fn summary(args: &SummaryArgs) -> Result {
    let planner = args.planner.new_planner()?;
    let summary = planner.summarize(Utc::now(), args.hours)?;
    println!("{}", build_summary_table(&summary, &Local));
    if !planner.has_prices_for_tomorrow(&Local::now())? {
        warn!("tomorrow prices are not published yet");
    }
    Ok(())
}

#[instrument(skip_all)]
fn purge(args: &PurgeArgs) -> Result {
    let before = parse_aware(&args.before)?;
    let n_deleted = Db::connect(&args.db.path)?.purge_before(before)?;
    info!(n_deleted, "purged the cache");
    Ok(())
}
