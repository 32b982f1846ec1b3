mod charge;
mod heartbeat;

use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};

pub use self::{
    charge::{ChargeArgs, charge},
    heartbeat::HeartbeatArgs,
};
use crate::{
    api::octopus,
    core::{cache::TimeSeriesCache, planner::Planner, provider::Publication, window::UsageMode},
    db::Db,
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the upcoming prices.
    #[clap(name = "prices")]
    Prices(Box<PricesArgs>),

    /// Find the cheapest or the most expensive window to run an appliance.
    #[clap(name = "usage")]
    Usage(Box<UsageArgs>),

    /// Plan the cheapest charging slots before the departure.
    #[clap(name = "charge")]
    Charge(Box<ChargeArgs>),

    /// Best, peak, and average prices of the known upcoming slots.
    #[clap(name = "summary")]
    Summary(Box<SummaryArgs>),

    /// Delete the cached prices before the specified time.
    #[clap(name = "purge")]
    Purge(Box<PurgeArgs>),
}

#[derive(Parser)]
pub struct DbArgs {
    /// SQLite database file for the price cache.
    #[clap(long = "db-path", env = "DB_PATH", default_value = "prices.sqlite")]
    pub path: String,
}

#[derive(Parser)]
pub struct OctopusArgs {
    #[clap(
        long = "octopus-base-url",
        env = "OCTOPUS_BASE_URL",
        default_value = "https://api.octopus.energy"
    )]
    pub base_url: String,

    /// Agile product code.
    #[clap(long = "octopus-product", env = "OCTOPUS_PRODUCT", default_value = "AGILE-18-02-21")]
    pub product: String,

    /// Grid supply point group letter.
    #[clap(long = "octopus-region", env = "OCTOPUS_REGION", default_value = "H")]
    pub region: String,

    /// Local time when the next day prices get published.
    #[clap(long = "publication-cutoff", env = "PUBLICATION_CUTOFF", default_value = "16:00")]
    pub publication_cutoff: NaiveTime,

    /// Local end of the last slot published for a day.
    #[clap(long = "publication-until", env = "PUBLICATION_UNTIL", default_value = "23:00")]
    pub publication_until: NaiveTime,
}

#[derive(Parser)]
pub struct PlannerArgs {
    #[clap(flatten)]
    pub db: DbArgs,

    #[clap(flatten)]
    pub octopus: OctopusArgs,
}

impl PlannerArgs {
    pub fn new_planner(&self) -> Result<Planner<octopus::Api, Db>> {
        let api = octopus::Api::builder()
            .base_url(&self.octopus.base_url)
            .product(&self.octopus.product)
            .region(&self.octopus.region)
            .publication(Publication {
                cutoff: self.octopus.publication_cutoff,
                until: self.octopus.publication_until,
                timezone: Local,
            })
            .build();
        let db = Db::connect(&self.db.path).context("failed to open the price cache")?;
        Ok(Planner::new(TimeSeriesCache::new(api, db)))
    }
}

#[derive(Parser)]
pub struct PricesArgs {
    #[clap(flatten)]
    pub planner: PlannerArgs,

    /// Show the prices until the RFC 3339 timestamp, otherwise all known.
    #[clap(long)]
    pub until: Option<String>,
}

#[derive(Parser)]
pub struct UsageArgs {
    #[clap(flatten)]
    pub planner: PlannerArgs,

    /// Appliance run time, a multiple of half an hour.
    #[clap(long, env = "USAGE_HOURS")]
    pub hours: f64,

    #[clap(long, value_enum, default_value = "best")]
    pub mode: UsageMode,

    /// Period to keep the appliance off, as `START/END` RFC 3339 timestamps. Repeatable.
    #[clap(long = "exclude")]
    pub excluded: Vec<String>,
}

#[derive(Parser)]
pub struct SummaryArgs {
    #[clap(flatten)]
    pub planner: PlannerArgs,

    /// Length of the best and peak windows, a multiple of half an hour.
    #[clap(long, env = "SUMMARY_HOURS", default_value = "3")]
    pub hours: f64,
}

#[derive(Parser)]
pub struct PurgeArgs {
    #[clap(flatten)]
    pub db: DbArgs,

    /// RFC 3339 timestamp, prices of the earlier slots get deleted.
    #[clap(long)]
    pub before: String,
}
