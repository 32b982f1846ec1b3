use clap::Parser;

use crate::{api::heartbeat, prelude::*};

#[derive(Parser)]
pub struct HeartbeatArgs {
    /// URL to ping after a successful run.
    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    pub url: Option<String>,
}

impl HeartbeatArgs {
    pub fn send(&self) {
        if let Some(url) = &self.url
            && let Err(error) = heartbeat::send(url)
        {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }
}
