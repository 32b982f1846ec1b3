use std::time::Duration;

use ureq::Agent;

use crate::prelude::*;

#[instrument(skip_all)]
pub fn send(url: &str) -> Result {
    info!("sending a heartbeat…");
    let client: Agent =
        Agent::config_builder().timeout_global(Some(Duration::from_secs(3))).build().into();
    client.post(url).send_empty().context("failed to send the heartbeat")?;
    Ok(())
}
