//! Positions feed poller.
//!
//! Owns the HTTP client and delivers one decoded observation batch per
//! successful poll. A failed poll delivers nothing: the board task keeps
//! showing the previous cycle until the feed recovers.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use linelight_cta_lib::decode_positions;
use linelight_tracker_lib::TrainObservation;
use log::{debug, warn};

use crate::config::ApiConfig;

/// One decoded poll, in feed order.
pub type ObservationBatch = Vec<TrainObservation>;

/// Run the poll loop until the board task hangs up.
pub fn poller_task(api: &ApiConfig, tx: &Sender<ObservationBatch>) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(api.timeout_ms))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build HTTP client: {e}");
            return;
        }
    };
    let interval = Duration::from_millis(api.poll_interval_ms);

    loop {
        match poll_once(&client, api) {
            Ok(batch) => {
                debug!("Poll returned {} trains", batch.len());
                if tx.send(batch).is_err() {
                    // Receiver is gone, nothing left to feed
                    break;
                }
            }
            // Transport errors, timeouts and API error envelopes all
            // degrade the same way: skip the cycle, try again later
            Err(e) => warn!("Poll failed: {e:#}"),
        }
        thread::sleep(interval);
    }
}

fn poll_once(client: &reqwest::blocking::Client, api: &ApiConfig) -> Result<ObservationBatch> {
    let response = client
        .get(&api.base_url)
        .query(&[
            ("key", api.key.as_str()),
            ("rt", api.route.as_str()),
            ("outputType", "JSON"),
        ])
        .send()?
        .error_for_status()?;
    let body = response.text()?;
    Ok(decode_positions(&body)?)
}
