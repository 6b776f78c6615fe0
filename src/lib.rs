pub mod bridge;
pub mod channel;
pub mod error;
pub mod location;
pub mod simulator;
pub mod tracker;
pub mod types;
pub mod utils;

use crate::{
    bridge::GpsBridge,
    channel::MethodResponse,
    error::{Error, Result},
    simulator::SimulatedLocationService,
};
use clap::Parser;
use log::{info, warn};
use std::{sync::Arc, thread, time::Duration};
use zenoh::{Config, Wait};

/// Command line options
#[derive(Debug, Clone, Parser)]
pub struct Opts {
    /// Endpoints the zenoh session listens on.
    #[clap(long, default_value = "tcp/localhost:7447")]
    pub zenoh_listen: Vec<String>,
    /// Zenoh configuration file; overrides --zenoh-listen.
    #[clap(long)]
    pub zenoh_config: Option<String>,
    /// Key prefix of the GPS info channel.
    #[clap(long, default_value = channel::GPS_INFO_CHANNEL)]
    pub channel: String,
    /// Simulated GNSS status period in milliseconds.
    #[clap(long, default_value = "1000")]
    pub tick_ms: u64,
    /// Register through the legacy status listener API instead of the GNSS
    /// callback API.
    #[clap(long)]
    pub legacy_status_api: bool,
}

pub fn run(opts: Opts) -> Result<()> {
    let Opts {
        zenoh_listen,
        zenoh_config,
        channel: channel_prefix,
        tick_ms,
        legacy_status_api,
    } = opts;

    info!("Running GNSS info zenoh bridge...");
    let mut config = match &zenoh_config {
        Some(path) => Config::from_file(path).map_err(|e| Error::Config(e.to_string()))?,
        None => Config::default(),
    };
    if zenoh_config.is_none() {
        config
            .insert_json5("listen/endpoints", &serde_json::to_string(&zenoh_listen)?)
            .map_err(|e| Error::Config(e.to_string()))?;
    }
    let session = zenoh::open(config).wait()?;

    let service = Arc::new(SimulatedLocationService::new(!legacy_status_api));
    let bridge = GpsBridge::new(service.clone());
    {
        let service = service.clone();
        thread::spawn(move || {
            simulator::run_demo_script(&service, Duration::from_millis(tick_ms))
        });
    }

    let selector = format!("{channel_prefix}/*");
    let queryable = session.declare_queryable(selector.as_str()).wait()?;
    info!("Serving GPS info queries on '{selector}'");

    while let Ok(query) = queryable.recv() {
        let method = channel::method_from_key(query.key_expr().as_str());
        match channel::dispatch(&bridge, method) {
            MethodResponse::Value(value) => {
                info!("{method} => {value:?}");
                let payload = serde_json::to_vec(&value)?;
                if let Err(e) = query.reply(query.key_expr().clone(), payload).wait() {
                    warn!("Failed to reply to '{method}': {e}");
                }
            }
            MethodResponse::NotImplemented => {
                warn!("Unimplemented method '{method}' queried");
                if let Err(e) = query.reply_err(format!("unimplemented: {method}")).wait() {
                    warn!("Failed to reply to '{method}': {e}");
                }
            }
        }
    }

    Ok(())
}
