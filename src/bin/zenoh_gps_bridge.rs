use clap::Parser;
use zenoh_gps_bridge::{error::Result, Opts};

fn main() -> Result<()> {
    pretty_env_logger::init();
    let opts = Opts::parse();
    zenoh_gps_bridge::run(opts)?;
    Ok(())
}
