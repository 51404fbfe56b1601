use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Simulation ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 30.0)]
    pub tick_rate: f64,

    /// Frames drawn per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 30.0)]
    pub frame_rate: f64,

    /// Seed for pipe heights, random when omitted
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,
}
