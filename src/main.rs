//! speedgauge: network interface throughput on the console and on an
//! Arduino-driven analog gauge.

use std::io;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{prelude::*, EnvFilter};

mod constants;
mod counters;
mod error;
mod format;
mod gauge;
mod poller;
mod ticker;

use constants::DEFAULT_GAUGE_DEVICE;
use counters::SysfsCounters;
use gauge::SerialGauge;
use poller::{Direction, LoopConfig, Poller};
use ticker::SleepTicker;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Network interface monitoring with uplink to Arduino-controlled gauge."
)]
struct Cli {
    #[arg(help = "Interface to monitor (i.e. - eth0)")]
    interface: String,

    #[arg(
        default_value = DEFAULT_GAUGE_DEVICE,
        help = "Serial port connected to the Arduino"
    )]
    arduino: String,

    #[arg(
        short = 'p',
        long = "pipe-size",
        value_name = "MBIT",
        default_value_t = 0,
        help = "Pipe size in Mbit/s (defaults to link speed)"
    )]
    pipe_size: u64,

    #[arg(
        short = 'r',
        long = "rate",
        value_name = "SECONDS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Interface polling rate"
    )]
    rate: u64,

    #[arg(
        short = 't',
        long = "use-transmit",
        visible_alias = "tx",
        help = "Use transmit (TX) data on the Arduino"
    )]
    use_transmit: bool,

    #[arg(long = "no-arduino", help = "Disable the Arduino interface")]
    no_arduino: bool,

    #[arg(long = "quiet", help = "Suppress interface statistic output")]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> LoopConfig {
        LoopConfig {
            interface: self.interface,
            interval_secs: self.rate,
            capacity_mbit: self.pipe_size,
            quiet: self.quiet,
            gauge_enabled: !self.no_arduino,
            gauge_device: self.arduino,
            gauge_direction: if self.use_transmit {
                Direction::Transmit
            } else {
                Direction::Receive
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = cli.into_config();
    let counters = SysfsCounters::open(&config.interface)
        .wrap_err_with(|| format!("Failed to open counters of '{}'", config.interface))?;
    let ticker = SleepTicker::new(config.interval());

    let (poller, baseline) =
        Poller::<_, SerialGauge, _, _>::start(config, counters, ticker, io::stdout())
            .wrap_err("Failed to initialize polling loop")?;

    match poller.run(baseline).wrap_err("Polling loop terminated")? {}
}
