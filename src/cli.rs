use clap::Parser;

/// Flags override the matching `BRIDGE_*` environment variables.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "amp-bridge",
    version,
    about = "Serves the live state of a machine from a serial amperage/vibration sensor"
)]
pub struct Args {
    /// Serial device (defaults to the first port the OS reports)
    #[arg(long)]
    pub serial_port: Option<String>,
    #[arg(long)]
    pub baud: Option<u32>,
    /// Listen host (defaults to the first LAN IPv4 address)
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Minimum amperage considered RUNNING
    #[arg(long)]
    pub running_min: Option<f64>,
    /// Minimum amperage considered MALFUNCTIONING
    #[arg(long)]
    pub malfunction_min: Option<f64>,
}
