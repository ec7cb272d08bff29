use anyhow::{bail, Context, Result};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Picks the first serial port the OS reports, logging every candidate.
pub fn discover_port() -> Result<String> {
    let ports = tokio_serial::available_ports().context("failed to enumerate serial ports")?;
    for (idx, port) in ports.iter().enumerate() {
        tracing::info!(index = idx + 1, port = %port.port_name, "serial port available");
    }
    match ports.into_iter().next() {
        Some(port) => Ok(port.port_name),
        None => bail!("no serial ports detected; set BRIDGE_SERIAL_PORT or --serial-port"),
    }
}

/// Opens the sensor link as 8N1 without flow control.
pub fn open(path: &str, baud_rate: u32) -> Result<SerialStream> {
    let stream = tokio_serial::new(path, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .with_context(|| format!("failed to open serial port {path}"))?;
    tracing::info!(port = path, baud_rate, "serial port opened");
    Ok(stream)
}
