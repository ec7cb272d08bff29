use crate::cli::Args;
use crate::ingest::{IngestSettings, RetryPolicy};
use crate::serial::DEFAULT_BAUD_RATE;
use crate::status::Thresholds;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HTTP_PORT: u16 = 9090;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` means auto-detect at startup.
    pub serial_port: Option<String>,
    pub baud_rate: u32,
    /// `None` means bind the first LAN address.
    pub http_host: Option<String>,
    pub http_port: u16,
    pub thresholds: Thresholds,
    pub ingest: IngestSettings,
}

impl Config {
    pub fn from_env(args: &Args) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error=%err, "failed to load .env file");
            }
        }
        Self::from_lookup(|key| env::var(key).ok(), args)
    }

    pub fn from_lookup<F>(lookup: F, args: &Args) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let serial_port = args
            .serial_port
            .clone()
            .or_else(|| env.optional("BRIDGE_SERIAL_PORT"));
        let baud_rate = pick(args.baud, env.parse("BRIDGE_SERIAL_BAUD")?, DEFAULT_BAUD_RATE);

        let http_host = args.host.clone().or_else(|| env.optional("BRIDGE_HTTP_HOST"));
        let http_port = pick(args.port, env.parse("BRIDGE_HTTP_PORT")?, DEFAULT_HTTP_PORT);

        let running_min = args
            .running_min
            .or(env.parse("BRIDGE_RUNNING_MIN_AMPS")?)
            .ok_or_else(|| anyhow!("missing running threshold (BRIDGE_RUNNING_MIN_AMPS or --running-min)"))?;
        let malfunction_min = args
            .malfunction_min
            .or(env.parse("BRIDGE_MALFUNCTION_MIN_AMPS")?)
            .ok_or_else(|| {
                anyhow!("missing malfunction threshold (BRIDGE_MALFUNCTION_MIN_AMPS or --malfunction-min)")
            })?;
        let thresholds = Thresholds::new(running_min, malfunction_min)?;

        let defaults = IngestSettings::default();
        let retry_defaults = RetryPolicy::default();
        let ingest = IngestSettings {
            read_buffer_bytes: env
                .parse("BRIDGE_READ_BUFFER_BYTES")?
                .unwrap_or(defaults.read_buffer_bytes),
            max_line_bytes: env
                .parse("BRIDGE_MAX_LINE_BYTES")?
                .unwrap_or(defaults.max_line_bytes),
            retry: RetryPolicy {
                initial_backoff: env
                    .parse("BRIDGE_READ_RETRY_INITIAL_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(retry_defaults.initial_backoff),
                max_backoff: env
                    .parse("BRIDGE_READ_RETRY_MAX_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(retry_defaults.max_backoff),
                max_failures: env
                    .parse("BRIDGE_READ_MAX_FAILURES")?
                    .unwrap_or(retry_defaults.max_failures),
            },
        };
        if ingest.read_buffer_bytes == 0 || ingest.max_line_bytes == 0 {
            return Err(anyhow!(
                "BRIDGE_READ_BUFFER_BYTES and BRIDGE_MAX_LINE_BYTES must be positive"
            ));
        }

        Ok(Self {
            serial_port,
            baud_rate,
            http_host,
            http_port,
            thresholds,
            ingest,
        })
    }
}

fn pick<T>(flag: Option<T>, env: Option<T>, default: T) -> T {
    flag.or(env).unwrap_or(default)
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.optional(key)
            .map(|raw| raw.parse::<T>().with_context(|| format!("invalid {key}")))
            .transpose()
    }
}
