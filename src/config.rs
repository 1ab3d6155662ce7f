//! Command-line configuration.
//!
//! Arguments are parsed once with `clap` into an immutable
//! [`BridgeConfig`] that `main` passes explicitly into setup.  Anything
//! that does not yield a usable configuration (missing broker, unknown
//! flag, `--help`) maps to [`Invocation::Usage`].

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};
use log::{debug, warn};

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

// ───────────────────────────────────────────────────────────────
// CLI surface
// ───────────────────────────────────────────────────────────────

/// Sends Pi Cap touch readings through MQTT - MUST be run as root.
#[derive(Debug, Parser)]
#[command(name = "picap-mqtt", disable_help_flag = true)]
pub struct Cli {
    /// MQTT broker [REQUIRED]
    #[arg(short = 'b', long, value_name = "ADDRESS")]
    pub broker: Option<String>,

    /// MQTT broker username, also used as the feed prefix
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// MQTT broker password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// I2C device node the Pi Cap sits on
    #[arg(long, value_name = "PATH", default_value = DEFAULT_I2C_BUS)]
    pub bus: PathBuf,

    /// MPR121 I2C address (hex with 0x prefix, or decimal)
    #[arg(long, value_name = "ADDR", value_parser = parse_i2c_address, default_value = "0x5C")]
    pub address: u8,

    /// Rest between poll cycles, in milliseconds
    #[arg(long = "interval-ms", value_name = "MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Displays this message
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

fn parse_i2c_address(s: &str) -> Result<u8, String> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid I2C address '{s}': {e}"))?;
    if value > 0x7F {
        return Err(format!("I2C address 0x{value:02X} exceeds 7 bits"));
    }
    Ok(value)
}

/// Rendered usage text.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

// ───────────────────────────────────────────────────────────────
// Broker address
// ───────────────────────────────────────────────────────────────

/// `host`, `host:port` or `mqtt://host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerAddressError {
    EmptyHost,
    InvalidPort(String),
}

impl fmt::Display for BrokerAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "broker host is empty"),
            Self::InvalidPort(p) => write!(f, "invalid broker port '{}'", p),
        }
    }
}

impl std::error::Error for BrokerAddressError {}

impl FromStr for BrokerAddress {
    type Err = BrokerAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("mqtt://").unwrap_or(s);
        let s = s.trim_end_matches('/');

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| BrokerAddressError::InvalidPort(port.to_owned()))?;
                (host, port)
            }
            None => (s, DEFAULT_MQTT_PORT),
        };

        if host.is_empty() {
            return Err(BrokerAddressError::EmptyHost);
        }
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ───────────────────────────────────────────────────────────────
// Bridge configuration
// ───────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything the bridge needs, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub broker: BrokerAddress,
    pub credentials: Option<Credentials>,
    pub i2c_bus: PathBuf,
    pub i2c_address: u8,
    pub poll_interval: Duration,
}

impl BridgeConfig {
    /// Broker username, which doubles as the feed prefix.
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }
}

impl TryFrom<Cli> for BridgeConfig {
    type Error = BrokerAddressError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let broker = cli.broker.as_deref().unwrap_or_default().parse()?;

        let credentials = match (cli.username.filter(|u| !u.is_empty()), cli.password) {
            (Some(username), password) => Some(Credentials { username, password }),
            (None, Some(_)) => {
                warn!("--password given without --username; ignoring it");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            broker,
            credentials,
            i2c_bus: cli.bus,
            i2c_address: cli.address,
            poll_interval: Duration::from_millis(cli.interval_ms),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Invocation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Start the bridge.
    Run(BridgeConfig),
    /// Print usage and exit successfully.
    Usage,
}

/// Decide what to do from the raw argument list (program name first).
pub fn parse_invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            debug!("argument parsing stopped: {:?}", e.kind());
            return Invocation::Usage;
        }
    };

    if cli.broker.as_deref().is_none_or(str::is_empty) {
        return Invocation::Usage;
    }

    match BridgeConfig::try_from(cli) {
        Ok(config) => Invocation::Run(config),
        Err(e) => {
            warn!("{}", e);
            Invocation::Usage
        }
    }
}
