use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Poll forever and print tables
    Watch,
    /// Run a single cycle and exit
    Once,
    /// Poll forever and serve the latest cycle over HTTP
    Server,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watch" => Ok(RunMode::Watch),
            "once" => Ok(RunMode::Once),
            "server" => Ok(RunMode::Server),
            other => Err(format!("Invalid mode '{}'", other)),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RunMode::Watch => "watch",
            RunMode::Once => "once",
            RunMode::Server => "server",
        };
        write!(f, "{}", name)
    }
}

/// Process-level settings from the environment
pub struct AppConfig {
    pub mode: RunMode,
    pub port: u16,
}

impl AppConfig {
    /// `OI_MODE` (watch | once | server) and `OI_PORT`
    pub fn from_env() -> Result<Self, String> {
        let mode = std::env::var("OI_MODE")
            .unwrap_or_else(|_| "watch".to_string())
            .parse::<RunMode>()?;

        Ok(Self {
            mode,
            port: Self::get_port(),
        })
    }

    fn get_port() -> u16 {
        std::env::var("OI_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn print_usage() {
        eprintln!("Set OI_MODE environment variable to control execution mode");
        eprintln!("Examples:");
        eprintln!("  OI_MODE=watch cargo run                   # Poll and print tables every cycle");
        eprintln!("  OI_MODE=once cargo run                    # Run a single cycle");
        eprintln!("  OI_MODE=server OI_PORT=3001 cargo run     # Poll and serve /api/oi/latest");
        eprintln!("Other variables: KITE_API_KEY, KITE_ACCESS_TOKEN, OI_CONFIG_FILE, OI_PROFILE, RUST_LOG");
    }
}
