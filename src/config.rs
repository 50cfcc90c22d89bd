use anyhow::{Context, Result};

pub const DEFAULT_ISS_BASE_URL: &str = "https://iss.moex.com";

/// Runtime settings, read from the environment with code defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Exchange ticker to trade.
    pub instrument: String,
    /// Candle interval and polling period, in minutes.
    // TODO: support day/week/month ISS intervals, not only minute ones
    pub period_minutes: u32,
    /// Fixed quantity for every opened order.
    pub quantity: f64,
    /// Starting simulated account balance.
    pub initial_balance: f64,
    /// MOEX ISS endpoint.
    pub iss_base_url: String,
    /// Admin record-keeping service; `None` disables reporting.
    pub admin_base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instrument: "SBER".to_string(),
            period_minutes: 60,
            quantity: 3.0,
            initial_balance: 50_000.0,
            iss_base_url: DEFAULT_ISS_BASE_URL.to_string(),
            admin_base_url: None,
        }
    }
}

impl Settings {
    /// Build settings from `MOEXBOT_*` environment variables,
    /// falling back to the defaults above.
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        Ok(Settings {
            instrument: env_or("MOEXBOT_INSTRUMENT", defaults.instrument),
            period_minutes: parse_env("MOEXBOT_PERIOD_MINUTES", defaults.period_minutes)?,
            quantity: parse_env("MOEXBOT_QUANTITY", defaults.quantity)?,
            initial_balance: parse_env("MOEXBOT_INITIAL_BALANCE", defaults.initial_balance)?,
            iss_base_url: env_or("MOEXBOT_ISS_BASE_URL", defaults.iss_base_url),
            admin_base_url: std::env::var("MOEXBOT_ADMIN_BASE_URL").ok(),
        })
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
