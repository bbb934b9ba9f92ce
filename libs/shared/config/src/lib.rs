use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 15;
pub const DEFAULT_BOOKING_LOCK_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub api_port: u16,
    pub slot_granularity_minutes: u32,
    pub booking_lock_timeout_ms: u64,
    pub clinic_directory_path: Option<PathBuf>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            booking_lock_timeout_ms: DEFAULT_BOOKING_LOCK_TIMEOUT_MS,
            clinic_directory_path: None,
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_port: parse_var("API_PORT", DEFAULT_API_PORT),
            slot_granularity_minutes: parse_var(
                "SLOT_GRANULARITY_MINUTES",
                DEFAULT_SLOT_GRANULARITY_MINUTES,
            ),
            booking_lock_timeout_ms: parse_var(
                "BOOKING_LOCK_TIMEOUT_MS",
                DEFAULT_BOOKING_LOCK_TIMEOUT_MS,
            ),
            clinic_directory_path: env::var("CLINIC_DIRECTORY_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.slot_granularity_minutes == 0 {
            warn!("SLOT_GRANULARITY_MINUTES must be positive, using default");
            return Self {
                slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
                ..config
            };
        }

        if !config.has_directory() {
            warn!("CLINIC_DIRECTORY_PATH not set - starting with an empty doctor directory");
        }

        config
    }

    pub fn has_directory(&self) -> bool {
        self.clinic_directory_path.is_some()
    }

    /// Step between enumerated slot starts. A zero set by hand falls back to
    /// the default.
    pub fn slot_granularity(&self) -> NonZeroU32 {
        NonZeroU32::new(self.slot_granularity_minutes).unwrap_or_else(|| {
            warn!("slot granularity must be positive, using default");
            NonZeroU32::new(DEFAULT_SLOT_GRANULARITY_MINUTES).unwrap_or(NonZeroU32::MIN)
        })
    }

    pub fn lock_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.booking_lock_timeout_ms)
    }
}

fn parse_var<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", name, default);
            default
        }
    }
}
