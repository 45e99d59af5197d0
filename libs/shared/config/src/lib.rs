use std::env;

use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_SERVICE_TIMEZONE: Tz = chrono_tz::Europe::London;
pub const DEFAULT_MAX_AVAILABILITY_DAYS: u32 = 62;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Civil zone every rule, break and slot is expressed in.
    pub service_timezone: Tz,
    pub enforce_working_hours: bool,
    pub max_availability_days: u32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            service_timezone: DEFAULT_SERVICE_TIMEZONE,
            enforce_working_hours: false,
            max_availability_days: DEFAULT_MAX_AVAILABILITY_DAYS,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset or unparsable
    /// values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            supabase_url: lookup("SUPABASE_URL").unwrap_or_else(|| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            }),
            supabase_anon_key: lookup("SUPABASE_ANON_PUBLIC_KEY").unwrap_or_else(|| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            }),
            service_timezone: match lookup("SERVICE_TIMEZONE") {
                Some(raw) => raw.parse::<Tz>().unwrap_or_else(|_| {
                    warn!("SERVICE_TIMEZONE '{}' is not a known zone, using {}", raw, DEFAULT_SERVICE_TIMEZONE);
                    DEFAULT_SERVICE_TIMEZONE
                }),
                None => DEFAULT_SERVICE_TIMEZONE,
            },
            enforce_working_hours: match lookup("ENFORCE_WORKING_HOURS") {
                Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                    warn!("ENFORCE_WORKING_HOURS '{}' is not a boolean, using false", raw);
                    false
                }),
                None => false,
            },
            max_availability_days: match lookup("MAX_AVAILABILITY_DAYS") {
                Some(raw) => match raw.parse::<u32>() {
                    Ok(days) if days > 0 => days,
                    _ => {
                        warn!("MAX_AVAILABILITY_DAYS '{}' is invalid, using {}", raw, DEFAULT_MAX_AVAILABILITY_DAYS);
                        DEFAULT_MAX_AVAILABILITY_DAYS
                    }
                },
                None => DEFAULT_MAX_AVAILABILITY_DAYS,
            },
            port: match lookup("PORT") {
                Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                    warn!("PORT '{}' is invalid, using {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }),
                None => DEFAULT_PORT,
            },
        };

        if !config.is_configured() {
            warn!("Supabase not configured - falling back to in-memory stores");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.service_timezone = tz;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.service_timezone, chrono_tz::Europe::London);
        assert!(!config.enforce_working_hours);
        assert_eq!(config.max_availability_days, DEFAULT_MAX_AVAILABILITY_DAYS);
        assert_eq!(config.port, 3000);
        assert!(!config.is_configured());
    }

    #[test]
    fn reads_all_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_PUBLIC_KEY", "anon"),
            ("SERVICE_TIMEZONE", "America/New_York"),
            ("ENFORCE_WORKING_HOURS", "yes"),
            ("MAX_AVAILABILITY_DAYS", "14"),
            ("PORT", "8080"),
        ]));
        assert!(config.is_configured());
        assert_eq!(config.service_timezone, chrono_tz::America::New_York);
        assert!(config.enforce_working_hours);
        assert_eq!(config.max_availability_days, 14);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SERVICE_TIMEZONE", "Mars/Olympus_Mons"),
            ("ENFORCE_WORKING_HOURS", "maybe"),
            ("MAX_AVAILABILITY_DAYS", "0"),
            ("PORT", "not-a-port"),
        ]));
        assert_eq!(config.service_timezone, DEFAULT_SERVICE_TIMEZONE);
        assert!(!config.enforce_working_hours);
        assert_eq!(config.max_availability_days, DEFAULT_MAX_AVAILABILITY_DAYS);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
