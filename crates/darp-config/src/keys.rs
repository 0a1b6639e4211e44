//! Dotted-key access for `darp config get/set`.

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::settings::{Config, LogFormat, LogLevel};

/// Every key accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "cloudflare.warp_endpoint",
    "network.interface",
    "network.dns",
    "network.mtu",
    "network.timeout",
    "logging.level",
    "logging.format",
    "logging.output",
    "wireguard.config_dir",
    "wireguard.use_sudo",
];

impl Config {
    /// Every settable dotted key.
    #[must_use]
    pub fn keys() -> &'static [&'static str] {
        CONFIG_KEYS
    }

    /// Render one setting as a string. Lists are comma-joined.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for an unrecognised key.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "cloudflare.warp_endpoint" => self.cloudflare.warp_endpoint.clone(),
            "network.interface" => self.network.interface.clone(),
            "network.dns" => self.network.dns.join(","),
            "network.mtu" => self.network.mtu.to_string(),
            "network.timeout" => self.network.timeout.to_string(),
            "logging.level" => self.logging.level.to_string(),
            "logging.format" => self.logging.format.to_string(),
            "logging.output" => self.logging.output.clone(),
            "wireguard.config_dir" => self.wireguard.config_dir.display().to_string(),
            "wireguard.use_sudo" => self.wireguard.use_sudo.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Update one setting from its string form.
    ///
    /// The value is converted to the field's type; whole-config rules are
    /// left to [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for an unrecognised key and
    /// [`ConfigError::InvalidValue`] when the value does not convert.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "cloudflare.warp_endpoint" => self.cloudflare.warp_endpoint = value.to_string(),
            "network.interface" => self.network.interface = value.to_string(),
            "network.dns" => self.network.dns = parse_list(value),
            "network.mtu" => self.network.mtu = parse_number(key, value)?,
            "network.timeout" => self.network.timeout = parse_number(key, value)?,
            "logging.level" => {
                self.logging.level = value
                    .parse::<LogLevel>()
                    .map_err(|reason| ConfigError::invalid_value(key, reason))?;
            }
            "logging.format" => {
                self.logging.format = value
                    .parse::<LogFormat>()
                    .map_err(|reason| ConfigError::invalid_value(key, reason))?;
            }
            "logging.output" => self.logging.output = value.to_string(),
            "wireguard.config_dir" => self.wireguard.config_dir = PathBuf::from(value),
            "wireguard.use_sudo" => self.wireguard.use_sudo = parse_bool(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid_value(key, format!("'{value}' is not a valid number")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            key,
            format!("'{value}' is not true or false"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_every_key_gettable() {
        let config = Config::default();
        for key in Config::keys() {
            assert!(config.get(key).is_ok(), "{key} should be gettable");
        }
    }

    #[test]
    fn test_every_key_settable_to_its_own_value() {
        let mut config = Config::default();
        for key in Config::keys() {
            let value = config.get(key).unwrap();
            config.set(key, &value).unwrap();
        }
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_get_dns_comma_joined() {
        assert_eq!(Config::default().get("network.dns").unwrap(), "1.1.1.1,1.0.0.1");
    }

    #[test]
    fn test_set_dns_list() {
        let mut config = Config::default();
        config.set("network.dns", " 9.9.9.9, ,149.112.112.112 ").unwrap();
        assert_eq!(config.network.dns, vec!["9.9.9.9", "149.112.112.112"]);
    }

    #[test_case("network.mtu", "1420" ; "mtu")]
    #[test_case("network.timeout", "10" ; "timeout")]
    #[test_case("network.interface", "wg7" ; "interface")]
    #[test_case("logging.level", "debug" ; "level")]
    #[test_case("logging.format", "text" ; "format")]
    #[test_case("wireguard.use_sudo", "false" ; "sudo")]
    fn test_set_then_get(key: &str, value: &str) {
        let mut config = Config::default();
        config.set(key, value).unwrap();
        assert_eq!(config.get(key).unwrap(), value);
    }

    #[test_case("off" ; "off")]
    #[test_case("yes" ; "yes")]
    #[test_case("1" ; "one")]
    #[test_case("TRUE" ; "upper case")]
    fn test_set_bool_only_true_or_false(value: &str) {
        let mut config = Config::default();
        config.set("wireguard.use_sudo", "false").unwrap();
        assert!(config.set("wireguard.use_sudo", value).is_err());
        assert!(!config.wireguard.use_sudo);
    }

    #[test]
    fn test_set_unknown_key() {
        let mut config = Config::default();
        let err = config.set("network.speed", "fast").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "network.speed"));
        assert!(config.get("speed").is_err());
    }

    #[test_case("network.mtu", "big" ; "mtu not a number")]
    #[test_case("network.mtu", "-1" ; "negative mtu")]
    #[test_case("network.timeout", "1.5" ; "fractional timeout")]
    #[test_case("logging.level", "loud" ; "bad level")]
    #[test_case("logging.format", "xml" ; "bad format")]
    #[test_case("wireguard.use_sudo", "maybe" ; "bad bool")]
    fn test_set_invalid_value(key: &str, value: &str) {
        let mut config = Config::default();
        let err = config.set(key, value).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config, Config::default());
    }
}
