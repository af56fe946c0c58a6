//! Startup configuration
//!
//! Read once from positional process arguments: `[port] [max_connections]`.

use crate::error::AppError;

/// Default listening port
pub const DEFAULT_PORT: u16 = 2022;

/// Default number of concurrently admitted clients
pub const DEFAULT_MAX_CONNECTIONS: usize = 2;

/// Default bind host (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Build a configuration from positional arguments (program name excluded)
    ///
    /// Missing arguments fall back to the defaults.
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config = Self::default();

        if let Some(port) = args.next() {
            config.port = port.parse().map_err(|_| AppError::InvalidPort(port))?;
        }

        if let Some(max) = args.next() {
            config.max_connections = match max.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(AppError::InvalidMaxConnections(max)),
            };
        }

        Ok(config)
    }

    /// Address string passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:2022");
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_port_and_max() {
        let config = Config::from_args(args(&["4000", "8"])).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_port_only() {
        let config = Config::from_args(args(&["9000"])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_args(args(&["70000"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPort(p) if p == "70000"));
    }

    #[test]
    fn test_invalid_max_connections() {
        let err = Config::from_args(args(&["2022", "0"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidMaxConnections(_)));

        let err = Config::from_args(args(&["2022", "many"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidMaxConnections(_)));
    }
}
