//! API server configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use carebase_core::auth::jwt::resolve_jwt_secret;

/// Deployment environment. Controls cookie `Secure` and error detail exposure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "test" => Ok(Environment::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
        })
    }
}

/// Per-client request allowance: at most `max_requests` per `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    /// 100 requests per 15 minutes.
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimit {
    fn from_env() -> Self {
        let default = Self::default();
        let max_requests = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default.max_requests);
        let window = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&secs| secs > 0)
            .map_or(default.window, Duration::from_secs);
        Self {
            max_requests,
            window,
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub environment: Environment,
    /// Base URL of the password reset page; the code is appended as a path segment.
    pub reset_url_base: String,
    /// Signature used in outgoing email.
    pub hospital_name: String,
    /// Single origin allowed by CORS. `None` disables the CORS layer.
    pub allowed_origin: Option<String>,
    pub rate_limit: RateLimit,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                                     |
    /// |--------------------|---------------------------------------------|
    /// | `BIND_ADDR`        | `127.0.0.1:3000`                            |
    /// | `APP_ENV`          | `development`                               |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file     |
    /// | `RESET_URL_BASE`   | `http://localhost:3000/reset-password`      |
    /// | `HOSPITAL_NAME`    | `Carebase Hospital`                         |
    /// | `CORS_ORIGIN`      | unset                                       |
    /// | `RATE_LIMIT_MAX`   | `100`                                       |
    /// | `RATE_LIMIT_WINDOW_SECS` | `900`                                 |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into()),
            jwt_secret: resolve_jwt_secret(),
            environment: std::env::var("APP_ENV")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            reset_url_base: std::env::var("RESET_URL_BASE")
                .unwrap_or_else(|_| "http://localhost:3000/reset-password".into()),
            hospital_name: std::env::var("HOSPITAL_NAME")
                .unwrap_or_else(|_| "Carebase Hospital".into()),
            allowed_origin: std::env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
            rate_limit: RateLimit::from_env(),
        }
    }

    /// Cookies carry `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }

    /// Error responses carry `detail` only outside production.
    pub fn expose_error_detail(&self) -> bool {
        !self.environment.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("PRODUCTION".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn production_flags() {
        let mut config = ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: "s".into(),
            environment: Environment::Development,
            reset_url_base: "http://localhost/reset".into(),
            hospital_name: "H".into(),
            allowed_origin: None,
            rate_limit: RateLimit::default(),
        };
        assert!(!config.secure_cookies());
        assert!(config.expose_error_detail());

        config.environment = Environment::Production;
        assert!(config.secure_cookies());
        assert!(!config.expose_error_detail());
    }
}
