use crate::app::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub http_bind: String,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            db_path: lookup("DB_PATH")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "./data/sensors.db".to_string()),
            http_bind: lookup("HTTP_BIND")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn applies_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).expect("config should be valid");

        assert_eq!(config.db_path, "./data/sensors.db");
        assert_eq!(config.http_bind, "0.0.0.0:8080");
        assert_eq!(config.cors_allowed_origin, None);
    }

    #[test]
    fn reads_overrides_and_trims_whitespace() {
        let config = AppConfig::from_lookup(|key| match key {
            "DB_PATH" => Some(" /var/lib/sensors/readings.db ".to_string()),
            "HTTP_BIND" => Some("127.0.0.1:9090".to_string()),
            "CORS_ALLOWED_ORIGIN" => Some("https://dashboard.example".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(config.db_path, "/var/lib/sensors/readings.db");
        assert_eq!(config.http_bind, "127.0.0.1:9090");
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("https://dashboard.example")
        );
    }

    #[test]
    fn treats_blank_values_as_unset() {
        let config = AppConfig::from_lookup(|key| match key {
            "CORS_ALLOWED_ORIGIN" => Some("   ".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(config.cors_allowed_origin, None);
    }
}
