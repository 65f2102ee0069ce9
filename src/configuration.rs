use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token and password hashing settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// Signs access tokens only
    pub access_secret: String,
    /// Signs refresh tokens only; must differ from `access_secret`
    pub refresh_secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
    /// bcrypt cost factor (4..=31)
    pub password_hash_cost: u32,
}

const MIN_SECRET_LENGTH: usize = 32;
const MIN_HASH_COST: u32 = 4;
/// Ten years
const MAX_TOKEN_EXPIRY: i64 = 10 * 365 * 24 * 60 * 60;
const MAX_HASH_COST: u32 = 31;

impl AuthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.len() < MIN_SECRET_LENGTH
            || self.refresh_secret.len() < MIN_SECRET_LENGTH
        {
            return Err(ConfigError::Message(format!(
                "auth secrets must be at least {} characters",
                MIN_SECRET_LENGTH
            )));
        }

        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Message(
                "auth.access_secret and auth.refresh_secret must differ".to_string(),
            ));
        }

        for expiry in [self.access_token_expiry, self.refresh_token_expiry] {
            if !(1..=MAX_TOKEN_EXPIRY).contains(&expiry) {
                return Err(ConfigError::Message(format!(
                    "token expiries must be between 1 and {} seconds",
                    MAX_TOKEN_EXPIRY
                )));
            }
        }

        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.password_hash_cost) {
            return Err(ConfigError::Message(format!(
                "auth.password_hash_cost must be between {} and {}",
                MIN_HASH_COST,
                MAX_HASH_COST
            )));
        }

        Ok(())
    }
}

/// Reads `configuration.yaml` (optional) and then `APP__`-prefixed
/// environment variables, e.g. `APP__AUTH__ACCESS_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_settings() -> AuthSettings {
        AuthSettings {
            access_secret: "access-secret-key-at-least-32-characters".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "talangraga".to_string(),
            password_hash_cost: 4,
        }
    }

    #[test]
    fn test_valid_auth_settings() {
        assert!(auth_settings().validate().is_ok());
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut settings = auth_settings();
        settings.refresh_secret = settings.access_secret.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut settings = auth_settings();
        settings.access_secret = "short".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut settings = auth_settings();
        settings.access_token_expiry = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_oversized_expiry_rejected() {
        let mut settings = auth_settings();
        settings.refresh_token_expiry = i64::MAX;
        assert!(settings.validate().is_err());

        settings.refresh_token_expiry = MAX_TOKEN_EXPIRY;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_hash_cost_bounds() {
        let mut settings = auth_settings();
        settings.password_hash_cost = 3;
        assert!(settings.validate().is_err());
        settings.password_hash_cost = 12;
        assert!(settings.validate().is_ok());
    }
}
