//! Runtime configuration for the mock service.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_EMAIL: &str = "tester@petfriends.test";
pub const DEFAULT_PASSWORD: &str = "petfriends";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),
}

/// An account the service will issue a key for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub accounts: Vec<Account>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            accounts: vec![Account::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)],
        }
    }
}

impl ServerConfig {
    /// Read `PORT`, `PETFRIENDS_EMAIL` and `PETFRIENDS_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        // A configured account replaces the built-in one.
        if let (Some(email), Some(password)) =
            (lookup("PETFRIENDS_EMAIL"), lookup("PETFRIENDS_PASSWORD"))
        {
            config.accounts = vec![Account { email, password }];
        }
        Ok(config)
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.push(Account::new(email, password));
        self
    }
}
