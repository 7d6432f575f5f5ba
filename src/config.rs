use crate::learn::DEFAULT_ACCOUNTS_FILE;
use crate::library::{LendingRules, User, DEFAULT_LOAN_DAYS, MAX_BORROW_LIMIT, MAX_LOAN_DAYS};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project and per-user configuration directory
pub const CONFIG_DIR: &str = ".studyhall";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Configuration for the library front end
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LibraryConfig {
    #[serde(default)]
    pub max_borrowed: Option<usize>,
    #[serde(default)]
    pub loan_days: Option<i64>,
    /// Add the starter books at startup
    #[serde(default)]
    pub seed_books: Option<bool>,
    #[serde(default)]
    pub admin_name: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl LibraryConfig {
    pub fn rules(&self) -> LendingRules {
        LendingRules {
            max_borrowed: self.max_borrowed.unwrap_or(MAX_BORROW_LIMIT),
            loan_days: self.loan_days.unwrap_or(DEFAULT_LOAN_DAYS),
        }
    }

    pub fn seed_books(&self) -> bool {
        self.seed_books.unwrap_or(true)
    }

    /// The session's admin account
    pub fn admin(&self) -> User {
        User::admin(
            self.admin_name.as_deref().unwrap_or("Admin"),
            self.admin_password.as_deref().unwrap_or("admin123"),
        )
    }
}

/// Configuration for the learning front end
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LearnConfig {
    #[serde(default)]
    pub accounts_file: Option<PathBuf>,
}

impl LearnConfig {
    pub fn accounts_file(&self) -> PathBuf {
        self.accounts_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACCOUNTS_FILE))
    }
}

/// Configuration for session transcripts
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TranscriptConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl TranscriptConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn dir(&self, root: &Path) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| root.join(CONFIG_DIR).join("sessions"))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub learn: LearnConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.studyhall/config.local.toml) > project (.studyhall/config.toml)
    /// > user (~/.studyhall/config.toml)
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_layers(dirs::home_dir().as_deref(), root)
    }

    fn load_layers(home: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let mut layers = Vec::new();
        if let Some(home) = home {
            layers.push(home.join(CONFIG_DIR).join("config.toml"));
        }
        layers.push(root.join(CONFIG_DIR).join("config.toml"));
        layers.push(root.join(CONFIG_DIR).join("config.local.toml"));

        for path in layers {
            if path.exists() {
                let layer = Self::load_from(&path)?;
                tracing::debug!(path = %path.display(), "merged config layer");
                config.merge(layer);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority where set)
    pub fn merge(&mut self, other: Config) {
        let lib = other.library;
        if lib.max_borrowed.is_some() {
            self.library.max_borrowed = lib.max_borrowed;
        }
        if lib.loan_days.is_some() {
            self.library.loan_days = lib.loan_days;
        }
        if lib.seed_books.is_some() {
            self.library.seed_books = lib.seed_books;
        }
        if lib.admin_name.is_some() {
            self.library.admin_name = lib.admin_name;
        }
        if lib.admin_password.is_some() {
            self.library.admin_password = lib.admin_password;
        }

        if other.learn.accounts_file.is_some() {
            self.learn.accounts_file = other.learn.accounts_file;
        }

        if other.transcript.enabled.is_some() {
            self.transcript.enabled = other.transcript.enabled;
        }
        if other.transcript.dir.is_some() {
            self.transcript.dir = other.transcript.dir;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.library.max_borrowed == Some(0) {
            errors.push(ValidationError {
                field: "library.max_borrowed".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if let Some(days) = self.library.loan_days {
            if days <= 0 {
                errors.push(ValidationError {
                    field: "library.loan_days".to_string(),
                    message: format!("Must be greater than 0, got {}", days),
                });
            } else if days > MAX_LOAN_DAYS {
                errors.push(ValidationError {
                    field: "library.loan_days".to_string(),
                    message: format!("Must be at most {}, got {}", MAX_LOAN_DAYS, days),
                });
            }
        }

        if let Some(name) = &self.library.admin_name {
            if name.trim().is_empty() {
                errors.push(ValidationError {
                    field: "library.admin_name".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        if let Some(path) = &self.learn.accounts_file {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: "learn.accounts_file".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_layer(dir: &Path, name: &str, content: &str) {
        let config_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(name), content).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.library.rules(), LendingRules::default());
        assert!(config.library.seed_books());
        assert!(config.library.admin().is_admin());
        assert_eq!(config.library.admin().name, "Admin");
        assert_eq!(config.learn.accounts_file(), PathBuf::from("users.json"));
        assert!(config.transcript.enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layer_priority() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        write_layer(
            home.path(),
            "config.toml",
            "[library]\nmax_borrowed = 5\nloan_days = 7\n",
        );
        write_layer(root.path(), "config.toml", "[library]\nloan_days = 21\n");
        write_layer(
            root.path(),
            "config.local.toml",
            "[learn]\naccounts_file = \"data/accounts.json\"\n",
        );

        let config = Config::load_layers(Some(home.path()), root.path()).unwrap();
        assert_eq!(config.library.rules().max_borrowed, 5);
        assert_eq!(config.library.rules().loan_days, 21);
        assert_eq!(
            config.learn.accounts_file(),
            PathBuf::from("data/accounts.json")
        );
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let root = TempDir::new().unwrap();
        write_layer(root.path(), "config.toml", "[library\n");
        assert!(Config::load_layers(None, root.path()).is_err());
    }

    #[test]
    fn test_validate_zero_limit() {
        let mut config = Config::default();
        config.library.max_borrowed = Some(0);
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("max_borrowed"));
    }

    #[test]
    fn test_validate_loan_days() {
        let mut config = Config::default();
        config.library.loan_days = Some(-3);
        config.library.admin_name = Some("  ".to_string());
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("got -3"));
        assert_eq!(
            format!("{}", errors[1]),
            "[library.admin_name]: Must not be empty"
        );
    }

    #[test]
    fn test_validate_loan_days_upper_bound() {
        let root = TempDir::new().unwrap();
        write_layer(root.path(), "config.toml", "[library]\nloan_days = 1000000000\n");
        let config = Config::load_layers(None, root.path()).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "library.loan_days");
        assert!(errors[0].message.contains("at most 3650"));

        let mut config = Config::default();
        config.library.loan_days = Some(MAX_LOAN_DAYS);
        assert!(config.validate().is_ok());
    }
}
