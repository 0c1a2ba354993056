//! Runtime settings for the student pipeline
//!
//! Built from the shared [`ValidationConfig`] after CLI overrides are
//! applied.

use crate::models::ValidationMode;
use crate::services::ValidationOptions;
use std::time::Duration;
use usermgmt_common::config::ValidationConfig;
use usermgmt_common::time::millis_to_duration;

/// Fixed settings of one validation manager
#[derive(Debug, Clone)]
pub struct ValidationSettings {
    pub enable_username: bool,
    pub order_flow: bool,
    pub strict: bool,
    /// Domain of generated login emails
    pub login_email_domain: String,
    /// Upper bound for each bulk lookup
    pub lookup_timeout: Duration,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self::from(&ValidationConfig::default())
    }
}

impl From<&ValidationConfig> for ValidationSettings {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            enable_username: config.enable_username,
            order_flow: config.order_flow,
            strict: config.strict,
            login_email_domain: config.login_email_domain.clone(),
            lookup_timeout: millis_to_duration(config.lookup_timeout_ms),
        }
    }
}

impl ValidationSettings {
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions {
            enable_username: self.enable_username,
            order_flow: self.order_flow,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    /// Login email of a student
    ///
    /// With usernames enabled the login identity is detached from the
    /// contact email and derived from the user ID.
    pub fn login_email(&self, user_id: &str, email: &str, enable_username: bool) -> String {
        if enable_username {
            format!("{}@{}", user_id, self.login_email_domain)
        } else {
            email.trim().to_string()
        }
    }
}
