//! Config module - process-wide settings and per-day upload configuration
//!
//! [`Settings`] is assembled once at the program boundary (environment plus
//! CLI overrides) and handed to the fetcher and writers. Nothing below this
//! module reads the environment.

mod days;

pub use days::{DayConfig, DaySpace};

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GuestlistError, Result};

/// Environment variable holding the event id.
pub const EVENT_ENV_KEY: &str = "EVENTBRITE_EVENT";
/// Environment variable holding the API bearer token.
pub const AUTH_ENV_KEY: &str = "EVENTBRITE_AUTH";
/// Environment variable holding the guest list API key.
pub const API_KEY_ENV_KEY: &str = "GATHER_API_KEY";
/// Environment variable overriding the day configuration path.
pub const CONF_ENV_KEY: &str = "GATHERBOT_CONF";

pub const DEFAULT_CONF_PATH: &str = ".gatherbot-conf.json";
pub const DEFAULT_API_BASE_URL: &str = "https://www.eventbriteapi.com/v3";
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.gather.town/api/setEmailGuestlist";
pub const DEFAULT_ALL_DAYS_LABEL: &str = "All-NOMCON Event Ticket";
pub const DEFAULT_PLATFORM_QUESTION_ID: &str = "76109979";
pub const DEFAULT_PLACEHOLDER_SPACE_ID: &str = "XXX";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the fetcher needs to walk the attendee listing.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub event_id: u64,
    pub token: String,
    pub timeout: Duration,
    /// Custom question whose answer is the attendee's platform login email.
    pub platform_question_id: String,
}

/// Values embedded in structured output and the upload command list.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub api_key: String,
    /// Space id marking a day that is not provisioned yet; no upload command is emitted for it.
    pub placeholder_space_id: String,
    pub upload_endpoint: String,
}

/// Raw settings gathered from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub event_id: Option<String>,
    pub auth_token: Option<String>,
    pub api_key: Option<String>,
    pub day_config_path: PathBuf,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            event_id: get(EVENT_ENV_KEY),
            auth_token: get(AUTH_ENV_KEY),
            api_key: get(API_KEY_ENV_KEY),
            day_config_path: get(CONF_ENV_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONF_PATH)),
        }
    }

    /// Settings for the `api` source. Event id and token are both required.
    pub fn fetch_settings(
        &self,
        base_url: &str,
        timeout: Duration,
        platform_question_id: &str,
    ) -> Result<FetchSettings> {
        let (Some(event), Some(token)) = (&self.event_id, &self.auth_token) else {
            return Err(GuestlistError::InvalidSetting {
                name: "event credentials",
                reason: format!(
                    "{EVENT_ENV_KEY} and {AUTH_ENV_KEY} environment variables must be set to fetch attendees"
                ),
            });
        };
        let event_id = event
            .trim()
            .parse::<u64>()
            .map_err(|e| GuestlistError::InvalidSetting {
                name: EVENT_ENV_KEY,
                reason: format!("event id must be a positive number in decimal format: {e}"),
            })?;

        Ok(FetchSettings {
            base_url: base_url.trim_end_matches('/').to_string(),
            event_id,
            token: token.clone(),
            timeout,
            platform_question_id: platform_question_id.to_string(),
        })
    }

    /// Settings for the `json` destination. The API key is required.
    pub fn export_settings(
        &self,
        placeholder_space_id: &str,
        upload_endpoint: &str,
    ) -> Result<ExportSettings> {
        let api_key = self.api_key.clone().ok_or(GuestlistError::EmptyValue {
            field: API_KEY_ENV_KEY,
            context: None,
        })?;
        Ok(ExportSettings {
            api_key,
            placeholder_space_id: placeholder_space_id.to_string(),
            upload_endpoint: upload_endpoint.to_string(),
        })
    }
}
