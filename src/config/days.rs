//! Per-day upload configuration loaded from a JSON file

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GuestlistError, Result};

/// Destination space for one ticket type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySpace {
    #[serde(rename = "SpaceId", alias = "spaceId", alias = "space_id")]
    pub space_id: String,
    #[serde(rename = "Overwrite", alias = "overwrite", default)]
    pub overwrite: bool,
}

/// Mapping from ticket type to its destination space.
///
/// File shape: `{ "Days": { "<ticket type>": { "SpaceId": "...", "Overwrite": false } } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayConfig {
    #[serde(rename = "Days", alias = "days", default)]
    pub days: HashMap<String, DaySpace>,
}

impl DayConfig {
    /// Load the day configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let buf = std::fs::read_to_string(path).map_err(|e| GuestlistError::io(path, e))?;
        serde_json::from_str(&buf).map_err(|source| GuestlistError::DayConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Space for `ticket_type`; a missing entry or an empty space id is fatal.
    pub fn space_for(&self, ticket_type: &str) -> Result<&DaySpace> {
        let space = self
            .days
            .get(ticket_type)
            .ok_or_else(|| GuestlistError::MissingDayConfig {
                ticket_type: ticket_type.to_string(),
            })?;
        if space.space_id.is_empty() {
            return Err(GuestlistError::EmptyValue {
                field: "space id",
                context: Some(ticket_type.to_string()),
            });
        }
        Ok(space)
    }
}
