//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use guestlist::config::{DayConfig, DaySpace, ExportSettings};
use guestlist::pipeline::{PageSource, Registrant};
use guestlist::{GuestlistError, Result};
use serde_json::json;
use tempfile::TempDir;

pub const ALL_DAYS: &str = "All-Days";
pub const QUESTION_ID: &str = "76109979";

/// Build a registrant with a name derived from the email
pub fn registrant(role: &str, email: &str) -> Registrant {
    Registrant {
        email: email.to_string(),
        name: format!("Name of {}", email),
        role: role.to_string(),
        affiliation: String::new(),
    }
}

/// A mixed registrant list covering two days and two all-days holders
pub fn sample_registrants() -> Vec<Registrant> {
    vec![
        registrant("Day1", "a@x.com"),
        registrant(ALL_DAYS, "all1@x.com"),
        registrant("Day 2 & Workshop", "b@x.com"),
        registrant("Day1", "c@x.com"),
        registrant(ALL_DAYS, "all2@x.com"),
    ]
}

/// Raw attendee record as returned by the registration API
pub fn raw_attendee(id: &str, email: &str, ticket: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": "stale@x.com",
        "profile": {"name": format!("Person {}", id), "email": format!(" {} ", email)},
        "ticket_class_name": ticket,
        "answers": []
    })
}

/// Page body with the given attendees and continuation flag
pub fn page_body(attendees: Vec<serde_json::Value>, has_more: bool) -> String {
    json!({
        "pagination": {"has_more_items": has_more},
        "attendees": attendees,
    })
    .to_string()
}

/// In-memory page source recording which pages were requested
pub struct FakePages {
    pages: HashMap<u32, std::result::Result<String, u16>>,
    pub requested: Vec<u32>,
}

impl FakePages {
    pub fn new(bodies: Vec<String>) -> Self {
        let pages = bodies
            .into_iter()
            .enumerate()
            .map(|(i, b)| (i as u32 + 1, Ok(b)))
            .collect();
        Self {
            pages,
            requested: Vec::new(),
        }
    }

    /// Make `page` answer with an HTTP status failure
    pub fn fail_page(mut self, page: u32, status: u16) -> Self {
        self.pages.insert(page, Err(status));
        self
    }
}

impl PageSource for FakePages {
    fn fetch_page(&mut self, page: u32) -> Result<String> {
        self.requested.push(page);
        match self.pages.get(&page) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(GuestlistError::Status {
                page,
                status: *status,
            }),
            None => Err(GuestlistError::Status { page, status: 404 }),
        }
    }
}

/// Day config with a space for each `(ticket type, space id)` pair
pub fn day_config(entries: &[(&str, &str)]) -> DayConfig {
    DayConfig {
        days: entries
            .iter()
            .map(|(tt, id)| {
                (
                    tt.to_string(),
                    DaySpace {
                        space_id: id.to_string(),
                        overwrite: false,
                    },
                )
            })
            .collect(),
    }
}

pub fn export_settings() -> ExportSettings {
    ExportSettings {
        api_key: "test-key".to_string(),
        placeholder_space_id: "XXX".to_string(),
        upload_endpoint: "https://upload.example/api/setEmailGuestlist".to_string(),
    }
}

/// Temporary directory and a not-yet-created output directory inside it
pub fn temp_output_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    (temp_dir, out)
}

/// Files directly inside `dir`, sorted by name
pub fn list_files(dir: &std::path::Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
