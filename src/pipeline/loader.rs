//! Registrant loader for registration export CSV files

use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::{GuestlistError, Result};
use crate::pipeline::classify::Registrant;

/// One row of a registration export. Unknown columns are ignored; the email
/// and ticket type columns are required.
#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(alias = "Email")]
    email: String,
    #[serde(alias = "Name", default)]
    name: String,
    #[serde(alias = "Ticket Type", alias = "ticket_type")]
    role: String,
    #[serde(alias = "Affiliation", default)]
    affiliation: String,
}

/// Load registrants from a CSV export at `path`.
///
/// Accepts either the guest list columns (`email,name,role,affiliation`) or
/// the registration export headers (`Email`, `Name`, `Ticket Type`).
pub fn load_registrants(path: &Path) -> Result<Vec<Registrant>> {
    let file = std::fs::File::open(path).map_err(|e| GuestlistError::io(path, e))?;
    read_registrants(file).map_err(|source| GuestlistError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Read registrants from any CSV reader.
pub fn read_registrants<R: std::io::Read>(reader: R) -> std::result::Result<Vec<Registrant>, csv::Error> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    rdr.deserialize::<ExportRow>()
        .map(|row| {
            row.map(|r| Registrant {
                email: r.email,
                name: r.name,
                role: r.role,
                affiliation: r.affiliation,
            })
        })
        .collect()
}
