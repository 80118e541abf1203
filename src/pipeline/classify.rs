//! Day classification and all-days replication
//!
//! Registrants are bucketed by ticket type. Holders of the all-days ticket
//! never form a bucket of their own; they are appended to every bucket that
//! was anchored by at least one day-specific registrant.

use serde::{Deserialize, Serialize};

use crate::error::{GuestlistError, Result};
use crate::pipeline::fetch::Attendee;

/// Guest list entry derived from an attendee or an export row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    pub email: String,
    pub name: String,
    /// Ticket type the registrant holds.
    pub role: String,
    pub affiliation: String,
}

impl From<&Attendee> for Registrant {
    fn from(a: &Attendee) -> Self {
        Self {
            email: a.email.clone(),
            name: a.name.clone(),
            role: a.ticket_type.clone(),
            affiliation: String::new(),
        }
    }
}

/// Registrants entitled to one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub ticket_type: String,
    pub members: Vec<Registrant>,
    direct: usize,
}

impl DayBucket {
    fn new(ticket_type: &str) -> Self {
        Self {
            ticket_type: ticket_type.to_string(),
            members: Vec::new(),
            direct: 0,
        }
    }

    /// Members placed by direct ticket match.
    pub fn direct_count(&self) -> usize {
        self.direct
    }

    /// Members appended from the all-days list.
    pub fn replicated_count(&self) -> usize {
        self.members.len() - self.direct
    }
}

/// Day buckets in the order their ticket types were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBuckets {
    buckets: Vec<DayBucket>,
}

impl DayBuckets {
    /// Build buckets from explicit `(ticket type, members)` pairs without any checks.
    pub fn from_parts(parts: Vec<(String, Vec<Registrant>)>) -> Self {
        let buckets = parts
            .into_iter()
            .map(|(ticket_type, members)| DayBucket {
                ticket_type,
                direct: members.len(),
                members,
            })
            .collect();
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.iter()
    }

    pub fn ticket_types(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.ticket_type.as_str()).collect()
    }

    pub fn get(&self, ticket_type: &str) -> Option<&[Registrant]> {
        self.buckets
            .iter()
            .find(|b| b.ticket_type == ticket_type)
            .map(|b| b.members.as_slice())
    }

    fn bucket_mut(&mut self, ticket_type: &str) -> &mut DayBucket {
        let pos = match self.buckets.iter().position(|b| b.ticket_type == ticket_type) {
            Some(pos) => pos,
            None => {
                self.buckets.push(DayBucket::new(ticket_type));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[pos]
    }

    /// Check that every member's role equals its bucket key.
    ///
    /// With `all_days` set, members holding that ticket are accepted in any bucket.
    pub fn verify(&self, all_days: Option<&str>) -> Result<()> {
        for bucket in &self.buckets {
            for g in &bucket.members {
                if all_days.is_some_and(|label| g.role == label) {
                    continue;
                }
                if g.role != bucket.ticket_type {
                    return Err(GuestlistError::BucketMismatch {
                        bucket: bucket.ticket_type.clone(),
                        email: g.email.clone(),
                        role: g.role.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Fail unless exactly `expected` day buckets exist.
    pub fn expect_days(&self, expected: usize) -> Result<()> {
        if self.buckets.len() != expected {
            return Err(GuestlistError::UnexpectedDayCount {
                expected,
                found: self.buckets.len(),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DayBuckets {
    type Item = &'a DayBucket;
    type IntoIter = std::slice::Iter<'a, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Partition registrants into day buckets and replicate all-days holders.
///
/// Buckets are discovered from direct matches only, verified, then every
/// all-days registrant is appended to each bucket in input order and the
/// result verified again.
pub fn classify(registrants: Vec<Registrant>, all_days: &str) -> Result<DayBuckets> {
    let mut days = DayBuckets::default();
    let mut all_event = Vec::new();

    for g in registrants {
        if g.role == all_days {
            all_event.push(g);
        } else {
            let bucket = days.bucket_mut(&g.role);
            bucket.members.push(g);
            bucket.direct += 1;
        }
    }
    days.verify(None)?;

    for bucket in &mut days.buckets {
        bucket.members.extend(all_event.iter().cloned());
    }
    days.verify(Some(all_days))?;

    Ok(days)
}
