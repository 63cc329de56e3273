//! Reservation domain types and the interval model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbormaster_core::{CatwayNumber, ReservationId};

/// A time-bounded assignment of a client and boat to a berth.
///
/// Invariant: `end_date > start_date`. Every construction path goes through
/// [`crate::validation`], which rejects empty and inverted ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    /// Berth business key. Immutable once the reservation exists.
    pub catway_number: CatwayNumber,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Whether the reservation covers `now`.
    ///
    /// The interval is closed on both ends: a boat arriving exactly at
    /// `start_date` or leaving exactly at `end_date` still counts as moored.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// The mutable part of this reservation, as currently stored.
    #[must_use]
    pub fn changes(&self) -> ReservationChanges {
        ReservationChanges {
            client_name: self.client_name.clone(),
            boat_name: self.boat_name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// A validated reservation ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub catway_number: CatwayNumber,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// The full set of mutable fields written by an update.
///
/// Built by overlaying a partial update on the stored record, so the
/// repository always writes a range that was checked as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationChanges {
    pub client_name: String,
    pub boat_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Listing criteria. Results are always ordered by `start_date` ascending,
/// then by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Only reservations on this berth.
    pub catway: Option<CatwayNumber>,
    /// Only reservations active at this instant.
    pub active_at: Option<DateTime<Utc>>,
}

impl ReservationFilter {
    /// Every reservation on one berth.
    #[must_use]
    pub const fn for_catway(catway: CatwayNumber) -> Self {
        Self {
            catway: Some(catway),
            active_at: None,
        }
    }

    /// Every reservation active at `now`, across berths.
    #[must_use]
    pub const fn active_at(now: DateTime<Utc>) -> Self {
        Self {
            catway: None,
            active_at: Some(now),
        }
    }

    /// Whether `reservation` satisfies this filter.
    #[must_use]
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.catway.is_none_or(|n| reservation.catway_number == n)
            && self.active_at.is_none_or(|now| reservation.is_active(now))
    }
}
