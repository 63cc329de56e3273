//! Berth domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbormaster_core::{CatwayId, CatwayNumber, CatwayType};

/// A numbered mooring spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catway {
    pub id: CatwayId,
    pub catway_number: CatwayNumber,
    pub catway_type: CatwayType,
    /// Free-text condition report, the only field editable after creation.
    pub catway_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated berth ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatway {
    pub catway_number: CatwayNumber,
    pub catway_type: CatwayType,
    pub catway_state: String,
}
