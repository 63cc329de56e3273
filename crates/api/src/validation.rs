//! Field and cross-field validation for every entity.
//!
//! Request bodies deserialize into the loosely typed `*Draft` structs below
//! (every field optional, unknown keys ignored). Each `validate_*` function
//! checks a draft and returns either the typed domain value or the complete
//! list of [`Violations`], so a client sees every problem at once.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use harbormaster_core::{CatwayNumber, CatwayType, Email};

use crate::models::{NewCatway, NewReservation, ReservationChanges};

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_CATWAY_STATE_LENGTH: usize = 500;
pub const MIN_NAME_LENGTH: usize = 2;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub message: String,
}

/// Every rule a draft failed, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// A list holding one violation.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut violations = Self::new();
        violations.push(field, message);
        violations
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(Violation {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// `Ok(value)` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|v| v.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

impl std::error::Error for Violations {}

// =============================================================================
// Drafts
// =============================================================================

/// Registration body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationDraft {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginDraft {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update body. `email` is accepted on the wire but never applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateDraft {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Berth creation body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatwayDraft {
    pub catway_number: Option<i64>,
    pub catway_type: Option<String>,
    pub catway_state: Option<String>,
}

/// Berth update body. Only the state is read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatwayStateDraft {
    pub catway_state: Option<String>,
}

/// Reservation body, for both creation and partial updates.
///
/// The berth always comes from the URL, so a `catwayNumber` in the body is
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub client_name: Option<String>,
    pub boat_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// =============================================================================
// Validated outputs
// =============================================================================

/// A registration whose fields all passed validation. The password is still
/// plaintext here; hashing happens in the user service.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub email: Email,
    pub password: String,
}

/// Allow-listed, validated profile changes.
#[derive(Debug, Clone, Default)]
pub struct ValidUserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated partial reservation update.
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub client_name: Option<String>,
    pub boat_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ReservationPatch {
    /// Overlay this patch on the stored values.
    #[must_use]
    pub fn apply(self, current: ReservationChanges) -> ReservationChanges {
        ReservationChanges {
            client_name: self.client_name.unwrap_or(current.client_name),
            boat_name: self.boat_name.unwrap_or(current.boat_name),
            start_date: self.start_date.unwrap_or(current.start_date),
            end_date: self.end_date.unwrap_or(current.end_date),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Validate a registration body.
///
/// # Errors
///
/// Returns every violated rule: missing fields, short username, malformed
/// email, short password.
pub fn validate_registration(draft: &RegistrationDraft) -> Result<ValidRegistration, Violations> {
    let mut violations = Violations::new();

    let username = required(
        &mut violations,
        "username",
        draft.username.as_deref(),
        "username is required",
    );
    if let Some(name) = username {
        check_username(&mut violations, name);
    }

    let email = required(&mut violations, "email", draft.email.as_deref(), "email is required")
        .and_then(|raw| match Email::parse(raw) {
            Ok(email) => Some(email),
            Err(e) => {
                violations.push("email", format!("invalid email: {e}"));
                None
            }
        });

    let password = match draft.password.as_deref() {
        None | Some("") => {
            violations.push("password", "password is required");
            None
        }
        Some(password) => {
            check_password(&mut violations, password);
            Some(password)
        }
    };

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) if violations.is_empty() => {
            Ok(ValidRegistration {
                username: username.to_owned(),
                email,
                password: password.to_owned(),
            })
        }
        _ => Err(violations),
    }
}

/// Validate a profile update.
///
/// `email` is dropped without complaint. An empty `password` means "keep the
/// current one".
///
/// # Errors
///
/// Returns violations for a supplied username or password that breaks the
/// length rules.
pub fn validate_user_update(draft: &UserUpdateDraft) -> Result<ValidUserUpdate, Violations> {
    let mut violations = Violations::new();

    let username = draft.username.as_deref().map(str::trim);
    if let Some(name) = username {
        check_username(&mut violations, name);
    }

    let password = draft.password.as_deref().filter(|p| !p.is_empty());
    if let Some(password) = password {
        check_password(&mut violations, password);
    }

    violations.finish(|| ValidUserUpdate {
        username: username.map(str::to_owned),
        password: password.map(str::to_owned),
    })
}

/// Check that both login fields are present.
///
/// The email is not parsed here: a malformed address fails later as plain
/// invalid credentials.
///
/// # Errors
///
/// Returns a violation per missing field.
pub fn validate_login(draft: &LoginDraft) -> Result<(String, String), Violations> {
    let mut violations = Violations::new();
    let email = required(&mut violations, "email", draft.email.as_deref(), "email is required");
    let password = match draft.password.as_deref() {
        Some(password) if !password.is_empty() => Some(password),
        _ => {
            violations.push("password", "password is required");
            None
        }
    };
    match (email, password) {
        (Some(email), Some(password)) => Ok((email.to_owned(), password.to_owned())),
        _ => Err(violations),
    }
}

fn check_username(violations: &mut Violations, username: &str) {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        violations.push(
            "username",
            format!("username must be at least {MIN_USERNAME_LENGTH} characters"),
        );
    }
}

fn check_password(violations: &mut Violations, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(
            "password",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

// =============================================================================
// Catways
// =============================================================================

/// Validate a berth creation body.
///
/// # Errors
///
/// Returns violations for a missing or non-positive number, a type outside
/// `long`/`short`, and a missing or oversized state.
pub fn validate_catway(draft: &CatwayDraft) -> Result<NewCatway, Violations> {
    let mut violations = Violations::new();

    let catway_number = match draft.catway_number {
        None => {
            violations.push("catwayNumber", "catwayNumber is required");
            None
        }
        Some(raw) => match CatwayNumber::new(raw) {
            Ok(number) => Some(number),
            Err(e) => {
                violations.push("catwayNumber", e.to_string());
                None
            }
        },
    };

    let catway_type = required(
        &mut violations,
        "catwayType",
        draft.catway_type.as_deref(),
        "catwayType is required",
    )
    .and_then(|raw| match raw.parse::<CatwayType>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            violations.push("catwayType", e.to_string());
            None
        }
    });

    let catway_state = check_catway_state(&mut violations, draft.catway_state.as_deref());

    match (catway_number, catway_type, catway_state) {
        (Some(catway_number), Some(catway_type), Some(catway_state)) if violations.is_empty() => {
            Ok(NewCatway {
                catway_number,
                catway_type,
                catway_state,
            })
        }
        _ => Err(violations),
    }
}

/// Validate the only mutable berth field.
///
/// # Errors
///
/// Returns a violation when the state is missing, blank, or too long.
pub fn validate_catway_state(draft: &CatwayStateDraft) -> Result<String, Violations> {
    let mut violations = Violations::new();
    match check_catway_state(&mut violations, draft.catway_state.as_deref()) {
        Some(state) if violations.is_empty() => Ok(state),
        _ => Err(violations),
    }
}

fn check_catway_state(violations: &mut Violations, raw: Option<&str>) -> Option<String> {
    let state = required(violations, "catwayState", raw, "catwayState is required")?;
    if state.chars().count() > MAX_CATWAY_STATE_LENGTH {
        violations.push(
            "catwayState",
            format!("catwayState cannot exceed {MAX_CATWAY_STATE_LENGTH} characters"),
        );
        return None;
    }
    Some(state.to_owned())
}

// =============================================================================
// Reservations
// =============================================================================

/// Validate a reservation creation body for berth `catway_number`.
///
/// # Errors
///
/// Returns violations for missing or short names, missing or unparsable
/// dates, and an end date that is not strictly after the start date.
pub fn validate_reservation(
    catway_number: CatwayNumber,
    draft: &ReservationDraft,
) -> Result<NewReservation, Violations> {
    let mut violations = Violations::new();

    let client_name = required(
        &mut violations,
        "clientName",
        draft.client_name.as_deref(),
        "clientName is required",
    );
    if let Some(name) = client_name {
        check_name(&mut violations, "clientName", name);
    }

    let boat_name = required(
        &mut violations,
        "boatName",
        draft.boat_name.as_deref(),
        "boatName is required",
    );
    if let Some(name) = boat_name {
        check_name(&mut violations, "boatName", name);
    }

    let start_date = required_date(&mut violations, "startDate", draft.start_date.as_deref());
    let end_date = required_date(&mut violations, "endDate", draft.end_date.as_deref());

    if let (Some(start), Some(end)) = (start_date, end_date)
        && let Err(interval) = check_interval(start, end)
    {
        violations.0.extend(interval.0);
    }

    match (client_name, boat_name, start_date, end_date) {
        (Some(client_name), Some(boat_name), Some(start_date), Some(end_date))
            if violations.is_empty() =>
        {
            Ok(NewReservation {
                catway_number,
                client_name: client_name.to_owned(),
                boat_name: boat_name.to_owned(),
                start_date,
                end_date,
            })
        }
        _ => Err(violations),
    }
}

/// Validate the supplied fields of a partial reservation update.
///
/// The date ordering of the merged result is checked separately with
/// [`check_interval`], once the stored values are known.
///
/// # Errors
///
/// Returns violations for blank or short names and unparsable dates.
pub fn validate_reservation_patch(
    draft: &ReservationDraft,
) -> Result<ReservationPatch, Violations> {
    let mut violations = Violations::new();

    let client_name = draft.client_name.as_deref().map(str::trim);
    if let Some(name) = client_name {
        check_name(&mut violations, "clientName", name);
    }
    let boat_name = draft.boat_name.as_deref().map(str::trim);
    if let Some(name) = boat_name {
        check_name(&mut violations, "boatName", name);
    }

    let start_date = draft
        .start_date
        .as_deref()
        .and_then(|raw| checked_date(&mut violations, "startDate", raw));
    let end_date = draft
        .end_date
        .as_deref()
        .and_then(|raw| checked_date(&mut violations, "endDate", raw));

    violations.finish(|| ReservationPatch {
        client_name: client_name.map(str::to_owned),
        boat_name: boat_name.map(str::to_owned),
        start_date,
        end_date,
    })
}

/// The reservation interval rule: the end must be strictly after the start.
///
/// # Errors
///
/// Returns a single `endDate` violation for equal or inverted ranges.
pub fn check_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), Violations> {
    if end > start {
        Ok(())
    } else {
        Err(Violations::single(
            "endDate",
            "endDate must be after startDate",
        ))
    }
}

fn check_name(violations: &mut Violations, field: &'static str, name: &str) {
    if name.chars().count() < MIN_NAME_LENGTH {
        violations.push(
            field,
            format!("{field} must be at least {MIN_NAME_LENGTH} characters"),
        );
    }
}

fn required_date(
    violations: &mut Violations,
    field: &'static str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    let raw = required(violations, field, raw, &format!("{field} is required"))?;
    checked_date(violations, field, raw)
}

fn checked_date(
    violations: &mut Violations,
    field: &'static str,
    raw: &str,
) -> Option<DateTime<Utc>> {
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        violations.push(field, format!("{field} must be a valid date"));
    }
    parsed
}

/// Parse a client-supplied instant.
///
/// Accepts RFC 3339 (`2024-01-10T08:30:00Z`), a naive date-time
/// (`2024-01-10T08:30:00`, read as UTC) or a bare date (`2024-01-10`,
/// midnight UTC).
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trimmed, non-empty value of a required field.
fn required<'a>(
    violations: &mut Violations,
    field: &'static str,
    raw: Option<&'a str>,
    message: &str,
) -> Option<&'a str> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            violations.push(field, message);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn registration(username: &str, email: &str, password: &str) -> RegistrationDraft {
        RegistrationDraft {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn reservation_draft(start: &str, end: &str) -> ReservationDraft {
        ReservationDraft {
            client_name: Some("Jo".to_string()),
            boat_name: Some("Wave".to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    #[test]
    fn test_registration_rejects_short_username() {
        let err = validate_registration(&registration("ab", "a@b.com", "123456")).unwrap_err();
        assert!(err.has_field("username"));
        assert_eq!(err.to_string(), "username must be at least 3 characters");
    }

    #[test]
    fn test_registration_collects_every_violation() {
        let err = validate_registration(&RegistrationDraft::default()).unwrap_err();
        assert!(err.has_field("username"));
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
        assert_eq!(err.iter().count(), 3);
    }

    #[test]
    fn test_registration_normalizes() {
        let valid = validate_registration(&registration("  abc ", " A@B.com", "123456")).unwrap();
        assert_eq!(valid.username, "abc");
        assert_eq!(valid.email.as_str(), "a@b.com");
    }

    #[test]
    fn test_registration_short_password() {
        let err = validate_registration(&registration("abc", "a@b.com", "12345")).unwrap_err();
        assert!(err.has_field("password"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let err = validate_login(&LoginDraft {
            email: Some("a@b.com".to_string()),
            password: None,
        })
        .unwrap_err();
        assert!(err.has_field("password"));
        assert!(!err.has_field("email"));
    }

    #[test]
    fn test_user_update_drops_email_and_empty_password() {
        let draft = UserUpdateDraft {
            username: None,
            email: Some("new@b.com".to_string()),
            password: Some(String::new()),
        };
        let valid = validate_user_update(&draft).unwrap();
        assert!(valid.username.is_none());
        assert!(valid.password.is_none());
    }

    #[test]
    fn test_catway_rejects_unknown_type_and_zero_number() {
        let draft = CatwayDraft {
            catway_number: Some(0),
            catway_type: Some("medium".to_string()),
            catway_state: Some("good".to_string()),
        };
        let err = validate_catway(&draft).unwrap_err();
        assert!(err.has_field("catwayNumber"));
        assert!(err.has_field("catwayType"));
        assert!(!err.has_field("catwayState"));
    }

    #[test]
    fn test_catway_state_length() {
        let long = CatwayStateDraft {
            catway_state: Some("x".repeat(MAX_CATWAY_STATE_LENGTH + 1)),
        };
        assert!(validate_catway_state(&long).is_err());

        let blank = CatwayStateDraft {
            catway_state: Some("   ".to_string()),
        };
        assert!(validate_catway_state(&blank).is_err());

        let ok = CatwayStateDraft {
            catway_state: Some(" repainted ".to_string()),
        };
        assert_eq!(validate_catway_state(&ok).unwrap(), "repainted");
    }

    #[test]
    fn test_reservation_rejects_inverted_and_empty_ranges() {
        let number = CatwayNumber::new(1).unwrap();

        let inverted = validate_reservation(number, &reservation_draft("2024-01-10", "2024-01-05"));
        assert!(inverted.unwrap_err().has_field("endDate"));

        let empty = validate_reservation(number, &reservation_draft("2024-01-10", "2024-01-10"));
        assert!(empty.unwrap_err().has_field("endDate"));

        let ok =
            validate_reservation(number, &reservation_draft("2024-01-10", "2024-01-15")).unwrap();
        assert_eq!(ok.catway_number, number);
        assert_eq!(
            ok.start_date,
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_reservation_rejects_bad_date_text() {
        let number = CatwayNumber::new(1).unwrap();
        let err =
            validate_reservation(number, &reservation_draft("soon", "2024-01-15")).unwrap_err();
        assert!(err.has_field("startDate"));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 8, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-10T08:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-01-10T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_datetime("2024-01-10T08:30:00"), Some(expected));
        assert_eq!(
            parse_datetime("2024-01-10"),
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("10/01/2024"), None);
    }

    #[test]
    fn test_patch_apply_overlays_supplied_fields() {
        let current = ReservationChanges {
            client_name: "Jo".to_string(),
            boat_name: "Wave".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        };
        let patch = validate_reservation_patch(&ReservationDraft {
            boat_name: Some("Swell".to_string()),
            end_date: Some("2024-01-20".to_string()),
            ..ReservationDraft::default()
        })
        .unwrap();

        let merged = patch.apply(current.clone());
        assert_eq!(merged.client_name, current.client_name);
        assert_eq!(merged.boat_name, "Swell");
        assert_eq!(
            merged.end_date,
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_check_interval() {
        let a = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert!(check_interval(a, b).is_ok());
        assert!(check_interval(b, a).is_err());
        assert!(check_interval(a, a).is_err());
    }
}
