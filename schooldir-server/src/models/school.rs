//! School records and request validation
//!
//! Inbound payloads are loose (every field optional, id as number or
//! string). They become `NewSchool` / `SchoolUpdate` only after the
//! required-field and pattern checks pass, so the repository never sees
//! unvalidated input.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

const MAX_NAME_LEN: usize = 255;
const MAX_REGION_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;
const MAX_IMAGE_LEN: usize = 500;

/// Exactly ten digits, no separators.
static CONTACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("invalid contact regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("invalid email regex")
});

/// A row of the `schools` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// School id as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchoolId {
    Number(i64),
    Text(String),
}

impl SchoolId {
    /// Resolve to a positive database id.
    pub fn resolve(&self) -> Result<i32, ValidationError> {
        let invalid = ValidationError::InvalidFormat {
            field: "id",
            reason: "must be a positive integer",
        };

        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ValidationError::MissingId);
                }
                s.parse::<i64>().map_err(|_| invalid.clone())?
            }
        };

        i32::try_from(raw)
            .ok()
            .filter(|id| *id > 0)
            .ok_or(invalid)
    }
}

/// Request body for create and update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolPayload {
    pub id: Option<SchoolId>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Validated field set written on insert or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchool {
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    /// `None` on update means "keep the stored image"
    pub image: Option<String>,
}

/// Validated update: target id plus replacement fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolUpdate {
    pub id: i32,
    pub fields: NewSchool,
}

impl NewSchool {
    /// Validate a create payload. Any `id` in the payload is ignored.
    ///
    /// # Example
    /// ```
    /// use schooldir_server::models::{NewSchool, SchoolPayload};
    ///
    /// let payload = SchoolPayload {
    ///     name: Some("Lincoln High".into()),
    ///     city: Some("Springfield".into()),
    ///     state: Some("IL".into()),
    ///     ..Default::default()
    /// };
    /// assert!(NewSchool::from_payload(payload).is_ok());
    /// assert!(NewSchool::from_payload(SchoolPayload::default()).is_err());
    /// ```
    pub fn from_payload(payload: SchoolPayload) -> Result<Self, ValidationError> {
        let name = required(payload.name);
        let city = required(payload.city);
        let state = required(payload.state);

        let (Some(name), Some(city), Some(state)) = (name, city, state) else {
            return Err(ValidationError::MissingRequired);
        };

        check_len("name", &name, MAX_NAME_LEN)?;
        check_len("city", &city, MAX_REGION_LEN)?;
        check_len("state", &state, MAX_REGION_LEN)?;

        let contact_number = optional(payload.contact_number);
        if let Some(contact) = &contact_number {
            if !CONTACT_RE.is_match(contact.trim()) {
                return Err(ValidationError::InvalidFormat {
                    field: "contact_number",
                    reason: "must be 10 digits",
                });
            }
        }

        let email = optional(payload.email);
        if let Some(email) = &email {
            check_len("email", email, MAX_EMAIL_LEN)?;
            if !EMAIL_RE.is_match(email.trim()) {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "invalid email address",
                });
            }
        }

        let image = optional(payload.image);
        if let Some(image) = &image {
            check_len("image", image, MAX_IMAGE_LEN)?;
        }

        Ok(Self {
            name,
            address: optional(payload.address),
            city,
            state,
            contact_number,
            email,
            image,
        })
    }
}

impl SchoolUpdate {
    /// Validate an update payload. A missing id counts as a missing
    /// required field, matching the create path's message.
    pub fn from_payload(mut payload: SchoolPayload) -> Result<Self, ValidationError> {
        let id = match payload.id.take() {
            Some(id) => id.resolve().map_err(|e| match e {
                ValidationError::MissingId => ValidationError::MissingRequired,
                other => other,
            })?,
            None => return Err(ValidationError::MissingRequired),
        };

        Ok(Self {
            id,
            fields: NewSchool::from_payload(payload)?,
        })
    }
}

/// Present unless absent or the empty string. Stored as sent.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Blank (empty or whitespace-only) becomes `None`; anything else is kept
/// as sent.
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lincoln() -> SchoolPayload {
        SchoolPayload {
            id: None,
            name: Some("Lincoln High".into()),
            address: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            contact_number: Some("5551234567".into()),
            email: Some("info@lincoln.edu".into()),
            image: None,
        }
    }

    #[test]
    fn valid_payload() {
        let school = NewSchool::from_payload(lincoln()).unwrap();
        assert_eq!(school.name, "Lincoln High");
        assert_eq!(school.address.as_deref(), Some("1 Main St"));
        assert_eq!(school.city, "Springfield");
        assert_eq!(school.state, "IL");
        assert_eq!(school.image, None);
    }

    #[test]
    fn rejects_missing_required() {
        for strip in ["name", "city", "state"] {
            let mut payload = lincoln();
            match strip {
                "name" => payload.name = None,
                "city" => payload.city = Some(String::new()),
                _ => payload.state = Some(String::new()),
            }
            let err = NewSchool::from_payload(payload).unwrap_err();
            assert_eq!(err, ValidationError::MissingRequired, "stripped {strip}");
        }
    }

    #[test]
    fn values_are_stored_as_sent() {
        let mut payload = lincoln();
        payload.name = Some(" Lincoln High ".into());
        payload.address = Some("  1 Main St".into());
        payload.contact_number = Some("5551234567 ".into());

        let school = NewSchool::from_payload(payload).unwrap();
        assert_eq!(school.name, " Lincoln High ");
        assert_eq!(school.address.as_deref(), Some("  1 Main St"));
        assert_eq!(school.contact_number.as_deref(), Some("5551234567 "));
    }

    #[test]
    fn whitespace_only_required_field_is_present() {
        let mut payload = lincoln();
        payload.name = Some("   ".into());

        let school = NewSchool::from_payload(payload).unwrap();
        assert_eq!(school.name, "   ");
    }

    #[test]
    fn blank_optionals_become_none() {
        let mut payload = lincoln();
        payload.address = Some("".into());
        payload.contact_number = Some(" ".into());
        payload.email = None;
        payload.image = Some("".into());

        let school = NewSchool::from_payload(payload).unwrap();
        assert_eq!(school.address, None);
        assert_eq!(school.contact_number, None);
        assert_eq!(school.email, None);
        assert_eq!(school.image, None);
    }

    #[test]
    fn rejects_bad_contact_number() {
        for bad in ["555123456", "55512345678", "555-123-4567", "abcdefghij"] {
            let mut payload = lincoln();
            payload.contact_number = Some(bad.into());
            let err = NewSchool::from_payload(payload).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidFormat { field: "contact_number", .. }),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn email_pattern_is_case_insensitive() {
        let mut payload = lincoln();
        payload.email = Some("Info@Lincoln.EDU".into());
        assert!(NewSchool::from_payload(payload).is_ok());

        let mut payload = lincoln();
        payload.email = Some("not-an-email".into());
        let err = NewSchool::from_payload(payload).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "email", .. }));
    }

    #[test]
    fn name_max_length() {
        let mut payload = lincoln();
        payload.name = Some("a".repeat(255));
        assert!(NewSchool::from_payload(payload).is_ok());

        let mut payload = lincoln();
        payload.name = Some("a".repeat(256));
        let err = NewSchool::from_payload(payload).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 255, .. }));
    }

    #[test]
    fn update_requires_id() {
        let err = SchoolUpdate::from_payload(lincoln()).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired);

        let mut payload = lincoln();
        payload.id = Some(SchoolId::Text("".into()));
        let err = SchoolUpdate::from_payload(payload).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired);
    }

    #[test]
    fn update_accepts_numeric_string_id() {
        let mut payload = lincoln();
        payload.id = Some(SchoolId::Text("42".into()));
        payload.image = Some("https://img.example/x.png".into());

        let update = SchoolUpdate::from_payload(payload).unwrap();
        assert_eq!(update.id, 42);
        assert_eq!(update.fields.image.as_deref(), Some("https://img.example/x.png"));
    }

    #[test]
    fn id_resolution() {
        assert_eq!(SchoolId::Number(7).resolve(), Ok(7));
        assert_eq!(SchoolId::Text(" 7 ".into()).resolve(), Ok(7));
        assert!(SchoolId::Number(0).resolve().is_err());
        assert!(SchoolId::Number(i64::MAX).resolve().is_err());
        assert!(SchoolId::Text("seven".into()).resolve().is_err());
        assert_eq!(
            SchoolId::Text("".into()).resolve(),
            Err(ValidationError::MissingId)
        );
    }

    #[test]
    fn payload_deserializes_id_variants() {
        let p: SchoolPayload = serde_json::from_str(r#"{"id": 3, "name": "A"}"#).unwrap();
        assert_eq!(p.id, Some(SchoolId::Number(3)));

        let p: SchoolPayload = serde_json::from_str(r#"{"id": "3"}"#).unwrap();
        assert_eq!(p.id, Some(SchoolId::Text("3".into())));
    }
}
