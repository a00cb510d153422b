//! Field-level validation of inbound JSON payloads.
//!
//! These are pure functions over already-decoded [`serde_json::Value`]s: they
//! check shape and field rules and produce typed inputs for the store. They
//! never look at stored state, so uniqueness and referential checks happen
//! later, under the store lock.
//!
//! A missing body (`null`) is treated as an empty object.

use serde_json::{Map, Value, json};

use crate::{Email, NewUser, OrderStatus, StatusError, UserId, UserPatch};

/// Fields a user payload may carry.
pub const USER_FIELDS: [&str; 3] = ["name", "email", "age"];

/// Inclusive upper bound for `age`.
pub const MAX_AGE: u64 = 120;

const NAME_RULE: &str = "Name must be a string with at least 2 characters.";
const EMAIL_RULE: &str = "Email must be a valid email address.";
const AGE_RULE: &str = "Age must be an integer between 0 and 120.";

/// A payload that failed validation.
///
/// `message` is a short summary for clients; `details` carries per-field
/// messages or the list of rejected keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Option<Value>,
}

impl ValidationError {
    /// A failure with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// A failure carrying structured details.
    #[must_use]
    pub fn with_details(message: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            details: Some(details),
        }
    }
}

/// A validated order creation request.
///
/// The status is kept raw so the caller can report a missing user before an
/// unknown status, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub user_id: UserId,
    /// `None` means the default status.
    pub status: Option<String>,
}

impl OrderRequest {
    /// Resolve the requested status, defaulting to `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] when the status names no [`OrderStatus`].
    pub fn status(&self) -> Result<OrderStatus, StatusError> {
        self.status
            .as_deref()
            .map_or(Ok(OrderStatus::default()), str::parse)
    }
}

/// Validate a user creation payload: `name` and `email` required, `age` optional.
///
/// # Errors
///
/// Returns [`ValidationError`] for unknown fields or any field rule failure.
pub fn validate_new_user(payload: &Value) -> Result<NewUser, ValidationError> {
    let fields = user_fields(payload)?;
    let mut errors = Map::new();

    let name = check_name(fields.get("name"), &mut errors);
    let email = check_email(fields.get("email"), &mut errors);
    let age = fields
        .get("age")
        .and_then(|value| check_age(value, &mut errors));

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(NewUser { name, email, age }),
        _ => Err(ValidationError::with_details(
            "Validation failed.",
            Value::Object(errors),
        )),
    }
}

/// Validate a partial user update: every field optional, present fields checked.
///
/// # Errors
///
/// Returns [`ValidationError`] for unknown fields or any field rule failure.
pub fn validate_user_patch(payload: &Value) -> Result<UserPatch, ValidationError> {
    let fields = user_fields(payload)?;
    let mut errors = Map::new();

    let patch = UserPatch {
        name: fields
            .get("name")
            .and_then(|value| check_name(Some(value), &mut errors)),
        email: fields
            .get("email")
            .and_then(|value| check_email(Some(value), &mut errors)),
        age: fields
            .get("age")
            .and_then(|value| check_age(value, &mut errors)),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationError::with_details(
            "Validation failed.",
            Value::Object(errors),
        ))
    }
}

/// Validate an order creation payload.
///
/// `userId` must be a JSON integer greater than zero, where an integral float
/// such as `1.0` counts; numeric strings are rejected. A falsy `status`
/// (absent, `null`, `""`, `0` or `false`) means the default.
///
/// # Errors
///
/// Returns [`ValidationError`] when `userId` is missing or not a positive integer.
pub fn validate_new_order(payload: &Value) -> Result<OrderRequest, ValidationError> {
    let user_id = payload
        .get("userId")
        .and_then(as_integer)
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| ValidationError::new("userId must be a positive integer."))?;

    let status = match payload.get("status") {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(OrderRequest {
        user_id: UserId::new(user_id),
        status,
    })
}

/// Validate a status transition payload: `{status}` naming an [`OrderStatus`].
///
/// # Errors
///
/// Returns [`StatusError`] when `status` is missing, not a string, or unknown.
pub fn validate_status_change(payload: &Value) -> Result<OrderStatus, StatusError> {
    match payload.get("status") {
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(StatusError {
            input: other.to_string(),
        }),
        None => Err(StatusError {
            input: String::new(),
        }),
    }
}

/// Parse a path id the way a loosely-typed client would send it.
///
/// Accepts surrounding whitespace and integral decimal forms such as `3.0`;
/// rejects zero, negatives, fractions and non-numbers.
///
/// # Errors
///
/// Returns [`ValidationError`] naming `entity` when the id is not a positive integer.
#[allow(clippy::cast_possible_truncation)] // float is integral and within i32 range
pub fn parse_positive_id(raw: &str, entity: &str) -> Result<i32, ValidationError> {
    let invalid = || ValidationError::new(format!("Invalid {entity} id. Must be a positive integer."));
    let trimmed = raw.trim();

    let id = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX))
            .map(|n| n as i64)
    });

    id.filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(invalid)
}

/// Reject non-objects and unknown keys, returning the object's fields.
fn user_fields(payload: &Value) -> Result<Map<String, Value>, ValidationError> {
    let fields = match payload {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        _ => return Err(ValidationError::new("Payload must be a JSON object.")),
    };

    let unknown: Vec<&String> = fields
        .keys()
        .filter(|key| !USER_FIELDS.contains(&key.as_str()))
        .collect();

    if !unknown.is_empty() {
        return Err(ValidationError::with_details(
            "Payload contains unknown fields.",
            json!({ "unknownFields": unknown, "allowedFields": USER_FIELDS }),
        ));
    }

    Ok(fields)
}

fn check_name(value: Option<&Value>, errors: &mut Map<String, Value>) -> Option<String> {
    let name = value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| name.chars().count() >= 2);

    if name.is_none() {
        errors.insert("name".to_owned(), Value::from(NAME_RULE));
    }
    name.map(str::to_owned)
}

fn check_email(value: Option<&Value>, errors: &mut Map<String, Value>) -> Option<Email> {
    let email = value
        .and_then(Value::as_str)
        .and_then(|raw| Email::parse(raw).ok());

    if email.is_none() {
        errors.insert("email".to_owned(), Value::from(EMAIL_RULE));
    }
    email
}

fn check_age(value: &Value, errors: &mut Map<String, Value>) -> Option<u8> {
    let age = as_integer(value)
        .and_then(|age| u64::try_from(age).ok())
        .filter(|age| *age <= MAX_AGE)
        .and_then(|age| u8::try_from(age).ok());

    if age.is_none() {
        errors.insert("age".to_owned(), Value::from(AGE_RULE));
    }
    age
}

/// A JSON number holding a whole value, whether written `3` or `3.0`.
#[allow(clippy::cast_possible_truncation)] // float is integral and within i32 range
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX))
            .map(|n| n as i64)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_create_payload() {
        let user = validate_new_user(&json!({"name": " Alice ", "email": "a@b.com", "age": 25}))
            .unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email.as_str(), "a@b.com");
        assert_eq!(user.age, Some(25));
    }

    #[test]
    fn test_create_requires_name_and_email() {
        let err = validate_new_user(&json!({"name": "", "email": "bad"})).unwrap_err();
        assert_eq!(err.message, "Validation failed.");
        let details = err.details.unwrap();
        assert_eq!(details["name"], NAME_RULE);
        assert_eq!(details["email"], EMAIL_RULE);
    }

    #[test]
    fn test_padded_email_rejected() {
        for email in [" a@b.com ", "a@b.com\n"] {
            let err = validate_new_user(&json!({"name": "Alice", "email": email})).unwrap_err();
            assert_eq!(err.message, "Validation failed.");
            assert_eq!(err.details.unwrap()["email"], EMAIL_RULE);
        }

        let err = validate_user_patch(&json!({"email": " a@b.com"})).unwrap_err();
        assert_eq!(err.details.unwrap()["email"], EMAIL_RULE);
    }

    #[test]
    fn test_integral_floats_count_as_integers() {
        let user =
            validate_new_user(&json!({"name": "Alice", "email": "a@b.com", "age": 30.0})).unwrap();
        assert_eq!(user.age, Some(30));
        assert_eq!(validate_user_patch(&json!({"age": 0.0})).unwrap().age, Some(0));

        let err = validate_user_patch(&json!({"age": 30.5})).unwrap_err();
        assert_eq!(err.details.unwrap()["age"], AGE_RULE);
        let err = validate_user_patch(&json!({"age": 120.0001})).unwrap_err();
        assert_eq!(err.details.unwrap()["age"], AGE_RULE);

        let request = validate_new_order(&json!({"userId": 1.0})).unwrap();
        assert_eq!(request.user_id, UserId::new(1));
        assert!(validate_new_order(&json!({"userId": 0.0})).is_err());
    }

    #[test]
    fn test_missing_body_on_create_fails_both_required_fields() {
        let err = validate_new_user(&Value::Null).unwrap_err();
        let details = err.details.unwrap();
        assert!(details.get("name").is_some());
        assert!(details.get("email").is_some());
    }

    #[test]
    fn test_patch_with_invalid_age() {
        let err = validate_user_patch(&json!({"age": 200})).unwrap_err();
        assert_eq!(err.details.unwrap()["age"], AGE_RULE);

        let err = validate_user_patch(&json!({"age": -1})).unwrap_err();
        assert_eq!(err.details.unwrap()["age"], AGE_RULE);

        let err = validate_user_patch(&json!({"age": null})).unwrap_err();
        assert_eq!(err.details.unwrap()["age"], AGE_RULE);
    }

    #[test]
    fn test_patch_accepts_boundaries_and_empty() {
        assert_eq!(validate_user_patch(&json!({"age": 0})).unwrap().age, Some(0));
        assert_eq!(
            validate_user_patch(&json!({"age": 120})).unwrap().age,
            Some(120)
        );
        assert!(validate_user_patch(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = validate_user_patch(&json!({"foo": "bar"})).unwrap_err();
        assert_eq!(err.message, "Payload contains unknown fields.");
        let details = err.details.unwrap();
        assert_eq!(details["unknownFields"], json!(["foo"]));
        assert_eq!(details["allowedFields"], json!(["name", "email", "age"]));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = validate_new_user(&json!(["name"])).unwrap_err();
        assert_eq!(err.message, "Payload must be a JSON object.");
    }

    #[test]
    fn test_order_payload_user_id_rules() {
        assert!(validate_new_order(&Value::Null).is_err());
        assert!(validate_new_order(&json!({"userId": "1"})).is_err());
        assert!(validate_new_order(&json!({"userId": 0})).is_err());
        assert!(validate_new_order(&json!({"userId": 1.5})).is_err());

        let request = validate_new_order(&json!({"userId": 3})).unwrap();
        assert_eq!(request.user_id, UserId::new(3));
        assert_eq!(request.status().unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_payload_status_defaults_and_errors() {
        let empty = validate_new_order(&json!({"userId": 1, "status": ""})).unwrap();
        assert_eq!(empty.status().unwrap(), OrderStatus::Pending);

        let confirmed = validate_new_order(&json!({"userId": 1, "status": "CONFIRMED"})).unwrap();
        assert_eq!(confirmed.status().unwrap(), OrderStatus::Confirmed);

        let unknown = validate_new_order(&json!({"userId": 1, "status": "UNKNOWN"})).unwrap();
        assert!(unknown.status().is_err());

        let numeric = validate_new_order(&json!({"userId": 1, "status": 5})).unwrap();
        assert!(numeric.status().is_err());

        for falsy in [json!(0), json!(0.0), json!(false), Value::Null] {
            let request = validate_new_order(&json!({"userId": 1, "status": falsy})).unwrap();
            assert_eq!(request.status().unwrap(), OrderStatus::Pending, "{falsy}");
        }
        let truthy = validate_new_order(&json!({"userId": 1, "status": true})).unwrap();
        assert!(truthy.status().is_err());
    }

    #[test]
    fn test_status_change_payload() {
        assert_eq!(
            validate_status_change(&json!({"status": "SHIPPED"})).unwrap(),
            OrderStatus::Shipped
        );
        assert!(validate_status_change(&json!({"status": "NOT_A_STATUS"})).is_err());
        assert!(validate_status_change(&json!({"status": 1})).is_err());
        assert!(validate_status_change(&json!({})).is_err());
    }

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("1", "user").unwrap(), 1);
        assert_eq!(parse_positive_id("3", "user").unwrap(), 3);
        assert_eq!(parse_positive_id(" 7 ", "user").unwrap(), 7);
        assert_eq!(parse_positive_id("4.0", "order").unwrap(), 4);

        for raw in ["0", "-1", "abc", "", "1.5", "99999999999"] {
            assert!(parse_positive_id(raw, "user").is_err(), "{raw}");
        }

        let err = parse_positive_id("abc", "order").unwrap_err();
        assert_eq!(err.message, "Invalid order id. Must be a positive integer.");
    }
}
