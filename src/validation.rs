use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ApiError;
use crate::models::{Friend, FriendPayload, FriendUpdate};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("regex compiles"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("regex compiles")
});

const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=50;

/// Strips anything that looks like an HTML tag and trims the result.
pub fn sanitize_value(value: &str) -> String {
    TAG_RE.replace_all(value, "").trim().to_string()
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn validation_error(msg: &str) -> ApiError {
    ApiError::Validation(msg.to_string())
}

/// Sanitizes a field that was sent, treating `null` as an empty string.
fn sanitize_field(value: Option<&str>) -> String {
    sanitize_value(value.unwrap_or_default())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if NAME_LEN.contains(&name.chars().count()) {
        Ok(())
    } else {
        Err(validation_error("Name must be between 2 and 50 characters."))
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(validation_error("Invalid email format."))
    }
}

/// Sanitizes, validates and formats a creation payload.
///
/// Duplicate ids are left to the repository.
pub fn validate_new_friend(payload: FriendPayload) -> Result<Friend, ApiError> {
    let FriendPayload {
        id: Some(id),
        name: Some(name),
        email: Some(email),
        status: Some(status),
    } = payload
    else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };

    let id = id
        .as_i64()
        .ok_or_else(|| validation_error("ID must be an integer."))?;

    let name = sanitize_field(name.as_deref());
    let email = sanitize_field(email.as_deref()).to_lowercase();
    let status = sanitize_field(status.as_deref());

    validate_name(&name)?;
    validate_email(&email)?;

    Ok(Friend {
        id,
        name: title_case(&name),
        email,
        status: capitalize(&status),
    })
}

/// Same pipeline as [`validate_new_friend`] for the fields that are present.
/// The id of an existing friend cannot change, so any `id` is ignored.
pub fn validate_friend_update(payload: FriendPayload) -> Result<FriendUpdate, ApiError> {
    let name = payload.name.map(|n| sanitize_field(n.as_deref()));
    let email = payload
        .email
        .map(|e| sanitize_field(e.as_deref()).to_lowercase());
    let status = payload.status.map(|s| sanitize_field(s.as_deref()));

    if let Some(name) = &name {
        validate_name(name)?;
    }
    if let Some(email) = &email {
        validate_email(email)?;
    }

    Ok(FriendUpdate {
        name: name.as_deref().map(title_case),
        email,
        status: status.as_deref().map(capitalize),
    })
}
