use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use babyreveal_core::{ConfigPatch, Gender, NewVote, Predictions};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Number;
use url::Url;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::errors::ServerError;

lazy_static! {
    static ref TIME_OF_DAY: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[serde(default)]
    #[validate(custom(function = "login_password"))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoteSchema {
    #[serde(default)]
    #[validate(custom(function = "guest_name"))]
    pub name: String,
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "gender"))]
    pub choice: String,
    #[validate(custom(function = "date_or_empty"))]
    pub birth_date: Option<String>,
    #[validate(custom(function = "time_or_empty"))]
    pub birth_time: Option<String>,
    #[validate(custom(function = "grams"))]
    pub weight: Option<Number>,
    #[validate(custom(function = "centimeters"))]
    pub height: Option<Number>,
    #[validate(length(max = 50, message = "Hair color is too long"))]
    pub hair_color: Option<String>,
    #[validate(length(max = 50, message = "Eye color is too long"))]
    pub eye_color: Option<String>,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigSchema {
    #[validate(length(max = 100))]
    pub baby_name: Option<String>,
    #[validate(length(max = 200))]
    pub parent_names: Option<String>,
    #[validate(length(max = 50))]
    pub girl_icon: Option<String>,
    #[validate(length(max = 50))]
    pub boy_icon: Option<String>,
    #[validate(length(max = 20))]
    pub girl_color: Option<String>,
    #[validate(length(max = 20))]
    pub boy_color: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub birth_list_link: Option<String>,
    #[validate(custom(function = "date_or_empty"))]
    pub due_date: Option<String>,
    #[validate(custom(function = "date_or_empty"))]
    pub reveal_date: Option<String>,
    pub is_revealed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "gender"))]
    pub actual_gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "date_or_empty"))]
    pub actual_birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "time_or_empty"))]
    pub actual_birth_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "grams"))]
    pub actual_weight: Option<Option<Number>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "centimeters"))]
    pub actual_height: Option<Option<Number>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 50))]
    pub actual_hair_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 50))]
    pub actual_eye_color: Option<Option<String>>,
}

impl TryFrom<VoteSchema> for NewVote {
    type Error = ServerError;

    fn try_from(value: VoteSchema) -> Result<Self, Self::Error> {
        let choice = value
            .choice
            .parse::<Gender>()
            .map_err(|_| ServerError::MalformedBody)?;

        Ok(NewVote {
            name: value.name.trim().to_string(),
            email: provided(value.email),
            choice,
            predictions: Predictions {
                birth_date: provided(value.birth_date),
                birth_time: provided(value.birth_time),
                weight: value.weight.and_then(whole),
                height: value.height.and_then(whole),
                hair_color: provided(value.hair_color),
                eye_color: provided(value.eye_color),
            },
        })
    }
}

impl From<ConfigSchema> for ConfigPatch {
    fn from(value: ConfigSchema) -> Self {
        ConfigPatch {
            baby_name: value.baby_name,
            parent_names: value.parent_names,
            girl_icon: value.girl_icon,
            boy_icon: value.boy_icon,
            girl_color: value.girl_color,
            boy_color: value.boy_color,
            birth_list_link: value.birth_list_link,
            due_date: value.due_date,
            reveal_date: value.reveal_date,
            is_revealed: value.is_revealed,
            actual_gender: value
                .actual_gender
                .map(|gender| gender.and_then(|g| g.parse().ok())),
            actual_birth_date: value.actual_birth_date.map(provided),
            actual_birth_time: value.actual_birth_time.map(provided),
            actual_weight: value.actual_weight.map(|w| w.and_then(whole)),
            actual_height: value.actual_height.map(|h| h.and_then(whole)),
            actual_hair_color: value.actual_hair_color.map(provided),
            actual_eye_color: value.actual_eye_color.map(provided),
        }
    }
}

/// Empty strings count as not provided
fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Measurements arrive as raw JSON numbers so that bad ones are reported per field
fn whole(value: Number) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Tells a field set to `null` apart from a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn guest_name(value: &str) -> Result<(), ValidationError> {
    match value.trim().chars().count() {
        0 => Err(invalid("required", "Name is required")),
        1..=100 => Ok(()),
        _ => Err(invalid("length", "Name is too long")),
    }
}

fn login_password(value: &str) -> Result<(), ValidationError> {
    match value.chars().count() {
        0 => Err(invalid("required", "Password is required")),
        1..=128 => Ok(()),
        _ => Err(invalid("length", "Password is too long")),
    }
}

fn measurement(
    value: &Number,
    min: u64,
    max: u64,
    message: &'static str,
) -> Result<(), ValidationError> {
    match value.as_u64() {
        Some(n) if (min..=max).contains(&n) => Ok(()),
        Some(_) => Err(invalid("range", message)),
        None => Err(invalid("integer", "Must be a whole number")),
    }
}

fn grams(value: &Number) -> Result<(), ValidationError> {
    measurement(value, 500, 10000, "Weight must be between 500 and 10000 g")
}

fn centimeters(value: &Number) -> Result<(), ValidationError> {
    measurement(value, 20, 100, "Height must be between 20 and 100 cm")
}

fn gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| invalid("choice", "Choice must be \"girl\" or \"boy\""))
}

fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(invalid("email", "Invalid email"))
    }
}

fn url_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Url::parse(value).is_ok() {
        Ok(())
    } else {
        Err(invalid("url", "Invalid URL"))
    }
}

fn date_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(invalid("date", "Date must be YYYY-MM-DD"))
    }
}

fn time_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || TIME_OF_DAY.is_match(value) {
        Ok(())
    } else {
        Err(invalid("time", "Time must be HH:MM"))
    }
}

/// JSON body that has been checked against its schema before reaching the handler
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!("Rejected request body: {}", e);
            ServerError::MalformedBody
        })?;

        body.validate()?;

        Ok(Self(body))
    }
}
