//! Turning JSON password requests into JSON responses.
//!
//! This is transport-agnostic: a caller hands over the request method and body, and gets back a
//! status, headers, and a body to send.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::entropy::EntropySource;
use crate::password_generation::generate_password_checked;
use crate::requirements::{ClassRequirement, Requirements};
use crate::{GenerateError, Secret};

/// A request for one password.
///
/// All eight requirement fields must be present. Flags may be JSON booleans or the integers 0
/// and 1.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    /// Whole numbers outside the `i64` range saturate, so they are rejected as an invalid length.
    #[serde(deserialize_with = "saturating_length")]
    pub length: i64,
    pub requirements: WireRequirements,
}

#[derive(Debug, Deserialize)]
pub struct WireRequirements {
    #[serde(rename = "HAS_UPPER", alias = "has_upper", deserialize_with = "flag")]
    pub has_upper: bool,
    #[serde(rename = "HAS_LOWER", alias = "has_lower", deserialize_with = "flag")]
    pub has_lower: bool,
    #[serde(rename = "HAS_NUMBER", alias = "has_number", deserialize_with = "flag")]
    pub has_number: bool,
    #[serde(rename = "HAS_SYMBOL", alias = "has_symbol", deserialize_with = "flag")]
    pub has_symbol: bool,
    #[serde(rename = "MIN_UPPER", alias = "min_upper")]
    pub min_upper: usize,
    #[serde(rename = "MIN_LOWER", alias = "min_lower")]
    pub min_lower: usize,
    #[serde(rename = "MIN_NUMBER", alias = "min_number")]
    pub min_number: usize,
    #[serde(rename = "MIN_SYMBOL", alias = "min_symbol")]
    pub min_symbol: usize,
}

impl From<&WireRequirements> for Requirements {
    fn from(wire: &WireRequirements) -> Requirements {
        let class = |include, minimum| ClassRequirement { include, minimum };
        Requirements {
            upper: class(wire.has_upper, wire.min_upper),
            lower: class(wire.has_lower, wire.min_lower),
            digit: class(wire.has_number, wire.min_number),
            symbol: class(wire.has_symbol, wire.min_symbol),
        }
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

struct FlagVisitor;

impl<'de> serde::de::Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean, or the integer 0 or 1")
    }

    fn visit_bool<E>(self, v: bool) -> Result<bool, E>
    where
        E: serde::de::Error,
    {
        Ok(v)
    }

    fn visit_u64<E>(self, v: u64) -> Result<bool, E>
    where
        E: serde::de::Error,
    {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(serde::de::Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E>(self, v: i64) -> Result<bool, E>
    where
        E: serde::de::Error,
    {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(serde::de::Unexpected::Signed(v), &self)),
        }
    }
}

fn saturating_length<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LengthVisitor)
}

struct LengthVisitor;

impl<'de> serde::de::Visitor<'de> for LengthVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer length")
    }

    fn visit_i64<E>(self, v: i64) -> Result<i64, E>
    where
        E: serde::de::Error,
    {
        Ok(v)
    }

    fn visit_u64<E>(self, v: u64) -> Result<i64, E>
    where
        E: serde::de::Error,
    {
        Ok(i64::try_from(v).unwrap_or(i64::MAX))
    }

    fn visit_f64<E>(self, v: f64) -> Result<i64, E>
    where
        E: serde::de::Error,
    {
        if v.is_finite() && v.fract() == 0.0 {
            // `as` saturates at the i64 bounds.
            Ok(v as i64)
        } else {
            Err(E::invalid_value(serde::de::Unexpected::Float(v), &self))
        }
    }
}

/// Response status, as an HTTP status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,
    BadRequest,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    fn json(status: Status, body: serde_json::Value) -> Response {
        Response {
            status,
            headers: vec![
                ("Content-Type", "application/json".to_owned()),
                ("Cache-Control", "no-store".to_owned()),
            ],
            body: body.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("method {0} is not allowed; use POST")]
    MethodNotAllowed(String),
    #[error("invalid request: {0}")]
    InvalidInput(#[source] serde_json::Error),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl RequestError {
    pub fn status(&self) -> Status {
        match self {
            RequestError::MethodNotAllowed(_) => Status::MethodNotAllowed,
            RequestError::InvalidInput(_) => Status::BadRequest,
            RequestError::Generate(err) => match err {
                GenerateError::InvalidLength { .. }
                | GenerateError::RequirementsExceedLength { .. }
                | GenerateError::EmptyCharset => Status::BadRequest,
                GenerateError::InvalidCharset(_)
                | GenerateError::EntropyUnavailable(_)
                | GenerateError::GenerationFailed(_) => Status::InternalServerError,
            },
        }
    }
}

/// Decode a request body.
pub fn parse_request(body: &[u8]) -> Result<PasswordRequest, RequestError> {
    serde_json::from_slice(body).map_err(RequestError::InvalidInput)
}

/// Run one request through the generator, without building a response.
pub fn process_request<E>(source: &mut E, method: &str, body: &[u8]) -> Result<Secret, RequestError>
where
    E: EntropySource + ?Sized,
{
    if method != "POST" {
        return Err(RequestError::MethodNotAllowed(method.to_owned()));
    }
    let request = parse_request(body)?;
    let requirements = Requirements::from(&request.requirements);
    Ok(generate_password_checked(
        source,
        request.length,
        &requirements,
    )?)
}

/// Handle one request, mapping every outcome onto a status and a JSON body.
///
/// Success bodies look like `{"password": "..."}`, failures like `{"error": "..."}`.
pub fn handle_request<E>(source: &mut E, method: &str, body: &[u8]) -> Response
where
    E: EntropySource + ?Sized,
{
    match process_request(source, method, body) {
        Ok(password) => {
            log::info!("generated a {}-character password", password.len());
            Response::json(
                Status::Ok,
                serde_json::json!({ "password": password.as_str() }),
            )
        }
        Err(err) => {
            let status = err.status();
            if status == Status::InternalServerError {
                log::error!("password request failed: {}", err);
            } else {
                log::warn!("rejected password request: {}", err);
            }
            let mut response =
                Response::json(status, serde_json::json!({ "error": err.to_string() }));
            if status == Status::MethodNotAllowed {
                response.headers.push(("Allow", "POST".to_owned()));
            }
            response
        }
    }
}
