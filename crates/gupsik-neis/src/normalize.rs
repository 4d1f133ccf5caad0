//! Turns a raw NEIS response body into an [`Outcome`].
//!
//! Checks run in a fixed order:
//! 1. body is not JSON -> transport/parse failure
//! 2. top-level `RESULT.CODE` is not `INFO-000` -> failure carrying `RESULT.MESSAGE`
//! 3. data container absent -> "no data"
//! 4. otherwise the body element's `row` list
//!
//! A container is `[header, body]`. That shape is the service's contract, so
//! a container that breaks it fails loudly instead of yielding an empty list.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::NeisError;
use crate::types::{MealRecord, Outcome, SchoolRecord};

pub const SUCCESS_CODE: &str = "INFO-000";
pub const MEAL_CONTAINER: &str = "mealServiceDietInfo";
pub const SCHOOL_CONTAINER: &str = "schoolInfo";

const BODY_INDEX: usize = 1;

pub fn normalize_meal_response(raw: &str) -> Outcome<MealRecord> {
    try_normalize_meal_response(raw).into()
}

pub fn try_normalize_meal_response(raw: &str) -> Result<Vec<MealRecord>, NeisError> {
    try_normalize(raw, MEAL_CONTAINER)
}

pub fn normalize_school_search_response(raw: &str) -> Outcome<SchoolRecord> {
    try_normalize_school_search_response(raw).into()
}

pub fn try_normalize_school_search_response(raw: &str) -> Result<Vec<SchoolRecord>, NeisError> {
    try_normalize(raw, SCHOOL_CONTAINER)
}

/// Normalize any NEIS envelope whose rows deserialize into `T`.
pub fn try_normalize<T: DeserializeOwned>(
    raw: &str,
    container: &'static str,
) -> Result<Vec<T>, NeisError> {
    let payload: Value = serde_json::from_str(raw)?;
    if payload.is_null() {
        return Err(NeisError::MalformedEnvelope("payload is null".to_string()));
    }

    check_result_status(&payload)?;

    let envelope = match payload.get(container) {
        Some(v) if !v.is_null() => v,
        _ => return Err(NeisError::MissingContainer(container)),
    };

    extract_rows(envelope, container).map_err(|e| {
        tracing::warn!("NEIS broke the {} envelope contract: {}", container, e);
        e
    })
}

fn check_result_status(payload: &Value) -> Result<(), NeisError> {
    let status = match payload.get("RESULT") {
        None | Some(Value::Null) => return Ok(()),
        Some(status) => status,
    };

    let code = status.get("CODE").and_then(Value::as_str).unwrap_or_default();
    if code == SUCCESS_CODE {
        return Ok(());
    }

    let message = status
        .get("MESSAGE")
        .and_then(Value::as_str)
        .unwrap_or_default();

    tracing::debug!("NEIS reported {}: {}", code, message);
    Err(NeisError::Remote {
        code: code.to_string(),
        message: message.to_string(),
    })
}

fn extract_rows<T: DeserializeOwned>(
    envelope: &Value,
    container: &str,
) -> Result<Vec<T>, NeisError> {
    let body = envelope.get(BODY_INDEX).ok_or_else(|| {
        NeisError::MalformedEnvelope(format!("{} has no body element", container))
    })?;

    let rows = body
        .get("row")
        .ok_or_else(|| NeisError::MalformedEnvelope(format!("{} body has no row list", container)))?;

    Vec::<T>::deserialize(rows)
        .map_err(|e| NeisError::MalformedEnvelope(format!("{} rows: {}", container, e)))
}
