use chrono::NaiveDate;
use gupsik_core::LocaleIdentity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::NeisError;

/// Service date in the `YYYYMMDD` form NEIS expects.
///
/// Only the shape is checked: exactly 8 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MealDate(String);

impl MealDate {
    pub fn parse(s: &str) -> Result<Self, NeisError> {
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(NeisError::InvalidDate(s.to_string()))
        }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MealDate {
    type Err = NeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MealDate {
    type Error = NeisError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MealDate> for String {
    fn from(date: MealDate) -> Self {
        date.0
    }
}

impl From<NaiveDate> for MealDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive(date)
    }
}

impl fmt::Display for MealDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `mealServiceDietInfo` row, kept exactly as the service sent it.
///
/// `dish_names` still carries the `<br/>` separators and the `(1.5.6)`
/// allergy markers; stripping them is the renderer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(rename = "MLSV_YMD")]
    pub service_date: String,

    #[serde(rename = "MMEAL_SC_NM")]
    pub slot_name: String,

    #[serde(rename = "DDISH_NM")]
    pub dish_names: String,

    #[serde(rename = "CAL_INFO", default, skip_serializing_if = "Option::is_none")]
    pub calorie_info: Option<String>,

    #[serde(rename = "ORPLC_INFO", default, skip_serializing_if = "Option::is_none")]
    pub origin_info: Option<String>,

    #[serde(rename = "NTR_INFO", default, skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<String>,

    #[serde(rename = "MMEAL_SC_CODE", default, skip_serializing_if = "Option::is_none")]
    pub slot_code: Option<String>,

    #[serde(rename = "ATPT_OFCDC_SC_CODE", default, skip_serializing_if = "Option::is_none")]
    pub edu_code: Option<String>,

    #[serde(rename = "ATPT_OFCDC_SC_NM", default, skip_serializing_if = "Option::is_none")]
    pub edu_name: Option<String>,

    #[serde(rename = "SD_SCHUL_CODE", default, skip_serializing_if = "Option::is_none")]
    pub school_code: Option<String>,

    #[serde(rename = "SCHUL_NM", default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,

    /// Head count served; NEIS sends it as a number, so it stays untyped.
    #[serde(rename = "MLSV_FGR", default, skip_serializing_if = "Option::is_none")]
    pub head_count: Option<Value>,

    /// Columns without a field above (`MLSV_FROM_YMD`, `LOAD_DTM`, ...), passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `schoolInfo` row from a school-name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(rename = "ATPT_OFCDC_SC_CODE")]
    pub edu_code: String,

    #[serde(rename = "SD_SCHUL_CODE")]
    pub school_code: String,

    #[serde(rename = "SCHUL_NM")]
    pub school_name: String,

    #[serde(rename = "ATPT_OFCDC_SC_NM", default, skip_serializing_if = "Option::is_none")]
    pub edu_name: Option<String>,

    #[serde(rename = "ENG_SCHUL_NM", default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,

    /// 초등학교, 중학교, 고등학교, ...
    #[serde(rename = "SCHUL_KND_SC_NM", default, skip_serializing_if = "Option::is_none")]
    pub school_kind: Option<String>,

    #[serde(rename = "LCTN_SC_NM", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(rename = "ORG_RDNMA", default, skip_serializing_if = "Option::is_none")]
    pub road_address: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchoolRecord {
    pub fn locale(&self) -> LocaleIdentity {
        LocaleIdentity::new(&self.edu_code, &self.school_code)
    }
}

/// Uniform result of one NEIS call.
///
/// There is no partial success: the payload is accepted or rejected whole.
/// A `Failure` cannot tell "no meals today" from "bad school code"; the
/// service reports both the same way, so only the message differs.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(Vec<T>),
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn records(&self) -> Option<&[T]> {
        match self {
            Self::Success(records) => Some(records),
            Self::Failure(_) => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<Vec<T>, String> {
        match self {
            Self::Success(records) => Ok(records),
            Self::Failure(message) => Err(message),
        }
    }
}

impl<T> From<Result<Vec<T>, NeisError>> for Outcome<T> {
    fn from(result: Result<Vec<T>, NeisError>) -> Self {
        match result {
            Ok(records) => Self::Success(records),
            Err(e) => Self::Failure(e.outcome_message()),
        }
    }
}

impl<T> From<NeisError> for Outcome<T> {
    fn from(err: NeisError) -> Self {
        Self::Failure(err.outcome_message())
    }
}
