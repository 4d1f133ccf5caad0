use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one school in the NEIS directory: the education office that
/// supervises it plus the school's own code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleIdentity {
    /// Education office code (`ATPT_OFCDC_SC_CODE`), e.g. `R10`.
    pub edu_code: String,
    /// School code (`SD_SCHUL_CODE`), e.g. `8791090`.
    pub school_code: String,
}

impl LocaleIdentity {
    pub fn new(edu_code: impl Into<String>, school_code: impl Into<String>) -> Self {
        Self {
            edu_code: edu_code.into(),
            school_code: school_code.into(),
        }
    }
}

impl fmt::Display for LocaleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.edu_code, self.school_code)
    }
}

/// Meal slot of a school day. NEIS encodes it as a single digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MealSlot {
    #[serde(rename = "breakfast", alias = "1")]
    Breakfast,
    #[default]
    #[serde(rename = "lunch", alias = "2")]
    Lunch,
    #[serde(rename = "dinner", alias = "3")]
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Request code (`MMEAL_SC_CODE`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Breakfast => "1",
            Self::Lunch => "2",
            Self::Dinner => "3",
        }
    }

    /// Name NEIS uses in `MMEAL_SC_NM`.
    pub fn korean_name(&self) -> &'static str {
        match self {
            Self::Breakfast => "조식",
            Self::Lunch => "중식",
            Self::Dinner => "석식",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.code() == code)
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown meal slot: {0} (expected breakfast, lunch, dinner or 1-3)")]
pub struct ParseMealSlotError(pub String);

impl FromStr for MealSlot {
    type Err = ParseMealSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(slot) = Self::from_code(trimmed) {
            return Ok(slot);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            _ => Self::ALL
                .into_iter()
                .find(|slot| slot.korean_name() == trimmed)
                .ok_or_else(|| ParseMealSlotError(s.to_string())),
        }
    }
}
