//! Request URL construction for the NEIS hub.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use gupsik_core::{LocaleIdentity, MealSlot, NeisConfig};
use url::Url;

use crate::error::NeisError;
use crate::types::MealDate;

pub const MEAL_ENDPOINT: &str = "mealServiceDietInfo";
pub const SCHOOL_ENDPOINT: &str = "schoolInfo";

/// The service caps a page at 100 rows; later rows are dropped upstream.
pub const PAGE_INDEX: u32 = 1;
pub const PAGE_SIZE: u32 = 100;

/// Source of "today" for queries that name no date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Builds fully encoded NEIS request URLs from an explicit configuration.
#[derive(Clone)]
pub struct QueryBuilder {
    config: NeisConfig,
    clock: Arc<dyn Clock>,
}

impl QueryBuilder {
    pub fn new(config: NeisConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: NeisConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &NeisConfig {
        &self.config
    }

    /// Meal query for one slot of one day.
    ///
    /// A missing date means today (per the clock); a missing slot means the
    /// configured default. Locale codes are not validated; a bad code comes
    /// back as a remote-reported failure.
    pub fn build_meal_query(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
        slot: Option<MealSlot>,
    ) -> Result<Url, NeisError> {
        let slot = slot.unwrap_or(self.config.default_meal_slot);
        self.meal_url(locale, date, Some(slot))
    }

    /// Meal query for every slot served on one day.
    pub fn build_daily_meal_query(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
    ) -> Result<Url, NeisError> {
        self.meal_url(locale, date, None)
    }

    /// School lookup by free-text name.
    pub fn build_school_search_query(&self, name: &str) -> Result<Url, NeisError> {
        let url = format!(
            "{}&SCHUL_NM={}",
            self.base_query(SCHOOL_ENDPOINT),
            urlencoding::encode(name),
        );
        Ok(Url::parse(&url)?)
    }

    fn meal_url(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
        slot: Option<MealSlot>,
    ) -> Result<Url, NeisError> {
        let date = match date {
            Some(d) => d.clone(),
            None => MealDate::from_naive(self.clock.today()),
        };

        let mut url = format!(
            "{}&ATPT_OFCDC_SC_CODE={}&SD_SCHUL_CODE={}&MLSV_YMD={}",
            self.base_query(MEAL_ENDPOINT),
            urlencoding::encode(&locale.edu_code),
            urlencoding::encode(&locale.school_code),
            date,
        );

        if let Some(slot) = slot {
            url.push_str(&format!("&MMEAL_SC_CODE={}", slot.code()));
        }

        Ok(Url::parse(&url)?)
    }

    fn base_query(&self, endpoint: &str) -> String {
        format!(
            "{}/{}?KEY={}&Type=json&pIndex={}&pSize={}",
            self.config.base_url.trim_end_matches('/'),
            endpoint,
            urlencoding::encode(&self.config.api_key),
            PAGE_INDEX,
            PAGE_SIZE,
        )
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("base_url", &self.config.base_url)
            .field("default_meal_slot", &self.config.default_meal_slot)
            .finish_non_exhaustive()
    }
}
