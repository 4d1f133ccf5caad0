//! NEIS open API client.
//!
//! One GET per call. Nothing is retried and no timeout is set beyond
//! whatever the transport applies.

use gupsik_core::{LocaleIdentity, MealSlot, NeisConfig, NetworkError, ReqwestErrorExt};
use tracing::instrument;
use url::Url;

use crate::error::NeisError;
use crate::normalize::{try_normalize_meal_response, try_normalize_school_search_response};
use crate::query::QueryBuilder;
use crate::types::{MealDate, MealRecord, Outcome, SchoolRecord};

const USER_AGENT: &str = concat!("gupsik/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct NeisClient {
    client: reqwest::Client,
    queries: QueryBuilder,
}

impl NeisClient {
    pub fn new(config: NeisConfig) -> Result<Self, NeisError> {
        Self::with_queries(QueryBuilder::new(config))
    }

    /// Use a prepared query builder (e.g. one with a fixed clock).
    pub fn with_queries(queries: QueryBuilder) -> Result<Self, NeisError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NeisError::Transport(e.into_network_error()))?;

        Ok(Self { client, queries })
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    /// Meals for one slot of one day.
    pub async fn fetch_meals(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
        slot: Option<MealSlot>,
    ) -> Outcome<MealRecord> {
        self.try_fetch_meals(locale, date, slot).await.into()
    }

    #[instrument(skip(self, locale), fields(locale = %locale), level = "info")]
    pub async fn try_fetch_meals(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
        slot: Option<MealSlot>,
    ) -> Result<Vec<MealRecord>, NeisError> {
        let url = self.queries.build_meal_query(locale, date, slot)?;
        let body = self.get_body(url).await?;
        log_result(try_normalize_meal_response(&body))
    }

    /// Meals for every slot served on one day.
    pub async fn fetch_daily_meals(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
    ) -> Outcome<MealRecord> {
        self.try_fetch_daily_meals(locale, date).await.into()
    }

    #[instrument(skip(self, locale), fields(locale = %locale), level = "info")]
    pub async fn try_fetch_daily_meals(
        &self,
        locale: &LocaleIdentity,
        date: Option<&MealDate>,
    ) -> Result<Vec<MealRecord>, NeisError> {
        let url = self.queries.build_daily_meal_query(locale, date)?;
        let body = self.get_body(url).await?;
        log_result(try_normalize_meal_response(&body))
    }

    /// Schools whose name matches `name`.
    pub async fn search_schools(&self, name: &str) -> Outcome<SchoolRecord> {
        self.try_search_schools(name).await.into()
    }

    #[instrument(skip(self), level = "info")]
    pub async fn try_search_schools(&self, name: &str) -> Result<Vec<SchoolRecord>, NeisError> {
        let url = self.queries.build_school_search_query(name)?;
        let body = self.get_body(url).await?;
        log_result(try_normalize_school_search_response(&body))
    }

    /// Send the request and read the body as text.
    ///
    /// The status code is not checked: NEIS can put a `RESULT` object in a
    /// non-2xx body, and the normalizer decides what the body means. Only a
    /// failed send or an unreadable body is a transport error.
    async fn get_body(&self, url: Url) -> Result<String, NeisError> {
        // The query string carries the API key; log the path only.
        tracing::debug!("GET {}", url.path());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("NEIS responded with status {}", status);
        }

        response.text().await.map_err(|e| {
            let err = match e.into_network_error() {
                NetworkError::ConnectionFailed(msg) | NetworkError::InvalidResponse(msg) => {
                    NetworkError::ServerError {
                        status: status.as_u16(),
                        message: msg,
                    }
                }
                other => other,
            };
            transport_error(err)
        })
    }
}

fn transport_error(err: NetworkError) -> NeisError {
    tracing::warn!("NEIS request failed: {} ({})", err, err.user_message());
    NeisError::Transport(err)
}

fn log_result<T>(result: Result<Vec<T>, NeisError>) -> Result<Vec<T>, NeisError> {
    match &result {
        Ok(records) => tracing::info!("NEIS returned {} rows", records.len()),
        Err(e) => tracing::info!("NEIS call failed: {}", e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TRANSPORT_ERROR_MESSAGE;
    use crate::query::FixedClock;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> NeisClient {
        let config = NeisConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            default_edu_code: "R10".to_string(),
            default_school_code: "8791090".to_string(),
            default_meal_slot: MealSlot::Lunch,
        };
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        NeisClient::with_queries(QueryBuilder::with_clock(config, Arc::new(clock))).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_meals_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/mealServiceDietInfo"))
            .and(query_param("KEY", "test-key"))
            .and(query_param("MLSV_YMD", "20240304"))
            .and(query_param("MMEAL_SC_CODE", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mealServiceDietInfo": [
                    {"head": [{"list_total_count": 1}]},
                    {"row": [{
                        "MLSV_YMD": "20240304",
                        "MMEAL_SC_NM": "중식",
                        "DDISH_NM": "현미밥<br/>된장국(5.6)",
                        "CAL_INFO": "640.2 Kcal"
                    }]}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let outcome = client
            .fetch_meals(&LocaleIdentity::new("R10", "8791090"), None, None)
            .await;

        let meals = outcome.into_result().unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].dish_names, "현미밥<br/>된장국(5.6)");
    }

    #[tokio::test]
    async fn test_fetch_daily_meals_omits_slot() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/mealServiceDietInfo"))
            .and(query_param_is_missing("MMEAL_SC_CODE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mealServiceDietInfo": [
                    {"head": []},
                    {"row": [
                        {"MLSV_YMD": "20240304", "MMEAL_SC_NM": "조식", "DDISH_NM": "죽"},
                        {"MLSV_YMD": "20240304", "MMEAL_SC_NM": "중식", "DDISH_NM": "밥"},
                        {"MLSV_YMD": "20240304", "MMEAL_SC_NM": "석식", "DDISH_NM": "면"}
                    ]}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let meals = client
            .fetch_daily_meals(&LocaleIdentity::new("R10", "8791090"), None)
            .await
            .into_result()
            .unwrap();

        assert_eq!(meals.len(), 3);
    }

    #[tokio::test]
    async fn test_remote_error_in_non_2xx_body_passes_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/mealServiceDietInfo"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "RESULT": {"CODE": "ERROR-300", "MESSAGE": "필수 값이 누락되어 있습니다."}
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client
            .try_fetch_meals(&LocaleIdentity::new("R10", ""), None, None)
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.remote_code(), Some("ERROR-300"));
        assert_eq!(err.outcome_message(), "필수 값이 누락되어 있습니다.");
    }

    #[tokio::test]
    async fn test_non_2xx_with_unreadable_body_is_transport_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/schoolInfo"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let outcome = client.search_schools("한빛중").await;

        assert_eq!(outcome, Outcome::Failure(TRANSPORT_ERROR_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        // Nothing listens on the discard port.
        let client = test_client("http://127.0.0.1:9");

        let result = client.try_search_schools("한빛중").await;

        assert!(matches!(result, Err(NeisError::Transport(_))));
    }

    #[tokio::test]
    async fn test_search_schools_sends_encoded_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/schoolInfo"))
            .and(query_param("SCHUL_NM", "한빛중"))
            .and(query_param("Type", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "schoolInfo": [
                    {"head": []},
                    {"row": [{"ATPT_OFCDC_SC_CODE": "B10", "SD_SCHUL_CODE": "7130165", "SCHUL_NM": "한빛중학교"}]}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let schools = client.search_schools("한빛중").await.into_result().unwrap();

        assert_eq!(schools[0].school_name, "한빛중학교");
        assert_eq!(schools[0].locale(), LocaleIdentity::new("B10", "7130165"));
    }
}
