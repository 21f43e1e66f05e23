use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::BillId,
    protocol::{
        ApiEnvelope, BillDetail, BillListQuery, BillListResponse, DashboardStats, MonthOption,
        MonthsResponse, PassGubnOption, PassGubnOptionsResponse, ProcStageOption,
        ProcStageOptionsResponse,
    },
};
use tracing::warn;

pub mod controller;
pub mod error;
pub mod query_state;
pub mod stats;

pub use controller::{BillQueryController, ControllerEvent, ControllerPhase, SEARCH_DEBOUNCE};
pub use error::QueryError;
pub use query_state::{ActiveFilter, QueryState, PER_PAGE};

/// Fetches one page of the filtered bill list.
#[async_trait]
pub trait BillQueryClient: Send + Sync {
    async fn fetch_bills(&self, query: &BillListQuery) -> Result<BillListResponse, QueryError>;
}

/// Fetches the full record for one bill, vote breakdowns included.
#[async_trait]
pub trait BillDetailClient: Send + Sync {
    async fn fetch_bill(&self, bill_id: &BillId) -> Result<BillDetail, QueryError>;
}

/// The three label/count option feeds that populate the filter controls.
#[async_trait]
pub trait FilterOptionsProvider: Send + Sync {
    async fn months(&self) -> Result<Vec<MonthOption>, QueryError>;
    async fn pass_gubn_options(&self) -> Result<Vec<PassGubnOption>, QueryError>;
    async fn proc_stage_options(&self) -> Result<Vec<ProcStageOption>, QueryError>;
}

#[async_trait]
pub trait DashboardStatsClient: Send + Sync {
    async fn fetch_stats(&self) -> Result<DashboardStats, QueryError>;
}

/// Reqwest-backed implementation of every collaborator trait, speaking the
/// dashboard backend's JSON API.
pub struct HttpBillApi {
    http: Client,
    base_url: String,
}

impl HttpBillApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, QueryError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        decode(response).await
    }
}

/// Decodes a response body that is either the payload or `{ "error": ... }`.
/// Error envelopes arrive with both 2xx and 5xx statuses, so the body is
/// inspected before the status code.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, QueryError> {
    let status = response.status();
    let body = response.bytes().await?;
    match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
        Ok(ApiEnvelope::Failure { error }) => Err(QueryError::Api(error)),
        Ok(ApiEnvelope::Success(value)) => Ok(value),
        Err(err) if status.is_success() => Err(QueryError::Decode(err)),
        Err(_) => Err(QueryError::Api(format!("unexpected HTTP status {status}"))),
    }
}

#[async_trait]
impl BillQueryClient for HttpBillApi {
    async fn fetch_bills(&self, query: &BillListQuery) -> Result<BillListResponse, QueryError> {
        let response = self
            .http
            .get(format!("{}/api/bills", self.base_url))
            .query(query)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl BillDetailClient for HttpBillApi {
    async fn fetch_bill(&self, bill_id: &BillId) -> Result<BillDetail, QueryError> {
        self.get_json(&format!("/api/bills/{bill_id}")).await
    }
}

#[async_trait]
impl FilterOptionsProvider for HttpBillApi {
    async fn months(&self) -> Result<Vec<MonthOption>, QueryError> {
        let response: MonthsResponse = self.get_json("/api/months").await?;
        Ok(response.months)
    }

    async fn pass_gubn_options(&self) -> Result<Vec<PassGubnOption>, QueryError> {
        let response: PassGubnOptionsResponse = self.get_json("/api/pass_gubn_options").await?;
        Ok(response.options)
    }

    async fn proc_stage_options(&self) -> Result<Vec<ProcStageOption>, QueryError> {
        let response: ProcStageOptionsResponse = self.get_json("/api/proc_stage_options").await?;
        Ok(response.options)
    }
}

#[async_trait]
impl DashboardStatsClient for HttpBillApi {
    async fn fetch_stats(&self) -> Result<DashboardStats, QueryError> {
        self.get_json("/api/stats").await
    }
}

/// Everything loaded once at startup to populate the filter controls and
/// the summary strip.
#[derive(Debug, Default)]
pub struct DashboardBootstrap {
    pub stats: Option<DashboardStats>,
    pub months: Vec<MonthOption>,
    pub pass_gubn_options: Vec<PassGubnOption>,
    pub proc_stage_options: Vec<ProcStageOption>,
}

/// Loads stats and the three option feeds. Each feed failing is non-fatal:
/// the dashboard still works with empty dropdowns, so failures are logged
/// and replaced with empty defaults.
pub async fn load_bootstrap(
    options: &dyn FilterOptionsProvider,
    stats_client: &dyn DashboardStatsClient,
) -> DashboardBootstrap {
    let stats = match stats_client.fetch_stats().await {
        Ok(stats) => Some(stats),
        Err(err) => {
            warn!(%err, "failed to load dashboard stats");
            None
        }
    };
    let months = options.months().await.unwrap_or_else(|err| {
        warn!(%err, "failed to load month options");
        Vec::new()
    });
    let pass_gubn_options = options.pass_gubn_options().await.unwrap_or_else(|err| {
        warn!(%err, "failed to load pass_gubn options");
        Vec::new()
    });
    let proc_stage_options = match options.proc_stage_options().await {
        Ok(options) => stats::order_proc_stage_options(options),
        Err(err) => {
            warn!(%err, "failed to load proc_stage options");
            Vec::new()
        }
    };
    DashboardBootstrap {
        stats,
        months,
        pass_gubn_options,
        proc_stage_options,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
