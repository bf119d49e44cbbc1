// src/harvest.rs
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

pub const HARVEST_API_BASE_URL: &str = "https://api.harvestapp.com/v2";

const PAGE_SIZE: u32 = 100;

// --- Harvest API Data Structures ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestUser {
    pub id: u64,
    pub email: String,
    pub is_contractor: bool,
    pub is_active: bool,
    /// Contracted seconds per week; the report pipeline converts to hours.
    pub weekly_capacity: f64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<HarvestUser>,
    pub next_page: Option<u32>,
}

/// One row of the team time report: total hours one user logged over the
/// requested period. Harvest may emit several rows per user for longer
/// ranges; consumers must sum them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeReportEntry {
    pub user_id: u64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeReportResponse {
    pub results: Vec<TimeReportEntry>,
    pub next_page: Option<u32>,
}

// --- Error type ---

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("Harvest API error: Status={status}, Message='{message}'")]
    ApiError { status: StatusCode, message: String },
}

// --- Client ---

#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub token: String,
    pub account_id: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct HarvestClient {
    http_client: Client,
    config: HarvestConfig,
}

impl HarvestClient {
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }

    /// Fetches the full users roster, following Harvest's page links.
    pub async fn users_list(&self) -> Result<Vec<HarvestUser>, HarvestError> {
        info!("Fetching Harvest users list...");
        let mut all_users = Vec::new();
        let mut page = 1u32;

        loop {
            debug!("Fetching Harvest users page {}", page);
            let response: UsersResponse = self
                .get(
                    "/users",
                    &[
                        ("page", page.to_string()),
                        ("per_page", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            all_users.extend(response.users);

            match response.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        info!("Fetched {} Harvest users total.", all_users.len());
        Ok(all_users)
    }

    /// Fetches the team time report for an inclusive date range. A single-day
    /// report is simply `from == to`.
    pub async fn time_report_list(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeReportEntry>, HarvestError> {
        let from_str = from.format("%Y%m%d").to_string();
        let to_str = to.format("%Y%m%d").to_string();
        info!("Fetching Harvest team time report from {} to {}...", from, to);

        let mut results = Vec::new();
        let mut page = 1u32;

        loop {
            debug!("Fetching time report page {}", page);
            let response: TimeReportResponse = self
                .get(
                    "/reports/time/team",
                    &[
                        ("from", from_str.clone()),
                        ("to", to_str.clone()),
                        ("page", page.to_string()),
                        ("per_page", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            results.extend(response.results);

            match response.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        info!("Fetched {} time report rows.", results.len());
        Ok(results)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, HarvestError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header("Harvest-Account-Id", &self.config.account_id)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            error!("Harvest API error on {}: {} - {}", url, status, message);
            return Err(HarvestError::ApiError { status, message });
        }

        Ok(response.json::<T>().await?)
    }
}
