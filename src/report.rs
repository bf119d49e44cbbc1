// src/report.rs
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::harvest::{HarvestUser, TimeReportEntry};
use crate::slack::SlackMember;

/// Daily allowance every employee starts from before reported hours are
/// subtracted, independent of their weekly capacity.
const DAILY_CAPACITY_HOURS: f64 = 8.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

// --- Configuration ---

/// Thresholds and opt-outs for the eligibility filter. Built once from the
/// environment in `main` and passed in explicitly; the report pipeline
/// itself never reads ambient state.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub emails_whitelist: Vec<String>,
    pub missing_hours_threshold: f64,
    pub missing_hours_daily_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            emails_whitelist: Vec::new(),
            missing_hours_threshold: 1.0,
            missing_hours_daily_threshold: 1.0,
        }
    }
}

impl ReportConfig {
    /// Parses the comma-separated `EMAILS_WHITELIST` value: entries are
    /// trimmed and lower-cased so the case-normalization applied to employee
    /// emails cannot defeat an explicit opt-out. Empty entries are dropped.
    pub fn parse_whitelist(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

/// Which sufficiency rule the eligibility filter applies: the single-day
/// modes compare against the daily allowance, the weekly mode against the
/// weekly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Daily,
    WeekStart,
    Weekly,
}

// --- Employee Record ---

/// Unified per-employee record, keyed by Harvest user id, merging Harvest
/// identity/capacity data with the Slack directory match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub email: String,
    pub full_name: String,
    pub is_contractor: bool,
    pub is_active: bool,
    pub weekly_capacity: f64,
    pub missing_hours: f64,
    pub missing_hours_daily: f64,
    pub total_hours: f64,
    pub slack_id: String,
}

impl EmployeeRecord {
    fn from_harvest(user: &HarvestUser) -> Self {
        // Harvest reports capacity in seconds per week.
        let weekly_capacity = user.weekly_capacity / SECONDS_PER_HOUR;
        Self {
            email: user.email.clone(),
            // Joined with a single space even when either part is empty.
            full_name: format!("{} {}", user.first_name, user.last_name),
            is_contractor: user.is_contractor,
            is_active: user.is_active,
            weekly_capacity,
            missing_hours: weekly_capacity,
            missing_hours_daily: DAILY_CAPACITY_HOURS,
            total_hours: 0.0,
            slack_id: String::new(),
        }
    }
}

// --- User Directory Merger ---

/// Builds the base employee mapping from the two roster snapshots.
///
/// Harvest users are keyed by id; if Harvest ever hands back duplicate ids,
/// the last record for an id wins. Slack ids are attached by case-insensitive
/// email match in a second pass, which also lower-cases the stored email
/// exactly once. Report entries match by id, never by email, so nothing
/// upstream depends on the raw casing.
pub fn build_employee_map(
    harvest_users: &[HarvestUser],
    slack_members: &[SlackMember],
) -> HashMap<u64, EmployeeRecord> {
    let slack_index = build_slack_index(slack_members);

    let mut users: HashMap<u64, EmployeeRecord> = HashMap::new();
    for user in harvest_users {
        users.insert(user.id, EmployeeRecord::from_harvest(user));
    }

    for record in users.values_mut() {
        record.email = record.email.to_lowercase();
        record.slack_id = slack_index
            .get(&record.email)
            .cloned()
            .unwrap_or_default();
    }

    debug!(
        "Merged {} Harvest users against {} Slack members",
        users.len(),
        slack_members.len()
    );
    users
}

/// Indexes the Slack roster by lower-cased profile email. The first member
/// seen for an email wins; members without a profile email (bots, some guest
/// accounts) cannot be keyed and are skipped.
fn build_slack_index(members: &[SlackMember]) -> HashMap<String, String> {
    let mut index: HashMap<String, String> = HashMap::new();
    for member in members {
        let Some(email) = member.profile.email.as_deref() else {
            continue;
        };
        index
            .entry(email.to_lowercase())
            .or_insert_with(|| member.id.clone());
    }
    index
}

// --- Time Aggregator ---

/// Folds the period's report entries into the base mapping and returns the
/// aggregated mapping. Multiple entries for the same user accumulate; both
/// missing-hours counters only ever decrease, and folding order cannot
/// affect the final totals.
///
/// An entry whose user id is not in the mapping is a precondition violation:
/// callers must fetch the time report and the users list from the same
/// Harvest account in the same run.
pub fn fold_time_reports(
    mut users: HashMap<u64, EmployeeRecord>,
    entries: &[TimeReportEntry],
) -> HashMap<u64, EmployeeRecord> {
    for entry in entries {
        let record = users
            .get_mut(&entry.user_id)
            .expect("time report entry references a user id missing from the users list");
        record.total_hours += entry.total_hours;
        record.missing_hours -= entry.total_hours;
        record.missing_hours_daily -= entry.total_hours;
    }
    users
}

// --- Report pipeline ---

pub struct Report {
    config: ReportConfig,
}

impl Report {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Runs merge -> fold -> filter over the fetched snapshots and returns
    /// the records that should be notified.
    pub fn generate(
        &self,
        harvest_users: &[HarvestUser],
        slack_members: &[SlackMember],
        entries: &[TimeReportEntry],
        mode: ReportMode,
    ) -> Vec<EmployeeRecord> {
        let base = build_employee_map(harvest_users, slack_members);
        let folded = fold_time_reports(base, entries);
        self.notifiable_users(&folded, mode)
    }

    // --- Eligibility Filter ---

    /// Applies the exclusion chain and returns the surviving records in
    /// mapping-iteration order. Callers must not rely on the ordering.
    pub fn notifiable_users(
        &self,
        users: &HashMap<u64, EmployeeRecord>,
        mode: ReportMode,
    ) -> Vec<EmployeeRecord> {
        let notifiable: Vec<EmployeeRecord> = users
            .values()
            .filter(|user| !self.excluded(user, mode))
            .cloned()
            .collect();
        info!(
            "Eligibility filter kept {} of {} users",
            notifiable.len(),
            users.len()
        );
        notifiable
    }

    fn excluded(&self, user: &EmployeeRecord, mode: ReportMode) -> bool {
        if self.not_notifiable(user) {
            return true;
        }
        match mode {
            ReportMode::Daily | ReportMode::WeekStart => {
                full_time_daily_reported(user, self.config.missing_hours_daily_threshold)
            }
            ReportMode::Weekly => full_time_reported(user, self.config.missing_hours_threshold),
        }
    }

    fn not_notifiable(&self, user: &EmployeeRecord) -> bool {
        inactive(user) || contractor(user) || without_weekly_capacity(user) || self.whitelisted(user)
    }

    fn whitelisted(&self, user: &EmployeeRecord) -> bool {
        self.config
            .emails_whitelist
            .iter()
            .any(|email| email == &user.email)
    }
}

// --- Exclusion predicates ---

fn inactive(user: &EmployeeRecord) -> bool {
    !user.is_active
}

fn contractor(user: &EmployeeRecord) -> bool {
    user.is_contractor
}

fn without_weekly_capacity(user: &EmployeeRecord) -> bool {
    user.weekly_capacity == 0.0
}

fn time_reported(user: &EmployeeRecord) -> bool {
    user.total_hours > 0.0
}

/// Thresholds are inclusive upper bounds: someone 0.5h short of a full day
/// still counts as fully reported under the default 1.0h threshold.
fn full_time_daily_reported(user: &EmployeeRecord, threshold: f64) -> bool {
    time_reported(user) && user.missing_hours_daily <= threshold
}

fn full_time_reported(user: &EmployeeRecord, threshold: f64) -> bool {
    time_reported(user) && user.missing_hours <= threshold
}
