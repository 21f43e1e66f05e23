use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{BillId, SortField, SortOrder, VoteTally};

/// Query string for `GET /api/bills`. Filters are omitted entirely when
/// unset; the server treats a missing parameter as "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_gubn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proc_stage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_id: BillId,
    pub bill_no: Option<String>,
    pub title: String,
    pub proposal_date: Option<NaiveDate>,
    pub proposer_kind: Option<String>,
    pub proposer_name: Option<String>,
    pub proc_stage_cd: Option<String>,
    pub pass_gubn: Option<String>,
    pub proc_date: Option<NaiveDate>,
    pub general_result: Option<String>,
    pub link_url: Option<String>,
    #[serde(flatten)]
    pub tally: VoteTally,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillListResponse {
    pub bills: Vec<BillSummary>,
    pub pagination: Pagination,
}

/// Per-party roll-call breakdown row in the detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyVotes {
    pub party_name: Option<String>,
    pub total: u32,
    pub vote_for: u32,
    pub vote_against: u32,
    pub vote_abstain: u32,
    pub vote_absent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberVote {
    pub member_name: Option<String>,
    pub party_name: Option<String>,
    pub district_name: Option<String>,
    pub vote_result: Option<String>,
    pub member_id: Option<String>,
    pub photo_url: Option<String>,
}

/// Member lists grouped by outcome. The upstream keys this map with the
/// Korean outcome labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberVotesByOutcome {
    #[serde(rename = "찬성", default)]
    pub favor: Vec<MemberVote>,
    #[serde(rename = "반대", default)]
    pub against: Vec<MemberVote>,
    #[serde(rename = "기권", default)]
    pub abstain: Vec<MemberVote>,
    #[serde(rename = "불참", default)]
    pub absent: Vec<MemberVote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetail {
    pub bill_id: BillId,
    pub bill_no: Option<String>,
    pub title: String,
    pub proposal_date: Option<NaiveDate>,
    pub proposer_kind: Option<String>,
    pub proposer_name: Option<String>,
    pub proc_stage_cd: Option<String>,
    pub pass_gubn: Option<String>,
    pub proc_date: Option<NaiveDate>,
    pub general_result: Option<String>,
    pub link_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub tally: VoteTally,
    #[serde(default)]
    pub party_votes: Vec<PartyVotes>,
    #[serde(default)]
    pub member_votes_by_result: MemberVotesByOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthOption {
    pub month: String,
    pub month_label: String,
    pub bill_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassGubnOption {
    pub pass_gubn: String,
    pub bill_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcStageOption {
    pub proc_stage_cd: String,
    pub bill_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthsResponse {
    pub months: Vec<MonthOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassGubnOptionsResponse {
    pub options: Vec<PassGubnOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcStageOptionsResponse {
    pub options: Vec<ProcStageOption>,
}

/// Aggregate dashboard counters from `GET /api/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bills: u64,
    pub bills_with_votes: u64,
    pub bills_without_votes: u64,
    pub total_votes: u64,
    pub pending_bills: u64,
    pub processed_bills: u64,
    pub processed_with_votes: u64,
    pub processed_no_votes: u64,
    #[serde(default)]
    pub proc_stage_stats: HashMap<String, u64>,
    #[serde(default)]
    pub pass_gubn_stats: HashMap<String, u64>,
    #[serde(default)]
    pub monthly_bills: HashMap<String, u64>,
}

/// Every endpoint either returns its payload or `{ "error": "..." }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Failure { error: String },
    Success(T),
}
