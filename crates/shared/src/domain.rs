use serde::{Deserialize, Serialize};

/// Assembly bill identifier as issued by the upstream API (e.g. `PRC_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillId(pub String);

impl BillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    ProposalDate,
    ProcDate,
    VoteCount,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// The four user-settable list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Month,
    Search,
    PassGubn,
    ProcStage,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Month,
        FilterField::Search,
        FilterField::PassGubn,
        FilterField::ProcStage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Month => "month",
            FilterField::Search => "search",
            FilterField::PassGubn => "pass_gubn",
            FilterField::ProcStage => "proc_stage",
        }
    }
}

/// Outcome categories of a roll-call vote. The upstream API labels these in
/// Korean on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteOutcome {
    #[serde(rename = "찬성")]
    For,
    #[serde(rename = "반대")]
    Against,
    #[serde(rename = "기권")]
    Abstain,
    #[serde(rename = "불참")]
    Absent,
}

impl VoteOutcome {
    pub const ALL: [VoteOutcome; 4] = [
        VoteOutcome::For,
        VoteOutcome::Against,
        VoteOutcome::Abstain,
        VoteOutcome::Absent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VoteOutcome::For => "찬성",
            VoteOutcome::Against => "반대",
            VoteOutcome::Abstain => "기권",
            VoteOutcome::Absent => "불참",
        }
    }
}

/// Aggregated roll-call counts attached to a bill row. Flattened into the
/// list and detail payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub vote_for: u32,
    #[serde(default)]
    pub vote_against: u32,
    #[serde(default)]
    pub vote_abstain: u32,
    #[serde(default)]
    pub vote_absent: u32,
    #[serde(default)]
    pub member_count: u32,
}

impl VoteTally {
    pub fn has_votes(&self) -> bool {
        self.vote_count > 0
    }

    pub fn count(&self, outcome: VoteOutcome) -> u32 {
        match outcome {
            VoteOutcome::For => self.vote_for,
            VoteOutcome::Against => self.vote_against,
            VoteOutcome::Abstain => self.vote_abstain,
            VoteOutcome::Absent => self.vote_absent,
        }
    }

    /// Total ballots across all four outcome categories.
    pub fn ballots_cast(&self) -> u32 {
        self.vote_for + self.vote_against + self.vote_abstain + self.vote_absent
    }

    /// Percentage share of one outcome, 0.0 when no ballots were cast.
    pub fn share(&self, outcome: VoteOutcome) -> f64 {
        let total = self.ballots_cast();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.count(outcome)) / f64::from(total) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_shares_sum_to_one_hundred() {
        let tally = VoteTally {
            vote_count: 10,
            vote_for: 5,
            vote_against: 3,
            vote_abstain: 1,
            vote_absent: 1,
            member_count: 10,
        };
        assert_eq!(tally.ballots_cast(), 10);
        assert!((tally.share(VoteOutcome::For) - 50.0).abs() < f64::EPSILON);
        let total: f64 = VoteOutcome::ALL.iter().map(|o| tally.share(*o)).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tally_has_zero_shares() {
        let tally = VoteTally::default();
        assert!(!tally.has_votes());
        for outcome in VoteOutcome::ALL {
            assert_eq!(tally.share(outcome), 0.0);
        }
    }

    #[test]
    fn vote_outcome_uses_korean_wire_labels() {
        let json = serde_json::to_string(&VoteOutcome::Against).unwrap();
        assert_eq!(json, "\"반대\"");
        let back: VoteOutcome = serde_json::from_str("\"기권\"").unwrap();
        assert_eq!(back, VoteOutcome::Abstain);
    }
}
