use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown for proposals published without one.
pub const DEFAULT_PROPOSAL_TITLE: &str = "Untitled Proposal";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("proposal {key} has {options} options but {votes} vote counts")]
    MismatchedVotes {
        key: String,
        options: usize,
        votes: usize,
    },
    #[error("unknown proposal filter: {0}")]
    UnknownFilter(String),
}

/// A governance proposal as published by the upstream voting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    pub link: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub option_votes: Vec<f64>,
    #[serde(default)]
    pub index: u64,
    #[serde(default)]
    pub proposer: String,
    pub created_at: DateTime<Utc>,
    pub activated_at: DateTime<Utc>,
    pub voting_ends_at: DateTime<Utc>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub queued_at: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub proposal_type: i64,
}

impl Proposal {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => DEFAULT_PROPOSAL_TITLE,
        }
    }

    /// Status at `now`. Cancellation and queue timestamps are not consulted.
    pub fn status_at(&self, now: DateTime<Utc>) -> ProposalStatus {
        ProposalStatus::derive(now, self.activated_at, self.voting_ends_at)
    }

    /// Option labels paired with their vote counts.
    pub fn option_tally(&self) -> Result<Vec<(&str, f64)>, ModelError> {
        if self.options.len() != self.option_votes.len() {
            return Err(ModelError::MismatchedVotes {
                key: self.key.clone(),
                options: self.options.len(),
                votes: self.option_votes.len(),
            });
        }
        Ok(self
            .options
            .iter()
            .map(String::as_str)
            .zip(self.option_votes.iter().copied())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ProposalStatus {
    /// `now == activated_at` and `now == voting_ends_at` both count as ongoing.
    pub fn derive(
        now: DateTime<Utc>,
        activated_at: DateTime<Utc>,
        voting_ends_at: DateTime<Utc>,
    ) -> Self {
        if now < activated_at {
            ProposalStatus::Upcoming
        } else if now > voting_ends_at {
            ProposalStatus::Completed
        } else {
            ProposalStatus::Ongoing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Upcoming => "upcoming",
            ProposalStatus::Ongoing => "ongoing",
            ProposalStatus::Completed => "completed",
        }
    }

    /// Capitalized label for badges.
    pub fn label(&self) -> &'static str {
        match self {
            ProposalStatus::Upcoming => "Upcoming",
            ProposalStatus::Ongoing => "Ongoing",
            ProposalStatus::Completed => "Completed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ProposalStatus::Upcoming | ProposalStatus::Ongoing)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalFilter {
    #[default]
    Active,
    All,
}

impl ProposalFilter {
    pub fn matches(&self, status: ProposalStatus) -> bool {
        match self {
            ProposalFilter::Active => status.is_active(),
            ProposalFilter::All => true,
        }
    }

    /// Keep the proposals this filter admits at `now`, in input order.
    pub fn apply<'a>(
        &self,
        proposals: &'a [Proposal],
        now: DateTime<Utc>,
    ) -> Vec<(&'a Proposal, ProposalStatus)> {
        proposals
            .iter()
            .map(|p| (p, p.status_at(now)))
            .filter(|(_, status)| self.matches(*status))
            .collect()
    }
}

impl std::str::FromStr for ProposalFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProposalFilter::Active),
            "all" => Ok(ProposalFilter::All),
            other => Err(ModelError::UnknownFilter(other.to_string())),
        }
    }
}

/// Stable sort, newest `created_at` first.
pub fn sort_newest_first(proposals: &mut [Proposal]) {
    proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn proposal(key: &str, activated_at: DateTime<Utc>, voting_ends_at: DateTime<Utc>) -> Proposal {
        Proposal {
            key: key.to_string(),
            title: Some(format!("Proposal {key}")),
            link: format!("https://vote.example.org/proposal/{key}"),
            options: vec!["For".into(), "Against".into()],
            option_votes: vec![10.0, 5.0],
            index: 0,
            proposer: String::new(),
            created_at: activated_at - Duration::days(1),
            activated_at,
            voting_ends_at,
            canceled_at: None,
            queued_at: None,
            proposal_type: 0,
        }
    }

    #[test]
    fn status_examples() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        assert_eq!(
            ProposalStatus::derive(now, now + hour, now + hour * 2),
            ProposalStatus::Upcoming
        );
        assert_eq!(
            ProposalStatus::derive(now, now - hour, now + hour),
            ProposalStatus::Ongoing
        );
        assert_eq!(
            ProposalStatus::derive(now, now - hour * 2, now - hour),
            ProposalStatus::Completed
        );
    }

    #[test]
    fn status_boundaries_are_ongoing() {
        let now = Utc::now();
        assert_eq!(
            ProposalStatus::derive(now, now, now + Duration::hours(1)),
            ProposalStatus::Ongoing
        );
        assert_eq!(
            ProposalStatus::derive(now, now - Duration::hours(1), now),
            ProposalStatus::Ongoing
        );
        assert_eq!(ProposalStatus::derive(now, now, now), ProposalStatus::Ongoing);
        assert_eq!(
            ProposalStatus::derive(now, now - Duration::hours(1), now - Duration::milliseconds(1)),
            ProposalStatus::Completed
        );
    }

    #[test]
    fn canceled_proposals_keep_time_based_status() {
        let now = Utc::now();
        let mut p = proposal("a", now - Duration::hours(1), now + Duration::hours(1));
        p.canceled_at = Some(now - Duration::minutes(5));
        assert_eq!(p.status_at(now), ProposalStatus::Ongoing);
    }

    #[test]
    fn active_filter_keeps_upcoming_and_ongoing_in_order() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        let proposals = vec![
            proposal("upcoming", now + hour, now + hour * 2),
            proposal("completed", now - hour * 2, now - hour),
            proposal("ongoing", now - hour, now + hour),
        ];

        let active: Vec<&str> = ProposalFilter::Active
            .apply(&proposals, now)
            .into_iter()
            .map(|(p, _)| p.key.as_str())
            .collect();
        assert_eq!(active, vec!["upcoming", "ongoing"]);

        let all = ProposalFilter::All.apply(&proposals, now);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].1, ProposalStatus::Completed);
    }

    #[test]
    fn filter_parses_from_str() {
        assert_eq!("active".parse::<ProposalFilter>(), Ok(ProposalFilter::Active));
        assert_eq!(" ALL ".parse::<ProposalFilter>(), Ok(ProposalFilter::All));
        assert!("recent".parse::<ProposalFilter>().is_err());
    }

    #[test]
    fn sort_is_newest_first_and_stable() {
        let now = Utc::now();
        let mut a = proposal("a", now, now);
        let mut b = proposal("b", now, now);
        let mut c = proposal("c", now, now);
        a.created_at = now - Duration::days(3);
        b.created_at = now - Duration::days(1);
        c.created_at = now - Duration::days(3);
        let mut proposals = vec![a, b, c];
        sort_newest_first(&mut proposals);

        let keys: Vec<&str> = proposals.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert!(proposals
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn deserializes_upstream_payload() {
        let raw = r#"{
            "key": "5xQ",
            "title": null,
            "link": "https://vote.jup.ag/proposal/5xQ",
            "options": ["Yes", "No", "Abstain"],
            "index": 42,
            "proposer": "9aB",
            "optionVotes": [1200, 300.5, 0],
            "canceledAt": null,
            "createdAt": "2024-11-01T10:00:00.000Z",
            "activatedAt": "2024-11-02T10:00:00.000Z",
            "votingEndsAt": "2024-11-05T10:00:00.000Z",
            "queuedAt": null,
            "type": 1
        }"#;
        let p: Proposal = serde_json::from_str(raw).unwrap();
        assert_eq!(p.display_title(), DEFAULT_PROPOSAL_TITLE);
        assert_eq!(p.index, 42);
        assert_eq!(p.proposal_type, 1);
        let tally = p.option_tally().unwrap();
        assert_eq!(tally[1], ("No", 300.5));
    }

    #[test]
    fn option_tally_rejects_mismatched_lengths() {
        let now = Utc::now();
        let mut p = proposal("x", now, now);
        p.option_votes.pop();
        assert_eq!(
            p.option_tally(),
            Err(ModelError::MismatchedVotes {
                key: "x".into(),
                options: 2,
                votes: 1,
            })
        );
    }

    #[test]
    fn blank_title_uses_placeholder() {
        let now = Utc::now();
        let mut p = proposal("x", now, now);
        p.title = Some("   ".into());
        assert_eq!(p.display_title(), DEFAULT_PROPOSAL_TITLE);
    }
}
