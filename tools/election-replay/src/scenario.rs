//! Scenario files and the reports written for them.
//!
//! Identities are plain labels (`"owner"`, `"voter1"`); the ledger maps each
//! label to a deterministic key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub authority: String,
    pub candidates: Vec<String>,
    /// Lamports.
    pub registration_fee: u64,
    /// Starting lamport balances; unlisted identities start at zero.
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Register { caller: String, amount: u64 },
    Vote { caller: String, candidate: String },
    Close { caller: String },
}

impl Step {
    pub fn caller(&self) -> &str {
        match self {
            Step::Register { caller, .. } | Step::Vote { caller, .. } | Step::Close { caller } => {
                caller
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum LoggedEvent {
    VoterRegistered { voter: String },
    VoteSubmitted { candidate: String, voter: String },
    Closed { amount: u64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    #[serde(flatten)]
    pub step: Step,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tally {
    pub candidate: String,
    pub votes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub authority: String,
    pub registration_fee: u64,
    pub closed: bool,
    pub escrow: u64,
    pub registered_voters: u64,
    pub votes_cast: u64,
    pub tally: Vec<Tally>,
    pub balances: BTreeMap<String, u64>,
    pub events: Vec<LoggedEvent>,
    pub steps: Vec<StepReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scenario_with_defaults() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "authority": "owner",
                "candidates": ["alice", "bob"],
                "registration_fee": 1000,
                "steps": [
                    {"op": "register", "caller": "v1", "amount": 1000},
                    {"op": "vote", "caller": "v1", "candidate": "alice"},
                    {"op": "close", "caller": "owner"}
                ]
            }"#,
        )
        .unwrap();

        assert!(scenario.balances.is_empty());
        assert_eq!(scenario.candidates, vec!["alice", "bob"]);
        assert_eq!(
            scenario.steps[1],
            Step::Vote {
                caller: "v1".into(),
                candidate: "alice".into()
            }
        );
        assert_eq!(scenario.steps[2].caller(), "owner");
    }

    #[test]
    fn rejects_unknown_op() {
        let err = serde_json::from_str::<Step>(r#"{"op": "delegate", "caller": "v1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn step_report_is_flat() {
        let report = StepReport {
            index: 0,
            step: Step::Close {
                caller: "owner".into(),
            },
            outcome: Outcome::Rejected {
                reason: "Unauthorized".into(),
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["op"], "close");
        assert_eq!(value["caller"], "owner");
        assert_eq!(value["outcome"]["status"], "rejected");
        assert_eq!(value["outcome"]["reason"], "Unauthorized");
    }

    const THREE_VOTERS: &str = include_str!("../../../demos/scenarios/three-voters.json");
    const DOUBLE_REGISTRATION: &str =
        include_str!("../../../demos/scenarios/double-registration.json");

    fn rejected(reason: &str) -> Outcome {
        Outcome::Rejected {
            reason: reason.into(),
        }
    }

    #[test]
    fn three_voters_demo_replays() {
        let scenario: Scenario = serde_json::from_str(THREE_VOTERS).unwrap();
        let report = crate::ledger::Ledger::replay(&scenario, false).unwrap();

        let tally: Vec<(&str, u64)> = report
            .tally
            .iter()
            .map(|t| (t.candidate.as_str(), t.votes))
            .collect();
        assert_eq!(tally, vec![("candidate1", 2), ("candidate2", 1)]);
        assert!(report.closed);
        assert_eq!(report.escrow, 0);
        assert_eq!(report.balances["owner"], 3 * scenario.registration_fee);
        assert_eq!(report.steps[6].outcome, rejected("Unauthorized"));
        assert_eq!(report.steps[7].outcome, Outcome::Accepted);
        assert_eq!(report.steps[8].outcome, rejected("AlreadyClosed"));
    }

    #[test]
    fn double_registration_demo_replays() {
        let scenario: Scenario = serde_json::from_str(DOUBLE_REGISTRATION).unwrap();
        let report = crate::ledger::Ledger::replay(&scenario, false).unwrap();

        let outcomes: Vec<Outcome> = report.steps.iter().map(|s| s.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Accepted,
                rejected("AlreadyRegistered"),
                rejected("InsufficientFee"),
            ]
        );
        assert_eq!(report.escrow, scenario.registration_fee);
        assert_eq!(report.registered_voters, 1);
    }
}
