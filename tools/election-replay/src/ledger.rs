//! In-memory host for the election state machine.
//!
//! Plays the part the Solana runtime plays on chain: it resolves caller
//! identities, holds lamport balances, moves value for registration and
//! closing, and records emitted events. Each step runs against a staged copy
//! of the election and is committed only if the value transfer also succeeds.

use std::collections::{BTreeMap, HashMap};

use anchor_lang::error::Error as ProgramError;
use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::hash::hash;
use election_registry::{Election, Voter};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::scenario::{LoggedEvent, Outcome, Report, Scenario, Step, StepReport, Tally};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{}", reason(.0))]
    Rejected(ProgramError),

    #[error("insufficient funds: {label} holds {balance} lamports, needs {needed}")]
    InsufficientFunds {
        label: String,
        balance: u64,
        needed: u64,
    },

    #[error("balance of {0} overflowed")]
    BalanceOverflow(String),
}

impl From<ProgramError> for HostError {
    fn from(err: ProgramError) -> Self {
        HostError::Rejected(err)
    }
}

/// Short, stable name of a program error (`AlreadyVoted`, ...).
pub fn reason(err: &ProgramError) -> String {
    match err {
        ProgramError::AnchorError(e) => e.error_name.clone(),
        ProgramError::ProgramError(e) => e.program_error.to_string(),
    }
}

/// Deterministic key for a scenario label.
pub fn key_for(label: &str) -> Pubkey {
    Pubkey::new_from_array(hash(label.as_bytes()).to_bytes())
}

pub struct Ledger {
    authority: Pubkey,
    election: Election,
    records: HashMap<Pubkey, Voter>,
    balances: HashMap<Pubkey, u64>,
    labels: HashMap<Pubkey, String>,
    events: Vec<LoggedEvent>,
}

impl Ledger {
    /// Create the election as `scenario.authority` and fund the listed identities.
    pub fn open(scenario: &Scenario) -> Result<Self, HostError> {
        let mut labels = HashMap::new();
        let mut label = |name: &str| {
            let key = key_for(name);
            labels.insert(key, name.to_owned());
            key
        };

        let authority = label(&scenario.authority);
        let candidates: Vec<Pubkey> = scenario.candidates.iter().map(|c| label(c)).collect();
        let balances = scenario
            .balances
            .iter()
            .map(|(name, lamports)| (label(name), *lamports))
            .collect();

        let election = Election::new(authority, &candidates, scenario.registration_fee, 0)?;
        info!(
            candidates = %scenario.candidates.join(","),
            fee = scenario.registration_fee,
            "election opened by {}",
            scenario.authority
        );

        Ok(Self {
            authority,
            election,
            records: HashMap::new(),
            balances,
            labels,
            events: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn election(&self) -> &Election {
        &self.election
    }

    #[cfg(test)]
    pub fn balance_of(&self, label: &str) -> u64 {
        self.balances.get(&key_for(label)).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn apply(&mut self, step: &Step) -> Result<(), HostError> {
        let caller = self.learn(step.caller());
        let mut staged = self.election.clone();

        match step {
            Step::Register { amount, .. } => {
                let mut record = self.records.get(&caller).cloned().unwrap_or_default();
                let event = staged.register_voter(caller, &mut record, *amount)?;
                self.debit(&caller, *amount)?;
                self.records.insert(caller, record);
                self.events.push(LoggedEvent::VoterRegistered {
                    voter: self.label_of(&event.voter),
                });
            }
            Step::Vote { candidate, .. } => {
                let candidate = key_for(candidate);
                let mut record = self.records.get(&caller).cloned();
                let event = staged.vote(record.as_mut(), &candidate)?;
                if let Some(record) = record {
                    self.records.insert(caller, record);
                }
                self.events.push(LoggedEvent::VoteSubmitted {
                    candidate: self.label_of(&event.candidate),
                    voter: self.label_of(&event.voter),
                });
            }
            Step::Close { .. } => {
                let event = staged.close(&caller)?;
                let authority = self.authority;
                self.credit(&authority, event.amount)?;
                self.events.push(LoggedEvent::Closed {
                    amount: event.amount,
                });
            }
        }

        self.election = staged;
        Ok(())
    }

    /// Play every step, recording rejections instead of stopping unless
    /// `fail_fast` is set.
    pub fn replay(scenario: &Scenario, fail_fast: bool) -> Result<Report, HostError> {
        let mut ledger = Self::open(scenario)?;
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for (index, step) in scenario.steps.iter().enumerate() {
            let outcome = match ledger.apply(step) {
                Ok(()) => {
                    debug!(index, ?step, "accepted");
                    Outcome::Accepted
                }
                Err(err) if fail_fast => return Err(err),
                Err(err) => {
                    warn!(index, ?step, %err, "rejected");
                    Outcome::Rejected {
                        reason: match &err {
                            HostError::Rejected(e) => reason(e),
                            other => other.to_string(),
                        },
                    }
                }
            };
            steps.push(StepReport {
                index,
                step: step.clone(),
                outcome,
            });
        }

        Ok(ledger.into_report(steps))
    }

    fn into_report(self, steps: Vec<StepReport>) -> Report {
        let tally = self
            .election
            .candidates
            .iter()
            .map(|c| Tally {
                candidate: self.label_of(&c.key),
                votes: c.votes,
            })
            .collect();
        let balances: BTreeMap<String, u64> = self
            .balances
            .iter()
            .map(|(key, lamports)| (self.label_of(key), *lamports))
            .collect();

        Report {
            authority: self.label_of(&self.authority),
            registration_fee: self.election.registration_fee(),
            closed: self.election.is_closed(),
            escrow: self.election.escrow,
            registered_voters: self.election.registered_voters,
            votes_cast: self.election.votes_cast,
            tally,
            balances,
            events: self.events,
            steps,
        }
    }

    fn learn(&mut self, label: &str) -> Pubkey {
        let key = key_for(label);
        self.labels.entry(key).or_insert_with(|| label.to_owned());
        key
    }

    fn label_of(&self, key: &Pubkey) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn debit(&mut self, key: &Pubkey, lamports: u64) -> Result<(), HostError> {
        let balance = self.balances.get(key).copied().unwrap_or(0);
        let remaining = balance
            .checked_sub(lamports)
            .ok_or_else(|| HostError::InsufficientFunds {
                label: self.label_of(key),
                balance,
                needed: lamports,
            })?;
        self.balances.insert(*key, remaining);
        Ok(())
    }

    fn credit(&mut self, key: &Pubkey, lamports: u64) -> Result<(), HostError> {
        let balance = self.balances.get(key).copied().unwrap_or(0);
        let credited = balance
            .checked_add(lamports)
            .ok_or_else(|| HostError::BalanceOverflow(self.label_of(key)))?;
        self.balances.insert(*key, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = 1_000_000_000;

    fn scenario(steps: Vec<Step>) -> Scenario {
        Scenario {
            authority: "owner".into(),
            candidates: vec!["candidate1".into(), "candidate2".into()],
            registration_fee: SOL,
            balances: ["voter1", "voter2", "voter3"]
                .into_iter()
                .map(|v| (v.to_owned(), 5 * SOL))
                .collect(),
            steps,
        }
    }

    fn register(caller: &str, amount: u64) -> Step {
        Step::Register {
            caller: caller.into(),
            amount,
        }
    }

    fn vote(caller: &str, candidate: &str) -> Step {
        Step::Vote {
            caller: caller.into(),
            candidate: candidate.into(),
        }
    }

    fn close(caller: &str) -> Step {
        Step::Close {
            caller: caller.into(),
        }
    }

    fn rejected(reason: &str) -> Outcome {
        Outcome::Rejected {
            reason: reason.into(),
        }
    }

    #[test]
    fn full_election_pays_the_owner() {
        let mut ledger = Ledger::open(&scenario(vec![])).unwrap();
        for step in [
            register("voter1", SOL),
            vote("voter1", "candidate1"),
            register("voter2", SOL),
            vote("voter2", "candidate1"),
            register("voter3", SOL),
            vote("voter3", "candidate2"),
        ] {
            ledger.apply(&step).unwrap();
        }

        let election = ledger.election();
        assert_eq!(election.vote_count_for(&key_for("candidate1")), 2);
        assert_eq!(election.vote_count_for(&key_for("candidate2")), 1);
        assert_eq!(election.escrow, 3 * SOL);
        assert_eq!(ledger.balance_of("voter1"), 4 * SOL);

        ledger.apply(&close("owner")).unwrap();
        assert_eq!(ledger.election().escrow, 0);
        assert!(ledger.election().is_closed());
        assert_eq!(ledger.balance_of("owner"), 3 * SOL);
        assert_eq!(
            ledger.events().last(),
            Some(&LoggedEvent::Closed { amount: 3 * SOL })
        );
    }

    #[test]
    fn duplicate_registration_keeps_single_fee() {
        let report = Ledger::replay(
            &scenario(vec![register("voter1", SOL), register("voter1", SOL)]),
            false,
        )
        .unwrap();

        assert_eq!(report.steps[0].outcome, Outcome::Accepted);
        assert_eq!(report.steps[1].outcome, rejected("AlreadyRegistered"));
        assert_eq!(report.escrow, SOL);
        assert_eq!(report.balances["voter1"], 4 * SOL);
        assert_eq!(
            report.events,
            vec![LoggedEvent::VoterRegistered {
                voter: "voter1".into()
            }]
        );
    }

    #[test]
    fn rejections_are_reported_by_name() {
        let report = Ledger::replay(
            &scenario(vec![
                vote("voter1", "candidate1"),
                register("voter1", SOL / 2),
                register("voter1", SOL),
                vote("voter1", "voter2"),
                vote("voter1", "candidate2"),
                vote("voter1", "candidate2"),
                close("voter1"),
                close("owner"),
                close("owner"),
                register("voter2", SOL),
                vote("voter1", "candidate1"),
            ]),
            false,
        )
        .unwrap();

        let outcomes: Vec<Outcome> = report.steps.iter().map(|s| s.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                rejected("VoterNotRegistered"),
                rejected("InsufficientFee"),
                Outcome::Accepted,
                rejected("CandidateNotRegistered"),
                Outcome::Accepted,
                rejected("AlreadyVoted"),
                rejected("Unauthorized"),
                Outcome::Accepted,
                rejected("AlreadyClosed"),
                rejected("AlreadyClosed"),
                rejected("AlreadyClosed"),
            ]
        );
        assert_eq!(report.votes_cast, 1);
        assert!(report.closed);
        assert_eq!(report.balances["owner"], SOL);
    }

    #[test]
    fn unfunded_caller_leaves_election_untouched() {
        let mut ledger = Ledger::open(&scenario(vec![])).unwrap();
        let before = ledger.election().clone();
        let err = ledger.apply(&register("pauper", SOL)).unwrap_err();
        assert!(matches!(err, HostError::InsufficientFunds { needed, .. } if needed == SOL));
        assert_eq!(ledger.election(), &before);
        // never registered, so cannot vote
        let err = ledger.apply(&vote("pauper", "candidate1")).unwrap_err();
        assert_eq!(err.to_string(), "VoterNotRegistered");
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn fail_fast_stops_at_first_rejection() {
        let err = Ledger::replay(
            &scenario(vec![register("voter1", SOL), close("voter1")]),
            true,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn duplicate_candidates_refuse_to_open() {
        let mut s = scenario(vec![]);
        s.candidates.push("candidate1".into());
        let err = Ledger::open(&s).err().unwrap();
        assert_eq!(err.to_string(), "DuplicateCandidate");
    }

    #[test]
    fn report_lists_tally_in_candidate_order() {
        let report = Ledger::replay(
            &scenario(vec![register("voter1", 2 * SOL), vote("voter1", "candidate2")]),
            false,
        )
        .unwrap();
        let tally: Vec<(&str, u64)> = report
            .tally
            .iter()
            .map(|t| (t.candidate.as_str(), t.votes))
            .collect();
        assert_eq!(tally, vec![("candidate1", 0), ("candidate2", 1)]);
        // overpayment stays in escrow
        assert_eq!(report.escrow, 2 * SOL);
        assert_eq!(report.registered_voters, 1);
    }
}
