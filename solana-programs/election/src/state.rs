use anchor_lang::prelude::*;

use crate::errors::ErrorCode;
use crate::events::{Closed, VoteSubmitted, VoterRegistered};

/// Upper bound on the candidate list; fixes the size of the election account.
pub const MAX_CANDIDATES: usize = 16;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct Candidate {
    pub key: Pubkey,
    pub votes: u64,
}

/// The whole election: candidate tallies, fee escrow and the closing authority.
///
/// Every transition checks all of its preconditions before touching a field,
/// so a rejected call leaves the account exactly as it was.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Election {
    pub authority: Pubkey,        // sole closer, receives escrow
    pub registration_fee: u64,    // lamports
    pub escrow: u64,              // lamports held until close
    pub registered_voters: u64,
    pub votes_cast: u64,
    pub closed: bool,
    pub bump: u8,
    #[max_len(MAX_CANDIDATES)]
    pub candidates: Vec<Candidate>,
}

/// Per-voter record, one PDA per (election, voter).
#[account]
#[derive(InitSpace, Debug, Default, PartialEq, Eq)]
pub struct Voter {
    pub election: Pubkey,
    pub voter: Pubkey,
    pub registered: bool,
    pub has_voted: bool,
    pub bump: u8,
}

impl Voter {
    pub const SEED: &'static [u8] = b"voter";

    /// Read the record at the signer's voter PDA. An address that was never
    /// initialised by this program means the signer never registered.
    ///
    /// `bump` is the canonical bump the caller derived for `info`.
    pub fn load(info: &AccountInfo, election: &Pubkey, bump: u8) -> Result<Option<Self>> {
        if info.data_is_empty() || info.owner != &crate::ID {
            return Ok(None);
        }
        let record = {
            let data = info.try_borrow_data()?;
            Voter::try_deserialize(&mut &data[..])?
        };
        require_eq!(record.bump, bump, anchor_lang::error::ErrorCode::ConstraintSeeds);
        require_keys_eq!(
            record.election,
            *election,
            anchor_lang::error::ErrorCode::ConstraintHasOne
        );
        Ok(Some(record))
    }

    pub fn store(&self, info: &AccountInfo) -> Result<()> {
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data;
        self.try_serialize(&mut writer)
    }
}

impl Election {
    pub const SEED: &'static [u8] = b"election";

    /// Seed a fresh, open election. Candidate identifiers must be distinct.
    pub fn new(
        authority: Pubkey,
        candidates: &[Pubkey],
        registration_fee: u64,
        bump: u8,
    ) -> Result<Self> {
        require!(!candidates.is_empty(), ErrorCode::NoCandidates);
        require!(
            candidates.len() <= MAX_CANDIDATES,
            ErrorCode::TooManyCandidates
        );
        for (i, key) in candidates.iter().enumerate() {
            require!(!candidates[..i].contains(key), ErrorCode::DuplicateCandidate);
        }

        Ok(Self {
            authority,
            registration_fee,
            escrow: 0,
            registered_voters: 0,
            votes_cast: 0,
            closed: false,
            bump,
            candidates: candidates
                .iter()
                .map(|&key| Candidate { key, votes: 0 })
                .collect(),
        })
    }

    /// Register `voter` against its (possibly fresh) record. The whole paid
    /// amount goes to escrow; anything above the fee is not refunded.
    pub fn register_voter(
        &mut self,
        voter: Pubkey,
        record: &mut Voter,
        paid: u64,
    ) -> Result<VoterRegistered> {
        require!(!self.closed, ErrorCode::AlreadyClosed);
        require_gte!(paid, self.registration_fee, ErrorCode::InsufficientFee);
        require!(!record.registered, ErrorCode::AlreadyRegistered);

        let escrow = self
            .escrow
            .checked_add(paid)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        let registered_voters = self
            .registered_voters
            .checked_add(1)
            .ok_or(ErrorCode::ArithmeticOverflow)?;

        self.escrow = escrow;
        self.registered_voters = registered_voters;
        record.voter = voter;
        record.registered = true;

        Ok(VoterRegistered { voter })
    }

    /// Cast the single vote of the voter owning `record`. `None` stands for an
    /// identity that never registered.
    pub fn vote(&mut self, record: Option<&mut Voter>, candidate: &Pubkey) -> Result<VoteSubmitted> {
        require!(!self.closed, ErrorCode::AlreadyClosed);
        let Some(record) = record.filter(|r| r.registered) else {
            return err!(ErrorCode::VoterNotRegistered);
        };
        let position = self
            .candidates
            .iter()
            .position(|c| c.key == *candidate)
            .ok_or(ErrorCode::CandidateNotRegistered)?;
        require!(!record.has_voted, ErrorCode::AlreadyVoted);

        let votes = self.candidates[position]
            .votes
            .checked_add(1)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        let votes_cast = self
            .votes_cast
            .checked_add(1)
            .ok_or(ErrorCode::ArithmeticOverflow)?;

        self.candidates[position].votes = votes;
        self.votes_cast = votes_cast;
        record.has_voted = true;

        Ok(VoteSubmitted {
            candidate: *candidate,
            voter: record.voter,
        })
    }

    /// Freeze the election and release the escrow. The returned event carries
    /// the amount the host must move to the authority.
    pub fn close(&mut self, caller: &Pubkey) -> Result<Closed> {
        require_keys_eq!(*caller, self.authority, ErrorCode::Unauthorized);
        require!(!self.closed, ErrorCode::AlreadyClosed);

        let amount = self.escrow;
        self.escrow = 0;
        self.closed = true;

        Ok(Closed { amount })
    }

    pub fn is_candidate_registered(&self, candidate: &Pubkey) -> bool {
        self.candidates.iter().any(|c| c.key == *candidate)
    }

    /// Zero for identifiers outside the candidate set.
    pub fn vote_count_for(&self, candidate: &Pubkey) -> u64 {
        self.candidates
            .iter()
            .find(|c| c.key == *candidate)
            .map_or(0, |c| c.votes)
    }

    pub fn registration_fee(&self) -> u64 {
        self.registration_fee
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
