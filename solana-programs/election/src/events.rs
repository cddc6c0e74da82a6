use anchor_lang::prelude::*;

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRegistered {
    pub voter: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteSubmitted {
    pub candidate: Pubkey,
    pub voter: Pubkey,
}

/// Emitted once, when the authority closes the election and sweeps escrow.
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub amount: u64,
}
