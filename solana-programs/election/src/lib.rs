use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

pub use errors::ErrorCode;
pub use events::*;
pub use instructions::*;
pub use state::*;

declare_id!("AdemcJyFzDyiCTyuCQuhkWQHQdQUkaqj15nwAPgsARmj");

#[program]
pub mod election_registry {
    use super::*;

    /// Open the election with a fixed candidate set. The signer becomes the
    /// authority and is the only key that can later close it.
    pub fn initialise(
        ctx: Context<Initialise>,
        candidates: Vec<Pubkey>,
        registration_fee: u64,
    ) -> Result<()> {
        ctx.accounts
            .initialise(candidates, registration_fee, &ctx.bumps)
    }

    /// Register the signer as a voter, paying `amount` lamports into escrow.
    /// `amount` must cover the registration fee; any surplus is kept.
    pub fn register(ctx: Context<RegisterVoter>, amount: u64) -> Result<()> {
        ctx.accounts.register(amount, &ctx.bumps)
    }

    pub fn vote(ctx: Context<CastVote>, candidate: Pubkey) -> Result<()> {
        ctx.accounts.vote(candidate, &ctx.bumps)
    }

    /// Authority only. Freezes registration and voting and sweeps the
    /// escrow to the authority.
    pub fn close(ctx: Context<CloseElection>) -> Result<()> {
        ctx.accounts.close()
    }

    pub fn is_candidate_registered(ctx: Context<Inspect>, candidate: Pubkey) -> Result<bool> {
        Ok(ctx.accounts.election.is_candidate_registered(&candidate))
    }

    pub fn vote_count_for(ctx: Context<Inspect>, candidate: Pubkey) -> Result<u64> {
        Ok(ctx.accounts.election.vote_count_for(&candidate))
    }

    pub fn registration_fee(ctx: Context<Inspect>) -> Result<u64> {
        Ok(ctx.accounts.election.registration_fee())
    }

    pub fn is_closed(ctx: Context<Inspect>) -> Result<bool> {
        Ok(ctx.accounts.election.is_closed())
    }
}
