use anchor_lang::prelude::*;

use crate::state::{Election, Voter};

#[derive(Accounts)]
pub struct CastVote<'info> {
    #[account(
        mut,
        seeds = [Election::SEED, election.authority.as_ref()],
        bump = election.bump,
    )]
    pub election: Account<'info, Election>,
    /// CHECK: the signer's voter PDA; left uninitialised until they register,
    /// so it is loaded by `Voter::load` rather than by the account loader.
    #[account(
        mut,
        seeds = [Voter::SEED, election.key().as_ref(), voter.key().as_ref()],
        bump,
    )]
    pub voter_record: UncheckedAccount<'info>,
    pub voter: Signer<'info>,
}

impl<'info> CastVote<'info> {
    pub fn vote(&mut self, candidate: Pubkey, bumps: &CastVoteBumps) -> Result<()> {
        let info = self.voter_record.to_account_info();
        let mut record = Voter::load(&info, &self.election.key(), bumps.voter_record)?;
        let event = self.election.vote(record.as_mut(), &candidate)?;
        if let Some(record) = &record {
            record.store(&info)?;
        }

        msg!("vote from {} for {}", event.voter, event.candidate);
        emit!(event);
        Ok(())
    }
}
