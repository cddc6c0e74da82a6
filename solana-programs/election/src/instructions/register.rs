use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::state::{Election, Voter};

#[derive(Accounts)]
pub struct RegisterVoter<'info> {
    #[account(
        mut,
        seeds = [Election::SEED, election.authority.as_ref()],
        bump = election.bump,
    )]
    pub election: Account<'info, Election>,
    // Created on first registration; `registered` stays false until the
    // election accepts the payment below.
    #[account(
        init_if_needed,
        payer = voter,
        space = 8 + Voter::INIT_SPACE,
        seeds = [Voter::SEED, election.key().as_ref(), voter.key().as_ref()],
        bump,
    )]
    pub voter_record: Account<'info, Voter>,
    #[account(mut)]
    pub voter: Signer<'info>,
    pub system_program: Program<'info, System>,
}

impl<'info> RegisterVoter<'info> {
    pub fn register(&mut self, amount: u64, bumps: &RegisterVoterBumps) -> Result<()> {
        let event = self
            .election
            .register_voter(self.voter.key(), &mut self.voter_record, amount)?;
        self.voter_record.election = self.election.key();
        self.voter_record.bump = bumps.voter_record;

        // escrow is held as lamports on the election PDA itself
        system_program::transfer(
            CpiContext::new(
                self.system_program.to_account_info(),
                system_program::Transfer {
                    from: self.voter.to_account_info(),
                    to: self.election.to_account_info(),
                },
            ),
            amount,
        )?;

        msg!("voter {} registered, paid {} lamports", event.voter, amount);
        emit!(event);
        Ok(())
    }
}
