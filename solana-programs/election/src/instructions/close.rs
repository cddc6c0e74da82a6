use anchor_lang::prelude::*;

use crate::errors::ErrorCode;
use crate::state::Election;

#[derive(Accounts)]
pub struct CloseElection<'info> {
    #[account(
        mut,
        seeds = [Election::SEED, election.authority.as_ref()],
        bump = election.bump,
    )]
    pub election: Account<'info, Election>,
    #[account(mut)]
    pub authority: Signer<'info>,
}

impl<'info> CloseElection<'info> {
    pub fn close(&mut self) -> Result<()> {
        // `Account` has its own `close`, so call the election's explicitly.
        let event = Election::close(&mut self.election, &self.authority.key())?;

        // The PDA is owned by this program, so escrow is moved by debiting
        // it directly. Rent-exempt lamports stay behind.
        let election_info = self.election.to_account_info();
        let authority_info = self.authority.to_account_info();
        let remaining = election_info
            .lamports()
            .checked_sub(event.amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        let credited = authority_info
            .lamports()
            .checked_add(event.amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        **election_info.try_borrow_mut_lamports()? = remaining;
        **authority_info.try_borrow_mut_lamports()? = credited;

        msg!("election closed, {} lamports to {}", event.amount, self.authority.key());
        emit!(event);
        Ok(())
    }
}
