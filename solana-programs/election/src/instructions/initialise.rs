use anchor_lang::prelude::*;

use crate::state::Election;

#[derive(Accounts)]
pub struct Initialise<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + Election::INIT_SPACE,
        seeds = [Election::SEED, authority.key().as_ref()],
        bump,
    )]
    pub election: Account<'info, Election>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

impl<'info> Initialise<'info> {
    pub fn initialise(
        &mut self,
        candidates: Vec<Pubkey>,
        registration_fee: u64,
        bumps: &InitialiseBumps,
    ) -> Result<()> {
        let election = Election::new(
            self.authority.key(),
            &candidates,
            registration_fee,
            bumps.election,
        )?;
        self.election.set_inner(election);

        msg!(
            "election {} opened: {} candidates, fee {} lamports",
            self.election.key(),
            candidates.len(),
            registration_fee
        );
        Ok(())
    }
}
