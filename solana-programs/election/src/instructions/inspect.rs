use anchor_lang::prelude::*;

use crate::state::Election;

/// Read-only access for the view instructions; nothing is written back.
#[derive(Accounts)]
pub struct Inspect<'info> {
    pub election: Account<'info, Election>,
}
