use anchor_lang::prelude::*;

use crate::events;
use crate::state::*;

/// One-time protocol setup; the signer becomes the protocol authority
pub fn initialize_protocol(ctx: Context<InitializeProtocol>) -> Result<()> {
    let clock = Clock::get()?;

    let config = &mut ctx.accounts.protocol_config;
    config.authority = ctx.accounts.authority.key();
    config.tokens_registered = 0;
    config.vaults_created = 0;
    config.bump = ctx.bumps.protocol_config;
    config.created_at = clock.unix_timestamp;

    emit!(events::ProtocolInitialized {
        authority: ctx.accounts.authority.key(),
        timestamp: clock.unix_timestamp,
    });

    msg!("Protocol initialized by {}", ctx.accounts.authority.key());
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = 8 + ProtocolConfig::SIZE,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    pub system_program: Program<'info, System>,
}
