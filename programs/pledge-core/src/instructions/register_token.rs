use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Register a creator token: records the supply split, the buyback
/// schedule and the trading block, and opens the creator's ledger
pub fn register_token(ctx: Context<RegisterToken>, params: RegistryParams) -> Result<()> {
    let clock = Clock::get()?;

    // The registered economics must describe the real mint
    require!(
        ctx.accounts.token_mint.supply == params.total_supply,
        PledgeError::AllocationMismatch
    );

    let registry = &mut ctx.accounts.token_registry;
    registry.token_mint = ctx.accounts.token_mint.key();
    registry.creator = ctx.accounts.creator.key();
    registry.total_supply = params.total_supply;
    registry.creator_allocation = params.creator_allocation;
    registry.platform_allocation = params.platform_allocation;
    registry.liquidity_allocation = params.liquidity_allocation;
    registry.buyback_start = params.buyback_start;
    registry.buyback_end = params.buyback_end;
    registry.buyback_interval = params.buyback_interval;
    registry.buyback_amount_per_interval = params.buyback_amount_per_interval;
    registry.trading_block_until = params.trading_block_until;
    registry.vesting_enabled = params.vesting_enabled;
    registry.vesting_monthly_bps = params
        .vesting_monthly_bps
        .unwrap_or(DEFAULT_VESTING_MONTHLY_BPS);
    registry.vesting_cap_bps = params.vesting_cap_bps.unwrap_or(DEFAULT_VESTING_CAP_BPS);
    registry.created_at = clock.unix_timestamp;
    registry.bump = ctx.bumps.token_registry;
    registry.validate()?;

    ctx.accounts
        .creator_ledger
        .open(ctx.accounts.creator.key(), ctx.bumps.creator_ledger);

    let config = &mut ctx.accounts.protocol_config;
    config.tokens_registered = config.tokens_registered.saturating_add(1);

    emit!(events::TokenRegistered {
        token_mint: ctx.accounts.token_mint.key(),
        creator: ctx.accounts.creator.key(),
        total_supply: params.total_supply,
        creator_allocation: params.creator_allocation,
        platform_allocation: params.platform_allocation,
        liquidity_allocation: params.liquidity_allocation,
        milestone_count: ctx.accounts.token_registry.milestone_count() as u16,
        trading_block_until: params.trading_block_until,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Token registered: {} with {} milestones",
        ctx.accounts.token_mint.key(),
        ctx.accounts.token_registry.milestone_count()
    );
    Ok(())
}

#[derive(Accounts)]
pub struct RegisterToken<'info> {
    /// Creator registering the token (pays for account creation)
    #[account(mut)]
    pub creator: Signer<'info>,

    /// The token mint being registered
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init,
        payer = creator,
        space = 8 + TokenRegistry::SIZE,
        seeds = [TOKEN_REGISTRY_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub token_registry: Account<'info, TokenRegistry>,

    /// Penalty ledger for this creator; shared across their tokens
    #[account(
        init_if_needed,
        payer = creator,
        space = 8 + CreatorLedger::SIZE,
        seeds = [CREATOR_LEDGER_SEED, creator.key().as_ref()],
        bump,
    )]
    pub creator_ledger: Account<'info, CreatorLedger>,

    pub system_program: Program<'info, System>,
}
