use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Creates the vesting treasury and deposits the creator allocation
/// into it. Creator-stream terms default to the registry's vesting
/// config; the platform stream is set explicitly here.
pub fn create_treasury(ctx: Context<CreateTreasury>, params: TreasuryParams) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let registry = &ctx.accounts.token_registry;
    let allocation = registry.creator_allocation;
    let (default_split, default_monthly) = if registry.vesting_enabled {
        (registry.vesting_cap_bps, registry.vesting_monthly_bps)
    } else {
        (0, 0)
    };

    let treasury = &mut ctx.accounts.treasury;
    treasury.creator = ctx.accounts.creator.key();
    treasury.token_mint = ctx.accounts.token_mint.key();
    treasury.platform_beneficiary = params.platform_beneficiary;
    treasury.total_allocation = allocation;
    treasury.token_balance = allocation;
    treasury.creator_split_bps = params.creator_split_bps.unwrap_or(default_split);
    treasury.platform_split_bps = params.platform_split_bps;
    treasury.creator_monthly_bps = params.creator_monthly_bps.unwrap_or(default_monthly);
    treasury.platform_monthly_bps = params.platform_monthly_bps;
    treasury.unlock_interval = params.unlock_interval.unwrap_or(DEFAULT_UNLOCK_INTERVAL);
    treasury.last_unlock_at = now;
    treasury.milestones = CreatorTreasury::build_schedule(registry);
    treasury.created_at = now;
    treasury.bump = ctx.bumps.treasury;
    treasury.validate_config()?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.creator_token_account.to_account_info(),
                to: ctx.accounts.treasury_token_account.to_account_info(),
                authority: ctx.accounts.creator.to_account_info(),
            },
        ),
        allocation,
    )?;

    if params.collateral > 0 {
        let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.creator.key(),
            &ctx.accounts.treasury.key(),
            params.collateral,
        );
        anchor_lang::solana_program::program::invoke(
            &transfer_ix,
            &[
                ctx.accounts.creator.to_account_info(),
                ctx.accounts.treasury.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
        ctx.accounts.treasury.collateral_balance = params.collateral;
    }

    emit!(events::TreasuryCreated {
        token_mint: ctx.accounts.token_mint.key(),
        creator: ctx.accounts.creator.key(),
        total_allocation: allocation,
        creator_cap: ctx.accounts.treasury.creator_cap(),
        platform_cap: ctx.accounts.treasury.platform_cap(),
        unlock_interval: ctx.accounts.treasury.unlock_interval,
        timestamp: now,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CreateTreasury<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        seeds = [TOKEN_REGISTRY_SEED, token_mint.key().as_ref()],
        bump = token_registry.bump,
        constraint = token_registry.creator == creator.key() @ PledgeError::Unauthorized,
    )]
    pub token_registry: Account<'info, TokenRegistry>,

    #[account(
        init,
        payer = creator,
        space = CreatorTreasury::space(token_registry.milestone_count() as usize),
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    /// Token account holding the vesting allocation
    #[account(
        init,
        payer = creator,
        associated_token::mint = token_mint,
        associated_token::authority = treasury,
    )]
    pub treasury_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = creator_token_account.owner == creator.key() @ PledgeError::Unauthorized,
        constraint = creator_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub creator_token_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub rent: Sysvar<'info, Rent>,
}
