use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Voluntary milestone completion: the creator burns their own tokens
/// against the current milestone before its deadline.
pub fn execute_buyback(ctx: Context<ExecuteBuyback>, tokens_to_burn: u64) -> Result<()> {
    let clock = Clock::get()?;
    require!(tokens_to_burn > 0, PledgeError::InvalidAmount);

    let milestone = ctx
        .accounts
        .buyback_vault
        .record_buyback(tokens_to_burn, clock.unix_timestamp)?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.token_mint.to_account_info(),
                from: ctx.accounts.creator_token_account.to_account_info(),
                authority: ctx.accounts.creator.to_account_info(),
            },
        ),
        tokens_to_burn,
    )?;

    msg!(
        "Milestone {} completed: burned {} tokens",
        milestone,
        tokens_to_burn
    );

    emit!(events::MilestoneCompleted {
        token_mint: ctx.accounts.token_mint.key(),
        milestone,
        tokens_burned: tokens_to_burn,
        forced: false,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Top up vault collateral ahead of upcoming deadlines
pub fn add_collateral(ctx: Context<AddCollateral>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    require!(amount > 0, PledgeError::InvalidAmount);

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.creator.key(),
        &ctx.accounts.buyback_vault.key(),
        amount,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.creator.to_account_info(),
            ctx.accounts.buyback_vault.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    ctx.accounts.buyback_vault.add_collateral(amount)?;

    emit!(events::CollateralAdded {
        token_mint: ctx.accounts.buyback_vault.token_mint,
        creator: ctx.accounts.creator.key(),
        amount,
        collateral_balance: ctx.accounts.buyback_vault.collateral_balance,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct ExecuteBuyback<'info> {
    pub creator: Signer<'info>,

    #[account(mut)]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [BUYBACK_VAULT_SEED, token_mint.key().as_ref()],
        bump = buyback_vault.bump,
        constraint = buyback_vault.creator == creator.key() @ PledgeError::Unauthorized,
    )]
    pub buyback_vault: Account<'info, BuybackVault>,

    #[account(
        mut,
        constraint = creator_token_account.owner == creator.key() @ PledgeError::Unauthorized,
        constraint = creator_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub creator_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct AddCollateral<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [BUYBACK_VAULT_SEED, buyback_vault.token_mint.as_ref()],
        bump = buyback_vault.bump,
        constraint = buyback_vault.creator == creator.key() @ PledgeError::Unauthorized,
    )]
    pub buyback_vault: Account<'info, BuybackVault>,

    pub system_program: Program<'info, System>,
}
