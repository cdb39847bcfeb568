use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Buy tokens with base currency. Rejected for the creator while their
/// trading block is active.
pub fn swap_base_for_token(
    ctx: Context<SwapBaseForToken>,
    base_in: u64,
    min_token_out: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(base_in > 0, PledgeError::InvalidAmount);
    require!(
        !ctx.accounts
            .token_registry
            .creator_trading_blocked(&ctx.accounts.trader.key(), now),
        PledgeError::TradingBlocked
    );

    let outcome = ctx.accounts.liquidity_pool.apply_swap_base_in(base_in)?;
    require!(
        outcome.amount_out >= min_token_out,
        PledgeError::SlippageExceeded
    );

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.trader.key(),
        &ctx.accounts.liquidity_pool.key(),
        base_in,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.trader.to_account_info(),
            ctx.accounts.liquidity_pool.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    // Forward the skim to the insurance pool
    let pool_balance = ctx.accounts.liquidity_pool.to_account_info().lamports();
    **ctx
        .accounts
        .liquidity_pool
        .to_account_info()
        .try_borrow_mut_lamports()? = pool_balance
        .checked_sub(outcome.insurance_fee)
        .ok_or(PledgeError::Overflow)?;
    **ctx
        .accounts
        .insurance_pool
        .to_account_info()
        .try_borrow_mut_lamports()? = ctx
        .accounts
        .insurance_pool
        .to_account_info()
        .lamports()
        .checked_add(outcome.insurance_fee)
        .ok_or(PledgeError::Overflow)?;
    ctx.accounts.insurance_pool.credit(outcome.insurance_fee)?;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        LIQUIDITY_POOL_SEED,
        token_mint_key.as_ref(),
        &[ctx.accounts.liquidity_pool.bump],
    ];
    let signer = &[&seeds[..]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.pool_token_account.to_account_info(),
                to: ctx.accounts.trader_token_account.to_account_info(),
                authority: ctx.accounts.liquidity_pool.to_account_info(),
            },
            signer,
        ),
        outcome.amount_out,
    )?;

    emit!(events::SwapExecuted {
        token_mint: token_mint_key,
        trader: ctx.accounts.trader.key(),
        base_to_token: true,
        amount_in: base_in,
        amount_out: outcome.amount_out,
        insurance_fee: outcome.insurance_fee,
        base_reserve_after: ctx.accounts.liquidity_pool.base_reserve,
        token_reserve_after: ctx.accounts.liquidity_pool.token_reserve,
        timestamp: now,
    });
    Ok(())
}

/// Sell tokens for base currency
pub fn swap_token_for_base(
    ctx: Context<SwapTokenForBase>,
    token_in: u64,
    min_base_out: u64,
) -> Result<()> {
    let clock = Clock::get()?;

    require!(token_in > 0, PledgeError::InvalidAmount);

    let outcome = ctx.accounts.liquidity_pool.apply_swap_token_in(token_in)?;
    require!(
        outcome.amount_out >= min_base_out,
        PledgeError::SlippageExceeded
    );

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.trader_token_account.to_account_info(),
                to: ctx.accounts.pool_token_account.to_account_info(),
                authority: ctx.accounts.trader.to_account_info(),
            },
        ),
        token_in,
    )?;

    let paid_out = outcome
        .amount_out
        .checked_add(outcome.insurance_fee)
        .ok_or(PledgeError::Overflow)?;
    let pool_balance = ctx.accounts.liquidity_pool.to_account_info().lamports();
    **ctx
        .accounts
        .liquidity_pool
        .to_account_info()
        .try_borrow_mut_lamports()? = pool_balance
        .checked_sub(paid_out)
        .ok_or(PledgeError::Overflow)?;
    **ctx.accounts.trader.try_borrow_mut_lamports()? = ctx
        .accounts
        .trader
        .lamports()
        .checked_add(outcome.amount_out)
        .ok_or(PledgeError::Overflow)?;
    **ctx
        .accounts
        .insurance_pool
        .to_account_info()
        .try_borrow_mut_lamports()? = ctx
        .accounts
        .insurance_pool
        .to_account_info()
        .lamports()
        .checked_add(outcome.insurance_fee)
        .ok_or(PledgeError::Overflow)?;
    ctx.accounts.insurance_pool.credit(outcome.insurance_fee)?;

    emit!(events::SwapExecuted {
        token_mint: ctx.accounts.token_mint.key(),
        trader: ctx.accounts.trader.key(),
        base_to_token: false,
        amount_in: token_in,
        amount_out: outcome.amount_out,
        insurance_fee: outcome.insurance_fee,
        base_reserve_after: ctx.accounts.liquidity_pool.base_reserve,
        token_reserve_after: ctx.accounts.liquidity_pool.token_reserve,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SwapBaseForToken<'info> {
    #[account(mut)]
    pub trader: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        seeds = [TOKEN_REGISTRY_SEED, token_mint.key().as_ref()],
        bump = token_registry.bump,
    )]
    pub token_registry: Account<'info, TokenRegistry>,

    #[account(
        mut,
        seeds = [LIQUIDITY_POOL_SEED, token_mint.key().as_ref()],
        bump = liquidity_pool.bump,
    )]
    pub liquidity_pool: Account<'info, LiquidityPool>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = liquidity_pool,
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    #[account(
        init_if_needed,
        payer = trader,
        associated_token::mint = token_mint,
        associated_token::authority = trader,
    )]
    pub trader_token_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

#[derive(Accounts)]
pub struct SwapTokenForBase<'info> {
    #[account(mut)]
    pub trader: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [LIQUIDITY_POOL_SEED, token_mint.key().as_ref()],
        bump = liquidity_pool.bump,
    )]
    pub liquidity_pool: Account<'info, LiquidityPool>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = liquidity_pool,
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    #[account(
        mut,
        constraint = trader_token_account.owner == trader.key() @ PledgeError::Unauthorized,
        constraint = trader_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub trader_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
