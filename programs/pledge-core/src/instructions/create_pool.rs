use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Seed the liquidity pool for a registered token. The token side must be
/// exactly the registry's liquidity allocation; the base side prices it.
pub fn create_pool(ctx: Context<CreatePool>, base_amount: u64, token_amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    require!(base_amount > 0, PledgeError::InvalidAmount);
    require!(
        token_amount == ctx.accounts.token_registry.liquidity_allocation,
        PledgeError::AllocationMismatch
    );

    let pool = &mut ctx.accounts.liquidity_pool;
    pool.token_mint = ctx.accounts.token_mint.key();
    pool.lp_mint = ctx.accounts.lp_mint.key();
    pool.token_vault = ctx.accounts.pool_token_account.key();
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.liquidity_pool;
    let shares = pool.apply_add_liquidity(base_amount, token_amount)?;

    // Base side moves onto the pool PDA itself
    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.funder.key(),
        &ctx.accounts.liquidity_pool.key(),
        base_amount,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.funder.to_account_info(),
            ctx.accounts.liquidity_pool.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder_token_account.to_account_info(),
                to: ctx.accounts.pool_token_account.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        token_amount,
    )?;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        LIQUIDITY_POOL_SEED,
        token_mint_key.as_ref(),
        &[ctx.bumps.liquidity_pool],
    ];
    let signer = &[&seeds[..]];
    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.lp_mint.to_account_info(),
                to: ctx.accounts.funder_lp_account.to_account_info(),
                authority: ctx.accounts.liquidity_pool.to_account_info(),
            },
            signer,
        ),
        shares,
    )?;

    emit!(events::PoolCreated {
        token_mint: token_mint_key,
        base_reserve: base_amount,
        token_reserve: token_amount,
        lp_minted: shares,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Pool created for {}: {} lamports / {} tokens, {} shares",
        token_mint_key,
        base_amount,
        token_amount,
        shares
    );
    Ok(())
}

#[derive(Accounts)]
pub struct CreatePool<'info> {
    /// Provides both sides of the seed liquidity
    #[account(mut)]
    pub funder: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        seeds = [TOKEN_REGISTRY_SEED, token_mint.key().as_ref()],
        bump = token_registry.bump,
    )]
    pub token_registry: Account<'info, TokenRegistry>,

    #[account(
        init,
        payer = funder,
        space = 8 + LiquidityPool::SIZE,
        seeds = [LIQUIDITY_POOL_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub liquidity_pool: Account<'info, LiquidityPool>,

    /// Pool-share mint controlled by the pool PDA
    #[account(
        init,
        payer = funder,
        seeds = [LP_MINT_SEED, token_mint.key().as_ref()],
        bump,
        mint::decimals = token_mint.decimals,
        mint::authority = liquidity_pool,
    )]
    pub lp_mint: Account<'info, Mint>,

    /// Token side of the reserves
    #[account(
        init,
        payer = funder,
        associated_token::mint = token_mint,
        associated_token::authority = liquidity_pool,
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = funder_token_account.owner == funder.key() @ PledgeError::Unauthorized,
        constraint = funder_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub funder_token_account: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = funder,
        associated_token::mint = lp_mint,
        associated_token::authority = funder,
    )]
    pub funder_lp_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub rent: Sysvar<'info, Rent>,
}
