use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Deposit both sides at the current ratio and receive pool shares
pub fn add_liquidity(
    ctx: Context<AddLiquidity>,
    base_in: u64,
    token_in: u64,
    min_share_out: u64,
) -> Result<()> {
    let clock = Clock::get()?;

    let shares = ctx
        .accounts
        .liquidity_pool
        .apply_add_liquidity(base_in, token_in)?;
    require!(shares >= min_share_out, PledgeError::SlippageExceeded);

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.provider.key(),
        &ctx.accounts.liquidity_pool.key(),
        base_in,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.provider.to_account_info(),
            ctx.accounts.liquidity_pool.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.provider_token_account.to_account_info(),
                to: ctx.accounts.pool_token_account.to_account_info(),
                authority: ctx.accounts.provider.to_account_info(),
            },
        ),
        token_in,
    )?;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        LIQUIDITY_POOL_SEED,
        token_mint_key.as_ref(),
        &[ctx.accounts.liquidity_pool.bump],
    ];
    let signer = &[&seeds[..]];
    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.lp_mint.to_account_info(),
                to: ctx.accounts.provider_lp_account.to_account_info(),
                authority: ctx.accounts.liquidity_pool.to_account_info(),
            },
            signer,
        ),
        shares,
    )?;

    emit!(events::LiquidityAdded {
        token_mint: token_mint_key,
        provider: ctx.accounts.provider.key(),
        base_in,
        token_in,
        shares_minted: shares,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Burn pool shares and withdraw the pro-rata reserves
pub fn remove_liquidity(
    ctx: Context<RemoveLiquidity>,
    shares: u64,
    min_base_out: u64,
    min_token_out: u64,
) -> Result<()> {
    let clock = Clock::get()?;

    let amounts = ctx.accounts.liquidity_pool.apply_remove_liquidity(shares)?;
    require!(
        amounts.base_out >= min_base_out && amounts.token_out >= min_token_out,
        PledgeError::SlippageExceeded
    );

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.lp_mint.to_account_info(),
                from: ctx.accounts.provider_lp_account.to_account_info(),
                authority: ctx.accounts.provider.to_account_info(),
            },
        ),
        shares,
    )?;

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
                to: ctx.accounts.provider_token_account.to_account_info(),
                authority: ctx.accounts.liquidity_pool.to_account_info(),
            },
            signer,
        ),
        amounts.token_out,
    )?;

    let pool_balance = ctx.accounts.liquidity_pool.to_account_info().lamports();
    **ctx
        .accounts
        .liquidity_pool
        .to_account_info()
        .try_borrow_mut_lamports()? = pool_balance
        .checked_sub(amounts.base_out)
        .ok_or(PledgeError::Overflow)?;
    **ctx.accounts.provider.try_borrow_mut_lamports()? = ctx
        .accounts
        .provider
        .lamports()
        .checked_add(amounts.base_out)
        .ok_or(PledgeError::Overflow)?;

    emit!(events::LiquidityRemoved {
        token_mint: token_mint_key,
        provider: ctx.accounts.provider.key(),
        shares_burned: shares,
        base_out: amounts.base_out,
        token_out: amounts.token_out,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct AddLiquidity<'info> {
    #[account(mut)]
    pub provider: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [LIQUIDITY_POOL_SEED, token_mint.key().as_ref()],
        bump = liquidity_pool.bump,
    )]
    pub liquidity_pool: Account<'info, LiquidityPool>,

    #[account(
        mut,
        seeds = [LP_MINT_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub lp_mint: Account<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = liquidity_pool,
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = provider_token_account.owner == provider.key() @ PledgeError::Unauthorized,
        constraint = provider_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub provider_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = provider,
        associated_token::mint = lp_mint,
        associated_token::authority = provider,
    )]
    pub provider_lp_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

#[derive(Accounts)]
pub struct RemoveLiquidity<'info> {
    #[account(mut)]
    pub provider: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [LIQUIDITY_POOL_SEED, token_mint.key().as_ref()],
        bump = liquidity_pool.bump,
    )]
    pub liquidity_pool: Account<'info, LiquidityPool>,

    #[account(
        mut,
        seeds = [LP_MINT_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub lp_mint: Account<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = liquidity_pool,
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = provider_token_account.owner == provider.key() @ PledgeError::Unauthorized,
        constraint = provider_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub provider_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        associated_token::mint = lp_mint,
        associated_token::authority = provider,
    )]
    pub provider_lp_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
