use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Permissionless unlock tick. Releases one interval's worth of each
/// stream: the creator portion vests in place, the platform portion is
/// transferred out to the beneficiary.
pub fn process_monthly_unlock(ctx: Context<ProcessMonthlyUnlock>) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let amounts = ctx.accounts.treasury.plan_unlock(now)?;
    ctx.accounts.treasury.record_unlock(amounts, now)?;

    if amounts.platform > 0 {
        let token_mint_key = ctx.accounts.token_mint.key();
        let seeds = &[
            CREATOR_TREASURY_SEED,
            token_mint_key.as_ref(),
            &[ctx.accounts.treasury.bump],
        ];
        let signer = &[&seeds[..]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.treasury_token_account.to_account_info(),
                    to: ctx.accounts.beneficiary_token_account.to_account_info(),
                    authority: ctx.accounts.treasury.to_account_info(),
                },
                signer,
            ),
            amounts.platform,
        )?;
    }

    emit!(events::UnlockProcessed {
        token_mint: ctx.accounts.token_mint.key(),
        creator_amount: amounts.creator,
        platform_amount: amounts.platform,
        creator_vested: ctx.accounts.treasury.creator_vested,
        platform_distributed: ctx.accounts.treasury.platform_distributed,
        timestamp: now,
    });
    Ok(())
}

/// Withdraw vested tokens to the creator's wallet
pub fn sell_tokens(ctx: Context<SellTokens>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    ctx.accounts.treasury.record_sale(amount)?;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        CREATOR_TREASURY_SEED,
        token_mint_key.as_ref(),
        &[ctx.accounts.treasury.bump],
    ];
    let signer = &[&seeds[..]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.treasury_token_account.to_account_info(),
                to: ctx.accounts.creator_token_account.to_account_info(),
                authority: ctx.accounts.treasury.to_account_info(),
            },
            signer,
        ),
        amount,
    )?;

    emit!(events::TokensSold {
        token_mint: token_mint_key,
        creator: ctx.accounts.creator.key(),
        amount,
        remaining_sellable: ctx.accounts.treasury.sellable_balance(),
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Withdraw vested tokens and route the declared sale proceeds through
/// the penalty ledger: outstanding debt is deducted and paid into the
/// platform vault before the creator keeps the remainder.
pub fn sell_and_repay_debt(
    ctx: Context<SellAndRepayDebt>,
    amount_to_sell: u64,
    sale_proceeds: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    ctx.accounts.treasury.record_sale(amount_to_sell)?;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        CREATOR_TREASURY_SEED,
        token_mint_key.as_ref(),
        &[ctx.accounts.treasury.bump],
    ];
    let signer = &[&seeds[..]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.treasury_token_account.to_account_info(),
                to: ctx.accounts.creator_token_account.to_account_info(),
                authority: ctx.accounts.treasury.to_account_info(),
            },
            signer,
        ),
        amount_to_sell,
    )?;

    let split = ctx.accounts.creator_ledger.apply_payment(sale_proceeds, now)?;
    if split.deducted() > 0 {
        let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.creator.key(),
            &ctx.accounts.platform_vault.key(),
            split.deducted(),
        );
        anchor_lang::solana_program::program::invoke(
            &transfer_ix,
            &[
                ctx.accounts.creator.to_account_info(),
                ctx.accounts.platform_vault.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
        ctx.accounts.platform_vault.record_debt_payment(&split);
    }

    emit!(events::TokensSold {
        token_mint: token_mint_key,
        creator: ctx.accounts.creator.key(),
        amount: amount_to_sell,
        remaining_sellable: ctx.accounts.treasury.sellable_balance(),
        timestamp: now,
    });
    emit!(events::SaleProceedsRouted {
        token_mint: token_mint_key,
        creator: ctx.accounts.creator.key(),
        proceeds: sale_proceeds,
        debt_deducted: split.deducted(),
        creator_remainder: sale_proceeds.saturating_sub(split.deducted()),
        timestamp: now,
    });
    if split.deducted() > 0 {
        emit!(events::DebtRepaid {
            creator: ctx.accounts.creator.key(),
            interest_paid: split.interest_paid,
            principal_paid: split.principal_paid,
            principal_after: ctx.accounts.creator_ledger.debt_principal,
            timestamp: now,
        });
    }
    Ok(())
}

/// Permissionless treasury-side milestone burn. Burns what current
/// holdings cover; any shortfall is recorded as an open deficit rather
/// than failing the call.
pub fn execute_treasury_buyback(
    ctx: Context<ExecuteTreasuryBuyback>,
    milestone_idx: u16,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let plan = ctx.accounts.treasury.plan_buyback(milestone_idx)?;

    if plan.burn_now > 0 {
        let token_mint_key = ctx.accounts.token_mint.key();
        let seeds = &[
            CREATOR_TREASURY_SEED,
            token_mint_key.as_ref(),
            &[ctx.accounts.treasury.bump],
        ];
        let signer = &[&seeds[..]];
        token::burn(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.token_mint.to_account_info(),
                    from: ctx.accounts.treasury_token_account.to_account_info(),
                    authority: ctx.accounts.treasury.to_account_info(),
                },
                signer,
            ),
            plan.burn_now,
        )?;
    }

    ctx.accounts.treasury.record_buyback(&plan, now)?;

    if !plan.completes() {
        msg!(
            "Milestone {} short by {} tokens; deficit recorded",
            plan.milestone,
            plan.deficit_after
        );
    }

    emit!(events::TreasuryBuybackExecuted {
        token_mint: ctx.accounts.token_mint.key(),
        milestone: plan.milestone,
        tokens_burned: plan.burn_now,
        deficit: plan.deficit_after,
        completed: plan.completes(),
        timestamp: now,
    });
    Ok(())
}

/// Clears an open deficit by burning externally purchased tokens from
/// the completer's wallet
pub fn complete_treasury_buyback(
    ctx: Context<CompleteTreasuryBuyback>,
    milestone_idx: u16,
    tokens: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    require!(tokens > 0, PledgeError::InvalidAmount);

    ctx.accounts
        .treasury
        .record_deficit_completion(milestone_idx, tokens, clock.unix_timestamp)?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.token_mint.to_account_info(),
                from: ctx.accounts.completer_token_account.to_account_info(),
                authority: ctx.accounts.completer.to_account_info(),
            },
        ),
        tokens,
    )?;

    emit!(events::TreasuryDeficitCleared {
        token_mint: ctx.accounts.token_mint.key(),
        milestone: milestone_idx,
        tokens_burned: tokens,
        completer: ctx.accounts.completer.key(),
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct ProcessMonthlyUnlock<'info> {
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = treasury,
    )]
    pub treasury_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = beneficiary_token_account.owner == treasury.platform_beneficiary @ PledgeError::Unauthorized,
        constraint = beneficiary_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub beneficiary_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct SellTokens<'info> {
    pub creator: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump = treasury.bump,
        constraint = treasury.creator == creator.key() @ PledgeError::Unauthorized,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    #[account(
        mut,
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

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct SellAndRepayDebt<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump = treasury.bump,
        constraint = treasury.creator == creator.key() @ PledgeError::Unauthorized,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    #[account(
        mut,
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

    #[account(
        mut,
        seeds = [CREATOR_LEDGER_SEED, creator.key().as_ref()],
        bump = creator_ledger.bump,
    )]
    pub creator_ledger: Account<'info, CreatorLedger>,

    #[account(
        mut,
        seeds = [PLATFORM_VAULT_SEED],
        bump = platform_vault.bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ExecuteTreasuryBuyback<'info> {
    #[account(mut)]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = treasury,
    )]
    pub treasury_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct CompleteTreasuryBuyback<'info> {
    pub completer: Signer<'info>,

    #[account(mut)]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [CREATOR_TREASURY_SEED, token_mint.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, CreatorTreasury>,

    #[account(
        mut,
        constraint = completer_token_account.owner == completer.key() @ PledgeError::Unauthorized,
        constraint = completer_token_account.mint == token_mint.key() @ PledgeError::InvalidTokenMint,
    )]
    pub completer_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
