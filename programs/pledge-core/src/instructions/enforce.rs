use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Permissionless default enforcement. If the current milestone's
/// deadline has passed without completion, buys the required tokens
/// from the pool at market price and burns them, funded by vault
/// collateral first and a platform bridge loan for any shortfall. The
/// full cost lands on the creator's penalty ledger either way.
///
/// A call with nothing enforceable is a no-op, but account resolution
/// still runs, so it rents the vault's loan record if that PDA does
/// not exist yet. The record starts empty and accrues nothing until a
/// real shortfall draws on it; the rent simply pre-funds the account a
/// default would need. Keepers who want to avoid parking that rent on
/// healthy vaults should gate on the vault's `next_deadline` off-chain
/// instead of probing.
pub fn check_and_enforce_default(ctx: Context<CheckAndEnforceDefault>) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let plan = ctx
        .accounts
        .buyback_vault
        .plan_enforcement(&ctx.accounts.liquidity_pool, now)?;
    let Some(plan) = plan else {
        msg!("No milestone past its deadline; nothing to enforce");
        return Ok(());
    };

    let outcome = ctx.accounts.liquidity_pool.apply_swap_base_in(plan.cost)?;
    require!(
        outcome.amount_out >= plan.required_burn,
        PledgeError::SlippageExceeded
    );

    {
        let loan = &mut ctx.accounts.loan;
        loan.vault = ctx.accounts.buyback_vault.key();
        loan.creator = ctx.accounts.buyback_vault.creator;
        loan.bump = ctx.bumps.loan;
    }

    if plan.borrowed > 0 {
        require!(
            ctx.accounts
                .creator_ledger
                .can_borrow(ctx.accounts.loan.principal, plan.borrowed),
            PledgeError::CreditLimitExceeded
        );
        ctx.accounts.platform_vault.record_borrow(plan.borrowed)?;
        ctx.accounts.loan.extend(plan.borrowed, now)?;
    }

    // Fund the pool purchase: collateral first, then the bridge loan
    let vault_info = ctx.accounts.buyback_vault.to_account_info();
    let pool_info = ctx.accounts.liquidity_pool.to_account_info();
    if plan.from_collateral > 0 {
        let vault_balance = vault_info.lamports();
        **vault_info.try_borrow_mut_lamports()? = vault_balance
            .checked_sub(plan.from_collateral)
            .ok_or(PledgeError::Overflow)?;
        **pool_info.try_borrow_mut_lamports()? = pool_info
            .lamports()
            .checked_add(plan.from_collateral)
            .ok_or(PledgeError::Overflow)?;
    }
    if plan.borrowed > 0 {
        let platform_info = ctx.accounts.platform_vault.to_account_info();
        let platform_balance = platform_info.lamports();
        **platform_info.try_borrow_mut_lamports()? = platform_balance
            .checked_sub(plan.borrowed)
            .ok_or(PledgeError::Overflow)?;
        **pool_info.try_borrow_mut_lamports()? = pool_info
            .lamports()
            .checked_add(plan.borrowed)
            .ok_or(PledgeError::Overflow)?;
    }

    // Forward the skim to the insurance pool
    let insurance_info = ctx.accounts.insurance_pool.to_account_info();
    let pool_balance = pool_info.lamports();
    **pool_info.try_borrow_mut_lamports()? = pool_balance
        .checked_sub(outcome.insurance_fee)
        .ok_or(PledgeError::Overflow)?;
    **insurance_info.try_borrow_mut_lamports()? = insurance_info
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
    token::burn(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.token_mint.to_account_info(),
                from: ctx.accounts.pool_token_account.to_account_info(),
                authority: ctx.accounts.liquidity_pool.to_account_info(),
            },
            signer,
        ),
        outcome.amount_out,
    )?;

    ctx.accounts
        .buyback_vault
        .record_enforcement(&plan, outcome.amount_out, now)?;
    ctx.accounts.creator_ledger.add_debt(plan.cost, now)?;
    ctx.accounts.platform_vault.record_debt_created(plan.cost)?;

    msg!(
        "Enforced milestone {}: spent {} lamports ({} collateral, {} borrowed), burned {} tokens",
        plan.milestone,
        plan.cost,
        plan.from_collateral,
        plan.borrowed,
        outcome.amount_out
    );

    emit!(events::DefaultEnforced {
        token_mint: token_mint_key,
        milestone: plan.milestone,
        cost: plan.cost,
        from_collateral: plan.from_collateral,
        borrowed: plan.borrowed,
        tokens_bought: outcome.amount_out,
        enforcer: ctx.accounts.enforcer.key(),
        timestamp: now,
    });
    emit!(events::MilestoneCompleted {
        token_mint: token_mint_key,
        milestone: plan.milestone,
        tokens_burned: outcome.amount_out,
        forced: true,
        timestamp: now,
    });
    if plan.borrowed > 0 {
        emit!(events::LoanIssued {
            vault: ctx.accounts.buyback_vault.key(),
            creator: ctx.accounts.buyback_vault.creator,
            amount: plan.borrowed,
            principal_after: ctx.accounts.loan.principal,
            timestamp: now,
        });
    }
    emit!(events::DebtCreated {
        creator: ctx.accounts.buyback_vault.creator,
        amount: plan.cost,
        principal_after: ctx.accounts.creator_ledger.debt_principal,
        timestamp: now,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CheckAndEnforceDefault<'info> {
    #[account(mut)]
    pub enforcer: Signer<'info>,

    #[account(mut)]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [BUYBACK_VAULT_SEED, token_mint.key().as_ref()],
        bump = buyback_vault.bump,
    )]
    pub buyback_vault: Account<'info, BuybackVault>,

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
        seeds = [PLATFORM_VAULT_SEED],
        bump = platform_vault.bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    #[account(
        init_if_needed,
        payer = enforcer,
        space = 8 + Loan::SIZE,
        seeds = [LOAN_SEED, buyback_vault.key().as_ref()],
        bump,
    )]
    pub loan: Account<'info, Loan>,

    #[account(
        mut,
        seeds = [CREATOR_LEDGER_SEED, buyback_vault.creator.as_ref()],
        bump = creator_ledger.bump,
    )]
    pub creator_ledger: Account<'info, CreatorLedger>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
