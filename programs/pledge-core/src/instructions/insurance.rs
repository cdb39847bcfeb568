use anchor_lang::prelude::*;

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// One-time insurance pool setup, optionally pre-funded by the authority
pub fn create_insurance_pool(
    ctx: Context<CreateInsurancePool>,
    initial_funds: u64,
    approval_threshold: Option<u64>,
) -> Result<()> {
    let clock = Clock::get()?;

    let pool = &mut ctx.accounts.insurance_pool;
    pool.approval_threshold =
        approval_threshold.unwrap_or(InsurancePool::DEFAULT_APPROVAL_THRESHOLD);
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.insurance_pool;
    if initial_funds > 0 {
        pool.credit(initial_funds)?;
    }

    if initial_funds > 0 {
        let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.authority.key(),
            &ctx.accounts.insurance_pool.key(),
            initial_funds,
        );
        anchor_lang::solana_program::program::invoke(
            &transfer_ix,
            &[
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.insurance_pool.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
    }

    emit!(events::InsurancePoolCreated {
        initial_funds,
        approval_threshold: ctx.accounts.insurance_pool.approval_threshold,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Add lamports to the backstop; open to anyone
pub fn add_insurance_funds(ctx: Context<AddInsuranceFunds>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    require!(amount > 0, PledgeError::InvalidAmount);

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.funder.key(),
        &ctx.accounts.insurance_pool.key(),
        amount,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.funder.to_account_info(),
            ctx.accounts.insurance_pool.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    ctx.accounts.insurance_pool.credit(amount)?;

    emit!(events::InsuranceFunded {
        funder: ctx.accounts.funder.key(),
        amount,
        balance_after: ctx.accounts.insurance_pool.balance,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Open a cover request against a vault shortfall
pub fn submit_claim(ctx: Context<SubmitClaim>, amount: u64, milestone: u16) -> Result<()> {
    let clock = Clock::get()?;
    require!(amount > 0, PledgeError::InvalidAmount);

    let id = ctx.accounts.insurance_pool.claims_submitted;
    let claim = &mut ctx.accounts.claim;
    claim.id = id;
    claim.vault = ctx.accounts.buyback_vault.key();
    claim.claimant = ctx.accounts.claimant.key();
    claim.amount = amount;
    claim.milestone = milestone;
    claim.status = ClaimStatus::Pending;
    claim.submitted_at = clock.unix_timestamp;
    claim.bump = ctx.bumps.claim;

    let pool = &mut ctx.accounts.insurance_pool;
    pool.claims_submitted = pool
        .claims_submitted
        .checked_add(1)
        .ok_or(PledgeError::Overflow)?;

    emit!(events::ClaimSubmitted {
        claim_id: id,
        vault: ctx.accounts.buyback_vault.key(),
        claimant: ctx.accounts.claimant.key(),
        amount,
        milestone,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Authority approval; approves and pays in one step
pub fn approve_claim(ctx: Context<ApproveClaim>) -> Result<()> {
    let clock = Clock::get()?;
    pay_claim(
        &mut ctx.accounts.claim,
        &mut ctx.accounts.insurance_pool,
        &ctx.accounts.claimant.to_account_info(),
        clock.unix_timestamp,
    )?;

    emit!(events::ClaimPaid {
        claim_id: ctx.accounts.claim.id,
        claimant: ctx.accounts.claimant.key(),
        amount: ctx.accounts.claim.amount,
        auto_processed: false,
        pool_balance_after: ctx.accounts.insurance_pool.balance,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Permissionless resolution for claims under the approval threshold
pub fn auto_process_claim(ctx: Context<AutoProcessClaim>) -> Result<()> {
    let clock = Clock::get()?;
    require!(
        ctx.accounts
            .insurance_pool
            .can_auto_process(ctx.accounts.claim.amount),
        PledgeError::ClaimAboveAutoThreshold
    );
    pay_claim(
        &mut ctx.accounts.claim,
        &mut ctx.accounts.insurance_pool,
        &ctx.accounts.claimant.to_account_info(),
        clock.unix_timestamp,
    )?;

    emit!(events::ClaimPaid {
        claim_id: ctx.accounts.claim.id,
        claimant: ctx.accounts.claimant.key(),
        amount: ctx.accounts.claim.amount,
        auto_processed: true,
        pool_balance_after: ctx.accounts.insurance_pool.balance,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Shared approve-and-pay path; both the funds check and the double
/// processing check abort the whole call
fn pay_claim<'info>(
    claim: &mut Account<'info, Claim>,
    pool: &mut Account<'info, InsurancePool>,
    claimant: &AccountInfo<'info>,
    now: i64,
) -> Result<()> {
    claim.approve()?;
    pool.record_payout(claim.amount)?;

    let pool_info = pool.to_account_info();
    let pool_balance = pool_info.lamports();
    **pool_info.try_borrow_mut_lamports()? = pool_balance
        .checked_sub(claim.amount)
        .ok_or(PledgeError::Overflow)?;
    **claimant.try_borrow_mut_lamports()? = claimant
        .lamports()
        .checked_add(claim.amount)
        .ok_or(PledgeError::Overflow)?;

    claim.mark_paid(now)
}

#[derive(Accounts)]
pub struct CreateInsurancePool<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
        has_one = authority @ PledgeError::Unauthorized,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + InsurancePool::SIZE,
        seeds = [INSURANCE_POOL_SEED],
        bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct AddInsuranceFunds<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,

    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SubmitClaim<'info> {
    #[account(mut)]
    pub claimant: Signer<'info>,

    /// Vault the shortfall occurred on
    pub buyback_vault: Account<'info, BuybackVault>,

    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    #[account(
        init,
        payer = claimant,
        space = 8 + Claim::SIZE,
        seeds = [CLAIM_SEED, insurance_pool.claims_submitted.to_le_bytes().as_ref()],
        bump,
    )]
    pub claim: Account<'info, Claim>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ApproveClaim<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
        has_one = authority @ PledgeError::Unauthorized,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    #[account(
        mut,
        seeds = [CLAIM_SEED, claim.id.to_le_bytes().as_ref()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    /// CHECK: payout destination recorded on the claim
    #[account(mut, address = claim.claimant @ PledgeError::Unauthorized)]
    pub claimant: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct AutoProcessClaim<'info> {
    #[account(
        mut,
        seeds = [INSURANCE_POOL_SEED],
        bump = insurance_pool.bump,
    )]
    pub insurance_pool: Account<'info, InsurancePool>,

    #[account(
        mut,
        seeds = [CLAIM_SEED, claim.id.to_le_bytes().as_ref()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    /// CHECK: payout destination recorded on the claim
    #[account(mut, address = claim.claimant @ PledgeError::Unauthorized)]
    pub claimant: UncheckedAccount<'info>,
}
