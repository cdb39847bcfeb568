use anchor_lang::prelude::*;

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// One-time lending vault setup, optionally seeded with capacity
pub fn create_platform_vault(ctx: Context<CreatePlatformVault>, initial_capacity: u64) -> Result<()> {
    let clock = Clock::get()?;

    let vault = &mut ctx.accounts.platform_vault;
    vault.created_at = clock.unix_timestamp;
    vault.bump = ctx.bumps.platform_vault;
    if initial_capacity > 0 {
        vault.deposit(initial_capacity)?;
    }

    if initial_capacity > 0 {
        let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.authority.key(),
            &ctx.accounts.platform_vault.key(),
            initial_capacity,
        );
        anchor_lang::solana_program::program::invoke(
            &transfer_ix,
            &[
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.platform_vault.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
    }

    emit!(events::PlatformVaultCreated {
        initial_capacity,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Add lendable capacity to the platform vault
pub fn fund_platform_vault(ctx: Context<FundPlatformVault>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    require!(amount > 0, PledgeError::InvalidAmount);

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.authority.key(),
        &ctx.accounts.platform_vault.key(),
        amount,
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.authority.to_account_info(),
            ctx.accounts.platform_vault.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    ctx.accounts.platform_vault.deposit(amount)?;

    emit!(events::PlatformVaultFunded {
        amount,
        total_capacity: ctx.accounts.platform_vault.total_capacity,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Authority override of a creator's enforcement credit line
pub fn set_credit_limit(ctx: Context<SetCreditLimit>, new_limit: u64) -> Result<()> {
    let clock = Clock::get()?;

    let ledger = &mut ctx.accounts.creator_ledger;
    let old_limit = ledger.credit_limit;
    ledger.credit_limit = new_limit;

    emit!(events::CreditLimitUpdated {
        creator: ledger.creator,
        old_limit,
        new_limit,
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

/// Pay down a bridge loan, interest first. Anyone may pay on a
/// creator's behalf; overpayment is capped at what is owed.
pub fn repay_loan(ctx: Context<RepayLoan>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    require!(amount > 0, PledgeError::InvalidAmount);
    require!(
        ctx.accounts.loan.total_owed(now) > 0,
        PledgeError::NothingOutstanding
    );

    let split = ctx.accounts.loan.apply_payment(amount, now)?;

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.payer.key(),
        &ctx.accounts.platform_vault.key(),
        split.deducted(),
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.payer.to_account_info(),
            ctx.accounts.platform_vault.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    ctx.accounts.platform_vault.record_loan_payment(&split);

    emit!(events::LoanRepaid {
        vault: ctx.accounts.loan.vault,
        payer: ctx.accounts.payer.key(),
        interest_paid: split.interest_paid,
        principal_paid: split.principal_paid,
        principal_after: ctx.accounts.loan.principal,
        timestamp: now,
    });
    Ok(())
}

/// Pay down ledger penalty debt directly in lamports
pub fn repay_creator_debt(ctx: Context<RepayCreatorDebt>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    require!(amount > 0, PledgeError::InvalidAmount);
    require!(
        ctx.accounts.creator_ledger.total_owed(now) > 0,
        PledgeError::NothingOutstanding
    );

    let split = ctx.accounts.creator_ledger.apply_payment(amount, now)?;

    let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
        &ctx.accounts.payer.key(),
        &ctx.accounts.platform_vault.key(),
        split.deducted(),
    );
    anchor_lang::solana_program::program::invoke(
        &transfer_ix,
        &[
            ctx.accounts.payer.to_account_info(),
            ctx.accounts.platform_vault.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    ctx.accounts.platform_vault.record_debt_payment(&split);

    emit!(events::DebtRepaid {
        creator: ctx.accounts.creator_ledger.creator,
        interest_paid: split.interest_paid,
        principal_paid: split.principal_paid,
        principal_after: ctx.accounts.creator_ledger.debt_principal,
        timestamp: now,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CreatePlatformVault<'info> {
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
        space = 8 + PlatformVault::SIZE,
        seeds = [PLATFORM_VAULT_SEED],
        bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundPlatformVault<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
        has_one = authority @ PledgeError::Unauthorized,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [PLATFORM_VAULT_SEED],
        bump = platform_vault.bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetCreditLimit<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
        has_one = authority @ PledgeError::Unauthorized,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [CREATOR_LEDGER_SEED, creator_ledger.creator.as_ref()],
        bump = creator_ledger.bump,
    )]
    pub creator_ledger: Account<'info, CreatorLedger>,
}

#[derive(Accounts)]
pub struct RepayLoan<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [LOAN_SEED, loan.vault.as_ref()],
        bump = loan.bump,
    )]
    pub loan: Account<'info, Loan>,

    #[account(
        mut,
        seeds = [PLATFORM_VAULT_SEED],
        bump = platform_vault.bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RepayCreatorDebt<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [CREATOR_LEDGER_SEED, creator_ledger.creator.as_ref()],
        bump = creator_ledger.bump,
    )]
    pub creator_ledger: Account<'info, CreatorLedger>,

    #[account(
        mut,
        seeds = [PLATFORM_VAULT_SEED],
        bump = platform_vault.bump,
    )]
    pub platform_vault: Account<'info, PlatformVault>,

    pub system_program: Program<'info, System>,
}
