use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::errors::PledgeError;
use crate::events;
use crate::state::*;

/// Creates the buyback vault for a registered token and seeds its
/// milestone schedule from the registry. Collateral is optional at
/// creation and can be topped up later.
pub fn create_buyback_vault(ctx: Context<CreateBuybackVault>, collateral_amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    let vault = &mut ctx.accounts.buyback_vault;
    vault.creator = ctx.accounts.creator.key();
    vault.token_mint = ctx.accounts.token_mint.key();
    vault.milestones = BuybackVault::build_schedule(&ctx.accounts.token_registry);
    vault.created_at = clock.unix_timestamp;
    vault.bump = ctx.bumps.buyback_vault;

    if collateral_amount > 0 {
        let transfer_ix = anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.creator.key(),
            &ctx.accounts.buyback_vault.key(),
            collateral_amount,
        );
        anchor_lang::solana_program::program::invoke(
            &transfer_ix,
            &[
                ctx.accounts.creator.to_account_info(),
                ctx.accounts.buyback_vault.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
        ctx.accounts.buyback_vault.add_collateral(collateral_amount)?;
    }

    let config = &mut ctx.accounts.protocol_config;
    config.vaults_created = config.vaults_created.saturating_add(1);

    emit!(events::VaultCreated {
        token_mint: ctx.accounts.token_mint.key(),
        creator: ctx.accounts.creator.key(),
        collateral: collateral_amount,
        milestone_count: ctx.accounts.buyback_vault.milestones.len() as u16,
        first_deadline: ctx.accounts.buyback_vault.next_deadline().unwrap_or(0),
        timestamp: clock.unix_timestamp,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CreateBuybackVault<'info> {
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
        mut,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init,
        payer = creator,
        space = BuybackVault::space(token_registry.milestone_count() as usize),
        seeds = [BUYBACK_VAULT_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub buyback_vault: Account<'info, BuybackVault>,

    pub system_program: Program<'info, System>,
}
