use anchor_lang::prelude::*;

/// Emitted when the protocol config is initialized
#[event]
pub struct ProtocolInitialized {
    pub authority: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a new creator token is registered
#[event]
pub struct TokenRegistered {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub total_supply: u64,
    pub creator_allocation: u64,
    pub platform_allocation: u64,
    pub liquidity_allocation: u64,
    pub milestone_count: u16,
    pub trading_block_until: i64,
    pub timestamp: i64,
}

/// Emitted when a liquidity pool is seeded
#[event]
pub struct PoolCreated {
    pub token_mint: Pubkey,
    pub base_reserve: u64,
    pub token_reserve: u64,
    pub lp_minted: u64,
    pub timestamp: i64,
}

/// Emitted when a provider deposits into a pool
#[event]
pub struct LiquidityAdded {
    pub token_mint: Pubkey,
    pub provider: Pubkey,
    pub base_in: u64,
    pub token_in: u64,
    pub shares_minted: u64,
    pub timestamp: i64,
}

/// Emitted when a provider withdraws from a pool
#[event]
pub struct LiquidityRemoved {
    pub token_mint: Pubkey,
    pub provider: Pubkey,
    pub shares_burned: u64,
    pub base_out: u64,
    pub token_out: u64,
    pub timestamp: i64,
}

/// Emitted on every swap
#[event]
pub struct SwapExecuted {
    pub token_mint: Pubkey,
    pub trader: Pubkey,
    pub base_to_token: bool,
    pub amount_in: u64,
    pub amount_out: u64,
    pub insurance_fee: u64,
    pub base_reserve_after: u64,
    pub token_reserve_after: u64,
    pub timestamp: i64,
}

/// Emitted when the insurance pool is created
#[event]
pub struct InsurancePoolCreated {
    pub initial_funds: u64,
    pub approval_threshold: u64,
    pub timestamp: i64,
}

/// Emitted when lamports are added to the insurance pool
#[event]
pub struct InsuranceFunded {
    pub funder: Pubkey,
    pub amount: u64,
    pub balance_after: u64,
    pub timestamp: i64,
}

/// Emitted when a cover claim is submitted
#[event]
pub struct ClaimSubmitted {
    pub claim_id: u64,
    pub vault: Pubkey,
    pub claimant: Pubkey,
    pub amount: u64,
    pub milestone: u16,
    pub timestamp: i64,
}

/// Emitted when a claim is paid out
#[event]
pub struct ClaimPaid {
    pub claim_id: u64,
    pub claimant: Pubkey,
    pub amount: u64,
    pub auto_processed: bool,
    pub pool_balance_after: u64,
    pub timestamp: i64,
}

/// Emitted when the platform vault is created
#[event]
pub struct PlatformVaultCreated {
    pub initial_capacity: u64,
    pub timestamp: i64,
}

/// Emitted when lendable capacity is added to the platform vault
#[event]
pub struct PlatformVaultFunded {
    pub amount: u64,
    pub total_capacity: u64,
    pub timestamp: i64,
}

/// Emitted when a buyback vault is created
#[event]
pub struct VaultCreated {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub collateral: u64,
    pub milestone_count: u16,
    pub first_deadline: i64,
    pub timestamp: i64,
}

/// Emitted when a creator tops up vault collateral
#[event]
pub struct CollateralAdded {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub amount: u64,
    pub collateral_balance: u64,
    pub timestamp: i64,
}

/// Emitted when a milestone is completed, voluntarily or by enforcement
#[event]
pub struct MilestoneCompleted {
    pub token_mint: Pubkey,
    pub milestone: u16,
    pub tokens_burned: u64,
    pub forced: bool,
    pub timestamp: i64,
}

/// Emitted when enforcement buys and burns on behalf of a defaulting creator
#[event]
pub struct DefaultEnforced {
    pub token_mint: Pubkey,
    pub milestone: u16,
    pub cost: u64,
    pub from_collateral: u64,
    pub borrowed: u64,
    pub tokens_bought: u64,
    pub enforcer: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a bridge loan is issued or extended
#[event]
pub struct LoanIssued {
    pub vault: Pubkey,
    pub creator: Pubkey,
    pub amount: u64,
    pub principal_after: u64,
    pub timestamp: i64,
}

/// Emitted when a loan payment is applied
#[event]
pub struct LoanRepaid {
    pub vault: Pubkey,
    pub payer: Pubkey,
    pub interest_paid: u64,
    pub principal_paid: u64,
    pub principal_after: u64,
    pub timestamp: i64,
}

/// Emitted when penalty debt is added to a creator's ledger
#[event]
pub struct DebtCreated {
    pub creator: Pubkey,
    pub amount: u64,
    pub principal_after: u64,
    pub timestamp: i64,
}

/// Emitted when a penalty debt payment is applied
#[event]
pub struct DebtRepaid {
    pub creator: Pubkey,
    pub interest_paid: u64,
    pub principal_paid: u64,
    pub principal_after: u64,
    pub timestamp: i64,
}

/// Emitted when the authority adjusts a creator's credit limit
#[event]
pub struct CreditLimitUpdated {
    pub creator: Pubkey,
    pub old_limit: u64,
    pub new_limit: u64,
    pub timestamp: i64,
}

/// Emitted when a creator treasury is created
#[event]
pub struct TreasuryCreated {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub total_allocation: u64,
    pub creator_cap: u64,
    pub platform_cap: u64,
    pub unlock_interval: i64,
    pub timestamp: i64,
}

/// Emitted when a periodic unlock is processed
#[event]
pub struct UnlockProcessed {
    pub token_mint: Pubkey,
    pub creator_amount: u64,
    pub platform_amount: u64,
    pub creator_vested: u64,
    pub platform_distributed: u64,
    pub timestamp: i64,
}

/// Emitted when a creator sells vested tokens from the treasury
#[event]
pub struct TokensSold {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub amount: u64,
    pub remaining_sellable: u64,
    pub timestamp: i64,
}

/// Emitted when sale proceeds are routed through debt deduction
#[event]
pub struct SaleProceedsRouted {
    pub token_mint: Pubkey,
    pub creator: Pubkey,
    pub proceeds: u64,
    pub debt_deducted: u64,
    pub creator_remainder: u64,
    pub timestamp: i64,
}

/// Emitted when a treasury buyback milestone is executed
#[event]
pub struct TreasuryBuybackExecuted {
    pub token_mint: Pubkey,
    pub milestone: u16,
    pub tokens_burned: u64,
    pub deficit: u64,
    pub completed: bool,
    pub timestamp: i64,
}

/// Emitted when a recorded treasury deficit is cleared
#[event]
pub struct TreasuryDeficitCleared {
    pub token_mint: Pubkey,
    pub milestone: u16,
    pub tokens_burned: u64,
    pub completer: Pubkey,
    pub timestamp: i64,
}
