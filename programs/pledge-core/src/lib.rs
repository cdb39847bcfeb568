use anchor_lang::prelude::*;

pub mod state;
pub mod instructions;
pub mod errors;
pub mod events;

use instructions::*;
use state::{RegistryParams, TreasuryParams};

// Replace with actual program ID after first deployment
declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

/// Pledge Protocol - accountable token launches for creators
///
/// Every launched token carries enforceable commitments:
/// - A constant-product pool with a fee split that funds insurance
/// - A collateralized buyback vault with scheduled burn milestones
/// - Platform credit that covers missed milestones, at a price
/// - A vesting treasury that unlocks creator and platform streams
#[program]
pub mod pledge_core {
    use super::*;

    /// Initialize the protocol config (one-time admin setup)
    pub fn initialize_protocol(ctx: Context<InitializeProtocol>) -> Result<()> {
        instructions::initialize::initialize_protocol(ctx)
    }

    /// Register a creator token with its allocation split and buyback
    /// schedule
    ///
    /// Also opens the creator's ledger on first registration
    pub fn register_token(ctx: Context<RegisterToken>, params: RegistryParams) -> Result<()> {
        instructions::register_token::register_token(ctx, params)
    }

    /// Seed the liquidity pool with the registered liquidity allocation
    pub fn create_pool(
        ctx: Context<CreatePool>,
        base_amount: u64,
        token_amount: u64,
    ) -> Result<()> {
        instructions::create_pool::create_pool(ctx, base_amount, token_amount)
    }

    /// Deposit both sides at the current ratio and receive pool shares
    pub fn add_liquidity(
        ctx: Context<AddLiquidity>,
        base_in: u64,
        token_in: u64,
        min_share_out: u64,
    ) -> Result<()> {
        instructions::liquidity::add_liquidity(ctx, base_in, token_in, min_share_out)
    }

    /// Burn pool shares for a pro-rata slice of both reserves
    pub fn remove_liquidity(
        ctx: Context<RemoveLiquidity>,
        shares: u64,
        min_base_out: u64,
        min_token_out: u64,
    ) -> Result<()> {
        instructions::liquidity::remove_liquidity(ctx, shares, min_base_out, min_token_out)
    }

    /// Buy tokens with base currency
    ///
    /// Rejected for the creator while their trading block is active
    pub fn swap_base_for_token(
        ctx: Context<SwapBaseForToken>,
        base_in: u64,
        min_token_out: u64,
    ) -> Result<()> {
        instructions::swap::swap_base_for_token(ctx, base_in, min_token_out)
    }

    /// Sell tokens for base currency
    pub fn swap_token_for_base(
        ctx: Context<SwapTokenForBase>,
        token_in: u64,
        min_base_out: u64,
    ) -> Result<()> {
        instructions::swap::swap_token_for_base(ctx, token_in, min_base_out)
    }

    /// Create the insurance pool (one-time admin setup)
    pub fn create_insurance_pool(
        ctx: Context<CreateInsurancePool>,
        initial_funds: u64,
        approval_threshold: Option<u64>,
    ) -> Result<()> {
        instructions::insurance::create_insurance_pool(ctx, initial_funds, approval_threshold)
    }

    /// Add funds to the insurance backstop
    pub fn add_insurance_funds(ctx: Context<AddInsuranceFunds>, amount: u64) -> Result<()> {
        instructions::insurance::add_insurance_funds(ctx, amount)
    }

    /// Submit a cover claim against a vault shortfall
    pub fn submit_claim(ctx: Context<SubmitClaim>, amount: u64, milestone: u16) -> Result<()> {
        instructions::insurance::submit_claim(ctx, amount, milestone)
    }

    /// Approve and pay a claim (admin)
    pub fn approve_claim(ctx: Context<ApproveClaim>) -> Result<()> {
        instructions::insurance::approve_claim(ctx)
    }

    /// Pay a claim below the approval threshold
    ///
    /// Permissionless - anyone can trigger for small claims
    pub fn auto_process_claim(ctx: Context<AutoProcessClaim>) -> Result<()> {
        instructions::insurance::auto_process_claim(ctx)
    }

    /// Create the platform lending vault (one-time admin setup)
    pub fn create_platform_vault(
        ctx: Context<CreatePlatformVault>,
        initial_capacity: u64,
    ) -> Result<()> {
        instructions::platform::create_platform_vault(ctx, initial_capacity)
    }

    /// Add lendable capacity to the platform vault
    pub fn fund_platform_vault(ctx: Context<FundPlatformVault>, amount: u64) -> Result<()> {
        instructions::platform::fund_platform_vault(ctx, amount)
    }

    /// Override a creator's enforcement credit line (admin)
    pub fn set_credit_limit(ctx: Context<SetCreditLimit>, new_limit: u64) -> Result<()> {
        instructions::platform::set_credit_limit(ctx, new_limit)
    }

    /// Pay down a bridge loan, interest first
    pub fn repay_loan(ctx: Context<RepayLoan>, amount: u64) -> Result<()> {
        instructions::platform::repay_loan(ctx, amount)
    }

    /// Pay down ledger penalty debt directly
    pub fn repay_creator_debt(ctx: Context<RepayCreatorDebt>, amount: u64) -> Result<()> {
        instructions::platform::repay_creator_debt(ctx, amount)
    }

    /// Create the buyback vault with its milestone schedule
    pub fn create_buyback_vault(
        ctx: Context<CreateBuybackVault>,
        collateral_amount: u64,
    ) -> Result<()> {
        instructions::create_vault::create_buyback_vault(ctx, collateral_amount)
    }

    /// Complete the current milestone by burning the creator's own tokens
    pub fn execute_buyback(ctx: Context<ExecuteBuyback>, tokens_to_burn: u64) -> Result<()> {
        instructions::buyback::execute_buyback(ctx, tokens_to_burn)
    }

    /// Top up vault collateral
    pub fn add_collateral(ctx: Context<AddCollateral>, amount: u64) -> Result<()> {
        instructions::buyback::add_collateral(ctx, amount)
    }

    /// Enforce a missed milestone: buy from the pool and burn
    ///
    /// Permissionless - a no-op when nothing is past its deadline.
    /// Probing a healthy vault still rents its loan record, so keepers
    /// should gate on the vault's `next_deadline` off-chain
    pub fn check_and_enforce_default(ctx: Context<CheckAndEnforceDefault>) -> Result<()> {
        instructions::enforce::check_and_enforce_default(ctx)
    }

    /// Create the vesting treasury and deposit the creator allocation
    pub fn create_treasury(ctx: Context<CreateTreasury>, params: TreasuryParams) -> Result<()> {
        instructions::create_treasury::create_treasury(ctx, params)
    }

    /// Release one interval of the creator and platform unlock streams
    ///
    /// Permissionless - rejected until a full interval has elapsed
    pub fn process_monthly_unlock(ctx: Context<ProcessMonthlyUnlock>) -> Result<()> {
        instructions::treasury::process_monthly_unlock(ctx)
    }

    /// Withdraw vested tokens to the creator's wallet
    pub fn sell_tokens(ctx: Context<SellTokens>, amount: u64) -> Result<()> {
        instructions::treasury::sell_tokens(ctx, amount)
    }

    /// Withdraw vested tokens and route sale proceeds through the
    /// penalty ledger
    pub fn sell_and_repay_debt(
        ctx: Context<SellAndRepayDebt>,
        amount_to_sell: u64,
        sale_proceeds: u64,
    ) -> Result<()> {
        instructions::treasury::sell_and_repay_debt(ctx, amount_to_sell, sale_proceeds)
    }

    /// Burn treasury holdings against a milestone, recording any deficit
    ///
    /// Permissionless
    pub fn execute_treasury_buyback(
        ctx: Context<ExecuteTreasuryBuyback>,
        milestone_idx: u16,
    ) -> Result<()> {
        instructions::treasury::execute_treasury_buyback(ctx, milestone_idx)
    }

    /// Clear a recorded deficit by burning externally purchased tokens
    pub fn complete_treasury_buyback(
        ctx: Context<CompleteTreasuryBuyback>,
        milestone_idx: u16,
        tokens: u64,
    ) -> Result<()> {
        instructions::treasury::complete_treasury_buyback(ctx, milestone_idx, tokens)
    }
}
