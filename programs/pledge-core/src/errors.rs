use anchor_lang::prelude::*;

#[error_code]
pub enum PledgeError {
    #[msg("Signer is not authorized for this operation")]
    Unauthorized,

    #[msg("Allocations must sum exactly to the total supply")]
    AllocationMismatch,

    #[msg("Token account mint does not match the expected mint")]
    InvalidTokenMint,

    #[msg("Buyback schedule parameters are out of bounds")]
    InvalidSchedule,

    #[msg("Basis points value exceeds 10000")]
    InvalidBps,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Computed output is below the caller's minimum")]
    SlippageExceeded,

    #[msg("Pool reserves cannot cover this trade")]
    InsufficientLiquidity,

    #[msg("Creator may not acquire this token until the trading block expires")]
    TradingBlocked,

    #[msg("Milestone is already completed")]
    MilestoneAlreadyCompleted,

    #[msg("All scheduled milestones are already completed")]
    NoMilestonesRemaining,

    #[msg("Burn amount does not meet the milestone requirement")]
    InsufficientBurnAmount,

    #[msg("Milestone index does not match the current milestone")]
    InvalidMilestone,

    #[msg("Unlock interval has not elapsed since the last unlock")]
    UnlockIntervalNotElapsed,

    #[msg("Claim was already processed")]
    ClaimAlreadyProcessed,

    #[msg("Claim amount requires approval by the protocol authority")]
    ClaimAboveAutoThreshold,

    #[msg("Insurance pool balance cannot cover this payout")]
    InsufficientInsuranceFunds,

    #[msg("Borrowing this amount would exceed the creator's credit limit")]
    CreditLimitExceeded,

    #[msg("Platform vault has insufficient unlent capacity")]
    InsufficientCapacity,

    #[msg("Amount exceeds the vested unsold balance")]
    InsufficientVestedBalance,

    #[msg("Amount exceeds the treasury token balance")]
    InsufficientTreasuryBalance,

    #[msg("No outstanding balance to repay")]
    NothingOutstanding,

    #[msg("No deficit is recorded for this milestone")]
    DeficitNotRecorded,

    #[msg("Provided tokens do not cover the recorded deficit")]
    InsufficientDeficitTokens,
}
