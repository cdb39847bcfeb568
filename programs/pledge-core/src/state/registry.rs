use anchor_lang::prelude::*;

use crate::errors::PledgeError;

/// Immutable record of a registered creator token: supply split, buyback
/// schedule and trading restrictions
/// PDA seeds: [b"registry", token_mint.as_ref()]
#[account]
#[derive(Default)]
pub struct TokenRegistry {
    /// The SPL token mint this registry describes
    pub token_mint: Pubkey,

    /// Creator wallet bound to this token
    pub creator: Pubkey,

    /// Total supply at issuance (smallest unit)
    pub total_supply: u64,

    /// Tokens reserved for the creator treasury
    pub creator_allocation: u64,

    /// Tokens reserved for the platform
    pub platform_allocation: u64,

    /// Tokens reserved for seeding the liquidity pool
    pub liquidity_allocation: u64,

    /// First buyback deadline falls one interval after this timestamp
    pub buyback_start: i64,

    /// No deadlines are scheduled past this timestamp
    pub buyback_end: i64,

    /// Seconds between consecutive buyback deadlines
    pub buyback_interval: i64,

    /// Tokens the creator must burn per interval
    pub buyback_amount_per_interval: u64,

    /// Until this timestamp the creator may not buy their own token
    pub trading_block_until: i64,

    /// Whether the creator treasury follows the vesting fields below
    pub vesting_enabled: bool,

    /// Monthly release of the creator allocation, in basis points
    pub vesting_monthly_bps: u16,

    /// Lifetime cap on released creator allocation, in basis points
    pub vesting_cap_bps: u16,

    /// Unix timestamp when registered
    pub created_at: i64,

    /// Bump for this registry PDA
    pub bump: u8,
}

impl TokenRegistry {
    pub const SIZE: usize = 32 + // token_mint
                            32 + // creator
                            8 +  // total_supply
                            8 +  // creator_allocation
                            8 +  // platform_allocation
                            8 +  // liquidity_allocation
                            8 +  // buyback_start
                            8 +  // buyback_end
                            8 +  // buyback_interval
                            8 +  // buyback_amount_per_interval
                            8 +  // trading_block_until
                            1 +  // vesting_enabled
                            2 +  // vesting_monthly_bps
                            2 +  // vesting_cap_bps
                            8 +  // created_at
                            1;   // bump

    /// Hard cap on scheduled deadlines per token
    pub const MAX_MILESTONES: i64 = 120;

    pub const MAX_BPS: u16 = 10_000;

    /// Checks the supply split and schedule at registration time
    pub fn validate(&self) -> Result<()> {
        require!(self.total_supply > 0, PledgeError::InvalidAmount);
        let allocated = self
            .creator_allocation
            .checked_add(self.platform_allocation)
            .and_then(|v| v.checked_add(self.liquidity_allocation))
            .ok_or(PledgeError::Overflow)?;
        require!(allocated == self.total_supply, PledgeError::AllocationMismatch);

        require!(self.buyback_interval > 0, PledgeError::InvalidSchedule);
        require!(self.buyback_end > self.buyback_start, PledgeError::InvalidSchedule);
        require!(self.buyback_amount_per_interval > 0, PledgeError::InvalidSchedule);
        let count = self.milestone_count();
        require!(
            count >= 1 && count <= Self::MAX_MILESTONES,
            PledgeError::InvalidSchedule
        );

        require!(
            self.vesting_monthly_bps <= Self::MAX_BPS && self.vesting_cap_bps <= Self::MAX_BPS,
            PledgeError::InvalidBps
        );
        Ok(())
    }

    /// Number of deadlines that fit between start and end. Saturates on
    /// absurd bounds, which lands outside the validated range.
    pub fn milestone_count(&self) -> i64 {
        if self.buyback_interval <= 0 || self.buyback_end <= self.buyback_start {
            return 0;
        }
        self.buyback_end.saturating_sub(self.buyback_start) / self.buyback_interval
    }

    /// Deadline of milestone `idx` (zero-based)
    pub fn milestone_deadline(&self, idx: u16) -> i64 {
        self.buyback_start
            .saturating_add(self.buyback_interval.saturating_mul(idx as i64 + 1))
    }

    /// The creator may not acquire their own token before the block expires
    pub fn creator_trading_blocked(&self, wallet: &Pubkey, now: i64) -> bool {
        *wallet == self.creator && now < self.trading_block_until
    }
}

/// Registration arguments, passed as one struct to keep the instruction
/// signature flat
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct RegistryParams {
    pub total_supply: u64,
    pub creator_allocation: u64,
    pub platform_allocation: u64,
    pub liquidity_allocation: u64,
    pub buyback_start: i64,
    pub buyback_end: i64,
    pub buyback_interval: i64,
    pub buyback_amount_per_interval: u64,
    pub trading_block_until: i64,
    pub vesting_enabled: bool,
    pub vesting_monthly_bps: Option<u16>,
    pub vesting_cap_bps: Option<u16>,
}

/// Default monthly vesting release: 5%
pub const DEFAULT_VESTING_MONTHLY_BPS: u16 = 500;

/// Default lifetime vesting cap: 50%
pub const DEFAULT_VESTING_CAP_BPS: u16 = 5_000;

/// Seeds for TokenRegistry PDA
pub const TOKEN_REGISTRY_SEED: &[u8] = b"registry";

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn base_registry() -> TokenRegistry {
        TokenRegistry {
            total_supply: 10_000_000,
            creator_allocation: 3_000_000,
            platform_allocation: 3_000_000,
            liquidity_allocation: 4_000_000,
            buyback_start: 1_000,
            buyback_end: 1_000 + 12 * 30 * DAY,
            buyback_interval: 30 * DAY,
            buyback_amount_per_interval: 50_000,
            trading_block_until: 1_000 + 90 * DAY,
            ..TokenRegistry::default()
        }
    }

    #[test]
    fn allocations_must_cover_supply() {
        let mut reg = base_registry();
        reg.liquidity_allocation = 3_000_000; // 3+3+3 of 10M
        assert!(reg.validate().is_err());

        reg.liquidity_allocation = 4_000_000; // 3+3+4 of 10M
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn allocation_sum_overflow_is_rejected() {
        let mut reg = base_registry();
        reg.creator_allocation = u64::MAX;
        reg.platform_allocation = u64::MAX;
        assert!(reg.validate().is_err());
    }

    #[test]
    fn schedule_produces_expected_deadlines() {
        let reg = base_registry();
        assert_eq!(reg.milestone_count(), 12);
        assert_eq!(reg.milestone_deadline(0), 1_000 + 30 * DAY);
        assert_eq!(reg.milestone_deadline(11), reg.buyback_end);
    }

    #[test]
    fn partial_trailing_interval_is_dropped() {
        let mut reg = base_registry();
        reg.buyback_end = reg.buyback_start + 3 * reg.buyback_interval + DAY;
        assert_eq!(reg.milestone_count(), 3);
    }

    #[test]
    fn degenerate_schedules_are_rejected() {
        let mut reg = base_registry();
        reg.buyback_interval = 0;
        assert!(reg.validate().is_err());

        let mut reg = base_registry();
        reg.buyback_end = reg.buyback_start;
        assert!(reg.validate().is_err());

        let mut reg = base_registry();
        reg.buyback_interval = DAY;
        reg.buyback_end = reg.buyback_start + 200 * DAY; // 200 deadlines
        assert!(reg.validate().is_err());

        let mut reg = base_registry();
        reg.buyback_amount_per_interval = 0;
        assert!(reg.validate().is_err());
    }

    #[test]
    fn extreme_schedule_bounds_fail_without_panicking() {
        // span wider than i64 arithmetic; must reject, not overflow
        let mut reg = base_registry();
        reg.buyback_start = i64::MIN;
        reg.buyback_end = i64::MAX;
        assert_eq!(
            reg.validate().unwrap_err(),
            PledgeError::InvalidSchedule.into()
        );
    }

    #[test]
    fn trading_block_applies_to_creator_only() {
        let creator = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let mut reg = base_registry();
        reg.creator = creator;

        let before = reg.trading_block_until - 1;
        let after = reg.trading_block_until;
        assert!(reg.creator_trading_blocked(&creator, before));
        assert!(!reg.creator_trading_blocked(&creator, after));
        assert!(!reg.creator_trading_blocked(&other, before));
    }
}
