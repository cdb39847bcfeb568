use anchor_lang::prelude::*;

use crate::errors::PledgeError;
use crate::state::TokenRegistry;

const BPS_DENOM: u64 = 10_000;

/// Default unlock interval: 30 days
pub const DEFAULT_UNLOCK_INTERVAL: i64 = 30 * 86_400;

/// One treasury-side repurchase obligation, satisfied from holdings
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreasuryMilestone {
    /// Unix deadline, mirrors the vault schedule
    pub deadline: i64,

    /// Tokens to burn for this milestone
    pub required_burn: u64,

    pub completed: bool,

    /// Tokens burned so far for this milestone
    pub burned: u64,

    /// Unmet portion reported to the automation layer, zero when none
    pub deficit: u64,

    /// Unix timestamp of completion, zero until then
    pub completed_at: i64,
}

impl TreasuryMilestone {
    pub const SIZE: usize = 8 + // deadline
                            8 + // required_burn
                            1 + // completed
                            8 + // burned
                            8 + // deficit
                            8;  // completed_at
}

/// What one unlock tick releases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockAmounts {
    /// Stays in the treasury as sellable balance
    pub creator: u64,

    /// Leaves the treasury to the platform beneficiary
    pub platform: u64,
}

/// Burn decision for one treasury buyback call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreasuryBuybackPlan {
    pub milestone: u16,

    /// Burned from treasury holdings now
    pub burn_now: u64,

    /// Outstanding after this burn; zero completes the milestone
    pub deficit_after: u64,
}

impl TreasuryBuybackPlan {
    pub fn completes(&self) -> bool {
        self.deficit_after == 0
    }
}

/// Vesting treasury holding the creator allocation under a dual unlock
/// schedule: a creator stream that vests in place and a platform stream
/// that is transferred out
/// PDA seeds: [b"treasury", token_mint.as_ref()]
#[account]
#[derive(Default)]
pub struct CreatorTreasury {
    /// Creator bound to this treasury
    pub creator: Pubkey,

    /// The SPL token mint held here
    pub token_mint: Pubkey,

    /// Receives the platform unlock stream
    pub platform_beneficiary: Pubkey,

    /// Allocation deposited at creation; unlock percentages apply to this
    pub total_allocation: u64,

    /// Tokens currently held (mirrors the treasury token account)
    pub token_balance: u64,

    /// Creator stream released lifetime
    pub creator_vested: u64,

    /// Creator stream sold or withdrawn lifetime
    pub creator_sold: u64,

    /// Platform stream transferred out lifetime
    pub platform_distributed: u64,

    /// Tokens burned through the treasury buyback path
    pub total_bought_back: u64,

    /// Lamports posted at creation, recorded for audit
    pub collateral_balance: u64,

    /// Creator stream lifetime ceiling, in basis points of the allocation
    pub creator_split_bps: u16,

    /// Platform stream lifetime ceiling, in basis points of the allocation
    pub platform_split_bps: u16,

    /// Creator stream release per unlock, in basis points
    pub creator_monthly_bps: u16,

    /// Platform stream release per unlock, in basis points
    pub platform_monthly_bps: u16,

    /// Seconds between unlocks
    pub unlock_interval: i64,

    /// Unix timestamp of the last unlock; creation time initially
    pub last_unlock_at: i64,

    /// Obligations satisfied from treasury holdings
    pub milestones: Vec<TreasuryMilestone>,

    /// Index of the first incomplete milestone
    pub current_milestone: u16,

    /// Unix timestamp when created
    pub created_at: i64,

    /// Bump for this treasury PDA
    pub bump: u8,
}

impl CreatorTreasury {
    pub fn space(milestone_count: usize) -> usize {
        8 +                                              // discriminator
        32 +                                             // creator
        32 +                                             // token_mint
        32 +                                             // platform_beneficiary
        8 +                                              // total_allocation
        8 +                                              // token_balance
        8 +                                              // creator_vested
        8 +                                              // creator_sold
        8 +                                              // platform_distributed
        8 +                                              // total_bought_back
        8 +                                              // collateral_balance
        2 + 2 + 2 + 2 +                                  // bps config
        8 +                                              // unlock_interval
        8 +                                              // last_unlock_at
        4 + milestone_count * TreasuryMilestone::SIZE +  // milestones
        2 +                                              // current_milestone
        8 +                                              // created_at
        1                                                // bump
    }

    /// Mirrors the vault schedule for this token
    pub fn build_schedule(registry: &TokenRegistry) -> Vec<TreasuryMilestone> {
        let count = registry.milestone_count();
        (0..count)
            .map(|i| TreasuryMilestone {
                deadline: registry.milestone_deadline(i as u16),
                required_burn: registry.buyback_amount_per_interval,
                ..TreasuryMilestone::default()
            })
            .collect()
    }

    pub fn validate_config(&self) -> Result<()> {
        let split_sum = self
            .creator_split_bps
            .checked_add(self.platform_split_bps)
            .ok_or(PledgeError::Overflow)?;
        require!(split_sum as u64 <= BPS_DENOM, PledgeError::InvalidBps);
        require!(
            self.creator_monthly_bps as u64 <= BPS_DENOM
                && self.platform_monthly_bps as u64 <= BPS_DENOM,
            PledgeError::InvalidBps
        );
        require!(self.unlock_interval > 0, PledgeError::InvalidSchedule);
        require!(self.total_allocation > 0, PledgeError::InvalidAmount);
        Ok(())
    }

    /// Creator stream lifetime ceiling in tokens
    pub fn creator_cap(&self) -> u64 {
        portion_of(self.total_allocation, self.creator_split_bps)
    }

    /// Platform stream lifetime ceiling in tokens
    pub fn platform_cap(&self) -> u64 {
        portion_of(self.total_allocation, self.platform_split_bps)
    }

    /// Vested and not yet sold
    pub fn sellable_balance(&self) -> u64 {
        self.creator_vested.saturating_sub(self.creator_sold)
    }

    /// Amounts due for the next unlock; rejects until one full interval
    /// has elapsed since the last one
    pub fn plan_unlock(&self, now: i64) -> Result<UnlockAmounts> {
        require!(
            now >= self.last_unlock_at.saturating_add(self.unlock_interval),
            PledgeError::UnlockIntervalNotElapsed
        );
        let creator = portion_of(self.total_allocation, self.creator_monthly_bps)
            .min(self.creator_cap().saturating_sub(self.creator_vested));
        let platform = portion_of(self.total_allocation, self.platform_monthly_bps)
            .min(self.platform_cap().saturating_sub(self.platform_distributed))
            .min(self.token_balance);
        Ok(UnlockAmounts { creator, platform })
    }

    /// Commits an unlock; the platform amount leaves the balance
    pub fn record_unlock(&mut self, amounts: UnlockAmounts, now: i64) -> Result<()> {
        self.creator_vested = self
            .creator_vested
            .checked_add(amounts.creator)
            .ok_or(PledgeError::Overflow)?;
        self.platform_distributed = self
            .platform_distributed
            .checked_add(amounts.platform)
            .ok_or(PledgeError::Overflow)?;
        self.token_balance = self
            .token_balance
            .checked_sub(amounts.platform)
            .ok_or(PledgeError::Overflow)?;
        self.last_unlock_at = now;
        Ok(())
    }

    /// Debits a creator sale from the vested balance
    pub fn record_sale(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, PledgeError::InvalidAmount);
        require!(
            amount <= self.sellable_balance(),
            PledgeError::InsufficientVestedBalance
        );
        require!(
            amount <= self.token_balance,
            PledgeError::InsufficientTreasuryBalance
        );
        self.creator_sold = self
            .creator_sold
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        self.token_balance -= amount;
        Ok(())
    }

    /// Burn decision for milestone `idx`: burn what holdings cover and
    /// report the rest as a deficit instead of failing
    pub fn plan_buyback(&self, idx: u16) -> Result<TreasuryBuybackPlan> {
        require!(idx == self.current_milestone, PledgeError::InvalidMilestone);
        let milestone = self
            .milestones
            .get(idx as usize)
            .ok_or(PledgeError::InvalidMilestone)?;
        require!(!milestone.completed, PledgeError::MilestoneAlreadyCompleted);
        let remaining = if milestone.deficit > 0 {
            milestone.deficit
        } else {
            milestone.required_burn
        };
        let burn_now = remaining.min(self.token_balance);
        Ok(TreasuryBuybackPlan {
            milestone: idx,
            burn_now,
            deficit_after: remaining - burn_now,
        })
    }

    /// Commits a buyback plan; either completes the milestone or records
    /// the open deficit
    pub fn record_buyback(&mut self, plan: &TreasuryBuybackPlan, now: i64) -> Result<()> {
        self.token_balance = self
            .token_balance
            .checked_sub(plan.burn_now)
            .ok_or(PledgeError::Overflow)?;
        self.total_bought_back = self.total_bought_back.saturating_add(plan.burn_now);

        let milestone = self
            .milestones
            .get_mut(plan.milestone as usize)
            .ok_or(PledgeError::InvalidMilestone)?;
        milestone.burned = milestone
            .burned
            .checked_add(plan.burn_now)
            .ok_or(PledgeError::Overflow)?;
        if plan.completes() {
            milestone.deficit = 0;
            milestone.completed = true;
            milestone.completed_at = now;
            self.current_milestone = plan
                .milestone
                .checked_add(1)
                .ok_or(PledgeError::Overflow)?;
        } else {
            milestone.deficit = plan.deficit_after;
        }
        Ok(())
    }

    /// Clears a recorded deficit with externally purchased tokens
    pub fn record_deficit_completion(&mut self, idx: u16, tokens: u64, now: i64) -> Result<()> {
        require!(idx == self.current_milestone, PledgeError::InvalidMilestone);
        let milestone = self
            .milestones
            .get_mut(idx as usize)
            .ok_or(PledgeError::InvalidMilestone)?;
        require!(!milestone.completed, PledgeError::MilestoneAlreadyCompleted);
        require!(milestone.deficit > 0, PledgeError::DeficitNotRecorded);
        require!(
            tokens >= milestone.deficit,
            PledgeError::InsufficientDeficitTokens
        );
        milestone.burned = milestone
            .burned
            .checked_add(tokens)
            .ok_or(PledgeError::Overflow)?;
        milestone.deficit = 0;
        milestone.completed = true;
        milestone.completed_at = now;
        self.total_bought_back = self.total_bought_back.saturating_add(tokens);
        self.current_milestone = idx.checked_add(1).ok_or(PledgeError::Overflow)?;
        Ok(())
    }
}

fn portion_of(total: u64, bps: u16) -> u64 {
    ((total as u128 * bps as u128) / BPS_DENOM as u128) as u64
}

/// Treasury creation arguments, passed as one struct to keep the
/// instruction signature flat
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct TreasuryParams {
    pub platform_beneficiary: Pubkey,
    pub platform_split_bps: u16,
    pub platform_monthly_bps: u16,
    /// Defaults to the registry's vesting cap when omitted
    pub creator_split_bps: Option<u16>,
    /// Defaults to the registry's monthly vesting rate when omitted
    pub creator_monthly_bps: Option<u16>,
    pub unlock_interval: Option<i64>,
    /// Lamports posted alongside the token deposit, zero for none
    pub collateral: u64,
}

/// Seeds for CreatorTreasury PDA
pub const CREATOR_TREASURY_SEED: &[u8] = b"treasury";

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    const START: i64 = 1_700_000_000;

    fn test_treasury() -> CreatorTreasury {
        CreatorTreasury {
            total_allocation: 3_000_000,
            token_balance: 3_000_000,
            creator_split_bps: 5_000,   // cap 1.5M
            platform_split_bps: 3_000,  // cap 900k
            creator_monthly_bps: 500,   // 150k per tick
            platform_monthly_bps: 300,  // 90k per tick
            unlock_interval: DEFAULT_UNLOCK_INTERVAL,
            last_unlock_at: START,
            created_at: START,
            milestones: vec![
                TreasuryMilestone {
                    deadline: START + 30 * DAY,
                    required_burn: 50_000,
                    ..TreasuryMilestone::default()
                },
                TreasuryMilestone {
                    deadline: START + 60 * DAY,
                    required_burn: 50_000,
                    ..TreasuryMilestone::default()
                },
            ],
            ..CreatorTreasury::default()
        }
    }

    #[test]
    fn unlock_rejects_until_a_full_interval_elapses() {
        let treasury = test_treasury();
        let early = START + DEFAULT_UNLOCK_INTERVAL - 1;
        assert_eq!(
            treasury.plan_unlock(early).unwrap_err(),
            PledgeError::UnlockIntervalNotElapsed.into()
        );
        // exactly at the boundary is allowed
        let amounts = treasury.plan_unlock(START + DEFAULT_UNLOCK_INTERVAL).unwrap();
        assert_eq!(amounts.creator, 150_000);
        assert_eq!(amounts.platform, 90_000);
    }

    #[test]
    fn unlock_moves_the_two_streams_differently() {
        let mut treasury = test_treasury();
        let now = START + DEFAULT_UNLOCK_INTERVAL;
        let amounts = treasury.plan_unlock(now).unwrap();
        treasury.record_unlock(amounts, now).unwrap();

        // creator stream vests in place, platform stream leaves
        assert_eq!(treasury.creator_vested, 150_000);
        assert_eq!(treasury.platform_distributed, 90_000);
        assert_eq!(treasury.token_balance, 3_000_000 - 90_000);
        assert_eq!(treasury.sellable_balance(), 150_000);
        assert_eq!(treasury.last_unlock_at, now);

        // and the next tick needs a fresh interval
        assert!(treasury.plan_unlock(now + 1).is_err());
    }

    #[test]
    fn streams_stop_silently_at_their_caps() {
        let mut treasury = test_treasury();
        treasury.creator_vested = 1_400_000; // cap 1.5M, one short tick left
        treasury.platform_distributed = 900_000; // platform cap reached

        let now = START + DEFAULT_UNLOCK_INTERVAL;
        let amounts = treasury.plan_unlock(now).unwrap();
        assert_eq!(amounts.creator, 100_000);
        assert_eq!(amounts.platform, 0);
        treasury.record_unlock(amounts, now).unwrap();

        let next = treasury.plan_unlock(now + DEFAULT_UNLOCK_INTERVAL).unwrap();
        assert_eq!(next.creator, 0);
        assert_eq!(next.platform, 0);
    }

    #[test]
    fn sales_are_bounded_by_vested_and_held_balances() {
        let mut treasury = test_treasury();
        treasury.creator_vested = 200_000;

        assert_eq!(
            treasury.record_sale(200_001).unwrap_err(),
            PledgeError::InsufficientVestedBalance.into()
        );
        treasury.record_sale(120_000).unwrap();
        assert_eq!(treasury.sellable_balance(), 80_000);
        assert_eq!(treasury.token_balance, 2_880_000);

        // an emptied treasury cannot cover even vested tokens
        treasury.token_balance = 10_000;
        assert_eq!(
            treasury.record_sale(80_000).unwrap_err(),
            PledgeError::InsufficientTreasuryBalance.into()
        );
    }

    #[test]
    fn buyback_with_full_holdings_completes_the_milestone() {
        let mut treasury = test_treasury();
        let plan = treasury.plan_buyback(0).unwrap();
        assert_eq!(plan.burn_now, 50_000);
        assert!(plan.completes());

        treasury.record_buyback(&plan, START + DAY).unwrap();
        assert!(treasury.milestones[0].completed);
        assert_eq!(treasury.current_milestone, 1);
        assert_eq!(treasury.token_balance, 2_950_000);
        assert_eq!(treasury.total_bought_back, 50_000);
    }

    #[test]
    fn buyback_shortfall_reports_a_deficit_instead_of_failing() {
        let mut treasury = test_treasury();
        treasury.token_balance = 30_000;

        let plan = treasury.plan_buyback(0).unwrap();
        assert_eq!(plan.burn_now, 30_000);
        assert_eq!(plan.deficit_after, 20_000);
        treasury.record_buyback(&plan, START + DAY).unwrap();

        let milestone = &treasury.milestones[0];
        assert!(!milestone.completed);
        assert_eq!(milestone.deficit, 20_000);
        assert_eq!(milestone.burned, 30_000);
        assert_eq!(treasury.token_balance, 0);
        assert_eq!(treasury.current_milestone, 0);
    }

    #[test]
    fn deficit_is_cleared_with_purchased_tokens() {
        let mut treasury = test_treasury();
        treasury.token_balance = 30_000;
        let plan = treasury.plan_buyback(0).unwrap();
        treasury.record_buyback(&plan, START + DAY).unwrap();

        assert_eq!(
            treasury
                .record_deficit_completion(0, 19_999, START + 2 * DAY)
                .unwrap_err(),
            PledgeError::InsufficientDeficitTokens.into()
        );
        treasury
            .record_deficit_completion(0, 20_000, START + 2 * DAY)
            .unwrap();
        let milestone = &treasury.milestones[0];
        assert!(milestone.completed);
        assert_eq!(milestone.burned, 50_000);
        assert_eq!(treasury.current_milestone, 1);
        assert_eq!(treasury.total_bought_back, 50_000);
    }

    #[test]
    fn completion_without_a_deficit_is_rejected() {
        let mut treasury = test_treasury();
        assert_eq!(
            treasury
                .record_deficit_completion(0, 50_000, START + DAY)
                .unwrap_err(),
            PledgeError::DeficitNotRecorded.into()
        );
    }

    #[test]
    fn buyback_on_a_stale_index_is_rejected() {
        let mut treasury = test_treasury();
        let plan = treasury.plan_buyback(0).unwrap();
        treasury.record_buyback(&plan, START + DAY).unwrap();

        assert_eq!(
            treasury.plan_buyback(0).unwrap_err(),
            PledgeError::InvalidMilestone.into()
        );
        assert!(treasury.plan_buyback(1).is_ok());
    }

    #[test]
    fn partial_burn_then_regrown_balance_finishes_the_milestone() {
        let mut treasury = test_treasury();
        treasury.token_balance = 30_000;
        let first = treasury.plan_buyback(0).unwrap();
        treasury.record_buyback(&first, START + DAY).unwrap();

        // balance regrows (e.g. after an unlock elsewhere); retry burns the rest
        treasury.token_balance = 25_000;
        let second = treasury.plan_buyback(0).unwrap();
        assert_eq!(second.burn_now, 20_000);
        assert!(second.completes());
        treasury.record_buyback(&second, START + 2 * DAY).unwrap();
        assert!(treasury.milestones[0].completed);
        assert_eq!(treasury.milestones[0].burned, 50_000);
        assert_eq!(treasury.token_balance, 5_000);
    }

    #[test]
    fn config_validation_bounds_the_splits() {
        let mut treasury = test_treasury();
        assert!(treasury.validate_config().is_ok());
        treasury.creator_split_bps = 7_001;
        treasury.platform_split_bps = 3_000;
        assert_eq!(
            treasury.validate_config().unwrap_err(),
            PledgeError::InvalidBps.into()
        );
        treasury.creator_split_bps = 7_000;
        assert!(treasury.validate_config().is_ok());
        treasury.unlock_interval = 0;
        assert_eq!(
            treasury.validate_config().unwrap_err(),
            PledgeError::InvalidSchedule.into()
        );
    }
}
