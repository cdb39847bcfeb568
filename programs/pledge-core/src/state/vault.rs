use anchor_lang::prelude::*;

use crate::errors::PledgeError;
use crate::state::{LiquidityPool, TokenRegistry};

/// One scheduled repurchase obligation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Milestone {
    /// Unix deadline for the required burn
    pub deadline: i64,

    /// Tokens that must be burned by the deadline
    pub required_burn: u64,

    pub completed: bool,

    /// True when enforcement completed it instead of the creator
    pub forced: bool,

    /// Unix timestamp of completion, zero until then
    pub completed_at: i64,

    /// Tokens actually burned for this milestone
    pub burned: u64,
}

impl Milestone {
    pub const SIZE: usize = 8 + // deadline
                            8 + // required_burn
                            1 + // completed
                            1 + // forced
                            8 + // completed_at
                            8;  // burned
}

/// Audit entry for one enforcement spend
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebtRecord {
    /// Milestone index the spend covered
    pub milestone: u16,

    /// Lamports spent acquiring the burn amount
    pub base_spent: u64,

    /// Tokens bought and burned
    pub tokens_bought: u64,

    pub timestamp: i64,
}

impl DebtRecord {
    pub const SIZE: usize = 2 + // milestone
                            8 + // base_spent
                            8 + // tokens_bought
                            8;  // timestamp
}

/// Funding breakdown for one forced milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnforcementPlan {
    /// Milestone index being forced
    pub milestone: u16,

    /// Tokens that must be acquired and burned
    pub required_burn: u64,

    /// Quoted base cost of the acquisition
    pub cost: u64,

    /// Portion funded from posted collateral
    pub from_collateral: u64,

    /// Shortfall to be covered by a platform loan
    pub borrowed: u64,
}

/// Milestone schedule and collateral for one creator's buyback commitment;
/// collateral lamports live on this PDA above rent
/// PDA seeds: [b"buyback-vault", token_mint.as_ref()]
#[account]
#[derive(Default)]
pub struct BuybackVault {
    /// Creator bound to this vault
    pub creator: Pubkey,

    /// The SPL token mint under commitment
    pub token_mint: Pubkey,

    /// Scheduled obligations, in deadline order
    pub milestones: Vec<Milestone>,

    /// Index of the first incomplete milestone
    pub current_milestone: u16,

    /// Lamports posted by the creator, spendable only by enforcement
    pub collateral_balance: u64,

    /// Lifetime lamports spent by enforcement on this vault
    pub total_debt: u64,

    /// One entry per forced milestone
    pub debt_records: Vec<DebtRecord>,

    /// Sticky once any milestone is forced
    pub defaulted: bool,

    /// Unix timestamp when created
    pub created_at: i64,

    /// Bump for this vault PDA
    pub bump: u8,
}

impl BuybackVault {
    /// Account size for a schedule of `milestone_count` entries, leaving
    /// room for one debt record per milestone
    pub fn space(milestone_count: usize) -> usize {
        8 +                                          // discriminator
        32 +                                         // creator
        32 +                                         // token_mint
        4 + milestone_count * Milestone::SIZE +      // milestones
        2 +                                          // current_milestone
        8 +                                          // collateral_balance
        8 +                                          // total_debt
        4 + milestone_count * DebtRecord::SIZE +     // debt_records
        1 +                                          // defaulted
        8 +                                          // created_at
        1                                            // bump
    }

    /// Expands a registry's interval schedule into concrete milestones
    pub fn build_schedule(registry: &TokenRegistry) -> Vec<Milestone> {
        let count = registry.milestone_count();
        (0..count)
            .map(|i| Milestone {
                deadline: registry.milestone_deadline(i as u16),
                required_burn: registry.buyback_amount_per_interval,
                ..Milestone::default()
            })
            .collect()
    }

    pub fn current(&self) -> Option<&Milestone> {
        self.milestones.get(self.current_milestone as usize)
    }

    pub fn remaining_milestones(&self) -> u16 {
        (self.milestones.len() as u16).saturating_sub(self.current_milestone)
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.current().map(|m| m.deadline)
    }

    pub fn add_collateral(&mut self, amount: u64) -> Result<()> {
        self.collateral_balance = self
            .collateral_balance
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        Ok(())
    }

    /// Voluntary completion of the current milestone by the creator.
    /// Returns the index completed.
    pub fn record_buyback(&mut self, tokens_burned: u64, now: i64) -> Result<u16> {
        let idx = self.current_milestone;
        let milestone = self
            .milestones
            .get_mut(idx as usize)
            .ok_or(PledgeError::NoMilestonesRemaining)?;
        require!(!milestone.completed, PledgeError::MilestoneAlreadyCompleted);
        require!(
            tokens_burned >= milestone.required_burn,
            PledgeError::InsufficientBurnAmount
        );
        milestone.completed = true;
        milestone.completed_at = now;
        milestone.burned = tokens_burned;
        self.current_milestone = idx.checked_add(1).ok_or(PledgeError::Overflow)?;
        Ok(idx)
    }

    /// Enforcement decision for the current milestone. `None` means there
    /// is nothing to do: the schedule is exhausted, the milestone is
    /// completed, or its deadline has not passed.
    pub fn plan_enforcement(
        &self,
        pool: &LiquidityPool,
        now: i64,
    ) -> Result<Option<EnforcementPlan>> {
        let idx = self.current_milestone;
        let Some(milestone) = self.milestones.get(idx as usize) else {
            return Ok(None);
        };
        if milestone.completed || now <= milestone.deadline {
            return Ok(None);
        }
        let cost = pool.base_in_for_token_out(milestone.required_burn)?;
        let from_collateral = cost.min(self.collateral_balance);
        let borrowed = cost - from_collateral;
        Ok(Some(EnforcementPlan {
            milestone: idx,
            required_burn: milestone.required_burn,
            cost,
            from_collateral,
            borrowed,
        }))
    }

    /// Commits an executed enforcement plan: marks the milestone forced,
    /// consumes collateral, books the spend and flags the vault
    pub fn record_enforcement(
        &mut self,
        plan: &EnforcementPlan,
        tokens_bought: u64,
        now: i64,
    ) -> Result<()> {
        let milestone = self
            .milestones
            .get_mut(plan.milestone as usize)
            .ok_or(PledgeError::InvalidMilestone)?;
        require!(!milestone.completed, PledgeError::MilestoneAlreadyCompleted);
        milestone.completed = true;
        milestone.forced = true;
        milestone.completed_at = now;
        milestone.burned = tokens_bought;

        self.current_milestone = plan
            .milestone
            .checked_add(1)
            .ok_or(PledgeError::Overflow)?;
        self.collateral_balance = self
            .collateral_balance
            .checked_sub(plan.from_collateral)
            .ok_or(PledgeError::Overflow)?;
        self.total_debt = self
            .total_debt
            .checked_add(plan.cost)
            .ok_or(PledgeError::Overflow)?;
        self.debt_records.push(DebtRecord {
            milestone: plan.milestone,
            base_spent: plan.cost,
            tokens_bought,
            timestamp: now,
        });
        self.defaulted = true;
        Ok(())
    }
}

/// Seeds for BuybackVault PDA
pub const BUYBACK_VAULT_SEED: &[u8] = b"buyback-vault";

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    const START: i64 = 1_700_000_000;

    fn test_registry() -> TokenRegistry {
        TokenRegistry {
            total_supply: 10_000_000,
            creator_allocation: 3_000_000,
            platform_allocation: 3_000_000,
            liquidity_allocation: 4_000_000,
            buyback_start: START,
            buyback_end: START + 6 * 30 * DAY,
            buyback_interval: 30 * DAY,
            buyback_amount_per_interval: 50_000,
            ..TokenRegistry::default()
        }
    }

    fn test_vault(collateral: u64) -> BuybackVault {
        BuybackVault {
            milestones: BuybackVault::build_schedule(&test_registry()),
            collateral_balance: collateral,
            created_at: START,
            ..BuybackVault::default()
        }
    }

    fn test_pool() -> LiquidityPool {
        let mut pool = LiquidityPool::default();
        pool.apply_add_liquidity(2_000_000_000, 4_000_000).unwrap();
        pool
    }

    #[test]
    fn schedule_matches_registry() {
        let vault = test_vault(0);
        assert_eq!(vault.milestones.len(), 6);
        assert_eq!(vault.milestones[0].deadline, START + 30 * DAY);
        assert_eq!(vault.milestones[5].deadline, START + 180 * DAY);
        assert!(vault.milestones.iter().all(|m| m.required_burn == 50_000));
        assert_eq!(vault.remaining_milestones(), 6);
    }

    #[test]
    fn voluntary_buyback_advances_the_index() {
        let mut vault = test_vault(0);
        let now = START + 10 * DAY;
        let idx = vault.record_buyback(50_000, now).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(vault.current_milestone, 1);
        let done = &vault.milestones[0];
        assert!(done.completed && !done.forced);
        assert_eq!(done.burned, 50_000);
        assert!(!vault.defaulted);
    }

    #[test]
    fn short_burn_is_rejected() {
        let mut vault = test_vault(0);
        assert_eq!(
            vault.record_buyback(49_999, START + DAY).unwrap_err(),
            PledgeError::InsufficientBurnAmount.into()
        );
        assert_eq!(vault.current_milestone, 0);
    }

    #[test]
    fn buyback_past_the_schedule_is_rejected() {
        let mut vault = test_vault(0);
        for i in 0..6 {
            vault.record_buyback(50_000, START + i * DAY).unwrap();
        }
        assert_eq!(
            vault.record_buyback(50_000, START + 200 * DAY).unwrap_err(),
            PledgeError::NoMilestonesRemaining.into()
        );
    }

    #[test]
    fn enforcement_before_the_deadline_is_a_no_op() {
        let vault = test_vault(1_000_000_000);
        let pool = test_pool();
        // at the deadline is still early; only strictly past it fires
        let deadline = vault.milestones[0].deadline;
        assert!(vault.plan_enforcement(&pool, deadline - 1).unwrap().is_none());
        assert!(vault.plan_enforcement(&pool, deadline).unwrap().is_none());
        assert!(vault.plan_enforcement(&pool, deadline + 1).unwrap().is_some());
    }

    #[test]
    fn enforcement_with_sufficient_collateral_spends_exactly_the_cost() {
        let mut vault = test_vault(1_000_000_000);
        let pool = test_pool();
        let now = vault.milestones[0].deadline + DAY;

        let plan = vault.plan_enforcement(&pool, now).unwrap().unwrap();
        let quoted = pool.base_in_for_token_out(50_000).unwrap();
        assert_eq!(plan.cost, quoted);
        assert_eq!(plan.from_collateral, quoted);
        assert_eq!(plan.borrowed, 0);

        vault.record_enforcement(&plan, 50_100, now).unwrap();
        assert_eq!(vault.current_milestone, 1);
        assert_eq!(vault.collateral_balance, 1_000_000_000 - quoted);
        assert_eq!(vault.total_debt, quoted);
        assert!(vault.defaulted);
        assert!(vault.milestones[0].forced);
        assert_eq!(vault.debt_records.len(), 1);
        assert_eq!(vault.debt_records[0].base_spent, quoted);
    }

    #[test]
    fn enforcement_with_insufficient_collateral_borrows_the_shortfall() {
        let collateral = 1_000_000;
        let mut vault = test_vault(collateral);
        let pool = test_pool();
        let now = vault.milestones[0].deadline + DAY;

        let plan = vault.plan_enforcement(&pool, now).unwrap().unwrap();
        assert!(plan.cost > collateral);
        assert_eq!(plan.from_collateral, collateral);
        assert_eq!(plan.borrowed, plan.cost - collateral);

        vault.record_enforcement(&plan, 50_000, now).unwrap();
        assert_eq!(vault.collateral_balance, 0);
        // the full cost is booked, not just the shortfall
        assert_eq!(vault.total_debt, plan.cost);
    }

    #[test]
    fn enforcement_after_the_schedule_is_a_no_op() {
        let mut vault = test_vault(1_000_000_000);
        let pool = test_pool();
        for i in 0..6 {
            vault.record_buyback(50_000, START + i * DAY).unwrap();
        }
        let way_past = START + 400 * DAY;
        assert!(vault.plan_enforcement(&pool, way_past).unwrap().is_none());
    }

    #[test]
    fn consecutive_defaults_accumulate() {
        let mut vault = test_vault(1_000_000_000);
        let mut pool = test_pool();
        let now = vault.milestones[1].deadline + DAY;

        let first = vault.plan_enforcement(&pool, now).unwrap().unwrap();
        pool.apply_swap_base_in(first.cost).unwrap();
        vault.record_enforcement(&first, 50_000, now).unwrap();

        let second = vault.plan_enforcement(&pool, now).unwrap().unwrap();
        assert_eq!(second.milestone, 1);
        // the first buy moved the price, the second costs more
        assert!(second.cost > first.cost);
        vault.record_enforcement(&second, 50_000, now).unwrap();
        assert_eq!(vault.current_milestone, 2);
        assert_eq!(vault.total_debt, first.cost + second.cost);
        assert_eq!(vault.debt_records.len(), 2);
    }
}
