use anchor_lang::prelude::*;

use crate::errors::PledgeError;

/// Platform-wide backstop funded by the swap fee skim
/// PDA seeds: [b"insurance-pool"]
#[account]
#[derive(Default)]
pub struct InsurancePool {
    /// Spendable lamports held on this PDA, excluding rent
    pub balance: u64,

    /// Lifetime fees collected from swaps and direct funding
    pub total_fees_collected: u64,

    /// Lifetime lamports paid out on claims
    pub total_claims_paid: u64,

    /// Claims submitted lifetime; doubles as the next claim id
    pub claims_submitted: u64,

    /// Claims approved lifetime (manual and auto)
    pub claims_approved: u64,

    /// Claims at or above this amount require the protocol authority
    pub approval_threshold: u64,

    /// Unix timestamp when created
    pub created_at: i64,

    /// Bump for this pool PDA
    pub bump: u8,
}

impl InsurancePool {
    pub const SIZE: usize = 8 + // balance
                            8 + // total_fees_collected
                            8 + // total_claims_paid
                            8 + // claims_submitted
                            8 + // claims_approved
                            8 + // approval_threshold
                            8 + // created_at
                            1;  // bump

    /// Default auto-approval threshold: 1 SOL
    pub const DEFAULT_APPROVAL_THRESHOLD: u64 = 1_000_000_000;

    pub fn has_sufficient_funds(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Claims strictly below the threshold skip manual approval
    pub fn can_auto_process(&self, amount: u64) -> bool {
        amount < self.approval_threshold
    }

    /// Credits a fee deposit or direct funding
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.balance = self.balance.checked_add(amount).ok_or(PledgeError::Overflow)?;
        self.total_fees_collected = self.total_fees_collected.saturating_add(amount);
        Ok(())
    }

    /// Debits an approved payout
    pub fn record_payout(&mut self, amount: u64) -> Result<()> {
        require!(
            self.has_sufficient_funds(amount),
            PledgeError::InsufficientInsuranceFunds
        );
        self.balance -= amount;
        self.total_claims_paid = self.total_claims_paid.saturating_add(amount);
        self.claims_approved = self.claims_approved.saturating_add(1);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Paid,
}

/// One cover request against the insurance pool
/// PDA seeds: [b"claim", id.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct Claim {
    /// Sequential id assigned at submission
    pub id: u64,

    /// Buyback vault the shortfall occurred on
    pub vault: Pubkey,

    /// Account paid when the claim resolves
    pub claimant: Pubkey,

    /// Requested payout in lamports
    pub amount: u64,

    /// Milestone index the claim refers to
    pub milestone: u16,

    pub status: ClaimStatus,

    /// Unix timestamp when submitted
    pub submitted_at: i64,

    /// Unix timestamp when paid, zero until then
    pub resolved_at: i64,

    /// Bump for this claim PDA
    pub bump: u8,
}

impl Claim {
    pub const SIZE: usize = 8 +  // id
                            32 + // vault
                            32 + // claimant
                            8 +  // amount
                            2 +  // milestone
                            1 +  // status
                            8 +  // submitted_at
                            8 +  // resolved_at
                            1;   // bump

    /// Moves a pending claim to approved; rejects reprocessing
    pub fn approve(&mut self) -> Result<()> {
        require!(
            self.status == ClaimStatus::Pending,
            PledgeError::ClaimAlreadyProcessed
        );
        self.status = ClaimStatus::Approved;
        Ok(())
    }

    /// Marks an approved claim paid
    pub fn mark_paid(&mut self, now: i64) -> Result<()> {
        require!(
            self.status == ClaimStatus::Approved,
            PledgeError::ClaimAlreadyProcessed
        );
        self.status = ClaimStatus::Paid;
        self.resolved_at = now;
        Ok(())
    }
}

/// Seeds for InsurancePool PDA
pub const INSURANCE_POOL_SEED: &[u8] = b"insurance-pool";

/// Seeds for Claim PDA
pub const CLAIM_SEED: &[u8] = b"claim";

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_pool(balance: u64, threshold: u64) -> InsurancePool {
        InsurancePool {
            balance,
            approval_threshold: threshold,
            ..InsurancePool::default()
        }
    }

    #[test]
    fn threshold_gates_auto_processing() {
        let pool = funded_pool(10_000_000, 1_000_000);
        assert!(pool.can_auto_process(999_999));
        assert!(!pool.can_auto_process(1_000_000));
        assert!(!pool.can_auto_process(1_000_001));
    }

    #[test]
    fn payout_requires_funds() {
        let mut pool = funded_pool(500, 1_000_000);
        assert_eq!(
            pool.record_payout(501).unwrap_err(),
            PledgeError::InsufficientInsuranceFunds.into()
        );
        pool.record_payout(500).unwrap();
        assert_eq!(pool.balance, 0);
        assert_eq!(pool.total_claims_paid, 500);
        assert_eq!(pool.claims_approved, 1);
    }

    #[test]
    fn fee_credits_accumulate() {
        let mut pool = funded_pool(0, 1_000_000);
        pool.credit(10).unwrap();
        pool.credit(25).unwrap();
        assert_eq!(pool.balance, 35);
        assert_eq!(pool.total_fees_collected, 35);
    }

    #[test]
    fn claim_cannot_be_processed_twice() {
        let mut claim = Claim::default();
        claim.approve().unwrap();
        claim.mark_paid(1_000).unwrap();
        assert_eq!(claim.status, ClaimStatus::Paid);
        assert_eq!(claim.resolved_at, 1_000);
        assert_eq!(
            claim.approve().unwrap_err(),
            PledgeError::ClaimAlreadyProcessed.into()
        );
        assert_eq!(
            claim.mark_paid(2_000).unwrap_err(),
            PledgeError::ClaimAlreadyProcessed.into()
        );
    }

    #[test]
    fn paying_before_approval_is_rejected() {
        let mut claim = Claim::default();
        assert_eq!(
            claim.mark_paid(1_000).unwrap_err(),
            PledgeError::ClaimAlreadyProcessed.into()
        );
    }
}
