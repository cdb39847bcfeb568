use anchor_lang::prelude::*;

use crate::errors::PledgeError;

/// Bridge loan rate: 5% APR
pub const LOAN_RATE_BPS: u64 = 500;

/// Punishment debt rate: 10% APR
pub const DEBT_RATE_BPS: u64 = 1_000;

pub const SECONDS_PER_YEAR: i64 = 31_536_000;

const BPS_DENOM: u64 = 10_000;

const SECONDS_PER_DAY: i64 = 86_400;

/// Simple non-compounding interest:
/// principal * rate_bps * elapsed / (10_000 * seconds-per-year)
pub fn simple_interest(principal: u64, rate_bps: u64, elapsed_seconds: i64) -> u64 {
    if principal == 0 || elapsed_seconds <= 0 {
        return 0;
    }
    let numerator = (principal as u128) * (rate_bps as u128) * (elapsed_seconds as u128);
    let denominator = (BPS_DENOM as u128) * (SECONDS_PER_YEAR as u128);
    (numerator / denominator) as u64
}

/// How one payment divided between interest and principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaymentSplit {
    pub interest_paid: u64,
    pub principal_paid: u64,
}

impl PaymentSplit {
    /// Total actually deducted from the payment; the rest stays with the payer
    pub fn deducted(&self) -> u64 {
        self.interest_paid + self.principal_paid
    }
}

/// Platform-wide lending capacity and aggregate penalty ledger
/// PDA seeds: [b"platform-vault"]
#[account]
#[derive(Default)]
pub struct PlatformVault {
    /// Lifetime lamports deposited as lendable capacity
    pub total_capacity: u64,

    /// Loan principal currently outstanding
    pub total_lent: u64,

    /// Interest collected across loans and penalty debt
    pub total_interest_earned: u64,

    /// Penalty principal currently outstanding across all creators
    pub total_debt_outstanding: u64,

    /// Loans issued or extended lifetime
    pub loans_issued: u64,

    /// Default events recorded lifetime
    pub defaults_recorded: u64,

    /// Unix timestamp when created
    pub created_at: i64,

    /// Bump for this vault PDA
    pub bump: u8,
}

impl PlatformVault {
    pub const SIZE: usize = 8 + // total_capacity
                            8 + // total_lent
                            8 + // total_interest_earned
                            8 + // total_debt_outstanding
                            8 + // loans_issued
                            8 + // defaults_recorded
                            8 + // created_at
                            1;  // bump

    /// Default per-creator loan principal ceiling: 500 SOL
    pub const DEFAULT_CREDIT_LIMIT: u64 = 500_000_000_000;

    /// Capacity not currently lent out
    pub fn available(&self) -> u64 {
        self.total_capacity.saturating_sub(self.total_lent)
    }

    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        self.total_capacity = self
            .total_capacity
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        Ok(())
    }

    pub fn record_borrow(&mut self, amount: u64) -> Result<()> {
        require!(amount <= self.available(), PledgeError::InsufficientCapacity);
        self.total_lent = self
            .total_lent
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        self.loans_issued = self.loans_issued.saturating_add(1);
        Ok(())
    }

    pub fn record_loan_payment(&mut self, split: &PaymentSplit) {
        self.total_lent = self.total_lent.saturating_sub(split.principal_paid);
        self.total_interest_earned = self.total_interest_earned.saturating_add(split.interest_paid);
    }

    pub fn record_debt_created(&mut self, amount: u64) -> Result<()> {
        self.total_debt_outstanding = self
            .total_debt_outstanding
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        self.defaults_recorded = self.defaults_recorded.saturating_add(1);
        Ok(())
    }

    pub fn record_debt_payment(&mut self, split: &PaymentSplit) {
        self.total_debt_outstanding = self.total_debt_outstanding.saturating_sub(split.principal_paid);
        self.total_interest_earned = self.total_interest_earned.saturating_add(split.interest_paid);
    }
}

/// One bridge loan tied to a buyback vault, at [`LOAN_RATE_BPS`]
/// PDA seeds: [b"loan", vault.as_ref()]
#[account]
#[derive(Default)]
pub struct Loan {
    /// Buyback vault this loan funded
    pub vault: Pubkey,

    /// Creator responsible for repayment
    pub creator: Pubkey,

    /// Outstanding principal
    pub principal: u64,

    /// Interest settled into this bucket when the principal last changed,
    /// not yet repaid; never itself accrues interest
    pub accrued_interest: u64,

    /// Accrual anchor for interest on the current principal
    pub updated_at: i64,

    /// Unix timestamp of the first draw
    pub started_at: i64,

    /// Lifetime repaid, interest and principal
    pub total_repaid: u64,

    /// Bump for this loan PDA
    pub bump: u8,
}

impl Loan {
    pub const SIZE: usize = 32 + // vault
                            32 + // creator
                            8 +  // principal
                            8 +  // accrued_interest
                            8 +  // updated_at
                            8 +  // started_at
                            8 +  // total_repaid
                            1;   // bump

    /// Interest owed as of `now`: the settled bucket plus accrual on the
    /// current principal since the anchor
    pub fn interest_due(&self, now: i64) -> u64 {
        self.accrued_interest
            .saturating_add(simple_interest(
                self.principal,
                LOAN_RATE_BPS,
                now.saturating_sub(self.updated_at),
            ))
    }

    pub fn total_owed(&self, now: i64) -> u64 {
        self.principal.saturating_add(self.interest_due(now))
    }

    /// Draws more principal, settling interest accrued so far into the
    /// bucket so the new principal accrues from `now`
    pub fn extend(&mut self, amount: u64, now: i64) -> Result<()> {
        self.accrued_interest = self.interest_due(now);
        if self.principal == 0 {
            self.started_at = now;
        }
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        self.updated_at = now;
        Ok(())
    }

    /// Applies a payment, interest before principal. Deducts at most what
    /// is owed; the split reports the actual deduction.
    pub fn apply_payment(&mut self, payment: u64, now: i64) -> Result<PaymentSplit> {
        let interest = self.interest_due(now);
        let interest_paid = payment.min(interest);
        let principal_paid = payment.saturating_sub(interest).min(self.principal);

        self.accrued_interest = interest - interest_paid;
        self.principal -= principal_paid;
        self.updated_at = now;
        let split = PaymentSplit {
            interest_paid,
            principal_paid,
        };
        self.total_repaid = self
            .total_repaid
            .checked_add(split.deducted())
            .ok_or(PledgeError::Overflow)?;
        Ok(split)
    }
}

/// Per-creator punishment debt and credit standing, at [`DEBT_RATE_BPS`]
/// PDA seeds: [b"creator-ledger", creator.as_ref()]
#[account]
#[derive(Default)]
pub struct CreatorLedger {
    /// Creator wallet this ledger belongs to
    pub creator: Pubkey,

    /// Loan principal ceiling for this creator's vault
    pub credit_limit: u64,

    /// Punishment principal outstanding
    pub debt_principal: u64,

    /// Interest settled when the principal last changed, not yet repaid
    pub debt_accrued_interest: u64,

    /// Accrual anchor for interest on the current principal
    pub debt_updated_at: i64,

    /// Timestamp of the default that opened the current debt, zero while clean
    pub debt_started_at: i64,

    /// Lifetime principal repaid
    pub total_debt_repaid: u64,

    /// Lifetime interest paid
    pub total_interest_paid: u64,

    /// Default events recorded against this creator
    pub defaults: u32,

    /// Bump for this ledger PDA
    pub bump: u8,
}

impl CreatorLedger {
    pub const SIZE: usize = 32 + // creator
                            8 +  // credit_limit
                            8 +  // debt_principal
                            8 +  // debt_accrued_interest
                            8 +  // debt_updated_at
                            8 +  // debt_started_at
                            8 +  // total_debt_repaid
                            8 +  // total_interest_paid
                            4 +  // defaults
                            1;   // bump

    /// Binds the ledger to its creator on first initialization. Later
    /// registrations reuse the ledger and leave the credit limit alone:
    /// an authority override, zero included, stays in force.
    pub fn open(&mut self, creator: Pubkey, bump: u8) {
        if self.creator == Pubkey::default() {
            self.credit_limit = PlatformVault::DEFAULT_CREDIT_LIMIT;
        }
        self.creator = creator;
        self.bump = bump;
    }

    pub fn interest_due(&self, now: i64) -> u64 {
        self.debt_accrued_interest
            .saturating_add(simple_interest(
                self.debt_principal,
                DEBT_RATE_BPS,
                now.saturating_sub(self.debt_updated_at),
            ))
    }

    pub fn total_owed(&self, now: i64) -> u64 {
        self.debt_principal.saturating_add(self.interest_due(now))
    }

    /// (principal, interest, total owed, days in debt) as of `now`
    pub fn debt_breakdown(&self, now: i64) -> (u64, u64, u64, u64) {
        let interest = self.interest_due(now);
        let days = if self.debt_started_at == 0 {
            0
        } else {
            now.saturating_sub(self.debt_started_at).max(0) / SECONDS_PER_DAY
        };
        (
            self.debt_principal,
            interest,
            self.debt_principal.saturating_add(interest),
            days as u64,
        )
    }

    /// A new loan draw must keep the vault's principal within the limit
    pub fn can_borrow(&self, outstanding_principal: u64, amount: u64) -> bool {
        outstanding_principal.saturating_add(amount) <= self.credit_limit
    }

    /// Opens or grows the punishment debt from a default event
    pub fn add_debt(&mut self, amount: u64, now: i64) -> Result<()> {
        self.debt_accrued_interest = self.interest_due(now);
        if self.debt_principal == 0 && self.debt_accrued_interest == 0 {
            self.debt_started_at = now;
        }
        self.debt_principal = self
            .debt_principal
            .checked_add(amount)
            .ok_or(PledgeError::Overflow)?;
        self.debt_updated_at = now;
        self.defaults = self.defaults.saturating_add(1);
        Ok(())
    }

    /// Applies a payment, interest before principal; a fully cleared ledger
    /// resets its debt clock
    pub fn apply_payment(&mut self, payment: u64, now: i64) -> Result<PaymentSplit> {
        let interest = self.interest_due(now);
        let interest_paid = payment.min(interest);
        let principal_paid = payment.saturating_sub(interest).min(self.debt_principal);

        self.debt_accrued_interest = interest - interest_paid;
        self.debt_principal -= principal_paid;
        self.debt_updated_at = now;
        if self.debt_principal == 0 && self.debt_accrued_interest == 0 {
            self.debt_started_at = 0;
        }
        self.total_debt_repaid = self
            .total_debt_repaid
            .checked_add(principal_paid)
            .ok_or(PledgeError::Overflow)?;
        self.total_interest_paid = self
            .total_interest_paid
            .checked_add(interest_paid)
            .ok_or(PledgeError::Overflow)?;
        Ok(PaymentSplit {
            interest_paid,
            principal_paid,
        })
    }
}

/// Seeds for PlatformVault PDA
pub const PLATFORM_VAULT_SEED: &[u8] = b"platform-vault";

/// Seeds for Loan PDA
pub const LOAN_SEED: &[u8] = b"loan";

/// Seeds for CreatorLedger PDA
pub const CREATOR_LEDGER_SEED: &[u8] = b"creator-ledger";

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    /// Arbitrary nonzero epoch; zero means "no debt" in the ledger
    const START: i64 = 1_700_000_000;

    fn ledger_with_debt(principal: u64) -> CreatorLedger {
        let mut ledger = CreatorLedger {
            credit_limit: PlatformVault::DEFAULT_CREDIT_LIMIT,
            ..CreatorLedger::default()
        };
        ledger.add_debt(principal, START).unwrap();
        ledger
    }

    #[test]
    fn interest_accrual_matches_apr() {
        // 100k at 10% APR
        assert_eq!(simple_interest(100_000, DEBT_RATE_BPS, 30 * DAY), 821);
        assert_eq!(simple_interest(100_000, DEBT_RATE_BPS, 365 * DAY), 10_000);
        let thirty = simple_interest(100_000, DEBT_RATE_BPS, 30 * DAY);
        assert!((800..=850).contains(&thirty));
        let year = simple_interest(100_000, DEBT_RATE_BPS, 365 * DAY);
        assert!((9_900..=10_100).contains(&year));
    }

    #[test]
    fn interest_is_zero_for_empty_or_backwards_inputs() {
        assert_eq!(simple_interest(0, DEBT_RATE_BPS, 365 * DAY), 0);
        assert_eq!(simple_interest(100_000, DEBT_RATE_BPS, 0), 0);
        assert_eq!(simple_interest(100_000, DEBT_RATE_BPS, -60), 0);
    }

    #[test]
    fn queries_at_the_same_timestamp_are_idempotent() {
        let ledger = ledger_with_debt(100_000);
        let first = ledger.debt_breakdown(START + 90 * DAY);
        let second = ledger.debt_breakdown(START + 90 * DAY);
        assert_eq!(first, second);
        assert_eq!(first.3, 90); // days in debt
    }

    #[test]
    fn payment_covers_interest_before_principal() {
        let mut ledger = ledger_with_debt(100_000);
        let now = START + 30 * DAY;
        let interest = ledger.interest_due(now);
        assert_eq!(interest, 821);

        // paying exactly the interest leaves the principal untouched
        let split = ledger.apply_payment(interest, now).unwrap();
        assert_eq!(split.interest_paid, interest);
        assert_eq!(split.principal_paid, 0);
        assert_eq!(ledger.debt_principal, 100_000);
        assert_eq!(ledger.interest_due(now), 0);
    }

    #[test]
    fn overpayment_deducts_only_what_is_owed() {
        let mut ledger = ledger_with_debt(100_000);
        let now = START + 30 * DAY;
        let owed = ledger.total_owed(now);

        let split = ledger.apply_payment(owed + 5_000, now).unwrap();
        assert_eq!(split.deducted(), owed);
        assert_eq!(ledger.debt_principal, 0);
        assert_eq!(ledger.interest_due(now), 0);
        assert_eq!(ledger.debt_started_at, 0);
    }

    #[test]
    fn exact_payment_clears_the_ledger() {
        let mut ledger = ledger_with_debt(100_000);
        let now = START + 30 * DAY;
        let owed = ledger.total_owed(now);

        let split = ledger.apply_payment(owed, now).unwrap();
        assert_eq!(split.deducted(), owed);
        assert_eq!(ledger.total_owed(now), 0);
        assert_eq!(ledger.debt_principal, 0);
    }

    #[test]
    fn partial_payment_persists_reduced_balances() {
        let mut ledger = ledger_with_debt(100_000);
        let now = START + 30 * DAY;
        let split = ledger.apply_payment(50_000, now).unwrap();
        assert_eq!(split.interest_paid, 821);
        assert_eq!(split.principal_paid, 50_000 - 821);
        assert_eq!(ledger.debt_principal, 100_000 - (50_000 - 821));
        // the clock keeps running on the remainder
        assert!(ledger.interest_due(now + 30 * DAY) > 0);
        assert_eq!(ledger.debt_started_at, START);
    }

    #[test]
    fn growing_debt_does_not_compound_accrued_interest() {
        let mut ledger = ledger_with_debt(100_000);
        ledger.add_debt(100_000, START + 365 * DAY).unwrap();
        // year one interest on the first 100k is parked in the bucket
        assert_eq!(ledger.debt_accrued_interest, 10_000);
        assert_eq!(ledger.debt_principal, 200_000);
        assert_eq!(ledger.debt_started_at, START);
        // year two accrues on 200k principal only, not on the bucket
        assert_eq!(ledger.interest_due(START + 2 * 365 * DAY), 10_000 + 20_000);
    }

    #[test]
    fn loan_extension_settles_interest_first() {
        let mut loan = Loan::default();
        loan.extend(1_000_000, START).unwrap();
        assert_eq!(loan.started_at, START);
        loan.extend(1_000_000, START + 365 * DAY).unwrap();
        // 5% APR on the first million for one year
        assert_eq!(loan.accrued_interest, 50_000);
        assert_eq!(loan.principal, 2_000_000);
        assert_eq!(loan.total_owed(START + 365 * DAY), 2_050_000);
    }

    #[test]
    fn loan_repayment_interest_first_then_principal() {
        let mut loan = Loan::default();
        loan.extend(1_000_000, START).unwrap();
        let now = START + 365 * DAY;
        let split = loan.apply_payment(60_000, now).unwrap();
        assert_eq!(split.interest_paid, 50_000);
        assert_eq!(split.principal_paid, 10_000);
        assert_eq!(loan.principal, 990_000);
        assert_eq!(loan.total_repaid, 60_000);
    }

    #[test]
    fn empty_loan_record_accrues_nothing_before_first_draw() {
        // the record may exist well before any principal is drawn
        let mut loan = Loan::default();
        assert_eq!(loan.total_owed(START + 365 * DAY), 0);

        loan.extend(1_000_000, START + 365 * DAY).unwrap();
        // accrual anchors at the draw, not at record creation
        assert_eq!(loan.started_at, START + 365 * DAY);
        assert_eq!(loan.accrued_interest, 0);
        assert_eq!(loan.total_owed(START + 365 * DAY), 1_000_000);
    }

    #[test]
    fn credit_limit_bounds_new_draws() {
        let ledger = CreatorLedger {
            credit_limit: 1_000,
            ..CreatorLedger::default()
        };
        assert!(ledger.can_borrow(0, 1_000));
        assert!(ledger.can_borrow(400, 600));
        assert!(!ledger.can_borrow(400, 601));
    }

    #[test]
    fn credit_cutoff_survives_later_registrations() {
        let mut ledger = CreatorLedger::default();
        let creator = Pubkey::new_unique();
        ledger.open(creator, 251);
        assert_eq!(ledger.credit_limit, PlatformVault::DEFAULT_CREDIT_LIMIT);

        // the authority zeroes the line; registering another token
        // reopens the same per-creator ledger
        ledger.credit_limit = 0;
        ledger.open(creator, 251);
        assert_eq!(ledger.credit_limit, 0);
        assert!(!ledger.can_borrow(0, 1));
    }

    #[test]
    fn vault_capacity_is_enforced() {
        let mut vault = PlatformVault::default();
        vault.deposit(10_000).unwrap();
        vault.record_borrow(6_000).unwrap();
        assert_eq!(vault.available(), 4_000);
        assert_eq!(
            vault.record_borrow(4_001).unwrap_err(),
            PledgeError::InsufficientCapacity.into()
        );
        vault.record_loan_payment(&PaymentSplit {
            interest_paid: 50,
            principal_paid: 6_000,
        });
        assert_eq!(vault.total_lent, 0);
        assert_eq!(vault.total_interest_earned, 50);
    }
}
