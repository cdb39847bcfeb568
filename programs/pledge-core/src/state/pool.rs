use anchor_lang::prelude::*;

use crate::errors::PledgeError;

/// Total swap fee charged on input: 0.5%
pub const TOTAL_FEE_BPS: u64 = 50;

/// Portion of the fee retained in the reserves for providers: 0.4%
pub const LP_FEE_BPS: u64 = 40;

/// Portion of the fee forwarded to the insurance pool: 0.1%
pub const INSURANCE_FEE_BPS: u64 = 10;

pub const BPS_DENOM: u64 = 10_000;

/// Constant-product market pairing one creator token against the base
/// currency (lamports held on this PDA above rent)
/// PDA seeds: [b"liquidity-pool", token_mint.as_ref()]
#[account]
#[derive(Default)]
pub struct LiquidityPool {
    /// The SPL token mint traded in this pool
    pub token_mint: Pubkey,

    /// Mint for pool-share receipts; this PDA is its authority
    pub lp_mint: Pubkey,

    /// Token account holding the token side of the reserves
    pub token_vault: Pubkey,

    /// Lamports held for trading, excluding rent
    pub base_reserve: u64,

    /// Tokens held in the token vault
    pub token_reserve: u64,

    /// Outstanding pool-share supply (mirrors the lp mint supply)
    pub lp_supply: u64,

    /// Lifetime traded volume, base-denominated
    pub cumulative_volume: u64,

    /// Lifetime number of swaps
    pub swap_count: u64,

    /// Unix timestamp when created
    pub created_at: i64,

    /// Bump for this pool PDA
    pub bump: u8,
}

/// Result of applying one swap against the reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Amount owed to the trader
    pub amount_out: u64,

    /// Base-denominated skim owed to the insurance pool
    pub insurance_fee: u64,
}

/// Pro-rata entitlement for a share withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalAmounts {
    pub base_out: u64,
    pub token_out: u64,
}

impl LiquidityPool {
    pub const SIZE: usize = 32 + // token_mint
                            32 + // lp_mint
                            32 + // token_vault
                            8 +  // base_reserve
                            8 +  // token_reserve
                            8 +  // lp_supply
                            8 +  // cumulative_volume
                            8 +  // swap_count
                            8 +  // created_at
                            1;   // bump

    /// Tokens received for `base_in`, after the full 0.5% input fee
    pub fn quote_base_to_token(&self, base_in: u64) -> Result<u64> {
        require!(
            self.base_reserve > 0 && self.token_reserve > 0,
            PledgeError::InsufficientLiquidity
        );
        let after_fee = Self::deduct_fee(base_in, TOTAL_FEE_BPS)?;
        Self::curve_out(after_fee, self.base_reserve, self.token_reserve)
    }

    /// Base received for `token_in`, after the full 0.5% input fee
    pub fn quote_token_to_base(&self, token_in: u64) -> Result<u64> {
        require!(
            self.base_reserve > 0 && self.token_reserve > 0,
            PledgeError::InsufficientLiquidity
        );
        let after_fee = Self::deduct_fee(token_in, TOTAL_FEE_BPS)?;
        Self::curve_out(after_fee, self.token_reserve, self.base_reserve)
    }

    /// Base required to buy exactly `token_out`, fee included. Pairs with
    /// [`Self::apply_swap_base_in`], which is guaranteed to deliver at least
    /// `token_out` for the returned amount.
    pub fn base_in_for_token_out(&self, token_out: u64) -> Result<u64> {
        require!(token_out > 0, PledgeError::InvalidAmount);
        require!(
            self.base_reserve > 0 && token_out < self.token_reserve,
            PledgeError::InsufficientLiquidity
        );
        let numerator = (self.base_reserve as u128)
            .checked_mul(token_out as u128)
            .and_then(|v| v.checked_mul(BPS_DENOM as u128))
            .ok_or(PledgeError::Overflow)?;
        let denominator = ((self.token_reserve - token_out) as u128)
            .checked_mul((BPS_DENOM - TOTAL_FEE_BPS) as u128)
            .ok_or(PledgeError::Overflow)?;
        let amount_in = numerator
            .checked_div(denominator)
            .and_then(|v| v.checked_add(1))
            .ok_or(PledgeError::Overflow)?;
        u64::try_from(amount_in).map_err(|_| PledgeError::Overflow.into())
    }

    /// Executes a base-to-token swap against the reserves. The 0.1%
    /// insurance skim is carved out of the input; the rest enters the
    /// base reserve.
    pub fn apply_swap_base_in(&mut self, base_in: u64) -> Result<SwapOutcome> {
        let amount_out = self.quote_base_to_token(base_in)?;
        let insurance_fee = Self::fee_portion(base_in, INSURANCE_FEE_BPS)?;
        let retained = base_in
            .checked_sub(insurance_fee)
            .ok_or(PledgeError::Overflow)?;
        self.base_reserve = self
            .base_reserve
            .checked_add(retained)
            .ok_or(PledgeError::Overflow)?;
        self.token_reserve = self
            .token_reserve
            .checked_sub(amount_out)
            .ok_or(PledgeError::Overflow)?;
        self.record_volume(base_in);
        Ok(SwapOutcome {
            amount_out,
            insurance_fee,
        })
    }

    /// Executes a token-to-base swap. The trader receives the quote net of
    /// the full fee; the insurance skim is the base-denominated difference
    /// between the provider-fee-only output and the trader's output.
    pub fn apply_swap_token_in(&mut self, token_in: u64) -> Result<SwapOutcome> {
        let amount_out = self.quote_token_to_base(token_in)?;
        let after_lp_fee = Self::deduct_fee(token_in, LP_FEE_BPS)?;
        let gross_out = Self::curve_out(after_lp_fee, self.token_reserve, self.base_reserve)?;
        let insurance_fee = gross_out
            .checked_sub(amount_out)
            .ok_or(PledgeError::Overflow)?;
        self.base_reserve = self
            .base_reserve
            .checked_sub(gross_out)
            .ok_or(PledgeError::Overflow)?;
        self.token_reserve = self
            .token_reserve
            .checked_add(token_in)
            .ok_or(PledgeError::Overflow)?;
        self.record_volume(gross_out);
        Ok(SwapOutcome {
            amount_out,
            insurance_fee,
        })
    }

    /// Shares minted for a deposit; geometric mean on first deposit,
    /// pro-rata minimum afterwards
    pub fn shares_for_deposit(&self, base_in: u64, token_in: u64) -> Result<u64> {
        require!(base_in > 0 && token_in > 0, PledgeError::InvalidAmount);
        if self.lp_supply == 0 {
            let product = (base_in as u128)
                .checked_mul(token_in as u128)
                .ok_or(PledgeError::Overflow)?;
            let shares = isqrt(product);
            require!(shares > 0, PledgeError::InvalidAmount);
            return u64::try_from(shares).map_err(|_| PledgeError::Overflow.into());
        }
        require!(
            self.base_reserve > 0 && self.token_reserve > 0,
            PledgeError::InsufficientLiquidity
        );
        let by_base = (base_in as u128)
            .checked_mul(self.lp_supply as u128)
            .ok_or(PledgeError::Overflow)?
            / self.base_reserve as u128;
        let by_token = (token_in as u128)
            .checked_mul(self.lp_supply as u128)
            .ok_or(PledgeError::Overflow)?
            / self.token_reserve as u128;
        let shares = by_base.min(by_token);
        require!(shares > 0, PledgeError::InvalidAmount);
        u64::try_from(shares).map_err(|_| PledgeError::Overflow.into())
    }

    /// Credits a deposit and returns the shares minted
    pub fn apply_add_liquidity(&mut self, base_in: u64, token_in: u64) -> Result<u64> {
        let shares = self.shares_for_deposit(base_in, token_in)?;
        self.base_reserve = self
            .base_reserve
            .checked_add(base_in)
            .ok_or(PledgeError::Overflow)?;
        self.token_reserve = self
            .token_reserve
            .checked_add(token_in)
            .ok_or(PledgeError::Overflow)?;
        self.lp_supply = self
            .lp_supply
            .checked_add(shares)
            .ok_or(PledgeError::Overflow)?;
        Ok(shares)
    }

    /// Pro-rata withdrawal entitlement for `shares`
    pub fn amounts_for_shares(&self, shares: u64) -> Result<WithdrawalAmounts> {
        require!(shares > 0, PledgeError::InvalidAmount);
        require!(shares <= self.lp_supply, PledgeError::InvalidAmount);
        let base_out = (shares as u128)
            .checked_mul(self.base_reserve as u128)
            .ok_or(PledgeError::Overflow)?
            / self.lp_supply as u128;
        let token_out = (shares as u128)
            .checked_mul(self.token_reserve as u128)
            .ok_or(PledgeError::Overflow)?
            / self.lp_supply as u128;
        Ok(WithdrawalAmounts {
            base_out: base_out as u64,
            token_out: token_out as u64,
        })
    }

    /// Debits a withdrawal and returns the amounts owed
    pub fn apply_remove_liquidity(&mut self, shares: u64) -> Result<WithdrawalAmounts> {
        let amounts = self.amounts_for_shares(shares)?;
        self.base_reserve = self
            .base_reserve
            .checked_sub(amounts.base_out)
            .ok_or(PledgeError::Overflow)?;
        self.token_reserve = self
            .token_reserve
            .checked_sub(amounts.token_out)
            .ok_or(PledgeError::Overflow)?;
        self.lp_supply = self
            .lp_supply
            .checked_sub(shares)
            .ok_or(PledgeError::Overflow)?;
        Ok(amounts)
    }

    /// Product of reserves; non-decreasing across swaps
    pub fn reserve_product(&self) -> u128 {
        self.base_reserve as u128 * self.token_reserve as u128
    }

    fn record_volume(&mut self, base_amount: u64) {
        self.cumulative_volume = self.cumulative_volume.saturating_add(base_amount);
        self.swap_count = self.swap_count.saturating_add(1);
    }

    fn deduct_fee(amount: u64, fee_bps: u64) -> Result<u64> {
        let fee = Self::fee_portion(amount, fee_bps)?;
        Ok(amount - fee)
    }

    fn fee_portion(amount: u64, fee_bps: u64) -> Result<u64> {
        let fee = (amount as u128)
            .checked_mul(fee_bps as u128)
            .ok_or(PledgeError::Overflow)?
            / BPS_DENOM as u128;
        Ok(fee as u64)
    }

    fn curve_out(amount_in_after_fee: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
        let numerator = (amount_in_after_fee as u128)
            .checked_mul(reserve_out as u128)
            .ok_or(PledgeError::Overflow)?;
        let denominator = (reserve_in as u128)
            .checked_add(amount_in_after_fee as u128)
            .ok_or(PledgeError::Overflow)?;
        Ok((numerator / denominator) as u64)
    }
}

/// Integer square root, round-down
fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}

/// Seeds for LiquidityPool PDA
pub const LIQUIDITY_POOL_SEED: &[u8] = b"liquidity-pool";

/// Seeds for the pool-share mint PDA
pub const LP_MINT_SEED: &[u8] = b"lp-mint";

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_pool(base: u64, token: u64) -> LiquidityPool {
        let mut pool = LiquidityPool::default();
        let shares = pool.apply_add_liquidity(base, token).unwrap();
        assert!(shares > 0);
        pool
    }

    #[test]
    fn initial_shares_are_geometric_mean() {
        let pool = LiquidityPool::default();
        let shares = pool.shares_for_deposit(4_000_000, 1_000_000).unwrap();
        assert_eq!(shares, 2_000_000);
    }

    #[test]
    fn later_deposits_mint_pro_rata_minimum() {
        let pool = seeded_pool(1_000_000, 1_000_000);
        // balanced deposit of 10% mints 10% of supply
        let shares = pool.shares_for_deposit(100_000, 100_000).unwrap();
        assert_eq!(shares, pool.lp_supply / 10);
        // lopsided deposit is priced off the scarcer side
        let lopsided = pool.shares_for_deposit(100_000, 50_000).unwrap();
        assert_eq!(lopsided, pool.lp_supply / 20);
    }

    #[test]
    fn remove_returns_pro_rata_amounts() {
        let mut pool = seeded_pool(4_000_000, 1_000_000);
        let half = pool.lp_supply / 2;
        let amounts = pool.apply_remove_liquidity(half).unwrap();
        assert_eq!(amounts.base_out, 2_000_000);
        assert_eq!(amounts.token_out, 500_000);
        assert_eq!(pool.base_reserve, 2_000_000);
        assert_eq!(pool.token_reserve, 500_000);
        assert_eq!(pool.lp_supply, half);
    }

    #[test]
    fn remove_more_than_supply_is_rejected() {
        let mut pool = seeded_pool(1_000_000, 1_000_000);
        let too_many = pool.lp_supply + 1;
        assert_eq!(
            pool.apply_remove_liquidity(too_many).unwrap_err(),
            PledgeError::InvalidAmount.into()
        );
    }

    #[test]
    fn swap_on_empty_pool_is_rejected() {
        let mut pool = LiquidityPool::default();
        assert_eq!(
            pool.apply_swap_base_in(1_000).unwrap_err(),
            PledgeError::InsufficientLiquidity.into()
        );
    }

    #[test]
    fn reserve_product_never_decreases_across_swaps() {
        let mut pool = seeded_pool(1_000_000, 1_000_000);
        let mut k = pool.reserve_product();
        for i in 0..40u64 {
            if i % 2 == 0 {
                pool.apply_swap_base_in(3_000 + i * 17).unwrap();
            } else {
                pool.apply_swap_token_in(2_500 + i * 13).unwrap();
            }
            let next = pool.reserve_product();
            assert!(next >= k, "product decreased on swap {i}");
            k = next;
        }
    }

    #[test]
    fn large_trade_gets_worse_than_linear_pricing() {
        let pool = seeded_pool(1_000_000, 1_000_000);
        let small = pool.quote_base_to_token(1_000).unwrap();
        let large = pool.quote_base_to_token(10_000).unwrap();
        assert!(large < 10 * small, "{large} vs 10 x {small}");
    }

    #[test]
    fn insurance_skim_is_ten_bps_of_base_input() {
        let mut pool = seeded_pool(1_000_000, 1_000_000);
        let outcome = pool.apply_swap_base_in(10_000).unwrap();
        assert_eq!(outcome.insurance_fee, 10);
        // everything except the skim lands in the reserve
        assert_eq!(pool.base_reserve, 1_000_000 + 10_000 - 10);
    }

    #[test]
    fn token_side_skim_is_gap_between_fee_tiers() {
        let mut pool = seeded_pool(1_000_000, 1_000_000);
        let quoted = pool.quote_token_to_base(10_000).unwrap();
        let outcome = pool.apply_swap_token_in(10_000).unwrap();
        assert_eq!(outcome.amount_out, quoted);
        // 10bps of input at the marginal rate, within rounding
        assert!(outcome.insurance_fee <= 10 && outcome.insurance_fee >= 8);
        assert_eq!(
            pool.base_reserve,
            1_000_000 - quoted - outcome.insurance_fee
        );
    }

    #[test]
    fn inverse_quote_always_covers_the_requested_output() {
        for &target in &[1u64, 7, 999, 50_000, 333_333] {
            let mut pool = seeded_pool(5_000_000, 2_000_000);
            let cost = pool.base_in_for_token_out(target).unwrap();
            let outcome = pool.apply_swap_base_in(cost).unwrap();
            assert!(
                outcome.amount_out >= target,
                "{} for target {target}",
                outcome.amount_out
            );
        }
    }

    #[test]
    fn inverse_quote_cannot_drain_the_reserve() {
        let pool = seeded_pool(1_000_000, 1_000_000);
        assert_eq!(
            pool.base_in_for_token_out(1_000_000).unwrap_err(),
            PledgeError::InsufficientLiquidity.into()
        );
    }

    #[test]
    fn volume_counters_advance() {
        let mut pool = seeded_pool(1_000_000, 1_000_000);
        pool.apply_swap_base_in(5_000).unwrap();
        pool.apply_swap_token_in(4_000).unwrap();
        assert_eq!(pool.swap_count, 2);
        assert!(pool.cumulative_volume > 5_000);
    }

    #[test]
    fn isqrt_round_down() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(99), 9);
        assert_eq!(isqrt(1_000_000_000_000), 1_000_000);
    }
}
