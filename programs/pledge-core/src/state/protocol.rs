use anchor_lang::prelude::*;

/// Global protocol configuration
/// PDA seeds: [b"protocol-config"]
#[account]
#[derive(Default)]
pub struct ProtocolConfig {
    /// Authority that approves large claims, funds the platform vault and
    /// adjusts creator credit limits
    pub authority: Pubkey,

    /// Number of tokens registered lifetime
    pub tokens_registered: u32,

    /// Number of buyback vaults created lifetime
    pub vaults_created: u32,

    /// Bump for this config PDA
    pub bump: u8,

    /// Unix timestamp when initialized
    pub created_at: i64,

    /// Reserved for future upgrades
    pub _reserved: [u8; 32],
}

impl ProtocolConfig {
    pub const SIZE: usize = 32 + // authority
                            4 +  // tokens_registered
                            4 +  // vaults_created
                            1 +  // bump
                            8 +  // created_at
                            32;  // _reserved
}

/// Seeds for ProtocolConfig PDA
pub const PROTOCOL_CONFIG_SEED: &[u8] = b"protocol-config";
