use anchor_lang::prelude::*;

pub const MAX_TOKEN_NAME_LEN: usize = 32;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 10;
pub const MAX_ALLOWLIST_LEN: usize = 100;
pub const TOKEN_DECIMALS: u8 = 9;

// ── State ─────────────────────────────────────────────────────────────────────

#[account]
#[derive(Default, Debug)]
pub struct DaoState {
    pub admin:                 Pubkey,      // 32
    pub token_mint:            Pubkey,      // 32
    pub treasury_account:      Pubkey,      // 32
    pub token_name:            String,      // 4 + 32
    pub token_symbol:          String,      // 4 + 10
    pub total_supply_cap:      u64,         // 8
    pub token_price_lamports:  u64,         // 8
    pub fundraise_end_ts:      i64,         // 8
    pub fundraise_ended:       bool,        // 1
    pub allowlisted_addresses: Vec<Pubkey>, // 4 + 32 × 100
    pub tokens_minted:         u64,         // 8   cumulative, never decreases
    pub total_contributions:   u64,         // 8   lamports received
    pub contribution_count:    u64,         // 8
    pub tokens_redeemed:       u64,         // 8
    pub lamports_paid_out:     u64,         // 8
    pub treasury_rent_reserve: u64,         // 8   not redeemable
    pub bump:                  u8,          // 1
    pub mint_bump:             u8,          // 1
    pub mint_authority_bump:   u8,          // 1
    pub treasury_bump:         u8,          // 1
}

impl DaoState {
    pub const LEN: usize = 8                   // discriminator
        + 32 + 32 + 32                         // admin, token_mint, treasury_account
        + (4 + MAX_TOKEN_NAME_LEN)             // token_name
        + (4 + MAX_TOKEN_SYMBOL_LEN)           // token_symbol
        + 8 + 8 + 8                            // cap, price, end_ts
        + 1                                    // fundraise_ended
        + (4 + 32 * MAX_ALLOWLIST_LEN)         // allowlisted_addresses
        + 8 + 8 + 8 + 8 + 8 + 8                // counters, rent reserve
        + 1 + 1 + 1 + 1;                       // bumps
                                               // = 3435

    pub fn is_initialized(&self) -> bool {
        self.admin != Pubkey::default()
    }

    /// Lamports redeemers share: everything above the rent reserve.
    pub fn redeemable_balance(&self, treasury_lamports: u64) -> u64 {
        treasury_lamports.saturating_sub(self.treasury_rent_reserve)
    }
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct InitializeDaoParams {
    pub token_name:            String,
    pub token_symbol:          String,
    pub total_supply_cap:      u64,
    pub fundraise_end_ts:      i64,
    pub token_price_lamports:  u64,
    pub allowlisted_addresses: Vec<Pubkey>,
}

/// Addresses and bumps resolved by the runtime for a new instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstanceKeys {
    pub admin:               Pubkey,
    pub token_mint:          Pubkey,
    pub treasury_account:    Pubkey,
    pub bump:                u8,
    pub mint_bump:           u8,
    pub mint_authority_bump: u8,
    pub treasury_bump:       u8,
}
