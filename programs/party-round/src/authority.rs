use anchor_lang::prelude::*;

use crate::FundraiseError;

// ── Derived identities ───────────────────────────────────────────────────────
//
//   dao_state       ["dao",            admin]
//   token_mint      ["mint",           dao_state]
//   mint_authority  ["mint_authority", dao_state]
//   treasury        ["treasury",       dao_state]
//
// The treasury PDA is both the lamport vault and its own signing authority.

pub const DAO_SEED: &[u8] = b"dao";
pub const MINT_SEED: &[u8] = b"mint";
pub const MINT_AUTHORITY_SEED: &[u8] = b"mint_authority";
pub const TREASURY_SEED: &[u8] = b"treasury";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityKind {
    Mint,
    Treasury,
}

impl AuthorityKind {
    pub fn seed(self) -> &'static [u8] {
        match self {
            AuthorityKind::Mint => MINT_AUTHORITY_SEED,
            AuthorityKind::Treasury => TREASURY_SEED,
        }
    }
}

/// A program-controlled signer scoped to one fundraise instance.
/// Carries no private key; the runtime accepts it as a signer only when the
/// program re-derives it from `seeds()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramAuthority {
    pub kind: AuthorityKind,
    pub address: Pubkey,
    bump: [u8; 1],
}

impl ProgramAuthority {
    pub fn derive(kind: AuthorityKind, dao: &Pubkey, program_id: &Pubkey) -> Result<Self> {
        let (address, bump) =
            Pubkey::try_find_program_address(&[kind.seed(), dao.as_ref()], program_id)
                .ok_or(FundraiseError::InvalidAuthority)?;
        Ok(Self { kind, address, bump: [bump] })
    }

    /// Rebuild the authority from a stored bump and check it is `candidate`.
    pub fn verify(
        kind: AuthorityKind,
        dao: &Pubkey,
        bump: u8,
        candidate: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Self> {
        let address =
            Pubkey::create_program_address(&[kind.seed(), dao.as_ref(), &[bump]], program_id)
                .map_err(|_| error!(FundraiseError::InvalidAuthority))?;
        require_keys_eq!(address, *candidate, FundraiseError::InvalidAuthority);
        Ok(Self { kind, address, bump: [bump] })
    }

    pub fn bump(&self) -> u8 {
        self.bump[0]
    }

    /// Signer seeds for `CpiContext::new_with_signer`.
    pub fn seeds<'a>(&'a self, dao: &'a Pubkey) -> [&'a [u8]; 3] {
        [self.kind.seed(), dao.as_ref(), &self.bump]
    }
}

/// Client-side helper: the instance record address for `admin`.
pub fn dao_address(admin: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DAO_SEED, admin.as_ref()], program_id)
}

/// Client-side helper: the token mint address for an instance.
pub fn mint_address(dao: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINT_SEED, dao.as_ref()], program_id)
}
