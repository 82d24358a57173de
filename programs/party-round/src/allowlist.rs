use anchor_lang::prelude::*;

/// An empty allowlist means the sale is public.
pub fn is_permitted(allowlist: &[Pubkey], who: &Pubkey) -> bool {
    allowlist.is_empty() || allowlist.contains(who)
}
