use anchor_lang::prelude::*;

use crate::FundraiseError;

// ── Settlement arithmetic ────────────────────────────────────────────────────
//
// All division floors. Contributions keep the sub-price remainder in the
// treasury. Redemptions multiply in u128 and narrow back to u64 only after
// the division, so balance × amount can never wrap.

/// Tokens issued for `payment` lamports at `price` lamports per token unit.
pub fn tokens_for_payment(payment: u64, price: u64) -> Result<u64> {
    require!(payment > 0, FundraiseError::ZeroAmount);
    require!(price > 0, FundraiseError::InvalidConfiguration);

    let tokens = payment / price;
    require!(tokens > 0, FundraiseError::PaymentBelowTokenPrice);
    Ok(tokens)
}

/// Cumulative minted amount after issuing `issued` more tokens, refusing
/// anything that would cross `cap`.
pub fn minted_after_issue(minted: u64, issued: u64, cap: u64) -> Result<u64> {
    let next = minted
        .checked_add(issued)
        .ok_or(FundraiseError::ArithmeticOverflow)?;
    require!(next <= cap, FundraiseError::SupplyCapExceeded);
    Ok(next)
}

/// floor(treasury_balance × redeem_amount / current_supply)
pub fn redemption_payout(
    treasury_balance: u64,
    redeem_amount: u64,
    current_supply: u64,
) -> Result<u64> {
    require!(redeem_amount > 0, FundraiseError::ZeroAmount);
    require!(
        current_supply > 0 && redeem_amount <= current_supply,
        FundraiseError::InsufficientTokenBalance
    );

    let payout = (treasury_balance as u128)
        .checked_mul(redeem_amount as u128)
        .ok_or(FundraiseError::ArithmeticOverflow)?
        .checked_div(current_supply as u128)
        .ok_or(FundraiseError::ArithmeticOverflow)?;

    u64::try_from(payout).map_err(|_| error!(FundraiseError::ArithmeticOverflow))
}
