use anchor_lang::prelude::*;

use crate::allowlist;
use crate::settlement;
use crate::state::*;
use crate::FundraiseError;

// ─────────────────────────────────────────────────────────────────────────────
//  Fundraise state machine
//
//    Uninitialized ──initialize──▶ Open ──close──▶ Closed
//
//  Every transition checks first and writes last: a function that returns
//  Err has not touched `state`. The instruction handlers run these before
//  issuing any mint, burn or transfer CPI, and feed in the values the
//  runtime owns (clock, live mint supply, treasury lamports, holder balance).
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Open,
    Closed,
}

pub fn phase(state: &DaoState) -> Phase {
    if !state.is_initialized() {
        Phase::Uninitialized
    } else if state.fundraise_ended {
        Phase::Closed
    } else {
        Phase::Open
    }
}

pub fn validate_config(params: &InitializeDaoParams, now: i64) -> Result<()> {
    require!(params.token_name.len() <= MAX_TOKEN_NAME_LEN, FundraiseError::NameTooLong);
    require!(params.token_symbol.len() <= MAX_TOKEN_SYMBOL_LEN, FundraiseError::SymbolTooLong);
    require!(!params.token_symbol.is_empty(), FundraiseError::InvalidConfiguration);
    require!(
        params.allowlisted_addresses.len() <= MAX_ALLOWLIST_LEN,
        FundraiseError::AllowlistTooLarge
    );
    require!(params.total_supply_cap > 0, FundraiseError::InvalidConfiguration);
    require!(params.token_price_lamports > 0, FundraiseError::InvalidConfiguration);
    require!(params.fundraise_end_ts > now, FundraiseError::InvalidConfiguration);
    Ok(())
}

pub fn initialize(
    state: &mut DaoState,
    keys: InstanceKeys,
    params: InitializeDaoParams,
    treasury_rent_reserve: u64,
    now: i64,
) -> Result<()> {
    require!(phase(state) == Phase::Uninitialized, FundraiseError::AlreadyInitialized);
    validate_config(&params, now)?;

    state.admin                 = keys.admin;
    state.token_mint            = keys.token_mint;
    state.treasury_account      = keys.treasury_account;
    state.token_name            = params.token_name;
    state.token_symbol          = params.token_symbol;
    state.total_supply_cap      = params.total_supply_cap;
    state.token_price_lamports  = params.token_price_lamports;
    state.fundraise_end_ts      = params.fundraise_end_ts;
    state.fundraise_ended       = false;
    state.allowlisted_addresses = params.allowlisted_addresses;
    state.tokens_minted         = 0;
    state.total_contributions   = 0;
    state.contribution_count    = 0;
    state.tokens_redeemed       = 0;
    state.lamports_paid_out     = 0;
    state.treasury_rent_reserve = treasury_rent_reserve;
    state.bump                  = keys.bump;
    state.mint_bump             = keys.mint_bump;
    state.mint_authority_bump   = keys.mint_authority_bump;
    state.treasury_bump         = keys.treasury_bump;
    Ok(())
}

/// Accept `payment` lamports from `contributor`; returns tokens to mint.
pub fn contribute(
    state: &mut DaoState,
    contributor: &Pubkey,
    payment: u64,
    now: i64,
) -> Result<u64> {
    require!(phase(state) == Phase::Open, FundraiseError::FundraiseNotOpen);
    require!(now < state.fundraise_end_ts, FundraiseError::FundraiseNotOpen);
    require!(
        allowlist::is_permitted(&state.allowlisted_addresses, contributor),
        FundraiseError::NotAllowlisted
    );

    let tokens = settlement::tokens_for_payment(payment, state.token_price_lamports)?;
    let minted = settlement::minted_after_issue(
        state.tokens_minted,
        tokens,
        state.total_supply_cap,
    )?;
    let contributions = state
        .total_contributions
        .checked_add(payment)
        .ok_or(FundraiseError::ArithmeticOverflow)?;
    let count = state
        .contribution_count
        .checked_add(1)
        .ok_or(FundraiseError::ArithmeticOverflow)?;

    state.tokens_minted       = minted;
    state.total_contributions = contributions;
    state.contribution_count  = count;
    Ok(tokens)
}

pub fn close(state: &mut DaoState, caller: &Pubkey) -> Result<()> {
    require!(phase(state) != Phase::Uninitialized, FundraiseError::FundraiseNotOpen);
    require_keys_eq!(*caller, state.admin, FundraiseError::Unauthorized);
    require!(!state.fundraise_ended, FundraiseError::AlreadyClosed);

    state.fundraise_ended = true;
    Ok(())
}

/// Burn `amount` of a holder's `holder_balance` against the live
/// `current_supply`; returns the lamports owed out of `redeemable_balance`.
pub fn redeem(
    state: &mut DaoState,
    amount: u64,
    holder_balance: u64,
    redeemable_balance: u64,
    current_supply: u64,
) -> Result<u64> {
    require!(phase(state) == Phase::Closed, FundraiseError::FundraiseNotClosed);
    require!(amount > 0, FundraiseError::ZeroAmount);
    require!(amount <= holder_balance, FundraiseError::InsufficientTokenBalance);

    let payout = settlement::redemption_payout(redeemable_balance, amount, current_supply)?;
    require!(payout > 0, FundraiseError::InsufficientTreasuryFunds);

    let redeemed = state
        .tokens_redeemed
        .checked_add(amount)
        .ok_or(FundraiseError::ArithmeticOverflow)?;
    let paid = state
        .lamports_paid_out
        .checked_add(payout)
        .ok_or(FundraiseError::ArithmeticOverflow)?;

    state.tokens_redeemed   = redeemed;
    state.lamports_paid_out = paid;
    Ok(payout)
}
