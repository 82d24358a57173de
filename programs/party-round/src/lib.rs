use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount};

pub mod allowlist;
pub mod authority;
pub mod engine;
pub mod settlement;
pub mod state;

use authority::*;
use state::*;

declare_id!("Fg6PaFpoGXkYsidMpWxqSWY79c2JEvWC7jg4fQtMaH8q");

// ─────────────────────────────────────────────────────────────────────────────
//  Party Round — fixed-window token sale with pro-rata treasury exit
//
//  One admin opens a fundraise instance. While it is open, contributors pay
//  lamports into a program-owned treasury and receive freshly minted tokens
//  at a fixed price, up to a hard supply cap. After the admin closes the
//  sale, any holder can burn tokens for their share of the treasury:
//
//      payout = floor(redeemable_lamports × burned / live_supply)
//
//  Live supply (not the cap) is the denominator, so every token burned gets
//  the same slice of whatever is left, in any redemption order.
//
//  Authorities:
//    mint_authority PDA — sole minter of the fundraise token
//    treasury PDA       — holds the lamports, signs every payout
//  Neither has a private key; only this program can sign for them.
// ─────────────────────────────────────────────────────────────────────────────

#[program]
pub mod party_round {
    use super::*;

    // ── Initialize ────────────────────────────────────────────────────────────
    //
    // Creates the instance record, the token mint and the treasury. The admin
    // pays rent for all three; the treasury keeps its rent-exempt minimum
    // outside the redeemable balance for the life of the instance.

    pub fn initialize_dao(ctx: Context<InitializeDao>, params: InitializeDaoParams) -> Result<()> {
        let now     = Clock::get()?.unix_timestamp;
        let reserve = Rent::get()?.minimum_balance(0);

        let keys = InstanceKeys {
            admin:               ctx.accounts.admin.key(),
            token_mint:          ctx.accounts.token_mint.key(),
            treasury_account:    ctx.accounts.treasury.key(),
            bump:                ctx.bumps.dao_state,
            mint_bump:           ctx.bumps.token_mint,
            mint_authority_bump: ctx.bumps.mint_authority,
            treasury_bump:       ctx.bumps.treasury,
        };
        engine::initialize(&mut ctx.accounts.dao_state, keys, params, reserve, now)?;

        let shortfall = reserve.saturating_sub(ctx.accounts.treasury.lamports());
        if shortfall > 0 {
            transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.admin.to_account_info(),
                        to:   ctx.accounts.treasury.to_account_info(),
                    },
                ),
                shortfall,
            )?;
        }

        let state = &ctx.accounts.dao_state;
        msg!(
            "Fundraise {} opened: cap {} at {} lamports, ends {}",
            state.token_symbol, state.total_supply_cap,
            state.token_price_lamports, state.fundraise_end_ts
        );
        emit!(DaoInitialized {
            dao:                  state.key(),
            admin:                state.admin,
            token_mint:           state.token_mint,
            treasury:             state.treasury_account,
            token_symbol:         state.token_symbol.clone(),
            total_supply_cap:     state.total_supply_cap,
            token_price_lamports: state.token_price_lamports,
            fundraise_end_ts:     state.fundraise_end_ts,
            allowlist_len:        state.allowlisted_addresses.len() as u32,
        });
        Ok(())
    }

    // ── Contribute ────────────────────────────────────────────────────────────
    //
    // Payment goes to the treasury in full; tokens = floor(payment / price).
    // The sub-price remainder stays in the treasury.

    pub fn contribute_funds(ctx: Context<ContributeFunds>, amount: u64) -> Result<u64> {
        let now         = Clock::get()?.unix_timestamp;
        let contributor = ctx.accounts.contributor.key();
        let tokens = engine::contribute(&mut ctx.accounts.dao_state, &contributor, amount, now)?;

        let dao_key   = ctx.accounts.dao_state.key();
        let authority = ProgramAuthority::verify(
            AuthorityKind::Mint,
            &dao_key,
            ctx.accounts.dao_state.mint_authority_bump,
            &ctx.accounts.mint_authority.key(),
            ctx.program_id,
        )?;

        transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.contributor.to_account_info(),
                    to:   ctx.accounts.treasury.to_account_info(),
                },
            ),
            amount,
        )?;

        let seeds  = authority.seeds(&dao_key);
        let signer = &[&seeds[..]];
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint:      ctx.accounts.token_mint.to_account_info(),
                    to:        ctx.accounts.contributor_token_account.to_account_info(),
                    authority: ctx.accounts.mint_authority.to_account_info(),
                },
                signer,
            ),
            tokens,
        )?;

        let state = &ctx.accounts.dao_state;
        msg!("Contribution of {} lamports minted {} tokens", amount, tokens);
        emit!(ContributionReceived {
            dao:           dao_key,
            contributor,
            lamports:      amount,
            tokens_issued: tokens,
            tokens_minted: state.tokens_minted,
        });
        Ok(tokens)
    }

    // ── Close ─────────────────────────────────────────────────────────────────
    //
    // Admin-only, once. Not tied to fundraise_end_ts: the admin may close
    // early or late. No funds move.

    pub fn close_fundraise(ctx: Context<CloseFundraise>) -> Result<()> {
        let now   = Clock::get()?.unix_timestamp;
        let admin = ctx.accounts.admin.key();
        engine::close(&mut ctx.accounts.dao_state, &admin)?;

        let state    = &ctx.accounts.dao_state;
        let treasury = state.redeemable_balance(ctx.accounts.treasury.lamports());
        msg!(
            "Fundraise closed. Raised {} lamports, {} tokens minted",
            state.total_contributions, state.tokens_minted
        );
        emit!(FundraiseClosed {
            dao:                 state.key(),
            closed_by:           admin,
            closed_at:           now,
            total_contributions: state.total_contributions,
            contribution_count:  state.contribution_count,
            tokens_minted:       state.tokens_minted,
            redeemable_lamports: treasury,
        });
        Ok(())
    }

    // ── Redeem ────────────────────────────────────────────────────────────────
    //
    // Settlement reads the live mint supply and treasury balance, so the
    // payout is computed before either the burn or the transfer is issued.

    pub fn redeem_tokens(ctx: Context<RedeemTokens>, amount: u64) -> Result<u64> {
        let redeemable = ctx
            .accounts
            .dao_state
            .redeemable_balance(ctx.accounts.treasury.lamports());
        let holder_balance = ctx.accounts.redeemer_token_account.amount;
        let live_supply    = ctx.accounts.token_mint.supply;

        let payout = engine::redeem(
            &mut ctx.accounts.dao_state,
            amount,
            holder_balance,
            redeemable,
            live_supply,
        )?;

        let dao_key   = ctx.accounts.dao_state.key();
        let authority = ProgramAuthority::verify(
            AuthorityKind::Treasury,
            &dao_key,
            ctx.accounts.dao_state.treasury_bump,
            &ctx.accounts.treasury.key(),
            ctx.program_id,
        )?;

        token::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint:      ctx.accounts.token_mint.to_account_info(),
                    from:      ctx.accounts.redeemer_token_account.to_account_info(),
                    authority: ctx.accounts.redeemer.to_account_info(),
                },
            ),
            amount,
        )?;

        let seeds  = authority.seeds(&dao_key);
        let signer = &[&seeds[..]];
        transfer(
            CpiContext::new_with_signer(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.treasury.to_account_info(),
                    to:   ctx.accounts.redeemer.to_account_info(),
                },
                signer,
            ),
            payout,
        )?;

        let remaining_supply = live_supply
            .checked_sub(amount)
            .ok_or(FundraiseError::ArithmeticOverflow)?;

        msg!("Redeemed {} tokens for {} lamports", amount, payout);
        emit!(TokensRedeemed {
            dao:              dao_key,
            redeemer:         ctx.accounts.redeemer.key(),
            tokens_burned:    amount,
            payout,
            remaining_supply,
        });
        Ok(payout)
    }
}

// ── Account contexts ──────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitializeDao<'info> {
    // A repeat call opens the existing record and fails in the handler
    // with AlreadyInitialized.
    #[account(
        init_if_needed, payer = admin, space = DaoState::LEN,
        seeds = [DAO_SEED, admin.key().as_ref()], bump
    )]
    pub dao_state:      Account<'info, DaoState>,
    /// CHECK: PDA signer for mint_to; holds no data
    #[account(seeds = [MINT_AUTHORITY_SEED, dao_state.key().as_ref()], bump)]
    pub mint_authority: UncheckedAccount<'info>,
    /// Treasury PDA — holds contributed lamports
    #[account(mut, seeds = [TREASURY_SEED, dao_state.key().as_ref()], bump)]
    pub treasury:       SystemAccount<'info>,
    #[account(
        init_if_needed, payer = admin,
        seeds = [MINT_SEED, dao_state.key().as_ref()], bump,
        mint::decimals  = TOKEN_DECIMALS,
        mint::authority = mint_authority,
    )]
    pub token_mint:     Account<'info, Mint>,
    #[account(mut)]
    pub admin:          Signer<'info>,
    pub token_program:  Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ContributeFunds<'info> {
    #[account(
        mut, has_one = token_mint,
        seeds = [DAO_SEED, dao_state.admin.as_ref()], bump = dao_state.bump
    )]
    pub dao_state:      Account<'info, DaoState>,
    #[account(mut, seeds = [MINT_SEED, dao_state.key().as_ref()], bump = dao_state.mint_bump)]
    pub token_mint:     Account<'info, Mint>,
    /// CHECK: PDA signer for mint_to; holds no data. The seeds constraint
    /// already checks the address; ProgramAuthority::verify in the handler
    /// repeats that check on purpose before the signed mint_to.
    #[account(
        seeds = [MINT_AUTHORITY_SEED, dao_state.key().as_ref()],
        bump = dao_state.mint_authority_bump
    )]
    pub mint_authority: UncheckedAccount<'info>,
    #[account(
        mut, address = dao_state.treasury_account,
        seeds = [TREASURY_SEED, dao_state.key().as_ref()], bump = dao_state.treasury_bump
    )]
    pub treasury:       SystemAccount<'info>,
    #[account(mut)]
    pub contributor:    Signer<'info>,
    // Destination must hold this fundraise's mint and belong to the contributor
    #[account(
        mut,
        token::mint      = token_mint,
        token::authority = contributor,
    )]
    pub contributor_token_account: Account<'info, TokenAccount>,
    pub token_program:  Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct CloseFundraise<'info> {
    #[account(
        mut, has_one = admin @ FundraiseError::Unauthorized,
        seeds = [DAO_SEED, dao_state.admin.as_ref()], bump = dao_state.bump
    )]
    pub dao_state: Account<'info, DaoState>,
    #[account(
        address = dao_state.treasury_account,
        seeds = [TREASURY_SEED, dao_state.key().as_ref()], bump = dao_state.treasury_bump
    )]
    pub treasury:  SystemAccount<'info>,
    pub admin:     Signer<'info>,
}

#[derive(Accounts)]
pub struct RedeemTokens<'info> {
    #[account(
        mut, has_one = token_mint,
        seeds = [DAO_SEED, dao_state.admin.as_ref()], bump = dao_state.bump
    )]
    pub dao_state:      Account<'info, DaoState>,
    #[account(mut, seeds = [MINT_SEED, dao_state.key().as_ref()], bump = dao_state.mint_bump)]
    pub token_mint:     Account<'info, Mint>,
    #[account(
        mut, address = dao_state.treasury_account,
        seeds = [TREASURY_SEED, dao_state.key().as_ref()], bump = dao_state.treasury_bump
    )]
    pub treasury:       SystemAccount<'info>,
    #[account(mut)]
    pub redeemer:       Signer<'info>,
    #[account(
        mut,
        token::mint      = token_mint,
        token::authority = redeemer,
    )]
    pub redeemer_token_account: Account<'info, TokenAccount>,
    pub token_program:  Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// ── Events ────────────────────────────────────────────────────────────────────

#[event]
pub struct DaoInitialized {
    pub dao: Pubkey, pub admin: Pubkey,
    pub token_mint: Pubkey, pub treasury: Pubkey,
    pub token_symbol: String,
    pub total_supply_cap: u64, pub token_price_lamports: u64,
    pub fundraise_end_ts: i64, pub allowlist_len: u32,
}

#[event]
pub struct ContributionReceived {
    pub dao: Pubkey, pub contributor: Pubkey,
    pub lamports: u64, pub tokens_issued: u64, pub tokens_minted: u64,
}

#[event]
pub struct FundraiseClosed {
    pub dao: Pubkey, pub closed_by: Pubkey, pub closed_at: i64,
    pub total_contributions: u64, pub contribution_count: u64,
    pub tokens_minted: u64, pub redeemable_lamports: u64,
}

#[event]
pub struct TokensRedeemed {
    pub dao: Pubkey, pub redeemer: Pubkey,
    pub tokens_burned: u64, pub payout: u64, pub remaining_supply: u64,
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[error_code]
pub enum FundraiseError {
    #[msg("Fundraise is already initialized")]             AlreadyInitialized,
    #[msg("Price, supply cap and end time must be valid")] InvalidConfiguration,
    #[msg("Token name max 32 bytes")]                      NameTooLong,
    #[msg("Token symbol max 10 bytes")]                    SymbolTooLong,
    #[msg("Allowlist max 100 addresses")]                  AllowlistTooLarge,
    #[msg("Fundraise is not open for contributions")]      FundraiseNotOpen,
    #[msg("Address not in allowlist")]                     NotAllowlisted,
    #[msg("Amount must be greater than zero")]             ZeroAmount,
    #[msg("Payment is less than one token's price")]       PaymentBelowTokenPrice,
    #[msg("Contribution would exceed the supply cap")]     SupplyCapExceeded,
    #[msg("Only the admin can close the fundraise")]       Unauthorized,
    #[msg("Fundraise is already closed")]                  AlreadyClosed,
    #[msg("Fundraise has not been closed yet")]            FundraiseNotClosed,
    #[msg("Insufficient token balance")]                   InsufficientTokenBalance,
    #[msg("Redemption is too small to pay out")]           InsufficientTreasuryFunds,
    #[msg("Arithmetic overflow")]                          ArithmeticOverflow,
    #[msg("Derived authority does not match")]             InvalidAuthority,
}
