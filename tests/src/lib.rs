//! LiteSVM harness for the party-round program.
//!
//! Loads the built `party_round.so`, derives every instance address the way a
//! client would, and wraps the four instructions in builders that fill the
//! program's generated `accounts::*` / `instruction::*` types.

use std::path::PathBuf;

use anchor_lang::prelude::{Clock, Pubkey};
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program_pack::Pack;
use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use anchor_spl::token::{spl_token, Mint, TokenAccount};
use litesvm::types::TransactionResult;
use litesvm::LiteSVM;
use party_round::authority::{self, AuthorityKind, ProgramAuthority};
use party_round::state::{DaoState, InitializeDaoParams};
use solana_keypair::Keypair;
use solana_native_token::LAMPORTS_PER_SOL;
use solana_signer::Signer;
use solana_transaction::Transaction;

pub const PROGRAM_ID: Pubkey = party_round::ID;
pub const NOW: i64 = 1_700_000_000;
pub const DAY: i64 = 86_400;

pub fn read_program() -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../target/deploy/party_round.so");
    std::fs::read(&path).unwrap_or_else(|_| panic!("Failed to read program from {:?}", path))
}

pub fn setup() -> LiteSVM {
    let mut svm = LiteSVM::new();
    svm.add_program(PROGRAM_ID, &read_program());
    warp_to(&mut svm, NOW);
    svm
}

pub fn warp_to(svm: &mut LiteSVM, unix_timestamp: i64) {
    let mut clock = svm.get_sysvar::<Clock>();
    clock.unix_timestamp = unix_timestamp;
    svm.set_sysvar::<Clock>(&clock);
}

pub fn funded_keypair(svm: &mut LiteSVM, sol: u64) -> Keypair {
    let keypair = Keypair::new();
    svm.airdrop(&keypair.pubkey(), sol * LAMPORTS_PER_SOL)
        .expect("Airdrop failed");
    keypair
}

/// Signs with `payer` plus `signers` and expires the blockhash afterwards so
/// an identical follow-up transaction is not deduplicated.
pub fn send(
    svm: &mut LiteSVM,
    ixs: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
) -> TransactionResult {
    let mut keys = vec![payer];
    keys.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&payer.pubkey()),
        &keys,
        svm.latest_blockhash(),
    );
    let result = svm.send_transaction(tx);
    svm.expire_blockhash();
    result
}

/// Asserts the transaction failed with the named Anchor error.
pub fn assert_error(result: &TransactionResult, name: &str) {
    let failed = result.as_ref().expect_err("transaction should have failed");
    let needle = format!("Error Code: {}.", name);
    assert!(
        failed.meta.logs.iter().any(|line| line.contains(&needle)),
        "expected {} in logs: {:#?}",
        name,
        failed.meta.logs
    );
}

/// The u64 an instruction handed back through return data.
pub fn returned_u64(result: &TransactionResult) -> u64 {
    let meta = result.as_ref().expect("transaction should have succeeded");
    let bytes: [u8; 8] = meta.return_data.data[..8]
        .try_into()
        .expect("return data is a u64");
    u64::from_le_bytes(bytes)
}

// ── Instance addresses ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub admin:          Pubkey,
    pub dao:            Pubkey,
    pub mint:           Pubkey,
    pub mint_authority: Pubkey,
    pub treasury:       Pubkey,
}

impl Instance {
    pub fn derive(admin: &Pubkey) -> Self {
        let (dao, _) = authority::dao_address(admin, &PROGRAM_ID);
        let (mint, _) = authority::mint_address(&dao, &PROGRAM_ID);
        let mint_authority = ProgramAuthority::derive(AuthorityKind::Mint, &dao, &PROGRAM_ID)
            .unwrap()
            .address;
        let treasury = ProgramAuthority::derive(AuthorityKind::Treasury, &dao, &PROGRAM_ID)
            .unwrap()
            .address;
        Self { admin: *admin, dao, mint, mint_authority, treasury }
    }
}

pub fn params(symbol: &str, cap: u64, price: u64) -> InitializeDaoParams {
    InitializeDaoParams {
        token_name:            format!("{} Round", symbol),
        token_symbol:          symbol.to_string(),
        total_supply_cap:      cap,
        fundraise_end_ts:      NOW + DAY,
        token_price_lamports:  price,
        allowlisted_addresses: vec![],
    }
}

// ── Instruction builders ─────────────────────────────────────────────────────

pub fn initialize_dao_ix(instance: &Instance, params: InitializeDaoParams) -> Instruction {
    let accounts = party_round::accounts::InitializeDao {
        dao_state:      instance.dao,
        mint_authority: instance.mint_authority,
        treasury:       instance.treasury,
        token_mint:     instance.mint,
        admin:          instance.admin,
        token_program:  spl_token::ID,
        system_program: anchor_lang::system_program::ID,
    };
    Instruction {
        program_id: PROGRAM_ID,
        accounts:   accounts.to_account_metas(None),
        data:       party_round::instruction::InitializeDao { params }.data(),
    }
}

pub fn contribute_funds_ix(
    instance: &Instance,
    contributor: &Pubkey,
    token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = party_round::accounts::ContributeFunds {
        dao_state:                 instance.dao,
        token_mint:                instance.mint,
        mint_authority:            instance.mint_authority,
        treasury:                  instance.treasury,
        contributor:               *contributor,
        contributor_token_account: *token_account,
        token_program:             spl_token::ID,
        system_program:            anchor_lang::system_program::ID,
    };
    Instruction {
        program_id: PROGRAM_ID,
        accounts:   accounts.to_account_metas(None),
        data:       party_round::instruction::ContributeFunds { amount }.data(),
    }
}

pub fn close_fundraise_ix(instance: &Instance, signer: &Pubkey) -> Instruction {
    let accounts = party_round::accounts::CloseFundraise {
        dao_state: instance.dao,
        treasury:  instance.treasury,
        admin:     *signer,
    };
    Instruction {
        program_id: PROGRAM_ID,
        accounts:   accounts.to_account_metas(None),
        data:       party_round::instruction::CloseFundraise {}.data(),
    }
}

pub fn redeem_tokens_ix(
    instance: &Instance,
    redeemer: &Pubkey,
    token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = party_round::accounts::RedeemTokens {
        dao_state:              instance.dao,
        token_mint:             instance.mint,
        treasury:               instance.treasury,
        redeemer:               *redeemer,
        redeemer_token_account: *token_account,
        token_program:          spl_token::ID,
        system_program:         anchor_lang::system_program::ID,
    };
    Instruction {
        program_id: PROGRAM_ID,
        accounts:   accounts.to_account_metas(None),
        data:       party_round::instruction::RedeemTokens { amount }.data(),
    }
}

// ── Token accounts ───────────────────────────────────────────────────────────

/// Creates an SPL token account for `mint` owned by `owner`, paid by `payer`.
pub fn create_token_account(
    svm: &mut LiteSVM,
    payer: &Keypair,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Pubkey {
    let account = Keypair::new();
    let space = spl_token::state::Account::LEN;
    let lamports = svm.minimum_balance_for_rent_exemption(space);
    let ixs = [
        solana_system_interface::instruction::create_account(
            &payer.pubkey(),
            &account.pubkey(),
            lamports,
            space as u64,
            &spl_token::ID,
        ),
        spl_token::instruction::initialize_account3(&spl_token::ID, &account.pubkey(), mint, owner)
            .unwrap(),
    ];
    send(svm, &ixs, payer, &[&account]).expect("token account creation failed");
    account.pubkey()
}

// ── Readers ──────────────────────────────────────────────────────────────────

pub fn lamports(svm: &LiteSVM, address: &Pubkey) -> u64 {
    svm.get_balance(address).unwrap_or(0)
}

pub fn dao_state(svm: &LiteSVM, instance: &Instance) -> DaoState {
    let account = svm.get_account(&instance.dao).expect("instance record missing");
    DaoState::try_deserialize(&mut account.data.as_slice()).unwrap()
}

pub fn mint(svm: &LiteSVM, address: &Pubkey) -> Mint {
    let account = svm.get_account(address).expect("mint missing");
    Mint::try_deserialize(&mut account.data.as_slice()).unwrap()
}

pub fn token_balance(svm: &LiteSVM, address: &Pubkey) -> u64 {
    let account = svm.get_account(address).expect("token account missing");
    TokenAccount::try_deserialize(&mut account.data.as_slice())
        .unwrap()
        .amount
}
