#![no_main]

use anchor_lang::prelude::Pubkey;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use party_round::engine;
use party_round::state::{DaoState, InitializeDaoParams, InstanceKeys};

const NOW: i64 = 1_700_000_000;

#[derive(Arbitrary, Debug)]
enum Step {
    Contribute { who: u8, lamports: u32, at: u16 },
    Close { by_admin: bool },
    Redeem { who: u8, tokens: u32 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    price: u16,
    cap: u32,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let admin = Pubkey::new_from_array([0xAA; 32]);
    let params = InitializeDaoParams {
        token_name: "Fuzz".to_string(),
        token_symbol: "FZ".to_string(),
        total_supply_cap: input.cap as u64,
        fundraise_end_ts: NOW + 3_600,
        token_price_lamports: input.price as u64,
        allowlisted_addresses: vec![],
    };
    let mut state = DaoState::default();
    let keys = InstanceKeys { admin, ..Default::default() };
    if engine::initialize(&mut state, keys, params, 0, NOW).is_err() {
        return;
    }

    let mut treasury: u64 = 0;
    let mut supply: u64 = 0;
    let mut holdings = [0u64; 4];
    let mut was_closed = false;

    for step in input.steps.iter().take(64) {
        match *step {
            Step::Contribute { who, lamports, at } => {
                let who_key = Pubkey::new_from_array([who % 4; 32]);
                let now = NOW + at as i64;
                if let Ok(tokens) = engine::contribute(&mut state, &who_key, lamports as u64, now) {
                    assert!(!was_closed && now < state.fundraise_end_ts);
                    treasury += lamports as u64;
                    supply += tokens;
                    holdings[(who % 4) as usize] += tokens;
                }
            }
            Step::Close { by_admin } => {
                let caller = if by_admin { admin } else { Pubkey::new_from_array([0xBB; 32]) };
                if engine::close(&mut state, &caller).is_ok() {
                    assert!(by_admin && !was_closed);
                    was_closed = true;
                }
            }
            Step::Redeem { who, tokens } => {
                let slot = (who % 4) as usize;
                let before = treasury;
                if let Ok(payout) =
                    engine::redeem(&mut state, tokens as u64, holdings[slot], treasury, supply)
                {
                    assert!(was_closed);
                    assert!(payout <= before);
                    holdings[slot] -= tokens as u64;
                    supply -= tokens as u64;
                    treasury -= payout;
                }
            }
        }
        assert!(state.tokens_minted <= state.total_supply_cap);
        assert_eq!(state.fundraise_ended, was_closed);
        if supply == 0 && was_closed && state.tokens_redeemed > 0 {
            assert_eq!(treasury, 0);
        }
    }
});
