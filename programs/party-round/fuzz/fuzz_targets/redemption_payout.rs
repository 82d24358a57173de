#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use party_round::settlement::{redemption_payout, tokens_for_payment};

#[derive(Arbitrary, Debug)]
struct Input {
    treasury_balance: u64,
    redeem_amount: u64,
    current_supply: u64,
    payment: u64,
    price: u64,
}

fuzz_target!(|input: Input| {
    // Oracle in u128: the payout is the exact floor and never exceeds the balance.
    if let Ok(payout) = redemption_payout(
        input.treasury_balance,
        input.redeem_amount,
        input.current_supply,
    ) {
        assert!(input.redeem_amount > 0 && input.redeem_amount <= input.current_supply);
        assert!(payout <= input.treasury_balance);
        let exact = input.treasury_balance as u128 * input.redeem_amount as u128;
        let supply = input.current_supply as u128;
        assert!(payout as u128 * supply <= exact);
        assert!((payout as u128 + 1) * supply > exact);
    } else {
        assert!(
            input.redeem_amount == 0
                || input.current_supply == 0
                || input.redeem_amount > input.current_supply
        );
    }

    if let Ok(tokens) = tokens_for_payment(input.payment, input.price) {
        assert!(tokens > 0);
        assert_eq!(tokens, input.payment / input.price);
    }
});
