use soroban_sdk::{symbol_short, Address, BytesN, Env, String, Symbol, Vec};

pub(crate) fn minted(env: &Env, to: &Address, first_token_id: u32, quantity: u32, owner_mint: bool) {
    env.events().publish(
        (symbol_short!("mint"), to.clone()),
        (first_token_id, quantity, owner_mint),
    );
}

/// topics: `["refund", caller]`, data: `[token_ids, amount]`
pub(crate) fn refunded(env: &Env, caller: &Address, token_ids: &Vec<u32>, amount: i128) {
    env.events().publish(
        (symbol_short!("refund"), caller.clone()),
        (token_ids.clone(), amount),
    );
}

pub(crate) fn transferred(env: &Env, from: &Address, to: &Address, token_id: u32) {
    env.events().publish(
        (symbol_short!("transfer"), from.clone(), to.clone()),
        token_id,
    );
}

pub(crate) fn withdrawn(env: &Env, to: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("withdraw"), to.clone()), amount);
}

pub(crate) fn sale_status(env: &Env, sale: Symbol, active: bool) {
    env.events().publish((symbol_short!("sale"), sale), active);
}

pub(crate) fn refund_countdown(env: &Env, refund_end_time: u64) {
    env.events()
        .publish((symbol_short!("refundtm"),), refund_end_time);
}

pub(crate) fn refund_address_set(env: &Env, refund_address: &Address) {
    env.events().publish(
        (symbol_short!("config"), symbol_short!("refundto")),
        refund_address.clone(),
    );
}

pub(crate) fn merkle_root_set(env: &Env, root: &BytesN<32>) {
    env.events().publish(
        (symbol_short!("config"), symbol_short!("root")),
        root.clone(),
    );
}

pub(crate) fn base_uri_set(env: &Env, uri: &String) {
    env.events().publish(
        (symbol_short!("config"), symbol_short!("base_uri")),
        uri.clone(),
    );
}
