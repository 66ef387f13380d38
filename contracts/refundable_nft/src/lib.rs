#![no_std]

use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, BytesN, Env, String,
    Vec,
};

mod errors;
mod events;


pub use errors::ContractError;

// ── Defaults ────────────────────────────────────────────────────────────────

/// 0.1 XLM, in stroops.
pub const MINT_PRICE: i128 = 1_000_000;
pub const MAX_MINT_SUPPLY: u32 = 8_000;
pub const MAX_USER_MINT_AMOUNT: u32 = 5;
/// 45 days, in seconds.
pub const REFUND_PERIOD: u64 = 45 * 24 * 60 * 60;
/// Longest base URI `token_uri` can extend with a token id.
pub const MAX_BASE_URI_LEN: u32 = 200;

// ── Data Types ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct SaleConfig {
    /// Price of one token in the payment token's smallest unit.
    pub mint_price: i128,
    /// Upper bound on the number of tokens ever minted.
    pub max_mint_supply: u32,
    /// Per-account cap on public and presale mints combined.
    pub max_user_mint_amount: u32,
    /// Length of the refund guarantee window in seconds.
    pub refund_period: u64,
}

impl SaleConfig {
    pub fn standard() -> Self {
        SaleConfig {
            mint_price: MINT_PRICE,
            max_mint_supply: MAX_MINT_SUPPLY,
            max_user_mint_amount: MAX_USER_MINT_AMOUNT,
            refund_period: REFUND_PERIOD,
        }
    }

    /// Rejects parameters that would make mints free or unreachable.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.mint_price < 0 || self.max_mint_supply == 0 || self.max_user_mint_amount == 0 {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }

    /// Cost of `quantity` tokens; `None` on overflow.
    pub fn price_of(&self, quantity: u32) -> Option<i128> {
        self.mint_price.checked_mul(i128::from(quantity))
    }

    /// Refund deadline for a window opened at `now`.
    pub fn refund_end_from(&self, now: u64) -> Result<u64, ContractError> {
        now.checked_add(self.refund_period)
            .ok_or(ContractError::InvalidConfig)
    }
}

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// The administrator allowed to mint for free, toggle sales and withdraw.
    ContractOwner,
    /// The token mints are paid in.
    PaymentToken,
    Config,
    PublicSaleActive,
    PresaleActive,
    /// End of the refund guarantee as a ledger timestamp.
    RefundEndTime,
    /// Receives every refunded token.
    RefundAddress,
    /// Root of the presale allow-list.
    MerkleRoot,
    BaseUri,
    /// Number of tokens minted so far; also the next token id.
    TotalMinted,
    TokenOwner(u32),
    HasRefunded(u32),
    IsOwnerMint(u32),
    /// Number of tokens held by an address.
    Balance(Address),
    /// Public and presale mints made by an address.
    NumberMinted(Address),
}

// ── Contract ────────────────────────────────────────────────────────────────

#[contract]
pub struct RefundableNftContract;

#[contractimpl]
impl RefundableNftContract {
    /// Sets up the sale and starts the refund guarantee window.
    ///
    /// # Arguments
    /// * `owner`         – The contract administrator; also the initial refund address.
    /// * `payment_token` – The token contract mints are paid in.
    /// * `config`        – Price, supply and window parameters.
    pub fn initialize(
        env: Env,
        owner: Address,
        payment_token: Address,
        config: SaleConfig,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::ContractOwner) {
            return Err(ContractError::AlreadyInitialized);
        }

        owner.require_auth();

        config.validate()?;
        let refund_end_time = config.refund_end_from(env.ledger().timestamp())?;

        let instance = env.storage().instance();
        instance.set(&DataKey::ContractOwner, &owner);
        instance.set(&DataKey::PaymentToken, &payment_token);
        instance.set(&DataKey::Config, &config);
        instance.set(&DataKey::PublicSaleActive, &false);
        instance.set(&DataKey::PresaleActive, &false);
        instance.set(&DataKey::RefundEndTime, &refund_end_time);
        instance.set(&DataKey::RefundAddress, &owner);
        instance.set(&DataKey::TotalMinted, &0u32);

        log!(&env, "refundable nft initialized, owner {}", owner);
        events::refund_countdown(&env, refund_end_time);
        Ok(())
    }

    // ── Minting ─────────────────────────────────────────────────────────

    /// Mint `quantity` tokens during the public sale.
    ///
    /// `payment` is pulled from `minter` and must cover
    /// `quantity × mint_price`; any excess stays with the contract.
    pub fn public_sale_mint(
        env: Env,
        minter: Address,
        quantity: u32,
        payment: i128,
    ) -> Result<(), ContractError> {
        minter.require_auth();

        let config = Self::read_config(&env)?;
        if !Self::flag(&env, &DataKey::PublicSaleActive) {
            return Err(ContractError::PublicSaleNotActive);
        }
        if quantity == 0 {
            return Err(ContractError::InvalidQuantity);
        }

        Self::check_payment(&config, quantity, payment)?;
        Self::check_user_limit(&env, &config, &minter, quantity)?;
        Self::check_supply(&env, &config, quantity)?;

        Self::collect_payment(&env, &minter, payment)?;
        Self::record_sale_mint(&env, &minter, quantity);
        Self::mint_tokens(&env, &minter, quantity, false);
        Ok(())
    }

    /// Mint `quantity` tokens during the presale. `proof` must link
    /// `minter`'s allow-list leaf to the stored Merkle root.
    pub fn pre_sale_mint(
        env: Env,
        minter: Address,
        quantity: u32,
        payment: i128,
        proof: Vec<BytesN<32>>,
    ) -> Result<(), ContractError> {
        minter.require_auth();

        let config = Self::read_config(&env)?;
        if !Self::flag(&env, &DataKey::PresaleActive) {
            return Err(ContractError::PresaleNotActive);
        }
        if !Self::is_allowlisted(&env, &minter, &proof) {
            return Err(ContractError::NotOnAllowList);
        }
        if quantity == 0 {
            return Err(ContractError::InvalidQuantity);
        }

        Self::check_payment(&config, quantity, payment)?;
        Self::check_user_limit(&env, &config, &minter, quantity)?;
        Self::check_supply(&env, &config, quantity)?;

        Self::collect_payment(&env, &minter, payment)?;
        Self::record_sale_mint(&env, &minter, quantity);
        Self::mint_tokens(&env, &minter, quantity, false);
        Ok(())
    }

    /// Mint `quantity` tokens to the owner free of charge. These tokens can
    /// never be refunded.
    pub fn owner_mint(env: Env, quantity: u32) -> Result<(), ContractError> {
        let owner = Self::require_owner(&env)?;
        let config = Self::read_config(&env)?;
        if quantity == 0 {
            return Err(ContractError::InvalidQuantity);
        }
        Self::check_supply(&env, &config, quantity)?;

        Self::mint_tokens(&env, &owner, quantity, true);
        Ok(())
    }

    // ── Refunds & funds ─────────────────────────────────────────────────

    /// Return `token_ids` to the refund address and pay the caller
    /// `mint_price` for each of them.
    ///
    /// Every id is checked before anything is moved, so a single bad id
    /// rejects the whole call.
    pub fn refund(env: Env, caller: Address, token_ids: Vec<u32>) -> Result<(), ContractError> {
        caller.require_auth();

        let config = Self::read_config(&env)?;
        if !Self::refund_window_open(&env) {
            return Err(ContractError::RefundExpired);
        }

        let mut checked: Vec<u32> = Vec::new(&env);
        for token_id in token_ids.iter() {
            let holder = Self::read_token_owner(&env, token_id)?;
            if holder != caller {
                return Err(ContractError::NotTokenOwner);
            }
            if Self::is_owner_mint(env.clone(), token_id) {
                return Err(ContractError::OwnerMintNotRefundable);
            }
            if Self::has_refunded(env.clone(), token_id) || checked.contains(token_id) {
                return Err(ContractError::AlreadyRefunded);
            }
            checked.push_back(token_id);
        }

        let refund_address = Self::read_refund_address(&env)?;
        for token_id in token_ids.iter() {
            env.storage()
                .persistent()
                .set(&DataKey::HasRefunded(token_id), &true);
            Self::move_token(&env, &caller, &refund_address, token_id);
        }

        let amount = config
            .price_of(token_ids.len())
            .ok_or(ContractError::InvalidConfig)?;
        if amount > 0 {
            let token_client = token::Client::new(&env, &Self::read_payment_token(&env)?);
            token_client.transfer(&env.current_contract_address(), &caller, &amount);
        }

        log!(&env, "refunded {} tokens to {}", token_ids.len(), caller);
        events::refunded(&env, &caller, &token_ids, amount);
        Ok(())
    }

    /// Send the contract's whole payment-token balance to the owner. Only
    /// possible once the refund guarantee is over.
    pub fn withdraw(env: Env) -> Result<(), ContractError> {
        let owner = Self::require_owner(&env)?;

        if Self::refund_window_open(&env) {
            return Err(ContractError::RefundPeriodNotOver);
        }

        let token_client = token::Client::new(&env, &Self::read_payment_token(&env)?);
        let balance = token_client.balance(&env.current_contract_address());
        if balance > 0 {
            token_client.transfer(&env.current_contract_address(), &owner, &balance);
        }

        log!(&env, "withdrew {} to {}", balance, owner);
        events::withdrawn(&env, &owner, balance);
        Ok(())
    }

    /// Transfer `token_id` from `from` to `to`. The new holder inherits the
    /// refund guarantee.
    pub fn transfer(env: Env, from: Address, to: Address, token_id: u32) -> Result<(), ContractError> {
        from.require_auth();

        let holder = Self::read_token_owner(&env, token_id)?;
        if holder != from {
            return Err(ContractError::NotTokenOwner);
        }

        Self::move_token(&env, &from, &to, token_id);
        Ok(())
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Restart the refund guarantee: it now ends `refund_period` seconds
    /// after the current ledger time.
    pub fn toggle_refund_countdown(env: Env) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        let config = Self::read_config(&env)?;

        let refund_end_time = config.refund_end_from(env.ledger().timestamp())?;
        env.storage()
            .instance()
            .set(&DataKey::RefundEndTime, &refund_end_time);

        events::refund_countdown(&env, refund_end_time);
        Ok(())
    }

    pub fn toggle_public_sale_status(env: Env) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        let active = !Self::flag(&env, &DataKey::PublicSaleActive);
        env.storage()
            .instance()
            .set(&DataKey::PublicSaleActive, &active);

        events::sale_status(&env, symbol_short!("public"), active);
        Ok(())
    }

    pub fn toggle_presale_status(env: Env) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        let active = !Self::flag(&env, &DataKey::PresaleActive);
        env.storage().instance().set(&DataKey::PresaleActive, &active);

        events::sale_status(&env, symbol_short!("presale"), active);
        Ok(())
    }

    pub fn set_refund_address(env: Env, refund_address: Address) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::RefundAddress, &refund_address);

        events::refund_address_set(&env, &refund_address);
        Ok(())
    }

    pub fn set_merkle_root(env: Env, root: BytesN<32>) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        env.storage().instance().set(&DataKey::MerkleRoot, &root);

        events::merkle_root_set(&env, &root);
        Ok(())
    }

    pub fn set_base_uri(env: Env, uri: String) -> Result<(), ContractError> {
        Self::require_owner(&env)?;
        if uri.len() > MAX_BASE_URI_LEN {
            return Err(ContractError::BaseUriTooLong);
        }
        env.storage().instance().set(&DataKey::BaseUri, &uri);

        events::base_uri_set(&env, &uri);
        Ok(())
    }

    // ── View helpers ────────────────────────────────────────────────────

    pub fn name(env: Env) -> String {
        String::from_str(&env, "ERC721RExample")
    }

    pub fn symbol(env: Env) -> String {
        String::from_str(&env, "ERC721R")
    }

    pub fn owner(env: Env) -> Result<Address, ContractError> {
        Self::read_owner(&env)
    }

    pub fn payment_token(env: Env) -> Result<Address, ContractError> {
        Self::read_payment_token(&env)
    }

    pub fn config(env: Env) -> Result<SaleConfig, ContractError> {
        Self::read_config(&env)
    }

    pub fn public_sale_active(env: Env) -> bool {
        Self::flag(&env, &DataKey::PublicSaleActive)
    }

    pub fn presale_active(env: Env) -> bool {
        Self::flag(&env, &DataKey::PresaleActive)
    }

    /// Returns the ledger timestamp at which the refund guarantee ends.
    pub fn get_refund_guarantee_end_time(env: Env) -> u64 {
        Self::read_refund_end_time(&env)
    }

    /// True while the current ledger time is at or before the end time.
    pub fn is_refund_guarantee_active(env: Env) -> bool {
        Self::refund_window_open(&env)
    }

    pub fn refund_address(env: Env) -> Result<Address, ContractError> {
        Self::read_refund_address(&env)
    }

    pub fn merkle_root(env: Env) -> Option<BytesN<32>> {
        env.storage().instance().get(&DataKey::MerkleRoot)
    }

    pub fn base_uri(env: Env) -> String {
        env.storage()
            .instance()
            .get(&DataKey::BaseUri)
            .unwrap_or_else(|| String::from_str(&env, ""))
    }

    /// Returns `base_uri` followed by the decimal token id, or an empty
    /// string while no base URI is set.
    pub fn token_uri(env: Env, token_id: u32) -> Result<String, ContractError> {
        Self::read_token_owner(&env, token_id)?;

        let base = Self::base_uri(env.clone());
        if base.is_empty() {
            return Ok(base);
        }

        // u32::MAX has 10 digits.
        let mut buf = [0u8; MAX_BASE_URI_LEN as usize + 10];
        let base_len = base.len() as usize;
        base.copy_into_slice(&mut buf[..base_len]);

        let mut digits = [0u8; 10];
        let mut count = 0;
        let mut rest = token_id;
        loop {
            digits[count] = b'0' + (rest % 10) as u8;
            count += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        for i in 0..count {
            buf[base_len + i] = digits[count - 1 - i];
        }

        Ok(String::from_bytes(&env, &buf[..base_len + count]))
    }

    pub fn total_minted(env: Env) -> u32 {
        Self::read_total_minted(&env)
    }

    /// Returns the number of tokens held by `owner`.
    pub fn balance_of(env: Env, owner: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(owner))
            .unwrap_or(0)
    }

    pub fn owner_of(env: Env, token_id: u32) -> Result<Address, ContractError> {
        Self::read_token_owner(&env, token_id)
    }

    /// Returns how many tokens `minter` bought in the public sale and presale.
    pub fn number_minted(env: Env, minter: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::NumberMinted(minter))
            .unwrap_or(0)
    }

    pub fn has_refunded(env: Env, token_id: u32) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::HasRefunded(token_id))
            .unwrap_or(false)
    }

    pub fn is_owner_mint(env: Env, token_id: u32) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::IsOwnerMint(token_id))
            .unwrap_or(false)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn read_owner(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::ContractOwner)
            .ok_or(ContractError::NotInitialized)
    }

    /// Loads the owner and requires its authorization.
    fn require_owner(env: &Env) -> Result<Address, ContractError> {
        let owner = Self::read_owner(env)?;
        owner.require_auth();
        Ok(owner)
    }

    fn read_config(env: &Env) -> Result<SaleConfig, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ContractError::NotInitialized)
    }

    fn read_payment_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::PaymentToken)
            .ok_or(ContractError::NotInitialized)
    }

    fn read_refund_address(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::RefundAddress)
            .ok_or(ContractError::NotInitialized)
    }

    fn read_refund_end_time(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::RefundEndTime)
            .unwrap_or(0)
    }

    fn read_total_minted(env: &Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::TotalMinted)
            .unwrap_or(0)
    }

    fn read_token_owner(env: &Env, token_id: u32) -> Result<Address, ContractError> {
        env.storage()
            .persistent()
            .get(&DataKey::TokenOwner(token_id))
            .ok_or(ContractError::TokenDoesNotExist)
    }

    fn flag(env: &Env, key: &DataKey) -> bool {
        env.storage().instance().get(key).unwrap_or(false)
    }

    fn refund_window_open(env: &Env) -> bool {
        env.ledger().timestamp() <= Self::read_refund_end_time(env)
    }

    fn is_allowlisted(env: &Env, account: &Address, proof: &Vec<BytesN<32>>) -> bool {
        let root: Option<BytesN<32>> = env.storage().instance().get(&DataKey::MerkleRoot);
        match root {
            Some(root) => allowlist::verify(env, &root, &allowlist::leaf_for(env, account), proof),
            None => false,
        }
    }

    fn check_payment(config: &SaleConfig, quantity: u32, payment: i128) -> Result<(), ContractError> {
        // A cost too large for i128 cannot be covered by any payment.
        match config.price_of(quantity) {
            Some(cost) if payment >= cost => Ok(()),
            _ => Err(ContractError::NotEnoughPayment),
        }
    }

    fn check_user_limit(
        env: &Env,
        config: &SaleConfig,
        minter: &Address,
        quantity: u32,
    ) -> Result<(), ContractError> {
        let minted = Self::number_minted(env.clone(), minter.clone());
        if u64::from(minted) + u64::from(quantity) > u64::from(config.max_user_mint_amount) {
            return Err(ContractError::OverMintLimit);
        }
        Ok(())
    }

    fn check_supply(env: &Env, config: &SaleConfig, quantity: u32) -> Result<(), ContractError> {
        let total = Self::read_total_minted(env);
        if u64::from(total) + u64::from(quantity) > u64::from(config.max_mint_supply) {
            return Err(ContractError::MaxMintSupplyReached);
        }
        Ok(())
    }

    fn collect_payment(env: &Env, from: &Address, amount: i128) -> Result<(), ContractError> {
        if amount > 0 {
            let token_client = token::Client::new(env, &Self::read_payment_token(env)?);
            token_client.transfer(from, &env.current_contract_address(), &amount);
        }
        Ok(())
    }

    fn record_sale_mint(env: &Env, minter: &Address, quantity: u32) {
        let minted = Self::number_minted(env.clone(), minter.clone());
        env.storage()
            .persistent()
            .set(&DataKey::NumberMinted(minter.clone()), &(minted + quantity));
    }

    /// Mints sequential ids starting at the current total. Callers have
    /// already checked the supply bound.
    fn mint_tokens(env: &Env, to: &Address, quantity: u32, owner_mint: bool) {
        let first_token_id = Self::read_total_minted(env);
        let next_token_id = first_token_id + quantity;

        for token_id in first_token_id..next_token_id {
            env.storage()
                .persistent()
                .set(&DataKey::TokenOwner(token_id), to);
            if owner_mint {
                env.storage()
                    .persistent()
                    .set(&DataKey::IsOwnerMint(token_id), &true);
            }
        }

        let balance = Self::balance_of(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Balance(to.clone()), &(balance + quantity));
        env.storage()
            .instance()
            .set(&DataKey::TotalMinted, &next_token_id);

        events::minted(env, to, first_token_id, quantity, owner_mint);
    }

    fn move_token(env: &Env, from: &Address, to: &Address, token_id: u32) {
        let from_balance = Self::balance_of(env.clone(), from.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Balance(from.clone()), &(from_balance - 1));

        let to_balance = Self::balance_of(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Balance(to.clone()), &(to_balance + 1));

        env.storage()
            .persistent()
            .set(&DataKey::TokenOwner(token_id), to);

        events::transferred(env, from, to, token_id);
    }
}
