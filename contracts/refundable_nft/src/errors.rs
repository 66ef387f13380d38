use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    PublicSaleNotActive = 3,
    PresaleNotActive = 4,
    NotEnoughPayment = 5,
    MaxMintSupplyReached = 6,
    OverMintLimit = 7,
    NotOnAllowList = 8,
    NotTokenOwner = 9,
    /// Owner-minted tokens were never paid for.
    OwnerMintNotRefundable = 10,
    AlreadyRefunded = 11,
    RefundExpired = 12,
    RefundPeriodNotOver = 13,
    TokenDoesNotExist = 14,
    InvalidQuantity = 15,
    /// Sale parameters out of range, or arithmetic on them overflowed.
    InvalidConfig = 16,
    BaseUriTooLong = 17,
}

impl ContractError {
    /// Human-readable revert reason, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            ContractError::AlreadyInitialized => "Already initialized",
            ContractError::NotInitialized => "Not initialized",
            ContractError::PublicSaleNotActive => "Public sale is not active",
            ContractError::PresaleNotActive => "Presale is not active",
            ContractError::NotEnoughPayment => "Not enough eth sent",
            ContractError::MaxMintSupplyReached => "Max mint supply reached",
            ContractError::OverMintLimit => "Over mint limit",
            ContractError::NotOnAllowList => "Not on allow list",
            ContractError::NotTokenOwner => "Not token owner",
            ContractError::OwnerMintNotRefundable => "Freely minted NFTs cannot be refunded",
            ContractError::AlreadyRefunded => "Already refunded",
            ContractError::RefundExpired => "Refund expired",
            ContractError::RefundPeriodNotOver => "Refund period not over",
            ContractError::TokenDoesNotExist => "Token does not exist",
            ContractError::InvalidQuantity => "Quantity must be positive",
            ContractError::InvalidConfig => "Invalid sale config",
            ContractError::BaseUriTooLong => "Base URI too long",
        }
    }
}
