use crate::events::{
    ContractEvent,
    GameStartedEvent,
    Side,
};
use fuels::types::{
    Address,
    AssetId,
    ContractId,
};
use thiserror::Error;

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Failures surfaced by the chain seams. Estimation and submission are kept
/// apart so the controller can report which half of a wager attempt died.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("gas estimation failed: {0}")]
    Estimation(String),
    #[error("transaction submission failed: {0}")]
    Submission(String),
    #[error("state query failed: {0}")]
    Query(String),
    #[error("transaction receipt is missing the {0} log")]
    MissingLog(&'static str),
}

/// Logs decoded from a settled enter-game transaction.
#[derive(Debug, Clone, Default)]
pub struct EnterGameReceipt {
    pub logs: Vec<ContractEvent>,
}

impl EnterGameReceipt {
    pub fn game_started(&self) -> Option<&GameStartedEvent> {
        self.logs.iter().find_map(|log| match log {
            ContractEvent::GameStarted(inner) => Some(inner),
            _ => None,
        })
    }
}

/// Signer-bearing handle for the double-or-nothing contract. The method
/// signatures are the contract's; implementations live outside this crate.
pub trait GameContract {
    /// Account the handle signs with.
    fn account(&self) -> Address;

    /// Contract id, i.e. the spender of any token allowance.
    fn id(&self) -> ContractId;

    fn estimate_enter_game_gas(
        &self,
        wager: u64,
        side: Side,
        token: AssetId,
        attached: u64,
    ) -> impl Future<Output = ChainResult<u64>>;

    fn enter_game(
        &self,
        wager: u64,
        side: Side,
        token: AssetId,
        attached: u64,
        gas_limit: u64,
    ) -> impl Future<Output = ChainResult<EnterGameReceipt>>;
}

/// Handle for the wager token when the game is played with a non-native asset.
pub trait TokenContract {
    fn allowance(
        &self,
        owner: Address,
        spender: ContractId,
    ) -> impl Future<Output = ChainResult<u128>>;

    fn approve(
        &self,
        spender: ContractId,
        amount: u128,
    ) -> impl Future<Output = ChainResult<()>>;
}

/// Standing subscription to contract logs, scoped to the game contract.
/// Dropped together with the session that registered it.
pub trait EventSource {
    fn next_event(&mut self) -> impl Future<Output = ChainResult<ContractEvent>>;
}
