//! Client for the double-or-nothing wagering game. The chain surface (game
//! contract, wager token, event feed) is consumed through the traits in
//! [`chain`]; [`flip`] drives a round from selection through resolution, and
//! [`session`] manages the wallet connection behind it.

pub mod chain;

pub mod events;

pub mod flip;

pub mod options;

pub mod session;

pub mod test_helpers;

pub use chain::{
    ChainError,
    ChainResult,
    EnterGameReceipt,
    EventSource,
    GameContract,
    TokenContract,
};
pub use events::{
    ContractEvent,
    Side,
};
pub use flip::{
    FlipController,
    FlipPhase,
    FlipSnapshot,
    GasPolicy,
    Wager,
    WagerStatus,
};
pub use session::{
    Session,
    SessionConfig,
    SessionManager,
};
