use fuels::types::{
    Address,
    AssetId,
};

/// Logs emitted by the double-or-nothing contract that the client reacts to.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ContractEvent {
    Approval(ApprovalEvent),
    GameStarted(GameStartedEvent),
    GameFinished(GameFinishedEvent),
}

#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum Side {
    Heads,
    Tails,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: u128,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct GameStartedEvent {
    pub better: Address,
    pub token: AssetId,
    pub side: Side,
    pub wager: u64,
    pub game_id: u64,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct GameFinishedEvent {
    pub better: Address,
    pub token: AssetId,
    pub winner: bool,
    pub wager: u64,
    pub game_id: u64,
}

impl ContractEvent {
    pub fn approval(owner: Address, spender: Address, amount: u128) -> Self {
        ContractEvent::Approval(ApprovalEvent {
            owner,
            spender,
            amount,
        })
    }

    pub fn game_finished(
        better: Address,
        token: AssetId,
        winner: bool,
        wager: u64,
        game_id: u64,
    ) -> Self {
        ContractEvent::GameFinished(GameFinishedEvent {
            better,
            token,
            winner,
            wager,
            game_id,
        })
    }
}
