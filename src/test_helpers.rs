//! In-memory stand-ins for the chain seams. Used by the test suite and by the
//! demo binary, which plays against this fake chain the way the real frontend
//! plays against the deployed contract.

use crate::{
    chain::{
        ChainError,
        ChainResult,
        EnterGameReceipt,
        EventSource,
        GameContract,
        TokenContract,
    },
    events::{
        ContractEvent,
        GameStartedEvent,
        Side,
    },
    flip::FlipController,
    options::is_native,
};
use fuels::types::{
    Address,
    AssetId,
    ContractId,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};
use tokio::sync::mpsc;

/// Everything the fake game recorded about one enter-game submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedWager {
    pub wager: u64,
    pub side: Side,
    pub token: AssetId,
    pub attached: u64,
    pub gas_limit: u64,
}

#[derive(Debug)]
struct FakeChainState {
    allowances: HashMap<(Address, ContractId), u128>,
    gas_estimate: u64,
    fail_estimation: Option<String>,
    fail_submission: Option<String>,
    omit_started_log: bool,
    next_game_id: u64,
    submissions: Vec<SubmittedWager>,
    auto_resolve: Option<Duration>,
}

impl Default for FakeChainState {
    fn default() -> Self {
        FakeChainState {
            allowances: HashMap::new(),
            gas_estimate: 10_000,
            fail_estimation: None,
            fail_submission: None,
            omit_started_log: false,
            next_game_id: 1,
            submissions: Vec::new(),
            auto_resolve: None,
        }
    }
}

#[derive(Clone)]
pub struct FakeGame {
    account: Address,
    contract_id: ContractId,
    state: Arc<Mutex<FakeChainState>>,
    events: mpsc::Sender<ContractEvent>,
}

impl GameContract for FakeGame {
    fn account(&self) -> Address {
        self.account
    }

    fn id(&self) -> ContractId {
        self.contract_id
    }

    async fn estimate_enter_game_gas(
        &self,
        _wager: u64,
        _side: Side,
        _token: AssetId,
        _attached: u64,
    ) -> ChainResult<u64> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_estimation {
            return Err(ChainError::Estimation(message.clone()));
        }
        Ok(state.gas_estimate)
    }

    async fn enter_game(
        &self,
        wager: u64,
        side: Side,
        token: AssetId,
        attached: u64,
        gas_limit: u64,
    ) -> ChainResult<EnterGameReceipt> {
        let (game_id, auto_resolve, omit_log) = {
            let mut state = self.state.lock().unwrap();
            if let Some(message) = &state.fail_submission {
                return Err(ChainError::Submission(message.clone()));
            }
            state.submissions.push(SubmittedWager {
                wager,
                side,
                token,
                attached,
                gas_limit,
            });
            let game_id = state.next_game_id;
            state.next_game_id += 1;
            (game_id, state.auto_resolve, state.omit_started_log)
        };
        if omit_log {
            return Ok(EnterGameReceipt::default());
        }
        if let Some(delay) = auto_resolve {
            let events = self.events.clone();
            let better = self.account;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let winner = rand::random();
                let _ = events
                    .send(ContractEvent::game_finished(
                        better, token, winner, wager, game_id,
                    ))
                    .await;
            });
        }
        Ok(EnterGameReceipt {
            logs: vec![ContractEvent::GameStarted(GameStartedEvent {
                better: self.account,
                token,
                side,
                wager,
                game_id,
            })],
        })
    }
}

#[derive(Clone)]
pub struct FakeToken {
    account: Address,
    state: Arc<Mutex<FakeChainState>>,
    events: mpsc::Sender<ContractEvent>,
}

impl TokenContract for FakeToken {
    async fn allowance(
        &self,
        owner: Address,
        spender: ContractId,
    ) -> ChainResult<u128> {
        let state = self.state.lock().unwrap();
        Ok(state
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, spender: ContractId, amount: u128) -> ChainResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            state.allowances.insert((self.account, spender), amount);
        }
        let _ = self
            .events
            .send(ContractEvent::approval(
                self.account,
                Address::new(*spender),
                amount,
            ))
            .await;
        Ok(())
    }
}

pub struct FakeEvents {
    recv: mpsc::Receiver<ContractEvent>,
}

impl EventSource for FakeEvents {
    async fn next_event(&mut self) -> ChainResult<ContractEvent> {
        match self.recv.recv().await {
            Some(event) => Ok(event),
            None => Err(ChainError::Query(String::from("event stream closed"))),
        }
    }
}

/// Bundles the fakes behind one scriptable chain, in the spirit of the real
/// frontend's single provider connection.
pub struct TestContext {
    state: Arc<Mutex<FakeChainState>>,
    events_tx: mpsc::Sender<ContractEvent>,
    events_rx: Option<mpsc::Receiver<ContractEvent>>,
    pub account: Address,
    pub contract_id: ContractId,
    pub game_token: AssetId,
}

impl TestContext {
    pub fn native() -> Self {
        Self::with_token(AssetId::zeroed())
    }

    pub fn with_token(game_token: AssetId) -> Self {
        let (events_tx, events_rx) = mpsc::channel(32);
        TestContext {
            state: Arc::new(Mutex::new(FakeChainState::default())),
            events_tx,
            events_rx: Some(events_rx),
            account: Address::new([2u8; 32]),
            contract_id: ContractId::new([9u8; 32]),
            game_token,
        }
    }

    pub fn game(&self) -> FakeGame {
        FakeGame {
            account: self.account,
            contract_id: self.contract_id,
            state: self.state.clone(),
            events: self.events_tx.clone(),
        }
    }

    pub fn token(&self) -> FakeToken {
        FakeToken {
            account: self.account,
            state: self.state.clone(),
            events: self.events_tx.clone(),
        }
    }

    pub fn controller(&self) -> FlipController<FakeGame, FakeToken> {
        let token = if is_native(&self.game_token) {
            None
        } else {
            Some(self.token())
        };
        FlipController::new(self.game(), token, self.game_token)
    }

    /// Takes the single event subscription. Panics if taken twice.
    pub fn events(&mut self) -> FakeEvents {
        FakeEvents {
            recv: self
                .events_rx
                .take()
                .expect("event source already taken"),
        }
    }

    pub fn set_allowance(&self, owner: Address, amount: u128) {
        let mut state = self.state.lock().unwrap();
        state.allowances.insert((owner, self.contract_id), amount);
    }

    pub fn set_gas_estimate(&self, gas: u64) {
        self.state.lock().unwrap().gas_estimate = gas;
    }

    pub fn fail_estimation(&self, message: &str) {
        self.state.lock().unwrap().fail_estimation = Some(message.to_string());
    }

    pub fn fail_submission(&self, message: &str) {
        self.state.lock().unwrap().fail_submission = Some(message.to_string());
    }

    pub fn omit_started_log(&self) {
        self.state.lock().unwrap().omit_started_log = true;
    }

    pub fn set_auto_resolve(&self, delay: Duration) {
        self.state.lock().unwrap().auto_resolve = Some(delay);
    }

    pub fn submissions(&self) -> Vec<SubmittedWager> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub async fn send_approval(&self, owner: Address, amount: u128) {
        let spender = Address::new(*self.contract_id);
        let _ = self
            .events_tx
            .send(ContractEvent::approval(owner, spender, amount))
            .await;
    }

    pub async fn finish_game(
        &self,
        better: Address,
        game_id: u64,
        winner: bool,
        wager: u64,
    ) {
        let _ = self
            .events_tx
            .send(ContractEvent::game_finished(
                better,
                self.game_token,
                winner,
                wager,
                game_id,
            ))
            .await;
    }
}
