use crate::{
    chain::{
        ChainError,
        ChainResult,
        EnterGameReceipt,
        GameContract,
        TokenContract,
    },
    events::{
        ApprovalEvent,
        ContractEvent,
        GameFinishedEvent,
        Side,
    },
    options::{
        REQUIRED_ALLOWANCE,
        SideOption,
        StakeOption,
        is_native,
        side_options,
        stake_options,
    },
};
use fuels::types::{
    Address,
    AssetId,
};
use thiserror::Error;
use tracing::{
    debug,
    warn,
};

/// Characters of an error message kept for on-screen display.
const DISPLAY_ERROR_LIMIT: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlipError {
    #[error("choose a side and a stake first")]
    SelectionsIncomplete,
    #[error("token allowance has not been granted")]
    NotApproved,
    #[error("a wager is already in flight")]
    GameInProgress,
    #[error("no token contract handle for a non-native wager")]
    MissingTokenContract,
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Multiplier applied to gas estimates before submission. The estimator has a
/// history of undershooting, so submissions pad the estimate; the ratio is
/// configurable instead of baked in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasPolicy {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        // 30% headroom
        GasPolicy {
            numerator: 13,
            denominator: 10,
        }
    }
}

impl GasPolicy {
    pub fn from_pad_percent(percent: u64) -> Self {
        GasPolicy {
            numerator: 100 + percent,
            denominator: 100,
        }
    }

    pub fn padded(&self, estimate: u64) -> u64 {
        if self.denominator == 0 {
            return estimate;
        }
        let padded =
            estimate as u128 * self.numerator as u128 / self.denominator as u128;
        padded.min(u64::MAX as u128) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WagerStatus {
    Unstarted,
    PendingConfirmation,
    AwaitingResolution,
    Finished,
    Errored,
}

/// One round of the game. The game id is assigned by the contract via the
/// submission receipt and never reassigned afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wager {
    pub token: AssetId,
    pub amount: u64,
    pub side: Side,
    pub game_id: Option<u64>,
    pub winner: Option<bool>,
    pub status: WagerStatus,
}

impl Wager {
    fn new(token: AssetId, amount: u64, side: Side) -> Self {
        Wager {
            token,
            amount,
            side,
            game_id: None,
            winner: None,
            status: WagerStatus::Unstarted,
        }
    }

    fn assign_game_id(&mut self, game_id: u64) {
        if self.game_id.is_none() {
            self.game_id = Some(game_id);
        }
    }
}

/// What the view layer renders; one variant per screen of the flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlipPhase {
    NeedsApproval,
    Choosing { ready: bool },
    WaitingForConfirmation,
    WaitingForFlip { game_id: u64 },
    Finished { winner: bool, game_id: u64 },
    Errored { message: String },
}

#[derive(Clone, Debug)]
pub struct FlipSnapshot {
    pub phase: FlipPhase,
    pub sides: Vec<SideOption>,
    pub stakes: Vec<StakeOption>,
    pub side_choice: Option<usize>,
    pub stake_choice: Option<usize>,
    pub account: Address,
}

/// Drives a single round: approval gating, side/stake selection, wager
/// submission, and event-driven resolution. Events are matched against the
/// controller's current wager, so listeners never act on captured state.
pub struct FlipController<G, T> {
    game: G,
    token_contract: Option<T>,
    game_token: AssetId,
    sides: Vec<SideOption>,
    stakes: Vec<StakeOption>,
    required_allowance: u128,
    gas_policy: GasPolicy,
    approved: bool,
    side_choice: Option<usize>,
    stake_choice: Option<usize>,
    wager: Option<Wager>,
    last_error: Option<String>,
}

impl<G: GameContract, T: TokenContract> FlipController<G, T> {
    pub fn new(game: G, token_contract: Option<T>, game_token: AssetId) -> Self {
        // Native wagers carry their stake as attached value; there is no
        // allowance to check.
        let approved = is_native(&game_token);
        FlipController {
            game,
            token_contract,
            sides: side_options(),
            stakes: stake_options(&game_token),
            game_token,
            required_allowance: REQUIRED_ALLOWANCE,
            gas_policy: GasPolicy::default(),
            approved,
            side_choice: None,
            stake_choice: None,
            wager: None,
            last_error: None,
        }
    }

    pub fn with_gas_policy(mut self, gas_policy: GasPolicy) -> Self {
        self.gas_policy = gas_policy;
        self
    }

    pub fn with_required_allowance(mut self, amount: u128) -> Self {
        self.required_allowance = amount;
        self
    }

    pub fn account(&self) -> Address {
        self.game.account()
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn wager(&self) -> Option<&Wager> {
        self.wager.as_ref()
    }

    pub fn side_choice(&self) -> Option<usize> {
        self.side_choice
    }

    pub fn stake_choice(&self) -> Option<usize> {
        self.stake_choice
    }

    /// Both choices must be made before a wager can be submitted.
    pub fn ready(&self) -> bool {
        self.side_choice.is_some() && self.stake_choice.is_some()
    }

    /// Selections only apply while no wager is in flight; out-of-range
    /// indices are dropped.
    pub fn select_side(&mut self, ix: usize) {
        if self.wager.is_none() && ix < self.sides.len() {
            self.side_choice = Some(ix);
        }
    }

    pub fn select_stake(&mut self, ix: usize) {
        if self.wager.is_none() && ix < self.stakes.len() {
            self.stake_choice = Some(ix);
        }
    }

    /// Re-reads the allowance and updates the approval flag. Native games are
    /// always approved.
    pub async fn refresh_approval(&mut self) -> Result<(), FlipError> {
        if is_native(&self.game_token) {
            self.approved = true;
            return Ok(());
        }
        let token = self
            .token_contract
            .as_ref()
            .ok_or(FlipError::MissingTokenContract)?;
        let allowance = token
            .allowance(self.game.account(), self.game.id())
            .await?;
        self.approved = allowance > self.required_allowance;
        Ok(())
    }

    /// Grants the game contract an unlimited allowance, then re-checks it.
    /// No-op for the native asset.
    pub async fn approve(&mut self) -> Result<(), FlipError> {
        if is_native(&self.game_token) {
            return Ok(());
        }
        let token = self
            .token_contract
            .as_ref()
            .ok_or(FlipError::MissingTokenContract)?;
        token.approve(self.game.id(), u128::MAX).await?;
        self.refresh_approval().await
    }

    /// Submits the wager: estimate gas, pad it, send the transaction, and pull
    /// the assigned game id out of the receipt. Chain failures move the wager
    /// to Errored with a truncated message for display, and are also returned.
    pub async fn start_game(&mut self) -> Result<(), FlipError> {
        if self.wager.is_some() {
            return Err(FlipError::GameInProgress);
        }
        if !self.approved {
            return Err(FlipError::NotApproved);
        }
        let (Some(side_ix), Some(stake_ix)) = (self.side_choice, self.stake_choice)
        else {
            return Err(FlipError::SelectionsIncomplete);
        };
        let side = self.sides[side_ix].value;
        let amount = self.stakes[stake_ix].value;
        let attached = if is_native(&self.game_token) { amount } else { 0 };

        let mut wager = Wager::new(self.game_token, amount, side);
        wager.status = WagerStatus::PendingConfirmation;
        self.wager = Some(wager);

        let receipt = match self.submit(amount, side, attached).await {
            Ok(receipt) => receipt,
            Err(error) => {
                self.record_failure(&error);
                return Err(error.into());
            }
        };
        let Some(started) = receipt.game_started().cloned() else {
            let error = ChainError::MissingLog("GameStarted");
            self.record_failure(&error);
            return Err(error.into());
        };
        if let Some(wager) = self.wager.as_mut() {
            wager.assign_game_id(started.game_id);
            wager.status = WagerStatus::AwaitingResolution;
        }
        debug!(game_id = started.game_id, "wager accepted, awaiting flip");
        Ok(())
    }

    async fn submit(
        &self,
        amount: u64,
        side: Side,
        attached: u64,
    ) -> ChainResult<EnterGameReceipt> {
        let estimate = self
            .game
            .estimate_enter_game_gas(amount, side, self.game_token, attached)
            .await?;
        let gas_limit = self.gas_policy.padded(estimate);
        debug!(estimate, gas_limit, amount, "submitting wager");
        self.game
            .enter_game(amount, side, self.game_token, attached, gas_limit)
            .await
    }

    fn record_failure(&mut self, error: &ChainError) {
        warn!(%error, "wager attempt failed");
        self.last_error = Some(truncate_for_display(&error.to_string()));
        if let Some(wager) = self.wager.as_mut() {
            wager.status = WagerStatus::Errored;
        }
    }

    /// Feeds one contract log through the controller. Events for other
    /// accounts or stale game ids fall through without touching state.
    pub async fn handle_event(
        &mut self,
        event: ContractEvent,
    ) -> Result<(), FlipError> {
        match event {
            ContractEvent::Approval(approval) => self.on_approval(approval).await,
            ContractEvent::GameFinished(finish) => {
                self.on_game_finished(finish);
                Ok(())
            }
            // The tracked game id comes from our own submission receipt.
            ContractEvent::GameStarted(_) => Ok(()),
        }
    }

    async fn on_approval(&mut self, approval: ApprovalEvent) -> Result<(), FlipError> {
        if approval.owner != self.game.account() {
            return Ok(());
        }
        self.refresh_approval().await
    }

    fn on_game_finished(&mut self, finish: GameFinishedEvent) {
        if finish.better != self.game.account() {
            return;
        }
        let Some(wager) = self.wager.as_mut() else {
            return;
        };
        if wager.status != WagerStatus::AwaitingResolution {
            return;
        }
        if wager.game_id != Some(finish.game_id) {
            debug!(game_id = finish.game_id, "ignoring finish for stale game");
            return;
        }
        wager.winner = Some(finish.winner);
        wager.status = WagerStatus::Finished;
    }

    /// Back to Idle: clears selections, the wager, and any error. Approval is
    /// kept, the on-chain allowance does not reset. Outstanding transactions
    /// are not cancelled.
    pub fn start_over(&mut self) {
        self.side_choice = None;
        self.stake_choice = None;
        self.wager = None;
        self.last_error = None;
    }

    pub fn phase(&self) -> FlipPhase {
        if let Some(message) = &self.last_error {
            return FlipPhase::Errored {
                message: message.clone(),
            };
        }
        match &self.wager {
            Some(wager) => match wager.status {
                WagerStatus::Unstarted | WagerStatus::PendingConfirmation => {
                    FlipPhase::WaitingForConfirmation
                }
                WagerStatus::AwaitingResolution => FlipPhase::WaitingForFlip {
                    game_id: wager.game_id.unwrap_or_default(),
                },
                WagerStatus::Finished => FlipPhase::Finished {
                    winner: wager.winner.unwrap_or_default(),
                    game_id: wager.game_id.unwrap_or_default(),
                },
                WagerStatus::Errored => FlipPhase::Errored {
                    message: String::new(),
                },
            },
            None if !self.approved => FlipPhase::NeedsApproval,
            None => FlipPhase::Choosing {
                ready: self.ready(),
            },
        }
    }

    pub fn snapshot(&self) -> FlipSnapshot {
        FlipSnapshot {
            phase: self.phase(),
            sides: self.sides.clone(),
            stakes: self.stakes.clone(),
            side_choice: self.side_choice,
            stake_choice: self.stake_choice,
            account: self.game.account(),
        }
    }
}

pub(crate) fn truncate_for_display(message: &str) -> String {
    let mut out: String = message.chars().take(DISPLAY_ERROR_LIMIT).collect();
    if message.chars().count() > DISPLAY_ERROR_LIMIT {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::test_helpers::TestContext;
    use proptest::prelude::*;

    #[test]
    fn gas_policy__pads_estimate_by_thirty_percent_by_default() {
        let policy = GasPolicy::default();
        assert_eq!(policy.padded(100), 130);
        assert_eq!(policy.padded(10), 13);
    }

    #[test]
    fn gas_policy__zero_denominator_falls_back_to_estimate() {
        let policy = GasPolicy {
            numerator: 13,
            denominator: 0,
        };
        assert_eq!(policy.padded(100), 100);
    }

    #[test]
    fn gas_policy__from_pad_percent() {
        let policy = GasPolicy::from_pad_percent(30);
        assert_eq!(policy.padded(1000), 1300);
    }

    #[test]
    fn truncate_for_display__keeps_short_messages_intact() {
        assert_eq!(truncate_for_display("boom"), "boom");
    }

    #[test]
    fn truncate_for_display__cuts_long_messages_at_forty_chars() {
        let long = "x".repeat(100);
        let shown = truncate_for_display(&long);
        assert_eq!(shown.len(), DISPLAY_ERROR_LIMIT + 3);
        assert!(shown.ends_with("..."));
    }

    proptest! {
        // Readiness holds exactly when both selections have been made.
        #[test]
        fn ready__iff_both_selections_made(
            side in proptest::option::of(0usize..2),
            stake in proptest::option::of(0usize..4),
        ) {
            let ctx = TestContext::native();
            let mut controller = ctx.controller();
            if let Some(ix) = side {
                controller.select_side(ix);
            }
            if let Some(ix) = stake {
                controller.select_stake(ix);
            }
            prop_assert_eq!(controller.ready(), side.is_some() && stake.is_some());
        }

        // Out-of-range indices never change the selection state.
        #[test]
        fn select__out_of_range_indices_are_ignored(
            side in 2usize..100,
            stake in 4usize..100,
        ) {
            let ctx = TestContext::native();
            let mut controller = ctx.controller();
            controller.select_side(side);
            controller.select_stake(stake);
            prop_assert_eq!(controller.side_choice(), None);
            prop_assert_eq!(controller.stake_choice(), None);
            prop_assert!(!controller.ready());
        }
    }
}
