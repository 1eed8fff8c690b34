use crate::ui;
use color_eyre::eyre::{
    Result,
    eyre,
};
use double_or_nothing::{
    EventSource,
    FlipController,
    FlipSnapshot,
    GasPolicy,
    chain::ChainError,
    options::chip_asset_id,
    session::{
        SessionConfig,
        SessionManager,
        WalletDescriptor,
        default_cache_path,
        resolve_wallet_dir,
    },
    test_helpers::{
        FakeEvents,
        FakeGame,
        FakeToken,
        TestContext,
    },
};
use fuels::types::AssetId;
use std::{
    io::{
        self,
        Write,
    },
    time::Duration,
};
use tracing::error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub wallet: Option<String>,
    pub wallet_dir: Option<String>,
    pub auto_load: bool,
    pub token_game: bool,
    pub gas_pad_percent: Option<u64>,
    pub flip_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            wallet: None,
            wallet_dir: None,
            auto_load: true,
            token_game: false,
            gas_pad_percent: None,
            flip_delay_ms: 3_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopOutcome {
    Quit,
    Logout,
}

pub struct App {
    // Keeps the fake chain (and its event senders) alive for the whole run.
    _ctx: TestContext,
    controller: FlipController<FakeGame, FakeToken>,
    events: FakeEvents,
    manager: SessionManager,
    wallet_name: String,
    status: String,
    errors: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub flip: FlipSnapshot,
    pub wallet: String,
    pub status: String,
    pub errors: Vec<String>,
}

impl App {
    fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            flip: self.controller.snapshot(),
            wallet: self.wallet_name.clone(),
            status: self.status.clone(),
            errors: self.errors.iter().rev().take(5).cloned().collect(),
        }
    }

    fn push_error(&mut self, item: String) {
        error!("{}", item);
        self.errors.push(item);
        if self.errors.len() > 50 {
            let drain = self.errors.len() - 50;
            self.errors.drain(0..drain);
        }
    }
}

fn choose_wallet(wallets: &[WalletDescriptor]) -> Option<usize> {
    println!("Select a wallet to connect:");
    for (ix, wallet) in wallets.iter().enumerate() {
        println!("  {}) {}", ix + 1, wallet.name);
    }
    print!("Choice (empty cancels): ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let ix = trimmed.parse::<usize>().ok()?.checked_sub(1)?;
    (ix < wallets.len()).then_some(ix)
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let wallet_dir = resolve_wallet_dir(config.wallet_dir.as_deref())?;
    let mut session_config = SessionConfig::new(wallet_dir, default_cache_path()?);
    session_config.auto_load = config.auto_load;
    let mut manager = SessionManager::new(session_config);

    // Session establishment: explicit flag first, then the cached provider,
    // then the selection prompt. Cancelling the prompt is not an error.
    let session = if let Some(name) = &config.wallet {
        let mut chooser = |wallets: &[WalletDescriptor]| {
            wallets.iter().position(|w| w.name == *name)
        };
        manager
            .connect(&mut chooser)?
            .ok_or_else(|| eyre!("Wallet '{name}' not found"))?
    } else if let Some(session) = manager.auto_connect()? {
        session
    } else {
        let mut chooser = choose_wallet;
        match manager.connect(&mut chooser)? {
            Some(session) => session,
            None => {
                println!("Connection cancelled.");
                return Ok(());
            }
        }
    };

    let wallet_name = manager
        .cached_provider()
        .unwrap_or_else(|| String::from("unknown"));

    // The demo plays against the in-memory chain; the session account is the
    // bettor on it.
    let game_token = if config.token_game {
        chip_asset_id()
    } else {
        AssetId::zeroed()
    };
    let mut ctx = TestContext::with_token(game_token);
    ctx.account = session.address;
    ctx.set_auto_resolve(Duration::from_millis(config.flip_delay_ms));

    let mut controller = ctx.controller();
    if let Some(percent) = config.gas_pad_percent {
        controller = controller.with_gas_policy(GasPolicy::from_pad_percent(percent));
    }
    // Allowance check on startup, before the selection phase is reachable.
    controller.refresh_approval().await?;
    let events = ctx.events();

    let mut app = App {
        _ctx: ctx,
        controller,
        events,
        manager,
        wallet_name,
        status: String::from("Ready"),
        errors: Vec::new(),
    };
    let mut ui_state = ui::UiState::default();

    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut app, &mut ui_state).await;
    ui::terminal_exit()?;
    match res? {
        LoopOutcome::Quit => {}
        LoopOutcome::Logout => {
            println!("Logged out; provider cache cleared.");
        }
    }
    Ok(())
}

async fn run_loop(app: &mut App, ui_state: &mut ui::UiState) -> Result<LoopOutcome> {
    let mut snapshot = app.snapshot();
    ui::draw(ui_state, &snapshot)?;
    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break LoopOutcome::Quit,
            event = app.events.next_event() => {
                match event {
                    Ok(event) => {
                        if let Err(e) = app.controller.handle_event(event).await {
                            app.push_error(format!("event handling error: {e}"));
                        }
                    }
                    Err(ChainError::Query(_)) => break LoopOutcome::Quit,
                    Err(e) => app.push_error(format!("event stream error: {e}")),
                }
            }
            ev = ui::next_event(ui_state) => {
                match ev? {
                    ui::UserEvent::Quit => break LoopOutcome::Quit,
                    ui::UserEvent::Logout => {
                        app.manager.disconnect()?;
                        break LoopOutcome::Logout;
                    }
                    ui::UserEvent::SelectSide(ix) => app.controller.select_side(ix),
                    ui::UserEvent::SelectStake(ix) => app.controller.select_stake(ix),
                    ui::UserEvent::Flip => {
                        match app.controller.start_game().await {
                            Ok(()) => app.status = String::from("Wager submitted"),
                            Err(e) => app.push_error(format!("start game: {e}")),
                        }
                    }
                    ui::UserEvent::Approve => {
                        match app.controller.approve().await {
                            Ok(()) => app.status = String::from("Allowance granted"),
                            Err(e) => app.push_error(format!("approve: {e}")),
                        }
                    }
                    ui::UserEvent::StartOver => {
                        app.controller.start_over();
                        app.status = String::from("Ready");
                    }
                    ui::UserEvent::Redraw => {}
                }
            }
        }
        snapshot = app.snapshot();
        ui::draw(ui_state, &snapshot)?;
    };
    Ok(outcome)
}
