use crate::client::AppSnapshot;
use color_eyre::eyre::Result;
use crossterm::event::{
    self,
    Event,
    KeyCode,
    KeyEventKind,
};
use crossterm::terminal::{
    disable_raw_mode,
    enable_raw_mode,
};
use double_or_nothing::FlipPhase;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::io::stdout;

pub enum UserEvent {
    Quit,
    Logout,
    SelectSide(usize),
    SelectStake(usize),
    Flip,
    Approve,
    StartOver,
    Redraw,
}

#[derive(Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen
    )?;
    // Single persistent Terminal so buffers survive across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub async fn next_event(state: &mut UiState) -> Result<UserEvent> {
    loop {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match state.mode {
                Mode::QuitModal => match k.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        return Ok(UserEvent::Quit);
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        state.mode = Mode::Normal;
                        return Ok(UserEvent::Redraw);
                    }
                    _ => {}
                },
                Mode::Normal => match k.code {
                    KeyCode::Char('q') => {
                        state.mode = Mode::QuitModal;
                        return Ok(UserEvent::Redraw);
                    }
                    KeyCode::Char('l') => return Ok(UserEvent::Logout),
                    KeyCode::Char('h') => return Ok(UserEvent::SelectSide(0)),
                    KeyCode::Char('t') => return Ok(UserEvent::SelectSide(1)),
                    KeyCode::Char(c @ '1'..='9') => {
                        let ix = (c as usize) - ('1' as usize);
                        return Ok(UserEvent::SelectStake(ix));
                    }
                    KeyCode::Enter => return Ok(UserEvent::Flip),
                    KeyCode::Char('a') => return Ok(UserEvent::Approve),
                    KeyCode::Char('r') => return Ok(UserEvent::StartOver),
                    KeyCode::Esc => return Ok(UserEvent::Redraw),
                    _ => {}
                },
            }
        }
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .split(f.area());

    header(f, chunks[0], snap);
    body(f, chunks[1], snap);
    status_bar(f, chunks[2], snap);
    footer(f, chunks[3]);

    if state.mode == Mode::QuitModal {
        quit_modal(f);
    }
}

fn header(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let account = hex::encode(snap.flip.account);
    let line = Line::from(vec![
        Span::styled(
            "DOUBLE OR NOTHING",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!("wallet: {}", snap.wallet)),
        Span::raw("  |  "),
        Span::raw(format!("0x{}…{}", &account[..6], &account[58..])),
    ]);
    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn body(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines = match &snap.flip.phase {
        FlipPhase::NeedsApproval => vec![
            centered("TOKEN ALLOWANCE REQUIRED"),
            centered(""),
            centered("press [a] to approve the game contract"),
        ],
        FlipPhase::Choosing { ready } => {
            let mut lines = vec![centered("I LIKE")];
            lines.push(option_row(
                snap.flip
                    .sides
                    .iter()
                    .map(|opt| (opt.name.to_string(), Some(opt.id) == snap.flip.side_choice))
                    .collect(),
            ));
            lines.push(centered("FOR"));
            lines.push(option_row(
                snap.flip
                    .stakes
                    .iter()
                    .map(|opt| (opt.name.clone(), Some(opt.id) == snap.flip.stake_choice))
                    .collect(),
            ));
            lines.push(centered(""));
            lines.push(if *ready {
                Line::from(Span::styled(
                    "[ DOUBLE OR NOTHING — press enter ]",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center)
            } else {
                centered("CHOOSE YOUR OPTIONS")
            });
            lines
        }
        FlipPhase::WaitingForConfirmation => {
            vec![centered(""), centered("WAITING FOR CONFIRMATION")]
        }
        FlipPhase::WaitingForFlip { game_id } => vec![
            centered(""),
            Line::from(format!("GAME {game_id} STARTED")).alignment(Alignment::Center),
            centered("WAITING FOR YOUR FLIP"),
        ],
        FlipPhase::Finished { winner, game_id } => vec![
            centered(""),
            Line::from(format!("GAME {game_id}")).alignment(Alignment::Center),
            Line::from(Span::styled(
                if *winner { "HELL YEAH YOU WON" } else { "GET RUGGED LOL" },
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            centered(""),
            centered("press [r] to flip again"),
        ],
        FlipPhase::Errored { message } => vec![
            centered(""),
            centered("ERROR WHEN STARTING GAME"),
            Line::from(message.clone()).alignment(Alignment::Center),
            centered(""),
            centered("press [r] to try again"),
        ],
    };
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn centered(text: &str) -> Line<'static> {
    Line::from(text.to_string()).alignment(Alignment::Center)
}

fn option_row(options: Vec<(String, bool)>) -> Line<'static> {
    let mut spans = Vec::new();
    for (name, active) in options {
        let style = if active {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[ {name} ]"), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans).alignment(Alignment::Center)
}

fn status_bar(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = if let Some(err) = snap.errors.last() {
        format!("{} | last error: {}", snap.status, err)
    } else {
        snap.status.clone()
    };
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("status"));
    f.render_widget(widget, area);
}

fn footer(f: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "[h]eads [t]ails  [1-9] stake  [enter] flip  [a]pprove  [r]eset  [l]ogout  [q]uit",
    )
    .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn quit_modal(f: &mut Frame) {
    let area = f.area();
    let width = 34.min(area.width);
    let height = 3.min(area.height);
    let rect = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, rect);
    let widget = Paragraph::new("Quit? [y]es / [n]o")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, rect);
}
