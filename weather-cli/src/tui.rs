use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::Duration,
};
use tokio::sync::mpsc;
use weather_core::{
    CityRegistry, Config, Dashboard, Executor, Message, OpenMeteoProvider, Tab, Timers,
};

use crate::view;

type Term = Terminal<CrosstermBackend<Stdout>>;

const INPUT_POLL: Duration = Duration::from_millis(33);

/// What a key press means for the dashboard.
#[derive(Debug)]
enum KeyAction {
    Quit,
    Send(Message),
    Ignore,
}

pub async fn run(config: &Config, registry: CityRegistry) -> Result<()> {
    let selected = config.default_city(&registry)?.name.clone();
    let mut dashboard = Dashboard::new(registry, config.panel(), Some(&selected), Local::now())?;

    let provider = OpenMeteoProvider::with_base_url(config.api_base_url())
        .context("Failed to build HTTP client")?;

    let (tx, mut rx) = mpsc::channel::<Message>(64);
    let mut executor = Executor::new(Arc::new(provider), tx.clone());
    let timers = Timers::spawn(tx, config.refresh_interval(), config.clock_tick());

    executor.spawn_all(dashboard.mount());
    tracing::info!(
        cities = dashboard.cities().len(),
        panel = %dashboard.variant(),
        "dashboard mounted"
    );

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut dashboard, &mut executor, &mut rx);
    restore_terminal(&mut terminal)?;

    // unmount: stop both timers and any fetch still in flight
    drop(timers);
    drop(executor);
    tracing::info!("dashboard closed");

    result
}

fn event_loop(
    terminal: &mut Term,
    dashboard: &mut Dashboard,
    executor: &mut Executor,
    rx: &mut mpsc::Receiver<Message>,
) -> Result<()> {
    loop {
        // Drain timer ticks and fetch results
        while let Ok(message) = rx.try_recv() {
            executor.spawn_all(dashboard.update(message));
        }

        terminal.draw(|f| view::render(f, dashboard))?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key_action(dashboard, key.code) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Send(message) => executor.spawn_all(dashboard.update(message)),
                    KeyAction::Ignore => {}
                }
            }
        }
    }
}

fn key_action(dashboard: &Dashboard, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
            KeyAction::Send(Message::SwitchTab(dashboard.tab().next()))
        }
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Send(Message::Refresh(Local::now())),
        KeyCode::Up if dashboard.tab() == Tab::Forecast => {
            KeyAction::Send(Message::SelectCity(dashboard.adjacent_city(-1).to_string()))
        }
        KeyCode::Down if dashboard.tab() == Tab::Forecast => {
            KeyAction::Send(Message::SelectCity(dashboard.adjacent_city(1).to_string()))
        }
        _ => KeyAction::Ignore,
    }
}

fn setup_terminal() -> Result<Term> {
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    Ok(())
}
