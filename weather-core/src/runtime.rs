//! The asynchronous half of the dashboard: timers and command execution.
//!
//! Both the timer tasks and in-flight fetches are owned handles. Dropping
//! [`Timers`] or [`Executor`] aborts them, so nothing reaches the message
//! channel once the dashboard is torn down.

use chrono::Local;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    task::{JoinHandle, JoinSet},
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::{
    conditions::fetch_current_readings,
    dashboard::{Command, Message},
    forecast::fetch_forecast,
    provider::ForecastSource,
};

pub const REFRESH_INTERVAL: Duration = Duration::from_millis(600_000);
pub const CLOCK_TICK: Duration = Duration::from_millis(1_000);

/// The refresh timer and the clock timer of one mounted dashboard.
#[derive(Debug)]
pub struct Timers {
    refresh: JoinHandle<()>,
    clock: JoinHandle<()>,
}

impl Timers {
    /// Start both timers. The first refresh fires one full period after mount;
    /// the mount-time fetch is issued by [`crate::dashboard::Dashboard::mount`].
    pub fn spawn(tx: mpsc::Sender<Message>, refresh_every: Duration, tick_every: Duration) -> Self {
        let refresh = spawn_timer(tx.clone(), refresh_every, || {
            Message::TimerRefresh(Local::now())
        });
        let clock = spawn_timer(tx, tick_every, || Message::Tick(Local::now()));
        Self { refresh, clock }
    }

    pub fn is_running(&self) -> bool {
        !self.refresh.is_finished() || !self.clock.is_finished()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.refresh.abort();
        self.clock.abort();
    }
}

fn spawn_timer<F>(tx: mpsc::Sender<Message>, every: Duration, make: F) -> JoinHandle<()>
where
    F: Fn() -> Message + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(make()).await.is_err() {
                // receiver gone, dashboard closed
                break;
            }
        }
    })
}

/// Runs [`Command`]s on the runtime and reports results as [`Message`]s.
#[derive(Debug)]
pub struct Executor {
    source: Arc<dyn ForecastSource>,
    tx: mpsc::Sender<Message>,
    tasks: JoinSet<()>,
}

impl Executor {
    pub fn new(source: Arc<dyn ForecastSource>, tx: mpsc::Sender<Message>) -> Self {
        Self {
            source,
            tx,
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn(&mut self, command: Command) {
        // reap finished tasks so the set does not grow unbounded
        while self.tasks.try_join_next().is_some() {}

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.tasks.spawn(async move {
            let message = execute(source.as_ref(), command).await;
            tx.send(message).await.ok();
        });
    }

    pub fn spawn_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }
}

/// Run one command to completion and wrap its outcome.
pub async fn execute(source: &dyn ForecastSource, command: Command) -> Message {
    match command {
        Command::FetchCurrent {
            cities,
            variant,
            hour_index,
        } => {
            let result = fetch_current_readings(source, &cities, variant, hour_index).await;
            Message::ReadingsFetched(result)
        }
        Command::FetchForecast { city, generation } => {
            let result = fetch_forecast(source, &city).await;
            Message::ForecastFetched {
                generation,
                city: city.name,
                result,
            }
        }
    }
}
