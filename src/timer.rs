//! Auto-advance tick source.
//!
//! A [`Ticker`] turns the session's timer effects into [`Event::Tick`]s. It
//! sleeps one period, queues a tick, and re-arms. Every arm or cancel starts
//! a new generation, and [`Ticker::next_tick`] drops ticks queued by an older
//! one, so no tick from before a pause or interval change is delivered.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::{Effect, Event};

const TICK_BUFFER: usize = 4;

pub struct Ticker {
    tx: mpsc::Sender<u64>,
    rx: mpsc::Receiver<u64>,
    generation: u64,
    task: Option<JoinHandle<()>>,
    period: Option<Duration>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(TICK_BUFFER);
        Self {
            tx,
            rx,
            generation: 0,
            task: None,
            period: None,
        }
    }

    /// Apply a timer effect; display effects are ignored.
    pub fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::StartTimer(period) => self.arm(*period),
            Effect::StopTimer => self.cancel(),
            Effect::ShowCard { .. } | Effect::ShowMessage(_) => {}
        }
    }

    /// (Re)start ticking every `period`, dropping any pending tick.
    pub fn arm(&mut self, period: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        let generation = self.generation;
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                if tx.send(generation).await.is_err() {
                    break;
                }
            }
        }));
        self.period = Some(period);
        log::debug!("timer #{} armed every {:?}", generation, period);
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("timer #{} cancelled", self.generation);
        }
        self.generation += 1;
        self.period = None;
    }

    /// Wait for the next tick of the current generation.
    ///
    /// Pends forever while the ticker is not armed. Cancel safe.
    pub async fn next_tick(&mut self) -> Event {
        loop {
            match self.rx.recv().await {
                Some(generation) if generation == self.generation => return Event::Tick,
                Some(stale) => log::debug!("dropping tick from timer #{}", stale),
                None => return std::future::pending().await,
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Current period, if armed.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
