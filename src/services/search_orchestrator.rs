use crate::api::client::SearchClient;
use crate::state::controller::SearchController;
use crate::state::events::{Effect, StateEvent};
use crate::timers::TimerQueue;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Executes the effects requested by the [`SearchController`].
///
/// HTTP calls are spawned on the tokio runtime and report back through a
/// channel; timers go into a [`TimerQueue`]. The controller itself is only
/// ever touched from the thread calling [`SearchOrchestrator::pump`].
pub struct SearchOrchestrator {
    controller: SearchController,
    client: SearchClient,
    runtime: Handle,
    timers: TimerQueue,
    tx: UnboundedSender<StateEvent>,
    rx: UnboundedReceiver<StateEvent>,
}

impl SearchOrchestrator {
    pub fn new(controller: SearchController, client: SearchClient, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            client,
            runtime,
            timers: TimerQueue::new(),
            tx,
            rx,
        }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SearchController {
        &mut self.controller
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Feed one event to the controller and carry out its effects
    pub fn dispatch(&mut self, event: StateEvent) {
        let effects = self.controller.handle(event);
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::IssueSearch { seq, request } => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let outcome = client.search(&request).await;
                    // The receiver only goes away on shutdown
                    let _ = tx.send(StateEvent::SearchFinished { seq, outcome });
                });
            }
            Effect::Schedule { timer, after } => {
                self.timers.schedule(timer, after);
            }
            Effect::FetchLogs { generation, limit } => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let outcome = client.recent_logs(limit).await;
                    let _ = tx.send(StateEvent::LogsFetched {
                        generation,
                        outcome,
                    });
                });
            }
            Effect::CancelLogPolling => {
                debug!(target: "orchestrator", "Cancelling log polling");
                self.timers.cancel_log_polls();
            }
        }
    }

    /// Drain finished requests and expired timers into the controller.
    /// Returns true if anything was processed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;

        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
            changed = true;
        }

        for timer in self.timers.take_due(Instant::now()) {
            self.dispatch(StateEvent::TimerFired(timer));
            changed = true;
        }

        changed
    }

    /// Time until the next timer is due, if any is armed
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.time_remaining(Instant::now())
    }

    /// Keep processing completions and timers until the current
    /// submission settles (results shown or failed)
    pub async fn run_until_settled(&mut self) {
        loop {
            self.pump();
            if self.controller.is_settled() {
                return;
            }

            let event = match self.next_deadline() {
                Some(wait) => {
                    tokio::select! {
                        event = self.rx.recv() => event,
                        _ = tokio::time::sleep(wait) => None,
                    }
                }
                None => self.rx.recv().await,
            };

            if let Some(event) = event {
                self.dispatch(event);
            }
        }
    }
}
