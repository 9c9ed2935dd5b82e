//! Drives a page: applies messages, runs the resulting actions, feeds the
//! replies back.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tracing::warn;

use super::api::DashboardApi;
use crate::PaydeskError;

/// A page's state machine.
///
/// `update` is pure; `perform` runs one action (one proxy call) and turns
/// its outcome into the next message. `failed` turns an action whose task
/// died before replying into the failure message `perform` would have
/// produced, so state tied to the action (a busy flag, a loading spinner)
/// is still released.
pub trait Page: Send + 'static {
    type Message: Send + 'static;
    type Action: Clone + Send + 'static;

    fn update(&mut self, message: Self::Message) -> Vec<Self::Action>;

    fn perform<A: DashboardApi>(
        api: Arc<A>,
        action: Self::Action,
    ) -> impl Future<Output = Self::Message> + Send + 'static;

    fn failed(action: Self::Action, error: PaydeskError) -> Self::Message;
}

/// Owns a page and its in-flight requests.
///
/// Dropping the runner aborts every request still in flight, so a reply
/// can never land on a page that has been torn down.
pub struct PageRunner<P: Page, A: DashboardApi> {
    page: P,
    api: Arc<A>,
    in_flight: JoinSet<P::Message>,
    pending: HashMap<Id, P::Action>,
}

impl<P: Page, A: DashboardApi> PageRunner<P, A> {
    pub fn new(page: P, api: Arc<A>) -> Self {
        Self {
            page,
            api,
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Number of requests not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Applies `message` and starts every action it produces.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&mut self, message: P::Message) {
        for action in self.page.update(message) {
            let task = self
                .in_flight
                .spawn(P::perform(Arc::clone(&self.api), action.clone()));
            self.pending.insert(task.id(), action);
        }
    }

    /// Waits for the next reply and applies it. Returns `false` once nothing
    /// is in flight.
    pub async fn next(&mut self) -> bool {
        match self.in_flight.join_next_with_id().await {
            Some(Ok((id, message))) => {
                self.pending.remove(&id);
                self.dispatch(message);
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, "page request task failed");
                if let Some(action) = self.pending.remove(&e.id()) {
                    self.dispatch(P::failed(action, PaydeskError::Task(e.to_string())));
                }
                true
            }
            None => false,
        }
    }

    /// Processes replies, including follow-up requests, until idle.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    /// Stops the page, aborting anything in flight.
    pub fn into_page(mut self) -> P {
        self.in_flight.abort_all();
        self.page
    }
}
