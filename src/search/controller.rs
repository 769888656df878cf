use super::query::query_expression;
use super::state::{
    Action, KeywordField, KeywordGroup, Relation, SearchMode, SearchState, Submission,
};
use crate::api::SearchBackend;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result of [`SearchController::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    /// A submission is already in flight
    Busy,
    /// Auto mode with blank text; nothing sent and the busy flag stays set
    BlankText,
    /// Manual mode with no usable keyword; nothing sent
    NoKeywords,
    /// Manual search payload. It is not sent anywhere yet.
    Manual(Vec<KeywordGroup>),
    /// Auto search running in the background; results arrive through [`SearchController::poll`]
    Dispatched(JoinHandle<()>),
}

/// Owns one search form's state and runs its submissions.
///
/// Background work never touches the state directly: it sends [`Action`]s
/// back over a channel, and [`SearchController::poll`] folds them in. If the
/// controller is dropped first, those actions are discarded.
pub struct SearchController {
    state: SearchState,
    backend: Arc<dyn SearchBackend>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl SearchController {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SearchState::default(),
            backend,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Apply one action to the state
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.dispatch(Action::SetMode(mode));
    }

    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SetFreeText(text.into()));
    }

    pub fn add_group(&mut self) {
        self.dispatch(Action::AddGroup);
    }

    pub fn remove_group(&mut self, id: u32) {
        self.dispatch(Action::RemoveGroup(id));
    }

    pub fn update_keyword(&mut self, id: u32, field: KeywordField, value: impl Into<String>) {
        self.dispatch(Action::UpdateKeyword {
            id,
            field,
            value: value.into(),
        });
    }

    pub fn set_relation(&mut self, id: u32, relation: Relation) {
        self.dispatch(Action::SetRelation { id, relation });
    }

    pub fn dismiss_instructions(&mut self, mode: SearchMode) {
        self.dispatch(Action::DismissInstructions(mode));
    }

    /// Submit the form for the current mode.
    ///
    /// Auto mode spawns the network calls on the current tokio runtime.
    pub fn submit(&mut self) -> SubmitOutcome {
        let state = std::mem::take(&mut self.state);
        let (state, submission) = state.begin_submit();
        self.state = state;

        match submission {
            Submission::Busy => {
                tracing::debug!("submit ignored: search already in flight");
                SubmitOutcome::Busy
            }
            Submission::BlankText => {
                tracing::warn!("auto search submitted with blank text; busy flag left set");
                SubmitOutcome::BlankText
            }
            Submission::NoKeywords => {
                tracing::debug!("manual search has no keywords");
                SubmitOutcome::NoKeywords
            }
            Submission::Manual { groups } => {
                tracing::info!(
                    group_count = groups.len(),
                    query = %query_expression(&groups),
                    groups = ?groups,
                    "manual search keyword groups"
                );
                SubmitOutcome::Manual(groups)
            }
            Submission::Auto { text } => {
                tracing::info!(text = %text, "auto search submitted");
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                SubmitOutcome::Dispatched(tokio::spawn(run_auto_search(backend, text, tx)))
            }
        }
    }

    /// Apply every action delivered by background work so far.
    ///
    /// Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }
}

/// Auto search followed by the proxied lookup.
///
/// Every exit path sends [`Action::SearchFinished`] exactly once.
async fn run_auto_search(
    backend: Arc<dyn SearchBackend>,
    text: String,
    tx: mpsc::UnboundedSender<Action>,
) {
    let groups = match backend.auto_search(&text).await {
        Ok(response) => match response.into_result() {
            Ok(groups) => groups,
            Err(error) => {
                tracing::error!(error = %error, "auto search returned an error");
                let _ = tx.send(Action::SearchFinished);
                return;
            }
        },
        Err(e) => {
            tracing::error!(status = e.status, message = %e.message, "auto search request failed");
            let _ = tx.send(Action::SearchFinished);
            return;
        }
    };

    tracing::info!(
        group_count = groups.len(),
        query = %query_expression(&groups),
        "auto search produced keyword groups"
    );
    let _ = tx.send(Action::ReplaceGroups(groups));
    let _ = tx.send(Action::SearchFinished);

    // Result is observational only.
    match backend.proxy_token().await {
        Ok(response) => match response.error.filter(|e| !e.is_empty()) {
            Some(error) => tracing::error!(error = %error, "proxy lookup returned an error"),
            None => tracing::info!(data = ?response.data, "proxy lookup result"),
        },
        Err(e) => {
            tracing::error!(status = e.status, message = %e.message, "proxy lookup request failed")
        }
    }
}
