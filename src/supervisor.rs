//! Single-slot request supervisor.
//!
//! At most one generation request may be outstanding. A second request is
//! rejected with [`GenerationError::Busy`] instead of racing the first.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::gemini::GenerationError;

#[derive(Debug, Default)]
struct SlotState {
    label: Option<String>,
    token: Option<CancellationToken>,
}

/// Hands out the single request slot. Cheap to clone; clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct RequestSupervisor {
    state: Arc<Mutex<SlotState>>,
}

impl RequestSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for a request described by `label`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Busy` while another slot is held.
    pub fn try_begin(&self, label: impl Into<String>) -> Result<RequestSlot, GenerationError> {
        let mut state = self.lock();
        if state.token.is_some() {
            return Err(GenerationError::Busy);
        }

        let label = label.into();
        let token = CancellationToken::new();
        log::debug!("Request slot claimed: {}", label);
        state.label = Some(label);
        state.token = Some(token.clone());

        Ok(RequestSlot {
            state: Arc::clone(&self.state),
            token,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.lock().token.is_some()
    }

    /// Label of the outstanding request, if any.
    pub fn current(&self) -> Option<String> {
        self.lock().label.clone()
    }

    /// Cancel the outstanding request. Returns false if the slot was free.
    pub fn cancel_current(&self) -> bool {
        match self.lock().token.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Guard for the claimed slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct RequestSlot {
    state: Arc<Mutex<SlotState>>,
    token: CancellationToken,
}

impl RequestSlot {
    /// Token observed by the poll loop of this request.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.label = None;
        state.token = None;
    }
}
