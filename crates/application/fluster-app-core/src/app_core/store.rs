use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::AppState;

use super::{events::DomainEvent, reducer::reduce};

#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.lock();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    /// Applies `ev` only when `guard` holds for the current state; check and apply are atomic.
    pub fn apply_if(&self, guard: impl FnOnce(&AppState) -> bool, ev: DomainEvent) -> bool {
        let mut state = self.lock();
        if !guard(&state) {
            return false;
        }
        let next = reduce(state.clone(), ev);
        *state = next;
        true
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }
}
