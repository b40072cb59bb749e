use crate::utils::lock;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Cancellation token shared between the probe loop and whoever wants it to stop early.
///
/// Clones observe the same flag. Once set, it stays set.
#[derive(Clone, Debug, Default)]
pub struct StopCondition {
    condition: Arc<(Mutex<bool>, Condvar)>,
}

impl StopCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_stop(&self) {
        let (flag, cvar) = &*self.condition;
        let mut should_stop = lock(flag);
        *should_stop = true;
        cvar.notify_all();
    }

    pub fn get_should_stop(&self) -> bool {
        let (flag, _) = &*self.condition;
        *lock(flag)
    }

    /// Sleep for `timeout` unless a stop is requested first. Returns whether a stop was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.condition;
        let guard = lock(flag);
        let (should_stop, _) = cvar
            .wait_timeout_while(guard, timeout, |should_stop| !*should_stop)
            .unwrap_or_else(PoisonError::into_inner);
        *should_stop
    }
}
