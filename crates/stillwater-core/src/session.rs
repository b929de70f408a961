//! Signed-in user readiness.
//!
//! The user identity arrives asynchronously at startup. Rather than polling,
//! consumers wait on an explicit `Unready` / `Ready(user)` signal.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::entry::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unready,
    Ready(UserId),
}

/// Shared readiness signal. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct UserSession {
    sender: Arc<watch::Sender<SessionState>>,
}

impl Default for UserSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSession {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::Unready);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn state(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserId> {
        match &*self.sender.borrow() {
            SessionState::Ready(user) => Some(user.clone()),
            SessionState::Unready => None,
        }
    }

    pub fn set_ready(&self, user: UserId) {
        tracing::debug!(user = %user, "user session ready");
        self.sender.send_replace(SessionState::Ready(user));
    }

    pub fn set_unready(&self) {
        self.sender.send_replace(SessionState::Unready);
    }

    /// Wait until a user is available.
    pub async fn ready(&self) -> UserId {
        let mut rx = self.sender.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let SessionState::Ready(user) = current {
                return user;
            }
            // The sender lives in `self`, so the channel cannot close here.
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Wait up to `grace` for a user; `None` if the startup race was not resolved.
    pub async fn wait_ready(&self, grace: Duration) -> Option<UserId> {
        if let Some(user) = self.current_user() {
            return Some(user);
        }
        match tokio::time::timeout(grace, self.ready()).await {
            Ok(user) => Some(user),
            Err(_) => {
                tracing::debug!(?grace, "user not ready after grace period");
                None
            }
        }
    }
}
