use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use evlog::meta;
use thiserror::Error;

use crate::api::types::User;
use crate::runtime::get_logger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Identified(User),
    Voted(User),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Identified(_) => "identified",
            SessionState::Voted(_) => "voted",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Vous êtes déjà identifié en tant que {0} ; déconnectez-vous d'abord.")]
    AlreadyIdentified(String),
    #[error("Identifiez-vous avant de voter.")]
    NotIdentified,
    #[error("Vous avez déjà voté ; utilisez `new` pour un nouveau vote.")]
    AlreadyVoted,
    #[error("Vous n'avez pas encore voté.")]
    NotVoted,
    #[error("Une requête est déjà en cours.")]
    Busy,
}

/// Client-local identification state. Lives in memory only, so a restart always begins anonymous
/// whatever the server knows about past votes.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    pending: Arc<AtomicBool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Anonymous,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Identified(user) | SessionState::Voted(user) => Some(user),
        }
    }

    pub fn has_voted(&self) -> bool {
        matches!(self.state, SessionState::Voted(_))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Marks a mutating request as outstanding until the returned guard is dropped.
    pub fn begin_request(&self) -> Result<PendingGuard, SessionError> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::Busy);
        }

        Ok(PendingGuard {
            pending: self.pending.clone(),
        })
    }

    /// Fails early when registering or logging in makes no sense from the current state.
    pub fn ensure_anonymous(&self) -> Result<(), SessionError> {
        match self.current_user() {
            None => Ok(()),
            Some(user) => Err(SessionError::AlreadyIdentified(user.pseudo.clone())),
        }
    }

    /// The user a vote would be cast for, if voting is currently allowed.
    pub fn voter(&self) -> Result<&User, SessionError> {
        match &self.state {
            SessionState::Anonymous => Err(SessionError::NotIdentified),
            SessionState::Identified(user) => Ok(user),
            SessionState::Voted(_) => Err(SessionError::AlreadyVoted),
        }
    }

    pub fn authenticate(&mut self, user: User) -> Result<(), SessionError> {
        self.ensure_anonymous()?;
        self.transition(SessionState::Identified(user));
        Ok(())
    }

    pub fn record_vote(&mut self) -> Result<(), SessionError> {
        let user = self.voter()?.clone();
        self.transition(SessionState::Voted(user));
        Ok(())
    }

    /// Reopens the vote form. Votes already stored on the server are untouched.
    pub fn start_new_vote(&mut self) -> Result<(), SessionError> {
        let user = match &self.state {
            SessionState::Anonymous => return Err(SessionError::NotIdentified),
            SessionState::Identified(_) => return Err(SessionError::NotVoted),
            SessionState::Voted(user) => user.clone(),
        };
        self.transition(SessionState::Identified(user));
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if self.current_user().is_none() {
            return Err(SessionError::NotIdentified);
        }
        self.transition(SessionState::Anonymous);
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        get_logger().debug("Session transition.", meta![
            "From" => self.state.name(),
            "To" => next.name(),
        ]);
        self.state = next;
    }
}

pub struct PendingGuard {
    pending: Arc<AtomicBool>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::SeqCst);
    }
}
