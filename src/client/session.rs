//! Who the stores belong to.
//!
//! Every transition that changes the active identity bumps a generation
//! counter. Loads carry the generation they were issued under, and a load whose
//! generation no longer matches is discarded when it resolves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FinanceError;

/// The user key records are scoped by (the email the user signed in with).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    pub fn parse(raw: &str) -> Result<Self, FinanceError> {
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            return Err(FinanceError::validation("Email is required"));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SignedIn(Identity),
    Switched { from: Identity, to: Identity },
    /// Signed in again as the identity that was already active.
    Unchanged(Identity),
    SignedOut(Identity),
    AlreadyAnonymous,
}

impl Transition {
    /// Stores must be emptied before anything else happens.
    pub fn clears_stores(&self) -> bool {
        matches!(self, Self::SignedIn(_) | Self::Switched { .. } | Self::SignedOut(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub identity: Identity,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct SessionManager {
    session: Session,
    generation: u64,
}

impl SessionManager {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.session {
            Session::Authenticated(id) => Some(id),
            Session::Anonymous => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sign_in(&mut self, identity: Identity) -> Transition {
        let transition = match &self.session {
            Session::Authenticated(current) if *current == identity => {
                return Transition::Unchanged(identity);
            }
            Session::Authenticated(current) => Transition::Switched {
                from: current.clone(),
                to: identity.clone(),
            },
            Session::Anonymous => Transition::SignedIn(identity.clone()),
        };
        self.generation += 1;
        self.session = Session::Authenticated(identity);
        transition
    }

    pub fn sign_out(&mut self) -> Transition {
        match std::mem::take(&mut self.session) {
            Session::Authenticated(identity) => {
                self.generation += 1;
                Transition::SignedOut(identity)
            }
            Session::Anonymous => Transition::AlreadyAnonymous,
        }
    }

    pub fn require_identity(&self) -> Result<&Identity, FinanceError> {
        self.identity().ok_or(FinanceError::NotAuthenticated)
    }

    pub fn ticket(&self) -> Result<LoadTicket, FinanceError> {
        let identity = self.require_identity()?.clone();
        Ok(LoadTicket {
            identity,
            generation: self.generation,
        })
    }

    pub fn check(&self, ticket: &LoadTicket) -> Result<(), FinanceError> {
        if ticket.generation == self.generation && self.identity() == Some(&ticket.identity) {
            Ok(())
        } else {
            Err(FinanceError::StaleIdentity {
                identity: ticket.identity.clone(),
            })
        }
    }
}
