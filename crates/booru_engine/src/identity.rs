use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Signed-in account as seen by the engine. An empty name means signed out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub user_id: Option<u64>,
}

impl Identity {
    pub fn is_signed_in(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Source of the current account. Login, logout and credential flows live
/// outside the engine; it only reacts to the published values.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Identity;

    fn subscribe(&self) -> watch::Receiver<Identity>;
}

/// In-process identity holder driven by whatever performs authentication.
#[derive(Debug)]
pub struct SessionIdentity {
    tx: watch::Sender<Identity>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        let (tx, _) = watch::channel(Identity::default());
        Self { tx }
    }

    pub fn signed_in(name: impl Into<String>, user_id: Option<u64>) -> Self {
        let session = Self::signed_out();
        session.sign_in(name, user_id);
        session
    }

    pub fn sign_in(&self, name: impl Into<String>, user_id: Option<u64>) {
        self.tx.send_replace(Identity {
            name: name.into(),
            user_id,
        });
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(Identity::default());
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Identity {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Identity> {
        self.tx.subscribe()
    }
}
