//! Authentication session model: sliding-expiry, IP-bound sessions that
//! gate every mutating orchestrator call and scope event subscriptions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque, high-entropy token. Never reused once issued.
    pub id: String,
    pub user_id: Uuid,
    pub client_ip: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub invalidated: bool,
}

impl Session {
    pub fn new(user_id: Uuid, client_ip: impl Into<String>, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: new_session_token(),
            user_id,
            client_ip: client_ip.into(),
            created_at: now,
            expires_at: now + duration,
            invalidated: false,
        }
    }

    /// Valid iff not invalidated and not yet expired. IP binding is
    /// checked separately by the caller, which also has the presenting IP.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.invalidated && self.expires_at > now
    }
}

/// 256 bits of randomness, hex-encoded. The transport layer signs this
/// token before handing it to the client; the signature itself is out of
/// scope here.
fn new_session_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_live() {
        let session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(24));
        assert!(session.is_live(Utc::now()));
    }

    #[test]
    fn expired_session_is_not_live() {
        let mut session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(24));
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(!session.is_live(Utc::now()));
    }

    #[test]
    fn invalidated_session_is_not_live_even_if_unexpired() {
        let mut session = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(24));
        session.invalidated = true;
        assert!(!session.is_live(Utc::now()));
    }

    #[test]
    fn tokens_are_not_reused_across_sessions() {
        let a = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(1));
        let b = Session::new(Uuid::new_v4(), "127.0.0.1", Duration::hours(1));
        assert_ne!(a.id, b.id);
    }
}
