//! Stateless sessions carried in a signed cookie.
//!
//! The cookie value is `<payload>.<signature>`, both URL-safe base64 without
//! padding. The payload is the JSON-encoded [`Session`], and the signature is
//! HMAC-SHA1 over the encoded payload. Nothing is stored server side, so
//! logout only clears the browser's copy.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::models::Role;
use crate::services::accounts::Identity;

pub const COOKIE_NAME: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub full_name: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl Session {
    pub fn start(identity: Identity, ttl_minutes: i64) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
            full_name: identity.full_name,
            expires_at: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp(),
        }
    }
}

fn mac(key: &[u8]) -> anyhow::Result<Hmac<Sha1>> {
    Hmac::<Sha1>::new_from_slice(key).map_err(|e| anyhow::anyhow!("invalid session key: {e}"))
}

pub fn encode(session: &Session, key: &[u8]) -> anyhow::Result<String> {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(session)?);
    let mut mac = mac(key)?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// `None` for anything tampered, malformed or expired at `now` (unix seconds).
pub fn decode(token: &str, key: &[u8], now: i64) -> Option<Session> {
    let (payload, signature) = token.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    let mut mac = mac(key).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let session: Session = serde_json::from_slice(&json).ok()?;
    (session.expires_at > now).then_some(session)
}

/// Pulls the session token out of one or more `Cookie` header values.
pub fn token_from_cookies<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    headers
        .into_iter()
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value)
}

pub fn set_cookie(token: &str, ttl_minutes: i64) -> String {
    format!(
        "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl_minutes * 60
    )
}

pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-session-key";

    fn session(expires_at: i64) -> Session {
        Session {
            user_id: "p1".to_string(),
            role: Role::Patient,
            full_name: "Alice".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_decode_accepts_own_token() {
        let token = encode(&session(2_000), KEY).unwrap();
        assert_eq!(decode(&token, KEY, 1_000), Some(session(2_000)));
    }

    #[test]
    fn test_decode_rejects_expired() {
        let token = encode(&session(2_000), KEY).unwrap();
        assert_eq!(decode(&token, KEY, 2_000), None);
    }

    #[test]
    fn test_decode_rejects_other_key() {
        let token = encode(&session(2_000), KEY).unwrap();
        assert_eq!(decode(&token, b"another-key", 1_000), None);
    }

    #[test]
    fn test_decode_rejects_forged_role() {
        let token = encode(&session(2_000), KEY).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = session(2_000);
        forged.role = Role::Doctor;
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        assert_eq!(decode(&format!("{payload}.{signature}"), KEY, 1_000), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode("", KEY, 0), None);
        assert_eq!(decode("abc", KEY, 0), None);
        assert_eq!(decode("abc.!!!", KEY, 0), None);
    }

    #[test]
    fn test_token_from_cookies() {
        assert_eq!(token_from_cookies(["theme=dark; session=abc.def"]), Some("abc.def"));
        assert_eq!(token_from_cookies(["theme=dark", "session=xyz"]), Some("xyz"));
        assert_eq!(token_from_cookies(["sessionid=nope"]), None);
        assert_eq!(token_from_cookies(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_start_sets_expiry_in_future() {
        let identity = Identity {
            user_id: "d1".to_string(),
            role: Role::Doctor,
            full_name: "Dr. One".to_string(),
        };
        let session = Session::start(identity, 30);
        let now = Utc::now().timestamp();
        assert!(session.expires_at > now + 29 * 60);
        assert!(session.expires_at <= now + 30 * 60);
    }
}
