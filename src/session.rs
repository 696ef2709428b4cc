//! Signed, stateless session and flash cookies.
//!
//! A token is `base64url(payload).base64url(hmac_sha256(key, base64url(payload)))`.
//! Anything that fails to verify or decode is treated as absent.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;

use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Key used to sign and verify cookie tokens.
#[derive(Clone)]
pub struct SessionKey {
    key: Arc<[u8]>,
}

impl SessionKey {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: Arc::from(secret),
        }
    }

    /// A random 32-byte key. Sessions signed with it die with the process.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }

    pub fn sign(&self, payload: &[u8]) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac();
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{body}.{signature}")
    }

    /// Return the payload of a token signed with this key.
    pub fn verify(&self, token: &str) -> Option<Vec<u8>> {
        let (body, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(body.as_bytes());
        mac.verify_slice(&signature).ok()?;
        URL_SAFE_NO_PAD.decode(body).ok()
    }

    pub fn seal<T: Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        Ok(self.sign(&serde_json::to_vec(value)?))
    }

    pub fn unseal<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        let payload = self.verify(token)?;
        serde_json::from_slice(&payload).ok()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Who the current request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Value of the named cookie in the request headers, if any.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

fn build_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that tells the browser to drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = build_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

pub fn session_cookie(
    key: &SessionKey,
    identity: &Identity,
) -> Result<Cookie<'static>, serde_json::Error> {
    Ok(build_cookie(SESSION_COOKIE, key.seal(identity)?))
}

pub fn flash_cookie(
    key: &SessionKey,
    messages: &[String],
) -> Result<Cookie<'static>, serde_json::Error> {
    Ok(build_cookie(FLASH_COOKIE, key.seal(&messages)?))
}

/// Identity carried by a valid session cookie.
pub fn identity_from_headers(key: &SessionKey, headers: &HeaderMap) -> Option<Identity> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    key.unseal(&token)
}

/// Flash messages carried by a valid flash cookie.
pub fn flashes_from_headers(key: &SessionKey, headers: &HeaderMap) -> Vec<String> {
    read_cookie(headers, FLASH_COOKIE)
        .and_then(|token| key.unseal(&token))
        .unwrap_or_default()
}
