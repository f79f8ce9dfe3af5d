use crate::config::AppConfig;
use crate::db::Store;

pub struct AppState {
    pub store: Box<dyn Store>,
    pub config: AppConfig,
    /// HMAC key for session cookies.
    pub session_key: Vec<u8>,
}

impl AppState {
    pub fn new(store: Box<dyn Store>, config: AppConfig) -> Self {
        let session_key = if config.session_secret.is_empty() {
            use rand::RngCore;
            let mut key = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            key
        } else {
            config.session_secret.as_bytes().to_vec()
        };

        Self {
            store,
            config,
            session_key,
        }
    }
}
