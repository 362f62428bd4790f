//! Shared application state handed to every handler as `web::Data<AppState>`.
//!
//! Built once in `main.rs`. Everything in it is either immutable
//! configuration or the session store, which does its own file-level
//! synchronization, so handlers never take a lock here.

use crate::config::AppConfig;
use crate::labels::FontSource;
use crate::session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Session-keyed datasets: the uploaded original and the last view.
    pub store: Arc<dyn SessionStore>,
    pub config: Arc<AppConfig>,
    /// Fonts for label rendering; cloned into the blocking task per request.
    pub fonts: FontSource,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, config: AppConfig) -> Self {
        let fonts = FontSource::new(config.fonts_dir.clone());
        Self {
            store,
            config: Arc::new(config),
            fonts,
        }
    }
}
