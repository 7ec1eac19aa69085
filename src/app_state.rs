use std::sync::Arc;

use crate::config::Config;
use crate::db::store::DocumentStore;
use crate::middleware::auth::{create_profile_cache, ProfileCache};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub profiles: ProfileCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            profiles: create_profile_cache(config.profile_cache_ttl),
            config: Arc::new(config),
        }
    }

    /// Drop cached profiles after their User records were written.
    pub fn invalidate_profiles<'a>(&self, emails: impl IntoIterator<Item = &'a str>) {
        for email in emails {
            self.profiles.invalidate(email);
        }
    }
}
