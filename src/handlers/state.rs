use crate::{
    config::Config,
    error::GasWindowError,
    services::{Analytics, FeeAnalyzer, SessionRegistry},
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    pub analyzer: Arc<FeeAnalyzer>,
    pub analytics: Arc<Analytics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, GasWindowError> {
        let analyzer = FeeAnalyzer::from_config(&config)?;
        let sessions = SessionRegistry::new(
            config.max_sessions,
            Duration::from_secs(config.session_idle_secs),
        );

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            analyzer: Arc::new(analyzer),
            analytics: Arc::new(Analytics::new()),
        })
    }
}
