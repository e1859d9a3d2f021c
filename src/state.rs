use std::sync::Arc;

use crate::{analytics::HttpAnalytics, config::Config, service::PadService};

pub struct AppState {
    pub config: Config,
    pub pad: PadService,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let pad = PadService::new(Arc::new(HttpAnalytics::new(&config.api_url)));

        Arc::new(Self { config, pad })
    }
}
