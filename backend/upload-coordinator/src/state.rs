//! Shared application state handed to every handler and use-case.

use crate::config::Config;
use event_bus::EventBusAdapter;
use object_store::ObjectStoreAdapter;
use std::sync::Arc;
use video_repository::VideoRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn VideoRepository>,
    pub object_store: Arc<dyn ObjectStoreAdapter>,
    pub event_bus: Arc<dyn EventBusAdapter>,
    pub config: Arc<Config>,
}
