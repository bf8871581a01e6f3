use crate::app::config::{PageSettings, WishConfig};
use crate::discovery::resolver::AssetResolver;

/// Shared, read-only service state. Every request re-resolves assets, so
/// nothing here changes after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub resolver: AssetResolver,
    pub page: PageSettings,
    /// Whether `/debug_assets` is served
    pub debug_assets: bool,
}

impl AppState {
    pub fn new(resolver: AssetResolver, page: PageSettings, debug_assets: bool) -> Self {
        Self {
            resolver,
            page,
            debug_assets,
        }
    }

    pub fn from_config(config: &WishConfig) -> Self {
        Self::new(
            AssetResolver::new(config.assets.clone()),
            config.page.clone(),
            config.debug_assets,
        )
    }
}
