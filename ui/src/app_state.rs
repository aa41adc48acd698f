use std::ops::Deref;
use std::sync::Arc;

use chain::network_snapshot::NetworkSnapshot;
use chain::preload::LoadStatus;
use chain::preload::PreloadResult;
use chain::rpc::ChainRpc;

/// The immutable application state built from the boot handoff.
pub struct AppStateData {
    pub boot_status: LoadStatus,
    pub initial_snapshot: NetworkSnapshot,
    /// Shared with the preloader; released when the last handle drops.
    pub connection: Option<Arc<dyn ChainRpc>>,
}

#[derive(Clone)]
pub struct AppState(Arc<AppStateData>);

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for AppState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl AppState {
    pub fn new(result: &PreloadResult) -> Self {
        Self(Arc::new(AppStateData {
            boot_status: result.status,
            initial_snapshot: result.snapshot,
            connection: result.connection.clone(),
        }))
    }
}
