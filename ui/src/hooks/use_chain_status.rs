use chain::error::ChainError;
use dioxus::prelude::*;

#[derive(Clone, PartialEq, Debug, strum::EnumIs)]
pub enum ChainConnectionStatus {
    Connected,
    Disconnected(String),
}

#[derive(Clone, Copy)]
pub struct ChainStatus {
    status: Signal<ChainConnectionStatus>,
}

impl ChainStatus {
    /// Inspects a result from a chain call.
    /// - `Ok`: flips the indicator back to Connected if needed, returns the value.
    /// - `Err`: logs it; a transport-level error marks us Disconnected. Returns None.
    pub fn check<T>(&mut self, result: Result<T, ChainError>) -> Option<T> {
        match result {
            Ok(val) => {
                if self.status.peek().is_disconnected() {
                    self.status.set(ChainConnectionStatus::Connected);
                }
                Some(val)
            }
            Err(e) => {
                dioxus_logger::tracing::warn!("chain call failed: {e}");
                if is_connection_error(&e) {
                    self.status
                        .set(ChainConnectionStatus::Disconnected(e.to_string()));
                }
                None
            }
        }
    }

    pub fn mark_disconnected(&mut self, reason: impl Into<String>) {
        self.status
            .set(ChainConnectionStatus::Disconnected(reason.into()));
    }

    /// The read-only signal; subscribe with `.read()` in a component.
    pub fn status(&self) -> Signal<ChainConnectionStatus> {
        self.status
    }
}

/// Connect and transport failures flip the indicator; a missing block or a
/// bad payload is a logic-level result and does not.
fn is_connection_error(err: &ChainError) -> bool {
    matches!(err, ChainError::Connect { .. } | ChainError::Rpc { .. })
}

pub fn use_chain_status() -> ChainStatus {
    let status = use_context::<Signal<ChainConnectionStatus>>();
    ChainStatus { status }
}
