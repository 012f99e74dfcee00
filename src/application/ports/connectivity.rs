use async_trait::async_trait;

/// Platform connectivity and power state, consulted before a pass runs.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_network_available(&self) -> bool;

    /// Periodic passes are skipped while the battery is critically low.
    async fn is_battery_low(&self) -> bool;
}
