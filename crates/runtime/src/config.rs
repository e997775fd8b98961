/// Runtime knobs. Defaults match what compiled templates expect.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Route generic `on*` handlers for events in the delegated set through a
    /// single document-level listener instead of per-node listeners.
    pub delegate_events: bool,
    /// Maximum producer invocations while unwrapping one lazy chain.
    /// Exceeding it resolves the chain to `Undefined`.
    pub unwrap_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            delegate_events: false,
            unwrap_limit: 10_000,
        }
    }
}
