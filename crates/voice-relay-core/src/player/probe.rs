use crate::{player::PlayerConnector, retry::RetryPolicy};

use std::sync::Arc;

use tracing::{debug, instrument};

/// Checks whether the player answers on its control channel.
#[derive(Clone)]
pub struct ConnectionProbe {
    connector: Arc<dyn PlayerConnector>,
}

impl ConnectionProbe {
    /// Probe through `connector`.
    pub fn new(connector: Arc<dyn PlayerConnector>) -> Self {
        Self { connector }
    }

    /// Open a channel and ask for the entry count, retrying under `policy`.
    ///
    /// A player that accepts the connection but does not answer the query
    /// counts as unreachable. Every attempt uses a fresh channel. Blocks for
    /// up to `attempts * delay` plus the reply timeouts.
    #[instrument(skip(self), fields(attempts = policy.max_attempts()))]
    pub fn probe(&self, policy: RetryPolicy) -> bool {
        let reachable = policy
            .run("player probe", |_attempt| {
                self.connector
                    .connect()
                    .and_then(|mut control| control.sound_count())
                    .map(drop)
            })
            .is_ok();

        debug!(reachable, "Player probe finished");
        reachable
    }
}
