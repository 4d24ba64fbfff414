//! Single-winner race between the profile fetch and a deadline.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error};

use crate::enrichment::client::ProfileData;

/// Races one enrichment fetch against a deadline timer.
///
/// Exactly one outcome is produced per run: the fetched payload if the
/// call wins and succeeds, otherwise `None` (call failed, or the deadline
/// fired first). The single outcome is structural: the select decides the
/// winner, so there is no response-sent flag to check from two callback
/// paths. One instance serves one request and is not reused.
pub struct EnrichmentRace {
    deadline: Duration,
}

impl EnrichmentRace {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Run the race.
    ///
    /// A fetch that loses to the deadline is not aborted; it keeps running
    /// on a detached task and its eventual result is logged and discarded.
    pub async fn run<F>(&self, fetch: F) -> Option<ProfileData>
    where
        F: Future<Output = anyhow::Result<ProfileData>> + Send + 'static,
    {
        let mut call = tokio::spawn(fetch);

        tokio::select! {
            result = &mut call => match result {
                Ok(Ok(profile)) => {
                    debug!(
                        picture = ?profile.picture,
                        "Profile service call returned. Sending response with external data"
                    );
                    Some(profile)
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Profile service call returned error");
                    None
                }
                Err(e) => {
                    error!(error = %e, "Profile fetch task failed");
                    None
                }
            },
            _ = sleep(self.deadline) => {
                debug!(
                    "Timing out profile service call after {} ms and sending partial response",
                    self.deadline.as_millis()
                );
                // Leave the call running; observe its late result for
                // diagnostics only.
                tokio::spawn(async move {
                    match call.await {
                        Ok(Ok(profile)) => debug!(
                            picture = ?profile.picture,
                            "Profile service call returned but response already sent"
                        ),
                        Ok(Err(e)) => debug!(
                            error = %e,
                            "Profile service call failed after response already sent"
                        ),
                        Err(_) => {}
                    }
                });
                None
            }
        }
    }
}
