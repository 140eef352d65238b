// Serial executor for flag step sequences.
//
// Step n+1 is issued only after step n's request has resolved and its
// hold has elapsed. No two steps of one invocation are ever in flight
// concurrently; overlap *between* invocations is the session's concern
// (single-flight guard in `Session::apply_flag`).

use pitlight_api::LightClient;
use tracing::debug;

use crate::error::CoreError;
use crate::sequence::{Command, Step};

/// Execute `steps` in order against `selector`.
///
/// A step failure aborts the remainder and reports how many steps had
/// completed; earlier steps are not rolled back.
pub async fn run_sequence(
    client: &LightClient,
    selector: &str,
    steps: &[Step],
) -> Result<(), CoreError> {
    for (completed, step) in steps.iter().enumerate() {
        debug!(step = completed + 1, total = steps.len(), %selector, "executing sequence step");

        let result = match &step.command {
            Command::SetState(state) => client.set_state(selector, state).await,
            Command::Pulse(effect) => client.pulse(selector, effect).await,
        };

        if let Err(source) = result {
            return Err(CoreError::SequenceAborted { completed, source });
        }

        if !step.hold_after.is_zero() {
            tokio::time::sleep(step.hold_after).await;
        }
    }

    Ok(())
}
