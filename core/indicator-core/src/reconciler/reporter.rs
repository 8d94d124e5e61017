//! Hands an accepted transition to the sink.
//!
//! `running` goes out as `off` then `running` so the presentation layer
//! restarts its running animation instead of continuing a stale one.
//! Sink failures stop here.

use crate::sink::Sink;
use crate::types::IndicatorState;

/// The sink calls that make up one reported transition, in order.
pub fn emissions(state: IndicatorState) -> Vec<IndicatorState> {
    match state {
        IndicatorState::Running => vec![IndicatorState::Off, IndicatorState::Running],
        other => vec![other],
    }
}

/// Invokes the sink for `state`. Returns true if every call succeeded.
pub fn report<S: Sink + ?Sized>(sink: &S, agent: &str, state: IndicatorState) -> bool {
    let mut delivered = true;
    for emitted in emissions(state) {
        if let Err(err) = sink.emit(agent, emitted) {
            tracing::debug!(
                agent = %agent,
                state = %emitted,
                error = %err,
                "Indicator sink call failed"
            );
            delivered = false;
        }
    }
    delivered
}
