//! Race-based signal detector.
//!
//! Starts one wait per signal and returns as soon as any of them sees its
//! signal, or once every wait has given up. This only shortens the common case
//! where the page renders quickly; the resolver re-checks everything afterwards
//! and is the one that decides.

use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tracing::{debug, trace};

use crate::traits::browser::Page;
use crate::types::signal::Signal;

/// Wait for the first of `signals` to become visible, bounded by `budget`.
///
/// Never fails. Each wait's own error or timeout is swallowed so a slow or
/// broken matcher cannot hide a fast one. Waits still pending when this
/// returns are dropped, not cancelled inside the browser.
pub async fn await_any_signal<'s, P, I>(
    page: &P,
    signals: I,
    budget: Duration,
) -> Option<&'s Signal>
where
    P: Page + ?Sized,
    I: IntoIterator<Item = &'s Signal>,
{
    let mut waits: FuturesUnordered<_> = signals
        .into_iter()
        .map(|signal| async move {
            match tokio::time::timeout(budget, page.wait_for(&signal.matcher, budget)).await {
                Ok(Ok(())) => Some(signal),
                Ok(Err(e)) => {
                    trace!(signal = %signal.name, error = %e, "Wait gave up");
                    None
                }
                Err(_) => {
                    trace!(signal = %signal.name, "Wait exceeded budget");
                    None
                }
            }
        })
        .collect();

    while let Some(hit) = waits.next().await {
        if let Some(signal) = hit {
            debug!(signal = %signal.name, "Signal appeared");
            return Some(signal);
        }
    }

    debug!(budget = ?budget, "No signal appeared within budget");
    None
}
