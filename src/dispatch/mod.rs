//! Due-reminder dispatch.
//!
//! [`run_dispatch_cycle`] is the single entry point; whoever calls it (the
//! in-process [`trigger`], a cron job running `remindmail dispatch-once`, a
//! serverless timer) decides when. `now` is always passed in.

pub mod cycle;
pub mod trigger;

use time::PrimitiveDateTime;

pub use cycle::{CycleError, DispatchReport};

use crate::state::AppState;

pub async fn run_dispatch_cycle(
    state: &AppState,
    now: PrimitiveDateTime,
) -> Result<DispatchReport, CycleError> {
    cycle::run(state.store.as_ref(), state.notifier.as_ref(), now).await
}
