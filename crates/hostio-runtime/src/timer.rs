//! Timers as lifecycle resources.
//!
//! A [`Timer`] fires once and settles its completion with how it ended; an [`Interval`]
//! pumps numbered ticks into a handler. Both are ref'd at creation,
//! registered with the context, and addressable by id through
//! [`ref_timer`] / [`unref_timer`].

use std::sync::Arc;
use std::time::Duration;

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::{
    CompletionCell, CompletionFuture, EventSource, EventStreamPump, HandleState, ProcessContext,
    ResourceHandle, ResourceId, ResourceKind, Subscription,
};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

/// How a one-shot timer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerExit {
    Fired,
    Cleared,
}

impl TimerExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fired => "fired",
            Self::Cleared => "cleared",
        }
    }
}

/// One-shot timer.
pub struct Timer {
    state: Arc<HandleState>,
    delay: Duration,
    ended: CompletionCell<TimerExit>,
}

impl Timer {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Resolves with [`TimerExit::Fired`], or [`TimerExit::Cleared`] when
    /// the timer is closed before it fires.
    pub fn completion(&self) -> CompletionFuture<TimerExit> {
        self.ended.future()
    }
}

impl ResourceHandle for Timer {
    fn state(&self) -> &HandleState {
        &self.state
    }

    fn close_native(&self) -> BridgeResult<()> {
        self.ended.resolve(TimerExit::Cleared);
        Ok(())
    }
}

/// Fire once after `delay`.
pub fn set_timeout(ctx: &ProcessContext, delay: Duration) -> BridgeResult<Arc<Timer>> {
    let runtime = Handle::try_current()
        .map_err(|_| BridgeError::io("set_timeout", "no async runtime is running"))?;
    let state = Arc::new(HandleState::new(ResourceKind::Timer, ctx.keep_alive()));
    let ended = CompletionCell::new();

    let cleared = state.close_token();
    let task_state = Arc::clone(&state);
    let task_ended = ended.clone();
    runtime.spawn(async move {
        tokio::select! {
            biased;
            _ = cleared.aborted() => {}
            _ = tokio::time::sleep(delay) => {
                task_ended.resolve(TimerExit::Fired);
                // Leaves the context's table along with the keep-alive.
                task_state.begin_close();
                tracing::debug!(resource = %task_state.label(), "timer fired");
            }
        }
    });

    let timer = Arc::new(Timer {
        state,
        delay,
        ended,
    });
    ctx.register(Arc::clone(&timer) as Arc<dyn ResourceHandle>);
    Ok(timer)
}

struct Ticks {
    interval: tokio::time::Interval,
    count: u64,
}

impl EventSource for Ticks {
    type Event = u64;

    async fn next_event(&mut self) -> Option<BridgeResult<u64>> {
        self.interval.tick().await;
        self.count += 1;
        Some(Ok(self.count))
    }
}

/// Repeating timer. Ticks are numbered from 1.
pub struct Interval {
    state: HandleState,
    period: Duration,
    pump: EventStreamPump<Ticks>,
}

impl Interval {
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn on_tick<H>(&self, handler: H) -> BridgeResult<Subscription>
    where
        H: FnMut(u64) + Send + 'static,
    {
        self.state.ensure_open()?;
        self.pump.attach(handler)
    }
}

impl ResourceHandle for Interval {
    fn state(&self) -> &HandleState {
        &self.state
    }

    fn close_native(&self) -> BridgeResult<()> {
        Ok(())
    }
}

/// Tick every `period`, first tick one period from now.
pub fn set_interval(ctx: &ProcessContext, period: Duration) -> BridgeResult<Arc<Interval>> {
    Handle::try_current()
        .map_err(|_| BridgeError::io("set_interval", "no async runtime is running"))?;
    if period.is_zero() {
        return Err(BridgeError::invalid_argument(
            "set_interval",
            "period must be greater than zero",
        ));
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = HandleState::new(ResourceKind::Timer, ctx.keep_alive());
    let pump = EventStreamPump::new(
        state.label(),
        Ticks { interval, count: 0 },
        state.close_token(),
        ctx.pump_policy(),
        ctx.diagnostics(),
    );
    let interval = Arc::new(Interval {
        state,
        period,
        pump,
    });
    ctx.register(Arc::clone(&interval) as Arc<dyn ResourceHandle>);
    Ok(interval)
}

fn registered_timer(
    ctx: &ProcessContext,
    op: &str,
    id: ResourceId,
) -> BridgeResult<Arc<dyn ResourceHandle>> {
    let handle = ctx
        .resources()
        .get(&id)
        .ok_or_else(|| BridgeError::invalid_argument(op, format!("no timer with id {id}")))?;
    if handle.kind() != ResourceKind::Timer {
        return Err(BridgeError::invalid_argument(
            op,
            format!("resource {id} is a {}, not a timer", handle.kind()),
        ));
    }
    Ok(handle)
}

/// Make the timer `id` keep the process alive again.
pub fn ref_timer(ctx: &ProcessContext, id: ResourceId) -> BridgeResult<()> {
    registered_timer(ctx, "ref_timer", id)?.ref_();
    Ok(())
}

/// Let the process exit even while timer `id` is pending.
pub fn unref_timer(ctx: &ProcessContext, id: ResourceId) -> BridgeResult<()> {
    registered_timer(ctx, "unref_timer", id)?.unref();
    Ok(())
}
