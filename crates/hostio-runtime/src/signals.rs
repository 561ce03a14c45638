//! Signal listeners: OS signal deliveries pumped into a handler.
//!
//! Installing a listener replaces the signal's default disposition for the
//! rest of the process lifetime, the same as any tokio signal stream.

use std::sync::Arc;

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::{
    EventSource, EventStreamPump, HandleState, ProcessContext, ResourceHandle, ResourceKind,
    Subscription,
};
use hostio_process::Signal;
use tokio::runtime::Handle;

#[cfg(unix)]
struct SignalStream {
    signal: Signal,
    inner: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl EventSource for SignalStream {
    type Event = Signal;

    async fn next_event(&mut self) -> Option<BridgeResult<Signal>> {
        self.inner.recv().await.map(|()| Ok(self.signal))
    }
}

/// A live subscription to one OS signal. Ref'd by default.
#[cfg(unix)]
pub struct SignalListener {
    state: HandleState,
    signal: Signal,
    pump: EventStreamPump<SignalStream>,
}

/// Install a listener for `signal` without attaching a handler yet.
#[cfg(unix)]
pub fn listen_signal(ctx: &ProcessContext, signal: Signal) -> BridgeResult<SignalListener> {
    use tokio::signal::unix::SignalKind;

    let op = "listen_signal";
    Handle::try_current().map_err(|_| BridgeError::io(op, "no async runtime is running"))?;
    if matches!(signal, Signal::Sigkill | Signal::Sigstop) {
        return Err(BridgeError::invalid_argument(
            op,
            format!("{signal} cannot be caught"),
        ));
    }
    let inner = tokio::signal::unix::signal(SignalKind::from_raw(signal.number()))
        .map_err(|e| BridgeError::from_io(op, e))?;

    let state = HandleState::new(ResourceKind::SignalListener, ctx.keep_alive());
    let pump = EventStreamPump::new(
        state.label(),
        SignalStream { signal, inner },
        state.close_token(),
        ctx.pump_policy(),
        ctx.diagnostics(),
    );
    tracing::debug!(resource = %state.label(), %signal, "signal listener installed");
    Ok(SignalListener {
        state,
        signal,
        pump,
    })
}

#[cfg(not(unix))]
pub struct SignalListener {
    state: HandleState,
    signal: Signal,
}

#[cfg(not(unix))]
pub fn listen_signal(_ctx: &ProcessContext, signal: Signal) -> BridgeResult<SignalListener> {
    Err(BridgeError::invalid_argument(
        "listen_signal",
        format!("{signal} listeners are not supported on this platform"),
    ))
}

impl SignalListener {
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Pump deliveries of the signal into `handler`.
    #[cfg(unix)]
    pub fn listen<H>(&self, handler: H) -> BridgeResult<Subscription>
    where
        H: FnMut(Signal) + Send + 'static,
    {
        self.state.ensure_open()?;
        self.pump.attach(handler)
    }

    #[cfg(not(unix))]
    pub fn listen<H>(&self, _handler: H) -> BridgeResult<Subscription>
    where
        H: FnMut(Signal) + Send + 'static,
    {
        Err(BridgeError::already_closed(self.state.label()))
    }
}

impl ResourceHandle for SignalListener {
    fn state(&self) -> &HandleState {
        &self.state
    }

    /// The close token stops the pump, which drops the signal stream.
    fn close_native(&self) -> BridgeResult<()> {
        Ok(())
    }
}

/// Install a listener, attach `handler`, and register the listener with
/// the context so `close_all` reaches it.
pub fn add_signal_listener<H>(
    ctx: &ProcessContext,
    signal: Signal,
    handler: H,
) -> BridgeResult<Arc<SignalListener>>
where
    H: FnMut(Signal) + Send + 'static,
{
    let listener = Arc::new(listen_signal(ctx, signal)?);
    listener.listen(handler)?;
    ctx.register(Arc::clone(&listener) as Arc<dyn ResourceHandle>);
    Ok(listener)
}

/// Close a listener made by [`add_signal_listener`] and forget it, even
/// when the close itself fails.
pub fn remove_signal_listener(ctx: &ProcessContext, listener: &SignalListener) -> BridgeResult<()> {
    ctx.resources().remove(&listener.id());
    listener.close()
}
