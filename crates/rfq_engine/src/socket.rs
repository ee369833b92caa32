use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rfq_logging::{rfq_debug, rfq_info, rfq_warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{EngineEvent, SocketChannel, SocketEvent, SocketEventKind, SocketState};

/// Fixed-interval reconnection with a hard attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(3),
            max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    Retry { attempt: u32, delay: Duration },
    GiveUp,
}

/// Counts consecutive failed connections; a successful open resets it.
#[derive(Debug, Clone)]
pub struct ReconnectTracker {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectTracker {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    pub fn on_close(&mut self) -> ReconnectDecision {
        if self.policy.enabled && self.attempts < self.policy.max_attempts {
            self.attempts += 1;
            ReconnectDecision::Retry {
                attempt: self.attempts,
                delay: self.policy.interval,
            }
        } else {
            ReconnectDecision::GiveUp
        }
    }
}

pub trait SocketSink: Send + Sync {
    fn emit(&self, event: SocketEvent);
}

/// Forwards socket events to the engine's event channel, minus anything from
/// a retired handle.
pub struct ChannelSocketSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
    retired: Mutex<HashSet<u64>>,
}

impl ChannelSocketSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self {
            tx,
            retired: Mutex::new(HashSet::new()),
        }
    }

    /// Drops every later event from the handle with `generation`. Call before
    /// closing a handle whose channel may be reopened.
    pub fn retire(&self, generation: u64) {
        match self.retired.lock() {
            Ok(mut retired) => retired.insert(generation),
            Err(poisoned) => poisoned.into_inner().insert(generation),
        };
    }

    fn is_retired(&self, generation: u64) -> bool {
        match self.retired.lock() {
            Ok(retired) => retired.contains(&generation),
            Err(poisoned) => poisoned.into_inner().contains(&generation),
        }
    }
}

impl SocketSink for ChannelSocketSink {
    fn emit(&self, event: SocketEvent) {
        if self.is_retired(event.generation) {
            rfq_debug!(
                "Dropping {:?} from retired {} socket #{}",
                event.kind,
                event.channel,
                event.generation
            );
            return;
        }
        let _ = self.tx.send(EngineEvent::Socket(event));
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// One logical connection to a socket endpoint, reconnecting on its own.
///
/// Dropping the handle (or calling [`SocketHandle::close`]) cancels any
/// pending reconnect and closes the socket.
pub struct SocketHandle {
    channel: SocketChannel,
    generation: u64,
    state: Arc<Mutex<SocketState>>,
    outbound: Option<mpsc::UnboundedSender<String>>,
    cancel: CancellationToken,
}

impl SocketHandle {
    /// Starts the connection task on `runtime`. With no URL the handle stays
    /// disconnected and nothing is spawned.
    pub fn connect(
        runtime: &Handle,
        channel: SocketChannel,
        url: Option<Url>,
        policy: ReconnectPolicy,
        sink: Arc<dyn SocketSink>,
    ) -> Self {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(Mutex::new(SocketState::Disconnected));
        let cancel = CancellationToken::new();

        let Some(url) = url else {
            rfq_debug!("{} socket disabled; no endpoint configured", channel);
            sink.emit(SocketEvent {
                channel,
                generation,
                kind: SocketEventKind::StateChanged(SocketState::Disconnected),
            });
            return Self {
                channel,
                generation,
                state,
                outbound: None,
                cancel,
            };
        };

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let link = Link {
            channel,
            generation,
            state: state.clone(),
            sink,
        };
        runtime.spawn(run(link, url, policy, outbound_rx, cancel.clone()));

        Self {
            channel,
            generation,
            state,
            outbound: Some(outbound_tx),
            cancel,
        }
    }

    pub fn channel(&self) -> SocketChannel {
        self.channel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SocketState {
        read_state(&self.state)
    }

    /// Queues a text frame. Returns false, with a warning, unless open.
    pub fn send_message(&self, message: &str) -> bool {
        if self.state() != SocketState::Connected {
            rfq_warn!("{} socket is not open; dropping outbound message", self.channel);
            return false;
        }
        match &self.outbound {
            Some(tx) => tx.send(message.to_string()).is_ok(),
            None => false,
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn read_state(state: &Mutex<SocketState>) -> SocketState {
    match state.lock() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

// Shared by the connection task to publish lifecycle changes.
struct Link {
    channel: SocketChannel,
    generation: u64,
    state: Arc<Mutex<SocketState>>,
    sink: Arc<dyn SocketSink>,
}

impl Link {
    fn publish(&self, next: SocketState) {
        match self.state.lock() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        self.emit(SocketEventKind::StateChanged(next));
    }

    fn emit(&self, kind: SocketEventKind) {
        self.sink.emit(SocketEvent {
            channel: self.channel,
            generation: self.generation,
            kind,
        });
    }
}

enum PumpExit {
    Cancelled,
    Closed,
}

async fn run(
    link: Link,
    url: Url,
    policy: ReconnectPolicy,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let mut tracker = ReconnectTracker::new(policy);
    loop {
        link.publish(SocketState::Connecting);
        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                link.publish(SocketState::Disconnected);
                return;
            }
            result = connect_async(url.as_str()) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                tracker.on_open();
                rfq_info!("{} socket connected to {}", link.channel, url);
                link.publish(SocketState::Connected);
                if let PumpExit::Cancelled = pump(&link, stream, &mut outbound_rx, &cancel).await {
                    link.publish(SocketState::Disconnected);
                    return;
                }
            }
            Err(err) => {
                rfq_warn!("{} socket failed to connect to {}: {}", link.channel, url, err);
            }
        }

        link.publish(SocketState::Disconnected);
        match tracker.on_close() {
            ReconnectDecision::Retry { attempt, delay } => {
                rfq_info!(
                    "{} socket reconnecting in {:?} (attempt {}/{})",
                    link.channel,
                    delay,
                    attempt,
                    policy.max_attempts
                );
                link.emit(SocketEventKind::ReconnectScheduled { attempt });
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            ReconnectDecision::GiveUp => {
                rfq_warn!(
                    "{} socket giving up after {} reconnect attempts",
                    link.channel,
                    tracker.attempts()
                );
                link.publish(SocketState::Error);
                link.emit(SocketEventKind::ReconnectsExhausted);
                return;
            }
        }
    }
}

async fn pump<S>(
    link: &Link,
    stream: WebSocketStream<S>,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    cancel: &CancellationToken,
) -> PumpExit
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return PumpExit::Cancelled;
            }
            outgoing = outbound_rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(err) = write.send(Message::Text(text)).await {
                        rfq_warn!("{} socket send failed: {}", link.channel, err);
                        return PumpExit::Closed;
                    }
                }
                // The handle is gone; nothing can send or close us anymore.
                None => return PumpExit::Cancelled,
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => link.emit(SocketEventKind::Frame(text)),
                Some(Ok(Message::Close(frame))) => {
                    rfq_info!("{} socket closed by server: {:?}", link.channel, frame);
                    return PumpExit::Closed;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    rfq_warn!("{} socket error: {}", link.channel, err);
                    return PumpExit::Closed;
                }
                None => return PumpExit::Closed,
            },
        }
    }
}
