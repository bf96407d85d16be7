//! Streaming pipeline that fans a dot-matrix framebuffer out to many
//! concurrent WebSocket subscribers and funnels their input back.
//!
//! This crate owns the pieces between the pixel producer (an external
//! "emulator", modeled here purely as a [`FrameSink`] consumer) and the
//! wire: the live frame buffer (`display`), the per-tick full/delta
//! dispatch loop with rate limiting and slow-subscriber eviction
//! (`dispatch`), the subscriber registry (`subscriber`), the input
//! plurality-vote aggregator (`input`), and the transport abstraction that
//! binds all of it to `tokio-tungstenite` (`transport`). The line and
//! frame codec itself lives in `dotmx_codec`.

#[macro_use]
extern crate tracing;

mod builder;
mod config;
mod dispatch;
mod display;
mod error;
mod input;
mod rate_limiter;
mod session;
mod subscriber;
mod transport;

pub use builder::ServerBuilder;
pub use config::{RateLimitConfig, ServerConfig};
pub use display::{FrameSink, FrameSource};
pub use error::ServerError;
pub use input::InputAggregator;
pub use subscriber::{SubscriberHandle, SubscriberRegistry};
pub use transport::{
    Transport, TransportError, TransportReader, TransportWriter, WebSocketReader, WebSocketTransport, WebSocketWriter,
};

use dotmx_codec::Frame;

/// Capability the emulator is given to push freshly-drawn frames and to be
/// told when it should pause or resume, without holding a reference back
/// into the server.
#[async_trait::async_trait]
pub trait EmulatorControl: Send + Sync {
    /// Pause signal: the subscriber set just became empty and
    /// `pause_if_idle` is configured. The emulator may stop drawing.
    async fn pause(&self);

    /// Resume signal: a new subscriber connected while paused.
    async fn resume(&self);
}

/// A no-op implementation for tests and for deployments that never pause.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmulatorControl;

#[async_trait::async_trait]
impl EmulatorControl for NoopEmulatorControl {
    async fn pause(&self) {}
    async fn resume(&self) {}
}

/// Blank-frame convenience re-export, useful for seeding a [`FrameSource`].
pub fn blank_frame() -> Frame {
    Frame::blank()
}
