use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::display::{FrameSink, FrameSource};
use crate::input::InputAggregator;
use crate::rate_limiter::RateLimiter;
use crate::session::run_subscriber;
use crate::subscriber::SubscriberRegistry;
use crate::transport::WebSocketTransport;
use crate::{EmulatorControl, NoopEmulatorControl, ServerError};

pub struct WantsConfig;
pub struct WantsEmulatorControl {
    config: ServerConfig,
}
pub struct BuilderDone {
    config: ServerConfig,
    emulator: Arc<dyn EmulatorControl>,
}

/// Typestate builder for a streaming server: configuration must be supplied
/// before an emulator control hook (or the no-op default) before the
/// dispatch loop and accept loop can be started.
pub struct ServerBuilder<State> {
    state: State,
}

impl ServerBuilder<WantsConfig> {
    pub fn new() -> Self {
        Self { state: WantsConfig }
    }

    pub fn with_config(self, config: ServerConfig) -> ServerBuilder<WantsEmulatorControl> {
        ServerBuilder {
            state: WantsEmulatorControl { config },
        }
    }
}

impl Default for ServerBuilder<WantsConfig> {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder<WantsEmulatorControl> {
    pub fn with_emulator_control(self, emulator: impl EmulatorControl + 'static) -> ServerBuilder<BuilderDone> {
        ServerBuilder {
            state: BuilderDone {
                config: self.state.config,
                emulator: Arc::new(emulator),
            },
        }
    }

    pub fn with_no_emulator_control(self) -> ServerBuilder<BuilderDone> {
        self.with_emulator_control(NoopEmulatorControl)
    }
}

impl ServerBuilder<BuilderDone> {
    pub fn build(self) -> Result<Server, ServerError> {
        self.state.config.validate()?;
        Ok(Server {
            config: self.state.config,
            emulator: self.state.emulator,
            frames: FrameSource::default(),
        })
    }
}

/// A fully configured server, ready to accept connections.
pub struct Server {
    config: ServerConfig,
    emulator: Arc<dyn EmulatorControl>,
    frames: FrameSource,
}

impl Server {
    /// The frame sink handed to the emulator, decoupling it from the rest
    /// of the server per the server/emulator cyclic-reference redesign.
    pub fn frame_sink(&self) -> Arc<dyn FrameSink> {
        Arc::new(self.frames.clone())
    }

    /// `draw_signal` receives one message per emulator frame; the caller
    /// owns the sending half and wakes the dispatch loop from its own draw
    /// callback.
    pub async fn run(self, draw_signal: mpsc::Receiver<()>) -> Result<(), ServerError> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let registry = Arc::new(SubscriberRegistry::new());
        let input = Arc::new(InputAggregator::new());
        let rate_limiter = Arc::new(RateLimiter::new(self.config.rate_limit.ms, self.config.rate_limit.burst));
        let client_write_timeout = Duration::from_millis(self.config.client_write_timeout_ms);
        let (new_connection_tx, new_connection_rx) = mpsc::channel(1);

        let dispatcher = Dispatcher::new(
            self.frames.clone(),
            registry.clone(),
            input.clone(),
            rate_limiter,
            self.emulator.clone(),
            self.config.pause_if_idle,
        );

        let full_refresh_tick = tokio::time::interval(Duration::from_millis(self.config.full_picture_interval_ms));
        tokio::spawn(dispatcher.run(draw_signal, full_refresh_tick, new_connection_rx));

        let mut next_id: u64 = 0;
        loop {
            let (stream, _peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(error = %err, "failed to accept TCP connection");
                    continue;
                }
            };

            let ws_stream = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws_stream) => ws_stream,
                Err(err) => {
                    warn!(error = %err, "websocket handshake failed");
                    continue;
                }
            };

            next_id += 1;
            let id = next_id.to_string();
            let transport = WebSocketTransport::new(ws_stream);

            let registry = registry.clone();
            let input = input.clone();
            let frames = self.frames.clone();
            let new_connection_tx = new_connection_tx.clone();
            let pause_if_idle = self.config.pause_if_idle;

            tokio::spawn(async move {
                run_subscriber(
                    transport,
                    id,
                    registry,
                    input,
                    frames,
                    new_connection_tx,
                    pause_if_idle,
                    client_write_timeout,
                )
                .await;
            });
        }
    }
}
