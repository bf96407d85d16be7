use thiserror::Error;

/// Top-level errors surfaced out of the server's setup path. Per-subscriber
/// failures (transport errors, slow writes) never reach this type; they are
/// confined to that subscriber's own tasks and handled by eviction instead.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
