use serde::Deserialize;

/// Recognized configuration keys for the streaming endpoint.
///
/// Parsing the config file itself (TOML/YAML/whatever) and wiring it to a
/// CLI are outside this crate; callers deserialize into this struct however
/// they like and hand it to [`crate::ServerBuilder`].
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// TCP port the streaming endpoint binds to.
    pub port: u16,

    /// Path handed to the emulator at startup. Opaque to this crate.
    #[serde(default)]
    pub game_path: Option<String>,

    /// Milliseconds between forced full-frame refreshes. Must be >= 1.
    #[serde(rename = "full_picture_interval")]
    pub full_picture_interval_ms: u64,

    /// Milliseconds before a pending send is considered a slow subscriber.
    #[serde(rename = "client_write_timeout")]
    pub client_write_timeout_ms: u64,

    /// Pause the emulator when the subscriber count reaches zero; resume on
    /// the next new subscriber.
    #[serde(default)]
    pub pause_if_idle: bool,

    /// Rate limiter configuration shared by every subscriber's fan-out.
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum interval, in milliseconds, between permitted sends once the
    /// burst allowance is exhausted.
    pub ms: u64,

    /// Maximum number of immediate sends permitted before pacing kicks in.
    pub burst: u32,
}

impl ServerConfig {
    /// Validates the invariants the rest of the crate assumes hold.
    pub fn validate(&self) -> Result<(), crate::ServerError> {
        if self.full_picture_interval_ms == 0 {
            return Err(crate::ServerError::Config(
                "full_picture_interval_ms must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}
