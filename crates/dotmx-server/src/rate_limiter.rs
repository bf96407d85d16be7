use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// A leaky-bucket rate limiter shared across every subscriber's fan-out.
///
/// `burst` tokens are available immediately; once exhausted, one token
/// leaks back in every `rate_ms`. [`RateLimiter::acquire`] suspends the
/// caller only long enough to let a token accrue — it never queues callers
/// beyond that, so one slow acquire cannot starve another indefinitely.
pub(crate) struct RateLimiter {
    rate: Duration,
    burst: u32,
    state: Mutex<State>,
}

struct State {
    tokens: f64,
    last_leak: Instant,
}

impl RateLimiter {
    pub(crate) fn new(rate_ms: u64, burst: u32) -> Self {
        Self {
            rate: Duration::from_millis(rate_ms.max(1)),
            burst,
            state: Mutex::new(State {
                tokens: f64::from(burst),
                last_leak: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available, then consumes it.
    pub(crate) async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock();
                self.leak(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    Some(self.rate)
                }
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }

    fn leak(&self, state: &mut State) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_leak);
        let leaked = elapsed.as_secs_f64() / self.rate.as_secs_f64();
        if leaked > 0.0 {
            state.tokens = (state.tokens + leaked).min(f64::from(self.burst));
            state.last_leak = now;
        }
    }
}
