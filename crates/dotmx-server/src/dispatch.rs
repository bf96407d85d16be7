use std::sync::Arc;

use dotmx_codec::{Frame, FrameAssembler};
use tokio::sync::mpsc;

use crate::display::FrameSource;
use crate::input::InputAggregator;
use crate::rate_limiter::RateLimiter;
use crate::subscriber::SubscriberRegistry;
use crate::EmulatorControl;

/// Drives the full-vs-delta decision, the periodic full-refresh timer, and
/// rate-limited fan-out to every subscriber.
///
/// One instance owns the dispatch loop's entire state; there is exactly one
/// running at a time per server, since `baseline_frame` is not meant to be
/// shared.
pub(crate) struct Dispatcher {
    frames: FrameSource,
    registry: Arc<SubscriberRegistry>,
    input: Arc<InputAggregator>,
    rate_limiter: Arc<RateLimiter>,
    assembler: FrameAssembler,
    emulator: Arc<dyn EmulatorControl>,
    pause_if_idle: bool,
    baseline_frame: Frame,
    send_full_next: bool,
    running: bool,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        frames: FrameSource,
        registry: Arc<SubscriberRegistry>,
        input: Arc<InputAggregator>,
        rate_limiter: Arc<RateLimiter>,
        emulator: Arc<dyn EmulatorControl>,
        pause_if_idle: bool,
    ) -> Self {
        Self {
            frames,
            registry,
            input,
            rate_limiter,
            assembler: FrameAssembler::new(),
            emulator,
            pause_if_idle,
            baseline_frame: Frame::blank(),
            send_full_next: true,
            running: true,
        }
    }

    /// Runs until `draw_signal` is dropped. Intended to be spawned as its
    /// own task; every iteration either fans a message out or returns
    /// without one, never blocking on a single subscriber.
    pub(crate) async fn run(
        mut self,
        mut draw_signal: mpsc::Receiver<()>,
        mut full_refresh_tick: tokio::time::Interval,
        mut new_connection_signal: mpsc::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = full_refresh_tick.tick() => {
                    self.send_full_next = true;
                }

                maybe_connection = new_connection_signal.recv() => {
                    match maybe_connection {
                        Some(()) if !self.running => {
                            self.emulator.resume().await;
                            self.running = true;
                        }
                        Some(()) => {}
                        None => return,
                    }
                }

                draw = draw_signal.recv() => {
                    match draw {
                        Some(()) => self.on_draw_signal().await,
                        None => return,
                    }
                }
            }
        }
    }

    async fn on_draw_signal(&mut self) {
        if !self.running {
            return;
        }

        let current = self.frames.snapshot();

        if self.send_full_next {
            let message = self.assembler.encode_full(&current);
            self.send_full_next = false;
            self.baseline_frame = current;
            self.fan_out(message).await;
            return;
        }

        let message = self.assembler.encode_delta(&self.baseline_frame, &current);
        let has_changes = self.assembler.has_changes(&self.baseline_frame, &current);
        self.baseline_frame = current;

        if has_changes {
            self.fan_out(message).await;
        }

        if self.pause_if_idle && self.registry.is_empty() {
            self.emulator.pause().await;
            self.running = false;
        }
    }

    async fn fan_out(&self, message: Vec<u8>) {
        for subscriber in self.registry.snapshot() {
            self.rate_limiter.acquire().await;
            if !subscriber.try_send(message.clone()) {
                self.evict(subscriber.id());
            }
        }
    }

    /// Slow-close path: removes a subscriber from both the registry and the
    /// input map. The registry lock is always taken first, matching the
    /// fixed lock order used everywhere else in this crate.
    pub(crate) fn evict(&self, id: &str) {
        warn!(subscriber = id, "queue full, evicting slow subscriber");
        self.registry.evict(id);
        self.input.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopEmulatorControl;

    fn make_dispatcher() -> Dispatcher {
        Dispatcher::new(
            FrameSource::default(),
            Arc::new(SubscriberRegistry::new()),
            Arc::new(InputAggregator::new()),
            Arc::new(RateLimiter::new(1, 1000)),
            Arc::new(NoopEmulatorControl),
            false,
        )
    }

    #[tokio::test]
    async fn first_draw_after_startup_sends_a_full_frame() {
        let mut dispatcher = make_dispatcher();
        let (handle, mut rx) = dispatcher.registry.register("a".to_owned());
        dispatcher.input.insert("a".to_owned());

        dispatcher.on_draw_signal().await;

        let message = rx.try_recv().expect("a frame should have been enqueued");
        assert_eq!(message[0], 0xFA);
        drop(handle);
    }

    #[tokio::test]
    async fn unchanged_frame_after_baseline_produces_no_message() {
        let mut dispatcher = make_dispatcher();
        let (_handle, mut rx) = dispatcher.registry.register("a".to_owned());

        dispatcher.on_draw_signal().await; // full frame, consumes send_full_next
        rx.try_recv().unwrap();

        dispatcher.on_draw_signal().await; // nothing changed since
        assert!(rx.try_recv().is_err());
    }

    /// S6: a subscriber whose queue never drains gets evicted once it fills,
    /// while a subscriber that keeps draining is unaffected.
    #[tokio::test]
    async fn slow_subscriber_is_evicted_without_stalling_others() {
        let dispatcher = make_dispatcher();
        let (slow_handle, _slow_rx) = dispatcher.registry.register("slow".to_owned());
        let (_fast_handle, mut fast_rx) = dispatcher.registry.register("fast".to_owned());
        assert_eq!(dispatcher.registry.len(), 2);

        // One frame short of the capacity fills both queues without tripping
        // eviction yet.
        for _ in 0..crate::subscriber::QUEUE_CAPACITY {
            dispatcher.fan_out(vec![0xFB]).await;
        }
        assert_eq!(dispatcher.registry.len(), 2);
        assert!(!slow_handle.is_closed());

        // The 17th frame overflows `slow`'s untouched queue; `fast` keeps
        // draining so it never overflows.
        fast_rx.try_recv().unwrap();
        dispatcher.fan_out(vec![0xFB]).await;

        assert!(slow_handle.is_closed());
        assert_eq!(dispatcher.registry.len(), 1);
        assert!(fast_rx.try_recv().is_ok());
    }

    /// S7-style: the periodic full-refresh tick forces the very next draw to
    /// be a full frame even after the initial one has already been sent.
    #[tokio::test(start_paused = true)]
    async fn full_refresh_tick_forces_a_full_frame() {
        let mut dispatcher = make_dispatcher();
        let (_handle, mut rx) = dispatcher.registry.register("a".to_owned());

        dispatcher.on_draw_signal().await; // initial full frame
        assert_eq!(rx.try_recv().unwrap()[0], 0xFA);

        dispatcher.on_draw_signal().await; // no changes, nothing sent
        assert!(rx.try_recv().is_err());

        dispatcher.send_full_next = true; // simulates the refresh-tick branch in `run`
        dispatcher.on_draw_signal().await;
        assert_eq!(rx.try_recv().unwrap()[0], 0xFA);
    }

    #[tokio::test]
    async fn idle_pause_stops_fan_out_until_resumed() {
        let mut dispatcher = Dispatcher::new(
            FrameSource::default(),
            Arc::new(SubscriberRegistry::new()),
            Arc::new(InputAggregator::new()),
            Arc::new(RateLimiter::new(1, 1000)),
            Arc::new(NoopEmulatorControl),
            true,
        );

        dispatcher.on_draw_signal().await; // initial full frame, pause check only runs after a delta pass
        assert!(dispatcher.running);

        dispatcher.on_draw_signal().await; // delta pass, still no subscribers -> pauses
        assert!(!dispatcher.running);

        dispatcher.on_draw_signal().await; // paused: ignored
        assert!(!dispatcher.running);

        // Simulates the new_connection_signal branch in `run` plus the
        // periodic refresh tick that independently keeps newly-resumed
        // subscribers in sync.
        dispatcher.running = true;
        dispatcher.send_full_next = true;
        let (_handle, mut rx) = dispatcher.registry.register("a".to_owned());
        dispatcher.on_draw_signal().await;
        assert!(rx.try_recv().is_ok());
    }
}
