use std::sync::Arc;
use std::time::Duration;

use dotmx_codec::FrameAssembler;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::display::FrameSource;
use crate::input::InputAggregator;
use crate::subscriber::{SubscriberId, SubscriberRegistry};
use crate::transport::{Transport, TransportReader, TransportWriter};

/// Runs one subscriber's registration handshake, then spawns its read task
/// and drives its write task to completion, following the registration
/// protocol: register under the registry lock, synchronously push a full
/// frame before joining fan-out, signal a new connection if the emulator
/// might be paused, then split into independent read and write loops.
///
/// The body runs under `.instrument(span)` rather than `span.enter()`:
/// holding an `Entered` guard across the `.await` points below would make
/// the generated future `!Send`, which `tokio::spawn` requires.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_subscriber<T: Transport>(
    transport: T,
    id: SubscriberId,
    registry: Arc<SubscriberRegistry>,
    input: Arc<InputAggregator>,
    frames: FrameSource,
    new_connection_signal: mpsc::Sender<()>,
    pause_if_idle: bool,
    client_write_timeout: Duration,
) {
    let span = tracing::info_span!("subscriber", id = %id);
    async move {
        let (handle, mut outbound) = registry.register(id.clone());
        input.insert(id.clone());
        debug!("registered");

        let (mut writer, mut reader) = transport.split();

        let full_frame = FrameAssembler::new().encode_full(&frames.snapshot());
        if writer.send(full_frame, client_write_timeout).await.is_err() {
            warn!("handshake full frame failed, evicting before fan-out");
            handle.mark_closed();
            registry.evict(&id);
            input.remove(&id);
            return;
        }

        if pause_if_idle {
            // Best-effort: a full signal channel means a connection is already
            // pending resume, so losing this one is harmless.
            let _ = new_connection_signal.try_send(());
        }

        let read_registry = registry.clone();
        let read_input = input.clone();
        let read_id = id.clone();
        let read_handle = handle.clone();
        let read_span = tracing::Span::current();
        let reader_task = tokio::spawn(
            async move {
                loop {
                    match reader.recv().await {
                        Ok(Some(message)) => {
                            if let Some(&byte) = message.first() {
                                read_input.record(&read_id, byte);
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            trace!(error = %err, "read task closing");
                            break;
                        }
                    }
                }
                read_handle.mark_closed();
                read_registry.evict(&read_id);
                read_input.remove(&read_id);
            }
            .instrument(read_span),
        );

        while let Some(message) = outbound.recv().await {
            if handle.is_closed() {
                break;
            }
            if writer.send(message, client_write_timeout).await.is_err() {
                warn!("write failed or timed out, closing subscriber");
                handle.mark_closed();
                break;
            }
        }

        registry.evict(&id);
        input.remove(&id);
        reader_task.abort();
        debug!("unregistered");
    }
    .instrument(span)
    .await
}
