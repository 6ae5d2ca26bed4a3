//! Upload progress reporting.
//!
//! Multipart file parts are streamed in fixed-size chunks; each chunk handed
//! to the transport advances the percentage. Reported values never decrease,
//! even when the body is streamed a second time after a token refresh, and
//! nothing is reported once the upload has settled.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::Stream;

/// Bytes per streamed chunk of an upload body.
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Default)]
struct ProgressState {
    last: Option<u8>,
    settled: bool,
}

/// Percentage callback shared between the caller and the body stream.
///
/// The callback may read [`last`](Self::last) and
/// [`is_settled`](Self::is_settled), but must not call `report` or `settle`
/// on the same progress.
#[derive(Clone)]
pub struct UploadProgress {
    state: Arc<Mutex<ProgressState>>,
    // Held for the duration of a callback; always taken before `state`.
    emit: Arc<Mutex<()>>,
    callback: Arc<dyn Fn(u8) + Send + Sync>,
}

impl UploadProgress {
    pub fn new(callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressState::default())),
            emit: Arc::new(Mutex::new(())),
            callback: Arc::new(callback),
        }
    }

    /// Record that `loaded` of `total` bytes have been sent.
    ///
    /// Ignored when `total` is zero, when the value would not increase, or
    /// after [`settle`](Self::settle).
    pub fn report(&self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }
        let pct = percent(loaded, total);
        let _emitting = self.emit.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.settled || state.last.is_some_and(|last| pct <= last) {
                return;
            }
            state.last = Some(pct);
        }
        (self.callback)(pct);
    }

    /// Stop all further reports. Called before the upload returns to its caller.
    ///
    /// Waits for a callback that is already running, so nothing fires once
    /// this returns.
    pub fn settle(&self) {
        let _emitting = self.emit.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.settled = true;
    }

    pub fn is_settled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .settled
    }

    /// Last value passed to the callback.
    pub fn last(&self) -> Option<u8> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).last
    }
}

impl fmt::Debug for UploadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("UploadProgress")
            .field("last", &state.last)
            .field("settled", &state.settled)
            .finish()
    }
}

/// Rounded percentage, clamped to 100.
fn percent(loaded: u64, total: u64) -> u8 {
    let loaded = loaded.min(total) as u128;
    let total = total as u128;
    ((loaded * 100 + total / 2) / total) as u8
}

/// Stream `content` in [`CHUNK_SIZE`] chunks, reporting progress as each
/// chunk is yielded.
pub fn chunked(
    content: Arc<Vec<u8>>,
    progress: UploadProgress,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = content.len();
    futures::stream::iter((0..total).step_by(CHUNK_SIZE).map(move |start| {
        let end = (start + CHUNK_SIZE).min(total);
        progress.report(end as u64, total as u64);
        Ok(content[start..end].to_vec())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn recorder() -> (UploadProgress, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress = UploadProgress::new(move |pct| sink.lock().unwrap().push(pct));
        (progress, seen)
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0, 200), 0);
        assert_eq!(percent(1, 200), 1); // 0.5 rounds up
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(500, 100), 100);
    }

    #[test]
    fn test_reports_are_monotonic() {
        let (progress, seen) = recorder();
        progress.report(50, 100);
        progress.report(20, 100); // a retried body starts over
        progress.report(50, 100);
        progress.report(100, 100);
        assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
        assert_eq!(progress.last(), Some(100));
    }

    #[test]
    fn test_no_reports_after_settle() {
        let (progress, seen) = recorder();
        progress.report(10, 100);
        progress.settle();
        progress.report(90, 100);
        assert!(progress.is_settled());
        assert_eq!(*seen.lock().unwrap(), vec![10]);
    }

    #[test]
    fn test_callback_can_read_its_own_progress() {
        let slot: Arc<Mutex<Option<UploadProgress>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (reader, sink) = (slot.clone(), seen.clone());
        let progress = UploadProgress::new(move |pct| {
            let own = reader.lock().unwrap().clone().unwrap();
            sink.lock().unwrap().push((pct, own.last(), own.is_settled()));
        });
        *slot.lock().unwrap() = Some(progress.clone());

        progress.report(40, 100);
        progress.report(100, 100);
        progress.settle();
        progress.report(100, 100);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(40, Some(40), false), (100, Some(100), false)]
        );
    }

    #[test]
    fn test_settle_waits_for_running_callback() {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress = UploadProgress::new(move |pct| {
            entered_tx.send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
            sink.lock().unwrap().push(pct);
        });

        let reporter = progress.clone();
        let worker = std::thread::spawn(move || reporter.report(30, 100));
        entered_rx.recv().unwrap();

        let settler = progress.clone();
        let settling = std::thread::spawn(move || settler.settle());
        release_tx.send(()).unwrap();
        settling.join().unwrap();
        worker.join().unwrap();

        // The in-flight callback finished before settle returned
        assert_eq!(*seen.lock().unwrap(), vec![30]);
        progress.report(90, 100);
        assert_eq!(*seen.lock().unwrap(), vec![30]);
    }

    #[test]
    fn test_zero_total_is_ignored() {
        let (progress, seen) = recorder();
        progress.report(0, 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chunked_stream_reports_to_completion() {
        let (progress, seen) = recorder();
        let content = Arc::new(vec![7u8; CHUNK_SIZE * 2 + 10]);
        let chunks: Vec<_> = chunked(content.clone(), progress).collect().await;

        assert_eq!(chunks.len(), 3);
        let total: usize = chunks.iter().map(|c| c.as_ref().unwrap().len()).sum();
        assert_eq!(total, content.len());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
