//! Asynchronous, de-duplicated bitmap loading keyed by image `src`.
//!
//! Loads run on a [`Spawner`] and report back over a channel. The UI thread
//! calls [`ImageCache::poll`] once per frame to move finished loads into the
//! cache, expire loads that exceeded the timeout and wake any [`ImageLoad`]
//! futures waiting on them.

mod fetch;
mod http;

pub use fetch::{decode_bitmap, FsFetcher, ImageFetcher, MemoryFetcher};
pub use http::{is_remote, HttpFetcher, SchemeFetcher, MAX_REMOTE_IMAGE_BYTES};

use futures::channel::{mpsc, oneshot};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tiny_skia::Pixmap;

use crate::error::ImageLoadError;

/// Decoded, premultiplied image
pub type Bitmap = Pixmap;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

type LoadResult = Result<ImageInfo, ImageLoadError>;
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Natural dimensions of a loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Runs load jobs somewhere off the caller's stack frame
pub trait Spawner {
    fn spawn(&self, job: Job);
}

/// One OS thread per load
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) {
        if let Err(e) = std::thread::Builder::new()
            .name("image-load".into())
            .spawn(job)
        {
            log::error!("failed to spawn image load thread: {}", e);
        }
    }
}

/// Runs jobs immediately; results still arrive through `poll`
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) {
        job();
    }
}

/// Cache status of a single source
#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    Absent,
    Loading,
    Ready(ImageInfo),
    Failed(ImageLoadError),
}

enum Entry {
    Loading {
        token: u64,
        started: Instant,
        waiters: Vec<oneshot::Sender<LoadResult>>,
    },
    Ready(Arc<Bitmap>),
    Failed(ImageLoadError),
}

struct Completion {
    src: String,
    token: u64,
    result: Result<Bitmap, ImageLoadError>,
}

pub struct ImageCache {
    entries: HashMap<String, Entry>,
    fetcher: Arc<dyn ImageFetcher>,
    spawner: Box<dyn Spawner>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    timeout: Duration,
    next_token: u64,
    /// Bumped whenever an entry settles or is evicted
    generation: u64,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.entries.len())
            .field("timeout", &self.timeout)
            .field("generation", &self.generation)
            .finish()
    }
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, spawner: Box<dyn Spawner>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self {
            entries: HashMap::new(),
            fetcher,
            spawner,
            tx,
            rx,
            timeout,
            next_token: 0,
            generation: 0,
        }
    }

    /// Background-thread loading, for the interactive app
    pub fn threaded(fetcher: Arc<dyn ImageFetcher>, timeout: Duration) -> Self {
        Self::new(fetcher, Box::new(ThreadSpawner), timeout)
    }

    /// Synchronous loading, for headless export and tests
    pub fn inline(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::new(fetcher, Box::new(InlineSpawner), DEFAULT_LOAD_TIMEOUT)
    }

    /// Request a bitmap, starting a load unless one is cached or in flight.
    /// Failed entries are retried.
    pub fn request(&mut self, src: &str) -> ImageLoad {
        match self.entries.get_mut(src) {
            Some(Entry::Ready(bitmap)) => ImageLoad::done(src, Ok(info_of(bitmap))),
            Some(Entry::Loading { waiters, .. }) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                ImageLoad::pending(src, rx)
            }
            Some(Entry::Failed(_)) | None => {
                let (tx, rx) = oneshot::channel();
                self.start_load(src, vec![tx]);
                ImageLoad::pending(src, rx)
            }
        }
    }

    /// Start a load only if nothing is known about `src`
    pub fn ensure(&mut self, src: &str) {
        if !self.entries.contains_key(src) {
            self.start_load(src, Vec::new());
        }
    }

    fn start_load(&mut self, src: &str, waiters: Vec<oneshot::Sender<LoadResult>>) {
        let token = self.next_token;
        self.next_token += 1;
        self.entries.insert(
            src.to_owned(),
            Entry::Loading {
                token,
                started: Instant::now(),
                waiters,
            },
        );
        log::debug!("loading image {}", src);

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let src = src.to_owned();
        self.spawner.spawn(Box::new(move || {
            let result = fetcher
                .fetch(&src)
                .and_then(|bytes| decode_bitmap(&src, &bytes));
            // The cache may have been dropped meanwhile
            let _ = tx.unbounded_send(Completion { src, token, result });
        }));
    }

    /// Drain finished loads and expire stale ones. Returns true if anything settled.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        let mut settled = false;

        while let Ok(Some(completion)) = self.rx.try_next() {
            settled |= self.complete(completion);
        }

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter_map(|(src, entry)| match entry {
                Entry::Loading { started, .. } if now.duration_since(*started) >= self.timeout => {
                    Some(src.clone())
                }
                _ => None,
            })
            .collect();
        for src in expired {
            let error = ImageLoadError::Timeout {
                src: src.clone(),
                after_ms: self.timeout.as_millis() as u64,
            };
            log::warn!("{}", error);
            self.settle(&src, Entry::Failed(error));
            settled = true;
        }

        if settled {
            self.generation += 1;
        }
        settled
    }

    fn complete(&mut self, completion: Completion) -> bool {
        let Completion { src, token, result } = completion;
        match self.entries.get(&src) {
            Some(Entry::Loading { token: current, .. }) if *current == token => {}
            _ => {
                log::debug!("discarding stale image load for {}", src);
                return false;
            }
        }
        let entry = match result {
            Ok(bitmap) => {
                log::debug!("loaded image {} ({}x{})", src, bitmap.width(), bitmap.height());
                Entry::Ready(Arc::new(bitmap))
            }
            Err(error) => {
                log::warn!("{}", error);
                Entry::Failed(error)
            }
        };
        self.settle(&src, entry);
        true
    }

    fn settle(&mut self, src: &str, entry: Entry) {
        let outcome = match &entry {
            Entry::Ready(bitmap) => Ok(info_of(bitmap)),
            Entry::Failed(error) => Err(error.clone()),
            Entry::Loading { .. } => return,
        };
        if let Some(Entry::Loading { waiters, .. }) = self.entries.insert(src.to_owned(), entry) {
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    /// Bitmap for `src` if it has loaded
    pub fn get(&self, src: &str) -> Option<&Bitmap> {
        match self.entries.get(src) {
            Some(Entry::Ready(bitmap)) => Some(bitmap.as_ref()),
            _ => None,
        }
    }

    pub fn status(&self, src: &str) -> ImageStatus {
        match self.entries.get(src) {
            None => ImageStatus::Absent,
            Some(Entry::Loading { .. }) => ImageStatus::Loading,
            Some(Entry::Ready(bitmap)) => ImageStatus::Ready(info_of(bitmap)),
            Some(Entry::Failed(error)) => ImageStatus::Failed(error.clone()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.entries
            .values()
            .any(|entry| matches!(entry, Entry::Loading { .. }))
    }

    /// Evict settled entries whose source is not in `live`. In-flight loads are kept.
    pub fn retain_sources<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) -> usize {
        let live: HashSet<&str> = live.into_iter().collect();
        let before = self.entries.len();
        self.entries
            .retain(|src, entry| matches!(entry, Entry::Loading { .. }) || live.contains(src.as_str()));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("evicted {} unreferenced image(s)", evicted);
            self.generation += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn info_of(bitmap: &Bitmap) -> ImageInfo {
    ImageInfo {
        width: bitmap.width(),
        height: bitmap.height(),
    }
}

/// Resolves when the load for one request settles
#[must_use = "dropping an ImageLoad discards the load outcome, not the load"]
pub struct ImageLoad {
    src: String,
    state: LoadState,
}

enum LoadState {
    Done(Option<LoadResult>),
    Pending(oneshot::Receiver<LoadResult>),
}

impl ImageLoad {
    fn done(src: &str, result: LoadResult) -> Self {
        Self {
            src: src.to_owned(),
            state: LoadState::Done(Some(result)),
        }
    }

    fn pending(src: &str, rx: oneshot::Receiver<LoadResult>) -> Self {
        Self {
            src: src.to_owned(),
            state: LoadState::Pending(rx),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Non-blocking check; returns the outcome once, then None
    pub fn try_result(&mut self) -> Option<LoadResult> {
        match &mut self.state {
            LoadState::Done(result) => result.take(),
            LoadState::Pending(rx) => match rx.try_recv() {
                Ok(Some(result)) => {
                    self.state = LoadState::Done(None);
                    Some(result)
                }
                Ok(None) => None,
                Err(oneshot::Canceled) => {
                    self.state = LoadState::Done(None);
                    Some(Err(ImageLoadError::Dropped {
                        src: self.src.clone(),
                    }))
                }
            },
        }
    }
}

impl Future for ImageLoad {
    type Output = LoadResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            LoadState::Done(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(ImageLoadError::Dropped {
                    src: this.src.clone(),
                })
            })),
            LoadState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ImageLoadError::Dropped {
                    src: this.src.clone(),
                })),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use parking_lot::Mutex;

    struct CountingFetcher {
        inner: MemoryFetcher,
        calls: Mutex<usize>,
    }

    impl ImageFetcher for CountingFetcher {
        fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError> {
            *self.calls.lock() += 1;
            self.inner.fetch(src)
        }
    }

    /// Holds jobs until the test runs them
    #[derive(Clone, Default)]
    struct ManualSpawner(Arc<Mutex<Vec<Job>>>);

    impl ManualSpawner {
        fn run_all(&self) {
            let jobs: Vec<Job> = self.0.lock().drain(..).collect();
            for job in jobs {
                job();
            }
        }
    }

    impl Spawner for ManualSpawner {
        fn spawn(&self, job: Job) {
            self.0.lock().push(job);
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn counting(entries: &[(&str, Vec<u8>)]) -> Arc<CountingFetcher> {
        let inner = MemoryFetcher::new();
        for (src, bytes) in entries {
            inner.insert(*src, bytes.clone());
        }
        Arc::new(CountingFetcher {
            inner,
            calls: Mutex::new(0),
        })
    }

    #[test]
    fn concurrent_requests_share_one_load() {
        let fetcher = counting(&[("a.png", png(4, 2))]);
        let spawner = ManualSpawner::default();
        let mut cache = ImageCache::new(fetcher.clone(), Box::new(spawner.clone()), DEFAULT_LOAD_TIMEOUT);

        let first = cache.request("a.png");
        let second = cache.request("a.png");
        cache.ensure("a.png");
        assert_eq!(cache.status("a.png"), ImageStatus::Loading);

        spawner.run_all();
        assert!(cache.poll());
        assert_eq!(*fetcher.calls.lock(), 1);

        let expected = ImageInfo { width: 4, height: 2 };
        assert_eq!(block_on(first), Ok(expected));
        assert_eq!(block_on(second), Ok(expected));
        assert!(cache.get("a.png").is_some());

        // cached now; no new fetch
        assert_eq!(block_on(cache.request("a.png")), Ok(expected));
        assert_eq!(*fetcher.calls.lock(), 1);
    }

    #[test]
    fn failures_reach_the_caller_and_retry() {
        let fetcher = counting(&[]);
        let mut cache = ImageCache::inline(fetcher.clone());
        let mut load = cache.request("missing.png");
        assert!(load.try_result().is_none());
        cache.poll();
        assert!(matches!(load.try_result(), Some(Err(ImageLoadError::Fetch { .. }))));
        assert!(matches!(cache.status("missing.png"), ImageStatus::Failed(_)));

        // ensure leaves failures alone, request retries them
        cache.ensure("missing.png");
        assert_eq!(*fetcher.calls.lock(), 1);
        let _ = cache.request("missing.png");
        assert_eq!(*fetcher.calls.lock(), 2);
    }

    #[test]
    fn slow_loads_time_out_and_late_results_are_dropped() {
        let fetcher = counting(&[("slow.png", png(2, 2))]);
        let spawner = ManualSpawner::default();
        let mut cache =
            ImageCache::new(fetcher, Box::new(spawner.clone()), Duration::from_millis(50));

        let load = cache.request("slow.png");
        assert!(!cache.poll());
        assert!(cache.poll_at(Instant::now() + Duration::from_millis(60)));
        assert!(matches!(block_on(load), Err(ImageLoadError::Timeout { .. })));

        spawner.run_all();
        assert!(!cache.poll());
        assert!(matches!(cache.status("slow.png"), ImageStatus::Failed(_)));
        assert!(cache.get("slow.png").is_none());
    }

    #[test]
    fn retain_evicts_unreferenced_entries() {
        let fetcher = counting(&[("a.png", png(1, 1)), ("b.png", png(1, 1))]);
        let mut cache = ImageCache::inline(fetcher);
        cache.ensure("a.png");
        cache.ensure("b.png");
        cache.poll();
        assert_eq!(cache.retain_sources(["a.png"]), 1);
        assert!(cache.get("a.png").is_some());
        assert_eq!(cache.status("b.png"), ImageStatus::Absent);
    }
}
