use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, warn};

use crate::cache::RotationCache;
use crate::events::RotationEvents;
use crate::models::WallpaperItem;

/// Receiver of detail-screen updates.
///
/// Calls are made one at a time while the orchestrator holds the view lock,
/// so an implementation must not call back into its orchestrator from
/// inside a callback.
pub trait DetailView: Send + 'static {
    fn render_wallpaper(&mut self, item: WallpaperItem);
    fn show_error(&mut self, message: String);
    fn show_next_button(&mut self, show: bool);
}

type ViewSlot<V> = Arc<Mutex<Option<V>>>;

/// Drives the "show current / show next" flow of the detail screen against
/// a shared [`RotationCache`].
///
/// Every request runs as its own tokio task and reports back through the
/// attached [`DetailView`]. Failures are reported once and never retried.
/// Dropping the orchestrator aborts whatever is still in flight.
///
/// Requests are independent: on a multi-thread runtime two requests issued
/// back to back may report in either order. Callers that need an order
/// call [`settle`](Self::settle) between them.
pub struct DetailOrchestrator<V: DetailView> {
    cache: Arc<RotationCache>,
    events: RotationEvents,
    view: ViewSlot<V>,
    /// Bumped by every `detach`; requests from an older epoch stand down.
    epoch: Arc<AtomicU64>,
    tasks: Mutex<JoinSet<()>>,
    // kept apart from `tasks` since `settle` takes the set while it waits
    aborts: Mutex<Vec<AbortHandle>>,
}

impl<V: DetailView> DetailOrchestrator<V> {
    pub fn new(cache: Arc<RotationCache>, events: RotationEvents, view: V) -> Self {
        Self {
            cache,
            events,
            view: Arc::new(Mutex::new(Some(view))),
            epoch: Arc::new(AtomicU64::new(0)),
            tasks: Mutex::new(JoinSet::new()),
            aborts: Mutex::new(Vec::new()),
        }
    }

    /// Attach a view, replacing the current one if any.
    pub fn attach(&self, view: V) {
        *self.view.lock() = Some(view);
    }

    pub fn is_attached(&self) -> bool {
        self.view.lock().is_some()
    }

    /// Load the current wallpaper and whether a next one exists.
    pub fn initialize(&self) {
        if !self.is_attached() {
            debug!("initialize ignored, no view attached");
            return;
        }

        let cache = self.cache.clone();
        let ticket = self.ticket();
        self.spawn(async move {
            if !ticket.live() {
                return;
            }
            match cache.current().await {
                Ok(wp) => {
                    let item = WallpaperItem::from(&wp);
                    ticket.deliver(|v| v.render_wallpaper(item));
                }
                Err(e) => {
                    debug!("current wallpaper unavailable: {e}");
                    ticket.deliver(|v| v.show_error(e.to_string()));
                }
            }
        });

        let cache = self.cache.clone();
        let ticket = self.ticket();
        self.spawn(async move {
            if !ticket.live() {
                return;
            }
            let has_next = match cache.count().await {
                Ok(count) => count > 1,
                Err(e) => {
                    debug!("wallpaper count unavailable: {e}");
                    false
                }
            };
            ticket.deliver(|v| v.show_next_button(has_next));
        });
    }

    /// Rotate to the next wallpaper and announce the rotation.
    pub fn advance_requested(&self) {
        if !self.is_attached() {
            debug!("advance ignored, no view attached");
            return;
        }

        let cache = self.cache.clone();
        let events = self.events.clone();
        let ticket = self.ticket();
        self.spawn(async move {
            if !ticket.live() {
                debug!("advance dropped, view detached");
                return;
            }
            match cache.advance().await {
                Ok(wp) => {
                    let item = WallpaperItem::from(&wp);
                    let id = item.id.clone();
                    // announced under the view lock so nothing escapes a detach
                    let delivered = ticket.deliver(|v| {
                        v.render_wallpaper(item);
                        events.rotated();
                    });
                    if delivered {
                        debug!(id = %id, "advanced to next wallpaper");
                    }
                }
                Err(e) => {
                    warn!("advance failed: {e}");
                    ticket.deliver(|v| v.show_error(e.to_string()));
                }
            }
        });
    }

    /// Cancel in-flight requests and release the view. Nothing is delivered
    /// to the old view once this returns.
    ///
    /// A request that is not yet running never reaches the cache. One that
    /// a worker thread is already polling may finish its cache call, but
    /// its result is discarded.
    pub fn detach(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        for handle in self.aborts.lock().drain(..) {
            handle.abort();
        }
        self.tasks.lock().abort_all();
        if self.view.lock().take().is_some() {
            debug!("detail view detached");
        }
    }

    /// Wait until every request issued so far has finished.
    ///
    /// A `detach` while this is waiting still cancels the requests.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.tasks.lock());
        while pending.join_next().await.is_some() {}
    }

    fn ticket(&self) -> Ticket<V> {
        Ticket {
            view: self.view.clone(),
            epoch: self.epoch.clone(),
            issued: self.epoch.load(Ordering::SeqCst),
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        // reap finished requests
        while tasks.try_join_next().is_some() {}
        let handle = tasks.spawn(task);

        let mut aborts = self.aborts.lock();
        aborts.retain(|h| !h.is_finished());
        aborts.push(handle);
    }
}

/// What a request needs to report back: the view slot and the epoch it was
/// issued in.
struct Ticket<V> {
    view: ViewSlot<V>,
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl<V> Ticket<V> {
    fn live(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.issued
    }

    /// Run `f` against the view unless it was detached since the request was
    /// issued. Returns whether `f` ran.
    fn deliver(&self, f: impl FnOnce(&mut V)) -> bool {
        let mut slot = self.view.lock();
        // `detach` bumps the epoch before it takes the lock
        if !self.live() {
            return false;
        }
        match slot.as_mut() {
            Some(view) => {
                f(view);
                true
            }
            None => false,
        }
    }
}
