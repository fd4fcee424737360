use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use carousel_core::detail::DetailView;
use carousel_core::events::RotationEvent;
use carousel_core::models::WallpaperItem;

/// What the detail view last showed.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub current: Option<WallpaperItem>,
    pub has_next: bool,
    pub last_error: Option<String>,
}

/// Detail view for a headless daemon: records updates so status requests
/// can report them.
pub struct StatusView {
    state: Arc<Mutex<ViewState>>,
}

impl StatusView {
    pub fn new() -> (Self, Arc<Mutex<ViewState>>) {
        let state = Arc::new(Mutex::new(ViewState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl DetailView for StatusView {
    fn render_wallpaper(&mut self, item: WallpaperItem) {
        debug!(id = %item.id, liked = item.liked, "showing wallpaper");
        let mut state = self.state.lock();
        state.current = Some(item);
        state.last_error = None;
    }

    fn show_error(&mut self, message: String) {
        let mut state = self.state.lock();
        state.current = None;
        state.last_error = Some(message);
    }

    fn show_next_button(&mut self, show: bool) {
        self.state.lock().has_next = show;
    }
}

/// Counts rotation notifications.
#[derive(Debug, Default)]
pub struct RotationStats {
    pub rotations: u64,
    pub last_rotation: Option<String>,
}

impl RotationStats {
    pub fn record(&mut self, event: RotationEvent) {
        match event {
            RotationEvent::Rotated { at } => {
                self.rotations += 1;
                self.last_rotation = Some(at.to_rfc3339());
            }
        }
    }

    /// Fold in every notification already queued on `rx`.
    pub fn drain(&mut self, rx: &mut broadcast::Receiver<RotationEvent>) {
        loop {
            match rx.try_recv() {
                Ok(event) => self.record(event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "rotation listener lagged");
                    self.rotations += missed;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
