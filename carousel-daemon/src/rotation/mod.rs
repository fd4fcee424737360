pub mod engine;
pub mod scheduler;
pub mod view;

use tokio::sync::oneshot;

use carousel_core::ipc::DaemonStatus;
use carousel_core::models::WallpaperItem;

pub enum DaemonCommand {
    Status {
        respond: oneshot::Sender<DaemonStatus>,
    },
    Current {
        respond: oneshot::Sender<Result<WallpaperItem, String>>,
    },
    Next,
    Like {
        id: String,
    },
    Reload,
    Evict,
    Quit,
}
