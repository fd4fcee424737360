use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use carousel_core::cache::RotationCache;
use carousel_core::catalog::{self, FileCatalog};
use carousel_core::config::Config;
use carousel_core::detail::DetailOrchestrator;
use carousel_core::events::{RotationEvent, RotationEvents};
use carousel_core::ipc::DaemonStatus;
use carousel_core::paths::CarouselPaths;

use super::scheduler::parse_interval;
use super::view::{RotationStats, StatusView, ViewState};
use super::DaemonCommand;

/// Single owner of the rotation cache and the detail orchestrator.
pub struct RotationEngine {
    config: Config,
    paths: CarouselPaths,
    cache: Arc<RotationCache>,
    orchestrator: DetailOrchestrator<StatusView>,
    view: Arc<Mutex<ViewState>>,
    rotations: broadcast::Receiver<RotationEvent>,
    stats: RotationStats,
}

impl RotationEngine {
    pub fn new(config: Config, paths: CarouselPaths) -> Self {
        let cache = Arc::new(RotationCache::new());
        let events = RotationEvents::new(config.general.event_capacity);
        let rotations = events.subscribe();
        let (status_view, view) = StatusView::new();
        let orchestrator = DetailOrchestrator::new(cache.clone(), events, status_view);
        Self {
            config,
            paths,
            cache,
            orchestrator,
            view,
            rotations,
            stats: RotationStats::default(),
        }
    }

    pub async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<DaemonCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        self.reload_catalog().await;
        self.orchestrator.initialize();

        let mut timer = rotation_timer(&self.config);

        loop {
            tokio::select! {
                _ = next_tick(&mut timer) => {
                    if self.cache.is_populated() {
                        self.orchestrator.advance_requested();
                    } else {
                        debug!("auto-rotation skipped, cache not populated");
                    }
                }
                event = self.rotations.recv() => {
                    match event {
                        Ok(event) => self.stats.record(event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "rotation listener lagged");
                            self.stats.rotations += missed;
                        }
                        // the orchestrator keeps a sender alive for our whole lifetime
                        Err(broadcast::error::RecvError::Closed) => {}
                    }
                }
                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        DaemonCommand::Status { respond } => {
                            let status = self.status().await;
                            let _ = respond.send(status);
                        }
                        DaemonCommand::Current { respond } => {
                            self.orchestrator.initialize();
                            self.orchestrator.settle().await;
                            let view = self.view.lock().clone();
                            let result = match (view.current, view.last_error) {
                                (Some(item), _) => Ok(item),
                                (None, Some(message)) => Err(message),
                                (None, None) => Err("no wallpaper shown".to_string()),
                            };
                            let _ = respond.send(result);
                        }
                        DaemonCommand::Next => {
                            self.orchestrator.advance_requested();
                            if let Some(timer) = timer.as_mut() {
                                timer.reset();
                            }
                        }
                        DaemonCommand::Like { id } => {
                            self.cache.set_liked(&id);
                            self.orchestrator.initialize();
                        }
                        DaemonCommand::Reload => {
                            self.config = Config::load_or_default(&self.paths);
                            self.reload_catalog().await;
                            self.orchestrator.initialize();
                            timer = rotation_timer(&self.config);
                            info!("config reloaded");
                        }
                        DaemonCommand::Evict => {
                            self.cache.evict_all();
                            self.orchestrator.initialize();
                            info!("rotation cache evicted");
                        }
                        DaemonCommand::Quit => {
                            info!("quit command received");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.orchestrator.detach();
    }

    async fn reload_catalog(&mut self) {
        let path = self.config.catalog_path(&self.paths);
        let file = FileCatalog::new(path);
        if let Err(e) = catalog::refresh(&self.cache, &file).await {
            warn!(path = %file.path().display(), "catalog not loaded: {e}");
        }
    }

    async fn status(&mut self) -> DaemonStatus {
        self.orchestrator.settle().await;
        self.stats.drain(&mut self.rotations);
        let view = self.view.lock().clone();
        DaemonStatus {
            running: true,
            state: self.cache.state(),
            count: self.cache.count().await.ok(),
            current: view.current,
            has_next: view.has_next,
            last_error: view.last_error,
            rotations: self.stats.rotations,
            last_rotation: self.stats.last_rotation.clone(),
        }
    }
}

fn rotation_timer(config: &Config) -> Option<Interval> {
    let period = parse_interval(&config.rotation.interval)?;
    info!(secs = period.as_secs(), "auto-rotation enabled");
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(timer)
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tokio::sync::oneshot;

    use carousel_core::models::CacheState;

    use super::*;

    struct Daemon {
        cmd_tx: mpsc::Sender<DaemonCommand>,
        _shutdown: watch::Sender<bool>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Daemon {
        async fn status(&self) -> DaemonStatus {
            let (tx, rx) = oneshot::channel();
            self.cmd_tx
                .send(DaemonCommand::Status { respond: tx })
                .await
                .unwrap();
            rx.await.unwrap()
        }

        async fn current(&self) -> Result<String, String> {
            let (tx, rx) = oneshot::channel();
            self.cmd_tx
                .send(DaemonCommand::Current { respond: tx })
                .await
                .unwrap();
            rx.await.unwrap().map(|item| item.id)
        }

        async fn send(&self, cmd: DaemonCommand) {
            self.cmd_tx.send(cmd).await.unwrap();
        }
    }

    fn start(dir: &Path, catalog: Option<&str>, interval: &str) -> Daemon {
        let paths = CarouselPaths {
            config_dir: dir.join("config"),
            data_dir: dir.join("data"),
        };
        paths.ensure_dirs().unwrap();
        if let Some(content) = catalog {
            std::fs::write(paths.default_catalog(), content).unwrap();
        }
        let mut config = Config::default();
        config.rotation.interval = interval.into();

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = RotationEngine::new(config, paths);
        let handle = tokio::spawn(engine.run(cmd_rx, shutdown_rx));
        Daemon {
            cmd_tx,
            _shutdown: shutdown_tx,
            handle,
        }
    }

    const CATALOG: &str = r#"[{"id": "w1"}, {"id": "w2"}, {"id": "w3"}]"#;

    #[tokio::test]
    async fn test_engine_rotates_and_likes() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), Some(CATALOG), "off");

        assert_eq!(daemon.current().await, Ok("w1".to_string()));
        let status = daemon.status().await;
        assert_eq!(status.state, CacheState::Populated);
        assert_eq!(status.count, Some(3));
        assert!(status.has_next);

        daemon.send(DaemonCommand::Next).await;
        assert_eq!(daemon.current().await, Ok("w2".to_string()));

        daemon.send(DaemonCommand::Like { id: "w2".into() }).await;
        let status = daemon.status().await;
        let current = status.current.unwrap();
        assert_eq!(current.id, "w2");
        assert!(current.liked);
        assert_eq!(status.rotations, 1);
        assert!(status.last_rotation.is_some());

        daemon.send(DaemonCommand::Quit).await;
        daemon.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_without_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), None, "off");

        assert_eq!(
            daemon.current().await,
            Err("there is no cached wallpaper".to_string())
        );
        daemon.send(DaemonCommand::Next).await;
        let status = daemon.status().await;
        assert_eq!(status.state, CacheState::Uninitialized);
        assert_eq!(status.count, None);
        assert!(!status.has_next);
        assert_eq!(status.rotations, 0);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_engine_evict_then_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), Some(CATALOG), "off");

        daemon.send(DaemonCommand::Evict).await;
        let status = daemon.status().await;
        assert_eq!(status.state, CacheState::Uninitialized);
        assert!(status.current.is_none());

        daemon.send(DaemonCommand::Reload).await;
        assert_eq!(daemon.current().await, Ok("w1".to_string()));
        assert_eq!(daemon.status().await.count, Some(3));
    }

    #[tokio::test]
    async fn test_engine_single_wallpaper_has_no_next() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), Some(r#"[{"id": "only"}]"#), "off");

        assert_eq!(daemon.current().await, Ok("only".to_string()));
        assert!(!daemon.status().await.has_next);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_auto_rotation() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), Some(CATALOG), "30s");
        assert_eq!(daemon.current().await, Ok("w1".to_string()));

        tokio::time::sleep(std::time::Duration::from_secs(31)).await;
        assert_eq!(daemon.current().await, Ok("w2".to_string()));
        assert_eq!(daemon.status().await.rotations, 1);
    }

    #[tokio::test]
    async fn test_engine_stops_on_shutdown() {
        let tmp = tempfile::tempdir().unwrap();
        let daemon = start(tmp.path(), Some(CATALOG), "off");
        daemon._shutdown.send(true).unwrap();
        daemon.handle.await.unwrap();
    }
}
