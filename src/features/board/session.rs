//! Board sessions: one issue store and marker layer per client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::board::geo::LatLon;
use crate::features::board::map_sync::{sync_markers, MapCenter, MarkerSet, SyncReport};
use crate::features::board::store::IssueStore;
use crate::features::issues::models::IssueCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapSettings {
    pub radius_km: f64,
    /// Category restriction applied to markers only
    pub category: Option<IssueCategory>,
}

pub struct BoardSession {
    id: Uuid,
    store: IssueStore,
    layer: MarkerSet,
    view: ViewMode,
    map_settings: MapSettings,
    center: Option<MapCenter>,
    last_sync: Option<SyncReport>,
    map_stale: bool,
    last_seen: Instant,
}

impl BoardSession {
    pub fn new(id: Uuid, default_radius_km: f64) -> Self {
        Self {
            id,
            store: IssueStore::new(),
            layer: MarkerSet::default(),
            view: ViewMode::Grid,
            map_settings: MapSettings {
                radius_km: default_radius_km,
                category: None,
            },
            center: None,
            last_sync: None,
            map_stale: true,
            last_seen: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &IssueStore {
        &self.store
    }

    /// Mutable store access; marks the map for resync
    pub fn store_mut(&mut self) -> &mut IssueStore {
        self.map_stale = true;
        &mut self.store
    }

    pub fn layer(&self) -> &MarkerSet {
        &self.layer
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn map_settings(&self) -> MapSettings {
        self.map_settings
    }

    pub fn set_map_settings(&mut self, settings: MapSettings) {
        self.map_settings = settings;
        self.map_stale = true;
    }

    pub fn center(&self) -> Option<MapCenter> {
        self.center
    }

    pub fn set_center(&mut self, center: MapCenter) {
        self.center = Some(center);
        self.map_stale = true;
    }

    pub fn last_sync(&self) -> Option<SyncReport> {
        self.last_sync
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    /// Redraw the marker layer from the current filtered issues
    pub fn sync_map(&mut self, fallback: LatLon) -> SyncReport {
        let center = self
            .center
            .get_or_insert_with(|| MapCenter::fallback(fallback))
            .point;
        let report = sync_markers(
            &mut self.layer,
            self.store.filtered(),
            center,
            self.map_settings.radius_km,
            self.map_settings.category,
        );
        self.last_sync = Some(report);
        self.map_stale = false;
        report
    }

    /// Resync only when something changed since the last pass
    pub fn sync_map_if_stale(&mut self, fallback: LatLon) -> Option<SyncReport> {
        self.map_stale.then(|| self.sync_map(fallback))
    }

    /// Resync right away in map view, defer otherwise
    pub fn refresh_map(&mut self, fallback: LatLon) {
        if self.view == ViewMode::Map {
            self.sync_map(fallback);
        }
    }
}

pub type SharedSession = Arc<Mutex<BoardSession>>;

/// Live sessions keyed by id, evicted after an idle timeout
pub struct BoardRegistry {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    idle_timeout: Duration,
}

impl BoardRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn create(&self, default_radius_km: f64) -> SharedSession {
        self.evict_idle().await;

        let id = Uuid::now_v7();
        let session = Arc::new(Mutex::new(BoardSession::new(id, default_radius_km)));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        tracing::debug!("Board session {} created", id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle longer than the timeout. A session whose lock is
    /// held is in use and never evicted.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.idle_for() < timeout,
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle board sessions", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::IssueStatus;
    use crate::shared::test_helpers::issue_batch;

    const FALLBACK: LatLon = LatLon::new(20.5937, 78.9629);

    #[test]
    fn test_map_sync_falls_back_to_default_center() {
        let mut session = BoardSession::new(Uuid::new_v4(), 5.0);
        let report = session.sync_map(FALLBACK);
        assert_eq!(report, SyncReport::default());
        assert_eq!(session.center(), Some(MapCenter::fallback(FALLBACK)));
        assert_eq!(
            session.layer().circle().map(|c| c.center),
            Some(FALLBACK)
        );
    }

    #[test]
    fn test_store_change_marks_map_stale() {
        let mut session = BoardSession::new(Uuid::new_v4(), 5.0);
        session.set_center(MapCenter::resolved(LatLon::new(22.3072, 73.1812)));
        session.sync_map(FALLBACK);
        assert!(session.sync_map_if_stale(FALLBACK).is_none());

        let ticket = session.store_mut().begin_load("390001");
        session.store_mut().complete_load(
            &ticket,
            issue_batch("390001", 3, IssueCategory::Roads),
            None,
        );
        let report = session.sync_map_if_stale(FALLBACK).unwrap();
        assert_eq!(report.plotted, 3);
        assert!(session
            .layer()
            .markers()
            .iter()
            .all(|m| m.status == IssueStatus::Reported));
    }

    #[test]
    fn test_refresh_map_only_in_map_view() {
        let mut session = BoardSession::new(Uuid::new_v4(), 5.0);
        session.refresh_map(FALLBACK);
        assert!(session.last_sync().is_none());

        session.set_view(ViewMode::Map);
        session.refresh_map(FALLBACK);
        assert!(session.last_sync().is_some());
    }

    #[tokio::test]
    async fn test_registry_create_get_remove() {
        let registry = BoardRegistry::new(Duration::from_secs(60));
        let session = registry.create(5.0).await;
        let id = session.lock().await.id();

        assert!(registry.get(id).await.is_some());
        assert!(registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.remove(id).await);
    }

    #[tokio::test]
    async fn test_registry_evicts_idle_sessions() {
        let registry = BoardRegistry::new(Duration::ZERO);
        registry.create(5.0).await;
        assert_eq!(registry.evict_idle().await, 1);
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_registry_keeps_locked_sessions() {
        let registry = BoardRegistry::new(Duration::ZERO);
        let session = registry.create(5.0).await;
        let _guard = session.lock().await;
        assert_eq!(registry.evict_idle().await, 0);
        assert_eq!(registry.session_count().await, 1);
    }
}
