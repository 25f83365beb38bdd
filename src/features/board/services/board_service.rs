use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::BoardConfig;
use crate::core::error::{AppError, Result};
use crate::features::board::dtos::{BoardViewDto, IssueCardDto, MapViewDto};
use crate::features::board::filter::IssueFilter;
use crate::features::board::pagination::page_controls;
use crate::features::board::session::{
    BoardRegistry, BoardSession, MapSettings, SharedSession, ViewMode,
};
use crate::features::board::source::IssueSource;
use crate::features::board::store::LoadOutcome;
use crate::features::geocoding::services::LocationResolver;
use crate::shared::validation::is_valid_postal_code;

/// Drives board sessions: loads, filters, pages and map sync
pub struct BoardService {
    registry: BoardRegistry,
    source: Arc<dyn IssueSource>,
    locations: Arc<LocationResolver>,
    config: BoardConfig,
}

impl BoardService {
    pub fn new(
        source: Arc<dyn IssueSource>,
        locations: Arc<LocationResolver>,
        config: BoardConfig,
    ) -> Self {
        Self {
            registry: BoardRegistry::new(config.session_idle_timeout),
            source,
            locations,
            config,
        }
    }

    pub fn registry(&self) -> &BoardRegistry {
        &self.registry
    }

    async fn session(&self, id: Uuid) -> Result<SharedSession> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound("Board session not found".to_string()))
    }

    fn render(&self, session: &BoardSession) -> BoardViewDto {
        let store = session.store();
        let page = store.page(self.config.issues_per_page);
        BoardViewDto {
            session_id: session.id(),
            postal_code: store.postal_code().map(str::to_string),
            loading: store.pending_postal_code().map(str::to_string),
            view: session.view(),
            filter: store.filter().clone(),
            total_issues: store.all().len(),
            matching_issues: store.filtered().len(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            page_size: self.config.issues_per_page,
            issues: page
                .items
                .iter()
                .map(|issue| IssueCardDto::from(&**issue))
                .collect(),
            controls: page_controls(page.current_page, page.total_pages),
        }
    }

    fn render_map(&self, session: &BoardSession) -> MapViewDto {
        let settings = session.map_settings();
        MapViewDto {
            session_id: session.id(),
            center: session.center(),
            radius_km: settings.radius_km,
            radius_options_km: self.config.radius_options_km.clone(),
            category: settings.category,
            circle: session.layer().circle(),
            markers: session.layer().markers().to_vec(),
            report: session.last_sync(),
        }
    }

    /// Open a session, loading `postal_code` right away when given
    pub async fn create_session(
        &self,
        postal_code: Option<&str>,
        current_user: Option<&str>,
    ) -> Result<BoardViewDto> {
        if let Some(code) = postal_code {
            ensure_postal_code(code)?;
        }

        let session = self.registry.create(self.config.default_radius_km).await;
        let id = session.lock().await.id();
        tracing::info!("Board session {} opened", id);

        match postal_code {
            Some(code) => {
                let result = self.select_postal_code(id, code, current_user).await;
                if result.is_err() {
                    self.registry.remove(id).await;
                    tracing::debug!("Board session {} dropped after failed initial load", id);
                }
                result
            }
            None => Ok(self.render(&*session.lock().await)),
        }
    }

    /// Replace the session's issues with the visible issues of `postal_code`.
    ///
    /// The issue fetch and the centre lookup run concurrently without the
    /// session lock. A load overtaken by a newer selection is dropped, and a
    /// failed load leaves the previous issues in place.
    pub async fn select_postal_code(
        &self,
        id: Uuid,
        postal_code: &str,
        current_user: Option<&str>,
    ) -> Result<BoardViewDto> {
        ensure_postal_code(postal_code)?;
        let session = self.session(id).await?;

        let ticket = {
            let mut guard = session.lock().await;
            guard.touch();
            guard.store_mut().begin_load(postal_code)
        };

        let (issues, center) = tokio::join!(
            self.source.list_visible(postal_code),
            self.locations.resolve_postal_code(postal_code)
        );

        let mut guard = session.lock().await;
        match issues {
            Ok(issues) => match guard.store_mut().complete_load(&ticket, issues, current_user) {
                LoadOutcome::Applied { count } => {
                    tracing::info!(
                        "Board session {} loaded {} issues for {}",
                        id,
                        count,
                        postal_code
                    );
                    guard.set_center(center);
                    guard.refresh_map(self.locations.fallback());
                }
                LoadOutcome::Discarded => {
                    tracing::debug!(
                        "Board session {} discarded stale load for {}",
                        id,
                        postal_code
                    );
                }
            },
            Err(e) => {
                guard.store_mut().fail_load(&ticket);
                tracing::error!(
                    "Board session {} failed to load issues for {}: {}",
                    id,
                    postal_code,
                    e
                );
                return Err(e);
            }
        }

        Ok(self.render(&guard))
    }

    pub async fn update_filters(
        &self,
        id: Uuid,
        filter: IssueFilter,
        current_user: Option<&str>,
    ) -> Result<BoardViewDto> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        tracing::debug!("Board session {} filter: {:?}", id, filter);
        guard.store_mut().apply_filter(filter, current_user);
        guard.refresh_map(self.locations.fallback());
        Ok(self.render(&guard))
    }

    pub async fn change_page(&self, id: Uuid, page: usize) -> Result<BoardViewDto> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        guard.store_mut().set_page(page);
        Ok(self.render(&guard))
    }

    pub async fn view(&self, id: Uuid) -> Result<BoardViewDto> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        Ok(self.render(&guard))
    }

    /// Switch between grid and map; entering map view syncs the markers
    pub async fn set_view_mode(&self, id: Uuid, view: ViewMode) -> Result<BoardViewDto> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        guard.set_view(view);
        if view == ViewMode::Map {
            guard.sync_map(self.locations.fallback());
        }
        Ok(self.render(&guard))
    }

    pub async fn update_map_settings(&self, id: Uuid, settings: MapSettings) -> Result<MapViewDto> {
        if !(settings.radius_km.is_finite() && settings.radius_km > 0.0) {
            return Err(AppError::Validation(
                "Radius must be a positive number of kilometres".to_string(),
            ));
        }

        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        guard.set_map_settings(settings);
        guard.sync_map(self.locations.fallback());
        Ok(self.render_map(&guard))
    }

    /// Current markers, resynced first if anything changed since the last pass
    pub async fn map_view(&self, id: Uuid) -> Result<MapViewDto> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        guard.sync_map_if_stale(self.locations.fallback());
        Ok(self.render_map(&guard))
    }

    pub async fn close_session(&self, id: Uuid) -> Result<()> {
        if !self.registry.remove(id).await {
            return Err(AppError::NotFound("Board session not found".to_string()));
        }
        tracing::info!("Board session {} closed", id);
        Ok(())
    }
}

fn ensure_postal_code(postal_code: &str) -> Result<()> {
    if is_valid_postal_code(postal_code) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Postal code must be exactly 6 digits".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::board::filter::Ownership;
    use crate::features::board::geo::RawCoordinates;
    use crate::features::board::map_sync::CenterSource;
    use crate::features::issues::models::{IssueCategory, IssueRecord};
    use crate::shared::test_helpers::{issue_batch, location_resolver, MemoryIssueSource, ANAND};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn service(issues: Vec<IssueRecord>) -> BoardService {
        BoardService::new(
            Arc::new(MemoryIssueSource { issues }),
            location_resolver(),
            BoardConfig::default(),
        )
    }

    fn twelve_issues() -> Vec<IssueRecord> {
        let mut issues = issue_batch("388001", 8, IssueCategory::Lighting);
        issues.extend(issue_batch("388001", 4, IssueCategory::Roads));
        issues
    }

    #[tokio::test]
    async fn test_roads_in_388001_fit_on_one_page() {
        let board = service(twelve_issues());
        let view = board.create_session(Some("388001"), None).await.unwrap();
        assert_eq!(view.total_issues, 12);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.issues.len(), 9);

        let filter = IssueFilter {
            category: Some(IssueCategory::Roads),
            ..Default::default()
        };
        let view = board.update_filters(view.session_id, filter, None).await.unwrap();
        assert_eq!(view.matching_issues, 4);
        assert_eq!(view.issues.len(), 4);
        assert!(view.controls.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_postal_code_is_rejected_before_loading() {
        let board = service(twelve_issues());
        let view = board.create_session(None, None).await.unwrap();
        let result = board.select_postal_code(view.session_id, "38800a", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(board.view(view.session_id).await.unwrap().loading, None);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_issues() {
        let board = service(twelve_issues());
        let view = board.create_session(Some("388001"), None).await.unwrap();

        let result = board.select_postal_code(view.session_id, "999999", None).await;
        assert!(result.is_err());

        let view = board.view(view.session_id).await.unwrap();
        assert_eq!(view.postal_code.as_deref(), Some("388001"));
        assert_eq!(view.total_issues, 12);
        assert_eq!(view.loading, None);
    }

    #[tokio::test]
    async fn test_failed_initial_load_drops_session() {
        let board = service(twelve_issues());
        let result = board.create_session(Some("999999"), None).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(board.registry().session_count().await, 0);

        board.create_session(Some("388001"), None).await.unwrap();
        assert_eq!(board.registry().session_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_postal_code_centres_on_default() {
        let board = service(Vec::new());
        let view = board.create_session(Some("123456"), None).await.unwrap();
        let map = board.map_view(view.session_id).await.unwrap();
        assert_eq!(
            map.center.map(|c| c.source),
            Some(CenterSource::Fallback)
        );
        assert!(map.markers.is_empty());
    }

    #[tokio::test]
    async fn test_map_view_plots_markers_within_radius() {
        let mut issues = issue_batch("388001", 2, IssueCategory::Roads);
        for issue in &mut issues {
            issue.coordinates = RawCoordinates::from_columns(Some(ANAND.lat), Some(ANAND.lng));
        }
        let board = service(issues);
        let view = board.create_session(Some("388001"), None).await.unwrap();

        let view = board.set_view_mode(view.session_id, ViewMode::Map).await.unwrap();
        assert_eq!(view.view, ViewMode::Map);

        let map = board.map_view(view.session_id).await.unwrap();
        assert_eq!(map.markers.len(), 2);
        assert_eq!(map.report.map(|r| r.plotted), Some(2));
        assert_eq!(map.center.map(|c| c.point), Some(ANAND));
        assert_eq!(map.radius_options_km, vec![1.0, 3.0, 5.0]);
    }

    #[tokio::test]
    async fn test_map_settings_reject_non_positive_radius() {
        let board = service(Vec::new());
        let view = board.create_session(None, None).await.unwrap();
        let settings = MapSettings {
            radius_km: 0.0,
            category: None,
        };
        let result = board.update_map_settings(view.session_id, settings).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let settings = MapSettings {
            radius_km: 3.0,
            category: Some(IssueCategory::Water),
        };
        let map = board.update_map_settings(view.session_id, settings).await.unwrap();
        assert_eq!(map.radius_km, 3.0);
        assert_eq!(map.circle.map(|c| c.radius_km), Some(3.0));
    }

    #[tokio::test]
    async fn test_mine_filter_needs_current_user() {
        let mut issues = issue_batch("388001", 3, IssueCategory::Roads);
        issues[0].reporter_id = Some("citizen-1".to_string());
        let board = service(issues);
        let view = board.create_session(Some("388001"), None).await.unwrap();
        let mine = IssueFilter {
            ownership: Ownership::Mine,
            ..Default::default()
        };

        let anonymous = board
            .update_filters(view.session_id, mine.clone(), None)
            .await
            .unwrap();
        assert_eq!(anonymous.matching_issues, 0);

        let signed_in = board
            .update_filters(view.session_id, mine, Some("citizen-1"))
            .await
            .unwrap();
        assert_eq!(signed_in.matching_issues, 1);
    }

    #[tokio::test]
    async fn test_page_beyond_range_is_empty() {
        let board = service(twelve_issues());
        let view = board.create_session(Some("388001"), None).await.unwrap();
        let view = board.change_page(view.session_id, 99).await.unwrap();
        assert!(view.issues.is_empty());
        assert_eq!(view.current_page, 99);
        assert_eq!(view.total_issues, 12);
    }

    #[tokio::test]
    async fn test_closed_session_is_not_found() {
        let board = service(Vec::new());
        let view = board.create_session(None, None).await.unwrap();
        board.close_session(view.session_id).await.unwrap();
        assert!(matches!(
            board.view(view.session_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(board.close_session(view.session_id).await.is_err());
    }

    /// Holds loads for 111111 until released
    struct GatedSource {
        inner: MemoryIssueSource,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl IssueSource for GatedSource {
        async fn list_visible(&self, postal_code: &str) -> Result<Vec<IssueRecord>> {
            if postal_code == "111111" {
                self.gate.notified().await;
            }
            self.inner.list_visible(postal_code).await
        }
    }

    #[tokio::test]
    async fn test_slow_load_is_overtaken_by_newer_selection() {
        let mut issues = issue_batch("111111", 3, IssueCategory::Roads);
        issues.extend(issue_batch("388001", 2, IssueCategory::Water));
        let gate = Arc::new(Notify::new());
        let board = Arc::new(BoardService::new(
            Arc::new(GatedSource {
                inner: MemoryIssueSource { issues },
                gate: gate.clone(),
            }),
            location_resolver(),
            BoardConfig::default(),
        ));
        let id = board.create_session(None, None).await.unwrap().session_id;

        let slow = {
            let board = board.clone();
            tokio::spawn(async move { board.select_postal_code(id, "111111", None).await })
        };
        tokio::task::yield_now().await;
        while board.view(id).await.unwrap().loading.as_deref() != Some("111111") {
            tokio::task::yield_now().await;
        }

        let fresh = board.select_postal_code(id, "388001", None).await.unwrap();
        assert_eq!(fresh.postal_code.as_deref(), Some("388001"));

        gate.notify_one();
        let late = slow.await.unwrap().unwrap();
        assert_eq!(late.postal_code.as_deref(), Some("388001"));
        assert_eq!(late.total_issues, 2);
    }
}
