//! Reconciles a marker layer with the filtered issues, a centre and a radius.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::board::geo::LatLon;
use crate::features::issues::models::{IssueCategory, IssueRecord, IssueStatus};

/// Drawing surface owned by a board session.
///
/// Only `sync_markers` mutates a layer.
pub trait MarkerLayer {
    fn clear(&mut self);
    fn draw_radius(&mut self, circle: RadiusCircle);
    fn add_marker(&mut self, marker: MapMarker);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RadiusCircle {
    pub center: LatLon,
    pub radius_km: f64,
}

/// Marker with the fields a popup needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapMarker {
    pub id: Uuid,
    pub title: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub status_label: String,
    pub postal_code: String,
    pub position: LatLon,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CenterSource {
    /// Geocoded from the postal code or address
    Resolved,
    /// Geocoding failed; the configured default centre is used
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapCenter {
    pub point: LatLon,
    pub source: CenterSource,
}

impl MapCenter {
    pub fn resolved(point: LatLon) -> Self {
        Self {
            point,
            source: CenterSource::Resolved,
        }
    }

    pub fn fallback(point: LatLon) -> Self {
        Self {
            point,
            source: CenterSource::Fallback,
        }
    }
}

/// Outcome counts of one synchronisation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    pub plotted: usize,
    pub outside_radius: usize,
    pub category_mismatch: usize,
    pub unplottable: usize,
}

/// Fully redraw `layer`: clear, draw the radius circle, then add a marker for
/// every plottable issue within `radius_km` of `center` matching `category`.
pub fn sync_markers<L>(
    layer: &mut L,
    filtered: &[Arc<IssueRecord>],
    center: LatLon,
    radius_km: f64,
    category: Option<IssueCategory>,
) -> SyncReport
where
    L: MarkerLayer + ?Sized,
{
    layer.clear();
    layer.draw_radius(RadiusCircle { center, radius_km });

    let mut report = SyncReport::default();
    for issue in filtered {
        let Some(position) = issue.coordinates.resolve() else {
            tracing::warn!(
                "Skipping issue {} on map: unplottable coordinates {:?}",
                issue.id,
                issue.coordinates
            );
            report.unplottable += 1;
            continue;
        };

        if category.is_some_and(|c| c != issue.category) {
            report.category_mismatch += 1;
            continue;
        }

        let distance_km = center.distance_km(&position);
        if distance_km > radius_km {
            report.outside_radius += 1;
            continue;
        }

        layer.add_marker(MapMarker {
            id: issue.id,
            title: issue.title.clone(),
            category: issue.category,
            status: issue.status,
            status_label: issue.status.label().to_string(),
            postal_code: issue.postal_code.clone(),
            position,
            distance_km,
        });
        report.plotted += 1;
    }

    tracing::debug!(
        "Map synced: plotted={}, outside_radius={}, category_mismatch={}, unplottable={}",
        report.plotted,
        report.outside_radius,
        report.category_mismatch,
        report.unplottable
    );
    report
}

/// In-memory marker layer rendered to clients as JSON
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    circle: Option<RadiusCircle>,
    markers: Vec<MapMarker>,
}

impl MarkerSet {
    pub fn circle(&self) -> Option<RadiusCircle> {
        self.circle
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }
}

impl MarkerLayer for MarkerSet {
    fn clear(&mut self) {
        self.circle = None;
        self.markers.clear();
    }

    fn draw_radius(&mut self, circle: RadiusCircle) {
        self.circle = Some(circle);
    }

    fn add_marker(&mut self, marker: MapMarker) {
        self.markers.push(marker);
    }
}
