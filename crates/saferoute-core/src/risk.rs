//! Per-point risk from proximity to hotspots.

use crate::models::{Coordinate, Hotspot};
use crate::spatial::distance;

/// Risk contribution of a single point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointExposure {
    /// Sum of severity penalties of every hotspot covering the point.
    pub penalty: f64,
    /// True when at least one covering hotspot is high-risk.
    pub in_high_risk_zone: bool,
}

/// Penalty for standing at `point`. Overlapping hotspots accumulate.
pub fn risk_penalty(point: &Coordinate, hotspots: &[Hotspot]) -> f64 {
    point_exposure(point, hotspots).penalty
}

pub fn point_exposure(point: &Coordinate, hotspots: &[Hotspot]) -> PointExposure {
    let mut exposure = PointExposure::default();
    for hotspot in hotspots {
        if distance(point, &hotspot.center()) > hotspot.radius_m {
            continue;
        }
        let severity = hotspot.severity();
        exposure.penalty += severity.penalty();
        exposure.in_high_risk_zone |= severity.is_high_risk();
    }
    exposure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(intensity: f64, radius_m: f64) -> Hotspot {
        Hotspot::new(0.0, 0.0, intensity, Some(radius_m))
    }

    #[test]
    fn penalty_is_zero_outside_every_radius() {
        let hotspots = vec![hotspot(500.0, 100.0), hotspot(10.0, 50.0)];
        // ~111 m east of both centers.
        let point = Coordinate::new(0.0, 0.001);
        assert_eq!(risk_penalty(&point, &hotspots), 0.0);
        assert!(!point_exposure(&point, &hotspots).in_high_risk_zone);
    }

    #[test]
    fn penalty_uses_intensity_buckets() {
        let point = Coordinate::new(0.0, 0.0);
        assert_eq!(risk_penalty(&point, &[hotspot(10.0, 10.0)]), 1.0);
        assert_eq!(risk_penalty(&point, &[hotspot(41.0, 10.0)]), 5.0);
        assert_eq!(risk_penalty(&point, &[hotspot(101.0, 10.0)]), 15.0);
        assert_eq!(risk_penalty(&point, &[hotspot(201.0, 10.0)]), 30.0);
    }

    #[test]
    fn overlapping_hotspots_accumulate() {
        let point = Coordinate::new(0.0, 0.0);
        let hotspots = vec![hotspot(250.0, 300.0), hotspot(150.0, 300.0), hotspot(5.0, 300.0)];
        let exposure = point_exposure(&point, &hotspots);
        assert_eq!(exposure.penalty, 46.0);
        assert!(exposure.in_high_risk_zone);
    }

    #[test]
    fn penalty_never_decreases_with_intensity() {
        let point = Coordinate::new(0.0, 0.0005);
        let mut previous = 0.0;
        for intensity in [0.0, 20.0, 40.0, 41.0, 90.0, 100.0, 101.0, 180.0, 200.0, 201.0, 900.0] {
            let penalty = risk_penalty(&point, &[hotspot(intensity, 200.0)]);
            assert!(
                penalty >= previous,
                "penalty dropped from {previous} to {penalty} at intensity {intensity}"
            );
            previous = penalty;
        }
    }

    #[test]
    fn boundary_point_is_inside() {
        let center = Coordinate::new(0.0, 0.0);
        let edge = Coordinate::new(0.0, 0.001);
        let radius = distance(&center, &edge);
        assert_eq!(risk_penalty(&edge, &[hotspot(10.0, radius)]), 1.0);
    }
}
