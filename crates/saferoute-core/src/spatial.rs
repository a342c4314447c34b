//! Great-circle distance helpers.

use crate::models::Coordinate;

/// Spherical Earth radius used by every distance in the engine.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of arc on the spherical Earth.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Calculate distance between two points in meters (Haversine formula).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

/// Total length of a path in meters.
pub fn path_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance(&pair[0], &pair[1]))
        .sum()
}

/// Insert linearly interpolated samples so that consecutive points are at most
/// `spacing_m` apart. Input points are kept in order.
pub fn densify(points: &[Coordinate], spacing_m: f64) -> Vec<Coordinate> {
    if points.len() < 2 || !spacing_m.is_finite() || spacing_m <= 0.0 {
        return points.to_vec();
    }

    let mut samples = Vec::with_capacity(points.len());
    samples.push(points[0]);
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let segment_m = distance(&start, &end);
        let steps = ((segment_m / spacing_m).ceil() as usize).clamp(1, 100_000);
        for step in 1..steps {
            let t = step as f64 / steps as f64;
            samples.push(Coordinate::new(
                start.lat + t * (end.lat - start.lat),
                start.lng + t * (end.lng - start.lng),
            ));
        }
        samples.push(end);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        for point in [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(37.7749, -122.4194),
            Coordinate::new(-89.9, 179.9),
        ] {
            assert_eq!(distance(&point, &point), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (Coordinate::new(12.9716, 77.5946), Coordinate::new(13.0827, 80.2707)),
            (Coordinate::new(-33.8688, 151.2093), Coordinate::new(51.5074, -0.1278)),
            (Coordinate::new(0.0, -0.01), Coordinate::new(0.0, 0.01)),
        ];
        for (a, b) in pairs {
            let ab = distance(&a, &b);
            let ba = distance(&b, &a);
            assert!((ab - ba).abs() < 1e-6, "asymmetric: {ab} vs {ba}");
        }
    }

    #[test]
    fn one_millidegree_on_equator_matches_arc_length() {
        let dist = haversine_distance(0.0, 0.0, 0.0, 0.001);
        assert!((dist - METERS_PER_DEGREE * 0.001).abs() < 1e-3, "got {dist}");
    }

    #[test]
    fn densify_bounds_sample_spacing_and_keeps_endpoints() {
        let line = [Coordinate::new(0.0, -0.01), Coordinate::new(0.0, 0.01)];
        let samples = densify(&line, 100.0);
        assert_eq!(samples.first(), line.first());
        assert_eq!(samples.last(), line.last());
        assert!(samples.len() > 20);
        for pair in samples.windows(2) {
            assert!(distance(&pair[0], &pair[1]) <= 100.0 + 1e-6);
        }
        let total = path_length(&samples);
        assert!((total - path_length(&line)).abs() < 1e-3);
    }

    #[test]
    fn densify_ignores_invalid_spacing() {
        let line = [Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.1)];
        assert_eq!(densify(&line, 0.0), line.to_vec());
        assert_eq!(densify(&line, f64::NAN), line.to_vec());
    }
}
