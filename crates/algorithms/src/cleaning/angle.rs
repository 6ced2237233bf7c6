//! Turning-angle filter along an ordered path

use shoreline_core::points::AveragedPoint;

/// Angle at `b` from direction `b→a` to direction `b→c`, in degrees within
/// `[0, 360)`.
///
/// A straight run gives 180. Turning clockwise while walking `a → b → c`
/// gives the interior angle, turning counter-clockwise gives 360 minus it.
pub fn turning_angle(a: &AveragedPoint, b: &AveragedPoint, c: &AveragedPoint) -> f64 {
    let to_c = (c.y - b.y).atan2(c.x - b.x);
    let to_a = (a.y - b.y).atan2(a.x - b.x);
    let angle = (to_c - to_a).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Keep the interior path points whose turning angle is at least
/// `tolerance` degrees.
///
/// Angles are measured against the original neighbours, not the survivors.
/// The first and last points are always kept; `None` disables filtering.
pub fn filter_by_angle(path: &[AveragedPoint], tolerance: Option<f64>) -> Vec<AveragedPoint> {
    let Some(tol) = tolerance else {
        return path.to_vec();
    };
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut kept = Vec::with_capacity(path.len());
    kept.push(path[0]);
    kept.extend(
        path.windows(3)
            .filter(|w| turning_angle(&w[0], &w[1], &w[2]) >= tol)
            .map(|w| w[1]),
    );
    kept.push(path[path.len() - 1]);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> AveragedPoint {
        AveragedPoint::new(x, y)
    }

    #[test]
    fn test_straight_line_is_180() {
        assert_relative_eq!(turning_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)), 180.0);
        assert_relative_eq!(
            turning_angle(&p(0.0, 0.0), &p(1.0, 1.0), &p(2.0, 2.0)),
            180.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_turn_direction() {
        // clockwise right-angle turn
        assert_relative_eq!(turning_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, -1.0)), 90.0, epsilon = 1e-9);
        // counter-clockwise right-angle turn
        assert_relative_eq!(turning_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_points_survive_default_tolerance() {
        let line: Vec<AveragedPoint> = (0..6).map(|i| p(i as f64 * 3.0, i as f64 * 1.5)).collect();
        assert_eq!(filter_by_angle(&line, Some(150.0)), line);
    }

    #[test]
    fn test_right_angle_is_removed() {
        let path = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, -1.0), p(1.0, -2.0)];
        let kept = filter_by_angle(&path, Some(150.0));
        assert_eq!(kept, vec![p(0.0, 0.0), p(1.0, -1.0), p(1.0, -2.0)]);
    }

    #[test]
    fn test_endpoints_always_kept() {
        let zigzag = vec![p(0.0, 0.0), p(1.0, 5.0), p(2.0, 0.0)];
        assert_eq!(filter_by_angle(&zigzag, Some(359.0)), vec![p(0.0, 0.0), p(2.0, 0.0)]);
        assert_eq!(filter_by_angle(&zigzag[..2], Some(359.0)), zigzag[..2].to_vec());
    }

    #[test]
    fn test_disabled_filter() {
        let zigzag = vec![p(0.0, 0.0), p(1.0, 5.0), p(2.0, 0.0)];
        assert_eq!(filter_by_angle(&zigzag, None), zigzag);
    }
}
