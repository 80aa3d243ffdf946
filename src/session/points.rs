//! Target setpoint generation and visiting order.

/// Generate `count` evenly spaced setpoints across `[min, max]` and
/// reorder them excursion-first.
///
/// Deterministic and pure; see [`excursion_order`] for the ordering.
pub fn generate_points(min: f64, max: f64, count: usize) -> Vec<f64> {
    excursion_order(&linspace(min, max, count))
}

/// Evenly spaced values across `[min, max]`, endpoints included.
fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count).map(|i| min + step * i as f64).collect()
        }
    }
}

/// Reorder ascending points into the excursion-first visiting order.
///
/// The middle point comes first (odd counts only), then pairs straddling
/// the midpoint from the outside in: the lowest point, the first point
/// above the middle, the next-lowest, the next above, and so on. Forcing
/// the large temperature excursions early keeps later moves short, which
/// limits monotonic drift across the run.
///
/// With `midpoint = count / 2`: emit `points[midpoint]` when `count` is
/// odd, then for each `i` below `midpoint` emit `points[i]` followed by
/// `points[i + midpoint + 1]` (odd) or `points[i + midpoint]` (even).
pub fn excursion_order(points: &[f64]) -> Vec<f64> {
    let count = points.len();
    let midpoint = count / 2;
    let odd = count % 2 != 0;

    let mut ordered = Vec::with_capacity(count);
    if odd {
        ordered.push(points[midpoint]);
    }
    for i in 0..midpoint {
        ordered.push(points[i]);
        ordered.push(points[i + midpoint + usize::from(odd)]);
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn odd_count_starts_at_the_middle() {
        assert_close(&generate_points(0.0, 100.0, 5), &[50.0, 0.0, 75.0, 25.0, 100.0]);
    }

    #[test]
    fn even_count_has_no_middle_point() {
        let expected = [0.0, 200.0 / 3.0, 100.0 / 3.0, 100.0];
        assert_close(&generate_points(0.0, 100.0, 4), &expected);
    }

    #[test]
    fn degenerate_counts() {
        assert!(generate_points(0.0, 100.0, 0).is_empty());
        assert_close(&generate_points(0.0, 100.0, 1), &[0.0]);
        assert_close(&generate_points(0.0, 100.0, 2), &[0.0, 100.0]);
        assert_close(&generate_points(0.0, 100.0, 3), &[50.0, 0.0, 100.0]);
    }

    #[test]
    fn every_input_point_is_visited_exactly_once() {
        for count in 0..12 {
            let points = generate_points(-40.0, 160.0, count);
            assert_eq!(points.len(), count);
            let mut sorted = points.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let spaced: Vec<f64> = super::linspace(-40.0, 160.0, count);
            assert_close(&sorted, &spaced);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            generate_points(10.0, 90.0, 7),
            generate_points(10.0, 90.0, 7)
        );
    }
}
