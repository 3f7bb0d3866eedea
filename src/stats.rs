//! Column statistics used by feature engineering.

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation (denominator N) given a
/// pre-computed mean. Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Median of the present (non-`None`, non-NaN) values, or `None` if there are none.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
///
/// A single sample is `start`; zero samples is an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_population_stddev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_eq!(m, 5.0);
        assert_eq!(stddev(&values, m), 2.0);
    }

    #[test]
    fn test_stddev_constant_is_zero() {
        let values = [3.5; 4];
        assert_eq!(stddev(&values, mean(&values)), 0.0);
    }

    #[test]
    fn test_median_skips_missing() {
        assert_eq!(median(&[Some(1.0), None, Some(3.0), Some(2.0)]), Some(2.0));
        assert_eq!(median(&[Some(1.0), Some(4.0), None]), Some(2.5));
        assert_eq!(median(&[None, None]), None);
    }

    #[test]
    fn test_linspace_endpoints() {
        assert!(linspace(0.0, 8.0, 0).is_empty());
        assert_eq!(linspace(0.0, 8.0, 1), vec![0.0]);
        assert_eq!(linspace(0.0, 8.0, 3), vec![0.0, 4.0, 8.0]);
        let xs = linspace(0.0, 3.0, 7);
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[6], 3.0);
    }
}
