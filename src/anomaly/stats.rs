//! Rolling-window statistics and z-scores.

// ---

/// Mean and standard deviation of a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub mean: f64,
    pub std: f64,
}

/// Arithmetic mean and *population* standard deviation of `values`.
///
/// Divides by `n`, not `n - 1`. An empty window yields `(0, 0)`.
pub fn stats(values: &[f64]) -> Stats {
    // ---
    if values.is_empty() {
        return Stats::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Stats {
        mean,
        std: variance.sqrt(),
    }
}

/// Absolute distance of `candidate` from `mean` in units of `std`.
///
/// A window with no spread scores every candidate as 0, however far it is
/// from the window's value.
pub fn z_score(candidate: f64, mean: f64, std: f64) -> f64 {
    // ---
    if std > 0.0 {
        (candidate - mean).abs() / std
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_window() {
        // ---
        assert_eq!(stats(&[]), Stats { mean: 0.0, std: 0.0 });
    }

    #[test]
    fn test_population_std() {
        // ---
        // Population std of 2,4,4,4,5,5,7,9 is exactly 2 (sample std would be ~2.14)
        let s = stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(approx(s.mean, 5.0));
        assert!(approx(s.std, 2.0));
    }

    #[test]
    fn test_light_window_stats() {
        // ---
        let s = stats(&[100.0, 102.0, 98.0, 101.0, 99.0]);
        assert!(approx(s.mean, 100.0));
        assert!(approx(s.std, 2f64.sqrt()));
        assert!(z_score(500.0, s.mean, s.std) > 250.0);
    }

    #[test]
    fn test_uniform_window_scores_zero() {
        // ---
        let s = stats(&[50.0; 10]);
        assert_eq!(s.std, 0.0);
        assert_eq!(z_score(50.0, s.mean, s.std), 0.0);
        assert_eq!(z_score(1.0e9, s.mean, s.std), 0.0);
    }

    #[test]
    fn test_z_score_is_absolute() {
        // ---
        assert!(approx(z_score(7.0, 5.0, 2.0), 1.0));
        assert!(approx(z_score(3.0, 5.0, 2.0), 1.0));
    }
}
