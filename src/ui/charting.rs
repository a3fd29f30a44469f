use std::collections::BTreeMap;

use shipwrecked::stats::LevelRecord;

/// (level, wpm) points for the end-of-game chart, one per level in level
/// order. A redone level is charted by its last attempt.
pub fn speed_points(history: &[LevelRecord]) -> Vec<(f64, f64)> {
    history
        .iter()
        .map(|r| (r.ordinal, r.words_per_minute))
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(level, wpm)| (level as f64, wpm))
        .collect()
}

/// Compute X (level) and Y (WPM) bounds for the speed chart.
/// The X axis always spans at least levels 1 to 2.
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest_wpm = points.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);
    let last_level = points.iter().map(|&(level, _)| level).fold(2.0, f64::max);

    (last_level, highest_wpm.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 2.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_compute_chart_params() {
        let (x, y) = compute_chart_params(&[(1.0, 12.5), (2.0, 30.2), (3.0, 18.0)]);
        assert_eq!(x, 3.0);
        assert_eq!(y, 31.0);
    }

    #[test]
    fn test_speed_points() {
        let history = [LevelRecord {
            ordinal: 2,
            words_correct: 10,
            elapsed: Duration::from_secs(30),
            words_per_minute: 20.0,
        }];
        assert_eq!(speed_points(&history), vec![(2.0, 20.0)]);
    }

    #[test]
    fn test_speed_points_keep_last_attempt_per_level() {
        let record = |ordinal, wpm| LevelRecord {
            ordinal,
            words_correct: 5,
            elapsed: Duration::from_secs(20),
            words_per_minute: wpm,
        };
        let history = [record(1, 12.0), record(2, 8.0), record(2, 21.5), record(3, 30.0)];
        assert_eq!(
            speed_points(&history),
            vec![(1.0, 12.0), (2.0, 21.5), (3.0, 30.0)]
        );
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(46.66), "46.7");
    }
}
