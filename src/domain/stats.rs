use crate::domain::models::SensorSample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingStats {
    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub pressure: MetricStats,
}

/// Mean/min/max per metric over the full filtered sample set. Operates on
/// every sample, never on the resampled chart grid. Empty input is an
/// explicit absence, not zeros.
pub fn compute_stats(samples: &[SensorSample]) -> Option<ReadingStats> {
    if samples.is_empty() {
        return None;
    }

    Some(ReadingStats {
        temperature: metric_stats(samples.iter().map(|sample| sample.temperature)),
        humidity: metric_stats(samples.iter().map(|sample| sample.humidity)),
        pressure: metric_stats(samples.iter().map(|sample| sample.pressure)),
    })
}

fn metric_stats(values: impl Iterator<Item = f64>) -> MetricStats {
    let mut count = 0_usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in values {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    MetricStats {
        avg: sum / count as f64,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::domain::models::SensorSample;

    use super::compute_stats;

    fn samples_with_temperatures(temperatures: &[f64]) -> Vec<SensorSample> {
        let base = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        temperatures
            .iter()
            .enumerate()
            .map(|(idx, &temperature)| SensorSample {
                taken_at: base + Duration::minutes(idx as i64),
                temperature,
                humidity: 40.0 + idx as f64,
                pressure: 1010.0,
            })
            .collect()
    }

    #[test]
    fn computes_mean_min_and_max_per_metric() {
        let samples = samples_with_temperatures(&[20.0, 22.0, 24.0]);

        let stats = compute_stats(&samples).expect("stats should exist");

        assert_eq!(stats.temperature.avg, 22.0);
        assert_eq!(stats.temperature.min, 20.0);
        assert_eq!(stats.temperature.max, 24.0);
        assert_eq!(stats.humidity.avg, 41.0);
        assert_eq!(stats.humidity.min, 40.0);
        assert_eq!(stats.humidity.max, 42.0);
        assert_eq!(stats.pressure.avg, 1010.0);
    }

    #[test]
    fn empty_input_yields_no_stats() {
        assert_eq!(compute_stats(&[]), None);
    }

    #[test]
    fn single_sample_collapses_to_itself() {
        let samples = samples_with_temperatures(&[21.5]);
        let stats = compute_stats(&samples).expect("stats should exist");

        assert_eq!(stats.temperature.avg, 21.5);
        assert_eq!(stats.temperature.min, 21.5);
        assert_eq!(stats.temperature.max, 21.5);
    }
}
