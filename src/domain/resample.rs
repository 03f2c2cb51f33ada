use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::SensorSample;

/// Named display windows offered by the dashboard, each paired with a
/// fixed tick step so the chart x-axis keeps uniform spacing through
/// data gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayWindow {
    TenMinutes,
    OneHour,
    SixHours,
    OneDay,
    SevenDays,
    ThirtyDays,
    OneYear,
}

impl DisplayWindow {
    pub const ALL: [DisplayWindow; 7] = [
        DisplayWindow::TenMinutes,
        DisplayWindow::OneHour,
        DisplayWindow::SixHours,
        DisplayWindow::OneDay,
        DisplayWindow::SevenDays,
        DisplayWindow::ThirtyDays,
        DisplayWindow::OneYear,
    ];

    pub fn duration_minutes(self) -> i64 {
        match self {
            DisplayWindow::TenMinutes => 10,
            DisplayWindow::OneHour => 60,
            DisplayWindow::SixHours => 360,
            DisplayWindow::OneDay => 1440,
            DisplayWindow::SevenDays => 10_080,
            DisplayWindow::ThirtyDays => 43_200,
            DisplayWindow::OneYear => 525_600,
        }
    }

    pub fn step_minutes(self) -> i64 {
        match self {
            DisplayWindow::TenMinutes => 1,
            DisplayWindow::OneHour => 5,
            DisplayWindow::SixHours => 30,
            DisplayWindow::OneDay => 60,
            DisplayWindow::SevenDays => 180,
            DisplayWindow::ThirtyDays => 720,
            DisplayWindow::OneYear => 1440,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayWindow::TenMinutes => "10m",
            DisplayWindow::OneHour => "1h",
            DisplayWindow::SixHours => "6h",
            DisplayWindow::OneDay => "24h",
            DisplayWindow::SevenDays => "7d",
            DisplayWindow::ThirtyDays => "30d",
            DisplayWindow::OneYear => "365d",
        }
    }
}

impl std::str::FromStr for DisplayWindow {
    type Err = UnknownWindow;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        DisplayWindow::ALL
            .into_iter()
            .find(|window| window.as_str() == raw)
            .ok_or_else(|| UnknownWindow(raw.to_string()))
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown display window: {0} (expected one of 10m, 1h, 6h, 24h, 7d, 30d, 365d)")]
pub struct UnknownWindow(pub String);

/// One tick on the chart grid. `sample` is `None` where no reading landed
/// on the tick's minute; consumers must render a gap there, not
/// interpolate.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub sample: Option<SensorSample>,
}

/// Maps chronologically ascending samples onto the window's fixed tick
/// grid. The window's end anchors at the last sample (or `now` when there
/// are none); samples are keyed by their timestamp truncated to the
/// minute, last write wins. Samples whose minute matches no tick are
/// dropped — this is display-oriented resampling, not a faithful
/// downsample, and must not feed aggregate statistics.
pub fn resample_for_display(
    samples: &[SensorSample],
    window: DisplayWindow,
    now: DateTime<Utc>,
) -> Vec<ChartPoint> {
    let end = samples.last().map_or(now, |sample| sample.taken_at);
    let start = end - Duration::minutes(window.duration_minutes());
    let step = Duration::minutes(window.step_minutes());

    let mut by_minute: HashMap<i64, SensorSample> = HashMap::new();
    for sample in samples {
        by_minute.insert(minute_key(sample.taken_at), *sample);
    }

    let mut points = Vec::with_capacity(
        (window.duration_minutes() / window.step_minutes() + 1) as usize,
    );
    let mut tick = start;
    while tick <= end {
        points.push(ChartPoint {
            timestamp: tick,
            sample: by_minute.get(&minute_key(tick)).copied(),
        });
        tick += step;
    }

    points
}

fn minute_key(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp().div_euclid(60)
}
