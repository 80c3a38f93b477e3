//! Chart geometry.
//!
//! A [`ChartFrame`] is the pure projection of a channel snapshot onto a panel
//! of a given size: vertical scale, polyline vertices, time-axis ticks and the
//! text labels. Drawing it is a separate step so the geometry can be inspected
//! without a display.

use super::config::{ChartConfig, LabelClock};
use crate::history::{Channel, Sample};
use chrono::{DateTime, Local};
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, Polyline, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Text};

/// Space reserved below the baseline for time labels.
pub const AXIS_MARGIN: f64 = 20.0;

/// Space reserved above the plot region.
pub const TOP_MARGIN: f64 = 10.0;

/// Horizontal inset of the title and value labels.
pub const LABEL_INSET: i32 = 8;

/// Baseline of the title and value labels.
pub const LABEL_TOP: i32 = 16;

pub const BACKGROUND_COLOR: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);
pub const AXIS_COLOR: Rgb888 = Rgb888::new(0xbb, 0xbb, 0xbb);
pub const SERIES_COLOR: Rgb888 = Rgb888::new(0xe6, 0x7e, 0x22);
pub const TITLE_COLOR: Rgb888 = Rgb888::new(0x33, 0x33, 0x33);
pub const TICK_COLOR: Rgb888 = Rgb888::new(0x77, 0x77, 0x77);

const SERIES_STROKE_WIDTH: u32 = 2;
const TICK_MARK_HEIGHT: i32 = 4;

/// Vertical value range of a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// Autoscales over `values`, widened to include the optional anchors.
    ///
    /// A flat or empty range is widened to `max = min + 1` so normalization
    /// never divides by zero.
    pub fn fit(values: impl IntoIterator<Item = f64>, floor: Option<f64>, ceiling: Option<f64>) -> Self {
        let (mut min, mut max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        for anchor in [floor, ceiling].into_iter().flatten() {
            min = min.min(anchor);
            max = max.max(anchor);
        }

        if min > max {
            min = 0.0;
            max = 0.0;
        }
        if min == max {
            max = min + 1.0;
        }
        // Past 2^53 adding 1.0 is lost to rounding
        if max <= min {
            max = min + min.abs().max(1.0) * f64::EPSILON * 2.0;
        }

        Self { min, max }
    }

    /// Position of `value` within the range, 0.0 at `min` and 1.0 at `max`.
    ///
    /// Returns 0.0 when the span is not a positive finite number.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !(span.is_finite() && span > 0.0) {
            return 0.0;
        }
        (value - self.min) / span
    }
}

/// A polyline vertex in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    fn to_point(self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Time label anchored to a sample's x position
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    /// Index of the labelled sample in the snapshot
    pub index: usize,
    pub x: f64,
    pub text: String,
}

/// Fully projected chart for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub width: u32,
    pub height: u32,
    pub baseline_y: f64,
    pub scale: Scale,
    pub points: Vec<PlotPoint>,
    pub ticks: Vec<TickLabel>,
    pub title: String,
    pub value_label: String,
}

impl ChartFrame {
    /// Projects `samples` (oldest first) onto a `size` panel.
    ///
    /// x positions are scaled against `max_history`, not the sample count, so a
    /// partially filled buffer draws a left-anchored line.
    pub fn compute(
        channel: Channel,
        samples: &[Sample],
        max_history: usize,
        size: Size,
        config: &ChartConfig,
    ) -> Self {
        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let baseline_y = height - AXIS_MARGIN;
        let plot_height = (height - AXIS_MARGIN - TOP_MARGIN).max(0.0);
        let capacity = max_history.max(1) as f64;

        let scale = Scale::fit(samples.iter().map(|s| s.value), config.floor, config.ceiling);

        let points = samples
            .iter()
            .enumerate()
            .map(|(j, sample)| PlotPoint {
                x: (j as f64 / capacity) * width,
                y: baseline_y - scale.normalize(sample.value) * plot_height,
            })
            .collect::<Vec<_>>();

        let stride = config.tick_stride.max(1);
        let ticks = samples
            .iter()
            .enumerate()
            .step_by(stride)
            .map(|(j, sample)| TickLabel {
                index: j,
                x: points[j].x,
                text: format_time_label(sample.timestamp, config.label_clock),
            })
            .collect();

        let latest = samples.last().map(|s| s.value).unwrap_or(0.0);

        Self {
            width: size.width,
            height: size.height,
            baseline_y,
            scale,
            points,
            ticks,
            title: format!("Sensor {}", channel),
            value_label: format!("Value: {:.2}", latest),
        }
    }

    /// Draws the frame, clearing the target first
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(BACKGROUND_COLOR)?;

        let baseline = self.baseline_y.round() as i32;
        let right = self.width as i32;

        Line::new(Point::new(0, baseline), Point::new(right, baseline))
            .into_styled(PrimitiveStyle::with_stroke(AXIS_COLOR, 1))
            .draw(target)?;

        if self.points.len() > 1 {
            let vertices: Vec<Point> = self.points.iter().map(|p| p.to_point()).collect();
            Polyline::new(&vertices)
                .into_styled(PrimitiveStyle::with_stroke(SERIES_COLOR, SERIES_STROKE_WIDTH))
                .draw(target)?;
        }

        let tick_style = MonoTextStyle::new(&FONT_6X10, TICK_COLOR);
        for tick in &self.ticks {
            let x = tick.x.round() as i32;
            Line::new(Point::new(x, baseline), Point::new(x, baseline + TICK_MARK_HEIGHT))
                .into_styled(PrimitiveStyle::with_stroke(AXIS_COLOR, 1))
                .draw(target)?;
            Text::with_alignment(
                &tick.text,
                Point::new(x, baseline + TICK_MARK_HEIGHT + 10),
                tick_style,
                Alignment::Left,
            )
            .draw(target)?;
        }

        Text::new(
            &self.title,
            Point::new(LABEL_INSET, LABEL_TOP),
            MonoTextStyle::new(&FONT_6X10, TITLE_COLOR),
        )
        .draw(target)?;

        Text::with_alignment(
            &self.value_label,
            Point::new(right - LABEL_INSET, LABEL_TOP),
            MonoTextStyle::new(&FONT_6X10, SERIES_COLOR),
            Alignment::Right,
        )
        .draw(target)?;

        Ok(())
    }
}

/// Formats an epoch-millisecond timestamp as `HH:MM:SS`
pub fn format_time_label(timestamp_ms: i64, clock: LabelClock) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return "--:--:--".to_string();
    };

    match clock {
        LabelClock::Utc => utc.format("%H:%M:%S").to_string(),
        LabelClock::Local => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
    }
}
