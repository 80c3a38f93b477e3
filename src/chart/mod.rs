//! Sensor chart rendering
//!
//! Draws one rolling line chart per sensor channel:
//! - horizontal baseline with a reserved margin for time labels
//! - min/max autoscaled polyline through the channel's history
//! - a wall-clock time label every `tick_stride` samples
//! - channel title and current value labels
//!
//! Any `embedded-graphics` draw target with `Rgb888` colour works as a panel;
//! [`Canvas`] is the in-memory one used by the dashboard.

mod canvas;
mod config;
mod frame;

pub use canvas::Canvas;
pub use config::{ChartConfig, LabelClock};
pub use frame::{
    format_time_label, ChartFrame, PlotPoint, Scale, TickLabel, AXIS_COLOR, AXIS_MARGIN,
    BACKGROUND_COLOR, SERIES_COLOR, TITLE_COLOR, TOP_MARGIN,
};

use crate::history::{Channel, HistoryStore};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Renders channel history onto chart panels.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Projects the current history of `channel` onto a panel of `size`
    pub fn frame(&self, channel: Channel, store: &HistoryStore, size: Size) -> ChartFrame {
        let samples = store.snapshot(channel);
        ChartFrame::compute(channel, &samples, store.max_history(), size, &self.config)
    }

    /// Redraws the chart for `channel`.
    ///
    /// A missing panel is skipped without error.
    pub fn render<D>(
        &self,
        channel: Channel,
        store: &HistoryStore,
        target: Option<&mut D>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let Some(target) = target else {
            tracing::trace!(channel = %channel, "No panel bound, skipping render");
            return Ok(());
        };

        let frame = self.frame(channel, store, target.bounding_box().size);
        frame.draw(target)
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(index: usize) -> Channel {
        Channel::new(index).unwrap()
    }

    fn renderer() -> ChartRenderer {
        ChartRenderer::new(ChartConfig {
            label_clock: LabelClock::Utc,
            ..ChartConfig::default()
        })
    }

    #[test]
    fn test_render_missing_panel_is_skipped() {
        let store = HistoryStore::default();
        let result = renderer().render::<Canvas>(ch(0), &store, None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_render_draws_baseline() {
        let store = HistoryStore::default();
        let mut canvas = Canvas::new(200, 100);
        renderer().render(ch(0), &store, Some(&mut canvas)).unwrap();

        let baseline = (100.0 - AXIS_MARGIN) as u32;
        // Away from the tick marks and labels
        assert_eq!(canvas.pixel(150, baseline), Some(AXIS_COLOR));
        assert_eq!(canvas.pixel(190, baseline), Some(AXIS_COLOR));
    }

    #[test]
    fn test_render_draws_series() {
        let mut store = HistoryStore::new(10).unwrap();
        for i in 0..10 {
            store.record(ch(1), i as f64, 1_700_000_000_000 + i * 1000);
        }

        let mut canvas = Canvas::new(200, 100);
        renderer().render(ch(1), &store, Some(&mut canvas)).unwrap();

        assert!(canvas.count(SERIES_COLOR) > 0);
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let mut store = HistoryStore::new(10).unwrap();
        store.record(ch(0), 1.0, 0);
        store.record(ch(0), 50.0, 1000);

        let mut canvas = Canvas::new(200, 100);
        let renderer = renderer();
        renderer.render(ch(0), &store, Some(&mut canvas)).unwrap();
        let first = canvas.count(SERIES_COLOR);

        renderer.render(ch(0), &store, Some(&mut canvas)).unwrap();
        assert_eq!(canvas.count(SERIES_COLOR), first);
    }

    #[test]
    fn test_frame_uses_store_capacity() {
        let mut store = HistoryStore::new(50).unwrap();
        store.record(ch(0), 1.0, 0);
        store.record(ch(0), 2.0, 1000);

        let frame = renderer().frame(ch(0), &store, Size::new(100, 100));
        assert_eq!(frame.points[1].x, 2.0);
    }
}
