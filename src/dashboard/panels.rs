//! Chart panels bound at start-up.

use crate::chart::{Canvas, ChartConfig, ChartRenderer};
use crate::history::{Channel, HistoryStore, CHANNEL_COUNT};
use std::io;
use std::path::{Path, PathBuf};

/// One optional drawing surface per sensor channel.
///
/// Channels without a panel are skipped when rendering.
#[derive(Debug, Clone)]
pub struct ChartPanels {
    panels: Vec<Option<Canvas>>,
}

impl ChartPanels {
    /// Bind a canvas for every channel listed in `config.channels`
    pub fn bind(config: &ChartConfig) -> Self {
        let panels = (0..CHANNEL_COUNT)
            .map(|i| {
                config
                    .channels
                    .contains(&(i as u8))
                    .then(|| Canvas::new(config.width, config.height))
            })
            .collect();
        Self { panels }
    }

    /// Panels with nothing bound
    pub fn unbound() -> Self {
        Self {
            panels: vec![None; CHANNEL_COUNT],
        }
    }

    pub fn get(&self, channel: Channel) -> Option<&Canvas> {
        self.panels[channel.index()].as_ref()
    }

    pub fn bound_channels(&self) -> Vec<Channel> {
        Channel::all().filter(|c| self.get(*c).is_some()).collect()
    }

    /// Redraw every bound panel from `store`
    pub fn render_all(&mut self, renderer: &ChartRenderer, store: &HistoryStore) {
        for channel in self.bound_channels() {
            let target = self.panels[channel.index()].as_mut();
            // Canvas drawing is infallible
            let _ = renderer.render(channel, store, target);
        }
    }

    /// Write every bound panel to `dir/sensor<n>.ppm`
    pub fn save_all(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for channel in self.bound_channels() {
            if let Some(canvas) = self.get(channel) {
                let path = dir.join(format!("sensor{}.ppm", channel));
                canvas.save_ppm(&path)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_only_listed_channels() {
        let config = ChartConfig {
            channels: vec![0, 3],
            ..ChartConfig::default()
        };
        let panels = ChartPanels::bind(&config);

        assert!(panels.get(Channel::new(0).unwrap()).is_some());
        assert!(panels.get(Channel::new(1).unwrap()).is_none());
        assert!(panels.get(Channel::new(3).unwrap()).is_some());
        assert_eq!(panels.bound_channels().len(), 2);
    }

    #[test]
    fn test_ignores_out_of_range_channels() {
        let config = ChartConfig {
            channels: vec![9],
            ..ChartConfig::default()
        };
        assert!(ChartPanels::bind(&config).bound_channels().is_empty());
    }

    #[test]
    fn test_save_all_writes_bound_panels() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig {
            width: 20,
            height: 10,
            channels: vec![2, 5],
            ..ChartConfig::default()
        };
        let panels = ChartPanels::bind(&config);
        let written = panels.save_all(dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("sensor2.ppm").exists());
        assert!(dir.path().join("sensor5.ppm").exists());
    }
}
