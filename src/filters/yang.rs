//! Yang density filter (YNF).
//!
//! Keeps one "last event seen" slot per pixel and decides each new event by
//! counting, over an L-infinity neighborhood, how many of those slots were
//! written recently enough and with matching polarity.

use crate::error::ConfigError;
use crate::event::{Event, Geometry, Polarity};
use crate::filter::Denoiser;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YangConfig {
    pub duration: i64,
    pub search_radius: i64,
    pub int_threshold: usize,
}

impl Default for YangConfig {
    fn default() -> Self {
        Self {
            duration: 10_000,
            search_radius: 1,
            int_threshold: 2,
        }
    }
}

pub struct YangNoiseFilter {
    geometry: Geometry,
    config: YangConfig,
    last: Vec<Option<(i64, Polarity)>>,
}

impl YangNoiseFilter {
    pub fn new(geometry: Geometry, config: YangConfig) -> Result<Self, ConfigError> {
        let area = geometry.area();
        let mut filter = Self {
            geometry,
            config,
            last: vec![None; area],
        };
        filter.initialize();
        Ok(filter)
    }

    fn density(&self, event: Event) -> usize {
        let r = self.config.search_radius;
        let mut density = 0;
        for dy in -r..=r {
            for dx in -r..=r {
                let nx = event.x as i32 + dx as i32;
                let ny = event.y as i32 + dy as i32;
                if nx < 0 || ny < 0 {
                    continue;
                }
                let (nx, ny) = (nx as u16, ny as u16);
                if !self.geometry.contains(nx, ny) {
                    continue;
                }
                if let Some((t, p)) = self.last[self.geometry.index(nx, ny)] {
                    if event.t - t <= self.config.duration && p == event.polarity {
                        density += 1;
                    }
                }
            }
        }
        density
    }
}

impl Denoiser for YangNoiseFilter {
    fn initialize(&mut self) {
        self.last.iter_mut().for_each(|slot| *slot = None);
    }

    fn evaluate(&mut self, event: Event) -> bool {
        let is_signal = self.density(event) >= self.config.int_threshold;
        if self.geometry.contains(event.x, event.y) {
            let idx = self.geometry.index(event.x, event.y);
            self.last[idx] = Some((event.t, event.polarity));
        }
        is_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(x: u16, y: u16, p: u8, t: i64) -> Event {
        Event::new(x, y, Polarity::from(p), t)
    }

    #[test]
    fn isolated_event_is_dropped() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = YangNoiseFilter::new(geometry, YangConfig::default()).unwrap();
        assert!(!f.evaluate(ev(5, 5, 1, 0)));
    }

    #[test]
    fn two_neighbors_within_duration_and_polarity_trigger_retention() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = YangNoiseFilter::new(geometry, YangConfig::default()).unwrap();
        assert!(!f.evaluate(ev(4, 5, 1, 0)));
        assert!(!f.evaluate(ev(6, 5, 1, 50)));
        // (5,5) sees density 2: the two prior same-polarity neighbors.
        assert!(f.evaluate(ev(5, 5, 1, 100)));
    }

    #[test]
    fn mismatched_polarity_does_not_count() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = YangNoiseFilter::new(geometry, YangConfig::default()).unwrap();
        assert!(!f.evaluate(ev(4, 5, 0, 0)));
        assert!(!f.evaluate(ev(6, 5, 0, 50)));
        assert!(!f.evaluate(ev(5, 5, 1, 100)));
    }

    #[test]
    fn stale_neighbor_outside_duration_does_not_count() {
        let config = YangConfig {
            duration: 40,
            ..YangConfig::default()
        };
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = YangNoiseFilter::new(geometry, config).unwrap();
        assert!(!f.evaluate(ev(4, 5, 1, 0)));
        assert!(!f.evaluate(ev(6, 5, 1, 50)));
        // Both neighbors now stale relative to t=100 (diff 100 and 50 > 40).
        assert!(!f.evaluate(ev(5, 5, 1, 100)));
    }

    #[test]
    fn initialize_clears_all_recorded_pixels() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = YangNoiseFilter::new(geometry, YangConfig::default()).unwrap();
        f.evaluate(ev(4, 5, 1, 0));
        f.evaluate(ev(6, 5, 1, 50));
        f.initialize();
        assert!(!f.evaluate(ev(5, 5, 1, 100)));
    }
}
