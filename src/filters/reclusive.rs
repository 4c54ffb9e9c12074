//! Reclusive event denoisor (RED).
//!
//! Keeps one last-seen timestamp per pixel, per polarity, and retains an
//! event as soon as any neighbor within an L-infinity radius fired within
//! `tau` microseconds — short-circuiting the neighborhood scan on the first
//! match.

use crate::error::ConfigError;
use crate::event::{Event, Geometry, Polarity};
use crate::filter::Denoiser;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReclusiveConfig {
    pub tau: i64,
    pub radius: i64,
}

pub struct ReclusiveEventDenoisor {
    geometry: Geometry,
    config: ReclusiveConfig,
    on: Vec<Option<i64>>,
    off: Vec<Option<i64>>,
}

impl ReclusiveEventDenoisor {
    pub fn new(geometry: Geometry, config: ReclusiveConfig) -> Result<Self, ConfigError> {
        if config.tau <= 0 {
            return Err(ConfigError::NonPositiveParam { name: "tau", value: config.tau as f64 });
        }
        let area = geometry.area();
        let mut filter = Self {
            geometry,
            config,
            on: vec![None; area],
            off: vec![None; area],
        };
        filter.initialize();
        Ok(filter)
    }

    fn surface(&self, polarity: Polarity) -> &[Option<i64>] {
        match polarity {
            Polarity::On => &self.on,
            Polarity::Off => &self.off,
        }
    }

    fn surface_mut(&mut self, polarity: Polarity) -> &mut [Option<i64>] {
        match polarity {
            Polarity::On => &mut self.on,
            Polarity::Off => &mut self.off,
        }
    }
}

impl Denoiser for ReclusiveEventDenoisor {
    fn initialize(&mut self) {
        self.on.iter_mut().for_each(|slot| *slot = None);
        self.off.iter_mut().for_each(|slot| *slot = None);
    }

    fn evaluate(&mut self, event: Event) -> bool {
        let n = self.config.radius;
        let surface = self.surface(event.polarity);
        let mut is_signal = false;
        'scan: for dy in -n..=n {
            for dx in -n..=n {
                let nx = event.x as i32 + dx as i32;
                let ny = event.y as i32 + dy as i32;
                if nx < 0 || ny < 0 {
                    continue;
                }
                let (nx, ny) = (nx as u16, ny as u16);
                if !self.geometry.contains(nx, ny) {
                    continue;
                }
                if let Some(last) = surface[self.geometry.index(nx, ny)] {
                    if event.t - last <= self.config.tau {
                        is_signal = true;
                        break 'scan;
                    }
                }
            }
        }

        if self.geometry.contains(event.x, event.y) {
            let idx = self.geometry.index(event.x, event.y);
            self.surface_mut(event.polarity)[idx] = Some(event.t);
        }
        is_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, Polarity::On, t)
    }

    fn config(tau: i64, radius: i64) -> ReclusiveConfig {
        ReclusiveConfig { tau, radius }
    }

    #[test]
    fn first_event_on_a_pixel_is_always_dropped() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = ReclusiveEventDenoisor::new(geometry, config(1_000, 1)).unwrap();
        assert!(!f.evaluate(ev(5, 5, 0)));
    }

    #[test]
    fn neighbor_within_tau_triggers_retention() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = ReclusiveEventDenoisor::new(geometry, config(1_000, 1)).unwrap();
        assert!(!f.evaluate(ev(5, 5, 0)));
        assert!(f.evaluate(ev(6, 6, 500)));
    }

    #[test]
    fn neighbor_outside_tau_does_not_trigger_retention() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = ReclusiveEventDenoisor::new(geometry, config(1_000, 1)).unwrap();
        assert!(!f.evaluate(ev(5, 5, 0)));
        assert!(!f.evaluate(ev(6, 6, 2_000)));
    }

    #[test]
    fn retention_is_monotone_in_n() {
        // A neighbor two pixels away only counts once the radius widens
        // enough to include it.
        let geometry = Geometry::new(16, 16).unwrap();
        let mut narrow = ReclusiveEventDenoisor::new(geometry, config(1_000, 1)).unwrap();
        assert!(!narrow.evaluate(ev(5, 5, 0)));
        assert!(!narrow.evaluate(ev(7, 5, 500)));

        let mut wide = ReclusiveEventDenoisor::new(geometry, config(1_000, 2)).unwrap();
        assert!(!wide.evaluate(ev(5, 5, 0)));
        assert!(wide.evaluate(ev(7, 5, 500)));
    }

    #[test]
    fn polarities_are_tracked_independently() {
        let geometry = Geometry::new(16, 16).unwrap();
        let mut f = ReclusiveEventDenoisor::new(geometry, config(1_000, 1)).unwrap();
        f.evaluate(Event::new(5, 5, Polarity::On, 0));
        assert!(!f.evaluate(Event::new(6, 6, Polarity::Off, 500)));
    }

    #[test]
    fn rejects_non_positive_tau() {
        let geometry = Geometry::new(16, 16).unwrap();
        assert!(ReclusiveEventDenoisor::new(geometry, config(0, 1)).is_err());
    }
}
