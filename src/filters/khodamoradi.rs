//! Khodamoradi correlation filter (KD).
//!
//! Keeps the last event seen in each column and each row (rather than a full
//! per-pixel grid) and sums support from six directional lookups: the
//! previous/self/next column and the previous/self/next row, each checked
//! against the other axis' adjacency.

use crate::error::ConfigError;
use crate::event::{Event, Geometry};
use crate::filter::Denoiser;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KhodamoradiConfig {
    pub duration: i64,
    pub int_threshold: usize,
}

impl Default for KhodamoradiConfig {
    fn default() -> Self {
        Self {
            duration: 2_000,
            int_threshold: 2,
        }
    }
}

pub struct KhodamoradiDenoiser {
    geometry: Geometry,
    config: KhodamoradiConfig,
    last_x: Vec<Event>,
    last_y: Vec<Event>,
}

impl KhodamoradiDenoiser {
    pub fn new(geometry: Geometry, config: KhodamoradiConfig) -> Result<Self, ConfigError> {
        let mut filter = Self {
            last_x: vec![Event::default(); geometry.width as usize],
            last_y: vec![Event::default(); geometry.height as usize],
            geometry,
            config,
        };
        filter.initialize();
        Ok(filter)
    }

    /// Support count for `event` per the six-source adjacency table. Each
    /// source is a last-seen slot along the event's own column or row;
    /// "self row"/"self column" sources exclude the identical pixel to
    /// avoid trivially re-matching the event's own previous occupant twice.
    fn support(&self, event: Event) -> usize {
        let x = event.x as i32;
        let y = event.y as i32;
        let w = self.geometry.width as i32;
        let h = self.geometry.height as i32;
        let x_minus = x > 0;
        let x_plus = x < w - 1;
        let y_minus = y > 0;
        let y_plus = y < h - 1;

        let correlates = |q: &Event| (event.t - q.t) <= self.config.duration && q.polarity == event.polarity;
        let mut support = 0;

        if x_minus {
            let q = self.last_x[(x - 1) as usize];
            if correlates(&q) {
                let qy = q.y as i32;
                if (y_minus && qy == y - 1) || qy == y || (y_plus && qy == y + 1) {
                    support += 1;
                }
            }
        }
        {
            let q = self.last_x[x as usize];
            if correlates(&q) {
                let qy = q.y as i32;
                if (y_minus && qy == y - 1) || (y_plus && qy == y + 1) {
                    support += 1;
                }
            }
        }
        if x_plus {
            let q = self.last_x[(x + 1) as usize];
            if correlates(&q) {
                let qy = q.y as i32;
                if (y_minus && qy == y - 1) || qy == y || (y_plus && qy == y + 1) {
                    support += 1;
                }
            }
        }
        if y_minus {
            let q = self.last_y[(y - 1) as usize];
            if correlates(&q) {
                let qx = q.x as i32;
                if (x_minus && qx == x - 1) || qx == x || (x_plus && qx == x + 1) {
                    support += 1;
                }
            }
        }
        {
            let q = self.last_y[y as usize];
            if correlates(&q) {
                let qx = q.x as i32;
                if (x_minus && qx == x - 1) || (x_plus && qx == x + 1) {
                    support += 1;
                }
            }
        }
        if y_plus {
            let q = self.last_y[(y + 1) as usize];
            if correlates(&q) {
                let qx = q.x as i32;
                if (x_minus && qx == x - 1) || qx == x || (x_plus && qx == x + 1) {
                    support += 1;
                }
            }
        }
        support
    }
}

impl Denoiser for KhodamoradiDenoiser {
    fn initialize(&mut self) {
        self.last_x.iter_mut().for_each(|slot| *slot = Event::default());
        self.last_y.iter_mut().for_each(|slot| *slot = Event::default());
    }

    fn evaluate(&mut self, event: Event) -> bool {
        let is_signal = self.support(event) >= self.config.int_threshold;
        if self.geometry.contains(event.x, event.y) {
            self.last_x[event.x as usize] = event;
            self.last_y[event.y as usize] = event;
        }
        is_signal
    }
}
