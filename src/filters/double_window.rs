//! Double-window density filter (DWF).
//!
//! Keeps two bounded windows of recently-seen events, one for events
//! classified as signal and one for events classified as noise, and decides
//! each new event by counting how many nearby events (L1 distance) live in
//! either window.

use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::event::Event;
use crate::filter::Denoiser;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleWindowConfig {
    pub buffer_size: usize,
    pub search_radius: i64,
    pub int_threshold: usize,
}

impl Default for DoubleWindowConfig {
    fn default() -> Self {
        Self {
            buffer_size: 36,
            search_radius: 9,
            int_threshold: 1,
        }
    }
}

pub struct DoubleWindowFilter {
    config: DoubleWindowConfig,
    real: VecDeque<Event>,
    noise: VecDeque<Event>,
}

impl DoubleWindowFilter {
    pub fn new(config: DoubleWindowConfig) -> Result<Self, ConfigError> {
        if config.buffer_size == 0 {
            return Err(ConfigError::NonPositiveParam {
                name: "buffer_size",
                value: 0.0,
            });
        }
        let mut filter = Self {
            config,
            real: VecDeque::new(),
            noise: VecDeque::new(),
        };
        filter.initialize();
        Ok(filter)
    }

    fn count_nearby(&self, event: Event) -> usize {
        let mut count = 0;
        for candidate in self.real.iter().chain(self.noise.iter()) {
            if event.l1_distance(candidate) <= self.config.search_radius {
                count += 1;
                if count >= self.config.int_threshold {
                    return count;
                }
            }
        }
        count
    }
}

impl Denoiser for DoubleWindowFilter {
    fn initialize(&mut self) {
        self.real.clear();
        self.noise.clear();
    }

    fn evaluate(&mut self, event: Event) -> bool {
        let is_signal = self.count_nearby(event) >= self.config.int_threshold;
        let window = if is_signal { &mut self.real } else { &mut self.noise };
        if window.len() == self.config.buffer_size {
            window.pop_front();
        }
        window.push_back(event);
        is_signal
    }
}
