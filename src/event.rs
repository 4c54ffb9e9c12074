//! Core event model shared by every denoising filter.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Polarity of a change-detection event.
///
/// `Off` marks a brightness decrease, `On` a brightness increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Polarity {
    #[default]
    Off = 0,
    On = 1,
}

impl Polarity {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<u8> for Polarity {
    fn from(value: u8) -> Self {
        if value != 0 {
            Polarity::On
        } else {
            Polarity::Off
        }
    }
}

/// A single change-detection event produced by the sensor.
///
/// Equality and identity are structural over all four fields, matching the
/// wire format consumed from event producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Event {
    pub x: u16,
    pub y: u16,
    pub polarity: Polarity,
    /// Microsecond timestamp, monotonically non-decreasing within a stream.
    pub t: i64,
}

impl Event {
    pub fn new(x: u16, y: u16, polarity: Polarity, t: i64) -> Self {
        Self { x, y, polarity, t }
    }

    #[inline]
    pub(crate) fn l1_distance(&self, other: &Event) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }

    #[inline]
    pub(crate) fn linf_distance(&self, other: &Event) -> i64 {
        (self.x as i64 - other.x as i64).abs().max((self.y as i64 - other.y as i64).abs())
    }
}

/// Sensor geometry fixed at filter construction.
///
/// Coordinates outside `[0, width) x [0, height)` never appear in valid
/// input; filters silently skip events that violate this caller contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    pub fn new(width: u16, height: u16) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub(crate) fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
