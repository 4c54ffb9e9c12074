//! Event-flow filter (EFF).
//!
//! Fits a local plane `t(x, y) = a*x + b*y + c` through recent nearby
//! events via a column-pivoted QR least-squares solve and derives an
//! apparent flow magnitude from the fitted gradient. Events whose estimated
//! flow is at or below a threshold are treated as signal.

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};

use crate::error::ConfigError;
use crate::event::Event;
use crate::filter::Denoiser;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventFlowConfig {
    pub buffer_size: usize,
    pub search_radius: i64,
    pub float_threshold: f64,
    pub duration: i64,
}

impl Default for EventFlowConfig {
    fn default() -> Self {
        Self {
            buffer_size: 100,
            search_radius: 1,
            float_threshold: 20.0,
            duration: 2_000,
        }
    }
}

pub struct EventFlowFilter {
    config: EventFlowConfig,
    window: VecDeque<Event>,
}

impl EventFlowFilter {
    pub fn new(config: EventFlowConfig) -> Result<Self, ConfigError> {
        if config.buffer_size == 0 {
            return Err(ConfigError::NonPositiveParam { name: "buffer_size", value: 0.0 });
        }
        let mut filter = Self { config, window: VecDeque::new() };
        filter.initialize();
        Ok(filter)
    }

    /// Estimated flow magnitude at `event`, or `+infinity` when fewer than
    /// four nearby candidates are available or the fit is too close to
    /// singular (a flat or degenerate local neighborhood) to trust.
    fn fit_flow(&self, event: Event) -> f64 {
        let r = self.config.search_radius;
        let candidates: Vec<&Event> = self
            .window
            .iter()
            .filter(|q| event.linf_distance(q) <= r)
            .collect();

        if candidates.len() <= 3 {
            return f64::INFINITY;
        }

        let n = candidates.len();
        let mut a = DMatrix::<f64>::zeros(n, 3);
        let mut b = DVector::<f64>::zeros(n);
        for (i, q) in candidates.iter().enumerate() {
            a[(i, 0)] = q.x as f64;
            a[(i, 1)] = q.y as f64;
            a[(i, 2)] = 1.0;
            b[i] = (q.t - event.t) as f64 * 1e-3;
        }

        let qr = a.col_piv_qr();
        let r = qr.r();
        let r_diag = r.diagonal().abs();
        let tolerance = 1e-9 * r_diag.max();
        if r_diag.iter().any(|d| *d < tolerance) {
            return f64::INFINITY;
        }

        // `ColPivQR::solve` only handles square systems; this one is
        // overdetermined (n rows, 3 columns), so solve the least-squares
        // problem by hand: project b through Q^T, back-substitute against
        // the 3x3 upper-triangular R, then undo the column pivot.
        let mut rhs = b.clone_owned();
        qr.q_tr_mul(&mut rhs);
        let mut y = nalgebra::Vector3::<f64>::zeros();
        for i in (0..3).rev() {
            let mut sum = rhs[i];
            for j in (i + 1)..3 {
                sum -= r[(i, j)] * y[j];
            }
            y[i] = sum / r[(i, i)];
        }
        qr.p().inv_permute_rows(&mut y);
        let (a_coef, b_coef) = (y[0], y[1]);
        if a_coef != 0.0 && b_coef != 0.0 {
            ((-1.0 / a_coef).powi(2) + (-1.0 / b_coef).powi(2)).sqrt()
        } else {
            f64::INFINITY
        }
    }
}

impl Denoiser for EventFlowFilter {
    fn initialize(&mut self) {
        self.window.clear();
    }

    fn evaluate(&mut self, event: Event) -> bool {
        let flow = self.fit_flow(event);
        let is_signal = flow <= self.config.float_threshold;

        while let Some(front) = self.window.front() {
            if event.t - front.t >= self.config.duration {
                self.window.pop_front();
            } else {
                break;
            }
        }
        if self.window.len() == self.config.buffer_size {
            self.window.pop_front();
        }
        self.window.push_back(event);
        is_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Polarity;

    fn ev(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, Polarity::On, t)
    }

    #[test]
    fn fewer_than_four_candidates_is_always_infinite_flow_and_dropped() {
        let mut f = EventFlowFilter::new(EventFlowConfig::default()).unwrap();
        assert!(!f.evaluate(ev(0, 0, 0)));
        assert!(!f.evaluate(ev(0, 1, 100)));
        assert!(!f.evaluate(ev(1, 0, 200)));
    }

    #[test]
    fn a_coherent_moving_plane_yields_finite_flow_and_is_retained() {
        let config = EventFlowConfig { search_radius: 2, duration: 20_000, ..EventFlowConfig::default() };
        let mut f = EventFlowFilter::new(config).unwrap();
        // Four candidates placed exactly on the plane t = 1000*x + 1000*y,
        // surrounding the probe at (5,5) within L-infinity radius 2. The
        // fit recovers the true gradient with zero residual: a=b=1.0
        // (ms/pixel), giving flow = sqrt(2) well under the default
        // threshold of 20.
        f.evaluate(ev(3, 3, 6_000));
        f.evaluate(ev(3, 7, 10_000));
        f.evaluate(ev(7, 3, 10_000));
        f.evaluate(ev(7, 7, 14_000));
        assert!(f.evaluate(ev(5, 5, 10_000)));
    }

    #[test]
    fn degenerate_neighborhood_with_all_identical_timestamps_is_infinite() {
        let config = EventFlowConfig { search_radius: 2, ..EventFlowConfig::default() };
        let mut f = EventFlowFilter::new(config).unwrap();
        for x in [0u16, 1, 2, 4, 5, 6] {
            f.evaluate(ev(x, 0, 0));
        }
        // Four candidates land within radius 2 of (3,0), but every one of
        // them (and the probe) shares t=0, so b is the zero vector: the
        // least-squares plane is trivially flat, and the zero-coefficient
        // guard reports infinite flow rather than a bogus zero flow.
        assert!(!f.evaluate(ev(3, 0, 0)));
    }

    #[test]
    fn stale_entries_are_evicted_by_duration_before_capacity_eviction() {
        let config = EventFlowConfig { buffer_size: 100, duration: 50, ..EventFlowConfig::default() };
        let mut f = EventFlowFilter::new(config).unwrap();
        f.evaluate(ev(0, 0, 0));
        f.evaluate(ev(0, 1, 10));
        // This push happens 1000us later, past duration=50, so both prior
        // entries are evicted before the new one is appended.
        f.evaluate(ev(0, 2, 1000));
        assert_eq!(f.window.len(), 1);
    }

    #[test]
    fn rejects_zero_buffer_size() {
        let config = EventFlowConfig { buffer_size: 0, ..EventFlowConfig::default() };
        assert!(EventFlowFilter::new(config).is_err());
    }
}
