//! Heuristic carbon cost of a request, in grams of CO2.
//!
//! The estimate is not a measured quantity. Any model must return 0 for a zero
//! duration and an empty payload, and must never decrease when either input grows.

/// Estimates the cost of one request.
pub trait CostModel: Send + Sync {
    fn cost(&self, duration_ms: f64, payload_bytes: u64) -> f64;
}

impl<F> CostModel for F
where
    F: Fn(f64, u64) -> f64 + Send + Sync,
{
    fn cost(&self, duration_ms: f64, payload_bytes: u64) -> f64 {
        self(duration_ms, payload_bytes)
    }
}

/// Processing time plus data transfer, each with a fixed coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearCost {
    pub per_ms: f64,
    pub per_byte: f64,
}

impl Default for LinearCost {
    fn default() -> Self {
        // 1 microgram per millisecond, 6 nanograms per byte
        LinearCost {
            per_ms: 0.000_001,
            per_byte: 0.000_000_006,
        }
    }
}

impl CostModel for LinearCost {
    fn cost(&self, duration_ms: f64, payload_bytes: u64) -> f64 {
        let duration_ms = if duration_ms.is_finite() {
            duration_ms.max(0.0)
        } else {
            0.0
        };
        duration_ms * self.per_ms.max(0.0) + payload_bytes as f64 * self.per_byte.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<Box<dyn CostModel>> {
        vec![
            Box::new(LinearCost::default()),
            Box::new(LinearCost {
                per_ms: 0.0001,
                per_byte: 0.000_006,
            }),
            Box::new(|duration_ms: f64, bytes: u64| duration_ms * 2.0 + bytes as f64),
        ]
    }

    #[test]
    fn zero_inputs_cost_nothing() {
        for model in models() {
            assert_eq!(model.cost(0.0, 0), 0.0);
        }
    }

    #[test]
    fn monotonic_in_duration() {
        for model in models() {
            for bytes in [0, 1, 1024, 1_000_000] {
                let mut previous = model.cost(0.0, bytes);
                for duration in [0.5, 1.0, 10.0, 250.0, 30_000.0] {
                    let current = model.cost(duration, bytes);
                    assert!(previous <= current);
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn monotonic_in_payload() {
        for model in models() {
            for duration in [0.0, 1.0, 250.0] {
                let mut previous = model.cost(duration, 0);
                for bytes in [1, 512, 1024, 1_000_000, u32::MAX as u64] {
                    let current = model.cost(duration, bytes);
                    assert!(previous <= current);
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn negative_duration_is_clamped() {
        let model = LinearCost::default();
        assert_eq!(model.cost(-5.0, 0), 0.0);
        assert_eq!(model.cost(f64::NAN, 0), 0.0);
    }
}
