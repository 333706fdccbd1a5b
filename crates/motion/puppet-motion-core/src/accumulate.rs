//! Accumulation of per-target contributions and normalized cross-fade blending.
//!
//! `value(target) = Σ v_i * w_i / Σ w_i`. A target whose total weight is zero is
//! left out of the result so the renderer keeps its previous value. Output order is
//! first-contribution order, which keeps frames deterministic.

use indexmap::IndexMap;

use crate::curve::TargetKind;
use crate::outputs::Change;

#[derive(Clone, Copy, Debug, Default)]
struct AccumEntry {
    sum: f64,
    w: f64,
}

impl AccumEntry {
    #[inline]
    fn add_value(&mut self, v: f64, w: f64) {
        self.sum += v * w;
        self.w += w;
    }

    #[inline]
    fn finalize(self) -> Option<f64> {
        if self.w > 0.0 {
            Some(self.sum / self.w)
        } else {
            None
        }
    }
}

/// Accumulates per-target contributions across tracks for one tick.
#[derive(Debug, Default)]
pub struct Accumulator {
    map: IndexMap<(TargetKind, String), AccumEntry>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one track's value for a target. Non-positive or non-finite weights,
    /// and non-finite values, contribute nothing.
    pub fn add(&mut self, kind: TargetKind, target_id: &str, value: f64, weight: f64) {
        if weight <= 0.0 || !weight.is_finite() || !value.is_finite() {
            return;
        }
        self.map
            .entry((kind, target_id.to_string()))
            .or_default()
            .add_value(value, weight);
    }

    /// Blend every target and empty the accumulator, keeping its allocation.
    pub fn drain(&mut self) -> impl Iterator<Item = Change> + '_ {
        self.map.drain(..).filter_map(|((target_kind, target_id), entry)| {
            entry.finalize().map(|value| Change {
                target_kind,
                target_id,
                value,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_average_normalizes() {
        let mut acc = Accumulator::new();
        acc.add(TargetKind::Parameter, "ParamAngleX", 10.0, 0.3);
        acc.add(TargetKind::Parameter, "ParamAngleX", 20.0, 0.7);
        let out: Vec<Change> = acc.drain().collect();
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 17.0).abs() < 1e-12);
        assert!(acc.drain().next().is_none());
    }

    #[test]
    fn low_weights_still_normalize_into_hull() {
        let mut acc = Accumulator::new();
        acc.add(TargetKind::Parameter, "P", 10.0, 0.1);
        acc.add(TargetKind::Parameter, "P", 20.0, 0.1);
        let out: Vec<Change> = acc.drain().collect();
        assert!((out[0].value - 15.0).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_targets_are_omitted() {
        let mut acc = Accumulator::new();
        acc.add(TargetKind::Parameter, "P", 10.0, 0.0);
        acc.add(TargetKind::Parameter, "Q", 5.0, f64::NAN);
        assert!(acc.drain().next().is_none());
    }

    #[test]
    fn kinds_and_ids_are_independent_and_ordered() {
        let mut acc = Accumulator::new();
        acc.add(TargetKind::PartOpacity, "Arm", 1.0, 1.0);
        acc.add(TargetKind::Parameter, "Arm", 3.0, 1.0);
        acc.add(TargetKind::Parameter, "Body", 2.0, 0.5);
        acc.add(TargetKind::PartOpacity, "Arm", 0.0, 1.0);
        let out: Vec<Change> = acc.drain().collect();
        let keys: Vec<_> = out
            .iter()
            .map(|c| (c.target_kind, c.target_id.as_str()))
            .collect();
        assert_eq!(
            keys,
            [
                (TargetKind::PartOpacity, "Arm"),
                (TargetKind::Parameter, "Arm"),
                (TargetKind::Parameter, "Body")
            ]
        );
        assert_eq!(out[0].value, 0.5);
        assert_eq!(out[2].value, 2.0);
    }
}
