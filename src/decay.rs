use thiserror::Error;

use crate::util::in_unit_interval;

/// A schedule for the exploration rate, evaluated at the agent's episode index
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecayError {
    #[error("`vi - vf` must have the same sign as `rate`")]
    Direction,
    #[error("epsilon bounds must lie in [0, 1], got vi = {vi}, vf = {vf}")]
    Bounds { vi: f32, vf: f32 },
}

fn validate(rate: f32, vi: f32, vf: f32) -> Result<(), DecayError> {
    if !in_unit_interval(vi) || !in_unit_interval(vf) {
        return Err(DecayError::Bounds { vi, vf });
    }
    ((rate >= 0.0 && vi > vf) || (rate < 0.0 && vi < vf))
        .then_some(())
        .ok_or(DecayError::Direction)
}

/// A constant value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) * e<sup>-rt</sup>
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Exponential {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Exponential {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self, DecayError> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Exponential {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) * (-rate * t).exp()
    }
}

/// v(t) = max(v<sub>i</sub> - rt, v<sub>f</sub>)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Linear {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Linear {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self, DecayError> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        (vi - rate * t).max(vf)
    }
}

/// The exploration schedules a [`Config`](crate::config::Config) can name
///
/// Lets a session pick its schedule at runtime while agents stay generic over [`Decay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule {
    Constant(Constant),
    Exponential(Exponential),
    Linear(Linear),
}

impl Schedule {
    /// Value of the schedule at episode zero
    pub fn initial(&self) -> f32 {
        self.evaluate(0.0)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Constant(Constant::new(0.3))
    }
}

impl Decay for Schedule {
    fn evaluate(&self, t: f32) -> f32 {
        match self {
            Self::Constant(d) => d.evaluate(t),
            Self::Exponential(d) => d.evaluate(t),
            Self::Linear(d) => d.evaluate(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_functional() {
        assert!(validate(1.0, 1.0, 0.0).is_ok());
        assert_eq!(validate(1.0, 0.1, 0.5), Err(DecayError::Direction));
        assert_eq!(validate(-1.0, 1.0, 0.0), Err(DecayError::Direction));
        assert!(validate(-1.0, 0.0, 1.0).is_ok());
        assert!(matches!(
            validate(1.0, 2.0, 0.5),
            Err(DecayError::Bounds { .. })
        ));
    }

    #[test]
    fn constant_decay() {
        let x = Constant::new(0.3);
        assert_eq!(x.evaluate(0.0), 0.3);
        assert_eq!(x.evaluate(1000.0), 0.3);
    }

    #[test]
    fn exponential_decay() {
        let x = Exponential::new(2.0, 1.0, 0.5).unwrap();
        assert_eq!(x.evaluate(0.0), 1.0);
        assert_eq!(x.evaluate(1.0), 0.5 + 0.5 * f32::exp(-2.0));
    }

    #[test]
    fn linear_decay() {
        let x = Linear::new(0.25, 1.0, 0.1).unwrap();
        assert_eq!(x.evaluate(0.0), 1.0);
        assert_eq!(x.evaluate(1.0), 0.75);
        assert_eq!(x.evaluate(10.0), 0.1);
    }

    #[test]
    fn schedule_dispatch() {
        let schedule = Schedule::Linear(Linear::new(0.5, 1.0, 0.0).unwrap());
        assert_eq!(schedule.initial(), 1.0);
        assert_eq!(schedule.evaluate(1.0), 0.5);
        assert_eq!(Schedule::default().evaluate(42.0), 0.3);
    }
}
