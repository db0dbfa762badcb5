//! Easing curves
//!
//! Curves are named the way motion designers write them, e.g.
//! `"power3.out"`, `"back.out(1.7)"` or `"elastic.out(1, 0.5)"`, so page
//! configuration can be written as plain strings.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default overshoot for `back` curves
pub const DEFAULT_BACK_OVERSHOOT: f32 = 1.70158;

/// Which end of the curve is eased
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EaseKind {
    In,
    Out,
    InOut,
}

/// An easing function mapping progress `t` in [0, 1] to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// No easing (`"none"` / `"linear"`)
    Linear,
    /// Polynomial ease of degree `power + 1` (`"power1"` .. `"power4"`)
    Power { power: u8, kind: EaseKind },
    /// Overshooting ease-out (`"back.out(1.7)"`)
    BackOut { overshoot: f32 },
    /// Springy ease-out (`"elastic.out(1, 0.5)"`)
    ElasticOut { amplitude: f32, period: f32 },
    /// Exponential ease-out (`"expo.out"`)
    ExpoOut,
    /// Smooth-scroll curve `min(1, 1.001 - 2^(-10t))` (`"smooth"`)
    SmoothScroll,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power {
            power: 1,
            kind: EaseKind::Out,
        }
    }
}

impl Easing {
    pub const fn power(power: u8, kind: EaseKind) -> Self {
        Easing::Power { power, kind }
    }

    pub const fn power2_out() -> Self {
        Easing::power(2, EaseKind::Out)
    }

    pub const fn power3_out() -> Self {
        Easing::power(3, EaseKind::Out)
    }

    pub const fn back_out() -> Self {
        Easing::BackOut { overshoot: 1.7 }
    }

    /// Apply the curve; `t` is clamped to [0, 1]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power { power, kind } => {
                let n = i32::from(power.clamp(1, 4)) + 1;
                match kind {
                    EaseKind::In => t.powi(n),
                    EaseKind::Out => 1.0 - (1.0 - t).powi(n),
                    EaseKind::InOut => {
                        if t < 0.5 {
                            (2.0 * t).powi(n) / 2.0
                        } else {
                            1.0 - (2.0 * (1.0 - t)).powi(n) / 2.0
                        }
                    }
                }
            }
            Easing::BackOut { overshoot } => {
                let u = t - 1.0;
                1.0 + (overshoot + 1.0) * u * u * u + overshoot * u * u
            }
            Easing::ElasticOut { amplitude, period } => {
                if t >= 1.0 {
                    return 1.0;
                }
                let p1 = amplitude.max(1.0);
                let p2 = period / amplitude.min(1.0);
                let p3 = p2 / TAU * (1.0 / p1).asin();
                let p2 = TAU / p2;
                p1 * 2f32.powf(-10.0 * t) * ((t - p3) * p2).sin() + 1.0
            }
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::SmoothScroll => (1.001 - 2f32.powf(-10.0 * t)).min(1.0),
        }
    }
}

/// Error returned when an easing name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown easing `{0}`")]
pub struct ParseEasingError(pub String);

impl FromStr for Easing {
    type Err = ParseEasingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseEasingError(s.to_string());
        let trimmed = s.trim();

        // Split "name.kind(args)"
        let (head, args) = match trimmed.find('(') {
            Some(open) => {
                let close = trimmed.rfind(')').ok_or_else(err)?;
                if close < open {
                    return Err(err());
                }
                (&trimmed[..open], Some(&trimmed[open + 1..close]))
            }
            None => (trimmed, None),
        };
        let params: Vec<f32> = match args {
            Some(args) if !args.trim().is_empty() => args
                .split(',')
                .map(|p| p.trim().parse::<f32>().map_err(|_| err()))
                .collect::<Result<_, _>>()?,
            _ => Vec::new(),
        };

        let (name, kind) = match head.split_once('.') {
            Some((name, kind)) => (name, Some(kind)),
            None => (head, None),
        };
        let kind = match kind {
            None | Some("out") => EaseKind::Out,
            Some("in") => EaseKind::In,
            Some("inOut") | Some("inout") => EaseKind::InOut,
            Some(_) => return Err(err()),
        };

        match name {
            "none" | "linear" => Ok(Easing::Linear),
            "power1" | "power2" | "power3" | "power4" => {
                let power = name[5..].parse::<u8>().map_err(|_| err())?;
                Ok(Easing::Power { power, kind })
            }
            "back" if kind == EaseKind::Out => Ok(Easing::BackOut {
                overshoot: params.first().copied().unwrap_or(DEFAULT_BACK_OVERSHOOT),
            }),
            "elastic" if kind == EaseKind::Out => Ok(Easing::ElasticOut {
                amplitude: params.first().copied().unwrap_or(1.0),
                period: params.get(1).copied().unwrap_or(0.3),
            }),
            "expo" if kind == EaseKind::Out => Ok(Easing::ExpoOut),
            "smooth" => Ok(Easing::SmoothScroll),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("none"),
            Easing::Power { power, kind } => {
                let kind = match kind {
                    EaseKind::In => "in",
                    EaseKind::Out => "out",
                    EaseKind::InOut => "inOut",
                };
                write!(f, "power{power}.{kind}")
            }
            Easing::BackOut { overshoot } => write!(f, "back.out({overshoot})"),
            Easing::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({amplitude}, {period})")
            }
            Easing::ExpoOut => f.write_str("expo.out"),
            Easing::SmoothScroll => f.write_str("smooth"),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = ParseEasingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}
