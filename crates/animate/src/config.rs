//! Animation options
//!
//! `duration` drives remain and exit transitions; enter runs 1.5× longer.
//! `easing` only applies to remain transitions: enter and exit use fixed
//! `ease-in` / `ease-out` curves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnimateError, Result};

/// Jump position for `steps()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepPosition {
    JumpStart,
    JumpEnd,
    JumpNone,
    JumpBoth,
}

impl StepPosition {
    fn from_css(value: &str) -> Option<Self> {
        match value {
            "jump-start" | "start" => Some(StepPosition::JumpStart),
            "jump-end" | "end" => Some(StepPosition::JumpEnd),
            "jump-none" => Some(StepPosition::JumpNone),
            "jump-both" => Some(StepPosition::JumpBoth),
            _ => None,
        }
    }

    fn as_css(&self) -> &'static str {
        match self {
            StepPosition::JumpStart => "jump-start",
            StepPosition::JumpEnd => "jump-end",
            StepPosition::JumpNone => "jump-none",
            StepPosition::JumpBoth => "jump-both",
        }
    }
}

/// A CSS easing function expression.
///
/// Parsed from and rendered back to CSS text, so it can travel to the host
/// animation API unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// x values must be in [0, 1], y values are unrestricted
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    Steps { count: u32, position: StepPosition },
}

impl Default for Easing {
    fn default() -> Self {
        Easing::EaseInOut
    }
}

impl FromStr for Easing {
    type Err = AnimateError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        let invalid = || AnimateError::InvalidEasing(s.to_string());

        match value {
            "linear" => return Ok(Easing::Linear),
            "ease" => return Ok(Easing::Ease),
            "ease-in" => return Ok(Easing::EaseIn),
            "ease-out" => return Ok(Easing::EaseOut),
            "ease-in-out" => return Ok(Easing::EaseInOut),
            "step-start" => {
                return Ok(Easing::Steps {
                    count: 1,
                    position: StepPosition::JumpStart,
                })
            }
            "step-end" => {
                return Ok(Easing::Steps {
                    count: 1,
                    position: StepPosition::JumpEnd,
                })
            }
            _ => {}
        }

        let (name, args) = function_args(value).ok_or_else(invalid)?;
        match name {
            "cubic-bezier" => {
                let numbers: Vec<f64> = args
                    .iter()
                    .map(|a| a.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|_| invalid())?;
                let &[x1, y1, x2, y2] = numbers.as_slice() else {
                    return Err(invalid());
                };
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(invalid());
                }
                Ok(Easing::CubicBezier { x1, y1, x2, y2 })
            }
            "steps" => {
                let count: u32 = args
                    .first()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(invalid)?;
                let position = match args.get(1) {
                    Some(p) => StepPosition::from_css(p).ok_or_else(invalid)?,
                    None => StepPosition::JumpEnd,
                };
                let minimum = if position == StepPosition::JumpNone { 2 } else { 1 };
                if args.len() > 2 || count < minimum {
                    return Err(invalid());
                }
                Ok(Easing::Steps { count, position })
            }
            _ => Err(invalid()),
        }
    }
}

/// Split `name(a, b, c)` into its name and trimmed arguments
fn function_args(value: &str) -> Option<(&str, Vec<&str>)> {
    let open = value.find('(')?;
    let inner = value[open + 1..].strip_suffix(')')?;
    let args = inner.split(',').map(str::trim).collect();
    Some((value[..open].trim(), args))
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Ease => f.write_str("ease"),
            Easing::EaseIn => f.write_str("ease-in"),
            Easing::EaseOut => f.write_str("ease-out"),
            Easing::EaseInOut => f.write_str("ease-in-out"),
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Steps { count, position } => {
                write!(f, "steps({}, {})", count, position.as_css())
            }
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

/// Options accepted by [`AutoAnimate::setup`](crate::AutoAnimate::setup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimateOptions {
    /// Base duration in milliseconds
    pub duration: f64,
    /// Easing for remain transitions
    pub easing: Easing,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration: 250.0,
            easing: Easing::EaseInOut,
        }
    }
}

impl AnimateOptions {
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Parse `{"duration": 250, "easing": "ease-in-out"}`; missing keys default
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AnimateError::InvalidDuration(self.duration));
        }
        Ok(())
    }

    /// Enter transitions hold at the midpoint, so they run longer
    pub fn enter_duration(&self) -> f64 {
        self.duration * 1.5
    }
}
