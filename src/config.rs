// SPDX: CC0-1.0

use crate::{difference::Scheme, Grid, Number};
use core::f64::consts;
use thiserror::Error;

/// Rejected configuration, detected before any engine state exists.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("domain bounds must be finite (got {min}..{max})")]
    NonFiniteBound { min: Number, max: Number },

    #[error("minimum x ({min}) must be less than maximum x ({max})")]
    InvertedDomain { min: Number, max: Number },

    #[error("number of segments must be positive")]
    NoSegments,

    #[error("differentiation order should be at least 1 ({0} given)")]
    OrderTooLow(i64),

    #[error("unsupported approximation scheme '{given}'{}", suggestion_note(.suggestion))]
    UnknownScheme {
        given: String,
        suggestion: Option<&'static str>,
    },

    #[error("invalid function expression: {0}")]
    Expression(String),
}

fn suggestion_note(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub function: String,
    pub function_name: Option<String>,
    pub min_x: Number,
    pub max_x: Number,
    pub num_segments: usize,
    pub differentiation_order: i64,
    pub scheme: Scheme,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            function: String::from("sin(x)"),
            function_name: None,
            min_x: -consts::TAU,
            max_x: consts::TAU,
            num_segments: 1024,
            differentiation_order: 1,
            scheme: Scheme::Forward,
            debug: false,
        }
    }
}

impl Config {
    /// Title used for the undifferentiated function.
    pub fn display_name(&self) -> &str {
        match self.function_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.function,
        }
    }

    /// Visible plotting grid.
    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::new(self.min_x, self.max_x, self.num_segments)
    }

    pub fn order(&self) -> Result<usize, ConfigError> {
        match usize::try_from(self.differentiation_order) {
            Ok(order) if order >= 1 => Ok(order),
            _ => Err(ConfigError::OrderTooLow(self.differentiation_order)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.order()?;
        self.grid()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.display_name(), "sin(x)");
        assert_eq!(config.order(), Ok(1));
    }

    #[test]
    fn display_name_falls_back_to_function() {
        let mut config = Config {
            function_name: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.display_name(), "sin(x)");
        config.function_name = Some(String::from("sine"));
        assert_eq!(config.display_name(), "sine");
    }

    #[test]
    fn order_below_one_is_rejected() {
        for order in [0, -3] {
            let config = Config {
                differentiation_order: order,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::OrderTooLow(order)));
        }
    }

    #[test]
    fn inverted_domain_is_rejected() {
        let config = Config {
            min_x: 1.0,
            max_x: -1.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedDomain { .. })
        ));
    }

    #[test]
    fn unknown_scheme_message_carries_suggestion() {
        let err = ConfigError::UnknownScheme {
            given: String::from("fowrard"),
            suggestion: Some("forward"),
        };
        assert_eq!(
            err.to_string(),
            "unsupported approximation scheme 'fowrard' (did you mean 'forward'?)"
        );
    }
}
