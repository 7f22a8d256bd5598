//! Device action schema: the closed set of verbs each integration accepts.
//!
//! Both integrations share the same shape: a verb, an optional scalar value
//! and, for BRISE timers only, a number of minutes. What differs is the verb
//! set, captured by one enum per integration implementing [`DeviceAction`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What kind of argument an action usually carries.
///
/// Shapes only steer normalisation; a value of another kind is still
/// forwarded to the remote endpoint, which has the final say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// No argument expected.
    None,
    /// A numeric value (e.g. a temperature in degrees).
    Number,
    /// A string (e.g. a mode or fan speed name).
    Text,
    /// A number of minutes in `timer_minutes`, plus an optional label.
    Timer,
}

/// Scalar argument carried by a command.
///
/// Serialised untagged so integers stay integers on the wire (`22`, not `22.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl ActionValue {
    /// Read a numeric string such as `"22"` or `" 21.5 "` as a number.
    #[must_use]
    pub fn parse_number(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Some(Self::Integer(value));
        }
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Self::Decimal)
    }
}

impl From<i64> for ActionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ActionValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ActionValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for ActionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ActionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A verb in an integration's action vocabulary.
pub trait DeviceAction:
    Copy + Eq + fmt::Debug + fmt::Display + Serialize + Send + Sync + 'static
{
    /// Every verb of the vocabulary.
    const ALL: &'static [Self];

    /// Verbs every integration understands.
    const TURN_ON: Self;
    const TURN_OFF: Self;
    const SET_TEMPERATURE: Self;
    const SET_MODE: Self;

    /// Wire name, e.g. `"setTemperature"`.
    fn as_str(self) -> &'static str;

    /// Argument the verb expects.
    fn value_shape(self) -> ValueShape;

    /// Look a verb up by its wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownAction`] if `name` is not part of
    /// this vocabulary.
    fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownAction(name.to_string()))
    }

    /// Bring `value` into the form the remote expects for this verb.
    ///
    /// Numeric strings become numbers for [`ValueShape::Number`] verbs.
    /// Anything else, including a missing value, passes through unchanged.
    #[must_use]
    fn normalize_value(self, value: Option<ActionValue>) -> Option<ActionValue> {
        match (self.value_shape(), value) {
            (ValueShape::Number, Some(ActionValue::Text(text))) => {
                Some(ActionValue::parse_number(&text).unwrap_or(ActionValue::Text(text)))
            }
            (_, value) => value,
        }
    }
}

macro_rules! define_actions {
    (
        $(#[doc = $doc:expr])*
        $name:ident { $($variant:ident => ($wire:literal, $shape:ident)),+ $(,)? }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl DeviceAction for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const TURN_ON: Self = Self::TurnOn;
            const TURN_OFF: Self = Self::TurnOff;
            const SET_TEMPERATURE: Self = Self::SetTemperature;
            const SET_MODE: Self = Self::SetMode;

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            fn value_shape(self) -> ValueShape {
                match self {
                    $(Self::$variant => ValueShape::$shape,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_actions!(
    /// Verbs understood by the BRISE HVAC gateway.
    BriseAction {
        TurnOn => ("turnOn", None),
        TurnOff => ("turnOff", None),
        SetTemperature => ("setTemperature", Number),
        SetMode => ("setMode", Text),
        SetTimer => ("setTimer", Timer),
        CancelTimer => ("cancelTimer", None),
    }
);

define_actions!(
    /// Verbs understood by the SmartThings hub.
    SmartThingsAction {
        TurnOn => ("turnOn", None),
        TurnOff => ("turnOff", None),
        SetTemperature => ("setTemperature", Number),
        SetMode => ("setMode", Text),
        SetFanSpeed => ("setFanSpeed", Text),
    }
);
