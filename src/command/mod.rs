//! Actuator command model
//!
//! The device accepts commands in one of two shapes depending on firmware
//! revision:
//!
//! - a 3-bit `ret_cmd` word (bit0 = light, bit1 = fan, bit2 = door)
//! - discrete levels `{door: bool, fan: 0-255, light: 0-255}`
//!
//! The client keeps a cached copy of the last known state. Local toggles
//! mutate the cache before the POST and the next successful poll replaces it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mask applied to every `ret_cmd` word.
pub const COMMAND_MASK: u8 = 0b111;

/// An actuator controlled by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    Light,
    Fan,
    Door,
}

impl Actuator {
    /// Bit position in the `ret_cmd` word
    pub fn bit(self) -> u8 {
        match self {
            Actuator::Light => 0,
            Actuator::Fan => 1,
            Actuator::Door => 2,
        }
    }

    pub fn all() -> [Actuator; 3] {
        [Actuator::Door, Actuator::Fan, Actuator::Light]
    }
}

impl FromStr for Actuator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Actuator::Light),
            "fan" => Ok(Actuator::Fan),
            "door" => Ok(Actuator::Door),
            _ => Err(format!("Invalid actuator: {}", s)),
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Actuator::Light => "light",
            Actuator::Fan => "fan",
            Actuator::Door => "door",
        };
        f.write_str(name)
    }
}

/// 3-bit actuator command word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct CommandBits(u8);

impl CommandBits {
    /// Creates a command word, discarding bits above bit 2
    pub fn new(raw: u8) -> Self {
        Self(raw & COMMAND_MASK)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    /// Flips `bit` and re-applies the 3-bit mask.
    ///
    /// Bit indices past the word leave it unchanged.
    pub fn toggled(self, bit: u8) -> Self {
        let flip = 1u8.checked_shl(bit as u32).unwrap_or(0);
        Self::new(self.0 ^ flip)
    }

    pub fn is_on(self, actuator: Actuator) -> bool {
        self.0 & (1 << actuator.bit()) != 0
    }

    /// Bit pattern as shown on the dashboard, door first: `(101)`
    pub fn bit_pattern(self) -> String {
        let digit = |a: Actuator| if self.is_on(a) { '1' } else { '0' };
        format!(
            "({}{}{})",
            digit(Actuator::Door),
            digit(Actuator::Fan),
            digit(Actuator::Light)
        )
    }
}

impl From<u8> for CommandBits {
    fn from(raw: u8) -> Self {
        CommandBits::new(raw)
    }
}

impl From<CommandBits> for u8 {
    fn from(bits: CommandBits) -> Self {
        bits.0
    }
}

/// Level-based actuator state used by later firmware revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorLevels {
    pub door: bool,
    pub fan: u8,
    pub light: u8,
}

impl ActuatorLevels {
    /// Flips the door, or switches fan/light between off and full
    pub fn toggled(self, actuator: Actuator) -> Self {
        let flip = |level: u8| if level > 0 { 0 } else { u8::MAX };
        match actuator {
            Actuator::Door => Self {
                door: !self.door,
                ..self
            },
            Actuator::Fan => Self {
                fan: flip(self.fan),
                ..self
            },
            Actuator::Light => Self {
                light: flip(self.light),
                ..self
            },
        }
    }

    pub fn is_on(self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Door => self.door,
            Actuator::Fan => self.fan > 0,
            Actuator::Light => self.light > 0,
        }
    }
}

/// Last known actuator state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Bits(CommandBits),
    Levels(ActuatorLevels),
}

impl CommandState {
    pub fn toggled(self, actuator: Actuator) -> Self {
        match self {
            CommandState::Bits(bits) => CommandState::Bits(bits.toggled(actuator.bit())),
            CommandState::Levels(levels) => CommandState::Levels(levels.toggled(actuator)),
        }
    }

    pub fn is_on(self, actuator: Actuator) -> bool {
        match self {
            CommandState::Bits(bits) => bits.is_on(actuator),
            CommandState::Levels(levels) => levels.is_on(actuator),
        }
    }

    /// Form body accepted by `POST /set_cmd`
    pub fn form(self) -> SetCommandForm {
        match self {
            CommandState::Bits(bits) => SetCommandForm::Bits {
                ret_cmd: bits.raw(),
            },
            CommandState::Levels(levels) => SetCommandForm::Levels {
                door: u8::from(levels.door),
                fan: levels.fan,
                light: levels.light,
            },
        }
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandState::Bits(bits) => write!(f, "{} {}", bits.raw(), bits.bit_pattern()),
            CommandState::Levels(levels) => write!(
                f,
                "door={} fan={} light={}",
                if levels.door { "open" } else { "closed" },
                levels.fan,
                levels.light
            ),
        }
    }
}

/// URL-encoded body for `POST /set_cmd`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SetCommandForm {
    Bits { ret_cmd: u8 },
    Levels { door: u8, fan: u8, light: u8 },
}

impl SetCommandForm {
    /// Short description used in status messages
    pub fn describe(&self) -> String {
        match self {
            SetCommandForm::Bits { ret_cmd } => format!("ret_cmd to {}", ret_cmd),
            SetCommandForm::Levels { door, fan, light } => {
                format!("door={} fan={} light={}", door, fan, light)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_masks_to_three_bits() {
        assert_eq!(CommandBits::new(0xFF).raw(), 0b111);
        assert_eq!(CommandBits::new(0b1010).raw(), 0b010);
    }

    #[test]
    fn test_toggle_fan_bit_clears_word() {
        assert_eq!(CommandBits::new(0b010).toggled(1).raw(), 0);
    }

    #[test]
    fn test_toggle_light_bit_of_full_word() {
        assert_eq!(CommandBits::new(0b111).toggled(0).raw(), 0b110);
    }

    #[test]
    fn test_toggle_out_of_range_bit_is_noop() {
        assert_eq!(CommandBits::new(0b101).toggled(3).raw(), 0b101);
        assert_eq!(CommandBits::new(0b101).toggled(200).raw(), 0b101);
    }

    #[test]
    fn test_bit_pattern_door_first() {
        assert_eq!(CommandBits::new(0b100).bit_pattern(), "(100)");
        assert_eq!(CommandBits::new(0b011).bit_pattern(), "(011)");
    }

    #[test]
    fn test_actuator_from_str() {
        assert_eq!(Actuator::from_str("Door").unwrap(), Actuator::Door);
        assert_eq!(Actuator::from_str("fan").unwrap(), Actuator::Fan);
        assert!(Actuator::from_str("heater").is_err());
    }

    #[test]
    fn test_levels_toggle() {
        let levels = ActuatorLevels {
            door: false,
            fan: 128,
            light: 0,
        };
        assert!(levels.toggled(Actuator::Door).door);
        assert_eq!(levels.toggled(Actuator::Fan).fan, 0);
        assert_eq!(levels.toggled(Actuator::Light).light, 255);
    }

    #[test]
    fn test_state_toggle_dispatches() {
        let state = CommandState::Bits(CommandBits::new(0b000));
        assert_eq!(
            state.toggled(Actuator::Door),
            CommandState::Bits(CommandBits::new(0b100))
        );
        assert!(state.toggled(Actuator::Door).is_on(Actuator::Door));
    }

    #[test]
    fn test_form_shapes() {
        let bits = CommandState::Bits(CommandBits::new(6)).form();
        assert_eq!(bits, SetCommandForm::Bits { ret_cmd: 6 });

        let levels = CommandState::Levels(ActuatorLevels {
            door: true,
            fan: 10,
            light: 20,
        })
        .form();
        assert_eq!(
            levels,
            SetCommandForm::Levels {
                door: 1,
                fan: 10,
                light: 20
            }
        );
    }

    #[test]
    fn test_display() {
        let state = CommandState::Bits(CommandBits::new(5));
        assert_eq!(state.to_string(), "5 (101)");
    }
}
