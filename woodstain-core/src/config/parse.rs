//! Minimal parser for `machine.toml`
//!
//! Handles only the subset the machine configuration needs, without
//! allocation:
//!
//! - `[section]` headers: `pins`, `timing`, `spray`, `vertical`,
//!   `horizontal`, `stroke`
//! - `key = value` pairs with integer (`3000`, `3_000`) or quoted string
//!   (`"!gpio14"`) values
//! - Comments (`# ...`), also after a value
//!
//! Keys that are absent keep their default. Unknown sections and keys are
//! errors so a typo never silently leaves a default in place.

use super::pins::{PinConfig, StepperPins};
use super::types::{MachineConfig, RampConfig};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Line is neither a header, a key/value pair nor a comment
    Syntax,
    /// Section header names no known section
    UnknownSection,
    /// Key is not valid in the current section
    UnknownKey,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// Pin string is malformed
    InvalidPin,
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pins,
    Timing,
    Spray,
    Vertical,
    Horizontal,
    Stroke,
}

#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Int(u32),
    Str(&'a str),
}

/// Parse TOML configuration into MachineConfig, starting from the defaults
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let err = |kind| ParseError {
            line: index + 1,
            kind,
        };
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(err(ParseErrorKind::Syntax))?;
            section = parse_section(name.trim()).ok_or(err(ParseErrorKind::UnknownSection))?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(err(ParseErrorKind::Syntax))?;
        let value = parse_value(value.trim()).ok_or(err(ParseErrorKind::InvalidValue))?;
        apply(&mut config, section, key.trim(), value).map_err(err)?;
    }

    Ok(config)
}

/// Remove a trailing comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section(name: &str) -> Option<Section> {
    Some(match name {
        "pins" => Section::Pins,
        "timing" => Section::Timing,
        "spray" => Section::Spray,
        "vertical" => Section::Vertical,
        "horizontal" => Section::Horizontal,
        "stroke" => Section::Stroke,
        _ => return None,
    })
}

fn parse_value(s: &str) -> Option<Value<'_>> {
    if let Some(rest) = s.strip_prefix('"') {
        return rest.strip_suffix('"').map(Value::Str);
    }
    parse_u32(s).map(Value::Int)
}

/// Parse a decimal integer, allowing `_` separators
fn parse_u32(s: &str) -> Option<u32> {
    if s.is_empty() || s.starts_with('_') {
        return None;
    }
    let mut n: u32 = 0;
    for c in s.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10)?;
        n = n.checked_mul(10)?.checked_add(digit)?;
    }
    Some(n)
}

fn int(value: Value<'_>) -> Result<u32, ParseErrorKind> {
    match value {
        Value::Int(n) => Ok(n),
        Value::Str(_) => Err(ParseErrorKind::InvalidValue),
    }
}

fn pin(value: Value<'_>) -> Result<PinConfig, ParseErrorKind> {
    match value {
        Value::Str(s) => PinConfig::parse(s).ok_or(ParseErrorKind::InvalidPin),
        Value::Int(_) => Err(ParseErrorKind::InvalidValue),
    }
}

fn apply(
    config: &mut MachineConfig,
    section: Section,
    key: &str,
    value: Value<'_>,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => Err(ParseErrorKind::UnknownKey),
        Section::Pins => apply_pin(config, key, pin(value)?),
        Section::Timing => {
            let t = &mut config.timing;
            let slot = match key {
                "debounce_ms" => &mut t.debounce_ms,
                "motor_switch_delay_ms" => &mut t.motor_switch_delay_ms,
                "poll_interval_ms" => &mut t.poll_interval_ms,
                "blink_period_ms" => &mut t.blink_period_ms,
                _ => return Err(ParseErrorKind::UnknownKey),
            };
            *slot = int(value)?;
            Ok(())
        }
        Section::Spray => {
            let slot = match key {
                "min" => &mut config.spray.min,
                "max" => &mut config.spray.max,
                _ => return Err(ParseErrorKind::UnknownKey),
            };
            *slot = int(value)?;
            Ok(())
        }
        Section::Vertical => apply_ramp(&mut config.vertical, key, int(value)?),
        Section::Horizontal => apply_ramp(&mut config.horizontal, key, int(value)?),
        Section::Stroke => {
            let slot = match key {
                "vertical_gap_steps" => &mut config.stroke.vertical_gap_steps,
                "horizontal_gap_steps" => &mut config.stroke.horizontal_gap_steps,
                _ => return Err(ParseErrorKind::UnknownKey),
            };
            *slot = int(value)?;
            Ok(())
        }
    }
}

fn apply_ramp(ramp: &mut RampConfig, key: &str, n: u32) -> Result<(), ParseErrorKind> {
    let slot = match key {
        "min_delay_us" => &mut ramp.min_delay_us,
        "max_delay_us" => &mut ramp.max_delay_us,
        "start_gap_us" => &mut ramp.start_gap_us,
        "ramp_step_us" => &mut ramp.ramp_step_us,
        _ => return Err(ParseErrorKind::UnknownKey),
    };
    *slot = n;
    Ok(())
}

fn apply_pin(config: &mut MachineConfig, key: &str, pin: PinConfig) -> Result<(), ParseErrorKind> {
    let pins = &mut config.pins;

    // Stepper lines are written as <stepper>_<line>
    let (stepper, line): (&mut StepperPins, &str) =
        if let Some(line) = key.strip_prefix("horizontal_stepper_") {
            (&mut pins.horizontal_stepper, line)
        } else if let Some(line) = key.strip_prefix("vertical_a_") {
            (&mut pins.vertical_stepper_a, line)
        } else if let Some(line) = key.strip_prefix("vertical_b_") {
            (&mut pins.vertical_stepper_b, line)
        } else {
            let slot = match key {
                "top_limit" => &mut pins.top_limit,
                "bottom_limit" => &mut pins.bottom_limit,
                "left_limit" => &mut pins.left_limit,
                "right_limit" => &mut pins.right_limit,
                "top_spray" => &mut pins.top_spray,
                "bottom_spray" => &mut pins.bottom_spray,
                "horizontal_select" => &mut pins.horizontal_select,
                "vertical_select" => &mut pins.vertical_select,
                "motor_power" => &mut pins.motor_power,
                "status_led" => &mut pins.status_led,
                "abort" => {
                    pins.abort = Some(pin);
                    return Ok(());
                }
                "motor_speed" => {
                    pins.motor_speed = Some(pin);
                    return Ok(());
                }
                _ => return Err(ParseErrorKind::UnknownKey),
            };
            *slot = pin;
            return Ok(());
        };

    match line {
        "step" => stepper.step = pin,
        "dir" => stepper.dir = pin,
        "enable" => stepper.enable = pin,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}
