//! Typed argument accessors over a tokenized line.
//!
//! Every accessor has exactly one failure behaviour: it records a problem
//! and returns a neutral fallback. The dispatcher drains the problems after
//! the line and turns them into diagnostics with full context.

use crate::diagnostics::Severity;
use crate::model::{
    BeamOption, CabOption, Decoded, FlareType, HydroOption, NodeOption, OptionLetter,
    Shock2Option, Shock3Option, ShockOption, TriggerOption, WheelBraking, WheelPropulsion,
    WheelSide, WingSurface, decode_options,
};
use crate::node::{NodeRef, RefBuilder};
use crate::tokenizer::ArgSpan;
use std::cell::RefCell;
use winnow::combinator::opt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

/// A message raised while reading one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
}

/// View over the arguments of the current line.
pub struct Args<'a> {
    line: &'a str,
    spans: &'a [ArgSpan],
    refs: RefBuilder,
    problems: RefCell<Vec<Problem>>,
}

impl<'a> Args<'a> {
    #[must_use]
    pub fn new(line: &'a str, spans: &'a [ArgSpan], refs: RefBuilder) -> Self {
        Self {
            line,
            spans,
            refs,
            problems: RefCell::new(Vec::new()),
        }
    }

    /// The whole line, for parsers that split it themselves.
    #[must_use]
    pub fn line(&self) -> &'a str {
        self.line
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[must_use]
    pub fn refs(&self) -> RefBuilder {
        self.refs
    }

    /// Text from the start of argument `index` to the end of the line.
    #[must_use]
    pub fn rest_from(&self, index: usize) -> &'a str {
        self.spans
            .get(index)
            .map_or("", |s| &self.line[s.start..])
    }

    // ─── Problems ───────────────────────────────────────────────────────

    pub fn report(&self, severity: Severity, message: impl Into<String>) {
        self.problems.borrow_mut().push(Problem {
            severity,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.report(Severity::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.report(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.report(Severity::Error, message);
    }

    #[must_use]
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems.into_inner()
    }

    /// False (with a warning) when the line has fewer than `required` arguments.
    pub fn check_count(&self, required: usize) -> bool {
        if self.len() < required {
            self.warn(format!(
                "Not enough arguments, {required} required, got {}. Skipping line.",
                self.len()
            ));
            return false;
        }
        true
    }

    // ─── Scalars ────────────────────────────────────────────────────────

    /// Raw argument text, `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.spans.get(index).map(|s| s.slice(self.line))
    }

    fn arg(&self, index: usize) -> Option<&'a str> {
        let found = self.get(index);
        if found.is_none() {
            self.error(format!("Argument [{}] is missing", index + 1));
        }
        found
    }

    #[must_use]
    pub fn str(&self, index: usize) -> &'a str {
        self.arg(index).unwrap_or("")
    }

    #[must_use]
    pub fn string(&self, index: usize) -> String {
        self.str(index).to_string()
    }

    #[must_use]
    pub fn char(&self, index: usize) -> char {
        self.str(index).chars().next().unwrap_or('\0')
    }

    #[must_use]
    pub fn int(&self, index: usize) -> i32 {
        let Some(text) = self.arg(index) else {
            return 0;
        };
        match parse_int_prefix(text) {
            None => {
                self.error(format!("Argument [{}] is not valid integer", index + 1));
                0
            }
            Some((value, rest)) => {
                if !rest.is_empty() {
                    self.warn(format!(
                        "Integer argument [{}] has invalid trailing characters",
                        index + 1
                    ));
                }
                i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
            }
        }
    }

    /// Unsigned integer; negative input reads as 0 with a warning.
    #[must_use]
    pub fn uint(&self, index: usize) -> u32 {
        let value = self.int(index);
        u32::try_from(value).unwrap_or_else(|_| {
            self.warn(format!(
                "Argument [{}] must not be negative (value: {value}), using 0",
                index + 1
            ));
            0
        })
    }

    #[must_use]
    pub fn float(&self, index: usize) -> f32 {
        let Some(text) = self.arg(index) else {
            return 0.0;
        };
        match parse_float_prefix(text) {
            None => {
                self.error(format!(
                    "Argument [{}] (\"{text}\") is not valid float",
                    index + 1
                ));
                0.0
            }
            Some((value, rest)) => {
                if !rest.is_empty() {
                    self.warn(format!(
                        "Argument [{}] (type: float) has invalid trailing characters (\"{rest}\")",
                        index + 1
                    ));
                }
                value
            }
        }
    }

    /// `true`, `yes` and `1` (any case) are true; everything else is false.
    #[must_use]
    pub fn bool(&self, index: usize) -> bool {
        parse_bool(self.str(index))
    }

    // ─── Node references ────────────────────────────────────────────────

    #[must_use]
    pub fn node(&self, index: usize) -> NodeRef {
        self.node_from_text(self.str(index))
    }

    /// Build a reference from text that did not come from a span (split fields).
    #[must_use]
    pub fn node_from_text(&self, text: &str) -> NodeRef {
        let (node, warning) = self.refs.build(text);
        if let Some(w) = warning {
            self.warn(w);
        }
        node
    }

    /// `9999` means "no rigidity node".
    #[must_use]
    pub fn rigidity_node(&self, index: usize) -> NodeRef {
        let text = self.str(index);
        if text == "9999" {
            return NodeRef::invalid(text);
        }
        self.node_from_text(text)
    }

    /// A value that parses as `-1` means "no node".
    #[must_use]
    pub fn nullable_node(&self, index: usize) -> NodeRef {
        let text = self.str(index);
        if parse_float_prefix(text).is_some_and(|(v, _)| v == -1.0) {
            return NodeRef::invalid(text);
        }
        self.node_from_text(text)
    }

    // ─── Enumerations ───────────────────────────────────────────────────

    #[must_use]
    pub fn wheel_side(&self, index: usize) -> WheelSide {
        let c = self.char(index);
        if c == 'r' {
            return WheelSide::Right;
        }
        if c != 'l' {
            self.warn(format!(
                "Bad arg~{} 'side' (value: {c}), parsing as 'l' for backwards compatibility.",
                index + 1
            ));
        }
        WheelSide::Left
    }

    #[must_use]
    pub fn propulsion(&self, index: usize) -> WheelPropulsion {
        WheelPropulsion::from_int(self.int(index)).unwrap_or_else(|| {
            self.error(format!(
                "Bad value of param ~{} (propulsion), using 0 (no propulsion)",
                index + 1
            ));
            WheelPropulsion::None
        })
    }

    #[must_use]
    pub fn braking(&self, index: usize) -> WheelBraking {
        WheelBraking::from_int(self.int(index)).unwrap_or_else(|| {
            self.error(format!(
                "Bad value of param ~{} (braking), using 0 (no braking)",
                index + 1
            ));
            WheelBraking::None
        })
    }

    #[must_use]
    pub fn flare_type(&self, index: usize) -> FlareType {
        let c = self.char(index);
        FlareType::from_char(c).unwrap_or_else(|| {
            self.warn(format!(
                "Invalid flare type '{c}', falling back to type 'f' (front light)..."
            ));
            FlareType::Headlight
        })
    }

    #[must_use]
    pub fn wing_surface(&self, index: usize) -> WingSurface {
        let text = self.str(index);
        let Some(surface) = text.chars().next().and_then(WingSurface::from_char) else {
            self.error(format!(
                "Invalid argument ~{} 'control surface' (value: {text}), allowed are: <{}>, ignoring...",
                index + 1,
                WingSurface::LEGAL_LETTERS
            ));
            return WingSurface::None;
        };
        if text.chars().count() > 1 {
            self.warn(format!(
                "Argument ~{} 'control surface' (value: {text}), should be only 1 letter.",
                index + 1
            ));
        }
        surface
    }

    /// Texture name where a leading `-` means "none".
    #[must_use]
    pub fn managed_tex(&self, index: usize) -> String {
        let text = self.str(index);
        if text.starts_with('-') {
            String::new()
        } else {
            text.to_string()
        }
    }

    // ─── Option strings ─────────────────────────────────────────────────

    fn options<O: OptionLetter>(&self, index: usize, noops: &str, unknown: impl Fn(char) -> String) -> u32 {
        let Decoded { mask, unknown: bad } = decode_options::<O>(self.str(index), noops);
        for c in bad {
            self.warn(unknown(c));
        }
        mask
    }

    /// Node options. `n` clears `m`; `l` must be followed by a load weight.
    #[must_use]
    pub fn node_options(&self, index: usize) -> u32 {
        self.node_options_text(self.str(index))
    }

    #[must_use]
    pub fn node_options_text(&self, text: &str) -> u32 {
        let mut mask = 0;
        for c in text.chars() {
            if c == 'n' {
                mask &= !NodeOption::NoMouseGrab.bit();
            } else if let Some(o) = NodeOption::from_letter(c) {
                mask |= o.bit();
            } else {
                self.warn(format!("Ignoring invalid option: {c}"));
            }
        }
        mask
    }

    #[must_use]
    pub fn beam_options(&self, index: usize) -> u32 {
        self.options::<BeamOption>(index, "nv", |c| format!("Invalid flag: {c}"))
    }

    #[must_use]
    pub fn shock_options(&self, index: usize) -> u32 {
        let mut mask = 0;
        for c in self.str(index).chars() {
            let c = match c {
                'l' => 'L',
                'r' => 'R',
                other => other,
            };
            match ShockOption::from_letter(c) {
                Some(o) => mask |= o.bit(),
                None if c == 'n' || c == 'v' => {}
                None => self.warn(format!("Invalid option: '{c}', ignoring...")),
            }
        }
        mask
    }

    #[must_use]
    pub fn shock2_options(&self, index: usize) -> u32 {
        self.options::<Shock2Option>(index, "nv", |c| format!("Invalid option: '{c}', ignoring..."))
    }

    #[must_use]
    pub fn shock3_options(&self, index: usize) -> u32 {
        self.options::<Shock3Option>(index, "nv", |c| format!("Invalid option: '{c}', ignoring..."))
    }

    /// Hydro options; the normal-input bit is forced when nothing else is set.
    #[must_use]
    pub fn hydro_options(&self, index: usize) -> u32 {
        let mask = self.options::<HydroOption>(index, "", |c| format!("Ignoring invalid option '{c}'..."));
        if mask == 0 {
            HydroOption::NormalInput.bit()
        } else {
            mask
        }
    }

    #[must_use]
    pub fn cab_options(&self, index: usize) -> u32 {
        let mut mask = 0;
        for c in self.str(index).chars() {
            if let Some(bits) = CabOption::shorthand(c) {
                mask |= bits;
            } else if let Some(o) = CabOption::from_letter(c) {
                mask |= o.bit();
            } else if c != 'n' {
                self.warn(format!("'submesh/cab' Ignoring invalid option '{c}'..."));
            }
        }
        mask
    }

    #[must_use]
    pub fn trigger_options(&self, index: usize) -> u32 {
        self.options::<TriggerOption>(index, "n", |c| format!("Invalid trigger option: {c}"))
    }
}

// ─── Number prefixes ─────────────────────────────────────────────────────

fn digits<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn digits1<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn sign(input: &mut &str) -> ModalResult<Option<char>> {
    opt(one_of(['+', '-'])).parse_next(input)
}

fn int_prefix(input: &mut &str) -> ModalResult<i64> {
    let start = *input;
    let _ = sign(input)?;
    let _ = digits1(input)?;
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<i64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

/// Leading decimal number like `strtod`: sign, digits, fraction, exponent.
fn float_prefix(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    let _ = sign(input)?;
    let int_part = digits(input)?;
    let mut frac_len = 0;
    if input.starts_with('.') {
        *input = &input[1..];
        frac_len = digits(input)?.len();
    }
    if int_part.is_empty() && frac_len == 0 {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    let mantissa_end = *input;
    if input.starts_with(['e', 'E']) {
        *input = &input[1..];
        let _ = sign(input)?;
        if digits1(input).is_err() {
            *input = mantissa_end;
        }
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f32>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

/// Parse a leading integer, returning the value and the unparsed remainder.
#[must_use]
pub fn parse_int_prefix(text: &str) -> Option<(i64, &str)> {
    let mut input = text.trim_start();
    int_prefix(&mut input).ok().map(|v| (v, input))
}

/// Parse a leading float, returning the value and the unparsed remainder.
#[must_use]
pub fn parse_float_prefix(text: &str) -> Option<(f32, &str)> {
    let mut input = text.trim_start();
    float_prefix(&mut input).ok().map(|v| (v, input))
}

/// Lenient float for split sub-fields: 0 when unparsable.
#[must_use]
pub fn lenient_float(text: &str) -> f32 {
    parse_float_prefix(text).map_or(0.0, |(v, _)| v)
}

/// Lenient integer for split sub-fields: 0 when unparsable.
#[must_use]
pub fn lenient_int(text: &str) -> i32 {
    parse_int_prefix(text).map_or(0, |(v, _)| i32::try_from(v).unwrap_or(0))
}

#[must_use]
pub fn parse_bool(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("true") || lower.starts_with("yes") || lower.starts_with('1')
}
