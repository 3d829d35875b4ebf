//! Engine, gearbox and driver-assist sections.

use super::Parser;
use crate::args::{Args, lenient_float, lenient_int};
use crate::document::Line;
use crate::keyword::Keyword;
use crate::model::{
    AntiLockBrakes, Axle, Brakes, CruiseControl, DifferentialType, Engine, EngineType, Engoption,
    Engturbo, InterAxle, RegulatorAttrs, SlopeBrake, SpeedLimiter, TorqueSample,
    TractionControl, TransferCase,
};
use crate::node::NodeRef;
use crate::tokenizer::split_trimmed;
use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, preceded, separated_pair};
use winnow::prelude::*;
use winnow::Parser as _;
use winnow::token::{one_of, take_while};

/// Upper bound on `engturbo` turbo count.
const MAX_TURBOS: i32 = 4;

impl Parser<'_> {
    // ─── Engine ───────────────────────────────────────────────────────────

    /// Gear ratios end at the first negative value (conventionally `-1`).
    pub(super) fn parse_engine(&mut self, a: &Args) {
        if !a.check_count(6) {
            return;
        }
        let mut engine = Engine {
            shift_down_rpm: a.float(0),
            shift_up_rpm: a.float(1),
            torque: a.float(2),
            global_gear_ratio: a.float(3),
            reverse_gear_ratio: a.float(4),
            neutral_gear_ratio: a.float(5),
            gear_ratios: Vec::new(),
        };
        for i in 6..a.len() {
            let ratio = a.float(i);
            if ratio < 0.0 {
                break;
            }
            engine.gear_ratios.push(ratio);
        }
        if engine.gear_ratios.is_empty() {
            a.error("Engine has no forward gear, ignoring...");
            return;
        }
        self.set_single(Keyword::Engine, a, |m| &mut m.engine, engine);
    }

    pub(super) fn parse_engoption(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        let mut engoption = Engoption {
            inertia: a.float(0),
            ..Engoption::default()
        };
        if a.len() > 1 {
            let c = a.char(1);
            match EngineType::from_char(c) {
                Some(t) => engoption.engine_type = t,
                None => a.warn(format!("Invalid engine type '{c}', using 't' (truck)")),
            }
        }
        let optional = [
            &mut engoption.clutch_force,
            &mut engoption.shift_time,
            &mut engoption.clutch_time,
            &mut engoption.post_shift_time,
            &mut engoption.stall_rpm,
            &mut engoption.idle_rpm,
            &mut engoption.max_idle_mixture,
            &mut engoption.min_idle_mixture,
            &mut engoption.braking_torque,
        ];
        for (i, field) in optional.into_iter().enumerate() {
            if a.len() > i + 2 {
                *field = a.float(i + 2);
            }
        }
        self.set_single(Keyword::Engoption, a, |m| &mut m.engoption, engoption);
    }

    pub(super) fn parse_engturbo(&mut self, a: &Args) {
        if !a.check_count(4) {
            return;
        }
        let mut engturbo = Engturbo {
            version: a.int(0),
            tinertia_factor: a.float(1),
            nturbos: a.int(2),
            ..Engturbo::default()
        };
        for (i, param) in engturbo.params.iter_mut().enumerate() {
            if a.len() > i + 3 {
                *param = a.float(i + 3);
            }
        }
        if engturbo.nturbos > MAX_TURBOS {
            a.warn("You cannot have more than 4 turbos. Fallback: using 4 instead.");
            engturbo.nturbos = MAX_TURBOS;
        }
        self.set_single(Keyword::Engturbo, a, |m| &mut m.engturbo, engturbo);
    }

    /// Either a predefined curve name or `power, torque_percent` samples.
    pub(super) fn parse_torque_curve(&mut self, a: &Args) {
        let fields = split_trimmed(a.line(), ',');
        let module = self.module_mut();
        let curve = module.torque_curve.get_or_insert_with(Default::default);
        match fields.as_slice() {
            [name] => curve.predefined_func_name = Some((*name).to_string()),
            [power, percent] => curve.samples.push(TorqueSample {
                power: lenient_float(power),
                torque_percent: lenient_float(percent),
            }),
            _ => {
                a.error("Invalid line, too many arguments");
                return;
            }
        }
        let index = curve.samples.len().saturating_sub(1);
        module.lines.push(Line::data(Keyword::Torquecurve, index));
    }

    pub(super) fn parse_brakes(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        let mut brakes = Brakes {
            default_braking_force: a.float(0),
            ..Brakes::default()
        };
        if a.len() > 1 {
            brakes.parking_brake_force = a.float(1);
        }
        self.set_single(Keyword::Brakes, a, |m| &mut m.brakes, brakes);
    }

    // ─── Differentials ────────────────────────────────────────────────────

    /// Comma-separated properties: `w1(n n)`, `w2(n n)` and `d(letters)`.
    pub(super) fn parse_axle(&mut self, a: &Args) {
        let mut axle = Axle {
            wheels: [[NodeRef::default(); 2]; 2],
            options: Vec::new(),
        };
        for field in split_trimmed(a.line(), ',') {
            match axle_property.parse_next(&mut &*field) {
                Ok(AxleProperty::Wheel(index, n1, n2)) => {
                    axle.wheels[index] = [a.node_from_text(n1), a.node_from_text(n2)];
                }
                Ok(AxleProperty::Differential(letters)) => {
                    axle.options = differentials(letters);
                }
                Err(_) => {
                    a.error("Invalid property, ignoring whole line...");
                    return;
                }
            }
        }
        self.append(Keyword::Axles, |m| &mut m.axles, axle);
    }

    /// `axle1, axle2, d(letters)`; axle numbers are 1-based in the file.
    pub(super) fn parse_interaxle(&mut self, a: &Args) {
        let fields = split_trimmed(a.line(), ',');
        if fields.len() < 2 {
            a.error("Not enough parameters");
            return;
        }
        let mut interaxle = InterAxle {
            a1: lenient_int(fields[0]) - 1,
            a2: lenient_int(fields[1]) - 1,
            options: Vec::new(),
        };
        if let Some(field) = fields.get(2) {
            match axle_property.parse_next(&mut &**field) {
                Ok(AxleProperty::Differential(letters)) => interaxle.options = differentials(letters),
                Ok(AxleProperty::Wheel(..)) => {}
                Err(_) => {
                    a.error("Invalid property, ignoring whole line...");
                    return;
                }
            }
        }
        self.append(Keyword::Interaxles, |m| &mut m.interaxles, interaxle);
    }

    pub(super) fn parse_transfer_case(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let mut transfer_case = TransferCase {
            a1: a.int(0) - 1,
            a2: a.int(1) - 1,
            ..TransferCase::default()
        };
        if a.len() > 2 {
            transfer_case.has_2wd = a.int(2) != 0;
        }
        if a.len() > 3 {
            transfer_case.has_2wd_lo = a.int(3) != 0;
        }
        transfer_case.gear_ratios.extend((4..a.len()).map(|i| a.float(i)));
        self.set_single(Keyword::Transfercase, a, |m| &mut m.transfer_case, transfer_case);
    }

    // ─── Driver assists (inline) ──────────────────────────────────────────

    /// `AntiLockBrakes force, min_speed[, pulse][, mode:...]`.
    pub(super) fn parse_anti_lock_brakes(&mut self, a: &Args) {
        let fields = split_trimmed(a.rest_from(1), ',');
        if fields.len() < 2 {
            a.error("Too few arguments for `AntiLockBrakes`");
            return;
        }
        let mut abs = AntiLockBrakes {
            regulation_force: lenient_float(fields[0]),
            min_speed: u32::try_from(lenient_int(fields[1])).unwrap_or(0),
            pulse_per_sec: None,
            attrs: RegulatorAttrs {
                is_on: true,
                ..RegulatorAttrs::default()
            },
        };
        let mut modes = &fields[2..];
        if let Some((first, rest)) = modes.split_first() {
            if !is_mode_field(first) {
                abs.pulse_per_sec = Some(lenient_float(first));
                modes = rest;
            }
        }
        for field in modes {
            regulator_mode(a, field, &mut abs.attrs, "Antilockbrakes");
        }
        self.set_single(Keyword::AntiLockBrakes, a, |m| &mut m.anti_lock_brakes, abs);
    }

    /// `TractionControl force, wheel_slip[, fade_speed[, pulse]][, mode:...]`.
    pub(super) fn parse_traction_control(&mut self, a: &Args) {
        let fields = split_trimmed(a.rest_from(1), ',');
        if fields.len() < 2 {
            a.error("Too few arguments");
            return;
        }
        let mut tc = TractionControl {
            regulation_force: lenient_float(fields[0]),
            wheel_slip: lenient_float(fields[1]),
            fade_speed: None,
            pulse_per_sec: None,
            attrs: RegulatorAttrs::default(),
        };
        let mut modes = &fields[2..];
        for slot in [&mut tc.fade_speed, &mut tc.pulse_per_sec] {
            match modes.split_first() {
                Some((first, rest)) if !is_mode_field(first) => {
                    *slot = Some(lenient_float(first));
                    modes = rest;
                }
                _ => break,
            }
        }
        for field in modes {
            regulator_mode(a, field, &mut tc.attrs, "TractionControl");
        }
        self.set_single(Keyword::TractionControl, a, |m| &mut m.traction_control, tc);
    }

    pub(super) fn parse_slope_brake(&mut self, a: &Args) {
        let mut slope_brake = SlopeBrake::default();
        if a.len() > 1 {
            slope_brake.regulating_force = a.float(1);
        }
        if a.len() > 2 {
            slope_brake.attach_angle = a.float(2);
        }
        if a.len() > 3 {
            slope_brake.release_angle = a.float(3);
        }
        self.set_single(Keyword::SlopeBrake, a, |m| &mut m.slope_brake, slope_brake);
    }

    pub(super) fn parse_cruise_control(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let cruise_control = CruiseControl {
            min_speed: a.float(1),
            autobrake: a.int(2),
        };
        self.set_single(Keyword::CruiseControl, a, |m| &mut m.cruise_control, cruise_control);
    }

    pub(super) fn parse_speed_limiter(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let max_speed = a.float(1);
        if max_speed <= 0.0 {
            a.warn(format!(
                "Invalid 'max_speed' ({max_speed}), must be > 0.0. Using it anyway (compatibility)"
            ));
        }
        let limiter = SpeedLimiter {
            max_speed,
            is_enabled: true,
        };
        self.set_single(Keyword::SpeedLimiter, a, |m| &mut m.speed_limiter, limiter);
    }
}

// ─── Sub-formats ──────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum AxleProperty<'i> {
    /// Wheel slot (0 or 1) and its two hub nodes.
    Wheel(usize, &'i str, &'i str),
    Differential(&'i str),
}

fn node_id<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-').parse_next(input)
}

fn axle_wheel<'i>(input: &mut &'i str) -> ModalResult<AxleProperty<'i>> {
    let slot = preceded('w', one_of(['1', '2'])).parse_next(input)?;
    let (n1, n2) = delimited(
        '(',
        separated_pair(node_id, take_while(1.., [' ', '\t']), node_id),
        ')',
    )
    .parse_next(input)?;
    Ok(AxleProperty::Wheel(usize::from(slot == '2'), n1, n2))
}

fn axle_differential<'i>(input: &mut &'i str) -> ModalResult<AxleProperty<'i>> {
    delimited("d(", take_while(0.., |c: char| c != ')'), ')')
        .map(AxleProperty::Differential)
        .parse_next(input)
}

fn axle_property<'i>(input: &mut &'i str) -> ModalResult<AxleProperty<'i>> {
    preceded(space0, alt((axle_wheel, axle_differential))).parse_next(input)
}

/// Known letters in order; anything else is dropped.
fn differentials(letters: &str) -> Vec<DifferentialType> {
    letters.chars().filter_map(DifferentialType::from_char).collect()
}

fn is_mode_field(field: &str) -> bool {
    field
        .split(':')
        .next()
        .is_some_and(|key| key.trim().eq_ignore_ascii_case("mode"))
}

/// `mode: on & nodash & notoggle`. A field that is not a mode clause resets
/// the attributes to switched on.
fn regulator_mode(a: &Args, field: &str, attrs: &mut RegulatorAttrs, section: &str) {
    let parts: Vec<&str> = field.split(':').collect();
    if parts.len() != 2 || !parts[0].trim().eq_ignore_ascii_case("mode") {
        a.error(format!("{section} Mode: missing"));
        *attrs = RegulatorAttrs {
            is_on: true,
            no_dashboard: false,
            no_toggle: false,
        };
        return;
    }
    for attr in parts[1].split('&') {
        let attr = attr.trim().to_ascii_lowercase();
        if attr.starts_with("nodash") {
            attrs.no_dashboard = true;
        } else if attr.starts_with("notoggle") {
            attrs.no_toggle = true;
        } else if attr.starts_with("on") {
            attrs.is_on = true;
        } else if attr.starts_with("off") {
            attrs.is_on = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RefState;
    use crate::parser::{ParseOutput, ParserConfig, parse_truck};

    fn parse(text: &str) -> ParseOutput {
        parse_truck(text, &ParserConfig::default())
    }

    #[test]
    fn engine_gears_stop_at_negative_ratio() {
        let out = parse("t\nengine\n1000 2000 500 3.5 -4 0 3 2 1 -1 0.5\n");
        let engine = out.document.root.engine.as_ref().expect("engine");
        assert_eq!(engine.gear_ratios, vec![3.0, 2.0, 1.0]);
        assert_eq!(engine.reverse_gear_ratio, -4.0);
    }

    #[test]
    fn engine_without_forward_gear_is_dropped() {
        let out = parse("t\nengine\n1000 2000 500 3.5 -4 0 -1\n");
        assert!(out.document.root.engine.is_none());
        assert!(out.diagnostics.contains("Engine has no forward gear, ignoring..."));
    }

    #[test]
    fn repeated_engine_uses_last_one() {
        let out = parse("t\nengine\n1000 2000 500 3.5 -4 0 3\n1000 2000 800 3.5 -4 0 3\n");
        assert_eq!(out.document.root.engine.as_ref().map(|e| e.torque), Some(800.0));
        assert!(out.diagnostics.contains("Multiple lines of 'engine', using last one"));
    }

    #[test]
    fn engoption_type_and_optional_fields() {
        let out = parse("t\nengoption\n5 c 100 0.5\n");
        let e = out.document.root.engoption.expect("engoption");
        assert_eq!(e.inertia, 5.0);
        assert_eq!(e.engine_type, EngineType::Car);
        assert_eq!(e.clutch_force, 100.0);
        assert_eq!(e.shift_time, 0.5);
        assert_eq!(e.clutch_time, -1.0);
    }

    #[test]
    fn engturbo_clamps_turbo_count() {
        let out = parse("t\nengturbo\n2 1.5 6 10 20\n");
        let t = out.document.root.engturbo.expect("engturbo");
        assert_eq!(t.nturbos, 4);
        assert_eq!(t.params[0], 10.0);
        assert_eq!(t.params[1], 20.0);
        assert_eq!(t.params[2], 9_999.0);
        assert!(out.diagnostics.contains("more than 4 turbos"));
    }

    #[test]
    fn torque_curve_name_and_samples() {
        let out = parse("t\ntorquecurve\n0, 0.3\n1000, 0.8\ntorquecurve\ndiesel\n");
        let curve = out.document.root.torque_curve.as_ref().expect("curve");
        assert_eq!(curve.samples.len(), 2);
        assert_eq!(curve.samples[1].torque_percent, 0.8);
        assert_eq!(curve.predefined_func_name.as_deref(), Some("diesel"));
    }

    #[test]
    fn torque_curve_rejects_three_fields() {
        let out = parse("t\ntorquecurve\n0, 0.3, 1\n");
        assert!(out.diagnostics.contains("Invalid line, too many arguments"));
    }

    #[test]
    fn brakes_parking_force_optional() {
        let out = parse("t\nbrakes\n20000\n");
        let b = out.document.root.brakes.expect("brakes");
        assert_eq!(b.default_braking_force, 20_000.0);
        assert_eq!(b.parking_brake_force, -1.0);
    }

    #[test]
    fn axle_wheels_and_differential_order() {
        let out = parse("t\nnodes\n0 0 0 0\n1 0 0 0\n2 0 0 0\n3 0 0 0\naxles\nw1(0 1), w2(2 3), d(lxo)\n");
        let axle = &out.document.root.axles[0];
        assert_eq!(axle.wheels[1][0].text(), "2");
        assert_eq!(axle.wheels[1][1].state(), RefState::ResolvedNumeric { index: 3 });
        assert_eq!(axle.options, vec![DifferentialType::Locked, DifferentialType::Open]);
    }

    #[test]
    fn axle_with_bad_property_is_dropped() {
        let out = parse("t\naxles\nw1(0 1), x(2)\n");
        assert!(out.document.root.axles.is_empty());
        assert!(out.diagnostics.contains("Invalid property, ignoring whole line..."));
    }

    #[test]
    fn axle_property_grammar() {
        assert_eq!(
            axle_property.parse_next(&mut " w2(a_1 b-2)").ok(),
            Some(AxleProperty::Wheel(1, "a_1", "b-2"))
        );
        assert_eq!(
            axle_property.parse_next(&mut "d(ls)").ok(),
            Some(AxleProperty::Differential("ls"))
        );
        assert!(axle_property.parse_next(&mut "w3(1 2)").is_err());
    }

    #[test]
    fn interaxle_axles_are_zero_based() {
        let out = parse("t\ninteraxles\n1, 2, d(s)\n");
        let ia = &out.document.root.interaxles[0];
        assert_eq!((ia.a1, ia.a2), (0, 1));
        assert_eq!(ia.options, vec![DifferentialType::Split]);
    }

    #[test]
    fn transfer_case_defaults_and_ratios() {
        let out = parse("t\ntransfercase\n1 2 0 1 2.5\n");
        let tc = out.document.root.transfer_case.as_ref().expect("transfercase");
        assert_eq!((tc.a1, tc.a2), (0, 1));
        assert!(!tc.has_2wd);
        assert!(tc.has_2wd_lo);
        assert_eq!(tc.gear_ratios, vec![1.0, 2.5]);
    }

    #[test]
    fn anti_lock_brakes_mode_flags() {
        let out = parse("t\nAntiLockBrakes 1200, 10, 2, mode:OFF&NODASH\n");
        let abs = out.document.root.anti_lock_brakes.expect("abs");
        assert_eq!(abs.regulation_force, 1200.0);
        assert_eq!(abs.min_speed, 10);
        assert_eq!(abs.pulse_per_sec, Some(2.0));
        assert!(!abs.attrs.is_on);
        assert!(abs.attrs.no_dashboard);
    }

    #[test]
    fn anti_lock_brakes_mode_without_pulse() {
        let out = parse("t\nAntiLockBrakes 1200, 10, mode: on & notoggle\n");
        let abs = out.document.root.anti_lock_brakes.expect("abs");
        assert_eq!(abs.pulse_per_sec, None);
        assert!(abs.attrs.is_on);
        assert!(abs.attrs.no_toggle);
    }

    #[test]
    fn traction_control_missing_mode_is_an_error() {
        let out = parse("t\nTractionControl 1000, 5, 2, 3, fast\n");
        let tc = out.document.root.traction_control.expect("tc");
        assert_eq!(tc.fade_speed, Some(2.0));
        assert_eq!(tc.pulse_per_sec, Some(3.0));
        assert!(tc.attrs.is_on);
        assert!(out.diagnostics.contains("TractionControl Mode: missing"));
    }

    #[test]
    fn inline_assists() {
        let out = parse("t\nSlopeBrake 8\ncruisecontrol 5 1\nspeedlimiter 0\n");
        let root = &out.document.root;
        assert_eq!(root.slope_brake.map(|s| s.regulating_force), Some(8.0));
        assert_eq!(root.slope_brake.map(|s| s.release_angle), Some(10.0));
        assert_eq!(root.cruise_control.map(|c| c.autobrake), Some(1));
        assert!(root.speed_limiter.is_some_and(|s| s.is_enabled));
        assert!(out.diagnostics.contains("Invalid 'max_speed'"));
    }
}
