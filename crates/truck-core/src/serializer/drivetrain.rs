//! Engine, gearbox and driver-assist sections.

use super::{Row, Writer};
use crate::document::Module;
use crate::keyword::Keyword;
use crate::model::{DifferentialType, Engoption, Engturbo, RegulatorAttrs};

/// `d(letters)`, or nothing when no differential is listed.
fn differential_text(options: &[DifferentialType]) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let letters: String = options.iter().map(|d| d.letter()).collect();
    Some(format!("d({letters})"))
}

/// `mode: ON & NODASH`, written only when `attrs` differ from what the
/// parser assumes without a clause.
fn mode_clause(attrs: RegulatorAttrs, implied: RegulatorAttrs) -> Option<String> {
    if attrs == implied {
        return None;
    }
    let mut parts = vec![if attrs.is_on { "ON" } else { "OFF" }];
    if attrs.no_dashboard {
        parts.push("NODASH");
    }
    if attrs.no_toggle {
        parts.push("NOTOGGLE");
    }
    Some(format!("mode: {}", parts.join(" & ")))
}

impl Writer<'_> {
    pub(super) fn drivetrain(&mut self, module: &Module) {
        self.engine(module);
        self.torque_curve(module);
        self.brakes(module);
        self.driver_assists(module);
        self.axles(module);
        self.interaxles(module);
        self.transfer_case(module);
    }

    fn engine(&mut self, module: &Module) {
        if let Some(engine) = &module.engine {
            self.block(Keyword::Engine);
            let row = self
                .row()
                .floats(&[
                    engine.shift_down_rpm,
                    engine.shift_up_rpm,
                    engine.torque,
                    engine.global_gear_ratio,
                    engine.reverse_gear_ratio,
                    engine.neutral_gear_ratio,
                ])
                .floats(&engine.gear_ratios)
                .int(-1);
            self.data(row);
        }
        if let Some(engoption) = &module.engoption {
            self.block(Keyword::Engoption);
            let row = self.engoption_row(engoption);
            self.data(row);
        }
        if let Some(engturbo) = &module.engturbo {
            self.block(Keyword::Engturbo);
            let row = self.engturbo_row(engturbo);
            self.data(row);
        }
    }

    fn engoption_row(&self, e: &Engoption) -> Row {
        let defaults = Engoption::default();
        [
            (e.clutch_force, defaults.clutch_force),
            (e.shift_time, defaults.shift_time),
            (e.clutch_time, defaults.clutch_time),
            (e.post_shift_time, defaults.post_shift_time),
            (e.stall_rpm, defaults.stall_rpm),
            (e.idle_rpm, defaults.idle_rpm),
            (e.max_idle_mixture, defaults.max_idle_mixture),
            (e.min_idle_mixture, defaults.min_idle_mixture),
            (e.braking_torque, defaults.braking_torque),
        ]
        .into_iter()
        .fold(
            self.row()
                .float(e.inertia)
                .opt_field(e.engine_type.letter().to_string(), e.engine_type == defaults.engine_type),
            |row, (value, default)| row.opt_float(value, default),
        )
    }

    fn engturbo_row(&self, e: &Engturbo) -> Row {
        let defaults = Engturbo::default();
        e.params
            .iter()
            .zip(defaults.params)
            .fold(
                self.row().int(e.version).float(e.tinertia_factor).int(e.nturbos),
                |row, (value, default)| row.opt_float(*value, default),
            )
    }

    /// The predefined name line, then one line per sample.
    fn torque_curve(&mut self, module: &Module) {
        let Some(curve) = &module.torque_curve else {
            return;
        };
        self.block(Keyword::Torquecurve);
        if let Some(name) = &curve.predefined_func_name {
            let row = self.row().text(name.as_str());
            self.data(row);
        }
        for sample in &curve.samples {
            let row = self.row().float(sample.power).float(sample.torque_percent);
            self.data(row);
        }
    }

    fn brakes(&mut self, module: &Module) {
        let Some(brakes) = &module.brakes else {
            return;
        };
        self.block(Keyword::Brakes);
        let row = self
            .row()
            .float(brakes.default_braking_force)
            .opt_float(brakes.parking_brake_force, -1.0);
        self.data(row);
    }

    /// Inline directives: `AntiLockBrakes`, `TractionControl`, `SlopeBrake`,
    /// `cruisecontrol` and `speedlimiter`.
    fn driver_assists(&mut self, module: &Module) {
        let any = module.anti_lock_brakes.is_some()
            || module.traction_control.is_some()
            || module.slope_brake.is_some()
            || module.cruise_control.is_some()
            || module.speed_limiter.is_some();
        if !any {
            return;
        }
        self.line("");

        if let Some(abs) = &module.anti_lock_brakes {
            let implied = RegulatorAttrs {
                is_on: true,
                ..RegulatorAttrs::default()
            };
            let mut row = self
                .row()
                .float(abs.regulation_force)
                .int(abs.min_speed)
                .maybe_float(abs.pulse_per_sec);
            if let Some(clause) = mode_clause(abs.attrs, implied) {
                row = row.text(clause);
            }
            self.directive(Keyword::AntiLockBrakes, row);
        }

        if let Some(tc) = &module.traction_control {
            let fade = match (tc.fade_speed, tc.pulse_per_sec) {
                (None, Some(_)) => Some(0.0),
                (fade, _) => fade,
            };
            let mut row = self
                .row()
                .float(tc.regulation_force)
                .float(tc.wheel_slip)
                .maybe_float(fade)
                .maybe_float(tc.pulse_per_sec);
            if let Some(clause) = mode_clause(tc.attrs, RegulatorAttrs::default()) {
                row = row.text(clause);
            }
            self.directive(Keyword::TractionControl, row);
        }

        if let Some(slope) = &module.slope_brake {
            let row = self
                .row()
                .opt_float(slope.regulating_force, 6.0)
                .opt_float(slope.attach_angle, 5.0)
                .opt_float(slope.release_angle, 10.0);
            let text = row.finish();
            if text.is_empty() {
                self.line(Keyword::SlopeBrake.as_str());
            } else {
                self.line(&format!("{} {text}", Keyword::SlopeBrake));
            }
        }

        if let Some(cruise) = &module.cruise_control {
            let row = self.row().float(cruise.min_speed).int(cruise.autobrake);
            self.directive(Keyword::CruiseControl, row);
        }

        if let Some(limiter) = &module.speed_limiter {
            let row = self.row().float(limiter.max_speed);
            self.directive(Keyword::SpeedLimiter, row);
        }
    }

    fn axles(&mut self, module: &Module) {
        if module.axles.is_empty() {
            return;
        }
        self.block(Keyword::Axles);
        for axle in &module.axles {
            let mut row = self.row();
            for (slot, [n1, n2]) in axle.wheels.iter().enumerate() {
                row = row.text(format!(
                    "w{}({} {})",
                    slot + 1,
                    super::node_text(n1),
                    super::node_text(n2)
                ));
            }
            if let Some(d) = differential_text(&axle.options) {
                row = row.text(d);
            }
            self.data(row);
        }
    }

    /// Axle numbers are 1-based in the file.
    fn interaxles(&mut self, module: &Module) {
        if module.interaxles.is_empty() {
            return;
        }
        self.block(Keyword::Interaxles);
        for interaxle in &module.interaxles {
            let mut row = self.row().int(interaxle.a1 + 1).int(interaxle.a2 + 1);
            if let Some(d) = differential_text(&interaxle.options) {
                row = row.text(d);
            }
            self.data(row);
        }
    }

    /// The first gear ratio is implied; only the extra ones are written.
    fn transfer_case(&mut self, module: &Module) {
        let Some(tc) = &module.transfer_case else {
            return;
        };
        self.block(Keyword::Transfercase);
        let extra = tc.gear_ratios.get(1..).unwrap_or_default();
        let row = self
            .row()
            .int(tc.a1 + 1)
            .int(tc.a2 + 1)
            .opt_int(i64::from(tc.has_2wd), 1)
            .opt_int(i64::from(tc.has_2wd_lo), 0)
            .floats(extra);
        self.data(row);
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParserConfig, parse_truck};
    use crate::serializer::{SerializerConfig, serialize_document};
    use pretty_assertions::assert_eq;

    fn serialize(text: &str) -> String {
        let out = parse_truck(text, &ParserConfig::default());
        serialize_document(&out.document, &SerializerConfig::default()).expect("serializable")
    }

    fn reserialize(text: &str) -> (String, String) {
        let first = serialize(text);
        let second = serialize(&first);
        (first, second)
    }

    #[test]
    fn engine_gears_end_with_minus_one() {
        let (text, again) = reserialize("t\nengine\n1000 2000 500 3.5 -4 0 3 2 1 -1\n");
        assert!(text.contains("engine\n\t1000, 2000, 500, 3.5, -4, 0, 3, 2, 1, -1\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn engoption_drops_trailing_defaults() {
        let text = serialize("t\nengoption\n5 c 2 -1 -1\n");
        assert!(text.contains("engoption\n\t5, c, 2\n"));
        let text = serialize("t\nengoption\n5\n");
        assert!(text.contains("engoption\n\t5\n"));
    }

    #[test]
    fn torque_curve_keeps_name_and_samples() {
        let (text, again) = reserialize("t\ntorquecurve\ndiesel\n0, 0.5\n1000, 1\n");
        assert!(text.contains("torquecurve\n\tdiesel\n\t0, 0.5\n\t1000, 1\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn regulators_write_mode_only_when_needed() {
        let text = serialize(
            "t\nAntiLockBrakes 400, 10, 2\nTractionControl 300, 0.5, 5, mode: ON & NODASH\n",
        );
        assert!(text.contains("AntiLockBrakes 400, 10, 2\n"));
        assert!(text.contains("TractionControl 300, 0.5, 5, mode: ON & NODASH\n"));
        let text = serialize("t\nAntiLockBrakes 400, 10, mode: OFF\n");
        assert!(text.contains("AntiLockBrakes 400, 10, mode: OFF\n"));
    }

    #[test]
    fn inline_assists_round_trip() {
        let (text, again) = reserialize(
            "t\nSlopeBrake 8 5 10\ncruisecontrol 10 1\nspeedlimiter 90\n",
        );
        assert!(text.contains("SlopeBrake 8\n"));
        assert!(text.contains("cruisecontrol 10, 1\n"));
        assert!(text.contains("speedlimiter 90\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn axles_and_interaxles() {
        let (text, again) = reserialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\n3 1 1 0\naxles\nw1(0 1), w2(2 3), d(ol)\ninteraxles\n1, 2, d(l)\n",
        );
        assert!(text.contains("axles\n\tw1(0 1), w2(2 3), d(ol)\n"));
        assert!(text.contains("interaxles\n\t1, 2, d(l)\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn transfer_case_extra_ratios() {
        let (text, again) = reserialize("t\ntransfercase\n1 2 1 1 2.5\n");
        assert!(text.contains("transfercase\n\t1, 2, 1, 1, 2.5\n"));
        assert_eq!(text, again);
        let text = serialize("t\ntransfercase\n1 2\n");
        assert!(text.contains("transfercase\n\t1, 2\n"));
    }
}
