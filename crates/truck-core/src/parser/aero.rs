//! Aerial and marine propulsion blocks.

use super::Parser;
use crate::args::Args;
use crate::keyword::Keyword;
use crate::model::{
    Airbrake, Fusedrag, Pistonprop, Screwprop, Turbojet, Turboprop2, Vec3, Wing, WingSurface,
};
use crate::node::NodeRef;

const DEFAULT_AIRFOIL: &str = "NACA0009.afl";

impl Parser<'_> {
    pub(super) fn parse_wing(&mut self, a: &Args) {
        if !a.check_count(16) {
            return;
        }
        let mut wing = Wing {
            nodes: std::array::from_fn(|i| a.node(i)),
            tex_coords: std::array::from_fn(|i| a.float(8 + i)),
            control_surface: WingSurface::None,
            chord_point: -1.0,
            min_deflection: -1.0,
            max_deflection: -1.0,
            airfoil: String::new(),
            efficacy_coef: 1.0,
        };
        if a.len() > 16 {
            wing.control_surface = a.wing_surface(16);
        }
        if a.len() > 17 {
            wing.chord_point = a.float(17);
        }
        if a.len() > 18 {
            wing.min_deflection = a.float(18);
        }
        if a.len() > 19 {
            wing.max_deflection = a.float(19);
        }
        if a.len() > 20 {
            wing.airfoil = a.string(20);
        }
        if a.len() > 21 {
            wing.efficacy_coef = a.float(21);
        }
        self.append(Keyword::Wings, |m| &mut m.wings, wing);
    }

    pub(super) fn parse_airbrake(&mut self, a: &Args) {
        if !a.check_count(14) {
            return;
        }
        let airbrake = Airbrake {
            reference_node: a.node(0),
            x_axis_node: a.node(1),
            y_axis_node: a.node(2),
            additional_node: a.node(3),
            offset: Vec3::new(a.float(4), a.float(5), a.float(6)),
            width: a.float(7),
            height: a.float(8),
            max_inclination_angle: a.float(9),
            texcoord_x1: a.float(10),
            texcoord_y1: a.float(11),
            texcoord_x2: a.float(12),
            texcoord_y2: a.float(13),
        };
        self.append(Keyword::Airbrakes, |m| &mut m.airbrakes, airbrake);
    }

    /// `turboprops2` inserts a couple node before the power.
    pub(super) fn parse_turboprop(&mut self, a: &Args, is_v2: bool) {
        if !a.check_count(if is_v2 { 9 } else { 8 }) {
            return;
        }
        let off = usize::from(is_v2);
        let turboprop = Turboprop2 {
            reference_node: a.node(0),
            axis_node: a.node(1),
            blade_tip_nodes: [a.node(2), a.node(3), a.nullable_node(4), a.nullable_node(5)],
            couple_node: if is_v2 { a.nullable_node(6) } else { NodeRef::default() },
            turbine_power_kw: a.float(6 + off),
            airfoil: a.string(7 + off),
        };
        let keyword = if is_v2 { Keyword::Turboprops2 } else { Keyword::Turboprops };
        self.append(keyword, |m| &mut m.turboprops2, turboprop);
    }

    pub(super) fn parse_pistonprop(&mut self, a: &Args) {
        if !a.check_count(10) {
            return;
        }
        let pistonprop = Pistonprop {
            reference_node: a.node(0),
            axis_node: a.node(1),
            blade_tip_nodes: [a.node(2), a.node(3), a.nullable_node(4), a.nullable_node(5)],
            couple_node: a.nullable_node(6),
            turbine_power_kw: a.float(7),
            pitch: a.float(8),
            airfoil: a.string(9),
        };
        self.append(Keyword::Pistonprops, |m| &mut m.pistonprops, pistonprop);
    }

    pub(super) fn parse_turbojet(&mut self, a: &Args) {
        if !a.check_count(9) {
            return;
        }
        let turbojet = Turbojet {
            front_node: a.node(0),
            back_node: a.node(1),
            side_node: a.node(2),
            is_reversable: a.int(3),
            dry_thrust: a.float(4),
            wet_thrust: a.float(5),
            front_diameter: a.float(6),
            back_diameter: a.float(7),
            nozzle_length: a.float(8),
        };
        self.append(Keyword::Turbojets, |m| &mut m.turbojets, turbojet);
    }

    /// Third field is either a width or `autocalc` followed by an area coefficient.
    pub(super) fn parse_fusedrag(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let mut fusedrag = Fusedrag {
            front_node: a.node(0),
            rear_node: a.node(1),
            autocalc: false,
            approximate_width: 0.0,
            area_coefficient: 1.0,
            airfoil_name: DEFAULT_AIRFOIL.to_string(),
        };
        let airfoil_at = if a.str(2) == "autocalc" {
            fusedrag.autocalc = true;
            if a.len() > 3 {
                fusedrag.area_coefficient = a.float(3);
            }
            4
        } else {
            fusedrag.approximate_width = a.float(2);
            3
        };
        if a.len() > airfoil_at {
            fusedrag.airfoil_name = a.string(airfoil_at);
        }
        self.append(Keyword::Fusedrag, |m| &mut m.fusedrag, fusedrag);
    }

    pub(super) fn parse_screwprop(&mut self, a: &Args) {
        if !a.check_count(4) {
            return;
        }
        let screwprop = Screwprop {
            prop_node: a.node(0),
            back_node: a.node(1),
            top_node: a.node(2),
            power: a.float(3),
        };
        self.append(Keyword::Screwprops, |m| &mut m.screwprops, screwprop);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::node::RefState;
    use crate::parser::{ParseOutput, ParserConfig, parse_truck};

    fn parse(text: &str) -> ParseOutput {
        parse_truck(text, &ParserConfig::default())
    }

    const NODES: &str = "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\n3 0 0 1\n4 1 1 0\n5 1 0 1\n6 0 1 1\n7 1 1 1\n";

    #[test]
    fn wing_optional_fields_and_defaults() {
        let out = parse(&format!(
            "{NODES}wings\n0 1 2 3 4 5 6 7 0 1 0 1 0 1 0 1 a 0.25\n0 1 2 3 4 5 6 7 0 1 0 1 0 1 0 1\n"
        ));
        let wings = &out.document.root.wings;
        assert_eq!(wings[0].control_surface, WingSurface::RightAileron);
        assert_eq!(wings[0].chord_point, 0.25);
        assert_eq!(wings[0].min_deflection, -1.0);
        assert_eq!(wings[1].control_surface, WingSurface::None);
        assert_eq!(wings[1].efficacy_coef, 1.0);
        assert_eq!(wings[1].tex_coords[1], 1.0);
    }

    #[test]
    fn wing_bad_surface_is_reported() {
        let out = parse(&format!("{NODES}wings\n0 1 2 3 4 5 6 7 0 1 0 1 0 1 0 1 z\n"));
        assert_eq!(out.document.root.wings[0].control_surface, WingSurface::None);
        assert!(out.diagnostics.contains("'control surface' (value: z)"));
    }

    #[test]
    fn airbrake_fields() {
        let out = parse(&format!("{NODES}airbrakes\n0 1 2 3 0.1 0.2 0.3 1.5 0.5 45 0 0 1 1\n"));
        let ab = &out.document.root.airbrakes[0];
        assert_eq!(ab.offset, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(ab.max_inclination_angle, 45.0);
        assert_eq!(ab.texcoord_y2, 1.0);
    }

    #[test]
    fn turboprops_share_a_list() {
        let out = parse(&format!(
            "{NODES}turboprops\n0 1 2 3 -1 -1 500 prop.afl\nturboprops2\n0 1 2 3 4 5 6 700 prop.afl\n"
        ));
        let props = &out.document.root.turboprops2;
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].blade_tip_nodes[2].state(), RefState::Invalid);
        assert_eq!(props[0].couple_node.state(), RefState::Invalid);
        assert_eq!(props[0].turbine_power_kw, 500.0);
        assert_eq!(props[1].couple_node.state(), RefState::ResolvedNumeric { index: 6 });
        assert_eq!(props[1].turbine_power_kw, 700.0);
    }

    #[test]
    fn pistonprop_fields() {
        let out = parse(&format!("{NODES}pistonprops\n0 1 2 3 4 5 -1 300 2.5 prop.afl\n"));
        let p = &out.document.root.pistonprops[0];
        assert_eq!(p.couple_node.state(), RefState::Invalid);
        assert_eq!(p.pitch, 2.5);
        assert_eq!(p.airfoil, "prop.afl");
    }

    #[test]
    fn turbojet_fields() {
        let out = parse(&format!("{NODES}turbojets\n0 1 2 1 100 150 0.8 0.6 1.2\n"));
        let tj = &out.document.root.turbojets[0];
        assert_eq!(tj.is_reversable, 1);
        assert_eq!(tj.nozzle_length, 1.2);
    }

    #[test]
    fn fusedrag_width_or_autocalc() {
        let out = parse(&format!("{NODES}fusedrag\n0 1 2.5\n0 1 autocalc 0.8 wing.afl\n"));
        let fd = &out.document.root.fusedrag;
        assert!(!fd[0].autocalc);
        assert_eq!(fd[0].approximate_width, 2.5);
        assert_eq!(fd[0].airfoil_name, "NACA0009.afl");
        assert!(fd[1].autocalc);
        assert_eq!(fd[1].area_coefficient, 0.8);
        assert_eq!(fd[1].airfoil_name, "wing.afl");
    }

    #[test]
    fn screwprop_fields() {
        let out = parse(&format!("{NODES}screwprops\n0 1 2 1500\n"));
        assert_eq!(out.document.root.screwprops[0].power, 1500.0);
    }
}
