//! Aerial and marine propulsion blocks.

use super::Writer;
use crate::document::Module;
use crate::keyword::Keyword;
use crate::model::{Turboprop2, WingSurface};

const DEFAULT_AIRFOIL: &str = "NACA0009.afl";

impl Writer<'_> {
    pub(super) fn aero(&mut self, module: &Module) {
        self.wings(module);
        self.airbrakes(module);
        self.turboprops(module);
        self.pistonprops(module);
        self.turbojets(module);
        self.fusedrag(module);
    }

    fn wings(&mut self, module: &Module) {
        if module.wings.is_empty() {
            return;
        }
        self.block(Keyword::Wings);
        for wing in &module.wings {
            let row = self
                .row()
                .nodes(&wing.nodes)
                .floats(&wing.tex_coords)
                .opt_field(
                    wing.control_surface.letter().to_string(),
                    wing.control_surface == WingSurface::None,
                )
                .opt_float(wing.chord_point, -1.0)
                .opt_float(wing.min_deflection, -1.0)
                .opt_float(wing.max_deflection, -1.0)
                .opt_text(&wing.airfoil)
                .opt_float(wing.efficacy_coef, 1.0);
            self.data(row);
        }
    }

    fn airbrakes(&mut self, module: &Module) {
        if module.airbrakes.is_empty() {
            return;
        }
        self.block(Keyword::Airbrakes);
        for brake in &module.airbrakes {
            let row = self
                .row()
                .node(&brake.reference_node)
                .node(&brake.x_axis_node)
                .node(&brake.y_axis_node)
                .node(&brake.additional_node)
                .floats(&[
                    brake.offset.x,
                    brake.offset.y,
                    brake.offset.z,
                    brake.width,
                    brake.height,
                    brake.max_inclination_angle,
                    brake.texcoord_x1,
                    brake.texcoord_y1,
                    brake.texcoord_x2,
                    brake.texcoord_y2,
                ]);
            self.data(row);
        }
    }

    /// Lines without a couple node came from `turboprops` and go back there.
    fn turboprops(&mut self, module: &Module) {
        let is_v1 = |t: &&Turboprop2| t.couple_node.text().is_empty();
        let v1: Vec<&Turboprop2> = module.turboprops2.iter().filter(is_v1).collect();
        let v2: Vec<&Turboprop2> = module.turboprops2.iter().filter(|t| !is_v1(t)).collect();
        if !v1.is_empty() {
            self.block(Keyword::Turboprops);
            for prop in v1 {
                let row = self
                    .row()
                    .node(&prop.reference_node)
                    .node(&prop.axis_node)
                    .nodes(&prop.blade_tip_nodes)
                    .float(prop.turbine_power_kw)
                    .word(&prop.airfoil);
                self.data(row);
            }
        }
        if !v2.is_empty() {
            self.block(Keyword::Turboprops2);
            for prop in v2 {
                let row = self
                    .row()
                    .node(&prop.reference_node)
                    .node(&prop.axis_node)
                    .nodes(&prop.blade_tip_nodes)
                    .node(&prop.couple_node)
                    .float(prop.turbine_power_kw)
                    .word(&prop.airfoil);
                self.data(row);
            }
        }
    }

    fn pistonprops(&mut self, module: &Module) {
        if module.pistonprops.is_empty() {
            return;
        }
        self.block(Keyword::Pistonprops);
        for prop in &module.pistonprops {
            let row = self
                .row()
                .node(&prop.reference_node)
                .node(&prop.axis_node)
                .nodes(&prop.blade_tip_nodes)
                .node(&prop.couple_node)
                .float(prop.turbine_power_kw)
                .float(prop.pitch)
                .word(&prop.airfoil);
            self.data(row);
        }
    }

    fn turbojets(&mut self, module: &Module) {
        if module.turbojets.is_empty() {
            return;
        }
        self.block(Keyword::Turbojets);
        for jet in &module.turbojets {
            let row = self
                .row()
                .node(&jet.front_node)
                .node(&jet.back_node)
                .node(&jet.side_node)
                .int(jet.is_reversable)
                .floats(&[
                    jet.dry_thrust,
                    jet.wet_thrust,
                    jet.front_diameter,
                    jet.back_diameter,
                    jet.nozzle_length,
                ]);
            self.data(row);
        }
    }

    /// `autocalc` lines carry an area coefficient; width lines go straight
    /// to the airfoil.
    fn fusedrag(&mut self, module: &Module) {
        if module.fusedrag.is_empty() {
            return;
        }
        self.block(Keyword::Fusedrag);
        for drag in &module.fusedrag {
            let row = self.row().node(&drag.front_node).node(&drag.rear_node);
            let row = if drag.autocalc {
                row.text("autocalc").opt_float(drag.area_coefficient, 1.0)
            } else {
                row.float(drag.approximate_width)
            };
            let row = row.opt_field(
                drag.airfoil_name.as_str(),
                drag.airfoil_name == DEFAULT_AIRFOIL || drag.airfoil_name.is_empty(),
            );
            self.data(row);
        }
    }

    pub(super) fn screwprops(&mut self, module: &Module) {
        if module.screwprops.is_empty() {
            return;
        }
        self.block(Keyword::Screwprops);
        for prop in &module.screwprops {
            let row = self
                .row()
                .node(&prop.prop_node)
                .node(&prop.back_node)
                .node(&prop.top_node)
                .float(prop.power);
            self.data(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParserConfig, parse_truck};
    use crate::serializer::{SerializerConfig, serialize_document};
    use pretty_assertions::assert_eq;

    const NODES: &str = "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\n3 1 1 0\n4 0 0 1\n5 1 0 1\n6 0 1 1\n7 1 1 1\n";

    fn serialize(text: &str) -> String {
        let out = parse_truck(text, &ParserConfig::default());
        serialize_document(&out.document, &SerializerConfig::default()).expect("serializable")
    }

    fn reserialize(body: &str) -> (String, String) {
        let first = serialize(&format!("{NODES}{body}"));
        let second = serialize(&first);
        (first, second)
    }

    #[test]
    fn wings_drop_default_tail() {
        let (text, again) = reserialize("wings\n0 1 2 3 4 5 6 7 0 1 0 1 0 1 0 1\n");
        assert!(text.contains("wings\n\t0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 0, 1, 0, 1, 0, 1\n"));
        assert_eq!(text, again);
        let text = serialize(&format!(
            "{NODES}wings\n0 1 2 3 4 5 6 7 0 1 0 1 0 1 0 1 f 0.5 -30 30 NACA64.afl\n"
        ));
        assert!(text.contains(", f, 0.5, -30, 30, NACA64.afl\n"));
    }

    #[test]
    fn turboprops_return_to_their_block() {
        let (text, again) = reserialize(
            "turboprops\n0 1 2 3 -1 -1 300 prop.afl\nturboprops2\n0 1 2 3 4 5 6 300 prop.afl\n",
        );
        assert!(text.contains("turboprops\n\t0, 1, 2, 3, -1, -1, 300, prop.afl\n"));
        assert!(text.contains("turboprops2\n\t0, 1, 2, 3, 4, 5, 6, 300, prop.afl\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn fusedrag_forms() {
        let (text, again) = reserialize("fusedrag\n0 1 autocalc 0.8\n0 1 2.5 custom.afl\n");
        assert!(text.contains("\t0, 1, autocalc, 0.8\n"));
        assert!(text.contains("\t0, 1, 2.5, custom.afl\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn turbojets_and_screwprops() {
        let (text, again) = reserialize(
            "turbojets\n0 1 2 1 50 80 0.5 0.4 2\nscrewprops\n0 1 2 500\n",
        );
        assert!(text.contains("turbojets\n\t0, 1, 2, 1, 50, 80, 0.5, 0.4, 2\n"));
        assert!(text.contains("screwprops\n\t0, 1, 2, 500\n"));
        assert_eq!(text, again);
    }
}
