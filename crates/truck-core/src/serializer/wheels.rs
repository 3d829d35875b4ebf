//! Wheel blocks. Each wheel generates nodes, so these run right after
//! `nodes` and `cinecam`.

use super::{Row, Writer};
use crate::document::Module;
use crate::keyword::Keyword;
use crate::model::{BaseWheel, MeshWheel};

impl Writer<'_> {
    fn sync_wheel(&mut self, base: &BaseWheel) {
        self.sync_node(&base.node_defaults);
        self.sync_beam(&base.beam_defaults);
    }

    /// Nodes, rigidity node and the braking-to-mass run shared by every flavour.
    fn wheel_core(row: Row, base: &BaseWheel) -> Row {
        row.int(base.num_rays)
            .nodes(&base.nodes)
            .rigidity(&base.rigidity_node)
            .int(base.braking as i32)
            .int(base.propulsion as i32)
            .node(&base.reference_arm_node)
            .float(base.mass)
    }

    pub(super) fn wheels(&mut self, module: &Module) {
        if module.wheels.is_empty() {
            return;
        }
        self.block(Keyword::Wheels);
        for wheel in &module.wheels {
            self.sync_wheel(&wheel.base);
            let row = self.row().float(wheel.radius).float(wheel.base.width);
            let row = Self::wheel_core(row, &wheel.base)
                .float(wheel.springiness)
                .float(wheel.damping)
                .word(&wheel.face_material_name)
                .word(&wheel.band_material_name);
            self.data(row);
        }
    }

    pub(super) fn wheels2(&mut self, module: &Module) {
        if module.wheels2.is_empty() {
            return;
        }
        self.block(Keyword::Wheels2);
        for wheel in &module.wheels2 {
            self.sync_wheel(&wheel.base);
            let row = self
                .row()
                .float(wheel.rim_radius)
                .float(wheel.tyre_radius)
                .float(wheel.base.width);
            let row = Self::wheel_core(row, &wheel.base)
                .float(wheel.rim_springiness)
                .float(wheel.rim_damping)
                .float(wheel.tyre_springiness)
                .float(wheel.tyre_damping)
                .word(&wheel.face_material_name)
                .word(&wheel.band_material_name);
            self.data(row);
        }
    }

    /// `meshwheels` and `meshwheels2` share one line shape.
    pub(super) fn mesh_wheels(&mut self, keyword: Keyword, wheels: &[MeshWheel]) {
        if wheels.is_empty() {
            return;
        }
        self.block(keyword);
        for wheel in wheels {
            self.sync_wheel(&wheel.base);
            let row = self
                .row()
                .float(wheel.tyre_radius)
                .float(wheel.rim_radius)
                .float(wheel.base.width);
            let row = Self::wheel_core(row, &wheel.base)
                .float(wheel.spring)
                .float(wheel.damping)
                .text(wheel.side.letter().to_string())
                .word(&wheel.mesh_name)
                .word(&wheel.material_name);
            self.data(row);
        }
    }

    pub(super) fn flex_body_wheels(&mut self, module: &Module) {
        if module.flex_body_wheels.is_empty() {
            return;
        }
        self.block(Keyword::Flexbodywheels);
        for wheel in &module.flex_body_wheels {
            self.sync_wheel(&wheel.base);
            let row = self
                .row()
                .float(wheel.tyre_radius)
                .float(wheel.rim_radius)
                .float(wheel.base.width);
            let row = Self::wheel_core(row, &wheel.base)
                .float(wheel.tyre_springiness)
                .float(wheel.tyre_damping)
                .float(wheel.rim_springiness)
                .float(wheel.rim_damping)
                .text(wheel.side.letter().to_string())
                .opt_text(&wheel.rim_mesh_name)
                .opt_text(&wheel.tyre_mesh_name);
            self.data(row);
        }
    }

    pub(super) fn wheel_detachers(&mut self, module: &Module) {
        if module.wheel_detachers.is_empty() {
            return;
        }
        self.block(Keyword::Wheeldetachers);
        for detacher in &module.wheel_detachers {
            let row = self
                .row()
                .int(detacher.wheel_id)
                .int(detacher.detacher_group);
            self.data(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParserConfig, parse_truck};
    use crate::serializer::{SerializerConfig, serialize_document};
    use pretty_assertions::assert_eq;

    const NODES: &str = "t\nnodes\n0 0 0 0\n1 0 1 0\n2 1 0 0\n";

    fn round_trip(body: &str) -> (String, String) {
        let source = format!("{NODES}{body}");
        let config = SerializerConfig::default();
        let first = parse_truck(&source, &ParserConfig::default());
        let text = serialize_document(&first.document, &config).expect("serializable");
        let second = parse_truck(&text, &ParserConfig::default());
        let again = serialize_document(&second.document, &config).expect("serializable");
        (text, again)
    }

    #[test]
    fn wheels_keep_all_fields() {
        let (text, again) = round_trip(
            "wheels\n0.5, 0.3, 12, 0, 1, 9999, 1, 1, 2, 100, 8000, 300, tracks/wheelface, tracks/wheelband1\n",
        );
        assert!(text.contains("\t0.5, 0.3, 12, 0, 1, 9999, 1, 1, 2, 100, 8000, 300, tracks/wheelface, tracks/wheelband1\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn meshwheels_keep_side_letter() {
        let (text, again) = round_trip(
            "meshwheels\n0.5, 0.3, 0.2, 12, 0, 1, 2, 1, 1, 2, 100, 8000, 300, r, rim.mesh, tyre-mat\n",
        );
        assert!(text.contains(", r, rim.mesh, tyre-mat\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn wheel_detachers_are_written() {
        let (text, again) = round_trip(
            "wheels\n0.5, 0.3, 12, 0, 1, 9999, 1, 1, 2, 100, 8000, 300, f, b\nwheeldetachers\n0, 3\n",
        );
        assert!(text.contains("wheeldetachers\n\t0, 3\n"));
        assert_eq!(text, again);
    }
}
