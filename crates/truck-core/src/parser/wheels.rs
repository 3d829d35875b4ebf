//! Wheel blocks. Every wheel makes the simulator generate nodes, which the
//! sequential importer has to account for.

use super::Parser;
use crate::args::Args;
use crate::keyword::Keyword;
use crate::model::{BaseWheel, FlexBodyWheel, MeshWheel, Wheel, Wheel2, WheelDetacher};
use std::rc::Rc;

impl Parser<'_> {
    /// Width, ray count, then from `rays_at + 1`: two hub nodes, rigidity,
    /// braking, propulsion, reference arm and mass.
    fn base_wheel(&self, a: &Args, width_at: usize, rays_at: usize) -> BaseWheel {
        let n = rays_at + 1;
        BaseWheel {
            width: a.float(width_at),
            num_rays: a.uint(rays_at),
            nodes: [a.node(n), a.node(n + 1)],
            rigidity_node: a.rigidity_node(n + 2),
            braking: a.braking(n + 3),
            propulsion: a.propulsion(n + 4),
            reference_arm_node: a.node(n + 5),
            mass: a.float(n + 6),
            node_defaults: Rc::clone(&self.defaults.node),
            beam_defaults: Rc::clone(&self.defaults.beam),
        }
    }

    fn register_wheel_nodes(&mut self, keyword: Keyword, num_rays: u32) {
        if self.importer.is_enabled() {
            self.importer.generate_wheel_nodes(keyword, num_rays);
        }
    }

    pub(super) fn parse_wheel(&mut self, a: &Args) {
        if !a.check_count(14) {
            return;
        }
        let wheel = Wheel {
            base: self.base_wheel(a, 1, 2),
            radius: a.float(0),
            springiness: a.float(10),
            damping: a.float(11),
            face_material_name: a.string(12),
            band_material_name: a.string(13),
        };
        self.register_wheel_nodes(Keyword::Wheels, wheel.base.num_rays);
        self.append(Keyword::Wheels, |m| &mut m.wheels, wheel);
    }

    pub(super) fn parse_wheel2(&mut self, a: &Args) {
        if !a.check_count(17) {
            return;
        }
        let wheel = Wheel2 {
            base: self.base_wheel(a, 2, 3),
            rim_radius: a.float(0),
            tyre_radius: a.float(1),
            rim_springiness: a.float(11),
            rim_damping: a.float(12),
            tyre_springiness: a.float(13),
            tyre_damping: a.float(14),
            face_material_name: a.string(15),
            band_material_name: a.string(16),
        };
        self.register_wheel_nodes(Keyword::Wheels2, wheel.base.num_rays);
        self.append(Keyword::Wheels2, |m| &mut m.wheels2, wheel);
    }

    /// `meshwheels` and `meshwheels2` share a line layout.
    pub(super) fn parse_mesh_wheel(&mut self, a: &Args, block: Keyword) {
        if !a.check_count(16) {
            return;
        }
        let wheel = MeshWheel {
            base: self.base_wheel(a, 2, 3),
            tyre_radius: a.float(0),
            rim_radius: a.float(1),
            spring: a.float(11),
            damping: a.float(12),
            side: a.wheel_side(13),
            mesh_name: a.string(14),
            material_name: a.string(15),
        };
        self.register_wheel_nodes(block, wheel.base.num_rays);
        if block == Keyword::Meshwheels2 {
            self.append(block, |m| &mut m.mesh_wheels2, wheel);
        } else {
            self.append(block, |m| &mut m.mesh_wheels, wheel);
        }
    }

    pub(super) fn parse_flexbody_wheel(&mut self, a: &Args) {
        if !a.check_count(16) {
            return;
        }
        let wheel = FlexBodyWheel {
            base: self.base_wheel(a, 2, 3),
            tyre_radius: a.float(0),
            rim_radius: a.float(1),
            tyre_springiness: a.float(11),
            tyre_damping: a.float(12),
            rim_springiness: a.float(13),
            rim_damping: a.float(14),
            side: a.wheel_side(15),
            rim_mesh_name: if a.len() > 16 { a.string(16) } else { String::new() },
            tyre_mesh_name: if a.len() > 17 { a.string(17) } else { String::new() },
        };
        self.register_wheel_nodes(Keyword::Flexbodywheels, wheel.base.num_rays);
        self.append(Keyword::Flexbodywheels, |m| &mut m.flex_body_wheels, wheel);
    }

    pub(super) fn parse_wheel_detacher(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let detacher = WheelDetacher {
            wheel_id: a.int(0),
            detacher_group: a.int(1),
        };
        self.append(Keyword::Wheeldetachers, |m| &mut m.wheel_detachers, detacher);
    }
}
