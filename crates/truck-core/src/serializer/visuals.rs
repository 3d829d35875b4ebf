//! Module settings, props, flexbodies, lights, materials, sound and GUI.
//!
//! Props and flexbodies are followed by the directives that patch them
//! (`add_animation`, `prop_camera_mode`, `forset`, `flexbody_camera_mode`).

use super::{Row, Writer, node_text};
use crate::document::Module;
use crate::keyword::Keyword;
use crate::model::{
    AnimationMode, AnimationSource, Animation, CameraMode, ExtCameraMode, FlareType, MinimassOption,
    NamedFlag, SkeletonSettings, flag_names,
};
use crate::node::{NodeRange, NodeRef};

/// Mode names written in the `mode:` clause; the rest are bare items.
const TRANSFORM_MODES: [AnimationMode; 6] = [
    AnimationMode::RotationX,
    AnimationMode::RotationY,
    AnimationMode::RotationZ,
    AnimationMode::OffsetX,
    AnimationMode::OffsetY,
    AnimationMode::OffsetZ,
];

/// Collapse numeric runs of `nodes` into `a-b` items; names stay single.
fn compress_node_list(nodes: &[NodeRef]) -> Vec<String> {
    let mut items = Vec::new();
    let mut run: Option<(u32, u32)> = None;
    let flush = |run: &mut Option<(u32, u32)>, items: &mut Vec<String>| {
        if let Some((start, end)) = run.take() {
            if start == end {
                items.push(start.to_string());
            } else {
                items.push(format!("{start}-{end}"));
            }
        }
    };
    for node in nodes {
        match node.text().parse::<u32>() {
            Ok(n) => match run {
                Some((start, end)) if end.checked_add(1) == Some(n) => run = Some((start, n)),
                _ => {
                    flush(&mut run, &mut items);
                    run = Some((n, n));
                }
            },
            Err(_) => {
                flush(&mut run, &mut items);
                items.push(node_text(node).to_string());
            }
        }
    }
    flush(&mut run, &mut items);
    items
}

fn range_items(ranges: &[NodeRange]) -> Vec<String> {
    ranges.iter().map(super::range_text).collect()
}

impl Writer<'_> {
    // ─── Module settings ──────────────────────────────────────────────────

    /// Single-valued per-module settings, written before any block.
    pub(super) fn module_settings(&mut self, module: &Module) {
        if let Some(range) = module.collision_range {
            self.directive(Keyword::SetCollisionRange, self.row().float(range));
        }
        if let Some(mode) = module.shadow_mode {
            self.directive(Keyword::SetShadows, self.row().int(mode));
        }
        if let Some(skeleton) = &module.skeleton_settings {
            let defaults = SkeletonSettings::default();
            let row = self
                .row()
                .float(skeleton.visibility_range_meters)
                .opt_float(skeleton.beam_thickness_meters, defaults.beam_thickness_meters);
            self.directive(Keyword::SetSkeletonSettings, row);
        }
        if let Some(name) = &module.submesh_groundmodel {
            self.directive(Keyword::SubmeshGroundmodel, self.row().text(name.as_str()));
        }
        if let Some(camera) = &module.ext_camera {
            let mut row = self.row().text(camera.mode.as_str());
            if camera.mode == ExtCameraMode::Node {
                if let Some(node) = &camera.node {
                    row = row.node(node);
                }
            }
            self.directive(Keyword::ExtCamera, row);
        }
        if let Some(globals) = &module.globals {
            self.block(Keyword::Globals);
            let row = self
                .row()
                .float(globals.dry_mass)
                .float(globals.cargo_mass)
                .opt_field(globals.material_name.as_str(), globals.material_name.is_empty());
            self.data(row);
        }
        if let Some(minimass) = &module.minimass {
            self.block(Keyword::Minimass);
            let row = self.row().float(minimass.global_min_mass).opt_field(
                "l",
                minimass.option != MinimassOption::SkipLoaded,
            );
            self.data(row);
        }
        if let Some(material) = &module.help_panel_material_name {
            self.block(Keyword::Help);
            self.line(&format!("\t{material}"));
        }
    }

    // ─── Materials ────────────────────────────────────────────────────────

    pub(super) fn managed_materials(&mut self, module: &Module) {
        if module.managed_materials.is_empty() {
            return;
        }
        self.block(Keyword::ManagedMaterials);
        for material in &module.managed_materials {
            self.sync_managed_material_options(material.options);
            let row = self
                .row()
                .word(&material.name)
                .text(material.material_type.as_str())
                .word(&material.diffuse_map);
            let row = if material.material_type.is_flexmesh() {
                row.opt_texture(&material.damaged_diffuse_map)
            } else {
                row
            };
            let row = row.opt_texture(&material.specular_map);
            self.data(row);
        }
    }

    // ─── Props and flexbodies ─────────────────────────────────────────────

    pub(super) fn props(&mut self, module: &Module) {
        if module.props.is_empty() {
            return;
        }
        self.block(Keyword::Props);
        for prop in &module.props {
            let mut row = self
                .row()
                .node(&prop.reference_node)
                .node(&prop.x_axis_node)
                .node(&prop.y_axis_node)
                .floats(&[prop.offset.x, prop.offset.y, prop.offset.z])
                .floats(&[prop.rotation.x, prop.rotation.y, prop.rotation.z])
                .word(&prop.mesh_name);
            if let Some(beacon) = &prop.beacon {
                row = row.word(&beacon.flare_material_name).floats(&beacon.color);
            }
            if let Some(dash) = &prop.dashboard {
                row = row.word(&dash.mesh_name);
                if dash.offset_is_set || dash.rotation_angle != 160.0 {
                    row = row
                        .floats(&[dash.offset.x, dash.offset.y, dash.offset.z])
                        .opt_float(dash.rotation_angle, 160.0);
                }
            }
            self.data(row);
            for animation in &prop.animations {
                let row = self.animation_row(animation);
                self.directive(Keyword::AddAnimation, row);
            }
            self.camera_mode(Keyword::PropCameraMode, prop.camera_mode);
        }
    }

    /// `ratio, lower, upper, source: a|b, mode: x|y, flags..., event: NAME`.
    fn animation_row(&self, animation: &Animation) -> Row {
        let mut row = self
            .row()
            .float(animation.ratio)
            .float(animation.lower_limit)
            .float(animation.upper_limit);

        let mut sources: Vec<String> = flag_names::<AnimationSource>(animation.source)
            .into_iter()
            .map(str::to_string)
            .collect();
        sources.extend(
            animation
                .motor_sources
                .iter()
                .map(|m| format!("{}{}", m.source.name(), m.motor)),
        );
        if !sources.is_empty() {
            row = row.text(format!("source: {}", sources.join("|")));
        }

        let transforms: Vec<&str> = TRANSFORM_MODES
            .iter()
            .filter(|m| animation.mode & m.bit() != 0)
            .map(|m| m.name())
            .collect();
        if !transforms.is_empty() {
            row = row.text(format!("mode: {}", transforms.join("|")));
        }
        for flag in AnimationMode::ALL.iter().filter(|m| !TRANSFORM_MODES.contains(*m)) {
            if animation.mode & flag.bit() != 0 {
                row = row.text(flag.name());
            }
        }
        if !animation.event.is_empty() {
            row = row.text(format!("event: {}", animation.event));
        }
        row
    }

    fn camera_mode(&mut self, keyword: Keyword, mode: CameraMode) {
        if mode != CameraMode::Always {
            self.directive(keyword, self.row().int(mode.to_int()));
        }
    }

    /// Every flexbody is followed by its `forset`; resolved node lists win
    /// over the raw ranges.
    pub(super) fn flexbodies(&mut self, module: &Module) {
        if module.flexbodies.is_empty() {
            return;
        }
        self.block(Keyword::Flexbodies);
        for flexbody in &module.flexbodies {
            let row = self
                .row()
                .node(&flexbody.reference_node)
                .node(&flexbody.x_axis_node)
                .node(&flexbody.y_axis_node)
                .floats(&[flexbody.offset.x, flexbody.offset.y, flexbody.offset.z])
                .floats(&[flexbody.rotation.x, flexbody.rotation.y, flexbody.rotation.z])
                .word(&flexbody.mesh_name);
            self.data(row);

            let items = if flexbody.node_list.is_empty() {
                range_items(&flexbody.node_list_to_import)
            } else {
                compress_node_list(&flexbody.node_list)
            };
            let row = items.into_iter().fold(self.row(), Row::text);
            self.directive(Keyword::Forset, row);
            self.camera_mode(Keyword::FlexbodyCameraMode, flexbody.camera_mode);
        }
    }

    // ─── Lights ───────────────────────────────────────────────────────────

    /// All flare flavours are written as `flares2`.
    pub(super) fn flares(&mut self, module: &Module) {
        if module.flares2.is_empty() {
            return;
        }
        self.block(Keyword::Flares2);
        for flare in &module.flares2 {
            let row = self
                .row()
                .node(&flare.reference_node)
                .node(&flare.node_axis_x)
                .node(&flare.node_axis_y)
                .floats(&[flare.offset.x, flare.offset.y, flare.offset.z])
                .opt_field(
                    flare.flare_type.letter().to_string(),
                    flare.flare_type == FlareType::Headlight,
                );
            let row = if flare.flare_type == FlareType::Dashboard {
                row.opt_text(&flare.dashboard_link)
            } else {
                row.opt_int(i64::from(flare.control_number), -1)
            };
            let row = row
                .opt_int(i64::from(flare.blink_delay_milis), -2)
                .opt_float(flare.size, -1.0)
                .opt_text(&flare.material_name);
            self.data(row);
        }
    }

    pub(super) fn material_flare_bindings(&mut self, module: &Module) {
        if module.material_flare_bindings.is_empty() {
            return;
        }
        self.block(Keyword::MaterialFlareBindings);
        for binding in &module.material_flare_bindings {
            let row = self
                .row()
                .int(binding.flare_number)
                .word(&binding.material_name);
            self.data(row);
        }
    }

    // ─── Effects ──────────────────────────────────────────────────────────

    /// The unused flag before the particle name is written as `0`.
    pub(super) fn exhausts(&mut self, module: &Module) {
        if module.exhausts.is_empty() {
            return;
        }
        self.block(Keyword::Exhausts);
        for exhaust in &module.exhausts {
            let mut row = self
                .row()
                .node(&exhaust.reference_node)
                .node(&exhaust.direction_node);
            if !exhaust.particle_name.is_empty() {
                row = row.int(0).text(exhaust.particle_name.as_str());
            }
            self.data(row);
        }
    }

    pub(super) fn particles(&mut self, module: &Module) {
        if module.particles.is_empty() {
            return;
        }
        self.block(Keyword::Particles);
        for particle in &module.particles {
            let row = self
                .row()
                .node(&particle.emitter_node)
                .node(&particle.reference_node)
                .word(&particle.particle_system_name);
            self.data(row);
        }
    }

    pub(super) fn videocameras(&mut self, module: &Module) {
        if module.videocameras.is_empty() {
            return;
        }
        self.block(Keyword::Videocamera);
        for camera in &module.videocameras {
            let row = self
                .row()
                .node(&camera.reference_node)
                .node(&camera.left_node)
                .node(&camera.bottom_node)
                .node(&camera.alt_reference_node)
                .node(&camera.alt_orientation_node)
                .floats(&[camera.offset.x, camera.offset.y, camera.offset.z])
                .floats(&[camera.rotation.x, camera.rotation.y, camera.rotation.z])
                .float(camera.field_of_view)
                .int(camera.texture_width)
                .int(camera.texture_height)
                .float(camera.min_clip_distance)
                .float(camera.max_clip_distance)
                .int(camera.camera_role)
                .int(camera.camera_mode)
                .word(&camera.material_name)
                .opt_field(camera.camera_name.as_str(), camera.camera_name.is_empty());
            self.data(row);
        }
    }

    // ─── Sound and GUI ────────────────────────────────────────────────────

    pub(super) fn soundsources(&mut self, module: &Module) {
        if !module.soundsources.is_empty() {
            self.block(Keyword::Soundsources);
            for source in &module.soundsources {
                let row = self.row().node(&source.node).word(&source.sound_script_name);
                self.data(row);
            }
        }
        if !module.soundsources2.is_empty() {
            self.block(Keyword::Soundsources2);
            for source in &module.soundsources2 {
                let row = self
                    .row()
                    .node(&source.node)
                    .int(source.mode)
                    .word(&source.sound_script_name);
                self.data(row);
            }
        }
    }

    /// One `key value` line per setting.
    pub(super) fn gui_settings(&mut self, module: &Module) {
        let Some(gui) = &module.gui_settings else {
            return;
        };
        self.block(Keyword::GuiSettings);
        let mut entries: Vec<(&str, String)> = Vec::new();
        if let Some(m) = &gui.tacho_material {
            entries.push(("tachoMaterial", m.clone()));
        }
        if let Some(m) = &gui.speedo_material {
            entries.push(("speedoMaterial", m.clone()));
        }
        if let Some(kph) = gui.speedo_highest_kph {
            entries.push(("speedoMax", kph.to_string()));
        }
        if let Some(max_rpm) = gui.use_max_rpm {
            entries.push(("useMaxRPM", u8::from(max_rpm).to_string()));
        }
        if let Some(m) = &gui.help_material {
            entries.push(("helpMaterial", m.clone()));
        }
        if let Some(mode) = gui.interactive_overview_map {
            entries.push(("interactiveOverviewMap", mode.as_str().to_string()));
        }
        entries.extend(gui.dashboard_layouts.iter().map(|l| ("dashboard", l.clone())));
        entries.extend(gui.rtt_dashboard_layouts.iter().map(|l| ("texturedashboard", l.clone())));
        for (key, value) in entries {
            self.line(&format!("\t{key} {value}"));
        }
    }
}
