//! Props, flexbodies, lights, materials, sound and the GUI blocks.
//!
//! `add_animation`, `prop_camera_mode`, `forset` and `flexbody_camera_mode`
//! are directives that patch the most recent prop or flexbody of the
//! current module instead of producing records of their own.

use super::{Parser, node_range, numbered_aero_source};
use crate::args::{Args, lenient_float};
use crate::keyword::Keyword;
use crate::model::{
    Animation, AnimationMode, AnimationSource, BeaconSpecial, CameraMode, DashboardSpecial,
    Exhaust, ExtCamera, ExtCameraMode, Flare2, FlareType, Flexbody, Globals, GuiSettings,
    ManagedMaterial, ManagedMaterialType, MapMode, MaterialFlareBinding, Minimass,
    MinimassOption, MotorSource, NamedFlag, Particle, Prop, SoundSource, SoundSource2,
    SpecialProp, Vec3, VideoCamera,
};
use crate::document::Line;
use crate::tokenizer::split_trimmed;

impl Parser<'_> {
    // ─── Props and flexbodies ────────────────────────────────────────────

    /// The mesh name picks a special kind; beacons and dashboards read
    /// extra trailing arguments.
    pub(super) fn parse_prop(&mut self, a: &Args) {
        if !a.check_count(10) {
            return;
        }
        let mesh_name = a.string(9);
        let special = SpecialProp::detect(&mesh_name);
        let mut prop = Prop {
            reference_node: a.node(0),
            x_axis_node: a.node(1),
            y_axis_node: a.node(2),
            offset: Vec3::new(a.float(3), a.float(4), a.float(5)),
            rotation: Vec3::new(a.float(6), a.float(7), a.float(8)),
            mesh_name,
            animations: Vec::new(),
            camera_mode: CameraMode::default(),
            special,
            beacon: None,
            dashboard: None,
        };
        match special {
            SpecialProp::Beacon if a.len() >= 14 => {
                prop.beacon = Some(BeaconSpecial {
                    flare_material_name: a.str(10).trim().to_string(),
                    color: [a.float(11), a.float(12), a.float(13)],
                });
            }
            SpecialProp::DashboardLeft | SpecialProp::DashboardRight if a.len() > 10 => {
                let mut dash = DashboardSpecial {
                    mesh_name: a.string(10),
                    ..DashboardSpecial::default()
                };
                if a.len() > 13 {
                    dash.offset = Vec3::new(a.float(11), a.float(12), a.float(13));
                    dash.offset_is_set = true;
                }
                if a.len() > 14 {
                    dash.rotation_angle = a.float(14);
                }
                prop.dashboard = Some(dash);
            }
            _ => {}
        }
        let index = self.append(Keyword::Props, |m| &mut m.props, prop);
        self.last_prop = Some(index);
    }

    pub(super) fn parse_flexbody(&mut self, a: &Args) {
        if !a.check_count(10) {
            return;
        }
        let flexbody = Flexbody {
            reference_node: a.node(0),
            x_axis_node: a.node(1),
            y_axis_node: a.node(2),
            offset: Vec3::new(a.float(3), a.float(4), a.float(5)),
            rotation: Vec3::new(a.float(6), a.float(7), a.float(8)),
            mesh_name: a.string(9),
            camera_mode: CameraMode::default(),
            node_list_to_import: Vec::new(),
            node_list: Vec::new(),
        };
        let index = self.append(Keyword::Flexbodies, |m| &mut m.flexbodies, flexbody);
        self.last_flexbody = Some(index);
    }

    /// `forset 1-5, 8, 10-12`: node intervals for the last flexbody.
    pub(super) fn parse_forset(&mut self, a: &Args) {
        let Some(index) = self.last_flexbody else {
            a.error("Directive 'forset' has no flexbody to update, ignoring...");
            return;
        };
        let ranges: Vec<_> = split_trimmed(a.rest_from(1), ',')
            .iter()
            .map(|item| node_range(a, item))
            .collect();
        if ranges.is_empty() {
            a.warn("Directive 'forset' lists no nodes");
        }
        self.module_mut().flexbodies[index]
            .node_list_to_import
            .extend(ranges);
    }

    pub(super) fn parse_prop_camera_mode(&mut self, a: &Args) {
        let Some(index) = self.last_prop else {
            a.error("Directive 'prop_camera_mode' found but no 'prop' defined, ignoring...");
            return;
        };
        if let Some(mode) = camera_mode(a) {
            self.module_mut().props[index].camera_mode = mode;
        }
    }

    pub(super) fn parse_flexbody_camera_mode(&mut self, a: &Args) {
        let Some(index) = self.last_flexbody else {
            a.error("No flexbody to update, ignoring...");
            return;
        };
        if let Some(mode) = camera_mode(a) {
            self.module_mut().flexbodies[index].camera_mode = mode;
        }
    }

    /// `add_animation ratio, lower, upper, item, ...` where items are mode
    /// flags or `source:`, `mode:` and `event:` clauses.
    pub(super) fn parse_add_animation(&mut self, a: &Args) {
        let Some(index) = self.last_prop else {
            a.error("Directive 'add_animation' has no prop to animate, ignoring...");
            return;
        };
        let fields = split_trimmed(a.rest_from(1), ',');
        if fields.len() < 4 {
            a.error("Not enough arguments, skipping...");
            return;
        }
        let mut animation = Animation {
            ratio: lenient_float(fields[0]),
            lower_limit: lenient_float(fields[1]),
            upper_limit: lenient_float(fields[2]),
            ..Animation::default()
        };
        for item in &fields[3..] {
            if let Err(detail) = animation_item(&mut animation, item) {
                a.warn(format!("Invalid token: {item} ({detail}) ignoring...."));
            }
        }
        self.module_mut().props[index].animations.push(animation);
    }

    // ─── Lights ──────────────────────────────────────────────────────────

    /// `flares` has no offset-Z; it keeps the default of 1.
    pub(super) fn parse_flare(&mut self, a: &Args, block: Keyword) {
        let has_z = block != Keyword::Flares;
        if !a.check_count(if has_z { 6 } else { 5 }) {
            return;
        }
        let mut flare = Flare2 {
            reference_node: a.node(0),
            node_axis_x: a.node(1),
            node_axis_y: a.node(2),
            ..Flare2::default()
        };
        flare.offset.x = a.float(3);
        flare.offset.y = a.float(4);
        let mut pos = 5;
        if has_z {
            flare.offset.z = a.float(5);
            pos = 6;
        }
        if a.len() > pos {
            flare.flare_type = a.flare_type(pos);
            pos += 1;
        }
        if a.len() > pos {
            if flare.flare_type == FlareType::Dashboard {
                flare.dashboard_link = a.string(pos);
            } else {
                flare.control_number = a.int(pos);
            }
            pos += 1;
        }
        if a.len() > pos {
            flare.blink_delay_milis = a.int(pos);
            pos += 1;
        }
        if a.len() > pos {
            flare.size = a.float(pos);
            pos += 1;
        }
        if a.len() > pos {
            flare.material_name = a.string(pos);
        }
        self.append(block, |m| &mut m.flares2, flare);
    }

    pub(super) fn parse_material_flare_binding(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let binding = MaterialFlareBinding {
            flare_number: a.uint(0),
            material_name: a.string(1),
        };
        self.append(Keyword::MaterialFlareBindings, |m| &mut m.material_flare_bindings, binding);
    }

    // ─── Materials and effects ───────────────────────────────────────────

    /// Mesh types take a diffuse and an optional specular map; flexmesh
    /// types add an optional damaged diffuse map in between.
    pub(super) fn parse_managed_material(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let type_name = a.str(1);
        let Some(material_type) = ManagedMaterialType::parse(type_name) else {
            a.warn(format!("{type_name} is an unknown effect"));
            return;
        };
        if !a.check_count(3) {
            return;
        }
        let mut material = ManagedMaterial {
            name: a.string(0),
            material_type,
            options: self.defaults.managed_material_options,
            diffuse_map: a.string(2),
            damaged_diffuse_map: String::new(),
            specular_map: String::new(),
        };
        if material_type.is_flexmesh() {
            if a.len() > 3 {
                material.damaged_diffuse_map = a.managed_tex(3);
            }
            if a.len() > 4 {
                material.specular_map = a.managed_tex(4);
            }
        } else if a.len() > 3 {
            material.specular_map = a.managed_tex(3);
        }
        self.append(Keyword::ManagedMaterials, |m| &mut m.managed_materials, material);
    }

    /// Argument 2 is an unused legacy flag; the particle name sits at 3.
    pub(super) fn parse_exhaust(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let exhaust = Exhaust {
            reference_node: a.node(0),
            direction_node: a.node(1),
            particle_name: if a.len() > 3 { a.string(3) } else { String::new() },
        };
        self.append(Keyword::Exhausts, |m| &mut m.exhausts, exhaust);
    }

    pub(super) fn parse_particle(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let particle = Particle {
            emitter_node: a.node(0),
            reference_node: a.node(1),
            particle_system_name: a.string(2),
        };
        self.append(Keyword::Particles, |m| &mut m.particles, particle);
    }

    pub(super) fn parse_videocamera(&mut self, a: &Args) {
        if !a.check_count(19) {
            return;
        }
        let camera = VideoCamera {
            reference_node: a.node(0),
            left_node: a.node(1),
            bottom_node: a.node(2),
            alt_reference_node: a.nullable_node(3),
            alt_orientation_node: a.nullable_node(4),
            offset: Vec3::new(a.float(5), a.float(6), a.float(7)),
            rotation: Vec3::new(a.float(8), a.float(9), a.float(10)),
            field_of_view: a.float(11),
            texture_width: a.uint(12),
            texture_height: a.uint(13),
            min_clip_distance: a.float(14),
            max_clip_distance: a.float(15),
            camera_role: a.int(16),
            camera_mode: a.int(17),
            material_name: a.string(18),
            camera_name: if a.len() > 19 { a.string(19) } else { String::new() },
        };
        self.append(Keyword::Videocamera, |m| &mut m.videocameras, camera);
    }

    // ─── Sound ───────────────────────────────────────────────────────────

    pub(super) fn parse_soundsource(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let source = SoundSource {
            node: a.node(0),
            sound_script_name: a.string(1),
        };
        self.append(Keyword::Soundsources, |m| &mut m.soundsources, source);
    }

    pub(super) fn parse_soundsource2(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let mut mode = a.int(1);
        if mode < SoundSource2::MODE_ALWAYS {
            a.error(format!(
                "{} is invalid soundsources2.mode, falling back to default -2",
                a.str(1)
            ));
            mode = SoundSource2::MODE_ALWAYS;
        }
        let source = SoundSource2 {
            node: a.node(0),
            mode,
            sound_script_name: a.string(2),
        };
        self.append(Keyword::Soundsources2, |m| &mut m.soundsources2, source);
    }

    // ─── GUI and metadata blocks ─────────────────────────────────────────

    /// `key value` lines accumulating into one settings record.
    pub(super) fn parse_gui_settings(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let key = a.str(0);
        let value = a.str(1);
        let module = self.module_mut();
        if module.gui_settings.is_none() {
            module.lines.push(Line::data(Keyword::GuiSettings, 0));
        }
        let settings = module.gui_settings.get_or_insert_with(GuiSettings::default);
        match key {
            "debugBeams" => {}
            "tachoMaterial" => settings.tacho_material = Some(value.to_string()),
            "speedoMaterial" => settings.speedo_material = Some(value.to_string()),
            "speedoMax" => settings.speedo_highest_kph = Some(a.int(1)),
            "useMaxRPM" => settings.use_max_rpm = Some(a.int(1) == 1),
            "helpMaterial" => settings.help_material = Some(value.to_string()),
            "dashboard" => settings.dashboard_layouts.push(value.to_string()),
            "texturedashboard" => settings.rtt_dashboard_layouts.push(value.to_string()),
            "interactiveOverviewMap" => match MapMode::parse(value) {
                Some(mode) => settings.interactive_overview_map = Some(mode),
                None => a.error(format!("Unknown map mode [{value}], ignoring...")),
            },
            _ => a.error(format!("Unknown setting [{key}], ignoring...")),
        }
    }

    /// The first `globals` line of a module wins.
    pub(super) fn parse_globals(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        if self.module_mut().globals.is_some() {
            a.warn("Multiple sections 'globals' in one module, using the first one found.");
            return;
        }
        let globals = Globals {
            dry_mass: a.float(0),
            cargo_mass: a.float(1),
            material_name: if a.len() > 2 { a.string(2) } else { String::new() },
        };
        let module = self.module_mut();
        module.globals = Some(globals);
        module.lines.push(Line::data(Keyword::Globals, 0));
    }

    /// The whole line is the panel material name.
    pub(super) fn parse_help(&mut self, a: &Args) {
        let name = a.line().trim().to_string();
        self.set_single(Keyword::Help, a, |m| &mut m.help_panel_material_name, name);
    }

    /// `minimass <mass> [options]`; `l` skips nodes with a load weight.
    pub(super) fn parse_minimass(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        if self.module_mut().minimass.is_some() {
            a.warn("Multiple lines of 'minimass', ignoring...");
            return;
        }
        let mut minimass = Minimass {
            global_min_mass: a.float(0),
            option: MinimassOption::None,
        };
        if let Some(options) = a.get(1) {
            for c in options.chars() {
                match c {
                    'n' => {}
                    'l' => minimass.option = MinimassOption::SkipLoaded,
                    other => a.warn(format!("Unknown option: {other}")),
                }
            }
        }
        let module = self.module_mut();
        module.minimass = Some(minimass);
        module.lines.push(Line::data(Keyword::Minimass, 0));
    }

    /// `extcamera classic|cinecam|node <node>`.
    pub(super) fn parse_ext_camera(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let mut camera = ExtCamera::default();
        match a.str(1) {
            "classic" => {}
            "cinecam" => camera.mode = ExtCameraMode::Cinecam,
            "node" if a.len() > 2 => {
                camera.mode = ExtCameraMode::Node;
                camera.node = Some(a.node(2));
            }
            "node" => a.warn("Mode 'node' requires a node, using 'classic'"),
            other => a.warn(format!("Invalid extcamera mode '{other}', using 'classic'")),
        }
        self.set_single(Keyword::ExtCamera, a, |m| &mut m.ext_camera, camera);
    }
}

/// `-2` always, `-1` external only, otherwise a cinecam index.
fn camera_mode(a: &Args) -> Option<CameraMode> {
    if !a.check_count(2) {
        return None;
    }
    let value = a.int(1);
    let mode = CameraMode::from_int(i64::from(value));
    if mode.is_none() {
        a.error(format!("Invalid value of camera setting ({value}), ignoring..."));
    }
    mode
}

/// Apply one `add_animation` item; `Err` carries the reason for the warning.
fn animation_item(animation: &mut Animation, item: &str) -> Result<(), String> {
    let Some((key, value)) = item.split_once(':') else {
        let flag = match item {
            "autoanimate" => AnimationMode::AutoAnimate,
            "noflip" => AnimationMode::NoFlip,
            "bounce" => AnimationMode::Bounce,
            "eventlock" => AnimationMode::EventLock,
            _ => return Err(format!("Invalid keyword: {item}")),
        };
        animation.mode |= flag.bit();
        return Ok(());
    };
    let value = value.trim();
    match key.trim() {
        "mode" => {
            for token in split_trimmed(value, '|') {
                match AnimationMode::from_name(token) {
                    Some(
                        mode @ (AnimationMode::RotationX
                        | AnimationMode::RotationY
                        | AnimationMode::RotationZ
                        | AnimationMode::OffsetX
                        | AnimationMode::OffsetY
                        | AnimationMode::OffsetZ),
                    ) => animation.mode |= mode.bit(),
                    _ => return Err(format!("Invalid 'mode': {token}, ignoring...")),
                }
            }
        }
        "event" => animation.event = value.to_uppercase(),
        "source" => {
            for token in split_trimmed(value, '|') {
                if let Some(source) = AnimationSource::parse(token) {
                    animation.source |= source.bit();
                } else if let Some((source, motor)) = numbered_aero_source(token) {
                    animation.motor_sources.push(MotorSource { source, motor });
                } else {
                    return Err(format!("Invalid 'source': {token}, ignoring..."));
                }
            }
        }
        other => return Err(format!("Invalid keyword: {other}, ignoring...")),
    }
    Ok(())
}
