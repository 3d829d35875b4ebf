//! The parsed document: metadata, modules and their record vectors.
//!
//! A document always has a root module named [`ROOT_MODULE_NAME`]. Alternate
//! modules (`section <ver> <name>` ... `end_section`) are kept in insertion
//! order and looked up by name.

use crate::keyword::Keyword;
use crate::model::*;
use crate::node::NodeRef;
use serde::{Deserialize, Serialize};

/// Reserved name of the root module.
pub const ROOT_MODULE_NAME: &str = "_Root_";

/// One entry of a module's line-order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub keyword: Keyword,
    /// Offset into the keyword's record vector, `None` for headers and
    /// directives that produce no record.
    pub data_index: Option<usize>,
    pub is_block_boundary: bool,
}

impl Line {
    #[must_use]
    pub fn boundary(keyword: Keyword) -> Self {
        Self {
            keyword,
            data_index: None,
            is_block_boundary: true,
        }
    }

    #[must_use]
    pub fn data(keyword: Keyword, index: usize) -> Self {
        Self {
            keyword,
            data_index: Some(index),
            is_block_boundary: false,
        }
    }

    #[must_use]
    pub fn directive(keyword: Keyword) -> Self {
        Self {
            keyword,
            data_index: None,
            is_block_boundary: false,
        }
    }
}

// ─── Module ──────────────────────────────────────────────────────────────

/// A named container of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub lines: Vec<Line>,

    // Structure
    /// `nodes` and `nodes2` share this vector; the id variant tells them apart.
    pub nodes: Vec<Node>,
    pub beams: Vec<Beam>,
    pub shocks: Vec<Shock>,
    pub shocks2: Vec<Shock2>,
    pub shocks3: Vec<Shock3>,
    pub hydros: Vec<Hydro>,
    /// `commands` and `commands2`; see [`Command2::format_version`].
    pub commands2: Vec<Command2>,
    pub animators: Vec<Animator>,
    pub triggers: Vec<Trigger>,
    pub ties: Vec<Tie>,
    pub ropes: Vec<Rope>,
    pub ropables: Vec<Ropable>,
    pub fixes: Vec<NodeRef>,
    pub contacters: Vec<NodeRef>,
    pub slidenodes: Vec<SlideNode>,
    pub railgroups: Vec<RailGroup>,
    pub lockgroups: Vec<Lockgroup>,
    pub hooks: Vec<Hook>,
    pub rotators: Vec<Rotator>,
    pub rotators2: Vec<Rotator2>,
    pub submeshes: Vec<Submesh>,
    pub camera_rails: Vec<CameraRail>,
    pub collision_boxes: Vec<CollisionBox>,
    pub cameras: Vec<Camera>,
    pub cinecams: Vec<Cinecam>,

    // Wheels
    pub wheels: Vec<Wheel>,
    pub wheels2: Vec<Wheel2>,
    pub mesh_wheels: Vec<MeshWheel>,
    pub mesh_wheels2: Vec<MeshWheel>,
    pub flex_body_wheels: Vec<FlexBodyWheel>,
    pub wheel_detachers: Vec<WheelDetacher>,

    // Drivetrain
    pub engine: Option<Engine>,
    pub engoption: Option<Engoption>,
    pub engturbo: Option<Engturbo>,
    pub torque_curve: Option<TorqueCurve>,
    pub brakes: Option<Brakes>,
    pub anti_lock_brakes: Option<AntiLockBrakes>,
    pub traction_control: Option<TractionControl>,
    pub slope_brake: Option<SlopeBrake>,
    pub cruise_control: Option<CruiseControl>,
    pub speed_limiter: Option<SpeedLimiter>,
    pub axles: Vec<Axle>,
    pub interaxles: Vec<InterAxle>,
    pub transfer_case: Option<TransferCase>,

    // Aerial and marine
    pub wings: Vec<Wing>,
    pub airbrakes: Vec<Airbrake>,
    /// `turboprops` and `turboprops2`.
    pub turboprops2: Vec<Turboprop2>,
    pub pistonprops: Vec<Pistonprop>,
    pub turbojets: Vec<Turbojet>,
    pub fusedrag: Vec<Fusedrag>,
    pub screwprops: Vec<Screwprop>,

    // Visuals and audio
    pub props: Vec<Prop>,
    pub flexbodies: Vec<Flexbody>,
    /// `flares`, `flares2` and `flares3`.
    pub flares2: Vec<Flare2>,
    pub material_flare_bindings: Vec<MaterialFlareBinding>,
    pub managed_materials: Vec<ManagedMaterial>,
    pub exhausts: Vec<Exhaust>,
    pub particles: Vec<Particle>,
    pub videocameras: Vec<VideoCamera>,
    pub soundsources: Vec<SoundSource>,
    pub soundsources2: Vec<SoundSource2>,
    pub gui_settings: Option<GuiSettings>,
    pub ext_camera: Option<ExtCamera>,
    pub skeleton_settings: Option<SkeletonSettings>,
    pub help_panel_material_name: Option<String>,

    // Metadata-like per module
    pub globals: Option<Globals>,
    pub minimass: Option<Minimass>,
    pub collision_range: Option<f32>,
    pub submesh_groundmodel: Option<String>,
    pub shadow_mode: Option<i32>,
}

impl Module {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.name == ROOT_MODULE_NAME
    }

    /// Number of records stored under `keyword`. Keywords whose records
    /// share a vector (e.g. `flares`/`flares2`) report the shared length.
    #[must_use]
    pub fn record_count(&self, keyword: Keyword) -> usize {
        let opt = |present: bool| usize::from(present);
        match keyword {
            Keyword::Nodes | Keyword::Nodes2 => self.nodes.len(),
            Keyword::Beams => self.beams.len(),
            Keyword::Shocks => self.shocks.len(),
            Keyword::Shocks2 => self.shocks2.len(),
            Keyword::Shocks3 => self.shocks3.len(),
            Keyword::Hydros => self.hydros.len(),
            Keyword::Commands | Keyword::Commands2 => self.commands2.len(),
            Keyword::Animators => self.animators.len(),
            Keyword::Triggers => self.triggers.len(),
            Keyword::Ties => self.ties.len(),
            Keyword::Ropes => self.ropes.len(),
            Keyword::Ropables => self.ropables.len(),
            Keyword::Fixes => self.fixes.len(),
            Keyword::Contacters => self.contacters.len(),
            Keyword::Slidenodes => self.slidenodes.len(),
            Keyword::Railgroups => self.railgroups.len(),
            Keyword::Lockgroups => self.lockgroups.len(),
            Keyword::Hooks => self.hooks.len(),
            Keyword::Rotators => self.rotators.len(),
            Keyword::Rotators2 => self.rotators2.len(),
            Keyword::Submesh => self.submeshes.len(),
            Keyword::Camerarail => self.camera_rails.len(),
            Keyword::Collisionboxes => self.collision_boxes.len(),
            Keyword::Cameras => self.cameras.len(),
            Keyword::Cinecam => self.cinecams.len(),
            Keyword::Wheels => self.wheels.len(),
            Keyword::Wheels2 => self.wheels2.len(),
            Keyword::Meshwheels => self.mesh_wheels.len(),
            Keyword::Meshwheels2 => self.mesh_wheels2.len(),
            Keyword::Flexbodywheels => self.flex_body_wheels.len(),
            Keyword::Wheeldetachers => self.wheel_detachers.len(),
            Keyword::Engine => opt(self.engine.is_some()),
            Keyword::Engoption => opt(self.engoption.is_some()),
            Keyword::Engturbo => opt(self.engturbo.is_some()),
            Keyword::Torquecurve => opt(self.torque_curve.is_some()),
            Keyword::Brakes => opt(self.brakes.is_some()),
            Keyword::AntiLockBrakes => opt(self.anti_lock_brakes.is_some()),
            Keyword::TractionControl => opt(self.traction_control.is_some()),
            Keyword::SlopeBrake => opt(self.slope_brake.is_some()),
            Keyword::CruiseControl => opt(self.cruise_control.is_some()),
            Keyword::SpeedLimiter => opt(self.speed_limiter.is_some()),
            Keyword::Axles => self.axles.len(),
            Keyword::Interaxles => self.interaxles.len(),
            Keyword::Transfercase => opt(self.transfer_case.is_some()),
            Keyword::Wings => self.wings.len(),
            Keyword::Airbrakes => self.airbrakes.len(),
            Keyword::Turboprops | Keyword::Turboprops2 => self.turboprops2.len(),
            Keyword::Pistonprops => self.pistonprops.len(),
            Keyword::Turbojets => self.turbojets.len(),
            Keyword::Fusedrag => self.fusedrag.len(),
            Keyword::Screwprops => self.screwprops.len(),
            Keyword::Props => self.props.len(),
            Keyword::Flexbodies => self.flexbodies.len(),
            Keyword::Flares | Keyword::Flares2 | Keyword::Flares3 => self.flares2.len(),
            Keyword::MaterialFlareBindings => self.material_flare_bindings.len(),
            Keyword::ManagedMaterials => self.managed_materials.len(),
            Keyword::Exhausts => self.exhausts.len(),
            Keyword::Particles => self.particles.len(),
            Keyword::Videocamera => self.videocameras.len(),
            Keyword::Soundsources => self.soundsources.len(),
            Keyword::Soundsources2 => self.soundsources2.len(),
            Keyword::GuiSettings => opt(self.gui_settings.is_some()),
            Keyword::ExtCamera => opt(self.ext_camera.is_some()),
            Keyword::SetSkeletonSettings => opt(self.skeleton_settings.is_some()),
            Keyword::Help => opt(self.help_panel_material_name.is_some()),
            Keyword::Globals => opt(self.globals.is_some()),
            Keyword::Minimass => opt(self.minimass.is_some()),
            _ => 0,
        }
    }

    /// Nodes declared in `nodes` (numbered ids).
    pub fn numbered_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.id.is_named())
    }

    /// Nodes declared in `nodes2` (named ids).
    pub fn named_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.id.is_named())
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// Document-wide switches set by argument-less directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFlags {
    pub hide_in_chooser: bool,
    pub enable_advanced_deformation: bool,
    pub disable_default_sounds: bool,
    pub forward_commands: bool,
    pub import_commands: bool,
    pub lockgroup_default_nolock: bool,
    pub rescuer: bool,
    pub rollon: bool,
    pub slide_nodes_connect_instantly: bool,
}

impl DocumentFlags {
    /// Set the flag that belongs to `keyword`. Returns false for other keywords.
    pub fn set(&mut self, keyword: Keyword) -> bool {
        let flag = match keyword {
            Keyword::HideInChooser => &mut self.hide_in_chooser,
            Keyword::EnableAdvancedDeformation => &mut self.enable_advanced_deformation,
            Keyword::DisableDefaultSounds => &mut self.disable_default_sounds,
            Keyword::ForwardCommands => &mut self.forward_commands,
            Keyword::ImportCommands => &mut self.import_commands,
            Keyword::LockgroupDefaultNolock => &mut self.lockgroup_default_nolock,
            Keyword::Rescuer => &mut self.rescuer,
            Keyword::Rollon => &mut self.rollon,
            Keyword::SlidenodeConnectInstantly => &mut self.slide_nodes_connect_instantly,
            _ => return false,
        };
        *flag = true;
        true
    }

    /// Keywords of the flags that are set, in canonical order.
    #[must_use]
    pub fn keywords(&self) -> Vec<Keyword> {
        [
            (self.hide_in_chooser, Keyword::HideInChooser),
            (self.enable_advanced_deformation, Keyword::EnableAdvancedDeformation),
            (self.disable_default_sounds, Keyword::DisableDefaultSounds),
            (self.forward_commands, Keyword::ForwardCommands),
            (self.import_commands, Keyword::ImportCommands),
            (self.lockgroup_default_nolock, Keyword::LockgroupDefaultNolock),
            (self.rescuer, Keyword::Rescuer),
            (self.rollon, Keyword::Rollon),
            (self.slide_nodes_connect_instantly, Keyword::SlidenodeConnectInstantly),
        ]
        .into_iter()
        .filter_map(|(set, kw)| set.then_some(kw))
        .collect()
    }
}

/// The aggregate output of one parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub hash: String,
    pub description: Vec<String>,
    pub authors: Vec<Author>,
    pub file_info: Option<FileInfo>,
    pub guid: String,
    pub file_format_version: u32,
    pub flags: DocumentFlags,
    pub root: Module,
    /// Alternate modules in the order they were first opened.
    pub user_modules: Vec<Module>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            name: String::new(),
            hash: String::new(),
            description: Vec::new(),
            authors: Vec::new(),
            file_info: None,
            guid: String::new(),
            file_format_version: 0,
            flags: DocumentFlags::default(),
            root: Module::new(ROOT_MODULE_NAME),
            user_modules: Vec::new(),
        }
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a module by name; the root answers to [`ROOT_MODULE_NAME`].
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        if name == ROOT_MODULE_NAME {
            return Some(&self.root);
        }
        self.user_modules.iter().find(|m| m.name == name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        if name == ROOT_MODULE_NAME {
            return Some(&mut self.root);
        }
        self.user_modules.iter_mut().find(|m| m.name == name)
    }

    /// Position of a user module, creating it when absent.
    pub fn user_module_index(&mut self, name: &str) -> usize {
        if let Some(i) = self.user_modules.iter().position(|m| m.name == name) {
            return i;
        }
        self.user_modules.push(Module::new(name));
        self.user_modules.len() - 1
    }

    /// Root first, then user modules in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        std::iter::once(&self.root).chain(self.user_modules.iter())
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        std::iter::once(&mut self.root).chain(self.user_modules.iter_mut())
    }

    /// Pretty JSON dump of the whole document.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_module_is_always_present() {
        let doc = Document::new();
        assert!(doc.root.is_root());
        assert!(doc.module(ROOT_MODULE_NAME).is_some());
        assert!(doc.module("alt").is_none());
    }

    #[test]
    fn user_modules_are_reused_by_name() {
        let mut doc = Document::new();
        let a = doc.user_module_index("alt");
        let b = doc.user_module_index("other");
        assert_eq!(doc.user_module_index("alt"), a);
        assert_ne!(a, b);
        let names: Vec<&str> = doc.modules().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["_Root_", "alt", "other"]);
    }

    #[test]
    fn flags_round_trip_through_keywords() {
        let mut flags = DocumentFlags::default();
        assert!(flags.set(Keyword::Rollon));
        assert!(flags.set(Keyword::HideInChooser));
        assert!(!flags.set(Keyword::Beams));
        assert_eq!(flags.keywords(), vec![Keyword::HideInChooser, Keyword::Rollon]);
    }

    #[test]
    fn record_count_shares_vectors() {
        let mut m = Module::new("x");
        m.fixes.push(NodeRef::regular("1", 1));
        assert_eq!(m.record_count(Keyword::Fixes), 1);
        assert_eq!(m.record_count(Keyword::Flares), m.record_count(Keyword::Flares2));
        assert_eq!(m.record_count(Keyword::Engine), 0);
    }
}
