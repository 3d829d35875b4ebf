//! Ambient defaults.
//!
//! Directives such as `set_beam_defaults` replace the active snapshot; every
//! record parsed afterwards captures a shared handle to it. Snapshots are
//! never mutated after creation, so handle identity (`Rc::ptr_eq`) tells the
//! serializer which records were written under the same directive.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ─── Built-in values ─────────────────────────────────────────────────────

pub const DEFAULT_SPRING: f32 = 9_000_000.0;
pub const DEFAULT_DAMP: f32 = 12_000.0;
pub const BEAM_DEFORM: f32 = 400_000.0;
pub const BEAM_BREAK: f32 = 1_000_000.0;
pub const DEFAULT_BEAM_DIAMETER: f32 = 0.05;
pub const BEAM_SKELETON_DIAMETER: f32 = 0.01;
pub const DEFAULT_MINIMASS: f32 = 50.0;
pub const DEFAULT_COLLISION_RANGE: f32 = 0.02;
pub const DEFAULT_SKELETON_VISIBILITY: f32 = 150.0;
pub const DEFAULT_BEAM_MATERIAL: &str = "tracks/beam";

// ─── Beam defaults ───────────────────────────────────────────────────────

/// Multipliers applied on top of [`BeamDefaults`]; set by `set_beam_defaults_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamDefaultsScale {
    pub springiness: f32,
    pub damping_constant: f32,
    pub deformation_threshold: f32,
    pub breaking_threshold: f32,
}

impl Default for BeamDefaultsScale {
    fn default() -> Self {
        Self {
            springiness: 1.0,
            damping_constant: 1.0,
            deformation_threshold: 1.0,
            breaking_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamDefaults {
    pub springiness: f32,
    pub damping_constant: f32,
    pub deformation_threshold: f32,
    pub breaking_threshold: f32,
    pub visual_beam_diameter: f32,
    pub beam_material_name: String,
    pub plastic_deform_coef: f32,
    /// State of `enable_advanced_deformation` when the directive was read.
    pub enable_advanced_deformation: bool,
    pub is_plastic_deform_coef_user_defined: bool,
    /// Set by `set_beam_defaults`; the built-in snapshot and scale-only
    /// snapshots derived from it stay `false`.
    pub is_user_defined: bool,
    pub scale: BeamDefaultsScale,
}

impl Default for BeamDefaults {
    fn default() -> Self {
        Self {
            springiness: DEFAULT_SPRING,
            damping_constant: DEFAULT_DAMP,
            deformation_threshold: BEAM_DEFORM,
            breaking_threshold: BEAM_BREAK,
            visual_beam_diameter: DEFAULT_BEAM_DIAMETER,
            beam_material_name: DEFAULT_BEAM_MATERIAL.to_string(),
            plastic_deform_coef: 0.0,
            enable_advanced_deformation: false,
            is_plastic_deform_coef_user_defined: false,
            is_user_defined: false,
            scale: BeamDefaultsScale::default(),
        }
    }
}

/// Arguments of one `set_beam_defaults` line; `None` means omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeamDefaultsArgs {
    pub springiness: f32,
    pub damping_constant: Option<f32>,
    pub deformation_threshold: Option<f32>,
    pub breaking_threshold: Option<f32>,
    pub visual_beam_diameter: Option<f32>,
    pub beam_material_name: Option<String>,
    pub plastic_deform_coef: Option<f32>,
}

/// Arguments of one `set_beam_defaults_scale` line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeamScaleArgs {
    pub springiness: f32,
    pub damping_constant: Option<f32>,
    pub deformation_threshold: Option<f32>,
    pub breaking_threshold: Option<f32>,
}

// ─── Node defaults ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    /// Negative means "use the simulator's own default".
    pub load_weight: f32,
    pub friction: f32,
    pub volume: f32,
    pub surface: f32,
    /// Node option bits, see [`crate::model::NodeOption`].
    pub options: u32,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            load_weight: -1.0,
            friction: 1.0,
            volume: 1.0,
            surface: 1.0,
            options: 0,
        }
    }
}

/// Arguments of one `set_node_defaults` line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeDefaultsArgs {
    pub load_weight: f32,
    pub friction: Option<f32>,
    pub volume: Option<f32>,
    pub surface: Option<f32>,
    pub options: Option<u32>,
}

// ─── Inertia ─────────────────────────────────────────────────────────────

/// Start/stop smoothing for commands, hydros and rotators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inertia {
    pub start_delay_factor: f32,
    pub stop_delay_factor: f32,
    pub start_function: String,
    pub stop_function: String,
}

impl Inertia {
    /// True when nothing was written on the line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Arguments of one `set_inertia_defaults` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InertiaArgs {
    pub start_delay_factor: f32,
    pub stop_delay_factor: Option<f32>,
    pub start_function: Option<String>,
    pub stop_function: Option<String>,
}

// ─── Scalars ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultMinimass {
    pub min_mass: f32,
}

impl Default for DefaultMinimass {
    fn default() -> Self {
        Self {
            min_mass: DEFAULT_MINIMASS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedMaterialOptions {
    pub double_sided: bool,
}

// ─── Active state ────────────────────────────────────────────────────────

/// The ambient values in effect at the current line.
#[derive(Debug, Clone)]
pub struct DefaultsState {
    pub beam: Rc<BeamDefaults>,
    pub node: Rc<NodeDefaults>,
    pub inertia: Rc<Inertia>,
    pub minimass: Rc<DefaultMinimass>,
    pub detacher_group: i32,
    pub managed_material_options: ManagedMaterialOptions,
    builtin_beam: Rc<BeamDefaults>,
    builtin_node: Rc<NodeDefaults>,
    builtin_inertia: Rc<Inertia>,
}

impl Default for DefaultsState {
    fn default() -> Self {
        let builtin_beam = Rc::new(BeamDefaults::default());
        let builtin_node = Rc::new(NodeDefaults::default());
        let builtin_inertia = Rc::new(Inertia::default());
        Self {
            beam: Rc::clone(&builtin_beam),
            node: Rc::clone(&builtin_node),
            inertia: Rc::clone(&builtin_inertia),
            minimass: Rc::new(DefaultMinimass::default()),
            detacher_group: 0,
            managed_material_options: ManagedMaterialOptions::default(),
            builtin_beam,
            builtin_node,
            builtin_inertia,
        }
    }
}

impl DefaultsState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builtin_beam(&self) -> &Rc<BeamDefaults> {
        &self.builtin_beam
    }

    #[must_use]
    pub fn builtin_node(&self) -> &Rc<NodeDefaults> {
        &self.builtin_node
    }

    #[must_use]
    pub fn builtin_inertia(&self) -> &Rc<Inertia> {
        &self.builtin_inertia
    }

    /// `set_beam_defaults`: a new user-defined snapshot. The scale carries over.
    pub fn set_beam_defaults(&mut self, args: BeamDefaultsArgs, advanced_deformation: bool) {
        let mut d = BeamDefaults::clone(&self.beam);
        d.enable_advanced_deformation = advanced_deformation;
        d.is_user_defined = true;
        d.springiness = args.springiness;
        if let Some(v) = args.damping_constant {
            d.damping_constant = v;
        }
        if let Some(v) = args.deformation_threshold {
            d.deformation_threshold = v;
        }
        if let Some(v) = args.breaking_threshold {
            d.breaking_threshold = v;
        }
        if let Some(v) = args.visual_beam_diameter {
            d.visual_beam_diameter = v;
        }
        if let Some(name) = args.beam_material_name {
            d.beam_material_name = name;
        }
        if let Some(v) = args.plastic_deform_coef {
            d.plastic_deform_coef = v;
            d.is_plastic_deform_coef_user_defined = true;
        }
        if d.springiness < 0.0 {
            d.springiness = DEFAULT_SPRING;
        }
        if d.damping_constant < 0.0 {
            d.damping_constant = DEFAULT_DAMP;
        }
        if d.deformation_threshold < 0.0 {
            d.deformation_threshold = BEAM_DEFORM;
        }
        if d.breaking_threshold < 0.0 {
            d.breaking_threshold = BEAM_BREAK;
        }
        if d.visual_beam_diameter < 0.0 {
            d.visual_beam_diameter = DEFAULT_BEAM_DIAMETER;
        }
        self.beam = Rc::new(d);
    }

    /// `set_beam_defaults_scale`: copy the active snapshot with a new scale.
    pub fn set_beam_defaults_scale(&mut self, args: BeamScaleArgs) {
        let mut d = BeamDefaults::clone(&self.beam);
        d.scale.springiness = args.springiness;
        if let Some(v) = args.damping_constant {
            d.scale.damping_constant = v;
            if let Some(v) = args.deformation_threshold {
                d.scale.deformation_threshold = v;
                if let Some(v) = args.breaking_threshold {
                    d.scale.breaking_threshold = v;
                }
            }
        }
        self.beam = Rc::new(d);
    }

    /// `set_node_defaults`: a fresh snapshot; negative or omitted values take built-ins.
    pub fn set_node_defaults(&mut self, args: NodeDefaultsArgs) {
        let builtin = &self.builtin_node;
        let pick = |v: Option<f32>, fallback: f32| match v {
            Some(v) if v >= 0.0 => v,
            _ => fallback,
        };
        let d = NodeDefaults {
            load_weight: pick(Some(args.load_weight), builtin.load_weight),
            friction: pick(args.friction, builtin.friction),
            volume: pick(args.volume, builtin.volume),
            surface: pick(args.surface, builtin.surface),
            options: args.options.unwrap_or(0),
        };
        self.node = Rc::new(d);
    }

    /// `set_inertia_defaults`: any negative delay restores the built-in handle.
    pub fn set_inertia_defaults(&mut self, args: InertiaArgs) {
        let stop = args.stop_delay_factor.unwrap_or(0.0);
        if args.start_delay_factor < 0.0 || stop < 0.0 {
            self.inertia = Rc::clone(&self.builtin_inertia);
            return;
        }
        let mut d = Inertia::clone(&self.inertia);
        d.start_delay_factor = args.start_delay_factor;
        d.stop_delay_factor = stop;
        if let Some(f) = args.start_function {
            d.start_function = f;
            if let Some(f) = args.stop_function {
                d.stop_function = f;
            }
        }
        self.inertia = Rc::new(d);
    }

    pub fn set_default_minimass(&mut self, min_mass: f32) {
        self.minimass = Rc::new(DefaultMinimass { min_mass });
    }

    /// `detacher_group end` resets to the global group.
    pub fn set_detacher_group(&mut self, group: Option<i32>) {
        self.detacher_group = group.unwrap_or(0);
    }

    pub fn set_managed_material_options(&mut self, double_sided: bool) {
        self.managed_material_options = ManagedMaterialOptions { double_sided };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_handles_are_builtins() {
        let s = DefaultsState::new();
        assert!(Rc::ptr_eq(&s.beam, s.builtin_beam()));
        assert!(Rc::ptr_eq(&s.node, s.builtin_node()));
        assert!(Rc::ptr_eq(&s.inertia, s.builtin_inertia()));
        assert!(!s.beam.is_user_defined);
    }

    #[test]
    fn beam_defaults_negative_values_take_builtins() {
        let mut s = DefaultsState::new();
        s.set_beam_defaults(
            BeamDefaultsArgs {
                springiness: -1.0,
                damping_constant: Some(500.0),
                deformation_threshold: Some(-1.0),
                visual_beam_diameter: Some(-1.0),
                plastic_deform_coef: Some(0.3),
                ..Default::default()
            },
            true,
        );
        assert_eq!(s.beam.springiness, DEFAULT_SPRING);
        assert_eq!(s.beam.damping_constant, 500.0);
        assert_eq!(s.beam.deformation_threshold, BEAM_DEFORM);
        assert_eq!(s.beam.breaking_threshold, BEAM_BREAK);
        assert_eq!(s.beam.visual_beam_diameter, DEFAULT_BEAM_DIAMETER);
        assert!(s.beam.is_user_defined);
        assert!(s.beam.enable_advanced_deformation);
        assert!(s.beam.is_plastic_deform_coef_user_defined);
    }

    #[test]
    fn each_directive_allocates_a_new_snapshot() {
        let mut s = DefaultsState::new();
        s.set_beam_defaults(BeamDefaultsArgs { springiness: 1.0, ..Default::default() }, false);
        let first = Rc::clone(&s.beam);
        s.set_beam_defaults(BeamDefaultsArgs { springiness: 1.0, ..Default::default() }, false);
        assert!(!Rc::ptr_eq(&first, &s.beam));
        assert_eq!(*first, *s.beam);
    }

    #[test]
    fn scale_accumulates_into_later_beam_defaults() {
        let mut s = DefaultsState::new();
        s.set_beam_defaults_scale(BeamScaleArgs {
            springiness: 2.0,
            damping_constant: Some(3.0),
            ..Default::default()
        });
        assert!(!s.beam.is_user_defined);
        s.set_beam_defaults(BeamDefaultsArgs { springiness: 10.0, ..Default::default() }, false);
        assert_eq!(s.beam.scale.springiness, 2.0);
        assert_eq!(s.beam.scale.damping_constant, 3.0);
        assert_eq!(s.beam.scale.deformation_threshold, 1.0);
    }

    #[test]
    fn node_defaults_start_from_builtins() {
        let mut s = DefaultsState::new();
        s.set_node_defaults(NodeDefaultsArgs {
            load_weight: 10.0,
            friction: Some(0.5),
            options: Some(0b100),
            ..Default::default()
        });
        s.set_node_defaults(NodeDefaultsArgs {
            load_weight: 20.0,
            friction: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(s.node.load_weight, 20.0);
        assert_eq!(s.node.friction, 1.0);
        assert_eq!(s.node.options, 0);
    }

    #[test]
    fn negative_inertia_resets_to_builtin_handle() {
        let mut s = DefaultsState::new();
        s.set_inertia_defaults(InertiaArgs {
            start_delay_factor: 0.5,
            stop_delay_factor: Some(0.7),
            start_function: Some("in".into()),
            stop_function: Some("out".into()),
        });
        assert!(!Rc::ptr_eq(&s.inertia, s.builtin_inertia()));
        assert_eq!(s.inertia.stop_function, "out");
        s.set_inertia_defaults(InertiaArgs {
            start_delay_factor: 1.0,
            stop_delay_factor: Some(-1.0),
            ..Default::default()
        });
        assert!(Rc::ptr_eq(&s.inertia, s.builtin_inertia()));
    }

    #[test]
    fn detacher_group_end_resets() {
        let mut s = DefaultsState::new();
        s.set_detacher_group(Some(4));
        assert_eq!(s.detacher_group, 4);
        s.set_detacher_group(None);
        assert_eq!(s.detacher_group, 0);
    }
}
