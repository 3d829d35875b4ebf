//! Record types for every truck-file block.
//!
//! One struct per data-line shape. Records that depend on ambient defaults
//! hold `Rc` handles captured at parse time; see [`crate::defaults`].
//!
//! Option strings are modelled as an enum per alphabet plus a bitmask. Both
//! are generated from a single letter table so they stay in lock-step.

use crate::defaults::{BeamDefaults, DefaultMinimass, Inertia, ManagedMaterialOptions, NodeDefaults};
use crate::node::{NodeId, NodeRange, NodeRef};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ─── Option alphabets ────────────────────────────────────────────────────

/// A single-letter option within an option string.
pub trait OptionLetter: Copy + 'static {
    const ALL: &'static [Self];
    fn letter(self) -> char;
    fn bit(self) -> u32;

    fn from_letter(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.letter() == c)
    }
}

/// A keyword flag (`vis`, `airspeed`, `x-rotation`) within a `|`-list.
pub trait NamedFlag: Copy + 'static {
    const ALL: &'static [Self];
    fn name(self) -> &'static str;
    fn bit(self) -> u32;

    fn from_name(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.name() == s)
    }
}

macro_rules! option_letters {
    ($(#[$meta:meta])* $name:ident { $( $variant:ident = $letter:literal ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name { $( $variant, )+ }

        impl OptionLetter for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant, )+ ];

            fn letter(self) -> char {
                match self { $( $name::$variant => $letter, )+ }
            }

            fn bit(self) -> u32 {
                1 << (self as u32)
            }
        }
    };
}

macro_rules! named_flags {
    ($(#[$meta:meta])* $name:ident { $( $variant:ident = $text:literal ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name { $( $variant, )+ }

        impl NamedFlag for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant, )+ ];

            fn name(self) -> &'static str {
                match self { $( $name::$variant => $text, )+ }
            }

            fn bit(self) -> u32 {
                1 << (self as u32)
            }
        }
    };
}

/// True when `mask` has the bit of `opt`.
#[inline]
#[must_use]
pub fn has<O: OptionLetter>(mask: u32, opt: O) -> bool {
    mask & opt.bit() != 0
}

/// True when `mask` has the bit of the named flag.
#[inline]
#[must_use]
pub fn has_flag<F: NamedFlag>(mask: u32, flag: F) -> bool {
    mask & flag.bit() != 0
}

/// Outcome of decoding an option string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub mask: u32,
    pub unknown: Vec<char>,
}

/// Decode letter by letter. Letters in `noops` are accepted and contribute nothing.
#[must_use]
pub fn decode_options<O: OptionLetter>(text: &str, noops: &str) -> Decoded {
    let mut out = Decoded::default();
    for c in text.chars() {
        if let Some(opt) = O::from_letter(c) {
            out.mask |= opt.bit();
        } else if !noops.contains(c) {
            out.unknown.push(c);
        }
    }
    out
}

/// Encode a mask in alphabet order; an empty mask is written as `n`.
#[must_use]
pub fn encode_options<O: OptionLetter>(mask: u32) -> String {
    let s: String = O::ALL
        .iter()
        .filter(|o| mask & o.bit() != 0)
        .map(|o| o.letter())
        .collect();
    if s.is_empty() { "n".to_string() } else { s }
}

/// Names of the set flags, in table order.
#[must_use]
pub fn flag_names<F: NamedFlag>(mask: u32) -> Vec<&'static str> {
    F::ALL
        .iter()
        .filter(|f| mask & f.bit() != 0)
        .map(|f| f.name())
        .collect()
}

option_letters! {
    /// `nodes` options. `n` is a placeholder that only cancels `m`.
    NodeOption {
        NoMouseGrab = 'm',
        NoSparks = 'f',
        ExhaustPoint = 'x',
        ExhaustDirection = 'y',
        NoGroundContact = 'c',
        HookPoint = 'h',
        TerrainEditPoint = 'e',
        ExtraBuoyancy = 'b',
        NoParticles = 'p',
        Log = 'L',
        LoadWeight = 'l',
    }
}

option_letters! {
    BeamOption {
        Invisible = 'i',
        Rope = 'r',
        Support = 's',
    }
}

option_letters! {
    ShockOption {
        Invisible = 'i',
        ActiveLeft = 'L',
        ActiveRight = 'R',
        Metric = 'm',
    }
}

option_letters! {
    Shock2Option {
        Invisible = 'i',
        SoftBumpBounds = 's',
        Metric = 'm',
        AbsoluteMetric = 'M',
    }
}

option_letters! {
    Shock3Option {
        Invisible = 'i',
        Metric = 'm',
        AbsoluteMetric = 'M',
    }
}

option_letters! {
    /// `hydros` options. `n` is a real bit: the normal steering input.
    HydroOption {
        NormalInput = 'n',
        Invisible = 'i',
        DisableOnHighSpeed = 's',
        InputAileron = 'a',
        InputRudder = 'r',
        InputElevator = 'e',
        InputAileronElevator = 'u',
        InputInvAileronElevator = 'v',
        InputAileronRudder = 'x',
        InputInvAileronRudder = 'y',
        InputElevatorRudder = 'g',
        InputInvElevatorRudder = 'h',
    }
}

option_letters! {
    /// `cab` options. `D`, `F` and `S` are shorthands combining with `b`.
    CabOption {
        Contact = 'c',
        Buoyant = 'b',
        Tougher10x = 'p',
        Invulnerable = 'u',
        BuoyantNoDrag = 's',
        BuoyantOnlyDrag = 'r',
    }
}

option_letters! {
    TriggerOption {
        Invisible = 'i',
        CommandStyle = 'c',
        StartDisabled = 'x',
        KeyBlocker = 'b',
        TriggerBlocker = 'B',
        InvTriggerBlocker = 'A',
        CmdNumSwitch = 's',
        UnlocksHookGroup = 'h',
        LocksHookGroup = 'H',
        Continuous = 't',
        EngineTrigger = 'E',
    }
}

option_letters! {
    /// `slidenodes` attachment constraint (`C<letter>`).
    SlideConstraint {
        AttachAll = 'a',
        AttachForeign = 'f',
        AttachSelf = 's',
        AttachNone = 'n',
    }
}

impl CabOption {
    /// Expand a shorthand letter (`D`, `F`, `S`) into its bits.
    #[must_use]
    pub fn shorthand(c: char) -> Option<u32> {
        let b = CabOption::Buoyant.bit();
        match c {
            'D' => Some(CabOption::Contact.bit() | b),
            'F' => Some(CabOption::Tougher10x.bit() | b),
            'S' => Some(CabOption::Invulnerable.bit() | b),
            _ => None,
        }
    }
}

named_flags! {
    AnimatorFlag {
        Visible = "vis",
        Invisible = "inv",
        Airspeed = "airspeed",
        VerticalVelocity = "vvi",
        Altimeter100k = "altimeter100k",
        Altimeter10k = "altimeter10k",
        Altimeter1k = "altimeter1k",
        AngleOfAttack = "aoa",
        Flap = "flap",
        AirBrake = "airbrake",
        Roll = "roll",
        Pitch = "pitch",
        Brakes = "brakes",
        Accel = "accel",
        Clutch = "clutch",
        Speedo = "speedo",
        Tacho = "tacho",
        Turbo = "turbo",
        Parking = "parking",
        ShiftLeftRight = "shifterman1",
        ShiftBackForth = "shifterman2",
        SequentialShift = "sequential",
        GearSelect = "shifterlin",
        Torque = "torque",
        Difflock = "difflock",
        BoatRudder = "rudderboat",
        BoatThrottle = "throttleboat",
        ShortLimit = "shortlimit",
        LongLimit = "longlimit",
    }
}

named_flags! {
    /// Numbered aero keywords in `animators` and `add_animation` sources (`throttle2`, `rpm1`).
    AeroSource {
        Throttle = "throttle",
        Rpm = "rpm",
        Torque = "aerotorq",
        Pitch = "aeropit",
        Status = "aerostatus",
    }
}

named_flags! {
    AnimationSource {
        Airspeed = "airspeed",
        VerticalVelocity = "vvi",
        Altimeter100k = "altimeter100k",
        Altimeter10k = "altimeter10k",
        Altimeter1k = "altimeter1k",
        AngleOfAttack = "aoa",
        Flap = "flap",
        AirBrake = "airbrake",
        Roll = "roll",
        Pitch = "pitch",
        Brakes = "brake",
        Accel = "accel",
        Clutch = "clutch",
        Speedo = "speedo",
        Tacho = "tacho",
        Turbo = "turbo",
        Parking = "pbrake",
        ShiftLeftRight = "shifterman1",
        ShiftBackForth = "shifterman2",
        SequentialShift = "sequential",
        Shifterlin = "shifterlin",
        Torque = "torque",
        Heading = "heading",
        Difflock = "difflock",
        BoatRudder = "rudderboat",
        BoatThrottle = "throttleboat",
        SteeringWheel = "steeringwheel",
        Aileron = "aileron",
        Elevator = "elevator",
        AirRudder = "rudderair",
        Permanent = "permanent",
        Event = "event",
    }
}

impl AnimationSource {
    /// Accepts the alternate spellings seen in older files.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "brakes" => Some(AnimationSource::Brakes),
            "parking" => Some(AnimationSource::Parking),
            other => Self::from_name(other),
        }
    }
}

named_flags! {
    AnimationMode {
        RotationX = "x-rotation",
        RotationY = "y-rotation",
        RotationZ = "z-rotation",
        OffsetX = "x-offset",
        OffsetY = "y-offset",
        OffsetZ = "z-offset",
        AutoAnimate = "autoanimate",
        NoFlip = "noflip",
        Bounce = "bounce",
        EventLock = "eventlock",
    }
}

// ─── Shared value types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelSide {
    #[default]
    Left,
    Right,
}

impl WheelSide {
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            WheelSide::Left => 'l',
            WheelSide::Right => 'r',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelBraking {
    #[default]
    None = 0,
    FootHand = 1,
    FootHandSkidLeft = 2,
    FootHandSkidRight = 3,
    FootOnly = 4,
}

impl WheelBraking {
    #[must_use]
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => WheelBraking::None,
            1 => WheelBraking::FootHand,
            2 => WheelBraking::FootHandSkidLeft,
            3 => WheelBraking::FootHandSkidRight,
            4 => WheelBraking::FootOnly,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelPropulsion {
    #[default]
    None = 0,
    Forward = 1,
    Backward = 2,
}

impl WheelPropulsion {
    #[must_use]
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => WheelPropulsion::None,
            1 => WheelPropulsion::Forward,
            2 => WheelPropulsion::Backward,
            _ => return None,
        })
    }
}

/// Camera visibility of a prop or flexbody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    Always,
    External,
    Cinecam(u32),
}

impl CameraMode {
    /// The integer form used in files: `-2`, `-1` or the cinecam index.
    #[must_use]
    pub fn to_int(self) -> i64 {
        match self {
            CameraMode::Always => -2,
            CameraMode::External => -1,
            CameraMode::Cinecam(i) => i64::from(i),
        }
    }

    #[must_use]
    pub fn from_int(v: i64) -> Option<Self> {
        match v {
            -2 => Some(CameraMode::Always),
            -1 => Some(CameraMode::External),
            i if i >= 0 => u32::try_from(i).ok().map(CameraMode::Cinecam),
            _ => None,
        }
    }
}

// ─── Structure ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Vec3,
    pub options: u32,
    pub load_weight_override: Option<f32>,
    pub node_defaults: Rc<NodeDefaults>,
    pub beam_defaults: Rc<BeamDefaults>,
    pub minimass: Rc<DefaultMinimass>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub nodes: [NodeRef; 2],
    pub options: u32,
    /// Only read when the `s` (support) option is set.
    pub extension_break_limit: Option<f32>,
    pub detacher_group: i32,
    pub defaults: Rc<BeamDefaults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shock {
    pub nodes: [NodeRef; 2],
    pub spring_rate: f32,
    pub damping: f32,
    pub short_bound: f32,
    pub long_bound: f32,
    pub precompression: f32,
    pub options: u32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shock2 {
    pub nodes: [NodeRef; 2],
    pub spring_in: f32,
    pub damp_in: f32,
    pub progress_factor_spring_in: f32,
    pub progress_factor_damp_in: f32,
    pub spring_out: f32,
    pub damp_out: f32,
    pub progress_factor_spring_out: f32,
    pub progress_factor_damp_out: f32,
    pub short_bound: f32,
    pub long_bound: f32,
    pub precompression: f32,
    pub options: u32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shock3 {
    pub nodes: [NodeRef; 2],
    pub spring_in: f32,
    pub damp_in: f32,
    pub damp_in_slow: f32,
    pub split_vel_in: f32,
    pub damp_in_fast: f32,
    pub spring_out: f32,
    pub damp_out: f32,
    pub damp_out_slow: f32,
    pub split_vel_out: f32,
    pub damp_out_fast: f32,
    pub short_bound: f32,
    pub long_bound: f32,
    pub precompression: f32,
    pub options: u32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hydro {
    pub nodes: [NodeRef; 2],
    pub lengthening_factor: f32,
    pub options: u32,
    pub inertia: Inertia,
    pub inertia_defaults: Rc<Inertia>,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

/// Command option letters. `c`, `p` and `o` are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOptions {
    pub invisible: bool,
    pub rope: bool,
    pub auto_center: bool,
    pub not_faster: bool,
    pub one_press: bool,
    pub one_press_center: bool,
}

impl CommandOptions {
    #[must_use]
    pub fn encode(&self) -> String {
        let mut s = String::new();
        for (set, c) in [
            (self.invisible, 'i'),
            (self.rope, 'r'),
            (self.auto_center, 'c'),
            (self.not_faster, 'f'),
            (self.one_press, 'p'),
            (self.one_press_center, 'o'),
        ] {
            if set {
                s.push(c);
            }
        }
        if s.is_empty() { "n".to_string() } else { s }
    }
}

/// `commands` and `commands2` share this record; `commands` copies the
/// shorten rate into `lengthen_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command2 {
    pub nodes: [NodeRef; 2],
    pub shorten_rate: f32,
    pub lengthen_rate: f32,
    pub max_contraction: f32,
    pub max_extension: f32,
    pub contract_key: u32,
    pub extend_key: u32,
    pub options: CommandOptions,
    pub description: String,
    pub inertia: Inertia,
    pub affect_engine: f32,
    pub needs_engine: bool,
    pub plays_sound: bool,
    pub format_version: u8,
    pub beam_defaults: Rc<BeamDefaults>,
    pub inertia_defaults: Rc<Inertia>,
    pub detacher_group: i32,
}

/// Aero part of an animator line (`throttle1`, `rpm2`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AeroAnimator {
    pub flags: u32,
    pub engine_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animator {
    pub nodes: [NodeRef; 2],
    pub lengthening_factor: f32,
    pub flags: u32,
    pub short_limit: f32,
    pub long_limit: f32,
    pub aero_animator: AeroAnimator,
    pub inertia_defaults: Rc<Inertia>,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

/// What the two trigger actions mean, decided by the trigger options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerAction {
    CommandKeys { contraction_key: u32, extension_key: u32 },
    HookToggle { contraction_group: i32, extension_group: i32 },
    Engine { function: u32, motor_index: u32 },
}

impl Default for TriggerAction {
    fn default() -> Self {
        TriggerAction::CommandKeys {
            contraction_key: 0,
            extension_key: 0,
        }
    }
}

impl TriggerAction {
    /// The two integers as written on the line.
    #[must_use]
    pub fn raw(&self) -> (i64, i64) {
        match *self {
            TriggerAction::CommandKeys {
                contraction_key,
                extension_key,
            } => (i64::from(contraction_key), i64::from(extension_key)),
            TriggerAction::HookToggle {
                contraction_group,
                extension_group,
            } => (i64::from(contraction_group), i64::from(extension_group)),
            TriggerAction::Engine {
                function,
                motor_index,
            } => (i64::from(function), i64::from(motor_index)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub nodes: [NodeRef; 2],
    pub contraction_trigger_limit: f32,
    pub expansion_trigger_limit: f32,
    pub action: TriggerAction,
    pub options: u32,
    pub boundary_timer: f32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tie {
    pub root_node: NodeRef,
    pub max_reach_length: f32,
    pub auto_shorten_rate: f32,
    pub min_length: f32,
    pub max_length: f32,
    pub is_invisible: bool,
    /// Option `s`.
    pub disable_self_lock: bool,
    pub max_stress: f32,
    pub group: i32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rope {
    pub root_node: NodeRef,
    pub end_node: NodeRef,
    pub invisible: bool,
    pub beam_defaults: Rc<BeamDefaults>,
    pub detacher_group: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ropable {
    pub node: NodeRef,
    /// `-1` when unset.
    pub group: i32,
    pub has_multilock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailGroup {
    pub id: u32,
    pub node_list: Vec<NodeRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideNode {
    pub slide_node: NodeRef,
    pub rail_node_ranges: Vec<NodeRange>,
    pub constraint_flags: u32,
    pub spring_rate: Option<f32>,
    pub break_force: Option<f32>,
    pub tolerance: Option<f32>,
    pub attachment_rate: Option<f32>,
    pub railgroup_id: Option<i32>,
    pub max_attach_dist: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockgroup {
    pub number: i32,
    pub nodes: Vec<NodeRef>,
}

impl Lockgroup {
    pub const DEFAULT: i32 = -1;
    pub const NOLOCK: i32 = 9999;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    pub node: NodeRef,
    pub hook_range: f32,
    pub speed_coef: f32,
    pub max_force: f32,
    pub hookgroup: i32,
    pub lockgroup: i32,
    pub timer: f32,
    pub min_range_meters: f32,
    pub self_lock: bool,
    pub auto_lock: bool,
    pub no_disable: bool,
    pub no_rope: bool,
    pub visible: bool,
}

impl Hook {
    #[must_use]
    pub fn new(node: NodeRef) -> Self {
        Self {
            node,
            hook_range: 0.4,
            speed_coef: 1.0,
            max_force: 10_000_000.0,
            hookgroup: -1,
            lockgroup: -1,
            timer: 5.0,
            min_range_meters: 0.0,
            self_lock: false,
            auto_lock: false,
            no_disable: false,
            no_rope: false,
            visible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub axis_nodes: [NodeRef; 2],
    pub base_plate_nodes: [NodeRef; 4],
    pub rotating_plate_nodes: [NodeRef; 4],
    pub rate: f32,
    pub spin_left_key: u32,
    pub spin_right_key: u32,
    pub inertia: Inertia,
    pub inertia_defaults: Rc<Inertia>,
    pub engine_coupling: f32,
    pub needs_engine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotator2 {
    pub base: Rotator,
    pub rotating_force: f32,
    pub tolerance: f32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cab {
    pub nodes: [NodeRef; 3],
    pub options: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Texcoord {
    pub node: NodeRef,
    pub u: f32,
    pub v: f32,
}

/// Staged across `submesh` / `texcoords` / `cab` / `backmesh` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    pub backmesh: bool,
    pub texcoords: Vec<Texcoord>,
    pub cab_triangles: Vec<Cab>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraRail {
    pub nodes: Vec<NodeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    pub nodes: Vec<NodeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center_node: NodeRef,
    pub back_node: NodeRef,
    pub left_node: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cinecam {
    pub position: Vec3,
    pub nodes: [NodeRef; 8],
    pub spring: f32,
    pub damping: f32,
    pub node_mass: f32,
    pub beam_defaults: Rc<BeamDefaults>,
    pub node_defaults: Rc<NodeDefaults>,
}

// ─── Wheels ──────────────────────────────────────────────────────────────

/// Fields shared by every wheel flavour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseWheel {
    pub width: f32,
    pub num_rays: u32,
    pub nodes: [NodeRef; 2],
    /// Invalid when written as `9999`.
    pub rigidity_node: NodeRef,
    pub braking: WheelBraking,
    pub propulsion: WheelPropulsion,
    pub reference_arm_node: NodeRef,
    pub mass: f32,
    pub node_defaults: Rc<NodeDefaults>,
    pub beam_defaults: Rc<BeamDefaults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub base: BaseWheel,
    pub radius: f32,
    pub springiness: f32,
    pub damping: f32,
    pub face_material_name: String,
    pub band_material_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel2 {
    pub base: BaseWheel,
    pub rim_radius: f32,
    pub tyre_radius: f32,
    pub rim_springiness: f32,
    pub rim_damping: f32,
    pub tyre_springiness: f32,
    pub tyre_damping: f32,
    pub face_material_name: String,
    pub band_material_name: String,
}

/// `meshwheels` and `meshwheels2` lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshWheel {
    pub base: BaseWheel,
    pub tyre_radius: f32,
    pub rim_radius: f32,
    pub spring: f32,
    pub damping: f32,
    pub side: WheelSide,
    pub mesh_name: String,
    pub material_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexBodyWheel {
    pub base: BaseWheel,
    pub tyre_radius: f32,
    pub rim_radius: f32,
    pub tyre_springiness: f32,
    pub tyre_damping: f32,
    pub rim_springiness: f32,
    pub rim_damping: f32,
    pub side: WheelSide,
    pub rim_mesh_name: String,
    pub tyre_mesh_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelDetacher {
    pub wheel_id: i32,
    pub detacher_group: i32,
}

// ─── Drivetrain ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub shift_down_rpm: f32,
    pub shift_up_rpm: f32,
    pub torque: f32,
    pub global_gear_ratio: f32,
    pub reverse_gear_ratio: f32,
    pub neutral_gear_ratio: f32,
    pub gear_ratios: Vec<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    Car,
    Electric,
    #[default]
    Truck,
}

impl EngineType {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(EngineType::Car),
            'e' => Some(EngineType::Electric),
            't' => Some(EngineType::Truck),
            _ => None,
        }
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            EngineType::Car => 'c',
            EngineType::Electric => 'e',
            EngineType::Truck => 't',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engoption {
    pub inertia: f32,
    pub engine_type: EngineType,
    pub clutch_force: f32,
    pub shift_time: f32,
    pub clutch_time: f32,
    pub post_shift_time: f32,
    pub stall_rpm: f32,
    pub idle_rpm: f32,
    pub max_idle_mixture: f32,
    pub min_idle_mixture: f32,
    pub braking_torque: f32,
}

impl Default for Engoption {
    fn default() -> Self {
        Self {
            inertia: 10.0,
            engine_type: EngineType::Truck,
            clutch_force: -1.0,
            shift_time: -1.0,
            clutch_time: -1.0,
            post_shift_time: -1.0,
            stall_rpm: -1.0,
            idle_rpm: -1.0,
            max_idle_mixture: -1.0,
            min_idle_mixture: -1.0,
            braking_torque: -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engturbo {
    pub version: i32,
    pub tinertia_factor: f32,
    pub nturbos: i32,
    pub params: [f32; 11],
}

impl Default for Engturbo {
    fn default() -> Self {
        Self {
            version: 1,
            tinertia_factor: 1.0,
            nturbos: 1,
            params: [9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0, 9_999.0],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TorqueSample {
    pub power: f32,
    pub torque_percent: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorqueCurve {
    pub samples: Vec<TorqueSample>,
    pub predefined_func_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brakes {
    pub default_braking_force: f32,
    /// Negative when not given.
    pub parking_brake_force: f32,
}

impl Default for Brakes {
    fn default() -> Self {
        Self {
            default_braking_force: 30_000.0,
            parking_brake_force: -1.0,
        }
    }
}

/// `mode:` attributes shared by ABS and TC, joined with `&`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatorAttrs {
    pub is_on: bool,
    pub no_dashboard: bool,
    pub no_toggle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntiLockBrakes {
    pub regulation_force: f32,
    pub min_speed: u32,
    pub pulse_per_sec: Option<f32>,
    pub attrs: RegulatorAttrs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TractionControl {
    pub regulation_force: f32,
    pub wheel_slip: f32,
    pub fade_speed: Option<f32>,
    pub pulse_per_sec: Option<f32>,
    pub attrs: RegulatorAttrs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeBrake {
    pub regulating_force: f32,
    pub attach_angle: f32,
    pub release_angle: f32,
}

impl Default for SlopeBrake {
    fn default() -> Self {
        Self {
            regulating_force: 6.0,
            attach_angle: 5.0,
            release_angle: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CruiseControl {
    pub min_speed: f32,
    pub autobrake: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimiter {
    pub max_speed: f32,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferentialType {
    Open,
    Locked,
    Split,
    Viscous,
}

impl DifferentialType {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'o' => Some(DifferentialType::Open),
            'l' => Some(DifferentialType::Locked),
            's' => Some(DifferentialType::Split),
            'v' => Some(DifferentialType::Viscous),
            _ => None,
        }
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            DifferentialType::Open => 'o',
            DifferentialType::Locked => 'l',
            DifferentialType::Split => 's',
            DifferentialType::Viscous => 'v',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axle {
    pub wheels: [[NodeRef; 2]; 2],
    /// Order matters.
    pub options: Vec<DifferentialType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterAxle {
    pub a1: i32,
    pub a2: i32,
    pub options: Vec<DifferentialType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCase {
    pub a1: i32,
    pub a2: i32,
    pub has_2wd: bool,
    pub has_2wd_lo: bool,
    pub gear_ratios: Vec<f32>,
}

impl Default for TransferCase {
    fn default() -> Self {
        Self {
            a1: 0,
            a2: -1,
            has_2wd: true,
            has_2wd_lo: false,
            gear_ratios: vec![1.0],
        }
    }
}

// ─── Aerial and marine ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WingSurface {
    #[default]
    None,
    RightAileron,
    LeftAileron,
    Flap,
    Elevator,
    Rudder,
    RightStabilator,
    LeftStabilator,
    RightElevon,
    LeftElevon,
    RightFlaperon,
    LeftFlaperon,
    RightTaileron,
    LeftTaileron,
    RightRuddervator,
    LeftRuddervator,
}

impl WingSurface {
    pub const LEGAL_LETTERS: &'static str = "nabferSTcdghUVij";

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        use WingSurface::*;
        Some(match c {
            'n' => None,
            'a' => RightAileron,
            'b' => LeftAileron,
            'f' => Flap,
            'e' => Elevator,
            'r' => Rudder,
            'S' => RightStabilator,
            'T' => LeftStabilator,
            'c' => RightElevon,
            'd' => LeftElevon,
            'g' => RightFlaperon,
            'h' => LeftFlaperon,
            'U' => RightTaileron,
            'V' => LeftTaileron,
            'i' => RightRuddervator,
            'j' => LeftRuddervator,
            _ => return Option::None,
        })
    }

    #[must_use]
    pub const fn letter(self) -> char {
        use WingSurface::*;
        match self {
            None => 'n',
            RightAileron => 'a',
            LeftAileron => 'b',
            Flap => 'f',
            Elevator => 'e',
            Rudder => 'r',
            RightStabilator => 'S',
            LeftStabilator => 'T',
            RightElevon => 'c',
            LeftElevon => 'd',
            RightFlaperon => 'g',
            LeftFlaperon => 'h',
            RightTaileron => 'U',
            LeftTaileron => 'V',
            RightRuddervator => 'i',
            LeftRuddervator => 'j',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wing {
    pub nodes: [NodeRef; 8],
    pub tex_coords: [f32; 8],
    pub control_surface: WingSurface,
    pub chord_point: f32,
    pub min_deflection: f32,
    pub max_deflection: f32,
    pub airfoil: String,
    pub efficacy_coef: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Airbrake {
    pub reference_node: NodeRef,
    pub x_axis_node: NodeRef,
    pub y_axis_node: NodeRef,
    pub additional_node: NodeRef,
    pub offset: Vec3,
    pub width: f32,
    pub height: f32,
    pub max_inclination_angle: f32,
    pub texcoord_x1: f32,
    pub texcoord_y1: f32,
    pub texcoord_x2: f32,
    pub texcoord_y2: f32,
}

/// `turboprops` and `turboprops2` lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turboprop2 {
    pub reference_node: NodeRef,
    pub axis_node: NodeRef,
    /// The last two tips may be absent (`-1`).
    pub blade_tip_nodes: [NodeRef; 4],
    /// `turboprops2` only; invalid otherwise.
    pub couple_node: NodeRef,
    pub turbine_power_kw: f32,
    pub airfoil: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pistonprop {
    pub reference_node: NodeRef,
    pub axis_node: NodeRef,
    pub blade_tip_nodes: [NodeRef; 4],
    /// Invalid when written as `-1`.
    pub couple_node: NodeRef,
    pub turbine_power_kw: f32,
    pub pitch: f32,
    pub airfoil: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turbojet {
    pub front_node: NodeRef,
    pub back_node: NodeRef,
    pub side_node: NodeRef,
    pub is_reversable: i32,
    pub dry_thrust: f32,
    pub wet_thrust: f32,
    pub front_diameter: f32,
    pub back_diameter: f32,
    pub nozzle_length: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fusedrag {
    pub front_node: NodeRef,
    pub rear_node: NodeRef,
    pub autocalc: bool,
    pub approximate_width: f32,
    pub area_coefficient: f32,
    pub airfoil_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screwprop {
    pub prop_node: NodeRef,
    pub back_node: NodeRef,
    pub top_node: NodeRef,
    pub power: f32,
}

// ─── Visuals ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSource {
    pub source: AeroSource,
    pub motor: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub ratio: f32,
    pub lower_limit: f32,
    pub upper_limit: f32,
    pub source: u32,
    pub motor_sources: Vec<MotorSource>,
    pub mode: u32,
    pub event: String,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            ratio: 0.0,
            lower_limit: -1.0,
            upper_limit: -1.0,
            source: 0,
            motor_sources: Vec::new(),
            mode: 0,
            event: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialProp {
    #[default]
    None,
    MirrorLeft,
    MirrorRight,
    DashboardLeft,
    DashboardRight,
    AeroPropSpin,
    AeroPropBlade,
    DriverSeat,
    DriverSeat2,
    Beacon,
    RedBeacon,
    Lightbar,
}

impl SpecialProp {
    /// Detect from the mesh name; the first matching fragment wins.
    #[must_use]
    pub fn detect(mesh_name: &str) -> Self {
        const TABLE: &[(&str, SpecialProp)] = &[
            ("leftmirror", SpecialProp::MirrorLeft),
            ("rightmirror", SpecialProp::MirrorRight),
            ("lightbar", SpecialProp::Lightbar),
            ("seat2", SpecialProp::DriverSeat2),
            ("seat", SpecialProp::DriverSeat),
            ("redbeacon", SpecialProp::RedBeacon),
            ("pale", SpecialProp::AeroPropBlade),
            ("spinprop", SpecialProp::AeroPropSpin),
            ("beacon", SpecialProp::Beacon),
            ("dashboard-rh", SpecialProp::DashboardRight),
            ("dashboard", SpecialProp::DashboardLeft),
        ];
        TABLE
            .iter()
            .find(|(fragment, _)| mesh_name.contains(fragment))
            .map_or(SpecialProp::None, |(_, kind)| *kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpecial {
    pub mesh_name: String,
    pub offset: Vec3,
    pub offset_is_set: bool,
    pub rotation_angle: f32,
}

impl Default for DashboardSpecial {
    fn default() -> Self {
        Self {
            mesh_name: "dirwheel.mesh".to_string(),
            offset: Vec3::default(),
            offset_is_set: false,
            rotation_angle: 160.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconSpecial {
    pub flare_material_name: String,
    pub color: [f32; 3],
}

impl Default for BeaconSpecial {
    fn default() -> Self {
        Self {
            flare_material_name: "tracks/beaconflare".to_string(),
            color: [1.0, 0.5, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub reference_node: NodeRef,
    pub x_axis_node: NodeRef,
    pub y_axis_node: NodeRef,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub mesh_name: String,
    pub animations: Vec<Animation>,
    pub camera_mode: CameraMode,
    pub special: SpecialProp,
    pub beacon: Option<BeaconSpecial>,
    pub dashboard: Option<DashboardSpecial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flexbody {
    pub reference_node: NodeRef,
    pub x_axis_node: NodeRef,
    pub y_axis_node: NodeRef,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub mesh_name: String,
    pub camera_mode: CameraMode,
    /// Inclusive ranges from the `forset` line.
    pub node_list_to_import: Vec<NodeRange>,
    /// Filled by the importer from `node_list_to_import`.
    pub node_list: Vec<NodeRef>,
}

/// Flare type letter. `d` routes the control slot to a dashboard link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlareType {
    #[default]
    Headlight,
    BrakeLight,
    LeftBlinker,
    RightBlinker,
    ReverseLight,
    User,
    Dashboard,
}

impl FlareType {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'f' => FlareType::Headlight,
            'b' => FlareType::BrakeLight,
            'l' => FlareType::LeftBlinker,
            'r' => FlareType::RightBlinker,
            'R' => FlareType::ReverseLight,
            'u' => FlareType::User,
            'd' => FlareType::Dashboard,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            FlareType::Headlight => 'f',
            FlareType::BrakeLight => 'b',
            FlareType::LeftBlinker => 'l',
            FlareType::RightBlinker => 'r',
            FlareType::ReverseLight => 'R',
            FlareType::User => 'u',
            FlareType::Dashboard => 'd',
        }
    }
}

/// `flares`, `flares2` and `flares3` lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flare2 {
    pub reference_node: NodeRef,
    pub node_axis_x: NodeRef,
    pub node_axis_y: NodeRef,
    pub offset: Vec3,
    pub flare_type: FlareType,
    /// `u` flares only.
    pub control_number: i32,
    /// `d` flares only.
    pub dashboard_link: String,
    pub blink_delay_milis: i32,
    pub size: f32,
    pub material_name: String,
}

impl Default for Flare2 {
    fn default() -> Self {
        Self {
            reference_node: NodeRef::default(),
            node_axis_x: NodeRef::default(),
            node_axis_y: NodeRef::default(),
            offset: Vec3::new(0.0, 0.0, 1.0),
            flare_type: FlareType::Headlight,
            control_number: -1,
            dashboard_link: String::new(),
            blink_delay_milis: -2,
            size: -1.0,
            material_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialFlareBinding {
    pub flare_number: u32,
    pub material_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagedMaterialType {
    FlexmeshStandard,
    FlexmeshTransparent,
    MeshStandard,
    MeshTransparent,
}

impl ManagedMaterialType {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flexmesh_standard" => Some(ManagedMaterialType::FlexmeshStandard),
            "flexmesh_transparent" => Some(ManagedMaterialType::FlexmeshTransparent),
            "mesh_standard" => Some(ManagedMaterialType::MeshStandard),
            "mesh_transparent" => Some(ManagedMaterialType::MeshTransparent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ManagedMaterialType::FlexmeshStandard => "flexmesh_standard",
            ManagedMaterialType::FlexmeshTransparent => "flexmesh_transparent",
            ManagedMaterialType::MeshStandard => "mesh_standard",
            ManagedMaterialType::MeshTransparent => "mesh_transparent",
        }
    }

    #[must_use]
    pub const fn is_flexmesh(self) -> bool {
        matches!(
            self,
            ManagedMaterialType::FlexmeshStandard | ManagedMaterialType::FlexmeshTransparent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedMaterial {
    pub name: String,
    pub material_type: ManagedMaterialType,
    pub options: ManagedMaterialOptions,
    pub diffuse_map: String,
    pub damaged_diffuse_map: String,
    pub specular_map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhaust {
    pub reference_node: NodeRef,
    pub direction_node: NodeRef,
    pub particle_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub emitter_node: NodeRef,
    pub reference_node: NodeRef,
    pub particle_system_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCamera {
    pub reference_node: NodeRef,
    pub left_node: NodeRef,
    pub bottom_node: NodeRef,
    pub alt_reference_node: NodeRef,
    pub alt_orientation_node: NodeRef,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub field_of_view: f32,
    pub texture_width: u32,
    pub texture_height: u32,
    pub min_clip_distance: f32,
    pub max_clip_distance: f32,
    pub camera_role: i32,
    pub camera_mode: i32,
    pub material_name: String,
    pub camera_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtCameraMode {
    #[default]
    Classic,
    Cinecam,
    Node,
}

impl ExtCameraMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExtCameraMode::Classic => "classic",
            ExtCameraMode::Cinecam => "cinecam",
            ExtCameraMode::Node => "node",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtCamera {
    pub mode: ExtCameraMode,
    pub node: Option<NodeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSource {
    pub node: NodeRef,
    pub sound_script_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSource2 {
    pub node: NodeRef,
    /// `-2` always, `-1` exterior only, otherwise a cinecam index.
    pub mode: i32,
    pub sound_script_name: String,
}

impl SoundSource2 {
    pub const MODE_ALWAYS: i32 = -2;
    pub const MODE_EXTERIOR: i32 = -1;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapMode {
    #[default]
    Off,
    Simple,
    Zoom,
}

impl MapMode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(MapMode::Off),
            "simple" => Some(MapMode::Simple),
            "zoom" => Some(MapMode::Zoom),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MapMode::Off => "off",
            MapMode::Simple => "simple",
            MapMode::Zoom => "zoom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuiSettings {
    pub tacho_material: Option<String>,
    pub speedo_material: Option<String>,
    pub speedo_highest_kph: Option<i32>,
    pub use_max_rpm: Option<bool>,
    pub help_material: Option<String>,
    pub interactive_overview_map: Option<MapMode>,
    pub dashboard_layouts: Vec<String>,
    pub rtt_dashboard_layouts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSettings {
    pub visibility_range_meters: f32,
    pub beam_thickness_meters: f32,
}

impl Default for SkeletonSettings {
    fn default() -> Self {
        Self {
            visibility_range_meters: crate::defaults::DEFAULT_SKELETON_VISIBILITY,
            beam_thickness_meters: crate::defaults::BEAM_SKELETON_DIAMETER,
        }
    }
}

// ─── Metadata ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Globals {
    pub dry_mass: f32,
    pub cargo_mass: f32,
    pub material_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub author_type: String,
    pub forum_account_id: Option<u32>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub unique_id: String,
    pub category_id: i32,
    pub file_version: i32,
}

impl Default for FileInfo {
    fn default() -> Self {
        Self {
            unique_id: String::new(),
            category_id: -1,
            file_version: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinimassOption {
    #[default]
    None,
    /// Only apply to nodes without the `L` option.
    SkipLoaded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Minimass {
    pub global_min_mass: f32,
    pub option: MinimassOption,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_distinct_per_alphabet() {
        let mut seen = 0u32;
        for o in TriggerOption::ALL {
            assert_eq!(seen & o.bit(), 0);
            seen |= o.bit();
        }
        assert_eq!(AnimationSource::ALL.len(), 32);
    }

    #[test]
    fn decode_reports_unknown_and_skips_noops() {
        let d = decode_options::<BeamOption>("invz", "nv");
        assert_eq!(d.mask, BeamOption::Invisible.bit());
        assert_eq!(d.unknown, vec!['z']);
    }

    #[test]
    fn encode_uses_placeholder_for_empty_mask() {
        assert_eq!(encode_options::<ShockOption>(0), "n");
        let mask = ShockOption::Invisible.bit() | ShockOption::ActiveRight.bit();
        assert_eq!(encode_options::<ShockOption>(mask), "iR");
    }

    #[test]
    fn cab_shorthands_include_buoyancy() {
        let d = CabOption::shorthand('D').unwrap_or(0);
        assert!(has(d, CabOption::Contact));
        assert!(has(d, CabOption::Buoyant));
        assert_eq!(CabOption::shorthand('x'), None);
    }

    #[test]
    fn special_props_match_most_specific_fragment_first() {
        assert_eq!(SpecialProp::detect("seat2.mesh"), SpecialProp::DriverSeat2);
        assert_eq!(SpecialProp::detect("driverseat.mesh"), SpecialProp::DriverSeat);
        assert_eq!(SpecialProp::detect("redbeacon.mesh"), SpecialProp::RedBeacon);
        assert_eq!(SpecialProp::detect("dashboard-rh.mesh"), SpecialProp::DashboardRight);
        assert_eq!(SpecialProp::detect("dashboard.mesh"), SpecialProp::DashboardLeft);
        assert_eq!(SpecialProp::detect("wheel.mesh"), SpecialProp::None);
    }

    #[test]
    fn camera_mode_integer_form() {
        assert_eq!(CameraMode::from_int(-2), Some(CameraMode::Always));
        assert_eq!(CameraMode::from_int(3), Some(CameraMode::Cinecam(3)));
        assert_eq!(CameraMode::from_int(-7), None);
        assert_eq!(CameraMode::External.to_int(), -1);
    }

    #[test]
    fn wing_surface_letters_round_trip() {
        for c in WingSurface::LEGAL_LETTERS.chars() {
            let s = WingSurface::from_char(c).expect("legal letter");
            assert_eq!(s.letter(), c);
        }
    }

    #[test]
    fn command_options_encode() {
        let o = CommandOptions {
            invisible: true,
            auto_center: true,
            ..Default::default()
        };
        assert_eq!(o.encode(), "ic");
        assert_eq!(CommandOptions::default().encode(), "n");
    }
}
