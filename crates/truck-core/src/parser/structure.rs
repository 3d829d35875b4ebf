//! Soft-body structure: nodes, beams and everything that moves them.

use super::{Parser, node_range, numbered_aero_source};
use crate::args::{Args, lenient_float, lenient_int};
use crate::defaults::Inertia;
use crate::diagnostics::Severity;
use crate::keyword::Keyword;
use crate::model::{
    AeroAnimator, Animator, AnimatorFlag, Beam, BeamOption, Cab, Camera, Cinecam, CollisionBox,
    Command2, CommandOptions, Hook, HydroOption, Hydro, Lockgroup, NamedFlag, Node, NodeOption,
    OptionLetter, RailGroup, Ropable, Rope, Rotator, Rotator2, Shock, Shock2, Shock3,
    SlideConstraint, SlideNode, Texcoord, Tie, Trigger, TriggerAction, TriggerOption, Vec3, has,
};
use crate::node::{NodeId, NodeName};
use crate::tokenizer::split_trimmed;
use smallvec::SmallVec;
use std::rc::Rc;

impl Parser<'_> {
    // ─── Nodes and beams ──────────────────────────────────────────────────

    pub(super) fn parse_node(&mut self, a: &Args, named: bool) {
        if !a.check_count(4) {
            return;
        }
        let importing = self.importer.is_enabled();
        let (keyword, id) = if named {
            let name = a.str(0);
            if importing {
                if let Err(msg) = self.importer.add_named(name) {
                    a.report(Severity::SystemError, msg);
                }
            }
            self.any_named_node_defined = true;
            (Keyword::Nodes2, NodeId::Named(NodeName::intern(name)))
        } else {
            let number = a.uint(0);
            if importing {
                if let Err(msg) = self.importer.add_numbered(number) {
                    a.report(Severity::SystemError, msg);
                }
            }
            (Keyword::Nodes, NodeId::Numbered(number))
        };

        let options = if a.len() > 4 { a.node_options(4) } else { 0 };
        let mut load_weight_override = None;
        if a.len() > 5 {
            if has(options, NodeOption::LoadWeight) {
                load_weight_override = Some(a.float(5));
            } else {
                a.warn("Node has load-weight-override value specified, but option 'l' is not present. Ignoring value...");
            }
        }
        let node = Node {
            id,
            position: Vec3::new(a.float(1), a.float(2), a.float(3)),
            options,
            load_weight_override,
            node_defaults: Rc::clone(&self.defaults.node),
            beam_defaults: Rc::clone(&self.defaults.beam),
            minimass: Rc::clone(&self.defaults.minimass),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(keyword, |m| &mut m.nodes, node);
    }

    pub(super) fn parse_beam(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let options = if a.len() > 2 { a.beam_options(2) } else { 0 };
        let extension_break_limit = (a.len() > 3 && has(options, BeamOption::Support)).then(|| {
            let limit = a.float(3);
            if limit > 0.0 { limit } else { 0.0 }
        });
        let beam = Beam {
            nodes: [a.node(0), a.node(1)],
            options,
            extension_break_limit,
            detacher_group: self.defaults.detacher_group,
            defaults: Rc::clone(&self.defaults.beam),
        };
        self.append(Keyword::Beams, |m| &mut m.beams, beam);
    }

    // ─── Shocks ───────────────────────────────────────────────────────────

    pub(super) fn parse_shock(&mut self, a: &Args) {
        if !a.check_count(7) {
            return;
        }
        let shock = Shock {
            nodes: [a.node(0), a.node(1)],
            spring_rate: a.float(2),
            damping: a.float(3),
            short_bound: a.float(4),
            long_bound: a.float(5),
            precompression: a.float(6),
            options: if a.len() > 7 { a.shock_options(7) } else { 0 },
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Shocks, |m| &mut m.shocks, shock);
    }

    pub(super) fn parse_shock2(&mut self, a: &Args) {
        if !a.check_count(13) {
            return;
        }
        let shock = Shock2 {
            nodes: [a.node(0), a.node(1)],
            spring_in: a.float(2),
            damp_in: a.float(3),
            progress_factor_spring_in: a.float(4),
            progress_factor_damp_in: a.float(5),
            spring_out: a.float(6),
            damp_out: a.float(7),
            progress_factor_spring_out: a.float(8),
            progress_factor_damp_out: a.float(9),
            short_bound: a.float(10),
            long_bound: a.float(11),
            precompression: a.float(12),
            options: if a.len() > 13 { a.shock2_options(13) } else { 0 },
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Shocks2, |m| &mut m.shocks2, shock);
    }

    pub(super) fn parse_shock3(&mut self, a: &Args) {
        if !a.check_count(15) {
            return;
        }
        let shock = Shock3 {
            nodes: [a.node(0), a.node(1)],
            spring_in: a.float(2),
            damp_in: a.float(3),
            damp_in_slow: a.float(4),
            split_vel_in: a.float(5),
            damp_in_fast: a.float(6),
            spring_out: a.float(7),
            damp_out: a.float(8),
            damp_out_slow: a.float(9),
            split_vel_out: a.float(10),
            damp_out_fast: a.float(11),
            short_bound: a.float(12),
            long_bound: a.float(13),
            precompression: a.float(14),
            options: if a.len() > 15 { a.shock3_options(15) } else { 0 },
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Shocks3, |m| &mut m.shocks3, shock);
    }

    // ─── Actuators ────────────────────────────────────────────────────────

    pub(super) fn parse_hydro(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let hydro = Hydro {
            nodes: [a.node(0), a.node(1)],
            lengthening_factor: a.float(2),
            options: if a.len() > 3 {
                a.hydro_options(3)
            } else {
                HydroOption::NormalInput.bit()
            },
            inertia: optional_inertia(a, 4),
            inertia_defaults: Rc::clone(&self.defaults.inertia),
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Hydros, |m| &mut m.hydros, hydro);
    }

    /// `commands` (version 1) and `commands2` (version 2, explicit lengthen rate).
    pub(super) fn parse_command(&mut self, a: &Args, version: u8) {
        let is_v2 = version == 2;
        if !a.check_count(if is_v2 { 8 } else { 7 }) {
            return;
        }
        let off = usize::from(is_v2);
        let shorten_rate = a.float(2);
        let mut command = Command2 {
            nodes: [a.node(0), a.node(1)],
            shorten_rate,
            lengthen_rate: if is_v2 { a.float(3) } else { shorten_rate },
            max_contraction: a.float(3 + off),
            max_extension: a.float(4 + off),
            contract_key: a.uint(5 + off),
            extend_key: a.uint(6 + off),
            options: CommandOptions::default(),
            description: String::new(),
            inertia: Inertia::default(),
            affect_engine: 1.0,
            needs_engine: true,
            plays_sound: true,
            format_version: version,
            beam_defaults: Rc::clone(&self.defaults.beam),
            inertia_defaults: Rc::clone(&self.defaults.inertia),
            detacher_group: self.defaults.detacher_group,
        };

        let mut pos = 7 + off;
        if a.len() > pos {
            command.options = command_options(a, a.str(pos));
            pos += 1;
        }
        if a.len() > pos {
            command.description = a.string(pos);
            pos += 1;
        }
        if a.len() > pos {
            command.inertia = optional_inertia(a, pos);
            pos += 4;
        }
        if a.len() > pos {
            command.affect_engine = a.float(pos);
            pos += 1;
        }
        if a.len() > pos {
            command.needs_engine = a.bool(pos);
            pos += 1;
        }
        if a.len() > pos {
            command.plays_sound = a.bool(pos);
        }
        let keyword = if is_v2 { Keyword::Commands2 } else { Keyword::Commands };
        self.append(keyword, |m| &mut m.commands2, command);
    }

    /// Comma-separated: `node1, node2, factor, flag|flag|...`.
    pub(super) fn parse_animator(&mut self, a: &Args) {
        let fields = split_trimmed(a.line(), ',');
        if fields.len() < 4 {
            a.warn(format!(
                "Not enough arguments, 4 required, got {}. Skipping line.",
                fields.len()
            ));
            return;
        }
        let mut animator = Animator {
            nodes: [a.node_from_text(fields[0]), a.node_from_text(fields[1])],
            lengthening_factor: lenient_float(fields[2]),
            flags: 0,
            short_limit: 0.0,
            long_limit: 0.0,
            aero_animator: AeroAnimator::default(),
            inertia_defaults: Rc::clone(&self.defaults.inertia),
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };

        for token in fields[3].split('|').map(str::trim).filter(|t| !t.is_empty()) {
            if let Some((source, number)) = numbered_aero_source(token) {
                animator.aero_animator.flags |= source.bit();
                animator.aero_animator.engine_index = number.saturating_sub(1);
                continue;
            }
            let short = token.starts_with("shortlimit");
            if short || token.starts_with("longlimit") {
                if let Some((_, value)) = token.split_once(':') {
                    let value = lenient_float(value.trim());
                    if short {
                        animator.short_limit = value;
                        animator.flags |= AnimatorFlag::ShortLimit.bit();
                    } else {
                        animator.long_limit = value;
                        animator.flags |= AnimatorFlag::LongLimit.bit();
                    }
                }
                continue;
            }
            match AnimatorFlag::from_name(token) {
                Some(flag) => animator.flags |= flag.bit(),
                None => a.warn(format!("Ignoring invalid option: {token}")),
            }
        }
        self.append(Keyword::Animators, |m| &mut m.animators, animator);
    }

    pub(super) fn parse_trigger(&mut self, a: &Args) {
        if !a.check_count(6) {
            return;
        }
        let short_action = a.int(4);
        let long_action = a.int(5);
        let options = if a.len() > 6 { a.trigger_options(6) } else { 0 };
        let mut boundary_timer = 1.0;
        if a.len() > 7 {
            let timer = a.float(7);
            if timer > 0.0 {
                boundary_timer = timer;
            }
        }
        let unsigned = |v: i32| u32::try_from(v).unwrap_or(0);
        let action = if has(options, TriggerOption::UnlocksHookGroup)
            || has(options, TriggerOption::LocksHookGroup)
        {
            TriggerAction::HookToggle {
                contraction_group: short_action,
                extension_group: long_action,
            }
        } else if has(options, TriggerOption::EngineTrigger) {
            TriggerAction::Engine {
                function: unsigned(short_action),
                motor_index: unsigned(long_action),
            }
        } else {
            TriggerAction::CommandKeys {
                contraction_key: unsigned(short_action),
                extension_key: unsigned(long_action),
            }
        };
        let trigger = Trigger {
            nodes: [a.node(0), a.node(1)],
            contraction_trigger_limit: a.float(2),
            expansion_trigger_limit: a.float(3),
            action,
            options,
            boundary_timer,
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Triggers, |m| &mut m.triggers, trigger);
    }

    // ─── Ties, ropes and locks ────────────────────────────────────────────

    pub(super) fn parse_tie(&mut self, a: &Args) {
        if !a.check_count(5) {
            return;
        }
        let mut tie = Tie {
            root_node: a.node(0),
            max_reach_length: a.float(1),
            auto_shorten_rate: a.float(2),
            min_length: a.float(3),
            max_length: a.float(4),
            is_invisible: false,
            disable_self_lock: false,
            max_stress: 100_000.0,
            group: -1,
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        if a.len() > 5 {
            for c in a.str(5).chars() {
                match c {
                    'n' | 'v' => {}
                    'i' => tie.is_invisible = true,
                    's' => tie.disable_self_lock = true,
                    other => a.warn(format!("Invalid option: {other}, ignoring...")),
                }
            }
        }
        if a.len() > 6 {
            tie.max_stress = a.float(6);
        }
        if a.len() > 7 {
            tie.group = a.int(7);
        }
        self.append(Keyword::Ties, |m| &mut m.ties, tie);
    }

    pub(super) fn parse_rope(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let rope = Rope {
            root_node: a.node(0),
            end_node: a.node(1),
            invisible: a.len() > 2 && a.char(2) == 'i',
            beam_defaults: Rc::clone(&self.defaults.beam),
            detacher_group: self.defaults.detacher_group,
        };
        self.append(Keyword::Ropes, |m| &mut m.ropes, rope);
    }

    pub(super) fn parse_ropable(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        let ropable = Ropable {
            node: a.node(0),
            group: if a.len() > 1 { a.int(1) } else { -1 },
            has_multilock: a.len() > 2 && a.int(2) == 1,
        };
        self.append(Keyword::Ropables, |m| &mut m.ropables, ropable);
    }

    pub(super) fn parse_fixed_node(&mut self, a: &Args) {
        if a.check_count(1) {
            let node = a.node(0);
            self.append(Keyword::Fixes, |m| &mut m.fixes, node);
        }
    }

    pub(super) fn parse_contacter(&mut self, a: &Args) {
        if a.check_count(1) {
            let node = a.node(0);
            self.append(Keyword::Contacters, |m| &mut m.contacters, node);
        }
    }

    /// `node, rail..., S<spring>, B<break>, T<tol>, R<rate>, G<group>, D<dist>, C<constraint>`.
    pub(super) fn parse_slidenode(&mut self, a: &Args) {
        let fields: SmallVec<[&str; 16]> = a
            .line()
            .split([',', ' ', '\t'])
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() < 2 {
            a.error("Too few arguments");
            return;
        }
        let mut slide = SlideNode {
            slide_node: a.node_from_text(fields[0]),
            ..SlideNode::default()
        };
        let mut in_rail_list = true;
        for field in &fields[1..] {
            let mut chars = field.chars();
            let Some(first) = chars.next() else {
                continue;
            };
            let rest = chars.as_str();
            match first.to_ascii_uppercase() {
                'S' => slide.spring_rate = Some(lenient_float(rest)),
                'B' => slide.break_force = Some(lenient_float(rest)),
                'T' => slide.tolerance = Some(lenient_float(rest)),
                'R' => slide.attachment_rate = Some(lenient_float(rest)),
                'G' => slide.railgroup_id = Some(lenient_int(rest)),
                'D' => slide.max_attach_dist = Some(lenient_float(rest)),
                'C' => match rest.chars().next().and_then(SlideConstraint::from_letter) {
                    Some(c) => slide.constraint_flags |= c.bit(),
                    None => a.warn(format!("Ignoring invalid option: {rest}")),
                },
                _ => {
                    if in_rail_list {
                        slide.rail_node_ranges.push(node_range(a, field));
                    }
                    continue;
                }
            }
            in_rail_list = false;
        }
        self.append(Keyword::Slidenodes, |m| &mut m.slidenodes, slide);
    }

    /// `id, range, range...` where a range is `a-b` or a single node.
    pub(super) fn parse_railgroup(&mut self, a: &Args) {
        let fields = split_trimmed(a.line(), ',');
        if fields.len() < 3 {
            a.error("Not enough parameters");
            return;
        }
        let railgroup = RailGroup {
            id: u32::try_from(lenient_int(fields[0])).unwrap_or(0),
            node_list: fields[1..].iter().map(|f| node_range(a, f)).collect(),
        };
        self.append(Keyword::Railgroups, |m| &mut m.railgroups, railgroup);
    }

    pub(super) fn parse_lockgroup(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let lockgroup = Lockgroup {
            number: a.int(0),
            nodes: (1..a.len()).map(|i| a.node(i)).collect(),
        };
        self.append(Keyword::Lockgroups, |m| &mut m.lockgroups, lockgroup);
    }

    /// `node [key value | key=value | flag]...`.
    pub(super) fn parse_hook(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        let mut hook = Hook::new(a.node(0));
        let mut i = 1;
        while i < a.len() {
            let attr = a.str(i).trim();
            let (key, inline) = match attr.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (attr, None),
            };
            let takes_value = matches!(
                key,
                "hookrange"
                    | "speedcoef"
                    | "maxforce"
                    | "timer"
                    | "hookgroup"
                    | "hgroup"
                    | "lockgroup"
                    | "lgroup"
                    | "shortlimit"
                    | "short_limit"
            );
            let value = if !takes_value {
                None
            } else if inline.is_some() {
                inline
            } else if i + 1 < a.len() {
                i += 1;
                a.get(i)
            } else {
                None
            };
            match (key, value) {
                ("hookrange", Some(v)) => hook.hook_range = lenient_float(v),
                ("speedcoef", Some(v)) => hook.speed_coef = lenient_float(v),
                ("maxforce", Some(v)) => hook.max_force = lenient_float(v),
                ("timer", Some(v)) => hook.timer = lenient_float(v),
                ("hookgroup" | "hgroup", Some(v)) => hook.hookgroup = lenient_int(v),
                ("lockgroup" | "lgroup", Some(v)) => hook.lockgroup = lenient_int(v),
                ("shortlimit" | "short_limit", Some(v)) => hook.min_range_meters = lenient_float(v),
                ("selflock" | "self-lock" | "self_lock", None) => hook.self_lock = true,
                ("autolock" | "auto-lock" | "auto_lock", None) => hook.auto_lock = true,
                ("nodisable" | "no-disable" | "no_disable", None) => hook.no_disable = true,
                ("norope" | "no-rope" | "no_rope", None) => hook.no_rope = true,
                ("visible" | "vis", None) => hook.visible = true,
                _ => a.warn(format!("Ignoring invalid option: {attr}")),
            }
            i += 1;
        }
        self.append(Keyword::Hooks, |m| &mut m.hooks, hook);
    }

    /// `rotators` and `rotators2`; the latter adds force, tolerance and description.
    pub(super) fn parse_rotator(&mut self, a: &Args, is_v2: bool) {
        if !a.check_count(if is_v2 { 16 } else { 13 }) {
            return;
        }
        let off = if is_v2 { 3 } else { 0 };
        let mut rotator = Rotator {
            axis_nodes: [a.node(0), a.node(1)],
            base_plate_nodes: [a.node(2), a.node(3), a.node(4), a.node(5)],
            rotating_plate_nodes: [a.node(6), a.node(7), a.node(8), a.node(9)],
            rate: a.float(10),
            spin_left_key: a.uint(11),
            spin_right_key: a.uint(12),
            inertia: optional_inertia(a, 13 + off),
            inertia_defaults: Rc::clone(&self.defaults.inertia),
            engine_coupling: 1.0,
            needs_engine: false,
        };
        if a.len() > 17 + off {
            rotator.engine_coupling = a.float(17 + off);
        }
        if a.len() > 18 + off {
            rotator.needs_engine = a.bool(18 + off);
        }
        if is_v2 {
            let rotator = Rotator2 {
                base: rotator,
                rotating_force: a.float(13),
                tolerance: a.float(14),
                description: a.string(15),
            };
            self.append(Keyword::Rotators2, |m| &mut m.rotators2, rotator);
        } else {
            self.append(Keyword::Rotators, |m| &mut m.rotators, rotator);
        }
    }

    // ─── Submesh, cameras ─────────────────────────────────────────────────

    pub(super) fn parse_texcoord(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let texcoord = Texcoord {
            node: a.node(0),
            u: a.float(1),
            v: a.float(2),
        };
        if let Some(submesh) = self.staged_submesh.as_mut() {
            submesh.texcoords.push(texcoord);
        }
    }

    pub(super) fn parse_cab(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let cab = Cab {
            nodes: [a.node(0), a.node(1), a.node(2)],
            options: if a.len() > 3 { a.cab_options(3) } else { 0 },
        };
        if let Some(submesh) = self.staged_submesh.as_mut() {
            submesh.cab_triangles.push(cab);
        }
    }

    pub(super) fn parse_camera_rail(&mut self, a: &Args) {
        if !a.check_count(1) {
            return;
        }
        let node = a.node(0);
        if let Some(rail) = self.staged_camera_rail.as_mut() {
            rail.nodes.push(node);
        }
    }

    pub(super) fn parse_collision_box(&mut self, a: &Args) {
        let collision_box = CollisionBox {
            nodes: split_trimmed(a.line(), ',')
                .iter()
                .map(|f| a.node_from_text(f))
                .collect(),
        };
        self.append(Keyword::Collisionboxes, |m| &mut m.collision_boxes, collision_box);
    }

    pub(super) fn parse_camera(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let camera = Camera {
            center_node: a.node(0),
            back_node: a.node(1),
            left_node: a.node(2),
        };
        self.append(Keyword::Cameras, |m| &mut m.cameras, camera);
    }

    /// Cinecams add one generated node to the simulator's node list.
    pub(super) fn parse_cinecam(&mut self, a: &Args) {
        if !a.check_count(11) {
            return;
        }
        let mut cinecam = Cinecam {
            position: Vec3::new(a.float(0), a.float(1), a.float(2)),
            nodes: std::array::from_fn(|i| a.node(3 + i)),
            spring: 8000.0,
            damping: 800.0,
            node_mass: 20.0,
            beam_defaults: Rc::clone(&self.defaults.beam),
            node_defaults: Rc::clone(&self.defaults.node),
        };
        if a.len() > 11 {
            cinecam.spring = a.float(11);
        }
        if a.len() > 12 {
            cinecam.damping = a.float(12);
        }
        if a.len() > 13 {
            let mass = a.float(13);
            if mass > 0.0 {
                cinecam.node_mass = mass;
            }
        }
        if self.importer.is_enabled() {
            self.importer.add_generated(Keyword::Cinecam);
        }
        self.append(Keyword::Cinecam, |m| &mut m.cinecams, cinecam);
    }
}

/// Trailing inertia slots: start delay, stop delay, start function, stop function.
fn optional_inertia(a: &Args, start: usize) -> Inertia {
    let mut inertia = Inertia::default();
    if a.len() > start {
        inertia.start_delay_factor = a.float(start);
    }
    if a.len() > start + 1 {
        inertia.stop_delay_factor = a.float(start + 1);
    }
    if a.len() > start + 2 {
        inertia.start_function = a.string(start + 2);
    }
    if a.len() > start + 3 {
        inertia.stop_function = a.string(start + 3);
    }
    inertia
}

/// Command option letters. Of `c`, `p` and `o` the first one written wins.
fn command_options(a: &Args, text: &str) -> CommandOptions {
    let mut options = CommandOptions::default();
    let mut winner = None;
    for c in text.chars() {
        if winner.is_none() && matches!(c, 'c' | 'p' | 'o') {
            winner = Some(c);
        }
        match c {
            'n' => {}
            'i' => options.invisible = true,
            'r' => options.rope = true,
            'f' => options.not_faster = true,
            'c' => options.auto_center = true,
            'p' => options.one_press = true,
            'o' => options.one_press_center = true,
            other => a.warn(format!("Ignoring unknown flag '{other}'")),
        }
    }
    if options.auto_center && winner != Some('c') {
        a.warn("Command cannot be one-pressed and self centering at the same time, ignoring flag 'c'");
        options.auto_center = false;
    }
    for (letter, flag) in [
        ('o', &mut options.one_press_center),
        ('p', &mut options.one_press),
    ] {
        if !*flag || winner == Some(letter) {
            continue;
        }
        *flag = false;
        if winner == Some('c') {
            a.warn(format!(
                "Command cannot be one-pressed and self centering at the same time, ignoring flag '{letter}'"
            ));
        } else {
            a.warn(format!(
                "Command already has a one-pressed c.mode, ignoring flag '{letter}'"
            ));
        }
    }
    options
}
