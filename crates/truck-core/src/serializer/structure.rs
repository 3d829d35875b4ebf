//! Soft-body structure blocks.

use super::{Writer, group_by_handle};
use crate::document::Module;
use crate::keyword::Keyword;
use crate::model::{
    AeroSource, Animator, AnimatorFlag, BeamOption, CabOption, Command2, HydroOption, NamedFlag,
    Node, NodeOption, OptionLetter, Rotator, Shock2Option, Shock3Option, ShockOption,
    SlideConstraint, TriggerOption, encode_options, flag_names, has_flag,
};
use crate::node::NodeId;

impl Writer<'_> {
    // ─── Nodes ────────────────────────────────────────────────────────────

    /// `nodes` then `nodes2`, each grouped by node defaults with node 0 first.
    ///
    /// Legacy documents address numbered nodes by declaration index, so
    /// their ids are rewritten to the running position.
    pub(super) fn nodes(&mut self, module: &Module) {
        let mut numbered = group_by_handle(module.numbered_nodes(), |n| &n.node_defaults);
        if let Some(pos) = numbered.iter().position(|n| n.id == NodeId::Numbered(0)) {
            let zero = numbered.remove(pos);
            numbered.insert(0, zero);
        }
        if !numbered.is_empty() {
            self.block(Keyword::Nodes);
            for node in numbered {
                let id = if self.renumber_nodes {
                    let id = self.next_node_number;
                    self.next_node_number += 1;
                    id.to_string()
                } else {
                    node.id.to_string()
                };
                self.node_line(node, id);
            }
        }

        let named = group_by_handle(module.named_nodes(), |n| &n.node_defaults);
        if !named.is_empty() {
            self.block(Keyword::Nodes2);
            for node in named {
                self.node_line(node, node.id.to_string());
            }
        }
    }

    fn node_line(&mut self, node: &Node, id: String) {
        self.sync_node(&node.node_defaults);
        self.sync_beam(&node.beam_defaults);
        self.sync_minimass(&node.minimass);
        self.sync_detacher_group(node.detacher_group);
        let width = self.config.coordinate_width;
        let row = self
            .row()
            .padded(id, self.config.node_id_width)
            .padded_float(node.position.x, width)
            .padded_float(node.position.y, width)
            .padded_float(node.position.z, width)
            .opt_field(
                encode_options::<NodeOption>(node.options),
                node.options == 0 && node.load_weight_override.is_none(),
            )
            .maybe_float(node.load_weight_override);
        self.data(row);
    }

    pub(super) fn cinecams(&mut self, module: &Module) {
        if module.cinecams.is_empty() {
            return;
        }
        self.block(Keyword::Cinecam);
        for cam in &module.cinecams {
            self.sync_beam(&cam.beam_defaults);
            self.sync_node(&cam.node_defaults);
            let row = self
                .row()
                .floats(&[cam.position.x, cam.position.y, cam.position.z])
                .nodes(&cam.nodes)
                .opt_float(cam.spring, 8000.0)
                .opt_float(cam.damping, 800.0)
                .opt_float(cam.node_mass, 20.0);
            self.data(row);
        }
    }

    // ─── Beams and shocks ─────────────────────────────────────────────────

    pub(super) fn beams(&mut self, module: &Module) {
        if module.beams.is_empty() {
            return;
        }
        self.block(Keyword::Beams);
        let width = self.config.beam_node_width;
        for beam in group_by_handle(&module.beams, |b| &b.defaults) {
            self.sync_beam(&beam.defaults);
            self.sync_detacher_group(beam.detacher_group);
            let row = self
                .row()
                .padded_node(&beam.nodes[0], width)
                .padded_node(&beam.nodes[1], width)
                .opt_field(
                    encode_options::<BeamOption>(beam.options),
                    beam.options == 0 && beam.extension_break_limit.is_none(),
                )
                .maybe_float(beam.extension_break_limit);
            self.data(row);
        }
    }

    pub(super) fn shocks(&mut self, module: &Module) {
        if module.shocks.is_empty() {
            return;
        }
        self.block(Keyword::Shocks);
        let width = self.config.beam_node_width;
        for shock in group_by_handle(&module.shocks, |s| &s.beam_defaults) {
            self.sync_beam(&shock.beam_defaults);
            self.sync_detacher_group(shock.detacher_group);
            let row = self
                .row()
                .padded_node(&shock.nodes[0], width)
                .padded_node(&shock.nodes[1], width)
                .floats(&[
                    shock.spring_rate,
                    shock.damping,
                    shock.short_bound,
                    shock.long_bound,
                    shock.precompression,
                ])
                .opt_field(encode_options::<ShockOption>(shock.options), shock.options == 0);
            self.data(row);
        }
    }

    pub(super) fn shocks2(&mut self, module: &Module) {
        if module.shocks2.is_empty() {
            return;
        }
        self.block(Keyword::Shocks2);
        let width = self.config.beam_node_width;
        for shock in group_by_handle(&module.shocks2, |s| &s.beam_defaults) {
            self.sync_beam(&shock.beam_defaults);
            self.sync_detacher_group(shock.detacher_group);
            let row = self
                .row()
                .padded_node(&shock.nodes[0], width)
                .padded_node(&shock.nodes[1], width)
                .floats(&[
                    shock.spring_in,
                    shock.damp_in,
                    shock.progress_factor_spring_in,
                    shock.progress_factor_damp_in,
                    shock.spring_out,
                    shock.damp_out,
                    shock.progress_factor_spring_out,
                    shock.progress_factor_damp_out,
                    shock.short_bound,
                    shock.long_bound,
                    shock.precompression,
                ])
                .opt_field(encode_options::<Shock2Option>(shock.options), shock.options == 0);
            self.data(row);
        }
    }

    pub(super) fn shocks3(&mut self, module: &Module) {
        if module.shocks3.is_empty() {
            return;
        }
        self.block(Keyword::Shocks3);
        let width = self.config.beam_node_width;
        for shock in group_by_handle(&module.shocks3, |s| &s.beam_defaults) {
            self.sync_beam(&shock.beam_defaults);
            self.sync_detacher_group(shock.detacher_group);
            let row = self
                .row()
                .padded_node(&shock.nodes[0], width)
                .padded_node(&shock.nodes[1], width)
                .floats(&[
                    shock.spring_in,
                    shock.damp_in,
                    shock.damp_in_slow,
                    shock.split_vel_in,
                    shock.damp_in_fast,
                    shock.spring_out,
                    shock.damp_out,
                    shock.damp_out_slow,
                    shock.split_vel_out,
                    shock.damp_out_fast,
                    shock.short_bound,
                    shock.long_bound,
                    shock.precompression,
                ])
                .opt_field(encode_options::<Shock3Option>(shock.options), shock.options == 0);
            self.data(row);
        }
    }

    // ─── Actuators ────────────────────────────────────────────────────────

    pub(super) fn hydros(&mut self, module: &Module) {
        if module.hydros.is_empty() {
            return;
        }
        self.block(Keyword::Hydros);
        let width = self.config.beam_node_width;
        for hydro in group_by_handle(&module.hydros, |h| &h.beam_defaults) {
            self.sync_beam(&hydro.beam_defaults);
            self.sync_inertia(&hydro.inertia_defaults);
            self.sync_detacher_group(hydro.detacher_group);
            let row = self
                .row()
                .padded_node(&hydro.nodes[0], width)
                .padded_node(&hydro.nodes[1], width)
                .float(hydro.lengthening_factor)
                .opt_field(
                    encode_options::<HydroOption>(hydro.options),
                    hydro.options == HydroOption::NormalInput.bit(),
                )
                .inertia(&hydro.inertia);
            self.data(row);
        }
    }

    /// `commands` and `commands2` records go back to the block they came from.
    pub(super) fn commands(&mut self, module: &Module) {
        for (keyword, version) in [(Keyword::Commands, 1), (Keyword::Commands2, 2)] {
            let records = module.commands2.iter().filter(|c| c.format_version == version);
            let grouped = group_by_handle(records, |c| &c.beam_defaults);
            if grouped.is_empty() {
                continue;
            }
            self.block(keyword);
            for command in grouped {
                self.command_line(command, version == 2);
            }
        }
    }

    fn command_line(&mut self, command: &Command2, is_v2: bool) {
        self.sync_beam(&command.beam_defaults);
        self.sync_inertia(&command.inertia_defaults);
        self.sync_detacher_group(command.detacher_group);
        let width = self.config.beam_node_width;
        let mut row = self
            .row()
            .padded_node(&command.nodes[0], width)
            .padded_node(&command.nodes[1], width)
            .float(command.shorten_rate);
        if is_v2 {
            row = row.float(command.lengthen_rate);
        }
        let row = row
            .float(command.max_contraction)
            .float(command.max_extension)
            .int(command.contract_key)
            .int(command.extend_key)
            .opt_field(command.options.encode(), command.options == Default::default())
            .opt_text(&command.description)
            .inertia(&command.inertia)
            .opt_float(command.affect_engine, 1.0)
            .opt_bool(command.needs_engine, true)
            .opt_bool(command.plays_sound, true);
        self.data(row);
    }

    pub(super) fn animators(&mut self, module: &Module) {
        if module.animators.is_empty() {
            return;
        }
        self.block(Keyword::Animators);
        for animator in &module.animators {
            self.sync_beam(&animator.beam_defaults);
            self.sync_inertia(&animator.inertia_defaults);
            self.sync_detacher_group(animator.detacher_group);
            let row = self
                .row()
                .node(&animator.nodes[0])
                .node(&animator.nodes[1])
                .float(animator.lengthening_factor)
                .text(self.animator_flags(animator));
            self.data(row);
        }
    }

    /// Flags joined with `|`; limits carry their value, aero sources their
    /// 1-based engine number. An empty list is written as a lone `|`.
    fn animator_flags(&self, animator: &Animator) -> String {
        let precision = self.config.float_precision;
        let mut tokens: Vec<String> = Vec::new();
        for flag in AnimatorFlag::ALL.iter().copied() {
            if !has_flag(animator.flags, flag) {
                continue;
            }
            match flag {
                AnimatorFlag::ShortLimit => tokens.push(format!(
                    "shortlimit: {}",
                    super::format_float(animator.short_limit, precision)
                )),
                AnimatorFlag::LongLimit => tokens.push(format!(
                    "longlimit: {}",
                    super::format_float(animator.long_limit, precision)
                )),
                other => tokens.push(other.name().to_string()),
            }
        }
        let engine = animator.aero_animator.engine_index + 1;
        for source in flag_names::<AeroSource>(animator.aero_animator.flags) {
            tokens.push(format!("{source}{engine}"));
        }
        if tokens.is_empty() {
            "|".to_string()
        } else {
            tokens.join(" | ")
        }
    }

    pub(super) fn triggers(&mut self, module: &Module) {
        if module.triggers.is_empty() {
            return;
        }
        self.block(Keyword::Triggers);
        for trigger in &module.triggers {
            self.sync_beam(&trigger.beam_defaults);
            self.sync_detacher_group(trigger.detacher_group);
            let (short_action, long_action) = trigger.action.raw();
            let row = self
                .row()
                .node(&trigger.nodes[0])
                .node(&trigger.nodes[1])
                .float(trigger.contraction_trigger_limit)
                .float(trigger.expansion_trigger_limit)
                .int(short_action)
                .int(long_action)
                .opt_field(encode_options::<TriggerOption>(trigger.options), trigger.options == 0)
                .opt_float(trigger.boundary_timer, 1.0);
            self.data(row);
        }
    }

    pub(super) fn rotators(&mut self, module: &Module) {
        if module.rotators.is_empty() {
            return;
        }
        self.block(Keyword::Rotators);
        for rotator in &module.rotators {
            self.sync_inertia(&rotator.inertia_defaults);
            let row = self.rotator_head(rotator);
            let row = self.rotator_tail(row, rotator);
            self.data(row);
        }
    }

    pub(super) fn rotators2(&mut self, module: &Module) {
        if module.rotators2.is_empty() {
            return;
        }
        self.block(Keyword::Rotators2);
        for rotator in &module.rotators2 {
            self.sync_inertia(&rotator.base.inertia_defaults);
            let row = self
                .rotator_head(&rotator.base)
                .float(rotator.rotating_force)
                .float(rotator.tolerance)
                .word(&rotator.description);
            let row = self.rotator_tail(row, &rotator.base);
            self.data(row);
        }
    }

    fn rotator_head(&self, rotator: &Rotator) -> super::Row {
        self.row()
            .nodes(&rotator.axis_nodes)
            .nodes(&rotator.base_plate_nodes)
            .nodes(&rotator.rotating_plate_nodes)
            .float(rotator.rate)
            .int(rotator.spin_left_key)
            .int(rotator.spin_right_key)
    }

    fn rotator_tail(&self, row: super::Row, rotator: &Rotator) -> super::Row {
        row.inertia(&rotator.inertia)
            .opt_float(rotator.engine_coupling, 1.0)
            .opt_bool(rotator.needs_engine, false)
    }

    // ─── Ties, ropes and locks ────────────────────────────────────────────

    pub(super) fn ties(&mut self, module: &Module) {
        if module.ties.is_empty() {
            return;
        }
        self.block(Keyword::Ties);
        for tie in &module.ties {
            self.sync_beam(&tie.beam_defaults);
            self.sync_detacher_group(tie.detacher_group);
            let options = match (tie.is_invisible, tie.disable_self_lock) {
                (false, false) => "n",
                (true, false) => "i",
                (false, true) => "s",
                (true, true) => "is",
            };
            let row = self
                .row()
                .node(&tie.root_node)
                .float(tie.max_reach_length)
                .float(tie.auto_shorten_rate)
                .float(tie.min_length)
                .float(tie.max_length)
                .opt_field(options, options == "n")
                .opt_float(tie.max_stress, 100_000.0)
                .opt_int(i64::from(tie.group), -1);
            self.data(row);
        }
    }

    pub(super) fn ropes(&mut self, module: &Module) {
        if module.ropes.is_empty() {
            return;
        }
        self.block(Keyword::Ropes);
        for rope in &module.ropes {
            self.sync_beam(&rope.beam_defaults);
            self.sync_detacher_group(rope.detacher_group);
            let row = self
                .row()
                .node(&rope.root_node)
                .node(&rope.end_node)
                .opt_field(if rope.invisible { "i" } else { "n" }, !rope.invisible);
            self.data(row);
        }
    }

    pub(super) fn ropables(&mut self, module: &Module) {
        if module.ropables.is_empty() {
            return;
        }
        self.block(Keyword::Ropables);
        for ropable in &module.ropables {
            let row = self
                .row()
                .node(&ropable.node)
                .opt_int(i64::from(ropable.group), -1)
                .opt_field("1", !ropable.has_multilock);
            self.data(row);
        }
    }

    pub(super) fn fixes(&mut self, module: &Module) {
        if module.fixes.is_empty() {
            return;
        }
        self.block(Keyword::Fixes);
        for node in &module.fixes {
            let row = self.row().node(node);
            self.data(row);
        }
    }

    pub(super) fn contacters(&mut self, module: &Module) {
        if module.contacters.is_empty() {
            return;
        }
        self.block(Keyword::Contacters);
        for node in &module.contacters {
            let row = self.row().node(node);
            self.data(row);
        }
    }

    /// Attributes are written only when they differ from [`crate::model::Hook::new`].
    pub(super) fn hooks(&mut self, module: &Module) {
        if module.hooks.is_empty() {
            return;
        }
        self.block(Keyword::Hooks);
        let precision = self.config.float_precision;
        let float = |v: f32| super::format_float(v, precision);
        for hook in &module.hooks {
            let defaults = crate::model::Hook::new(hook.node);
            let mut row = self.row().node(&hook.node);
            let valued = [
                ("hookrange", hook.hook_range != defaults.hook_range, float(hook.hook_range)),
                ("speedcoef", hook.speed_coef != defaults.speed_coef, float(hook.speed_coef)),
                ("maxforce", hook.max_force != defaults.max_force, float(hook.max_force)),
                ("hookgroup", hook.hookgroup != defaults.hookgroup, hook.hookgroup.to_string()),
                ("lockgroup", hook.lockgroup != defaults.lockgroup, hook.lockgroup.to_string()),
                ("timer", hook.timer != defaults.timer, float(hook.timer)),
                (
                    "shortlimit",
                    hook.min_range_meters != defaults.min_range_meters,
                    float(hook.min_range_meters),
                ),
            ];
            for (key, differs, value) in valued {
                if differs {
                    row = row.text(format!("{key} {value}"));
                }
            }
            let flags = [
                ("selflock", hook.self_lock),
                ("autolock", hook.auto_lock),
                ("nodisable", hook.no_disable),
                ("norope", hook.no_rope),
                ("visible", hook.visible),
            ];
            for (flag, set) in flags {
                if set {
                    row = row.text(flag);
                }
            }
            self.data(row);
        }
    }

    pub(super) fn lockgroups(&mut self, module: &Module) {
        if module.lockgroups.is_empty() {
            return;
        }
        self.block(Keyword::Lockgroups);
        for group in &module.lockgroups {
            let row = self.row().int(group.number).nodes(&group.nodes);
            self.data(row);
        }
    }

    pub(super) fn railgroups(&mut self, module: &Module) {
        if module.railgroups.is_empty() {
            return;
        }
        self.block(Keyword::Railgroups);
        for group in &module.railgroups {
            let row = group
                .node_list
                .iter()
                .fold(self.row().int(group.id), |row, range| row.range(range));
            self.data(row);
        }
    }

    /// Attributes are glued to their letter (`S9000`), as the parser splits
    /// the line on spaces too.
    pub(super) fn slidenodes(&mut self, module: &Module) {
        if module.slidenodes.is_empty() {
            return;
        }
        self.block(Keyword::Slidenodes);
        let precision = self.config.float_precision;
        let float = |v: f32| super::format_float(v, precision);
        for slide in &module.slidenodes {
            let mut row = slide
                .rail_node_ranges
                .iter()
                .fold(self.row().node(&slide.slide_node), |row, range| row.range(range));
            let floats = [
                ('S', slide.spring_rate),
                ('B', slide.break_force),
                ('T', slide.tolerance),
                ('R', slide.attachment_rate),
            ];
            for (letter, value) in floats {
                if let Some(v) = value {
                    row = row.text(format!("{letter}{}", float(v)));
                }
            }
            if let Some(group) = slide.railgroup_id {
                row = row.text(format!("G{group}"));
            }
            if let Some(distance) = slide.max_attach_dist {
                row = row.text(format!("D{}", float(distance)));
            }
            for constraint in SlideConstraint::ALL.iter().copied() {
                if slide.constraint_flags & constraint.bit() != 0 {
                    row = row.text(format!("C{}", constraint.letter()));
                }
            }
            self.data(row);
        }
    }

    // ─── Submeshes, cameras, collision ────────────────────────────────────

    pub(super) fn submeshes(&mut self, module: &Module) {
        for submesh in &module.submeshes {
            self.block(Keyword::Submesh);
            if !submesh.texcoords.is_empty() {
                self.line(&format!("\t{}", Keyword::Texcoords));
                for tc in &submesh.texcoords {
                    let row = self.row().node(&tc.node).float(tc.u).float(tc.v);
                    self.nested(row);
                }
            }
            if !submesh.cab_triangles.is_empty() {
                self.line(&format!("\t{}", Keyword::Cab));
                for cab in &submesh.cab_triangles {
                    let row = self
                        .row()
                        .nodes(&cab.nodes)
                        .opt_field(encode_options::<CabOption>(cab.options), cab.options == 0);
                    self.nested(row);
                }
            }
            if submesh.backmesh {
                self.line(&format!("\t{}", Keyword::Backmesh));
            }
        }
    }

    pub(super) fn cameras(&mut self, module: &Module) {
        if module.cameras.is_empty() {
            return;
        }
        self.block(Keyword::Cameras);
        for camera in &module.cameras {
            let row = self
                .row()
                .node(&camera.center_node)
                .node(&camera.back_node)
                .node(&camera.left_node);
            self.data(row);
        }
    }

    /// One block per rail; a new `camerarail` header starts the next rail.
    pub(super) fn camera_rails(&mut self, module: &Module) {
        for rail in &module.camera_rails {
            self.block(Keyword::Camerarail);
            for node in &rail.nodes {
                let row = self.row().node(node);
                self.data(row);
            }
        }
    }

    pub(super) fn collision_boxes(&mut self, module: &Module) {
        if module.collision_boxes.is_empty() {
            return;
        }
        self.block(Keyword::Collisionboxes);
        for collision_box in &module.collision_boxes {
            let row = self.row().nodes(&collision_box.nodes);
            self.data(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParserConfig, parse_truck};
    use crate::serializer::{SerializerConfig, serialize_document};
    use pretty_assertions::assert_eq;

    const NODES: &str = "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\n3 1 1 0\n4 0 0 1\n5 1 0 1\n6 0 1 1\n7 1 1 1\n8 2 0 0\n9 2 1 0\n";

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
    fn legacy_nodes_follow_importer_layout() {
        let source = "t\nnodes\n0 0 0 0\n1 1 0 0\nnodes2\nhub 0 1 0\nnodes\n3 1 1 0\nbeams\n0 3\n1 hub\n";
        let text = serialize(source);
        assert!(text.contains("\t   2,          1,          1,          0\n"));
        assert!(text.contains("nodes2\n\t hub,          0,          1,          0\n"));
        assert!(text.contains("\t   0,    2\n"));
        assert!(text.contains("\t   1,  hub\n"));
        assert_eq!(serialize(&text), text);
    }

    #[test]
    fn modern_nodes_keep_their_ids() {
        let text = serialize("t\nfileformatversion 450\nnodes\n0 0 0 0\n7 1 0 0\nbeams\n0 7\n");
        assert!(text.contains("\t   7,          1,          0,          0\n"));
        assert!(text.contains("\t   0,    7\n"));
    }

    #[test]
    fn node_zero_comes_first() {
        let text = serialize(
            "t\nfileformatversion 450\nnodes\nset_node_defaults 20 -1 -1 -1 n\n1 1 0 0\nset_node_defaults -1 -1 -1 -1 n\n0 0 0 0\n",
        );
        let zero = text.find("\t   0,").expect("node 0");
        let one = text.find("\t   1,").expect("node 1");
        assert!(zero < one);
    }

    #[test]
    fn commands_return_to_their_block() {
        let (text, again) = reserialize(
            "commands\n0 1 0.1 0.5 1.5 3 4\ncommands2\n0 1 0.1 0.2 0.5 1.5 5 6 n Lift\n",
        );
        assert!(text.contains("commands\n\t   0,    1, 0.1, 0.5, 1.5, 3, 4\n"));
        assert!(text.contains("commands2\n\t   0,    1, 0.1, 0.2, 0.5, 1.5, 5, 6, n, Lift\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn animator_flags_and_limits() {
        let (text, again) =
            reserialize("animators\n0, 1, 0.5, vis | roll | shortlimit: 0.1 | throttle2\n");
        assert!(text.contains("\t0, 1, 0.5, vis | roll | shortlimit: 0.1 | throttle2\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn ties_ropes_and_hooks() {
        let (text, again) = reserialize(
            "ties\n0 1.5 0.5 0.8 1.2 i 90000 2\nropes\n0 1 i\nhooks\n0 hookrange 0.8 selflock visible\n",
        );
        assert!(text.contains("ties\n\t0, 1.5, 0.5, 0.8, 1.2, i, 90000, 2\n"));
        assert!(text.contains("ropes\n\t0, 1, i\n"));
        assert!(text.contains("hooks\n\t0, hookrange 0.8, selflock, visible\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn slidenode_attributes_are_glued() {
        let (text, again) = reserialize("slidenodes\n0, 1, 2, S9000, B5000, Ca\n");
        assert!(text.contains("slidenodes\n\t0, 1, 2, S9000, B5000, Ca\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn submesh_nests_its_sub_blocks() {
        let (text, again) = reserialize(
            "submesh\ntexcoords\n0 0 0\n1 1 0\n2 0 1\ncab\n0 1 2 c\nbackmesh\n",
        );
        assert!(text.contains(
            "submesh\n\ttexcoords\n\t\t0, 0, 0\n\t\t1, 1, 0\n\t\t2, 0, 1\n\tcab\n\t\t0, 1, 2, c\n\tbackmesh\n"
        ));
        assert_eq!(text, again);
    }

    #[test]
    fn rotators_drop_default_inertia() {
        let (text, again) = reserialize(
            "rotators\n0 1 2 3 4 5 6 7 8 9 0.5 10 11\nrotators2\n0 1 2 3 4 5 6 7 8 9 0.5 10 11 5000 0.1 Turntable\n",
        );
        assert!(text.contains("rotators\n\t0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0.5, 10, 11\n"));
        assert!(text.contains("rotators2\n\t0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0.5, 10, 11, 5000, 0.1, Turntable\n"));
        assert_eq!(text, again);
    }

    #[test]
    fn hydro_normal_input_is_implied() {
        let (text, again) = reserialize("hydros\n0 1 0.5\n0 2 0.5 i\n");
        assert!(text.contains("\t   0,    1, 0.5\n"));
        assert!(text.contains("\t   0,    2, 0.5, i\n"));
        assert_eq!(text, again);
    }
}
