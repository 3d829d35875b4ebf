//! Inline directives: module switching, document metadata and the
//! `set_*` family that replaces the ambient defaults.

use super::Parser;
use crate::args::Args;
use crate::defaults::{
    BeamDefaultsArgs, BeamScaleArgs, DEFAULT_COLLISION_RANGE, InertiaArgs, NodeDefaultsArgs,
};
use crate::document::{Line, ROOT_MODULE_NAME};
use crate::keyword::Keyword;
use crate::model::{Author, FileInfo, NodeOption, SkeletonSettings, encode_options};

/// From this version on, node numbering no longer needs the importer.
const IMPORTER_CUTOFF_VERSION: u32 = 450;

/// Optional float at `index`.
fn opt_float(a: &Args, index: usize) -> Option<f32> {
    (a.len() > index).then(|| a.float(index))
}

fn opt_string(a: &Args, index: usize) -> Option<String> {
    (a.len() > index).then(|| a.string(index))
}

impl Parser<'_> {
    /// Record a defaults change in the module's line order.
    fn mark_directive(&mut self, keyword: Keyword) {
        self.module_mut().lines.push(Line::directive(keyword));
    }

    // ─── Modules ──────────────────────────────────────────────────────────

    /// `section <version> <name>`.
    pub(super) fn parse_section(&mut self, a: &Args) {
        if !a.check_count(3) {
            return;
        }
        let name = a.str(2);
        if name == self.current_module_name() {
            a.error("Attempt to re-enter current module, ignoring...");
            return;
        }
        if name == ROOT_MODULE_NAME {
            a.error(format!("Module name '{ROOT_MODULE_NAME}' is reserved, ignoring..."));
            return;
        }
        if a.len() > 3 {
            a.warn(format!(
                "Directive 'section' takes one module name, ignoring '{}'",
                a.rest_from(3)
            ));
        }
        self.enter_module(name, a.line());
    }

    // ─── Document metadata ────────────────────────────────────────────────

    fn warn_if_global(&self, a: &Args, keyword: Keyword) {
        if !self.is_root_module() {
            a.warn(format!(
                "Directive '{keyword}' has global effect and should not appear in a module"
            ));
        }
    }

    /// `author <type> [forum id] [name] [email]`. A negative forum id means none.
    pub(super) fn parse_author(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        self.warn_if_global(a, Keyword::Author);
        let author = Author {
            author_type: a.string(1),
            forum_account_id: (a.len() > 2)
                .then(|| a.int(2))
                .and_then(|id| u32::try_from(id).ok()),
            name: opt_string(a, 3).unwrap_or_default(),
            email: opt_string(a, 4).unwrap_or_default(),
        };
        self.document.authors.push(author);
    }

    /// `fileinfo <unique id> [category] [version]`.
    pub(super) fn parse_file_info(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        self.warn_if_global(a, Keyword::FileInfo);
        let mut info = FileInfo {
            unique_id: a.str(1).trim().to_string(),
            ..FileInfo::default()
        };
        if a.len() > 2 {
            info.category_id = a.int(2);
        }
        if a.len() > 3 {
            info.file_version = a.int(3);
        }
        self.document.file_info = Some(info);
    }

    pub(super) fn parse_guid(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        self.warn_if_global(a, Keyword::Guid);
        if !self.document.guid.is_empty() {
            a.warn("Multiple sections 'guid', using the last defined...");
        }
        self.document.guid = a.str(1).trim().to_string();
    }

    /// Versions at or above 450 switch the sequential importer off.
    pub(super) fn parse_file_format_version(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        self.warn_if_global(a, Keyword::FileFormatVersion);
        let version = a.uint(1);
        self.document.file_format_version = version;
        if version >= IMPORTER_CUTOFF_VERSION && self.importer.is_enabled() {
            log::debug!(
                "line {}: fileformatversion {version}, sequential importer disabled",
                self.line_number
            );
            self.importer.disable();
        }
    }

    // ─── Defaults ─────────────────────────────────────────────────────────

    /// `set_beam_defaults spring [damp [deform [break [diameter [material [plastic]]]]]]`.
    pub(super) fn parse_set_beam_defaults(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let args = BeamDefaultsArgs {
            springiness: a.float(1),
            damping_constant: opt_float(a, 2),
            deformation_threshold: opt_float(a, 3),
            breaking_threshold: opt_float(a, 4),
            visual_beam_diameter: opt_float(a, 5),
            beam_material_name: opt_string(a, 6),
            plastic_deform_coef: opt_float(a, 7),
        };
        let advanced = self.document.flags.enable_advanced_deformation;
        self.defaults.set_beam_defaults(args, advanced);
        self.mark_directive(Keyword::SetBeamDefaults);
    }

    pub(super) fn parse_set_beam_defaults_scale(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let args = BeamScaleArgs {
            springiness: a.float(1),
            damping_constant: opt_float(a, 2),
            deformation_threshold: opt_float(a, 3),
            breaking_threshold: opt_float(a, 4),
        };
        self.defaults.set_beam_defaults_scale(args);
        self.mark_directive(Keyword::SetBeamDefaultsScale);
    }

    /// `set_node_defaults load [friction [volume [surface [options]]]]`.
    pub(super) fn parse_set_node_defaults(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let args = NodeDefaultsArgs {
            load_weight: a.float(1),
            friction: opt_float(a, 2),
            volume: opt_float(a, 3),
            surface: opt_float(a, 4),
            options: (a.len() > 5).then(|| a.node_options(5)),
        };
        self.defaults.set_node_defaults(args);
        if self.config.report_node_defaults {
            let d = &self.defaults.node;
            a.info(format!(
                "Parsed data for verification: LoadWeight: {}, Friction: {}, Volume: {}, Surface: {}, Options: {}",
                d.load_weight,
                d.friction,
                d.volume,
                d.surface,
                encode_options::<NodeOption>(d.options)
            ));
        }
        self.mark_directive(Keyword::SetNodeDefaults);
    }

    /// Any negative delay restores the built-in inertia.
    pub(super) fn parse_set_inertia_defaults(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let args = InertiaArgs {
            start_delay_factor: a.float(1),
            stop_delay_factor: opt_float(a, 2),
            start_function: opt_string(a, 3),
            stop_function: opt_string(a, 4),
        };
        self.defaults.set_inertia_defaults(args);
        self.mark_directive(Keyword::SetInertiaDefaults);
    }

    pub(super) fn parse_set_default_minimass(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        self.defaults.set_default_minimass(a.float(1));
        self.mark_directive(Keyword::SetDefaultMinimass);
    }

    /// Only `0` and `1` are meaningful; anything else reads as `0`.
    pub(super) fn parse_set_managed_materials_options(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let value = a.int(1);
        if value != 0 && value != 1 {
            a.warn(format!(
                "Directive 'set_managedmaterials_options': Invalid value of parameter ~1: '{}', should be only '0' or '1'. Interpreting as '0' for backwards compatibility. Please fix.",
                a.str(1)
            ));
        }
        self.defaults.set_managed_material_options(value == 1);
        self.mark_directive(Keyword::SetManagedMaterialsOptions);
    }

    /// `detacher_group <n>` or `detacher_group end`.
    pub(super) fn parse_detacher_group(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let group = if a.str(1) == "end" { None } else { Some(a.int(1)) };
        self.defaults.set_detacher_group(group);
        self.mark_directive(Keyword::DetacherGroup);
    }

    // ─── Module settings ──────────────────────────────────────────────────

    pub(super) fn parse_set_collision_range(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let mut range = a.float(1);
        if range < 0.0 {
            range = DEFAULT_COLLISION_RANGE;
        }
        self.set_single(Keyword::SetCollisionRange, a, |m| &mut m.collision_range, range);
    }

    pub(super) fn parse_set_shadows(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let mode = a.int(1);
        self.set_single(Keyword::SetShadows, a, |m| &mut m.shadow_mode, mode);
    }

    /// Negative values take the built-in visibility range and thickness.
    pub(super) fn parse_set_skeleton_settings(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let mut settings = SkeletonSettings::default();
        let visibility = a.float(1);
        if visibility >= 0.0 {
            settings.visibility_range_meters = visibility;
        }
        if let Some(thickness) = opt_float(a, 2).filter(|t| *t >= 0.0) {
            settings.beam_thickness_meters = thickness;
        }
        self.set_single(Keyword::SetSkeletonSettings, a, |m| &mut m.skeleton_settings, settings);
    }

    pub(super) fn parse_submesh_groundmodel(&mut self, a: &Args) {
        if !a.check_count(2) {
            return;
        }
        let name = a.string(1);
        self.set_single(Keyword::SubmeshGroundmodel, a, |m| &mut m.submesh_groundmodel, name);
    }

    /// Marks the staged submesh as double-sided.
    pub(super) fn parse_backmesh(&mut self, a: &Args) {
        match self.staged_submesh.as_mut() {
            Some(submesh) => submesh.backmesh = true,
            None => a.error("Misplaced sub-directive 'backmesh' (belongs in section 'submesh'), ignoring..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::defaults::*;
    use crate::diagnostics::Severity;
    use crate::document::Line;
    use crate::keyword::Keyword;
    use crate::model::*;
    use crate::parser::{ParseOutput, ParserConfig, parse_truck};
    use std::rc::Rc;

    fn parse(text: &str) -> ParseOutput {
        parse_truck(text, &ParserConfig::default())
    }

    #[test]
    fn author_lines_accumulate_on_the_document() {
        let out = parse("t\nauthor chassis 1234 Jane jane@example.com\nauthor textures\n");
        let authors = &out.document.authors;
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].author_type, "chassis");
        assert_eq!(authors[0].forum_account_id, Some(1234));
        assert_eq!(authors[0].email, "jane@example.com");
        assert_eq!(authors[1].forum_account_id, None);
        assert!(authors[1].name.is_empty());
    }

    #[test]
    fn author_in_module_warns() {
        let out = parse("t\nsection 1 alt\nauthor chassis\nend_section\n");
        assert_eq!(out.document.authors.len(), 1);
        assert!(out.diagnostics.contains("Directive 'author' has global effect"));
    }

    #[test]
    fn fileinfo_and_guid() {
        let out = parse("t\nfileinfo 1234UID, 101, 3\nguid abc-123\nguid def-456\n");
        let info = out.document.file_info.as_ref().expect("fileinfo");
        assert_eq!(info.unique_id, "1234UID");
        assert_eq!(info.category_id, 101);
        assert_eq!(info.file_version, 3);
        assert_eq!(out.document.guid, "def-456");
        assert!(out.diagnostics.contains("Multiple sections 'guid'"));
    }

    #[test]
    fn fileinfo_defaults() {
        let out = parse("t\nfileinfo uid\n");
        let info = out.document.file_info.as_ref().expect("fileinfo");
        assert_eq!(info.category_id, -1);
        assert_eq!(info.file_version, 0);
    }

    #[test]
    fn file_format_version_is_recorded() {
        let out = parse("t\nfileformatversion 450\n");
        assert_eq!(out.document.file_format_version, 450);
    }

    #[test]
    fn beam_defaults_apply_to_later_beams() {
        let out = parse(
            "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\nbeams\n0 1\nset_beam_defaults 1000 -1 -1 -1 0.2 tracks/mybeam\n1 2\n",
        );
        let beams = &out.document.root.beams;
        assert!(!beams[0].defaults.is_user_defined);
        let d = &beams[1].defaults;
        assert!(d.is_user_defined);
        assert_eq!(d.springiness, 1000.0);
        assert_eq!(d.damping_constant, DEFAULT_DAMP);
        assert_eq!(d.visual_beam_diameter, 0.2);
        assert_eq!(d.beam_material_name, "tracks/mybeam");
    }

    #[test]
    fn advanced_deformation_flag_is_captured() {
        let out = parse(
            "t\nenable_advanced_deformation\nnodes\n0 0 0 0\n1 1 0 0\nset_beam_defaults 1000\nbeams\n0 1\n",
        );
        assert!(out.document.root.beams[0].defaults.enable_advanced_deformation);
    }

    #[test]
    fn beam_defaults_scale_carries_into_snapshot() {
        let out = parse(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nset_beam_defaults_scale 2 3\nbeams\n0 1\n",
        );
        let scale = out.document.root.beams[0].defaults.scale;
        assert_eq!(scale.springiness, 2.0);
        assert_eq!(scale.damping_constant, 3.0);
        assert_eq!(scale.deformation_threshold, 1.0);
    }

    #[test]
    fn node_defaults_share_one_snapshot_until_changed() {
        let out = parse(
            "t\nset_node_defaults 10 0.5 0.5 0.5 c\nnodes\n0 0 0 0\n1 1 0 0\nset_node_defaults -1\n2 0 1 0\n",
        );
        let nodes = &out.document.root.nodes;
        assert!(Rc::ptr_eq(&nodes[0].node_defaults, &nodes[1].node_defaults));
        assert!(!Rc::ptr_eq(&nodes[1].node_defaults, &nodes[2].node_defaults));
        assert_eq!(nodes[0].node_defaults.load_weight, 10.0);
        assert!(has(nodes[0].node_defaults.options, NodeOption::NoGroundContact));
        assert_eq!(nodes[2].node_defaults.load_weight, -1.0);
    }

    #[test]
    fn node_defaults_dump_on_request() {
        let config = ParserConfig {
            report_node_defaults: true,
            ..ParserConfig::default()
        };
        let out = parse_truck("t\nset_node_defaults 10 0.5\n", &config);
        assert_eq!(out.diagnostics.count(Severity::Info), 1);
        assert!(out.diagnostics.contains("Parsed data for verification: LoadWeight: 10"));
    }

    #[test]
    fn inertia_defaults_reset_on_negative() {
        let out = parse(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nset_inertia_defaults 0.5 0.7 in out\nhydros\n0 1 0.1\nset_inertia_defaults -1\n0 1 0.1\n",
        );
        let hydros = &out.document.root.hydros;
        assert_eq!(hydros[0].inertia_defaults.stop_function, "out");
        assert!(hydros[1].inertia_defaults.is_empty());
    }

    #[test]
    fn default_minimass_is_captured_by_nodes() {
        let out = parse("t\nset_default_minimass 12\nnodes\n0 0 0 0\n");
        assert_eq!(out.document.root.nodes[0].minimass.min_mass, 12.0);
    }

    #[test]
    fn managed_material_options_invalid_value_warns() {
        let out = parse("t\nset_managedmaterials_options 2\nmanagedmaterials\nm mesh_standard d.dds\n");
        assert!(!out.document.root.managed_materials[0].options.double_sided);
        assert!(out.diagnostics.contains("Interpreting as '0' for backwards compatibility"));
    }

    #[test]
    fn collision_range_and_skeleton_fall_back_on_negative() {
        let out = parse("t\nset_collision_range -1\nset_skeleton_settings -5 0.03\nset_shadows 1\n");
        let root = &out.document.root;
        assert_eq!(root.collision_range, Some(DEFAULT_COLLISION_RANGE));
        let skel = root.skeleton_settings.expect("skeleton settings");
        assert_eq!(skel.visibility_range_meters, DEFAULT_SKELETON_VISIBILITY);
        assert_eq!(skel.beam_thickness_meters, 0.03);
        assert_eq!(root.shadow_mode, Some(1));
    }

    #[test]
    fn repeated_collision_range_uses_last() {
        let out = parse("t\nset_collision_range 0.1\nset_collision_range 0.3\n");
        assert_eq!(out.document.root.collision_range, Some(0.3));
        assert!(out.diagnostics.contains("using last one"));
    }

    #[test]
    fn submesh_groundmodel_is_per_module() {
        let out = parse("t\nsubmesh_groundmodel ice\nsection 1 alt\nsubmesh_groundmodel mud\nend_section\n");
        assert_eq!(out.document.root.submesh_groundmodel.as_deref(), Some("ice"));
        let alt = out.document.module("alt").expect("module");
        assert_eq!(alt.submesh_groundmodel.as_deref(), Some("mud"));
    }

    #[test]
    fn defaults_directives_are_kept_in_line_order() {
        let out = parse("t\nset_beam_defaults 100\ndetacher_group 2\n");
        let lines = &out.document.root.lines;
        assert!(lines.contains(&Line::directive(Keyword::SetBeamDefaults)));
        assert!(lines.contains(&Line::directive(Keyword::DetacherGroup)));
    }

    #[test]
    fn section_with_extra_names_warns() {
        let out = parse("t\nsection 1 alt other\nend_section\n");
        assert!(out.document.module("alt").is_some());
        assert!(out.diagnostics.contains("ignoring 'other'"));
    }
}
