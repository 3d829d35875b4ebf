//! Truck file parser: text lines → [`Document`].
//!
//! The parser is a line engine. Each line is classified as a comment, a
//! directive, a block header or a data line; data lines are routed to the
//! block parser of the current block. Ambient defaults are captured into
//! every record as shared handles at the moment the record is created.
//!
//! Nothing here aborts on bad input. Problems become diagnostics reported
//! to the injected [`DiagnosticSink`], and the offending line or value is
//! skipped or defaulted.

mod aero;
mod directives;
mod drivetrain;
mod structure;
mod visuals;
mod wheels;

use crate::args::Args;
use crate::defaults::DefaultsState;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity};
use crate::document::{Document, Line, Module, ROOT_MODULE_NAME};
use crate::importer::SequentialImporter;
use crate::keyword::{Keyword, identify, identify_with_case};
use crate::model::{AeroSource, CameraRail, NamedFlag, Submesh};
use crate::node::{NodeRange, RefBuilder};
use crate::tokenizer::{Tokenizer, trim_trailing_comment};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`parse_truck`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Copied into every diagnostic.
    pub filename: String,
    /// Copied into every diagnostic; otherwise opaque.
    pub resource_group: String,
    /// Run the sequential importer for legacy numbered files. Default: **true**.
    pub sequential_importer: bool,
    /// Longer lines are truncated with a warning. Default: 4000.
    pub line_buffer_length: usize,
    /// Emit an info message with the resulting values of every
    /// `set_node_defaults`. Default: **false**.
    pub report_node_defaults: bool,
    /// Emit the sequential importer's node statistics as an info message.
    /// They always go to `log::debug!`. Default: **false**.
    pub report_node_statistics: bool,
    /// Emit a listing of every imported node as an info message. Default: **false**.
    pub report_node_import: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            resource_group: String::new(),
            sequential_importer: true,
            line_buffer_length: 4000,
            report_node_defaults: false,
            report_node_statistics: false,
            report_node_import: false,
        }
    }
}

/// Result of [`parse_truck`].
#[derive(Debug)]
pub struct ParseOutput {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

// ─── Entry points ─────────────────────────────────────────────────────────

/// Parse a whole truck file, collecting diagnostics.
#[must_use]
pub fn parse_truck(text: &str, config: &ParserConfig) -> ParseOutput {
    let mut diagnostics = Diagnostics::new();
    let document = parse_truck_with_sink(text, config, &mut diagnostics);
    ParseOutput {
        document,
        diagnostics,
    }
}

/// Parse a whole truck file, reporting to a caller-provided sink.
pub fn parse_truck_with_sink(
    text: &str,
    config: &ParserConfig,
    sink: &mut dyn DiagnosticSink,
) -> Document {
    let mut parser = Parser::new(config.clone(), sink);
    for line in text.lines() {
        parser.process_line(line);
    }
    parser.finalize()
}

// ─── Parser ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleSlot {
    Root,
    User(usize),
}

/// Incremental line-by-line parser.
///
/// Feed lines with [`Parser::process_line`], then call [`Parser::finalize`]
/// to flush staged blocks and run the sequential importer.
pub struct Parser<'s> {
    config: ParserConfig,
    sink: &'s mut dyn DiagnosticSink,
    document: Document,
    module: ModuleSlot,
    current_block: Keyword,
    /// Keyword reported with diagnostics: the directive being processed,
    /// or the current block for data lines.
    current_keyword: Keyword,
    defaults: DefaultsState,
    importer: SequentialImporter,
    any_named_node_defined: bool,
    line_number: u32,
    line: String,
    tokenizer: Tokenizer,
    staged_submesh: Option<Submesh>,
    staged_camera_rail: Option<CameraRail>,
    /// Index of the last prop in the current module, for `add_animation`
    /// and `prop_camera_mode`.
    last_prop: Option<usize>,
    /// Index of the last flexbody in the current module, for `forset` and
    /// `flexbody_camera_mode`.
    last_flexbody: Option<usize>,
}

impl<'s> Parser<'s> {
    pub fn new(config: ParserConfig, sink: &'s mut dyn DiagnosticSink) -> Self {
        let importer = SequentialImporter::new(config.sequential_importer);
        Self {
            config,
            sink,
            document: Document::new(),
            module: ModuleSlot::Root,
            current_block: Keyword::Invalid,
            current_keyword: Keyword::Invalid,
            defaults: DefaultsState::new(),
            importer,
            any_named_node_defined: false,
            line_number: 0,
            line: String::new(),
            tokenizer: Tokenizer::new(),
            staged_submesh: None,
            staged_camera_rail: None,
            last_prop: None,
            last_flexbody: None,
        }
    }

    /// The block currently open, `Keyword::Invalid` when none.
    #[must_use]
    pub fn current_block(&self) -> Keyword {
        self.current_block
    }

    /// Name of the module records are currently appended to.
    #[must_use]
    pub fn current_module_name(&self) -> &str {
        match self.module {
            ModuleSlot::Root => ROOT_MODULE_NAME,
            ModuleSlot::User(i) => &self.document.user_modules[i].name,
        }
    }

    /// Process one raw line (without its terminator).
    pub fn process_line(&mut self, raw: &str) {
        self.line_number += 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let raw = raw.trim_start_matches([' ', '\t']);
        if raw.is_empty() {
            return;
        }

        let mut line = std::mem::take(&mut self.line);
        line.clear();
        let limit = self.config.line_buffer_length;
        let truncated = raw.len() > limit;
        if truncated {
            let mut cut = limit;
            while !raw.is_char_boundary(cut) {
                cut -= 1;
            }
            line.push_str(&raw[..cut]);
        } else {
            line.push_str(raw);
        }

        if truncated {
            self.current_keyword = self.current_block;
            self.emit(
                Severity::Warning,
                format!("Line is longer than {limit} characters, truncating..."),
                &line,
            );
        }
        self.process_current_line(&line);
        self.line = line;
    }

    /// Flush staged blocks, run the sequential importer and return the document.
    pub fn finalize(mut self) -> Document {
        self.current_keyword = Keyword::Invalid;
        self.flush_staged("");
        if self.importer.is_enabled() {
            self.importer.process(&mut self.document);
            if self.config.report_node_statistics {
                self.importer.report_statistics();
            }
            if self.config.report_node_import {
                self.importer.report_node_listing();
            }
            for message in self.importer.take_messages() {
                self.sink.report(Diagnostic {
                    severity: message.severity,
                    filename: self.config.filename.clone(),
                    resource_group: self.config.resource_group.clone(),
                    line_number: message.line_number,
                    keyword: message.keyword,
                    module: message.module,
                    line: String::new(),
                    message: message.text,
                });
            }
        }
        self.document
    }

    // ─── Line engine ──────────────────────────────────────────────────────

    fn process_current_line(&mut self, line: &str) {
        match self.current_block {
            Keyword::Description => {
                if line.trim_end().eq_ignore_ascii_case(Keyword::EndDescription.as_str()) {
                    self.current_block = Keyword::Invalid;
                } else {
                    self.document.description.push(line.to_string());
                }
                return;
            }
            Keyword::Comment => {
                if identify(line) == Keyword::EndComment {
                    self.current_block = Keyword::Invalid;
                }
                return;
            }
            _ => {}
        }

        if line.starts_with([';', '/']) {
            return;
        }
        let line = trim_trailing_comment(line).trim_end_matches([' ', '\t']);
        if line.is_empty() {
            return;
        }

        let identified = identify_with_case(line);
        let keyword = identified.map_or(Keyword::Invalid, |id| id.keyword);
        self.current_keyword = if keyword == Keyword::Invalid {
            self.current_block
        } else {
            keyword
        };
        if identified.is_some_and(|id| !id.exact_case) {
            self.emit(
                Severity::Warning,
                format!("Keyword has invalid lettercase. Correct form is: {keyword}"),
                line,
            );
        }

        if keyword == Keyword::Invalid {
            self.process_data_line(line);
            return;
        }
        if keyword.is_obsolete() {
            // Obsolete blocks still close the previous one; their lines are dropped.
            if keyword != Keyword::Envmap {
                self.begin_block(keyword, line);
            }
            return;
        }
        if keyword.is_flag_directive() {
            if self.module != ModuleSlot::Root {
                self.emit(
                    Severity::Warning,
                    format!("Directive '{keyword}' has global effect and should not appear in a module"),
                    line,
                );
            }
            self.document.flags.set(keyword);
            return;
        }

        match keyword {
            Keyword::End => {
                self.begin_block(Keyword::Invalid, line);
                self.module_mut().lines.push(Line::boundary(Keyword::End));
            }
            Keyword::EndComment | Keyword::EndDescription => {
                self.emit(
                    Severity::Warning,
                    format!("Misplaced keyword '{keyword}', ignoring..."),
                    line,
                );
            }
            Keyword::EndSection => self.end_section(line),
            Keyword::Submesh => self.begin_submesh(line),
            Keyword::Texcoords | Keyword::Cab => {
                if self.staged_submesh.is_none() {
                    self.emit(
                        Severity::Error,
                        format!("Misplaced section '{keyword}' (belongs in section 'submesh'), its lines will be ignored"),
                        line,
                    );
                }
                self.flush_camera_rail(line);
                self.current_block = keyword;
            }
            k if k.is_inline_directive() => {
                self.with_args(line, |p, a| p.parse_directive(k, a));
            }
            _ => self.begin_block(keyword, line),
        }
    }

    fn process_data_line(&mut self, line: &str) {
        match self.current_block {
            Keyword::Invalid => {
                if self.document.name.is_empty() {
                    self.document.name = line.trim().to_string();
                }
            }
            Keyword::Submesh => self.emit(
                Severity::Error,
                "Section submesh has no subsection defined, line not parsed.",
                line,
            ),
            block if block.is_obsolete() => {}
            block => self.with_args(line, |p, a| p.parse_block_line(block, a)),
        }
    }

    /// Route a data line to its block parser.
    fn parse_block_line(&mut self, block: Keyword, a: &Args) {
        match block {
            Keyword::Nodes => self.parse_node(a, false),
            Keyword::Nodes2 => self.parse_node(a, true),
            Keyword::Beams => self.parse_beam(a),
            Keyword::Shocks => self.parse_shock(a),
            Keyword::Shocks2 => self.parse_shock2(a),
            Keyword::Shocks3 => self.parse_shock3(a),
            Keyword::Hydros => self.parse_hydro(a),
            Keyword::Commands => self.parse_command(a, 1),
            Keyword::Commands2 => self.parse_command(a, 2),
            Keyword::Animators => self.parse_animator(a),
            Keyword::Triggers => self.parse_trigger(a),
            Keyword::Ties => self.parse_tie(a),
            Keyword::Ropes => self.parse_rope(a),
            Keyword::Ropables => self.parse_ropable(a),
            Keyword::Fixes => self.parse_fixed_node(a),
            Keyword::Contacters => self.parse_contacter(a),
            Keyword::Slidenodes => self.parse_slidenode(a),
            Keyword::Railgroups => self.parse_railgroup(a),
            Keyword::Lockgroups => self.parse_lockgroup(a),
            Keyword::Hooks => self.parse_hook(a),
            Keyword::Rotators => self.parse_rotator(a, false),
            Keyword::Rotators2 => self.parse_rotator(a, true),
            Keyword::Texcoords => self.parse_texcoord(a),
            Keyword::Cab => self.parse_cab(a),
            Keyword::Camerarail => self.parse_camera_rail(a),
            Keyword::Collisionboxes => self.parse_collision_box(a),
            Keyword::Cameras => self.parse_camera(a),
            Keyword::Cinecam => self.parse_cinecam(a),

            Keyword::Wheels => self.parse_wheel(a),
            Keyword::Wheels2 => self.parse_wheel2(a),
            Keyword::Meshwheels | Keyword::Meshwheels2 => self.parse_mesh_wheel(a, block),
            Keyword::Flexbodywheels => self.parse_flexbody_wheel(a),
            Keyword::Wheeldetachers => self.parse_wheel_detacher(a),

            Keyword::Engine => self.parse_engine(a),
            Keyword::Engoption => self.parse_engoption(a),
            Keyword::Engturbo => self.parse_engturbo(a),
            Keyword::Torquecurve => self.parse_torque_curve(a),
            Keyword::Brakes => self.parse_brakes(a),
            Keyword::Axles => self.parse_axle(a),
            Keyword::Interaxles => self.parse_interaxle(a),
            Keyword::Transfercase => self.parse_transfer_case(a),

            Keyword::Wings => self.parse_wing(a),
            Keyword::Airbrakes => self.parse_airbrake(a),
            Keyword::Turboprops => self.parse_turboprop(a, false),
            Keyword::Turboprops2 => self.parse_turboprop(a, true),
            Keyword::Pistonprops => self.parse_pistonprop(a),
            Keyword::Turbojets => self.parse_turbojet(a),
            Keyword::Fusedrag => self.parse_fusedrag(a),
            Keyword::Screwprops => self.parse_screwprop(a),

            Keyword::Props => self.parse_prop(a),
            Keyword::Flexbodies => self.parse_flexbody(a),
            Keyword::Flares | Keyword::Flares2 | Keyword::Flares3 => self.parse_flare(a, block),
            Keyword::MaterialFlareBindings => self.parse_material_flare_binding(a),
            Keyword::ManagedMaterials => self.parse_managed_material(a),
            Keyword::Exhausts => self.parse_exhaust(a),
            Keyword::Particles => self.parse_particle(a),
            Keyword::Videocamera => self.parse_videocamera(a),
            Keyword::Soundsources => self.parse_soundsource(a),
            Keyword::Soundsources2 => self.parse_soundsource2(a),
            Keyword::GuiSettings => self.parse_gui_settings(a),
            Keyword::Globals => self.parse_globals(a),
            Keyword::Help => self.parse_help(a),
            Keyword::Minimass => self.parse_minimass(a),
            _ => {}
        }
    }

    /// Route an inline directive to its handler.
    fn parse_directive(&mut self, keyword: Keyword, a: &Args) {
        match keyword {
            Keyword::Section => self.parse_section(a),
            Keyword::SectionConfig => {
                a.info("Directive 'sectionconfig' is not supported, ignoring...");
            }
            Keyword::Author => self.parse_author(a),
            Keyword::FileInfo => self.parse_file_info(a),
            Keyword::Guid => self.parse_guid(a),
            Keyword::FileFormatVersion => self.parse_file_format_version(a),
            Keyword::SetBeamDefaults => self.parse_set_beam_defaults(a),
            Keyword::SetBeamDefaultsScale => self.parse_set_beam_defaults_scale(a),
            Keyword::SetNodeDefaults => self.parse_set_node_defaults(a),
            Keyword::SetInertiaDefaults => self.parse_set_inertia_defaults(a),
            Keyword::SetDefaultMinimass => self.parse_set_default_minimass(a),
            Keyword::SetManagedMaterialsOptions => self.parse_set_managed_materials_options(a),
            Keyword::SetCollisionRange => self.parse_set_collision_range(a),
            Keyword::SetShadows => self.parse_set_shadows(a),
            Keyword::SetSkeletonSettings => self.parse_set_skeleton_settings(a),
            Keyword::DetacherGroup => self.parse_detacher_group(a),
            Keyword::SubmeshGroundmodel => self.parse_submesh_groundmodel(a),
            Keyword::PropCameraMode => self.parse_prop_camera_mode(a),
            Keyword::FlexbodyCameraMode => self.parse_flexbody_camera_mode(a),
            Keyword::Backmesh => self.parse_backmesh(a),
            Keyword::AddAnimation => self.parse_add_animation(a),
            Keyword::Forset => self.parse_forset(a),
            Keyword::ExtCamera => self.parse_ext_camera(a),
            Keyword::AntiLockBrakes => self.parse_anti_lock_brakes(a),
            Keyword::TractionControl => self.parse_traction_control(a),
            Keyword::SlopeBrake => self.parse_slope_brake(a),
            Keyword::CruiseControl => self.parse_cruise_control(a),
            Keyword::SpeedLimiter => self.parse_speed_limiter(a),
            _ => {}
        }
    }

    /// Tokenize `line`, run `f` with typed accessors, then report what they raised.
    fn with_args(&mut self, line: &str, f: impl FnOnce(&mut Self, &Args)) {
        let mut tokenizer = std::mem::take(&mut self.tokenizer);
        tokenizer.tokenize(line);
        let refs = RefBuilder {
            importer_enabled: self.importer.is_enabled(),
            any_named_node_defined: self.any_named_node_defined,
            line: self.line_number,
        };
        let args = Args::new(line, tokenizer.spans(), refs);
        f(self, &args);
        for problem in args.into_problems() {
            self.emit(problem.severity, problem.message, line);
        }
        self.tokenizer = tokenizer;
    }

    fn emit(&mut self, severity: Severity, message: impl Into<String>, line: &str) {
        let diagnostic = Diagnostic {
            severity,
            filename: self.config.filename.clone(),
            resource_group: self.config.resource_group.clone(),
            line_number: self.line_number,
            keyword: self.current_keyword,
            module: self.current_module_name().to_string(),
            line: line.to_string(),
            message: message.into(),
        };
        self.sink.report(diagnostic);
    }

    // ─── Blocks ───────────────────────────────────────────────────────────

    /// Close the current block (flushing staged records) and open `keyword`.
    fn begin_block(&mut self, keyword: Keyword, line: &str) {
        self.flush_staged(line);
        if keyword == Keyword::Camerarail {
            self.staged_camera_rail = Some(CameraRail::default());
        }
        let silent = matches!(keyword, Keyword::Invalid | Keyword::Comment | Keyword::Description);
        if !silent && !keyword.is_obsolete() {
            self.module_mut().lines.push(Line::boundary(keyword));
        }
        log::trace!("line {}: block {} -> {}", self.line_number, self.current_block, keyword);
        self.current_block = keyword;
    }

    fn begin_submesh(&mut self, line: &str) {
        self.flush_staged(line);
        self.module_mut().lines.push(Line::boundary(Keyword::Submesh));
        self.staged_submesh = Some(Submesh::default());
        self.current_block = Keyword::Submesh;
    }

    fn flush_staged(&mut self, line: &str) {
        if let Some(submesh) = self.staged_submesh.take() {
            self.append(Keyword::Submesh, |m| &mut m.submeshes, submesh);
        }
        self.flush_camera_rail(line);
    }

    fn flush_camera_rail(&mut self, line: &str) {
        let Some(rail) = self.staged_camera_rail.take() else {
            return;
        };
        if rail.nodes.is_empty() {
            self.emit(Severity::Warning, "Empty section 'camerarail', ignoring...", line);
        } else {
            self.append(Keyword::Camerarail, |m| &mut m.camera_rails, rail);
        }
    }

    // ─── Modules ──────────────────────────────────────────────────────────

    fn module_mut(&mut self) -> &mut Module {
        match self.module {
            ModuleSlot::Root => &mut self.document.root,
            ModuleSlot::User(i) => &mut self.document.user_modules[i],
        }
    }

    fn is_root_module(&self) -> bool {
        self.module == ModuleSlot::Root
    }

    fn enter_module(&mut self, name: &str, line: &str) {
        self.flush_staged(line);
        let index = self.document.user_module_index(name);
        log::debug!("line {}: entering module '{name}'", self.line_number);
        self.module = ModuleSlot::User(index);
        self.last_prop = None;
        self.last_flexbody = None;
    }

    fn end_section(&mut self, line: &str) {
        if self.is_root_module() {
            self.emit(Severity::Error, "Misplaced keyword 'end_section', ignoring...", line);
            return;
        }
        self.flush_staged(line);
        log::debug!("line {}: returning to root module", self.line_number);
        self.module = ModuleSlot::Root;
        self.last_prop = None;
        self.last_flexbody = None;
    }

    // ─── Record helpers ───────────────────────────────────────────────────

    /// Append a record to a vector of the current module and record its line.
    fn append<T>(
        &mut self,
        keyword: Keyword,
        vector: impl FnOnce(&mut Module) -> &mut Vec<T>,
        record: T,
    ) -> usize {
        let module = self.module_mut();
        let records = vector(module);
        records.push(record);
        let index = records.len() - 1;
        module.lines.push(Line::data(keyword, index));
        index
    }

    /// Store a single-instance record, replacing (with a warning) any earlier one.
    fn set_single<T>(
        &mut self,
        keyword: Keyword,
        a: &Args,
        slot: impl FnOnce(&mut Module) -> &mut Option<T>,
        record: T,
    ) {
        let module = self.module_mut();
        let target = slot(module);
        if target.is_some() {
            a.warn(format!("Multiple lines of '{keyword}', using last one"));
        }
        *target = Some(record);
        module.lines.push(Line::data(keyword, 0));
    }
}

/// `a-b` is an inclusive range, anything else a single node.
fn node_range(a: &Args, text: &str) -> NodeRange {
    let text = text.trim();
    match text.get(1..).and_then(|t| t.find('-')) {
        Some(pos) => {
            let (start, end) = text.split_at(pos + 1);
            NodeRange::new(
                a.node_from_text(start.trim_end()),
                a.node_from_text(end[1..].trim_start()),
            )
        }
        None => NodeRange::single(a.node_from_text(text)),
    }
}

/// Numbered aero keyword such as `throttle2` or `aeropit1`.
fn numbered_aero_source(token: &str) -> Option<(AeroSource, u32)> {
    AeroSource::ALL.iter().find_map(|source| {
        let rest = token.strip_prefix(source.name())?;
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok().map(|n| (*source, n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::has;
    use crate::model::NodeOption;
    use crate::node::NodeId;
    use std::rc::Rc;

    fn parse(text: &str) -> ParseOutput {
        parse_truck(text, &ParserConfig::default())
    }

    #[test]
    fn first_free_line_is_the_name() {
        let out = parse("My Truck\nnodes\n0 0 0 0\n");
        assert_eq!(out.document.name, "My Truck");
        assert_eq!(out.document.root.nodes.len(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let out = parse("name\n; comment\n// other\n\nnodes\n0 0 0 0 ; trailing\n1 1 0 0 // trailing\n");
        assert_eq!(out.document.root.nodes.len(), 2);
        assert_eq!(out.diagnostics.at_least(Severity::Warning).count(), 0, "{}", out.diagnostics.render());
    }

    #[test]
    fn description_block_collects_raw_lines() {
        let out = parse("t\ndescription\nA fine truck; with a semicolon\nend_description\nnodes\n0 0 0 0\n");
        assert_eq!(out.document.description, vec!["A fine truck; with a semicolon"]);
        assert_eq!(out.document.root.nodes.len(), 1);
    }

    #[test]
    fn comment_block_is_ignored() {
        let out = parse("t\ncomment\nnodes\n0 0 0 0\nend_comment\nnodes\n0 1 1 1\n");
        assert_eq!(out.document.root.nodes.len(), 1);
        assert_eq!(out.document.root.nodes[0].position.x, 1.0);
    }

    #[test]
    fn end_closes_the_block() {
        let out = parse("t\nnodes\n0 0 0 0\nend\n1 0 0 0\n");
        assert_eq!(out.document.root.nodes.len(), 1);
    }

    #[test]
    fn obsolete_blocks_swallow_their_lines() {
        let out = parse(
            "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\nbeams\n0 1\nnodecollision\n2 0.5\nrigidifiers\n0 1 2\nhookgroup\n1 2\n",
        );
        assert_eq!(out.document.root.beams.len(), 1);
        assert_eq!(out.diagnostics.at_least(Severity::Warning).count(), 0, "{}", out.diagnostics.render());
        assert!(
            out.document
                .root
                .lines
                .iter()
                .all(|l| !l.keyword.is_obsolete())
        );
    }

    #[test]
    fn envmap_keeps_the_block_open() {
        let out = parse("t\nnodes\n0 0 0 0\nenvmap\n1 1 0 0\n");
        assert_eq!(out.document.root.nodes.len(), 2);
    }

    #[test]
    fn lettercase_fallback_warns() {
        let out = parse("t\nNODES\n0 0 0 0\n");
        assert_eq!(out.document.root.nodes.len(), 1);
        assert!(out.diagnostics.contains("Keyword has invalid lettercase. Correct form is: nodes"));
    }

    #[test]
    fn flag_directives_set_document_flags() {
        let out = parse("t\nrollon\nrescuer\nhideInChooser\n");
        assert!(out.document.flags.rollon);
        assert!(out.document.flags.rescuer);
        assert!(out.document.flags.hide_in_chooser);
    }

    #[test]
    fn flag_directive_in_module_warns() {
        let out = parse("t\nsection 1 alt\nrollon\nend_section\n");
        assert!(out.document.flags.rollon);
        assert!(out.diagnostics.contains("Directive 'rollon' has global effect"));
    }

    #[test]
    fn section_switches_module_and_back() {
        let out = parse("t\nsection 1 alt\nnodes\n0 0 0 0\nend_section\nnodes\n1 1 1 1\n");
        let alt = out.document.module("alt").expect("module");
        assert_eq!(alt.nodes.len(), 1);
        assert_eq!(out.document.root.nodes.len(), 1);
        assert_eq!(out.document.root.nodes[0].id, NodeId::Numbered(1));
    }

    #[test]
    fn end_section_in_root_is_an_error() {
        let out = parse("t\nend_section\n");
        assert!(out.diagnostics.contains("Misplaced keyword 'end_section', ignoring..."));
        assert_eq!(out.diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn reentering_current_module_is_an_error() {
        let out = parse("t\nsection 1 alt\nsection 1 alt\nend_section\n");
        assert!(out.diagnostics.contains("Attempt to re-enter current module, ignoring..."));
    }

    #[test]
    fn root_module_name_is_reserved() {
        let out = parse("t\nsection 1 alt\nsection 1 _Root_\nnodes\n0 0 0 0\nend_section\n");
        assert!(out.diagnostics.contains("Module name '_Root_' is reserved, ignoring..."));
        let names: Vec<&str> = out.document.user_modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alt"]);
        assert_eq!(out.document.user_modules[0].nodes.len(), 1);
        assert!(out.document.root.nodes.is_empty());
    }

    #[test]
    fn sectionconfig_is_ignored_with_info() {
        let out = parse("t\nsectionconfig 0 alt\n");
        assert_eq!(out.diagnostics.count(Severity::Info), 1);
        assert!(out.diagnostics.contains("Directive 'sectionconfig' is not supported"));
    }

    #[test]
    fn submesh_staging() {
        let out = parse(
            "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\nsubmesh\ntexcoords\n0 0 0\n1 1 0\ncab\n0 1 2 c\nbackmesh\nsubmesh\nend\n",
        );
        let m = &out.document.root;
        assert_eq!(m.submeshes.len(), 2);
        assert_eq!(m.submeshes[0].texcoords.len(), 2);
        assert_eq!(m.submeshes[0].cab_triangles.len(), 1);
        assert!(m.submeshes[0].backmesh);
        assert!(m.submeshes[1].texcoords.is_empty());
    }

    #[test]
    fn cab_without_submesh_is_rejected() {
        let out = parse("t\ncab\n0 1 2 c\n");
        assert!(out.document.root.submeshes.is_empty());
        assert!(out.diagnostics.count(Severity::Error) >= 1);
    }

    #[test]
    fn data_in_bare_submesh_is_an_error() {
        let out = parse("t\nsubmesh\n0 1 2\n");
        assert!(out.diagnostics.contains("Section submesh has no subsection defined, line not parsed."));
    }

    #[test]
    fn backmesh_without_submesh_is_an_error() {
        let out = parse("t\nbackmesh\n");
        assert!(out.diagnostics.contains("Misplaced sub-directive 'backmesh'"));
    }

    #[test]
    fn empty_camera_rail_is_dropped() {
        let out = parse("t\ncamerarail\nnodes\n0 0 0 0\n");
        assert!(out.document.root.camera_rails.is_empty());
        assert!(out.diagnostics.contains("Empty section 'camerarail', ignoring..."));
    }

    #[test]
    fn camera_rail_collects_nodes() {
        let out = parse("t\nnodes\n0 0 0 0\n1 0 0 0\ncamerarail\n0\n1\nend\n");
        assert_eq!(out.document.root.camera_rails.len(), 1);
        assert_eq!(out.document.root.camera_rails[0].nodes.len(), 2);
    }

    #[test]
    fn long_lines_are_truncated() {
        let config = ParserConfig {
            line_buffer_length: 12,
            ..ParserConfig::default()
        };
        let out = parse_truck("t\nnodes\n0 1 2 3 lmnopqrstuvwxyz\n", &config);
        assert!(out.diagnostics.contains("longer than 12 characters"));
        let node = &out.document.root.nodes[0];
        assert!(has(node.options, NodeOption::LoadWeight));
    }

    #[test]
    fn lines_record_order() {
        let out = parse("t\nnodes\n0 0 0 0\n1 0 0 0\nbeams\n0 1\n");
        let lines = &out.document.root.lines;
        assert_eq!(lines[0], Line::boundary(Keyword::Nodes));
        assert_eq!(lines[1], Line::data(Keyword::Nodes, 0));
        assert_eq!(lines[2], Line::data(Keyword::Nodes, 1));
        assert_eq!(lines[3], Line::boundary(Keyword::Beams));
        assert_eq!(lines[4], Line::data(Keyword::Beams, 0));
    }

    #[test]
    fn diagnostics_carry_context() {
        let config = ParserConfig {
            filename: "demo.truck".into(),
            resource_group: "General".into(),
            ..ParserConfig::default()
        };
        let out = parse_truck("t\nbeams\n0\n", &config);
        let d = &out.diagnostics.messages()[0];
        assert_eq!(d.filename, "demo.truck");
        assert_eq!(d.resource_group, "General");
        assert_eq!(d.line_number, 3);
        assert_eq!(d.keyword, Keyword::Beams);
        assert_eq!(d.module, ROOT_MODULE_NAME);
        assert_eq!(d.line, "0");
    }

    #[test]
    fn records_share_defaults_handles() {
        let out = parse("t\nnodes\n0 0 0 0\n1 0 0 0\nbeams\n0 1\n1 0\n");
        let b = &out.document.root.beams;
        assert!(Rc::ptr_eq(&b[0].defaults, &b[1].defaults));
    }
}
