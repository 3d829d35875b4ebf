//! Serializer: [`Document`] → truck file text.
//!
//! Blocks come out in a fixed canonical order. Node-generating blocks are
//! written in the order the sequential importer lays nodes out, so a legacy
//! reparse maps every numeric reference back onto the same node.
//!
//! Ambient defaults are tracked with a cursor over the handles captured in
//! the records. A `set_*` directive is written only where the handle
//! changes, so records that shared a snapshot before share one again after
//! a reparse.

mod aero;
mod drivetrain;
mod structure;
mod visuals;
mod wheels;

use crate::defaults::{BeamDefaults, DefaultMinimass, Inertia, ManagedMaterialOptions, NodeDefaults};
use crate::document::{Document, Module};
use crate::keyword::Keyword;
use crate::model::{NodeOption, encode_options};
use crate::node::{NodeId, NodeRange, NodeRef};
use std::fmt::{self, Write};
use std::rc::Rc;

/// Written where a positional text field is empty but later fields follow.
const PLACEHOLDER: &str = "_";

/// First file format version that references numbered nodes by id.
const LEGACY_VERSION_LIMIT: u32 = 450;

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`serialize_document`].
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Significant digits kept for values whose shortest form is longer.
    /// Default: 6.
    pub float_precision: usize,
    /// Minimum width of the id column in `nodes`. Default: 4.
    pub node_id_width: usize,
    /// Minimum width of each coordinate column in `nodes`. Default: 10.
    pub coordinate_width: usize,
    /// Minimum width of the node columns in beam-like blocks. Default: 4.
    pub beam_node_width: usize,
    /// Start the file with a comment banner. Default: **true**.
    pub header_banner: bool,
    /// Serialize only this module. The root answers to
    /// [`crate::document::ROOT_MODULE_NAME`]. Default: all modules.
    pub module: Option<String>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            float_precision: 6,
            node_id_width: 4,
            coordinate_width: 10,
            beam_node_width: 4,
            header_banner: true,
            module: None,
        }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// The root module declares numbered nodes but no node `0`.
    MissingNodeZero,
    /// The root module declares node `0` more than once.
    DuplicateNodeZero,
    /// [`SerializerConfig::module`] names no module of the document.
    UnknownModule(String),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::MissingNodeZero => f.write_str("node 0 is not defined"),
            SerializeError::DuplicateNodeZero => f.write_str("node 0 is defined more than once"),
            SerializeError::UnknownModule(name) => write!(f, "no module named '{name}'"),
        }
    }
}

impl std::error::Error for SerializeError {}

// ─── Entry point ──────────────────────────────────────────────────────────

/// Write `document` as truck file text.
///
/// # Errors
///
/// Fails when the root module's numbered nodes lack a unique node `0`, or
/// when the configured module does not exist.
pub fn serialize_document(
    document: &Document,
    config: &SerializerConfig,
) -> Result<String, SerializeError> {
    let modules: Vec<&Module> = match &config.module {
        None => document.modules().collect(),
        Some(name) => vec![
            document
                .module(name)
                .ok_or_else(|| SerializeError::UnknownModule(name.clone()))?,
        ],
    };
    if let Some(root) = modules.iter().find(|m| m.is_root()) {
        check_node_zero(root)?;
    }

    let mut writer = Writer::new(config, document);
    writer.header(document);
    for module in modules {
        if module.is_root() {
            writer.module_body(module);
        } else {
            log::debug!("serializing module '{}'", module.name);
            let _ = writeln!(writer.out, "\n{} -1 {}", Keyword::Section, module.name);
            writer.module_body(module);
            let _ = writeln!(writer.out, "\n{}", Keyword::EndSection);
        }
    }
    let _ = writeln!(writer.out, "\n{}", Keyword::End);
    Ok(writer.out)
}

fn check_node_zero(root: &Module) -> Result<(), SerializeError> {
    if root.numbered_nodes().next().is_none() {
        return Ok(());
    }
    match root
        .numbered_nodes()
        .filter(|n| n.id == NodeId::Numbered(0))
        .count()
    {
        0 => Err(SerializeError::MissingNodeZero),
        1 => Ok(()),
        _ => Err(SerializeError::DuplicateNodeZero),
    }
}

// ─── Values ───────────────────────────────────────────────────────────────

/// Shortest form when it fits in `precision` significant digits, otherwise
/// rounded to `precision` digits. Never uses exponent notation.
#[must_use]
pub fn format_float(value: f32, precision: usize) -> String {
    let shortest = value.to_string();
    if !value.is_finite() || value == 0.0 {
        return shortest;
    }
    let digits: String = shortest.chars().filter(char::is_ascii_digit).collect();
    let significant = digits.trim_start_matches('0').trim_end_matches('0').len();
    let precision = precision.max(1);
    if significant <= precision {
        return shortest;
    }
    let magnitude = f64::from(value.abs()).log10().floor() as i64;
    let decimals = i64::try_from(precision).unwrap_or(i64::MAX) - 1 - magnitude;
    if decimals <= 0 {
        return format!("{value:.0}");
    }
    let decimals = usize::try_from(decimals).unwrap_or(0);
    let rounded = format!("{value:.decimals$}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" { "0".to_string() } else { trimmed.to_string() }
}

/// Reference text; an empty reference is written as the null node `-1`.
fn node_text(node: &NodeRef) -> &str {
    match node.text() {
        "" => "-1",
        text => text,
    }
}

/// `a-b`, or the single node.
fn range_text(range: &NodeRange) -> String {
    if range.is_single() {
        node_text(&range.start).to_string()
    } else {
        format!("{}-{}", node_text(&range.start), node_text(&range.end))
    }
}

// ─── Rows ─────────────────────────────────────────────────────────────────

/// One line of comma-separated fields under construction.
///
/// Optional fields that still hold their default are dropped from the end
/// of the line. An optional field followed by a written one stays, because
/// fields are positional.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    precision: usize,
    fields: Vec<(String, bool)>,
}

impl Row {
    fn push(mut self, text: String, optional: bool) -> Self {
        self.fields.push((text, optional));
        self
    }

    pub(crate) fn text(self, text: impl Into<String>) -> Self {
        self.push(text.into(), false)
    }

    /// Right-aligned in a column of at least `width` characters.
    pub(crate) fn padded(self, value: impl fmt::Display, width: usize) -> Self {
        self.push(format!("{value:>width$}"), false)
    }

    pub(crate) fn float(self, value: f32) -> Self {
        let text = format_float(value, self.precision);
        self.push(text, false)
    }

    pub(crate) fn floats(self, values: &[f32]) -> Self {
        values.iter().fold(self, |row, v| row.float(*v))
    }

    pub(crate) fn padded_float(self, value: f32, width: usize) -> Self {
        let text = format_float(value, self.precision);
        self.padded(text, width)
    }

    pub(crate) fn int(self, value: impl fmt::Display) -> Self {
        self.push(value.to_string(), false)
    }

    pub(crate) fn node(self, node: &NodeRef) -> Self {
        self.push(node_text(node).to_string(), false)
    }

    pub(crate) fn nodes(self, nodes: &[NodeRef]) -> Self {
        nodes.iter().fold(self, Row::node)
    }

    pub(crate) fn padded_node(self, node: &NodeRef, width: usize) -> Self {
        self.padded(node_text(node), width)
    }

    /// Wheel rigidity node; absent is written as `9999`.
    pub(crate) fn rigidity(self, node: &NodeRef) -> Self {
        let text = match node.text() {
            "" => "9999".to_string(),
            text => text.to_string(),
        };
        self.push(text, false)
    }

    pub(crate) fn range(self, range: &NodeRange) -> Self {
        self.push(range_text(range), false)
    }

    pub(crate) fn opt_text(self, text: &str) -> Self {
        if text.is_empty() {
            self.push(PLACEHOLDER.to_string(), true)
        } else {
            self.push(text.to_string(), false)
        }
    }

    /// Managed-material texture; empty is written as `-`.
    pub(crate) fn opt_texture(self, text: &str) -> Self {
        if text.is_empty() {
            self.push("-".to_string(), true)
        } else {
            self.push(text.to_string(), false)
        }
    }

    pub(crate) fn opt_float(self, value: f32, default: f32) -> Self {
        let text = format_float(value, self.precision);
        self.push(text, value == default)
    }

    /// Written only when `present`; otherwise an optional default.
    pub(crate) fn float_when(self, value: f32, present: bool) -> Self {
        let text = format_float(value, self.precision);
        self.push(text, !present)
    }

    /// Required single-word text; empty is written as the placeholder.
    pub(crate) fn word(self, text: &str) -> Self {
        if text.is_empty() {
            self.push(PLACEHOLDER.to_string(), false)
        } else {
            self.push(text.to_string(), false)
        }
    }

    pub(crate) fn opt_int(self, value: i64, default: i64) -> Self {
        self.push(value.to_string(), value == default)
    }

    pub(crate) fn opt_bool(self, value: bool, default: bool) -> Self {
        self.push(value.to_string(), value == default)
    }

    pub(crate) fn opt_field(self, text: impl Into<String>, is_default: bool) -> Self {
        self.push(text.into(), is_default)
    }

    /// Start/stop delays and functions, all optional.
    pub(crate) fn inertia(self, inertia: &Inertia) -> Self {
        self.opt_float(inertia.start_delay_factor, 0.0)
            .opt_float(inertia.stop_delay_factor, 0.0)
            .opt_text(&inertia.start_function)
            .opt_text(&inertia.stop_function)
    }

    /// Only valid as the last field.
    pub(crate) fn maybe_float(self, value: Option<f32>) -> Self {
        match value {
            Some(v) => self.float(v),
            None => self,
        }
    }

    pub(crate) fn finish(mut self) -> String {
        while self.fields.last().is_some_and(|(_, optional)| *optional) {
            self.fields.pop();
        }
        let mut line = String::with_capacity(self.fields.len() * 8);
        for (i, (text, _)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push_str(", ");
            }
            line.push_str(text);
        }
        line
    }
}

// ─── Defaults cursor ──────────────────────────────────────────────────────

/// The ambient state a reader of the output has seen so far. Like the
/// parser's defaults it carries over from one module to the next.
#[derive(Debug, Default)]
struct DefaultsCursor {
    beam: Option<Rc<BeamDefaults>>,
    node: Option<Rc<NodeDefaults>>,
    inertia: Option<Rc<Inertia>>,
    minimass: Option<Rc<DefaultMinimass>>,
    detacher_group: i32,
    managed_material_options: ManagedMaterialOptions,
}

fn is_current<T>(current: Option<&Rc<T>>, target: &Rc<T>) -> bool {
    current.is_some_and(|c| Rc::ptr_eq(c, target))
}

/// Records in order of their handle's first appearance; records sharing a
/// handle stay in their original relative order.
pub(crate) fn group_by_handle<'a, T: 'a, H>(
    items: impl IntoIterator<Item = &'a T>,
    handle: impl Fn(&T) -> &Rc<H>,
) -> Vec<&'a T> {
    let mut groups: Vec<(*const H, Vec<&'a T>)> = Vec::new();
    for item in items {
        let key = Rc::as_ptr(handle(item));
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups.into_iter().flat_map(|(_, members)| members).collect()
}

fn beam_values_differ(a: &BeamDefaults, b: &BeamDefaults) -> bool {
    a.springiness != b.springiness
        || a.damping_constant != b.damping_constant
        || a.deformation_threshold != b.deformation_threshold
        || a.breaking_threshold != b.breaking_threshold
        || a.visual_beam_diameter != b.visual_beam_diameter
        || a.beam_material_name != b.beam_material_name
        || a.plastic_deform_coef != b.plastic_deform_coef
}

// ─── Writer ───────────────────────────────────────────────────────────────

pub(crate) struct Writer<'c> {
    config: &'c SerializerConfig,
    out: String,
    cursor: DefaultsCursor,
    /// Legacy files address numbered nodes by declaration index.
    renumber_nodes: bool,
    next_node_number: u32,
}

impl<'c> Writer<'c> {
    fn new(config: &'c SerializerConfig, document: &Document) -> Self {
        Self {
            config,
            out: String::with_capacity(4096),
            cursor: DefaultsCursor::default(),
            renumber_nodes: document.file_format_version < LEGACY_VERSION_LIMIT,
            next_node_number: 0,
        }
    }

    pub(crate) fn row(&self) -> Row {
        Row {
            precision: self.config.float_precision,
            fields: Vec::new(),
        }
    }

    /// Blank line, then the block keyword.
    pub(crate) fn block(&mut self, keyword: Keyword) {
        let _ = writeln!(self.out, "\n{keyword}");
    }

    pub(crate) fn data(&mut self, row: Row) {
        let _ = writeln!(self.out, "\t{}", row.finish());
    }

    /// Data line of a sub-block (`texcoords`, `cab`).
    pub(crate) fn nested(&mut self, row: Row) {
        let _ = writeln!(self.out, "\t\t{}", row.finish());
    }

    pub(crate) fn directive(&mut self, keyword: Keyword, row: Row) {
        let _ = writeln!(self.out, "{keyword} {}", row.finish());
    }

    pub(crate) fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    // ─── Header ───────────────────────────────────────────────────────────

    fn header(&mut self, document: &Document) {
        if self.config.header_banner {
            let _ = writeln!(
                self.out,
                "; Truck file written by truck-core {}",
                env!("CARGO_PKG_VERSION")
            );
            if !document.hash.is_empty() {
                let _ = writeln!(self.out, "; source hash: {}", document.hash);
            }
        }
        if !document.name.is_empty() {
            self.line(&document.name);
        }
        if document.file_format_version != 0 {
            let _ = writeln!(
                self.out,
                "\n{} {}",
                Keyword::FileFormatVersion,
                document.file_format_version
            );
        }
        if !document.description.is_empty() {
            self.block(Keyword::Description);
            for line in &document.description {
                self.line(line);
            }
            self.line(Keyword::EndDescription.as_str());
        }
        if !document.authors.is_empty() {
            self.line("");
        }
        for author in &document.authors {
            let row = self
                .row()
                .text(author.author_type.as_str())
                .opt_int(author.forum_account_id.map_or(-1, i64::from), -1)
                .opt_text(&author.name)
                .opt_text(&author.email);
            self.directive(Keyword::Author, row);
        }
        if let Some(info) = &document.file_info {
            let row = self
                .row()
                .text(info.unique_id.as_str())
                .int(info.category_id)
                .int(info.file_version);
            self.directive(Keyword::FileInfo, row);
        }
        if !document.guid.is_empty() {
            let _ = writeln!(self.out, "{} {}", Keyword::Guid, document.guid);
        }
        let flags = document.flags.keywords();
        if !flags.is_empty() {
            self.line("");
        }
        for flag in flags {
            self.line(flag.as_str());
        }
    }

    // ─── Module ───────────────────────────────────────────────────────────

    /// Every block of one module in canonical order: settings, structure,
    /// wheels, drivetrain, features, aerial, marine.
    fn module_body(&mut self, module: &Module) {
        self.module_settings(module);
        self.managed_materials(module);

        // Node-generating blocks, in the importer's layout order.
        self.nodes(module);
        self.cinecams(module);
        self.wheels(module);
        self.wheels2(module);
        self.mesh_wheels(Keyword::Meshwheels, &module.mesh_wheels);
        self.mesh_wheels(Keyword::Meshwheels2, &module.mesh_wheels2);
        self.flex_body_wheels(module);

        self.beams(module);
        self.cameras(module);
        self.shocks(module);
        self.shocks2(module);
        self.shocks3(module);
        self.hydros(module);
        self.commands(module);
        self.animators(module);
        self.triggers(module);
        self.rotators(module);
        self.rotators2(module);
        self.ties(module);
        self.ropes(module);
        self.ropables(module);
        self.fixes(module);
        self.contacters(module);
        self.hooks(module);
        self.lockgroups(module);
        self.railgroups(module);
        self.slidenodes(module);
        self.submeshes(module);
        self.camera_rails(module);
        self.collision_boxes(module);
        self.wheel_detachers(module);

        self.drivetrain(module);

        self.props(module);
        self.flexbodies(module);
        self.flares(module);
        self.material_flare_bindings(module);
        self.exhausts(module);
        self.particles(module);
        self.videocameras(module);
        self.soundsources(module);
        self.gui_settings(module);

        self.aero(module);
        self.screwprops(module);
    }

    // ─── Defaults ─────────────────────────────────────────────────────────

    /// Make `target` the active beam defaults.
    pub(crate) fn sync_beam(&mut self, target: &Rc<BeamDefaults>) {
        if is_current(self.cursor.beam.as_ref(), target) {
            return;
        }
        let current = self.cursor.beam.as_deref().cloned().unwrap_or_default();
        if self.cursor.beam.is_none() && **target == current {
            self.cursor.beam = Some(Rc::clone(target));
            return;
        }
        let scale_differs = target.scale != current.scale;
        if scale_differs {
            self.beam_scale_line(target);
        }
        if target.is_user_defined || beam_values_differ(target, &current) {
            let row = self
                .row()
                .float(target.springiness)
                .float(target.damping_constant)
                .float(target.deformation_threshold)
                .float(target.breaking_threshold)
                .float(target.visual_beam_diameter)
                .text(target.beam_material_name.as_str())
                .float_when(
                    target.plastic_deform_coef,
                    target.is_plastic_deform_coef_user_defined,
                );
            self.directive(Keyword::SetBeamDefaults, row);
        } else if !scale_differs {
            // Same values under a new handle: a repeated scale line splits it.
            self.beam_scale_line(target);
        }
        self.cursor.beam = Some(Rc::clone(target));
    }

    fn beam_scale_line(&mut self, target: &BeamDefaults) {
        let s = target.scale;
        let row = self
            .row()
            .float(s.springiness)
            .float(s.damping_constant)
            .float(s.deformation_threshold)
            .float(s.breaking_threshold);
        self.directive(Keyword::SetBeamDefaultsScale, row);
    }

    pub(crate) fn sync_node(&mut self, target: &Rc<NodeDefaults>) {
        if is_current(self.cursor.node.as_ref(), target) {
            return;
        }
        if self.cursor.node.is_none() && **target == NodeDefaults::default() {
            self.cursor.node = Some(Rc::clone(target));
            return;
        }
        let row = self
            .row()
            .float(target.load_weight)
            .float(target.friction)
            .float(target.volume)
            .float(target.surface)
            .text(encode_options::<NodeOption>(target.options));
        self.directive(Keyword::SetNodeDefaults, row);
        self.cursor.node = Some(Rc::clone(target));
    }

    pub(crate) fn sync_inertia(&mut self, target: &Rc<Inertia>) {
        if is_current(self.cursor.inertia.as_ref(), target) {
            return;
        }
        let current = self.cursor.inertia.as_deref().cloned().unwrap_or_default();
        if target.is_empty() {
            if self.cursor.inertia.is_some() && !current.is_empty() {
                self.directive(Keyword::SetInertiaDefaults, self.row().int(-1));
            }
            self.cursor.inertia = Some(Rc::clone(target));
            return;
        }
        // Omitted functions are inherited, so clear them first when needed.
        let loses_function = (target.start_function.is_empty() && !current.start_function.is_empty())
            || (target.stop_function.is_empty() && !current.stop_function.is_empty());
        if loses_function {
            self.directive(Keyword::SetInertiaDefaults, self.row().int(-1));
        }
        let row = self
            .row()
            .float(target.start_delay_factor)
            .float(target.stop_delay_factor)
            .opt_text(&target.start_function)
            .opt_text(&target.stop_function);
        self.directive(Keyword::SetInertiaDefaults, row);
        self.cursor.inertia = Some(Rc::clone(target));
    }

    pub(crate) fn sync_minimass(&mut self, target: &Rc<DefaultMinimass>) {
        if is_current(self.cursor.minimass.as_ref(), target) {
            return;
        }
        if self.cursor.minimass.is_none() && **target == DefaultMinimass::default() {
            self.cursor.minimass = Some(Rc::clone(target));
            return;
        }
        self.directive(Keyword::SetDefaultMinimass, self.row().float(target.min_mass));
        self.cursor.minimass = Some(Rc::clone(target));
    }

    pub(crate) fn sync_detacher_group(&mut self, group: i32) {
        if self.cursor.detacher_group == group {
            return;
        }
        let row = if group == 0 {
            self.row().text("end")
        } else {
            self.row().int(group)
        };
        self.directive(Keyword::DetacherGroup, row);
        self.cursor.detacher_group = group;
    }

    pub(crate) fn sync_managed_material_options(&mut self, options: ManagedMaterialOptions) {
        if self.cursor.managed_material_options == options {
            return;
        }
        let row = self.row().int(u8::from(options.double_sided));
        self.directive(Keyword::SetManagedMaterialsOptions, row);
        self.cursor.managed_material_options = options;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParserConfig, parse_truck};
    use pretty_assertions::assert_eq;

    fn serialize(text: &str) -> String {
        let out = parse_truck(text, &ParserConfig::default());
        serialize_document(&out.document, &SerializerConfig::default()).expect("serializable")
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.lines().filter(|l| l.starts_with(needle)).count()
    }

    #[test]
    fn floats_use_shortest_form_within_precision() {
        assert_eq!(format_float(1.0, 6), "1");
        assert_eq!(format_float(0.1, 6), "0.1");
        assert_eq!(format_float(-2.5, 6), "-2.5");
        assert_eq!(format_float(9_000_000.0, 6), "9000000");
        assert_eq!(format_float(0.0, 6), "0");
    }

    #[test]
    fn floats_round_to_significant_digits() {
        assert_eq!(format_float(1.234_567_8, 6), "1.23457");
        assert_eq!(format_float(0.000_123_456_79, 6), "0.000123457");
        assert_eq!(format_float(1.234_567_8, 3), "1.23");
    }

    #[test]
    fn trailing_defaults_are_dropped_but_inner_ones_kept() {
        let row = || Row { precision: 6, fields: Vec::new() };
        assert_eq!(row().int(1).opt_float(-1.0, -1.0).opt_text("").finish(), "1");
        assert_eq!(row().int(1).opt_float(-1.0, -1.0).text("x").finish(), "1, -1, x");
        assert_eq!(row().int(1).opt_text("").opt_int(3, 0).finish(), "1, _, 3");
    }

    #[test]
    fn grouping_keeps_first_appearance_order() {
        let a = Rc::new(1);
        let b = Rc::new(2);
        let items = [(1, Rc::clone(&a)), (2, Rc::clone(&b)), (3, Rc::clone(&a))];
        let grouped: Vec<i32> = group_by_handle(&items, |(_, h)| h).iter().map(|(n, _)| *n).collect();
        assert_eq!(grouped, vec![1, 3, 2]);
    }

    #[test]
    fn missing_or_duplicate_node_zero_is_an_error() {
        let config = SerializerConfig::default();
        let out = parse_truck("t\nnodes\n1 0 0 0\n", &ParserConfig::default());
        assert_eq!(
            serialize_document(&out.document, &config),
            Err(SerializeError::MissingNodeZero)
        );
        let out = parse_truck("t\nnodes\n0 0 0 0\n0 1 0 0\n", &ParserConfig::default());
        assert_eq!(
            serialize_document(&out.document, &config),
            Err(SerializeError::DuplicateNodeZero)
        );
    }

    #[test]
    fn named_only_files_need_no_node_zero() {
        let text = serialize("t\nfileformatversion 450\nnodes2\nhub 0 0 0\n");
        assert!(text.contains("nodes2\n"));
    }

    #[test]
    fn unknown_module_is_an_error() {
        let out = parse_truck("t\nnodes\n0 0 0 0\n", &ParserConfig::default());
        let config = SerializerConfig {
            module: Some("nope".to_string()),
            ..SerializerConfig::default()
        };
        let err = serialize_document(&out.document, &config).unwrap_err();
        assert_eq!(err.to_string(), "no module named 'nope'");
    }

    #[test]
    fn header_carries_metadata_and_ends_with_end() {
        let text = serialize(
            "My Truck\ndescription\nline one\nend_description\nauthor chassis 12 Jane\nfileinfo uid, 1, 2\nguid abc\nrollon\nnodes\n0 0 0 0\n",
        );
        assert!(text.starts_with("; Truck file written by truck-core"));
        assert!(text.contains("\nMy Truck\n"));
        assert!(text.contains("description\nline one\nend_description\n"));
        assert!(text.contains("author chassis, 12, Jane\n"));
        assert!(text.contains("fileinfo uid, 1, 2\n"));
        assert!(text.contains("guid abc\n"));
        assert!(text.contains("\nrollon\n"));
        assert!(text.trim_end().ends_with("\nend"));
    }

    #[test]
    fn banner_can_be_disabled() {
        let out = parse_truck("t\nnodes\n0 0 0 0\n", &ParserConfig::default());
        let config = SerializerConfig {
            header_banner: false,
            ..SerializerConfig::default()
        };
        let text = serialize_document(&out.document, &config).expect("serializable");
        assert!(text.starts_with("t\n"));
    }

    #[test]
    fn beam_defaults_written_once_per_handle() {
        let text = serialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\nbeams\nset_beam_defaults 100 10\n0 1\n1 2\nset_beam_defaults 200 20\n0 2\n",
        );
        assert_eq!(count(&text, "set_beam_defaults "), 2);
        assert_eq!(count(&text, "set_beam_defaults_scale"), 0);
    }

    #[test]
    fn builtin_defaults_are_not_written() {
        let text = serialize("t\nnodes\n0 0 0 0\n1 1 0 0\nbeams\n0 1\nhydros\n0 1 0.5\n");
        assert!(!text.contains("set_"));
        assert!(!text.contains("detacher_group"));
    }

    #[test]
    fn scale_only_snapshot_writes_scale_line() {
        let text = serialize("t\nnodes\n0 0 0 0\n1 1 0 0\nset_beam_defaults_scale 2 1 1 1\nbeams\n0 1\n");
        assert_eq!(count(&text, "set_beam_defaults_scale 2, 1, 1, 1"), 1);
        assert_eq!(count(&text, "set_beam_defaults "), 0);
    }

    #[test]
    fn detacher_groups_switch_and_end() {
        let text = serialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nbeams\ndetacher_group 2\n0 1\ndetacher_group end\n1 0\n",
        );
        assert!(text.contains("detacher_group 2\n"));
        assert!(text.contains("detacher_group end\n"));
    }

    #[test]
    fn inertia_reset_before_dropping_functions() {
        let text = serialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nhydros\nset_inertia_defaults 0.5 0.5 in out\n0 1 1\nset_inertia_defaults 0.2 0.3\n1 0 1\n",
        );
        assert_eq!(count(&text, "set_inertia_defaults 0.5, 0.5, in, out"), 1);
        assert_eq!(count(&text, "set_inertia_defaults -1"), 0);
        let text = serialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nhydros\nset_inertia_defaults 0.5 0.5 in out\n0 1 1\nset_inertia_defaults -1\nset_inertia_defaults 0.2 0.3\n1 0 1\n",
        );
        assert_eq!(count(&text, "set_inertia_defaults -1"), 1);
        assert_eq!(count(&text, "set_inertia_defaults 0.2, 0.3"), 1);
    }

    #[test]
    fn user_modules_are_wrapped_in_sections() {
        let text = serialize(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nsection 1 alt\nbeams\n0 1\nend_section\n",
        );
        let section = text.find("section -1 alt").expect("section line");
        let end = text.find("end_section").expect("end_section line");
        assert!(section < end);
        assert!(text[section..end].contains("beams"));
    }

    #[test]
    fn single_module_selection() {
        let out = parse_truck(
            "t\nnodes\n0 0 0 0\n1 1 0 0\nsection 1 alt\nbeams\n0 1\nend_section\n",
            &ParserConfig::default(),
        );
        let config = SerializerConfig {
            module: Some("alt".to_string()),
            ..SerializerConfig::default()
        };
        let text = serialize_document(&out.document, &config).expect("serializable");
        assert!(text.contains("section -1 alt"));
        assert!(!text.contains("nodes"));
    }
}
