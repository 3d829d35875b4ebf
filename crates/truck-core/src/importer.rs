//! Sequential importer for legacy numbered files.
//!
//! Old files address nodes by declaration index, and the count includes the
//! nodes the simulator generates for cinecams and wheels in between. The
//! simulator lays nodes out grouped by origin instead (numbered, named,
//! cinecam, wheels, ...), so every reference must be rewritten to the index
//! the node will have in that layout.
//!
//! The parser feeds declarations in file order; [`SequentialImporter::process`]
//! then rewrites every [`NodeRef`] of every module.

use crate::diagnostics::Severity;
use crate::document::{Document, Module};
use crate::keyword::Keyword;
use crate::node::{NodeId, NodeName, NodeRange, NodeRef, RefState};
use std::collections::HashMap;
use std::fmt::Write;

/// A message raised while resolving, with the context it was raised in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMessage {
    pub severity: Severity,
    /// Line of the reference being resolved, 0 when not tied to one.
    pub line_number: u32,
    pub keyword: Keyword,
    pub module: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WheelPart {
    RimA,
    RimB,
    TyreA,
    TyreB,
}

impl WheelPart {
    fn label(self) -> &'static str {
        match self {
            WheelPart::RimA => "[rim,  A]",
            WheelPart::RimB => "[rim,  B]",
            WheelPart::TyreA => "[tyre, A]",
            WheelPart::TyreB => "[tyre, B]",
        }
    }
}

/// One declared or generated node, in declaration order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    origin: Keyword,
    id: NodeId,
    sub_index: u32,
    part: Option<WheelPart>,
}

/// Per-origin node counts. The order of [`Counts::ORDER`] is the layout order.
#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    numbered: u32,
    named: u32,
    cinecam: u32,
    wheels: u32,
    wheels2: u32,
    meshwheels: u32,
    meshwheels2: u32,
    flexbodywheels: u32,
}

impl Counts {
    const ORDER: [Keyword; 8] = [
        Keyword::Nodes,
        Keyword::Nodes2,
        Keyword::Cinecam,
        Keyword::Wheels,
        Keyword::Wheels2,
        Keyword::Meshwheels,
        Keyword::Meshwheels2,
        Keyword::Flexbodywheels,
    ];

    fn slot(&mut self, origin: Keyword) -> Option<&mut u32> {
        match origin {
            Keyword::Nodes => Some(&mut self.numbered),
            Keyword::Nodes2 => Some(&mut self.named),
            Keyword::Cinecam => Some(&mut self.cinecam),
            Keyword::Wheels => Some(&mut self.wheels),
            Keyword::Wheels2 => Some(&mut self.wheels2),
            Keyword::Meshwheels => Some(&mut self.meshwheels),
            Keyword::Meshwheels2 => Some(&mut self.meshwheels2),
            Keyword::Flexbodywheels => Some(&mut self.flexbodywheels),
            _ => None,
        }
    }

    fn get(mut self, origin: Keyword) -> u32 {
        self.slot(origin).map_or(0, |n| *n)
    }

    /// First index of the `origin` group in the final layout.
    fn offset(&self, origin: Keyword) -> u32 {
        Self::ORDER
            .iter()
            .take_while(|k| **k != origin)
            .map(|k| self.get(*k))
            .sum()
    }
}

/// Keeps the node table and resolves references once the file is read.
#[derive(Debug)]
pub struct SequentialImporter {
    enabled: bool,
    all_nodes: Vec<Entry>,
    named_nodes: HashMap<NodeName, Entry>,
    counts: Counts,
    total_resolved: u32,
    resolved_to_self: u32,
    keyword: Keyword,
    module: String,
    messages: Vec<ImportMessage>,
}

impl SequentialImporter {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            all_nodes: Vec::with_capacity(1000),
            named_nodes: HashMap::new(),
            counts: Counts::default(),
            total_resolved: 0,
            resolved_to_self: 0,
            keyword: Keyword::Invalid,
            module: String::new(),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch off for the rest of the file (`fileformatversion >= 450`).
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Number of nodes declared or generated so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.all_nodes.len()
    }

    // ─── Declarations ─────────────────────────────────────────────────────

    /// Register a `nodes` line. Numbers must follow declaration order.
    ///
    /// # Errors
    ///
    /// Returns the message to report when the number is out of sync; the
    /// node is then left out of the table.
    pub fn add_numbered(&mut self, number: u32) -> Result<(), String> {
        let expected = self.all_nodes.len();
        if usize::try_from(number).ok() != Some(expected) {
            return Err(format!(
                "Lost sync in node numbers, got numbered node [{number}], expected [{expected}]. Ignoring node."
            ));
        }
        let sub_index = self.next_sub_index(Keyword::Nodes);
        self.all_nodes.push(Entry {
            origin: Keyword::Nodes,
            id: NodeId::Numbered(number),
            sub_index,
            part: None,
        });
        Ok(())
    }

    /// Register a `nodes2` line.
    ///
    /// # Errors
    ///
    /// Returns the message to report when the name is already taken.
    pub fn add_named(&mut self, name: &str) -> Result<(), String> {
        let key = NodeName::intern(name);
        if self.named_nodes.contains_key(&key) {
            return Err(format!("Duplicate node name [{name}]. Ignoring node."));
        }
        let entry = Entry {
            origin: Keyword::Nodes2,
            id: NodeId::Named(key),
            sub_index: self.counts.named,
            part: None,
        };
        self.counts.named += 1;
        self.named_nodes.insert(key, entry);
        self.all_nodes.push(entry);
        Ok(())
    }

    /// Register one node the simulator generates for a `origin` line.
    pub fn add_generated(&mut self, origin: Keyword) {
        self.push_generated(origin, None);
    }

    /// Register the nodes generated for one wheel: rim nodes first for
    /// `wheels2` and `flexbodywheels`, then tyre nodes for every type.
    pub fn generate_wheel_nodes(&mut self, origin: Keyword, num_rays: u32) {
        if matches!(origin, Keyword::Wheels2 | Keyword::Flexbodywheels) {
            for i in 0..num_rays * 2 {
                let part = if i % 2 == 0 { WheelPart::RimA } else { WheelPart::RimB };
                self.push_generated(origin, Some(part));
            }
        }
        for i in 0..num_rays * 2 {
            let part = if i % 2 == 0 { WheelPart::TyreA } else { WheelPart::TyreB };
            self.push_generated(origin, Some(part));
        }
    }

    fn push_generated(&mut self, origin: Keyword, part: Option<WheelPart>) {
        let number = u32::try_from(self.all_nodes.len()).unwrap_or(u32::MAX);
        let sub_index = self.next_sub_index(origin);
        self.all_nodes.push(Entry {
            origin,
            id: NodeId::Numbered(number),
            sub_index,
            part,
        });
    }

    fn next_sub_index(&mut self, origin: Keyword) -> u32 {
        match self.counts.slot(origin) {
            Some(n) => {
                let sub_index = *n;
                *n += 1;
                sub_index
            }
            None => 0,
        }
    }

    // ─── Resolution ───────────────────────────────────────────────────────

    fn highest_index(&self) -> i64 {
        i64::try_from(self.all_nodes.len()).unwrap_or(i64::MAX) - 1
    }

    fn message(&mut self, severity: Severity, line_number: u32, text: String) {
        self.messages.push(ImportMessage {
            severity,
            line_number,
            keyword: self.keyword,
            module: self.module.clone(),
            text,
        });
    }

    /// Rewrite one reference in place. Only unresolved references change.
    pub fn resolve(&mut self, node: &mut NodeRef) {
        self.total_resolved += 1;
        let RefState::Unresolved { check_named_first } = node.state() else {
            return;
        };
        if check_named_first && self.named_nodes.contains_key(&node.name()) {
            node.resolve_named();
            return;
        }
        let Some(entry) = usize::try_from(node.number())
            .ok()
            .and_then(|i| self.all_nodes.get(i))
            .copied()
        else {
            let text = format!(
                "Cannot resolve {node} - not a named node, and index is not defined (highest is: {}). For backwards compatibility, converting to: 0",
                self.highest_index()
            );
            self.message(Severity::Error, node.line(), text);
            node.settle_numeric(0);
            return;
        };
        match entry.id {
            NodeId::Named(name) => node.settle_named(name),
            NodeId::Numbered(_) => {
                node.settle_numeric(self.counts.offset(entry.origin) + entry.sub_index);
            }
        }
    }

    fn resolve_all(&mut self, nodes: &mut [NodeRef]) {
        for node in nodes {
            self.resolve(node);
        }
    }

    /// Resolve a declaration index directly (forset lists, rail ranges).
    fn resolve_by_index(&mut self, index: u32, line_number: u32) -> NodeRef {
        let Some(entry) = usize::try_from(index)
            .ok()
            .and_then(|i| self.all_nodes.get(i))
            .copied()
        else {
            let text = format!(
                "Cannot resolve node by index [{index}], node is not defined, highest available number is: {}",
                self.highest_index()
            );
            self.message(Severity::Error, line_number, text);
            return NodeRef::invalid(&index.to_string());
        };
        let index_out = self.counts.offset(entry.origin) + entry.sub_index;
        if index_out == index {
            self.resolved_to_self += 1;
        } else {
            let mut text = format!("Node resolved by index.\n\tSource: [{index}]\n\tResult: [{index_out}]");
            if !matches!(entry.origin, Keyword::Nodes | Keyword::Nodes2) {
                let _ = write!(
                    text,
                    " (generated by: {}, sub-index: {})",
                    entry.origin, entry.sub_index
                );
            }
            self.message(Severity::Info, line_number, text);
        }
        let mut out = NodeRef::unresolved(&index_out.to_string(), index_out, false, line_number);
        out.settle_numeric(index_out);
        out
    }

    /// Expand `forset` ranges into resolved nodes. Unusable nodes are dropped.
    fn resolve_forset(&mut self, ranges: &[NodeRange], out: &mut Vec<NodeRef>) {
        for range in ranges {
            if range.is_single() {
                if !range.start.is_import_valid() {
                    let text = format!("Skipping forset node because it's marked invalid: {}", range.start);
                    self.message(Severity::Error, range.start.line(), text);
                    continue;
                }
                let node = self.resolve_by_index(range.start.number(), range.start.line());
                if node.is_valid_any() {
                    out.push(node);
                } else {
                    let text = format!(
                        "Stand-alone node [{}] resolved invalid, removing from forset",
                        range.start
                    );
                    self.message(Severity::Warning, range.start.line(), text);
                }
            } else if let Some(text) = Self::unusable_range(range) {
                self.message(Severity::Error, range.start.line(), text);
            } else if let Some(last) = self.range_end(range) {
                let line = range.start.line();
                for i in range.start.number()..=last {
                    let node = self.resolve_by_index(i, line);
                    if node.is_valid_any() {
                        out.push(node);
                    } else {
                        let text = format!(
                            "Node [{i}] from range [{} - {}] resolved invalid, removing from forset",
                            range.start, range.end
                        );
                        self.message(Severity::Warning, line, text);
                    }
                }
            }
        }
    }

    /// Resolve rail ranges, expanding every range into single nodes.
    fn resolve_ranges(&mut self, ranges: &mut Vec<NodeRange>) {
        let input = std::mem::take(ranges);
        for range in input {
            if range.is_single() {
                let mut node = range.start;
                self.resolve(&mut node);
                ranges.push(NodeRange::single(node));
            } else if let Some(text) = Self::unusable_range(&range) {
                self.message(Severity::Error, range.start.line(), text);
            } else if let Some(last) = self.range_end(&range) {
                let line = range.start.line();
                for i in range.start.number()..=last {
                    ranges.push(NodeRange::single(self.resolve_by_index(i, line)));
                }
            }
        }
    }

    /// Last index to expand, clamped to the declared nodes. The overflow is
    /// reported once; `None` when the range starts past the last node.
    fn range_end(&mut self, range: &NodeRange) -> Option<u32> {
        let highest = self.highest_index();
        if i64::from(range.end.number()) <= highest {
            return Some(range.end.number());
        }
        let text = format!(
            "Node range [{} - {}] reaches past the highest available number: {highest}, truncating",
            range.start, range.end
        );
        self.message(Severity::Error, range.start.line(), text);
        if i64::from(range.start.number()) > highest {
            return None;
        }
        u32::try_from(highest).ok()
    }

    fn unusable_range(range: &NodeRange) -> Option<String> {
        let (start, end) = (range.start, range.end);
        if !start.is_import_valid() || !end.is_import_valid() {
            return Some(format!(
                "Some nodes in range are invalid, start: [{start}], end: [{end}]"
            ));
        }
        if start.state() == RefState::ResolvedNamed || end.state() == RefState::ResolvedNamed {
            return Some(format!(
                "Some nodes in range are already resolved as named, unable to process, start: [{start}], end: [{end}]"
            ));
        }
        None
    }

    // ─── Passes ───────────────────────────────────────────────────────────

    /// Resolve every reference in the root module, then in each user module.
    pub fn process(&mut self, document: &mut Document) {
        self.process_module(&mut document.root);
        for module in &mut document.user_modules {
            self.process_module(module);
        }
        self.keyword = Keyword::Invalid;
        self.module.clear();
        log::debug!("{}", self.statistics());
    }

    fn process_module(&mut self, m: &mut Module) {
        self.module.clone_from(&m.name);

        self.keyword = Keyword::Beams;
        for r in &mut m.beams {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Shocks;
        for r in &mut m.shocks {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Shocks2;
        for r in &mut m.shocks2 {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Shocks3;
        for r in &mut m.shocks3 {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Hydros;
        for r in &mut m.hydros {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Commands2;
        for r in &mut m.commands2 {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Animators;
        for r in &mut m.animators {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Triggers;
        for r in &mut m.triggers {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Ties;
        for r in &mut m.ties {
            self.resolve(&mut r.root_node);
        }
        self.keyword = Keyword::Ropes;
        for r in &mut m.ropes {
            self.resolve(&mut r.root_node);
            self.resolve(&mut r.end_node);
        }
        self.keyword = Keyword::Ropables;
        for r in &mut m.ropables {
            self.resolve(&mut r.node);
        }
        self.keyword = Keyword::Fixes;
        self.resolve_all(&mut m.fixes);
        self.keyword = Keyword::Contacters;
        self.resolve_all(&mut m.contacters);
        self.keyword = Keyword::Slidenodes;
        for r in &mut m.slidenodes {
            self.resolve(&mut r.slide_node);
            self.resolve_ranges(&mut r.rail_node_ranges);
        }
        self.keyword = Keyword::Railgroups;
        for r in &mut m.railgroups {
            self.resolve_ranges(&mut r.node_list);
        }
        self.keyword = Keyword::Lockgroups;
        for r in &mut m.lockgroups {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Hooks;
        for r in &mut m.hooks {
            self.resolve(&mut r.node);
        }
        self.keyword = Keyword::Rotators;
        for r in &mut m.rotators {
            self.resolve_all(&mut r.axis_nodes);
            self.resolve_all(&mut r.base_plate_nodes);
            self.resolve_all(&mut r.rotating_plate_nodes);
        }
        self.keyword = Keyword::Rotators2;
        for r in &mut m.rotators2 {
            self.resolve_all(&mut r.base.axis_nodes);
            self.resolve_all(&mut r.base.base_plate_nodes);
            self.resolve_all(&mut r.base.rotating_plate_nodes);
        }
        for submesh in &mut m.submeshes {
            self.keyword = Keyword::Texcoords;
            for t in &mut submesh.texcoords {
                self.resolve(&mut t.node);
            }
            self.keyword = Keyword::Cab;
            for c in &mut submesh.cab_triangles {
                self.resolve_all(&mut c.nodes);
            }
        }
        self.keyword = Keyword::Camerarail;
        for r in &mut m.camera_rails {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Collisionboxes;
        for r in &mut m.collision_boxes {
            self.resolve_all(&mut r.nodes);
        }
        self.keyword = Keyword::Cameras;
        for r in &mut m.cameras {
            self.resolve(&mut r.center_node);
            self.resolve(&mut r.back_node);
            self.resolve(&mut r.left_node);
        }
        self.keyword = Keyword::Cinecam;
        for r in &mut m.cinecams {
            self.resolve_all(&mut r.nodes);
        }

        self.process_wheels(m);
        self.process_aero(m);
        self.process_visuals(m);
    }

    fn process_wheels(&mut self, m: &mut Module) {
        self.keyword = Keyword::Wheels;
        for w in &mut m.wheels {
            self.resolve_all(&mut w.base.nodes);
            self.resolve(&mut w.base.rigidity_node);
            self.resolve(&mut w.base.reference_arm_node);
        }
        self.keyword = Keyword::Wheels2;
        for w in &mut m.wheels2 {
            self.resolve_all(&mut w.base.nodes);
            self.resolve(&mut w.base.rigidity_node);
            self.resolve(&mut w.base.reference_arm_node);
        }
        self.keyword = Keyword::Meshwheels;
        for w in &mut m.mesh_wheels {
            self.resolve_all(&mut w.base.nodes);
            self.resolve(&mut w.base.rigidity_node);
            self.resolve(&mut w.base.reference_arm_node);
        }
        self.keyword = Keyword::Meshwheels2;
        for w in &mut m.mesh_wheels2 {
            self.resolve_all(&mut w.base.nodes);
            self.resolve(&mut w.base.rigidity_node);
            self.resolve(&mut w.base.reference_arm_node);
        }
        self.keyword = Keyword::Flexbodywheels;
        for w in &mut m.flex_body_wheels {
            self.resolve_all(&mut w.base.nodes);
            self.resolve(&mut w.base.rigidity_node);
            self.resolve(&mut w.base.reference_arm_node);
        }
        self.keyword = Keyword::Axles;
        for a in &mut m.axles {
            for pair in &mut a.wheels {
                self.resolve_all(pair);
            }
        }
    }

    fn process_aero(&mut self, m: &mut Module) {
        self.keyword = Keyword::Wings;
        for w in &mut m.wings {
            self.resolve_all(&mut w.nodes);
        }
        self.keyword = Keyword::Airbrakes;
        for a in &mut m.airbrakes {
            self.resolve(&mut a.reference_node);
            self.resolve(&mut a.x_axis_node);
            self.resolve(&mut a.y_axis_node);
            self.resolve(&mut a.additional_node);
        }
        self.keyword = Keyword::Turboprops2;
        for t in &mut m.turboprops2 {
            self.resolve(&mut t.reference_node);
            self.resolve(&mut t.axis_node);
            self.resolve_all(&mut t.blade_tip_nodes);
            self.resolve(&mut t.couple_node);
        }
        self.keyword = Keyword::Pistonprops;
        for p in &mut m.pistonprops {
            self.resolve(&mut p.reference_node);
            self.resolve(&mut p.axis_node);
            self.resolve_all(&mut p.blade_tip_nodes);
            self.resolve(&mut p.couple_node);
        }
        self.keyword = Keyword::Turbojets;
        for t in &mut m.turbojets {
            self.resolve(&mut t.front_node);
            self.resolve(&mut t.back_node);
            self.resolve(&mut t.side_node);
        }
        self.keyword = Keyword::Fusedrag;
        for f in &mut m.fusedrag {
            self.resolve(&mut f.front_node);
            self.resolve(&mut f.rear_node);
        }
        self.keyword = Keyword::Screwprops;
        for s in &mut m.screwprops {
            self.resolve(&mut s.prop_node);
            self.resolve(&mut s.back_node);
            self.resolve(&mut s.top_node);
        }
    }

    fn process_visuals(&mut self, m: &mut Module) {
        self.keyword = Keyword::Props;
        for p in &mut m.props {
            self.resolve(&mut p.reference_node);
            self.resolve(&mut p.x_axis_node);
            self.resolve(&mut p.y_axis_node);
        }
        self.keyword = Keyword::Flexbodies;
        for f in &mut m.flexbodies {
            self.resolve(&mut f.reference_node);
            self.resolve(&mut f.x_axis_node);
            self.resolve(&mut f.y_axis_node);
            let ranges = std::mem::take(&mut f.node_list_to_import);
            self.resolve_forset(&ranges, &mut f.node_list);
        }
        self.keyword = Keyword::Flares2;
        for f in &mut m.flares2 {
            self.resolve(&mut f.reference_node);
            self.resolve(&mut f.node_axis_x);
            self.resolve(&mut f.node_axis_y);
        }
        self.keyword = Keyword::Exhausts;
        for e in &mut m.exhausts {
            self.resolve(&mut e.reference_node);
            self.resolve(&mut e.direction_node);
        }
        self.keyword = Keyword::Particles;
        for p in &mut m.particles {
            self.resolve(&mut p.emitter_node);
            self.resolve(&mut p.reference_node);
        }
        self.keyword = Keyword::Videocamera;
        for v in &mut m.videocameras {
            self.resolve(&mut v.reference_node);
            self.resolve(&mut v.left_node);
            self.resolve(&mut v.bottom_node);
            self.resolve(&mut v.alt_reference_node);
            self.resolve(&mut v.alt_orientation_node);
        }
        self.keyword = Keyword::Soundsources;
        for s in &mut m.soundsources {
            self.resolve(&mut s.node);
        }
        self.keyword = Keyword::Soundsources2;
        for s in &mut m.soundsources2 {
            self.resolve(&mut s.node);
        }
        self.keyword = Keyword::ExtCamera;
        if let Some(node) = m.ext_camera.as_mut().and_then(|c| c.node.as_mut()) {
            self.resolve(node);
        }
    }

    // ─── Reports ──────────────────────────────────────────────────────────

    /// Node counts per origin with their index ranges after conversion.
    #[must_use]
    pub fn statistics(&self) -> String {
        let mut out = format!("~~~ Node statistics: ~~~\n\tTotal: {}", self.all_nodes.len());
        for origin in Counts::ORDER {
            let count = self.counts.get(origin);
            let _ = write!(out, "\n\t{:>14}: {count:4}", origin.as_str());
            if count != 0 {
                let offset = self.counts.offset(origin);
                let _ = write!(
                    out,
                    " (after conversion: start index = {offset:4}, end index = {})",
                    offset + count - 1
                );
            }
        }
        let _ = write!(
            out,
            "\nResolved {} nodes ({} resolved without change)",
            self.total_resolved, self.resolved_to_self
        );
        out
    }

    /// Every node in declaration order with its origin.
    #[must_use]
    pub fn node_listing(&self) -> String {
        let mut out = format!(
            "~~~ Iterating all nodes, in order as defined (total: {}) ~~~\n",
            self.all_nodes.len()
        );
        for (index, entry) in self.all_nodes.iter().enumerate() {
            let _ = write!(
                out,
                "\n\t{index:3}: {} (from={}, sub-index={}{})",
                entry.id,
                entry.origin,
                entry.sub_index,
                entry.part.map_or("", WheelPart::label)
            );
        }
        out
    }

    /// Queue [`Self::statistics`] as an info message.
    pub fn report_statistics(&mut self) {
        let text = self.statistics();
        self.message(Severity::Info, 0, text);
    }

    /// Queue [`Self::node_listing`] as an info message.
    pub fn report_node_listing(&mut self) {
        let text = self.node_listing();
        self.message(Severity::Info, 0, text);
    }

    /// Drain the messages raised so far.
    pub fn take_messages(&mut self) -> Vec<ImportMessage> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved(text: &str) -> NodeRef {
        let number = text.parse().unwrap_or(0);
        NodeRef::unresolved(text, number, false, 7)
    }

    fn importer_with(numbered: u32) -> SequentialImporter {
        let mut imp = SequentialImporter::new(true);
        for n in 0..numbered {
            imp.add_numbered(n).unwrap();
        }
        imp
    }

    #[test]
    fn numbered_nodes_must_stay_in_sync() {
        let mut imp = importer_with(2);
        let err = imp.add_numbered(5).unwrap_err();
        assert_eq!(
            err,
            "Lost sync in node numbers, got numbered node [5], expected [2]. Ignoring node."
        );
        assert_eq!(imp.node_count(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut imp = SequentialImporter::new(true);
        imp.add_named("axle_l").unwrap();
        let err = imp.add_named("axle_l").unwrap_err();
        assert_eq!(err, "Duplicate node name [axle_l]. Ignoring node.");
    }

    #[test]
    fn plain_numbered_references_keep_their_index() {
        let mut imp = importer_with(3);
        let mut node = unresolved("2");
        imp.resolve(&mut node);
        assert_eq!(node.state(), RefState::ResolvedNumeric { index: 2 });
        assert_eq!(node.text(), "2");
    }

    #[test]
    fn generated_nodes_shift_later_declarations() {
        // 0 numbered, 1 cinecam, 2 numbered: the second node moves to index 1
        // and the cinecam node goes after all declared nodes.
        let mut imp = importer_with(1);
        imp.add_generated(Keyword::Cinecam);
        imp.add_numbered(2).unwrap();

        let mut after = unresolved("2");
        imp.resolve(&mut after);
        assert_eq!(after.state(), RefState::ResolvedNumeric { index: 1 });

        let mut camera = unresolved("1");
        imp.resolve(&mut camera);
        assert_eq!(camera.state(), RefState::ResolvedNumeric { index: 2 });
    }

    #[test]
    fn wheels2_generate_rim_and_tyre_nodes() {
        let mut imp = importer_with(2);
        imp.generate_wheel_nodes(Keyword::Wheels2, 3);
        assert_eq!(imp.node_count(), 2 + 12);
        imp.generate_wheel_nodes(Keyword::Wheels, 3);
        assert_eq!(imp.node_count(), 2 + 12 + 6);
        // wheels are laid out before wheels2
        let mut first_wheels2 = unresolved("2");
        imp.resolve(&mut first_wheels2);
        assert_eq!(first_wheels2.state(), RefState::ResolvedNumeric { index: 8 });
    }

    #[test]
    fn named_first_lookup_wins() {
        let mut imp = importer_with(1);
        imp.add_named("5").unwrap();
        let mut node = NodeRef::unresolved("5", 5, true, 3);
        imp.resolve(&mut node);
        assert_eq!(node.state(), RefState::ResolvedNamed);
        assert_eq!(node.text(), "5");
    }

    #[test]
    fn index_of_named_node_resolves_to_its_name() {
        let mut imp = importer_with(1);
        imp.add_named("hub").unwrap();
        let mut node = unresolved("1");
        imp.resolve(&mut node);
        assert_eq!(node.state(), RefState::ResolvedNamed);
        assert_eq!(node.text(), "hub");
    }

    #[test]
    fn undefined_index_falls_back_to_zero() {
        let mut imp = importer_with(2);
        let mut node = unresolved("9");
        imp.resolve(&mut node);
        assert_eq!(node.state(), RefState::ResolvedNumeric { index: 0 });
        let messages = imp.take_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Error);
        assert_eq!(messages[0].line_number, 7);
        assert!(messages[0].text.contains("highest is: 1"));
    }

    #[test]
    fn invalid_and_settled_references_are_untouched() {
        let mut imp = importer_with(2);
        let mut absent = NodeRef::invalid("9999");
        imp.resolve(&mut absent);
        assert_eq!(absent.state(), RefState::Invalid);
        let mut regular = NodeRef::regular("hub", 1);
        imp.resolve(&mut regular);
        assert_eq!(regular.state(), RefState::Regular);
        assert!(imp.take_messages().is_empty());
    }

    #[test]
    fn forset_ranges_are_inclusive() {
        let mut imp = importer_with(6);
        let ranges = vec![
            NodeRange::new(unresolved("1"), unresolved("3")),
            NodeRange::single(unresolved("5")),
        ];
        let mut out = Vec::new();
        imp.resolve_forset(&ranges, &mut out);
        let texts: Vec<_> = out.iter().map(NodeRef::text).collect();
        assert_eq!(texts, ["1", "2", "3", "5"]);
    }

    #[test]
    fn forset_drops_undefined_nodes_with_a_warning() {
        let mut imp = importer_with(2);
        let ranges = vec![NodeRange::single(unresolved("4"))];
        let mut out = Vec::new();
        imp.resolve_forset(&ranges, &mut out);
        assert!(out.is_empty());
        let messages = imp.take_messages();
        assert!(messages.iter().any(|m| m.severity == Severity::Error));
        assert!(messages.iter().any(|m| m.severity == Severity::Warning));
    }

    #[test]
    fn rail_ranges_expand_to_single_nodes() {
        let mut imp = importer_with(5);
        let mut ranges = vec![NodeRange::new(unresolved("2"), unresolved("4"))];
        imp.resolve_ranges(&mut ranges);
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(NodeRange::is_single));
    }

    #[test]
    fn oversized_ranges_are_clamped_once() {
        let mut imp = importer_with(3);
        let ranges = vec![NodeRange::new(unresolved("1"), unresolved("4000000000"))];
        let mut out = Vec::new();
        imp.resolve_forset(&ranges, &mut out);
        let texts: Vec<_> = out.iter().map(NodeRef::text).collect();
        assert_eq!(texts, ["1", "2"]);
        let messages = imp.take_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("highest available number: 2, truncating"));

        let mut rails = vec![NodeRange::new(unresolved("7"), unresolved("4000000000"))];
        imp.resolve_ranges(&mut rails);
        assert!(rails.is_empty());
        assert_eq!(imp.take_messages().len(), 1);
    }

    #[test]
    fn invalid_range_is_reported() {
        let mut imp = importer_with(5);
        let mut ranges = vec![NodeRange::new(NodeRef::invalid("x"), unresolved("4"))];
        imp.resolve_ranges(&mut ranges);
        assert!(ranges.is_empty());
        let messages = imp.take_messages();
        assert!(messages[0].text.starts_with("Some nodes in range are invalid"));
    }

    #[test]
    fn moved_index_produces_info() {
        let mut imp = importer_with(1);
        imp.add_generated(Keyword::Cinecam);
        imp.add_numbered(2).unwrap();
        let node = imp.resolve_by_index(1, 4);
        assert_eq!(node.text(), "2");
        let messages = imp.take_messages();
        assert_eq!(messages[0].severity, Severity::Info);
        assert!(messages[0].text.contains("(generated by: cinecam, sub-index: 0)"));
    }

    #[test]
    fn statistics_list_every_origin() {
        let mut imp = importer_with(3);
        imp.add_generated(Keyword::Cinecam);
        let stats = imp.statistics();
        assert!(stats.starts_with("~~~ Node statistics: ~~~\n\tTotal: 4"));
        assert!(stats.contains("nodes:    3 (after conversion: start index =    0, end index = 2)"));
        assert!(stats.contains("cinecam:    1 (after conversion: start index =    3, end index = 3)"));
        assert!(stats.contains("flexbodywheels:    0"));
    }

    #[test]
    fn node_listing_marks_wheel_parts() {
        let mut imp = importer_with(1);
        imp.generate_wheel_nodes(Keyword::Wheels2, 1);
        let listing = imp.node_listing();
        assert!(listing.contains("(from=wheels2, sub-index=0[rim,  A])"));
        assert!(listing.contains("(from=wheels2, sub-index=3[tyre, B])"));
    }
}
