//! Node identities and dual-state node references.
//!
//! Legacy truck files address nodes by their declaration index, while newer
//! files use names. Because `fileformatversion` may appear anywhere in the
//! file, a reference parsed before the version is known keeps both readings
//! alive until the sequential importer settles it.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner for node names. Names repeat across thousands of
/// lines and across documents. The table is append-only and its ids never
/// reach the serialized output, so documents stay independent; a long-lived
/// process pays for every distinct name it has ever seen.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned node name: 4 bytes, `Copy`, O(1) comparisons.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeName(Spur);

impl NodeName {
    pub fn intern(s: &str) -> Self {
        NodeName(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl Default for NodeName {
    fn default() -> Self {
        Self::intern("")
    }
}

impl fmt::Debug for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeName::intern(&s))
    }
}

// ─── Node identity ──────────────────────────────────────────────────────

/// Identity of a declared node: a number (`nodes`) or a name (`nodes2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Numbered(u32),
    Named(NodeName),
}

impl NodeId {
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        match self {
            NodeId::Numbered(n) => Some(*n),
            NodeId::Named(_) => None,
        }
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, NodeId::Named(_))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::Numbered(0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Numbered(n) => write!(f, "{n}"),
            NodeId::Named(name) => f.write_str(name.as_str()),
        }
    }
}

// ─── Node reference ─────────────────────────────────────────────────────

/// Resolution state of a [`NodeRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefState {
    /// Parsed while the importer was active. Both the import reading
    /// (declaration index) and the regular reading (name) are still valid.
    Unresolved { check_named_first: bool },
    /// Parsed after `fileformatversion >= 450`: named identity only.
    Regular,
    /// The importer found the text in the named-node table.
    ResolvedNamed,
    /// The importer mapped the reference to a node by declaration index.
    ResolvedNumeric { index: u32 },
    /// Absent or unresolvable.
    Invalid,
}

/// A reference to a node, usable before the whole file is known.
///
/// Equality compares the text identity only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeRef {
    text: NodeName,
    number: u32,
    state: RefState,
    line: u32,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for NodeRef {}

impl Default for NodeRef {
    fn default() -> Self {
        Self::invalid("")
    }
}

impl NodeRef {
    /// Reference parsed while the sequential importer is active.
    #[must_use]
    pub fn unresolved(text: &str, number: u32, check_named_first: bool, line: u32) -> Self {
        Self {
            text: NodeName::intern(text),
            number,
            state: RefState::Unresolved { check_named_first },
            line,
        }
    }

    /// Reference parsed in a named-only (modern) file.
    #[must_use]
    pub fn regular(text: &str, line: u32) -> Self {
        Self {
            text: NodeName::intern(text),
            number: 0,
            state: RefState::Regular,
            line,
        }
    }

    /// An absent reference (`-1`, `9999`) that keeps its source text.
    #[must_use]
    pub fn invalid(text: &str) -> Self {
        Self {
            text: NodeName::intern(text),
            number: 0,
            state: RefState::Invalid,
            line: 0,
        }
    }

    /// Reference to a declared node, already settled.
    #[must_use]
    pub fn to_node(id: NodeId) -> Self {
        match id {
            NodeId::Numbered(n) => Self {
                text: NodeName::intern(&n.to_string()),
                number: n,
                state: RefState::ResolvedNumeric { index: n },
                line: 0,
            },
            NodeId::Named(name) => Self {
                text: name,
                number: 0,
                state: RefState::ResolvedNamed,
                line: 0,
            },
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    #[must_use]
    pub fn name(&self) -> NodeName {
        self.text
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn state(&self) -> RefState {
        self.state
    }

    /// 1-based source line, 0 when synthesized.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn is_import_valid(&self) -> bool {
        matches!(
            self.state,
            RefState::Unresolved { .. } | RefState::ResolvedNamed | RefState::ResolvedNumeric { .. }
        )
    }

    #[must_use]
    pub fn is_regular_valid(&self) -> bool {
        matches!(self.state, RefState::Unresolved { .. } | RefState::Regular)
    }

    /// Usable when either reading is still valid.
    #[must_use]
    pub fn is_valid_any(&self) -> bool {
        self.is_import_valid() || self.is_regular_valid()
    }

    #[must_use]
    pub fn must_check_named_first(&self) -> bool {
        matches!(
            self.state,
            RefState::Unresolved {
                check_named_first: true
            }
        )
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.state,
            RefState::ResolvedNamed | RefState::ResolvedNumeric { .. }
        )
    }

    /// Settle as a reference to a named node.
    pub fn resolve_named(&mut self) {
        self.state = RefState::ResolvedNamed;
    }

    /// Settle as a reference to the node at declaration `index`.
    pub fn resolve_numeric(&mut self, index: u32) {
        self.state = RefState::ResolvedNumeric { index };
    }

    pub fn invalidate(&mut self) {
        self.state = RefState::Invalid;
    }

    /// Settle on declaration `index`, rewriting the text to the new number.
    pub fn settle_numeric(&mut self, index: u32) {
        self.text = NodeName::intern(&index.to_string());
        self.number = index;
        self.state = RefState::ResolvedNumeric { index };
    }

    /// Settle on the named node `name`, rewriting the text to that name.
    pub fn settle_named(&mut self, name: NodeName) {
        self.text = name;
        self.number = 0;
        self.state = RefState::ResolvedNamed;
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Builds [`NodeRef`]s from raw tokens under the parser's current import state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefBuilder {
    pub importer_enabled: bool,
    pub any_named_node_defined: bool,
    pub line: u32,
}

impl RefBuilder {
    /// Build a reference; returns a warning when a negative number had to be flipped.
    #[must_use]
    pub fn build(&self, token: &str) -> (NodeRef, Option<String>) {
        if !self.importer_enabled {
            return (NodeRef::regular(token, self.line), None);
        }
        let parsed = parse_leading_int(token);
        let warning = (parsed < 0).then(|| {
            format!(
                "Encountered node with illegal negative number: '{parsed}', parsing as positive '{}' for backwards compatibility. Please fix as soon as possible.",
                -parsed
            )
        });
        let number = u32::try_from(parsed.unsigned_abs()).unwrap_or(u32::MAX);
        (
            NodeRef::unresolved(token, number, self.any_named_node_defined, self.line),
            warning,
        )
    }
}

/// `atoi`-style parse: optional sign, leading digits, 0 when absent.
fn parse_leading_int(token: &str) -> i64 {
    let t = token.trim_start();
    let (neg, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if neg { -value } else { value }
}

// ─── Ranges ─────────────────────────────────────────────────────────────

/// Inclusive range of nodes, used by `forset` and rail lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRange {
    pub start: NodeRef,
    pub end: NodeRef,
}

impl NodeRange {
    #[must_use]
    pub fn single(node: NodeRef) -> Self {
        Self {
            start: node,
            end: node,
        }
    }

    #[must_use]
    pub fn new(start: NodeRef, end: NodeRef) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}
