//! Node storage types.

/// A typed index into a document's node arena.
///
/// Ids are only meaningful for the [`Document`](crate::Document) that
/// created them; using an id with another document panics or returns an
/// unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if a document grows past `u32::MAX` nodes.
    pub(crate) fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) => Self(index),
            Err(_) => panic!("node index {index} does not fit a NodeId"),
        }
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source position of a node (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A namespace-qualified name.
///
/// Keeps the qualified name as written (`svg:rect`) next to its split
/// prefix and local part, plus the namespace URI it was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub qualified: String,
}

impl QualifiedName {
    /// Split `qualified` at its first `:` and attach `namespace_uri`.
    pub fn new(namespace_uri: Option<&str>, qualified: &str) -> Self {
        let (prefix, local_name) = match qualified.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                (Some(prefix.to_string()), local.to_string())
            }
            _ => (None, qualified.to_string()),
        };

        Self {
            namespace_uri: namespace_uri.filter(|uri| !uri.is_empty()).map(str::to_string),
            prefix,
            local_name,
            qualified: qualified.to_string(),
        }
    }

    /// A name with no namespace.
    pub fn local(name: &str) -> Self {
        Self::new(None, name)
    }

    fn matches_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> bool {
        self.namespace_uri.as_deref() == namespace_uri.filter(|uri| !uri.is_empty())
            && self.local_name == local_name
    }
}

/// DOM node type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CDataSection = 4,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

impl NodeType {
    /// The numeric `nodeType` value.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// The variant payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    DocumentType {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        name: QualifiedName,
        /// Attribute nodes in document order.
        attributes: Vec<NodeId>,
    },
    Attribute {
        name: QualifiedName,
        value: String,
        owner: Option<NodeId>,
    },
    Text {
        data: String,
    },
    CDataSection {
        data: String,
    },
    Comment {
        data: String,
    },
    ProcessingInstruction {
        target: String,
        data: String,
    },
    DocumentFragment,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::DocumentType { .. } => NodeType::DocumentType,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Attribute { .. } => NodeType::Attribute,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::CDataSection { .. } => NodeType::CDataSection,
            NodeKind::Comment { .. } => NodeType::Comment,
            NodeKind::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
            NodeKind::DocumentFragment => NodeType::DocumentFragment,
        }
    }

    /// Whether nodes of this kind may hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::Element { .. } | NodeKind::DocumentFragment
        )
    }

    pub(crate) fn qualified_name(&self) -> Option<&QualifiedName> {
        match self {
            NodeKind::Element { name, .. } | NodeKind::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn attribute_matches(&self, namespace_uri: Option<&str>, local_name: &str) -> bool {
        matches!(self, NodeKind::Attribute { name, .. } if name.matches_ns(namespace_uri, local_name))
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    /// Where the node started in the source, when parsed with a locator.
    pub position: Option<Position>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_keeps_index() {
        assert_eq!(NodeId::from_index(42).index(), 42);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "does not fit a NodeId")]
    fn test_node_id_rejects_oversized_index() {
        let _ = NodeId::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn test_qualified_name_split() {
        let name = QualifiedName::new(Some("http://www.w3.org/2000/svg"), "svg:rect");
        assert_eq!(name.prefix.as_deref(), Some("svg"));
        assert_eq!(name.local_name, "rect");
        assert_eq!(name.qualified, "svg:rect");
        assert_eq!(
            name.namespace_uri.as_deref(),
            Some("http://www.w3.org/2000/svg")
        );
    }

    #[test]
    fn test_qualified_name_without_prefix() {
        let name = QualifiedName::new(Some(""), "root");
        assert_eq!(name.prefix, None);
        assert_eq!(name.local_name, "root");
        // Empty namespace URIs mean "no namespace"
        assert_eq!(name.namespace_uri, None);
    }

    #[test]
    fn test_node_type_codes() {
        assert_eq!(NodeType::Element.code(), 1);
        assert_eq!(NodeType::CDataSection.code(), 4);
        assert_eq!(NodeType::DocumentFragment.code(), 11);
        assert_eq!(
            NodeKind::Comment {
                data: String::new()
            }
            .node_type(),
            NodeType::Comment
        );
    }
}
