//! Arena-backed document tree.
//!
//! All nodes live in a `Vec<NodeData>` owned by the [`Document`] and are
//! referenced by [`NodeId`]. Parent, child and sibling links are stored as
//! ids, so the tree has no reference cycles and no per-node allocation.
//! Removed nodes stay in the arena (detached) until the document is dropped.

use crate::error::{DomError, Result};
use crate::implementation::{DomImplementation, Feature};
use crate::node::{NodeData, NodeId, NodeKind, NodeType, Position, QualifiedName};

/// The index of the Document node itself.
const DOCUMENT_INDEX: usize = 0;

/// A document and every node created for it.
///
/// Navigation goes through `&Document`, mutation through `&mut Document`.
/// Every node except the Document node has at most one parent, and sibling
/// links are kept mutually consistent by all mutation methods.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    implementation: DomImplementation,
    /// Source identity of the document (the locator's system id when parsed).
    pub document_uri: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with every feature enabled.
    pub fn new() -> Self {
        Self::with_implementation(DomImplementation::new())
    }

    /// Create an empty document bound to `implementation`.
    pub fn with_implementation(implementation: DomImplementation) -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(NodeData::new(NodeKind::Document));
        Self {
            nodes,
            implementation,
            document_uri: None,
        }
    }

    pub fn implementation(&self) -> &DomImplementation {
        &self.implementation
    }

    /// The Document node.
    pub fn root(&self) -> NodeId {
        NodeId::from_index(DOCUMENT_INDEX)
    }

    /// Storage for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this document.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Queries ---

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).kind.node_type()
    }

    /// The DOM `nodeName`.
    pub fn node_name(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Document => "#document",
            NodeKind::DocumentType { name, .. } => name,
            NodeKind::Element { name, .. } | NodeKind::Attribute { name, .. } => &name.qualified,
            NodeKind::Text { .. } => "#text",
            NodeKind::CDataSection { .. } => "#cdata-section",
            NodeKind::Comment { .. } => "#comment",
            NodeKind::ProcessingInstruction { target, .. } => target,
            NodeKind::DocumentFragment => "#document-fragment",
        }
    }

    /// The qualified tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. } => Some(&name.qualified),
            _ => None,
        }
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .kind
            .qualified_name()
            .map(|name| name.local_name.as_str())
    }

    pub fn prefix(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .kind
            .qualified_name()
            .and_then(|name| name.prefix.as_deref())
    }

    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .kind
            .qualified_name()
            .and_then(|name| name.namespace_uri.as_deref())
    }

    /// The DOM `nodeValue`: attribute values and character data.
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Attribute { value, .. } => Some(value),
            _ => self.data(id),
        }
    }

    /// Character data of text, CDATA, comment and processing instruction nodes.
    pub fn data(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { data }
            | NodeKind::CDataSection { data }
            | NodeKind::Comment { data }
            | NodeKind::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Replace the value of an attribute or the data of a character node.
    ///
    /// Has no effect on other node kinds.
    pub fn set_node_value(&mut self, id: NodeId, new_value: &str) {
        match &mut self.node_mut(id).kind {
            NodeKind::Attribute { value, .. } => *value = new_value.to_string(),
            NodeKind::Text { data }
            | NodeKind::CDataSection { data }
            | NodeKind::Comment { data }
            | NodeKind::ProcessingInstruction { data, .. } => *data = new_value.to_string(),
            _ => {}
        }
    }

    /// The DOM `textContent`.
    ///
    /// Elements and fragments concatenate their descendant text and CDATA;
    /// documents and document types have none.
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match &self.node(id).kind {
            NodeKind::Document | NodeKind::DocumentType { .. } => None,
            NodeKind::Element { .. } | NodeKind::DocumentFragment => {
                let mut content = String::new();
                for node in self.descendants(id) {
                    if let NodeKind::Text { data } | NodeKind::CDataSection { data } =
                        &self.node(node).kind
                    {
                        content.push_str(data);
                    }
                }
                Some(content)
            }
            _ => self.node_value(id).map(str::to_string),
        }
    }

    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.node(id).position
    }

    pub fn set_position(&mut self, id: NodeId, position: Position) {
        self.node_mut(id).position = Some(position);
    }

    /// The first element child of the Document node.
    pub fn document_element(&self) -> Option<NodeId> {
        self.child_nodes(self.root())
            .find(|&id| self.node_type(id) == NodeType::Element)
    }

    pub fn doctype(&self) -> Option<NodeId> {
        self.child_nodes(self.root())
            .find(|&id| self.node_type(id) == NodeType::DocumentType)
    }

    // --- Navigation ---

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        self.node(id).first_child.is_some()
    }

    /// Iterate the children of `id` in document order.
    pub fn child_nodes(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// Iterate all descendants of `id` in document order (not including `id`).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_node(id);
        }
        false
    }

    /// Descendant elements of `id` whose qualified name is `name` (`*` matches all).
    pub fn get_elements_by_tag_name(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&node| match self.tag_name(node) {
                Some(tag) => name == "*" || tag == name,
                None => false,
            })
            .collect()
    }

    // --- Attributes ---

    /// Attribute nodes of an element, in document order.
    ///
    /// Returns an empty slice for non-element nodes.
    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn get_attribute_node(&self, element: NodeId, name: &str) -> Option<NodeId> {
        self.attributes(element)
            .iter()
            .copied()
            .find(|&attr| self.node_name(attr) == name)
    }

    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.get_attribute_node(element, name)
            .and_then(|attr| self.node_value(attr))
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_attribute_node(element, name).is_some()
    }

    pub fn get_attribute_node_ns(
        &self,
        element: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        self.attributes(element)
            .iter()
            .copied()
            .find(|&attr| {
                self.node(attr)
                    .kind
                    .attribute_matches(namespace_uri, local_name)
            })
    }

    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        self.get_attribute_node_ns(element, namespace_uri, local_name)
            .and_then(|attr| self.node_value(attr))
    }

    /// The element an attribute is installed on.
    pub fn owner_element(&self, attr: NodeId) -> Option<NodeId> {
        match &self.node(attr).kind {
            NodeKind::Attribute { owner, .. } => *owner,
            _ => None,
        }
    }

    // --- Construction ---

    /// Allocate a detached node.
    ///
    /// # Panics
    ///
    /// Panics if the document already holds `u32::MAX` nodes.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_ns(None, name)
    }

    pub fn create_element_ns(&mut self, namespace_uri: Option<&str>, qualified_name: &str) -> NodeId {
        self.create_node(NodeKind::Element {
            name: QualifiedName::new(namespace_uri, qualified_name),
            attributes: Vec::new(),
        })
    }

    pub fn create_attribute(&mut self, name: &str) -> NodeId {
        self.create_attribute_ns(None, name)
    }

    pub fn create_attribute_ns(
        &mut self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> NodeId {
        self.create_node(NodeKind::Attribute {
            name: QualifiedName::new(namespace_uri, qualified_name),
            value: String::new(),
            owner: None,
        })
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::Text {
            data: data.to_string(),
        })
    }

    pub fn create_cdata_section(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::CDataSection {
            data: data.to_string(),
        })
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::Comment {
            data: data.to_string(),
        })
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.create_node(NodeKind::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.create_node(NodeKind::DocumentFragment)
    }

    /// Create a document type node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotSupported`] when the document's implementation
    /// lacks [`Feature::DocumentType`].
    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> Result<NodeId> {
        if !self.implementation.has_feature(Feature::DocumentType) {
            return Err(DomError::NotSupported {
                feature: "DocumentType".to_string(),
            });
        }
        Ok(self.create_node(NodeKind::DocumentType {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    // --- Mutation ---

    /// Install `attr` on `element`.
    ///
    /// An attribute with the same namespace URI and local name is replaced in
    /// place (keeping attribute order) and returned.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::HierarchyRequest`] if `element` is not an element or
    /// `attr` is not an attribute, and [`DomError::InUseAttribute`] if `attr`
    /// belongs to a different element.
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> Result<Option<NodeId>> {
        if self.node_type(element) != NodeType::Element {
            return Err(DomError::hierarchy(format!(
                "{} cannot hold attributes",
                self.node_name(element)
            )));
        }
        let (namespace_uri, local_name) = match &self.node(attr).kind {
            NodeKind::Attribute { owner: Some(owner), .. } if *owner == element => {
                return Ok(Some(attr));
            }
            NodeKind::Attribute {
                owner: Some(_),
                name,
                ..
            } => {
                return Err(DomError::InUseAttribute {
                    name: name.qualified.clone(),
                });
            }
            NodeKind::Attribute { name, .. } => (name.namespace_uri.clone(), name.local_name.clone()),
            _ => {
                return Err(DomError::hierarchy(format!(
                    "{} is not an attribute",
                    self.node_name(attr)
                )));
            }
        };

        let replaced = self.get_attribute_node_ns(element, namespace_uri.as_deref(), &local_name);
        if let Some(old) = replaced {
            if let NodeKind::Attribute { owner, .. } = &mut self.node_mut(old).kind {
                *owner = None;
            }
        }
        if let NodeKind::Attribute { owner, .. } = &mut self.node_mut(attr).kind {
            *owner = Some(element);
        }
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(element).kind {
            match replaced.and_then(|old| attributes.iter().position(|&a| a == old)) {
                Some(slot) => attributes[slot] = attr,
                None => attributes.push(attr),
            }
        }
        Ok(replaced)
    }

    /// Set (or create) the attribute named `name` on `element`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::HierarchyRequest`] if `element` is not an element.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        if let Some(attr) = self.get_attribute_node(element, name) {
            self.set_node_value(attr, value);
            return Ok(());
        }
        let attr = self.create_attribute(name);
        self.set_node_value(attr, value);
        self.set_attribute_node(element, attr)?;
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// See [`insert_before`](Self::insert_before) for the detailed semantics.
    ///
    /// # Errors
    ///
    /// Same as [`insert_before`](Self::insert_before).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (at the end when `None`).
    ///
    /// A child that already has a parent is detached first. Inserting a
    /// document fragment moves all of its children, in order, and leaves the
    /// fragment empty. Returns `child`.
    ///
    /// # Errors
    ///
    /// - [`DomError::HierarchyRequest`] if `parent` cannot hold children, if
    ///   `child` is a document or attribute, if a document type is inserted
    ///   anywhere but a document, or if `child` is `parent` or one of its
    ///   ancestors.
    /// - [`DomError::NotFound`] if `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId> {
        self.ensure_pre_insertion_validity(parent, child, reference)?;

        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };

        if self.node_type(child) == NodeType::DocumentFragment {
            let moved: Vec<NodeId> = self.child_nodes(child).collect();
            for node in moved {
                self.detach(node);
                self.link_before(parent, node, reference);
            }
        } else {
            self.detach(child);
            self.link_before(parent, child, reference);
        }

        Ok(child)
    }

    /// Remove `child` from `parent` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        if self.parent_node(child) != Some(parent) {
            return Err(DomError::not_found(format!(
                "{} is not a child of {}",
                self.node_name(child),
                self.node_name(parent)
            )));
        }
        self.detach(child);
        Ok(child)
    }

    /// Merge adjacent text nodes and drop empty ones, in the whole subtree.
    ///
    /// CDATA sections are left untouched and separate the text on either
    /// side of them.
    pub fn normalize(&mut self, id: NodeId) {
        let mut pending = vec![id];

        while let Some(parent) = pending.pop() {
            let mut cursor = self.first_child(parent);

            while let Some(current) = cursor {
                let next = self.next_sibling(current);

                match self.node_type(current) {
                    NodeType::Text if self.data(current).is_some_and(str::is_empty) => {
                        self.detach(current);
                        cursor = next;
                    }
                    NodeType::Text => {
                        let mut following = next;
                        while let Some(sibling) = following {
                            let NodeKind::Text { data } = &self.node(sibling).kind else {
                                break;
                            };
                            let extra = data.clone();
                            following = self.next_sibling(sibling);
                            self.detach(sibling);
                            if let NodeKind::Text { data } = &mut self.node_mut(current).kind {
                                data.push_str(&extra);
                            }
                        }
                        cursor = following;
                    }
                    NodeType::Element | NodeType::DocumentFragment => {
                        pending.push(current);
                        cursor = next;
                    }
                    _ => cursor = next,
                }
            }
        }
    }

    fn ensure_pre_insertion_validity(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let parent_kind = &self.node(parent).kind;
        if !parent_kind.is_container() {
            return Err(DomError::hierarchy(format!(
                "{} cannot have children",
                self.node_name(parent)
            )));
        }

        match self.node(child).kind {
            NodeKind::Document | NodeKind::Attribute { .. } => {
                return Err(DomError::hierarchy(format!(
                    "{} cannot be inserted as a child",
                    self.node_name(child)
                )));
            }
            NodeKind::DocumentType { .. } if *parent_kind != NodeKind::Document => {
                return Err(DomError::hierarchy(
                    "a document type can only be a child of a document",
                ));
            }
            _ => {}
        }

        if self.contains(child, parent) {
            return Err(DomError::hierarchy(
                "the new child is the parent or one of its ancestors",
            ));
        }

        if let Some(reference) = reference {
            if self.parent_node(reference) != Some(parent) {
                return Err(DomError::not_found(format!(
                    "reference {} is not a child of {}",
                    self.node_name(reference),
                    self.node_name(parent)
                )));
            }
        }

        Ok(())
    }

    /// Unlink `id` from its parent and siblings.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Link a detached `child` into `parent` before `reference`.
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let prev = match reference {
            Some(reference) => self.node(reference).prev_sibling,
            None => self.node(parent).last_child,
        };

        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = reference;

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        match reference {
            Some(reference) => self.node_mut(reference).prev_sibling = Some(child),
            None => self.node_mut(parent).last_child = Some(child),
        }
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = match self.doc.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(sibling) = self.doc.next_sibling(node) {
                        break Some(sibling);
                    }
                    match self.doc.parent_node(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };

        Some(current)
    }
}
