//! Attribute lists delivered with element-start events.

use xmldom_dom::Position;

/// One attribute of a start tag, with its namespace already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// `None` for unprefixed attributes and unbound prefixes.
    pub namespace_uri: Option<String>,
    pub local_name: String,
    pub q_name: String,
    /// The value with entity and character references expanded.
    pub value: String,
    /// Where the attribute name starts in the source.
    pub position: Position,
}

/// The attributes of a start tag, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Look an attribute up by its qualified name.
    pub fn value(&self, q_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|attr| attr.q_name == q_name)
            .map(|attr| attr.value.as_str())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
