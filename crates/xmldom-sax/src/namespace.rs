//! Namespace bindings in scope during a parse.

use std::collections::BTreeMap;

pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Prefix to namespace URI; the empty prefix is the default namespace.
pub type NamespaceMap = BTreeMap<String, String>;

/// Stack of namespace declarations, one frame per open element.
#[derive(Debug, Clone)]
pub struct NamespaceScopes {
    bindings: Vec<(String, String)>,
    /// Start of each open element's bindings in `bindings`.
    frames: Vec<usize>,
}

impl NamespaceScopes {
    /// Scopes with `xml` and `xmlns` predefined and `defaults` bound on top.
    pub fn new(defaults: &NamespaceMap) -> Self {
        let mut bindings = vec![
            ("xml".to_string(), XML_NAMESPACE.to_string()),
            ("xmlns".to_string(), XMLNS_NAMESPACE.to_string()),
        ];
        bindings.extend(
            defaults
                .iter()
                .map(|(prefix, uri)| (prefix.clone(), uri.clone())),
        );
        Self {
            bindings,
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(self.bindings.len());
    }

    /// Pop the innermost frame and return the prefixes it declared.
    pub fn pop_frame(&mut self) -> Vec<String> {
        let Some(start) = self.frames.pop() else {
            return Vec::new();
        };
        self.bindings
            .drain(start..)
            .map(|(prefix, _)| prefix)
            .collect()
    }

    pub fn bind(&mut self, prefix: &str, uri: &str) {
        self.bindings.push((prefix.to_string(), uri.to_string()));
    }

    /// The URI bound to `prefix`, if any.
    ///
    /// A binding to the empty string (`xmlns=""`) unbinds the prefix.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }
}

/// Split a qualified name into its prefix and local part.
pub fn split_qname(q_name: &str) -> (Option<&str>, &str) {
    match q_name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, q_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_prefixes() {
        let scopes = NamespaceScopes::new(&NamespaceMap::new());
        assert_eq!(scopes.resolve("xml"), Some(XML_NAMESPACE));
        assert_eq!(scopes.resolve("xmlns"), Some(XMLNS_NAMESPACE));
        assert_eq!(scopes.resolve(""), None);
    }

    #[test]
    fn test_frames_shadow_and_restore() {
        let mut defaults = NamespaceMap::new();
        defaults.insert(String::new(), XHTML_NAMESPACE.to_string());
        let mut scopes = NamespaceScopes::new(&defaults);

        scopes.push_frame();
        scopes.bind("", "urn:inner");
        scopes.bind("a", "urn:a");
        assert_eq!(scopes.resolve(""), Some("urn:inner"));
        assert_eq!(scopes.resolve("a"), Some("urn:a"));

        scopes.push_frame();
        scopes.bind("", "");
        assert_eq!(scopes.resolve(""), None);
        assert_eq!(scopes.pop_frame(), vec![String::new()]);

        assert_eq!(scopes.pop_frame(), vec![String::new(), "a".to_string()]);
        assert_eq!(scopes.resolve(""), Some(XHTML_NAMESPACE));
        assert_eq!(scopes.resolve("a"), None);
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
        assert_eq!(split_qname("rect"), (None, "rect"));
        assert_eq!(split_qname(":odd"), (None, ":odd"));
    }
}
