//! Markup serialization.
//!
//! Writes nodes back out as XML text. Attributes are written in document
//! order exactly as they are stored, so namespace declarations kept as
//! `xmlns` attributes round-trip unchanged.

use quick_xml::escape::{escape, partial_escape};

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

/// Serializes a node and its subtree to a string.
#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    _private: (),
}

impl XmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `node` (a document serializes as the concatenation of its children).
    pub fn serialize_to_string(&self, doc: &Document, node: NodeId) -> String {
        let mut out = String::new();
        write_node(doc, node, &mut out);
        out
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match &doc.node(id).kind {
        NodeKind::Document | NodeKind::DocumentFragment => {
            for child in doc.child_nodes(id) {
                write_node(doc, child, out);
            }
        }
        NodeKind::Element { name, attributes } => {
            out.push('<');
            out.push_str(&name.qualified);
            for &attr in attributes {
                write_attribute(doc, attr, out);
            }

            if doc.has_child_nodes(id) {
                out.push('>');
                for child in doc.child_nodes(id) {
                    write_node(doc, child, out);
                }
                out.push_str("</");
                out.push_str(&name.qualified);
                out.push('>');
            } else {
                out.push_str("/>");
            }
        }
        NodeKind::Attribute { .. } => write_attribute(doc, id, out),
        NodeKind::Text { data } => out.push_str(&partial_escape(data.as_str())),
        NodeKind::CDataSection { data } => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        NodeKind::Comment { data } => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
        NodeKind::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                out.push_str(" PUBLIC \"");
                out.push_str(public_id);
                out.push('"');
                if !system_id.is_empty() {
                    out.push_str(" \"");
                    out.push_str(system_id);
                    out.push('"');
                }
            } else if !system_id.is_empty() {
                out.push_str(" SYSTEM \"");
                out.push_str(system_id);
                out.push('"');
            }
            out.push('>');
        }
    }
}

fn write_attribute(doc: &Document, attr: NodeId, out: &mut String) {
    if let NodeKind::Attribute { name, value, .. } = &doc.node(attr).kind {
        out.push(' ');
        out.push_str(&name.qualified);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(doc: &Document) -> String {
        XmlSerializer::new().serialize_to_string(doc, doc.root())
    }

    #[test]
    fn test_empty_element_self_closes() {
        let mut doc = Document::new();
        let root = doc.create_element("root");
        doc.append_child(doc.root(), root).unwrap();
        insta::assert_snapshot!(serialize(&doc), @"<root/>");
    }

    #[test]
    fn test_mixed_content() {
        let mut doc = Document::new();
        let pi = doc.create_processing_instruction("xml", "version=\"1.0\"");
        let root = doc.create_element("root");
        doc.set_attribute(root, "title", "1<2 & \"q\"").unwrap();
        let text = doc.create_text_node("a < b");
        let cdata = doc.create_cdata_section("<raw>");
        let comment = doc.create_comment(" note ");
        doc.append_child(doc.root(), pi).unwrap();
        doc.append_child(doc.root(), root).unwrap();
        for child in [text, cdata, comment] {
            doc.append_child(root, child).unwrap();
        }

        insta::assert_snapshot!(
            serialize(&doc),
            @r#"<?xml version="1.0"?><root title="1&lt;2 &amp; &quot;q&quot;">a &lt; b<![CDATA[<raw>]]><!-- note --></root>"#
        );
    }

    #[test]
    fn test_doctype_identifiers() {
        let mut doc = Document::new();
        let doctype = doc
            .create_document_type("html", "-//W3C//DTD XHTML 1.0 Strict//EN", "xhtml1.dtd")
            .unwrap();
        doc.append_child(doc.root(), doctype).unwrap();
        insta::assert_snapshot!(
            serialize(&doc),
            @r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "xhtml1.dtd">"#
        );
    }

    #[test]
    fn test_subtree_only() {
        let mut doc = Document::new();
        let root = doc.create_element("root");
        let child = doc.create_element_ns(Some("urn:x"), "x:child");
        doc.append_child(doc.root(), root).unwrap();
        doc.append_child(root, child).unwrap();
        assert_eq!(
            XmlSerializer::new().serialize_to_string(&doc, child),
            "<x:child/>"
        );
    }
}
