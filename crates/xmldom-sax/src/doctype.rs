//! Document type declaration parsing.
//!
//! quick-xml hands over the raw text between `<!DOCTYPE` and the closing
//! `>`. This module pulls out the name, the external identifiers and the
//! element and entity declarations of the internal subset. Parameter
//! entities, attribute lists and notations are skipped.

/// A parsed `<!DOCTYPE ...>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocTypeDecl {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    /// Declarations from the internal subset, in source order.
    pub declarations: Vec<MarkupDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupDecl {
    Element {
        name: String,
        model: String,
    },
    InternalEntity {
        name: String,
        value: String,
    },
    ExternalEntity {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
}

/// Parse the content of a DOCTYPE declaration.
///
/// # Errors
///
/// Returns a message when the declaration has no name or an external
/// identifier is missing its literal.
pub fn parse_doctype(content: &str) -> Result<DocTypeDecl, String> {
    let mut cursor = Cursor::new(content);

    cursor.skip_ws();
    let name = cursor.name();
    if name.is_empty() {
        return Err("missing name in document type declaration".to_string());
    }

    cursor.skip_ws();
    let (public_id, system_id) = external_id(&mut cursor)?;

    cursor.skip_ws();
    let mut declarations = Vec::new();
    if cursor.eat("[") {
        let subset = match cursor.rest.rfind(']') {
            Some(end) => &cursor.rest[..end],
            None => cursor.rest,
        };
        declarations = internal_subset(subset)?;
    }

    Ok(DocTypeDecl {
        name: name.to_string(),
        public_id,
        system_id,
        declarations,
    })
}

type ExternalId = (Option<String>, Option<String>);

fn external_id(cursor: &mut Cursor<'_>) -> Result<ExternalId, String> {
    if cursor.eat("PUBLIC") {
        cursor.skip_ws();
        let public_id = cursor
            .quoted()
            .ok_or_else(|| "missing public identifier after PUBLIC".to_string())?;
        cursor.skip_ws();
        let system_id = cursor.quoted();
        Ok((
            Some(public_id.to_string()),
            system_id.map(str::to_string),
        ))
    } else if cursor.eat("SYSTEM") {
        cursor.skip_ws();
        let system_id = cursor
            .quoted()
            .ok_or_else(|| "missing system identifier after SYSTEM".to_string())?;
        Ok((None, Some(system_id.to_string())))
    } else {
        Ok((None, None))
    }
}

fn internal_subset(subset: &str) -> Result<Vec<MarkupDecl>, String> {
    let mut declarations = Vec::new();
    let mut cursor = Cursor::new(subset);

    loop {
        cursor.skip_to("<");
        if cursor.rest.is_empty() {
            break;
        }

        if cursor.eat("<!--") {
            cursor.skip_past("-->");
        } else if cursor.eat("<!ENTITY") {
            cursor.skip_ws();
            if cursor.eat("%") {
                cursor.skip_declaration();
                continue;
            }
            let name = cursor.name().to_string();
            cursor.skip_ws();
            if let Some(value) = cursor.quoted() {
                declarations.push(MarkupDecl::InternalEntity {
                    name,
                    value: value.to_string(),
                });
            } else {
                let (public_id, system_id) = external_id(&mut cursor)?;
                declarations.push(MarkupDecl::ExternalEntity {
                    name,
                    public_id,
                    system_id,
                });
            }
            cursor.skip_declaration();
        } else if cursor.eat("<!ELEMENT") {
            cursor.skip_ws();
            let name = cursor.name().to_string();
            let end = cursor.rest.find('>').unwrap_or(cursor.rest.len());
            let model = cursor.rest[..end].trim().to_string();
            declarations.push(MarkupDecl::Element { name, model });
            cursor.skip_declaration();
        } else {
            cursor.eat("<");
            cursor.skip_declaration();
        }
    }

    Ok(declarations)
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn name(&mut self) -> &'a str {
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || matches!(c, '[' | '>' | '"' | '\''))
            .unwrap_or(self.rest.len());
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        name
    }

    fn quoted(&mut self) -> Option<&'a str> {
        let quote = self.rest.chars().next().filter(|c| matches!(c, '"' | '\''))?;
        let body = &self.rest[1..];
        let end = body.find(quote)?;
        self.rest = &body[end + 1..];
        Some(&body[..end])
    }

    fn skip_to(&mut self, token: &str) {
        let start = self.rest.find(token).unwrap_or(self.rest.len());
        self.rest = &self.rest[start..];
    }

    fn skip_past(&mut self, token: &str) {
        self.rest = match self.rest.find(token) {
            Some(start) => &self.rest[start + token.len()..],
            None => "",
        };
    }

    /// Skip to just after the `>` closing the current declaration, ignoring
    /// any `>` inside quoted literals.
    fn skip_declaration(&mut self) {
        let mut quote = None;
        for (idx, c) in self.rest.char_indices() {
            match (quote, c) {
                (None, '"' | '\'') => quote = Some(c),
                (Some(open), _) if open == c => quote = None,
                (None, '>') => {
                    self.rest = &self.rest[idx + 1..];
                    return;
                }
                _ => {}
            }
        }
        self.rest = "";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_only() {
        let decl = parse_doctype(" html").unwrap();
        assert_eq!(decl.name, "html");
        assert_eq!(decl.public_id, None);
        assert_eq!(decl.system_id, None);
    }

    #[test]
    fn test_public_identifier() {
        let decl = parse_doctype(
            r#"html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd""#,
        )
        .unwrap();
        assert_eq!(
            decl.public_id.as_deref(),
            Some("-//W3C//DTD XHTML 1.0 Strict//EN")
        );
        assert_eq!(
            decl.system_id.as_deref(),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")
        );
    }

    #[test]
    fn test_internal_subset() {
        let decl = parse_doctype(
            r#"note SYSTEM "note.dtd" [
  <!-- entities -->
  <!ELEMENT note (#PCDATA)>
  <!ENTITY writer "Donald > Duck">
  <!ENTITY logo SYSTEM "logo.gif">
  <!ENTITY % param "ignored">
  <!ATTLIST note id CDATA #IMPLIED>
]"#,
        )
        .unwrap();

        assert_eq!(decl.system_id.as_deref(), Some("note.dtd"));
        assert_eq!(
            decl.declarations,
            vec![
                MarkupDecl::Element {
                    name: "note".to_string(),
                    model: "(#PCDATA)".to_string(),
                },
                MarkupDecl::InternalEntity {
                    name: "writer".to_string(),
                    value: "Donald > Duck".to_string(),
                },
                MarkupDecl::ExternalEntity {
                    name: "logo".to_string(),
                    public_id: None,
                    system_id: Some("logo.gif".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_missing_name() {
        assert!(parse_doctype("  ").is_err());
    }
}
