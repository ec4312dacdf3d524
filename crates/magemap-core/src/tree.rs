//! Attribute tree built from configuration markup.
//!
//! Extractors never look at raw XML. They see an owned tree of
//! [`Element`]s where attributes are addressed by name, text content is a
//! plain string, and repeated children are always read as a sequence.

use crate::error::{ParseError, Result};
use std::fs;
use std::path::Path;

/// Namespace of `xsi:type`, whatever prefix a document binds it to.
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// One element of a parsed configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local tag name (`config`, `type`, `plugin`, ...).
    pub name: String,

    /// Attributes in document order. Namespaced attributes are keyed as
    /// `prefix:local` using the document's prefix, except that the schema
    /// instance namespace is always keyed as `xsi`.
    pub attributes: Vec<(String, String)>,

    /// Child elements in document order.
    pub children: Vec<Element>,

    /// Trimmed text content, `None` when the element has no text.
    pub text: Option<String>,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: adds an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Looks up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, or the empty string when absent.
    pub fn attr_or_empty(&self, name: &str) -> String {
        self.attr(name).unwrap_or_default().to_string()
    }

    /// True when the attribute is present and literally `"true"`.
    pub fn flag(&self, name: &str) -> bool {
        self.attr(name) == Some("true")
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All children with the given tag name, in document order.
    ///
    /// A child that appears once and a child that appears many times are
    /// read the same way. Every extractor goes through this.
    pub fn one_or_many<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        self.children.iter().filter(|c| c.name == name).collect()
    }

    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parses markup into an attribute tree rooted at the document element.
///
/// `path` is only used for error reporting.
pub fn parse_document(source: &str, path: &Path) -> Result<Element> {
    let doc = roxmltree::Document::parse(source)
        .map_err(|e| ParseError::malformed(path, e.to_string()))?;
    Ok(convert(doc.root_element()))
}

/// Reads and parses a configuration file.
pub fn load_document(path: &Path) -> Result<Element> {
    let source = fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
    parse_document(&source, path)
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let attributes = node
        .attributes()
        .map(|attr| {
            let prefix = match attr.namespace() {
                Some(XSI_NAMESPACE) => Some("xsi"),
                Some(ns) => node.lookup_prefix(ns),
                None => None,
            };
            let key = match prefix {
                Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, attr.name()),
                _ => attr.name().to_string(),
            };
            (key, attr.value().to_string())
        })
        .collect();

    let mut text = String::new();
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert(child));
        } else if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        }
    }

    let text = text.trim();
    Element {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
        text: (!text.is_empty()).then(|| text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <type name="Foo">
        <arguments>
            <argument name="bar" xsi:type="object">Bar\Baz</argument>
        </arguments>
    </type>
    <preference for="A" type="B"/>
    <preference for="C" type="D"/>
</config>"#;

    #[test]
    fn test_parse_reads_namespaced_attributes() {
        let root = parse_document(SAMPLE, Path::new("di.xml")).unwrap();
        assert_eq!(root.name, "config");

        let arg = root
            .child("type")
            .and_then(|t| t.child("arguments"))
            .and_then(|a| a.child("argument"))
            .unwrap();
        assert_eq!(arg.attr("name"), Some("bar"));
        assert_eq!(arg.attr("xsi:type"), Some("object"));
        assert_eq!(arg.text(), Some("Bar\\Baz"));
    }

    #[test]
    fn test_schema_instance_prefix_is_normalized() {
        let xml = r#"<config xmlns:x="http://www.w3.org/2001/XMLSchema-instance" xmlns:v="urn:vendor">
    <argument name="bar" x:type="object" v:flag="1">Bar\Baz</argument>
</config>"#;
        let root = parse_document(xml, Path::new("di.xml")).unwrap();
        let arg = root.child("argument").unwrap();

        assert_eq!(arg.attr("xsi:type"), Some("object"));
        assert_eq!(arg.attr("x:type"), None);
        assert_eq!(arg.attr("v:flag"), Some("1"));
    }

    #[test]
    fn test_one_or_many_normalizes_cardinality() {
        let root = parse_document(SAMPLE, Path::new("di.xml")).unwrap();

        let single = root.one_or_many("type");
        assert_eq!(single.len(), 1);

        let repeated = root.one_or_many("preference");
        assert_eq!(repeated.len(), 2);
        assert_eq!(repeated[0].attr("for"), Some("A"));
        assert_eq!(repeated[1].attr("for"), Some("C"));

        assert!(root.one_or_many("virtualType").is_empty());
    }

    #[test]
    fn test_blank_text_is_none() {
        let root = parse_document(SAMPLE, Path::new("di.xml")).unwrap();
        assert_eq!(root.text(), None);
    }

    #[test]
    fn test_malformed_document_reports_path() {
        let err = parse_document("<config><type></config>", Path::new("etc/di.xml")).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
        assert!(err.to_string().contains("etc/di.xml"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_document(Path::new("/nonexistent/etc/di.xml")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
