//! Minimal namespace-aware element tree for feed documents.
//!
//! Feeds are small, so the whole document is materialized and queried the
//! way the parsers need: by namespace plus local name, in document order.
//!
//! SEC-002: quick-xml (0.37) never parses `<!ENTITY>` declarations. Only the
//! five XML builtin entities and character references resolve; anything else
//! (`&xxe;`, `&nbsp;`) is an error, so external entities cannot be expanded.
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors for bytes that are not a single well-formed XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The tokenizer rejected the input (bad syntax, mismatched end tag,
    /// undefined entity, invalid attribute).
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    /// End of input reached with elements still open.
    #[error("Unclosed element <{0}> at end of document")]
    Unclosed(String),
    /// The input contained no element at all.
    #[error("Document has no root element")]
    NoRoot,
    /// An element or text appeared after the root element closed.
    #[error("Content after the root element at byte {0}")]
    TrailingContent(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

/// An element with its resolved namespace and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Local name without any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI the element's prefix (or default namespace) resolved to.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True when both the namespace and local name match. `None` matches
    /// only elements in no namespace.
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// Attribute value by its name as written (`href`, `xml:lang`).
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated direct text and CDATA children. Text inside child
    /// elements is not included.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Direct children matching `namespace` and `name`.
    pub fn children<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(namespace, name))
    }

    /// First direct child matching `namespace` and `name`.
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(namespace, name))
    }

    /// All matching elements below this one, in document order. The element
    /// itself is never included.
    pub fn descendants(&self, namespace: Option<&str>, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(namespace, name, &mut found);
        found
    }

    fn collect_descendants<'a>(
        &'a self,
        namespace: Option<&str>,
        name: &str,
        found: &mut Vec<&'a Element>,
    ) {
        for child in self.elements() {
            if child.is(namespace, name) {
                found.push(child);
            }
            child.collect_descendants(namespace, name, found);
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parses a complete UTF-8 document.
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = NsReader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let syntax = move |source: quick_xml::Error| XmlError::Syntax { position, source };

            let (resolved, event) = reader.read_resolved_event_into(&mut buf).map_err(syntax)?;
            let namespace = namespace_uri(&resolved);

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent(position));
                    }
                    let element = open_element(&start, namespace, &reader).map_err(syntax)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent(position));
                    }
                    let element = open_element(&start, namespace, &reader).map_err(syntax)?;
                    attach(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    // check_end_names guarantees a matching open element
                    if let Some(element) = stack.pop() {
                        attach(element, &mut stack, &mut root);
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(syntax)?;
                    push_text(text.into_owned(), &mut stack, position)?;
                }
                Event::CData(cdata) => {
                    let text = reader
                        .decoder()
                        .decode(&cdata)
                        .map_err(|e| syntax(e.into()))?;
                    push_text(text.into_owned(), &mut stack, position)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, DOCTYPE
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Unclosed(open.name.clone()));
        }
        root.map(|root| Self { root }).ok_or(XmlError::NoRoot)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn open_element(
    start: &BytesStart<'_>,
    namespace: Option<String>,
    reader: &NsReader<&[u8]>,
) -> Result<Element, quick_xml::Error> {
    let decoder = reader.decoder();
    let name = decoder.decode(start.local_name().as_ref())?.into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        namespace,
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text(text: String, stack: &mut [Element], position: u64) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text));
            Ok(())
        }
        // Whitespace between the prolog, root and trailing comments is fine
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::TrailingContent(position)),
    }
}
