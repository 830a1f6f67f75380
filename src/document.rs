//! Element tree input
//!
//! The melting core only needs a rooted tree of named nodes with ordered
//! children and leaf text. `Document::parse` builds that tree from XML text;
//! callers that already hold a tree can assemble `ElementNode`s directly.

use crate::error::{MeltError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of the input tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub name: String,
    pub children: Vec<ElementNode>,
    pub text: String,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        ElementNode {
            name: name.into(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// A text-only element
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        ElementNode {
            name: name.into(),
            children: Vec::new(),
            text: text.into(),
        }
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Containers have at least one child element and become tables
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaves have no child elements and become columns of their container
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of containers in this subtree, including `self`
    pub fn count_containers(&self) -> usize {
        let mut pending = vec![self];
        let mut count = 0;
        while let Some(node) = pending.pop() {
            if node.is_container() {
                count += 1;
                pending.extend(node.children.iter());
            }
        }
        count
    }
}

// Deep trees would otherwise be dropped one stack frame per level
impl Drop for ElementNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A parsed document; `root` is `None` when the input held no element at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    root: Option<ElementNode>,
}

impl Document {
    pub fn from_root(root: ElementNode) -> Self {
        Document { root: Some(root) }
    }

    pub fn root(&self) -> Option<&ElementNode> {
        self.root.as_ref()
    }

    /// Parse XML text into an element tree
    ///
    /// Attributes, comments, processing instructions and the prolog are
    /// dropped. Text is only kept for leaves, unescaped and trimmed.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // Open elements plus the raw text collected for each
        let mut stack: Vec<(ElementNode, String)> = Vec::new();
        let mut root: Option<ElementNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    ensure_single_root(&root, &stack)?;
                    stack.push((ElementNode::new(element_name(&start)), String::new()));
                }
                Event::Empty(start) => {
                    ensure_single_root(&root, &stack)?;
                    let node = ElementNode::new(element_name(&start));
                    attach(node, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let (mut node, text) = stack.pop().ok_or_else(|| {
                        MeltError::Structure("closing tag without matching open element".into())
                    })?;
                    if node.is_leaf() {
                        node.text = text.trim().to_string();
                    }
                    attach(node, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    push_text(&mut stack, &String::from_utf8_lossy(&data))?;
                }
                Event::Eof => break,
                // Comments, declarations, PIs and DOCTYPE carry no structure
                _ => {}
            }
        }

        if let Some((open, _)) = stack.last() {
            return Err(MeltError::Structure(format!(
                "element <{}> is not closed before end of input",
                open.name
            )));
        }

        Ok(Document { root })
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn ensure_single_root(root: &Option<ElementNode>, stack: &[(ElementNode, String)]) -> Result<()> {
    match root {
        Some(existing) if stack.is_empty() => Err(MeltError::Structure(format!(
            "document has more than one top-level element (first was <{}>)",
            existing.name
        ))),
        _ => Ok(()),
    }
}

fn attach(node: ElementNode, stack: &mut [(ElementNode, String)], root: &mut Option<ElementNode>) {
    match stack.last_mut() {
        Some((parent, _)) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn push_text(stack: &mut [(ElementNode, String)], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some((_, buffer)) => {
            buffer.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(MeltError::Structure(
            "text content outside of the root element".into(),
        )),
    }
}
