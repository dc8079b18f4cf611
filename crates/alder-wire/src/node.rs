//! The labelled attribute tree exchanged over the channel.
//!
//! A [`Node`] is the primary unit the protocol speaks: a description
//! string, an ordered attribute map, and optional typed content (raw
//! bytes, text, a number, or child nodes). Nodes are immutable once
//! built; a changed node is rebuilt, not mutated.

use std::fmt;

/// Typed content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// Raw byte payload
    Bytes(Vec<u8>),
    /// UTF-8 text payload
    Text(String),
    /// Numeric payload, varint-encoded on the wire
    Number(u32),
    /// Child nodes
    Children(Vec<Node>),
}

/// Attribute map preserving insertion order.
///
/// Order matters only for serialization stability; equality compares
/// the entries as a map, ignoring order. Keys are unique: inserting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs, keeping first-insertion order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut attributes = Self::new();
        for (key, value) in pairs {
            attributes.insert(key.into(), value.into());
        }
        attributes
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value.as_str()))
    }
}

impl Eq for Attributes {}

/// A single node of the protocol tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    description: String,
    attributes: Attributes,
    content: Option<NodeContent>,
}

impl Node {
    /// Create a node with only a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: Attributes::new(),
            content: None,
        }
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Replace the whole attribute map.
    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the content.
    #[must_use]
    pub fn content(mut self, content: NodeContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Set raw byte content.
    #[must_use]
    pub fn bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.content(NodeContent::Bytes(bytes.into()))
    }

    /// Set text content.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.content(NodeContent::Text(text.into()))
    }

    /// Set numeric content.
    #[must_use]
    pub fn number(self, number: u32) -> Self {
        self.content(NodeContent::Number(number))
    }

    /// Set child nodes as content.
    #[must_use]
    pub fn children(self, children: Vec<Node>) -> Self {
        self.content(NodeContent::Children(children))
    }

    /// The description string.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the description matches.
    #[must_use]
    pub fn has_description(&self, description: &str) -> bool {
        self.description == description
    }

    /// The attribute map.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attributes
    }

    /// The `id` attribute, when present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }

    /// The content, when present.
    #[must_use]
    pub fn get_content(&self) -> Option<&NodeContent> {
        self.content.as_ref()
    }

    /// Whether any content is present.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Byte content, when the content is bytes.
    #[must_use]
    pub fn content_as_bytes(&self) -> Option<&[u8]> {
        match &self.content {
            Some(NodeContent::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Text content, when the content is text.
    #[must_use]
    pub fn content_as_text(&self) -> Option<&str> {
        match &self.content {
            Some(NodeContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Numeric content, when the content is a number.
    #[must_use]
    pub fn content_as_number(&self) -> Option<u32> {
        match &self.content {
            Some(NodeContent::Number(number)) => Some(*number),
            _ => None,
        }
    }

    /// Child nodes; empty when the content is not a child list.
    #[must_use]
    pub fn node_children(&self) -> &[Node] {
        match &self.content {
            Some(NodeContent::Children(children)) => children,
            _ => &[],
        }
    }

    /// Whether a child with the given description exists.
    #[must_use]
    pub fn has_node(&self, description: &str) -> bool {
        self.find_node(description).is_some()
    }

    /// First child with the given description.
    #[must_use]
    pub fn find_node(&self, description: &str) -> Option<&Node> {
        self.node_children()
            .iter()
            .find(|child| child.description == description)
    }

    /// All children with the given description.
    #[must_use]
    pub fn find_nodes(&self, description: &str) -> Vec<&Node> {
        self.node_children()
            .iter()
            .filter(|child| child.description == description)
            .collect()
    }

    /// Item count of the serialized list form:
    /// one for the description, two per attribute, one for content.
    ///
    /// Pure function of tree shape, used to predict the encoded length
    /// class before serializing.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + 2 * self.attributes.len() + usize::from(self.content.is_some())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node[description={}", self.description)?;
        if !self.attributes.is_empty() {
            write!(f, ", attributes={{")?;
            for (index, (key, value)) in self.attributes.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "}}")?;
        }
        match &self.content {
            Some(NodeContent::Bytes(bytes)) => write!(f, ", content={} bytes", bytes.len())?,
            Some(NodeContent::Text(text)) => write!(f, ", content={text}")?,
            Some(NodeContent::Number(number)) => write!(f, ", content={number}")?,
            Some(NodeContent::Children(children)) => {
                write!(f, ", content=[")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, "]")?;
            }
            None => {}
        }
        write!(f, "]")
    }
}
