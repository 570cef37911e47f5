/*!
 * Data model for XMLTV documents.
 *
 * Sources are kept as generic element trees so that children the merge does
 * not interpret (icons, categories, credits, ratings) pass through to the
 * output untouched. `Channel` and `Programme` wrap an accepted element and
 * expose the fields the merge works with.
 */

/// A node inside an XML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Character data, already unescaped
    Text(String),
}

/// A generic XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&key.into(), value);
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Append a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// First child element with the given name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text content of this element (direct text children only)
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace the text content, keeping child elements
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| matches!(node, XmlNode::Element(_)));
        self.children.insert(0, XmlNode::Text(text.into()));
    }

    /// Whether every child is a text node
    pub fn is_text_only(&self) -> bool {
        self.children.iter().all(|node| matches!(node, XmlNode::Text(_)))
    }
}

/// A parsed source document: the `channel` and `programme` children of its root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmltvDocument {
    /// `channel` elements in document order
    pub channels: Vec<XmlElement>,
    /// `programme` elements in document order
    pub programmes: Vec<XmlElement>,
}

impl XmltvDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel.into_element());
        self
    }

    /// Append a programme
    pub fn with_programme(mut self, programme: Programme) -> Self {
        self.programmes.push(programme.into_element());
        self
    }

    /// Whether the document holds neither channels nor programmes
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.programmes.is_empty()
    }
}

/// An accepted channel
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    id: String,
    element: XmlElement,
}

impl Channel {
    /// Build a channel with a single display name
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let id = id.into();
        let element = XmlElement::new("channel")
            .with_attribute("id", id.clone())
            .with_child(XmlElement::new("display-name").with_text(display_name));
        Self { id, element }
    }

    /// Wrap a source element under its resolved id; the `id` attribute is rewritten
    pub fn from_element(id: impl Into<String>, mut element: XmlElement) -> Self {
        let id = id.into();
        element.set_attribute("id", id.clone());
        Self { id, element }
    }

    /// Channel identity
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Text of the first `display-name`
    pub fn display_name(&self) -> Option<String> {
        self.element.child("display-name").map(|e| e.text())
    }

    /// Replace the text of the first `display-name`
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        if let Some(display_name) = self.element.child_mut("display-name") {
            display_name.set_text(name);
        }
    }

    /// Underlying element
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Consume into the underlying element
    pub fn into_element(self) -> XmlElement {
        self.element
    }
}

/// An accepted programme
#[derive(Debug, Clone, PartialEq)]
pub struct Programme {
    channel_id: String,
    element: XmlElement,
}

impl Programme {
    /// Build a programme with a title
    pub fn new(
        channel_id: impl Into<String>,
        start: impl Into<String>,
        stop: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let channel_id = channel_id.into();
        let element = XmlElement::new("programme")
            .with_attribute("start", start)
            .with_attribute("stop", stop)
            .with_attribute("channel", channel_id.clone())
            .with_child(XmlElement::new("title").with_text(title));
        Self { channel_id, element }
    }

    /// Add a description
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.element.children.push(XmlNode::Element(XmlElement::new("desc").with_text(desc)));
        self
    }

    /// Wrap a source element under its resolved channel id; the `channel` attribute is rewritten
    pub fn from_element(channel_id: impl Into<String>, mut element: XmlElement) -> Self {
        let channel_id = channel_id.into();
        element.set_attribute("channel", channel_id.clone());
        Self { channel_id, element }
    }

    /// Channel this programme belongs to
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// `start` attribute as it will be written
    pub fn start(&self) -> &str {
        self.element.attribute("start").unwrap_or_default()
    }

    /// `stop` attribute as it will be written
    pub fn stop(&self) -> Option<&str> {
        self.element.attribute("stop")
    }

    /// Dedup key `(channel_id, start)`
    pub fn key(&self) -> (String, String) {
        (self.channel_id.clone(), self.start().to_string())
    }

    /// Text of the first `title`
    pub fn title(&self) -> Option<String> {
        self.element.child("title").map(|e| e.text())
    }

    /// Text of the first `desc`
    pub fn desc(&self) -> Option<String> {
        self.element.child("desc").map(|e| e.text())
    }

    pub(crate) fn set_start(&mut self, start: impl Into<String>) {
        self.element.set_attribute("start", start);
    }

    pub(crate) fn set_stop(&mut self, stop: impl Into<String>) {
        self.element.set_attribute("stop", stop);
    }

    pub(crate) fn set_child_text(&mut self, name: &str, text: impl Into<String>) {
        if let Some(child) = self.element.child_mut(name) {
            child.set_text(text);
        }
    }

    /// Underlying element
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Consume into the underlying element
    pub fn into_element(self) -> XmlElement {
        self.element
    }
}
