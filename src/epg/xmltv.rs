/*!
 * XMLTV reading and writing.
 *
 * The reader keeps only the `channel` and `programme` children of the root
 * element; everything below them is preserved as a generic tree. The writer
 * emits a `tv` document with two-space indentation.
 */

use quick_xml::escape::{escape, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::epg::model::{Channel, Programme, XmlElement, XmlNode, XmltvDocument};
use crate::errors::EpgError;

/// Parse an XMLTV payload into a document.
///
/// `source_name` is only used to label errors.
pub fn parse_document(source_name: &str, bytes: &[u8]) -> Result<XmltvDocument, EpgError> {
    let parse_error = |message: String| EpgError::SourceParse {
        source_name: source_name.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut document = XmltvDocument::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root_closed = false;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| parse_error(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => {
                if root_closed {
                    return Err(parse_error("content after the root element".to_string()));
                }
                stack.push(element_from_start(&start).map_err(parse_error)?);
            }
            Event::Empty(start) => {
                if root_closed {
                    return Err(parse_error("content after the root element".to_string()));
                }
                let element = element_from_start(&start).map_err(parse_error)?;
                root_closed |= attach(&mut stack, &mut document, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_error("unbalanced closing tag".to_string()))?;
                root_closed |= attach(&mut stack, &mut document, element);
            }
            Event::Text(text) => {
                let text = decode_entities(&String::from_utf8_lossy(&text));
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctype carry nothing we keep
            _ => {}
        }

        buf.clear();
    }

    if !stack.is_empty() {
        return Err(parse_error(format!("unexpected end of document inside <{}>", stack[stack.len() - 1].name)));
    }
    if !root_closed {
        return Err(parse_error("document has no root element".to_string()));
    }

    Ok(document)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = decode_entities(&String::from_utf8_lossy(&attribute.value));
        element.attributes.push((key, value));
    }

    Ok(element)
}

/// Resolve the XML entities plus the HTML ones guides commonly leak
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" => Some("\u{a0}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "hellip" => Some("\u{2026}"),
        "laquo" => Some("\u{ab}"),
        "raquo" => Some("\u{bb}"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "trade" => Some("\u{2122}"),
        "euro" => Some("\u{20ac}"),
        _ => None,
    }
}

/// Decode entity and character references. A reference that cannot be
/// resolved stays literal; the references around it are still decoded.
fn decode_entities(raw: &str) -> String {
    if let Ok(decoded) = unescape_with(raw, resolve_entity) {
        return decoded.into_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let end = tail[1..].find(|c: char| c == ';' || c == '&' || c.is_whitespace());

        match end {
            Some(offset) if tail[1 + offset..].starts_with(';') => {
                let reference = &tail[..offset + 2];
                match unescape_with(reference, resolve_entity) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[offset + 2..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Attach a completed element to its parent, or route it into the document
/// when it is a direct child of the root. Returns `true` when the element was
/// the root itself.
fn attach(stack: &mut [XmlElement], document: &mut XmltvDocument, element: XmlElement) -> bool {
    match stack.len() {
        0 => true,
        1 => {
            match element.name.as_str() {
                "channel" => document.channels.push(element),
                "programme" => document.programmes.push(element),
                _ => {}
            }
            false
        }
        n => {
            stack[n - 1].children.push(XmlNode::Element(element));
            false
        }
    }
}

/// Serialize merged channels and programmes as an XMLTV document
pub fn write_document(channels: &[Channel], programmes: &[Programme], generator_name: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    if generator_name.is_empty() {
        out.push_str("<tv>\n");
    } else {
        out.push_str(&format!("<tv generator-info-name=\"{}\">\n", escape(generator_name)));
    }

    for channel in channels {
        write_element(&mut out, channel.element(), 1);
    }
    for programme in programmes {
        write_element(&mut out, programme.element(), 1);
    }

    out.push_str("</tv>\n");
    out
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push_str(&format!(" {}=\"{}\"", key, escape(value.as_str())));
    }

    if element.children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    if element.is_text_only() {
        out.push('>');
        out.push_str(&escape(element.text().as_str()));
        out.push_str(&format!("</{}>\n", element.name));
        return;
    }

    out.push_str(">\n");
    for child in &element.children {
        match child {
            XmlNode::Element(nested) => write_element(out, nested, depth + 1),
            XmlNode::Text(text) => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&escape(text.as_str()));
                out.push('\n');
            }
        }
    }
    out.push_str(&indent);
    out.push_str(&format!("</{}>\n", element.name));
}
