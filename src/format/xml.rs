//! XML handling: pretty-printing raw documents and reading query-protocol
//! responses into a JSON mapping.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::DecodeError;

/// Re-indent an XML document with two spaces per level.
pub fn pretty_xml(text: &str) -> Result<String, DecodeError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut depth = 0usize;
    let mut saw_root = false;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| DecodeError::Xml(e.to_string()))?;
        match &event {
            Event::Eof => break,
            Event::Start(_) => {
                depth += 1;
                saw_root = true;
            }
            Event::Empty(_) => saw_root = true,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(DecodeError::Xml("text outside of the root element".into()));
            }
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| DecodeError::Xml(e.to_string()))?;
    }
    if !saw_root {
        return Err(DecodeError::Xml("document has no root element".into()));
    }
    if depth != 0 {
        return Err(DecodeError::Xml("unexpected end of document".into()));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| DecodeError::Utf8(e.to_string()))
}

/// Minimal element tree; attributes are not needed by any response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First descendant (depth-first, self included) with the given local name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Convert into JSON following the query-protocol conventions:
    /// text-only elements become strings, `member` lists become sequences,
    /// repeated child names collapse into sequences.
    pub fn to_value(&self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text.clone());
        }
        if self.children.iter().all(|c| c.name == "member") {
            return Value::Array(self.children.iter().map(Element::to_value).collect());
        }
        let mut map = Map::new();
        let mut collapsed: HashSet<&str> = HashSet::new();
        for child in &self.children {
            let value = child.to_value();
            match map.get_mut(&child.name) {
                Some(Value::Array(items)) if collapsed.contains(child.name.as_str()) => {
                    items.push(value)
                }
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                    collapsed.insert(&child.name);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        Value::Object(map)
    }
}

/// Parse a document into an element tree rooted at its document element.
pub fn parse_document(text: &str) -> Result<Element, DecodeError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| DecodeError::Xml(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ..Default::default()
            }),
            Event::Empty(e) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..Default::default()
                };
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Xml("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                match stack.last_mut() {
                    Some(top) => top.text.push_str(&text),
                    None => {
                        return Err(DecodeError::Xml("text outside of the root element".into()))
                    }
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(DecodeError::Xml("unexpected end of document".into()));
    }
    root.ok_or_else(|| DecodeError::Xml("document has no root element".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(DecodeError::Xml("multiple root elements".into())),
    }
}
