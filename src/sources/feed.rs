use std::collections::HashMap;

use anyhow::{anyhow, Result};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;

/// One `<item>` (RSS) or `<entry>` (Atom), flattened to a map from the
/// lowercased local element name to its text. Namespace prefixes are dropped,
/// so `ev:localstartdate` lands under `localstartdate`.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    fields: HashMap<String, String>,
}

impl FeedItem {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn link(&self) -> Option<&str> {
        self.field("link")
    }

    pub fn summary(&self) -> Option<&str> {
        self.field("description").or_else(|| self.field("summary"))
    }

    fn insert(&mut self, name: &str, value: String) {
        if value.is_empty() {
            return;
        }
        self.fields.entry(name.to_string()).or_insert(value);
    }
}

/// Stream the feed body and collect its items. Tolerates trailing garbage:
/// items parsed before a hard XML error are still returned, and only a body
/// that yields nothing at all is an error.
pub fn parse_items(body: &str) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut items: Vec<FeedItem> = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<String> = None;
    let mut parse_error = None;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(tag)) => {
                let name = lower_name(tag.local_name().as_ref());
                if is_item_tag(&name) {
                    current = Some(FeedItem::default());
                    field = None;
                } else if let Some(item) = current.as_mut() {
                    if name == "link" {
                        if let Some(href) = attr(&tag, b"href") {
                            item.insert("link", href);
                        }
                    }
                    field = Some(name);
                }
            }
            Ok(XmlEvent::Empty(tag)) => {
                let name = lower_name(tag.local_name().as_ref());
                if name == "link" {
                    if let (Some(item), Some(href)) = (current.as_mut(), attr(&tag, b"href")) {
                        item.insert("link", href);
                    }
                }
            }
            Ok(XmlEvent::Text(text)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let value = text
                        .unescape()
                        .map(|cow| cow.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    item.insert(name, value.trim().to_string());
                }
            }
            Ok(XmlEvent::CData(text)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let value = String::from_utf8_lossy(&text.into_inner()).into_owned();
                    item.insert(name, value.trim().to_string());
                }
            }
            Ok(XmlEvent::End(tag)) => {
                let name = lower_name(tag.local_name().as_ref());
                if is_item_tag(&name) {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                } else {
                    field = None;
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                parse_error = Some(err);
                break;
            }
        }
    }

    if items.is_empty() {
        if let Some(err) = parse_error {
            return Err(anyhow!("feed is not parseable XML: {err}"));
        }
    }
    Ok(items)
}

fn lower_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_lowercase()
}

fn is_item_tag(name: &str) -> bool {
    name == "item" || name == "entry"
}

fn attr(tag: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}
