use crate::error::{Error, Result};
use crate::hmc::types::{ManagedSystem, Partition};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// One Atom `<entry>` of an HMC feed, flattened to the direct children of
/// the UOM object inside `<content>`.
#[derive(Debug, Default)]
struct FeedEntry {
    id: Option<String>,
    fields: HashMap<String, String>,
    links: HashMap<String, String>,
}

impl FeedEntry {
    fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// Extract the session token from a `LogonResponse` document.
pub fn parse_logon_response(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut token = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if local_name(&e) == "X-API-Session" => inside = true,
            Event::End(e) if e.local_name().as_ref() == b"X-API-Session" => break,
            Event::Text(t) if inside => token.push_str(&t.unescape()?),
            Event::CData(t) if inside => token.push_str(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Logon("response carried no X-API-Session".to_string()));
    }
    Ok(token.to_string())
}

pub fn parse_managed_systems(xml: &str) -> Result<Vec<ManagedSystem>> {
    let systems = parse_feed(xml, "ManagedSystem")?
        .into_iter()
        .filter_map(|entry| {
            let name = entry.field("SystemName")?;
            let uuid = entry.id.clone()?;
            Some(ManagedSystem { uuid, name })
        })
        .collect();
    Ok(systems)
}

pub fn parse_logical_partitions(xml: &str) -> Result<Vec<Partition>> {
    let mut partitions: Vec<Partition> = parse_feed(xml, "LogicalPartition")?
        .into_iter()
        .filter_map(|entry| {
            Some(Partition {
                name: entry.field("PartitionName")?,
                id: entry.field("PartitionID"),
                uuid: entry.field("PartitionUUID").or_else(|| entry.id.clone()),
                state: entry.field("PartitionState"),
                partition_type: entry.field("PartitionType"),
                os_version: entry.field("OperatingSystemVersion"),
                ip_address: entry.field("ResourceMonitoringIPAddress"),
                managed_system_uuid: entry
                    .links
                    .get("AssociatedManagedSystem")
                    .and_then(|href| uuid_from_href(href)),
            })
        })
        .collect();

    partitions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(partitions)
}

fn uuid_from_href(href: &str) -> Option<String> {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Walk an Atom feed and collect every entry whose `<content>` holds an
/// element with local name `object`. Namespace prefixes are ignored.
fn parse_feed(xml: &str, object: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                if stack.len() == 1 && name == "entry" {
                    current = Some(FeedEntry::default());
                }
                if let Some(entry) = current.as_mut() {
                    if is_object_child(&stack, object) {
                        record_link(entry, &name, &e)?;
                    }
                }
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    if is_object_child(&stack, object) {
                        record_link(entry, &local_name(&e), &e)?;
                    }
                }
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::End(_) => {
                let name = stack
                    .pop()
                    .ok_or_else(|| Error::Malformed("unexpected closing tag".to_string()))?;
                let value = text.trim();

                if let Some(entry) = current.as_mut() {
                    if stack.len() == 2 && stack[1] == "entry" && name == "id" {
                        entry.id = Some(value.to_string());
                    } else if is_object_child(&stack, object) && !value.is_empty() {
                        entry.fields.insert(name.clone(), value.to_string());
                    }
                }

                if stack.len() == 1 && name == "entry" {
                    entries.extend(current.take());
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Malformed(format!("unclosed element <{}>", stack.join("/"))));
    }
    Ok(entries)
}

// feed/entry/content/<object>/<field>
fn is_object_child(stack: &[String], object: &str) -> bool {
    stack.len() == 4 && stack[1] == "entry" && stack[2] == "content" && stack[3] == object
}

fn record_link(entry: &mut FeedEntry, name: &str, e: &BytesStart) -> Result<()> {
    if let Some(attr) = e.try_get_attribute("href").map_err(quick_xml::Error::from)? {
        entry.links.insert(name.to_string(), attr.unescape_value()?.into_owned());
    }
    Ok(())
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}
