//! Schema ingestion
//!
//! Scans XSD markup with quick-xml and feeds the start/end/character events
//! to a [`SchemaHandler`], which builds the node tree and the global
//! registries of a [`Session`].

mod frames;
pub mod handler;

pub use handler::{SchemaHandler, TagAttrs, ANY_NODE_NAME};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::Session;

/// Ingest one schema document into an empty session
pub fn ingest_str(session: &mut Session, xml: &str) -> Result<()> {
    ingest_bytes(session, xml.as_bytes())
}

/// Ingest one schema document given as bytes
pub fn ingest_bytes(session: &mut Session, xml: &[u8]) -> Result<()> {
    session.limits.check_schema_size(xml.len())?;

    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut handler = SchemaHandler::new(session);
    let mut buf = Vec::new();
    let mut events = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (name, attrs) = tag_parts(&e)?;
                handler
                    .start_element(&name, &attrs)
                    .map_err(|err| located(err, reader.buffer_position()))?;
            }
            Ok(Event::Empty(e)) => {
                let (name, attrs) = tag_parts(&e)?;
                handler
                    .start_element(&name, &attrs)
                    .and_then(|_| handler.end_element())
                    .map_err(|err| located(err, reader.buffer_position()))?;
            }
            Ok(Event::End(_)) => handler
                .end_element()
                .map_err(|err| located(err, reader.buffer_position()))?,
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                handler.characters(&text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                handler.characters(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "Error parsing XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        events += 1;
        buf.clear();
    }
    handler.finish()?;

    debug!(events, "schema document scanned");
    info!(
        nodes = session.tree.len(),
        simple_types = session.simple_types.len(),
        attribute_groups = session.attribute_groups.len(),
        "schema ingested"
    );
    Ok(())
}

/// Attach the reader position to a structural error
fn located(err: Error, position: usize) -> Error {
    match err {
        Error::Parse(parse) if parse.location.is_none() => {
            Error::Parse(parse.with_location(format!("byte {}", position)))
        }
        other => other,
    }
}

fn tag_parts(start: &BytesStart) -> Result<(String, TagAttrs)> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
        .to_string();

    let mut attrs = TagAttrs::new();
    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
            .into_owned();
        attrs.push(key, value);
    }
    Ok((name, attrs))
}
