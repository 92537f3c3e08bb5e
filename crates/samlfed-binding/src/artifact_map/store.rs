//! Store-backed mappings and the envelope wrapper.
//!
//! A persisted mapping is a single `Mapping` element whose optional
//! `relyingParty` attribute records who may resolve it, wrapped around the
//! payload's own XML. The wrapper travels with the payload so the
//! authorization check works from the stored text alone, with no side
//! table.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use samlfed_cache::TextStore;

use crate::error::{BindingError, BindingResult};
use crate::payload::MapPayload;

const ENVELOPE_ELEMENT: &str = "Mapping";
const RELYING_PARTY_ATTR: &str = "relyingParty";

struct Envelope {
    relying_party: Option<String>,
    payload_xml: String,
}

pub(super) fn store<P: MapPayload>(
    store: &dyn TextStore,
    context: &str,
    key: &str,
    payload: &P,
    relying_party: Option<&str>,
    expires_at: DateTime<Utc>,
) -> BindingResult<()> {
    let inner = payload.to_xml()?;
    let envelope = build_envelope(&inner, relying_party);
    if store.create_text(context, key, &envelope, expires_at)? {
        Ok(())
    } else {
        Err(BindingError::DuplicateArtifact)
    }
}

pub(super) fn retrieve<P: MapPayload>(
    store: &dyn TextStore,
    context: &str,
    key: &str,
    requesting_party: Option<&str>,
) -> BindingResult<P> {
    let Some(text) = store.read_text(context, key)? else {
        return Err(BindingError::NotFound);
    };

    // Delete before parsing. Whoever deletes the record owns the message,
    // and a parse failure afterwards cannot leave a resolvable duplicate.
    if !store.delete_text(context, key)? {
        // Another resolver consumed it between our read and delete.
        return Err(BindingError::NotFound);
    }

    let envelope = parse_envelope(&text)?;
    if let Some(bound) = &envelope.relying_party {
        if requesting_party != Some(bound.as_str()) {
            tracing::warn!(
                "artifact mapping bound to '{bound}' requested by '{}', mapping destroyed",
                requesting_party.unwrap_or("<anonymous>")
            );
            return Err(BindingError::Unauthorized {
                requester: requesting_party.map(str::to_string),
            });
        }
    }
    P::from_xml(&envelope.payload_xml)
}

pub(super) fn relying_party(
    store: &dyn TextStore,
    context: &str,
    key: &str,
) -> BindingResult<Option<String>> {
    let Some(text) = store.read_text(context, key)? else {
        return Err(BindingError::NotFound);
    };
    Ok(parse_envelope(&text)?.relying_party)
}

fn build_envelope(inner: &str, relying_party: Option<&str>) -> String {
    match relying_party {
        Some(party) => format!(
            "<{ENVELOPE_ELEMENT} {RELYING_PARTY_ATTR}=\"{}\">{inner}</{ENVELOPE_ELEMENT}>",
            quick_xml::escape::escape(party)
        ),
        None => format!("<{ENVELOPE_ELEMENT}>{inner}</{ENVELOPE_ELEMENT}>"),
    }
}

fn parse_envelope(text: &str) -> BindingResult<Envelope> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                check_envelope_name(&element)?;
                let relying_party = relying_party_attr(&element)?;
                let span = reader
                    .read_to_end(element.name())
                    .map_err(|e| BindingError::Envelope(e.to_string()))?;
                // Span positions are u64 for large-document readers; this
                // text is an in-memory string.
                let payload_xml = text[span.start as usize..span.end as usize].trim().to_string();
                if payload_xml.is_empty() {
                    return Err(BindingError::Envelope("mapping has no payload".to_string()));
                }
                return Ok(Envelope {
                    relying_party,
                    payload_xml,
                });
            }
            Ok(Event::Empty(element)) => {
                check_envelope_name(&element)?;
                return Err(BindingError::Envelope("mapping has no payload".to_string()));
            }
            Ok(Event::Eof) => {
                return Err(BindingError::Envelope("missing mapping element".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(BindingError::Envelope(e.to_string())),
        }
    }
}

fn check_envelope_name(element: &BytesStart<'_>) -> BindingResult<()> {
    if element.name().as_ref() == ENVELOPE_ELEMENT.as_bytes() {
        Ok(())
    } else {
        Err(BindingError::Envelope(format!(
            "unexpected root element '{}'",
            String::from_utf8_lossy(element.name().as_ref())
        )))
    }
}

fn relying_party_attr(element: &BytesStart<'_>) -> BindingResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| BindingError::Envelope(e.to_string()))?;
        if attr.key.as_ref() == RELYING_PARTY_ATTR.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| BindingError::Envelope(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
