//! Artifact map payloads.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{BindingError, BindingResult};

/// A protocol message that can be parked in an artifact map.
///
/// When the map is backed by external storage it persists payloads as XML
/// text, so a payload must marshal itself to a standalone element and parse
/// back from one. The parent check exists because serializing a node that
/// still sits inside another document would capture half a tree; the map
/// only accepts owned, detached messages.
///
/// Payloads must be `Send`: artifact maps are shared across the threads
/// serving resolution requests.
pub trait MapPayload: Send + Sized {
    /// Returns `true` if this payload is still attached to an enclosing
    /// document.
    fn has_parent(&self) -> bool;

    /// Marshals the payload to a standalone XML element.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Marshal`] if the payload cannot be
    /// serialized.
    fn to_xml(&self) -> BindingResult<String>;

    /// Rebuilds a payload from the XML produced by [`MapPayload::to_xml`].
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Parse`] if the text is not a valid payload.
    fn from_xml(xml: &str) -> BindingResult<Self>;
}

/// A payload that is already serialized XML.
///
/// Adapter for callers that keep protocol messages as text rather than a
/// parsed object model. Construction checks that the text is one
/// well-formed element, which is all the artifact map requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawXmlPayload {
    xml: String,
}

impl RawXmlPayload {
    /// Wraps a serialized message.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Parse`] if the text is not exactly one
    /// well-formed XML element.
    pub fn new(xml: impl Into<String>) -> BindingResult<Self> {
        let xml = xml.into();
        ensure_single_root(&xml).map_err(BindingError::Parse)?;
        Ok(Self { xml })
    }

    /// Returns the serialized message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }
}

impl MapPayload for RawXmlPayload {
    fn has_parent(&self) -> bool {
        // The payload owns its text outright.
        false
    }

    fn to_xml(&self) -> BindingResult<String> {
        Ok(self.xml.clone())
    }

    fn from_xml(xml: &str) -> BindingResult<Self> {
        Self::new(xml)
    }
}

fn ensure_single_root(xml: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(xml);
    let mut roots = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                roots += 1;
                if roots > 1 {
                    return Err("multiple root elements".to_string());
                }
                // Consumes the element's subtree, validating nesting.
                reader
                    .read_to_end(element.name())
                    .map_err(|e| e.to_string())?;
            }
            Ok(Event::Empty(_)) => {
                roots += 1;
                if roots > 1 {
                    return Err("multiple root elements".to_string());
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if !text.trim().is_empty() {
                    return Err("text outside the root element".to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
    if roots == 1 {
        Ok(())
    } else {
        Err("no root element".to_string())
    }
}
