//! From image bytes to an [`ExtractionResult`]
//!
//! Finding the metadata text inside an image container is the job of a
//! [`PayloadLocator`]. Only [`PlainText`] ships here; container decoders live
//! with the application that owns the images.

use tracing::{debug, warn};

use crate::conventions::{Conventions, DEFAULT_CONVENTIONS};
use crate::loader::{self, LoadError};
use crate::resolver;
use crate::types::ExtractionResult;

/// Returns the embedded node-graph text of one image, if it has any
pub trait PayloadLocator {
    fn locate(&self, bytes: &[u8]) -> Option<String>;
}

/// The bytes are the payload, e.g. a graph exported to a `.json` file
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl PayloadLocator for PlainText {
    fn locate(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl<F> PayloadLocator for F
where
    F: Fn(&[u8]) -> Option<String>,
{
    fn locate(&self, bytes: &[u8]) -> Option<String> {
        self(bytes)
    }
}

pub fn extract<L: PayloadLocator + ?Sized>(
    locator: &L,
    bytes: &[u8],
) -> Result<ExtractionResult, LoadError> {
    extract_with(locator, bytes, &DEFAULT_CONVENTIONS)
}

/// Locate, load and resolve in one go.
///
/// Missing metadata is returned without logging. Malformed metadata is
/// logged at `warn` before being returned.
pub fn extract_with<L: PayloadLocator + ?Sized>(
    locator: &L,
    bytes: &[u8],
    conventions: &Conventions,
) -> Result<ExtractionResult, LoadError> {
    let raw = locator.locate(bytes);
    let graph = match loader::load(raw.as_deref()) {
        Ok(graph) => graph,
        Err(LoadError::Missing) => {
            debug!("No metadata payload in {} bytes", bytes.len());
            return Err(LoadError::Missing);
        }
        Err(err) => {
            warn!("Ignoring unreadable metadata: {}", err);
            return Err(err);
        }
    };

    debug!("Loaded graph with {} nodes", graph.len());
    Ok(resolver::resolve_with(&graph, conventions))
}
