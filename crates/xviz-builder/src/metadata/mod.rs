// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Metadata builder: stream descriptors and UI panels.

mod stream;
mod ui;

use std::collections::BTreeMap;

use tracing::debug;
use xviz_proto::{Category, Metadata};

pub use stream::{kind, CategoryBuilder, CategoryMarker, ScalarCategory, StreamMetadataBuilder, StreamType};
pub use ui::{ContainerBuilder, UiPanelBuilder};

use crate::error::BuildError;
use crate::message::Message;
use crate::slot::Slot;
use ui::PanelTree;

/// Protocol version written when none is configured.
pub const DEFAULT_VERSION: &str = "2.0.0";

/// Builds a [`Metadata`] message.
///
/// ```
/// use xviz_builder::MetadataBuilder;
/// use xviz_proto::{Category, CoordinateType, PrimitiveType};
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = MetadataBuilder::new();
/// builder.stream("/vehicle_pose")?.category(Category::Pose)?;
/// builder
///     .stream("/object/shape")?
///     .category(Category::Primitive)?
///     .stream_type(PrimitiveType::Polygon)?
///     .coordinate(CoordinateType::Identity);
/// let metadata = builder.finish()?;
/// assert_eq!(metadata.streams.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MetadataBuilder {
    data: Metadata,
    stream: Slot<String>,
    category: Slot<Category>,
    panel: Slot<String>,
    panels: BTreeMap<String, PanelTree>,
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataBuilder {
    /// Empty builder at [`DEFAULT_VERSION`].
    pub fn new() -> Self {
        Self {
            data: Metadata { version: DEFAULT_VERSION.to_owned(), ..Metadata::default() },
            stream: Slot::new("stream"),
            category: Slot::new("category"),
            panel: Slot::new("ui panel"),
            panels: BTreeMap::new(),
        }
    }

    /// Sets the protocol version string.
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.data.version = version.into();
        self
    }

    /// Selects (creating if needed) the descriptor for `stream_id`.
    ///
    /// Re-selecting a stream resumes it with its recorded category.
    pub fn stream(&mut self, stream_id: impl Into<String>) -> Result<StreamMetadataBuilder<'_>, BuildError> {
        self.end_all();
        let descriptor = self.stream.open(stream_id.into(), &mut self.data.streams)?;
        if descriptor.category.is_set() {
            self.category.start(descriptor.category)?;
        }
        let stream = self.stream.key()?;
        debug!(stream = %stream, "select stream");
        Ok(StreamMetadataBuilder::new(stream, descriptor, &mut self.category))
    }

    /// Selects (creating if needed) the UI panel `name`.
    pub fn ui(&mut self, name: impl Into<String>) -> Result<UiPanelBuilder<'_>, BuildError> {
        self.end_all();
        let tree = self.panel.open(name.into(), &mut self.panels)?;
        let panel = self.panel.key()?;
        let info = self.data.ui_config.entry(panel.clone()).or_default();
        debug!(panel = %panel, "select ui panel");
        Ok(UiPanelBuilder::new(panel, info, tree))
    }

    /// Ends every open sub-builder, folds each panel tree into its
    /// `config`, and returns the message. The builder is left empty at the
    /// same version.
    ///
    /// On error the builder is unchanged.
    pub fn finish(&mut self) -> Result<Metadata, BuildError> {
        self.end_all();
        for (name, tree) in &self.panels {
            let config = tree.to_config(name)?;
            if let Some(info) = self.data.ui_config.get_mut(name) {
                info.config = config;
            }
        }
        let data = self.take();
        debug!(streams = data.streams.len(), panels = data.ui_config.len(), "metadata finished");
        Ok(data)
    }

    /// [`finish`](Self::finish), wrapped for encoding.
    pub fn message(&mut self) -> Result<Message<Metadata>, BuildError> {
        self.finish().map(Message::new)
    }

    /// Drops everything built so far, keeping the version.
    pub fn reset(&mut self) {
        self.end_all();
        self.take();
    }

    fn take(&mut self) -> Metadata {
        self.panels.clear();
        let fresh = Metadata { version: self.data.version.clone(), ..Metadata::default() };
        std::mem::replace(&mut self.data, fresh)
    }

    fn end_all(&mut self) {
        self.category.end();
        self.stream.end();
        self.panel.end();
    }
}
