//! Backend-independent graph presentation engine.
//!
//! Turns a graph document into a styled, filterable, searchable scene and
//! positions it with a pluggable layout engine. Nothing in here touches the
//! DOM; the canvas component consumes the plain style records it produces.

pub mod error;
pub mod export;
pub mod filter;
pub mod label;
pub mod layout;
pub mod loader;
pub mod provider;
pub mod scene;
pub mod search;
pub mod style;
pub mod types;
pub mod viewport;

pub use error::{EngineError, Result};
pub use export::{ExportPlan, ExportSettings};
pub use filter::{FilterState, VisibilitySnapshot, compute_visibility};
pub use label::LabelMode;
pub use layout::{LayoutDispatcher, LayoutFrame, LayoutName, LayoutSpec, LayoutTicket, select_layout};
pub use loader::{DocumentLoader, EndpointPolicy, parse_document};
pub use provider::{DataProvider, HttpProvider};
pub use scene::GraphScene;
pub use search::Highlight;
pub use style::{Color, DisplayMode, EdgeStyle, NodeStyle, Palette, Swatch};
pub use types::{EdgeRecord, GraphDocument, NodeRecord, StyleLegend, ValidEdge};
pub use viewport::{Bounds, Viewport};
