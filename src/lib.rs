//! Scentmap: perfume similarity network core
//!
//! Turns a large perfume/accord graph into a small, render-ready subgraph on
//! every filter change, and scores how much a visitor has explored.
//!
//! # Core Concepts
//!
//! - **Dataset**: perfume and accord nodes with accord-membership and
//!   similarity edges, as served by one fetch
//! - **Render pipeline**: attribute filter, similarity threshold, top-K
//!   accord edges and a display budget that always keeps the selected
//!   perfume and its closest neighbors
//! - **Activity scorer**: counts interactions and dwell time and asks the
//!   backend when a scent card can be offered
//!
//! # Example
//!
//! ```
//! use scentmap::{render, AccordNode, Dataset, FilterState, NetworkEdge, PerfumeNode};
//!
//! let dataset = Dataset::new(
//!     vec![
//!         AccordNode::named("Woody").into(),
//!         PerfumeNode::new("1", "Santal 33").with_accord("Woody").into(),
//!     ],
//!     vec![NetworkEdge::has_accord("1", "Woody", 0.9)],
//!     serde_json::Value::Null,
//! );
//! let graph = render(&dataset, &FilterState::unfiltered(0.5, 3, 10).with_accords(["Woody"]));
//! assert_eq!(graph.nodes.len(), 2);
//! ```

pub mod client;
pub mod config;
pub mod detail;
mod graph;
pub mod labels;
pub mod pipeline;
pub mod session;
pub mod storage;

pub use client::{ClientError, ClientResult, FetchCoordinator, HttpBackend, NetworkQuery, RequestToken};
pub use config::{Config, ConfigError};
pub use graph::{
    AccordNode, Dataset, DatasetError, DatasetResult, DatasetStore, EdgeKind, IntegrityViolation,
    LoadStatus, NetworkEdge, NetworkMeta, NetworkNode, NetworkPayload, NodeId, NodeKind,
    PerfumeNode, RegisterStatus, VersionedDataset, ACCORD_ID_PREFIX,
};
pub use labels::{FilterOptions, Labels};
pub use pipeline::{render, FilterState, PipelineCache, RenderGraph};
pub use session::{Interaction, ScorerPhase, SessionError, SessionScorer};
pub use storage::{MemoryStorage, OpenStore, SessionStorage, SqliteStorage, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
