//! Core graph data structures

mod dataset;
mod edge;
mod node;
mod store;


pub use dataset::{Dataset, DatasetError, DatasetResult, IntegrityViolation, NetworkMeta, NetworkPayload};
pub use edge::{EdgeKind, NetworkEdge};
pub use node::{AccordNode, NetworkNode, NodeId, NodeKind, PerfumeNode, RegisterStatus, ACCORD_ID_PREFIX};
pub use store::{DatasetStore, LoadStatus, VersionedDataset};
