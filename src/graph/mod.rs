mod codec;
mod connectivity;
mod model;
mod snapshot;

pub use codec::{ExportError, ImportError, export_to_path, import_from_path};
pub use model::{Graph, GraphError, GraphFlags, NODE_RADIUS, NodeId};
pub use snapshot::{EdgeView, NodeView, Snapshot};
