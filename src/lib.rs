pub mod config;
pub mod containment;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod session;
pub mod snap;

pub use config::{EditorConfig, load_config};
pub use model::{Diagram, Edge, EdgeKind, Node, NodeData, NodeKind};
pub use session::{EditorSession, Mode, NodeChange};
pub use snap::{HelperGuide, Orientation};
