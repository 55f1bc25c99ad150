//! Asset loading: OBJ meshes into a deduplicated vertex table plus triangle list.

pub mod error;
pub mod mesh;
pub mod obj;

pub use error::{MalformedKind, MeshError, MeshResult};
pub use mesh::{Face, Mesh, Vertex};
pub use obj::{LoadStats, load_obj_from_path, load_obj_from_reader, load_obj_from_str};
