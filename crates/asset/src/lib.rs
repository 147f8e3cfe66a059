//! Asset loading: Wavefront OBJ geometry, MTL materials, textures.
//!
//! The parsers keep no state between calls; each call owns its scratch pools
//! and returns plain values.

pub mod error;
mod lines;
pub mod material;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod texture;

pub use error::{AssetError, MtlError, ObjError};
pub use material::{LoadOptions, load_model, resolve_material};
pub use mesh::{IlluminationModel, Material, Mesh, MeshVertex};
pub use mtl::parse_mtl;
pub use obj::{AttributePolicy, ObjOptions, parse_obj};
pub use texture::{TextureAllocator, TextureData, TextureHandle};
