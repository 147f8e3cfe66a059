//! Material lookup and diffuse texture binding for a parsed mesh.

use std::path::{Path, PathBuf};

use crate::{
    error::AssetError,
    mesh::{Material, Mesh},
    mtl::parse_mtl,
    obj::{ObjOptions, parse_obj_with},
    texture::{TextureAllocator, TextureHandle, load_texture},
};

/// Where companion files live and how geometry is emitted.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Material libraries and texture maps are resolved against this directory.
    pub asset_dir: PathBuf,
    pub obj: ObjOptions,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            obj: ObjOptions::default(),
        }
    }
}

/// First material in `materials` whose name equals `name`.
pub fn find_material<'a>(materials: &'a [Material], name: &str) -> Option<&'a Material> {
    materials.iter().find(|m| m.name == name)
}

/// Load `mesh.material_lib` from `asset_dir` and copy the `usemtl` selection
/// into `mesh.material`. Without a library or a match the material is left as is.
pub fn resolve_material(mesh: &mut Mesh, asset_dir: &Path) -> Result<(), AssetError> {
    let Some(lib) = mesh.material_lib.as_deref() else {
        return Ok(());
    };

    let lib_path = asset_dir.join(lib);
    let materials = parse_mtl(&lib_path).map_err(|source| AssetError::Mtl {
        path: lib_path.display().to_string(),
        source,
    })?;

    let wanted = mesh.active_material.as_deref().unwrap_or_default();
    match find_material(&materials, wanted) {
        Some(found) => {
            log::debug!("Bound material '{}' from {}", found.name, lib_path.display());
            mesh.material = found.clone();
        }
        None => {
            log::warn!(
                "Material '{}' not found in {} ({} available)",
                wanted,
                lib_path.display(),
                materials.len()
            );
        }
    }
    Ok(())
}

/// Allocate the material's diffuse map, if it names one.
pub fn bind_diffuse_texture(
    mesh: &mut Mesh,
    asset_dir: &Path,
    allocator: &mut dyn TextureAllocator,
) -> TextureHandle {
    mesh.diffuse_tex = match mesh.material.diffuse_map.as_deref() {
        Some(map) => load_texture(&asset_dir.join(map), allocator),
        None => TextureHandle::INVALID,
    };
    mesh.diffuse_tex
}

/// Geometry, material and diffuse texture in one call.
pub fn load_model(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    allocator: &mut dyn TextureAllocator,
) -> Result<Mesh, AssetError> {
    let path = path.as_ref();
    let mut mesh = parse_obj_with(path, &options.obj).map_err(|source| AssetError::Obj {
        path: path.display().to_string(),
        source,
    })?;

    resolve_material(&mut mesh, &options.asset_dir)?;
    bind_diffuse_texture(&mut mesh, &options.asset_dir, allocator);

    log::info!(
        "Model {}: {} vertices, material '{}', textured={}",
        path.display(),
        mesh.vertex_count(),
        mesh.material.name,
        mesh.diffuse_tex.is_valid()
    );
    Ok(mesh)
}
