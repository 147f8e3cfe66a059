//! Core types: math re-exports, fly camera, flat scene.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod error;
pub mod scene;

pub use error::{CoreError, CoreResult};

/// Parse `"x,y,z"` (whitespace around components allowed).
pub fn parse_vec3(text: &str) -> CoreResult<Vec3> {
    let invalid = || CoreError::InvalidVector(text.to_string());
    let mut parts = text.split(',').map(|p| p.trim().parse::<f32>());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(vec3(x, y, z)),
        _ => Err(invalid()),
    }
}
