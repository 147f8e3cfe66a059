//! Command-line configuration.
//!
//! Flags use the `--name=value` form. Unparseable values fall back to the
//! default with a warning instead of aborting start-up.

use std::path::PathBuf;

use asset::AttributePolicy;
use corelib::{Vec3, parse_vec3};
use platform::ModelPlacement;

pub const DEFAULT_MODEL: &str = "assets/cube-tex.obj";
pub const DEFAULT_ASSET_DIR: &str = "assets";
pub const DEFAULT_SHADER: &str = "assets/shaders/mesh.wgsl";

#[derive(Clone, Debug)]
pub struct Config {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub models: Vec<ModelPlacement>,
    pub asset_dir: PathBuf,
    pub shader_path: PathBuf,
    pub attributes: AttributePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            width: 800,
            height: 600,
            models: Vec::new(),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            shader_path: PathBuf::from(DEFAULT_SHADER),
            attributes: AttributePolicy::ZeroFill,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::default();
        let mut width: Option<u32> = None;
        let mut height: Option<u32> = None;

        for arg in args {
            let arg = arg.as_ref();
            if let Some(val) = arg.strip_prefix("--gpu-backend=") {
                cfg.backends = parse_backend(val);
            } else if let Some(val) = arg.strip_prefix("--size=") {
                match val.split_once('x').or_else(|| val.split_once('X')) {
                    Some((sw, sh)) => {
                        if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                            width = Some(pw);
                            height = Some(ph);
                        } else {
                            log::warn!("Ignoring malformed --size '{}'", val);
                        }
                    }
                    None => log::warn!("Ignoring malformed --size '{}'", val),
                }
            } else if let Some(val) = arg.strip_prefix("--width=") {
                width = val.parse().ok().or(width);
            } else if let Some(val) = arg.strip_prefix("--height=") {
                height = val.parse().ok().or(height);
            } else if let Some(val) = arg.strip_prefix("--model=") {
                if let Some(model) = parse_model(val) {
                    cfg.models.push(model);
                }
            } else if let Some(val) = arg.strip_prefix("--asset-dir=") {
                cfg.asset_dir = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--shader=") {
                cfg.shader_path = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--attributes=") {
                cfg.attributes = match val.to_ascii_lowercase().as_str() {
                    "drop" => AttributePolicy::Drop,
                    "zero-fill" | "zerofill" | "zero" => AttributePolicy::ZeroFill,
                    other => {
                        log::warn!("Unknown attribute policy '{}', using zero-fill.", other);
                        AttributePolicy::ZeroFill
                    }
                };
            } else {
                log::warn!("Ignoring unknown argument '{}'", arg);
            }
        }

        cfg.width = width.unwrap_or(cfg.width).max(1);
        cfg.height = height.unwrap_or(cfg.height).max(1);
        if cfg.models.is_empty() {
            cfg.models.push(ModelPlacement {
                path: PathBuf::from(DEFAULT_MODEL),
                position: Vec3::ZERO,
            });
        }
        cfg
    }
}

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

/// `PATH` or `PATH@X,Y,Z`.
fn parse_model(val: &str) -> Option<ModelPlacement> {
    let (path, position) = match val.rsplit_once('@') {
        Some((path, pos)) => match parse_vec3(pos) {
            Ok(p) => (path, p),
            Err(e) => {
                log::warn!("Model '{}': {}; placing at origin", path, e);
                (path, Vec3::ZERO)
            }
        },
        None => (val, Vec3::ZERO),
    };
    if path.is_empty() {
        log::warn!("Ignoring --model with empty path");
        return None;
    }
    Some(ModelPlacement {
        path: PathBuf::from(path),
        position,
    })
}
