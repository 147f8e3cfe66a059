//! Entry point for psxview.
//! Boot order: logging, CLI config, shader source, then the viewer loop.

mod config;

use std::path::Path;

use anyhow::{Context, Result};
use asset::{LoadOptions, ObjOptions};
use platform::ViewerConfig;

use config::Config;

/// Shader text is read here, after logging is up, rather than at static init.
fn load_shader_source(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shader {}", path.display()))?;
    log::debug!("Loaded shader {} ({} bytes)", path.display(), src.len());
    Ok(src)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::from_env();
    log::info!(
        "Starting psxview. Backend: {:?}, window_size={}x{}, models={}, asset_dir={}",
        cfg.backends,
        cfg.width,
        cfg.height,
        cfg.models.len(),
        cfg.asset_dir.display()
    );

    let shader_src = load_shader_source(&cfg.shader_path)?;

    platform::run_viewer(ViewerConfig {
        title: "psxview".to_string(),
        width: cfg.width,
        height: cfg.height,
        backends: cfg.backends,
        shader_src,
        models: cfg.models,
        load: LoadOptions {
            asset_dir: cfg.asset_dir,
            obj: ObjOptions {
                attributes: cfg.attributes,
            },
        },
    })?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
