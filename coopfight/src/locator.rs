use crate::config::{load_network_config, NetrustPaths};
use crate::error::{Error, Result};
use naming::{encode_network, normalize_floats, NetworkFormat, NetworkModel};
use std::fs;
use std::path::Path;

/// Names of the entries in `dir` starting with `prefix`, sorted.
///
/// Only the directory itself is listed, never its subdirectories. Names
/// that are not valid UTF-8 cannot carry a fragment and are skipped.
pub fn collect_filenames(dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with(prefix) => names.push(name),
            Ok(_) => {}
            Err(raw) => log::debug!("skipping non UTF-8 entry {:?}", raw),
        }
    }
    names.sort();

    log::debug!(
        "{} entries in {} match `{}`",
        names.len(),
        dir.display(),
        prefix
    );
    Ok(names)
}

/// Network files generated from the configured parameters of `model`
pub fn collect_network_filenames(
    paths: &NetrustPaths,
    model: NetworkModel,
    format: NetworkFormat,
) -> Result<Vec<String>> {
    let config = load_network_config(&paths.config_file)?;
    let mut params = config.params_for(model)?.clone();
    normalize_floats(&mut params);

    let prefix = encode_network(model, format, &params)?;
    log::info!("searching {} for `{}`", paths.networks_dir.display(), prefix);
    let names = collect_filenames(&paths.networks_dir, &prefix)?;
    Ok(names
        .into_iter()
        .filter(|name| ends_at_field_boundary(name, &prefix))
        .collect())
}

/// `k4` must not pick up `k40`: the fragment has to be followed by the next
/// `_` field, the extension, or nothing
fn ends_at_field_boundary(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('_') || rest.starts_with('.'),
        None => false,
    }
}
