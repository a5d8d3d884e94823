//! Configuration loading
//!
//! - `config_network.json`: network parameters keyed by model identifier,
//!   shared with the network generator
//! - plot configuration: optional TOML file with style and panel settings

use crate::error::{Error, Result};
use crate::plots::PlotStyle;
use naming::{NetworkModel, ParamMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and deserialize a JSON file, adding the `.json` extension when the
/// path does not already end with it
pub fn load_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = with_json_extension(path.as_ref());
    let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    log::debug!("loaded {} ({} bytes)", path.display(), content.len());
    serde_json::from_str(&content).map_err(|source| Error::Json { path, source })
}

fn with_json_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "json") {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_owned();
        raw.push(".json");
        PathBuf::from(raw)
    }
}

/// Contents of `config_network.json`
#[derive(Debug, Clone)]
pub struct NetworkConfigFile {
    pub path: PathBuf,
    pub models: BTreeMap<String, ParamMap>,
}

impl NetworkConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = with_json_extension(path.as_ref());
        let models = load_json_file(&path)?;
        Ok(NetworkConfigFile { path, models })
    }

    /// Parameters for `model`, exactly as stored in the file
    pub fn params_for(&self, model: NetworkModel) -> Result<&ParamMap> {
        self.models
            .get(model.id())
            .ok_or_else(|| Error::ModelNotConfigured {
                model: model.id().to_string(),
                path: self.path.clone(),
            })
    }
}

pub fn load_network_config(path: impl AsRef<Path>) -> Result<NetworkConfigFile> {
    let config = NetworkConfigFile::load(path)?;
    log::debug!(
        "{} network models configured in {}",
        config.models.len(),
        config.path.display()
    );
    Ok(config)
}

/// Where the network generator keeps its configuration and output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetrustPaths {
    pub config_file: PathBuf,
    pub networks_dir: PathBuf,
}

impl NetrustPaths {
    /// The generator lives next to this project: `<root>/../netrust`
    pub fn from_project_root(root: impl AsRef<Path>) -> Self {
        let netrust = root.as_ref().join("..").join("netrust");
        NetrustPaths {
            config_file: netrust.join("config").join("config_network.json"),
            networks_dir: netrust.join("data").join("networks"),
        }
    }
}

/// Settings for the 2D parameter-sweep panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalPanelSettings {
    /// Fixed values for the parameters that are not on an axis
    pub filter_params: BTreeMap<String, f64>,
    pub observables: Vec<String>,
    pub id_control_1: String,
    pub id_control_2: String,
}

impl Default for GlobalPanelSettings {
    fn default() -> Self {
        let filter_params = [
            ("rate_consumption", 0.0),
            ("parameter_noise", 0.1),
            ("parameter_technology", 0.5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        GlobalPanelSettings {
            filter_params,
            observables: vec![
                "fraction_cooperators".to_string(),
                "fraction_defectors".to_string(),
                "fraction_fighters".to_string(),
            ],
            id_control_1: "payoff_defection".to_string(),
            id_control_2: "fraction_investment".to_string(),
        }
    }
}

/// Settings for the fighting-event panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPanelSettings {
    pub xlim_max: f64,
    pub ylim_max: f64,
    /// Number of bins along each axis of the density panels
    pub gridsize: usize,
}

impl Default for EventPanelSettings {
    fn default() -> Self {
        EventPanelSettings {
            xlim_max: 10.0,
            ylim_max: 10.0,
            gridsize: 200,
        }
    }
}

/// Everything the plotting binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub style: PlotStyle,
    pub global_panel: GlobalPanelSettings,
    pub event_panel: EventPanelSettings,
}

impl PlotConfig {
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::FigureFormat;
    use naming::ParamValue;

    #[test]
    fn json_extension_added_once() {
        assert_eq!(
            with_json_extension(Path::new("results/run")),
            PathBuf::from("results/run.json")
        );
        assert_eq!(
            with_json_extension(Path::new("results/run.json")),
            PathBuf::from("results/run.json")
        );
        // A dot inside the fragment is not an extension we recognise
        assert_eq!(
            with_json_extension(Path::new("coopfight_time_fc0.3")),
            PathBuf::from("coopfight_time_fc0.3.json")
        );
    }

    #[test]
    fn load_json_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config_network.json"), r#"{"Complete": {"size": 50.0}}"#)
            .unwrap();

        let config = NetworkConfigFile::load(dir.path().join("config_network")).unwrap();
        let params = config.params_for(NetworkModel::Complete).unwrap();
        assert_eq!(params["size"], ParamValue::Float(50.0));
    }

    #[test]
    fn unconfigured_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_network.json");
        fs::write(&path, r#"{"Complete": {"size": 50}}"#).unwrap();

        let config = NetworkConfigFile::load(&path).unwrap();
        let err = config.params_for(NetworkModel::Lattice).unwrap_err();
        assert!(matches!(err, Error::ModelNotConfigured { ref model, .. } if model == "Lattice"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_json_file::<ParamMap>("/definitely/not/here").unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.json")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_json_file::<ParamMap>(&path),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn netrust_paths_sit_next_to_project() {
        let paths = NetrustPaths::from_project_root("/work/coopfight");
        assert_eq!(
            paths.config_file,
            PathBuf::from("/work/coopfight/../netrust/config/config_network.json")
        );
        assert_eq!(
            paths.networks_dir,
            PathBuf::from("/work/coopfight/../netrust/data/networks")
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PlotConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlotConfig::default());
        assert_eq!(config.global_panel.filter_params["parameter_noise"], 0.1);
        assert_eq!(config.event_panel.gridsize, 200);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = PlotConfig::from_toml_str(
            r#"
            [style]
            output_dir = "out/figures"
            formats = ["png"]

            [global_panel]
            id_control_2 = "parameter_technology"

            [global_panel.filter_params]
            rate_consumption = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.style.output_dir, PathBuf::from("out/figures"));
        assert_eq!(config.style.formats, vec![FigureFormat::Png]);
        assert_eq!(config.global_panel.id_control_1, "payoff_defection");
        assert_eq!(config.global_panel.id_control_2, "parameter_technology");
        assert_eq!(config.global_panel.filter_params.len(), 1);
        assert_eq!(config.event_panel, EventPanelSettings::default());
    }
}
