//! Canonical file name fragments for coopfight simulations
//!
//! The simulation engine names every network and result file after the
//! configuration that produced it. This crate is the one place that knows
//! those templates, so that the tools generating file names and the tools
//! searching for them cannot drift apart.
//!
//! Two families of fragments exist:
//! - network fragments, e.g. `net_nro_ba_n1000_k4` (see [`network`])
//! - game fragments, e.g. `fc0.3_fd0.3_fi0.1_mdrUniform_...` (see [`game`])
//!
//! Configuration mappings must go through [`normalize_floats`] before they
//! are templated: the engine always writes integral floats without a
//! decimal point. The `encode_*` functions do this on their own copy.

pub mod game;
pub mod network;
pub mod value;

pub use game::{
    decode_game, encode_game, fragment_from_file_name, GameConfig, ResourceDistributionModel,
    GAME_KEYS,
};
pub use network::{encode_network, NetworkFormat, NetworkModel, NetworkSpec};
pub use value::{normalize_floats, ParamMap, ParamValue};

/// Failures while turning a configuration into a fragment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("unknown network model `{0}`")]
    UnknownModel(String),

    #[error("unknown network format `{0}`")]
    UnknownFormat(String),

    #[error("missing parameter `{key}` for {model}")]
    MissingParameter { model: String, key: &'static str },
}
