//! Game fragments
//!
//! Result files written by the engine carry the game configuration in
//! their name, e.g.
//! `coopfight_events_fc0.333_fd0.333_fi0.1_mdrUniform_ns30_noi0.2_tec0.5_pd1.2_rc0.1_ta1000_te10000_net_adl_lpb_nx100_ny100.json`.

use crate::value::{normalize_floats, ParamMap, ParamValue};
use crate::NamingError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Game parameters in template order, with their fragment codes
pub const GAME_KEYS: [(&str, &str); 11] = [
    ("fraction_cooperators", "fc"),
    ("fraction_defectors", "fd"),
    ("fraction_investment", "fi"),
    ("model_distribution_resources", "mdr"),
    ("nsims", "ns"),
    ("parameter_noise", "noi"),
    ("parameter_technology", "tec"),
    ("payoff_defection", "pd"),
    ("rate_consumption", "rc"),
    ("t_average", "ta"),
    ("t_equilibrium", "te"),
];

const DECIMAL: &str = r"(\d*\.?\d+)";
const INTEGER: &str = r"(\d+)";
const WORD: &str = r"([A-Za-z]+)";

// Lattice sizes show up in result names through the network part
const DECODE_PATTERNS: [(&str, &str, &str); 13] = [
    ("fraction_cooperators", "fc", DECIMAL),
    ("fraction_defectors", "fd", DECIMAL),
    ("fraction_investment", "fi", DECIMAL),
    ("model_distribution_resources", "mdr", WORD),
    ("nsims", "ns", INTEGER),
    ("parameter_noise", "noi", DECIMAL),
    ("parameter_technology", "tec", DECIMAL),
    ("payoff_defection", "pd", DECIMAL),
    ("rate_consumption", "rc", DECIMAL),
    ("t_average", "ta", INTEGER),
    ("t_equilibrium", "te", INTEGER),
    ("nxcells", "nx", INTEGER),
    ("nycells", "ny", INTEGER),
];

fn decode_regexes() -> &'static [(&'static str, Regex)] {
    static REGEXES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        DECODE_PATTERNS
            .iter()
            .filter_map(|(key, code, value)| {
                let pattern = format!("(?:^|_){}{}", code, value);
                match Regex::new(&pattern) {
                    Ok(re) => Some((*key, re)),
                    Err(e) => {
                        log::error!("invalid decode pattern {}: {}", pattern, e);
                        None
                    }
                }
            })
            .collect()
    })
}

/// How initial resources are handed out to agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceDistributionModel {
    #[default]
    #[serde(alias = "uniform", alias = "UNI")]
    Uniform,
}

impl fmt::Display for ResourceDistributionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceDistributionModel::Uniform => write!(f, "Uniform"),
        }
    }
}

/// Parameters of one batch of simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub fraction_cooperators: f64,
    pub fraction_defectors: f64,
    pub fraction_investment: f64,
    pub model_distribution_resources: ResourceDistributionModel,
    pub nsims: usize,
    pub parameter_noise: f64,
    pub parameter_technology: f64,
    pub payoff_defection: f64,
    pub rate_consumption: f64,
    pub t_average: usize,
    pub t_equilibrium: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            fraction_cooperators: 0.333,
            fraction_defectors: 0.333,
            fraction_investment: 0.1,
            model_distribution_resources: ResourceDistributionModel::Uniform,
            nsims: 30,
            parameter_noise: 0.2,
            parameter_technology: 0.5,
            payoff_defection: 1.2,
            rate_consumption: 0.1,
            t_average: 1000,
            t_equilibrium: 10000,
        }
    }
}

impl GameConfig {
    /// Mapping view keyed by the names in [`GAME_KEYS`]
    pub fn to_params(&self) -> ParamMap {
        let values = self.values();
        GAME_KEYS
            .iter()
            .zip(values)
            .map(|((key, _), value)| (key.to_string(), value))
            .collect()
    }

    pub fn fragment(&self) -> String {
        let values: Vec<ParamValue> = self.values().iter().map(|v| v.normalized()).collect();
        render_game(&values)
    }

    fn values(&self) -> [ParamValue; 11] {
        [
            ParamValue::Float(self.fraction_cooperators),
            ParamValue::Float(self.fraction_defectors),
            ParamValue::Float(self.fraction_investment),
            ParamValue::Text(self.model_distribution_resources.to_string()),
            ParamValue::from(self.nsims),
            ParamValue::Float(self.parameter_noise),
            ParamValue::Float(self.parameter_technology),
            ParamValue::Float(self.payoff_defection),
            ParamValue::Float(self.rate_consumption),
            ParamValue::from(self.t_average),
            ParamValue::from(self.t_equilibrium),
        ]
    }
}

fn render_game(values: &[ParamValue]) -> String {
    GAME_KEYS
        .iter()
        .zip(values)
        .map(|((_, code), value)| format!("{}{}", code, value))
        .collect::<Vec<_>>()
        .join("_")
}

/// Game fragment for a configuration mapping. Integral floats are
/// normalized on a copy before templating.
pub fn encode_game(params: &ParamMap) -> Result<String, NamingError> {
    let mut params = params.clone();
    normalize_floats(&mut params);

    let values = GAME_KEYS
        .iter()
        .map(|&(key, _)| {
            params
                .get(key)
                .cloned()
                .ok_or_else(|| NamingError::MissingParameter {
                    model: "game".to_string(),
                    key,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(render_game(&values))
}

/// Recover game parameters from a fragment or a full result file name.
///
/// Each parameter is searched for independently and its first occurrence
/// wins; parameters that do not appear are left out. Types follow the
/// lexical form of the match (see [`ParamValue::infer`]).
pub fn decode_game(fragment: &str) -> ParamMap {
    let mut params = ParamMap::new();
    for (key, re) in decode_regexes() {
        if let Some(raw) = re.captures(fragment).and_then(|caps| caps.get(1)) {
            params.insert(key.to_string(), ParamValue::infer(raw.as_str()));
        }
    }
    params
}

/// Strip `{header}_` and a `.json`/`.csv` extension from a result file name
pub fn fragment_from_file_name<'a>(file_name: &'a str, header: &str) -> Option<&'a str> {
    let stem = file_name
        .strip_suffix(".json")
        .or_else(|| file_name.strip_suffix(".csv"))
        .unwrap_or(file_name);
    stem.strip_prefix(header)?.strip_prefix('_')
}
