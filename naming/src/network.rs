//! Network fragments
//!
//! A network file is named `net_{format}_{model fragment}...`, for example
//! `net_nro_ba_n1000_k4_<uuid>.json`. Every model has its own template and
//! its own set of required parameters, captured by [`NetworkSpec`].

use crate::value::{normalize_floats, ParamMap, ParamValue};
use crate::NamingError;
use std::fmt;
use std::str::FromStr;

/// Network generators known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum NetworkModel {
    #[value(name = "BarabasiAlbert")]
    BarabasiAlbert,
    #[value(name = "Complete")]
    Complete,
    #[value(name = "Configuration")]
    Configuration,
    #[value(name = "ConfigurationCorrelated")]
    ConfigurationCorrelated,
    #[value(name = "ConfigurationUncorrelated")]
    ConfigurationUncorrelated,
    #[value(name = "ErdosRenyi")]
    ErdosRenyi,
    #[value(name = "Lattice")]
    Lattice,
    #[value(name = "LatticePBC")]
    LatticePBC,
    #[value(name = "Regular")]
    Regular,
    #[value(name = "WattsStrogatz")]
    WattsStrogatz,
}

impl NetworkModel {
    pub const ALL: [NetworkModel; 10] = [
        NetworkModel::BarabasiAlbert,
        NetworkModel::Complete,
        NetworkModel::Configuration,
        NetworkModel::ConfigurationCorrelated,
        NetworkModel::ConfigurationUncorrelated,
        NetworkModel::ErdosRenyi,
        NetworkModel::Lattice,
        NetworkModel::LatticePBC,
        NetworkModel::Regular,
        NetworkModel::WattsStrogatz,
    ];

    /// Identifier used as key in `config_network.json`
    pub fn id(&self) -> &'static str {
        match self {
            NetworkModel::BarabasiAlbert => "BarabasiAlbert",
            NetworkModel::Complete => "Complete",
            NetworkModel::Configuration => "Configuration",
            NetworkModel::ConfigurationCorrelated => "ConfigurationCorrelated",
            NetworkModel::ConfigurationUncorrelated => "ConfigurationUncorrelated",
            NetworkModel::ErdosRenyi => "ErdosRenyi",
            NetworkModel::Lattice => "Lattice",
            NetworkModel::LatticePBC => "LatticePBC",
            NetworkModel::Regular => "Regular",
            NetworkModel::WattsStrogatz => "WattsStrogatz",
        }
    }
}

impl fmt::Display for NetworkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for NetworkModel {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkModel::ALL
            .iter()
            .copied()
            .find(|model| model.id() == s)
            .ok_or_else(|| NamingError::UnknownModel(s.to_string()))
    }
}

/// On-disk representation of a network file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum NetworkFormat {
    AdjacencyList,
    AdjacencyMatrix,
    EdgeList,
    #[default]
    NetrustObject,
}

impl NetworkFormat {
    pub fn id(&self) -> &'static str {
        match self {
            NetworkFormat::AdjacencyList => "adjacency-list",
            NetworkFormat::AdjacencyMatrix => "adjacency-matrix",
            NetworkFormat::EdgeList => "edge-list",
            NetworkFormat::NetrustObject => "netrust-object",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NetworkFormat::AdjacencyList => "adl",
            NetworkFormat::AdjacencyMatrix => "adm",
            NetworkFormat::EdgeList => "edl",
            NetworkFormat::NetrustObject => "nro",
        }
    }

    /// Prefix shared by every network file in this format, e.g. `net_nro_`
    pub fn header(&self) -> String {
        format!("net_{}_", self.code())
    }
}

impl fmt::Display for NetworkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for NetworkFormat {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adjacency-list" => Ok(NetworkFormat::AdjacencyList),
            "adjacency-matrix" => Ok(NetworkFormat::AdjacencyMatrix),
            "edge-list" => Ok(NetworkFormat::EdgeList),
            "netrust-object" => Ok(NetworkFormat::NetrustObject),
            other => Err(NamingError::UnknownFormat(other.to_string())),
        }
    }
}

/// A network model together with the parameters its template needs
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkSpec {
    BarabasiAlbert {
        size: ParamValue,
        average_degree: ParamValue,
    },
    Complete {
        size: ParamValue,
    },
    Configuration {
        size: ParamValue,
        degree_minimum: ParamValue,
        degree_maximum: ParamValue,
        power_law_exponent: ParamValue,
    },
    ConfigurationCorrelated {
        size: ParamValue,
        degree_minimum: ParamValue,
        degree_maximum: ParamValue,
        power_law_exponent: ParamValue,
    },
    ConfigurationUncorrelated {
        size: ParamValue,
        degree_minimum: ParamValue,
        degree_maximum: ParamValue,
        power_law_exponent: ParamValue,
    },
    ErdosRenyi {
        size: ParamValue,
        average_degree: ParamValue,
    },
    Lattice {
        nxcells: ParamValue,
        nycells: ParamValue,
    },
    LatticePBC {
        nxcells: ParamValue,
        nycells: ParamValue,
    },
    Regular {
        size: ParamValue,
        average_degree: ParamValue,
    },
    WattsStrogatz {
        size: ParamValue,
        average_degree: ParamValue,
        probability_rewiring: ParamValue,
    },
}

impl NetworkSpec {
    /// Pick the parameters `model` needs out of `params`.
    ///
    /// Values are taken as they are; call [`normalize_floats`] first when
    /// the mapping came straight from a JSON file.
    pub fn from_params(model: NetworkModel, params: &ParamMap) -> Result<Self, NamingError> {
        let get = |key: &'static str| -> Result<ParamValue, NamingError> {
            params
                .get(key)
                .cloned()
                .ok_or_else(|| NamingError::MissingParameter {
                    model: model.id().to_string(),
                    key,
                })
        };

        let spec = match model {
            NetworkModel::BarabasiAlbert => NetworkSpec::BarabasiAlbert {
                size: get("size")?,
                average_degree: get("average_degree")?,
            },
            NetworkModel::Complete => NetworkSpec::Complete { size: get("size")? },
            NetworkModel::Configuration => NetworkSpec::Configuration {
                size: get("size")?,
                degree_minimum: get("degree_minimum")?,
                degree_maximum: get("degree_maximum")?,
                power_law_exponent: get("power_law_exponent")?,
            },
            NetworkModel::ConfigurationCorrelated => NetworkSpec::ConfigurationCorrelated {
                size: get("size")?,
                degree_minimum: get("degree_minimum")?,
                degree_maximum: get("degree_maximum")?,
                power_law_exponent: get("power_law_exponent")?,
            },
            NetworkModel::ConfigurationUncorrelated => NetworkSpec::ConfigurationUncorrelated {
                size: get("size")?,
                degree_minimum: get("degree_minimum")?,
                degree_maximum: get("degree_maximum")?,
                power_law_exponent: get("power_law_exponent")?,
            },
            NetworkModel::ErdosRenyi => NetworkSpec::ErdosRenyi {
                size: get("size")?,
                average_degree: get("average_degree")?,
            },
            NetworkModel::Lattice => NetworkSpec::Lattice {
                nxcells: get("nxcells")?,
                nycells: get("nycells")?,
            },
            NetworkModel::LatticePBC => NetworkSpec::LatticePBC {
                nxcells: get("nxcells")?,
                nycells: get("nycells")?,
            },
            NetworkModel::Regular => NetworkSpec::Regular {
                size: get("size")?,
                average_degree: get("average_degree")?,
            },
            NetworkModel::WattsStrogatz => NetworkSpec::WattsStrogatz {
                size: get("size")?,
                average_degree: get("average_degree")?,
                probability_rewiring: get("probability_rewiring")?,
            },
        };

        Ok(spec)
    }

    /// Model part of the file name, without the format header
    pub fn fragment(&self) -> String {
        match self {
            NetworkSpec::BarabasiAlbert {
                size,
                average_degree,
            } => format!("ba_n{}_k{}", size, average_degree),
            NetworkSpec::Complete { size } => format!("co_n{}", size),
            NetworkSpec::Configuration {
                size,
                degree_minimum,
                degree_maximum,
                power_law_exponent,
            } => format!(
                "con_n{}_kmin{}_kmax{}_exp{}",
                size, degree_minimum, degree_maximum, power_law_exponent
            ),
            NetworkSpec::ConfigurationCorrelated {
                size,
                degree_minimum,
                degree_maximum,
                power_law_exponent,
            } => format!(
                "cco_n{}_kmin{}_kmax{}_exp{}",
                size, degree_minimum, degree_maximum, power_law_exponent
            ),
            NetworkSpec::ConfigurationUncorrelated {
                size,
                degree_minimum,
                degree_maximum,
                power_law_exponent,
            } => format!(
                "ucm_n{}_kmin{}_kmax{}_exp{}",
                size, degree_minimum, degree_maximum, power_law_exponent
            ),
            NetworkSpec::ErdosRenyi {
                size,
                average_degree,
            } => format!("er_n{}_k{}", size, average_degree),
            NetworkSpec::Lattice { nxcells, nycells } => format!("lat_nx{}_ny{}", nxcells, nycells),
            NetworkSpec::LatticePBC { nxcells, nycells } => {
                format!("lpb_nx{}_ny{}", nxcells, nycells)
            }
            NetworkSpec::Regular {
                size,
                average_degree,
            } => format!("reg_n{}_k{}", size, average_degree),
            NetworkSpec::WattsStrogatz {
                size,
                average_degree,
                probability_rewiring,
            } => format!(
                "ws_n{}_k{}_p{}",
                size, average_degree, probability_rewiring
            ),
        }
    }
}

/// Full network fragment (`net_{format}_{model}...`) for a configuration
/// mapping. Integral floats are normalized on a copy before templating.
pub fn encode_network(
    model: NetworkModel,
    format: NetworkFormat,
    params: &ParamMap,
) -> Result<String, NamingError> {
    let mut params = params.clone();
    normalize_floats(&mut params);
    let spec = NetworkSpec::from_params(model, &params)?;
    Ok(format!("{}{}", format.header(), spec.fragment()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, ParamValue)]) -> ParamMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn lattice_with_integral_float() {
        let p = params(&[
            ("nxcells", ParamValue::Int(10)),
            ("nycells", ParamValue::Float(5.0)),
        ]);
        let fragment =
            encode_network(NetworkModel::Lattice, NetworkFormat::default(), &p).unwrap();
        assert_eq!(fragment, "net_nro_lat_nx10_ny5");
    }

    #[test]
    fn unnormalized_spec_keeps_decimal_point() {
        let p = params(&[
            ("nxcells", ParamValue::Int(10)),
            ("nycells", ParamValue::Float(5.0)),
        ]);
        let spec = NetworkSpec::from_params(NetworkModel::Lattice, &p).unwrap();
        assert_eq!(spec.fragment(), "lat_nx10_ny5.0");
    }

    #[test]
    fn every_model_template() {
        let p = params(&[
            ("size", ParamValue::Int(1000)),
            ("average_degree", ParamValue::Float(4.0)),
            ("degree_minimum", ParamValue::Int(2)),
            ("degree_maximum", ParamValue::Int(31)),
            ("power_law_exponent", ParamValue::Float(2.5)),
            ("nxcells", ParamValue::Int(100)),
            ("nycells", ParamValue::Int(50)),
            ("probability_rewiring", ParamValue::Float(0.1)),
        ]);

        let expected = [
            (NetworkModel::BarabasiAlbert, "ba_n1000_k4"),
            (NetworkModel::Complete, "co_n1000"),
            (NetworkModel::Configuration, "con_n1000_kmin2_kmax31_exp2.5"),
            (NetworkModel::ConfigurationCorrelated, "cco_n1000_kmin2_kmax31_exp2.5"),
            (NetworkModel::ConfigurationUncorrelated, "ucm_n1000_kmin2_kmax31_exp2.5"),
            (NetworkModel::ErdosRenyi, "er_n1000_k4"),
            (NetworkModel::Lattice, "lat_nx100_ny50"),
            (NetworkModel::LatticePBC, "lpb_nx100_ny50"),
            (NetworkModel::Regular, "reg_n1000_k4"),
            (NetworkModel::WattsStrogatz, "ws_n1000_k4_p0.1"),
        ];

        for (model, fragment) in expected {
            let encoded = encode_network(model, NetworkFormat::AdjacencyList, &p).unwrap();
            assert_eq!(encoded, format!("net_adl_{}", fragment), "{}", model);
        }
    }

    #[test]
    fn missing_key_names_model_and_key() {
        let p = params(&[("size", ParamValue::Int(1000))]);
        let err =
            encode_network(NetworkModel::WattsStrogatz, NetworkFormat::EdgeList, &p).unwrap_err();
        assert_eq!(
            err,
            NamingError::MissingParameter {
                model: "WattsStrogatz".into(),
                key: "average_degree",
            }
        );
    }

    #[test]
    fn unknown_identifiers_are_errors() {
        assert_eq!(
            "Hypercube".parse::<NetworkModel>(),
            Err(NamingError::UnknownModel("Hypercube".into()))
        );
        assert_eq!(
            "graphml".parse::<NetworkFormat>(),
            Err(NamingError::UnknownFormat("graphml".into()))
        );
    }

    #[test]
    fn identifiers_round_trip() {
        for model in NetworkModel::ALL {
            assert_eq!(model.id().parse::<NetworkModel>(), Ok(model));
        }
        for format in [
            NetworkFormat::AdjacencyList,
            NetworkFormat::AdjacencyMatrix,
            NetworkFormat::EdgeList,
            NetworkFormat::NetrustObject,
        ] {
            assert_eq!(format.id().parse::<NetworkFormat>(), Ok(format));
        }
    }
}
