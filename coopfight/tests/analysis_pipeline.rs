//! End-to-end checks over files laid out the way the engine and the
//! network generator write them

use approx::assert_relative_eq;
use coopfight::config::NetrustPaths;
use coopfight::events::{
    assemble_fight_events_to_columns, assemble_fight_events_to_table, load_fight_results,
};
use coopfight::locator::collect_network_filenames;
use coopfight::stats::compute_win_fractions;
use coopfight::table::{build_2d_array, ParameterTable};
use coopfight::{Error, Strategy};
use naming::{decode_game, GameConfig, NetworkFormat, NetworkModel, ParamValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const EVENTS: &str = r#"[
  [
    {"id_event": 0, "investment_enemy": 0.4, "investment_focal": 0.6, "resources_enemy": 1.0,
     "resources_focal": 1.2, "strategy_enemy": "Defector", "strategy_focal": "Cooperator",
     "time": 1, "winner": 1},
    {"id_event": 1, "investment_enemy": 0.1, "investment_focal": 0.9, "resources_enemy": 0.5,
     "resources_focal": 2.0, "strategy_enemy": "Defector", "strategy_focal": "Cooperator",
     "time": 10, "winner": 0}
  ],
  [
    {"id_event": 0, "investment_enemy": 0.7, "investment_focal": 0.2, "resources_enemy": 3.0,
     "resources_focal": 0.3, "strategy_enemy": "Fighter", "strategy_focal": "Defector",
     "time": 10, "winner": 1}
  ]
]"#;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn events_file_to_win_fractions() {
    let dir = tempfile::tempdir().unwrap();
    let config = GameConfig {
        t_equilibrium: 2,
        ..GameConfig::default()
    };
    let name = format!("coopfight_events_{}_net_adl_lpb_nx10_ny10", config.fragment());
    write(&dir.path().join(format!("{}.json", name)), EVENTS);

    let t_equilibrium = decode_game(&name)["t_equilibrium"].as_f64().unwrap() as usize;
    assert_eq!(t_equilibrium, 2);

    // Loading without the extension finds the .json file
    let results = load_fight_results(dir.path().join(&name)).unwrap();
    assert_eq!(results.len(), 2);

    let table = assemble_fight_events_to_table(&results, t_equilibrium);
    let columns = assemble_fight_events_to_columns(&results, t_equilibrium);
    assert_eq!(table.len(), 2);
    assert_eq!(columns.time, vec![10, 10]);

    let wf = compute_win_fractions(&table);
    assert_eq!(wf.time, vec![10]);
    assert_relative_eq!(wf.series(Strategy::Cooperator).unwrap()[0], 1.0);
    assert_relative_eq!(wf.series(Strategy::Defector).unwrap()[0], 0.0);
    assert_relative_eq!(wf.series(Strategy::Fighter).unwrap()[0], 1.0);

    let csv_path = dir.path().join("events.csv");
    table.write_csv(&csv_path).unwrap();
    let exported = fs::read_to_string(&csv_path).unwrap();
    let mut lines = exported.lines();
    assert_eq!(
        lines.next(),
        Some(
            "investment_focal,investment_enemy,resources_focal,resources_enemy,\
             strategy_focal,strategy_enemy,time,winner"
        )
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn locator_reads_generator_layout() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("coopfight");
    fs::create_dir_all(&project).unwrap();
    let paths = NetrustPaths::from_project_root(&project);

    write(
        &paths.config_file,
        r#"{
            "BarabasiAlbert": {"size": 10.0, "average_degree": 4},
            "LatticePBC": {"nxcells": 100, "nycells": 100.0}
        }"#,
    );
    for name in [
        "net_nro_ba_n10_k4_001.json",
        "net_nro_ba_n10_k4_002.json",
        "net_nro_er_n10_k4_001.json",
        "net_adl_ba_n10_k4_001.json",
    ] {
        write(&paths.networks_dir.join(name), "{}");
    }

    let found = collect_network_filenames(
        &paths,
        NetworkModel::BarabasiAlbert,
        NetworkFormat::NetrustObject,
    )
    .unwrap();
    assert_eq!(
        found,
        vec!["net_nro_ba_n10_k4_001.json", "net_nro_ba_n10_k4_002.json"]
    );

    let none = collect_network_filenames(
        &paths,
        NetworkModel::LatticePBC,
        NetworkFormat::AdjacencyList,
    )
    .unwrap();
    assert!(none.is_empty());

    let err = collect_network_filenames(
        &paths,
        NetworkModel::WattsStrogatz,
        NetworkFormat::NetrustObject,
    )
    .unwrap_err();
    assert!(matches!(err, Error::ModelNotConfigured { .. }));
}

#[test]
fn missing_model_parameter_surfaces_as_naming_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = NetrustPaths {
        config_file: dir.path().join("config_network.json"),
        networks_dir: dir.path().to_path_buf(),
    };
    write(&paths.config_file, r#"{"Lattice": {"nxcells": 10}}"#);

    let err =
        collect_network_filenames(&paths, NetworkModel::Lattice, NetworkFormat::NetrustObject)
            .unwrap_err();
    assert!(matches!(err, Error::Naming(_)));
}

#[test]
fn sweep_csv_to_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coopfight_global_100.csv");
    write(
        &path,
        "fraction_cooperators,fraction_defectors,fraction_fighters,payoff_cooperators,\
payoff_defectors,payoff_fighters,fraction_investment,parameter_noise,parameter_technology,\
payoff_defection,rate_consumption,uuid
0.5,0.3,0.2,1,1,1,0.1,0.1,0.5,1.2,0,a1
0.4,0.4,0.2,1,1,1,0.2,0.1,0.5,1.2,0,b2
0.1,0.8,0.1,1,1,1,0.1,0.1,0.5,1.5,0,c3
0.9,0.0,0.1,1,1,1,0.1,0.2,0.5,1.5,0,d4
",
    );

    let table = ParameterTable::from_csv_path(&path).unwrap();
    assert_eq!(table.len(), 4);
    assert!(!table.has_column("uuid"));

    let filters: BTreeMap<String, f64> = [
        ("rate_consumption", 0.0),
        ("parameter_noise", 0.1),
        ("parameter_technology", 0.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let grid = build_2d_array(
        &table,
        "fraction_cooperators",
        "payoff_defection",
        "fraction_investment",
        &filters,
    )
    .unwrap();

    assert_eq!(grid.control_1_values, vec![1.2, 1.5]);
    assert_eq!(grid.control_2_values, vec![0.1, 0.2]);
    assert_relative_eq!(grid.values[0][0], 0.5);
    assert_relative_eq!(grid.values[0][1], 0.4);
    assert_relative_eq!(grid.values[1][0], 0.1);
    assert!(grid.values[1][1].is_nan());
}

#[test]
fn decoded_fragment_keeps_text_fields() {
    let fragment = GameConfig::default().fragment();
    let decoded = decode_game(&fragment);
    assert_eq!(
        decoded["model_distribution_resources"],
        ParamValue::Text("Uniform".to_string())
    );
    assert_eq!(decoded["nsims"], ParamValue::Int(30));
}
