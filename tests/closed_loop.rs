//! End-to-end runs of a 2-D robot on a 4 x 4 grid.
//!
//! The controller drives right until the last column, then up until the
//! last row, then holds still.

use std::fmt::Write as _;
use std::fs;
use symloop::builder::{BuildError, ClosedLoopBuilder};
use symloop::config::{LoopConfig, SetupError};
use symloop::core::{Quantizer, QuantizerError, Symbol};
use symloop::driver::{ClosedLoop, LoopError, Phase};
use symloop::dynamics::Dynamics;
use symloop::machine::{Controller, MachineError};
use symloop::model::{ConsistencyChecker, ModelError, RegionMembership, SymbolicModel};

const RIGHT: Symbol = 5;
const UP: Symbol = 7;
const HOLD: Symbol = 4;

fn state_grid() -> Quantizer {
    Quantizer::new(vec![0.0, 0.0], vec![1.0, 1.0], vec![3.0, 3.0]).unwrap()
}

fn control_grid() -> Quantizer {
    Quantizer::new(vec![-1.0, -1.0], vec![1.0, 1.0], vec![1.0, 1.0]).unwrap()
}

fn policy(x_symbol: Symbol) -> Symbol {
    let (ix, iy) = (x_symbol % 4, x_symbol / 4);
    if ix < 3 {
        RIGHT
    } else if iy < 3 {
        UP
    } else {
        HOLD
    }
}

fn machine_text(policy: impl Fn(Symbol) -> Symbol, skip: Option<Symbol>) -> String {
    let symbols: Vec<Symbol> = (0..16).filter(|s| Some(*s) != skip).collect();
    let mut text = format!(
        "semantic: mealy\nstates: 1\nstate_transitions: {{{},}}\n",
        symbols.len()
    );
    for (t, s) in symbols.iter().enumerate() {
        writeln!(text, "trans_0_{}: {{0;{};[{}]}}", t, s, policy(*s)).unwrap();
    }
    text
}

// Post regions of half-width `slack` around `x + u`, shifted by `bias`.
fn dump_text(slack: f64, bias: f64) -> String {
    let (xq, uq) = (state_grid(), control_grid());
    let mut text = String::new();
    for x in 0..xq.num_symbols() {
        let center = xq.flat_to_conc(x).unwrap();
        for u in 0..uq.num_symbols() {
            let control = uq.flat_to_conc(u).unwrap();
            let px = center[0] + control[0] + bias;
            let py = center[1] + control[1];
            writeln!(
                text,
                "[x_{}, u_{}] => [{},{}]x[{},{}]",
                x,
                u,
                px - slack,
                px + slack,
                py - slack,
                py + slack
            )
            .unwrap();
        }
    }
    text
}

fn controller(text: &str) -> Controller {
    Controller::new(text.parse().unwrap())
}

fn velocity(_x: &[f64], u: &[f64]) -> Vec<f64> {
    vec![u[0], u[1]]
}

fn robot(dynamics: Dynamics, checker: Option<ConsistencyChecker>) -> ClosedLoop {
    let mut builder = ClosedLoopBuilder::new()
        .state_quantizer(state_grid())
        .control_quantizer(control_grid())
        .controller(controller(&machine_text(policy, None)))
        .dynamics(dynamics)
        .period(1.0)
        .initial_state(vec![0.0, 0.0])
        .tail_length(10);
    if let Some(checker) = checker {
        builder = builder.consistency_checker(checker);
    }
    builder.build().unwrap()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
    }
}

#[test]
fn ode_robot_reaches_the_corner() {
    let mut cl = robot(Dynamics::ode(velocity, 5).unwrap(), None);

    let records = cl.run_periods(8, 0.25).unwrap();
    let actions: Vec<Symbol> = records.iter().map(|r| r.u_symbol).collect();
    assert_eq!(actions, vec![RIGHT, RIGHT, RIGHT, UP, UP, UP, HOLD, HOLD]);

    assert_close(cl.state(), &[3.0, 3.0]);
    assert_eq!(cl.current_symbol().unwrap(), 15);
    assert_eq!(cl.periods_completed(), 8);
    assert!((cl.sim_time() - 8.0).abs() < 1e-9);
    assert_eq!(cl.controller().queries(), 8);
    assert_eq!(cl.last_action(), Some((HOLD, &[0.0, 0.0][..])));
}

#[test]
fn discrete_robot_matches_ode_robot() {
    let mut ode = robot(Dynamics::ode(velocity, 5).unwrap(), None);
    let mut discrete = robot(
        Dynamics::discrete(|x: &[f64], u: &[f64]| vec![x[0] + u[0], x[1] + u[1]]),
        None,
    );

    let a = ode.run_periods(6, 0.3).unwrap();
    let b = discrete.run_periods(6, 0.3).unwrap();
    for (ra, rb) in a.iter().zip(&b) {
        assert_eq!(ra.x_symbol, rb.x_symbol);
        assert_eq!(ra.u_symbol, rb.u_symbol);
        assert_close(&ra.post_state, &rb.post_state);
    }
}

#[test]
fn consistent_run_reports_no_violations() {
    let model = SymbolicModel::parse(&dump_text(0.25, 0.0), 16, 9).unwrap();
    let checker = ConsistencyChecker::new(model, RegionMembership::FirstBox);
    let mut cl = robot(Dynamics::ode(velocity, 5).unwrap(), Some(checker));

    let records = cl.run_periods(8, 0.25).unwrap();
    assert!(records.iter().all(|r| !r.repaired));

    let report = cl.report().unwrap();
    assert_eq!(report.checks(), 8);
    assert!(report.is_clean());
}

#[test]
fn drifting_run_is_snapped_back() {
    // The model claims every move ends 0.5 further right than it does.
    let model = SymbolicModel::parse(&dump_text(0.1, 0.5), 16, 9).unwrap();
    let checker = ConsistencyChecker::new(model, RegionMembership::FirstBox);
    let mut cl = robot(Dynamics::ode(velocity, 5).unwrap(), Some(checker));

    let record = cl.run_periods(1, 0.25).unwrap().remove(0);
    assert!(record.repaired);
    assert_close(&record.post_state, &[1.5, 0.0]);
    assert_close(cl.state(), &[1.5, 0.0]);

    let report = cl.report().unwrap();
    assert_eq!(report.count(), 1);
    let violation = &report.violations()[0];
    assert_eq!((violation.x_symbol, violation.u_symbol), (0, RIGHT));
    assert_close(&violation.simulated, &[1.0, 0.0]);
    assert_close(&violation.repaired, &[1.5, 0.0]);

    let path = cl.tail().get_path();
    assert_close(path[0], &[0.0, 0.0]);
    assert_close(path[1], &[1.5, 0.0]);
}

#[test]
fn union_regions_depend_on_membership_policy() {
    // First box is wrong, second box holds the true post-state.
    let dump: String = dump_text(0.1, 0.0)
        .lines()
        .map(|line| {
            let (key, region) = line.split_once("=>").unwrap();
            format!("{}=> [10,11]x[10,11] U {}\n", key, region.trim())
        })
        .collect();
    let model = SymbolicModel::parse(&dump, 16, 9).unwrap();

    let mut first_box = robot(
        Dynamics::ode(velocity, 5).unwrap(),
        Some(ConsistencyChecker::new(model.clone(), RegionMembership::FirstBox)),
    );
    let record = first_box.run_periods(1, 0.5).unwrap().remove(0);
    assert!(record.repaired);
    assert_close(&record.post_state, &[10.5, 10.5]);

    let mut union = robot(
        Dynamics::ode(velocity, 5).unwrap(),
        Some(ConsistencyChecker::new(model, RegionMembership::Union)),
    );
    let record = union.run_periods(1, 0.5).unwrap().remove(0);
    assert!(!record.repaired);
    assert_close(&record.post_state, &[1.0, 0.0]);
}

#[test]
fn unknown_symbol_stops_the_run() {
    // No transition for cell (2, 0).
    let mut cl = ClosedLoopBuilder::new()
        .state_quantizer(state_grid())
        .control_quantizer(control_grid())
        .controller(controller(&machine_text(policy, Some(2))))
        .dynamics(Dynamics::ode(velocity, 5).unwrap())
        .period(1.0)
        .initial_state(vec![0.0, 0.0])
        .build()
        .unwrap();

    cl.run_periods(2, 0.5).unwrap();
    let err = cl.run_periods(1, 0.5).unwrap_err();
    assert!(matches!(
        err,
        LoopError::Machine(MachineError::ControlActionNotFound {
            state: 0,
            symbol: 2
        })
    ));
    assert_eq!(cl.phase(), Phase::AwaitingAction);
    assert_close(cl.state(), &[2.0, 0.0]);
}

#[test]
fn leaving_the_grid_is_reported() {
    // Keeps pushing right past the last column.
    let mut cl = ClosedLoopBuilder::new()
        .state_quantizer(state_grid())
        .control_quantizer(control_grid())
        .controller(controller(&machine_text(|_| RIGHT, None)))
        .dynamics(Dynamics::ode(velocity, 5).unwrap())
        .period(1.0)
        .initial_state(vec![0.0, 0.0])
        .build()
        .unwrap();

    cl.run_periods(4, 0.5).unwrap();
    assert_close(cl.state(), &[4.0, 0.0]);
    let err = cl.tick(0.5).unwrap_err();
    assert!(matches!(
        err,
        LoopError::Quantizer(QuantizerError::QuantizationOutOfRange { dim: 0, .. })
    ));
}

#[test]
fn config_files_set_up_a_run() {
    let dir = std::env::temp_dir().join(format!("symloop-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    let machine_path = dir.join("robot.mdf");
    let dump_path = dir.join("robot_model.txt");
    fs::write(&machine_path, machine_text(policy, None)).unwrap();
    fs::write(&dump_path, dump_text(0.25, 0.0)).unwrap();

    let config_json = serde_json::json!({
        "states":   { "first_symbol": [0, 0], "last_symbol": [3, 3], "quantizers": [1, 1] },
        "controls": { "first_symbol": [-1, -1], "last_symbol": [1, 1], "quantizers": [1, 1] },
        "dynamics": { "step_time": 1.0, "use_ode": true },
        "simulation": {
            "initial_set": "[-0.5,0.5]x[-0.5,0.5]",
            "initial_state": "center",
            "path_tail_length": 3,
            "warmup_ticks": 2
        },
        "controller_file": machine_path,
        "model_dump_file": dump_path
    });
    let config_path = dir.join("robot.json");
    fs::write(&config_path, config_json.to_string()).unwrap();

    let config = LoopConfig::from_file(&config_path).unwrap();
    let mut cl = ClosedLoopBuilder::from_config(&config, velocity)
        .unwrap()
        .build()
        .unwrap();

    // Two warm-up ticks, then four ticks per period.
    for _ in 0..2 {
        assert!(cl.tick(0.25).unwrap().completed.is_none());
    }
    assert_eq!(cl.controller().queries(), 0);
    let records = cl.run_periods(8, 0.25).unwrap();
    assert_eq!(records.last().unwrap().x_symbol, 15);
    assert_close(cl.state(), &[3.0, 3.0]);
    assert!(cl.report().unwrap().is_clean());
    assert_eq!(cl.tail().len(), 3);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_config_lists_every_problem() {
    let config = LoopConfig::from_json_str(
        r#"{
            "states":   { "first_symbol": [0, 0], "last_symbol": [3], "quantizers": [1, 1] },
            "controls": { "first_symbol": [-1], "last_symbol": [1], "quantizers": [-1] },
            "dynamics": { "step_time": -1.0 },
            "simulation": { "initial_set": "[0,1]x[0,1]" },
            "controller_file": "missing.mdf"
        }"#,
    )
    .unwrap();

    match ClosedLoopBuilder::from_config(&config, velocity) {
        Err(SetupError::Invalid(errors)) => assert_eq!(errors.len(), 3),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("invalid config was accepted"),
    }
}

#[test]
fn missing_controller_file_is_an_io_error() {
    let config = LoopConfig::from_json_str(
        r#"{
            "states":   { "first_symbol": [0, 0], "last_symbol": [3, 3], "quantizers": [1, 1] },
            "controls": { "first_symbol": [-1, -1], "last_symbol": [1, 1], "quantizers": [1, 1] },
            "dynamics": { "step_time": 1.0 },
            "simulation": { "initial_set": "[0,1]x[0,1]" },
            "controller_file": "/nonexistent/symloop/robot.mdf"
        }"#,
    )
    .unwrap();

    assert!(matches!(
        ClosedLoopBuilder::from_config(&config, velocity),
        Err(SetupError::Machine(MachineError::Io(_)))
    ));
}

#[test]
fn model_dump_of_the_wrong_dimension_is_rejected() {
    // Every cell covered, but regions are intervals on a planar state.
    let mut dump = String::new();
    for x in 0..16 {
        for u in 0..9 {
            writeln!(dump, "[x_{}, u_{}] => [5,6]", x, u).unwrap();
        }
    }
    let dir = std::env::temp_dir().join(format!("symloop-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    let machine_path = dir.join("robot.mdf");
    let dump_path = dir.join("robot_model.txt");
    fs::write(&machine_path, machine_text(policy, None)).unwrap();
    fs::write(&dump_path, &dump).unwrap();

    let config = LoopConfig::from_json_str(
        &serde_json::json!({
            "states":   { "first_symbol": [0, 0], "last_symbol": [3, 3], "quantizers": [1, 1] },
            "controls": { "first_symbol": [-1, -1], "last_symbol": [1, 1], "quantizers": [1, 1] },
            "dynamics": { "step_time": 1.0 },
            "simulation": { "initial_set": "[0,1]x[0,1]" },
            "controller_file": machine_path,
            "model_dump_file": dump_path
        })
        .to_string(),
    )
    .unwrap();
    let from_config = ClosedLoopBuilder::from_config(&config, velocity);

    let model = SymbolicModel::parse(&dump, 16, 9).unwrap();
    let built = ClosedLoopBuilder::new()
        .state_quantizer(state_grid())
        .control_quantizer(control_grid())
        .controller(controller(&machine_text(policy, None)))
        .dynamics(Dynamics::ode(velocity, 5).unwrap())
        .consistency_checker(ConsistencyChecker::new(model, RegionMembership::FirstBox))
        .period(1.0)
        .initial_state(vec![0.0, 0.0])
        .build();

    fs::remove_dir_all(&dir).unwrap();
    assert!(matches!(
        from_config,
        Err(SetupError::Model(ModelError::DimensionMismatch {
            expected: 2,
            found: 1
        }))
    ));
    assert!(matches!(
        built,
        Err(BuildError::ModelDimension {
            expected: 2,
            found: 1
        })
    ));
}
