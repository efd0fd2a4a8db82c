//! A 2-D robot on a 5 x 5 grid driven to the top-right corner.
//!
//! Run with `cargo run --example robot2d`.

use std::fmt::Write as _;
use std::sync::Arc;
use std::thread;

use log::info;
use symloop::builder::ClosedLoopBuilder;
use symloop::core::{Quantizer, Symbol};
use symloop::dynamics::Dynamics;
use symloop::machine::{Controller, Machine};
use symloop::model::{ConsistencyChecker, RegionMembership, SymbolicModel};
use symloop::node::{BackPressure, ControllerNode, DeliveryQueue};

const SIDE: u64 = 5;

// Control symbols over the grid {-1, 0, 1}^2.
const RIGHT: Symbol = 5;
const UP: Symbol = 7;
const HOLD: Symbol = 4;

fn policy(x: Symbol) -> Symbol {
    match (x % SIDE, x / SIDE) {
        (ix, _) if ix + 1 < SIDE => RIGHT,
        (_, iy) if iy + 1 < SIDE => UP,
        _ => HOLD,
    }
}

fn machine_text() -> Result<String, std::fmt::Error> {
    let n = SIDE * SIDE;
    let mut text = format!("semantic: mealy\nstates: 1\nstate_transitions: {}\n", n);
    for s in 0..n {
        writeln!(text, "trans_0_{}: {{0;{};[{}]}}", s, s, policy(s))?;
    }
    Ok(text)
}

fn model_dump(xq: &Quantizer, uq: &Quantizer) -> Result<String, Box<dyn std::error::Error>> {
    let mut text = String::new();
    for x in 0..xq.num_symbols() {
        let center = xq.flat_to_conc(x)?;
        for u in 0..uq.num_symbols() {
            let control = uq.flat_to_conc(u)?;
            let post: Vec<String> = center
                .iter()
                .zip(&control)
                .map(|(c, v)| format!("[{},{}]", c + v - 0.2, c + v + 0.2))
                .collect();
            writeln!(text, "[x_{}, u_{}] => {}", x, u, post.join("x"))?;
        }
    }
    Ok(text)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let last = (SIDE - 1) as f64;
    let xq = Quantizer::new(vec![0.0, 0.0], vec![1.0, 1.0], vec![last, last])?;
    let uq = Quantizer::new(vec![-1.0, -1.0], vec![1.0, 1.0], vec![1.0, 1.0])?;
    let machine: Machine = machine_text()?.parse()?;
    let model = SymbolicModel::parse(&model_dump(&xq, &uq)?, xq.num_symbols(), uq.num_symbols())?;

    // Simulated clock ticks at 60 Hz; the controller runs every 0.5 s.
    let mut cl = ClosedLoopBuilder::new()
        .state_quantizer(xq)
        .control_quantizer(uq)
        .controller(Controller::new(machine.clone()))
        .dynamics(Dynamics::ode(|_x: &[f64], u: &[f64]| vec![2.0 * u[0], 2.0 * u[1]], 5)?)
        .consistency_checker(ConsistencyChecker::new(model, RegionMembership::FirstBox))
        .period(0.5)
        .initial_state(vec![0.0, 0.0])
        .warmup_ticks(10)
        .tail_length(4)
        .build()?;

    for record in cl.run_periods(10, 1.0 / 60.0)? {
        info!(
            "period {}: x_{} -> u_{} {:?}, {} ticks, landed at {:?}{}",
            record.index,
            record.x_symbol,
            record.u_symbol,
            record.control,
            record.substeps,
            record.post_state,
            if record.repaired { " (repaired)" } else { "" }
        );
    }
    if let Some(report) = cl.report() {
        info!(
            "{} checks, {} consistency violations",
            report.checks(),
            report.count()
        );
    }
    info!("last segments: {:?}", cl.tail().get_path());

    // The same controller behind a message queue.
    let queue = Arc::new(DeliveryQueue::new(8, BackPressure::DropOldest));
    let publisher = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut published = 0;
            while published < 4 {
                match queue.pop() {
                    Some(delivery) => {
                        info!("publish {}", delivery);
                        published += 1;
                    }
                    None => thread::yield_now(),
                }
            }
        })
    };

    let mut node = ControllerNode::new(Controller::new(machine), queue);
    for observation in ["0", "4", "9", "24"] {
        node.on_observation(observation)?;
    }
    publisher
        .join()
        .map_err(|_| "publisher thread panicked")?;

    Ok(())
}
