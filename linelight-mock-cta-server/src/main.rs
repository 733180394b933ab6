//! Mock CTA Train Tracker positions feed
//!
//! Usage: cargo run -p linelight-mock-cta-server
//! Then point the daemon at it: linelight --url http://127.0.0.1:8400/api/1.0/ttpositions.aspx
//!
//! Serves deterministic simulated Blue Line runs so the strip can be
//! exercised without an API key or a live network. Each run advances one
//! station per step period and toggles between "between stations" and
//! "approaching" at half-steps, wrapping at the terminals so the demo
//! runs forever.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use linelight_cta_lib::{Envelope, PositionsResponse, Route, Train};
use linelight_tracker_lib::{Direction, Topology};

#[derive(Debug, Parser)]
#[command(name = "linelight-mock-cta", about = "Mock CTA positions feed")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8400)]
    port: u16,
    /// Seconds for a simulated train to advance one station
    #[arg(long, default_value_t = 10)]
    step_secs: u64,
}

/// One simulated run on the line.
struct SimRun {
    run_number: &'static str,
    destination_id: &'static str,
    destination_name: &'static str,
    direction: Direction,
    /// Station index (strip order) the run's next station starts at
    start_index: usize,
}

/// A spread of runs that exercises every classification path: both
/// directions, a branch turn-back, and a 5000-series Cermak run.
const RUNS: &[SimRun] = &[
    SimRun {
        run_number: "130",
        destination_id: "30171",
        destination_name: "O'Hare",
        direction: Direction::Northbound,
        start_index: 2,
    },
    SimRun {
        run_number: "223",
        destination_id: "30077",
        destination_name: "Forest Park",
        direction: Direction::Southbound,
        start_index: 30,
    },
    SimRun {
        run_number: "318",
        destination_id: "30077",
        destination_name: "Forest Park",
        direction: Direction::Southbound,
        start_index: 18,
    },
    SimRun {
        run_number: "141",
        destination_id: "30247",
        destination_name: "Jefferson Park",
        direction: Direction::Northbound,
        start_index: 12,
    },
];

struct Sim {
    topology: Topology,
    started: Instant,
    step_secs: u64,
}

impl Sim {
    /// Train records at `elapsed_secs` into the simulation.
    fn trains_at(&self, elapsed_secs: u64) -> Vec<Train> {
        let n = self.topology.len();
        let half_steps = elapsed_secs * 2 / self.step_secs;
        let advanced = (half_steps / 2) as usize % n;
        let approaching = half_steps % 2 == 1;

        RUNS.iter()
            .map(|run| {
                let index = match run.direction {
                    Direction::Northbound => (run.start_index + advanced) % n,
                    Direction::Southbound => (run.start_index + n - advanced) % n,
                };
                let station = &self.topology.stations()[index];
                Train {
                    run_number: run.run_number.to_string(),
                    destination_id: run.destination_id.to_string(),
                    destination_name: run.destination_name.to_string(),
                    direction: match run.direction {
                        Direction::Northbound => "1",
                        Direction::Southbound => "5",
                    }
                    .to_string(),
                    next_station_id: station.id.clone(),
                    next_station_name: station.name.clone(),
                    approaching: if approaching { "1" } else { "0" }.to_string(),
                }
            })
            .collect()
    }

    fn response_at(&self, elapsed_secs: u64) -> PositionsResponse {
        PositionsResponse {
            ctatt: Envelope {
                timestamp: None,
                error_code: "0".to_string(),
                error_name: None,
                route: vec![Route {
                    name: Some("blue".to_string()),
                    train: self.trains_at(elapsed_secs),
                }],
            },
        }
    }
}

async fn positions(State(sim): State<Arc<Sim>>) -> Json<PositionsResponse> {
    Json(sim.response_at(sim.started.elapsed().as_secs()))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let sim = Arc::new(Sim {
        topology: Topology::blue_line(),
        started: Instant::now(),
        // A step shorter than 2s never yields a "between stations" phase
        step_secs: args.step_secs.max(2),
    });

    let app = Router::new()
        .route("/api/1.0/ttpositions.aspx", get(positions))
        .with_state(sim);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    println!("Mock CTA positions feed on http://{addr}/api/1.0/ttpositions.aspx");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
