#![allow(non_snake_case)]

#[macro_use]
extern crate log;

use std::path;
use std::sync::Arc;
use crate::monitor::Monitor;
use crate::sat::minisat::{CoreSettings, CoreSolver};
use crate::session::Session;
use crate::session::ledger::{BatchLedger, IncrementalLedger};

pub mod error;
pub mod ipc;
pub mod monitor;
pub mod sat;
pub mod session;
mod util;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Mode {
    // One live engine absorbs every clause as it arrives.
    Incremental,
    // Clauses are collected and replayed into a fresh engine per solve.
    Batch,
}


pub struct MainOptions {
    pub mode: Mode,
    pub endpoint: path::PathBuf,
}


/// Binds the endpoint and serves one session until it is finished.
pub fn run(options: MainOptions, settings: CoreSettings, monitor: Arc<Monitor>) -> error::Result<()> {
    let mut endpoint = ipc::Endpoint::bind(&options.endpoint)?;
    info!("Listening on {} ({:?} mode)", ipc::address(endpoint.path()), options.mode);

    match options.mode {
        Mode::Incremental => {
            let solver = CoreSolver::with_monitor(settings, monitor);
            Session::new(IncrementalLedger::new(solver)).serve(&mut endpoint)
        }

        Mode::Batch => {
            let engine_monitor = monitor.clone();
            let ledger = BatchLedger::new(move || CoreSolver::with_monitor(settings.clone(), engine_monitor.clone()))
                .with_monitor(monitor);
            Session::new(ledger).serve(&mut endpoint)
        }
    }
}
