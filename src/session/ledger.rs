use std::path::Path;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::sat::{dimacs, SolveRes, Solver};
use crate::sat::formula::Lit;
use super::model::Model;


pub enum Outcome {
    Sat(Model),
    Unsat,
    Unknown,
}


/// Where the accumulated problem lives between solves.
pub trait Ledger {
    /// Splits one add-clauses field into clauses.
    fn decode_clauses(&self, field: &str) -> Result<Vec<Vec<Lit>>>;

    fn add_clause(&mut self, lits: &[Lit]) -> Result<()>;

    /// Reads a DIMACS file into the ledger, returning the number of clauses read.
    fn load_file(&mut self, path: &Path) -> Result<usize>;

    fn simplify(&mut self);

    fn solve(&mut self) -> Result<Outcome>;

    fn n_vars(&self) -> usize;

    fn n_clauses(&self) -> usize;

    /// The whole problem in DIMACS format.
    fn output(&self) -> String;
}


fn outcome<S: Solver>(res: SolveRes, solver: &S) -> Outcome {
    match res {
        SolveRes::SAT => Outcome::Sat(Model::capture(solver)),
        SolveRes::UnSAT => Outcome::Unsat,
        SolveRes::Unknown => Outcome::Unknown,
    }
}


/// Feeds every clause straight into one long-lived engine and keeps a DIMACS log of them.
pub struct IncrementalLedger<S> {
    solver: S,
    log: String,
    n_clauses: usize,
}

impl<S: Solver> IncrementalLedger<S> {
    pub fn new(solver: S) -> Self {
        IncrementalLedger {
            solver,
            log: String::new(),
            n_clauses: 0,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

impl<S: Solver> Ledger for IncrementalLedger<S> {
    fn decode_clauses(&self, field: &str) -> Result<Vec<Vec<Lit>>> {
        dimacs::parse_clauses(field)
    }

    fn add_clause(&mut self, lits: &[Lit]) -> Result<()> {
        dimacs::ensure_vars(&mut self.solver, lits);
        if !self.solver.addClause(lits)? {
            trace!("Clause set is unsatisfiable");
        }
        dimacs::write_clause(&mut self.log, lits);
        self.n_clauses += 1;
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<usize> {
        // The engine only sees the file once all of it has parsed.
        let mut clauses = Vec::new();
        dimacs::parse_file(path, |lits| {
            clauses.push(lits);
            Ok(())
        })?;
        for lits in clauses.iter() {
            self.add_clause(lits)?;
        }
        Ok(clauses.len())
    }

    fn simplify(&mut self) {
        if !self.solver.simplify() {
            info!("Simplify proved the clause set unsatisfiable");
        }
    }

    fn solve(&mut self) -> Result<Outcome> {
        self.solver.eliminate(true);
        let res = self.solver.solveLimited(&[])?;
        Ok(outcome(res, &self.solver))
    }

    fn n_vars(&self) -> usize {
        self.solver.nVars()
    }

    fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    fn output(&self) -> String {
        dimacs::write_problem(self.solver.nVars(), self.n_clauses, &self.log)
    }
}


/// Keeps the clauses in memory and replays them into a fresh engine for every solve.
pub struct BatchLedger<F> {
    factory: F,
    clauses: Vec<Vec<Lit>>,
    n_vars: usize,
    monitor: Option<Arc<Monitor>>,
}

impl<S: Solver, F: FnMut() -> S> BatchLedger<F> {
    pub fn new(factory: F) -> Self {
        BatchLedger {
            factory,
            clauses: Vec::new(),
            n_vars: 0,
            monitor: None,
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }
}

impl<S: Solver, F: FnMut() -> S> Ledger for BatchLedger<F> {
    fn decode_clauses(&self, field: &str) -> Result<Vec<Vec<Lit>>> {
        dimacs::parse_clause(field).map(|clause| vec![clause])
    }

    fn add_clause(&mut self, lits: &[Lit]) -> Result<()> {
        if let Some(max) = lits.iter().map(|lit| lit.var().index() + 1).max() {
            self.n_vars = self.n_vars.max(max);
        }
        self.clauses.push(lits.to_vec());
        Ok(())
    }

    fn load_file(&mut self, _: &Path) -> Result<usize> {
        Err(Error::NotSupported)
    }

    // No engine lives between solves.
    fn simplify(&mut self) {}

    fn solve(&mut self) -> Result<Outcome> {
        let mut solver = (self.factory)();
        while solver.nVars() < self.n_vars {
            solver.newVar(None, true);
        }

        for clause in self.clauses.iter() {
            if !solver.addClauseUnchecked(clause)? {
                break;
            }
        }

        solver.eliminate(true);
        let res = solver.solveLimited(&[])?;
        let outcome = outcome(res, &solver);

        if let Some(ref monitor) = self.monitor {
            monitor.publish(solver.stats());
            monitor.retire();
        }
        Ok(outcome)
    }

    fn n_vars(&self) -> usize {
        self.n_vars
    }

    fn n_clauses(&self) -> usize {
        self.clauses.len()
    }

    fn output(&self) -> String {
        let mut body = String::new();
        for clause in self.clauses.iter() {
            dimacs::write_clause(&mut body, clause);
        }
        dimacs::write_problem(self.n_vars, self.clauses.len(), &body)
    }
}
