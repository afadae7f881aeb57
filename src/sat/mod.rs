use std::ops;
use thiserror::Error;
use crate::sat::formula::{LBool, Lit, Var};

pub mod dimacs;
pub mod formula;
pub mod minisat;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveRes {
    SAT,
    UnSAT,
    // Resource budget ran out before an answer was found.
    Unknown,
}


#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    #[error("clause memory limit exceeded")]
    OutOfMemory,

    #[error("literal refers to unknown variable {0:?}")]
    UnknownVar(Var),
}


#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Stats {
    pub solves: u64,
    pub restarts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub tot_literals: u64,
    pub del_literals: u64,
}

impl ops::Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        Stats {
            solves: self.solves + other.solves,
            restarts: self.restarts + other.restarts,
            decisions: self.decisions + other.decisions,
            rnd_decisions: self.rnd_decisions + other.rnd_decisions,
            conflicts: self.conflicts + other.conflicts,
            propagations: self.propagations + other.propagations,
            tot_literals: self.tot_literals + other.tot_literals,
            del_literals: self.del_literals + other.del_literals,
        }
    }
}


/// The narrow interface the session layer needs from an incremental SAT engine.
pub trait Solver {
    fn nVars(&self) -> usize;
    fn nClauses(&self) -> usize;
    fn newVar(&mut self, upol: Option<bool>, dvar: bool) -> Var;

    /// Adds a clause whose variables must already exist. Returns `Ok(false)`
    /// once the clause set is known to be unsatisfiable.
    fn addClause(&mut self, clause: &[Lit]) -> Result<bool, SolverError> {
        if let Some(lit) = clause.iter().find(|lit| lit.var().index() >= self.nVars()) {
            return Err(SolverError::UnknownVar(lit.var()));
        }
        self.addClauseUnchecked(clause)
    }

    /// Same as `addClause` without the variable check; used when replaying
    /// clauses into an engine whose variable count was grown beforehand.
    fn addClauseUnchecked(&mut self, clause: &[Lit]) -> Result<bool, SolverError>;

    fn simplify(&mut self) -> bool;

    // Engines without variable elimination keep the default.
    fn eliminate(&mut self, _turn_off_elim: bool) -> bool {
        true
    }

    fn solveLimited(&mut self, assumptions: &[Lit]) -> Result<SolveRes, SolverError>;

    /// Value of `v` in the last model, `Undef` if there is none or `v` is unknown.
    fn modelValue(&self, v: Var) -> LBool;

    fn stats(&self) -> Stats;
}
