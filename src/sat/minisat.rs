use std::sync::Arc;
use crate::monitor::Monitor;
use crate::sat::{SolveRes, Solver, SolverError, Stats};
use crate::sat::formula::{LBool, Lit, Var};
pub use self::search::clause_db::ClauseDBSettings;
pub use self::search::conflict::CCMinMode;
pub use self::search::decision_heuristic::{DecisionHeuristicSettings, PhaseSaving};
pub use self::search::{LearningStrategy, RestartStrategy, SearchSettings, SearcherSettings};
use self::search::*;
use self::budget::Budget;

mod budget;
mod search;


#[derive(Clone, Default, Debug)]
pub struct CoreSettings {
    pub heur: DecisionHeuristicSettings,
    pub db: ClauseDBSettings,
    pub ccmin_mode: CCMinMode,
    pub search: SearchSettings,
    pub core: SearcherSettings,
    pub conflict_budget: Option<u64>, // Conflicts allowed per solve call before giving up with 'Unknown'.
}


/// MiniSat's core CDCL engine, without variable elimination.
pub struct CoreSolver {
    ok: bool, // If false, the constraints are already unsatisfiable. No part of the solver state may be used!
    ss: SearchSettings,
    conflict_budget: Option<u64>,
    search: Searcher,
    model: Vec<LBool>,
}

impl Solver for CoreSolver {
    fn nVars(&self) -> usize {
        self.search.number_of_vars()
    }

    fn nClauses(&self) -> usize {
        self.search.number_of_clauses()
    }

    fn newVar(&mut self, upol: Option<bool>, dvar: bool) -> Var {
        self.search.newVar(upol, dvar)
    }

    fn addClauseUnchecked(&mut self, clause: &[Lit]) -> Result<bool, SolverError> {
        if self.ok {
            if let AddClauseRes::UnSAT = self.search.addClause(clause)? {
                self.ok = false;
            }
        }
        Ok(self.ok)
    }

    fn simplify(&mut self) -> bool {
        if self.ok {
            self.ok = self.search.simplify();
        }
        self.ok
    }

    fn solveLimited(&mut self, assumptions: &[Lit]) -> Result<SolveRes, SolverError> {
        self.model.clear();
        if !self.ok {
            return Ok(SolveRes::UnSAT);
        }

        let budget = Budget::conflicts(self.search.number_of_conflicts(), self.conflict_budget);
        match self.search.search(&self.ss, &budget, assumptions)? {
            SearchRes::SAT(model) => {
                self.model = model;
                Ok(SolveRes::SAT)
            }

            SearchRes::UnSAT => {
                self.ok = false;
                Ok(SolveRes::UnSAT)
            }

            SearchRes::AssumpsConfl => Ok(SolveRes::UnSAT),

            SearchRes::Interrupted(progress) => {
                info!("Conflict budget exhausted at {:.3} % progress", progress * 100.0);
                Ok(SolveRes::Unknown)
            }
        }
    }

    fn modelValue(&self, v: Var) -> LBool {
        self.model.get(v.index()).cloned().unwrap_or(LBool::Undef)
    }

    fn stats(&self) -> Stats {
        self.search.stats()
    }
}

impl CoreSolver {
    pub fn new(settings: CoreSettings) -> Self {
        CoreSolver {
            ok: true,
            ss: settings.search,
            conflict_budget: settings.conflict_budget,
            search: Searcher::new(settings.core, settings.db, settings.heur, settings.ccmin_mode),
            model: Vec::new(),
        }
    }

    pub fn with_monitor(settings: CoreSettings, monitor: Arc<Monitor>) -> Self {
        let mut solver = CoreSolver::new(settings);
        solver.search.set_monitor(monitor);
        solver
    }
}
