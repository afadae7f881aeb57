use std::sync::Arc;
use crate::monitor::Monitor;
use crate::sat::{self, SolverError};
use crate::sat::formula::{assignment::*, clause::*, LBool, Lit, Var};
use self::conflict::{AnalyzeContext, CCMinMode, Conflict};
use self::decision_heuristic::{DecisionHeuristic, DecisionHeuristicSettings};
use super::budget::Budget;

pub mod conflict;
pub mod clause_db;
pub mod decision_heuristic;
mod watches;


#[derive(Clone, Copy, Debug)]
pub struct RestartStrategy {
    pub luby_restart: bool,
    pub restart_first: f64, // The initial restart limit.
    pub restart_inc: f64,   // The factor with which the restart limit is multiplied in each restart.
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy {
            luby_restart: true,
            restart_first: 100.0,
            restart_inc: 2.0,
        }
    }
}

impl RestartStrategy {
    pub fn conflicts_to_go(&self, restarts: u32) -> u64 {
        let rest_base = if self.luby_restart {
            luby(self.restart_inc, restarts)
        } else {
            self.restart_inc.powi(restarts as i32)
        };

        (rest_base * self.restart_first) as u64
    }
}

// Finite subsequences of the Luby-sequence:
//
// 0: 1
// 1: 1 1 2
// 2: 1 1 2 1 1 2 4
// 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
// ...
fn luby(y: f64, mut x: u32) -> f64 {
    let mut size = 1;
    let mut seq = 0;
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }

    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }

    y.powi(seq)
}


#[derive(Clone, Copy, Debug)]
pub struct LearningStrategy {
    pub min_learnts_lim: i32, // Minimum number to set the learnts limit to.
    pub size_factor: f64,     // The initial limit for learnt clauses is a factor of the original clauses.
    pub size_inc: f64,        // The limit for learnt clauses is multiplied with this factor each restart.
    pub size_adjust_start_confl: i32,
    pub size_adjust_inc: f64,
}

impl Default for LearningStrategy {
    fn default() -> Self {
        LearningStrategy {
            min_learnts_lim: 0,
            size_factor: 1.0 / 3.0,
            size_inc: 1.1,
            size_adjust_start_confl: 100,
            size_adjust_inc: 1.5,
        }
    }
}


// Ceiling on the number of learnt clauses kept between reductions. It grows
// geometrically, on a schedule that itself stretches by 'size_adjust_inc'.
struct LearntLimit {
    strategy: LearningStrategy,
    limit: f64,
    interval: f64,
    countdown: i32,
}

impl LearntLimit {
    fn start(strategy: LearningStrategy, problem_clauses: usize) -> Self {
        let floor = strategy.min_learnts_lim as f64;
        LearntLimit {
            limit: floor.max(problem_clauses as f64 * strategy.size_factor),
            interval: strategy.size_adjust_start_confl as f64,
            countdown: strategy.size_adjust_start_confl,
            strategy,
        }
    }

    // Counts one conflict; true when the limit was raised and a progress line is due.
    fn tick(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }

        self.interval *= self.strategy.size_adjust_inc;
        self.countdown = self.interval as i32;
        self.limit *= self.strategy.size_inc;
        true
    }

    fn exceeded_by(&self, learnts: usize, assigned: usize) -> bool {
        learnts as f64 >= self.limit + assigned as f64
    }
}


// Ground-level database cleaning only pays off once new facts were derived
// and enough propagation work has happened since the last pass.
#[derive(Default)]
struct SimplifyGate {
    last_ground: Option<usize>,
    next_props: u64,
}

impl SimplifyGate {
    fn closed(&self, ground: usize, props: u64) -> bool {
        self.last_ground == Some(ground) || props < self.next_props
    }

    fn arm(&mut self, ground: usize, props: u64, delay: u64) {
        self.last_ground = Some(ground);
        self.next_props = props + delay;
    }
}


#[derive(Default)]
struct Counters {
    solves: u64,
    restarts: u64,
    decisions: u64,
    conflicts: u64,
}


#[derive(Clone, Copy, Default, Debug)]
pub struct SearchSettings {
    pub restart: RestartStrategy,
    pub learn: LearningStrategy,
}


#[derive(Clone, Debug)]
pub struct SearcherSettings {
    pub garbage_frac: f64,     // The fraction of wasted memory allowed before a garbage collection is triggered.
    pub mem_limit: Option<usize>, // Bytes of clause storage the searcher may hold.
}

impl Default for SearcherSettings {
    fn default() -> Self {
        SearcherSettings {
            garbage_frac: 0.20,
            mem_limit: None,
        }
    }
}


pub enum AddClauseRes {
    UnSAT,
    Consumed,
    Added,
}


pub enum SearchRes {
    UnSAT,
    SAT(Vec<LBool>),
    // An assumption was falsified; the clause set itself may still be satisfiable.
    AssumpsConfl,
    Interrupted(f64),
}


enum Round {
    Restart,
    Done(SearchRes),
}


enum Decision {
    Branch(Lit),
    // Every decision variable is assigned.
    Complete,
    AssumptionFailed,
}


pub struct Searcher {
    settings: SearcherSettings,
    counters: Counters,
    ca: ClauseAllocator,
    db: clause_db::ClauseDB,
    assigns: Assignment,
    watches: watches::Watches,
    heur: DecisionHeuristic,
    analyze: AnalyzeContext,
    simp: SimplifyGate,
    monitor: Option<Arc<Monitor>>,
}

impl Searcher {
    pub fn new(
        settings: SearcherSettings,
        db_set: clause_db::ClauseDBSettings,
        heur_set: DecisionHeuristicSettings,
        ccmin_mode: CCMinMode,
    ) -> Self {
        Searcher {
            ca: ClauseAllocator::new(settings.mem_limit),
            settings,
            counters: Counters::default(),
            db: clause_db::ClauseDB::new(db_set),
            assigns: Assignment::new(),
            watches: watches::Watches::new(),
            heur: DecisionHeuristic::new(heur_set),
            analyze: AnalyzeContext::new(ccmin_mode),
            simp: SimplifyGate::default(),
            monitor: None,
        }
    }

    pub fn set_monitor(&mut self, monitor: Arc<Monitor>) {
        self.monitor = Some(monitor);
    }

    pub fn number_of_vars(&self) -> usize {
        self.assigns.number_of_vars()
    }

    pub fn number_of_clauses(&self) -> usize {
        self.db.stats.num_clauses
    }

    pub fn number_of_conflicts(&self) -> u64 {
        self.counters.conflicts
    }

    pub fn newVar(&mut self, upol: Option<bool>, dvar: bool) -> Var {
        let v = self.assigns.new_var();
        self.watches.initVar(v);
        self.heur.initVar(v, upol, dvar);
        self.analyze.initVar(v);
        v
    }

    pub fn addClause(&mut self, clause: &[Lit]) -> Result<AddClauseRes, SolverError> {
        let ps = {
            let mut ps = clause.to_vec();

            // Check if clause is satisfied and remove false/duplicate literals:
            ps.sort();
            ps.dedup();
            ps.retain(|&lit| !self.assigns.is_assigned_neg(lit));

            let mut prev = None;
            for &lit in ps.iter() {
                if self.assigns.is_assigned_pos(lit) || prev == Some(!lit) {
                    return Ok(AddClauseRes::Consumed);
                }
                prev = Some(lit);
            }

            ps
        };

        match &ps[..] {
            [] => Ok(AddClauseRes::UnSAT),

            [unit] => {
                self.assigns.assign_lit(*unit, None);
                match self.watches.propagate(&mut self.ca, &mut self.assigns) {
                    None => Ok(AddClauseRes::Consumed),
                    Some(_) => Ok(AddClauseRes::UnSAT),
                }
            }

            lits => {
                let cr = self.db.add_clause(&mut self.ca, lits)?;
                self.watches.watchClause(self.ca.view(cr), cr);
                Ok(AddClauseRes::Added)
            }
        }
    }

    // Propagates pending ground facts and cleans the database. False means the clause set is unsatisfiable.
    pub fn simplify(&mut self) -> bool {
        if self.watches.propagate(&mut self.ca, &mut self.assigns).is_some() {
            return false;
        }
        self.try_simplify();
        true
    }

    /// Runs restarts until the clause set is decided, an assumption fails or the budget
    /// runs out. The trail is back at the ground level afterwards.
    pub fn search(&mut self, ss: &SearchSettings, budget: &Budget, assumptions: &[Lit]) -> Result<SearchRes, SolverError> {
        info!("============================[ Search Statistics ]==============================");
        info!("| Conflicts |          ORIGINAL         |          LEARNT          | Progress |");
        info!("|           |    Vars  Clauses Literals |    Limit  Clauses Lit/Cl |          |");
        info!("===============================================================================");

        self.counters.solves += 1;
        let mut limit = LearntLimit::start(ss.learn, self.db.stats.num_clauses);
        let mut restarts = 0;
        let res = loop {
            let span = ss.restart.conflicts_to_go(restarts);
            match self.run_restart(span, budget, &mut limit, assumptions) {
                Ok(Round::Restart) => {
                    restarts += 1;
                    self.publish();
                }
                Ok(Round::Done(res)) => break Ok(res),
                Err(e) => break Err(e),
            }
        };

        self.cancelUntil(GROUND_LEVEL);
        self.publish();
        info!("===============================================================================");
        res
    }

    // One restart interval: at most 'span' conflicts before the trail is dropped.
    fn run_restart(
        &mut self,
        span: u64,
        budget: &Budget,
        limit: &mut LearntLimit,
        assumptions: &[Lit],
    ) -> Result<Round, SolverError> {
        self.counters.restarts += 1;
        let restart_at = self.counters.conflicts + span;

        loop {
            if !self.resolve_conflicts(limit)? {
                return Ok(Round::Done(SearchRes::UnSAT));
            }

            if !budget.within(self.counters.conflicts) {
                let progress = progress_estimate(&self.assigns);
                self.cancelUntil(GROUND_LEVEL);
                return Ok(Round::Done(SearchRes::Interrupted(progress)));
            }

            if self.counters.conflicts >= restart_at {
                self.cancelUntil(GROUND_LEVEL);
                return Ok(Round::Restart);
            }

            self.try_simplify();

            if limit.exceeded_by(self.db.number_of_learnts(), self.assigns.number_of_assigns()) {
                {
                    let watches = &mut self.watches;
                    self.db.reduce(&mut self.ca, &self.assigns, |c| watches.unwatchClauseLazy(c));
                }
                if self.ca.check_garbage(self.settings.garbage_frac) {
                    self.garbageCollect();
                }
            }

            match self.decide(assumptions) {
                Decision::Branch(lit) => {
                    self.assigns.new_decision_level();
                    self.assigns.assign_lit(lit, None);
                }
                Decision::Complete => return Ok(Round::Done(SearchRes::SAT(self.assigns.model()))),
                Decision::AssumptionFailed => return Ok(Round::Done(SearchRes::AssumpsConfl)),
            }
        }
    }

    // Assumptions come first, one decision level each; then the heuristic picks.
    fn decide(&mut self, assumptions: &[Lit]) -> Decision {
        while let Some(&p) = assumptions.get(self.assigns.decision_level().offset()) {
            match self.assigns.of_lit(p) {
                // Already holds: open an empty level to keep levels and assumptions aligned.
                LBool::True => self.assigns.new_decision_level(),
                LBool::False => return Decision::AssumptionFailed,
                LBool::Undef => return Decision::Branch(p),
            }
        }

        self.counters.decisions += 1;
        match self.heur.pickBranchLit(&self.assigns) {
            Some(lit) => Decision::Branch(lit),
            None => Decision::Complete,
        }
    }

    // Propagates to a fixpoint, learning a clause and backjumping on every conflict.
    // False once a conflict is derived at the ground level.
    fn resolve_conflicts(&mut self, limit: &mut LearntLimit) -> Result<bool, SolverError> {
        while let Some(confl) = self.watches.propagate(&mut self.ca, &mut self.assigns) {
            self.counters.conflicts += 1;

            let conflict = {
                let heur = &mut self.heur;
                let db = &mut self.db;
                self.analyze.analyze(
                    &self.assigns,
                    &mut self.ca,
                    confl,
                    |v| heur.bump_activity(v),
                    |ca, cr| db.bump_activity(ca, cr),
                )
            };

            match conflict {
                Conflict::Ground => return Ok(false),

                Conflict::Unit(unit) => {
                    self.cancelUntil(GROUND_LEVEL);
                    self.assigns.assign_lit(unit, None);
                }

                Conflict::Learned(level, lit, clause) => {
                    self.cancelUntil(level);
                    let cr = self.db.learn_clause(&mut self.ca, &clause)?;
                    self.watches.watchClause(self.ca.view(cr), cr);
                    self.assigns.assign_lit(lit, Some(cr));
                }
            }

            self.heur.decay_activity();
            self.db.decay_activity();

            if limit.tick() {
                self.log_progress(limit);
            }
        }

        Ok(true)
    }

    fn log_progress(&self, limit: &LearntLimit) {
        let db = &self.db.stats;
        let lit_per_cl = if db.num_learnts > 0 {
            db.learnts_literals as f64 / db.num_learnts as f64
        } else {
            0.0
        };
        info!(
            "| {:9} | {:7} {:8} {:8} | {:8} {:8} {:6.0} | {:6.3} % |",
            self.counters.conflicts,
            self.heur.dec_vars.saturating_sub(self.assigns.number_of_ground_assigns()),
            db.num_clauses,
            db.clauses_literals,
            limit.limit as u64,
            db.num_learnts,
            lit_per_cl,
            progress_estimate(&self.assigns) * 100.0
        );
    }

    // Drops clauses satisfied at the ground level, at most once per new ground fact.
    fn try_simplify(&mut self) {
        let ground = self.assigns.number_of_assigns();
        if !self.assigns.is_ground_level() || self.simp.closed(ground, self.watches.propagations) {
            return;
        }

        {
            let watches = &mut self.watches;
            self.db.removeSatisfied(&mut self.ca, &mut self.assigns, |c| watches.unwatchClauseLazy(c));
        }
        if self.ca.check_garbage(self.settings.garbage_frac) {
            self.garbageCollect();
        }

        self.heur.rebuildOrderHeap(&self.assigns);
        let db = &self.db.stats;
        self.simp.arm(ground, self.watches.propagations, db.clauses_literals + db.learnts_literals);
    }

    // Revert to the state at given level (keeping all assignment at 'level' but not beyond).
    fn cancelUntil(&mut self, target_level: DecisionLevel) {
        let heur = &mut self.heur;
        let top_level = self.assigns.decision_level();
        self.assigns.rewind_until_level(target_level, |level, lit| {
            heur.cancel(lit, level == top_level);
        });
    }

    fn garbageCollect(&mut self) {
        let before = self.ca.size();
        self.watches.purge(&self.ca);
        self.ca.collect();
        debug!(
            "|  Garbage collection:   {:12} bytes => {:12} bytes             |",
            before,
            self.ca.size()
        );
    }

    fn publish(&self) {
        if let Some(ref monitor) = self.monitor {
            monitor.publish(self.stats());
        }
    }

    pub fn stats(&self) -> sat::Stats {
        sat::Stats {
            solves: self.counters.solves,
            restarts: self.counters.restarts,
            decisions: self.counters.decisions,
            rnd_decisions: self.heur.rnd_decisions,
            conflicts: self.counters.conflicts,
            propagations: self.watches.propagations,
            tot_literals: self.analyze.tot_literals,
            del_literals: self.analyze.max_literals - self.analyze.tot_literals,
        }
    }
}
