use std::cmp::Ordering;
use crate::sat::SolverError;
use crate::sat::formula::Lit;
use crate::sat::formula::assignment::Assignment;
use crate::sat::formula::clause::*;


#[derive(Clone, Debug)]
pub struct ClauseDBSettings {
    pub remove_satisfied: bool, // Whether 'simplify' scans problem clauses for satisfied ones, not just learnts.
    pub clause_decay: f64,
}

impl Default for ClauseDBSettings {
    fn default() -> ClauseDBSettings {
        ClauseDBSettings {
            remove_satisfied: true,
            clause_decay: 0.999,
        }
    }
}


#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub num_clauses: usize,
    pub num_learnts: usize,
    pub clauses_literals: u64,
    pub learnts_literals: u64,
}

impl Stats {
    fn add(&mut self, clause: &Clause) {
        let (count, lits) = self.slots(clause.is_learnt());
        *count += 1;
        *lits += clause.len() as u64;
    }

    fn del(&mut self, clause: &Clause) {
        let (count, lits) = self.slots(clause.is_learnt());
        *count -= 1;
        *lits -= clause.len() as u64;
    }

    fn slots(&mut self, learnt: bool) -> (&mut usize, &mut u64) {
        if learnt {
            (&mut self.num_learnts, &mut self.learnts_literals)
        } else {
            (&mut self.num_clauses, &mut self.clauses_literals)
        }
    }
}


/// Problem and learnt clause lists with learnt-clause activity bookkeeping.
pub struct ClauseDB {
    pub settings: ClauseDBSettings,
    cla_inc: f64,
    clauses: Vec<ClauseRef>,
    learnts: Vec<ClauseRef>,
    pub stats: Stats,
}

impl ClauseDB {
    pub fn new(settings: ClauseDBSettings) -> ClauseDB {
        ClauseDB {
            settings,
            cla_inc: 1.0,
            clauses: Vec::new(),
            learnts: Vec::new(),
            stats: Stats::default(),
        }
    }

    pub fn add_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> Result<ClauseRef, SolverError> {
        let cr = ca.alloc(literals, false)?;
        self.stats.add(ca.view(cr));
        self.clauses.push(cr);
        Ok(cr)
    }

    pub fn learn_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> Result<ClauseRef, SolverError> {
        let cr = ca.alloc(literals, true)?;
        self.stats.add(ca.view(cr));
        self.learnts.push(cr);
        self.bump_activity(ca, cr);
        Ok(cr)
    }

    pub fn bump_activity(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        let c = ca.edit(cr);
        if !c.is_learnt() {
            return;
        }

        let new = c.activity() + self.cla_inc;
        c.set_activity(new);
        if new > 1e20 {
            self.cla_inc *= 1e-20;
            for &lr in self.learnts.iter() {
                let c = ca.edit(lr);
                let scaled = c.activity() * 1e-20;
                c.set_activity(scaled);
            }
        }
    }

    pub fn decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.settings.clause_decay;
    }

    pub fn number_of_learnts(&self) -> usize {
        self.learnts.len()
    }

    // Frees the less active half of the learnt clauses, plus any whose activity fell below
    // the average increment. Binary clauses and reasons of current assignments stay.
    pub fn reduce<F: FnMut(&Clause)>(&mut self, ca: &mut ClauseAllocator, assigns: &Assignment, mut notify: F) {
        self.learnts.sort_by(|&rx, &ry| {
            let x = ca.view(rx);
            let y = ca.view(ry);
            match (x.len() == 2, y.len() == 2) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.activity().partial_cmp(&y.activity()).unwrap_or(Ordering::Equal),
            }
        });

        let index_lim = self.learnts.len() / 2;
        let extra_lim = self.cla_inc / (self.learnts.len().max(1) as f64);
        let stats = &mut self.stats;

        let mut i = 0;
        self.learnts.retain(|&cr| {
            let remove = {
                let c = ca.view(cr);
                c.len() > 2
                    && !assigns.is_reason_for(cr, c.head())
                    && (i < index_lim || c.activity() < extra_lim)
            };
            i += 1;

            if remove {
                notify(ca.view(cr));
                stats.del(ca.view(cr));
                ca.free(cr);
            }
            !remove
        });
    }

    // Drops clauses satisfied at the ground level and strips falsified literals from the rest.
    pub fn removeSatisfied<F: FnMut(&Clause)>(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment, mut notify: F) {
        let stats = &mut self.stats;
        self.learnts
            .retain(|&cr| retain_clause(stats, ca, assigns, &mut notify, cr));

        if self.settings.remove_satisfied {
            self.clauses
                .retain(|&cr| retain_clause(stats, ca, assigns, &mut notify, cr));
        }
    }
}


fn retain_clause<F: FnMut(&Clause)>(
    stats: &mut Stats,
    ca: &mut ClauseAllocator,
    assigns: &mut Assignment,
    notify: &mut F,
    cr: ClauseRef,
) -> bool {
    if ca.view(cr).lits().iter().any(|&lit| assigns.is_assigned_pos(lit)) {
        let head = ca.view(cr).head();
        assigns.detach_reason(cr, head);
        notify(ca.view(cr));
        stats.del(ca.view(cr));
        ca.free(cr);
        return false;
    }

    // Both watched literals are unassigned here, so only the tail can hold false literals.
    stats.del(ca.view(cr));
    let removed = ca.edit(cr).retain_suffix(2, |lit| !assigns.is_assigned_neg(lit));
    stats.add(ca.view(cr));
    ca.shrunk(removed);
    true
}
