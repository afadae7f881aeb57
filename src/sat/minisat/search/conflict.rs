use crate::sat::formula::{Lit, Var, VarVec};
use crate::sat::formula::assignment::*;
use crate::sat::formula::clause::*;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CCMinMode {
    None,
    Basic,
    Deep,
}

impl Default for CCMinMode {
    fn default() -> Self {
        CCMinMode::Deep
    }
}


pub enum Conflict {
    Ground,
    Unit(Lit),
    Learned(DecisionLevel, Lit, Vec<Lit>),
}


/// Scratch state for first-UIP conflict analysis.
pub struct AnalyzeContext {
    ccmin_mode: CCMinMode,
    seen: VarVec<bool>,
    to_clear: Vec<Lit>,
    stack: Vec<Lit>,
    pub max_literals: u64,
    pub tot_literals: u64,
}

impl AnalyzeContext {
    pub fn new(ccmin_mode: CCMinMode) -> AnalyzeContext {
        AnalyzeContext {
            ccmin_mode,
            seen: VarVec::new(),
            to_clear: Vec::new(),
            stack: Vec::new(),
            max_literals: 0,
            tot_literals: 0,
        }
    }

    pub fn initVar(&mut self, v: Var) {
        self.seen.init(v);
    }

    // Description:
    //   Analyze conflict and produce a reason clause.
    //
    //   Post-conditions:
    //     * the first literal of the learnt clause is the asserting literal.
    //     * if the clause has more than one literal, the second one has the greatest decision
    //       level among the rest; that level is the backjump target.
    pub fn analyze<BV, BC>(
        &mut self,
        assigns: &Assignment,
        ca: &mut ClauseAllocator,
        confl0: ClauseRef,
        mut bump_var: BV,
        mut bump_cla: BC,
    ) -> Conflict
    where
        BV: FnMut(Var),
        BC: FnMut(&mut ClauseAllocator, ClauseRef),
    {
        if assigns.is_ground_level() {
            return Conflict::Ground;
        }

        let mut out_learnt = Vec::new();
        let mut confl = confl0;
        let mut path_c = 0;
        let mut index = assigns.number_of_assigns();
        let uip = loop {
            bump_cla(ca, confl);

            let from = if confl == confl0 { 0 } else { 1 };
            for &q in ca.view(confl).lits_from(from) {
                let v = q.var();
                let level = assigns.vardata(v).level;
                if !self.seen[v] && level > GROUND_LEVEL {
                    self.seen[v] = true;
                    bump_var(v);
                    if level >= assigns.decision_level() {
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }

            // Select next literal on the trail to expand:
            let pl = loop {
                index -= 1;
                let lit = assigns.assign_at(index);
                if self.seen[lit.var()] {
                    break lit;
                }
            };

            self.seen[pl.var()] = false;
            path_c -= 1;
            if path_c == 0 {
                break pl;
            }

            confl = match assigns.vardata(pl.var()).reason {
                Some(cr) => cr,
                None => break pl,
            };
        };
        out_learnt.insert(0, !uip);

        self.minimize(assigns, ca, &mut out_learnt);

        if out_learnt.len() == 1 {
            return Conflict::Unit(out_learnt[0]);
        }

        // Find the literal assigned at the next-highest level:
        let mut max_i = 1;
        let mut max_level = assigns.vardata(out_learnt[1].var()).level;
        for (i, lit) in out_learnt.iter().enumerate().skip(2) {
            let level = assigns.vardata(lit.var()).level;
            if level > max_level {
                max_i = i;
                max_level = level;
            }
        }
        out_learnt.swap(1, max_i);

        Conflict::Learned(max_level, out_learnt[0], out_learnt)
    }

    fn minimize(&mut self, assigns: &Assignment, ca: &ClauseAllocator, out_learnt: &mut Vec<Lit>) {
        self.to_clear.clear();
        self.to_clear.extend_from_slice(out_learnt);
        self.max_literals += out_learnt.len() as u64;

        match self.ccmin_mode {
            CCMinMode::Deep => {
                let abstract_levels = out_learnt[1..]
                    .iter()
                    .fold(0, |acc, lit| acc | assigns.vardata(lit.var()).level.abstraction());

                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let lit = out_learnt[i];
                    let keep = assigns.vardata(lit.var()).reason.is_none()
                        || !self.litRedundant(assigns, ca, lit, abstract_levels);
                    if keep {
                        out_learnt[j] = lit;
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }

            CCMinMode::Basic => {
                let mut j = 1;
                for i in 1..out_learnt.len() {
                    let lit = out_learnt[i];
                    let keep = match assigns.vardata(lit.var()).reason {
                        None => true,
                        Some(cr) => ca.view(cr).lits_from(1).iter().any(|q| {
                            !self.seen[q.var()] && assigns.vardata(q.var()).level > GROUND_LEVEL
                        }),
                    };
                    if keep {
                        out_learnt[j] = lit;
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }

            CCMinMode::None => {}
        }

        self.tot_literals += out_learnt.len() as u64;

        for lit in self.to_clear.iter() {
            self.seen[lit.var()] = false;
        }
    }

    // Check if 'p' is implied by the other literals of the learnt clause.
    fn litRedundant(&mut self, assigns: &Assignment, ca: &ClauseAllocator, p: Lit, abstract_levels: u32) -> bool {
        self.stack.clear();
        self.stack.push(p);
        let top = self.to_clear.len();

        while let Some(lit) = self.stack.pop() {
            let cr = match assigns.vardata(lit.var()).reason {
                Some(cr) => cr,
                None => continue,
            };

            for &q in ca.view(cr).lits_from(1) {
                let v = q.var();
                let vd = assigns.vardata(v);
                if self.seen[v] || vd.level == GROUND_LEVEL {
                    continue;
                }

                if vd.reason.is_some() && (vd.level.abstraction() & abstract_levels) != 0 {
                    self.seen[v] = true;
                    self.stack.push(q);
                    self.to_clear.push(q);
                } else {
                    for l in self.to_clear.drain(top..) {
                        self.seen[l.var()] = false;
                    }
                    return false;
                }
            }
        }

        true
    }
}
