use crate::sat::formula::{Lit, Var, VarHeap, VarVec};
use crate::sat::formula::assignment::Assignment;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum PhaseSaving {
    None,
    Limited,
    Full,
}


#[derive(Clone, Debug)]
pub struct DecisionHeuristicSettings {
    pub var_decay: f64,
    pub random_seed: f64,
    pub random_var_freq: f64,
    pub phase_saving: PhaseSaving,
    pub rnd_pol: bool,      // Use random polarities for branching.
    pub rnd_init_act: bool, // Start variable activities at a small random value.
}

impl Default for DecisionHeuristicSettings {
    fn default() -> Self {
        DecisionHeuristicSettings {
            var_decay: 0.95,
            random_seed: 91648253.0,
            random_var_freq: 0.0,
            phase_saving: PhaseSaving::Full,
            rnd_pol: false,
            rnd_init_act: false,
        }
    }
}


// MiniSat's multiplicative congruential generator; seed must never be 0.
struct Random(f64);

impl Random {
    fn drand(&mut self) -> f64 {
        self.0 *= 1389796.0;
        let q = (self.0 / 2147483647.0) as i32;
        self.0 -= (q as f64) * 2147483647.0;
        self.0 / 2147483647.0
    }

    fn irand(&mut self, size: usize) -> usize {
        (self.drand() * (size as f64)) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.drand() < p
    }
}


#[derive(Default)]
struct VarLine {
    polarity: bool,         // Saved phase: true means the negative literal.
    user_pol: Option<bool>,
    decision: bool,
}


/// VSIDS: variables are ranked by a decaying activity bumped on every conflict they take part in.
pub struct DecisionHeuristic {
    settings: DecisionHeuristicSettings,
    var_inc: f64,
    rand: Random,
    var: VarVec<VarLine>,
    activity: VarVec<f64>,
    queue: VarHeap,

    pub dec_vars: usize,
    pub rnd_decisions: u64,
}

impl DecisionHeuristic {
    pub fn new(settings: DecisionHeuristicSettings) -> DecisionHeuristic {
        let seed = if settings.random_seed > 0.0 { settings.random_seed } else { 91648253.0 };
        DecisionHeuristic {
            settings,
            var_inc: 1.0,
            rand: Random(seed),
            var: VarVec::new(),
            activity: VarVec::new(),
            queue: VarHeap::new(),
            dec_vars: 0,
            rnd_decisions: 0,
        }
    }

    pub fn initVar(&mut self, v: Var, upol: Option<bool>, dvar: bool) {
        self.activity.init(v);
        self.var.init(v);
        if self.settings.rnd_init_act {
            self.activity[v] = self.rand.drand() * 0.00001;
        }
        self.var[v] = VarLine {
            polarity: true,
            user_pol: upol,
            decision: false,
        };
        self.set_decision_var(v, dvar);
    }

    fn set_decision_var(&mut self, v: Var, b: bool) {
        if b != self.var[v].decision {
            if b {
                self.dec_vars += 1;
                let act = &self.activity;
                self.queue.insert(v, |a, b| act[a] > act[b]);
            } else {
                self.dec_vars -= 1;
            }
            self.var[v].decision = b;
        }
    }

    // Called for every literal unassigned on backtrack.
    pub fn cancel(&mut self, lit: Lit, top_level: bool) {
        let v = lit.var();
        let save = match self.settings.phase_saving {
            PhaseSaving::Full => true,
            PhaseSaving::Limited => top_level,
            PhaseSaving::None => false,
        };
        if save {
            self.var[v].polarity = lit.sign();
        }
        if self.var[v].decision {
            let act = &self.activity;
            self.queue.insert(v, |a, b| act[a] > act[b]);
        }
    }

    pub fn bump_activity(&mut self, v: Var) {
        let new = self.activity[v] + self.var_inc;
        if new > 1e100 {
            // Rescale everything to keep activities finite.
            self.var_inc *= 1e-100;
            for act in self.activity.iter_mut() {
                *act *= 1e-100;
            }
            self.activity[v] = new * 1e-100;
        } else {
            self.activity[v] = new;
        }

        let act = &self.activity;
        self.queue.decrease(v, |a, b| act[a] > act[b]);
    }

    pub fn decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.settings.var_decay;
    }

    pub fn rebuildOrderHeap(&mut self, assigns: &Assignment) {
        let mut vars = Vec::with_capacity(self.queue.len());
        for i in 0..self.var.len() {
            let v = Var::from_index(i);
            if self.var[v].decision && assigns.is_undef(v) {
                vars.push(v);
            }
        }

        let act = &self.activity;
        self.queue.rebuild(vars, |a, b| act[a] > act[b]);
    }

    fn pickBranchVar(&mut self, assigns: &Assignment) -> Option<Var> {
        if !self.queue.is_empty() && self.rand.chance(self.settings.random_var_freq) {
            let v = self.queue[self.rand.irand(self.queue.len())];
            if assigns.is_undef(v) && self.var[v].decision {
                self.rnd_decisions += 1;
                return Some(v);
            }
        }

        loop {
            let v = {
                let act = &self.activity;
                self.queue.pop(|a, b| act[a] > act[b])?
            };
            if assigns.is_undef(v) && self.var[v].decision {
                return Some(v);
            }
        }
    }

    pub fn pickBranchLit(&mut self, assigns: &Assignment) -> Option<Lit> {
        let v = self.pickBranchVar(assigns)?;
        let sign = match self.var[v].user_pol {
            Some(s) => s,
            None if self.settings.rnd_pol => self.rand.chance(0.5),
            None => self.var[v].polarity,
        };
        Some(v.sign_lit(sign))
    }
}
