use std::{cmp, fmt};
use super::{LBool, Lit, Var};
use super::clause::ClauseRef;


#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct DecisionLevel(usize);

pub const GROUND_LEVEL: DecisionLevel = DecisionLevel(0);

impl DecisionLevel {
    #[inline]
    pub fn offset(&self) -> usize {
        self.0
    }

    // One bit per level modulo 32, used to prune redundancy checks.
    #[inline]
    pub fn abstraction(&self) -> u32 {
        1 << (self.0 & 31)
    }
}


#[derive(Clone, Copy, Debug)]
pub struct VarData {
    pub reason: Option<ClauseRef>,
    pub level: DecisionLevel,
}


/// Current partial assignment together with the trail it was built on.
pub struct Assignment {
    values: Vec<LBool>,
    vardata: Vec<VarData>,
    trail: Vec<Lit>,
    lim: Vec<usize>,
    qhead: usize,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment {
            values: Vec::new(),
            vardata: Vec::new(),
            trail: Vec::new(),
            lim: Vec::new(),
            qhead: 0,
        }
    }


    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn number_of_assigns(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn number_of_ground_assigns(&self) -> usize {
        match self.lim.first() {
            Some(&lim) => lim,
            None => self.trail.len(),
        }
    }

    pub fn new_var(&mut self) -> Var {
        self.values.push(LBool::Undef);
        self.vardata.push(VarData {
            reason: None,
            level: GROUND_LEVEL,
        });
        Var::from_index(self.values.len() - 1)
    }


    #[inline]
    pub fn decision_level(&self) -> DecisionLevel {
        DecisionLevel(self.lim.len())
    }

    #[inline]
    pub fn is_ground_level(&self) -> bool {
        self.lim.is_empty()
    }

    #[inline]
    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }


    #[inline]
    pub fn assign_lit(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let v = lit.var().index();
        assert!(self.values[v].is_undef());
        self.values[v] = LBool::from_bool(!lit.sign());
        self.vardata[v] = VarData {
            reason,
            level: DecisionLevel(self.lim.len()),
        };
        self.trail.push(lit);
    }

    pub fn rewind_until_level<F: FnMut(DecisionLevel, Lit)>(&mut self, target: DecisionLevel, mut f: F) {
        while self.lim.len() > target.0 {
            let level = DecisionLevel(self.lim.len());
            let bottom = self.lim.pop().unwrap_or(0);
            while self.trail.len() > bottom {
                if let Some(lit) = self.trail.pop() {
                    f(level, lit);
                    let v = lit.var().index();
                    self.values[v] = LBool::Undef;
                    self.vardata[v].reason = None;
                }
            }
        }

        self.qhead = cmp::min(self.qhead, self.trail.len());
    }

    #[inline]
    pub fn dequeue_all(&mut self) {
        self.qhead = self.trail.len()
    }

    #[inline]
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            Some(p)
        } else {
            None
        }
    }

    #[inline]
    pub fn assign_at(&self, index: usize) -> Lit {
        self.trail[index]
    }


    #[inline]
    pub fn of_var(&self, v: Var) -> LBool {
        self.values[v.index()]
    }

    #[inline]
    pub fn of_lit(&self, lit: Lit) -> LBool {
        self.values[lit.var().index()] ^ lit.sign()
    }

    #[inline]
    pub fn is_undef(&self, v: Var) -> bool {
        self.values[v.index()].is_undef()
    }

    #[inline]
    pub fn is_assigned_pos(&self, p: Lit) -> bool {
        self.of_lit(p) == LBool::True
    }

    #[inline]
    pub fn is_assigned_neg(&self, p: Lit) -> bool {
        self.of_lit(p) == LBool::False
    }

    #[inline]
    pub fn vardata(&self, v: Var) -> &VarData {
        &self.vardata[v.index()]
    }

    #[inline]
    pub fn is_reason_for(&self, cr: ClauseRef, lit: Lit) -> bool {
        self.is_assigned_pos(lit) && self.vardata[lit.var().index()].reason == Some(cr)
    }

    // Forgets the reason of a ground-level fact whose clause is being removed.
    pub fn detach_reason(&mut self, cr: ClauseRef, lit: Lit) {
        if self.is_reason_for(cr, lit) {
            self.vardata[lit.var().index()].reason = None;
        }
    }

    pub fn model(&self) -> Vec<LBool> {
        self.values.clone()
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for level in 0..1 + self.lim.len() {
            let l = if level > 0 { self.lim[level - 1] } else { 0 };
            let r = if level < self.lim.len() { self.lim[level] } else { self.trail.len() };

            if r > l {
                write!(f, "[{}:", level)?;
                for lit in self.trail[l..r].iter() {
                    write!(f, " {:?}", lit)?;
                }
                write!(f, " ]")?;
            }
        }

        Ok(())
    }
}


pub fn progress_estimate(assigns: &Assignment) -> f64 {
    if assigns.number_of_vars() == 0 {
        return 1.0;
    }

    let f = 1.0 / (assigns.number_of_vars() as f64);
    let mut progress = 0.0;

    let cl = assigns.lim.len();
    for level in 0..cl + 1 {
        let l = if level == 0 { 0 } else { assigns.lim[level - 1] };
        let r = if level == cl { assigns.trail.len() } else { assigns.lim[level] };
        progress += f.powi(level as i32) * ((r - l) as f64);
    }
    progress * f
}
