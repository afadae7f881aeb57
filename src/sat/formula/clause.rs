use std::{fmt, mem};
use crate::sat::SolverError;
use super::Lit;


#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct ClauseRef(u32);


pub struct Clause {
    lits: Vec<Lit>,
    learnt: bool,
    deleted: bool,
    activity: f32,
}

impl Clause {
    #[inline]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[inline]
    pub fn lits_from(&self, from: usize) -> &[Lit] {
        &self.lits[from..]
    }

    #[inline]
    pub fn head(&self) -> Lit {
        self.lits[0]
    }

    #[inline]
    pub fn headPair(&self) -> (Lit, Lit) {
        (self.lits[0], self.lits[1])
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.lits.swap(i, j);
    }

    #[inline]
    pub fn is_learnt(&self) -> bool {
        self.learnt
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    #[inline]
    pub fn activity(&self) -> f64 {
        self.activity as f64
    }

    #[inline]
    pub fn set_activity(&mut self, act: f64) {
        self.activity = act as f32;
    }

    // Finds a literal after 'place' satisfying 'f' and moves it to 'place'.
    #[inline]
    pub fn pull_literal<F: FnMut(Lit) -> bool>(&mut self, place: usize, mut f: F) -> Option<Lit> {
        for k in place + 1..self.lits.len() {
            if f(self.lits[k]) {
                self.lits.swap(place, k);
                return Some(self.lits[place]);
            }
        }
        None
    }

    // Drops literals from position 'base' onwards for which 'keep' is false. Order is not kept.
    pub fn retain_suffix<F: Fn(Lit) -> bool>(&mut self, base: usize, keep: F) -> usize {
        let before = self.lits.len();
        let mut i = base;
        while i < self.lits.len() {
            if keep(self.lits[i]) {
                i += 1;
            } else {
                self.lits.swap_remove(i);
            }
        }
        before - self.lits.len()
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.deleted {
            write!(f, "<deleted>")?;
        }
        f.debug_list().entries(self.lits.iter()).finish()
    }
}


/// Slot storage for clauses. Freed slots are parked until the owner has
/// purged every reference to them (see `collect`), then recycled.
pub struct ClauseAllocator {
    slots: Vec<Clause>,
    parked: Vec<ClauseRef>,
    free: Vec<ClauseRef>,
    size: usize,
    wasted: usize,
    limit: Option<usize>,
}

impl ClauseAllocator {
    pub fn new(limit: Option<usize>) -> Self {
        ClauseAllocator {
            slots: Vec::new(),
            parked: Vec::new(),
            free: Vec::new(),
            size: 0,
            wasted: 0,
            limit,
        }
    }

    fn footprint(len: usize) -> usize {
        mem::size_of::<Clause>() + len * mem::size_of::<Lit>()
    }

    /// Bytes currently held by live and parked clauses.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alloc(&mut self, lits: &[Lit], learnt: bool) -> Result<ClauseRef, SolverError> {
        let bytes = Self::footprint(lits.len());
        if let Some(limit) = self.limit {
            if self.size + bytes > limit {
                return Err(SolverError::OutOfMemory);
            }
        }
        self.size += bytes;

        let clause = Clause {
            lits: lits.to_vec(),
            learnt,
            deleted: false,
            activity: 0.0,
        };

        match self.free.pop() {
            Some(cr) => {
                self.slots[cr.0 as usize] = clause;
                Ok(cr)
            }
            None => {
                self.slots.push(clause);
                Ok(ClauseRef((self.slots.len() - 1) as u32))
            }
        }
    }

    pub fn free(&mut self, cr: ClauseRef) {
        let c = &mut self.slots[cr.0 as usize];
        assert!(!c.deleted);
        c.deleted = true;
        self.wasted += Self::footprint(c.lits.len());
        self.parked.push(cr);
    }

    #[inline]
    pub fn view(&self, cr: ClauseRef) -> &Clause {
        &self.slots[cr.0 as usize]
    }

    #[inline]
    pub fn edit(&mut self, cr: ClauseRef) -> &mut Clause {
        &mut self.slots[cr.0 as usize]
    }

    #[inline]
    pub fn is_deleted(&self, cr: ClauseRef) -> bool {
        self.slots[cr.0 as usize].deleted
    }

    // Accounts for literals removed from a live clause in place.
    pub fn shrunk(&mut self, removed: usize) {
        self.wasted += removed * mem::size_of::<Lit>();
    }

    pub fn check_garbage(&self, garbage_frac: f64) -> bool {
        (self.wasted as f64) > (self.size as f64) * garbage_frac
    }

    /// Recycles parked slots. The caller must have dropped every watcher
    /// and reason pointing at a freed clause before calling this.
    pub fn collect(&mut self) {
        for cr in self.parked.drain(..) {
            self.slots[cr.0 as usize].lits = Vec::new();
            self.free.push(cr);
        }
        self.size -= self.wasted;
        self.wasted = 0;
    }
}
