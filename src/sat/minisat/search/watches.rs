use std::mem;
use crate::sat::formula::{Lit, LitVec, Var};
use crate::sat::formula::assignment::Assignment;
use crate::sat::formula::clause::*;


#[derive(Clone, Copy, Debug)]
struct Watcher {
    cref: ClauseRef,
    blocker: Lit,
}


#[derive(Default, Debug)]
struct WatchesLine {
    watchers: Vec<Watcher>,
    dirty: bool,
}

impl WatchesLine {
    fn drop_deleted(&mut self, ca: &ClauseAllocator) {
        if self.dirty {
            self.watchers.retain(|w| !ca.is_deleted(w.cref));
            self.dirty = false;
        }
    }
}


enum Visit {
    Keep(Watcher),
    Moved,
    Conflict(Watcher),
}


/// `watches[lit]` lists the clauses to visit when `lit` becomes true.
pub struct Watches {
    watches: LitVec<WatchesLine>,
    pub propagations: u64,
}

impl Watches {
    pub fn new() -> Self {
        Watches {
            watches: LitVec::new(),
            propagations: 0,
        }
    }

    pub fn initVar(&mut self, v: Var) {
        self.watches.init(v.posLit());
        self.watches.init(v.negLit());
    }

    pub fn watchClause(&mut self, c: &Clause, cr: ClauseRef) {
        let (c0, c1) = c.headPair();
        self.watches[!c0].watchers.push(Watcher { cref: cr, blocker: c1 });
        self.watches[!c1].watchers.push(Watcher { cref: cr, blocker: c0 });
    }

    // Deleted clauses are dropped from these lines on their next visit or on 'purge'.
    pub fn unwatchClauseLazy(&mut self, c: &Clause) {
        let (c0, c1) = c.headPair();
        self.watches[!c0].dirty = true;
        self.watches[!c1].dirty = true;
    }

    /// Propagates every enqueued fact and returns the conflicting clause, if any.
    /// The queue is empty afterwards either way.
    pub fn propagate(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment) -> Option<ClauseRef> {
        while let Some(p) = assigns.dequeue() {
            self.propagations += 1;

            let mut line = mem::take(&mut self.watches[p]);
            line.drop_deleted(ca);

            let mut kept = 0;
            let mut next = 0;
            let mut confl = None;
            while next < line.watchers.len() && confl.is_none() {
                let w = line.watchers[next];
                next += 1;
                match self.visit(ca, assigns, !p, w) {
                    Visit::Moved => continue,
                    Visit::Keep(w) => line.watchers[kept] = w,
                    Visit::Conflict(w) => {
                        line.watchers[kept] = w;
                        confl = Some(w.cref);
                    }
                }
                kept += 1;
            }

            // Unvisited watchers after a conflict stay where they are.
            line.watchers.drain(kept..next);
            // No clause moves its watch onto 'p' itself, so the line is unchanged meanwhile.
            self.watches[p] = line;

            if confl.is_some() {
                assigns.dequeue_all();
                return confl;
            }
        }
        None
    }

    fn visit(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment, false_lit: Lit, w: Watcher) -> Visit {
        if assigns.is_assigned_pos(w.blocker) {
            return Visit::Keep(w);
        }

        let c = ca.edit(w.cref);
        if c.head() == false_lit {
            c.swap(0, 1);
        }

        let first = Watcher { cref: w.cref, blocker: c.head() };
        if first.blocker != w.blocker && assigns.is_assigned_pos(first.blocker) {
            return Visit::Keep(first);
        }

        match c.pull_literal(1, |lit| !assigns.is_assigned_neg(lit)) {
            Some(lit) => {
                self.watches[!lit].watchers.push(first);
                Visit::Moved
            }
            None if assigns.is_assigned_neg(first.blocker) => Visit::Conflict(first),
            None => {
                assigns.assign_lit(first.blocker, Some(first.cref));
                Visit::Keep(first)
            }
        }
    }

    /// Drops every watcher of a deleted clause. Must run before the allocator recycles slots.
    pub fn purge(&mut self, ca: &ClauseAllocator) {
        for line in self.watches.iter_mut() {
            line.drop_deleted(ca);
        }
    }
}
