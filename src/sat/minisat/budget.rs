// Resource constraints for a single solve call.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    conflict_limit: Option<u64>, // Absolute conflict count at which the search gives up.
}

impl Budget {
    // Allows 'budget' more conflicts on top of 'conflicts' already spent.
    pub fn conflicts(conflicts: u64, budget: Option<u64>) -> Budget {
        Budget {
            conflict_limit: budget.map(|b| conflicts.saturating_add(b)),
        }
    }

    pub fn within(&self, conflicts: u64) -> bool {
        match self.conflict_limit {
            Some(limit) => conflicts < limit,
            None => true,
        }
    }
}
