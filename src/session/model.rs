use crate::sat::Solver;
use crate::sat::formula::{LBool, Lit, Var};


/// Truth values captured right after a satisfiable solve, one per known variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    values: Vec<LBool>,
}

impl Model {
    pub fn capture<S: Solver>(solver: &S) -> Model {
        Model {
            values: (0..solver.nVars())
                .map(|i| solver.modelValue(Var::from_index(i)))
                .collect(),
        }
    }

    pub fn from_values(values: Vec<LBool>) -> Model {
        Model { values }
    }

    pub fn n_vars(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[LBool] {
        &self.values
    }

    // Variables this model never saw are unassigned.
    pub fn value(&self, v: Var) -> LBool {
        self.values.get(v.index()).cloned().unwrap_or(LBool::Undef)
    }

    /// One-based numbers of the true variables among `care` (all variables when it's empty),
    /// space separated, in `care` order.
    pub fn solution(&self, care: &[Var]) -> String {
        let numbers: Vec<String> = if care.is_empty() {
            self.values.iter()
                .enumerate()
                .filter(|&(_, value)| value.is_true())
                .map(|(i, _)| (i + 1).to_string())
                .collect()
        } else {
            care.iter()
                .filter(|&&v| self.value(v).is_true())
                .map(|v| (v.index() + 1).to_string())
                .collect()
        };
        numbers.join(" ")
    }

    /// The clause excluding this exact assignment over `vars`. Unassigned variables count as false.
    pub fn blocking_clause(&self, vars: &[Var]) -> Vec<Lit> {
        vars.iter().map(|&v| v.sign_lit(self.value(v).is_true())).collect()
    }
}


/// The care and placement sets of a session. Both are replaced wholesale.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    care: Vec<Var>,
    placement: Vec<Var>,
}

impl Selection {
    pub fn care(&self) -> &[Var] {
        &self.care
    }

    pub fn placement(&self) -> &[Var] {
        &self.placement
    }

    pub fn set_care(&mut self, vars: Vec<Var>) {
        self.care = vars;
    }

    pub fn set_placement(&mut self, vars: Vec<Var>) {
        self.placement = vars;
    }

    // Placement set first, then care set, then every one of the 'n_vars' known variables.
    pub fn blocking_vars(&self, n_vars: usize) -> Vec<Var> {
        if !self.placement.is_empty() {
            self.placement.clone()
        } else if !self.care.is_empty() {
            self.care.clone()
        } else {
            (0..n_vars).map(Var::from_index).collect()
        }
    }
}
