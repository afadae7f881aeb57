use std::{fmt, ops};
pub use self::index_map::{Idx, IdxHeap, IdxVec, LitVec, VarHeap, VarVec};

pub mod assignment;
pub mod clause;
mod index_map;


/// Zero-based variable index. DIMACS variable `n` is `Var(n - 1)`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Var(u32);

impl Var {
    pub const MAX_INDEX: usize = 0x7FFF_FFFE;

    #[inline]
    pub fn sign_lit(&self, sign: bool) -> Lit {
        Lit((self.0 << 1) | (sign as u32))
    }

    #[inline]
    pub fn posLit(&self) -> Lit {
        Lit(self.0 << 1)
    }

    #[inline]
    pub fn negLit(&self) -> Lit {
        Lit((self.0 << 1) | 1)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Var {
        if index <= Var::MAX_INDEX {
            Var(index as u32)
        } else {
            panic!("Var index {} is out of bound", index)
        }
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}


/// A variable with a polarity. `sign() == true` means the negated literal.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Lit(u32);

impl Lit {
    #[inline]
    pub fn sign(&self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    #[inline]
    fn index(&self) -> usize {
        self.0 as usize
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.sign() {
            write!(f, "¬")?;
        }
        write!(f, "{:?}", self.var())
    }
}


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LBool {
    True,
    False,
    Undef,
}

impl LBool {
    #[inline]
    pub fn from_bool(b: bool) -> LBool {
        if b { LBool::True } else { LBool::False }
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        *self == LBool::True
    }

    #[inline]
    pub fn is_undef(&self) -> bool {
        *self == LBool::Undef
    }
}

impl ops::BitXor<bool> for LBool {
    type Output = LBool;

    #[inline]
    fn bitxor(self, flip: bool) -> LBool {
        match self {
            LBool::True if flip => LBool::False,
            LBool::False if flip => LBool::True,
            other => other,
        }
    }
}

impl Default for LBool {
    fn default() -> Self {
        LBool::Undef
    }
}
