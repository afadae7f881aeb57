use std::{marker, ops, slice};
use vec_map::VecMap;
use super::{Lit, Var};


pub type VarVec<V> = IdxVec<Var, V>;
pub type LitVec<V> = IdxVec<Lit, V>;
pub type VarHeap = IdxHeap<Var>;


pub trait Idx: Copy {
    fn idx(&self) -> usize;
}

impl Idx for Var {
    #[inline]
    fn idx(&self) -> usize {
        self.index()
    }
}

impl Idx for Lit {
    #[inline]
    fn idx(&self) -> usize {
        self.index()
    }
}


/// Dense vector indexed by variables or literals. Grown explicitly with `init`.
pub struct IdxVec<K: Idx, V> {
    vec: Vec<V>,
    ph: marker::PhantomData<K>,
}

impl<K: Idx, V> IdxVec<K, V> {
    pub fn new() -> Self {
        IdxVec {
            vec: Vec::new(),
            ph: marker::PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<V> {
        self.vec.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<V> {
        self.vec.iter_mut()
    }
}

impl<K: Idx, V: Default> IdxVec<K, V> {
    #[inline]
    pub fn init(&mut self, k: K) {
        while self.vec.len() <= k.idx() {
            self.vec.push(V::default());
        }
    }
}

impl<K: Idx, V> ops::Index<K> for IdxVec<K, V> {
    type Output = V;

    #[inline]
    fn index(&self, k: K) -> &V {
        &self.vec[k.idx()]
    }
}

impl<K: Idx, V> ops::IndexMut<K> for IdxVec<K, V> {
    #[inline]
    fn index_mut(&mut self, k: K) -> &mut V {
        &mut self.vec[k.idx()]
    }
}


/// Binary heap over indexable keys with position tracking, so a key's
/// priority can be updated in place. The ordering is supplied per call.
pub struct IdxHeap<K: Idx> {
    heap: Vec<K>,
    index: VecMap<usize>,
}

impl<K: Idx> IdxHeap<K> {
    pub fn new() -> Self {
        IdxHeap {
            heap: Vec::new(),
            index: VecMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(key.idx())
    }

    pub fn insert<F: Fn(K, K) -> bool>(&mut self, key: K, before: F) {
        if !self.contains(key) {
            let place = self.heap.len();
            self.heap.push(key);
            self.sift_up(place, &before);
        }
    }

    pub fn pop<F: Fn(K, K) -> bool>(&mut self, before: F) -> Option<K> {
        if self.heap.is_empty() {
            return None;
        }

        let top = self.heap.swap_remove(0);
        self.index.remove(top.idx());
        if !self.heap.is_empty() {
            self.sift_down(0, &before);
        }
        Some(top)
    }

    /// Restores heap order after the priority of `key` went up.
    pub fn decrease<F: Fn(K, K) -> bool>(&mut self, key: K, before: F) {
        if let Some(&place) = self.index.get(key.idx()) {
            self.sift_up(place, &before);
        }
    }

    pub fn rebuild<F: Fn(K, K) -> bool>(&mut self, keys: Vec<K>, before: F) {
        self.index.clear();
        self.heap = keys;
        for (i, k) in self.heap.iter().enumerate() {
            self.index.insert(k.idx(), i);
        }
        for i in (0..self.heap.len()).rev() {
            self.sift_down(i, &before);
        }
    }

    fn sift_up<F: Fn(K, K) -> bool>(&mut self, mut i: usize, before: &F) {
        let key = self.heap[i];
        while i > 0 {
            let parent = (i - 1) >> 1;
            if !before(key, self.heap[parent]) {
                break;
            }
            self.heap[i] = self.heap[parent];
            self.index.insert(self.heap[i].idx(), i);
            i = parent;
        }
        self.heap[i] = key;
        self.index.insert(key.idx(), i);
    }

    fn sift_down<F: Fn(K, K) -> bool>(&mut self, mut i: usize, before: &F) {
        let key = self.heap[i];
        loop {
            let left = 2 * i + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child = if right < self.heap.len() && before(self.heap[right], self.heap[left]) {
                right
            } else {
                left
            };

            if !before(self.heap[child], key) {
                break;
            }
            self.heap[i] = self.heap[child];
            self.index.insert(self.heap[i].idx(), i);
            i = child;
        }
        self.heap[i] = key;
        self.index.insert(key.idx(), i);
    }
}

impl<K: Idx> ops::Index<usize> for IdxHeap<K> {
    type Output = K;

    #[inline]
    fn index(&self, i: usize) -> &K {
        &self.heap[i]
    }
}
