//! Small collection wrappers shared across the pipeline.
//!
//! `Seq<T>` is an ordered sequence with the vocabulary the rest of the
//! pipeline expects (`headOption`/`tail`/`partitionCollect`/...), mirroring
//! the fp-ts-flavoured helpers the original converter built its rewrites on.
//! It is a thin newtype over `Vec<T>` — no new allocation strategy, just a
//! stable name for operations that recur in every transform pass.

use std::collections::HashSet;
use std::hash::Hash;

/// A predicate + transformer pair. `collect` applies `project` only where
/// `defined_at` holds, exactly like `PartialFunction::collect` in the spec.
pub struct PartialFn<'a, T, U> {
    defined_at: Box<dyn Fn(&T) -> bool + 'a>,
    project: Box<dyn Fn(T) -> U + 'a>,
}

impl<'a, T, U> PartialFn<'a, T, U> {
    pub fn new(defined_at: impl Fn(&T) -> bool + 'a, project: impl Fn(T) -> U + 'a) -> Self {
        Self {
            defined_at: Box::new(defined_at),
            project: Box::new(project),
        }
    }

    pub fn is_defined_at(&self, value: &T) -> bool {
        (self.defined_at)(value)
    }

    pub fn apply(&self, value: T) -> U {
        (self.project)(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Seq<T>(Vec<T>);

impl<T> Seq<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_vec(v: Vec<T>) -> Self {
        Self(v)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn length(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.0.get(i)
    }

    pub fn head(&self) -> Option<&T> {
        self.0.first()
    }

    pub fn tail(&self) -> Seq<T>
    where
        T: Clone,
    {
        if self.0.is_empty() {
            Seq::new()
        } else {
            Seq(self.0[1..].to_vec())
        }
    }

    pub fn init(&self) -> Seq<T>
    where
        T: Clone,
    {
        if self.0.is_empty() {
            Seq::new()
        } else {
            Seq(self.0[..self.0.len() - 1].to_vec())
        }
    }

    pub fn last(&self) -> Option<&T> {
        self.0.last()
    }

    pub fn reverse(&self) -> Seq<T>
    where
        T: Clone,
    {
        let mut v = self.0.clone();
        v.reverse();
        Seq(v)
    }

    pub fn concat(mut self, other: Seq<T>) -> Seq<T> {
        self.0.extend(other.0);
        self
    }

    pub fn append(mut self, value: T) -> Seq<T> {
        self.0.push(value);
        self
    }

    pub fn prepend(mut self, value: T) -> Seq<T> {
        self.0.insert(0, value);
        self
    }

    pub fn distinct_by<K: Eq + Hash>(&self, key: impl Fn(&T) -> K) -> Seq<T>
    where
        T: Clone,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for item in &self.0 {
            if seen.insert(key(item)) {
                out.push(item.clone());
            }
        }
        Seq(out)
    }

    pub fn distinct(&self) -> Seq<T>
    where
        T: Clone + Eq + Hash,
    {
        self.distinct_by(|x| x.clone())
    }

    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Seq<T>
    where
        T: Clone,
    {
        Seq(self.0.iter().filter(|x| pred(x)).cloned().collect())
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Seq<U> {
        Seq(self.0.iter().map(f).collect())
    }

    pub fn flat_map<U>(&self, f: impl Fn(&T) -> Seq<U>) -> Seq<U> {
        Seq(self.0.iter().flat_map(|x| f(x).0).collect())
    }

    pub fn fold_left<Acc>(&self, init: Acc, f: impl Fn(Acc, &T) -> Acc) -> Acc {
        self.0.iter().fold(init, f)
    }

    pub fn partition_collect<U>(&self, pf: &PartialFn<T, U>) -> (Seq<U>, Seq<T>)
    where
        T: Clone,
    {
        let mut matched = Vec::new();
        let mut rest = Vec::new();
        for item in &self.0 {
            if pf.is_defined_at(item) {
                matched.push(pf.apply(item.clone()));
            } else {
                rest.push(item.clone());
            }
        }
        (Seq(matched), Seq(rest))
    }

    pub fn partition_collect2<U, V>(
        &self,
        pf1: &PartialFn<T, U>,
        pf2: &PartialFn<T, V>,
    ) -> (Seq<U>, Seq<V>, Seq<T>)
    where
        T: Clone,
    {
        let mut m1 = Vec::new();
        let mut m2 = Vec::new();
        let mut rest = Vec::new();
        for item in &self.0 {
            if pf1.is_defined_at(item) {
                m1.push(pf1.apply(item.clone()));
            } else if pf2.is_defined_at(item) {
                m2.push(pf2.apply(item.clone()));
            } else {
                rest.push(item.clone());
            }
        }
        (Seq(m1), Seq(m2), Seq(rest))
    }

    pub fn collect_first<U>(&self, pf: &PartialFn<T, U>) -> Option<U>
    where
        T: Clone,
    {
        self.0
            .iter()
            .find(|x| pf.is_defined_at(x))
            .map(|x| pf.apply(x.clone()))
    }

    pub fn map_not_none_option<U>(&self, f: impl Fn(&T) -> Option<U>) -> Seq<U> {
        Seq(self.0.iter().filter_map(f).collect())
    }

    pub fn zip_with_index(&self) -> Seq<(T, usize)>
    where
        T: Clone,
    {
        Seq(self.0.iter().cloned().zip(0..).collect())
    }

    pub fn sort_by<K: Ord>(&self, key: impl Fn(&T) -> K) -> Seq<T>
    where
        T: Clone,
    {
        let mut v = self.0.clone();
        v.sort_by_key(key);
        Seq(v)
    }

    pub fn forall(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.0.iter().all(pred)
    }

    pub fn exists(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.0.iter().any(pred)
    }

    pub fn starts_with(&self, prefix: &Seq<T>) -> bool
    where
        T: PartialEq,
    {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> FromIterator<T> for Seq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Seq(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Seq<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Seq<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: PartialEq> PartialEq for Seq<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T: Eq> Eq for Seq<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_collect_splits_matched_from_rest() {
        let seq = Seq::from_vec(vec![1, 2, 3, 4, 5]);
        let pf = PartialFn::new(|x: &i32| x % 2 == 0, |x: i32| x * 10);
        let (matched, rest) = seq.partition_collect(&pf);
        assert_eq!(matched.into_vec(), vec![20, 40]);
        assert_eq!(rest.into_vec(), vec![1, 3, 5]);
    }

    #[test]
    fn distinct_preserves_first_seen_order() {
        let seq = Seq::from_vec(vec![1, 2, 1, 3, 2]);
        assert_eq!(seq.distinct().into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn starts_with_checks_prefix() {
        let seq = Seq::from_vec(vec![1, 2, 3]);
        let prefix = Seq::from_vec(vec![1, 2]);
        assert!(seq.starts_with(&prefix));
        assert!(!prefix.starts_with(&seq));
    }
}
