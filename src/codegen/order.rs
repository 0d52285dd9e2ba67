//! Emission order
//!
//! A class can only be emitted after its base class. Items are taken from a
//! work queue in their original order; an item whose base has not been
//! emitted yet is postponed to the back of the queue and retried. If a full
//! pass over the queue emits nothing, the remaining items wait on each other
//! and ordering fails.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::error::{Error, Result};

/// Order `items` so that every item follows the item it depends on.
///
/// `key` names an item; `dependency` names the item it must follow, if any.
/// A dependency that names no item in the list does not hold anything back.
pub fn emission_order<T, K, D>(items: Vec<T>, key: K, dependency: D) -> Result<Vec<T>>
where
    K: Fn(&T) -> &str,
    D: Fn(&T) -> Option<&str>,
{
    let known: HashSet<String> = items.iter().map(|item| key(item).to_string()).collect();
    let mut queue: VecDeque<T> = items.into();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut ordered = Vec::with_capacity(queue.len());
    let mut postponed_in_a_row = 0;

    while let Some(item) = queue.pop_front() {
        let ready = match dependency(&item) {
            Some(dep) => !known.contains(dep) || emitted.contains(dep),
            None => true,
        };
        if ready {
            emitted.insert(key(&item).to_string());
            ordered.push(item);
            postponed_in_a_row = 0;
            continue;
        }

        trace!(item = key(&item), "postponed");
        queue.push_back(item);
        postponed_in_a_row += 1;
        if postponed_in_a_row > queue.len() {
            let mut waiting: Vec<String> = queue.iter().map(|i| key(i).to_string()).collect();
            waiting.sort();
            return Err(Error::EmissionDeadlock(waiting));
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: &[(&'static str, Option<&'static str>)]) -> Result<Vec<&'static str>> {
        emission_order(items.to_vec(), |i| i.0, |i| i.1)
            .map(|ordered| ordered.into_iter().map(|i| i.0).collect())
    }

    #[test]
    fn test_base_before_derived() {
        let ordered = order(&[("square", Some("shape")), ("circle", Some("shape")), ("shape", None)])
            .unwrap();
        assert_eq!(ordered, vec!["shape", "square", "circle"]);
    }

    #[test]
    fn test_chain_is_resolved() {
        let ordered = order(&[("c", Some("b")), ("b", Some("a")), ("a", None)]).unwrap();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_dependency_does_not_block() {
        let ordered = order(&[("x", Some("external"))]).unwrap();
        assert_eq!(ordered, vec!["x"]);
    }

    #[test]
    fn test_cycle_is_a_deadlock() {
        let err = order(&[("a", Some("b")), ("b", Some("a")), ("c", None)]).unwrap_err();
        match err {
            Error::EmissionDeadlock(waiting) => assert_eq!(waiting, vec!["a", "b"]),
            other => panic!("unexpected error: {}", other),
        }
    }
}
