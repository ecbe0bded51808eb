//! Flattening of nested values
//!
//! Traversal is depth-first and left-to-right over an explicit work stack, so
//! nesting depth is bounded by memory rather than by the call stack. Text is
//! always a leaf. Shared handles are tracked in a "currently visiting" set
//! keyed by allocation identity; reaching a handle that is still being
//! visited fails with [`FlattenError::Cyclic`].

use crate::core::value::{SharedValue, Value};
use crate::error::FlattenError;
use std::collections::HashSet;

/// Flatten `value` with default settings.
///
/// Atomic values come back unchanged. Containers come back as a new container
/// of the same kind holding every leaf in pre-order.
///
/// ```
/// use nxmisc::core::flatten::flatten;
/// use nxmisc::core::value::Value;
///
/// let nested = Value::list(vec![
///     Value::from(1),
///     Value::list([2, 3]),
///     Value::list(vec![Value::list([4])]),
/// ]);
/// assert_eq!(flatten(&nested).unwrap(), Value::list([1, 2, 3, 4]));
/// ```
pub fn flatten(value: &Value) -> Result<Value, FlattenError> {
    Flattener::new().flatten(value)
}

/// Configurable flattener
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    max_depth: Option<usize>,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many containers may be open at once. `None` means unbounded.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn flatten(&self, value: &Value) -> Result<Value, FlattenError> {
        match value.container_kind() {
            Some(kind) => Ok(kind.build(self.leaves(value)?)),
            None => Ok(value.clone()),
        }
    }

    /// Leaves of `value` in pre-order. An atomic value is its own single leaf.
    pub fn leaves(&self, value: &Value) -> Result<Vec<Value>, FlattenError> {
        let mut leaves = Vec::new();
        self.flatten_into(value, &mut leaves)?;
        Ok(leaves)
    }

    /// Push the leaves of `value` into `sink`, returning how many were pushed.
    ///
    /// On error, leaves found before the failure have already been pushed.
    pub fn flatten_into<E>(&self, value: &Value, sink: &mut E) -> Result<usize, FlattenError>
    where
        E: Extend<Value>,
    {
        if value.is_atomic() {
            sink.extend(std::iter::once(value.clone()));
            return Ok(1);
        }
        Walk::new(self.max_depth).run(value, sink)
    }
}

/// One step of a snapshot taken under a shared handle's read lock.
///
/// Owned containers inside the handle are expanded while the lock is held;
/// nested handles are left for the walk to open after the lock is released.
enum Entry {
    Leaf(Value),
    Shared { handle: SharedValue, depth: usize },
    Exceeded { limit: usize },
}

enum Items<'a> {
    Borrowed {
        iter: std::slice::Iter<'a, Value>,
        depth: usize,
    },
    Snapshot(std::vec::IntoIter<Entry>),
}

struct Frame<'a> {
    items: Items<'a>,
    aliases: Vec<usize>,
}

enum Step<'a> {
    Borrowed(&'a Value, usize),
    Entry(Entry),
}

struct Walk<'a> {
    stack: Vec<Frame<'a>>,
    visiting: HashSet<usize>,
    max_depth: Option<usize>,
    count: usize,
}

impl<'a> Walk<'a> {
    fn new(max_depth: Option<usize>) -> Self {
        Self {
            stack: Vec::new(),
            visiting: HashSet::new(),
            max_depth,
            count: 0,
        }
    }

    fn run<E>(mut self, root: &'a Value, sink: &mut E) -> Result<usize, FlattenError>
    where
        E: Extend<Value>,
    {
        self.step(Step::Borrowed(root, 0), sink)?;

        while let Some(frame) = self.stack.last_mut() {
            let next = match &mut frame.items {
                Items::Borrowed { iter, depth } => {
                    let depth = *depth;
                    iter.next().map(|value| Step::Borrowed(value, depth))
                }
                Items::Snapshot(entries) => entries.next().map(Step::Entry),
            };

            match next {
                Some(step) => self.step(step, sink)?,
                None => {
                    if let Some(done) = self.stack.pop() {
                        for id in done.aliases {
                            self.visiting.remove(&id);
                        }
                    }
                }
            }
        }

        Ok(self.count)
    }

    /// `depth` is the number of containers open around the value
    fn step<E>(&mut self, step: Step<'a>, sink: &mut E) -> Result<(), FlattenError>
    where
        E: Extend<Value>,
    {
        match step {
            Step::Borrowed(Value::List(items) | Value::Tuple(items), depth) => {
                self.check_depth(depth + 1)?;
                self.stack.push(Frame {
                    items: Items::Borrowed {
                        iter: items.iter(),
                        depth: depth + 1,
                    },
                    aliases: Vec::new(),
                });
            }
            Step::Borrowed(Value::Shared(handle), depth) => self.open_shared(handle, depth, sink)?,
            Step::Borrowed(leaf, _) => self.emit(leaf.clone(), sink),
            Step::Entry(Entry::Leaf(leaf)) => self.emit(leaf, sink),
            Step::Entry(Entry::Shared { handle, depth }) => {
                self.open_shared(&handle, depth, sink)?
            }
            Step::Entry(Entry::Exceeded { limit }) => {
                return Err(FlattenError::DepthExceeded { limit });
            }
        }
        Ok(())
    }

    fn emit<E>(&mut self, leaf: Value, sink: &mut E)
    where
        E: Extend<Value>,
    {
        sink.extend(std::iter::once(leaf));
        self.count += 1;
    }

    fn check_depth(&self, depth: usize) -> Result<(), FlattenError> {
        match self.max_depth {
            Some(limit) if depth > limit => Err(FlattenError::DepthExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn open_shared<E>(
        &mut self,
        handle: &SharedValue,
        depth: usize,
        sink: &mut E,
    ) -> Result<(), FlattenError>
    where
        E: Extend<Value>,
    {
        if handle.resolve_with(Value::container_kind).flatten().is_none() {
            self.emit(Value::Shared(handle.clone()), sink);
            return Ok(());
        }

        self.check_depth(depth + 1)?;
        let aliases = handle.alias_chain();
        if aliases.iter().any(|id| self.visiting.contains(id)) {
            return Err(FlattenError::Cyclic { depth });
        }

        let max_depth = self.max_depth;
        let entries = handle
            .resolve_with(|value| snapshot(value, depth + 1, max_depth))
            .unwrap_or_default();

        self.visiting.extend(aliases.iter().copied());
        self.stack.push(Frame {
            items: Items::Snapshot(entries.into_iter()),
            aliases,
        });
        Ok(())
    }
}

/// Expand the owned containers of `container` without cloning any of them.
///
/// `depth` is the depth of `container` itself. Only leaves are cloned, so the
/// snapshot stays shallow however deep the value is.
fn snapshot(container: &Value, depth: usize, max_depth: Option<usize>) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut stack = match container.items() {
        Some(items) => vec![items.iter()],
        None => return entries,
    };

    loop {
        let current = depth + stack.len().saturating_sub(1);
        let next = match stack.last_mut() {
            Some(iter) => iter.next(),
            None => break,
        };

        match next {
            None => {
                stack.pop();
            }
            Some(Value::List(items) | Value::Tuple(items)) => {
                if let Some(limit) = max_depth.filter(|limit| current + 1 > *limit) {
                    entries.push(Entry::Exceeded { limit });
                    break;
                }
                stack.push(items.iter());
            }
            Some(Value::Shared(handle)) => entries.push(Entry::Shared {
                handle: handle.clone(),
                depth: current,
            }),
            Some(leaf) => entries.push(Entry::Leaf(leaf.clone())),
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_atomic_values_are_returned_unchanged() {
        for atom in [
            Value::Null,
            Value::from(7),
            Value::from(1.5),
            Value::from("spam"),
            from_json(json!({"a": [1, 2]})),
        ] {
            assert_eq!(flatten(&atom).expect("atoms never fail"), atom);
        }
    }

    #[test]
    fn test_mixed_depth() {
        let nested = from_json(json!([1, [2, 3, [4, 5]], 6]));
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            from_json(json!([1, 2, 3, 4, 5, 6]))
        );
    }

    #[test]
    fn test_strings_are_never_split() {
        let nested = from_json(json!(["ab", ["cd", "ef"]]));
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            from_json(json!(["ab", "cd", "ef"]))
        );
    }

    #[test]
    fn test_empty_containers_contribute_nothing() {
        let nested = from_json(json!([[], [1, []], 2]));
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            from_json(json!([1, 2]))
        );
        assert_eq!(
            flatten(&from_json(json!([]))).expect("flatten succeeds"),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_deeply_nested_singleton() {
        let nested = from_json(json!([[[[5]]]]));
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            from_json(json!([5]))
        );
    }

    #[test]
    fn test_already_flat_sequence_is_unchanged() {
        let flat = from_json(json!([1, "two", 3.0, null]));
        assert_eq!(flatten(&flat).expect("flatten succeeds"), flat);
    }

    #[test]
    fn test_objects_are_leaves() {
        let nested = from_json(json!([{"k": [1, 2]}, [3]]));
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            from_json(json!([{"k": [1, 2]}, 3]))
        );
    }

    #[test]
    fn test_container_kind_is_preserved() {
        let nested = Value::tuple(vec![Value::from(1), Value::list([2, 3])]);
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            Value::tuple([1, 2, 3])
        );

        let nested = Value::list(vec![Value::tuple([1, 2]), Value::from(3)]);
        assert_eq!(
            flatten(&nested).expect("flatten succeeds"),
            Value::list([1, 2, 3])
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let nested = from_json(json!([1, [2, [3]]]));
        let before = nested.clone();
        let _ = flatten(&nested).expect("flatten succeeds");
        assert_eq!(nested, before);
    }

    #[test]
    fn test_very_deep_nesting_does_not_overflow_the_stack() {
        let mut nested = Value::from(0);
        for _ in 0..100_000 {
            nested = Value::List(vec![nested]);
        }
        let leaves = Flattener::new().leaves(&nested).expect("flatten succeeds");
        assert_eq!(leaves, vec![Value::from(0)]);
        // Dropping a deeply nested Vec chain recurses, so leak it in the test.
        std::mem::forget(nested);
    }

    #[test]
    fn test_very_deep_nesting_behind_a_shared_handle() {
        let mut nested = Value::from(0);
        for _ in 0..100_000 {
            nested = Value::List(vec![nested]);
        }
        let root = Value::List(vec![nested]).shared();
        let leaves = Flattener::new().leaves(&root).expect("flatten succeeds");
        assert_eq!(leaves, vec![Value::from(0)]);
        std::mem::forget(root);
    }

    #[test]
    fn test_max_depth_counts_containers_inside_shared_handles() {
        let root = Value::list(vec![from_json(json!([[1]])).shared()]);
        assert_eq!(
            Flattener::new().with_max_depth(Some(2)).leaves(&root),
            Err(FlattenError::DepthExceeded { limit: 2 })
        );
        assert_eq!(
            Flattener::new()
                .with_max_depth(Some(3))
                .leaves(&root)
                .expect("within the limit"),
            vec![Value::from(1)]
        );
    }

    #[test]
    fn test_nested_shared_handles_keep_pre_order() {
        let inner = Value::list(["b", "c"]).shared();
        let outer = Value::list(vec![
            Value::from("a"),
            Value::list(vec![inner]),
            Value::from("d"),
        ])
        .shared();
        let root = Value::tuple(vec![outer, Value::from("e")]);
        assert_eq!(
            flatten(&root).expect("flatten succeeds"),
            Value::tuple(["a", "b", "c", "d", "e"])
        );
    }

    #[test]
    fn test_max_depth_is_enforced() {
        let nested = from_json(json!([[[1]]]));
        let flattener = Flattener::new().with_max_depth(Some(2));
        assert_eq!(
            flattener.flatten(&nested),
            Err(FlattenError::DepthExceeded { limit: 2 })
        );

        let flattener = Flattener::new().with_max_depth(Some(3));
        assert_eq!(
            flattener.flatten(&nested).expect("within the limit"),
            from_json(json!([1]))
        );
    }

    #[test]
    fn test_shared_containers_are_followed() {
        let inner = Value::list([2, 3]).shared();
        let nested = Value::list(vec![Value::from(1), inner.clone(), inner]);
        assert_eq!(
            flatten(&nested).expect("aliasing is not a cycle"),
            Value::list([1, 2, 3, 2, 3])
        );
    }

    #[test]
    fn test_shared_root_builds_the_inner_kind() {
        let root = Value::tuple(vec![Value::from("a"), Value::list(["b"])]).shared();
        assert_eq!(
            flatten(&root).expect("flatten succeeds"),
            Value::tuple(["a", "b"])
        );
    }

    #[test]
    fn test_cycle_is_reported() {
        let handle = SharedValue::new(Value::list([1]));
        handle.update(|value| {
            if let Value::List(items) = value {
                items.push(Value::list(vec![Value::Shared(handle.clone())]));
            }
        });

        let result = flatten(&Value::Shared(handle.clone()));
        assert_eq!(result, Err(FlattenError::Cyclic { depth: 2 }));

        // break the cycle so the handle can be freed
        handle.set(Value::Null);
    }

    #[test]
    fn test_flatten_into_extends_an_existing_sink() {
        let mut sink = vec![Value::from("start")];
        let pushed = Flattener::new()
            .flatten_into(&from_json(json!([[1], 2])), &mut sink)
            .expect("flatten succeeds");
        assert_eq!(pushed, 2);
        assert_eq!(sink, vec![Value::from("start"), Value::from(1), Value::from(2)]);

        let pushed = Flattener::new()
            .flatten_into(&Value::from("atom"), &mut sink)
            .expect("atoms never fail");
        assert_eq!(pushed, 1);
        assert_eq!(sink.last(), Some(&Value::from("atom")));
    }

    #[test]
    fn test_flatten_is_usable_across_threads() {
        let nested = std::sync::Arc::new(from_json(json!([1, [2, [3]]])));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let nested = std::sync::Arc::clone(&nested);
                std::thread::spawn(move || flatten(&nested))
            })
            .collect();
        for handle in handles {
            let result = handle.join().expect("thread completes");
            assert_eq!(result, Ok(from_json(json!([1, 2, 3]))));
        }
    }
}
