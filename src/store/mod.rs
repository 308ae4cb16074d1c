//! Change-tracked property storage.
//!
//! [`PropertyTree`] mirrors a fixed, nested schema of player properties and
//! remembers which leaves changed since the last reset. Outbound
//! notifications are built from [`PropertyTree::diff`], so traffic stays
//! proportional to what actually changed even when the player pushes its
//! full state once a second.

use serde_json::{Map, Value};

/// A node in the change-tracked property tree.
///
/// Leaves hold a JSON value plus a dirty flag; inner nodes hold an ordered
/// set of named children. The dirty flag is set whenever an update stores a
/// value that differs (structurally) from the current one, and is cleared
/// only by an explicit [`PropertyTree::reset_dirty`], never by a read.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyTree {
    /// A single property value with its dirty flag.
    Leaf {
        /// Current value.
        value: Value,
        /// Whether the value changed since the last reset.
        dirty: bool,
    },

    /// A nested record of named properties, in schema order.
    Node {
        /// Child properties, in the order the schema declared them.
        children: Vec<(String, PropertyTree)>,
    },
}

impl PropertyTree {
    /// Builds a clean tree from a JSON schema of default values.
    ///
    /// Objects become nodes, everything else becomes a leaf holding the
    /// given default.
    pub fn from_schema(schema: &Value) -> Self {
        match schema {
            Value::Object(map) => PropertyTree::Node {
                children: map
                    .iter()
                    .map(|(key, child)| (key.clone(), PropertyTree::from_schema(child)))
                    .collect(),
            },
            other => PropertyTree::Leaf {
                value: other.clone(),
                dirty: false,
            },
        }
    }

    /// Sets the property at `path`, marking it dirty only if the stored
    /// value actually changes.
    ///
    /// When the target is a nested record and `new_value` is an object, the
    /// update recurses per key so that only the leaves whose value differs
    /// are marked. Paths or keys outside the schema are ignored; the schema
    /// is fixed at construction.
    pub fn update(&mut self, path: &[&str], new_value: Value) {
        match path.split_first() {
            None => self.apply(new_value),
            Some((head, rest)) => {
                if let PropertyTree::Node { children } = self
                    && let Some((_, child)) = children.iter_mut().find(|(key, _)| key == head)
                {
                    child.update(rest, new_value);
                }
            }
        }
    }

    fn apply(&mut self, new_value: Value) {
        match self {
            PropertyTree::Leaf { value, dirty } => {
                if *value != new_value {
                    *value = new_value;
                    *dirty = true;
                }
            }
            PropertyTree::Node { children } => {
                // Shape mismatches (non-object into a record) leave the
                // subtree unchanged.
                if let Value::Object(map) = new_value {
                    for (key, child_value) in map {
                        if let Some((_, child)) =
                            children.iter_mut().find(|(name, _)| *name == key)
                        {
                            child.apply(child_value);
                        }
                    }
                }
            }
        }
    }

    /// Returns the current value at `path`, if the path exists.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        match path.split_first() {
            None => match self {
                PropertyTree::Leaf { value, .. } => Some(value),
                PropertyTree::Node { .. } => None,
            },
            Some((head, rest)) => match self {
                PropertyTree::Node { children } => children
                    .iter()
                    .find(|(key, _)| key == head)
                    .and_then(|(_, child)| child.get(rest)),
                PropertyTree::Leaf { .. } => None,
            },
        }
    }

    /// Extracts the nested record of dirty leaves.
    ///
    /// Ancestor keys appear exactly when a dirty leaf exists below them.
    /// Returns `None` when nothing is dirty anywhere.
    pub fn diff(&self) -> Option<Value> {
        match self {
            PropertyTree::Leaf { value, dirty } => dirty.then(|| value.clone()),
            PropertyTree::Node { children } => {
                let mut result = Map::new();
                for (key, child) in children {
                    if let Some(changed) = child.diff() {
                        result.insert(key.clone(), changed);
                    }
                }
                (!result.is_empty()).then(|| Value::Object(result))
            }
        }
    }

    /// Sets every leaf's dirty flag to `flag`, recursively.
    ///
    /// Called with `true` once at session start to force a full initial
    /// snapshot, and with `false` after every diff emission.
    pub fn reset_dirty(&mut self, flag: bool) {
        match self {
            PropertyTree::Leaf { dirty, .. } => *dirty = flag,
            PropertyTree::Node { children } => {
                for (_, child) in children {
                    child.reset_dirty(flag);
                }
            }
        }
    }

    /// Returns the complete current value tree, ignoring dirty flags.
    pub fn snapshot(&self) -> Value {
        match self {
            PropertyTree::Leaf { value, .. } => value.clone(),
            PropertyTree::Node { children } => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.snapshot()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn player_schema() -> Value {
        json!({
            "playbackStatus": "stopped",
            "volume": 100,
            "metadata": {
                "title": "",
                "artist": ""
            }
        })
    }

    #[test]
    fn clean_tree_has_no_diff() {
        let tree = PropertyTree::from_schema(&player_schema());

        assert_eq!(tree.diff(), None);
    }

    #[test]
    fn update_marks_only_changed_leaves() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.update(&["volume"], json!(80));
        tree.update(&["playbackStatus"], json!("stopped"));

        assert_eq!(tree.diff(), Some(json!({ "volume": 80 })));
    }

    #[test]
    fn resending_equal_value_stays_clean() {
        let mut tree = PropertyTree::from_schema(&player_schema());
        tree.update(&["volume"], json!(80));
        tree.reset_dirty(false);

        tree.update(&["volume"], json!(80));

        assert_eq!(tree.diff(), None);
    }

    #[test]
    fn nested_update_marks_changed_leaves_recursively() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.update(&["metadata"], json!({ "title": "Song", "artist": "" }));

        assert_eq!(tree.diff(), Some(json!({ "metadata": { "title": "Song" } })));
    }

    #[test]
    fn nested_leaf_path_update() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.update(&["metadata", "artist"], json!("Band"));

        assert_eq!(
            tree.diff(),
            Some(json!({ "metadata": { "artist": "Band" } }))
        );
    }

    #[test]
    fn unknown_path_is_ignored() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.update(&["bogus"], json!(1));
        tree.update(&["metadata", "bogus"], json!(1));

        assert_eq!(tree.diff(), None);
    }

    #[test]
    fn shape_mismatch_leaves_subtree_unchanged() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.update(&["metadata"], json!("not a record"));

        assert_eq!(tree.diff(), None);
        assert_eq!(
            tree.get(&["metadata", "title"]),
            Some(&json!(""))
        );
    }

    #[test]
    fn reset_true_forces_full_snapshot() {
        let mut tree = PropertyTree::from_schema(&player_schema());

        tree.reset_dirty(true);

        assert_eq!(tree.diff(), Some(player_schema()));
    }

    #[test]
    fn reset_false_clears_everything() {
        let mut tree = PropertyTree::from_schema(&player_schema());
        tree.update(&["volume"], json!(10));
        tree.update(&["metadata", "title"], json!("x"));

        tree.reset_dirty(false);

        assert_eq!(tree.diff(), None);
    }

    #[test]
    fn dirty_survives_reads() {
        let mut tree = PropertyTree::from_schema(&player_schema());
        tree.update(&["volume"], json!(10));

        let _ = tree.diff();
        let _ = tree.get(&["volume"]);

        assert_eq!(tree.diff(), Some(json!({ "volume": 10 })));
    }

    #[test]
    fn snapshot_returns_everything_regardless_of_dirty() {
        let mut tree = PropertyTree::from_schema(&player_schema());
        tree.update(&["volume"], json!(55));
        tree.reset_dirty(false);

        assert_eq!(
            tree.snapshot(),
            json!({
                "playbackStatus": "stopped",
                "volume": 55,
                "metadata": { "title": "", "artist": "" }
            })
        );
    }

    proptest! {
        // Applying an arbitrary sequence of leaf updates must produce a diff
        // containing exactly the leaves whose final value differs from the
        // value at the last reset.
        #[test]
        fn diff_is_exactly_the_changed_leaves(
            updates in proptest::collection::vec(
                (
                    prop_oneof![
                        Just(vec!["playbackStatus"]),
                        Just(vec!["volume"]),
                        Just(vec!["metadata", "title"]),
                        Just(vec!["metadata", "artist"]),
                    ],
                    any::<i64>(),
                ),
                0..16,
            )
        ) {
            let schema = player_schema();
            let mut tree = PropertyTree::from_schema(&schema);

            let mut expected = PropertyTree::from_schema(&schema);
            for (path, raw) in &updates {
                let path: Vec<&str> = path.to_vec();
                tree.update(&path, json!(raw));
                expected.update(&path, json!(raw));
            }

            // Recompute the expected dirty set from first principles: a leaf
            // is dirty iff its final value differs from the schema default.
            let baseline = PropertyTree::from_schema(&schema);
            let mut check = baseline.clone();
            check.update(&[], expected.snapshot());
            prop_assert_eq!(tree.diff(), check.diff());
        }
    }
}
