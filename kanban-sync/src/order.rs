//! Reordering rules for drag-and-drop.
//!
//! These functions never mutate their inputs. They return the next sequence (or
//! sequences) or `None` when the gesture is a no-op: a self-drop, or an item that
//! is not where the caller said it was.
//!
//! Card drops use *insert-before* semantics measured against the sequence with the
//! dragged item already removed. Dropping onto a card always lands directly in
//! front of it, whichever direction the drag came from:
//!
//! ```
//! use kanban_sync::order::move_within;
//!
//! let seq = ["A", "B", "C"];
//! assert_eq!(move_within(&seq, &"A", Some(&"C")), Some(vec!["B", "A", "C"]));
//! assert_eq!(move_within(&seq, &"C", Some(&"A")), Some(vec!["C", "A", "B"]));
//! ```
//!
//! List drops re-insert at the target's index *before* removal, so the dragged
//! list takes over the target's slot.

/// Move `item` within `seq`, inserting it immediately before `before`, or at the
/// end when `before` is `None` or no longer present.
pub fn move_within<T: PartialEq + Clone>(seq: &[T], item: &T, before: Option<&T>) -> Option<Vec<T>> {
    if before == Some(item) {
        return None;
    }

    let from = seq.iter().position(|x| x == item)?;
    let mut next = seq.to_vec();
    let moved = next.remove(from);
    let at = insertion_index(&next, before);
    next.insert(at, moved);
    Some(next)
}

/// Move `item` out of `source` and into `target` before `before` (or at the end).
///
/// Returns the new `(source, target)` pair.
pub fn transfer<T: PartialEq + Clone>(
    source: &[T],
    target: &[T],
    item: &T,
    before: Option<&T>,
) -> Option<(Vec<T>, Vec<T>)> {
    let from = source.iter().position(|x| x == item)?;
    let mut next_source = source.to_vec();
    let moved = next_source.remove(from);

    let mut next_target = target.to_vec();
    let at = insertion_index(&next_target, before);
    next_target.insert(at, moved);
    Some((next_source, next_target))
}

/// Move `item` into the slot currently held by `target`.
///
/// Moving backwards pushes `target` and everything after it one place down; moving
/// forwards puts `item` right after `target`.
pub fn move_to_slot<T: PartialEq + Clone>(seq: &[T], item: &T, target: &T) -> Option<Vec<T>> {
    if item == target {
        return None;
    }

    let from = seq.iter().position(|x| x == item)?;
    let to = seq.iter().position(|x| x == target)?;
    let mut next = seq.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}

fn insertion_index<T: PartialEq>(seq: &[T], before: Option<&T>) -> usize {
    before
        .and_then(|b| seq.iter().position(|x| x == b))
        .unwrap_or(seq.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_move_forward_lands_before_target() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"A", Some(&"C")), Some(vec!["B", "A", "C"]));
    }

    #[test]
    fn test_move_backward_lands_before_target() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"C", Some(&"A")), Some(vec!["C", "A", "B"]));
    }

    #[test]
    fn test_move_onto_next_neighbour_is_stable() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"A", Some(&"B")), Some(vec!["A", "B", "C"]));
    }

    #[test]
    fn test_move_to_end() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"A", None), Some(vec!["B", "C", "A"]));
    }

    #[test]
    fn test_self_drop_is_noop() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"B", Some(&"B")), None);
        assert_eq!(move_to_slot(&seq, &"B", &"B"), None);
    }

    #[test]
    fn test_missing_item_is_noop() {
        let seq = ["A", "B"];
        assert_eq!(move_within(&seq, &"Z", None), None);
        assert_eq!(transfer(&seq, &["X"], &"Z", None), None);
        assert_eq!(move_to_slot(&seq, &"Z", &"A"), None);
        assert_eq!(move_to_slot(&seq, &"A", &"Z"), None);
    }

    #[test]
    fn test_unknown_before_appends() {
        let seq = ["A", "B", "C"];
        assert_eq!(move_within(&seq, &"A", Some(&"Q")), Some(vec!["B", "C", "A"]));
    }

    #[test]
    fn test_transfer_before_target() {
        let (source, target) = transfer(&["A", "B"], &["X", "Y"], &"A", Some(&"Y")).unwrap();
        assert_eq!(source, vec!["B"]);
        assert_eq!(target, vec!["X", "A", "Y"]);
    }

    #[test]
    fn test_transfer_before_itself_appends() {
        let (source, target) = transfer(&["A", "B"], &["X"], &"A", Some(&"A")).unwrap();
        assert_eq!(source, vec!["B"]);
        assert_eq!(target, vec!["X", "A"]);
    }

    #[test]
    fn test_transfer_into_empty() {
        let empty: [&str; 0] = [];
        let (source, target) = transfer(&["c1", "c2"], &empty, &"c1", None).unwrap();
        assert_eq!(source, vec!["c2"]);
        assert_eq!(target, vec!["c1"]);
    }

    #[test]
    fn test_list_moves_backward_into_slot() {
        let seq = ["L1", "L2", "L3"];
        assert_eq!(move_to_slot(&seq, &"L3", &"L1"), Some(vec!["L3", "L1", "L2"]));
    }

    #[test]
    fn test_list_moves_forward_into_slot() {
        let seq = ["L1", "L2", "L3"];
        assert_eq!(move_to_slot(&seq, &"L1", &"L3"), Some(vec!["L2", "L3", "L1"]));
    }

    fn sorted(mut v: Vec<u8>) -> Vec<u8> {
        v.sort_unstable();
        v
    }

    proptest! {
        #[test]
        fn prop_move_within_is_permutation(len in 1usize..12, from in 0usize..12, before in proptest::option::of(0usize..12)) {
            let seq: Vec<u8> = (0..len as u8).collect();
            let item = (from % len) as u8;
            let before = before.map(|b| (b % len) as u8);
            if let Some(next) = move_within(&seq, &item, before.as_ref()) {
                prop_assert_eq!(sorted(next.clone()), seq.clone());
                if let Some(b) = before {
                    let i = next.iter().position(|x| *x == item).unwrap();
                    prop_assert_eq!(next[i + 1], b);
                }
            } else {
                prop_assert_eq!(before, Some(item));
            }
        }

        #[test]
        fn prop_transfer_conserves_items(src_len in 1usize..8, dst_len in 0usize..8, pick in 0usize..8) {
            let source: Vec<u8> = (0..src_len as u8).collect();
            let target: Vec<u8> = (100..100 + dst_len as u8).collect();
            let item = (pick % src_len) as u8;
            let (s, t) = transfer(&source, &target, &item, None).unwrap();
            prop_assert_eq!(s.len() + t.len(), src_len + dst_len);
            prop_assert!(!s.contains(&item));
            prop_assert_eq!(t.last().copied(), Some(item));
        }
    }
}
