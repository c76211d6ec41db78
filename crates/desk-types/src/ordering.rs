//! Reordering for ranked lists (SLA policies, custom fields, statuses,
//! workflows).
//!
//! The dashboard reorders these lists by drag and drop. Here a move is an
//! explicit pure function: the item at `from` is removed and reinserted at
//! `to`, and every item's `order` is rewritten to its new 1-based position.

use crate::error::TypeError;

/// An item carrying an explicit rank. Lower ranks come first.
pub trait Ordered {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Rewrite `order` to match list position (1-based).
pub fn reindex<T: Ordered>(items: &mut [T]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.set_order(i as u32 + 1);
    }
}

/// Move the item at `from` to index `to`, returning the re-indexed list.
///
/// `to` is interpreted against the list after removal, which is what a
/// drop target reports. The input slice is left untouched.
pub fn move_item<T: Ordered + Clone>(
    items: &[T],
    from: usize,
    to: usize,
) -> Result<Vec<T>, TypeError> {
    let len = items.len();
    if from >= len {
        return Err(TypeError::IndexOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(TypeError::IndexOutOfRange { index: to, len });
    }

    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    reindex(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        name: &'static str,
        order: u32,
    }

    impl Ordered for Row {
        fn order(&self) -> u32 {
            self.order
        }
        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "urgent", order: 1 },
            Row { name: "enterprise", order: 2 },
            Row { name: "default", order: 3 },
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[test]
    fn move_down() {
        let moved = move_item(&rows(), 0, 2).unwrap();
        assert_eq!(names(&moved), ["enterprise", "default", "urgent"]);
        assert_eq!(moved.iter().map(|r| r.order).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn move_up() {
        let moved = move_item(&rows(), 2, 0).unwrap();
        assert_eq!(names(&moved), ["default", "urgent", "enterprise"]);
        assert_eq!(moved[0].order, 1);
    }

    #[test]
    fn move_in_place_still_reindexes() {
        let mut input = rows();
        input[0].order = 10;
        let moved = move_item(&input, 1, 1).unwrap();
        assert_eq!(names(&moved), names(&rows()));
        assert_eq!(moved[0].order, 1);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = move_item(&rows(), 3, 0).unwrap_err();
        assert_eq!(err, TypeError::IndexOutOfRange { index: 3, len: 3 });
        assert!(move_item(&rows(), 0, 5).is_err());
        assert!(move_item::<Row>(&[], 0, 0).is_err());
    }

    proptest! {
        #[test]
        fn move_preserves_items_and_reindexes(len in 1usize..12, a in 0usize..12, b in 0usize..12) {
            let from = a % len;
            let to = b % len;
            let input: Vec<Row> = (0..len)
                .map(|i| Row { name: "x", order: (i as u32) * 7 + 3 })
                .collect();
            let moved = move_item(&input, from, to).unwrap();

            prop_assert_eq!(moved.len(), len);
            for (i, row) in moved.iter().enumerate() {
                prop_assert_eq!(row.order, i as u32 + 1);
            }
        }

        #[test]
        fn moved_item_lands_at_target(len in 2usize..10, a in 0usize..10, b in 0usize..10) {
            let from = a % len;
            let to = b % len;
            let labels = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
            let input: Vec<Row> = (0..len)
                .map(|i| Row { name: labels[i], order: i as u32 + 1 })
                .collect();
            let moved = move_item(&input, from, to).unwrap();
            prop_assert_eq!(moved[to].name, labels[from]);
        }
    }
}
