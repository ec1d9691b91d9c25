use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::utils::numeric_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

/// Ordering between two trimmed cell texts.
///
/// Two cells that both read as numbers (see [`numeric_value`]) compare
/// numerically, and equal numbers compare `Equal`. Any other pair compares
/// like a collator: case-insensitive first, lowercase ahead of uppercase on
/// ties.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => collate(a, b),
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

/// Stable sort of `order` (indices into the row set) by the cell value the
/// accessor returns.
///
/// A column mixing numbers and text is not totally ordered by
/// [`compare_cells`], and `slice::sort_by` may panic on such input, so this
/// is a plain insertion sort.
pub fn sort_by_cell<F>(order: &mut [usize], direction: Direction, cell_of: F)
where
    F: Fn(usize) -> String,
{
    let mut keyed: Vec<(usize, String)> = order.iter().map(|&idx| (idx, cell_of(idx))).collect();
    for i in 1..keyed.len() {
        let mut j = i;
        while j > 0
            && direction.apply(compare_cells(&keyed[j - 1].1, &keyed[j].1)) == Ordering::Greater
        {
            keyed.swap(j - 1, j);
            j -= 1;
        }
    }
    for (slot, (idx, _)) in order.iter_mut().zip(keyed) {
        *slot = idx;
    }
}
