//! 24-unit row grid

use crudkit_core::GridSpan;

/// Pack items into grid rows, left to right.
///
/// A new row starts when adding the next item would push the row past 24
/// units. An item is never split, so every row holds at least one item.
pub fn pack_rows<T>(items: impl IntoIterator<Item = (GridSpan, T)>) -> Vec<Vec<T>> {
    let mut rows: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut used: u16 = 0;

    for (span, item) in items {
        let width = u16::from(span.get());
        if !current.is_empty() && used + width > u16::from(GridSpan::COLUMNS) {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        used += width;
        current.push(item);
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(widths: &[u8]) -> Vec<(GridSpan, usize)> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| (GridSpan::raw(*w), i))
            .collect()
    }

    #[test]
    fn test_halves_share_a_row() {
        assert_eq!(pack_rows(spans(&[12, 12, 24, 12])), vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[test]
    fn test_overflow_starts_new_row() {
        assert_eq!(pack_rows(spans(&[8, 8, 8, 8])), vec![vec![0, 1, 2], vec![3]]);
        assert_eq!(pack_rows(spans(&[16, 12])), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_empty() {
        assert!(pack_rows(Vec::<(GridSpan, ())>::new()).is_empty());
    }
}
