use std::ops::RangeInclusive;

use crate::{Result, ScaleError};

/// A set of 0-based column indices held as sorted, non-overlapping
/// inclusive ranges, so membership never depends on how wide a range is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    ranges: Vec<RangeInclusive<usize>>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_range(&mut self, range: RangeInclusive<usize>) {
        if range.is_empty() {
            return;
        }
        self.ranges.push(range);
        self.ranges.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if *r.start() <= last.end().saturating_add(1) => {
                    if r.end() > last.end() {
                        *last = *last.start()..=*r.end();
                    }
                }
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
    }

    pub fn insert(&mut self, column: usize) {
        self.insert_range(column..=column);
    }

    pub fn contains(&self, column: usize) -> bool {
        let idx = self.ranges.partition_point(|r| *r.end() < column);
        self.ranges.get(idx).is_some_and(|r| r.contains(&column))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[RangeInclusive<usize>] {
        &self.ranges
    }
}

impl FromIterator<usize> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = ColumnSet::new();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

/// Resolve a comma-delimited list of 1-based column numbers and inclusive
/// `a-b` ranges (e.g. `"2-4,7"`) into 0-based column indices.
///
/// An empty or all-whitespace list resolves to the empty set.
pub fn parse_column_ranges(list: &str) -> Result<ColumnSet> {
    let mut columns = ColumnSet::new();
    if list.trim().is_empty() {
        return Ok(columns);
    }

    for item in list.split(',') {
        let item = item.trim();
        let (first, last) = match item.split_once('-') {
            Some((a, b)) => (parse_column_number(a, list)?, parse_column_number(b, list)?),
            None => {
                let n = parse_column_number(item, list)?;
                (n, n)
            }
        };
        if last < first {
            return Err(ScaleError::InvalidRange(format!(
                "{item:?} in {list:?} is reversed"
            )));
        }
        columns.insert_range((first - 1)..=(last - 1));
    }

    Ok(columns)
}

fn parse_column_number(text: &str, list: &str) -> Result<usize> {
    let n: usize = text.trim().parse().map_err(|_| {
        ScaleError::InvalidRange(format!("{text:?} in {list:?} is not a column number"))
    })?;
    if n == 0 {
        return Err(ScaleError::InvalidRange(format!(
            "column numbers in {list:?} start at 1"
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_range() {
        let cols = parse_column_ranges("2-4,7").unwrap();
        assert_eq!(cols.ranges(), &[1..=3, 6..=6]);
        assert!(!cols.contains(0));
        assert!(cols.contains(1));
        assert!(cols.contains(3));
        assert!(!cols.contains(4));
        assert!(cols.contains(6));
        assert!(!cols.contains(7));
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let cols = parse_column_ranges("1-3, 2 ,3-3").unwrap();
        assert_eq!(cols.ranges(), &[0..=2]);

        let adjacent = parse_column_ranges("5-6,1-2,3-4").unwrap();
        assert_eq!(adjacent.ranges(), &[0..=5]);
    }

    #[test]
    fn test_huge_range_stays_compact() {
        let list = format!("1-{}", usize::MAX);
        let cols = parse_column_ranges(&list).unwrap();
        assert_eq!(cols.ranges().len(), 1);
        assert!(cols.contains(0));
        assert!(cols.contains(usize::MAX - 1));
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_column_ranges("").unwrap().is_empty());
        assert!(parse_column_ranges("   ").unwrap().is_empty());
    }

    #[test]
    fn test_from_indices() {
        let cols: ColumnSet = [4, 0, 1].into_iter().collect();
        assert_eq!(cols.ranges(), &[0..=1, 4..=4]);
    }

    #[test]
    fn test_rejects_zero() {
        assert!(matches!(
            parse_column_ranges("0"),
            Err(ScaleError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_rejects_reversed_range() {
        assert!(parse_column_ranges("5-2").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_column_ranges("a").is_err());
        assert!(parse_column_ranges("1,,2").is_err());
        assert!(parse_column_ranges("1-").is_err());
    }
}
