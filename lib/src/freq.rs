//! Frequency tables: counts per category label, with derived totals and percentages.

use crate::{clean::Taxonomy, ArcStr};
use serde::{Serialize, Serializer};
use std::{cmp::Ordering, collections::BTreeMap};

/// `count / total * 100`, or 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.
    } else {
        count as f64 / total as f64 * 100.
    }
}

/// [`percentage`] to one decimal place, `"0.0"` when `total` is 0.
pub fn format_percentage(count: usize, total: usize) -> String {
    format!("{:.1}", percentage(count, total))
}

/// Counts per label, kept in insertion order.
///
/// Tables built from a taxonomy start with every canonical label at zero, so the order is the
/// canonical order and empty categories are still present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<(ArcStr, usize)>,
    idx: BTreeMap<ArcStr, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the given labels pre-inserted at zero.
    pub fn with_labels<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::new();
        for label in labels {
            table.add_n(label.as_ref(), 0);
        }
        table
    }

    pub fn for_taxonomy<T: Taxonomy>() -> Self {
        Self::with_labels(T::ALL.iter().map(|c| c.label()))
    }

    pub fn add(&mut self, label: &str) {
        self.add_n(label, 1)
    }

    pub fn add_n(&mut self, label: &str, n: usize) {
        match self.idx.get(label) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                let label = ArcStr::from(label);
                self.idx.insert(label.clone(), self.entries.len());
                self.entries.push((label, n));
            }
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.idx.get(label).map_or(0, |&i| self.entries[i].1)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of labels (including ones with a zero count).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, usize)> + '_ {
        self.entries.iter().map(|(label, count)| (label, *count))
    }

    pub fn labels(&self) -> impl Iterator<Item = &ArcStr> + '_ {
        self.entries.iter().map(|(label, _)| label)
    }

    /// Share of the table total.
    pub fn percentage(&self, label: &str) -> f64 {
        percentage(self.count(label), self.total())
    }

    pub fn percentage_str(&self, label: &str) -> String {
        format_percentage(self.count(label), self.total())
    }

    /// A copy without the zero-count labels.
    pub fn non_zero(&self) -> Self {
        self.iter()
            .filter(|(_, count)| *count > 0)
            .collect_counts()
    }

    /// A copy ordered by count, largest first. Ties are ordered by label.
    pub fn sorted_desc(&self) -> Self {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| by_count_desc(a, b));
        entries.into_iter().collect_counts()
    }

    /// The first `n` entries.
    pub fn truncated(&self, n: usize) -> Self {
        self.iter().take(n).collect_counts()
    }

    /// The label with the largest non-zero count. Ties go to the earlier label.
    pub fn most_common(&self) -> Option<(&ArcStr, usize)> {
        self.iter().fold(None, |best, (label, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ if count > 0 => Some((label, count)),
            _ => best,
        })
    }

    /// The `n` largest entries, with the rest summed under `others_label`.
    ///
    /// The others entry is only present when something was folded into it.
    pub fn top_n_with_others(&self, n: usize, others_label: &str) -> Self {
        let sorted = self.non_zero().sorted_desc();
        let mut top = sorted.truncated(n);
        let rest: usize = sorted.iter().skip(n).map(|(_, count)| count).sum();
        if rest > 0 {
            top.add_n(others_label, rest);
        }
        top
    }
}

fn by_count_desc(a: &(&ArcStr, usize), b: &(&ArcStr, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

trait CollectCounts {
    fn collect_counts(self) -> FrequencyTable;
}

impl<'a, I> CollectCounts for I
where
    I: Iterator<Item = (&'a ArcStr, usize)>,
{
    fn collect_counts(self) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for (label, count) in self {
            table.add_n(label, count);
        }
        table
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    /// Count each label once per occurrence.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for label in iter {
            table.add(label.as_ref());
        }
        table
    }
}

/// Serialises as a list of `{label, count, percentage}` objects, in table order.
impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            label: &'a str,
            count: usize,
            percentage: f64,
        }

        let total = self.total();
        serializer.collect_seq(self.iter().map(|(label, count)| Entry {
            label,
            count,
            percentage: percentage(count, total),
        }))
    }
}
