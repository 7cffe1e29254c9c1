//! Adaptive symbol frequency tables.
//!
//! A table keeps a count per symbol and assigns each symbol a half-open cumulative
//! range `[low, high)` so that the ranges partition `[0, total)` contiguously. Ranges
//! are laid out in first-insertion order, which is also the order the decoder scans
//! them in, so two tables fed the same sequence of updates always agree exactly.

use std::collections::HashMap;
use std::ops::Range;

use super::Symbol;

/// Symbol counts and their cumulative ranges for a single context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    /// Distinct symbols in first-insertion order.
    alphabet: Vec<Symbol>,
    /// Position of each symbol in `alphabet`.
    positions: HashMap<Symbol, usize>,
    /// Count per symbol, parallel to `alphabet`.
    frequencies: Vec<u64>,
    /// Upper bound of each symbol's range as of the last recompute.
    /// `bounds[i - 1]..bounds[i]` is the range of `alphabet[i]`.
    bounds: Vec<u64>,
    /// Sum of all counts.
    total: u64,
}

impl FrequencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table by adding each symbol in turn and recomputing ranges once.
    ///
    /// Repeated symbols accumulate counts.
    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut table = Self::new();
        for symbol in symbols {
            table.add(symbol);
        }
        table.recompute_ranges();
        table
    }

    /// A table holding every byte value plus `eof`, each with count 1.
    pub fn byte_alphabet(eof: Symbol) -> Self {
        Self::from_symbols((0..=255).chain(std::iter::once(eof)))
    }

    /// Count one occurrence of `symbol` without touching the ranges.
    ///
    /// Unseen symbols are appended to the alphabet with count 1.
    pub fn add(&mut self, symbol: Symbol) {
        match self.positions.get(&symbol) {
            Some(&index) => self.frequencies[index] += 1,
            None => {
                self.positions.insert(symbol, self.alphabet.len());
                self.alphabet.push(symbol);
                self.frequencies.push(1);
            }
        }
        self.total += 1;
    }

    /// Count one occurrence of `symbol` and recompute all ranges.
    pub fn update_freqs(&mut self, symbol: Symbol) {
        self.add(symbol);
        self.recompute_ranges();
    }

    /// Rebuild the cumulative ranges from the current counts.
    pub fn recompute_ranges(&mut self) {
        self.bounds.clear();
        let mut accumulated = 0u64;
        for &count in &self.frequencies {
            accumulated += count;
            self.bounds.push(accumulated);
        }
    }

    /// Whether `symbol` has been added to this table.
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.positions.contains_key(&symbol)
    }

    /// Count for `symbol`, or 0 if it was never added.
    pub fn frequency(&self, symbol: Symbol) -> u64 {
        self.positions
            .get(&symbol)
            .map_or(0, |&index| self.frequencies[index])
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Distinct symbols in first-insertion order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.alphabet.len()
    }

    /// Whether no symbol has been added yet.
    pub fn is_empty(&self) -> bool {
        self.alphabet.is_empty()
    }

    /// The cumulative range of `symbol`, if it had one at the last recompute.
    pub fn range(&self, symbol: Symbol) -> Option<Range<u64>> {
        let index = *self.positions.get(&symbol)?;
        self.range_at(index)
    }

    /// Find the symbol whose range contains `value`.
    ///
    /// Ranges are contiguous and increasing in alphabet order, so the first range in
    /// scan order that contains `value` is found by bisecting the upper bounds.
    pub fn symbol_for(&self, value: u64) -> Option<(Symbol, Range<u64>)> {
        let index = self.bounds.partition_point(|&high| high <= value);
        let range = self.range_at(index)?;
        Some((self.alphabet[index], range))
    }

    /// Every symbol with its cumulative range, in alphabet order.
    pub fn ranges(&self) -> impl Iterator<Item = (Symbol, Range<u64>)> + '_ {
        (0..self.bounds.len()).filter_map(move |index| {
            self.range_at(index)
                .map(|range| (self.alphabet[index], range))
        })
    }

    fn range_at(&self, index: usize) -> Option<Range<u64>> {
        let high = *self.bounds.get(index)?;
        let low = if index == 0 { 0 } else { self.bounds[index - 1] };
        Some(low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(table: &FrequencyTable) {
        let mut expected_low = 0;
        let ranges: Vec<_> = table.ranges().collect();
        assert_eq!(ranges.len(), table.len());
        for ((symbol, range), &alpha) in ranges.iter().zip(table.alphabet()) {
            assert_eq!(*symbol, alpha);
            assert_eq!(range.start, expected_low);
            assert!(range.end > range.start, "zero-width range for {symbol}");
            assert_eq!(range.end - range.start, table.frequency(*symbol));
            expected_low = range.end;
        }
        assert_eq!(expected_low, table.total());
    }

    #[test]
    fn test_add_is_lazy() {
        let mut table = FrequencyTable::new();
        table.add(7);
        table.add(7);
        table.add(3);
        assert_eq!(table.total(), 3);
        assert_eq!(table.frequency(7), 2);
        assert_eq!(table.range(7), None);

        table.recompute_ranges();
        assert_eq!(table.range(7), Some(0..2));
        assert_eq!(table.range(3), Some(2..3));
    }

    #[test]
    fn test_update_freqs_recomputes() {
        let mut table = FrequencyTable::from_symbols([10, 20]);
        table.update_freqs(10);
        assert_eq!(table.range(10), Some(0..2));
        assert_eq!(table.range(20), Some(2..3));

        table.update_freqs(30);
        assert_eq!(table.alphabet(), &[10, 20, 30]);
        assert_eq!(table.range(30), Some(3..4));
        assert_partition(&table);
    }

    #[test]
    fn test_insertion_order_defines_layout() {
        let table = FrequencyTable::from_symbols([200, 5, 100]);
        assert_eq!(table.alphabet(), &[200, 5, 100]);
        assert_eq!(table.range(200), Some(0..1));
        assert_eq!(table.range(5), Some(1..2));
        assert_eq!(table.range(100), Some(2..3));
    }

    #[test]
    fn test_symbol_for() {
        let table = FrequencyTable::from_symbols([1, 1, 1, 2, 3, 3]);
        assert_eq!(table.symbol_for(0), Some((1, 0..3)));
        assert_eq!(table.symbol_for(2), Some((1, 0..3)));
        assert_eq!(table.symbol_for(3), Some((2, 3..4)));
        assert_eq!(table.symbol_for(5), Some((3, 4..6)));
        assert_eq!(table.symbol_for(6), None);
    }

    #[test]
    fn test_byte_alphabet() {
        let table = FrequencyTable::byte_alphabet(256);
        assert_eq!(table.len(), 257);
        assert_eq!(table.total(), 257);
        assert_eq!(table.range(0), Some(0..1));
        assert_eq!(table.range(255), Some(255..256));
        assert_eq!(table.range(256), Some(256..257));
        assert!(!table.contains(257));
    }

    #[test]
    fn test_partition_after_mixed_updates() {
        let mut table = FrequencyTable::new();
        let updates = [4u16, 9, 4, 4, 1, 9, 300, 2, 4, 1];
        for (i, &symbol) in updates.iter().enumerate() {
            if i % 3 == 0 {
                table.add(symbol);
            } else {
                table.update_freqs(symbol);
            }
        }
        table.recompute_ranges();
        assert_partition(&table);
        assert_eq!(table.total(), updates.len() as u64);
    }

    #[test]
    fn test_counts_share_width_with_total() {
        let mut table = FrequencyTable::from_symbols([1, 2]);
        for _ in 0..1000 {
            table.add(2);
        }
        table.recompute_ranges();
        let counted: u64 = table.alphabet().iter().map(|&s| table.frequency(s)).sum();
        assert_eq!(counted, table.total());
        assert_eq!(table.range(2), Some(1..table.total()));
    }

    #[test]
    fn test_empty_table() {
        let table = FrequencyTable::new();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert_eq!(table.symbol_for(0), None);
        assert_eq!(table.frequency(1), 0);
    }
}
