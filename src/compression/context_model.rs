//! Multi-order PPM context model.
//!
//! The model maps every context (a suffix of the byte history, up to the model
//! order) to its own [`FrequencyTable`]. Each table always holds the escape symbol,
//! so even a context that has never been seen can be coded against: the coder
//! emits an escape and the caller retries one order lower. The empty context
//! additionally holds the end-of-stream symbol, and below it sits a fixed order(-1)
//! table covering every byte value. A model without contexts (order -1) codes the
//! end-of-stream symbol in that fixed table too.
//!
//! Updates are applied to every order on every observation rather than only to
//! the orders that escaped.

use std::collections::HashMap;

use log::trace;

use super::frequency_table::FrequencyTable;
use super::Symbol;

/// Context tables for all orders, plus the order(-1) fallback.
#[derive(Debug, Clone)]
pub struct PpmModel {
    model_order: Option<usize>,
    escape_symbol: Symbol,
    eof_symbol: Symbol,
    contexts: HashMap<Box<[u8]>, FrequencyTable>,
    order_minus_one: FrequencyTable,
}

impl PpmModel {
    /// Create a model for contexts of up to `model_order` bytes, or none at all.
    ///
    /// The root (empty) context is seeded with `escape_symbol` and `eof_symbol`.
    /// The order(-1) table holds bytes `0..=255` with count 1 each, plus
    /// `eof_symbol` when `model_order` is `None` and nothing else can end the stream.
    pub fn new(model_order: Option<usize>, escape_symbol: Symbol, eof_symbol: Symbol) -> Self {
        let order_minus_one = match model_order {
            Some(_) => FrequencyTable::from_symbols(0..=255),
            None => FrequencyTable::byte_alphabet(eof_symbol),
        };
        let mut contexts = HashMap::new();
        contexts.insert(
            Box::default(),
            FrequencyTable::from_symbols([escape_symbol, eof_symbol]),
        );
        PpmModel {
            model_order,
            escape_symbol,
            eof_symbol,
            contexts,
            order_minus_one,
        }
    }

    /// Longest context length the model tracks, `None` without context modelling.
    pub fn model_order(&self) -> Option<usize> {
        self.model_order
    }

    /// The escape symbol every context table carries.
    pub fn escape_symbol(&self) -> Symbol {
        self.escape_symbol
    }

    /// The end-of-stream symbol carried by the root table.
    pub fn eof_symbol(&self) -> Symbol {
        self.eof_symbol
    }

    /// The table for `context`, created and seeded if it has not been seen.
    pub fn context_table(&mut self, context: &[u8]) -> &FrequencyTable {
        self.ensure_context(context)
    }

    /// The table for `context` if it already exists.
    pub fn table(&self, context: &[u8]) -> Option<&FrequencyTable> {
        self.contexts.get(context)
    }

    /// The fixed table used once every context order has escaped.
    pub fn order_minus_one(&self) -> &FrequencyTable {
        &self.order_minus_one
    }

    /// Number of context tables created so far, root included.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Record `symbol` after `history` in every suffix context, longest first.
    ///
    /// Only the last `model_order` bytes of `history` are considered; a model
    /// without contexts only counts `symbol` in the root.
    pub fn update(&mut self, history: &[u8], symbol: Symbol) {
        let longest = history.len().min(self.model_order.unwrap_or(0));
        let recent = &history[history.len() - longest..];
        for start in 0..=longest {
            self.ensure_context(&recent[start..]).update_freqs(symbol);
        }
    }

    fn ensure_context(&mut self, context: &[u8]) -> &mut FrequencyTable {
        if !self.contexts.contains_key(context) {
            trace!("new context of order {}: {:?}", context.len(), context);
            let table = self.seeded_table(context.is_empty());
            self.contexts.insert(context.into(), table);
        }
        self.contexts
            .get_mut(context)
            .unwrap_or_else(|| unreachable!("context inserted above"))
    }

    fn seeded_table(&self, root: bool) -> FrequencyTable {
        if root {
            FrequencyTable::from_symbols([self.escape_symbol, self.eof_symbol])
        } else {
            FrequencyTable::from_symbols([self.escape_symbol])
        }
    }
}
