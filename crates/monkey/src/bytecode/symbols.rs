//! Compile-time symbol table mapping names to global slots.

use ahash::AHashMap;

/// Where a symbol lives. Only globals exist today; locals and frames come
/// with function compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
}

/// A resolved name: its scope and slot index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// Name to slot mapping. Indices are dense and assigned in definition
/// order starting at zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    store: AHashMap<String, Symbol>,
    num_definitions: usize,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a name, assigning the next free slot. Redefining a name
    /// reuses its existing slot.
    pub fn define(&mut self, name: &str) -> Symbol {
        if let Some(existing) = self.store.get(name) {
            return existing.clone();
        }
        let symbol = Symbol {
            name: name.to_owned(),
            scope: SymbolScope::Global,
            index: self.num_definitions,
        };
        self.store.insert(name.to_owned(), symbol.clone());
        self.num_definitions += 1;
        symbol
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.store.get(name)
    }

    /// Number of distinct names defined; the required globals array size.
    #[must_use]
    pub fn num_definitions(&self) -> usize {
        self.num_definitions
    }
}
