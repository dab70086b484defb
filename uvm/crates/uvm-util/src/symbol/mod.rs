//! Symbol - string interning for block, function, and identifier names.
//!
//! A [`Symbol`] is a compact (4-byte) handle to a string stored in a global
//! string table. This enables O(1) string comparison and reduces memory
//! usage when the same name appears repeatedly in a CFG (block labels,
//! function identifiers, reducer error payloads).
//!
//! # Thread Safety
//!
//! The interner is fully thread-safe (`Sync + Send`). Multiple threads can
//! intern strings concurrently without blocking each other, thanks to
//! DashMap's lock-free design.
//!
//! # Examples
//!
//! ```
//! use uvm_util::symbol::Symbol;
//!
//! let s1 = Symbol::intern("hello");
//! let s2 = Symbol::intern("hello");
//! let s3 = Symbol::intern("world");
//!
//! assert_eq!(s1, s2);
//! assert_ne!(s1, s3);
//! ```

mod interner;

pub use interner::STRING_TABLE;

/// Statistics about the string interner, for diagnostics/profiling.
#[derive(Clone, Copy, Debug, Default)]
pub struct InternerStats {
    /// Number of interned strings.
    pub count: usize,
    /// Hash map capacity (number of buckets).
    pub capacity: usize,
    /// Number of hash collisions encountered.
    pub collisions: usize,
    /// Number of cache hits (string already interned).
    pub hits: usize,
    /// Number of cache misses (new string allocation).
    pub misses: usize,
}

impl InternerStats {
    pub const fn new(
        count: usize,
        capacity: usize,
        collisions: usize,
        hits: usize,
        misses: usize,
    ) -> Self {
        Self { count, capacity, collisions, hits, misses }
    }

    /// Load factor (count / capacity). 0.0 if capacity is 0.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.count as f64 / self.capacity as f64
        }
    }

    /// True when load factor exceeds 0.75.
    pub fn is_near_capacity(&self) -> bool {
        self.load_factor() > 0.75
    }

    /// Hit rate (hits / (hits + misses)). 0.0 if no lookups performed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_operations(&self) -> usize {
        self.hits + self.misses
    }
}

/// An interned string identifier.
///
/// `Symbol` is exactly 4 bytes, cache-friendly compared to `String`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// Index into the global string table.
    pub(crate) index: u32,
}

impl Symbol {
    pub const MAX_INDEX: u32 = u32::MAX;

    /// Intern a string, returning its symbol.
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string value associated with this symbol.
    ///
    /// O(n) in the number of interned strings; avoid in hot loops, prefer
    /// [`Symbol::eq_str`] for comparisons.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    #[inline]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_str().ends_with(suffix)
    }

    /// Compare the symbol's string with a `&str` without an intermediate
    /// owned allocation.
    #[inline]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str() == other
    }

    /// Raw table index, useful for serialization or debugging.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }

    /// Create a symbol from a raw index.
    ///
    /// # Safety
    ///
    /// The index must correspond to a valid entry in the string table, or
    /// `as_str()` returns the empty string rather than the intended value.
    #[inline]
    pub unsafe fn from_u32_unchecked(index: u32) -> Self {
        Self { index }
    }

    /// Snapshot of interner statistics.
    #[inline]
    pub fn stats_struct() -> InternerStats {
        STRING_TABLE.stats()
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pretty-print a symbol with quotes, to distinguish it from plain text in
/// debug output.
pub trait SymbolPretty {
    fn pretty(&self) -> SymbolPrettyDisplay<'_>;
}

impl SymbolPretty for Symbol {
    fn pretty(&self) -> SymbolPrettyDisplay<'_> {
        SymbolPrettyDisplay(self)
    }
}

pub struct SymbolPrettyDisplay<'a>(&'a Symbol);

impl std::fmt::Display for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0.as_str())
    }
}

impl std::fmt::Debug for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolPretty(\"{}\")", self.0.as_str())
    }
}

static_assertions::assert_impl_all!(Symbol: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn symbol_intern() {
        let s1 = Symbol::intern("hello");
        let s2 = Symbol::intern("hello");
        let s3 = Symbol::intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_eq!(s1.as_str(), "hello");
        assert_eq!(s3.as_str(), "world");
    }

    #[test]
    fn symbol_display() {
        let s = Symbol::intern("test");
        assert_eq!(format!("{}", s), "test");
        assert_eq!(format!("{:?}", s), "Symbol(test)");
    }

    #[test]
    fn symbol_pretty() {
        let s = Symbol::intern("test");
        assert_eq!(format!("{}", s.pretty()), "\"test\"");
    }

    #[test]
    fn symbol_eq_str() {
        let sym = Symbol::intern("hello");
        assert!(sym.eq_str("hello"));
        assert!(!sym.eq_str("world"));
    }

    #[test]
    fn from_u32_unchecked_roundtrip() {
        let sym = Symbol::intern("test");
        let index = sym.as_u32();
        let sym2 = unsafe { Symbol::from_u32_unchecked(index) };
        assert_eq!(sym, sym2);
    }

    #[test]
    fn stats_struct_after_interning() {
        let stats = Symbol::stats_struct();
        assert!(stats.count > 0);
        assert!(stats.capacity >= stats.count);
        assert!(stats.load_factor() >= 0.0 && stats.load_factor() <= 1.0);
    }

    #[test]
    fn interner_stats_methods() {
        let stats = InternerStats::new(100, 200, 5, 80, 20);
        assert_eq!(stats.load_factor(), 0.5);
        assert!(!stats.is_near_capacity());
        assert_eq!(stats.hit_rate(), 0.8);
        assert_eq!(stats.total_operations(), 100);

        let stats_empty = InternerStats::new(0, 0, 0, 0, 0);
        assert_eq!(stats_empty.load_factor(), 0.0);
        assert_eq!(stats_empty.hit_rate(), 0.0);
    }

    #[test]
    fn concurrent_intern_unique() {
        let handles: Vec<_> = (0..10)
            .map(|i| thread::spawn(move || Symbol::intern(&format!("thread_{}", i))))
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for i in 0..results.len() {
            for j in (i + 1)..results.len() {
                assert_ne!(results[i], results[j]);
            }
        }
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Symbol>();
        assert_send_sync::<InternerStats>();
    }

    #[test]
    fn empty_string() {
        let s = Symbol::intern("");
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn unicode_strings() {
        for test in ["你好", "世界", "🦀"] {
            let sym = Symbol::intern(test);
            assert_eq!(sym.as_str(), test);
        }
    }

    #[test]
    fn idempotence() {
        for s in ["hello", "world", "test"] {
            let sym1 = Symbol::intern(s);
            let sym2 = Symbol::intern(s);
            let sym3 = Symbol::intern(sym1.as_str());
            assert_eq!(sym1, sym2);
            assert_eq!(sym1, sym3);
        }
    }

    #[test]
    fn comparison_consistent_with_string_equality() {
        let pairs = [("hello", "hello", true), ("hello", "world", false), ("", "", true)];
        for (s1, s2, expected_eq) in pairs {
            let sym1 = Symbol::intern(s1);
            let sym2 = Symbol::intern(s2);
            assert_eq!(sym1 == sym2, expected_eq);
            assert_eq!(sym1.eq_str(s2), expected_eq);
        }
    }
}
