//! Name-based matcher construction.
//!
//! Factories are registered once per name. Initialized matchers are cached by
//! `(name, param, policy)` so customizations that repeat across rules share
//! one instance.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jsondiff_types::CompareContext;

use super::{
    ArrayDisorderMatcher, ArrayLengthMatcher, ArrayRecursivelyMatcher, ArrayWithKeyMatcher,
    ComparatorValueMatcher, DegreePreciseMatcher, EmptyValueMatcher, EscapedJsonMatcher,
    IgnorePathMatcher, ImprecisePositionMatcher, MatcherHandle, NumberPreciseMatcher,
    PercentTolerantMatcher, TolerantValueMatcher, ValueMatcher,
};
use crate::error::{DiffError, DiffResult};

/// Builds a fresh, uninitialized matcher.
pub type MatcherFactory = Arc<dyn Fn() -> Box<dyn ValueMatcher> + Send + Sync>;

type HandleKey = (String, String, CompareContext);

/// A concurrent map from matcher names to factories.
pub struct MatcherRegistry {
    factories: RwLock<HashMap<String, MatcherFactory>>,
    handles: RwLock<HashMap<HandleKey, MatcherHandle>>,
}

// Every write is a single insert, so a poisoned map is still consistent.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn factory<M: ValueMatcher + Default + 'static>() -> MatcherFactory {
    Arc::new(|| Box::new(M::default()) as Box<dyn ValueMatcher>)
}

impl MatcherRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// A registry holding every built-in matcher.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins: [(&str, MatcherFactory); 14] = [
            ("ArrayLength", factory::<ArrayLengthMatcher>()),
            ("ArrayWithKey", factory::<ArrayWithKeyMatcher>()),
            ("ArrayDisorder", factory::<ArrayDisorderMatcher>()),
            ("ArrayRecursively", factory::<ArrayRecursivelyMatcher>()),
            ("IgnorePath", factory::<IgnorePathMatcher>()),
            ("IngorePath", factory::<IgnorePathMatcher>()),
            ("EmptyValue", factory::<EmptyValueMatcher>()),
            ("TolerantValue", factory::<TolerantValueMatcher>()),
            ("PercentTolerant", factory::<PercentTolerantMatcher>()),
            ("NumberPrecise", factory::<NumberPreciseMatcher>()),
            ("DegreePrecise", factory::<DegreePreciseMatcher>()),
            ("ImprecisePosition", factory::<ImprecisePositionMatcher>()),
            ("EscapedJson", factory::<EscapedJsonMatcher>()),
            ("ComparatorValue", factory::<ComparatorValueMatcher>()),
        ];
        {
            let mut factories = write(&registry.factories);
            for (name, f) in builtins {
                factories.insert(name.to_string(), f);
            }
        }
        registry
    }

    /// The process-wide registry, built with the built-ins on first use.
    pub fn global() -> &'static MatcherRegistry {
        static GLOBAL: OnceLock<MatcherRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_builtins)
    }

    /// Register a factory under `name` unless one exists already.
    ///
    /// Returns `true` if the name was new.
    pub fn register<F>(&self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<dyn ValueMatcher> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut factories = write(&self.factories);
        if factories.contains_key(&name) {
            return false;
        }
        tracing::debug!(matcher = %name, "registered matcher");
        factories.insert(name, Arc::new(factory));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        read(&self.factories).contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.factories).keys().cloned().collect();
        names.sort();
        names
    }

    /// Build and initialize the matcher registered under `name`, or return
    /// the cached instance for the same parameter and policy.
    ///
    /// The cache keeps one handle per distinct `(name, param, policy)` until
    /// [`clear_cache`](Self::clear_cache) is called.
    pub fn resolve(&self, name: &str, param: &str, policy: &CompareContext) -> DiffResult<MatcherHandle> {
        let key: HandleKey = (name.to_string(), param.to_string(), *policy);
        if let Some(handle) = read(&self.handles).get(&key) {
            return Ok(Arc::clone(handle));
        }

        let factory = read(&self.factories)
            .get(name)
            .cloned()
            .ok_or_else(|| DiffError::UnknownMatcher { name: name.to_string() })?;
        let mut matcher = factory();
        matcher.init(param, policy)?;
        let handle: MatcherHandle = Arc::from(matcher);

        // First insert wins.
        let mut handles = write(&self.handles);
        Ok(Arc::clone(handles.entry(key).or_insert(handle)))
    }

    /// Number of cached handles.
    pub fn cached(&self) -> usize {
        read(&self.handles).len()
    }

    /// Drop every cached handle. Handles already handed out stay valid.
    pub fn clear_cache(&self) {
        let mut handles = write(&self.handles);
        tracing::debug!(count = handles.len(), "clearing matcher cache");
        handles.clear();
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use jsondiff_types::Value;

    use super::*;
    use crate::comparator::JsonComparator;
    use crate::matcher::MatchFailure;
    use crate::result::CompareResult;

    struct AlwaysFalse;

    impl ValueMatcher for AlwaysFalse {
        fn name(&self) -> &str {
            "AlwaysFalse"
        }

        fn equal(
            &self,
            _path: &str,
            _actual: &Value,
            _expected: &Value,
            _result: &mut CompareResult,
            _comparator: &JsonComparator,
        ) -> Result<bool, MatchFailure> {
            Ok(false)
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = MatcherRegistry::with_builtins();
        for name in ["ArrayLength", "IgnorePath", "IngorePath", "TolerantValue", "EscapedJson"] {
            assert!(registry.contains(name), "{name}");
        }
        assert_eq!(registry.names().len(), 14);
        assert!(registry.names().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn unknown_names_are_errors() {
        let registry = MatcherRegistry::with_builtins();
        let err = registry
            .resolve("NoSuchMatcher", "", &CompareContext::default())
            .err()
            .unwrap();
        assert!(matches!(err, DiffError::UnknownMatcher { name } if name == "NoSuchMatcher"));
    }

    #[test]
    fn init_errors_surface() {
        let registry = MatcherRegistry::with_builtins();
        assert!(matches!(
            registry.resolve("TolerantValue", "abc", &CompareContext::default()),
            Err(DiffError::MatcherInit { .. })
        ));
    }

    #[test]
    fn register_is_insert_if_absent() {
        let registry = MatcherRegistry::new();
        assert!(registry.register("AlwaysFalse", || Box::new(AlwaysFalse)));
        assert!(!registry.register("AlwaysFalse", || Box::new(AlwaysFalse)));
        assert_eq!(registry.names(), vec!["AlwaysFalse".to_string()]);
    }

    #[test]
    fn resolved_handles_are_cached_per_configuration() {
        let registry = MatcherRegistry::with_builtins();
        let policy = CompareContext::default();
        let a = registry.resolve("TolerantValue", "0.1", &policy).unwrap();
        let b = registry.resolve("TolerantValue", "0.1", &policy).unwrap();
        let c = registry.resolve("TolerantValue", "0.2", &policy).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.name(), "TolerantValue");
    }

    #[test]
    fn clearing_the_cache_rebuilds_handles() {
        let registry = MatcherRegistry::with_builtins();
        let policy = CompareContext::default();
        let first = registry.resolve("TolerantValue", "0.1", &policy).unwrap();
        registry.resolve("TolerantValue", "0.2", &policy).unwrap();
        assert_eq!(registry.cached(), 2);

        registry.clear_cache();
        assert_eq!(registry.cached(), 0);
        let second = registry.resolve("TolerantValue", "0.1", &policy).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "TolerantValue");
        assert!(registry.contains("TolerantValue"));
    }

    #[test]
    fn alias_resolves_to_ignore_matcher() {
        let handle = MatcherRegistry::global()
            .resolve("IngorePath", "", &CompareContext::default())
            .unwrap();
        assert!(handle.suppresses_presence());
    }

    #[test]
    fn concurrent_resolution_is_safe() {
        let registry = Arc::new(MatcherRegistry::with_builtins());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .resolve("PercentTolerant", &format!("0.0{}", i % 2 + 1), &CompareContext::default())
                        .unwrap()
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
    }
}
