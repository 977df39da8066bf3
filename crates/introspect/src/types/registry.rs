// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type registry.
//!
//! Every [`Type`] handed out by this crate is interned here, so identity
//! comparison on types is pointer comparison. Host types are keyed by
//! `TypeId`; function types are keyed structurally by the ids of their
//! parameter and result types, so a method's raw signature and the type of a
//! plain host function with the same shape resolve to the same handle.
//!
//! Descriptors are built outside any map guard (building a struct resolves
//! its field types) and published with first-writer-wins semantics: a thread
//! that loses the race drops its copy and adopts the published one.

use crate::config::REGISTRY_SHARDS;
use crate::host::Reflect;
use crate::types::descriptor::{Signature, Type, TypeDescriptor};
use crate::types::method::value_method_set;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Snapshot of registry hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    /// Descriptors actually published (misses minus lost races).
    pub published: u64,
    pub last_miss_ns: u64,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct SignatureKey {
    params: Vec<u64>,
    results: Vec<u64>,
}

impl SignatureKey {
    fn new(params: &[Type], results: &[Type]) -> Self {
        Self {
            params: params.iter().map(|t| t.id()).collect(),
            results: results.iter().map(|t| t.id()).collect(),
        }
    }
}

/// Lock-free lookup counters; read together by [`TypeRegistry::stats`].
#[derive(Default)]
struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    published: AtomicU64,
    last_miss_ns: AtomicU64,
}

impl LookupCounters {
    fn snapshot(&self) -> LookupStats {
        LookupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            last_miss_ns: self.last_miss_ns.load(Ordering::Relaxed),
        }
    }
}

/// Concurrent intern table for type descriptors.
pub struct TypeRegistry {
    by_type_id: DashMap<TypeId, Type>,
    signatures: DashMap<SignatureKey, Type>,
    next_id: AtomicU64,
    counters: LookupCounters,
}

impl TypeRegistry {
    fn new() -> Self {
        Self {
            by_type_id: DashMap::with_shard_amount(REGISTRY_SHARDS),
            signatures: DashMap::with_shard_amount(REGISTRY_SHARDS),
            next_id: AtomicU64::new(1),
            counters: LookupCounters::default(),
        }
    }

    /// Resolve the canonical descriptor of `T`, building it on first use.
    pub fn resolve<T: Reflect>(&self) -> Type {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.by_type_id.get(&key).map(|r| r.value().clone()) {
            self.record_hit();
            return hit;
        }

        let start = Instant::now();
        let mut descriptor = T::describe();
        if !descriptor.has_method_table() {
            descriptor = descriptor.with_methods(value_method_set::<T>);
        }
        let built = self.seal(descriptor);

        // Shard guard must be released before logging: rendering a pointer
        // type name resolves its element through this map.
        let (ty, published) = match self.by_type_id.entry(key) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                slot.insert(built.clone());
                (built, true)
            }
        };
        self.finish_miss(&ty, published, start);
        ty
    }

    /// Canonical function type for a parameter/result list.
    pub fn func_of(&self, params: Vec<Type>, results: Vec<Type>) -> Type {
        let key = SignatureKey::new(&params, &results);
        if let Some(hit) = self.signatures.get(&key).map(|r| r.value().clone()) {
            self.record_hit();
            return hit;
        }

        let start = Instant::now();
        let built = self.seal(TypeDescriptor::func(Signature::new(params, results)));
        let (ty, published) = match self.signatures.entry(key) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                slot.insert(built.clone());
                (built, true)
            }
        };
        self.finish_miss(&ty, published, start);
        ty
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.by_type_id.len() + self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters are read individually, so a snapshot taken during lookups
    /// may mix values from neighbouring moments.
    #[must_use]
    pub fn stats(&self) -> LookupStats {
        self.counters.snapshot()
    }

    fn seal(&self, mut descriptor: TypeDescriptor) -> Type {
        descriptor.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Type(Arc::new(descriptor))
    }

    fn record_hit(&self) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn finish_miss(&self, ty: &Type, published: bool, start: Instant) {
        let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        if published {
            self.counters.published.fetch_add(1, Ordering::Relaxed);
        }
        self.counters.last_miss_ns.store(elapsed, Ordering::Relaxed);
        if published {
            log::debug!("[registry] published {} (id={})", ty, ty.id());
        } else {
            log::trace!("[registry] lost publish race for {}", ty);
        }
    }
}

/// The process-wide registry.
pub fn global() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TypeRegistry::new)
}

/// Canonical descriptor of the host type `T`.
pub fn type_of<T: Reflect>() -> Type {
    T::type_of()
}

/// Canonical function type taking `params` and returning `results`.
pub fn func_of(params: Vec<Type>, results: Vec<Type>) -> Type {
    global().func_of(params, results)
}

/// Snapshot of the global registry statistics.
pub fn registry_stats() -> LookupStats {
    global().stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;

    #[test]
    fn test_resolve_is_interned() {
        let a = global().resolve::<i64>();
        let b = global().resolve::<i64>();
        assert_eq!(a, b);
        assert_eq!(a.kind(), Kind::Int64);
        assert_ne!(global().resolve::<i32>(), a);
    }

    #[test]
    fn test_func_of_structural() {
        let int = type_of::<i64>();
        let f1 = func_of(vec![int.clone()], vec![int.clone()]);
        let f2 = func_of(vec![int.clone()], vec![int.clone()]);
        let f3 = func_of(vec![int.clone()], vec![]);
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
        assert_eq!(f1.kind(), Kind::Func);
        assert_eq!(f1.num_in(), 1);
        assert_eq!(f3.num_out(), 0);
    }

    #[test]
    fn test_host_fn_matches_func_of() {
        let int = type_of::<i64>();
        let by_shape = func_of(vec![int.clone()], vec![int]);
        assert_eq!(type_of::<fn(i64) -> i64>(), by_shape);
    }

    #[test]
    fn test_stats_count_hits() {
        let before = registry_stats();
        let _ = type_of::<u16>();
        let _ = type_of::<u16>();
        let after = registry_stats();
        assert!(after.hits > before.hits);
        assert!(after.published >= before.published);
        assert!(!global().is_empty());
    }

    #[test]
    fn test_stats_private_registry() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.stats(), LookupStats::default());

        let first = registry.resolve::<u32>();
        let stats = registry.stats();
        assert_eq!(stats.hits, 0);
        assert!(stats.misses >= 1);
        assert!(stats.published >= 1);

        for _ in 0..10 {
            assert_eq!(registry.resolve::<u32>(), first);
        }
        assert_eq!(registry.stats().hits, 10);
        assert_eq!(registry.stats().misses, stats.misses);
    }

    #[test]
    fn test_stats_count_concurrent_hits() {
        let registry = TypeRegistry::new();
        let _ = registry.resolve::<bool>();
        let base = registry.stats().hits;
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        let _ = registry.resolve::<bool>();
                    }
                });
            }
        });
        assert_eq!(registry.stats().hits, base + 8000);
    }
}
