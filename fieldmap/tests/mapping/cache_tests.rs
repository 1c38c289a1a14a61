use super::support::*;
use std::thread;

#[test]
fn second_introspection_hits_the_cache() {
    let mapper = Mapper::new();
    let first = mapper.precompute::<SystemStruct, ApiObject>().expect("introspects");
    let after_first = mapper.cache().stats();
    assert!(after_first.representations > 1);
    assert!(after_first.targets > 0);

    let second = mapper.precompute::<SystemStruct, ApiObject>().expect("introspects");
    let after_second = mapper.cache().stats();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(after_second.hits, after_first.hits + 1);
    assert_eq!(after_second.misses, after_first.misses);
    assert_eq!(after_second.representations, after_first.representations);
}

#[test]
fn transfers_reuse_the_cached_plan() {
    let mapper = Mapper::new();
    mapper
        .decode(&populated_api_object(), &mut SystemStruct::default())
        .expect("decodes");
    let built = mapper.cache().stats();

    mapper
        .decode(&populated_api_object(), &mut SystemStruct::default())
        .expect("decodes");
    mapper
        .encode(&SystemStruct::default(), &mut ApiObject::default())
        .expect("encodes");

    let reused = mapper.cache().stats();
    assert_eq!(reused.representations, built.representations);
    assert_eq!(reused.hits, built.hits + 2);
}

#[test]
fn reset_drops_plans_but_rebuilds_identical_ones() {
    let mapper = Mapper::new();
    let before = mapper.precompute::<SystemStruct, ApiObject>().expect("introspects");

    mapper.reset_cache();
    let cleared = mapper.cache().stats();
    assert_eq!(cleared.representations, 0);
    assert_eq!(cleared.targets, 0);

    let after = mapper.precompute::<SystemStruct, ApiObject>().expect("introspects");
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before, after);
}

#[test]
fn foreign_types_get_separate_plans() {
    let mapper = Mapper::new();
    let primary = mapper
        .precompute::<SystemStructWithMultipleDestination, ApiObject>()
        .expect("introspects");
    let secondary = mapper
        .precompute::<SystemStructWithMultipleDestination, SecondaryApiObject>()
        .expect("introspects");
    assert_ne!(primary, secondary);
    assert_eq!(primary.foreign_root, "ApiObject");
    assert_eq!(secondary.foreign_root, "SecondaryApiObject");
}

#[test]
fn mappers_can_share_a_cache() {
    let cache = Arc::new(MappingCache::new());
    let first = Mapper::with_cache(Arc::clone(&cache));
    let second = Mapper::with_cache(Arc::clone(&cache));

    let built = first.precompute::<SystemStruct, ApiObject>().expect("introspects");
    let shared = second.precompute::<SystemStruct, ApiObject>().expect("introspects");

    assert!(Arc::ptr_eq(&built, &shared));
    assert_eq!(cache.stats().representations, first.cache().stats().representations);
    assert!(cache.stats().hits >= 1);

    // a private cache starts from scratch
    let private = Mapper::new().precompute::<SystemStruct, ApiObject>().expect("introspects");
    assert!(!Arc::ptr_eq(&built, &private));
}

#[test]
fn concurrent_introspection_converges_on_one_plan() {
    let mapper = Mapper::new();

    let plans: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| mapper.precompute::<SystemStruct, ApiObject>().expect("introspects")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread finished"))
            .collect()
    });

    let cached = mapper.precompute::<SystemStruct, ApiObject>().expect("introspects");
    for plan in &plans {
        assert!(Arc::ptr_eq(plan, &cached));
    }
}

#[test]
fn concurrent_transfers_with_a_racing_clear() {
    let mapper = Mapper::new();
    let source = populated_api_object();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..16 {
                    let mut destination = SystemStruct::default();
                    mapper.decode(&source, &mut destination).expect("decodes");
                    assert_eq!(destination.name, NAME);
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..16 {
                mapper.reset_cache();
            }
        });
    });

    let stats = mapper.cache().stats();
    assert!(stats.hits + stats.misses > 0);
}
