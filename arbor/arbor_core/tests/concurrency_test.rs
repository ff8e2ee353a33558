//! Concurrency tests for the class registry.

use std::sync::{Arc, Barrier};
use std::thread;

use arbor_core::{ClassRegistry, ClassUri};

#[test]
fn test_concurrent_resolve_or_create_agrees() {
    let registry = Arc::new(ClassRegistry::with_builtins());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let uri = ClassUri::parse("app:race#Contended").unwrap();
                barrier.wait();
                registry.resolve_or_create(&uri).unwrap()
            })
        })
        .collect();

    let classes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(classes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_concurrent_reads_during_writes() {
    let registry = Arc::new(ClassRegistry::new());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    let uri = ClassUri::parse(&format!("app:writer{w}#Class{i}")).unwrap();
                    registry.create_dynamic(&uri).unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let root = ClassUri::parse("import:nodes#Node").unwrap();
            for _ in 0..100 {
                assert!(registry.resolve(&root).is_ok());
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();
    assert_eq!(registry.len(), 101);
}
