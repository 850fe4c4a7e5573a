//! Concurrent invocation through one shared bridge

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use callgate_memory::ArgArena;
use callgate_runtime::{
    arg, ArgHandle, Bridge, Callable, ClassDescriptor, ClassRegistry, TypeDescriptor, TypeLoader,
    Value,
};
use callgate_sdk::LoadError;

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 200;

/// Loader that is slow to scan, to widen the window for concurrent misses
struct SlowLoader {
    inner: ClassRegistry,
    loads: AtomicUsize,
}

impl TypeLoader for SlowLoader {
    fn load(&self, name: &str) -> Result<Arc<dyn TypeDescriptor>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        self.inner.load(name)
    }
}

fn setup() -> (Arc<Bridge>, Arc<SlowLoader>, Arc<ArgArena>) {
    let classes = ClassRegistry::new();
    let mut class = ClassDescriptor::new("com.example.Math")
        .with_static("square(I)I", |args| {
            let x: i32 = arg(args, 0)?;
            Ok(Value::I32(x * x))
        })
        .unwrap();
    for i in 0..THREADS {
        let sig = format!("id{}(J)J", i);
        class = class
            .with_static(&sig, |args| Ok(Value::I64(arg::<i64>(args, 0)?)))
            .unwrap();
    }
    classes.register_class(class);

    let loader = Arc::new(SlowLoader {
        inner: classes,
        loads: AtomicUsize::new(0),
    });
    let memory = Arc::new(ArgArena::new());
    let bridge = Arc::new(Bridge::new(loader.clone(), memory.clone()));
    (bridge, loader, memory)
}

#[test]
fn test_concurrent_same_key() {
    let (bridge, loader, memory) = setup();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let bridge = Arc::clone(&bridge);
            let memory = Arc::clone(&memory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..CALLS_PER_THREAD {
                    let x = (t * CALLS_PER_THREAD + i) as i32 % 1000;
                    let args = memory.pack(|p| {
                        p.i32(x);
                    });
                    let result = bridge.invoke_i32("com.example.Math", "square(I)I", args);
                    memory.release(args);
                    assert_eq!(result, Ok(x * x));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Concurrent misses may scan more than once, but only one entry survives
    assert!(loader.loads.load(Ordering::SeqCst) >= 1);
    assert!(loader.loads.load(Ordering::SeqCst) <= THREADS);
    assert_eq!(bridge.resolver().len(), 1);
    assert!(memory.is_empty());
}

#[test]
fn test_concurrent_misses_share_one_callable() {
    let (bridge, _, _) = setup();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let bridge = Arc::clone(&bridge);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                bridge
                    .resolver()
                    .resolve("com.example.Math", "square(I)I")
                    .unwrap()
            })
        })
        .collect();

    let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let cached = bridge
        .resolver()
        .cached("com.example.Math", "square(I)I")
        .unwrap();
    for callable in &resolved {
        assert!(Arc::ptr_eq(callable, &cached));
    }
}

#[test]
fn test_concurrent_distinct_keys() {
    let (bridge, _, memory) = setup();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let bridge = Arc::clone(&bridge);
            let memory = Arc::clone(&memory);
            thread::spawn(move || {
                let sig = format!("id{}(J)J", t);
                for i in 0..CALLS_PER_THREAD as i64 {
                    let args = memory.pack(|p| {
                        p.i64(i);
                    });
                    assert_eq!(bridge.invoke_i64("com.example.Math", &sig, args), Ok(i));
                    memory.release(args);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(bridge.resolver().len(), THREADS);
}

#[test]
fn test_external_registration_during_invocation() {
    let (bridge, _, _) = setup();
    let barrier = Arc::new(Barrier::new(2));

    let writer = {
        let bridge = Arc::clone(&bridge);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..CALLS_PER_THREAD {
                let sig = format!("ext{}()I", i);
                let callable = Callable::from_signature(&sig, move |_| Ok(Value::I32(i as i32)))
                    .unwrap()
                    .into_resolved();
                bridge.externals().register(sig, callable);
            }
        })
    };

    let reader = {
        let bridge = Arc::clone(&bridge);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let mut seen = 0;
            for i in 0..CALLS_PER_THREAD {
                let sig = format!("ext{}()I", i);
                // Either not yet registered, or fully usable
                match bridge.invoke_i32("", &sig, ArgHandle::NONE) {
                    Ok(v) => {
                        assert_eq!(v, i as i32);
                        seen += 1;
                    }
                    Err(e) => assert!(e.to_string().starts_with("Cannot resolve an external")),
                }
            }
            seen
        })
    };

    writer.join().unwrap();
    let seen = reader.join().unwrap();
    assert!(seen <= CALLS_PER_THREAD);
    assert_eq!(bridge.externals().len(), CALLS_PER_THREAD);
}
