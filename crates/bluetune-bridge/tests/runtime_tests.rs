//! Runtime initialization is process-wide, so the whole sequence lives in a
//! single test.

use bluetune_bridge::{runtime, BridgeError, LoopbackEngine, LoggingListener, Player};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_runtime_initialization_sequence() {
    assert!(!runtime::is_initialized());
    let opened = Player::open(Arc::new(LoopbackEngine::new()), Arc::new(LoggingListener));
    assert!(matches!(opened, Err(BridgeError::NotInitialized)));

    // a failing loader leaves the runtime uninitialized
    let failed = runtime::initialize("libBlueTune.so", |_| Err("symbol not found"));
    assert!(matches!(failed, Err(BridgeError::LoadFailed { .. })));
    assert!(!runtime::is_initialized());

    let calls = AtomicUsize::new(0);
    let info = runtime::initialize("libBlueTune.so", |library| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(library, "libBlueTune.so");
        Ok::<_, Infallible>(Some("1.4.0".to_string()))
    })
    .unwrap();
    assert_eq!(info.version.as_deref(), Some("1.4.0"));

    // later calls return the recorded info without loading again
    let again = runtime::initialize("other", |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Infallible>(None)
    })
    .unwrap();
    assert_eq!(again.library, "libBlueTune.so");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(runtime::info().is_some());

    let player = Player::open(Arc::new(LoopbackEngine::new()), Arc::new(LoggingListener)).unwrap();
    assert!(player.is_active());
    player.close().unwrap();
}
