//! Integration Test: Blocking Call Prohibition
//!
//! **Policy**: Display code runs on the tokio runtime and shares one render
//! lock with every caller. Nothing in it may park a worker thread.
//! **Required**: `tokio::time::sleep`, `tokio::fs`.
//!
//! The only exception is config loading, which happens before the runtime
//! serves any display operation.

use architectural_enforcement::{in_file, production_dirs, scan};

/// Thread sleeps stall the runtime and every waiter on the render lock
#[test]
fn test_no_thread_sleep_in_production_code() {
    let violations = scan(|line| {
        line.code.contains("thread::sleep") || line.code.contains("std::thread::park")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Thread sleeps found in production code:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::time::sleep or tokio::time::interval instead");
        panic!("Found {} thread sleep(s)", violations.len());
    }
}

#[test]
fn test_no_blocking_fs_outside_config_loading() {
    let violations = scan(|line| {
        line.code.contains("std::fs") && !in_file(line, "config/mod.rs")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking file I/O found in production code:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::fs for settings and frame loading");
        panic!("Found {} blocking file I/O call(s)", violations.len());
    }
}

#[test]
fn test_production_dirs_exist() {
    for dir in production_dirs() {
        assert!(dir.is_dir(), "missing source dir {}", dir.display());
    }
}
