//! Integration Test: Render State Ownership
//!
//! **Policy**: The surface is owned by `RenderCoordinator` and reached only
//! through its lock. Components receive `&mut Surface` inside a locked
//! closure and never store one.
//!
//! Library code also propagates errors instead of panicking: a panic while
//! the render lock is held would take the panel down with it.

use architectural_enforcement::{in_file, scan, workspace_root};

#[test]
fn test_surface_only_stored_by_coordinator() {
    let violations = scan(|line| {
        let code = line.code.as_str();
        let stores_surface = code.contains(": Surface,")
            || code.contains("Mutex<Surface")
            || code.contains("RwLock<Surface")
            || code.contains("Arc<Surface");
        stores_surface && !in_file(line, "coordinator.rs")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Surface held outside the render coordinator:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Go through RenderCoordinator::with_lock / inspect");
        panic!("Found {} surface owner(s)", violations.len());
    }
}

#[test]
fn test_no_unwrap_in_library_code() {
    let core = workspace_root().join("chatface/core/src");
    let violations = scan(|line| {
        line.path.starts_with(&core)
            && (line.code.contains(".unwrap()") || line.code.contains(".expect("))
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Panicking shortcuts in library code:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!("Found {} unwrap/expect call(s)", violations.len());
    }
}
