use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert!(interner.is_empty());
}

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("kotlin.Int");
    let b = interner.intern("kotlin.Int");
    let c = interner.intern("kotlin.Long");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "kotlin.Int");
    assert_eq!(interner.lookup(c), "kotlin.Long");
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    let before = interner.len();
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
    assert_eq!(interner.len(), before + 1);
}

#[test]
fn shared_handles_see_same_table() {
    let shared = SharedInterner::new();
    let clone = shared.clone();
    let name = shared.intern("x");
    assert_eq!(clone.lookup(name), "x");
}
