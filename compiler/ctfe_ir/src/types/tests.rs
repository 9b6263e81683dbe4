use super::*;
use pretty_assertions::assert_eq;

#[test]
fn builtin_ids_are_fixed() {
    let pool = TypePool::new();
    assert_eq!(pool.len(), TypeId::FIRST_COMPOUND as usize);
    assert_eq!(pool.kind(TypeId::INT), TypeKind::Primitive(PrimitiveType::Int));
    assert_eq!(pool.kind(TypeId::STRING), TypeKind::String);
    assert!(pool.is_nullable(TypeId::NULLABLE_ANY));
    assert!(!pool.is_nullable(TypeId::ANY));
    for p in PrimitiveType::ALL {
        assert_eq!(pool.kind(p.type_id()), TypeKind::Primitive(p));
    }
}

#[test]
fn interning_deduplicates() {
    let mut pool = TypePool::new();
    let a = pool.primitive_array(PrimitiveType::Int);
    let b = pool.primitive_array(PrimitiveType::Int);
    assert_eq!(a, b);
    assert!(!a.is_builtin());
    assert_eq!(pool.nullable(TypeId::ANY), TypeId::NULLABLE_ANY);
    assert_eq!(pool.non_null(TypeId::NULLABLE_STRING), TypeId::STRING);
}

#[test]
fn array_element_types() {
    let mut pool = TypePool::new();
    let strings = pool.array_of(TypeId::STRING);
    let ints = pool.primitive_array(PrimitiveType::Int);
    assert_eq!(pool.array_element(strings), Some(TypeId::STRING));
    assert_eq!(pool.array_element(ints), Some(TypeId::INT));
    assert_eq!(pool.array_element(TypeId::INT), None);
}
