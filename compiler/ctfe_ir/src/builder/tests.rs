use crate::{ConstValue, ExprKind, FunctionOrigin, ModuleBuilder, TypeId, TypeKind};
use pretty_assertions::assert_eq;

#[test]
fn builtin_members_are_memoized() {
    let mut b = ModuleBuilder::new("Test.kt");
    let a = b.builtin_member(TypeId::INT, "plus", &[TypeId::INT], TypeId::INT);
    let c = b.builtin_member(TypeId::INT, "plus", &[TypeId::INT], TypeId::INT);
    let d = b.builtin_member(TypeId::INT, "plus", &[TypeId::LONG], TypeId::LONG);
    assert_eq!(a, c);
    assert_ne!(a, d);
    let module = b.finish();
    assert_eq!(module.fq_name(a), "kotlin.Int.plus");
    assert_eq!(module.function(a).origin, FunctionOrigin::Builtin);
}

#[test]
fn block_takes_type_of_last_statement() {
    let mut b = ModuleBuilder::new("Test.kt");
    let one = b.int(1);
    let text = b.string("x");
    let block = b.block(vec![one, text]);
    let empty = b.block(Vec::new());
    let module = b.finish();
    assert_eq!(module.expr(block).ty, TypeId::STRING);
    assert_eq!(module.expr(empty).ty, TypeId::UNIT);
    let ExprKind::Block(range) = module.kind(block) else {
        panic!("expected block");
    };
    assert_eq!(module.exprs.list(range), &[one, text]);
}

#[test]
fn while_loop_patches_placeholder() {
    let mut b = ModuleBuilder::new("Test.kt");
    let mut seen = None;
    let lp = b.while_loop(|b, lp| {
        seen = Some(lp);
        let cond = b.boolean(false);
        let exit = b.break_loop(lp);
        (cond, exit)
    });
    let module = b.finish();
    assert_eq!(seen, Some(lp));
    let ExprKind::While { body, .. } = module.kind(lp) else {
        panic!("expected while");
    };
    assert_eq!(module.kind(body), ExprKind::Break { target: lp });
}

#[test]
fn enum_class_declares_special_members() {
    let mut b = ModuleBuilder::new("Test.kt");
    let color = b.enum_class("demo.Color");
    b.default_constructor(color, &[]);
    let red = b.enum_entry(color, "RED", None, Vec::new());
    let green = b.enum_entry(color, "GREEN", None, Vec::new());
    let module = b.finish();
    assert_eq!(module.enum_entry(red).ordinal, 0);
    assert_eq!(module.enum_entry(green).ordinal, 1);
    let values = module.functions_by_fq_name("demo.Color.values")[0];
    assert_eq!(module.function(values).origin, FunctionOrigin::EnumSpecialMember);
    assert!(matches!(
        module.types.kind(module.function(values).return_type),
        TypeKind::Array(_)
    ));
    assert!(module.enum_entry(red).constructor.is_some());
}

#[test]
fn char_literals_are_utf16_units() {
    let mut b = ModuleBuilder::new("Test.kt");
    let a = b.char('a');
    let module = b.finish();
    assert_eq!(module.kind(a), ExprKind::Const(ConstValue::Char(97)));
}

#[test]
fn primitive_array_factories_exist() {
    let b = ModuleBuilder::new("Test.kt");
    let module = b.finish();
    for fq in ["kotlin.intArrayOf", "kotlin.booleanArrayOf", "kotlin.doubleArrayOf"] {
        assert_eq!(module.functions_by_fq_name(fq).len(), 1, "{fq}");
    }
}
