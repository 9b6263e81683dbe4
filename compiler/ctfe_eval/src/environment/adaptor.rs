//! Synthesized call adaptors.
//!
//! An adaptor's body is a single call to its target. Receivers the shape
//! marks as bound are adaptor captures, bound in the adaptor's frame by the
//! caller; unbound receivers and the target's parameters become adaptor
//! parameters in that order.
//!
//! A delegating adaptor runs `super(...)` on the object bound to its own
//! dispatch receiver and returns `Unit`.

use ctfe_ir::{
    Expr, ExprKind, FunctionFlags, FunctionKind, FunctionOrigin, FunctionOwner, IrFunction,
    IrModule, IrValue, Range, Span, TypeId, ValueId, ValueParameter,
};

use super::FunctionShape;

fn fresh_value(module: &mut IrModule, template: ValueId) -> ValueId {
    let IrValue { name, ty, .. } = *module.value(template);
    module.add_value(IrValue {
        name,
        ty,
        mutable: false,
    })
}

fn get(module: &mut IrModule, value: ValueId) -> ctfe_ir::ExprId {
    let ty = module.value(value).ty;
    module.alloc_expr(Expr {
        kind: ExprKind::GetValue(value),
        ty,
        span: Span::DUMMY,
    })
}

pub(super) fn synthesize(module: &mut IrModule, shape: FunctionShape) -> ctfe_ir::FunctionId {
    let target = module.function(shape.function).clone();
    let mut params = Vec::new();
    let mut captures = Vec::new();

    let mut receiver = |module: &mut IrModule, template: Option<ValueId>, bound: bool| {
        template.map(|template| {
            let value = fresh_value(module, template);
            if bound {
                captures.push(value);
            } else {
                params.push(value);
            }
            value
        })
    };
    // A constructor's `this` is created by the call, never passed in.
    let (dispatch, extension) = if target.is_constructor() {
        (None, None)
    } else {
        (
            receiver(module, target.dispatch_receiver, shape.has_dispatch),
            receiver(module, target.extension_receiver, shape.has_extension),
        )
    };
    for param in &target.params {
        let value = fresh_value(module, param.value);
        params.push(value);
    }

    let arg_values = &params[params.len() - target.params.len()..];
    let arg_exprs: Vec<_> = arg_values.iter().map(|&v| Some(get(module, v))).collect();
    let args = module.exprs.alloc_args(arg_exprs);

    let (kind, ty) = if target.is_constructor() {
        let ty = target
            .owner_class()
            .map_or(target.return_type, |class| module.class(class).ty);
        if shape.delegating_constructor {
            (
                ExprKind::DelegatingConstructorCall {
                    constructor: shape.function,
                    args,
                },
                TypeId::UNIT,
            )
        } else {
            (
                ExprKind::ConstructorCall {
                    constructor: shape.function,
                    args,
                    type_args: Range::EMPTY,
                },
                ty,
            )
        }
    } else {
        let dispatch_receiver = dispatch.map(|v| get(module, v));
        let extension_receiver = extension.map(|v| get(module, v));
        (
            ExprKind::Call {
                callee: shape.function,
                dispatch_receiver,
                extension_receiver,
                args,
                type_args: Range::EMPTY,
                super_qualifier: None,
            },
            target.return_type,
        )
    };
    let body = module.alloc_expr(Expr {
        kind,
        ty,
        span: Span::DUMMY,
    });

    let this = if shape.delegating_constructor {
        target.dispatch_receiver.map(|this| fresh_value(module, this))
    } else {
        None
    };
    let fq_name = module.intern(&format!("{}$adaptor", module.name(target.fq_name)));
    module.add_function(IrFunction {
        name: target.name,
        fq_name,
        kind: FunctionKind::Function,
        origin: FunctionOrigin::Synthesized,
        owner: FunctionOwner::TopLevel,
        flags: FunctionFlags::empty(),
        dispatch_receiver: this,
        extension_receiver: None,
        params: params
            .into_iter()
            .map(|value| ValueParameter {
                value,
                default: None,
                is_vararg: false,
            })
            .collect(),
        type_params: 0,
        return_type: ty,
        body: Some(body),
        reference_body: None,
        captures,
        overridden: Vec::new(),
    })
}
