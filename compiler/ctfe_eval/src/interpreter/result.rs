//! Converting interpreted states back to IR.

use ctfe_ir::{ConstValue, Expr, ExprId, ExprKind, TypeId};
use tracing::{debug, instrument};

use super::IrInterpreter;
use crate::errors::EvalResult;
use crate::state::{PrimitiveValue, State};

/// Outcome of folding an expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FoldResult {
    /// A new `Const` node holding the value.
    Constant(ExprId),
    /// A new `Error` node describing an uncaught exception.
    Erroneous(ExprId),
    /// The value has no constant form; the expression is left as is.
    Original(ExprId),
}

impl FoldResult {
    #[inline]
    pub fn expr(self) -> ExprId {
        match self {
            FoldResult::Constant(expr) | FoldResult::Erroneous(expr) | FoldResult::Original(expr) => expr,
        }
    }
}

impl IrInterpreter {
    /// Interprets `expr` and rewrites the result as an IR node.
    #[instrument(level = "debug", skip(self))]
    pub fn fold(&mut self, expr: ExprId) -> EvalResult<FoldResult> {
        let state = self.interpret(expr)?;
        let span = self.module().expr(expr).span;

        if let State::Exception(exception) = &state {
            let description = exception.borrow().long_description();
            let mut module = self.env.module_mut();
            let message = module.intern(&description);
            let node = module.alloc_expr(Expr {
                kind: ExprKind::Error(message),
                ty: TypeId::NOTHING,
                span,
            });
            debug!(%description, "folded to an error");
            return Ok(FoldResult::Erroneous(node));
        }

        let Some((value, ty)) = self.constant_of(&state) else {
            return Ok(FoldResult::Original(expr));
        };
        let mut module = self.env.module_mut();
        let value = match value {
            Constant::Value(value) => value,
            Constant::Text(text) => ConstValue::String(module.intern(&text)),
        };
        let node = module.alloc_expr(Expr {
            kind: ExprKind::Const(value),
            ty,
            span,
        });
        Ok(FoldResult::Constant(node))
    }

    /// Literal form of `state` and the type the new node carries.
    fn constant_of(&self, state: &State) -> Option<(Constant, TypeId)> {
        match state {
            State::Primitive(p) => {
                let value = self.literal(&p.value)?;
                let widened = matches!(p.value, PrimitiveValue::Float(_)) && self.env.platform().is_float_poor();
                Some((value, if widened { TypeId::DOUBLE } else { p.ty }))
            }
            State::Complex(object) => {
                let object = object.borrow();
                let unsigned = self.module().prelude().unsigned_class(object.class())?;
                let data = object.field(unsigned.data)?.as_value()?.clone();
                let value = self.literal(&data)?;
                Some((value, object.ty()))
            }
            _ => None,
        }
    }

    fn literal(&self, value: &PrimitiveValue) -> Option<Constant> {
        let literal = match *value {
            PrimitiveValue::Null => ConstValue::Null,
            PrimitiveValue::Boolean(b) => ConstValue::Boolean(b),
            PrimitiveValue::Char(c) => ConstValue::Char(c),
            PrimitiveValue::Byte(v) => ConstValue::Byte(v),
            PrimitiveValue::Short(v) => ConstValue::Short(v),
            PrimitiveValue::Int(v) => ConstValue::Int(v),
            PrimitiveValue::Long(v) => ConstValue::Long(v),
            PrimitiveValue::Float(v) if self.env.platform().is_float_poor() => ConstValue::double(f64::from(v)),
            PrimitiveValue::Float(v) => ConstValue::float(v),
            PrimitiveValue::Double(v) => ConstValue::double(v),
            PrimitiveValue::String(ref text) => return Some(Constant::Text(text.to_string())),
            PrimitiveValue::Unit | PrimitiveValue::Array(_) => return None,
        };
        Some(Constant::Value(literal))
    }
}

enum Constant {
    Value(ConstValue),
    Text(String),
}
