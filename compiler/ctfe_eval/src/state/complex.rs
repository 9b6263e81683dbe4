use std::rc::Rc;

use ctfe_ir::{ClassId, FieldId, TypeId};

use super::{State, Wrapper};

/// An instance of an interpretable class.
///
/// Fields are kept in insertion order, which is initialization order.
#[derive(Clone, Debug)]
pub struct Complex {
    class: ClassId,
    ty: TypeId,
    fields: Vec<(FieldId, State)>,
    /// Host object backing a native superclass.
    super_wrapper: Option<Rc<Wrapper>>,
}

impl Complex {
    pub fn new(class: ClassId, ty: TypeId) -> Self {
        Complex {
            class,
            ty,
            fields: Vec::new(),
            super_wrapper: None,
        }
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn field(&self, field: FieldId) -> Option<&State> {
        self.fields
            .iter()
            .find_map(|(id, state)| (*id == field).then_some(state))
    }

    pub fn set_field(&mut self, field: FieldId, value: State) {
        match self.fields.iter_mut().find(|(id, _)| *id == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn fields(&self) -> &[(FieldId, State)] {
        &self.fields
    }

    pub fn super_wrapper(&self) -> Option<&Rc<Wrapper>> {
        self.super_wrapper.as_ref()
    }

    pub fn set_super_wrapper(&mut self, wrapper: Rc<Wrapper>) {
        self.super_wrapper = Some(wrapper);
    }
}
