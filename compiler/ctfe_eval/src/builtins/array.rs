use super::{BuiltinResult, Thrown};
use crate::state::{ArrayStorage, State};

fn index(storage: &ArrayStorage, arg: Option<&State>) -> Option<BuiltinResult<usize>> {
    let raw = arg?.as_value()?.as_i32()?;
    let len = storage.borrow().len();
    Some(
        usize::try_from(raw)
            .ok()
            .filter(|&i| i < len)
            .ok_or_else(|| Thrown::index_out_of_bounds(i64::from(raw), len)),
    )
}

/// `get`, `set` and `size` of an array receiver. Writes are visible
/// through every alias of the storage.
pub fn array_member(name: &str, storage: &ArrayStorage, args: &[State]) -> Option<BuiltinResult<State>> {
    match (name, args) {
        ("<get-size>", []) => Some(Ok(State::int(storage.borrow().len() as i32))),
        ("get", [_]) => Some(index(storage, args.first())?.map(|i| storage.borrow()[i].clone())),
        ("set", [_, value]) => Some(index(storage, args.first())?.map(|i| {
            storage.borrow_mut()[i] = value.clone();
            State::unit()
        })),
        _ => None,
    }
}
