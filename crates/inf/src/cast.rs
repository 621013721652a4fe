use num::{NumCast, ToPrimitive};

/// Numeric cast of an optional value, `None` when the cast is lossy or out of range
pub fn option<U: NumCast>(value: Option<impl ToPrimitive>) -> Option<U> {
    value.and_then(|val| NumCast::from(val))
}
