//! Identity comparison for immutable tree values.
//!
//! Tree nodes compare by identity, never by field equality. `with_*`
//! combinators use [`Identity::is_identical`] to return the original node
//! untouched when a field is replaced by the value it already holds, and the
//! delta sender uses it to emit `NO_CHANGE`.

use std::rc::Rc;

/// Whether two values are "the same" for structural-sharing purposes.
///
/// Reference-counted handles compare by pointer. Plain values (strings,
/// flags, whitespace) compare by value, since a value-equal replacement is
/// indistinguishable from keeping the original.
pub trait Identity {
    fn is_identical(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Rc<T> {
    fn is_identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.is_identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identity> Identity for Vec<T> {
    fn is_identical(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.is_identical(b))
    }
}

/// Implements [`Identity`] through `PartialEq` for plain value types.
#[macro_export]
macro_rules! identity_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::identity::Identity for $ty {
                fn is_identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!(String, bool, i64, u32, usize, uuid::Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_compares_by_pointer() {
        let a = Rc::new(String::from("x"));
        let b = Rc::new(String::from("x"));
        assert!(a.is_identical(&a.clone()));
        assert!(!a.is_identical(&b));
    }

    #[test]
    fn vectors_compare_elementwise() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(vec![a.clone()].is_identical(&vec![a.clone()]));
        assert!(!vec![a.clone()].is_identical(&vec![b]));
        assert!(!vec![a.clone()].is_identical(&vec![a.clone(), a]));
    }

    #[test]
    fn values_compare_by_equality() {
        assert!(String::from("a").is_identical(&String::from("a")));
        assert!(Some(true).is_identical(&Some(true)));
        assert!(!Some(true).is_identical(&None));
    }
}
