//! Exact structural equality.
//!
//! [`StructuralEq`] compares two values field by field. Floats compare by
//! bit pattern: `0.1 + 0.2` differs from `0.3`, `NaN` equals an identical
//! `NaN`, and `-0.0` differs from `0.0`. Snapshot diffs use it to decide
//! whether an edit changed anything.

use std::collections::BTreeMap;

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::EntityId;

/// Deep, exact equality over component data.
///
/// Derive it with `#[derive(StructuralEq)]`, or get it together with
/// `#[derive(Component)]`.
pub trait StructuralEq {
    fn structural_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_by_partial_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl StructuralEq for $t {
                #[inline]
                fn structural_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_by_partial_eq!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String, str,
    (), EntityId,
);

impl StructuralEq for f32 {
    #[inline]
    fn structural_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl StructuralEq for f64 {
    #[inline]
    fn structural_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

macro_rules! impl_glam {
    ($($t:ty),*) => {
        $(
            impl StructuralEq for $t {
                fn structural_eq(&self, other: &Self) -> bool {
                    self.to_array().structural_eq(&other.to_array())
                }
            }
        )*
    };
}

impl_glam!(Vec2, Vec3, Vec4, Quat);

impl<T: StructuralEq> StructuralEq for Option<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.structural_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: StructuralEq> StructuralEq for [T] {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.structural_eq(b))
    }
}

impl<T: StructuralEq, const N: usize> StructuralEq for [T; N] {
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_slice().structural_eq(other.as_slice())
    }
}

impl<T: StructuralEq> StructuralEq for Vec<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_slice().structural_eq(other.as_slice())
    }
}

impl<T: StructuralEq + ?Sized> StructuralEq for Box<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        (**self).structural_eq(&**other)
    }
}

impl<K: Ord, V: StructuralEq> StructuralEq for BTreeMap<K, V> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb))
    }
}

macro_rules! impl_tuple {
    ($(($($name:ident $idx:tt),+)),*) => {
        $(
            impl<$($name: StructuralEq),+> StructuralEq for ($($name,)+) {
                fn structural_eq(&self, other: &Self) -> bool {
                    true $(&& self.$idx.structural_eq(&other.$idx))+
                }
            }
        )*
    };
}

impl_tuple!((A 0), (A 0, B 1), (A 0, B 1, C 2), (A 0, B 1, C 2, D 3));
