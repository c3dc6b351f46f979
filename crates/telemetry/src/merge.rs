//! Field-wise fallback merging of partial records.

/// A partial record whose fields can be filled from a lower-priority partial.
pub trait Merge: Sized {
    /// Keeps every field already set on `self` and takes the rest from
    /// `later`.
    fn merge(self, later: Self) -> Self;
}

/// Implements [`Merge`] for a struct whose fields are all `Option`s.
macro_rules! impl_merge {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::merge::Merge for $ty {
            fn merge(self, later: Self) -> Self {
                Self {
                    $($field: self.$field.or(later.$field),)*
                }
            }
        }
    };
}
pub(crate) use impl_merge;

/// Folds partials in priority order: the first `Some` of each field wins.
pub fn merge_all<T, I>(partials: I) -> T
where
    T: Merge + Default,
    I: IntoIterator<Item = T>,
{
    partials
        .into_iter()
        .fold(T::default(), |merged, next| merged.merge(next))
}
