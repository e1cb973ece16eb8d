// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::MapperError;

/// K parallel argument lists of equal length N, zipped into N rows.
///
/// Row *i* holds the *i*-th element of every list. Lengths are checked before
/// anything is produced.
pub trait ArgumentLists {
    type Row;

    /// Length of each list, in list order
    fn lengths(&self) -> Vec<usize>;

    /// Zips the lists into rows, failing on unequal lengths
    fn into_rows(self) -> Result<Vec<Self::Row>, MapperError>;

    /// Number of rows these lists will produce, if the lengths agree
    fn row_count(&self) -> Result<usize, MapperError> {
        check_arity(&self.lengths())
    }
}

/// Returns the common length, or the first list that disagrees with list 0
pub fn check_arity(lengths: &[usize]) -> Result<usize, MapperError> {
    let expected = lengths.first().copied().unwrap_or(0);
    match lengths.iter().position(|&len| len != expected) {
        Some(list_index) => Err(MapperError::Arity {
            list_index,
            expected,
            found: lengths[list_index],
        }),
        None => Ok(expected),
    }
}

impl<A> ArgumentLists for Vec<A> {
    type Row = A;

    fn lengths(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn into_rows(self) -> Result<Vec<A>, MapperError> {
        Ok(self)
    }
}

macro_rules! impl_argument_lists {
    ($($list:ident : $ty:ident),+) => {
        impl<$($ty),+> ArgumentLists for ($(Vec<$ty>,)+) {
            type Row = ($($ty,)+);

            fn lengths(&self) -> Vec<usize> {
                let ($($list,)+) = self;
                vec![$($list.len()),+]
            }

            fn into_rows(self) -> Result<Vec<Self::Row>, MapperError> {
                let count = self.row_count()?;
                let ($($list,)+) = self;
                $(let mut $list = $list.into_iter();)+
                let mut rows = Vec::with_capacity(count);
                for _ in 0..count {
                    match ($($list.next(),)+) {
                        ($(Some($list),)+) => rows.push(($($list,)+)),
                        _ => break,
                    }
                }
                Ok(rows)
            }
        }
    };
}

impl_argument_lists!(a: A);
impl_argument_lists!(a: A, b: B);
impl_argument_lists!(a: A, b: B, c: C);
impl_argument_lists!(a: A, b: B, c: C, d: D);
