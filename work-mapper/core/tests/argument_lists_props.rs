// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use proptest::prelude::*;
use work_mapper_core::{check_arity, ArgumentLists, MapperError};

proptest! {
    #[test]
    fn test_rows_pair_up_positionally(
        pairs in prop::collection::vec((any::<i32>(), "[a-z]{0,6}"), 0..50),
    ) {
        let (numbers, words): (Vec<i32>, Vec<String>) = pairs.iter().cloned().unzip();
        let rows = (numbers, words).into_rows().unwrap();
        prop_assert_eq!(rows, pairs);
    }

    #[test]
    fn test_arity_reports_first_mismatching_list(
        lengths in prop::collection::vec(0usize..5, 1..6),
    ) {
        match check_arity(&lengths) {
            Ok(count) => prop_assert!(lengths.iter().all(|&len| len == count)),
            Err(MapperError::Arity { list_index, expected, found }) => {
                prop_assert_eq!(expected, lengths[0]);
                prop_assert_eq!(found, lengths[list_index]);
                prop_assert!(lengths[..list_index].iter().all(|&len| len == expected));
                prop_assert_ne!(found, expected);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn test_three_lists_of_unequal_length_are_rejected(
        a in prop::collection::vec(any::<u8>(), 1..10),
        extra in 1usize..4,
    ) {
        let b = a.clone();
        let c: Vec<u8> = a.iter().copied().chain(std::iter::repeat(0).take(extra)).collect();
        let err = (a, b, c).into_rows().unwrap_err();
        let is_arity = matches!(err, MapperError::Arity { list_index: 2, .. });
        prop_assert!(is_arity);
    }
}
