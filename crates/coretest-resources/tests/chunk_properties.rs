// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use coretest_resources::{ResourceStore, StoreError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn chunk_in_bounds_only_touches_its_range(
        size in 1usize..512,
        data in proptest::collection::vec(any::<u8>(), 0..64),
        offset_seed in any::<usize>(),
    ) {
        prop_assume!(data.len() <= size);
        let offset = offset_seed % (size - data.len() + 1);

        let mut store = ResourceStore::new();
        store.begin("asset", size).unwrap();
        let written = store.chunk("asset", offset, &STANDARD.encode(&data)).unwrap();
        prop_assert_eq!(written, data.len());

        let contents = store.get("asset").unwrap();
        prop_assert_eq!(contents.len(), size);
        prop_assert_eq!(&contents[offset..offset + data.len()], &data[..]);
        prop_assert!(contents[..offset].iter().all(|b| *b == 0));
        prop_assert!(contents[offset + data.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn chunk_past_end_is_rejected_untouched(
        size in 0usize..256,
        data in proptest::collection::vec(1u8..=255, 1..64),
        overshoot in 1usize..64,
    ) {
        let offset = size + overshoot - data.len().min(size + overshoot);
        prop_assume!(offset + data.len() > size);

        let mut store = ResourceStore::new();
        store.begin("asset", size).unwrap();
        let result = store.chunk("asset", offset, &STANDARD.encode(&data));

        let is_overflow = matches!(result, Err(StoreError::Overflow { .. }));
        prop_assert!(is_overflow);
        prop_assert!(store.get("asset").unwrap().iter().all(|b| *b == 0));
    }
}
