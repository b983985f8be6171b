//! Merging freshly imported entries into the persisted mapping.

use formfill_shared::FormData;

/// Merge `incoming` into a copy of `existing`.
///
/// With `overwrite`, incoming values replace existing ones for shared keys.
/// Without it, existing values are kept and only new keys are added. Keys
/// already in `existing` keep their position; new keys follow in the order
/// they appear in `incoming`.
pub fn merge(existing: &FormData, incoming: &FormData, overwrite: bool) -> FormData {
    let mut merged = existing.clone();
    for (key, value) in incoming.iter() {
        if overwrite || !merged.contains_key(key) {
            merged.insert(key, value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    #[test]
    fn overwrite_takes_incoming_value() {
        let existing = data(&[("Name", "John"), ("City", "Ankara")]);
        let incoming = data(&[("City", "Izmir"), ("Zip", "35000")]);

        let merged = merge(&existing, &incoming, true);
        assert_eq!(merged, data(&[("Name", "John"), ("City", "Izmir"), ("Zip", "35000")]));
    }

    #[test]
    fn keep_existing_only_adds_new_keys() {
        let existing = data(&[("Name", "John"), ("City", "Ankara")]);
        let incoming = data(&[("City", "Izmir"), ("Zip", "35000")]);

        let merged = merge(&existing, &incoming, false);
        assert_eq!(merged, data(&[("Name", "John"), ("City", "Ankara"), ("Zip", "35000")]));
    }

    #[test]
    fn inputs_are_untouched() {
        let existing = data(&[("a", "1")]);
        let incoming = data(&[("a", "2")]);
        let _ = merge(&existing, &incoming, true);
        assert_eq!(existing.get("a"), Some("1"));
        assert_eq!(incoming.get("a"), Some("2"));
    }

    fn form_data_strategy() -> impl Strategy<Value = FormData> {
        prop::collection::vec(("[a-e]{1,2}", "[a-z0-9]{1,4}"), 0..10)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    proptest! {
        #[test]
        fn merging_nothing_is_identity(m in form_data_strategy(), overwrite in any::<bool>()) {
            prop_assert_eq!(merge(&m, &FormData::new(), overwrite), m);
        }

        #[test]
        fn keep_existing_never_changes_present_values(
            existing in form_data_strategy(),
            incoming in form_data_strategy(),
        ) {
            let merged = merge(&existing, &incoming, false);
            for (key, value) in existing.iter() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }

        #[test]
        fn overwrite_always_takes_incoming(
            existing in form_data_strategy(),
            incoming in form_data_strategy(),
        ) {
            let merged = merge(&existing, &incoming, true);
            for (key, value) in incoming.iter() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }

        #[test]
        fn merged_keys_are_the_union(
            existing in form_data_strategy(),
            incoming in form_data_strategy(),
            overwrite in any::<bool>(),
        ) {
            let merged = merge(&existing, &incoming, overwrite);
            for key in existing.keys().chain(incoming.keys()) {
                prop_assert!(merged.contains_key(key));
            }
            prop_assert!(merged.len() <= existing.len() + incoming.len());
        }
    }
}
