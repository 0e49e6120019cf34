//! Property tests for key translation totality and the ctrl mapping.

use core_keys::{KeyTranslator, NAMED_KEYS, translate};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ctrl_chord_maps_control_range(b in 63u32..96) {
        let c = char::from_u32(b).unwrap();
        let out = translate(&format!("ctrl+{c}")).into_owned();
        let expected = char::from_u32((b + 128 - 64) % 128).unwrap().to_string();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn ctrl_outside_range_passes_base_through(b in 96u32..127) {
        let c = char::from_u32(b).unwrap();
        let out = translate(&format!("ctrl+{c}")).into_owned();
        prop_assert_eq!(out, c.to_string());
    }

    #[test]
    fn unnamed_words_translate_to_themselves(word in "[a-z0-9]{1,8}") {
        prop_assume!(NAMED_KEYS.iter().all(|(name, _)| *name != word));
        prop_assert_eq!(translate(&word).into_owned(), word.clone());
        let keys = KeyTranslator::new();
        prop_assert_eq!(keys.translate(&word).into_owned(), word);
    }

    #[test]
    fn any_input_translates(key in ".{0,12}") {
        // totality: never panics, always yields something
        let _ = translate(&key);
    }
}
