//! Logical key name -> engine literal translation.
//!
//! Hosts describe key presses by name (`escape`, `ctrl+W`, `x`) while the
//! modal engine consumes the byte sequences a terminal would have produced
//! for the same keys. This crate owns that mapping.
//!
//! Rules:
//! * A chord (`mods+base`, anything containing `+` other than the literal
//!   `+` key) is split at the last `+`. A lone `ctrl` modifier over a single
//!   character in `'?'..='_'` (code points 63..96) becomes the matching
//!   control character, `(b - 64) mod 128`. `ctrl+?` therefore yields DEL.
//! * Every other chord falls through with its modifiers dropped: the base key
//!   is looked up as if it had been pressed alone.
//! * Named keys map through [`NAMED_KEYS`]; anything else is forwarded
//!   verbatim, so translation never fails.
//!
//! Lowercase chord bases are not folded (`ctrl+v` is outside the control
//! range and yields `v`); hosts that want block visual send `ctrl+V`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Built-in named keys and the literal the engine expects for each.
pub const NAMED_KEYS: &[(&str, &str)] = &[
    ("backspace", "\x08"),
    ("enter", "\n"),
    ("escape", "\x1b"),
    ("space", " "),
    ("tab", "\t"),
    ("up", "\x1b[A"),
    ("down", "\x1b[B"),
    ("right", "\x1b[C"),
    ("left", "\x1b[D"),
];

/// Literal for a built-in named key.
pub fn named(key: &str) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find_map(|(name, literal)| (*name == key).then_some(*literal))
}

/// Control character produced by `ctrl+<base>`, if `base` is a single
/// character inside the control range.
pub fn ctrl_chord(base: &str) -> Option<char> {
    let mut chars = base.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let b = c as u32;
    if (63..96).contains(&b) {
        // (b - 64) mod 128 without underflow for b == 63.
        char::from_u32((b + 64) % 128)
    } else {
        None
    }
}

/// Split `mods+base` at the last separator. The bare `+` key is not a chord.
pub fn split_chord(key: &str) -> Option<(Vec<&str>, &str)> {
    if key == "+" {
        return None;
    }
    let (mods, base) = key.rsplit_once('+')?;
    Some((mods.split('+').collect(), base))
}

/// Translate with the built-in table only.
pub fn translate(key: &str) -> Cow<'_, str> {
    let base = match split_chord(key) {
        Some((mods, base)) => {
            if let ["ctrl"] = mods.as_slice()
                && let Some(c) = ctrl_chord(base)
            {
                return Cow::Owned(c.to_string());
            }
            base
        }
        None => key,
    };
    named(base).map_or(Cow::Borrowed(base), Cow::Borrowed)
}

/// Key translator carrying the built-in table plus configured extras.
///
/// Extras come from the `[keys]` configuration table. They may add names but
/// never shadow a built-in: the engine contract for `escape`, `enter` and the
/// arrows is fixed.
#[derive(Debug, Default, Clone)]
pub struct KeyTranslator {
    extra: BTreeMap<String, String>,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a translator with additional named keys. Conflicting names are
    /// logged and skipped.
    pub fn with_extra<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut translator = Self::new();
        for (name, literal) in extra {
            translator.insert(name, literal);
        }
        translator
    }

    /// Register one extra named key. Returns false when the name is built in.
    pub fn insert(&mut self, name: impl Into<String>, literal: impl Into<String>) -> bool {
        let name = name.into();
        if named(&name).is_some() {
            warn!(target: "keys", key = name.as_str(), "builtin_key_override_ignored");
            return false;
        }
        self.extra.insert(name, literal.into());
        true
    }

    pub fn extra_len(&self) -> usize {
        self.extra.len()
    }

    pub fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        let out = match translate(key) {
            Cow::Borrowed(base) if named(base).is_none() => match self.extra.get(base) {
                Some(literal) => Cow::Borrowed(literal.as_str()),
                None => Cow::Borrowed(base),
            },
            other => other,
        };
        trace!(target: "keys.translate", key, literal = ?out, "translate_key");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_keys_map_to_literals() {
        for (name, literal) in NAMED_KEYS {
            assert_eq!(translate(name), *literal, "key {name}");
        }
    }

    #[test]
    fn ctrl_letters_become_control_characters() {
        assert_eq!(translate("ctrl+V"), "\x16");
        assert_eq!(translate("ctrl+@"), "\x00");
        assert_eq!(translate("ctrl+["), "\x1b");
        assert_eq!(translate("ctrl+_"), "\x1f");
        assert_eq!(translate("ctrl+?"), "\x7f");
    }

    #[test]
    fn plus_key_is_not_a_chord() {
        assert_eq!(translate("+"), "+");
    }

    #[test]
    fn unknown_and_single_chars_pass_through() {
        assert_eq!(translate("x"), "x");
        assert_eq!(translate("f5"), "f5");
    }

    #[test]
    fn other_chords_drop_modifiers() {
        // lowercase is outside the control range
        assert_eq!(translate("ctrl+v"), "v");
        assert_eq!(translate("shift+tab"), "\t");
        assert_eq!(translate("ctrl+alt+W"), "W");
        assert_eq!(translate("alt+escape"), "\x1b");
    }

    #[test]
    fn extras_extend_but_never_shadow_builtins() {
        let keys = KeyTranslator::with_extra([("page_up", "\x1b[5~"), ("escape", "q")]);
        assert_eq!(keys.extra_len(), 1);
        assert_eq!(keys.translate("page_up"), "\x1b[5~");
        assert_eq!(keys.translate("shift+page_up"), "\x1b[5~");
        assert_eq!(keys.translate("escape"), "\x1b");
        assert_eq!(keys.translate("ctrl+V"), "\x16");
        assert_eq!(keys.translate("z"), "z");
    }
}
