use std::collections::HashMap;
use std::sync::OnceLock;

/// Modifier flags reported with a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
    };
    pub const SHIFT_ALT: Modifiers = Modifiers {
        shift: true,
        alt: true,
    };
}

const SHIFT_PREFIX: &str = "shift + ";
const ALT_PREFIX: &str = "alt + ";
const SPACE_IDENTIFIER: &str = "space";

/// Canonical lookup identifier: lowercased key, prefixed by shift then alt.
///
/// `("Q", shift)` becomes `"shift + q"`, `("1", shift + alt)` becomes
/// `"shift + alt + 1"`. The prefix order never depends on how the event source
/// reports its flags.
pub fn canonical_identifier(key: &str, modifiers: Modifiers) -> String {
    let mut id = String::with_capacity(key.len() + SHIFT_PREFIX.len() + ALT_PREFIX.len());
    if modifiers.shift {
        id.push_str(SHIFT_PREFIX);
    }
    if modifiers.alt {
        id.push_str(ALT_PREFIX);
    }
    id.push_str(&key.to_lowercase());
    id
}

// MB-Sindhi layout, QWERTY position -> Sindhi character. Ligature cells that
// produce more than one scalar (گھ, جھ, ءِ, صليٰ, ...) cannot be typed as one
// unit and are left out.
const BASE_LAYER: &[(&str, char)] = &[
    ("`", '’'),
    ("1", '1'),
    ("2", '2'),
    ("3", '3'),
    ("4", '4'),
    ("5", '5'),
    ("6", '6'),
    ("7", '7'),
    ("8", '8'),
    ("9", '9'),
    ("0", '0'),
    ("-", 'ڏ'),
    ("=", 'ڌ'),
    ("q", 'ق'),
    ("w", 'ص'),
    ("e", 'ي'),
    ("r", 'ر'),
    ("t", 'ت'),
    ("y", 'ٿ'),
    ("u", 'ع'),
    ("i", 'ڳ'),
    ("o", 'و'),
    ("p", 'پ'),
    ("[", 'ڇ'),
    ("]", 'چ'),
    ("\\", 'ڍ'),
    ("a", 'ا'),
    ("s", 'س'),
    ("d", 'د'),
    ("f", 'ف'),
    ("g", 'گ'),
    ("h", 'ه'),
    ("j", 'ج'),
    ("k", 'ڪ'),
    ("l", 'ل'),
    (";", 'ک'),
    ("'", 'ڱ'),
    ("z", 'ز'),
    ("x", 'خ'),
    ("c", 'ط'),
    ("v", 'ڀ'),
    ("b", 'ب'),
    ("n", 'ن'),
    ("m", 'م'),
    (",", '،'),
    (".", '.'),
    ("/", 'ئ'),
];

const SHIFT_LAYER: &[(&str, char)] = &[
    ("`", '‘'),
    ("1", '!'),
    ("2", '\u{0670}'),
    ("7", '۽'),
    ("8", '*'),
    ("9", ')'),
    ("0", '('),
    ("-", '_'),
    ("=", '+'),
    ("q", '\u{064E}'),
    ("w", 'ض'),
    ("e", '\u{0650}'),
    ("r", 'ڙ'),
    ("t", 'ٽ'),
    ("y", 'ث'),
    ("u", 'غ'),
    ("i", 'ھ'),
    ("o", '\u{064F}'),
    ("p", 'ڦ'),
    ("[", 'ڃ'),
    ("]", 'ڄ'),
    ("\\", 'ٺ'),
    ("a", 'آ'),
    ("s", 'ش'),
    ("d", 'ڊ'),
    ("f", 'ڦ'),
    ("h", 'ح'),
    ("k", '\u{06E1}'),
    ("l", ':'),
    (";", '؛'),
    ("'", 'ـ'),
    ("z", 'ذ'),
    ("x", '\u{0651}'),
    ("c", 'ظ'),
    ("v", 'ء'),
    ("b", 'ٻ'),
    ("n", 'ڻ'),
    ("m", '۾'),
    (",", '“'),
    (".", '”'),
    ("/", '؟'),
];

const SHIFT_ALT_LAYER: &[(&str, char)] = &[
    ("1", '١'),
    ("2", '٢'),
    ("3", '٣'),
    ("4", '٤'),
    ("5", '٥'),
    ("6", '٦'),
    ("7", '٧'),
    ("8", '٨'),
    ("9", '٩'),
    ("0", '…'),
];

/// Bidirectional physical-key <-> Sindhi character table.
///
/// The reverse index is keyed by [`canonical_identifier`] so a lookup is a
/// single hash probe. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    by_identifier: HashMap<String, char>,
    by_char: HashMap<char, String>,
}

impl KeyMap {
    pub fn from_layers(layers: &[(Modifiers, &[(&str, char)])]) -> Self {
        let mut map = KeyMap::default();
        for (modifiers, cells) in layers {
            for &(key, c) in cells.iter() {
                map.insert(canonical_identifier(key, *modifiers), c);
            }
        }
        map
    }

    /// The shared MB-Sindhi table.
    pub fn sindhi() -> &'static KeyMap {
        static SINDHI: OnceLock<KeyMap> = OnceLock::new();
        SINDHI.get_or_init(|| {
            let mut map = KeyMap::from_layers(&[
                (Modifiers::NONE, BASE_LAYER),
                (Modifiers::SHIFT, SHIFT_LAYER),
                (Modifiers::SHIFT_ALT, SHIFT_ALT_LAYER),
            ]);
            map.insert(SPACE_IDENTIFIER.to_string(), ' ');
            map
        })
    }

    // first identifier registered for a character is the one hinted
    fn insert(&mut self, identifier: String, c: char) {
        self.by_char.entry(c).or_insert_with(|| identifier.clone());
        self.by_identifier.insert(identifier, c);
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    pub fn lookup(&self, identifier: &str) -> Option<char> {
        self.by_identifier.get(identifier).copied()
    }

    /// Map a physical or virtual key to the target script. Unmapped keys pass
    /// through unchanged.
    pub fn map_physical_key(&self, key: &str, modifiers: Modifiers) -> String {
        match self.lookup(&canonical_identifier(key, modifiers)) {
            Some(c) => c.to_string(),
            None => key.to_string(),
        }
    }

    /// Like [`KeyMap::map_physical_key`] but only for results that are a single
    /// typeable unit.
    pub fn map_char(&self, key: &str, modifiers: Modifiers) -> Option<char> {
        let mapped = self.map_physical_key(key, modifiers);
        let mut chars = mapped.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Key identifier to press for `c`, for display as a hint.
    pub fn hint_for(&self, c: char) -> Option<&str> {
        self.by_char.get(&c).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_identifier_order() {
        assert_eq!(canonical_identifier("Q", Modifiers::NONE), "q");
        assert_eq!(canonical_identifier("Q", Modifiers::SHIFT), "shift + q");
        assert_eq!(
            canonical_identifier("1", Modifiers { shift: false, alt: true }),
            "alt + 1"
        );
        assert_eq!(
            canonical_identifier("1", Modifiers::SHIFT_ALT),
            "shift + alt + 1"
        );
    }

    #[test]
    fn test_base_layer_mapping() {
        let map = KeyMap::sindhi();

        assert_eq!(map.map_physical_key("q", Modifiers::NONE), "ق");
        assert_eq!(map.map_physical_key("a", Modifiers::NONE), "ا");
        assert_eq!(map.map_physical_key("/", Modifiers::NONE), "ئ");
        assert_eq!(map.map_physical_key("-", Modifiers::NONE), "ڏ");
    }

    #[test]
    fn test_shift_mapping_is_case_insensitive() {
        let map = KeyMap::sindhi();

        assert_eq!(map.map_physical_key("T", Modifiers::SHIFT), "ٽ");
        assert_eq!(map.map_physical_key("t", Modifiers::SHIFT), "ٽ");
        assert_eq!(map.map_physical_key("B", Modifiers::SHIFT), "ٻ");
    }

    #[test]
    fn test_shift_alt_mapping() {
        let map = KeyMap::sindhi();

        assert_eq!(map.map_physical_key("3", Modifiers::SHIFT_ALT), "٣");
    }

    #[test]
    fn test_unmapped_key_passes_through() {
        let map = KeyMap::sindhi();

        assert_eq!(map.map_physical_key("!", Modifiers::SHIFT), "!");
        assert_eq!(map.map_physical_key("ArrowLeft", Modifiers::NONE), "ArrowLeft");
        assert_eq!(map.map_physical_key("q", Modifiers { shift: false, alt: true }), "q");
    }

    #[test]
    fn test_map_char_rejects_multi_char_keys() {
        let map = KeyMap::sindhi();

        assert_eq!(map.map_char("k", Modifiers::NONE), Some('ڪ'));
        assert_eq!(map.map_char("?", Modifiers::NONE), Some('?'));
        assert_eq!(map.map_char("Shift", Modifiers::SHIFT), None);
    }

    #[test]
    fn test_hint_round_trip() {
        let map = KeyMap::sindhi();

        assert_eq!(map.hint_for('ق'), Some("q"));
        assert_eq!(map.hint_for('ٽ'), Some("shift + t"));
        assert_eq!(map.hint_for(' '), Some("space"));
        assert_eq!(map.hint_for('x'), None);
        // duplicated layout cell: the first position wins
        assert_eq!(map.hint_for('ڦ'), Some("shift + p"));
    }

    #[test]
    fn test_every_hint_maps_back() {
        let map = KeyMap::sindhi();

        for c in "سنڌي ٻولي".chars() {
            let hint = map.hint_for(c).unwrap();
            assert_eq!(map.lookup(hint), Some(c));
        }
    }

    #[test]
    fn test_custom_layers() {
        let cells: &[(&str, char)] = &[("a", 'ا')];
        let map = KeyMap::from_layers(&[(Modifiers::NONE, cells)]);

        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
        assert_eq!(map.map_physical_key("A", Modifiers::NONE), "ا");
    }
}
