// Device name generation: `<prefix><n>-<6 hex>`.

use uuid::Uuid;

const SUFFIX_LEN: usize = 6;

fn suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(SUFFIX_LEN);
    hex
}

/// A fresh name for the `ordinal`-th device of a pair.
pub fn device_name(prefix: &str, ordinal: u8) -> String {
    format!("{prefix}{ordinal}-{}", suffix())
}

/// Names for both devices of a pair. The ordinals keep them distinct.
pub fn device_pair_names(prefix: &str) -> (String, String) {
    (device_name(prefix, 1), device_name(prefix, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_has_prefix_ordinal_and_hex_suffix() {
        let name = device_name("switch", 1);
        let (head, tail) = name.split_once('-').unwrap_or_default();
        assert_eq!(head, "switch1");
        assert_eq!(tail.len(), 6);
        assert!(tail.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn pair_names_are_distinct() {
        for _ in 0..100 {
            let (a, b) = device_pair_names("switch");
            assert_ne!(a, b);
            assert!(a.starts_with("switch1-"));
            assert!(b.starts_with("switch2-"));
        }
    }

    #[test]
    fn custom_prefix() {
        let (a, _) = device_pair_names("leaf");
        assert!(a.starts_with("leaf1-"));
    }
}
