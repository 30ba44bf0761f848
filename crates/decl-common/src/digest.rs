//! MD5 content fingerprints over ordered sequences of digestable values.
//!
//! Grounded on the `md5 = "0.7"` dependency used for content hashing in the
//! wider example pool (content-addressed catalog entries, cache keys).

/// Converts a value to the bytes fed into the digest.
pub trait Digestable {
    fn digest_bytes(&self) -> Vec<u8>;
}

impl Digestable for str {
    fn digest_bytes(&self) -> Vec<u8> {
        // Whitespace is stripped before hashing so formatting-only
        // differences between two equivalent sources collapse to one digest.
        self.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .into_bytes()
    }
}

impl Digestable for String {
    fn digest_bytes(&self) -> Vec<u8> {
        self.as_str().digest_bytes()
    }
}

impl Digestable for [u8] {
    fn digest_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

/// Hex-encodes an MD5 digest over the concatenation of `values`' byte
/// encodings, in order. Output is lowercase, 32 hex characters.
pub fn digest_of<T: Digestable>(values: &[T]) -> String {
    let mut buf = Vec::new();
    for v in values {
        buf.extend(v.digest_bytes());
    }
    format!("{:x}", md5::compute(&buf))
}

pub fn digest_of_strings<S: AsRef<str>>(values: &[S]) -> String {
    let bytes: Vec<String> = values.iter().map(|s| s.as_ref().to_string()).collect();
    digest_of(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_lowercase_32_hex_chars() {
        let d = digest_of_strings(&["hello", "world"]);
        assert_eq!(d.len(), 32);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn whitespace_normalization_does_not_change_digest() {
        let a = digest_of_strings(&["hello world", "foo"]);
        let b = digest_of_strings(&["hello   world", "f o o"]);
        assert_eq!(a, b);
    }

    #[test]
    fn is_deterministic() {
        let a = digest_of_strings(&["a", "b", "c"]);
        let b = digest_of_strings(&["a", "b", "c"]);
        assert_eq!(a, b);
    }
}
