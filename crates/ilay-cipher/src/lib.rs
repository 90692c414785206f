/// ilay Content Cipher
///
/// A reversible masking transform for message content at rest: byte-wise XOR
/// against a fixed, publicly embedded keystream, then base64 so the result is
/// safe to store in a text column.
///
/// This is obfuscation, NOT confidentiality. The keystream ships with every
/// client, so anyone with the app logic can unmask stored content. It exists
/// to keep database rows unreadable to casual inspection, nothing more.
/// Real end-to-end encryption (key exchange, AEAD) is a future phase.
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

const KEYSTREAM: &[u8] = b"ilaychat_v1_secure_salt_99";

/// What `decode` returns for anything it cannot unmask: foreign rows,
/// truncated base64, content masked with a different keystream.
pub const UNREADABLE_PLACEHOLDER: &str = "unreadable message";

/// Mask plaintext for storage. Length-preserving under the XOR, then base64.
pub fn encode(plaintext: &str) -> String {
    let masked: Vec<u8> = plaintext
        .bytes()
        .zip(KEYSTREAM.iter().cycle())
        .map(|(byte, key)| byte ^ key)
        .collect();
    B64.encode(masked)
}

/// Unmask stored content. Never fails: malformed or foreign input yields
/// [`UNREADABLE_PLACEHOLDER`] so a bad row degrades to a visible placeholder
/// instead of an error.
pub fn decode(ciphertext: &str) -> String {
    let Ok(masked) = B64.decode(ciphertext) else {
        return UNREADABLE_PLACEHOLDER.to_string();
    };

    let unmasked: Vec<u8> = masked
        .iter()
        .zip(KEYSTREAM.iter().cycle())
        .map(|(byte, key)| byte ^ key)
        .collect();

    String::from_utf8(unmasked).unwrap_or_else(|_| UNREADABLE_PLACEHOLDER.to_string())
}
