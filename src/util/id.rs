//! ID utilities (room codes, player ids).

use rand::Rng;
use ulid::Ulid;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ROOM_CODE_LEN: usize = 6;

/// Short uppercase code players type in to join a room.
pub fn new_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| char::from(ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())]))
        .collect()
}

/// Room codes are typed by hand, so compare them case-insensitively.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Identity of one socket connection for its whole lifetime.
pub fn new_player_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_codes_are_short_uppercase_alphanumerics() {
        for _ in 0..100 {
            let code = new_room_code();
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn typed_codes_are_normalized() {
        assert_eq!(normalize_room_code("  ab12cd "), "AB12CD");
    }

    #[test]
    fn player_ids_differ() {
        assert_ne!(new_player_id(), new_player_id());
    }
}
