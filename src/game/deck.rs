//! Image catalog and paired deck construction.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use super::engine::GameError;

/// Number of card pictures shipped under `images/`.
pub const IMAGE_COUNT: usize = 45;

/// Path of picture `n` (1-based) relative to the static root.
pub fn image_path(n: usize) -> String {
    format!("images/bild{n}.jpg")
}

pub fn catalog() -> Vec<String> {
    (1..=IMAGE_COUNT).map(image_path).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub image: String,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub fn face_down(image: impl Into<String>) -> Self {
        Self { image: image.into(), is_flipped: false, is_matched: false }
    }

    /// Face up for any reason, either pending evaluation or already matched.
    pub fn is_revealed(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

/// Pick `total_pairs` distinct pictures, put each on two cards and shuffle.
pub fn build_deck<R: Rng + ?Sized>(total_pairs: usize, rng: &mut R) -> Result<Vec<Card>, GameError> {
    if total_pairs == 0 || total_pairs > IMAGE_COUNT {
        return Err(GameError::InvalidPairCount(total_pairs));
    }
    let mut images = catalog();
    images.shuffle(rng);
    images.truncate(total_pairs);

    let mut cards: Vec<Card> = images
        .iter()
        .chain(images.iter())
        .map(|img| Card::face_down(img.as_str()))
        .collect();
    cards.shuffle(rng);
    Ok(cards)
}
