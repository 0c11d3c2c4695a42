//! Species names and colours.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Parent word used for species without an ancestor.
pub const ROOT_WORD: &str = "nodus";

static CONSONANTS: &[char] = &[
    'b', 'c', 'd', 'f', 'g', 'h', 'k', 'l', 'm', 'n', 'p', 'r', 's', 't', 'v', 'x', 'z',
];

static VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// Builds a pronounceable random word of 3 to 8 letters.
pub fn random_word() -> String {
    let mut rng = rand::rng();
    let len = rng.random_range(3..=8);
    let start_with_vowel = rng.random_bool(0.3);

    (0..len)
        .map(|i| {
            let vowel = (i % 2 == 0) == start_with_vowel;
            let pool = if vowel { VOWELS } else { CONSONANTS };
            *pool.choose(&mut rng).unwrap_or(&'a')
        })
        .collect()
}

/// RGB colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Color {
    /// Uniformly random colour.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            r: rng.random_range(0.0..=1.0),
            g: rng.random_range(0.0..=1.0),
            b: rng.random_range(0.0..=1.0),
        }
    }

    /// Even mix of two colours.
    pub fn blend(self, other: Color) -> Self {
        Self {
            r: (self.r + other.r) * 0.5,
            g: (self.g + other.g) * 0.5,
            b: (self.b + other.b) * 0.5,
        }
    }

    /// Colour of a species founded from a parent with colour `self`.
    pub fn inherit(self) -> Self {
        self.blend(Color::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_have_bounded_length() {
        for _ in 0..200 {
            let word = random_word();
            assert!((3..=8).contains(&word.len()), "{word}");
            assert!(word.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn blend_is_the_midpoint() {
        let black = Color { r: 0.0, g: 0.0, b: 0.0 };
        let white = Color { r: 1.0, g: 1.0, b: 1.0 };
        let grey = black.blend(white);
        assert!((grey.r - 0.5).abs() < f32::EPSILON);
        assert!((grey.g - 0.5).abs() < f32::EPSILON);
        assert!((grey.b - 0.5).abs() < f32::EPSILON);
    }
}
