use rand::seq::SliceRandom;
use rand::Rng;

/// Short curiosities shown next to the data.
pub const CURIOSITIES: &[&str] = &[
    "The first known civilization was the Sumerian, in Mesopotamia.",
    "The Mongol Empire was the largest contiguous empire in history.",
    "The Second World War involved more than 30 countries.",
    "The printing press revolutionized Europe in the 15th century.",
    "According to legend, Rome was founded in 753 BC.",
];

pub fn random_curiosity<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CURIOSITIES.choose(rng).copied().unwrap_or_default()
}
