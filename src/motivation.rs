//! Motivational quotes and stickers

use rand::seq::SliceRandom;
use rand::Rng;

pub const QUOTES: &[&str] = &[
    "🔥 Don't wait for the perfect moment — start now!",
    "💪 Every day you get stronger!",
    "🏋️ Your body reflects your spirit.",
    "⚡ Pain is weakness leaving the body.",
    "🥇 Success is the sum of small efforts repeated every day.",
    "🚀 Stop dreaming, start doing!",
    "💥 Never give up. Hard today, easier tomorrow.",
    "🌟 Do what others won't, and you'll live how others can't.",
    "🔥 Even if you fall — get up and do one more set!",
    "🏃 Don't compare yourself to others — compare yourself to who you were yesterday.",
    "⚡ Consistency beats intensity — train regularly.",
    "🎯 Set small goals and raise the bar gradually.",
];

pub const STICKERS: &[&str] = &[
    "CAACAgIAAxkBAAEIYQtlc8rC5H3kPCE6Mx9R4B0Uo8LskAACFgEAAladvQq5y8D_eMXh2zQE",
    "CAACAgIAAxkBAAEIYQ1lc8rZbWn3IVBymJHxLHzOcvGgCAACIAADrWW8FKkKJj9v1aRgNAQ",
    "CAACAgIAAxkBAAEIYQ9lc8riHHX7xdP8wojWx9DbMSuOIQACSwADrWW8FBv2u6tLV1IZNAQ",
];

pub fn random_quote<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or("💪")
}

pub fn random_sticker<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static str> {
    STICKERS.choose(rng).copied()
}
