//! Finality backstop for non-verification turns.
//!
//! Until a claim has been verified the tutor must not hand out conclusions.
//! Any response carrying a finality marker is swapped for [`REDIRECT`],
//! whatever produced it.

/// Phrases that read as a final verdict.
pub const FINALITY_MARKERS: [&str; 5] = [
    "final answer",
    "therefore the answer",
    "the area is",
    "≈",
    "approximately",
];

pub const REDIRECT: &str =
    "Let's not finalize yet. What criterion would convince you your idea works?";

#[must_use]
pub fn contains_finality_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    FINALITY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// `text` unchanged, or the redirect when it gives an answer away.
#[must_use]
pub fn enforce(text: String) -> String {
    if contains_finality_marker(&text) {
        tracing::debug!("Deference filter replaced a finalizing response");
        REDIRECT.to_string()
    } else {
        text
    }
}
