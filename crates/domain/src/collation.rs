//! Locale-aware ordering of display names.
//!
//! Names go through the CLDR root collator: accents and case only matter
//! once the base letters tie, so `"Éclairage" < "Fan"` and
//! `"lamp" < "Lamp"`. Any remaining tie is broken on raw code points,
//! which keeps the order total.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};

thread_local! {
    static COLLATOR: Option<Collator> = Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Compare two display names with the root locale's collation rules.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => case_folded_cmp(a, b),
        })
        .then_with(|| a.cmp(b))
}

/// Used only when no collation data is available.
fn case_folded_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
