use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

use super::SlugGenerator;

/// Make `base` unique against `existing`.
///
/// Returns `base` itself when it is free, otherwise the first of `base-1`,
/// `base-2`, ... that is not taken. `existing` is only read.
pub fn uniquify<S>(base: &str, existing: &HashSet<S>) -> String
where
    S: Borrow<str> + Hash + Eq,
{
    if !existing.contains(base) {
        return base.to_string();
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

/// An entity that carries a slug within its collection.
pub trait Slugged {
    fn slug(&self) -> &str;

    /// Identity used to leave the entity being edited out of the collision set.
    /// `None` for entities that have not been saved yet.
    fn entity_key(&self) -> Option<String>;
}

/// Slugs already taken in `items`, leaving out the entity being edited so that
/// re-saving it keeps its own slug.
pub fn existing_slugs<T: Slugged>(items: &[T], editing: Option<&T>) -> HashSet<String> {
    let editing_key = editing.and_then(T::entity_key);
    items
        .iter()
        .filter(|item| match (&editing_key, item.entity_key()) {
            (Some(editing), Some(key)) => *editing != key,
            _ => true,
        })
        .map(|item| item.slug().to_string())
        .collect()
}

/// Slug for a form whose source title just changed: generate, then
/// de-duplicate against the loaded collection.
pub fn derive_unique_slug<T: Slugged>(
    generator: &SlugGenerator,
    title: &str,
    items: &[T],
    editing: Option<&T>,
) -> String {
    let base = generator.generate(title);
    uniquify(&base, &existing_slugs(items, editing))
}
