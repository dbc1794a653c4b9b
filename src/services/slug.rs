/// Lowercases and collapses a display name into a URL slug: alphanumeric
/// runs joined by single hyphens, everything else dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug precedence for create requests: an explicit non-empty slug wins,
/// otherwise the slug is derived from the name.
pub fn resolve_slug(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim) {
        Some(raw) if !raw.is_empty() => slugify(raw),
        _ => slugify(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_from_lowercased_hyphenated_name() {
        assert_eq!(slugify("Business English!"), "business-english");
        assert_eq!(slugify("  Travel & Food  "), "travel-food");
        assert_eq!(slugify("A1 - Beginner"), "a1-beginner");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(slugify("Español Básico"), "español-básico");
    }

    #[test]
    fn already_slugged_input_is_unchanged() {
        assert_eq!(slugify("business-english"), "business-english");
    }

    #[test]
    fn explicit_slug_wins_over_name() {
        assert_eq!(resolve_slug(Some("custom-slug"), "Some Name"), "custom-slug");
        assert_eq!(resolve_slug(Some("   "), "Some Name"), "some-name");
        assert_eq!(resolve_slug(None, "Some Name"), "some-name");
    }

    proptest! {
        #[test]
        fn never_emits_edge_or_double_hyphens(name in ".{0,64}") {
            let slug = slugify(&name);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slugify_is_idempotent(name in ".{0,64}") {
            let once = slugify(&name);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}
