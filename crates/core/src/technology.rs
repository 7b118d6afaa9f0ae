//! Technology tag to icon markup mapping.
//!
//! Projects store raw tag strings (the values of the `technologies[]`
//! checkboxes). Pages render them as Font Awesome icons. Unknown tags have
//! no icon and are dropped without error.

/// Known tags and their icon markup.
const ICONS: &[(&str, &str)] = &[
    ("angular", r#"<i class="fab fa-angular"></i>"#),
    ("vultr", r#"<i class="fas fa-server"></i>"#),
    ("reactjs", r#"<i class="fab fa-react"></i>"#),
    ("nodejs", r#"<i class="fab fa-node-js"></i>"#),
    ("typescript", r#"<i class="fab fa-js"></i>"#),
];

/// Icon markup for a single tag, or `None` if the tag is unknown.
pub fn icon_for(tag: &str) -> Option<&'static str> {
    ICONS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, icon)| *icon)
}

/// Map tags to icon markup, preserving input order and skipping unknown tags.
pub fn render_technology_icons<S: AsRef<str>>(tags: &[S]) -> Vec<&'static str> {
    tags.iter().filter_map(|t| icon_for(t.as_ref())).collect()
}
