//! Marker conventions for ontology terms and diagram labels.

/// Separates a namespace prefix from a local name in rank terms (`pmd:Motor`).
pub const RANK_SEPARATOR: char = ':';

/// Suffix marking an unbound template variable (`position_`).
pub const VARIABLE_MARKER: char = '_';

/// Marks structural stand-ins inside reference templates (`*part_`).
pub const PLACEHOLDER_MARKER: char = '*';

/// Marks diagram containers (areas) in node labels (`~Plant`).
pub const CONTAINER_MARKER: char = '~';

/// Rank terms belong to the class hierarchy rather than the instance graph.
pub fn is_rank_term(label: &str) -> bool {
    label.contains(RANK_SEPARATOR)
}

/// Any label ending with the variable marker, placeholders included.
pub fn is_variable(label: &str) -> bool {
    label.ends_with(VARIABLE_MARKER)
}

pub fn is_placeholder(label: &str) -> bool {
    label.contains(PLACEHOLDER_MARKER)
}

/// A variable that may be scoped under an instance name.
pub fn is_free_variable(label: &str) -> bool {
    is_variable(label) && !is_placeholder(label)
}

pub fn is_container_label(label: &str) -> bool {
    label.contains(CONTAINER_MARKER)
}

/// Strip the trailing variable marker (`position_` → `position`).
pub fn variable_stem(label: &str) -> &str {
    label.strip_suffix(VARIABLE_MARKER).unwrap_or(label)
}

/// `"{scope} {stem}"`: the name a free variable takes once scoped.
pub fn scoped_variable(scope: &str, label: &str) -> String {
    format!("{scope} {}", variable_stem(label))
}
