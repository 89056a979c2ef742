/// Convert a name to StudlyCase: `blog-posts`, `blog_posts` and
/// `blog posts` all become `BlogPosts`.
///
/// Characters already uppercase inside a word are kept, so `BlogPosts`
/// maps to itself.
pub fn studly(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(upper_first)
        .collect()
}

/// Convert a name to camelCase (`blog-posts` -> `blogPosts`)
pub fn camel(value: &str) -> String {
    lower_first(&studly(value))
}

/// Lowercase every character (`BlogPosts` -> `blogposts`)
pub fn lower(value: &str) -> String {
    value.to_lowercase()
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
