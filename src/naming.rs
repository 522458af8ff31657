//! Derived-name encoding.
//!
//! A photo's file name is `<base>(@<tag>)*.<ext>`. The same encoding is parsed
//! back when reverting to a historical name, so rendering and parsing must
//! agree exactly.

/// Separator placed before every tag in a derived name.
pub const TAG_SEPARATOR: char = '@';

/// Split a file name into `(stem, extension)` at the last `.`.
///
/// A name without a dot has an empty extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) => (&file_name[..pos], &file_name[pos + 1..]),
        None => (file_name, ""),
    }
}

/// Render a derived name from its parts.
pub fn render_name<I, S>(base: &str, tags: I, extension: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut name = String::from(base);
    for tag in tags {
        name.push(TAG_SEPARATOR);
        name.push_str(tag.as_ref());
    }
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    name
}

/// Recover the ordered tag list encoded in a derived name.
///
/// When the stem starts with `base`, everything after the base is split on
/// `@`. Otherwise the first `@` segment is treated as the base. Empty segments
/// are dropped, so a malformed or bare name yields no tags.
pub fn parse_tags(file_name: &str, base: &str) -> Vec<String> {
    let (stem, _) = split_extension(file_name);
    let encoded = match stem.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with(TAG_SEPARATOR) => rest,
        _ => match stem.find(TAG_SEPARATOR) {
            Some(pos) => &stem[pos..],
            None => "",
        },
    };

    encoded
        .split(TAG_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a user-entered tag name is acceptable: non-empty, letters and digits only.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("img.jpg"), ("img", "jpg"));
        assert_eq!(split_extension("img@Apple.JPG"), ("img@Apple", "JPG"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[test]
    fn test_render_name() {
        assert_eq!(render_name("img", ["Apple", "Banana"], "jpg"), "img@Apple@Banana.jpg");
        assert_eq!(render_name("img", Vec::<String>::new(), "jpg"), "img.jpg");
        assert_eq!(render_name("noext", ["a"], ""), "noext@a");
    }

    #[test]
    fn test_parse_tags_recovers_rendered_order() {
        let tags = vec!["Green", "Cerulean", "Burgundy"];
        let name = render_name("testImage3", &tags, "tif");
        assert_eq!(parse_tags(&name, "testImage3"), tags);
    }

    #[test]
    fn test_parse_tags_bare_name() {
        assert!(parse_tags("img.jpg", "img").is_empty());
    }

    #[test]
    fn test_parse_tags_base_containing_separator() {
        // A file first seen already carrying an '@' keeps it in its base.
        assert_eq!(parse_tags("img@old@New.jpg", "img@old"), vec!["New"]);
        assert!(parse_tags("img@old.jpg", "img@old").is_empty());
    }

    #[test]
    fn test_parse_tags_foreign_base_falls_back_to_first_segment() {
        assert_eq!(parse_tags("other@A@B.png", "img"), vec!["A", "B"]);
    }

    #[test]
    fn test_parse_tags_malformed_yields_no_tags() {
        assert!(parse_tags("", "img").is_empty());
        assert!(parse_tags("img@@.jpg", "img").is_empty());
    }

    #[test]
    fn test_is_valid_tag_name() {
        assert!(is_valid_tag_name("Apple"));
        assert!(is_valid_tag_name("2024"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("has space"));
        assert!(!is_valid_tag_name("under_score"));
        assert!(!is_valid_tag_name("a@b"));
    }
}
