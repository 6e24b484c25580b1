// Tag stripping for extracted text.
//
// This is a blunt pattern match, not an HTML parser: anything between a `<`
// and the nearest following `>` on the same line goes, whether or not it is
// a real tag.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag pattern is valid"));

/// Remove every `<...>` span (non-greedy, single line) from `text`.
pub fn clean(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

/// True if `text` still holds something `clean` would remove.
pub fn contains_markup(text: &str) -> bool {
    TAG_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_simple_tags() {
        assert_eq!(clean("<p>Hello <b>there</b></p>"), "Hello there");
    }

    #[test]
    fn test_non_greedy() {
        assert_eq!(clean("a <x> b <y> c"), "a  b  c");
    }

    #[test]
    fn test_leaves_unclosed_brackets() {
        assert_eq!(clean("3 < 5 and 7 > 2"), "3  2");
        assert_eq!(clean("x < y"), "x < y");
        assert_eq!(clean("only > here"), "only > here");
    }

    #[test]
    fn test_does_not_cross_lines() {
        assert_eq!(clean("open <\nclose >"), "open <\nclose >");
    }

    #[test]
    fn test_nested_brackets_are_cut_at_first_close() {
        assert_eq!(clean("<<a>b>"), "b>");
        assert_eq!(clean("<a <b> c>"), " c>");
    }

    #[test]
    fn test_output_never_contains_markup() {
        let samples = [
            "<html><body><h1>Title</h1></body></html>",
            "<<<>>>",
            "a<b<c>d>e<f",
            "<div class=\"x\">row</div>\n<span>two</span>",
            "plain text only",
            "<\n>",
            "<a<b<c<d>>>>",
        ];
        for sample in samples {
            let cleaned = clean(sample);
            assert!(
                !contains_markup(&cleaned),
                "{sample:?} cleaned to {cleaned:?} which still has markup"
            );
        }
    }

    #[test]
    fn test_untouched_without_markup() {
        let text = "Revenue grew 12% & margins held.\nNext line.";
        assert_eq!(clean(text), text);
    }
}
