use regex::Regex;
use std::sync::LazyLock;

/// A way of finding an `<svg>` fragment inside panel text.
///
/// Group 1 of `pattern` must capture the `<svg>...</svg>` span itself;
/// the whole match is what gets cut out of the narrative. Fenced and marker
/// blocks swallow anything else inside them (an XML prolog, comments).
pub struct SvgMatcher {
    pub name: &'static str,
    pattern: &'static LazyLock<Regex>,
}

/// A located fragment and the byte span it occupied in the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgMatch {
    pub matcher: &'static str,
    pub fragment: String,
    pub span: std::ops::Range<usize>,
}

static MARKER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)---SVG_START---.*?(<svg\b.*?</svg>).*?---SVG_END---")
        .expect("marker pattern is valid")
});

static FENCED_SVG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*svg\b[^`]*?(<svg\b[^`]*?</svg>)[^`]*?```")
        .expect("fenced svg pattern is valid")
});

static FENCED_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*(?:xml|html)\b[^`]*?(<svg\b[^`]*?</svg>)[^`]*?```")
        .expect("fenced markup pattern is valid")
});

static BARE_SVG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<svg\b.*?</svg>)").expect("bare svg pattern is valid"));

/// Tried in order; the first hit wins.
pub static SVG_MATCHERS: [SvgMatcher; 4] = [
    SvgMatcher { name: "marker_block", pattern: &MARKER_BLOCK },
    SvgMatcher { name: "fenced_svg", pattern: &FENCED_SVG },
    SvgMatcher { name: "fenced_markup", pattern: &FENCED_MARKUP },
    SvgMatcher { name: "bare_svg", pattern: &BARE_SVG },
];

impl SvgMatcher {
    pub fn find(&self, text: &str) -> Option<SvgMatch> {
        let caps = self.pattern.captures(text)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;

        Some(SvgMatch {
            matcher: self.name,
            fragment: inner.as_str().trim().to_string(),
            span: whole.range(),
        })
    }
}

pub fn find_svg(text: &str) -> Option<SvgMatch> {
    find_with(&SVG_MATCHERS, text)
}

pub fn find_with(matchers: &[SvgMatcher], text: &str) -> Option<SvgMatch> {
    matchers.iter().find_map(|m| m.find(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_svg_block_captures_inner_fragment() {
        let text = "intro\n```svg\n<svg width=\"10\"><circle/></svg>\n```\noutro";
        let m = find_svg(text).unwrap();

        assert_eq!(m.matcher, "fenced_svg");
        assert_eq!(m.fragment, "<svg width=\"10\"><circle/></svg>");
        assert_eq!(&text[m.span.clone()], "```svg\n<svg width=\"10\"><circle/></svg>\n```");
    }

    #[test]
    fn xml_and_html_fences_are_generic_markup() {
        for tag in ["xml", "html", "HTML"] {
            let text = format!("a\n```{tag}\n<svg>B</svg>\n```\n");
            let m = find_svg(&text).unwrap();
            assert_eq!(m.matcher, "fenced_markup");
            assert_eq!(m.fragment, "<svg>B</svg>");
        }
    }

    #[test]
    fn bare_tags_match_anywhere() {
        let text = "text <SVG viewBox=\"0 0 1 1\">x</SVG> more";
        let m = find_svg(text).unwrap();
        assert_eq!(m.matcher, "bare_svg");
        assert_eq!(m.fragment, "<SVG viewBox=\"0 0 1 1\">x</SVG>");
    }

    #[test]
    fn marker_block_takes_markers_with_it() {
        let text = "**상황:** 카페\n---SVG_START---\n<svg>A</svg>\n---SVG_END---\n";
        let m = find_svg(text).unwrap();
        assert_eq!(m.matcher, "marker_block");
        assert_eq!(m.fragment, "<svg>A</svg>");
        assert!(text[m.span].ends_with("---SVG_END---"));
    }

    #[test]
    fn earlier_strategy_wins_over_later_ones() {
        let text = "<svg>bare</svg>\n```svg\n<svg>fenced</svg>\n```";
        let m = find_svg(text).unwrap();
        assert_eq!(m.matcher, "fenced_svg");
        assert_eq!(m.fragment, "<svg>fenced</svg>");
    }

    #[test]
    fn svgz_like_tags_are_not_svg() {
        assert!(find_svg("<svgfoo>x</svgfoo>").is_none());
        assert!(find_svg("no graphic here").is_none());
    }

    #[test]
    fn block_contents_around_the_svg_go_with_the_block() {
        let wrappings = [
            ("fenced_svg", "```svg\n", "\n```"),
            ("fenced_markup", "```xml\n", "\n```"),
            ("fenced_markup", "```html\n", "\n```"),
            ("marker_block", "---SVG_START---\n", "\n---SVG_END---"),
        ];

        for (matcher, open, close) in wrappings {
            let block = format!(
                "{open}<?xml version=\"1.0\"?>\n<svg>A</svg>\n<!-- end -->{close}"
            );
            let text = format!("앞\n{block}\n뒤");
            let m = find_svg(&text).unwrap();

            assert_eq!(m.matcher, matcher);
            assert_eq!(m.fragment, "<svg>A</svg>");
            assert_eq!(&text[m.span], block);
        }
    }

    #[test]
    fn fence_does_not_reach_into_the_next_block() {
        let text = "```svg\nnothing here\n```\n```svg\n<svg>B</svg>\n```";
        let m = find_svg(text).unwrap();
        assert_eq!(m.matcher, "fenced_svg");
        assert_eq!(&text[m.span], "```svg\n<svg>B</svg>\n```");
    }

    #[test]
    fn custom_matcher_list_is_respected() {
        let only_bare = [SvgMatcher { name: "bare_svg", pattern: &BARE_SVG }];
        let text = "```svg\n<svg>A</svg>\n```";
        let m = find_with(&only_bare, text).unwrap();
        assert_eq!(m.matcher, "bare_svg");
        assert_eq!(&text[m.span], "<svg>A</svg>");
    }
}
