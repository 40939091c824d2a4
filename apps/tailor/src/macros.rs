// Crate-wide macros. Declared first in main.rs so every module can use them.

/// Defines `fn $name() -> &'static Regex`, compiled once on first use.
/// Patterns are literals, so a compile failure is a programming error.
macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static ::regex::Regex {
            static RE: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            RE.get_or_init(|| ::regex::Regex::new($pattern).expect("valid static regex"))
        }
    };
}

/// Defines `fn $name() -> &'static Selector` for a literal CSS selector.
macro_rules! static_selector {
    ($name:ident, $css:expr) => {
        fn $name() -> &'static ::scraper::Selector {
            static SEL: ::std::sync::OnceLock<::scraper::Selector> = ::std::sync::OnceLock::new();
            SEL.get_or_init(|| ::scraper::Selector::parse($css).expect("valid static selector"))
        }
    };
}

/// Like `static_selector!`, for an ordered list of fallbacks.
macro_rules! static_selectors {
    ($name:ident, [$($css:expr),+ $(,)?]) => {
        fn $name() -> &'static [::scraper::Selector] {
            static SEL: ::std::sync::OnceLock<Vec<::scraper::Selector>> =
                ::std::sync::OnceLock::new();
            SEL.get_or_init(|| {
                vec![$(::scraper::Selector::parse($css).expect("valid static selector")),+]
            })
        }
    };
}
