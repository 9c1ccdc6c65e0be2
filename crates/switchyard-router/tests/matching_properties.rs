//! Property tests for path matching.

use http::Method;
use proptest::prelude::*;
use switchyard_router::{PathMatcher, Pattern, PrefixMatcher};

fn arb_segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

fn arb_slug() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(-[a-z]{1,6}){1,3}"
}

fn article_matcher() -> PathMatcher<&'static str> {
    let mut matcher = PathMatcher::new();
    for (pattern, name) in [
        ("/articles", "list"),
        ("/articles/search", "search"),
        ("/articles/{month}-{day}-{year}", "byDate"),
        ("/articles/{articleSlug:[a-z-]+}", "bySlug"),
        ("/articles/{articleID}", "byId"),
        ("/files/*", "files"),
    ] {
        matcher.insert(Method::GET, pattern, name).unwrap();
    }
    matcher
}

proptest! {
    #[test]
    fn literal_routes_match_themselves(segments in prop::collection::vec(arb_segment(), 1..5)) {
        let path = format!("/{}", segments.join("/"));
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, &path, ()).unwrap();

        prop_assert!(matcher.match_route(&Method::GET, &path).is_some());
        let trailing = format!("{path}/");
        prop_assert!(matcher.match_route(&Method::GET, &trailing).is_some());
    }

    #[test]
    fn params_capture_whole_segment(value in arb_segment()) {
        let matcher = article_matcher();
        let path = format!("/articles/x{value}");
        let m = matcher.match_route(&Method::GET, &path).unwrap();

        // Digits keep the slug constraint from applying.
        if value.chars().any(|c| c.is_ascii_digit()) {
            prop_assert_eq!(*m.value, "byId");
            let expected = format!("x{value}");
            prop_assert_eq!(m.params.get("articleID"), Some(expected.as_str()));
        } else {
            prop_assert_eq!(*m.value, "bySlug");
        }
    }

    #[test]
    fn slugs_prefer_constraint_over_composite(slug in arb_slug()) {
        let matcher = article_matcher();
        let path = format!("/articles/{slug}");
        let m = matcher.match_route(&Method::GET, &path).unwrap();

        prop_assert_eq!(*m.value, "bySlug");
        prop_assert_eq!(m.params.get("articleSlug"), Some(slug.as_str()));
    }

    #[test]
    fn dates_bind_every_component(month in 1u32..=12, day in 1u32..=28, year in 1990u32..2100) {
        let matcher = article_matcher();
        let path = format!("/articles/{month:02}-{day:02}-{year}");
        let m = matcher.match_route(&Method::GET, &path).unwrap();

        prop_assert_eq!(*m.value, "byDate");
        let (month, day, year) = (format!("{month:02}"), format!("{day:02}"), year.to_string());
        prop_assert_eq!(m.params.get("month"), Some(month.as_str()));
        prop_assert_eq!(m.params.get("day"), Some(day.as_str()));
        prop_assert_eq!(m.params.get("year"), Some(year.as_str()));
    }

    #[test]
    fn wildcard_captures_remainder(segments in prop::collection::vec(arb_segment(), 1..6)) {
        let matcher = article_matcher();
        let rest = segments.join("/");
        let m = matcher.match_route(&Method::GET, &format!("/files/{rest}")).unwrap();

        prop_assert_eq!(*m.value, "files");
        prop_assert_eq!(m.params.get("*"), Some(rest.as_str()));
    }

    #[test]
    fn prefix_remainder_rejoins_path(
        prefix in prop::collection::vec(arb_segment(), 1..3),
        rest in prop::collection::vec(arb_segment(), 0..4),
    ) {
        let prefix_path = format!("/{}", prefix.join("/"));
        let mut mounts = PrefixMatcher::new();
        mounts.insert(&prefix_path, ()).unwrap();

        let mut path = prefix_path.clone();
        for segment in &rest {
            path.push('/');
            path.push_str(segment);
        }

        let hits = mounts.match_prefix(&path);
        prop_assert_eq!(hits.len(), 1);
        let expected = if rest.is_empty() { "/".to_string() } else { format!("/{}", rest.join("/")) };
        prop_assert_eq!(&hits[0].remainder, &expected);
    }

    #[test]
    fn parse_never_panics(input in "[a-z{}:/*\\[\\]+-]{0,24}") {
        let _ = Pattern::parse(&input);
    }
}
