use std::io::Write;

use navfilter::category::ResourceCategory;
use navfilter::error::NavFilterError;
use navfilter::policy::builtin::{builtin_config, DEFAULT_TEMPLATE};
use navfilter::policy::config::{Action, FilterConfig};
use navfilter::policy::{Disposition, DispositionEngine, RequestDescriptor};

const FULL_TOML: &str = r#"
[[policy.passthrough]]
name = "cdn-assets"
globs = ["https://cdn.example.com/*"]

[[policy.rules]]
name = "trackers"
patterns = ['://(?:[a-z]+\.)?tracker\.example/']
action = "block"

[[policy.rules]]
name = "feed"
categories = ["mainFrame"]
patterns = ['://www\.example\.com/(feed|trending)(?:/.*)?$']
except = ['://www\.example\.com/feed/saved$']
action = "redirect"
redirect = "https://www.example.com/inbox?from=${1}"
note = "Ranked surfaces"

[[policy.rules]]
name = "cdn-everything-else"
patterns = ['://cdn\.example\.com/']
action = "block"
"#;

#[test]
fn parse_full_config_with_rules() {
    let config = FilterConfig::from_toml_str(FULL_TOML).unwrap();
    assert_eq!(config.rule_count(), 4);

    let trackers = &config.policy.rules[0];
    assert_eq!(trackers.name, "trackers");
    assert_eq!(trackers.action, Action::Block);
    assert!(trackers.redirect.is_none());
    assert!(trackers.categories.is_empty());

    let feed = &config.policy.rules[1];
    assert_eq!(feed.categories, vec![ResourceCategory::MainFrame]);
    assert_eq!(feed.note.as_deref(), Some("Ranked surfaces"));
}

#[test]
fn full_config_evaluates_in_precedence_order() {
    let engine = DispositionEngine::from_config(&FilterConfig::from_toml_str(FULL_TOML).unwrap())
        .unwrap();
    let eval = |url: &str, category| engine.evaluate(&RequestDescriptor::new(url, category));

    // Passthrough glob beats the later block rule for the same host.
    assert_eq!(eval("https://cdn.example.com/app.js", ResourceCategory::Script), Disposition::Allow);
    assert_eq!(eval("http://cdn.example.com/app.js", ResourceCategory::Script), Disposition::Block);

    assert_eq!(eval("https://px.tracker.example/p.gif", ResourceCategory::Image), Disposition::Block);

    assert_eq!(
        eval("https://www.example.com/trending", ResourceCategory::MainFrame),
        Disposition::Redirect("https://www.example.com/inbox?from=trending".to_string())
    );
    assert_eq!(eval("https://www.example.com/trending", ResourceCategory::SubFrame), Disposition::Allow);
}

#[test]
fn exceptions_fall_through_to_later_rules() {
    let engine = DispositionEngine::from_config(&FilterConfig::from_toml_str(FULL_TOML).unwrap())
        .unwrap();

    let req = RequestDescriptor::new("https://www.example.com/feed/saved", ResourceCategory::MainFrame);
    let result = engine.explain(&req);
    assert_eq!(result.disposition, Disposition::Allow);
    assert!(result.matched_rule.is_none());

    let req = RequestDescriptor::new("https://www.example.com/feed/42", ResourceCategory::MainFrame);
    assert_eq!(
        engine.evaluate(&req),
        Disposition::Redirect("https://www.example.com/inbox?from=feed".to_string())
    );
}

#[test]
fn builtin_template_matches_builtin_engine() {
    let from_text = FilterConfig::from_toml_str(DEFAULT_TEMPLATE).unwrap();
    let builtin = builtin_config().unwrap();
    assert_eq!(from_text.rule_count(), builtin.rule_count());
    assert!(DispositionEngine::from_config(&from_text).is_ok());
}

#[test]
fn builtin_utility_exceptions_hold_when_feed_roots_widen() {
    let mut config = builtin_config().unwrap();
    let feeds = config
        .policy
        .rules
        .iter_mut()
        .find(|r| r.name == "facebook-feeds")
        .unwrap();
    assert!(!feeds.except.is_empty());
    feeds.patterns = vec![r"://(m|www)\.facebook\.com/".to_string()];
    let engine = DispositionEngine::from_config(&config).unwrap();

    let nav = |url: &str| engine.evaluate(&RequestDescriptor::new(url, ResourceCategory::MainFrame));
    let profile = Disposition::Redirect("https://m.facebook.com/me".to_string());

    for url in [
        "https://m.facebook.com/notifications",
        "https://www.facebook.com/messages/t/123",
        "https://m.facebook.com/settings",
        "https://m.facebook.com/profile.php?id=4",
        "https://m.facebook.com/me",
    ] {
        assert_eq!(nav(url), Disposition::Allow, "{url}");
    }
    assert_eq!(nav("https://m.facebook.com/home.php"), profile);
    assert_eq!(nav("https://www.facebook.com/groups/feed/"), profile);

    // Without the exceptions the widened rule swallows utility pages.
    let feeds = config
        .policy
        .rules
        .iter_mut()
        .find(|r| r.name == "facebook-feeds")
        .unwrap();
    feeds.except.clear();
    let bare = DispositionEngine::from_config(&config).unwrap();
    assert_eq!(
        bare.evaluate(&RequestDescriptor::new(
            "https://m.facebook.com/settings",
            ResourceCategory::MainFrame
        )),
        profile
    );
}

#[test]
fn invalid_toml_returns_error() {
    let result = FilterConfig::from_toml_str("this is not valid toml [[[");
    assert!(matches!(result, Err(NavFilterError::ConfigParse(_))));
}

#[test]
fn unknown_category_in_config_is_rejected() {
    let result = FilterConfig::from_toml_str(
        r#"
[[policy.rules]]
name = "typo"
categories = ["mainframe"]
patterns = ["a"]
action = "block"
"#,
    );
    assert!(matches!(result, Err(NavFilterError::ConfigParse(_))));
}

#[test]
fn unknown_action_is_rejected() {
    let result = FilterConfig::from_toml_str(
        r#"
[[policy.rules]]
name = "ask"
patterns = ["a"]
action = "ask"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn invalid_pattern_fails_engine_build() {
    let config = FilterConfig::from_toml_str(
        r#"
[[policy.rules]]
name = "broken"
patterns = ['(unclosed']
action = "block"
"#,
    )
    .unwrap();
    let err = DispositionEngine::from_config(&config).unwrap_err();
    assert!(matches!(err, NavFilterError::Pattern { ref rule, .. } if rule == "broken"));
}

#[test]
fn redirect_target_from_environment() {
    std::env::set_var("NAVFILTER_IT_PROFILE_URL", "https://m.example.com/me");
    let config = FilterConfig::from_toml_str(
        r#"
[[policy.rules]]
name = "feed"
categories = ["navigation"]
patterns = ['://m\.example\.com/feed$']
action = "redirect"
redirect = "${NAVFILTER_IT_PROFILE_URL}"
"#,
    )
    .unwrap();
    let engine = DispositionEngine::from_config(&config).unwrap();
    assert_eq!(
        engine.evaluate(&RequestDescriptor::from_tag("https://m.example.com/feed", "navigation")),
        Disposition::Redirect("https://m.example.com/me".to_string())
    );
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("navfilter.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(file, "{}", DEFAULT_TEMPLATE).unwrap();

    let engine = DispositionEngine::load_from_path(&config_path).unwrap();
    assert_eq!(engine.rule_count(), 3);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DispositionEngine::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, NavFilterError::Io(_)));
}
