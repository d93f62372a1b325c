use shared::domain::Language;

use crate::{
    events::{Notifier, SessionEvent},
    registry::{Anchor, SourceRegistry},
    session::IgnoreReason,
};

fn registry() -> SourceRegistry {
    SourceRegistry::new(Notifier::default())
}

#[test]
fn records_are_created_only_by_opening_a_menu() {
    let mut registry = registry();
    assert!(registry.is_empty());

    registry
        .open_menu("nasa.gov", Some(true), Anchor::new("a1"))
        .expect("open");
    assert_eq!(
        registry.select_language("who.int", Language::French),
        Err(IgnoreReason::UnknownSource)
    );
    registry
        .select_language("nasa.gov", Language::French)
        .expect("language");

    assert_eq!(registry.len(), 1);
    assert!(registry.get("who.int").is_none());
    let nasa = registry.get("nasa.gov").expect("nasa");
    assert!(nasa.menu_open);
    assert_eq!(nasa.anchor, Some(Anchor::new("a1")));
    assert_eq!(nasa.selected_language, Some(Language::French));
}

#[test]
fn unverified_sources_never_open() {
    let mut registry = registry();
    assert_eq!(
        registry.open_menu("blog.example", Some(false), Anchor::new("a")),
        Err(IgnoreReason::UnverifiedSource)
    );
    assert!(registry.get("blog.example").is_none());
    assert_eq!(
        registry.select_language("blog.example", Language::Spanish),
        Err(IgnoreReason::UnknownSource)
    );
    assert_eq!(
        registry.begin_summary("blog.example"),
        Err(IgnoreReason::UnknownSource)
    );

    registry
        .open_menu("unmentioned.example", None, Anchor::new("b"))
        .expect("unknown status still opens");
}

#[test]
fn reopening_moves_the_anchor_and_keeps_language() {
    let mut registry = registry();
    registry
        .open_menu("nasa.gov", Some(true), Anchor::new("first"))
        .expect("open");
    registry
        .select_language("nasa.gov", Language::Japanese)
        .expect("language");
    registry.close_menu("nasa.gov").expect("close");
    registry
        .open_menu("nasa.gov", Some(true), Anchor::new("second"))
        .expect("reopen");

    let state = registry.get("nasa.gov").expect("state");
    assert!(state.menu_open);
    assert_eq!(state.anchor, Some(Anchor::new("second")));
    assert_eq!(state.selected_language, Some(Language::Japanese));
}

#[test]
fn closing_an_unknown_source_is_ignored() {
    let mut registry = registry();
    assert_eq!(
        registry.close_menu("ghost"),
        Err(IgnoreReason::UnknownSource)
    );
    assert!(registry.is_empty());
}

#[test]
fn summary_lifecycle_guards_preconditions() {
    let mut registry = registry();
    assert_eq!(
        registry.begin_summary("nasa.gov"),
        Err(IgnoreReason::UnknownSource)
    );
    assert!(registry.is_empty());

    registry
        .open_menu("nasa.gov", Some(true), Anchor::new("a"))
        .expect("open");
    assert_eq!(
        registry.begin_summary("nasa.gov"),
        Err(IgnoreReason::NoLanguageSelected)
    );
    assert!(!registry.get("nasa.gov").expect("state").summary_busy);

    registry
        .select_language("nasa.gov", Language::Russian)
        .expect("language");
    assert_eq!(registry.begin_summary("nasa.gov"), Ok(Language::Russian));
    assert!(registry.get("nasa.gov").expect("state").summary_busy);
    assert_eq!(registry.begin_summary("nasa.gov"), Err(IgnoreReason::Busy));

    registry.finish_summary("nasa.gov");
    assert!(!registry.get("nasa.gov").expect("state").summary_busy);
}

#[test]
fn sources_are_independent() {
    let mut registry = registry();
    for source in ["a.org", "b.org", "c.org"] {
        registry
            .open_menu(source, Some(true), Anchor::new(source))
            .expect("open");
        registry
            .select_language(source, Language::English)
            .expect("language");
    }
    registry.begin_summary("b.org").expect("begin");
    registry.close_menu("c.org").expect("close");

    assert!(registry.get("a.org").expect("a").menu_open);
    assert!(!registry.get("a.org").expect("a").summary_busy);
    assert!(registry.get("b.org").expect("b").summary_busy);
    assert!(!registry.get("c.org").expect("c").menu_open);
}

#[test]
fn mutations_notify_subscribers() {
    let notifier = Notifier::default();
    let mut events = notifier.subscribe();
    let mut registry = SourceRegistry::new(notifier);

    registry
        .open_menu("nasa.gov", None, Anchor::new("a"))
        .expect("open");
    registry
        .select_language("nasa.gov", Language::Chinese)
        .expect("language");
    assert_eq!(
        registry.select_language("ghost", Language::Chinese),
        Err(IgnoreReason::UnknownSource)
    );

    let nasa = SessionEvent::SourceChanged {
        source: "nasa.gov".into(),
    };
    assert_eq!(events.try_recv().expect("open event"), nasa);
    assert_eq!(events.try_recv().expect("language event"), nasa);
    assert!(events.try_recv().is_err());
}
