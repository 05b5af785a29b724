use super::*;
use chrono::TimeZone;
use serde_json::Value;
use shared::domain::{ActionKind, PostId, SourceId, SourceSummary, TagId};

fn sample_post() -> Post {
    Post {
        id: PostId::new("p1"),
        title: "Borrow checker deep dive".to_string(),
        source: SourceSummary {
            id: SourceId::new("s1"),
            name: "Rust Weekly".to_string(),
        },
        tags: vec![TagId::new("rust"), TagId::new("")],
        bookmarked: false,
        hidden: false,
        pinned_at: None,
        vote: UserVote::None,
    }
}

fn entry_for(entries: &[MenuEntry], kind: ActionKind) -> Option<&MenuEntry> {
    entries.iter().find(|entry| entry.action.kind == kind)
}

#[test]
fn default_menu_offers_hide_bookmark_downvote_source_and_tags() {
    let settings = FeedSettings::default();
    let flags = FlagSet::default();
    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: false,
        },
    );

    assert!(entry_for(&entries, ActionKind::HidePost).is_some());
    assert!(entry_for(&entries, ActionKind::ToggleBookmark).is_some());
    assert!(entry_for(&entries, ActionKind::ToggleDownvote).is_some());
    assert!(entry_for(&entries, ActionKind::PinPost).is_none());

    let source = entry_for(&entries, ActionKind::BlockSource).expect("source entry");
    assert_eq!(source.label, "Don't show posts from Rust Weekly");
    assert!(source.action.reversible);

    // Empty tags are skipped.
    let tag_entries: Vec<_> = entries
        .iter()
        .filter(|entry| entry.action.kind == ActionKind::BlockTag)
        .collect();
    assert_eq!(tag_entries.len(), 1);
    assert_eq!(tag_entries[0].label, "Not interested in #rust");
}

#[test]
fn bookmark_entry_is_dropped_when_card_owns_the_control() {
    let settings = FeedSettings::default();
    let mut flags = FlagSet::default();
    flags.set("bookmark_on_card", Value::Bool(true));

    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: false,
        },
    );
    assert!(entry_for(&entries, ActionKind::ToggleBookmark).is_none());
}

#[test]
fn blocked_source_offers_unblock_without_undo() {
    let mut settings = FeedSettings::default();
    settings.excluded_sources.push(SourceId::new("s1"));
    let flags = FlagSet::default();

    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: false,
        },
    );
    let source = entry_for(&entries, ActionKind::BlockSource).expect("source entry");
    assert_eq!(source.label, "Show posts from Rust Weekly");
    assert_eq!(source.action.next, ActionState::Flag(false));
    assert!(!source.action.reversible);
}

#[test]
fn blocked_tag_offers_follow_back() {
    let mut settings = FeedSettings::default();
    settings.blocked_tags.push(TagId::new("rust"));
    let flags = FlagSet::default();

    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: false,
        },
    );
    let tag = entry_for(&entries, ActionKind::BlockTag).expect("tag entry");
    assert_eq!(tag.label, "Follow #rust");
    assert_eq!(tag.action.next, ActionState::Flag(false));
}

#[test]
fn pin_entry_leads_when_permitted() {
    let settings = FeedSettings::default();
    let flags = FlagSet::default();

    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: true,
        },
    );
    assert_eq!(entries[0].label, "Pin to top");
    assert_eq!(entries[0].action.previous, ActionState::Pinned(None));
    assert!(matches!(
        entries[0].action.next,
        ActionState::Pinned(Some(_))
    ));
}

#[test]
fn pinned_post_offers_unpin() {
    let mut post = sample_post();
    post.pinned_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let settings = FeedSettings::default();
    let flags = FlagSet::default();

    let entries = post_options(
        &post,
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: true,
        },
    );
    assert_eq!(entries[0].label, "Unpin from top");
    assert_eq!(entries[0].action.next, ActionState::Pinned(None));
    assert_eq!(entries[0].action.message, "Your post has been unpinned");
}

#[test]
fn hide_entry_reverses_to_current_hidden_state() {
    let settings = FeedSettings::default();
    let flags = FlagSet::default();
    let entries = post_options(
        &sample_post(),
        &MenuContext {
            settings: &settings,
            flags: &flags,
            allow_pin: false,
        },
    );

    let hide = entry_for(&entries, ActionKind::HidePost).expect("hide entry");
    assert_eq!(hide.action.previous, ActionState::Flag(false));
    assert_eq!(hide.action.next, ActionState::Flag(true));
    assert!(hide.action.reversible);
}
