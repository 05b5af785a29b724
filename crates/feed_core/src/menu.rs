//! Assembles the post options menu: which actions the view offers for a post
//! given the user's feed settings, the remote flag set, and the caller's pin
//! capability. Pure functions; the controller never reads flags.

use chrono::Utc;
use shared::{
    domain::{Action, ActionKind, ActionState, FeedSettings, Post, TargetId, UserVote},
    flags::{FlagSet, BOOKMARK_ON_CARD},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: Action,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    pub settings: &'a FeedSettings,
    pub flags: &'a FlagSet,
    /// Only feed moderators may pin; the surrounding view decides.
    pub allow_pin: bool,
}

pub fn post_options(post: &Post, ctx: &MenuContext<'_>) -> Vec<MenuEntry> {
    let mut entries = Vec::new();

    if ctx.allow_pin {
        entries.push(pin_entry(post));
    }

    entries.push(hide_entry(post));

    // Cards with their own bookmark control drop the menu entry.
    if !ctx.flags.value(&BOOKMARK_ON_CARD) {
        entries.push(bookmark_entry(post));
    }

    entries.push(downvote_entry(post));
    entries.push(source_entry(post, ctx.settings));

    for tag in &post.tags {
        if tag.0.is_empty() {
            continue;
        }
        entries.push(tag_entry(ctx.settings, tag));
    }

    entries
}

fn pin_entry(post: &Post) -> MenuEntry {
    let pinned = post.pinned_at.is_some();
    let next = if pinned { None } else { Some(Utc::now()) };
    MenuEntry {
        label: if pinned {
            "Unpin from top".to_string()
        } else {
            "Pin to top".to_string()
        },
        action: Action {
            kind: ActionKind::PinPost,
            target: TargetId::Post(post.id.clone()),
            previous: ActionState::Pinned(post.pinned_at),
            next: ActionState::Pinned(next),
            reversible: false,
            message: if pinned {
                "Your post has been unpinned".to_string()
            } else {
                "📌 Your post has been pinned".to_string()
            },
        },
    }
}

fn hide_entry(post: &Post) -> MenuEntry {
    MenuEntry {
        label: "Hide".to_string(),
        action: Action {
            kind: ActionKind::HidePost,
            target: TargetId::Post(post.id.clone()),
            previous: ActionState::Flag(post.hidden),
            next: ActionState::Flag(true),
            reversible: true,
            message: "🙈 This post won't show up on your feed anymore".to_string(),
        },
    }
}

fn bookmark_entry(post: &Post) -> MenuEntry {
    MenuEntry {
        label: if post.bookmarked {
            "Remove from bookmarks".to_string()
        } else {
            "Save to bookmarks".to_string()
        },
        action: Action {
            kind: ActionKind::ToggleBookmark,
            target: TargetId::Post(post.id.clone()),
            previous: ActionState::Flag(post.bookmarked),
            next: ActionState::Flag(!post.bookmarked),
            reversible: false,
            message: if post.bookmarked {
                "Post was removed from your bookmarks".to_string()
            } else {
                "Post was added to your bookmarks".to_string()
            },
        },
    }
}

fn downvote_entry(post: &Post) -> MenuEntry {
    let downvoted = post.vote == UserVote::Down;
    MenuEntry {
        label: if downvoted {
            "Remove downvote".to_string()
        } else {
            "Downvote".to_string()
        },
        action: Action {
            kind: ActionKind::ToggleDownvote,
            target: TargetId::Post(post.id.clone()),
            previous: ActionState::Flag(downvoted),
            next: ActionState::Flag(!downvoted),
            reversible: false,
            message: if downvoted {
                "Downvote removed".to_string()
            } else {
                "Post downvoted".to_string()
            },
        },
    }
}

fn source_entry(post: &Post, settings: &FeedSettings) -> MenuEntry {
    let blocked = settings.is_source_blocked(&post.source.id);
    MenuEntry {
        label: if blocked {
            format!("Show posts from {}", post.source.name)
        } else {
            format!("Don't show posts from {}", post.source.name)
        },
        action: Action {
            kind: ActionKind::BlockSource,
            target: TargetId::Source(post.source.id.clone()),
            previous: ActionState::Flag(blocked),
            next: ActionState::Flag(!blocked),
            reversible: !blocked,
            message: if blocked {
                format!("{} unblocked", post.source.name)
            } else {
                format!("🚫 {} blocked", post.source.name)
            },
        },
    }
}

fn tag_entry(settings: &FeedSettings, tag: &shared::domain::TagId) -> MenuEntry {
    let blocked = settings.is_tag_blocked(tag);
    MenuEntry {
        label: if blocked {
            format!("Follow #{tag}")
        } else {
            format!("Not interested in #{tag}")
        },
        action: Action {
            kind: ActionKind::BlockTag,
            target: TargetId::Tag(tag.clone()),
            previous: ActionState::Flag(blocked),
            next: ActionState::Flag(!blocked),
            reversible: !blocked,
            message: if blocked {
                format!("#{tag} unblocked")
            } else {
                format!("⛔️ #{tag} blocked")
            },
        },
    }
}

#[cfg(test)]
#[path = "tests/menu_tests.rs"]
mod tests;
