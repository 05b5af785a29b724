use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(PostId);
id_newtype!(SourceId);
id_newtype!(TagId);

/// Entity an action applies to. Keys the pending set together with
/// [`ActionKind`], so distinct kinds on one entity never block each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetId {
    Post(PostId),
    Source(SourceId),
    Tag(TagId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ToggleBookmark,
    BlockSource,
    BlockTag,
    HidePost,
    PinPost,
    ToggleDownvote,
}

/// Optimistic value emitted to the view. Boolean toggles cover bookmarks,
/// blocks, hides and votes; pinning carries its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionState {
    Flag(bool),
    Pinned(Option<DateTime<Utc>>),
}

/// One optimistic operation: the snapshot needed to reverse it, the value to
/// apply immediately, and the confirmation toast text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub target: TargetId,
    pub previous: ActionState,
    pub next: ActionState,
    pub reversible: bool,
    pub message: String,
}

impl Action {
    /// Compensating payload: same kind and target, states swapped.
    pub fn inverse(&self) -> Action {
        Action {
            kind: self.kind,
            target: self.target.clone(),
            previous: self.next.clone(),
            next: self.previous.clone(),
            reversible: self.reversible,
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub id: SourceId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserVote {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub source: SourceSummary,
    pub tags: Vec<TagId>,
    pub bookmarked: bool,
    pub hidden: bool,
    pub pinned_at: Option<DateTime<Utc>>,
    pub vote: UserVote,
}

/// Per-user feed preferences relevant to menu assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeedSettings {
    pub blocked_tags: Vec<TagId>,
    pub excluded_sources: Vec<SourceId>,
}

impl FeedSettings {
    pub fn is_source_blocked(&self, source: &SourceId) -> bool {
        self.excluded_sources.iter().any(|s| s == source)
    }

    pub fn is_tag_blocked(&self, tag: &TagId) -> bool {
        self.blocked_tags.iter().any(|t| t == tag)
    }
}
