use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feed_core::{
    menu::{post_options, MenuContext},
    ActionController, ControllerEvent, HttpActionGateway,
};
use shared::domain::{
    Action, ActionKind, ActionState, FeedSettings, Post, PostId, SourceId, TagId, TargetId,
};
use tracing::info;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Cli {
    /// Feed API base URL; overrides feedctl.toml and FEED_API_URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Undo the action this long after dispatching it.
    #[arg(long)]
    undo_after_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Bookmark {
        post_id: String,
        #[arg(long)]
        remove: bool,
    },
    Hide {
        post_id: String,
    },
    Pin {
        post_id: String,
        #[arg(long)]
        unpin: bool,
    },
    Downvote {
        post_id: String,
        #[arg(long)]
        remove: bool,
    },
    BlockSource {
        source_id: String,
        #[arg(long)]
        unblock: bool,
    },
    BlockTag {
        tag: String,
        #[arg(long)]
        unblock: bool,
    },
    /// Print the options menu for a post described by a JSON file.
    Menu {
        post_file: PathBuf,
        #[arg(long)]
        allow_pin: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }

    let action = match &cli.command {
        Command::Menu {
            post_file,
            allow_pin,
        } => {
            let raw = std::fs::read_to_string(post_file)
                .with_context(|| format!("reading {}", post_file.display()))?;
            let post: Post = serde_json::from_str(&raw).context("parsing post JSON")?;
            let feed_settings = FeedSettings::default();
            let entries = post_options(
                &post,
                &MenuContext {
                    settings: &feed_settings,
                    flags: &settings.flags,
                    allow_pin: *allow_pin,
                },
            );
            for entry in entries {
                println!("{:<30} {:?} on {:?}", entry.label, entry.action.kind, entry.action.target);
            }
            return Ok(());
        }
        other => build_action(other),
    };

    info!(url = %settings.api_base_url, "dispatching against feed api");
    let gateway = HttpActionGateway::new(&settings.api_base_url)?;
    let controller = ActionController::new_with_undo_window(
        Arc::new(gateway),
        Duration::from_secs(settings.undo_window_secs),
    );
    let mut events = controller.subscribe_events();

    let target = action.target.clone();
    let kind = action.kind;
    controller.dispatch(action).await?;

    if let Some(delay_ms) = cli.undo_after_ms {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        controller.undo(&target, kind).await?;
    }

    // Print events until the cycle settles and the feed goes quiet.
    loop {
        match tokio::time::timeout(Duration::from_millis(250), events.recv()).await {
            Ok(Ok(event)) => print_event(&event),
            Ok(Err(_)) => break,
            Err(_) => {
                if !controller.is_pending(&target, kind).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn build_action(command: &Command) -> Action {
    match command {
        Command::Bookmark { post_id, remove } => Action {
            kind: ActionKind::ToggleBookmark,
            target: TargetId::Post(PostId::new(post_id.clone())),
            previous: ActionState::Flag(*remove),
            next: ActionState::Flag(!remove),
            reversible: false,
            message: if *remove {
                "Post was removed from your bookmarks".to_string()
            } else {
                "Post was added to your bookmarks".to_string()
            },
        },
        Command::Hide { post_id } => Action {
            kind: ActionKind::HidePost,
            target: TargetId::Post(PostId::new(post_id.clone())),
            previous: ActionState::Flag(false),
            next: ActionState::Flag(true),
            reversible: true,
            message: "🙈 This post won't show up on your feed anymore".to_string(),
        },
        Command::Pin { post_id, unpin } => Action {
            kind: ActionKind::PinPost,
            target: TargetId::Post(PostId::new(post_id.clone())),
            previous: ActionState::Pinned(if *unpin {
                Some(chrono::Utc::now())
            } else {
                None
            }),
            next: ActionState::Pinned(if *unpin { None } else { Some(chrono::Utc::now()) }),
            reversible: false,
            message: if *unpin {
                "Your post has been unpinned".to_string()
            } else {
                "📌 Your post has been pinned".to_string()
            },
        },
        Command::Downvote { post_id, remove } => Action {
            kind: ActionKind::ToggleDownvote,
            target: TargetId::Post(PostId::new(post_id.clone())),
            previous: ActionState::Flag(*remove),
            next: ActionState::Flag(!remove),
            reversible: false,
            message: if *remove {
                "Downvote removed".to_string()
            } else {
                "Post downvoted".to_string()
            },
        },
        Command::BlockSource { source_id, unblock } => Action {
            kind: ActionKind::BlockSource,
            target: TargetId::Source(SourceId::new(source_id.clone())),
            previous: ActionState::Flag(*unblock),
            next: ActionState::Flag(!unblock),
            reversible: !unblock,
            message: if *unblock {
                format!("{source_id} unblocked")
            } else {
                format!("🚫 {source_id} blocked")
            },
        },
        Command::BlockTag { tag, unblock } => Action {
            kind: ActionKind::BlockTag,
            target: TargetId::Tag(TagId::new(tag.clone())),
            previous: ActionState::Flag(*unblock),
            next: ActionState::Flag(!unblock),
            reversible: !unblock,
            message: if *unblock {
                format!("#{tag} unblocked")
            } else {
                format!("⛔️ #{tag} blocked")
            },
        },
        Command::Menu { .. } => unreachable!("handled before dispatch"),
    }
}

fn print_event(event: &ControllerEvent) {
    match event {
        ControllerEvent::StateChanged {
            target,
            kind,
            state,
        } => println!("state {kind:?} {target:?} -> {state:?}"),
        ControllerEvent::NotificationChanged(Some(record)) => {
            let undo = if record.undo.is_some() { " [undo]" } else { "" };
            println!("toast: {}{undo}", record.message);
        }
        ControllerEvent::NotificationChanged(None) => println!("toast dismissed"),
        ControllerEvent::ActionFailed {
            target,
            kind,
            reason,
        } => println!("failed {kind:?} {target:?}: {reason}"),
    }
}
