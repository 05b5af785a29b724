//! Wire payloads exchanged with the feed API by gateway implementations.
//! The controller itself never sees these shapes; it speaks [`Action`] and
//! [`ActionOutcome`] only.

use serde::{Deserialize, Serialize};

use crate::domain::{Action, ActionKind, ActionState, TargetId};

/// Body posted to the feed API when applying a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub target: TargetId,
    pub state: ActionState,
}

impl From<&Action> for ActionRequest {
    fn from(action: &Action) -> Self {
        Self {
            kind: action.kind,
            target: action.target.clone(),
            state: action.next.clone(),
        }
    }
}

/// Optional body returned by the feed API on success. When `canonical` is
/// present and differs from the optimistic value, the server's value wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<ActionState>,
}

/// Settlement result handed back to the controller by a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub canonical: Option<ActionState>,
}

impl From<ActionResponse> for ActionOutcome {
    fn from(response: ActionResponse) -> Self {
        Self {
            canonical: response.canonical,
        }
    }
}
