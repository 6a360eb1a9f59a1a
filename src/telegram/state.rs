//! Dialogue states of the conversational flows
//!
//! One dialogue per chat, kept in `InMemStorage`. Each state variant carries
//! exactly the ids the next step needs, so a confirm step can never run with
//! half-filled data.

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::Dialogue;

#[derive(Clone, Debug, Default)]
pub enum State {
    /// No flow in progress
    #[default]
    Idle,

    // Admin promotion
    AwaitAdminUsername,

    // Event creation
    AwaitEventTitle,

    // Team creation
    AddTeamSelectEvent,
    AwaitTeamName {
        event_id: i64,
    },

    // Scoring wizard
    ScoreSelectEvent,
    ScoreSelectTeam {
        event_id: i64,
    },
    ScoreSelectCategory {
        team_id: i64,
    },
    ScoreSelectPoints {
        team_id: i64,
        category: String,
    },
    ScoreConfirm {
        team_id: i64,
        category: String,
        points: i64,
    },

    // Score adjustment flow
    AdjustSelectEvent,
    AdjustSelectTeam,
    AdjustPickCategory {
        team_id: i64,
    },
    AdjustAwaitAmount {
        team_id: i64,
        category: String,
    },
}

pub type BotDialogue = Dialogue<State, InMemStorage<State>>;
