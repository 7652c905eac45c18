//! Shared leaderboard
//!
//! Scores for every mini-game live in a remote score API. This module holds
//! the wire model, the ranking/filter queries the leaderboard screen needs, and
//! the `ScoreService` seam the rest of the crate talks to.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod http;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryScoreService;

/// Longest nickname accepted by the nickname field
pub const MAX_NICKNAME_LEN: usize = 15;

/// Number of entries highlighted as a podium
pub const PODIUM_SIZE: usize = 3;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("network error: {0}")]
    Network(String),

    #[error("score API returned status {0}")]
    Status(u16),

    #[error("malformed score API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid nickname: {0}")]
    InvalidNickname(String),

    #[error("score entry not found: {0}")]
    NotFound(String),
}

/// Mini-games that have a leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameKind {
    AbsolutePitch,
    ReactionSpeed,
    MoleCatch,
    FallingBlocks,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::AbsolutePitch,
        GameKind::ReactionSpeed,
        GameKind::MoleCatch,
        GameKind::FallingBlocks,
    ];

    /// Identifier used by the score API
    pub fn id(&self) -> &'static str {
        match self {
            GameKind::AbsolutePitch => "AbsolutePitch",
            GameKind::ReactionSpeed => "ReactionSpeed",
            GameKind::MoleCatch => "MoleCatch",
            GameKind::FallingBlocks => "FallingBlocks",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::AbsolutePitch => "Absolute Pitch Test",
            GameKind::ReactionSpeed => "Reaction Speed Test",
            GameKind::MoleCatch => "Whack-a-Mole",
            GameKind::FallingBlocks => "Falling Blocks",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }
}

/// One stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: String,
    pub game_name: String,
    pub nickname: String,
    pub score: u64,
}

/// All scores, keyed by game identifier, each list in server rank order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rankings {
    games: BTreeMap<String, Vec<ScoreEntry>>,
}

/// An entry with its rank in the unfiltered list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry<'a> {
    /// 1-based
    pub rank: usize,
    pub entry: &'a ScoreEntry,
}

impl RankedEntry<'_> {
    pub fn is_podium(&self) -> bool {
        self.rank <= PODIUM_SIZE
    }
}

impl Rankings {
    pub fn from_map(games: BTreeMap<String, Vec<ScoreEntry>>) -> Self {
        Self { games }
    }

    /// Parse the score API's `{ gameName: [entry, ...] }` payload
    pub fn from_json(json: &str) -> Result<Self, LeaderboardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Entries for a game, empty if the API had none
    pub fn entries(&self, game: GameKind) -> &[ScoreEntry] {
        self.games.get(game.id()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<&ScoreEntry> {
        self.games.values().flatten().find(|e| e.id == id)
    }

    /// Entries whose nickname equals `filter` (trimmed, case-insensitive).
    /// An empty filter keeps everything. Ranks stay those of the full list.
    pub fn filtered(&self, game: GameKind, filter: &str) -> Vec<RankedEntry<'_>> {
        let wanted = normalize_filter(filter);
        self.entries(game)
            .iter()
            .enumerate()
            .filter(|(_, e)| wanted.is_empty() || e.nickname.to_lowercase() == wanted)
            .map(|(i, entry)| RankedEntry { rank: i + 1, entry })
            .collect()
    }
}

/// What one game's card on the leaderboard screen shows
#[derive(Debug, Clone, PartialEq)]
pub enum SectionRows<'a> {
    /// The game has no stored scores at all
    NoScores,
    /// Scores exist but none match the nickname filter
    NoMatch,
    Rows(Vec<RankedEntry<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSection<'a> {
    pub game: GameKind,
    pub rows: SectionRows<'a>,
}

impl Rankings {
    /// One section per game in `GameKind::ALL` order, filtered by nickname
    pub fn sections(&self, filter: &str) -> Vec<GameSection<'_>> {
        GameKind::ALL
            .into_iter()
            .map(|game| {
                let rows = if self.entries(game).is_empty() {
                    SectionRows::NoScores
                } else {
                    match self.filtered(game, filter) {
                        ranked if ranked.is_empty() => SectionRows::NoMatch,
                        ranked => SectionRows::Rows(ranked),
                    }
                };
                GameSection { game, rows }
            })
            .collect()
    }
}

/// Canonical form of a nickname filter
pub fn normalize_filter(filter: &str) -> String {
    filter.trim().to_lowercase()
}

/// Trim and check a nickname before it is stored
pub fn validate_nickname(raw: &str) -> Result<String, LeaderboardError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LeaderboardError::InvalidNickname(
            "nickname must not be empty".to_string(),
        ));
    }
    let len = name.chars().count();
    if len > MAX_NICKNAME_LEN {
        return Err(LeaderboardError::InvalidNickname(format!(
            "nickname is {} characters, limit is {}",
            len, MAX_NICKNAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Remote score storage
#[allow(async_fn_in_trait)]
pub trait ScoreService {
    async fn fetch_all(&self) -> Result<Rankings, LeaderboardError>;

    async fn delete_score(&self, id: &str) -> Result<(), LeaderboardError>;

    /// Rename the player on an existing entry
    async fn update_nickname(
        &self,
        entry: &ScoreEntry,
        nickname: &str,
    ) -> Result<(), LeaderboardError>;

    async fn save_score(
        &self,
        game: &str,
        nickname: &str,
        score: u64,
    ) -> Result<(), LeaderboardError>;
}
