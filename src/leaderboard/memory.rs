//! In-process score store
//!
//! Backs the native demo and tests. Rankings are ordered by descending score,
//! ties by insertion.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{LeaderboardError, Rankings, ScoreEntry, ScoreService, validate_nickname};

#[derive(Debug, Default)]
pub struct InMemoryScoreService {
    entries: RefCell<Vec<ScoreEntry>>,
    next_id: Cell<u64>,
    offline: Cell<bool>,
    save_calls: Cell<u32>,
}

impl InMemoryScoreService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Number of `save_score` calls received, including failed ones
    pub fn save_calls(&self) -> u32 {
        self.save_calls.get()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_online(&self) -> Result<(), LeaderboardError> {
        if self.offline.get() {
            Err(LeaderboardError::Network("score API unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ScoreService for InMemoryScoreService {
    async fn fetch_all(&self) -> Result<Rankings, LeaderboardError> {
        self.check_online()?;
        let mut games: BTreeMap<String, Vec<ScoreEntry>> = BTreeMap::new();
        for entry in self.entries.borrow().iter() {
            games
                .entry(entry.game_name.clone())
                .or_default()
                .push(entry.clone());
        }
        for list in games.values_mut() {
            list.sort_by(|a, b| b.score.cmp(&a.score));
        }
        Ok(Rankings::from_map(games))
    }

    async fn delete_score(&self, id: &str) -> Result<(), LeaderboardError> {
        self.check_online()?;
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(LeaderboardError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_nickname(
        &self,
        entry: &ScoreEntry,
        nickname: &str,
    ) -> Result<(), LeaderboardError> {
        let nickname = validate_nickname(nickname)?;
        self.check_online()?;
        let mut entries = self.entries.borrow_mut();
        let stored = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| LeaderboardError::NotFound(entry.id.clone()))?;
        stored.nickname = nickname;
        Ok(())
    }

    async fn save_score(
        &self,
        game: &str,
        nickname: &str,
        score: u64,
    ) -> Result<(), LeaderboardError> {
        self.save_calls.set(self.save_calls.get() + 1);
        self.check_online()?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.entries.borrow_mut().push(ScoreEntry {
            id: id.to_string(),
            game_name: game.to_string(),
            nickname: nickname.to_string(),
            score,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::GameKind;

    #[test]
    fn test_save_then_fetch_sorted() {
        let service = InMemoryScoreService::new();
        pollster::block_on(async {
            service.save_score("FallingBlocks", "a", 5).await.unwrap();
            service.save_score("FallingBlocks", "b", 17).await.unwrap();
            service.save_score("MoleCatch", "a", 9).await.unwrap();

            let rankings = service.fetch_all().await.unwrap();
            let scores: Vec<_> = rankings
                .entries(GameKind::FallingBlocks)
                .iter()
                .map(|e| e.score)
                .collect();
            assert_eq!(scores, vec![17, 5]);
            assert_eq!(rankings.entries(GameKind::MoleCatch).len(), 1);
        });
    }

    #[test]
    fn test_delete_and_rename() {
        let service = InMemoryScoreService::new();
        pollster::block_on(async {
            service.save_score("FallingBlocks", "old", 3).await.unwrap();
            let rankings = service.fetch_all().await.unwrap();
            let entry = rankings.entries(GameKind::FallingBlocks)[0].clone();

            assert!(matches!(
                service.update_nickname(&entry, "  ").await,
                Err(LeaderboardError::InvalidNickname(_))
            ));
            service.update_nickname(&entry, " new ").await.unwrap();
            let rankings = service.fetch_all().await.unwrap();
            assert_eq!(rankings.find(&entry.id).unwrap().nickname, "new");

            service.delete_score(&entry.id).await.unwrap();
            assert!(service.is_empty());
            assert!(matches!(
                service.delete_score(&entry.id).await,
                Err(LeaderboardError::NotFound(_))
            ));
        });
    }

    #[test]
    fn test_offline_fails() {
        let service = InMemoryScoreService::new();
        service.set_offline(true);
        pollster::block_on(async {
            assert!(matches!(
                service.save_score("FallingBlocks", "a", 1).await,
                Err(LeaderboardError::Network(_))
            ));
            assert!(service.fetch_all().await.is_err());
        });
        assert_eq!(service.save_calls(), 1);
        assert!(service.is_empty());
    }
}
