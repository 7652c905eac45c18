//! Final-score submission
//!
//! A finished run produces at most one `ScoreReport`. Submitting it is
//! fire-and-forget: failures are logged and never retried.

use crate::leaderboard::ScoreService;

/// A finished run's score, ready for the score API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub game: String,
    pub nickname: String,
    pub score: u64,
}

impl ScoreReport {
    /// Build a report if the run is worth submitting: the player gave a
    /// non-blank label and scored at least one point
    pub fn for_final_score(game: &str, player_label: &str, score: u32) -> Option<Self> {
        let nickname = player_label.trim();
        if nickname.is_empty() || score == 0 {
            return None;
        }
        Some(Self {
            game: game.to_string(),
            nickname: nickname.to_string(),
            score: score as u64,
        })
    }
}

/// Send a report once. Returns whether the API accepted it.
pub async fn submit<S: ScoreService>(service: &S, report: ScoreReport) -> bool {
    match service
        .save_score(&report.game, &report.nickname, report.score)
        .await
    {
        Ok(()) => {
            log::info!(
                "Saved {} score {} for {}",
                report.game,
                report.score,
                report.nickname
            );
            true
        }
        Err(e) => {
            log::warn!("Failed to save {} score: {}", report.game, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{GameKind, InMemoryScoreService};

    #[test]
    fn test_report_requires_label_and_score() {
        assert!(ScoreReport::for_final_score("FallingBlocks", "", 12).is_none());
        assert!(ScoreReport::for_final_score("FallingBlocks", "   ", 12).is_none());
        assert!(ScoreReport::for_final_score("FallingBlocks", "hana", 0).is_none());

        let report = ScoreReport::for_final_score("FallingBlocks", " hana ", 12).unwrap();
        assert_eq!(report.nickname, "hana");
        assert_eq!(report.score, 12);
    }

    #[test]
    fn test_submit_saves() {
        let service = InMemoryScoreService::new();
        let report = ScoreReport::for_final_score("FallingBlocks", "hana", 7).unwrap();
        assert!(pollster::block_on(submit(&service, report)));

        let rankings = pollster::block_on(service.fetch_all()).unwrap();
        let entries = rankings.entries(GameKind::FallingBlocks);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].nickname, "hana");
        assert_eq!(entries[0].score, 7);
    }

    #[test]
    fn test_submit_failure_is_swallowed() {
        let service = InMemoryScoreService::new();
        service.set_offline(true);
        let report = ScoreReport::for_final_score("FallingBlocks", "hana", 7).unwrap();
        assert!(!pollster::block_on(submit(&service, report)));
        // One attempt, no retry
        assert_eq!(service.save_calls(), 1);
    }
}
