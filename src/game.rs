//! Falling-blocks game loop
//!
//! `GameLoop` is the single owner of a session: simulation state, held keys,
//! the frame subscription and the player label. The platform layer feeds it
//! key events and animation-frame timestamps and draws what it returns.
//!
//! Frame lifecycle: while Running, exactly one animation frame is pending.
//! A collision drops the subscription until `start`/`restart`. A page hide
//! drops it but keeps the run, and `resume` picks the run back up.

use crate::consts::GAME_ID;
use crate::platform::{FrameClock, Intent, KeyBindings, KeyState};
use crate::renderer::{DrawCommand, build_frame};
use crate::reporter::ScoreReport;
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState};
use crate::tuning::TuningError;

/// Output of one animation frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub events: Vec<GameEvent>,
}

pub struct GameLoop {
    state: GameState,
    keys: KeyState,
    bindings: KeyBindings,
    clock: FrameClock,
    player_label: String,
    pending_report: Option<ScoreReport>,
}

impl GameLoop {
    pub fn new(seed: u64, settings: &Settings) -> Result<Self, TuningError> {
        let state = GameState::new(seed, settings.tuning.clone())?;
        let mut game = Self::from_state(state, settings.key_bindings.clone());
        game.set_player_label(&settings.nickname);
        Ok(game)
    }

    /// Wrap an existing state
    pub fn from_state(state: GameState, bindings: KeyBindings) -> Self {
        Self {
            state,
            keys: KeyState::default(),
            bindings,
            clock: FrameClock::new(),
            player_label: String::new(),
            pending_report: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn player_label(&self) -> &str {
        &self.player_label
    }

    /// Identity used for the score report when the next run ends
    pub fn set_player_label(&mut self, label: &str) {
        self.player_label = label.to_string();
    }

    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        self.keys.key_down(key, &self.bindings)
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key, &self.bindings);
    }

    pub fn release_keys(&mut self) {
        self.keys.release_all();
    }

    /// Ready -> Running
    pub fn start(&mut self) -> bool {
        let started = sim::start(&mut self.state);
        if started {
            self.on_run_started();
        }
        started
    }

    /// GameOver -> Running
    pub fn restart(&mut self) -> bool {
        let restarted = sim::restart(&mut self.state);
        if restarted {
            self.on_run_started();
        }
        restarted
    }

    /// Start or restart, whichever the phase allows
    pub fn confirm(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Ready => self.start(),
            GamePhase::GameOver => self.restart(),
            GamePhase::Running => false,
        }
    }

    fn on_run_started(&mut self) {
        self.pending_report = None;
        self.clock.unsubscribe();
        log::info!(
            "Run started: fall speed {:.2}, spawn interval {}ms",
            self.state.difficulty.fall_speed,
            self.state.difficulty.spawn_interval_ms
        );
    }

    /// True when the caller should request an animation frame
    pub fn needs_frame(&self) -> bool {
        self.state.phase == GamePhase::Running && !self.clock.is_subscribed()
    }

    /// Record the handle of a requested animation frame
    pub fn frame_requested(&mut self, handle: i32) {
        self.clock.subscribe(handle);
    }

    /// Drop the frame subscription (navigation, page hide, teardown).
    /// Returns the handle to cancel, if one was pending.
    pub fn suspend(&mut self) -> Option<i32> {
        self.release_keys();
        self.clock.unsubscribe()
    }

    /// The page is visible again after `suspend`.
    /// Returns true when the caller should request a frame.
    pub fn resume(&mut self) -> bool {
        let resumed = self.needs_frame();
        if resumed {
            log::info!("Resuming run at score {}", self.state.score);
        }
        resumed
    }

    /// Run one tick for an animation frame fired at `now_ms`
    pub fn on_frame(&mut self, now_ms: f64) -> Frame {
        let dt = self.clock.fired(now_ms);
        let was_running = self.state.phase == GamePhase::Running;
        let input = self.keys.sample();
        let events = sim::tick(&mut self.state, &input, dt);

        if was_running && self.state.phase == GamePhase::GameOver {
            self.on_game_over();
        }

        Frame {
            commands: build_frame(&self.state),
            events,
        }
    }

    fn on_game_over(&mut self) {
        self.clock.unsubscribe();
        let score = self.state.score;
        self.pending_report = ScoreReport::for_final_score(GAME_ID, &self.player_label, score);
        match &self.pending_report {
            Some(report) => log::info!("Game over: {} scored {}", report.nickname, score),
            None => log::info!("Game over: score {} not submitted", score),
        }
    }

    /// The finished run's report; yields it at most once per game over
    pub fn take_report(&mut self) -> Option<ScoreReport> {
        self.pending_report.take()
    }

    /// Draw commands for the current state without advancing it
    pub fn current_frame(&self) -> Vec<DrawCommand> {
        build_frame(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::Obstacle;
    use crate::tuning::Tuning;
    use glam::Vec2;

    /// A running game whose next tick collides, with `score` already banked
    fn doomed_game(score: u32, label: &str) -> GameLoop {
        let mut state = GameState::with_fall_speed(11, Tuning::default(), 3.0).unwrap();
        sim::start(&mut state);
        state.score = score;
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(state.player.pos.x, PLAYER_Y - OBSTACLE_HEIGHT),
            fall_speed: 5.0,
        });
        let mut game = GameLoop::from_state(state, KeyBindings::default());
        game.set_player_label(label);
        game
    }

    #[test]
    fn test_ready_needs_no_frame() {
        let game = GameLoop::new(1, &Settings::default()).unwrap();
        assert_eq!(game.phase(), GamePhase::Ready);
        assert!(!game.needs_frame());
    }

    #[test]
    fn test_frame_subscription_follows_phase() {
        let mut game = GameLoop::new(1, &Settings::default()).unwrap();
        assert!(game.confirm());
        assert!(game.needs_frame());

        game.frame_requested(1);
        assert!(!game.needs_frame());

        game.on_frame(0.0);
        assert!(game.needs_frame());
        game.frame_requested(2);

        // Page hidden: the pending frame is handed back for cancellation
        assert_eq!(game.suspend(), Some(2));
        assert!(game.needs_frame());
    }

    #[test]
    fn test_resume_after_suspend_continues_run() {
        let mut game = GameLoop::new(1, &Settings::default()).unwrap();
        assert!(game.confirm());
        game.frame_requested(1);
        game.on_frame(0.0);
        game.frame_requested(2);
        let ticks = game.state().time_ticks;

        assert_eq!(game.suspend(), Some(2));
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(!game.confirm());

        assert!(game.resume());
        game.frame_requested(3);
        assert!(!game.resume());

        // Long gap while hidden counts as one nominal frame
        game.on_frame(60_000.0);
        assert_eq!(game.state().time_ticks, ticks + 1);
        assert_eq!(game.state().spawn_timer_ms, 2.0 * NOMINAL_FRAME_MS);
        assert!(game.needs_frame());
    }

    #[test]
    fn test_resume_outside_running_is_noop() {
        let mut game = GameLoop::new(1, &Settings::default()).unwrap();
        assert!(!game.resume());

        let mut game = doomed_game(3, "hana");
        game.on_frame(0.0);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.suspend(), None);
        assert!(!game.resume());
    }

    #[test]
    fn test_game_over_reports_once() {
        let mut game = doomed_game(12, "hana");
        game.frame_requested(7);
        let frame = game.on_frame(100.0);

        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(frame.events.iter().any(|e| matches!(e, GameEvent::Collision { .. })));
        assert!(!game.needs_frame());

        let report = game.take_report().unwrap();
        assert_eq!(report.game, "FallingBlocks");
        assert_eq!(report.nickname, "hana");
        assert_eq!(report.score, 12);
        assert!(game.take_report().is_none());

        // Stale frames after game over change nothing
        game.on_frame(200.0);
        assert!(game.take_report().is_none());
        assert_eq!(game.score(), 12);
    }

    #[test]
    fn test_no_report_without_label_or_score() {
        let mut game = doomed_game(12, "");
        game.on_frame(0.0);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.take_report().is_none());

        let mut game = doomed_game(0, "hana");
        game.on_frame(0.0);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.take_report().is_none());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = doomed_game(12, "hana");
        game.on_frame(0.0);
        assert!(!game.start());
        assert!(game.confirm());

        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.score(), 0);
        assert!(game.state().obstacles.is_empty());
        assert!(game.take_report().is_none());
        assert!(game.needs_frame());
    }

    #[test]
    fn test_keys_steer_player() {
        let mut game = GameLoop::new(3, &Settings::default()).unwrap();
        game.start();
        assert_eq!(game.key_down("ArrowRight"), Some(Intent::MoveRight));
        game.on_frame(0.0);
        assert_eq!(game.state().player.pos.x, 186.0);

        game.key_up("ArrowRight");
        game.on_frame(16.0);
        assert_eq!(game.state().player.pos.x, 186.0);
    }

    #[test]
    fn test_frame_commands_track_state() {
        let mut game = GameLoop::new(3, &Settings::default()).unwrap();
        game.start();
        let frame = game.on_frame(0.0);
        assert_eq!(frame.commands, game.current_frame());
        assert_eq!(frame.commands.len(), 2 + game.state().obstacles.len());
    }

    #[test]
    fn test_label_from_settings() {
        let mut settings = Settings::default();
        settings.set_nickname(" joon ");
        let game = GameLoop::new(3, &settings).unwrap();
        assert_eq!(game.player_label(), "joon");
    }
}
