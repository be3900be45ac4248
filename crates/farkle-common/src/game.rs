use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::dice::{DieSource, NUM_DICE};
use crate::player::{Player, PlayerId};
use crate::scoring;

pub const WINNING_SCORE: u32 = 5000;
pub const MAX_PLAYERS: usize = 2;

/// Chat channel a game lives in. One game per channel.
pub type ChannelId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    Waiting,
    Playing,
}

/// How a game ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Won { winner: PlayerId },
    Quit { quitter: PlayerId },
    TimedOut,
}

/// What a transition did, for the host to announce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnEvent {
    Opened {
        host: PlayerId,
    },
    Joined {
        player: PlayerId,
    },
    Rolled {
        player: PlayerId,
        dice: Vec<u8>,
        hot_dice: bool,
    },
    Farkled {
        player: PlayerId,
        /// The roll or selection that scored nothing.
        dice: Vec<u8>,
        forfeited: u32,
        next: PlayerId,
    },
    Selected {
        player: PlayerId,
        value: u8,
        turn_score: u32,
    },
    SelectionReset {
        player: PlayerId,
    },
    Banked {
        player: PlayerId,
        points: u32,
        total: u32,
        next: PlayerId,
    },
    Won {
        player: PlayerId,
        points: u32,
        total: u32,
    },
    Quit {
        player: PlayerId,
    },
    TimedOut,
}

// -- Game State Machine --

#[derive(Debug, Clone)]
pub struct Game {
    pub channel_id: ChannelId,
    /// Index 0 is the host.
    pub players: Vec<Player>,
    pub current_turn: usize,
    /// Dice still on the table this turn.
    pub roll: Vec<u8>,
    /// Dice set aside this sub-turn, not yet locked in.
    pub selection: Vec<u8>,
    pub turn_score: u32,
    pub accumulated_score: u32,
    pub status: GameStatus,
    pub last_activity: Instant,
    pub outcome: Option<Outcome>,
}

impl Game {
    pub fn new(channel_id: impl Into<ChannelId>, host: Player, now: Instant) -> Self {
        Self {
            channel_id: channel_id.into(),
            players: vec![host],
            current_turn: 0,
            roll: Vec::new(),
            selection: Vec::new(),
            turn_score: 0,
            accumulated_score: 0,
            status: GameStatus::Waiting,
            last_activity: now,
            outcome: None,
        }
    }

    pub fn host(&self) -> &Player {
        &self.players[0]
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn]
    }

    pub fn is_current_player(&self, player_id: &str) -> bool {
        self.current_player().id == player_id
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Points lost on a farkle or won on a bank right now.
    pub fn at_stake(&self) -> u32 {
        self.turn_score + self.accumulated_score
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn join(&mut self, player: Player, now: Instant) -> Result<TurnEvent, GameError> {
        self.ensure_live()?;
        if self.status != GameStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.has_player(&player.id) {
            return Err(GameError::AlreadyInGame);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }

        tracing::info!(
            "'{}' joined '{}' in channel {}",
            player.name,
            self.host().name,
            self.channel_id
        );
        let id = player.id.clone();
        self.players.push(player);
        if self.players.len() == MAX_PLAYERS {
            self.status = GameStatus::Playing;
            self.current_turn = 0;
        }
        self.touch(now);
        Ok(TurnEvent::Joined { player: id })
    }

    /// Rolls six fresh dice at the start of a turn, otherwise locks in the
    /// selection and rolls whatever is left on the table.
    pub fn roll(
        &mut self,
        player_id: &str,
        dice: &mut impl DieSource,
        now: Instant,
    ) -> Result<TurnEvent, GameError> {
        self.ensure_turn(player_id)?;

        if self.is_turn_start() {
            let rolled = dice.roll(NUM_DICE);
            self.touch(now);
            return Ok(self.resolve_roll(rolled, false));
        }

        if self.selection.is_empty() {
            return Err(GameError::MustSelectScoringDice);
        }

        let valid = scoring::extract_valid(&self.selection);
        assert!(
            valid.len() <= self.selection.len(),
            "validator kept {} dice out of a selection of {}",
            valid.len(),
            self.selection.len()
        );

        if valid.is_empty() {
            self.touch(now);
            let dead = std::mem::take(&mut self.selection);
            return Ok(self.bust(dead));
        }
        if valid.len() < self.selection.len() {
            return Err(GameError::InvalidSelection);
        }

        self.accumulated_score += valid.score;
        self.turn_score = 0;
        self.selection.clear();

        let hot_dice = self.roll.is_empty();
        let count = if hot_dice { NUM_DICE } else { self.roll.len() };
        let rolled = dice.roll(count);
        self.touch(now);
        Ok(self.resolve_roll(rolled, hot_dice))
    }

    /// Moves `roll[index]` into the selection.
    ///
    /// # Panics
    /// Panics if `index` is not a position in the current roll. Hosts check
    /// with [`Game::has_die`] first.
    pub fn select_die(
        &mut self,
        player_id: &str,
        index: usize,
        now: Instant,
    ) -> Result<TurnEvent, GameError> {
        self.ensure_turn(player_id)?;
        assert!(
            self.has_die(index),
            "die index {} out of range for a roll of {}",
            index,
            self.roll.len()
        );

        let value = self.roll.remove(index);
        self.selection.push(value);
        self.turn_score = scoring::score(&self.selection);
        self.touch(now);
        Ok(TurnEvent::Selected {
            player: player_id.to_string(),
            value,
            turn_score: self.turn_score,
        })
    }

    pub fn has_die(&self, index: usize) -> bool {
        index < self.roll.len()
    }

    pub fn reset_selection(&mut self, player_id: &str, now: Instant) -> Result<TurnEvent, GameError> {
        self.ensure_turn(player_id)?;
        self.roll.append(&mut self.selection);
        self.turn_score = 0;
        self.touch(now);
        Ok(TurnEvent::SelectionReset {
            player: player_id.to_string(),
        })
    }

    pub fn bank(&mut self, player_id: &str, now: Instant) -> Result<TurnEvent, GameError> {
        self.ensure_turn(player_id)?;
        let points = self.at_stake();
        if points == 0 {
            return Err(GameError::NothingToBank);
        }

        self.touch(now);
        let player = self.current_player().id.clone();
        let total = self.players[self.current_turn].bank(points);
        self.clear_turn();

        if total >= WINNING_SCORE {
            tracing::info!(
                "'{}' wins in channel {} with {} points",
                self.current_player().name,
                self.channel_id,
                total
            );
            self.outcome = Some(Outcome::Won {
                winner: player.clone(),
            });
            return Ok(TurnEvent::Won {
                player,
                points,
                total,
            });
        }

        tracing::debug!("{} banked {} ({} total)", player, points, total);
        self.advance_turn();
        Ok(TurnEvent::Banked {
            player,
            points,
            total,
            next: self.current_player().id.clone(),
        })
    }

    /// Ends the game. Only the player whose turn it is (the host while
    /// waiting) may quit.
    pub fn quit(&mut self, player_id: &str, now: Instant) -> Result<TurnEvent, GameError> {
        self.ensure_live()?;
        if !self.is_current_player(player_id) {
            return Err(GameError::NotYourTurn);
        }

        tracing::info!("{} quit the game in channel {}", player_id, self.channel_id);
        self.touch(now);
        self.outcome = Some(Outcome::Quit {
            quitter: player_id.to_string(),
        });
        Ok(TurnEvent::Quit {
            player: player_id.to_string(),
        })
    }

    pub fn time_out(&mut self) -> TurnEvent {
        if self.outcome.is_none() {
            tracing::info!("Game in channel {} timed out", self.channel_id);
            self.outcome = Some(Outcome::TimedOut);
        }
        TurnEvent::TimedOut
    }

    fn is_turn_start(&self) -> bool {
        self.roll.is_empty() && self.selection.is_empty() && self.accumulated_score == 0
    }

    /// Puts a fresh roll on the table, or busts the player if nothing in it scores.
    fn resolve_roll(&mut self, rolled: Vec<u8>, hot_dice: bool) -> TurnEvent {
        if !scoring::has_any_score(&rolled) {
            return self.bust(rolled);
        }

        let player = self.current_player().id.clone();
        tracing::debug!("{} rolled {:?} in channel {}", player, rolled, self.channel_id);
        self.roll = rolled.clone();
        TurnEvent::Rolled {
            player,
            dice: rolled,
            hot_dice,
        }
    }

    fn bust(&mut self, dice: Vec<u8>) -> TurnEvent {
        let player = self.current_player().id.clone();
        let forfeited = self.at_stake();
        tracing::debug!(
            "{} farkled on {:?}, forfeiting {} in channel {}",
            player,
            dice,
            forfeited,
            self.channel_id
        );
        self.clear_turn();
        self.advance_turn();
        TurnEvent::Farkled {
            player,
            dice,
            forfeited,
            next: self.current_player().id.clone(),
        }
    }

    fn clear_turn(&mut self) {
        self.roll.clear();
        self.selection.clear();
        self.turn_score = 0;
        self.accumulated_score = 0;
    }

    fn advance_turn(&mut self) {
        self.current_turn = (self.current_turn + 1) % self.players.len();
    }

    fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    fn ensure_live(&self) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameNotFound);
        }
        Ok(())
    }

    fn ensure_turn(&self, player_id: &str) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.status != GameStatus::Playing {
            return Err(GameError::NotStarted);
        }
        if !self.is_current_player(player_id) {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            channel_id: self.channel_id.clone(),
            status: self.status,
            players: self.players.clone(),
            current_turn: match self.status {
                GameStatus::Playing => Some(self.current_turn),
                GameStatus::Waiting => None,
            },
            roll: self.roll.clone(),
            selection: self.selection.clone(),
            turn_score: self.turn_score,
            accumulated_score: self.accumulated_score,
            at_stake: self.at_stake(),
            outcome: self.outcome.clone(),
        }
    }
}

// -- Snapshot (handed to the presentation layer) --

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub channel_id: ChannelId,
    pub status: GameStatus,
    pub players: Vec<Player>,
    pub current_turn: Option<usize>,
    pub roll: Vec<u8>,
    pub selection: Vec<u8>,
    pub turn_score: u32,
    pub accumulated_score: u32,
    pub at_stake: u32,
    pub outcome: Option<Outcome>,
}

impl GameSnapshot {
    pub fn current_player(&self) -> Option<&Player> {
        self.current_turn.and_then(|i| self.players.get(i))
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn winner(&self) -> Option<&Player> {
        match &self.outcome {
            Some(Outcome::Won { winner }) => self.player(winner),
            _ => None,
        }
    }
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no active game")]
    GameNotFound,
    #[error("not your turn")]
    NotYourTurn,
    #[error("game has not started yet")]
    NotStarted,
    #[error("you must select scoring dice before rolling again")]
    MustSelectScoringDice,
    #[error("invalid dice selected, reset to proceed")]
    InvalidSelection,
    #[error("no points to bank")]
    NothingToBank,
    #[error("you're already in this game")]
    AlreadyInGame,
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("game is full")]
    GameFull,
    #[error("there's already an active game in this channel")]
    ChannelBusy,
}

impl GameError {
    /// True for rule rejections, false for a missing game or a wrong turn.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, GameError::GameNotFound | GameError::NotYourTurn)
    }
}
