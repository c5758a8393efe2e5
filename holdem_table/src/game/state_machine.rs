//! The table state machine.
//!
//! A [`Table`] owns everything about one table: seats, deck, board, pot and
//! the round pointer. All mutation goes through a handful of public entry
//! points, each of which either commits completely or leaves the table
//! exactly as it found it.
//!
//! ## Hand lifecycle
//!
//! ```text
//! PreGame -> PreFlop -> Flop -> Turn -> River -> Showdown -> PreFlop -> ...
//!               |          |       |       |
//!               +----------+-------+-------+--> Showdown (one contender left)
//! ```

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use super::{
    constants::{
        BOARD_SIZE, DEFAULT_BIG_BLIND, DEFAULT_MAX_PLAYERS, DEFAULT_SMALL_BLIND, HOLE_CARDS,
        MIN_PLAYERS,
    },
    entities::{
        Action, Blinds, Card, Chips, Deck, EvaluatedHand, GameId, Player, PlayerStatus, SeatIndex,
        Token,
    },
    errors::GameError,
    functional,
    pot::simple_split_pot,
    views::{PlayerView, PrivateHand, TableSummary, TableView},
};

/// Rules a table is created with. They don't change for the table's lifetime.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub blinds: Blinds,
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            blinds: Blinds {
                small: DEFAULT_SMALL_BLIND,
                big: DEFAULT_BIG_BLIND,
            },
            min_players: MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Round {
    PreGame,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreGame => "pre-game",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    game_id: GameId,
    creator: String,
    password: Option<String>,
    settings: GameSettings,
    /// Seating order is turn order.
    players: Vec<Player>,
    board: Vec<Card>,
    deck: Deck,
    /// Chips swept in from finished betting rounds. Live bets sit in each
    /// player's `current_bet` until the round ends.
    pot: Chips,
    in_progress: bool,
    round: Round,
    /// `None` until the first hand, so the first rotation lands on seat 0.
    dealer_index: Option<SeatIndex>,
    current_player_index: Option<SeatIndex>,
    last_raiser: Option<Token>,
    hand_number: u64,
    created_at: DateTime<Utc>,
    rng: StdRng,
}

impl Table {
    #[must_use]
    pub fn new(
        game_id: impl Into<GameId>,
        creator: impl Into<String>,
        password: Option<String>,
        settings: GameSettings,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            creator: creator.into(),
            password,
            settings,
            players: Vec::with_capacity(settings.max_players),
            board: Vec::with_capacity(BOARD_SIZE),
            deck: Deck::default(),
            pot: 0,
            in_progress: false,
            round: Round::PreGame,
            dealer_index: None,
            current_player_index: None,
            last_raiser: None,
            hand_number: 0,
            created_at: Utc::now(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Shuffle every deck from `seed` so a run of hands can be replayed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, token: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.token == token)
    }

    #[must_use]
    pub fn seat_of(&self, token: &str) -> Option<SeatIndex> {
        self.players.iter().position(|player| player.token == token)
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// Chips already swept into the pot, excluding live bets.
    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn round(&self) -> Round {
        self.round
    }

    /// Whether a game was started and hasn't run out of players with chips.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Whether cards are out and betting can happen.
    #[must_use]
    pub fn is_hand_live(&self) -> bool {
        matches!(
            self.round,
            Round::PreFlop | Round::Flop | Round::Turn | Round::River
        )
    }

    #[must_use]
    pub fn dealer_index(&self) -> Option<SeatIndex> {
        self.dealer_index
    }

    #[must_use]
    pub fn current_player_index(&self) -> Option<SeatIndex> {
        self.current_player_index
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index
            .and_then(|idx| self.players.get(idx))
    }

    #[must_use]
    pub fn current_token(&self) -> Option<&str> {
        self.current_player().map(|player| player.token.as_str())
    }

    #[must_use]
    pub fn last_raiser(&self) -> Option<&str> {
        self.last_raiser.as_deref()
    }

    #[must_use]
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.password.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players
    }

    /// Every chip on the table: stacks, live bets and the pot.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        self.pot
            + self
                .players
                .iter()
                .map(|player| player.stack + player.current_bet)
                .sum::<Chips>()
    }

    /// Largest live bet of any seated player.
    #[must_use]
    pub fn highest_bet(&self) -> Chips {
        self.players
            .iter()
            .map(|player| player.current_bet)
            .max()
            .unwrap_or(0)
    }

    /// Smallest legal total for a raise right now.
    #[must_use]
    pub fn min_raise_to(&self) -> Chips {
        self.highest_bet()
            .saturating_add(self.settings.blinds.big)
    }

    /// Join gate. Tables without a password admit everyone.
    #[must_use]
    pub fn password_matches(&self, candidate: Option<&str>) -> bool {
        match (&self.password, candidate) {
            (None, _) => true,
            (Some(expected), Some(given)) => expected.as_bytes().ct_eq(given.as_bytes()).into(),
            (Some(_), None) => false,
        }
    }

    pub fn add_player(
        &mut self,
        token: impl Into<Token>,
        username: impl Into<String>,
        stack: Chips,
    ) -> Result<(), GameError> {
        let token = token.into();
        let username = username.into();
        if self
            .players
            .iter()
            .any(|player| player.token == token || player.username == username)
        {
            return Err(GameError::SeatTaken);
        }
        if self.is_full() {
            return Err(GameError::TableFull);
        }
        // Every chip sum on the table is bounded by the total.
        if self.total_chips().checked_add(stack).is_none() {
            return Err(GameError::TooManyChips);
        }

        let mut player = Player::new(token, username, stack);
        if stack == 0 {
            player.status = PlayerStatus::Out;
        } else if self.is_hand_live() {
            player.status = PlayerStatus::Waiting;
        }
        log::debug!(
            "{}: {} sat down with {} chips ({})",
            self.game_id,
            player.username,
            stack,
            player.status
        );
        self.players.push(player);
        Ok(())
    }

    /// Take a player out of their seat and hand them back, chips and all.
    ///
    /// Leaving on your own turn is a fold. Whatever the leaver had bet this
    /// round stays in the pot.
    pub fn remove_player(&mut self, token: &str) -> Result<Player, GameError> {
        let seat = self.seat_of(token).ok_or(GameError::PlayerNotSeated)?;
        self.atomically(|table| table.vacate_seat(seat))
    }

    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.in_progress {
            return Err(GameError::AlreadyStarted);
        }
        if self.players_with_chips() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers);
        }
        log::info!(
            "{}: game started with {} players",
            self.game_id,
            self.players.len()
        );
        self.atomically(Self::setup_new_hand)
    }

    pub fn start_new_hand(&mut self) -> Result<(), GameError> {
        if self.is_hand_live() {
            return Err(GameError::HandInProgress);
        }
        if self.players_with_chips() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers);
        }
        self.atomically(Self::setup_new_hand)
    }

    /// Apply one player's action on their turn.
    pub fn handle_player_action(&mut self, token: &str, action: Action) -> Result<(), GameError> {
        self.atomically(|table| table.apply_action(token, action))
    }

    /// Projection of the table for one viewer. Hole cards only show up here
    /// at showdown; a viewer's own cards come from [`Table::hole_cards`].
    #[must_use]
    pub fn public_state(&self, viewer: &str) -> TableView {
        let at_showdown = self.round == Round::Showdown;
        let players = self
            .players
            .iter()
            .map(|player| {
                let revealed = at_showdown
                    && player.status != PlayerStatus::Folded
                    && player.hand.len() == HOLE_CARDS;
                PlayerView {
                    username: player.username.clone(),
                    token: player.token.clone(),
                    stack: player.stack,
                    current_bet: player.current_bet,
                    status: player.status,
                    is_winner: player.is_winner,
                    hand: revealed.then(|| player.hand.clone()),
                    evaluated_hand: at_showdown
                        .then(|| player.evaluated_hand.clone())
                        .flatten(),
                }
            })
            .collect();

        TableView {
            game_id: self.game_id.clone(),
            creator: self.creator.clone(),
            in_progress: self.in_progress,
            round: self.round,
            pot: self.pot + self.players.iter().map(|p| p.current_bet).sum::<Chips>(),
            board: self.board.clone(),
            min_players: self.settings.min_players,
            max_players: self.settings.max_players,
            current_player: self.current_player().map(|player| player.token.clone()),
            blinds: self.settings.blinds,
            highest_bet: self.highest_bet(),
            min_raise_to: self.min_raise_to(),
            hand_number: self.hand_number,
            viewer_seat: self.seat_of(viewer),
            players,
        }
    }

    /// The viewer's own hole cards, or `None` if they aren't seated.
    #[must_use]
    pub fn hole_cards(&self, viewer: &str) -> Option<PrivateHand> {
        self.player(viewer).map(|player| PrivateHand {
            game_id: self.game_id.clone(),
            token: player.token.clone(),
            cards: player.hand.clone(),
        })
    }

    #[must_use]
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            game_id: self.game_id.clone(),
            creator: self.creator.clone(),
            players: self.players.len(),
            max_players: self.settings.max_players,
            blinds: self.settings.blinds,
            is_private: self.is_private(),
            in_progress: self.in_progress,
            round: self.round,
            hand_number: self.hand_number,
            created_at: self.created_at,
        }
    }

    /// Run `op` against the table and roll everything back if it fails.
    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let checkpoint = self.clone();
        let result = op(self);
        if let Err(error) = &result {
            if error.is_invariant_violation() {
                log::error!(
                    "{}: {} during hand #{}, restoring table",
                    self.game_id,
                    error,
                    self.hand_number
                );
            }
            *self = checkpoint;
        }
        result
    }

    fn players_with_chips(&self) -> usize {
        self.players.iter().filter(|player| player.stack > 0).count()
    }

    fn contender_count(&self) -> usize {
        self.players
            .iter()
            .filter(|player| player.status.is_contender())
            .count()
    }

    fn active_count(&self) -> usize {
        self.players
            .iter()
            .filter(|player| player.status == PlayerStatus::Active)
            .count()
    }

    /// First seat after `from` (wrapping, `from` itself checked last) whose
    /// player satisfies `pred`. `None` for `from` starts the scan at seat 0.
    fn seat_after(
        &self,
        from: Option<SeatIndex>,
        pred: impl Fn(&Player) -> bool,
    ) -> Option<SeatIndex> {
        let n = self.players.len();
        let start = from.map_or(0, |idx| idx + 1);
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&idx| pred(&self.players[idx]))
    }

    fn setup_new_hand(&mut self) -> Result<(), GameError> {
        self.pot = 0;
        self.board.clear();
        self.last_raiser = None;
        for player in &mut self.players {
            player.reset_for_new_hand();
        }

        let dealt_in = |player: &Player| player.status != PlayerStatus::Out;
        if self.players.iter().filter(|p| dealt_in(*p)).count() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers);
        }

        self.deck = Deck::shuffled(&mut self.rng);
        let dealer = self
            .seat_after(self.dealer_index, dealt_in)
            .ok_or(GameError::Internal("no seat for the dealer button"))?;
        let small_blind = self
            .seat_after(Some(dealer), dealt_in)
            .ok_or(GameError::Internal("no seat for the small blind"))?;
        let big_blind = self
            .seat_after(Some(small_blind), dealt_in)
            .ok_or(GameError::Internal("no seat for the big blind"))?;
        self.dealer_index = Some(dealer);

        let Blinds { small, big } = self.settings.blinds;
        self.players[small_blind].commit(small);
        self.players[big_blind].commit(big);

        for _ in 0..HOLE_CARDS {
            for idx in 0..self.players.len() {
                if dealt_in(&self.players[idx]) {
                    let card = self.deck.draw()?;
                    self.players[idx].hand.push(card);
                }
            }
        }

        self.in_progress = true;
        self.round = Round::PreFlop;
        self.hand_number += 1;
        self.last_raiser = Some(self.players[big_blind].token.clone());
        self.current_player_index =
            self.seat_after(Some(big_blind), |p| p.status == PlayerStatus::Active);

        log::info!(
            "{}: hand #{} dealt, dealer {}, blinds {} by {} and {}",
            self.game_id,
            self.hand_number,
            self.players[dealer].username,
            self.settings.blinds,
            self.players[small_blind].username,
            self.players[big_blind].username
        );

        // Everyone went all-in posting blinds.
        if self.current_player_index.is_none() {
            self.advance_to_next_state()?;
        }
        Ok(())
    }

    fn apply_action(&mut self, token: &str, action: Action) -> Result<(), GameError> {
        if !self.is_hand_live() {
            return Err(GameError::InvalidAction(format!(
                "no hand in progress ({})",
                self.round
            )));
        }
        let idx = match self.current_player_index {
            Some(idx) if self.players.get(idx).is_some_and(|p| p.token == token) => idx,
            _ => return Err(GameError::NotYourTurn),
        };

        let highest_bet = self.highest_bet();
        let min_raise = self.min_raise_to();
        let player = &mut self.players[idx];
        match action {
            Action::Fold => player.status = PlayerStatus::Folded,
            Action::Check => {
                if player.current_bet < highest_bet {
                    return Err(GameError::InvalidAction(format!(
                        "can't check facing a bet of {highest_bet}"
                    )));
                }
            }
            Action::Call => {
                player.commit(highest_bet - player.current_bet);
            }
            Action::Raise(total) => {
                if total < min_raise {
                    return Err(GameError::RaiseTooSmall { min: min_raise });
                }
                let needed = total - player.current_bet;
                if needed > player.stack {
                    return Err(GameError::InsufficientFunds {
                        needed,
                        available: player.stack,
                    });
                }
                player.commit(needed);
                self.last_raiser = Some(player.token.clone());
            }
        }
        player.has_acted = true;
        log::debug!(
            "{}: {} {} ({}, stack {})",
            self.game_id,
            player.username,
            action,
            self.round,
            player.stack
        );

        if self.contender_count() <= 1 {
            self.determine_winners()
        } else if self.is_round_complete() {
            self.advance_to_next_state()
        } else {
            self.move_to_next_player(idx)
        }
    }

    fn is_round_complete(&self) -> bool {
        let highest_bet = self
            .players
            .iter()
            .filter(|player| player.status.is_contender())
            .map(|player| player.current_bet)
            .max()
            .unwrap_or(0);
        self.players
            .iter()
            .filter(|player| player.status == PlayerStatus::Active)
            .all(|player| player.has_acted && player.current_bet == highest_bet)
    }

    fn move_to_next_player(&mut self, from: SeatIndex) -> Result<(), GameError> {
        let n = self.players.len();
        let next = (1..=2 * n)
            .map(|offset| (from + offset) % n)
            .find(|&idx| self.players[idx].status == PlayerStatus::Active);
        match next {
            Some(idx) => {
                self.current_player_index = Some(idx);
                Ok(())
            }
            None => {
                log::warn!(
                    "{}: no active seat after {} checks, resolving hand #{}",
                    self.game_id,
                    2 * n,
                    self.hand_number
                );
                self.determine_winners()
            }
        }
    }

    fn collect_bets(&mut self) {
        for player in &mut self.players {
            self.pot += player.current_bet;
            player.current_bet = 0;
        }
    }

    /// Close the betting round and deal the next street. When fewer than two
    /// players can still bet, streets keep coming until showdown.
    fn advance_to_next_state(&mut self) -> Result<(), GameError> {
        loop {
            self.collect_bets();
            for player in &mut self.players {
                if player.status == PlayerStatus::Active {
                    player.has_acted = false;
                }
            }
            if self.contender_count() <= 1 {
                return self.determine_winners();
            }

            match self.round {
                Round::PreFlop => self.deal_street(Round::Flop, 3)?,
                Round::Flop => self.deal_street(Round::Turn, 1)?,
                Round::Turn => self.deal_street(Round::River, 1)?,
                Round::River => return self.determine_winners(),
                Round::PreGame | Round::Showdown => {
                    return Err(GameError::Internal("advance outside of a live hand"));
                }
            }

            self.last_raiser = None;
            if self.active_count() >= 2 {
                self.current_player_index =
                    self.seat_after(self.dealer_index, |p| p.status == PlayerStatus::Active);
                return Ok(());
            }
            self.current_player_index = None;
        }
    }

    fn deal_street(&mut self, round: Round, cards: usize) -> Result<(), GameError> {
        self.deck.burn()?;
        for _ in 0..cards {
            let card = self.deck.draw()?;
            self.board.push(card);
        }
        self.round = round;
        log::debug!(
            "{}: {} [{}]",
            self.game_id,
            round,
            self.board
                .iter()
                .map(Card::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(())
    }

    /// Settle the pot. Does nothing unless a hand is live, so a hand is never
    /// paid out twice.
    fn determine_winners(&mut self) -> Result<(), GameError> {
        if !self.is_hand_live() {
            return Ok(());
        }
        self.collect_bets();

        let contenders: Vec<SeatIndex> = (0..self.players.len())
            .filter(|&idx| self.players[idx].status.is_contender())
            .collect();

        match contenders.as_slice() {
            [] => {
                log::warn!(
                    "{}: hand #{} ended with no contenders, {} chips left in the pot",
                    self.game_id,
                    self.hand_number,
                    self.pot
                );
            }
            &[winner] => {
                let player = &mut self.players[winner];
                player.stack += self.pot;
                player.is_winner = true;
                player.evaluated_hand = Some(EvaluatedHand::uncontested());
                log::info!(
                    "{}: hand #{} won uncontested by {} ({} chips)",
                    self.game_id,
                    self.hand_number,
                    player.username,
                    self.pot
                );
                self.pot = 0;
            }
            seats => {
                while self.board.len() < BOARD_SIZE {
                    let next = if self.board.is_empty() {
                        (Round::Flop, 3)
                    } else {
                        (Round::River, 1)
                    };
                    self.deal_street(next.0, next.1)?;
                }

                let mut hands = Vec::with_capacity(seats.len());
                for &seat in seats {
                    let cards: Vec<Card> = self.players[seat]
                        .hand
                        .iter()
                        .chain(&self.board)
                        .copied()
                        .collect();
                    let cards = <[Card; 7]>::try_from(cards).map_err(|_| {
                        GameError::Internal("showdown needs two hole cards and a full board")
                    })?;
                    let hand = functional::evaluate(&cards);
                    self.players[seat].evaluated_hand = Some(hand.clone());
                    hands.push(hand);
                }

                let winners: Vec<SeatIndex> = functional::winners(&hands)
                    .into_iter()
                    .map(|i| seats[i])
                    .collect();
                let split = simple_split_pot(self.pot, &winners);
                for &(seat, share) in &split.payouts {
                    let player = &mut self.players[seat];
                    player.stack += share;
                    player.is_winner = true;
                    log::info!(
                        "{}: hand #{} won by {} with {} ({} chips)",
                        self.game_id,
                        self.hand_number,
                        player.username,
                        hands
                            .iter()
                            .zip(seats)
                            .find(|(_, s)| **s == seat)
                            .map_or("?", |(hand, _)| hand.name.as_str()),
                        share
                    );
                }
                if split.remainder > 0 {
                    log::info!(
                        "{}: {} odd chip(s) left undistributed in the pot",
                        self.game_id,
                        split.remainder
                    );
                }
                self.pot = split.remainder;
            }
        }

        self.round = Round::Showdown;
        self.current_player_index = None;
        if self.players_with_chips() < self.settings.min_players {
            self.in_progress = false;
            log::info!(
                "{}: game over after hand #{}, not enough players with chips",
                self.game_id,
                self.hand_number
            );
        }
        Ok(())
    }

    fn vacate_seat(&mut self, seat: SeatIndex) -> Result<Player, GameError> {
        if self.is_hand_live() {
            let player = &self.players[seat];
            if self.current_player_index == Some(seat) {
                let token = player.token.clone();
                self.apply_action(&token, Action::Fold)?;
            } else if player.status.is_contender() {
                self.players[seat].status = PlayerStatus::Folded;
            }
        }

        let mut player = self.players.remove(seat);
        self.pot += player.current_bet;
        player.current_bet = 0;

        self.dealer_index = match self.dealer_index {
            Some(dealer) if seat < dealer => Some(dealer - 1),
            Some(dealer) if seat == dealer => dealer.checked_sub(1),
            other => other,
        };
        self.current_player_index = match self.current_player_index {
            Some(current) if seat < current => Some(current - 1),
            Some(current) if seat == current => {
                self.seat_after(seat.checked_sub(1), |p| p.status == PlayerStatus::Active)
            }
            other => other,
        };
        log::debug!(
            "{}: {} left with {} chips",
            self.game_id,
            player.username,
            player.stack
        );

        if self.is_hand_live() {
            if self.contender_count() <= 1 {
                self.determine_winners()?;
            } else if self.current_player_index.is_none() || self.is_round_complete() {
                self.advance_to_next_state()?;
            }
        }
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{HandRank, Suit, UNCONTESTED};

    fn table_with(n: usize) -> Table {
        let mut table = Table::new("t1", "p0", None, GameSettings::default()).with_seed(7);
        for i in 0..n {
            table.add_player(format!("p{i}"), format!("p{i}"), 1000).unwrap();
        }
        table
    }

    fn act(table: &mut Table, action: Action) {
        let token = table.current_token().unwrap().to_string();
        table.handle_player_action(&token, action).unwrap();
    }

    fn card(value: u8, suit: Suit) -> Card {
        Card(value, suit)
    }

    // === Seating ===

    #[test]
    fn test_add_player_errors() {
        let mut table = Table::new(
            "t1",
            "p0",
            None,
            GameSettings {
                max_players: 2,
                ..GameSettings::default()
            },
        );
        table.add_player("a", "a", 1000).unwrap();
        assert_eq!(table.add_player("a", "a", 1000), Err(GameError::SeatTaken));
        assert_eq!(table.add_player("a2", "a", 1000), Err(GameError::SeatTaken));
        table.add_player("b", "b", 1000).unwrap();
        assert_eq!(table.add_player("c", "c", 1000), Err(GameError::TableFull));
    }

    #[test]
    fn test_chip_total_cannot_overflow() {
        let mut table = table_with(0);
        table.add_player("a", "a", 3_000_000_000).unwrap();
        assert_eq!(
            table.add_player("b", "b", 3_000_000_000),
            Err(GameError::TooManyChips)
        );
        assert_eq!(table.num_players(), 1);

        // Exactly at the limit every sum still fits: shove and call.
        table.add_player("b", "b", Chips::MAX - 3_000_000_000).unwrap();
        table.start_game().unwrap();
        let first = table.current_player().unwrap();
        let (token, all_in) = (first.token.clone(), first.stack + first.current_bet);
        table.handle_player_action(&token, Action::Raise(all_in)).unwrap();
        act(&mut table, Action::Call);
        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.total_chips(), Chips::MAX);
        assert_eq!(table.public_state("a").chips_in_play(), Chips::MAX);
    }

    #[test]
    fn test_zero_stack_sits_out() {
        let mut table = table_with(2);
        table.add_player("broke", "broke", 0).unwrap();
        assert_eq!(table.player("broke").unwrap().status, PlayerStatus::Out);

        table.start_game().unwrap();
        table.add_player("broke2", "broke2", 0).unwrap();
        assert_eq!(table.player("broke2").unwrap().status, PlayerStatus::Out);
        assert!(table.player("broke").unwrap().hand.is_empty());
    }

    #[test]
    fn test_join_mid_hand_waits() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.add_player("late", "late", 1000).unwrap();
        let late = table.player("late").unwrap();
        assert_eq!(late.status, PlayerStatus::Waiting);
        assert!(late.hand.is_empty());
    }

    #[test]
    fn test_password_gate() {
        let table = Table::new("t1", "p0", Some("hunter2".into()), GameSettings::default());
        assert!(table.password_matches(Some("hunter2")));
        assert!(!table.password_matches(Some("hunter3")));
        assert!(!table.password_matches(Some("hunter")));
        assert!(!table.password_matches(None));
        assert!(table_with(0).password_matches(None));
    }

    // === Starting ===

    #[test]
    fn test_start_game_errors() {
        let mut table = table_with(1);
        assert_eq!(table.start_game(), Err(GameError::NotEnoughPlayers));
        table.add_player("p1", "p1", 1000).unwrap();
        table.start_game().unwrap();
        assert_eq!(table.start_game(), Err(GameError::AlreadyStarted));
        assert_eq!(table.start_new_hand(), Err(GameError::HandInProgress));
    }

    #[test]
    fn test_heads_up_setup() {
        let mut table = table_with(2);
        table.start_game().unwrap();

        assert_eq!(table.round(), Round::PreFlop);
        assert_eq!(table.dealer_index(), Some(0));
        // Dealer posts the big blind, the other seat the small blind and acts first.
        assert_eq!(table.players()[1].current_bet, 10);
        assert_eq!(table.players()[0].current_bet, 20);
        assert_eq!(table.current_player_index(), Some(1));
        assert_eq!(table.last_raiser(), Some("p0"));
        assert!(table.players().iter().all(|p| p.hand.len() == 2));
        assert_eq!(table.deck.len(), 48);
        assert_eq!(table.total_chips(), 2000);
    }

    #[test]
    fn test_three_handed_setup() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        assert_eq!(table.players()[1].current_bet, 10);
        assert_eq!(table.players()[2].current_bet, 20);
        assert_eq!(table.current_player_index(), Some(0));
    }

    #[test]
    fn test_dealer_rotates() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Fold);
        act(&mut table, Action::Fold);
        assert_eq!(table.round(), Round::Showdown);

        table.start_new_hand().unwrap();
        assert_eq!(table.dealer_index(), Some(1));
        assert_eq!(table.current_player_index(), Some(1));
        assert_eq!(table.hand_number(), 2);
    }

    #[test]
    fn test_out_players_skipped() {
        let mut table = table_with(3);
        table.players[1].stack = 0;
        table.start_game().unwrap();

        assert_eq!(table.players()[1].status, PlayerStatus::Out);
        assert!(table.players()[1].hand.is_empty());
        assert_eq!(table.num_players(), 3);
        // Heads-up between seats 0 and 2.
        assert_eq!(table.players()[2].current_bet, 10);
        assert_eq!(table.players()[0].current_bet, 20);
    }

    #[test]
    fn test_start_new_hand_not_enough_players_leaves_table() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        act(&mut table, Action::Fold);
        table.players[1].stack = 0;
        let before = table.summary();
        assert_eq!(table.start_new_hand(), Err(GameError::NotEnoughPlayers));
        assert_eq!(table.summary(), before);
        assert_eq!(table.round(), Round::Showdown);
    }

    // === Actions ===

    #[test]
    fn test_not_your_turn_leaves_state_unchanged() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        let before = table.public_state("p0");
        assert_eq!(
            table.handle_player_action("p1", Action::Call),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(
            table.handle_player_action("ghost", Action::Fold),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(table.public_state("p0"), before);
    }

    #[test]
    fn test_action_without_live_hand() {
        let mut table = table_with(2);
        assert!(matches!(
            table.handle_player_action("p0", Action::Check),
            Err(GameError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_check_facing_bet_rejected() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        assert!(matches!(
            table.handle_player_action("p1", Action::Check),
            Err(GameError::InvalidAction(_))
        ));
        assert_eq!(table.current_player_index(), Some(1));
    }

    #[test]
    fn test_raise_validation() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        assert_eq!(
            table.handle_player_action("p1", Action::Raise(39)),
            Err(GameError::RaiseTooSmall { min: 40 })
        );
        assert_eq!(
            table.handle_player_action("p1", Action::Raise(1011)),
            Err(GameError::InsufficientFunds {
                needed: 1001,
                available: 990
            })
        );
        table.handle_player_action("p1", Action::Raise(40)).unwrap();
        assert_eq!(table.players()[1].current_bet, 40);
        assert_eq!(table.players()[1].stack, 960);
        assert_eq!(table.last_raiser(), Some("p1"));
        assert_eq!(table.current_player_index(), Some(0));
        assert_eq!(table.min_raise_to(), 60);
    }

    #[test]
    fn test_raise_whole_stack_goes_all_in() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Raise(1000)).unwrap();
        assert_eq!(table.players()[1].status, PlayerStatus::AllIn);
        assert_eq!(table.players()[1].stack, 0);
    }

    #[test]
    fn test_short_call_goes_all_in() {
        let mut table = table_with(2);
        table.players[0].stack = 500;
        table.start_game().unwrap();
        // p1 shoves, p0 (dealer, big blind) can only call 480 more.
        table.handle_player_action("p1", Action::Raise(1000)).unwrap();
        table.handle_player_action("p0", Action::Call).unwrap();

        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.board().len(), 5);
        assert_eq!(table.total_chips(), 1500);
    }

    // === Rounds ===

    #[test]
    fn test_three_players_advance_exactly_once() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Call);
        act(&mut table, Action::Call);
        assert_eq!(table.round(), Round::PreFlop);
        act(&mut table, Action::Check);

        assert_eq!(table.round(), Round::Flop);
        assert_eq!(table.board().len(), 3);
        assert_eq!(table.pot(), 60);
        assert!(table.players().iter().all(|p| !p.has_acted && p.current_bet == 0));
        assert_eq!(table.current_player_index(), Some(1));
        assert_eq!(table.last_raiser(), None);
        assert_eq!(table.deck.len(), 52 - 6 - 4);
    }

    #[test]
    fn test_raise_reopens_action() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Call);
        act(&mut table, Action::Call);
        act(&mut table, Action::Raise(60));
        assert_eq!(table.round(), Round::PreFlop);
        assert_eq!(table.current_player_index(), Some(0));
        act(&mut table, Action::Call);
        act(&mut table, Action::Call);
        assert_eq!(table.round(), Round::Flop);
        assert_eq!(table.pot(), 180);
    }

    #[test]
    fn test_all_fold_awards_pot_without_board() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Fold);
        act(&mut table, Action::Fold);

        assert_eq!(table.round(), Round::Showdown);
        assert!(table.board().is_empty());
        let winner = &table.players()[2];
        assert!(winner.is_winner);
        assert_eq!(winner.stack, 1010);
        assert_eq!(winner.evaluated_hand.as_ref().unwrap().name, UNCONTESTED);
        assert_eq!(table.current_player_index(), None);
        assert_eq!(table.total_chips(), 3000);
    }

    #[test]
    fn test_heads_up_small_blind_fold() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Fold).unwrap();
        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.players()[0].stack, 1010);
        assert_eq!(table.players()[1].stack, 990);
    }

    #[test]
    fn test_heads_up_end_to_end() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Call).unwrap();
        table.handle_player_action("p0", Action::Check).unwrap();
        for round in [Round::Flop, Round::Turn, Round::River] {
            assert_eq!(table.round(), round);
            assert_eq!(table.current_player_index(), Some(1));
            table.handle_player_action("p1", Action::Check).unwrap();
            table.handle_player_action("p0", Action::Check).unwrap();
        }

        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.board().len(), 5);
        assert!(table.players().iter().any(|p| p.is_winner));
        assert!(table.players().iter().all(|p| p.evaluated_hand.is_some()));
        assert_eq!(table.total_chips(), 2000);
    }

    fn rig_showdown(table: &mut Table, hands: &[[Card; 2]], board: [Card; 5]) {
        for (player, hand) in table.players.iter_mut().zip(hands) {
            player.hand = hand.to_vec();
        }
        let burn = card(2, Suit::Club);
        table.deck = Deck::from_draw_order([
            burn, board[0], board[1], board[2], burn, board[3], burn, board[4],
        ]);
    }

    #[test]
    fn test_rigged_showdown_best_hand_wins() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        rig_showdown(
            &mut table,
            &[
                [card(14, Suit::Spade), card(14, Suit::Heart)],
                [card(13, Suit::Spade), card(13, Suit::Heart)],
            ],
            [
                card(3, Suit::Diamond),
                card(7, Suit::Club),
                card(9, Suit::Heart),
                card(11, Suit::Spade),
                card(4, Suit::Diamond),
            ],
        );
        table.handle_player_action("p1", Action::Raise(100)).unwrap();
        table.handle_player_action("p0", Action::Call).unwrap();
        for _ in 0..3 {
            table.handle_player_action("p1", Action::Check).unwrap();
            table.handle_player_action("p0", Action::Check).unwrap();
        }

        let aces = &table.players()[0];
        assert!(aces.is_winner);
        assert_eq!(aces.stack, 1100);
        assert_eq!(aces.evaluated_hand.as_ref().unwrap().rank, HandRank::OnePair);
        assert_eq!(table.players()[1].stack, 900);
        assert_eq!(table.pot(), 0);

        let view = table.public_state("p1");
        assert!(view.players.iter().all(|p| p.hand.is_some()));
    }

    #[test]
    fn test_tied_hands_split_pot() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        let broadway = [
            card(10, Suit::Diamond),
            card(11, Suit::Club),
            card(12, Suit::Heart),
            card(13, Suit::Spade),
            card(14, Suit::Diamond),
        ];
        rig_showdown(
            &mut table,
            &[
                [card(2, Suit::Spade), card(3, Suit::Heart)],
                [card(4, Suit::Spade), card(5, Suit::Heart)],
                [card(6, Suit::Spade), card(7, Suit::Heart)],
            ],
            broadway,
        );
        // Small blind folds, leaving 20 + 10 + 20 for the board to split.
        act(&mut table, Action::Call);
        act(&mut table, Action::Fold);
        act(&mut table, Action::Check);
        for _ in 0..3 {
            act(&mut table, Action::Check);
            act(&mut table, Action::Check);
        }

        assert_eq!(table.round(), Round::Showdown);
        // Pot of 50 split two ways.
        assert_eq!(table.players()[0].stack, 1005);
        assert_eq!(table.players()[2].stack, 1005);
        assert_eq!(table.pot(), 0);
        assert!(table.players()[0].is_winner && table.players()[2].is_winner);
    }

    #[test]
    fn test_odd_chip_reported_in_pot() {
        let mut table = Table::new(
            "t1",
            "p0",
            None,
            GameSettings {
                blinds: Blinds { small: 5, big: 15 },
                ..GameSettings::default()
            },
        )
        .with_seed(3);
        for i in 0..3 {
            table.add_player(format!("p{i}"), format!("p{i}"), 1000).unwrap();
        }
        table.start_game().unwrap();
        rig_showdown(
            &mut table,
            &[
                [card(2, Suit::Spade), card(3, Suit::Heart)],
                [card(4, Suit::Spade), card(5, Suit::Heart)],
                [card(6, Suit::Spade), card(7, Suit::Heart)],
            ],
            [
                card(10, Suit::Diamond),
                card(11, Suit::Club),
                card(12, Suit::Heart),
                card(13, Suit::Spade),
                card(14, Suit::Diamond),
            ],
        );
        // 15 + 5 + 15 = 35 split between two players leaves 1.
        act(&mut table, Action::Call);
        act(&mut table, Action::Fold);
        act(&mut table, Action::Check);
        for _ in 0..3 {
            act(&mut table, Action::Check);
            act(&mut table, Action::Check);
        }
        assert_eq!(table.pot(), 1);
        assert_eq!(table.players()[0].stack, 1002);
        assert_eq!(table.players()[2].stack, 1002);
        assert_eq!(table.total_chips(), 3000);
    }

    #[test]
    fn test_all_in_runs_out_board() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Raise(1000));
        act(&mut table, Action::Call);
        act(&mut table, Action::Call);

        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.board().len(), 5);
        assert_eq!(table.total_chips(), 3000);
    }

    #[test]
    fn test_one_player_left_to_act_runs_out() {
        let mut table = table_with(3);
        table.players[0].stack = 100;
        table.start_game().unwrap();
        act(&mut table, Action::Raise(100));
        act(&mut table, Action::Call);
        act(&mut table, Action::Fold);
        // p0 all-in, p1 is the only one who could still bet.
        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.board().len(), 5);
    }

    #[test]
    fn test_blinds_put_everyone_all_in() {
        let mut table = table_with(2);
        table.players[0].stack = 15;
        table.players[1].stack = 5;
        table.start_game().unwrap();
        assert_eq!(table.round(), Round::Showdown);
        assert_eq!(table.board().len(), 5);
        assert_eq!(table.total_chips(), 20);
    }

    #[test]
    fn test_no_double_resolution() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Fold).unwrap();
        let stacks: Vec<_> = table.players().iter().map(|p| p.stack).collect();
        table.determine_winners().unwrap();
        let after: Vec<_> = table.players().iter().map(|p| p.stack).collect();
        assert_eq!(stacks, after);
    }

    #[test]
    fn test_game_over_when_one_player_has_chips() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Raise(1000)).unwrap();
        table.handle_player_action("p0", Action::Call).unwrap();
        let busted = table.players().iter().any(|p| p.stack == 0);
        assert_eq!(table.in_progress(), !busted);
    }

    #[test]
    fn test_empty_deck_rolls_back() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        table.deck = Deck::from_draw_order([card(2, Suit::Club)]);
        act(&mut table, Action::Call);
        act(&mut table, Action::Call);
        let before = table.public_state("p2");
        assert_eq!(
            table.handle_player_action("p2", Action::Check),
            Err(GameError::EmptyDeck)
        );
        assert_eq!(table.public_state("p2"), before);
        assert_eq!(table.current_player_index(), Some(2));
    }

    // === Removal ===

    #[test]
    fn test_remove_current_player_folds() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        let leaver = table.remove_player("p0").unwrap();
        assert_eq!(leaver.status, PlayerStatus::Folded);
        assert_eq!(leaver.stack, 1000);
        assert_eq!(table.num_players(), 2);
        // Seats shifted down: small blind p1 is now seat 0 and up next.
        assert_eq!(table.current_token(), Some("p1"));
        assert_eq!(table.dealer_index(), None);
        assert_eq!(table.total_chips(), 2000);
    }

    #[test]
    fn test_remove_leaves_bet_in_pot() {
        let mut table = table_with(3);
        table.start_game().unwrap();
        act(&mut table, Action::Call);
        let leaver = table.remove_player("p2").unwrap();
        assert_eq!(leaver.stack, 980);
        assert_eq!(table.pot(), 20);
        assert_eq!(table.public_state("p0").pot, 50);
        assert_eq!(table.current_token(), Some("p1"));
    }

    #[test]
    fn test_remove_down_to_one_resolves() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.remove_player("p0").unwrap();
        assert_eq!(table.round(), Round::Showdown);
        let winner = &table.players()[0];
        assert!(winner.is_winner);
        assert_eq!(winner.stack, 1020);
    }

    #[test]
    fn test_remove_unknown_player() {
        let mut table = table_with(2);
        assert_eq!(
            table.remove_player("ghost").unwrap_err(),
            GameError::PlayerNotSeated
        );
    }

    #[test]
    fn test_remove_between_hands() {
        let mut table = table_with(3);
        let leaver = table.remove_player("p1").unwrap();
        assert_eq!(leaver.status, PlayerStatus::Active);
        assert_eq!(table.num_players(), 2);
        assert_eq!(table.round(), Round::PreGame);
    }

    // === Views ===

    #[test]
    fn test_public_state_hides_hole_cards() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        let view = table.public_state("p0");
        assert!(view.players.iter().all(|p| p.hand.is_none()));
        assert_eq!(view.pot, 30);
        assert_eq!(view.current_player.as_deref(), Some("p1"));
        assert_eq!(view.viewer_seat, Some(0));
        assert_eq!(view.highest_bet, 20);

        let private = table.hole_cards("p0").unwrap();
        assert_eq!(private.cards.len(), 2);
        assert!(table.hole_cards("ghost").is_none());
    }

    #[test]
    fn test_folded_hands_stay_hidden_at_showdown() {
        let mut table = table_with(2);
        table.start_game().unwrap();
        table.handle_player_action("p1", Action::Fold).unwrap();
        let view = table.public_state("p0");
        assert!(view.players[1].hand.is_none());
        assert!(view.players[0].hand.is_some());
        assert_eq!(
            view.players[0].evaluated_hand.as_ref().map(|h| h.name.as_str()),
            Some(UNCONTESTED)
        );
    }

    #[test]
    fn test_summary() {
        let mut table = Table::new("t9", "p0", Some("pw".to_string()), GameSettings::default());
        table.add_player("p0", "p0", 1000).unwrap();
        let summary = table.summary();
        assert_eq!(summary.game_id, "t9");
        assert_eq!(summary.players, 1);
        assert!(summary.is_private);
        assert!(!summary.in_progress);
        assert_eq!(summary.round, Round::PreGame);
    }

    #[test]
    fn test_round_display() {
        assert_eq!(Round::PreFlop.to_string(), "pre-flop");
        assert_eq!(
            serde_json::to_string(&Round::PreGame).unwrap(),
            "\"pre-game\""
        );
    }
}
