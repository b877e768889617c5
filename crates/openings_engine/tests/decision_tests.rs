use std::cell::RefCell;

use chess_core::{ClockState, FenPosition, Position, UciMove, Variant, STARTING_FEN};
use openings_engine::{
    handle_chat_command, BookClient, BookConfig, BookEntry, BookQueryResult, BookSession, ChatContext,
    EngineError, EngineOnly, IndexingStatus, MoveDecider, OpeningsBot, Profile, ProfileLookup,
    QueryParams, Score, SearchEngine, SearchLimits, SearchResult, SelectionMode, TrackedOpponent,
    TransportError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Default)]
struct FakeExplorer {
    player_moves: Vec<BookEntry>,
    general_moves: Vec<BookEntry>,
    player_timeout: bool,
    offline: bool,
    profile: Option<Profile>,
    calls: RefCell<Vec<(String, QueryParams)>>,
}

impl FakeExplorer {
    fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.borrow().clone()
    }

    fn general_calls(&self) -> Vec<QueryParams> {
        self.calls()
            .into_iter()
            .filter(|(endpoint, _)| endpoint.ends_with("/lichess"))
            .map(|(_, params)| params)
            .collect()
    }
}

impl BookClient for FakeExplorer {
    fn query(&self, endpoint: &str, params: &QueryParams) -> Result<BookQueryResult, TransportError> {
        self.calls.borrow_mut().push((endpoint.to_string(), params.clone()));
        if self.offline {
            return Err(TransportError::Network("connection refused".to_string()));
        }
        if endpoint.ends_with("/player") {
            if self.player_timeout {
                return Err(TransportError::Timeout);
            }
            Ok(BookQueryResult::new(self.player_moves.clone()))
        } else {
            Ok(BookQueryResult::new(self.general_moves.clone()))
        }
    }
}

impl ProfileLookup for FakeExplorer {
    fn get_profile(&self, _username: &str) -> Result<Profile, TransportError> {
        self.profile.clone().ok_or(TransportError::Status { status: 404 })
    }
}

struct FakeEngine {
    reply: UciMove,
    searches: usize,
    last_limits: Option<SearchLimits>,
}

impl FakeEngine {
    fn new(reply: &str) -> Self {
        Self {
            reply: uci(reply),
            searches: 0,
            last_limits: None,
        }
    }
}

impl SearchEngine for FakeEngine {
    fn search(&mut self, _position: &dyn Position, limits: SearchLimits) -> Result<SearchResult, EngineError> {
        self.searches += 1;
        self.last_limits = Some(limits);
        Ok(SearchResult {
            best_move: self.reply,
            score: Some(Score::Centipawns(25)),
        })
    }
}

fn uci(s: &str) -> UciMove {
    s.parse().unwrap()
}

fn ratings(params: &QueryParams) -> Vec<u32> {
    params
        .get("ratings")
        .unwrap()
        .split(',')
        .map(|r| r.parse().unwrap())
        .collect()
}

fn session(explorer: FakeExplorer, seed: u64) -> BookSession<FakeExplorer, StdRng> {
    BookSession::new(&BookConfig::default(), explorer, StdRng::seed_from_u64(seed))
}

#[test]
fn tracked_player_book_is_sampled_by_games_played() {
    let explorer = FakeExplorer {
        player_moves: vec![BookEntry::new("e2e4", 10, 5, 5), BookEntry::new("d2d4", 1, 0, 0)],
        ..Default::default()
    };
    let mut session = session(explorer, 7);
    session.set_tracked(TrackedOpponent::new("alice"));

    let position = FenPosition::startpos();
    let trials = 10_000;
    let mut e4 = 0;
    for _ in 0..trials {
        let (mv, mode) = session.decide_move(&position, None).unwrap();
        assert_eq!(mode, SelectionMode::PlayerBook);
        if mv == uci("e2e4") {
            e4 += 1;
        } else {
            assert_eq!(mv, uci("d2d4"));
        }
    }

    let share = e4 as f64 / trials as f64;
    assert!((share - 20.0 / 21.0).abs() < 0.015, "e2e4 share was {share}");
    assert_eq!(session.current_mode(), SelectionMode::PlayerBook);
    assert!(session.client().general_calls().is_empty());
}

#[test]
fn empty_player_book_falls_back_to_rated_general_book() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("c2c4", 4, 4, 2)],
        ..Default::default()
    };
    let mut session = session(explorer, 1);
    session.set_tracked(TrackedOpponent::new("bob").with_rating(1500));

    let decided = session.decide_move(&FenPosition::startpos(), None);
    assert_eq!(decided, Some((uci("c2c4"), SelectionMode::GeneralBook)));
    assert_eq!(session.current_mode(), SelectionMode::GeneralBook);

    let calls = session.client().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.ends_with("/player"));
    assert_eq!(calls[0].1.get("player"), Some("bob"));

    let ratings = ratings(&calls[1].1);
    let lowest = ratings[0];
    assert!(lowest <= 1500 - 200, "lowest tier {lowest} should reach below the band");
    assert!(lowest >= 1500 - 200 - 200, "lowest tier {lowest} reaches too far down");
    assert!(ratings.iter().all(|&r| r >= lowest));
}

#[test]
fn untracked_standard_game_uses_the_standard_floor() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("e2e4", 1, 1, 1)],
        ..Default::default()
    };
    let mut session = session(explorer, 3);
    session.decide_move(&FenPosition::startpos(), None).unwrap();

    let calls = session.client().general_calls();
    assert_eq!(calls.len(), 1);
    let config = BookConfig::default();
    assert_eq!(ratings(&calls[0])[0], config.standard_rating_floor);
    assert_ne!(ratings(&calls[0])[0], config.variant_rating_floor);
}

#[test]
fn untracked_variant_game_uses_the_variant_floor() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("e2e4", 1, 1, 1)],
        ..Default::default()
    };
    let mut session = session(explorer, 3);
    let position = FenPosition::startpos().with_variant(Variant::KingOfTheHill);
    session.decide_move(&position, None).unwrap();

    let calls = session.client().general_calls();
    assert_eq!(ratings(&calls[0])[0], BookConfig::default().variant_rating_floor);
    assert_eq!(calls[0].get("variant"), Some("kingOfTheHill"));
}

#[test]
fn unsetting_a_player_restores_untracked_behaviour() {
    let general = vec![BookEntry::new("g1f3", 2, 2, 2)];
    let mut fresh = session(
        FakeExplorer {
            general_moves: general.clone(),
            ..Default::default()
        },
        9,
    );
    let mut round_trip = session(
        FakeExplorer {
            general_moves: general,
            profile: Some(Profile::default().with_rating("blitz", 2100)),
            ..Default::default()
        },
        9,
    );

    round_trip.track_opponent("carol", Variant::Standard);
    assert_eq!(round_trip.tracked().map(|o| o.rating), Some(2100));
    round_trip.untrack_opponent();
    assert_eq!(round_trip.tracked(), None);

    let position = FenPosition::startpos();
    assert_eq!(fresh.decide_move(&position, None), round_trip.decide_move(&position, None));
    assert_eq!(fresh.client().general_calls(), round_trip.client().general_calls());
}

#[test]
fn low_time_skips_the_book_entirely() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("e2e4", 1, 1, 1)],
        ..Default::default()
    };
    let mut session = session(explorer, 5);
    let clock = ClockState::from_millis(3_000, 0);
    assert_eq!(session.decide_move(&FenPosition::startpos(), Some(&clock)), None);
    assert!(session.client().calls().is_empty());
}

#[test]
fn query_failure_degrades_to_engine_search() {
    let explorer = FakeExplorer {
        offline: true,
        ..Default::default()
    };
    let mut bot = OpeningsBot::new(session(explorer, 11), FakeEngine::new("e2e4"));
    bot.session_mut().record_mode(SelectionMode::GeneralBook);

    let decision = bot.decide(&FenPosition::startpos(), None).unwrap();
    assert_eq!(decision.best_move, uci("e2e4"));
    assert_eq!(decision.mode, SelectionMode::EngineSearch);
    assert_eq!(decision.score, Some(Score::Centipawns(25)));
    assert_eq!(bot.session().current_mode(), SelectionMode::EngineSearch);
}

#[test]
fn tracked_player_timeout_hands_the_move_to_the_engine() {
    let explorer = FakeExplorer {
        player_timeout: true,
        general_moves: vec![BookEntry::new("c2c4", 9, 9, 9)],
        ..Default::default()
    };
    let mut session = session(explorer, 19);
    session.set_tracked(TrackedOpponent::new("hank").with_rating(1800));
    session.record_mode(SelectionMode::PlayerBook);

    let position = FenPosition::startpos();
    assert_eq!(session.decide_move(&position, None), None);
    assert!(session.try_book_move(&position).is_err());
    // A failed player query does not fall through to the general book
    assert!(session.client().general_calls().is_empty());
    assert_eq!(session.current_mode(), SelectionMode::PlayerBook);

    let mut bot = OpeningsBot::new(session, FakeEngine::new("g1f3"));
    let decision = bot.decide(&position, None).unwrap();
    assert_eq!(decision.best_move, uci("g1f3"));
    assert_eq!(decision.mode, SelectionMode::EngineSearch);
    assert_eq!(bot.engine().searches, 1);
    assert_eq!(bot.session().current_mode(), SelectionMode::EngineSearch);
}

#[test]
fn book_move_is_played_without_searching() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("d2d4", 5, 5, 5)],
        ..Default::default()
    };
    let mut bot = OpeningsBot::new(session(explorer, 12), FakeEngine::new("e2e4"));
    let clock = ClockState::from_millis(60_000, 0);

    let decision = bot.decide(&FenPosition::startpos(), Some(&clock)).unwrap();
    assert_eq!(decision.best_move, uci("d2d4"));
    assert_eq!(decision.mode, SelectionMode::GeneralBook);
    assert_eq!(decision.score, None);
    assert_eq!(bot.engine().searches, 0);
}

#[test]
fn out_of_book_position_asks_the_engine_with_the_clock() {
    let mut bot = OpeningsBot::new(session(FakeExplorer::default(), 13), FakeEngine::new("a2a3"));
    let clock = ClockState::from_millis(5_000, 2_000);

    let decision = bot.decide(&FenPosition::startpos(), Some(&clock)).unwrap();
    assert_eq!(decision.best_move, uci("a2a3"));
    assert_eq!(decision.mode, SelectionMode::EngineSearch);
    assert_eq!(bot.engine().searches, 1);
    assert_eq!(
        bot.engine().last_limits,
        Some(SearchLimits {
            clock: Some(clock),
            move_time: None
        })
    );
}

#[test]
fn book_moves_outside_the_legal_set_are_ignored() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("e2e4", 100, 0, 0)],
        ..Default::default()
    };
    let mut session = session(explorer, 14);
    let position = FenPosition::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 40")
        .unwrap()
        .with_legal_moves(vec![uci("e1d1"), uci("e1f1")]);
    assert_eq!(session.decide_move(&position, None), None);
    assert_eq!(session.current_mode(), SelectionMode::EngineSearch);
}

#[test]
fn engine_only_never_queries_a_book() {
    let mut decider = EngineOnly::new(FakeEngine::new("g1f3"));
    let decision = decider.decide(&FenPosition::startpos(), None).unwrap();
    assert_eq!(decision.mode, SelectionMode::EngineSearch);
    assert_eq!(decision.best_move, uci("g1f3"));
}

#[test]
fn tracking_probes_both_colours_from_the_start_position() {
    let explorer = FakeExplorer {
        player_timeout: true,
        profile: Some(Profile::default().with_rating("atomic", 1750)),
        ..Default::default()
    };
    let mut session = session(explorer, 15);

    let report = session.track_opponent("dave", Variant::Atomic);
    assert_eq!(report.white, IndexingStatus::NotYetIndexed);
    assert_eq!(report.black, IndexingStatus::NotYetIndexed);
    assert_eq!(report.rating, 1750);

    let calls = session.client().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.get("fen"), Some(STARTING_FEN));
    assert_eq!(calls[0].1.get("color"), Some("white"));
    assert_eq!(calls[1].1.get("color"), Some("black"));
    assert_eq!(calls[1].1.get("variant"), Some("atomic"));
}

#[test]
fn profile_failure_keeps_the_previous_rating() {
    let mut session = session(FakeExplorer::default(), 16);
    session.set_tracked(TrackedOpponent::new("erin").with_rating(1900));

    let report = session.track_opponent("erin", Variant::Standard);
    assert_eq!(report.white, IndexingStatus::Indexed);
    assert_eq!(report.rating, 1900);

    // A different player starts from an unknown rating
    let report = session.track_opponent("frank", Variant::Standard);
    assert_eq!(report.rating, 0);
    assert_eq!(session.tracked().map(|o| o.username.as_str()), Some("frank"));
}

#[test]
fn unresolved_rating_still_reaches_the_lowest_tier() {
    let explorer = FakeExplorer {
        general_moves: vec![BookEntry::new("b1c3", 1, 0, 0)],
        ..Default::default()
    };
    let mut session = session(explorer, 17);
    session.set_tracked(TrackedOpponent::new("gina"));

    session.decide_move(&FenPosition::startpos(), None).unwrap();
    let calls = session.client().general_calls();
    assert!(ratings(&calls[0]).contains(&0));
}

#[test]
fn chat_commands_drive_the_session() {
    let explorer = FakeExplorer {
        profile: Some(Profile::default().with_rating("rapid", 1600)),
        ..Default::default()
    };
    let mut session = session(explorer, 18);
    let casual = ChatContext {
        rated: false,
        variant: Variant::Standard,
    };
    let rated = ChatContext { rated: true, ..casual };

    assert_eq!(
        handle_chat_command(&mut session, rated, "setplayer alice"),
        "setplayer is only allowed for casual games!"
    );
    assert_eq!(session.tracked(), None);

    assert_eq!(
        handle_chat_command(&mut session, casual, "setplayer"),
        "Invalid format! Use \"!setplayer <username>\" to set the opening explorer player."
    );
    assert_eq!(
        handle_chat_command(&mut session, casual, "setplayer alice bob"),
        "Invalid format! Use \"!setplayer <username>\" to set the opening explorer player."
    );

    assert_eq!(
        handle_chat_command(&mut session, casual, "setplayer alice"),
        "Set opening explorer to \"alice\". It may take a bit to index all games for this player."
    );
    assert_eq!(
        session.tracked(),
        Some(&TrackedOpponent::new("alice").with_rating(1600))
    );

    assert_eq!(
        handle_chat_command(&mut session, casual, "mode"),
        "Currently using Engine Search."
    );

    assert_eq!(
        handle_chat_command(&mut session, rated, "unsetplayer"),
        "Using general Lichess opening explorer."
    );
    assert_eq!(session.tracked(), None);

    assert_eq!(
        handle_chat_command(&mut session, casual, "eval"),
        "Command not recognized!"
    );
}
