pub mod ai;
pub mod commands;
pub mod config;
pub mod error;
pub mod explorer;
pub mod mode;
pub mod opening_book;
pub mod session;
pub mod tier;
pub mod time_gate;

pub use ai::{Decision, EngineOnly, MoveDecider, OpeningsBot, Score, SearchEngine, SearchLimits, SearchResult};
pub use commands::{handle_chat_command, ChatContext};
pub use config::BookConfig;
pub use error::{BookError, ConfigError, EngineError, TransportError};
pub use explorer::{
    decode_book_response, read_book_stream, BookClient, ExplorerClient, IndexingStatus, Profile,
    ProfileLookup, QueryParams,
};
pub use mode::{ModeTracker, SelectionMode};
pub use opening_book::{pick, pick_from, BookEntry, BookQueryResult};
pub use session::{BookSession, TrackedOpponent, TrackingReport};
pub use tier::{QueryPlan, Tier, TierSelector};
pub use time_gate::TimeGate;
