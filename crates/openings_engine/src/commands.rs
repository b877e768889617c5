use chess_core::Variant;

use crate::explorer::{BookClient, ProfileLookup};
use crate::session::BookSession;

/// The game a chat command was typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatContext {
    pub rated: bool,
    pub variant: Variant,
}

/// Handles `setplayer <name>`, `unsetplayer` and `mode`, returning the reply
/// to post in chat.
pub fn handle_chat_command<C, R>(session: &mut BookSession<C, R>, game: ChatContext, cmd: &str) -> String
where
    C: BookClient + ProfileLookup,
{
    let cmd = cmd.trim();
    let mut parts = cmd.split_whitespace();
    match parts.next() {
        Some("setplayer") => {
            if game.rated {
                return "setplayer is only allowed for casual games!".to_string();
            }
            match (parts.next(), parts.next()) {
                (Some(username), None) => {
                    session.track_opponent(username, game.variant);
                    format!(
                        "Set opening explorer to \"{}\". It may take a bit to index all games for this player.",
                        username
                    )
                }
                _ => "Invalid format! Use \"!setplayer <username>\" to set the opening explorer player."
                    .to_string(),
            }
        }
        Some("unsetplayer") if parts.next().is_none() => {
            session.untrack_opponent();
            "Using general Lichess opening explorer.".to_string()
        }
        Some("mode") if parts.next().is_none() => session.mode_description(),
        _ => "Command not recognized!".to_string(),
    }
}
