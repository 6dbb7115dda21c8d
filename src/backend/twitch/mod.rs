//! Twitch chat over plain IRC
//!
//! A [`Session`] owns one TCP connection to `irc.chat.twitch.tv`, sends the
//! login handshake, and then reacts to every inbound line:
//! - lines are tokenized by [`IrcLine`] (IRCv3 tags, prefix, command, params)
//! - `PING :` lines are answered with the matching `PONG`
//! - chat commands are answered through a [`CommandDispatcher`]
//! - every outbound line passes a [`RateLimiter`] first
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tmibot::backend::config::{SessionConfig, Settings};
//! use tmibot::backend::twitch::Session;
//! use tokio::net::TcpStream;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = SessionConfig::new("robin", "oauth:0123456789", "xbox");
//!     let mut session: Session<TcpStream> = Session::new(config, &Settings::default());
//!
//!     session.connect().await.unwrap();
//!     session.run().await.unwrap();
//! }
//! ```
//!
//! [`CommandDispatcher`]: crate::backend::commands::CommandDispatcher

mod error;
mod keepalive;
mod messages;
mod rate_limit;
mod session;

// Re-export public types
pub use error::{Result, TwitchError};
pub use keepalive::{build_pong, is_ping, pong_for};
pub use messages::{display_name, message_body, ChatLine, IrcLine, Tag};
pub use rate_limit::{RateLimiter, DEFAULT_CEILING, MODERATOR_CEILING, WINDOW};
pub use session::{Session, SessionState, MAX_LINE_LEN, PORT, SERVER};
