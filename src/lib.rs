pub mod cli;
pub mod config;
pub mod decode;
pub mod logging;
pub mod publish;
pub mod score;
pub mod session;
pub mod source;
pub mod watcher;

pub use config::Settings;
pub use publish::{SessionEvent, TreeBroadcaster};
pub use score::{ScoreTree, Scoreboard, TargetKind};
pub use session::{ScoreSession, SessionError, SessionOptions};
pub use source::{FileSet, LocalFile, SourceFile};
