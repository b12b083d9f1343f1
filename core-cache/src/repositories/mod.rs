//! Repository traits and SQLite implementations for cached entities.
//!
//! Every synchronizer and read path goes through these traits so tests can
//! substitute in-memory fakes without a database.

mod kv;
mod liked;
mod pagination;
mod playlist;
mod playlist_song;
mod section;
mod song;
mod spotlight;

pub use kv::{KeyValueRepository, SqliteKeyValueRepository};
pub use liked::{LikedSongRepository, SqliteLikedSongRepository};
pub use pagination::{Page, PageRequest};
pub use playlist::{PlaylistRepository, SqlitePlaylistRepository};
pub use playlist_song::{PlaylistSongRepository, SqlitePlaylistSongRepository};
pub use section::{SectionRepository, SqliteSectionRepository};
pub use song::{SongRepository, SqliteSongRepository};
pub use spotlight::{SpotlightRepository, SqliteSpotlightRepository};
