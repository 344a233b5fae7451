pub mod catalog;
pub mod core_api;
pub mod draw_lock;
pub mod header;
pub mod keybcs2;
pub mod savegame;
pub mod state;
pub mod stream;
pub mod thumbnail;
pub mod types;
