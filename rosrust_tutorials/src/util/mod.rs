pub mod kill;
pub mod killable_channel;
pub mod lossy_channel;
