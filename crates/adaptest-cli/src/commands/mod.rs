pub mod init;
pub mod levels;
pub mod score;
pub mod simulate;
pub mod validate;
