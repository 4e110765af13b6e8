pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Seconds a signed ownership message stays acceptable.
pub const VERIFICATION_WINDOW_SECS: u64 = 300;
pub const MESSAGE_SUFFIX: &str = "starRegistry";
pub const GENESIS_SEED: &str = "Genesis Block";
