/// Room and image blob storage backends.
pub mod room_store;
/// Storage abstraction layer shared by all backends.
pub mod storage;
