pub mod codec;
pub mod connect;
pub mod constants;
pub mod error;
pub mod messages;
pub mod role;
pub mod room_code;

pub use connect::ConnectParams;
pub use error::ProtoError;
pub use messages::WireMessage;
pub use role::{Foot, Role};
pub use room_code::RoomCode;
