pub mod inbound;
pub mod outbound;
pub mod payload;
pub mod ws;
