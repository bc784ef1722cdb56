//! GPU Wakeup Common Types
//!
//! Wire types shared by the gateway server and anything that talks to it.

pub mod api;
pub mod push;

pub use api::{ApiResponse, StatusData};
pub use push::{
    truncate_chars, PushData, PushIdentity, PushNotification, PushNotificationBody, PushRequest,
    PushRejection, DEFAULT_CHANNEL, DEFAULT_MAX_BODY_CHARS,
};
