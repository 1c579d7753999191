//! Request handlers: HTTP input validation and response shaping. All storage
//! work is delegated to the adapters in `services`.

pub mod comment_handlers;
pub mod health_handlers;
pub mod photo_handlers;
pub mod rating_handlers;
