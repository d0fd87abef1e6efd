pub mod comment;
pub mod fingerprint;
pub mod post;
pub mod user;
