pub mod add;
pub mod attach_image;
pub mod common;
pub mod completions;
pub mod list;
pub mod show;
pub mod verifier;
pub mod verify;
