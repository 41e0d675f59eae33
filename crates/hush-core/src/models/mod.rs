//! Data models for Hush

mod image;
mod note;

pub use image::{DeleteImageResponse, DisplayImage, ImageBytes, UploadedImage};
pub use note::Note;
