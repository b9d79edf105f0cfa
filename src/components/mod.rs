pub mod gallery_page;
pub mod landing;
pub mod notice;
pub mod upload_page;
pub mod viewer_page;
