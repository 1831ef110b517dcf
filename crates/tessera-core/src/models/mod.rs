pub mod image;
pub mod upload;

pub use image::ImageResponse;
pub use upload::{
    ChunkUploadResponse, CompleteUploadRequest, CompleteUploadResponse, InitUploadRequest,
    InitUploadResponse, UploadInfo, UploadStatusResponse,
};
