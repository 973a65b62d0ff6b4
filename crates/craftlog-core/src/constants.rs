//! Shared constants.

/// Rendition widths generated for avatar and project/step images.
pub const RENDITION_WIDTHS: [u32; 4] = [160, 320, 640, 1280];

/// Bounding box for the compressed thumbnail variant.
pub const THUMB_SIZE: u32 = 80;

/// JPEG quality used for the thumbnail variant.
pub const THUMB_QUALITY: u8 = 80;

/// Default permission granted to new accounts.
pub const PERMISSION_USER: &str = "user";
