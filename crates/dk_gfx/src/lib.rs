pub mod color;
pub mod font;
pub mod image;
pub mod types;

// 重新导出常用类型
pub use color::Color;
pub use font::Font;
pub use image::{FileSource, Image, ImageSource, MemorySource};
pub use types::Rect;
