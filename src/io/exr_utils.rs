/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(image: &std::vec::Vec<(Float, Float, Float)>,
                         width: usize,
                         height: usize,
                         file_path: &str) -> std::result::Result<(), String> {
    log::info!("Starting writing openexr images: {}.", file_path);
    if image.len() != width * height {
        return Err(format!("pixel count {} does not match {}x{}", image.len(), width, height));
    }

    write_rgb_file(file_path, width, height, |x,y| {
        (
            image[y*width+x].0,
            image[y*width+x].1,
            image[y*width+x].2
        )
    }).map_err(|e| e.to_string())?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

pub fn write_bitmap(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), String> {
    write_exr_to_file(&bitmap.raw_copy(), bitmap.width(), bitmap.height(), file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_size_is_rejected() {
        let pixels = vec![(0.0, 0.0, 0.0); 3];
        assert!(write_exr_to_file(&pixels, 2, 2, "unused.exr").is_err());
    }
}
