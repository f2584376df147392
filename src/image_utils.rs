use image::{GrayImage, Luma, Rgb};

pub const WHITE: Luma<u8> = Luma([u8::MAX]);
pub const BLACK: Luma<u8> = Luma([u8::MIN]);

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const DARK_GREEN: Rgb<u8> = Rgb([0, 127, 0]);
pub const PINK: Rgb<u8> = Rgb([255, 0, 255]);

pub const RAINBOW: [Rgb<u8>; 7] = [
    Rgb([255, 0, 0]),
    Rgb([255, 127, 0]),
    Rgb([255, 255, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([75, 0, 130]),
    Rgb([143, 0, 255]),
];

/// Counts the pixels that are non-zero both in `img` and in `mask`, where
/// `mask` covers the region of `img` whose top-left corner is `origin`.
/// Mask pixels falling outside `img` are ignored.
pub fn count_masked_pixels(img: &GrayImage, mask: &GrayImage, origin: (i32, i32)) -> u32 {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let mut count = 0;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }

        let img_x = origin.0 + x as i32;
        let img_y = origin.1 + y as i32;
        if img_x < 0 || img_y < 0 || img_x >= width || img_y >= height {
            continue;
        }

        if img.get_pixel(img_x as u32, img_y as u32).0[0] != 0 {
            count += 1;
        }
    }
    count
}

/// Determines the number of pixels in an image that match the given luma.
pub fn count_pixels(img: &GrayImage, luma: &Luma<u8>) -> u32 {
    img.pixels().filter(|p| *p == luma).count() as u32
}
