//! 인식 전처리 파이프라인.
//!
//! 그레이스케일 → 확대 → 이진화 → 패딩. 각 단계는 불변 이미지를 받아
//! 새 이미지를 반환하는 순수 함수이며 독립적으로 테스트된다.
//! Tesseract는 흰 배경 위 어두운 텍스트, 충분한 글자 높이에서 가장 잘
//! 동작하므로 게임 UI의 작은 밝은 글자를 그 형태로 정규화한다.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

/// 판독 가능한 최소 글자 높이 (픽셀). 이보다 작으면 확대한다.
pub const MIN_LEGIBLE_HEIGHT: u32 = 32;

/// 이진화 후 가장자리에 두르는 흰 여백 (픽셀)
pub const BORDER_PX: u32 = 5;

/// 파이프라인 전체 적용
pub fn prepare(image: &DynamicImage) -> GrayImage {
    let gray = to_grayscale(image);
    let scaled = upscale_if_small(&gray, MIN_LEGIBLE_HEIGHT);
    let binary = binarize(&scaled);
    pad_border(&binary, BORDER_PX)
}

/// 1단계 — 그레이스케일 변환
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// 2단계 — 높이가 `min_height` 미만이면 비율 유지 확대 (cubic 보간)
pub fn upscale_if_small(image: &GrayImage, min_height: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    if h == 0 || w == 0 || h >= min_height {
        return image.clone();
    }
    let scale = min_height as f32 / h as f32;
    let new_w = ((w as f32) * scale).round().max(1.0) as u32;
    image::imageops::resize(image, new_w, min_height, FilterType::CatmullRom)
}

/// 3단계 — Otsu 전역 임계값 이진화.
/// 결과가 어두운 배경 위 흰 텍스트(흰 픽셀 < 50%)면 반전하여
/// 흰 배경 위 검은 텍스트로 맞춘다.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(image);
    let mut binary = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y)[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    let total = (binary.width() as u64) * (binary.height() as u64);
    if total > 0 {
        let white = binary.pixels().filter(|p| p[0] == 255).count() as u64;
        if white * 2 < total {
            for p in binary.pixels_mut() {
                p[0] = 255 - p[0];
            }
        }
    }
    binary
}

/// 4단계 — 흰색 고정 폭 테두리 패딩
pub fn pad_border(image: &GrayImage, border: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut padded = GrayImage::from_pixel(w + border * 2, h + border * 2, Luma([255u8]));
    image::imageops::replace(&mut padded, image, border as i64, border as i64);
    padded
}

/// Otsu 방법으로 전역 임계값 산출 (클래스 간 분산 최대화)
fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in image.pixels() {
        histogram[p[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 127;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &c)| (v as f64) * (c as f64))
        .sum();

    let mut sum_bg = 0.0f64;
    let mut weight_bg = 0u64;
    let mut best_threshold = 0u8;
    let mut best_variance = 0.0f64;

    for t in 0..256usize {
        weight_bg += histogram[t];
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += (t as f64) * (histogram[t] as f64);

        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let variance =
            (weight_bg as f64) * (weight_fg as f64) * (mean_bg - mean_fg) * (mean_bg - mean_fg);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }
    best_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn bimodal_image() -> GrayImage {
        // 왼쪽 절반 어두움(40), 오른쪽 절반 밝음(220)
        GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([40u8]) } else { Luma([220u8]) })
    }

    #[test]
    fn grayscale_preserves_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(17, 9));
        let gray = to_grayscale(&img);
        assert_eq!(gray.dimensions(), (17, 9));
    }

    #[test]
    fn upscale_small_image_to_target_height() {
        let img = GrayImage::new(40, 10);
        let scaled = upscale_if_small(&img, MIN_LEGIBLE_HEIGHT);
        assert_eq!(scaled.height(), MIN_LEGIBLE_HEIGHT);
        assert_eq!(scaled.width(), 128); // 40 * (32/10)
    }

    #[test]
    fn upscale_leaves_large_image_untouched() {
        let img = GrayImage::new(100, 64);
        let scaled = upscale_if_small(&img, MIN_LEGIBLE_HEIGHT);
        assert_eq!(scaled.dimensions(), (100, 64));
    }

    #[test]
    fn otsu_separates_bimodal_distribution() {
        let img = bimodal_image();
        let t = otsu_threshold(&img);
        assert!(t >= 40 && t < 220, "임계값 {t}이 두 군집 사이여야 함");
    }

    #[test]
    fn binarize_outputs_only_black_and_white() {
        let img = bimodal_image();
        let binary = binarize(&img);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn binarize_inverts_dark_background() {
        // 대부분 어두운 배경(0) 위 소수 밝은 픽셀(255) — 게임 UI의 밝은 글자
        let mut img = GrayImage::from_pixel(10, 10, Luma([0u8]));
        img.put_pixel(5, 5, Luma([255u8]));
        img.put_pixel(6, 5, Luma([255u8]));

        let binary = binarize(&img);
        // 반전 후: 배경 흰색, 글자 검은색
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn pad_border_adds_white_margin() {
        let img = GrayImage::from_pixel(4, 4, Luma([0u8]));
        let padded = pad_border(&img, BORDER_PX);
        assert_eq!(padded.dimensions(), (14, 14));
        assert_eq!(padded.get_pixel(0, 0)[0], 255);
        assert_eq!(padded.get_pixel(BORDER_PX, BORDER_PX)[0], 0);
    }

    #[test]
    fn prepare_composes_all_stages() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            10,
            image::Rgba([30, 30, 30, 255]),
        ));
        let out = prepare(&img);
        // 10 → 32로 확대 + 상하 5px 패딩
        assert_eq!(out.height(), MIN_LEGIBLE_HEIGHT + BORDER_PX * 2);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
