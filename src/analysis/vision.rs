//! Pixel-level room heuristics: edge contours for furniture shapes, mean
//! brightness for lighting and mean channel balance for the colour scheme.

use image::{imageops, GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::point::Point;

use crate::config::AnalysisConfig;

pub const TABLE_DESK: &str = "Table/Desk";
pub const CHAIR_SQUARE: &str = "Chair/Square Furniture";
pub const SOFA_LONG: &str = "Sofa/Long Furniture";

/// Reported when no contour passes the furniture heuristics
pub const DEFAULT_ELEMENTS: [&str; 3] = ["Walls", "Floor", "General Furniture"];

/// Axis-aligned bounding box of a contour, inclusive of both edge pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn of(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Polygon area of a closed contour (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice_area as f64 / 2.0).abs()
}

/// Map a large shape's aspect ratio to a furniture label
pub fn classify_shape(aspect_ratio: f64) -> Option<&'static str> {
    if aspect_ratio > 1.5 && aspect_ratio < 3.0 {
        Some(TABLE_DESK)
    } else if aspect_ratio > 0.7 && aspect_ratio < 1.3 {
        Some(CHAIR_SQUARE)
    } else if aspect_ratio > 3.0 {
        Some(SOFA_LONG)
    } else {
        None
    }
}

/// Outermost contours of the edge map; nested borders are ignored
fn external_contours(edges: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect()
}

pub fn detect_room_elements(image: &RgbImage, config: &AnalysisConfig) -> Vec<String> {
    let gray = imageops::grayscale(image);
    let edges = canny(&gray, config.canny_low, config.canny_high);
    elements_from_edges(&edges, config.min_contour_area)
}

/// Label furniture-sized shapes in a binary edge map
pub fn elements_from_edges(edges: &GrayImage, min_area: f64) -> Vec<String> {
    let elements: Vec<String> = external_contours(edges)
        .iter()
        .filter(|c| contour_area(&c.points) > min_area)
        .filter_map(|c| BoundingBox::of(&c.points))
        .filter_map(|rect| classify_shape(rect.aspect_ratio()))
        .map(str::to_string)
        .collect();

    if elements.is_empty() {
        DEFAULT_ELEMENTS.iter().map(|s| s.to_string()).collect()
    } else {
        elements
    }
}

/// Mean of each RGB channel over the whole image
pub fn mean_color(image: &RgbImage) -> [f64; 3] {
    let pixel_count = (image.width() as u64 * image.height() as u64).max(1) as f64;
    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += channel as u64;
        }
    }
    sums.map(|s| s as f64 / pixel_count)
}

pub fn lighting_label(mean: [f64; 3]) -> &'static str {
    let brightness = mean.iter().sum::<f64>() / 3.0;
    if brightness > 180.0 {
        "Bright"
    } else if brightness > 120.0 {
        "Natural"
    } else {
        "Dim"
    }
}

pub fn color_scheme_label(mean: [f64; 3]) -> &'static str {
    let [red, green, blue] = mean;
    if red > green && red > blue {
        "Warm"
    } else if blue > red && blue > green {
        "Cool"
    } else {
        "Neutral"
    }
}
