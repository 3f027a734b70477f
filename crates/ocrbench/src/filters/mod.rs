//! Built-in image filters.
//!
//! The catalogue is small and fixed, so it is an enum dispatched by name rather
//! than a set of trait objects. Every filter converts its input to 8-bit luma
//! first and finishes with [`normalize`], which makes the text dark on a light
//! background and rescales the image so its longer side is 600 pixels.
//!
//! Edge detection, morphology and convolution come from `imageproc`.

use crate::plugins::ImageFilter;
use crate::{BenchError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::edges::canny;
use imageproc::filter::filter3x3;
use imageproc::morphology::dilate;

/// Target length of the longer image side after normalization.
pub const NORMALIZED_SIZE: u32 = 600;

/// Luma below this counts as a "light text" pixel when detecting text color.
const LIGHT_TEXT_MAX: u8 = 10;
/// Luma above this counts as a "dark text" pixel when detecting text color.
const DARK_TEXT_MIN: u8 = 245;

const ONE_BIT_THRESHOLD: u8 = 20;
const ONE_BIT_HIGH: u8 = 235;

/// Sigma that approximates a 5x5 gaussian kernel.
const GAUSSIAN_SIGMA: f32 = 1.1;

const SHARPEN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 9, -1, -1, -1, -1];

const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

/// Contours are redrawn as 3 pixel wide strokes.
const CONTOUR_RADIUS: i32 = 1;

/// Distance (L-inf) around an edge that still counts as relevant content.
const RELEVANT_DISTANCE: u8 = 5;
const RELEVANT_MASK_MIN: u8 = 250;

/// Brightest value kept by the custom filter before sharpening.
const CUSTOM_TRUNCATE_MAX: u8 = 254;
/// Share of the sharpened image in the custom filter's final blend.
const CUSTOM_SHARPEN_WEIGHT: f32 = 0.3;

/// Filters shipped with ocrbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFilter {
    NoFilter,
    Grayscale,
    Normalize,
    Sharpen,
    OneBitColor,
    GaussianBlur,
    Invert,
    CannyEdge,
    CannyEdgeFilledShapes,
    /// Masks out everything away from edges, then blends in a sharpened copy.
    Custom,
}

const ALL_FILTERS: [BuiltinFilter; 10] = [
    BuiltinFilter::NoFilter,
    BuiltinFilter::Grayscale,
    BuiltinFilter::Normalize,
    BuiltinFilter::Sharpen,
    BuiltinFilter::OneBitColor,
    BuiltinFilter::GaussianBlur,
    BuiltinFilter::Invert,
    BuiltinFilter::CannyEdge,
    BuiltinFilter::CannyEdgeFilledShapes,
    BuiltinFilter::Custom,
];

impl BuiltinFilter {
    pub fn all() -> &'static [BuiltinFilter] {
        &ALL_FILTERS
    }

    /// Display name, as used in configuration identities.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFilter => "no filter",
            Self::Grayscale => "grayscale",
            Self::Normalize => "normalize",
            Self::Sharpen => "sharpen",
            Self::OneBitColor => "one bit color",
            Self::GaussianBlur => "gaussian blur",
            Self::Invert => "invert",
            Self::CannyEdge => "canny edge",
            Self::CannyEdgeFilledShapes => "canny edge with filled shapes",
            Self::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FILTERS.iter().copied().find(|filter| filter.as_str() == name)
    }

    fn process(&self, gray: GrayImage) -> GrayImage {
        if gray.width() == 0 || gray.height() == 0 {
            return gray;
        }

        match self {
            Self::NoFilter | Self::Grayscale | Self::Normalize => normalize(gray),
            Self::Sharpen => normalize(sharpen(&gray)),
            Self::OneBitColor => normalize(one_bit(gray)),
            Self::GaussianBlur => normalize(imageops::blur(&gray, GAUSSIAN_SIGMA)),
            Self::Invert => {
                let mut gray = gray;
                imageops::invert(&mut gray);
                normalize(gray)
            }
            Self::CannyEdge => normalize(canny(&gray, CANNY_LOW, CANNY_HIGH)),
            Self::CannyEdgeFilledShapes => normalize(canny_filled_shapes(&gray)),
            Self::Custom => custom(normalize(gray)),
        }
    }
}

impl std::str::FromStr for BuiltinFilter {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| BenchError::unknown_plugin("filter", s))
    }
}

impl std::fmt::Display for BuiltinFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImageFilter for BuiltinFilter {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        let gray = image.into_luma8();
        Ok(DynamicImage::ImageLuma8(self.process(gray)))
    }
}

/// Whether the text in `gray` is light on a dark background.
///
/// Counts near-black and near-white pixels; the majority is taken to be the
/// background.
pub fn has_light_text(gray: &GrayImage) -> bool {
    let (light, dark) = gray.pixels().fold((0usize, 0usize), |(light, dark), pixel| {
        let value = pixel.0[0];
        (
            light + usize::from(value < LIGHT_TEXT_MAX),
            dark + usize::from(value > DARK_TEXT_MIN),
        )
    });
    light > dark
}

/// Make the text dark and rescale so the longer side is [`NORMALIZED_SIZE`] pixels.
///
/// Images with a zero dimension are returned unchanged.
pub fn normalize(mut gray: GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray;
    }

    if has_light_text(&gray) {
        imageops::invert(&mut gray);
    }

    let scale = NORMALIZED_SIZE as f64 / width.max(height) as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);

    if (new_width, new_height) == (width, height) {
        return gray;
    }

    imageops::resize(&gray, new_width, new_height, FilterType::Triangle)
}

/// 3x3 sharpen; border pixels are replicated and results saturate at 0 and 255.
fn sharpen(gray: &GrayImage) -> GrayImage {
    filter3x3(gray, &SHARPEN_KERNEL)
}

/// Canny edges with every traced contour redrawn as a thick stroke.
fn canny_filled_shapes(gray: &GrayImage) -> GrayImage {
    let mut edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    for contour in find_contours::<i32>(&edges) {
        for point in contour.points {
            draw_filled_circle_mut(&mut edges, (point.x, point.y), CONTOUR_RADIUS, Luma([255]));
        }
    }
    edges
}

/// Whiten every pixel farther than [`RELEVANT_DISTANCE`] from a detected edge.
///
/// `gray` is expected to be normalized already.
pub fn remove_irrelevant_content(gray: &GrayImage) -> GrayImage {
    let mut mask = normalize(canny_filled_shapes(gray));
    // normalize leaves edges dark; the mask wants them bright
    imageops::invert(&mut mask);
    let mask = dilate(&mask, Norm::LInf, RELEVANT_DISTANCE);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let relevant = mask
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| pixel.0[0] > RELEVANT_MASK_MIN);
        if relevant { *gray.get_pixel(x, y) } else { Luma([255]) }
    })
}

fn custom(gray: GrayImage) -> GrayImage {
    let mut gray = remove_irrelevant_content(&gray);
    for pixel in gray.pixels_mut() {
        pixel.0[0] = pixel.0[0].min(CUSTOM_TRUNCATE_MAX);
    }

    let sharpened = normalize(sharpen(&gray));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let base = f32::from(gray.get_pixel(x, y).0[0]);
        let sharp = sharpened.get_pixel_checked(x, y).map_or(base, |pixel| f32::from(pixel.0[0]));
        let blended = CUSTOM_SHARPEN_WEIGHT * sharp + (1.0 - CUSTOM_SHARPEN_WEIGHT) * base;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binary threshold: pixels above the threshold become bright, the rest black.
fn one_bit(mut gray: GrayImage) -> GrayImage {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > ONE_BIT_THRESHOLD { ONE_BIT_HIGH } else { 0 };
    }
    gray
}
