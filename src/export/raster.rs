use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use anyhow::{bail, Context, Result};
use eframe::egui::FontDefinitions;
use image::{ImageFormat, Rgb, RgbImage};

use crate::config::NULL_MARKER;
use crate::data::filter::FilteredView;
use crate::data::model::{CellValue, Dataset};

/// egui's default proportional font, reused so the image matches the window.
const FONT_NAME: &str = "Ubuntu-Light";
const FONT_PX: f32 = 14.0;
const PAD: u32 = 4;
const MIN_COL_WIDTH: u32 = 40;
const MAX_COL_WIDTH: u32 = 240;
/// Largest side a baseline JPEG can carry.
const MAX_SIDE: u64 = u16::MAX as u64;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const HEADER_FILL: Rgb<u8> = Rgb([232, 232, 232]);
const STRIPE_FILL: Rgb<u8> = Rgb([246, 246, 246]);
const GRID: Rgb<u8> = Rgb([190, 190, 190]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const NULL_TEXT: Rgb<u8> = Rgb([150, 150, 150]);

struct Painter {
    font: FontVec,
    scale: PxScale,
}

impl Painter {
    fn new() -> Result<Self> {
        let defs = FontDefinitions::default();
        let data = defs
            .font_data
            .get(FONT_NAME)
            .with_context(|| format!("built-in font {FONT_NAME} is missing"))?;
        let font = FontVec::try_from_vec_and_index(data.font.to_vec(), data.index)
            .with_context(|| format!("parsing built-in font {FONT_NAME}"))?;
        Ok(Self {
            font,
            scale: PxScale::from(FONT_PX),
        })
    }

    fn row_height(&self) -> u32 {
        self.font.as_scaled(self.scale).height().ceil() as u32 + 2 * PAD
    }

    fn text_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Shorten `text` until it fits in `max_width` pixels, marking the cut with `...`.
    fn fit(&self, text: &str, max_width: f32) -> String {
        if self.text_width(text) <= max_width {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(['.', '.', '.'].iter()).collect();
            if self.text_width(&candidate) <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    /// Draw `text` with its top-left corner at (`x`, `top`), clipped at `clip_right`.
    fn draw_text(&self, img: &mut RgbImage, x: f32, top: f32, clip_right: i32, text: &str, color: Rgb<u8>) {
        let scaled = self.font.as_scaled(self.scale);
        let baseline = top + scaled.ascent();
        let mut caret = x;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < clip_right {
                    blend(img, px, py, color, coverage);
                }
            });
        }
    }
}

fn blend(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= img.width() || y >= img.height() {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(x, y);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f32 * (1.0 - coverage) + src as f32 * coverage).round() as u8;
    }
}

fn fill(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

fn checked_side(len: u64, what: &str) -> Result<u32> {
    if len == 0 || len > MAX_SIDE {
        bail!("table image would be {len} px {what}; export csv, xlsx or pdf instead");
    }
    Ok(len as u32)
}

/// Render every row of the view (header included) into an image, independent
/// of what is currently on screen. An empty view renders "No data available".
pub fn render_table(dataset: &Dataset, view: &FilteredView) -> Result<RgbImage> {
    let painter = Painter::new()?;
    let row_h = painter.row_height();

    if dataset.columns.is_empty() || view.is_empty() {
        let label = "No data available";
        let width = painter.text_width(label).ceil() as u64 + 2 * PAD as u64;
        let mut img = RgbImage::from_pixel(checked_side(width, "wide")?, row_h, BACKGROUND);
        painter.draw_text(&mut img, PAD as f32, PAD as f32, width as i32, label, NULL_TEXT);
        return Ok(img);
    }

    let cells: Vec<Vec<Option<String>>> = view
        .rows(dataset)
        .map(|row| {
            dataset
                .columns
                .iter()
                .map(|col| match row.get(col) {
                    Some(CellValue::Null) | None => None,
                    Some(value) => Some(value.to_string()),
                })
                .collect()
        })
        .collect();

    let null_width = painter.text_width(NULL_MARKER);
    let widths: Vec<u32> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let widest = cells
                .iter()
                .map(|row| row[c].as_deref().map_or(null_width, |s| painter.text_width(s)))
                .fold(painter.text_width(name), f32::max);
            (widest.ceil() as u32 + 2 * PAD).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect();

    let total_width = widths.iter().map(|&w| w as u64).sum::<u64>() + 1;
    let total_height = (cells.len() as u64 + 1) * row_h as u64 + 1;
    let width = checked_side(total_width, "wide")?;
    let height = checked_side(total_height, "tall")?;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    fill(&mut img, 0, 0, width, row_h, HEADER_FILL);
    for r in (1..cells.len()).step_by(2) {
        let top = (r as u32 + 1) * row_h;
        fill(&mut img, 0, top, width, top + row_h, STRIPE_FILL);
    }

    let lefts: Vec<u32> = widths
        .iter()
        .scan(0, |x, &w| {
            let left = *x;
            *x += w;
            Some(left)
        })
        .collect();
    let text_room = |c: usize| (widths[c] - 2 * PAD) as f32;

    for (c, name) in dataset.columns.iter().enumerate() {
        let clip = (lefts[c] + widths[c] - PAD) as i32;
        let label = painter.fit(name, text_room(c));
        painter.draw_text(&mut img, (lefts[c] + PAD) as f32, PAD as f32, clip, &label, TEXT);
    }
    for (r, row) in cells.iter().enumerate() {
        let top = ((r as u32 + 1) * row_h + PAD) as f32;
        for (c, value) in row.iter().enumerate() {
            let clip = (lefts[c] + widths[c] - PAD) as i32;
            let x = (lefts[c] + PAD) as f32;
            match value {
                Some(text) => {
                    let text = painter.fit(text, text_room(c));
                    painter.draw_text(&mut img, x, top, clip, &text, TEXT);
                }
                None => painter.draw_text(&mut img, x, top, clip, NULL_MARKER, NULL_TEXT),
            }
        }
    }

    for r in 0..=cells.len() + 1 {
        let y = r as u32 * row_h;
        fill(&mut img, 0, y, width, y + 1, GRID);
    }
    for x in lefts.iter().copied().chain([width - 1]) {
        fill(&mut img, x, 0, x + 1, height, GRID);
    }

    Ok(img)
}

/// Render the view and encode it as JPEG.
pub fn save_jpeg(path: &Path, dataset: &Dataset, view: &FilteredView) -> Result<()> {
    let img = render_table(dataset, view)?;
    img.save_with_format(path, ImageFormat::Jpeg)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
