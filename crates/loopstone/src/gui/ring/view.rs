use super::model::State;
use super::{DRAG_SCALE, GUIDE_STROKE, REMOVING_ALPHA};
use crate::gui::theme::ThemeColors;
use beadstock::catalog::{BeadFinish, ProductId};
use beadstock::design::PlacedBead;
use beadstock::geom::Point;
use cairo::Context;
use gdk4::prelude::*;
use gdk_pixbuf::Pixbuf;
use palette::Srgba;
use std::collections::HashMap;
use std::f64::consts::PI;

const TEXTURE_LOAD_SIZE: i32 = 256;

/// Per-product texture pixbufs, loaded once and reused across draw passes.
#[derive(Default)]
pub struct TextureCache {
    pixbufs: HashMap<ProductId, Option<Pixbuf>>,
}

impl TextureCache {
    pub fn get(&mut self, id: &ProductId, finish: &BeadFinish) -> Option<Pixbuf> {
        self.pixbufs
            .entry(id.clone())
            .or_insert_with(|| {
                finish.texture.as_ref().and_then(|path| {
                    Pixbuf::from_file_at_scale(path, TEXTURE_LOAD_SIZE, TEXTURE_LOAD_SIZE, true)
                        .map_err(|e| log::warn!("Failed to load texture {}: {}", path.display(), e))
                        .ok()
                })
            })
            .clone()
    }

    pub fn invalidate(&mut self) {
        self.pixbufs.clear();
    }
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Paints one bead face centered on the current origin: radial-gradient body,
/// optional texture, string-hole line, corner shine.
pub fn draw_bead_face(
    cr: &Context,
    finish: &BeadFinish,
    texture: Option<&Pixbuf>,
    radius: f64,
    alpha: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    // Highlight sits at 30%/30% of the face, like a light source up-left.
    let gradient = cairo::RadialGradient::new(
        -radius * 0.4,
        -radius * 0.4,
        radius * 0.1,
        0.0,
        0.0,
        radius * 1.4,
    );
    let h = finish.highlight;
    let b = finish.base;
    gradient.add_color_stop_rgba(0.0, h.r, h.g, h.b, h.a * alpha);
    gradient.add_color_stop_rgba(1.0, b.r, b.g, b.b, b.a * alpha);
    cr.set_source(&gradient)?;
    cr.arc(0.0, 0.0, radius, 0.0, 2.0 * PI);
    cr.fill()?;

    if let Some(pixbuf) = texture {
        draw_texture(cr, finish, pixbuf, radius, alpha)?;
    }

    // String hole axis across the face.
    let hole = colors.string_hole;
    cr.set_source_rgba(hole.red, hole.green, hole.blue, hole.alpha * alpha);
    cr.rectangle(-radius, -1.0, radius * 2.0, 2.0);
    cr.fill()?;

    // Small reflection up-right.
    let shine = colors.shine;
    cr.set_source_rgba(shine.red, shine.green, shine.blue, shine.alpha * alpha);
    cr.arc(radius * 0.45, -radius * 0.45, radius * 0.18, 0.0, 2.0 * PI);
    cr.fill()?;

    Ok(())
}

fn draw_texture(
    cr: &Context,
    finish: &BeadFinish,
    pixbuf: &Pixbuf,
    radius: f64,
    alpha: f64,
) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.arc(0.0, 0.0, radius, 0.0, 2.0 * PI);
    cr.clip();

    let scale = (radius * 2.0) / pixbuf.width().max(pixbuf.height()) as f64;
    cr.translate(-radius, -radius);
    cr.scale(scale, scale);
    let (sx, sy) = finish.sprite_offset.unwrap_or((0.0, 0.0));
    cr.set_source_pixbuf(pixbuf, -sx, -sy);
    cr.paint_with_alpha(alpha)?;
    cr.restore()
}

fn draw_placed_bead(
    cr: &Context,
    state: &State,
    textures: &mut TextureCache,
    bead: &PlacedBead,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let Some(placement) = state.layout.get(&bead.unique_id) else {
        return Ok(());
    };

    let radius = state.metrics.bead_radius(bead.product.size_mm);
    let alpha = if placement.will_be_removed { REMOVING_ALPHA } else { 1.0 };
    let texture = textures.get(&bead.product.id, &bead.product.finish);

    cr.save()?;
    cr.translate(placement.offset.x, placement.offset.y);
    cr.rotate(placement.rotation_deg.to_radians());
    if placement.is_dragging {
        cr.scale(DRAG_SCALE, DRAG_SCALE);
    }
    draw_bead_face(cr, &bead.product.finish, texture.as_ref(), radius, alpha, colors)?;
    cr.restore()
}

/// The whole canvas pass: removal cue, watermark, guide circle, then every
/// bead inside the rotated ring frame (dragged bead on top).
pub fn draw(
    cr: &Context,
    state: &State,
    textures: &mut TextureCache,
    colors: &ThemeColors,
    center: Point,
) -> Result<(), cairo::Error> {
    if state.layout.will_remove {
        draw_remove_cue(cr, state, colors, center)?;
    }

    draw_watermark(cr, colors, center)?;

    cr.save()?;
    cr.translate(center.x, center.y);
    // Display-only wrap; the state keeps accumulating unbounded.
    cr.rotate(state.rotation_deg.rem_euclid(360.0).to_radians());

    set_source(cr, colors.guide);
    cr.set_line_width(GUIDE_STROKE);
    cr.arc(0.0, 0.0, state.metrics.radius, 0.0, 2.0 * PI);
    cr.stroke()?;

    let dragged = state.controller.session().map(|s| s.bead.clone());
    for bead in &state.beads {
        if Some(&bead.unique_id) != dragged.as_ref() {
            draw_placed_bead(cr, state, textures, bead, colors)?;
        }
    }
    if let Some(id) = dragged
        && let Some(bead) = state.beads.iter().find(|b| b.unique_id == id)
    {
        draw_placed_bead(cr, state, textures, bead, colors)?;
    }

    cr.restore()
}

fn draw_remove_cue(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
    center: Point,
) -> Result<(), cairo::Error> {
    set_source(cr, colors.remove_zone);
    cr.arc(center.x, center.y, state.metrics.remove_threshold + 30.0, 0.0, 2.0 * PI);
    cr.fill()?;

    set_source(cr, colors.remove_text);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(16.0);
    let text = "RELEASE TO DELETE";
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(
            center.x - ext.width() / 2.0,
            center.y + state.metrics.remove_threshold + 10.0,
        );
        cr.show_text(text)?;
    }
    Ok(())
}

fn draw_watermark(cr: &Context, colors: &ThemeColors, center: Point) -> Result<(), cairo::Error> {
    set_source(cr, colors.watermark);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(22.0);
    let title = "Loopstone";
    if let Ok(ext) = cr.text_extents(title) {
        cr.move_to(center.x - ext.width() / 2.0, center.y - 4.0);
        cr.show_text(title)?;
    }

    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(10.0);
    let subtitle = "BRACELET DESIGNER";
    if let Ok(ext) = cr.text_extents(subtitle) {
        cr.move_to(center.x - ext.width() / 2.0, center.y + 14.0);
        cr.show_text(subtitle)?;
    }
    Ok(())
}
