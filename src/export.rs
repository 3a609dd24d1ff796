//! SVG export: serialize a laid-out tree as a standalone SVG document.
//!
//! ```text
//! positions + relationships ──► connectors ─┐
//!                         └───► cards ──────┴──► <svg> … </svg>
//! ```
//!
//! Connectors are drawn first so cards sit on top of them. The view box
//! covers every card plus the configured fit padding.

use std::io::Write;

use crate::canvas::FamilyTreeCanvas;
use crate::card::PersonCard;
use crate::config::TreeConfig;
use crate::connectors::{ConnectionRenderer, Connector, Shape};
use crate::model::{Person, PersonId, Point, PositionMap, Rect, Relationship};
use crate::Result;

/// Export a tree as SVG.
///
/// People without a position are left out, as are connectors touching
/// them. `selected` only changes the card's CSS class.
pub fn export_svg(
    people: &[Person],
    relationships: &[Relationship],
    positions: &PositionMap,
    config: &TreeConfig,
    selected: Option<&PersonId>,
    writer: &mut dyn Write,
) -> Result<()> {
    let card = config.layout.card_size();
    let bounds = bounds(positions, config).unwrap_or(Rect::new(Point::ZERO, Point::ZERO));

    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        bounds.min.x,
        bounds.min.y,
        bounds.width(),
        bounds.height(),
        bounds.width(),
        bounds.height(),
    )?;

    if config.canvas.show_grid {
        let pitch = config.canvas.grid_pitch;
        writeln!(
            writer,
            r##"<defs><pattern id="grid" width="{pitch}" height="{pitch}" patternUnits="userSpaceOnUse"><path d="M{pitch} 0 L0 0 L0 {pitch}" fill="none" stroke="#e5e7eb"/></pattern></defs>"##,
        )?;
        writeln!(
            writer,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#grid)"/>"#,
            bounds.min.x,
            bounds.min.y,
            bounds.width(),
            bounds.height(),
        )?;
    }

    // Connectors
    let renderer = ConnectionRenderer::new(&config.layout, &config.canvas);
    writeln!(writer, r##"<g class="connectors" fill="none" stroke="#9ca3af">"##)?;
    for connector in renderer.render(people, relationships, positions) {
        write_connector(writer, &connector)?;
    }
    writeln!(writer, "</g>")?;

    // Cards
    writeln!(writer, r#"<g class="cards">"#)?;
    for person in people {
        let Some(pos) = positions.get(&person.id) else { continue };
        let is_selected = selected == Some(&person.id);
        let view = PersonCard::new(person, pos.center(), card, is_selected, false);
        writeln!(writer, "{}", view.to_svg())?;
    }
    writeln!(writer, "</g>")?;

    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Export what a canvas currently shows (including an in-flight drag).
pub fn export_canvas_svg(canvas: &FamilyTreeCanvas, writer: &mut dyn Write) -> Result<()> {
    export_svg(
        canvas.people(),
        canvas.relationships(),
        &canvas.positions(),
        canvas.config(),
        canvas.selected(),
        writer,
    )
}

fn write_connector(writer: &mut dyn Write, connector: &Connector) -> Result<()> {
    match &connector.shape {
        Shape::Marker { center, radius } => {
            writeln!(
                writer,
                r##"<circle class="spouse-marker" cx="{}" cy="{}" r="{radius}" fill="#9ca3af"/>"##,
                center.x, center.y,
            )?;
        }
        Shape::Polyline(_) => {
            if let Some(d) = connector.svg_path() {
                writeln!(writer, r#"<path d="{d}"/>"#)?;
            }
        }
    }
    Ok(())
}

/// Box around every card plus fit padding.
fn bounds(positions: &PositionMap, config: &TreeConfig) -> Option<Rect> {
    let mut iter = positions.values().map(|p| p.center());
    let first = iter.next()?;
    let (mut lo, mut hi) = (first, first);
    for p in iter {
        lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    let hw = config.layout.card_width / 2.0 + config.canvas.fit_padding;
    let hh = config.layout.card_height / 2.0 + config.canvas.fit_padding;
    Some(Rect::new(lo - Point::new(hw, hh), hi + Point::new(hw, hh)))
}
