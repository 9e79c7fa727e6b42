//! embedded-graphics rendering of the scene widgets.

use super::engine::{ArcStyle, ButtonStyle, Icon, ScreenNode, Shape, Widget};
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Arc, Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment,
};

/// Stroke width of button icons.
const ICON_STROKE: u32 = 4;

/// Power glyph: open ring with a bar through the gap.
const POWER_ICON_DIAMETER: u32 = 36;

/// Half-width of the back chevron.
const CHEVRON_HALF: i32 = 12;

fn rgb565(color: Rgb888) -> Rgb565 {
    Rgb565::from(color)
}

/// Paint `screen` centred on `center`, limited to `clip`.
///
/// Widgets outside the clip are skipped entirely; the rest are drawn
/// through a clipped target so nothing outside `clip` is touched.
pub fn draw_screen<D>(
    target: &mut D,
    screen: &ScreenNode,
    center: Point,
    size: Size,
    clip: Rectangle,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let area = clip.intersection(&Rectangle::with_center(center, size));
    if area.is_zero_sized() {
        return Ok(());
    }

    let mut clipped = target.clipped(&area);
    clipped.fill_solid(&area, rgb565(screen.background))?;

    for widget in screen.widgets() {
        if widget.bounds(center).intersection(&area).is_zero_sized() {
            continue;
        }
        draw_widget(&mut clipped, widget, center)?;
    }
    Ok(())
}

pub fn draw_widget<D>(target: &mut D, widget: &Widget, screen_center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let center = widget.center(screen_center);
    match &widget.shape {
        Shape::Arc(arc) => draw_arc(target, arc, center, widget.diameter),
        Shape::Button(btn) => draw_button(target, btn, center, widget.diameter),
    }
}

fn draw_arc<D>(target: &mut D, arc: &ArcStyle, center: Point, diameter: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let stroke = |color: Rgb888| {
        PrimitiveStyleBuilder::new()
            .stroke_color(rgb565(color))
            .stroke_width(arc.width)
            .stroke_alignment(StrokeAlignment::Inside)
            .build()
    };
    let start = (arc.start_deg as f32).deg();

    Arc::with_center(center, diameter, start, (arc.sweep_deg() as f32).deg())
        .into_styled(stroke(arc.track_color))
        .draw(target)?;

    let indicator = arc.indicator_sweep_deg();
    if indicator > 0 {
        Arc::with_center(center, diameter, start, (indicator as f32).deg())
            .into_styled(stroke(arc.indicator_color))
            .draw(target)?;
    }
    Ok(())
}

fn draw_button<D>(
    target: &mut D,
    btn: &ButtonStyle,
    center: Point,
    diameter: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(rgb565(btn.bg_color)))
        .draw(target)?;

    let icon_style = PrimitiveStyle::with_stroke(rgb565(btn.current_icon_color()), ICON_STROKE);
    match btn.icon {
        Icon::None => {}
        Icon::Power => {
            // Gap centred on 12 o'clock (270°).
            Arc::with_center(center, POWER_ICON_DIAMETER, 300.0f32.deg(), 300.0f32.deg())
                .into_styled(icon_style)
                .draw(target)?;
            let r = POWER_ICON_DIAMETER as i32 / 2;
            Line::new(center - Point::new(0, r + 2), center - Point::new(0, r / 4))
                .into_styled(icon_style)
                .draw(target)?;
        }
        Icon::ChevronDown => {
            let tip = center + Point::new(0, CHEVRON_HALF / 2);
            let left = center + Point::new(-CHEVRON_HALF, -CHEVRON_HALF / 2);
            let right = center + Point::new(CHEVRON_HALF, -CHEVRON_HALF / 2);
            Line::new(left, tip).into_styled(icon_style).draw(target)?;
            Line::new(tip, right).into_styled(icon_style).draw(target)?;
        }
    }
    Ok(())
}
