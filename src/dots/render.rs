use crate::dots::model::Particle;
use eframe::egui::{self, Color32, Pos2, Shape};

/// White, premultiplied by the particle's own opacity.
pub fn dot_color(particle: &Particle) -> Color32 {
    Color32::from_white_alpha(particle.alpha())
}

/// One filled circle per particle, in creation order. No outline.
pub fn dot_shapes(particles: &[Particle]) -> Vec<Shape> {
    particles
        .iter()
        .map(|p| {
            Shape::circle_filled(
                Pos2::new(p.position.0, p.position.1),
                p.radius,
                dot_color(p),
            )
        })
        .collect()
}

pub fn paint_dots(ctx: &egui::Context, particles: &[Particle]) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("moving_dots"),
    ));
    painter.extend(dot_shapes(particles));
}
