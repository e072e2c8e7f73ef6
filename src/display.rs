use ggez::graphics::{self, DrawMode, DrawParam, MeshBuilder, Rect};
use ggez::{Context, GameResult};
use glam::Vec2;

use crate::machine::Framebuffer;
use crate::{C8_HEIGHT, C8_WIDTH};

/// Turns the framebuffer into white squares on black.
pub struct DisplayDriver {
    pub scale: f32,
}

impl Default for DisplayDriver {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl DisplayDriver {
    pub fn new(scale: f32) -> DisplayDriver {
        DisplayDriver { scale }
    }

    /// Window size in pixels.
    pub fn window_size(&self) -> (f32, f32) {
        (C8_WIDTH as f32 * self.scale, C8_HEIGHT as f32 * self.scale)
    }

    /// Screen rectangle for every lit cell.
    pub fn lit_rects(&self, gfx: &Framebuffer) -> Vec<Rect> {
        let mut rects = Vec::new();
        for (y, row) in gfx.iter().enumerate() {
            for (x, lit) in row.iter().enumerate() {
                if *lit {
                    rects.push(Rect::new(
                        x as f32 * self.scale,
                        y as f32 * self.scale,
                        self.scale,
                        self.scale,
                    ));
                }
            }
        }
        rects
    }

    pub fn draw(&self, ctx: &mut Context, gfx: &Framebuffer) -> GameResult {
        graphics::clear(ctx, graphics::BLACK);

        let rects = self.lit_rects(gfx);
        // An empty mesh is an error in ggez
        if !rects.is_empty() {
            let mut builder = MeshBuilder::new();
            for r in rects {
                builder.rectangle(DrawMode::fill(), r, graphics::WHITE);
            }
            let mesh = builder.build(ctx)?;
            graphics::draw(ctx, &mesh, DrawParam::default().dest(Vec2::new(0.0, 0.0)))?;
        }

        graphics::present(ctx)
    }
}
