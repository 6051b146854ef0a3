//! Canvas 2D renderer

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::sprites::SpriteAtlas;
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::sim::{BallView, GameSession, Rank};

/// Fallback fill per rank, used before sprites load and for the terminal rank
const RANK_COLORS: [&str; 11] = [
    "#f25f5c", "#ffe066", "#70c1b3", "#247ba0", "#b388eb", "#ff9f1c", "#2ec4b6",
    "#e71d36", "#8ac926", "#6a4c93", "#ffd700",
];

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprites: SpriteAtlas,
}

impl CanvasRenderer {
    /// Size the canvas to the board and grab its 2D context
    pub fn new(canvas: HtmlCanvasElement, layout: &Layout, sprites: SpriteAtlas) -> Result<Self> {
        canvas.set_width(layout.width.max(0.0) as u32);
        canvas.set_height(layout.height.max(0.0) as u32);

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| Error::Browser("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Browser("not a 2d context".into()))?;

        Ok(Self {
            canvas,
            ctx,
            sprites,
        })
    }

    /// Draw the current frame
    pub fn render(&self, session: &GameSession) -> Result<()> {
        let layout = session.layout();
        self.ctx
            .clear_rect(0.0, 0.0, layout.width as f64, layout.height as f64);

        for ball in session.ball_views() {
            self.draw_ball(&ball)?;
        }
        Ok(())
    }

    /// Current frame as a PNG data URL
    pub fn screenshot(&self) -> Result<String> {
        Ok(self.canvas.to_data_url()?)
    }

    fn draw_ball(&self, ball: &BallView) -> Result<()> {
        let r = ball.radius as f64;
        self.ctx.save();
        self.ctx
            .translate(ball.position.x as f64, ball.position.y as f64)?;
        self.ctx.rotate(ball.angle as f64)?;

        if let Some(img) = self.sprites.get(ball.rank) {
            self.ctx
                .draw_image_with_html_image_element_and_dw_and_dh(img, -r, -r, r * 2.0, r * 2.0)?;
        } else {
            self.ctx.begin_path();
            self.ctx.arc(0.0, 0.0, r, 0.0, TAU)?;
            self.ctx.set_fill_style_str(rank_color(ball.rank));
            self.ctx.fill();
        }

        self.ctx.restore();
        Ok(())
    }
}

fn rank_color(rank: Rank) -> &'static str {
    RANK_COLORS[rank.value() as usize]
}
