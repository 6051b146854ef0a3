//! Rank sprite preloading

use web_sys::HtmlImageElement;

use crate::error::Result;
use crate::sim::Rank;

/// Number of rank sprites (ranks 0-9; the terminal rank has none)
pub const SPRITE_COUNT: usize = 10;

/// Sprite URL for a texture index
pub fn sprite_url(index: usize) -> String {
    format!("assets/t{}.png", index + 1)
}

/// Preloaded ball sprites indexed by rank
pub struct SpriteAtlas {
    images: Vec<HtmlImageElement>,
}

impl SpriteAtlas {
    /// Start loading every sprite. Images become drawable once the browser
    /// finishes fetching them; until then the renderer draws plain circles.
    pub fn preload() -> Result<Self> {
        let images = (0..SPRITE_COUNT)
            .map(|i| -> Result<HtmlImageElement> {
                let img = HtmlImageElement::new()?;
                img.set_src(&sprite_url(i));
                Ok(img)
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("Preloading {} sprites", images.len());
        Ok(Self { images })
    }

    /// Loaded sprite for a rank, if it has one
    pub fn get(&self, rank: Rank) -> Option<&HtmlImageElement> {
        let img = self.images.get(rank.texture_index()?)?;
        (img.complete() && img.natural_width() > 0).then_some(img)
    }
}
