//! DOM surfaces: score text, best score, and the game-over dialog

use web_sys::{Document, Element};

use crate::error::{Error, Result};
use crate::sim::ScoreDisplay;

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Browser("no document".into()))
}

fn set_text(document: &Document, selector: &str, value: u64) {
    if let Some(el) = document.query_selector(selector).ok().flatten() {
        el.set_text_content(Some(&value.to_string()));
    }
}

/// Mirrors scores into `#score .num`, `#gameOverScore` and `#highScore .num`
pub struct DomScoreDisplay {
    document: Document,
}

impl DomScoreDisplay {
    pub fn new() -> Result<Self> {
        Ok(Self {
            document: document()?,
        })
    }
}

impl ScoreDisplay for DomScoreDisplay {
    fn show_score(&mut self, score: u64) {
        set_text(&self.document, "#score .num", score);
        set_text(&self.document, "#gameOverScore", score);
    }

    fn show_high_score(&mut self, high_score: u64) {
        set_text(&self.document, "#highScore .num", high_score);
    }
}

/// The blocking end-of-game dialog (`#gameOverModal`)
pub struct GameOverDialog {
    modal: Element,
    screenshot: Option<Element>,
}

impl GameOverDialog {
    pub fn new() -> Result<Self> {
        let document = document()?;
        let modal = document
            .get_element_by_id("gameOverModal")
            .ok_or_else(|| Error::Browser("missing #gameOverModal".into()))?;
        Ok(Self {
            modal,
            screenshot: document.get_element_by_id("screenshot"),
        })
    }

    /// Show the dialog with a snapshot of the board
    pub fn show(&self, screenshot_url: Option<&str>) {
        if let (Some(img), Some(url)) = (&self.screenshot, screenshot_url) {
            let _ = img.set_attribute("src", url);
        }
        let _ = self.modal.class_list().remove_1("hidden");
    }

    pub fn hide(&self) {
        let _ = self.modal.class_list().add_1("hidden");
    }
}
