//! Text rendering of extracted code for the preview pane

use crate::extract::SyntaxMode;

/// Narrowest width handed to the markup renderer
const MIN_WIDTH: usize = 20;

/// Render `code` the way the preview pane shows it, wrapped to `width`.
pub fn render(code: &str, mode: SyntaxMode, width: usize) -> String {
    match mode {
        SyntaxMode::Markup => {
            let text = html2text::from_read(code.as_bytes(), width.max(MIN_WIDTH));
            text.trim().to_string()
        }
        SyntaxMode::Python | SyntaxMode::Script => code.to_string(),
    }
}
