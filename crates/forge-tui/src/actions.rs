//! What the user can do with the extracted code: copy, save, deploy.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use arboard::Clipboard;
use forge_core::SyntaxMode;

/// Lazily opened system clipboard.
///
/// The handle is kept for the life of the app; on X11 the copied text only
/// stays available while its owner is alive.
#[derive(Default)]
pub struct ClipboardSlot {
    clipboard: Option<Clipboard>,
}

impl ClipboardSlot {
    pub fn copy(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text.to_owned())?;
        }
        Ok(())
    }
}

/// Ask for a destination with the native save dialog and write `code` there.
/// `Ok(None)` means the dialog was cancelled.
pub async fn save_with_dialog(code: &str, mode: SyntaxMode) -> Result<Option<PathBuf>> {
    let picked = rfd::AsyncFileDialog::new()
        .set_title("Save generated code")
        .set_file_name(mode.default_file_name())
        .add_filter(mode.label(), &[mode.extension()])
        .save_file()
        .await;

    save_picked(picked.map(|handle| handle.path().to_path_buf()), code)
}

/// Write `code` to the destination picked in the dialog, if any.
pub fn save_picked(picked: Option<PathBuf>, code: &str) -> Result<Option<PathBuf>> {
    let Some(path) = picked else {
        return Ok(None);
    };

    write_code(&path, code)?;
    Ok(Some(path))
}

pub fn write_code(path: &Path, code: &str) -> Result<()> {
    fs::write(path, code)?;
    Ok(())
}

/// Copy the code, then open the deployment page so it can be pasted in.
pub fn deploy(clipboard: &mut ClipboardSlot, code: &str, deploy_url: &str) -> Result<()> {
    clipboard.copy(code)?;
    open::that(deploy_url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_code_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SyntaxMode::Python.default_file_name());
        let code = "print('hi')\n\n# trailing\n";

        write_code(&path, code).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), code);
    }

    #[test]
    fn test_cancelled_dialog_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_picked(None, "<p></p>").unwrap().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_picked_destination_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SyntaxMode::Script.default_file_name());

        let saved = save_picked(Some(path.clone()), "let x = 1;\n").unwrap();
        assert_eq!(saved.as_deref(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "let x = 1;\n");
    }

    #[test]
    fn test_write_code_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("index.html");
        assert!(write_code(&path, "<p></p>").is_err());
    }
}
