//! One run of the utility against a single image
//!
//! Mirrors what the window offers: a row of format buttons, and an eyedropper
//! that knocks the picked color out after the user confirms. Every outcome is
//! reported through the [`Presenter`]; the returned values are for callers
//! that want to decide what to do next (close the window, exit code).

use std::path::{Path, PathBuf};

use crate::color::ColorSample;
use crate::config::AppConfig;
use crate::converter::{self, ConversionResult};
use crate::error::Result;
use crate::format::TargetFormat;
use crate::masker::{self, TransparencyResult};
use crate::presenter::Presenter;
use crate::preview::Preview;

pub struct Session<P: Presenter> {
    path: PathBuf,
    config: AppConfig,
    presenter: P,
}

impl<P: Presenter> Session<P> {
    pub fn new(path: impl Into<PathBuf>, config: AppConfig, presenter: P) -> Self {
        Self {
            path: path.into(),
            config,
            presenter,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown in the header
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Formats offered as buttons, with their labels
    pub fn format_buttons(&self) -> Vec<(TargetFormat, String)> {
        self.config
            .converter
            .formats
            .iter()
            .map(|&format| (format, format.label()))
            .collect()
    }

    /// A format button was pressed
    pub fn select_format(&mut self, target: &str) -> Result<ConversionResult> {
        let result = converter::convert_image(&self.path, target, &self.config.converter);

        match &result {
            Ok(done) => {
                let message = format!(
                    "Successfully converted to {}!\n\nSaved as: {}",
                    done.format.label(),
                    display_name(&done.output_path)
                );
                self.presenter.notify(true, &message);
            }
            Err(e) => {
                log::warn!("conversion of {} to {:?} failed: {}", self.path.display(), target, e);
                self.presenter.notify(false, &format!("Failed to convert image:\n{}", e));
            }
        }

        result
    }

    /// Decode the image for the eyedropper
    pub fn open_preview(&self) -> Result<Preview> {
        Preview::open(&self.path, &self.config.preview)
    }

    /// A color was picked; returns `Ok(None)` when the user declined
    pub fn pick_color(&mut self, color: ColorSample) -> Result<Option<TransparencyResult>> {
        let prompt = format!(
            "Make {} transparent?\n\nA new PNG file with transparent areas will be created.",
            color
        );
        if !self.presenter.confirm(&prompt) {
            log::debug!("removal of {} declined", color);
            return Ok(None);
        }

        match masker::remove_color(&self.path, color, &self.config.transparency) {
            Ok(done) => {
                let message = format!("Saved transparent image as: {}", display_name(&done.output_path));
                self.presenter.notify(true, &message);
                Ok(Some(done))
            }
            Err(e) => {
                log::warn!("removing {} from {} failed: {}", color, self.path.display(), e);
                self.presenter
                    .notify(false, &format!("Failed to make image transparent:\n{}", e));
                Err(e)
            }
        }
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
