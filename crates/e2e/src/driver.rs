//! Browser driver seam
//!
//! The session and page layers talk to the browser only through [`Driver`].
//! The production implementation is [`crate::chromium::ChromiumDriver`];
//! tests substitute a scripted driver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Document coordinates of an element's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Rendered element size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Snapshot of one element, taken by a single probe
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementState {
    /// Has a non-empty box and is not hidden by `display`, `visibility` or `opacity`
    pub displayed: bool,
    /// Not a disabled form control
    pub enabled: bool,
    pub location: Point,
    pub size: Size,
}

impl ElementState {
    pub fn visible(location: Point, size: Size) -> Self {
        Self {
            displayed: true,
            enabled: true,
            location,
            size,
        }
    }
}

/// Minimal set of browser operations the harness needs
#[async_trait]
pub trait Driver: Send + Sync {
    /// Load a URL in the current tab
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Inspect the first element matching `selector`, without waiting
    async fn probe(&self, selector: &str) -> E2eResult<Option<ElementState>>;

    /// Move the pointer to the element's centre, no buttons pressed
    async fn hover(&self, selector: &str) -> E2eResult<()>;

    /// Press and release the primary button on the element's centre
    async fn click(&self, selector: &str) -> E2eResult<()>;

    /// Computed CSS property of the element, as the browser resolves it
    async fn computed_style(&self, selector: &str, property: &str) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    /// Address of the document currently loaded in the tab
    async fn url(&self) -> E2eResult<String>;

    /// Go one entry back in session history and wait for that document to load
    async fn back(&self) -> E2eResult<()>;

    /// Tear the browser down. Idempotent.
    async fn close(&self) -> E2eResult<()>;
}
