use thiserror::Error;

use crate::display::RenderError;

/// Everything that can stop a lookup from reaching the display.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// No city given; no request is made.
    #[error("Please enter a city name")]
    EmptyInput,

    /// Geocoding produced no usable candidate. Usually a typo.
    #[error("{0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    /// Success status, but the body cannot be rendered.
    #[error("{0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The request never produced a response. Handled like `Upstream`.
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl WidgetError {
    /// Text shown to the user in the blocking notification.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }
}
