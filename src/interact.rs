use fantoccini::Client;
use fantoccini::elements::Element;
use tracing::info;

use crate::errors::HarnessError;

/// Thin interaction helper. Page objects and steps drive the browser through
/// this (and through [`crate::wait::Wait`]), never through the raw client.
#[derive(Clone)]
pub struct Interactor {
    client: Client,
}

impl Interactor {
    pub fn new(client: Client) -> Self {
        Interactor { client }
    }

    pub async fn navigate(&self, url: &str) -> Result<(), HarnessError> {
        info!("Navigating to {}", url);
        self.client.goto(url).await.map_err(Into::into)
    }

    pub async fn click(&self, element: &Element) -> Result<(), HarnessError> {
        element.click().await.map_err(Into::into)
    }

    pub async fn clear_and_type(&self, element: &Element, text: &str) -> Result<(), HarnessError> {
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    pub async fn type_text(&self, element: &Element, text: &str) -> Result<(), HarnessError> {
        element.send_keys(text).await.map_err(Into::into)
    }

    pub async fn current_url(&self) -> Result<String, HarnessError> {
        Ok(self.client.current_url().await?.to_string())
    }

    pub async fn page_title(&self) -> Result<String, HarnessError> {
        self.client.title().await.map_err(Into::into)
    }
}
