use crate::domain::{errors::PortalResult, models::ListingDocument};
use async_trait::async_trait;

/// Port for materializing virtual directories from the flat key namespace
#[async_trait]
pub trait ListingRenderer: Send + Sync + 'static {
    /// Render the complete listing of `virtual_path`, or fail entirely
    async fn render_listing(&self, virtual_path: &str) -> PortalResult<ListingDocument>;
}
