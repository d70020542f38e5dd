use recommendation_service::{
    seed, Catalog, Config, InMemoryCatalog, ModelHandle, RatingStore, RecommendationService,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;
    config.validate()?;

    info!(
        "Starting {} (factors={}, epochs={}, lr={}, reg={})",
        config.service_name,
        config.factors,
        config.epochs,
        config.learning_rate,
        config.regularization
    );

    let store = RatingStore::build_with_policy(
        seed::sample_ratings(),
        config.rating_scale(),
        config.duplicate_policy,
    )?;
    let catalog = Arc::new(InMemoryCatalog::new(seed::sample_books()));

    let service = RecommendationService::new(
        ModelHandle::new(),
        catalog,
        config.fit_params(),
        config.default_limit,
    );

    // Fit once before serving anything
    service.refit(store).await.map_err(|e| {
        error!("Model fit failed: {}", e);
        e
    })?;

    let genres = service.catalog().genres().await?;
    info!(count = genres.len(), genres = ?genres, "Catalog genres");

    let recommendations = service
        .recommend_items(config.demo_user_id, None, None)
        .await?;

    for (rank, (book, score)) in recommendations.iter().enumerate() {
        info!(
            rank = rank + 1,
            item_id = book.id,
            title = %book.title,
            author = %book.author,
            genre = %book.genre,
            score = score,
            "Recommendation"
        );
    }

    let payload: Vec<serde_json::Value> = recommendations
        .iter()
        .map(|(book, score)| serde_json::json!({ "book": book, "score": score }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}
