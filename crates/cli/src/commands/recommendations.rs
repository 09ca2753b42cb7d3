//! Recommendation score maintenance.

use bramble_storefront::db::ProductRepository;

use super::{CommandError, connect};

/// Recompute every product's recommendation score in one transaction.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the update fails. No
/// score is changed in that case.
pub async fn recalculate() -> Result<(), CommandError> {
    let pool = connect().await?;

    let updated = ProductRepository::new(&pool)
        .recalculate_recommendation_scores()
        .await?;

    tracing::info!("Recalculated recommendation scores for {updated} products");
    Ok(())
}
