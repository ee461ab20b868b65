// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : la série de prix normalisée
// (commune aux deux fournisseurs) et les niveaux calculés dessus.
// ============================================================================

pub mod levels; // Calcul support / résistance (levels.rs)
pub mod notice; // Notifications affichées après une recherche
pub mod price;  // PriceBar, PriceSeries, Source (price.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use srlevels::models::price::PriceSeries;
// On peut faire : use srlevels::models::PriceSeries;
pub use levels::{calculate_levels, LevelSet};
pub use notice::{Notice, NoticeLevel};
pub use price::{PriceBar, PriceSeries, SeriesError, Source};
