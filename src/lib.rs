// ============================================================================
// srlevels - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;      // Clients NSE (principal) et Groww (secours)
pub mod app;      // État de l'application
pub mod config;   // Configuration (fichier TOML optionnel)
pub mod models;   // Séries de prix, niveaux, notifications
pub mod pipeline; // Orchestration principal -> secours -> niveaux
pub mod ui;       // Interface utilisateur
