//! Inference over a batch of sample reviews

use crate::config::AppConfig;
use critique_classifiers::Classifier;
use critique_core::{PredictionExample, PredictionResult, Result};
use tracing::debug;

const BUILTIN_REVIEWS: [&str; 3] = [
    "Une fin bâclée extrêmement décevante avec un scénario qui ne pas pas sense. Zéro adrénaline après 10 ans de série haletante... Bref une fin vraiment nul !",
    "La pire fin de série !!! Pourquoi gâcher un chef d'oeuvres... en fin pourrie !!! De semaine en semaine les épisodes mon déçus c'était plat et bâclé... la mort de certains personnages son nul et incompréhensible !! Déçu déçu déçu !!!! La pire fin de tout les temps",
    "Cette série a marqué toute une décennie et une génération. Un seul mot peut véritablement la qualifier: magistrale.",
];

/// Sample reviews classified when none are configured
pub fn builtin_examples() -> Vec<PredictionExample> {
    BUILTIN_REVIEWS.iter().copied().map(PredictionExample::from).collect()
}

/// Reviews from the configuration, or the built-in samples
pub fn demo_examples(config: &AppConfig) -> Vec<PredictionExample> {
    if config.reviews.is_empty() {
        builtin_examples()
    } else {
        config
            .reviews
            .iter()
            .map(|text| PredictionExample::new(text.as_str()))
            .collect()
    }
}

/// Classify `examples`, one result per input in input order
pub fn predict<C: Classifier + ?Sized>(
    model: &C,
    examples: &[PredictionExample],
) -> Result<Vec<PredictionResult>> {
    debug!(
        classifier = model.name(),
        count = examples.len(),
        "Running predictions"
    );
    model.predict_examples(examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_examples() {
        let examples = builtin_examples();
        assert_eq!(examples.len(), 3);
        assert!(examples[2].text.ends_with("magistrale."));
    }

    #[test]
    fn test_configured_reviews_replace_builtins() {
        let config = AppConfig {
            reviews: vec!["Très bon".to_string()],
            ..Default::default()
        };
        let examples = demo_examples(&config);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].text, "Très bon");

        assert_eq!(demo_examples(&AppConfig::default()).len(), 3);
    }
}
