use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::analysis::AnalysisDesk;
use crate::application::preferences::PreferencesService;
use crate::application::refresh::RefreshScheduler;
use crate::config::{Config, Mode};
use crate::domain::ports::{AdvantageAnalyzer, NarrativeAnalyzer, PreferenceStore, RateSource};
use crate::infrastructure::{
    FrankfurterRateSource, GeminiAnalyzer, JsonPreferenceStore, MockAnalyzer, MockRateSource,
};

pub struct Application {
    pub config: Config,
    pub rate_source: Arc<dyn RateSource>,
    pub scheduler: RefreshScheduler,
    pub analysis: Arc<AnalysisDesk>,
    pub preferences: PreferencesService,
}

impl Application {
    pub fn build(config: Config) -> Result<Self> {
        info!("Building Ratewatch Application (Mode: {:?})...", config.mode);

        // 1. Rate feed
        let rate_source: Arc<dyn RateSource> = match config.mode {
            Mode::Mock => {
                info!("Using Mock rate source");
                Arc::new(MockRateSource::default())
            }
            Mode::Live => {
                info!("Using Frankfurter rate source ({})", config.feed.base_url);
                Arc::new(FrankfurterRateSource::new(
                    &config.feed.base_url,
                    config.feed.timeout,
                )?)
            }
        };

        // 2. Analysis collaborator
        let analysis = match config.mode {
            Mode::Mock => {
                let analyzer = Arc::new(MockAnalyzer::new());
                AnalysisDesk::new(
                    Some(analyzer.clone() as Arc<dyn AdvantageAnalyzer>),
                    Some(analyzer as Arc<dyn NarrativeAnalyzer>),
                )
            }
            Mode::Live if config.analysis.enabled() => {
                info!("Using Gemini analysis ({})", config.analysis.model);
                let analyzer = Arc::new(GeminiAnalyzer::new(
                    &config.analysis.base_url,
                    &config.analysis.model,
                    &config.analysis.api_key,
                )?);
                AnalysisDesk::new(
                    Some(analyzer.clone() as Arc<dyn AdvantageAnalyzer>),
                    Some(analyzer as Arc<dyn NarrativeAnalyzer>),
                )
            }
            Mode::Live => {
                info!("Analysis disabled (no GEMINI_API_KEY)");
                AnalysisDesk::disabled()
            }
        };

        // 3. Preferences
        let store: Arc<dyn PreferenceStore> = match &config.preferences_path {
            Some(path) => Arc::new(JsonPreferenceStore::with_path(path)),
            None => Arc::new(JsonPreferenceStore::new()?),
        };

        // 4. Scheduler
        let scheduler = RefreshScheduler::new(rate_source.clone(), config.refresh_config());

        Ok(Self {
            config,
            rate_source,
            scheduler,
            analysis: Arc::new(analysis),
            preferences: PreferencesService::new(store),
        })
    }
}
