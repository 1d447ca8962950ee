use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::presentation::{build_presentation, DisplayContext, PresentationValues};
use crate::render::render_template;
use crate::rules::RuleSet;
use crate::weather::openweather::OpenWeatherError;
use crate::weather::types::{Reading, ReadingError};
use crate::weather::WeatherSource;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Data fetch failed: {0}")]
    Fetch(#[from] OpenWeatherError),
    #[error("Invalid reading: {0}")]
    Reading(#[from] ReadingError),
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Timezone(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io { path: path.to_path_buf(), source }
}

#[derive(Debug, Serialize)]
struct GeneratedData<'a> {
    generated_at: DateTime<Utc>,
    reading: &'a Reading,
    presentation: &'a PresentationValues,
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub data_path: PathBuf,
    pub html_path: Option<PathBuf>,
    pub presentation: PresentationValues,
}

pub struct Generator {
    config: Config,
    rules: RuleSet,
    source: WeatherSource,
    timezone: Tz,
}

impl Generator {
    pub fn new(config: Config, rules: RuleSet, source: WeatherSource) -> Result<Self, GenerateError> {
        let timezone = config
            .timezone()
            .map_err(|e| GenerateError::Timezone(e.to_string()))?;

        Ok(Self { config, rules, source, timezone })
    }

    pub async fn generate(&self) -> Result<GenerationOutput, GenerateError> {
        self.generate_at(Utc::now()).await
    }

    /// Run one fetch, build and write cycle stamped with `now`.
    pub async fn generate_at(&self, now: DateTime<Utc>) -> Result<GenerationOutput, GenerateError> {
        let started = Instant::now();
        tracing::info!(sample = self.source.is_sample(), "Starting dashboard generation");

        let reading = self.source.fetch_reading().await?;

        let context = DisplayContext {
            location: self.config.location_label.clone(),
            quote: self.config.quote.clone(),
        };
        let presentation = build_presentation(
            &reading,
            &self.rules,
            &context,
            self.config.presentation_options(),
            now.with_timezone(&self.timezone),
        )?;

        tracing::debug!(
            condition = %presentation.condition,
            aqi_status = %presentation.aqi_status,
            aqi_action = %presentation.aqi_action,
            "Resolved recommendations"
        );

        let out_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(out_dir).await.map_err(io_error(out_dir))?;

        let html_path = match &self.config.template_file {
            Some(template_path) => {
                let template = tokio::fs::read_to_string(template_path)
                    .await
                    .map_err(io_error(template_path))?;
                let html_path = out_dir.join("index.html");
                tokio::fs::write(&html_path, render_template(&template, &presentation))
                    .await
                    .map_err(io_error(&html_path))?;
                Some(html_path)
            }
            None => None,
        };

        let data_path = out_dir.join("data.json");
        let data = GeneratedData {
            generated_at: now,
            reading: &reading,
            presentation: &presentation,
        };
        tokio::fs::write(&data_path, serde_json::to_vec_pretty(&data)?)
            .await
            .map_err(io_error(&data_path))?;

        tracing::info!(
            data = %data_path.display(),
            html = ?html_path,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation complete"
        );

        Ok(GenerationOutput { data_path, html_path, presentation })
    }

    /// Regenerate on the configured interval until Ctrl-C.
    pub async fn watch(&self) -> Result<(), GenerateError> {
        self.watch_until(tokio::signal::ctrl_c()).await
    }

    /// Generate once, then keep regenerating every refresh interval until
    /// `shutdown` resolves. A failed first cycle is returned to the caller;
    /// later failures are logged and retried on the next tick.
    pub async fn watch_until<F>(&self, shutdown: F) -> Result<(), GenerateError>
    where
        F: Future,
    {
        tokio::pin!(shutdown);

        let period = Duration::from_secs(self.config.refresh_interval_minutes * 60);

        tokio::select! {
            result = self.generate() => {
                result?;
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                return Ok(());
            }
        }

        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Watching mode enabled. Regenerating every {} minutes",
            self.config.refresh_interval_minutes
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => break,
            }

            tokio::select! {
                result = self.generate() => {
                    if let Err(e) = result {
                        tracing::error!("Generation failed, will retry on next interval: {}", e);
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Shutting down");
        Ok(())
    }
}
